use chromiumoxide::Page;
use std::time::Duration;
use tracing::debug;
use crate::error::UiError;
use crate::fliip::selectors;
use crate::fliip::wait::{click_when_present, poll_until, text_of, visible_text_by_id};
use crate::traits::{DialogState, DialogVariant};

/// First visible dialog among `variants`, checked in the given order
async fn visible_dialog(page: &Page, variants: &[DialogVariant]) -> Result<Option<(DialogState, &'static str)>, UiError> {
    for &variant in variants {
        for &id in selectors::dialog_ids(variant) {
            if let Some(text) = visible_text_by_id(page, id).await? {
                return Ok(Some((DialogState { variant, text }, id)));
            }
        }
    }
    Ok(None)
}

pub async fn wait_for_any_dialog(
    page: &Page,
    variants: &[DialogVariant],
    timeout: Duration,
) -> Result<DialogState, UiError> {
    let what = format!("one of the dialogs {:?}", variants);
    let (state, id) = poll_until(&what, timeout, move || async move {
        visible_dialog(page, variants).await
    })
    .await?;
    debug!(dialog = id, variant = ?state.variant, "Dialog visible");
    Ok(state)
}

pub async fn confirm_booking(page: &Page, timeout: Duration) -> Result<(), UiError> {
    click_when_present(page, selectors::CONFIRM_BUTTON, timeout).await
}

pub async fn wait_for_success(page: &Page, timeout: Duration) -> Result<(), UiError> {
    let title = selectors::alert_title();
    let title = title.as_str();
    poll_until("booking success message", timeout, move || async move {
        if visible_text_by_id(page, selectors::ALERT_MODAL_ID).await?.is_none() {
            return Ok(None);
        }
        let text = text_of(page, title).await?.unwrap_or_default();
        Ok(text.contains(selectors::SUCCESS_TITLE_TEXT).then_some(()))
    })
    .await
}

/// Close the visible dialog of `variant` and wait for it to be hidden
pub async fn dismiss(page: &Page, variant: DialogVariant, timeout: Duration) -> Result<(), UiError> {
    let (_, id) = visible_dialog(page, &[variant])
        .await?
        .ok_or_else(|| UiError::UnexpectedContent(format!("no visible {:?} dialog to close", variant)))?;

    let close = match page.find_element(selectors::close_button(id)).await {
        Ok(button) => button,
        Err(_) => page.find_element(selectors::close_button_fallback(id)).await?,
    };
    close.click().await?;

    poll_until(&format!("dialog '{}' to close", id), timeout, move || async move {
        Ok(visible_text_by_id(page, id).await?.is_none().then_some(()))
    })
    .await?;
    debug!(dialog = id, "Dialog closed");
    Ok(())
}

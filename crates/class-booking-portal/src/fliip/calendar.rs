use chrono::NaiveDate;
use chromiumoxide::Page;
use class_booking_models::SlotKey;
use std::time::Duration;
use tracing::{debug, warn};
use crate::error::UiError;
use crate::fliip::selectors;
use crate::fliip::wait::{eval, js_string, poll_until, text_of};
use crate::labels::parse_week_label;
use crate::traits::SlotHandle;

async fn header_text(page: &Page) -> Result<Option<String>, UiError> {
    text_of(page, &format!("#{}", selectors::CURRENT_DATE_ID)).await
}

pub async fn current_page_date(page: &Page) -> Result<NaiveDate, UiError> {
    let text = header_text(page)
        .await?
        .ok_or_else(|| UiError::UnexpectedContent("calendar header is missing".to_string()))?;
    parse_week_label(&text)
        .ok_or_else(|| UiError::UnexpectedContent(format!("cannot read a date from calendar header '{}'", text.trim())))
}

pub async fn wait_for_week_label(page: &Page, label: &str, timeout: Duration) -> Result<(), UiError> {
    poll_until(&format!("calendar header '{}'", label), timeout, move || async move {
        let text = header_text(page).await?.unwrap_or_default();
        Ok(text.contains(label).then_some(()))
    })
    .await
}

/// Click a week navigation button and wait for the header to change.
/// A header that never changes is only logged: the week label check that
/// follows every move is what rejects a wrong page.
pub async fn change_week(page: &Page, button: &str, timeout: Duration) -> Result<(), UiError> {
    let before = header_text(page).await?;
    let before = before.as_deref();

    let element = poll_until(button, timeout, move || async move {
        Ok(page.find_element(button).await.ok())
    })
    .await?;
    element.click().await?;

    let refreshed = poll_until("calendar week refresh", timeout, move || async move {
        let now = header_text(page).await?;
        Ok((now.is_some() && now.as_deref() != before).then_some(()))
    })
    .await;

    match refreshed {
        Ok(()) => {
            debug!(button = button, "Calendar week changed");
            Ok(())
        }
        Err(e) if e.is_timeout() => {
            warn!(button = button, "Calendar header did not change after navigation");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// True when a class block's text shows a time range starting at `start`
/// (`"HH:MM"`). The end time of an earlier class does not count.
pub fn block_starts_at(text: &str, start: &str) -> bool {
    text.lines().any(|line| {
        line.trim()
            .strip_prefix(start)
            .map(|rest| rest.trim_start().starts_with('-'))
            .unwrap_or(false)
    })
}

/// Find the class block for `key`: its id ends with `,<date>` and its time
/// range starts at the class start time
pub async fn find_slot(page: &Page, key: &SlotKey) -> Result<Option<SlotHandle>, UiError> {
    let js = format!(
        r#"(() => {{
            const suffix = {suffix};
            return Array.from(document.querySelectorAll('[id$="' + suffix + '"]'))
                .map(el => [el.id, el.innerText || '']);
        }})()"#,
        suffix = js_string(&format!(",{}", key.date_id())),
    );

    let start = key.start_label();
    let blocks = eval(page, js).await?;
    let found = blocks.as_array().into_iter().flatten().find_map(|block| {
        let id = block.get(0)?.as_str()?;
        let text = block.get(1)?.as_str()?;
        block_starts_at(text, &start).then(|| id.to_string())
    });
    Ok(found.map(|element_id| SlotHandle { element_id }))
}

pub async fn read_text(page: &Page, slot: &SlotHandle) -> Result<String, UiError> {
    text_of(page, &selectors::by_exact_id(&slot.element_id))
        .await?
        .ok_or_else(|| UiError::UnexpectedContent(format!("class block '{}' disappeared", slot.element_id)))
}

pub async fn click_register(page: &Page, slot: &SlotHandle) -> Result<(), UiError> {
    let element = match page.find_element(selectors::register_icon(&slot.element_id)).await {
        Ok(icon) => icon,
        // Some layouts render no icon; the block itself opens the dialog
        Err(_) => page.find_element(selectors::by_exact_id(&slot.element_id)).await?,
    };
    element.scroll_into_view().await?;
    element.click().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_matches_start_time_only() {
        assert!(!block_starts_at("CrossFit\n11:00 - 12:00", "12:00"));
        assert!(block_starts_at("CrossFit\n12:00 - 13:00", "12:00"));
        assert!(block_starts_at("Confirmed\nCrossFit\n  12:00-13:00\n3 spots", "12:00"));
    }

    #[test]
    fn test_block_without_time_range_does_not_match() {
        assert!(!block_starts_at("Open gym 12:00", "12:00"));
        assert!(!block_starts_at("", "12:00"));
    }
}

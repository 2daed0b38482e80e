use chromiumoxide::Page;
use class_booking_config::Credentials;
use std::time::Duration;
use tracing::{debug, info, warn};
use crate::error::UiError;
use crate::fliip::selectors;
use crate::fliip::wait::{click_when_present, eval, poll_until, text_of};

/// Logging in redirects through a few pages; give it more than a UI wait
const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn open_login_page(page: &Page, url: &str) -> Result<(), UiError> {
    info!(operation = "open_login_page", url = url, "Opening Fliip login page");
    page.goto(url).await?;
    page.wait_for_navigation().await?;
    Ok(())
}

/// Refuse the privacy banner if it shows up. Returns whether it was there.
pub async fn reject_cookies(page: &Page, timeout: Duration) -> Result<bool, UiError> {
    match click_when_present(page, selectors::COOKIE_REJECT_BUTTON, timeout).await {
        Ok(()) => {
            debug!("Refused privacy banner");
            Ok(true)
        }
        Err(e) if e.is_timeout() => {
            debug!("No privacy banner shown");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

pub async fn authenticate(page: &Page, credentials: &Credentials, timeout: Duration) -> Result<(), UiError> {
    let username = poll_until(selectors::USERNAME_INPUT, timeout, move || async move {
        Ok(page.find_element(selectors::USERNAME_INPUT).await.ok())
    })
    .await?;
    let password = page
        .find_element(selectors::PASSWORD_INPUT)
        .await
        .map_err(|_| UiError::UnexpectedContent("login form has no password field".to_string()))?;

    username.click().await?;
    username.type_str(&credentials.username).await?;
    password.click().await?;
    password.type_str(&credentials.password).await?;
    password.press_key("Enter").await?;

    info!(operation = "login_submitted", username = %credentials.username, "Submitted login form");

    // The language switch only exists on authenticated pages
    let logged_in = poll_until(selectors::LANGUAGE_BUTTON, LOGIN_TIMEOUT, move || async move {
        Ok(page.find_element(selectors::LANGUAGE_BUTTON).await.ok().map(|_| ()))
    })
    .await;

    match logged_in {
        Ok(()) => {
            info!("Signed in to Fliip");
            Ok(())
        }
        Err(e) if e.is_timeout() => {
            let url = page.url().await.ok().flatten().unwrap_or_default();
            Err(UiError::Login(format!(
                "still not signed in after {:?} (current page: {}); check the username and password",
                LOGIN_TIMEOUT, url
            )))
        }
        Err(e) => Err(e),
    }
}

/// Switch the UI language so the calendar header parses. The portal offers a
/// single toggle button, so it is only pressed when the page language differs.
pub async fn set_language(page: &Page, code: &str, timeout: Duration) -> Result<(), UiError> {
    let current = page_language(page).await?;
    if current.starts_with(&code.to_ascii_lowercase()) {
        debug!(language = %current, "Portal already in the requested language");
        return Ok(());
    }

    let before = text_of(page, &format!("#{}", selectors::CURRENT_DATE_ID)).await?;
    click_when_present(page, selectors::LANGUAGE_BUTTON, timeout).await?;

    let switched = poll_until("language switch", timeout, move || async move {
        let language = page_language(page).await?;
        Ok(language.starts_with(&code.to_ascii_lowercase()).then_some(()))
    })
    .await;

    match switched {
        Ok(()) => info!(language = code, "Switched portal language"),
        Err(e) if e.is_timeout() => {
            let after = text_of(page, &format!("#{}", selectors::CURRENT_DATE_ID)).await?;
            if after == before {
                warn!(language = code, "Language toggle did not change the page; date labels may not parse");
            }
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

async fn page_language(page: &Page) -> Result<String, UiError> {
    let value = eval(page, "document.documentElement.lang || ''".to_string()).await?;
    Ok(value.as_str().unwrap_or_default().to_ascii_lowercase())
}

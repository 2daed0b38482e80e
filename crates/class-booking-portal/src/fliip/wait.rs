use chromiumoxide::Page;
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use crate::error::UiError;

const FIRST_POLL: Duration = Duration::from_millis(100);
const MAX_POLL: Duration = Duration::from_millis(500);

/// Poll `probe` until it yields a value or `timeout` runs out. The interval
/// starts at 100ms and doubles up to 500ms.
pub async fn poll_until<T, F, Fut>(what: &str, timeout: Duration, mut probe: F) -> Result<T, UiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, UiError>>,
{
    let start = Instant::now();
    let mut interval = FIRST_POLL;

    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        if start.elapsed() >= timeout {
            return Err(UiError::timeout(what, timeout));
        }
        sleep(interval).await;
        interval = (interval * 2).min(MAX_POLL);
    }
}

/// Evaluate a JS expression and return its JSON value (`Null` when it has none)
pub async fn eval(page: &Page, js: String) -> Result<Value, UiError> {
    let result = page.evaluate(js).await?;
    Ok(result.value().cloned().unwrap_or(Value::Null))
}

/// Rendered text of the element with `id` when it is displayed, else `None`
pub async fn visible_text_by_id(page: &Page, id: &str) -> Result<Option<String>, UiError> {
    let js = format!(
        r#"(() => {{
            const el = document.getElementById({id});
            if (!el) return null;
            const style = window.getComputedStyle(el);
            if (style.display === 'none' || style.visibility === 'hidden') return null;
            if (el.getClientRects().length === 0) return null;
            return el.innerText || '';
        }})()"#,
        id = js_string(id)
    );
    Ok(eval(page, js).await?.as_str().map(str::to_string))
}

/// Text of the first element matching `selector`, whether or not it is visible
pub async fn text_of(page: &Page, selector: &str) -> Result<Option<String>, UiError> {
    match page.find_element(selector.to_string()).await {
        Ok(element) => Ok(element.inner_text().await?),
        Err(_) => Ok(None),
    }
}

/// Wait for `selector` to exist, then click it
pub async fn click_when_present(page: &Page, selector: &str, timeout: Duration) -> Result<(), UiError> {
    let element = poll_until(selector, timeout, move || async move {
        Ok(page.find_element(selector.to_string()).await.ok())
    })
    .await?;
    element.click().await?;
    Ok(())
}

/// Quote a Rust string as a JS string literal
pub fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(js_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(js_string("current-date"), "\"current-date\"");
    }

    #[tokio::test]
    async fn test_poll_until_returns_first_value() {
        let mut calls = 0;
        let value = poll_until("counter", Duration::from_secs(2), || {
            calls += 1;
            let ready = calls >= 3;
            async move { Ok(if ready { Some(calls) } else { None }) }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let result: Result<(), UiError> =
            poll_until("nothing", Duration::from_millis(150), move || async move { Ok(None) }).await;
        assert!(result.unwrap_err().is_timeout());
    }
}

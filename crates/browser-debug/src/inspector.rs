use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use crate::config::DebugConfig;

const PAGE_STATE_JS: &str = r#"
(() => {
    const visibleModals = Array.from(document.querySelectorAll('.modal'))
        .filter(m => m.offsetParent !== null || getComputedStyle(m).display === 'block')
        .map(m => m.id);
    return {
        url: window.location.href,
        title: document.title,
        readyState: document.readyState,
        visibleModals: visibleModals,
        currentDate: (document.getElementById('current-date') || {}).innerText || null,
    };
})()
"#;

/// Files written by one capture
#[derive(Debug, Clone, Default)]
pub struct CaptureArtifacts {
    pub dir: PathBuf,
    pub screenshot: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub page_state: Option<PathBuf>,
}

/// Snapshots a page when something went wrong so the markup can be
/// inspected after the browser is gone
pub struct PageInspector {
    config: DebugConfig,
    capture_counter: u32,
}

impl PageInspector {
    pub fn new(config: DebugConfig) -> Self {
        Self {
            config,
            capture_counter: 0,
        }
    }

    pub fn config(&self) -> &DebugConfig {
        &self.config
    }

    /// Capture screenshot, HTML and page state into a fresh directory.
    /// Returns `Ok(None)` when debugging is disabled.
    pub async fn capture(&mut self, page: &Page, label: &str) -> Result<Option<CaptureArtifacts>> {
        if !self.config.enabled {
            return Ok(None);
        }

        self.capture_counter += 1;
        let dir = self.config.output_dir.join(format!(
            "{}_{:03}_{}",
            chrono::Local::now().format("%Y%m%d-%H%M%S"),
            self.capture_counter,
            sanitize_label(label)
        ));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create debug capture directory: {:?}", dir))?;

        let mut artifacts = CaptureArtifacts {
            dir: dir.clone(),
            ..CaptureArtifacts::default()
        };

        if self.config.capture_screenshots {
            // A failed screenshot should not hide the HTML, which is usually more useful
            match save_screenshot(page, &dir).await {
                Ok(path) => artifacts.screenshot = Some(path),
                Err(e) => warn!("Failed to capture screenshot: {}", e),
            }
        }

        if self.config.capture_html {
            let html = page.content().await?;
            let path = dir.join("page.html");
            std::fs::write(&path, html)
                .with_context(|| format!("Failed to write HTML to {:?}", path))?;
            artifacts.html = Some(path);
        }

        let state = page_state(page).await;
        let path = dir.join("page_state.json");
        std::fs::write(&path, serde_json::to_string_pretty(&state)?)
            .with_context(|| format!("Failed to write page state to {:?}", path))?;
        artifacts.page_state = Some(path);

        info!(operation = "debug_capture", dir = %dir.display(), "Saved browser debug capture");
        Ok(Some(artifacts))
    }
}

async fn save_screenshot(page: &Page, dir: &Path) -> Result<PathBuf> {
    let params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .build();
    let data = page.screenshot(params).await?;
    let path = dir.join("screenshot.png");
    std::fs::write(&path, data)
        .with_context(|| format!("Failed to write screenshot to {:?}", path))?;
    Ok(path)
}

/// URL, title, ready state and any open modal dialogs
pub async fn page_state(page: &Page) -> Value {
    let url = page.url().await.ok().flatten().unwrap_or_default();
    let mut state = json!({ "url": url });

    match page.evaluate(PAGE_STATE_JS).await {
        Ok(result) => {
            if let Some(Value::Object(obj)) = result.value() {
                for (key, val) in obj {
                    state[key] = val.clone();
                }
            }
        }
        Err(e) => {
            warn!("Failed to execute JavaScript for page state: {}", e);
        }
    }

    state
}

fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

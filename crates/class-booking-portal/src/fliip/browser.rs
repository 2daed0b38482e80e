use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::{Browser, BrowserConfig, Handler};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use which::which;
use crate::error::UiError;

const MAX_HANDLER_ERRORS: usize = 10;

/// Start Chromium (system install, or a fetched one) and spawn the CDP handler
pub async fn launch(headless: bool, profile_dir: &Path) -> Result<(Browser, JoinHandle<()>), UiError> {
    std::fs::create_dir_all(profile_dir)
        .map_err(|e| UiError::Launch(format!("cannot create profile dir {:?}: {}", profile_dir, e)))?;

    let chrome_path = match find_system_chromium() {
        Some(path) => path,
        None => fetch_chromium(profile_dir).await?,
    };

    let config = build_browser_config(&chrome_path, headless, profile_dir)?;
    let (browser, handler) = Browser::launch(config)
        .await
        .map_err(|e| UiError::Launch(e.to_string()))?;

    Ok((browser, spawn_handler(handler)))
}

fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut error_count = 0;

        while let Some(event) = handler.next().await {
            match event {
                Ok(_) => error_count = 0,
                Err(e) => {
                    error_count += 1;
                    warn!(
                        "Browser handler error (count: {}/{}): {:?}",
                        error_count, MAX_HANDLER_ERRORS, e
                    );
                    if error_count >= MAX_HANDLER_ERRORS {
                        error!("Browser handler received {} consecutive errors. Browser process may have crashed.", error_count);
                        break;
                    }
                }
            }
        }

        info!("Browser handler task ended");
    })
}

async fn fetch_chromium(profile_dir: &Path) -> Result<PathBuf, UiError> {
    info!("No system Chromium found, downloading via BrowserFetcher...");
    let download_path = profile_dir
        .parent()
        .unwrap_or(profile_dir)
        .join("chromium_downloads");
    tokio::fs::create_dir_all(&download_path)
        .await
        .map_err(|e| UiError::Launch(e.to_string()))?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&download_path)
        .build()
        .map_err(|e| UiError::Launch(format!("Failed to create BrowserFetcherOptions: {}", e)))?;
    let info = BrowserFetcher::new(options)
        .fetch()
        .await
        .map_err(|e| UiError::Launch(format!("Failed to fetch Chromium: {}", e)))?;

    info!("Chromium downloaded to: {:?}", info.executable_path);
    Ok(info.executable_path)
}

fn is_docker() -> bool {
    Path::new("/.dockerenv").exists()
        || std::fs::read_to_string("/proc/self/cgroup")
            .ok()
            .map(|s| s.contains("docker") || s.contains("containerd"))
            .unwrap_or(false)
}

fn find_system_chromium() -> Option<PathBuf> {
    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/local/bin/chromium",
        ]
    };

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .or_else(|| {
            which("chromium")
                .or_else(|_| which("chromium-browser"))
                .or_else(|_| which("google-chrome"))
                .ok()
        })
}

fn build_browser_config(chrome_path: &Path, headless: bool, profile_dir: &Path) -> Result<BrowserConfig, UiError> {
    let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

    // Containers have no display, whatever the config says
    if !headless && !is_docker() {
        builder = builder.with_head();
    }

    if !cfg!(target_os = "macos") {
        builder = builder
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");
    }

    builder = builder
        .arg("--disable-extensions")
        .arg("--disable-notifications")
        .arg("--disable-gpu")
        .arg("--disable-sync")
        .arg("--disable-default-apps")
        .arg("--log-level=2")
        .arg("--window-size=1280,900")
        .arg(format!("--user-data-dir={}", profile_dir.display()));

    builder.build().map_err(UiError::Launch)
}

use async_trait::async_trait;
use browser_debug::{DebugConfig, PageInspector};
use chrono::NaiveDate;
use chromiumoxide::{Browser, Page};
use class_booking_config::{Config, Credentials, PathManager};
use class_booking_models::SlotKey;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use crate::error::UiError;
use crate::fliip::{auth, browser, calendar, dialogs, selectors};
use crate::traits::{CalendarUi, DialogState, DialogVariant, SlotHandle};

const HANDLER_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub login_url: String,
    pub language: String,
    pub headless: bool,
    pub profile_dir: PathBuf,
    pub ui_timeout: Duration,
    pub debug: DebugConfig,
}

impl SessionSettings {
    pub fn from_config(config: &Config, paths: &PathManager) -> Self {
        Self {
            login_url: config.login_url(),
            language: config.portal.language.clone(),
            headless: config.portal.headless,
            profile_dir: paths.browser_profile_dir(),
            ui_timeout: config.booking.ui_timeout(),
            debug: DebugConfig::from_settings(
                config.debug.enabled,
                config.debug.output_dir.as_deref(),
                &paths.debug_dir(),
            ),
        }
    }
}

/// One browser, one tab on the gym portal. Call [`FliipSession::close`]
/// when done; the browser process is not stopped on drop.
pub struct FliipSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
    settings: SessionSettings,
    inspector: Mutex<PageInspector>,
}

impl FliipSession {
    #[instrument(skip(settings), fields(headless = settings.headless))]
    pub async fn launch(settings: SessionSettings) -> Result<Self, UiError> {
        let (browser, handler_task) = browser::launch(settings.headless, &settings.profile_dir).await?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(UiError::Launch(format!("cannot open a tab: {}", e)));
            }
        };

        info!("Browser session started");
        let inspector = Mutex::new(PageInspector::new(settings.debug.clone()));
        Ok(Self {
            browser,
            handler_task,
            page,
            settings,
            inspector,
        })
    }

    /// Log in and switch the portal to the configured language. Leaves the
    /// page on the member calendar.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<(), UiError> {
        let timeout = self.settings.ui_timeout;
        auth::open_login_page(&self.page, &self.settings.login_url).await?;
        auth::reject_cookies(&self.page, timeout).await?;
        auth::authenticate(&self.page, credentials, timeout).await?;
        auth::set_language(&self.page, &self.settings.language, timeout).await?;
        Ok(())
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Close the browser and wait briefly for the CDP handler to finish
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if tokio::time::timeout(HANDLER_SHUTDOWN_GRACE, &mut self.handler_task).await.is_err() {
            self.handler_task.abort();
        }
        info!("Browser session closed");
    }
}

#[async_trait]
impl CalendarUi for FliipSession {
    async fn current_page_date(&self) -> Result<NaiveDate, UiError> {
        calendar::current_page_date(&self.page).await
    }

    async fn wait_for_week_label(&self, label: &str, timeout: Duration) -> Result<(), UiError> {
        calendar::wait_for_week_label(&self.page, label, timeout).await
    }

    async fn advance_week(&self) -> Result<(), UiError> {
        calendar::change_week(&self.page, selectors::NEXT_WEEK_BUTTON, self.settings.ui_timeout).await
    }

    async fn retreat_week(&self) -> Result<(), UiError> {
        calendar::change_week(&self.page, selectors::PREV_WEEK_BUTTON, self.settings.ui_timeout).await
    }

    async fn find_slot(&self, key: &SlotKey) -> Result<Option<SlotHandle>, UiError> {
        calendar::find_slot(&self.page, key).await
    }

    async fn read_text(&self, slot: &SlotHandle) -> Result<String, UiError> {
        calendar::read_text(&self.page, slot).await
    }

    async fn click_register(&self, slot: &SlotHandle) -> Result<(), UiError> {
        calendar::click_register(&self.page, slot).await
    }

    async fn wait_for_any_dialog(
        &self,
        variants: &[DialogVariant],
        timeout: Duration,
    ) -> Result<DialogState, UiError> {
        dialogs::wait_for_any_dialog(&self.page, variants, timeout).await
    }

    async fn confirm_booking(&self) -> Result<(), UiError> {
        dialogs::confirm_booking(&self.page, self.settings.ui_timeout).await
    }

    async fn wait_for_success(&self, timeout: Duration) -> Result<(), UiError> {
        dialogs::wait_for_success(&self.page, timeout).await
    }

    async fn dismiss(&self, variant: DialogVariant) -> Result<(), UiError> {
        dialogs::dismiss(&self.page, variant, self.settings.ui_timeout).await
    }

    async fn capture_failure(&self, label: &str) {
        let mut inspector = self.inspector.lock().await;
        if let Err(e) = inspector.capture(&self.page, label).await {
            warn!("Failed to save debug capture for {}: {}", label, e);
        }
    }
}

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use class_booking_config::{Config, PathManager};
use class_booking_models::RunReport;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

/// Receives the report of every finished or aborted run
#[async_trait]
pub trait OutcomeReporter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn report(&self, report: &RunReport) -> Result<()>;
}

/// One line per failed slot plus the abort reason, for humans
pub fn failure_summary(report: &RunReport) -> String {
    let mut lines = Vec::new();
    if let Some(reason) = &report.aborted {
        lines.push(format!("Run aborted: {}", reason));
    }
    for record in report.failures() {
        lines.push(format!("{} {}: {}", record.target.format("%Y-%m-%d %H:%M"), record.slot, record.outcome));
    }
    lines.join("\n")
}

/// Logs the run summary through tracing
pub struct LogReporter;

#[async_trait]
impl OutcomeReporter for LogReporter {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn report(&self, report: &RunReport) -> Result<()> {
        let summary = report.summary();
        info!(
            newly_registered = summary.newly_registered,
            already_registered = summary.already_registered,
            skipped = summary.skipped,
            failed = summary.failed,
            "Run summary"
        );
        for record in &report.records {
            debug!(week = record.week, class_at = %record.target, outcome = %record.outcome, "Slot result");
        }
        if report.has_failures() {
            error!("Registration problems:\n{}", failure_summary(report));
        }
        Ok(())
    }
}

/// Writes a JSON report into `dir` when the run had failures
pub struct ReportFileWriter {
    dir: PathBuf,
}

impl ReportFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, report: &RunReport) -> PathBuf {
        self.dir
            .join(format!("report-{}.json", report.started_at.format("%Y%m%d-%H%M%S")))
    }
}

#[async_trait]
impl OutcomeReporter for ReportFileWriter {
    fn name(&self) -> &'static str {
        "report_file"
    }

    async fn report(&self, report: &RunReport) -> Result<()> {
        if !report.has_failures() {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(report);
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| anyhow!("Failed to serialize run report: {}", e))?;
        tokio::fs::write(&path, json).await?;
        info!("Failure report written to {}", path.display());
        Ok(())
    }
}

/// POSTs failed runs as JSON: `{"text": ..., "report": ...}`. Pointing the
/// URL at a chat or mail relay hook delivers the alert.
pub struct WebhookReporter {
    url: String,
    client: Client,
}

impl WebhookReporter {
    pub fn new(url: String) -> Self {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { url, client }
    }
}

#[async_trait]
impl OutcomeReporter for WebhookReporter {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn report(&self, report: &RunReport) -> Result<()> {
        if !report.has_failures() {
            return Ok(());
        }

        let payload = serde_json::json!({
            "text": format!("fliip-booker: class registration problems\n{}", failure_summary(report)),
            "report": report,
        });
        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("Webhook returned {}", response.status()));
        }
        info!("Failure report sent to webhook");
        Ok(())
    }
}

/// Reporters enabled by the configuration. The log reporter is always on.
pub fn build_reporters(config: &Config, paths: &PathManager) -> Vec<Box<dyn OutcomeReporter>> {
    let mut reporters: Vec<Box<dyn OutcomeReporter>> = vec![Box::new(LogReporter)];

    let report_dir = config.notify.report_dir.clone().unwrap_or_else(|| paths.reports_dir());
    reporters.push(Box::new(ReportFileWriter::new(report_dir)));

    if let Some(url) = config.notify.webhook_url.as_ref().filter(|u| !u.trim().is_empty()) {
        reporters.push(Box::new(WebhookReporter::new(url.clone())));
    }
    reporters
}

/// Hand the report to every reporter. A failing reporter is logged and does
/// not stop the others.
pub async fn notify_all(reporters: &[Box<dyn OutcomeReporter>], report: &RunReport) {
    for reporter in reporters {
        if let Err(e) = reporter.report(report).await {
            warn!(reporter = reporter.name(), "Failed to report run outcome: {}", e);
        }
    }
}

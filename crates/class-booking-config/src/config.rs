use class_booking_models::{ClassSlot, parse_weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const HOURS_PER_WEEK: usize = 168;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("portal.gym is required (the subdomain of <gym>.fliipapp.com)")]
    MissingGym,
    #[error("no classes configured; add at least one weekday under [classes]")]
    NoClasses,
    #[error("invalid weekday name in [classes]: '{0}'")]
    InvalidWeekday(String),
    #[error("invalid hour {hour} for {weekday} (expected 0-23)")]
    InvalidHour { weekday: String, hour: u8 },
    #[error("invalid [booking] option: {0}")]
    InvalidBooking(String),
    #[error("missing Fliip {0}; set FLIIP_{1} or configure it with `fliip-booker config`")]
    MissingCredential(&'static str, &'static str),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub portal: PortalConfig,
    #[serde(default)]
    pub booking: BookingOptions,
    /// Weekday name → hours to register ("Monday" = [12, 19])
    #[serde(default)]
    pub classes: BTreeMap<String, Vec<u8>>,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
    #[serde(default)]
    pub debug: DebugSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PortalConfig {
    pub gym: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_true")]
    pub headless: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeekOrder {
    /// Start on the current week and page forward
    #[default]
    NearestFirst,
    /// Page forward to the last week first, then walk back
    FarthestFirst,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingOptions {
    #[serde(default = "default_lookahead_hours")]
    pub lookahead_hours: u32,
    /// Calendar weeks to visit; when unset, enough to cover the lookahead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_weeks: Option<usize>,
    #[serde(default)]
    pub week_order: WeekOrder,
    #[serde(default = "default_ui_timeout_seconds")]
    pub ui_timeout_seconds: u64,
    /// Sleep up to this long for a registration window to open (0 disables)
    #[serde(default)]
    pub opening_wait_minutes: u32,
}

impl Default for BookingOptions {
    fn default() -> Self {
        Self {
            lookahead_hours: default_lookahead_hours(),
            max_weeks: None,
            week_order: WeekOrder::default(),
            ui_timeout_seconds: default_ui_timeout_seconds(),
            opening_wait_minutes: 0,
        }
    }
}

impl BookingOptions {
    pub fn lookahead(&self) -> chrono::Duration {
        chrono::Duration::hours(self.lookahead_hours as i64)
    }

    /// Week pages a run visits. Week `k` shows the week holding today + 7k
    /// days, so reaching the last bookable day takes `ceil(lookahead / 1 week)`
    /// moves past the current week.
    pub fn weeks(&self) -> usize {
        self.max_weeks
            .unwrap_or_else(|| (self.lookahead_hours as usize).div_ceil(HOURS_PER_WEEK) + 1)
    }

    pub fn ui_timeout(&self) -> Duration {
        Duration::from_secs(self.ui_timeout_seconds)
    }

    pub fn opening_wait(&self) -> Option<chrono::Duration> {
        if self.opening_wait_minutes == 0 {
            None
        } else {
            Some(chrono::Duration::minutes(self.opening_wait_minutes as i64))
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct NotifyConfig {
    /// Failure reports are POSTed here as JSON
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Where JSON failure reports are written (defaults to <data>/reports)
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchedulerConfig {
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DebugSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

fn default_lookahead_hours() -> u32 {
    336 // two weeks
}

fn default_ui_timeout_seconds() -> u64 {
    5
}

fn default_schedule() -> String {
    "0 0 12 * * *".to_string() // Every day at noon (sec min hour dom mon dow)
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        schedule: default_schedule(),
        run_on_startup: default_true(),
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Starter config: weekday noon classes at the given gym
    pub fn default_template(gym: &str) -> Self {
        let mut classes = BTreeMap::new();
        for day in ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"] {
            classes.insert(day.to_string(), vec![12]);
        }
        Self {
            portal: PortalConfig {
                gym: gym.to_string(),
                username: None,
                language: default_language(),
                headless: true,
            },
            booking: BookingOptions::default(),
            classes,
            notify: NotifyConfig::default(),
            scheduler: Some(default_scheduler_config()),
            debug: DebugSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.portal.gym.trim().is_empty() {
            return Err(ConfigError::MissingGym);
        }
        if self.booking.lookahead_hours == 0 {
            return Err(ConfigError::InvalidBooking("lookahead_hours must be positive".to_string()));
        }
        if self.booking.max_weeks == Some(0) {
            return Err(ConfigError::InvalidBooking("max_weeks must be at least 1".to_string()));
        }
        if self.booking.ui_timeout_seconds == 0 {
            return Err(ConfigError::InvalidBooking("ui_timeout_seconds must be positive".to_string()));
        }
        self.class_slots()?;
        Ok(())
    }

    /// Configured slots, Monday first and ordered by hour, without duplicates
    pub fn class_slots(&self) -> Result<Vec<ClassSlot>, ConfigError> {
        let mut slots = Vec::new();
        for (name, hours) in &self.classes {
            let weekday = parse_weekday(name)
                .ok_or_else(|| ConfigError::InvalidWeekday(name.clone()))?;
            for &hour in hours {
                let slot = ClassSlot::new(weekday, hour).ok_or_else(|| ConfigError::InvalidHour {
                    weekday: name.clone(),
                    hour,
                })?;
                slots.push(slot);
            }
        }
        slots.sort_by_key(|s| s.sort_key());
        slots.dedup();

        if slots.is_empty() {
            return Err(ConfigError::NoClasses);
        }
        Ok(slots)
    }

    pub fn login_url(&self) -> String {
        format!("https://{}.fliipapp.com/home/login", self.portal.gym.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[portal]
gym = "crossfitahuntsic"
username = "me@example.com"

[booking]
lookahead_hours = 168
week_order = "farthest_first"

[classes]
Monday = [19]
tuesday = [12, 7]
"#;

    #[test]
    fn test_config_parses_with_defaults() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.portal.language, "en");
        assert!(config.portal.headless);
        assert_eq!(config.booking.lookahead_hours, 168);
        assert_eq!(config.booking.max_weeks, None);
        assert_eq!(config.booking.weeks(), 2);
        assert_eq!(config.booking.week_order, WeekOrder::FarthestFirst);
        assert_eq!(config.booking.ui_timeout(), Duration::from_secs(5));
        assert_eq!(config.booking.opening_wait(), None);
        assert!(config.scheduler.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_weeks_cover_the_lookahead() {
        let mut booking = BookingOptions::default();
        assert_eq!(booking.weeks(), 3);

        booking.lookahead_hours = 24;
        assert_eq!(booking.weeks(), 2);

        booking.max_weeks = Some(1);
        assert_eq!(booking.weeks(), 1);
    }

    #[test]
    fn test_class_slots_sorted() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let slots = config.class_slots().unwrap();
        let rendered: Vec<(Weekday, u8)> = slots.iter().map(|s| (s.weekday(), s.hour())).collect();
        assert_eq!(
            rendered,
            vec![(Weekday::Mon, 19), (Weekday::Tue, 7), (Weekday::Tue, 12)]
        );
    }

    #[test]
    fn test_validate_rejects_bad_classes() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.classes.insert("Caturday".to_string(), vec![12]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidWeekday("Caturday".to_string()))
        );

        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.classes.insert("Friday".to_string(), vec![24]);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHour { hour: 24, .. })));

        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.classes.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoClasses));
    }

    #[test]
    fn test_validate_rejects_bad_booking_options() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.booking.max_weeks = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBooking(_))));

        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.portal.gym = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingGym));
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let config = Config::default_template("mygym");
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.portal.gym, "mygym");
        assert_eq!(loaded.classes.len(), 5);
        assert_eq!(loaded.class_slots().unwrap().len(), 5);
        assert_eq!(loaded.login_url(), "https://mygym.fliipapp.com/home/login");
    }

    #[test]
    fn test_opening_wait() {
        let options = BookingOptions {
            opening_wait_minutes: 15,
            ..BookingOptions::default()
        };
        assert_eq!(options.opening_wait(), Some(chrono::Duration::minutes(15)));
        assert_eq!(options.lookahead(), chrono::Duration::hours(336));
    }
}

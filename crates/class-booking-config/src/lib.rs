pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{BookingOptions, Config, ConfigError, DebugSettings, NotifyConfig, PortalConfig, SchedulerConfig, WeekOrder, default_scheduler_config};
pub use credentials::{CredentialStore, Credentials, PASSWORD_ENV, USERNAME_ENV};
pub use paths::{PathManager, container_base_path};

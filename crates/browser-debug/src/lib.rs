pub mod config;
pub mod inspector;

pub use config::DebugConfig;
pub use inspector::{CaptureArtifacts, PageInspector};

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_true")]
    pub capture_screenshots: bool,

    #[serde(default = "default_true")]
    pub capture_html: bool,
}

fn default_enabled() -> bool {
    env::var("BROWSER_DEBUG")
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn default_output_dir() -> PathBuf {
    env::var("BROWSER_DEBUG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./browser_debug"))
}

fn choose_output_dir(env_dir: Option<PathBuf>, configured: Option<&Path>, fallback: &Path) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .or(env_dir)
        .unwrap_or_else(|| fallback.to_path_buf())
}

fn default_true() -> bool {
    true
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off")
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            output_dir: default_output_dir(),
            capture_screenshots: true,
            capture_html: true,
        }
    }
}

impl DebugConfig {
    /// Create a new DebugConfig from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Environment switches first, then the config file may turn capture on
    /// or move the output directory. `fallback_dir` is used only when neither
    /// `BROWSER_DEBUG_DIR` nor `output_dir` names a directory.
    pub fn from_settings(enabled: bool, output_dir: Option<&Path>, fallback_dir: &Path) -> Self {
        let mut config = Self::from_env();
        config.enabled |= enabled;
        config.output_dir = choose_output_dir(
            env::var("BROWSER_DEBUG_DIR").ok().map(PathBuf::from),
            output_dir,
            fallback_dir,
        );
        config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn test_settings_override_output_dir() {
        let config = DebugConfig::from_settings(true, Some(Path::new("/tmp/captures")), Path::new("/data/debug"));
        assert!(config.is_enabled());
        assert_eq!(config.output_dir(), Path::new("/tmp/captures"));
    }

    #[test]
    fn test_output_dir_precedence() {
        let fallback = Path::new("/data/debug");
        let env_dir = Some(PathBuf::from("/env/debug"));

        assert_eq!(choose_output_dir(env_dir.clone(), None, fallback), PathBuf::from("/env/debug"));
        assert_eq!(
            choose_output_dir(env_dir, Some(Path::new("/cfg/debug")), fallback),
            PathBuf::from("/cfg/debug")
        );
        assert_eq!(choose_output_dir(None, None, fallback), PathBuf::from("/data/debug"));
    }
}

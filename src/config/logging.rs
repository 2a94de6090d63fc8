use {
    crate::{Error, Result},
    serde::Deserialize,
};

///
/// Configuration for logging and tracing.
///
/// ```toml
/// [logging]
/// format = "json"
/// buffered_lines_limit = 128000
/// lossy = true
/// ```
///
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Format for log output.
    /// The default format is `default`, which is "full" human-readable format.
    /// Other options are `json`, `compact`, and `pretty`.
    #[serde(default)]
    pub format: LogFormat,

    /// Maximum number of log lines queued for the background writer when
    /// `http.enable_logger` is on.
    #[serde(default = "LoggingConfig::default_buffered_lines_limit")]
    pub buffered_lines_limit: usize,

    /// When the queue is full, drop new lines (true) or make the logging
    /// call wait for room (false).
    #[serde(default = "LoggingConfig::default_lossy")]
    pub lossy: bool,
}

impl LoggingConfig {
    fn default_buffered_lines_limit() -> usize {
        128_000
    }

    fn default_lossy() -> bool {
        true
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffered_lines_limit == 0 {
            return Err(Error::invalid_input(
                "logging buffered_lines_limit must be > 0. Set [logging] buffered_lines_limit = 128000 in config.",
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            buffered_lines_limit: Self::default_buffered_lines_limit(),
            lossy: Self::default_lossy(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Default,
    Compact,
    Pretty,
}

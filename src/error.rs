use core::fmt;

/// Configuration contract violations, raised synchronously at the call
/// that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The garbage collection period must be at least 1 interaction.
    ZeroGcPeriod,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroGcPeriod => {
                f.write_str("garbage collection period must be greater than 0")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

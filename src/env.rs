//! Environment-based configuration.
//!
//! Every setting has a typed accessor implementing [`EnvVar`], so parsing and
//! validation live next to the variable's name and description. Invalid values
//! never abort anything: [`EnvConfig::from_env`] logs them and falls back to the
//! variable's default, or leaves the setting unset when it has none.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::utils::is_valid_class_prefix;

/// Environment variable parse error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// Typed accessor for one environment variable
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::DEFAULT.ok_or_else(|| EnvError {
                variable: Self::NAME.to_string(),
                message: "Required environment variable not set".to_string(),
            }),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// Process-level settings
pub mod core {
    use super::*;

    /// Log level
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "TRANSAMP_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("warn".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// Rewrite engine settings
pub mod engine {
    use super::*;

    /// Prefix for generated style classes
    pub struct ClassPrefix;
    impl EnvVar<String> for ClassPrefix {
        const NAME: &'static str = "TRANSAMP_CLASS_PREFIX";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str =
            "Prefix for generated style classes (lowercase letter first; no amp- prefix)";

        fn parse(value: &str) -> EnvResult<String> {
            let prefix = value.trim().to_lowercase();
            if is_valid_class_prefix(&prefix) {
                Ok(prefix)
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid class prefix '{}'", value),
                })
            }
        }
    }

    /// Default child-removal policy
    pub struct RemoveChildren;
    impl EnvVar<bool> for RemoveChildren {
        const NAME: &'static str = "TRANSAMP_REMOVE_CHILDREN";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Remove the children of removed elements by default";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// Tags whose children always survive removal
    pub struct KeepChildrenTags;
    impl EnvVar<Vec<String>> for KeepChildrenTags {
        const NAME: &'static str = "TRANSAMP_KEEP_CHILDREN_TAGS";
        const DEFAULT: Option<Vec<String>> = None;
        const DESCRIPTION: &'static str =
            "Comma-separated tags whose children are kept when the tag is removed";

        fn parse(value: &str) -> EnvResult<Vec<String>> {
            Ok(parse_tag_list(value))
        }
    }

    /// Tags whose children are always removed with them
    pub struct RemoveChildrenTags;
    impl EnvVar<Vec<String>> for RemoveChildrenTags {
        const NAME: &'static str = "TRANSAMP_REMOVE_CHILDREN_TAGS";
        const DEFAULT: Option<Vec<String>> = None;
        const DESCRIPTION: &'static str =
            "Comma-separated tags whose children are removed with the tag";

        fn parse(value: &str) -> EnvResult<Vec<String>> {
            Ok(parse_tag_list(value))
        }
    }
}

/// Dimension probing settings
pub mod probe {
    use super::*;

    /// Dimension cache switch
    pub struct CacheDimensions;
    impl EnvVar<bool> for CacheDimensions {
        const NAME: &'static str = "TRANSAMP_CACHE_DIMENSIONS";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Cache probed image dimensions across translations";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// Per-request timeout
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "TRANSAMP_PROBE_TIMEOUT";
        const DEFAULT: Option<Duration> = Some(Duration::from_secs(30));
        const DESCRIPTION: &'static str = "Image probe request timeout in seconds (1-600)";

        fn parse(value: &str) -> EnvResult<Duration> {
            let seconds = parse_positive_usize(value.trim(), Self::NAME, 1, 600)?;
            Ok(Duration::from_secs(seconds as u64))
        }
    }

    /// User agent sent by the probe
    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "TRANSAMP_USER_AGENT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "User-Agent header sent when probing images";

        fn parse(value: &str) -> EnvResult<String> {
            let user_agent = value.trim();
            if user_agent.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "User agent cannot be empty".to_string(),
                });
            }
            Ok(user_agent.to_string())
        }
    }
}

fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

fn parse_tag_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Reads a variable that is only applied when set; bad values are logged and skipped
fn read_optional<T, V: EnvVar<T>>() -> Option<T> {
    let value = env::var(V::NAME).ok()?;
    match V::parse(&value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("{}; ignoring", e);
            None
        }
    }
}

/// Settings found in the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub log_level: String,

    pub class_prefix: Option<String>,
    pub remove_children: Option<bool>,
    pub keep_children_tags: Option<Vec<String>>,
    pub remove_children_tags: Option<Vec<String>>,

    pub cache_dimensions: Option<bool>,
    pub probe_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl EnvConfig {
    /// Loads every variable; unset or invalid ones take their default, if any
    pub fn from_env() -> Self {
        Self {
            log_level: core::LogLevel::get().unwrap_or_else(|e| {
                tracing::warn!("{}; ignoring", e);
                "warn".to_string()
            }),

            class_prefix: read_optional::<_, engine::ClassPrefix>(),
            remove_children: read_optional::<_, engine::RemoveChildren>(),
            keep_children_tags: read_optional::<_, engine::KeepChildrenTags>(),
            remove_children_tags: read_optional::<_, engine::RemoveChildrenTags>(),

            cache_dimensions: read_optional::<_, probe::CacheDimensions>(),
            probe_timeout: read_optional::<_, probe::Timeout>().or(probe::Timeout::DEFAULT),
            user_agent: read_optional::<_, probe::UserAgent>(),
        }
    }
}

fn doc_line(name: &str, description: &str, default: &str) -> String {
    format!("- `{}`: {} (default: {})\n", name, description, default)
}

fn seconds(duration: Option<Duration>) -> String {
    duration.map_or_else(|| "none".to_string(), |d| d.as_secs().to_string())
}

/// Renders the list of recognized variables as Markdown
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    docs.push_str("## Core\n\n");
    docs.push_str(&doc_line(
        core::LogLevel::NAME,
        core::LogLevel::DESCRIPTION,
        "warn",
    ));

    docs.push_str("\n## Rewrite engine\n\n");
    docs.push_str(&doc_line(
        engine::ClassPrefix::NAME,
        engine::ClassPrefix::DESCRIPTION,
        crate::core::DEFAULT_CLASS_PREFIX,
    ));
    docs.push_str(&doc_line(
        engine::RemoveChildren::NAME,
        engine::RemoveChildren::DESCRIPTION,
        "true",
    ));
    docs.push_str(&doc_line(
        engine::KeepChildrenTags::NAME,
        engine::KeepChildrenTags::DESCRIPTION,
        "none",
    ));
    docs.push_str(&doc_line(
        engine::RemoveChildrenTags::NAME,
        engine::RemoveChildrenTags::DESCRIPTION,
        "none",
    ));

    docs.push_str("\n## Image probing\n\n");
    docs.push_str(&doc_line(
        probe::CacheDimensions::NAME,
        probe::CacheDimensions::DESCRIPTION,
        "true",
    ));
    docs.push_str(&doc_line(
        probe::Timeout::NAME,
        probe::Timeout::DESCRIPTION,
        &seconds(probe::Timeout::DEFAULT),
    ));
    docs.push_str(&doc_line(
        probe::UserAgent::NAME,
        probe::UserAgent::DESCRIPTION,
        crate::core::DEFAULT_USER_AGENT,
    ));

    docs
}

use annot_core::Result;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration for an annotation tracker.
///
/// Hosts usually pass this as part of their editor settings. All fields use
/// sensible defaults if not specified.
///
/// # Examples
///
/// ```
/// use annot_tracker::config::TrackerConfig;
///
/// let json = r#"{
///     "throttle": { "delay_ms": 50 },
///     "markers": { "active_attribute": "data-active" }
/// }"#;
///
/// let config = TrackerConfig::from_json(json).unwrap();
/// assert_eq!(config.throttle.delay_ms, 50);
/// assert_eq!(config.markers.active_attribute, "data-active");
/// assert_eq!(config.markers.active_value, "true");
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TrackerConfig {
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub markers: MarkerConfig,
}

impl TrackerConfig {
    /// Parses a configuration from JSON, filling in defaults.
    ///
    /// # Errors
    ///
    /// Returns `AnnotateError::Config` if the JSON is malformed or a field
    /// has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Configuration for the scan throttle.
///
/// Bursts of node-change events arriving within `delay_ms` of each other
/// collapse into one scan, run `delay_ms` after the last event.
///
/// # Defaults
///
/// - `delay_ms`: `30`
///
/// Values above `1000` are clamped with a warning: a longer window makes the
/// active highlight visibly lag behind the caret.
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    #[serde(
        default = "default_delay_ms",
        deserialize_with = "deserialize_delay_ms"
    )]
    pub delay_ms: u64,
}

impl ThrottleConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}

/// Configuration for the active marker attribute.
///
/// # Defaults
///
/// - `active_attribute`: `"data-annotation-active"`
/// - `active_value`: `"true"`
///
/// # Examples
///
/// ```
/// use annot_tracker::config::MarkerConfig;
///
/// let config = MarkerConfig {
///     active_attribute: "aria-current".into(),
///     active_value: "location".into(),
/// };
///
/// assert_eq!(config.active_attribute, "aria-current");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MarkerConfig {
    #[serde(default = "default_active_attribute")]
    pub active_attribute: String,
    #[serde(default = "default_active_value")]
    pub active_value: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            active_attribute: default_active_attribute(),
            active_value: default_active_value(),
        }
    }
}

// Default value functions
const fn default_delay_ms() -> u64 {
    30
}

fn default_active_attribute() -> String {
    "data-annotation-active".to_string()
}

fn default_active_value() -> String {
    "true".to_string()
}

/// Upper bound for the throttle window.
pub const MAX_THROTTLE_DELAY_MS: u64 = 1000;

fn validate_delay_ms(delay_ms: u64) -> u64 {
    if delay_ms > MAX_THROTTLE_DELAY_MS {
        tracing::warn!(
            "throttle delay_ms exceeded max of {}ms, clamping from {}",
            MAX_THROTTLE_DELAY_MS,
            delay_ms
        );
        MAX_THROTTLE_DELAY_MS
    } else {
        delay_ms
    }
}

fn deserialize_delay_ms<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let delay_ms = u64::deserialize(deserializer)?;
    Ok(validate_delay_ms(delay_ms))
}

//! Scheduler configuration
//!
//! Process-wide defaults, overridable per call. A config is validated once at
//! the boundary; the transition function trusts what it is handed.

use serde::{Deserialize, Serialize};

use super::algorithm::EASE_FACTOR_CEILING;

/// Invalid scheduler configuration
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Ease floor is higher than the starting ease
    #[error("Ease factor floor {floor} is above the starting ease factor {start}")]
    FloorAboveStart { floor: f64, start: f64 },
    /// Starting ease or floor exceeds the hard ceiling
    #[error("Ease factor {value} is above the ceiling of {}", EASE_FACTOR_CEILING)]
    AboveCeiling { value: f64 },
    /// A learning step is negative or not finite
    #[error("Learning step {index} has invalid duration {minutes} minutes")]
    InvalidStep { index: usize, minutes: f64 },
    /// Any other out-of-range or unparseable value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    /// Config document could not be parsed
    #[error("Config parse error: {0}")]
    Parse(String),
}

/// Scheduling parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    /// Ease factor assigned to a freshly created item
    pub ease_factor_start: f64,
    /// Lowest ease factor any transition may produce
    pub ease_factor_floor: f64,
    /// Learning steps in minutes: [first step, second step]
    pub learning_steps_minutes: [f64; 2],
    /// Interval after graduating from the learning phase
    pub graduating_interval_days: f64,
    /// Added to the ease factor on a lapse (negative)
    pub lapse_penalty: f64,
    /// Lapse count at which an item becomes a leech (inclusive)
    pub leech_threshold: u32,
}

/// Default scheduling parameters
pub const DEFAULT_CONFIG: SchedulerConfig = SchedulerConfig {
    ease_factor_start: 2.5,
    ease_factor_floor: 1.3,
    learning_steps_minutes: [1.0, 10.0],
    graduating_interval_days: 1.0,
    lapse_penalty: -0.2,
    leech_threshold: 8,
};

impl Default for SchedulerConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

impl SchedulerConfig {
    /// First learning step (used after a lapse)
    pub fn first_step_minutes(&self) -> f64 {
        self.learning_steps_minutes[0]
    }

    /// Second learning step (used for `hard` while learning)
    pub fn second_step_minutes(&self) -> f64 {
        self.learning_steps_minutes[1]
    }

    /// Check the configuration for values that would break scheduling invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_finite("easeFactorStart", self.ease_factor_start)?;
        check_finite("easeFactorFloor", self.ease_factor_floor)?;
        check_finite("graduatingIntervalDays", self.graduating_interval_days)?;
        check_finite("lapsePenalty", self.lapse_penalty)?;

        if self.ease_factor_floor <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "easeFactorFloor",
                value: self.ease_factor_floor.to_string(),
            });
        }
        if self.ease_factor_floor > self.ease_factor_start {
            return Err(ConfigError::FloorAboveStart {
                floor: self.ease_factor_floor,
                start: self.ease_factor_start,
            });
        }
        if self.ease_factor_start > EASE_FACTOR_CEILING {
            return Err(ConfigError::AboveCeiling {
                value: self.ease_factor_start,
            });
        }
        for (index, minutes) in self.learning_steps_minutes.iter().copied().enumerate() {
            if !minutes.is_finite() || minutes < 0.0 {
                return Err(ConfigError::InvalidStep { index, minutes });
            }
        }
        if self.graduating_interval_days < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "graduatingIntervalDays",
                value: self.graduating_interval_days.to_string(),
            });
        }
        // A positive penalty would let repeated lapses climb past the ceiling
        if self.lapse_penalty > 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "lapsePenalty",
                value: self.lapse_penalty.to_string(),
            });
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON config; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `CADENCE_*` environment overrides
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Recognized keys: `CADENCE_EASE_START`, `CADENCE_EASE_FLOOR`,
    /// `CADENCE_LEARNING_STEPS` (`"1,10"`), `CADENCE_GRADUATING_INTERVAL`,
    /// `CADENCE_LAPSE_PENALTY`, `CADENCE_LEECH_THRESHOLD`.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CADENCE_EASE_START") {
            self.ease_factor_start = parse_f64("CADENCE_EASE_START", &v)?;
        }
        if let Some(v) = lookup("CADENCE_EASE_FLOOR") {
            self.ease_factor_floor = parse_f64("CADENCE_EASE_FLOOR", &v)?;
        }
        if let Some(v) = lookup("CADENCE_LEARNING_STEPS") {
            let steps: Vec<&str> = v.split(',').map(str::trim).collect();
            if steps.len() != 2 {
                return Err(ConfigError::InvalidValue {
                    field: "CADENCE_LEARNING_STEPS",
                    value: v.clone(),
                });
            }
            self.learning_steps_minutes = [
                parse_f64("CADENCE_LEARNING_STEPS", steps[0])?,
                parse_f64("CADENCE_LEARNING_STEPS", steps[1])?,
            ];
        }
        if let Some(v) = lookup("CADENCE_GRADUATING_INTERVAL") {
            self.graduating_interval_days = parse_f64("CADENCE_GRADUATING_INTERVAL", &v)?;
        }
        if let Some(v) = lookup("CADENCE_LAPSE_PENALTY") {
            self.lapse_penalty = parse_f64("CADENCE_LAPSE_PENALTY", &v)?;
        }
        if let Some(v) = lookup("CADENCE_LEECH_THRESHOLD") {
            self.leech_threshold =
                v.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: "CADENCE_LEECH_THRESHOLD",
                        value: v.clone(),
                    })?;
        }
        Ok(self)
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            value: value.to_string(),
        })
    }
}

fn parse_f64(field: &'static str, raw: &str) -> Result<f64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field,
        value: raw.to_string(),
    })
}

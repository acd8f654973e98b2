//! Hyperparameters for [`LinearModel::fit`](crate::regression::LinearModel::fit).
//!
//! Defaults can be overridden with `SCALARGRAD_*` environment variables, see
//! [`FitConfig::from_env`].

use thiserror::Error;

pub const ENV_PREFIX: &str = "SCALARGRAD_";
pub const ENV_LEARNING_RATE: &str = "LEARNING_RATE";
pub const ENV_MAX_ITERS: &str = "MAX_ITERS";
pub const ENV_TOLERANCE: &str = "TOLERANCE";
pub const ENV_INIT_INTERCEPT: &str = "INIT_INTERCEPT";
pub const ENV_INIT_SLOPE: &str = "INIT_SLOPE";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("config validation: {0}")]
    Validation(String),
    #[error("env var {key}: {message}")]
    EnvVar { key: String, message: String },
    #[error("env var {key}={value:?}: {message}")]
    Parse {
        key: String,
        value: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub learning_rate: f64,
    pub max_iters: usize,
    /// Stop once an iteration improves the loss by less than this.
    pub tolerance: f64,
    pub init_intercept: f64,
    pub init_slope: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            max_iters: 10_000,
            tolerance: 1e-12,
            init_intercept: 2.,
            init_slope: 4.,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.) {
            return Err(ConfigError::Validation(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        if self.max_iters == 0 {
            return Err(ConfigError::Validation(
                "max_iters must be at least 1".into(),
            ));
        }
        if self.tolerance.is_nan() || self.tolerance < 0. {
            return Err(ConfigError::Validation(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        if !self.init_intercept.is_finite() || !self.init_slope.is_finite() {
            return Err(ConfigError::Validation(
                "initial coefficients must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Defaults overridden by any `SCALARGRAD_*` variable that is set, then validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        let config = Self {
            learning_rate: env_parsed(ENV_LEARNING_RATE)?.unwrap_or(default.learning_rate),
            max_iters: env_parsed(ENV_MAX_ITERS)?.unwrap_or(default.max_iters),
            tolerance: env_parsed(ENV_TOLERANCE)?.unwrap_or(default.tolerance),
            init_intercept: env_parsed(ENV_INIT_INTERCEPT)?.unwrap_or(default.init_intercept),
            init_slope: env_parsed(ENV_INIT_SLOPE)?.unwrap_or(default.init_slope),
        };
        config.validate()?;
        Ok(config)
    }
}

pub fn env_key(suffix: &str) -> String {
    format!("{ENV_PREFIX}{suffix}")
}

/// `Ok(None)` if the variable is unset, an error if it is set but does not parse.
fn env_parsed<T>(suffix: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let key = env_key(suffix);
    let raw = match std::env::var(&key) {
        Ok(raw) => raw,
        Err(std::env::VarError::NotPresent) => return Ok(None),
        Err(e) => {
            return Err(ConfigError::EnvVar {
                key,
                message: e.to_string(),
            })
        }
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Parse {
            key,
            value: raw.clone(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(FitConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let config = FitConfig {
            learning_rate: 0.,
            ..FitConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));

        let config = FitConfig {
            tolerance: f64::NAN,
            ..FitConfig::default()
        };
        assert!(config.validate().is_err());

        let config = FitConfig {
            max_iters: 0,
            ..FitConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides() {
        std::env::set_var(env_key(ENV_INIT_SLOPE), " 1.25 ");
        std::env::set_var(env_key(ENV_MAX_ITERS), "not a number");
        let parsed = env_parsed::<f64>(ENV_INIT_SLOPE);
        let bad = env_parsed::<usize>(ENV_MAX_ITERS);
        std::env::remove_var(env_key(ENV_INIT_SLOPE));
        std::env::remove_var(env_key(ENV_MAX_ITERS));

        assert_eq!(parsed, Ok(Some(1.25)));
        assert!(matches!(bad, Err(ConfigError::Parse { .. })));
        assert_eq!(env_parsed::<f64>(ENV_TOLERANCE), Ok(None));
    }
}

use crate::{env_or_default, ConfigError, FromEnv};
use std::str::FromStr;

/// Eligibility thresholds applied when registering a user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationPolicy {
    /// Minimum age in whole years on the day of registration
    pub minimum_age: u32,
    /// Lowest acceptable credit limit for users that have one
    pub credit_limit_floor: i32,
}

impl RegistrationPolicy {
    pub const DEFAULT_MINIMUM_AGE: u32 = 21;
    pub const DEFAULT_CREDIT_LIMIT_FLOOR: i32 = 500;

    pub fn new(minimum_age: u32, credit_limit_floor: i32) -> Self {
        Self {
            minimum_age,
            credit_limit_floor,
        }
    }
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MINIMUM_AGE, Self::DEFAULT_CREDIT_LIMIT_FLOOR)
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + ToString,
    T::Err: std::fmt::Display,
{
    env_or_default(key, &default.to_string())
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        })
}

impl FromEnv for RegistrationPolicy {
    /// Reads from environment variables:
    /// - REGISTRATION_MINIMUM_AGE: defaults to 21
    /// - REGISTRATION_CREDIT_LIMIT_FLOOR: defaults to 500
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            minimum_age: parse_var("REGISTRATION_MINIMUM_AGE", Self::DEFAULT_MINIMUM_AGE)?,
            credit_limit_floor: parse_var(
                "REGISTRATION_CREDIT_LIMIT_FLOOR",
                Self::DEFAULT_CREDIT_LIMIT_FLOOR,
            )?,
        })
    }
}

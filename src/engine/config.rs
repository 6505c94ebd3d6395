use crate::core::fixed::Wad;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A configuration value was rejected at the boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("issuance ratio {0} is outside [0, 1]")]
    IssuanceRatioOutOfRange(Wad),
    #[error("fee period duration {0} is outside [1 day, 26 weeks]")]
    FeePeriodOutOfRange(Duration),
}

/// Engine-wide configuration, validated on every write.
///
/// The issuance ratio is the fraction of collateral value an authorized
/// issuer may mint as debt (the inverse of the minimum collateralization
/// ratio). Zero is a legal setting and means no issuance is possible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    issuance_ratio: Wad,
    #[serde(with = "duration_seconds")]
    fee_period_duration: Duration,
}

mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(d.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::seconds(i64::deserialize(deserializer)?))
    }
}

impl EngineConfig {
    /// Shortest permitted fee period.
    pub fn min_fee_period() -> Duration {
        Duration::days(1)
    }

    /// Longest permitted fee period.
    pub fn max_fee_period() -> Duration {
        Duration::weeks(26)
    }

    pub fn issuance_ratio(&self) -> Wad {
        self.issuance_ratio
    }

    pub fn fee_period_duration(&self) -> Duration {
        self.fee_period_duration
    }

    /// Set the issuance ratio; must lie in `[0, 1]`.
    pub fn set_issuance_ratio(&mut self, ratio: Wad) -> Result<(), ConfigError> {
        if ratio > Wad::ONE {
            return Err(ConfigError::IssuanceRatioOutOfRange(ratio));
        }
        self.issuance_ratio = ratio;
        Ok(())
    }

    /// Set the fee period duration; must lie in `[1 day, 26 weeks]`.
    pub fn set_fee_period_duration(&mut self, duration: Duration) -> Result<(), ConfigError> {
        if duration < Self::min_fee_period() || duration > Self::max_fee_period() {
            return Err(ConfigError::FeePeriodOutOfRange(duration));
        }
        self.fee_period_duration = duration;
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // One fifth of collateral value may be issued as debt.
            issuance_ratio: Wad::from_raw(Wad::UNIT / 5),
            fee_period_duration: Duration::weeks(4),
        }
    }
}

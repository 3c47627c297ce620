//! Match configuration, validation, and error types.
//!
//! [`MatchConfig`] is the input for constructing a match. It can be
//! built in code (all fields are public and [`Default`] gives the
//! reference rules) or loaded from TOML with
//! [`from_toml_str`](MatchConfig::from_toml_str). Every constructor calls
//! [`validate()`](MatchConfig::validate) before touching the grid.

use std::error::Error;
use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use serde::Deserialize;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while loading or validating a [`MatchConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// tick_rate_hz is NaN, infinite, not positive, or so low that one
    /// tick would take longer than [`MatchConfig::MAX_TICK_PERIOD`].
    InvalidTickRate {
        /// The invalid value.
        value: f64,
    },
    /// The stronghold garrison range is empty.
    InvalidStrongholdRange {
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
    /// spawn_army is zero; a fresh home must hold at least one unit.
    ZeroSpawnArmy,
    /// bonus_interval is zero.
    ZeroBonusInterval,
    /// The TOML source could not be parsed.
    Parse {
        /// Parser message.
        reason: String,
    },
    /// The tick thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTickRate { value } => {
                write!(
                    f,
                    "tick_rate_hz must be finite, positive, and at least one tick per {}s, got {value}",
                    MatchConfig::MAX_TICK_PERIOD.as_secs()
                )
            }
            Self::InvalidStrongholdRange { min, max } => {
                write!(
                    f,
                    "stronghold_army_min ({min}) exceeds stronghold_army_max ({max})"
                )
            }
            Self::ZeroSpawnArmy => write!(f, "spawn_army must be at least 1"),
            Self::ZeroBonusInterval => write!(f, "bonus_interval must be at least 1"),
            Self::Parse { reason } => write!(f, "config parse error: {reason}"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── MatchConfig ────────────────────────────────────────────────────

/// Complete rule and cadence configuration for one match.
///
/// # Examples
///
/// ```
/// use tilewar_engine::MatchConfig;
///
/// let config = MatchConfig::from_toml_str("seed = 7\ntick_rate_hz = 2.0").unwrap();
/// assert_eq!(config.seed, 7);
/// assert_eq!(config.bonus_interval, 25);
/// assert_eq!(config.tick_period().as_millis(), 500);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// RNG seed for stronghold garrisons and spawn selection. Default: 0.
    pub seed: u64,
    /// Ticks per second in realtime mode. Default: 1.0.
    pub tick_rate_hz: f64,
    /// Lowest initial garrison of an unclaimed stronghold. Default: 40.
    pub stronghold_army_min: u32,
    /// Highest initial garrison of an unclaimed stronghold. Default: 50.
    pub stronghold_army_max: u32,
    /// Army placed on a freshly spawned home. Default: 1.
    pub spawn_army: u32,
    /// Every tick divisible by this gives every owned cell one extra
    /// unit. Default: 25.
    pub bonus_interval: u64,
    /// Also broadcast a snapshot after every immediately resolved move,
    /// not only once per tick and after joins. Default: false.
    pub broadcast_on_move: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_rate_hz: 1.0,
            stronghold_army_min: 40,
            stronghold_army_max: 50,
            spawn_army: 1,
            bonus_interval: 25,
            broadcast_on_move: false,
        }
    }
}

impl MatchConfig {
    /// Longest accepted tick period (one day).
    pub const MAX_TICK_PERIOD: Duration = Duration::from_secs(86_400);

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let hz = self.tick_rate_hz;
        let period_ok = hz.is_finite()
            && hz > 0.0
            && Duration::try_from_secs_f64(1.0 / hz).is_ok_and(|p| p <= Self::MAX_TICK_PERIOD);
        if !period_ok {
            return Err(ConfigError::InvalidTickRate { value: hz });
        }
        if self.stronghold_army_min > self.stronghold_army_max {
            return Err(ConfigError::InvalidStrongholdRange {
                min: self.stronghold_army_min,
                max: self.stronghold_army_max,
            });
        }
        if self.spawn_army == 0 {
            return Err(ConfigError::ZeroSpawnArmy);
        }
        if self.bonus_interval == 0 {
            return Err(ConfigError::ZeroBonusInterval);
        }
        Ok(())
    }

    /// Wall-clock time between ticks in realtime mode.
    ///
    /// Never longer than [`MAX_TICK_PERIOD`](Self::MAX_TICK_PERIOD); an
    /// unvalidated rate that has no usable period maps to that bound.
    pub fn tick_period(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.tick_rate_hz)
            .map_or(Self::MAX_TICK_PERIOD, |p| p.min(Self::MAX_TICK_PERIOD))
    }

    /// Inclusive range of initial stronghold garrisons.
    pub fn stronghold_army(&self) -> RangeInclusive<u32> {
        self.stronghold_army_min..=self.stronghold_army_max
    }
}

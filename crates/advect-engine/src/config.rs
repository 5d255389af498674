//! Run configuration, validation, and error types.
//!
//! [`AdvectConfig`] is the builder-input for an
//! [`Advector`](crate::Advector). [`validate()`](AdvectConfig::validate)
//! checks every invariant once, before any particle moves.

use std::error::Error;
use std::fmt;

use advect_batch::{Device, MultiCore, Serial, Simt};
use advect_core::{Scalar, Vec3};

// ── DeviceKind ─────────────────────────────────────────────────────

/// Which backend runs the per-particle kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceKind {
    /// One thread, index order.
    #[default]
    Serial,
    /// Rayon work stealing, splitting down to `grain` lanes per task.
    MultiCore {
        /// Lanes per leaf task. Must be at least 1.
        grain: usize,
    },
    /// Fixed-width blocks, one task per block.
    Simt {
        /// Lanes per block. Must be at least 1.
        block_dim: usize,
    },
}

impl DeviceKind {
    /// Build the backend this kind describes.
    pub fn device(self) -> Device {
        match self {
            Self::Serial => Serial.into(),
            Self::MultiCore { grain } => MultiCore::new(grain).into(),
            Self::Simt { block_dim } => Simt::new(block_dim).into(),
        }
    }
}

// ── Bounds ─────────────────────────────────────────────────────────

/// Axis-aligned spatial domain. Particles stepping outside are marked as
/// having exited the spatial boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Lower corner (inclusive).
    pub min: Vec3,
    /// Upper corner (inclusive).
    pub max: Vec3,
}

impl Bounds {
    /// Box spanning `min..=max` on every axis.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Whether `p` lies inside the box, faces included.
    pub fn contains(&self, p: &Vec3) -> bool {
        (0..3).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }

    fn is_valid(&self) -> bool {
        (0..3).all(|i| {
            self.min[i].is_finite() && self.max[i].is_finite() && self.min[i] < self.max[i]
        })
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`AdvectConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `step_length` is NaN, infinite, zero, or negative.
    InvalidStepLength {
        /// The invalid value.
        value: Scalar,
    },
    /// `max_steps` is negative.
    NegativeMaxSteps {
        /// The invalid value.
        value: i64,
    },
    /// `max_rounds` is zero.
    ZeroRounds,
    /// The spatial bounds are empty, inverted, or not finite.
    InvalidBounds {
        /// The rejected box.
        bounds: Bounds,
    },
    /// `max_time` is NaN, zero, or negative.
    InvalidMaxTime {
        /// The invalid value.
        value: Scalar,
    },
    /// The device configuration is unusable.
    InvalidDevice {
        /// Description of the violated constraint.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStepLength { value } => {
                write!(f, "step_length must be finite and positive, got {value}")
            }
            Self::NegativeMaxSteps { value } => {
                write!(f, "max_steps must be non-negative, got {value}")
            }
            Self::ZeroRounds => write!(f, "max_rounds must be at least 1"),
            Self::InvalidBounds { bounds } => write!(
                f,
                "bounds must be finite with min < max on every axis, got min={:?} max={:?}",
                bounds.min.as_slice(),
                bounds.max.as_slice()
            ),
            Self::InvalidMaxTime { value } => {
                write!(f, "max_time must be positive, got {value}")
            }
            Self::InvalidDevice { reason } => write!(f, "invalid device: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── AdvectConfig ───────────────────────────────────────────────────

/// Complete configuration for an advection run.
#[derive(Clone, Debug, PartialEq)]
pub struct AdvectConfig {
    /// Integration step length `h`. Default: 0.01.
    pub step_length: Scalar,
    /// Step limit for batches built by the advector. Default: 1000.
    pub max_steps: i64,
    /// Upper bound on dispatch rounds per run. Default: 100 000.
    pub max_rounds: u64,
    /// Spatial domain; `None` disables the spatial check.
    pub bounds: Option<Bounds>,
    /// Temporal limit; particles whose time reaches it stop. `None`
    /// disables the temporal check.
    pub max_time: Option<Scalar>,
    /// Backend selection. Default: serial.
    pub device: DeviceKind,
}

impl Default for AdvectConfig {
    fn default() -> Self {
        Self {
            step_length: 0.01,
            max_steps: 1000,
            max_rounds: 100_000,
            bounds: None,
            max_time: None,
            device: DeviceKind::Serial,
        }
    }
}

impl AdvectConfig {
    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Step length finite and positive.
        if !self.step_length.is_finite() || self.step_length <= 0.0 {
            return Err(ConfigError::InvalidStepLength {
                value: self.step_length,
            });
        }
        // 2. Step limit non-negative.
        if self.max_steps < 0 {
            return Err(ConfigError::NegativeMaxSteps {
                value: self.max_steps,
            });
        }
        // 3. At least one round.
        if self.max_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        // 4. Non-empty finite box.
        if let Some(bounds) = self.bounds {
            if !bounds.is_valid() {
                return Err(ConfigError::InvalidBounds { bounds });
            }
        }
        // 5. Positive time limit (infinity allowed).
        if let Some(t) = self.max_time {
            if t.is_nan() || t <= 0.0 {
                return Err(ConfigError::InvalidMaxTime { value: t });
            }
        }
        // 6. Block and grain widths.
        match self.device {
            DeviceKind::MultiCore { grain: 0 } => {
                return Err(ConfigError::InvalidDevice {
                    reason: "multicore grain must be at least 1".to_string(),
                });
            }
            DeviceKind::Simt { block_dim: 0 } => {
                return Err(ConfigError::InvalidDevice {
                    reason: "simt block_dim must be at least 1".to_string(),
                });
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advect_batch::Backend;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(AdvectConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_step_length() {
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = AdvectConfig {
                step_length: value,
                ..Default::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidStepLength { .. })
            ));
        }
    }

    #[test]
    fn rejects_inverted_bounds() {
        let cfg = AdvectConfig {
            bounds: Some(Bounds::new(Vec3::repeat(1.0), Vec3::new(2.0, 0.5, 2.0))),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn rejects_zero_widths_and_limits() {
        let cfg = AdvectConfig {
            device: DeviceKind::Simt { block_dim: 0 },
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidDevice { .. })
        ));
        let cfg = AdvectConfig {
            max_rounds: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroRounds));
        let cfg = AdvectConfig {
            max_time: Some(0.0),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidMaxTime { .. })
        ));
        let cfg = AdvectConfig {
            max_steps: -2,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NegativeMaxSteps { value: -2 }));
    }

    #[test]
    fn bounds_include_faces() {
        let b = Bounds::new(Vec3::zeros(), Vec3::repeat(1.0));
        assert!(b.contains(&Vec3::new(0.0, 1.0, 0.5)));
        assert!(!b.contains(&Vec3::new(0.0, 1.0 + 1e-12, 0.5)));
    }

    #[test]
    fn device_kind_builds_matching_backend() {
        assert_eq!(DeviceKind::Serial.device().name(), "serial");
        assert_eq!(DeviceKind::MultiCore { grain: 8 }.device().name(), "multicore");
        assert_eq!(DeviceKind::Simt { block_dim: 32 }.device().name(), "simt");
    }
}

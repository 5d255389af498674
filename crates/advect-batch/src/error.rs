//! Batch construction errors.

use std::error::Error;
use std::fmt;

use advect_core::Scalar;

/// Errors raised while building or unpacking a particle batch.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchError {
    /// A per-particle buffer does not have one entry per particle.
    LengthMismatch {
        /// Name of the offending buffer.
        buffer: &'static str,
        /// Number of particles in the batch.
        expected: usize,
        /// Length of the offending buffer.
        found: usize,
    },
    /// The per-particle step limit is negative.
    NegativeMaxSteps {
        /// The rejected limit.
        max_steps: i64,
    },
    /// A particle starts with a negative step count.
    NegativeStepCount {
        /// Position of the particle in the batch.
        index: usize,
        /// The rejected count.
        steps: i64,
    },
    /// A charged particle's mass is zero, negative, or not finite.
    InvalidMass {
        /// Position of the particle in the batch.
        index: usize,
        /// The rejected mass.
        mass: Scalar,
    },
    /// Charged records were requested from a batch without momentum and
    /// species buffers.
    Uncharged,
    /// `particles × max_steps` history slots overflow `usize`.
    HistoryTooLarge {
        /// Number of particles.
        particles: usize,
        /// Slots per particle.
        max_steps: i64,
    },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch {
                buffer,
                expected,
                found,
            } => write!(
                f,
                "buffer '{buffer}' has {found} entries, batch has {expected} particles"
            ),
            Self::NegativeMaxSteps { max_steps } => {
                write!(f, "max_steps must be non-negative, got {max_steps}")
            }
            Self::NegativeStepCount { index, steps } => {
                write!(f, "particle {index} has negative step count {steps}")
            }
            Self::InvalidMass { index, mass } => {
                write!(f, "particle {index} has invalid mass {mass}")
            }
            Self::Uncharged => write!(f, "batch carries no momentum or species buffers"),
            Self::HistoryTooLarge {
                particles,
                max_steps,
            } => write!(
                f,
                "history of {particles} particles × {max_steps} steps overflows addressable memory"
            ),
        }
    }
}

impl Error for BatchError {}

//! Error types for per-particle integration.
//!
//! The status flags are the modelled failure domain for particles. The
//! errors here cover contract violations between the integrator and the
//! field sampler, which the stepper treats as fatal.

use std::error::Error;
use std::fmt;

/// Errors raised by the per-particle integration functions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// A field sample did not carry the number of vectors the particle
    /// variant requires (1 for tracers, exactly 2 for charged particles).
    SampleArity {
        /// Number of vectors the integrator needs.
        expected: usize,
        /// Number of vectors the sampler produced.
        found: usize,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SampleArity { expected, found } => {
                write!(
                    f,
                    "field sample arity mismatch: expected {expected} vector(s), got {found}"
                )
            }
        }
    }
}

impl Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_message_names_both_counts() {
        let e = CoreError::SampleArity {
            expected: 2,
            found: 1,
        };
        assert_eq!(
            e.to_string(),
            "field sample arity mismatch: expected 2 vector(s), got 1"
        );
    }
}

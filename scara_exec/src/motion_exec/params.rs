//! Parameters structure for MotionExec

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Timing and speed-envelope parameters for motion execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Inter-step delay at a speed factor of 1.0. The actual delay is this
    /// value divided by the effective speed factor.
    ///
    /// Units: milliseconds
    pub step_delay_base_ms: f64,

    /// Smallest speed factor the executor will honour; any commanded factor
    /// below it is replaced by this value.
    pub speed_factor_fallback: f64,

    /// Largest speed factor the executor will honour.
    pub speed_factor_max: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the parameters describe a usable speed envelope.
    pub fn validate(&self) -> Result<(), String> {
        if self.step_delay_base_ms <= 0.0 {
            return Err(format!(
                "step_delay_base_ms must be positive, found {}",
                self.step_delay_base_ms
            ));
        }
        if self.speed_factor_fallback <= 0.0 {
            return Err(format!(
                "speed_factor_fallback must be positive, found {}",
                self.speed_factor_fallback
            ));
        }
        if self.speed_factor_max < self.speed_factor_fallback {
            return Err(format!(
                "speed_factor_max ({}) must not be below speed_factor_fallback ({})",
                self.speed_factor_max, self.speed_factor_fallback
            ));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            step_delay_base_ms: 10.0,
            speed_factor_fallback: 0.1,
            speed_factor_max: 3.0,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_delay_rejected() {
        let params = Params {
            step_delay_base_ms: 0.0,
            ..Default::default()
        };

        assert!(params.validate().is_err());
    }

    #[test]
    fn test_inverted_speed_envelope_rejected() {
        let params = Params {
            speed_factor_fallback: 2.0,
            speed_factor_max: 1.0,
            ..Default::default()
        };

        assert!(params.validate().is_err());
    }
}

//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy,
{
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 1f64), (0f64, 90f64), 0f64), 0f64);
        assert_eq!(lin_map((0f64, 1f64), (0f64, 90f64), 0.5f64), 45f64);
        assert_eq!(lin_map((0f64, 1f64), (0f64, 90f64), 1f64), 90f64);
        assert_eq!(lin_map((0f64, 1f64), (10f64, 20f64), 0.5f64), 15f64);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5i16, 0i16, 10i16), 5i16);
        assert_eq!(clamp(-1i16, 0i16, 10i16), 0i16);
        assert_eq!(clamp(11i16, 0i16, 10i16), 10i16);
        assert_eq!(clamp(0.5f64, 0f64, 1f64), 0.5f64);
        assert_eq!(clamp(-0.1f64, 0f64, 1f64), 0f64);
    }
}

use crate::error::{ConfigError, Result};

/// Returns early with a [`ConfigError`] unless a numerical value lies in the interval `[a,b]`,
/// or `(a,b]` when written with a leading `>`
///
/// ### Example
/// ```ignore
/// let gamma = 2.0;
/// ensure_interval!(gamma, 0.0, 1.0);
/// ```
/// This returns `ConfigError::OutOfRange` naming \`gamma\` and the interval \[0, 1\].
macro_rules! ensure_interval {
    ($var:expr, > $a:expr, $b:expr) => {
        $crate::util::check_interval(stringify!($var), f64::from($var), $a, $b, true)?
    };
    ($var:expr, $a:expr, $b:expr) => {
        $crate::util::check_interval(stringify!($var), f64::from($var), $a, $b, false)?
    };
}

pub(crate) use ensure_interval;

pub(crate) fn check_interval(
    name: &'static str,
    value: f64,
    a: f64,
    b: f64,
    open_low: bool,
) -> Result<()> {
    if value.is_nan() {
        return Err(ConfigError::NotFinite { name, value });
    }
    let above = if open_low { value > a } else { value >= a };
    if above && value <= b {
        return Ok(());
    }
    let interval = if open_low {
        format!("({a}, {b}]")
    } else {
        format!("[{a}, {b}]")
    };
    log::warn!("rejecting `{name}` = {value}, expected {interval}");
    Err(ConfigError::OutOfRange {
        name,
        value,
        interval,
    })
}

/// Rejects NaN and infinities
pub(crate) fn ensure_finite(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        log::warn!("rejecting `{name}` = {value}, expected a finite number");
        Err(ConfigError::NotFinite {
            name,
            value: value.into(),
        })
    }
}

/// Round to a fixed number of decimal places
///
/// Values too large to scale without overflowing are returned unchanged.
pub(crate) fn round_to(value: f32, places: u32) -> f32 {
    let scale = 10f32.powi(i32::try_from(places).unwrap_or(i32::MAX));
    let scaled = value * scale;
    if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(x: f32) -> Result<()> {
        ensure_interval!(x, 0.0, 1.0);
        Ok(())
    }

    fn open_low(x: f32) -> Result<()> {
        ensure_interval!(x, > 0.0, 1.0);
        Ok(())
    }

    #[test]
    fn interval_bounds() {
        assert!(closed(0.0).is_ok(), "Closed interval admits its lower bound");
        assert!(closed(1.0).is_ok(), "Closed interval admits its upper bound");
        assert!(closed(1.5).is_err(), "Values above the interval are rejected");
        assert!(open_low(0.0).is_err(), "Open lower bound is excluded");
        assert!(open_low(0.5).is_ok());
        assert!(
            matches!(closed(f32::NAN), Err(ConfigError::NotFinite { .. })),
            "NaN is reported as non-finite"
        );
    }

    #[test]
    fn out_of_range_names_the_variable() {
        let err = closed(-1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for `x`: -1 is outside [0, 1]",
            "Error message carries the variable name"
        );
    }

    #[test]
    fn rounding_to_hundredths() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.005001, 2), -0.01);
        assert_eq!(round_to(2.0, 0), 2.0);
    }

    #[test]
    fn rounding_never_produces_nan() {
        assert_eq!(round_to(5.0, 38), 5.0, "Scaled value overflows, kept as is");
        assert_eq!(round_to(0.5, 40), 0.5, "Scale itself overflows");
        assert_eq!(round_to(-123.456, 60), -123.456);
    }
}

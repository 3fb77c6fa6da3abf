//! Value ranges of the numeric wire formats.

/// Inclusive range and step of a numeric format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    /// Smallest relative step used to move off an exclusive bound.
    pub epsilon: f64,
    /// Exact bounds of integral formats; `min`/`max` round at 64 bits.
    pub integer_bounds: Option<(i64, i64)>,
}

impl NumericRange {
    /// Whether `n` lies inside the range. `fits_i64` is false for integral
    /// input that overflowed `i64`, which no integral format accepts.
    pub fn contains(&self, n: f64, fits_i64: bool) -> bool {
        if self.integer_bounds.is_some() && !fits_i64 {
            return false;
        }
        n >= self.min && n <= self.max
    }

    /// Bounds as shown in messages.
    pub fn describe(&self) -> (String, String) {
        match self.integer_bounds {
            Some((min, max)) => (min.to_string(), max.to_string()),
            None => (format_bound(self.min), format_bound(self.max)),
        }
    }
}

pub const INT32: NumericRange = NumericRange {
    min: i32::MIN as f64,
    max: i32::MAX as f64,
    epsilon: 1.0,
    integer_bounds: Some((i32::MIN as i64, i32::MAX as i64)),
};

pub const INT64: NumericRange = NumericRange {
    min: i64::MIN as f64,
    max: i64::MAX as f64,
    epsilon: 1.0,
    integer_bounds: Some((i64::MIN, i64::MAX)),
};

pub const BYTE: NumericRange = NumericRange {
    min: 0.0,
    max: 255.0,
    epsilon: 1.0,
    integer_bounds: Some((0, 255)),
};

pub const FLOAT: NumericRange = NumericRange {
    min: -3.402823e38,
    max: 3.402823e38,
    epsilon: f32::EPSILON as f64,
    integer_bounds: None,
};

pub const DOUBLE: NumericRange = NumericRange {
    min: -f64::MAX,
    max: f64::MAX,
    epsilon: f64::EPSILON,
    integer_bounds: None,
};

/// Looks up the range for a format name.
pub fn numeric_range(format: &str) -> Option<NumericRange> {
    match format {
        "int32" => Some(INT32),
        "int64" => Some(INT64),
        "byte" => Some(BYTE),
        "float" => Some(FLOAT),
        "double" => Some(DOUBLE),
        _ => None,
    }
}

/// Renders a bound for messages, without a trailing `.0` on whole numbers.
pub fn format_bound(bound: f64) -> String {
    if bound.abs() >= 1e21 {
        format!("{bound:e}")
    } else if bound.fract() == 0.0 {
        format!("{}", bound as i128)
    } else {
        format!("{bound}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_range_renders_as_whole_numbers() {
        let range = numeric_range("byte").unwrap();
        assert_eq!(format_bound(range.min), "0");
        assert_eq!(format_bound(range.max), "255");
        assert!(numeric_range("date").is_none());
    }

    #[test]
    fn int64_bounds_render_exactly() {
        assert_eq!(format_bound(INT32.min), "-2147483648");
        assert_eq!(format_bound(INT64.min), "-9223372036854775808");
        assert_eq!(
            INT64.describe(),
            ("-9223372036854775808".to_string(), "9223372036854775807".to_string())
        );
    }

    #[test]
    fn integral_formats_reject_overflowed_input() {
        assert!(INT64.contains(i64::MAX as f64, true));
        assert!(!INT64.contains(i64::MAX as f64, false));
        assert!(DOUBLE.contains(1e19, false));
    }

    #[test]
    fn huge_bounds_use_exponent_form() {
        assert_eq!(format_bound(FLOAT.max), "3.402823e38");
        assert_eq!(format_bound(FLOAT.min), "-3.402823e38");
        assert_eq!(format_bound(2.5), "2.5");
    }
}

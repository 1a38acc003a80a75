//! Human-readable size formatting.
//!
//! Sizes are displayed in decimal gigabytes (10^9 bytes). Comparisons
//! elsewhere always use raw byte counts; these helpers are display only.

const BYTES_PER_GB: f64 = 1_000_000_000.0;

/// Convert a byte count to decimal gigabytes.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

/// Format a byte count as `"<n.nnn> GB"`.
#[must_use]
pub fn format_gb(bytes: u64) -> String {
    format!("{:.3} GB", bytes_to_gb(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_gigabytes() {
        assert!((bytes_to_gb(1_500_000_000) - 1.5).abs() < f64::EPSILON);
        assert_eq!(format_gb(0), "0.000 GB");
        assert_eq!(format_gb(2_500_000_000), "2.500 GB");
        assert_eq!(format_gb(123_456_789), "0.123 GB");
    }
}

//! Human-readable sizes and storage quota arithmetic.

/// Storage quota per user (2 GiB).
pub const TOTAL_STORAGE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

/// Fixed-point rendering with halves rounded up.
fn to_fixed(value: f64, digits: usize) -> String {
    let factor = 10f64.powi(digits as i32);
    format!("{:.*}", digits, (value * factor).round() / factor)
}

/// Format a byte count as `Bytes`, `KB`, `MB` or `GB`.
///
/// `digits` is the number of decimals for KB and larger; `None` or `0`
/// means one.
pub fn convert_file_size(size_in_bytes: u64, digits: Option<usize>) -> String {
    if size_in_bytes < 1024 {
        return format!("{size_in_bytes} Bytes");
    }

    let digits = match digits {
        Some(d) if d > 0 => d,
        _ => 1,
    };
    let size = size_in_bytes as f64;

    if size < MB {
        format!("{} KB", to_fixed(size / KB, digits))
    } else if size < GB {
        format!("{} MB", to_fixed(size / MB, digits))
    } else {
        format!("{} GB", to_fixed(size / GB, digits))
    }
}

/// Share of the storage quota in percent, rounded to two decimals.
pub fn calculate_percentage(size_in_bytes: u64) -> f64 {
    let percentage = size_in_bytes as f64 / TOTAL_STORAGE_BYTES as f64 * 100.0;
    (percentage * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes() {
        assert_eq!(convert_file_size(0, None), "0 Bytes");
        assert_eq!(convert_file_size(10, None), "10 Bytes");
        assert_eq!(convert_file_size(1023, Some(2)), "1023 Bytes");
    }

    #[test]
    fn test_kilobytes() {
        assert_eq!(convert_file_size(1024, None), "1.0 KB");
        assert_eq!(convert_file_size(1536, Some(2)), "1.50 KB");
        // 1.25 rounds up
        assert_eq!(convert_file_size(1280, None), "1.3 KB");
    }

    #[test]
    fn test_zero_digits_means_one() {
        assert_eq!(convert_file_size(2048, Some(0)), "2.0 KB");
    }

    #[test]
    fn test_megabytes_and_gigabytes() {
        assert_eq!(convert_file_size(5 * 1024 * 1024, None), "5.0 MB");
        assert_eq!(convert_file_size(TOTAL_STORAGE_BYTES, None), "2.0 GB");
    }

    #[test]
    fn test_calculate_percentage() {
        assert_eq!(calculate_percentage(0), 0.0);
        assert_eq!(calculate_percentage(TOTAL_STORAGE_BYTES), 100.0);
        assert_eq!(calculate_percentage(TOTAL_STORAGE_BYTES / 4), 25.0);
        // 1 MiB of 2 GiB = 0.048828125%
        assert_eq!(calculate_percentage(1024 * 1024), 0.05);
    }
}

//! Formatting utilities

use humansize::{DECIMAL, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a compression ratio
pub fn format_compression_ratio(original: u64, compressed: u64) -> String {
    if original == 0 {
        "N/A".to_string()
    } else {
        let ratio = 100.0 - (compressed as f64 / original as f64 * 100.0);
        format!("{ratio:.1}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
        assert_eq!(format_bytes(1048576), "1.05 MB");
    }

    #[test]
    fn test_format_compression_ratio() {
        assert_eq!(format_compression_ratio(1000, 500), "50.0%");
        assert_eq!(format_compression_ratio(1000, 1000), "0.0%");
        assert_eq!(format_compression_ratio(0, 0), "N/A");
    }
}

//! Utilities module for logging, errors and display helpers
//!
//! This module provides:
//! - Structured logging with tracing
//! - Error handling types
//! - Formatting helpers used by the result pages

pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use error::{PlantVillageError, Result};
pub use logging::{init_logging, LogConfig, LogLevel};

/// Format a duration in a human-readable way
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else if seconds < 3600.0 {
        let minutes = (seconds / 60.0).floor();
        let secs = seconds % 60.0;
        format!("{}m {:.0}s", minutes as u32, secs)
    } else {
        let hours = (seconds / 3600.0).floor();
        let minutes = ((seconds % 3600.0) / 60.0).floor();
        format!("{}h {}m", hours as u32, minutes as u32)
    }
}

/// Format a probability the way the result page shows it ("0.87")
pub fn format_probability(probability: f32) -> String {
    format!("{:.2}", probability)
}

/// Clamp a probability into `[0, 1]` for a progress bar, NaN becomes 0
pub fn progress_value(probability: f32) -> f32 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(30.5), "30.5s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(3661.0), "1h 1m");
    }

    #[test]
    fn test_format_probability() {
        assert_eq!(format_probability(0.8731), "0.87");
        assert_eq!(format_probability(1.0), "1.00");
    }

    #[test]
    fn test_progress_value() {
        assert_eq!(progress_value(0.25), 0.25);
        assert_eq!(progress_value(1.5), 1.0);
        assert_eq!(progress_value(-0.1), 0.0);
        assert_eq!(progress_value(f32::NAN), 0.0);
    }
}

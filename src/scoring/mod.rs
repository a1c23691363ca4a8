// src/scoring/mod.rs

//! Grading of submissions and analytics over stored attempts.
//!
//! Everything here except `grade_submission` is pure: the functions take
//! materialized rows and never touch the database.

pub mod analytics;
pub mod grading;

/// Percentage of `score` over `total`; 0 when `total` is 0.
pub fn percentage(score: i64, total: i64) -> f64 {
    if total > 0 {
        score as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Rounds to `places` decimals. Exact ties go to the even digit, so 6.25
/// becomes 6.2 and 3.125 becomes 3.12.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_ties_even() {
        assert_eq!(round_to(6.25, 1), 6.2);
        assert_eq!(round_to(3.125, 2), 3.12);
        assert_eq!(round_to(16.666_666, 2), 16.67);
    }
}

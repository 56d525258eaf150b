//! Monthly performance rating.
//!
//! The rating starts from a base, loses a fixed penalty per late arrival,
//! gains a bonus per approved overtime hour and a punctuality bonus for a
//! month without late arrivals, and is clamped to the policy's bounds.

use rust_decimal::Decimal;

use crate::config::RatingPolicy;
use crate::models::{RatingDetails, RatingResult};

/// Attendance signals for one employee and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingInputs {
    /// Late arrivals in the month.
    pub late_arrivals: u32,
    /// Approved overtime hours in the month.
    pub ot_hours: Decimal,
    /// Days marked present in the month.
    pub attendance_days: u32,
}

/// Calculates the rating of a known employee.
pub fn calculate_rating(
    employee_id: &str,
    month: u32,
    year: i32,
    inputs: RatingInputs,
    policy: &RatingPolicy,
) -> RatingResult {
    let punctuality_bonus = if inputs.late_arrivals == 0 {
        policy.punctuality_bonus
    } else {
        Decimal::ZERO
    };
    let raw = policy.base_rating - policy.late_arrival_penalty * Decimal::from(inputs.late_arrivals)
        + policy.ot_hour_bonus * inputs.ot_hours
        + punctuality_bonus;
    let rating = raw.max(policy.min_rating).min(policy.max_rating);

    RatingResult {
        employee_id: employee_id.to_string(),
        month,
        year,
        employee_found: true,
        rating,
        details: RatingDetails {
            base_rating: policy.base_rating,
            late_arrivals: inputs.late_arrivals,
            ot_hours: inputs.ot_hours,
            punctuality_bonus,
            attendance_days: inputs.attendance_days,
        },
    }
}

/// The rating reported for an id with no employee record.
pub fn unknown_employee_rating(
    employee_id: &str,
    month: u32,
    year: i32,
    policy: &RatingPolicy,
) -> RatingResult {
    RatingResult {
        employee_id: employee_id.to_string(),
        month,
        year,
        employee_found: false,
        rating: policy.unknown_employee_rating,
        details: RatingDetails {
            base_rating: policy.base_rating,
            late_arrivals: 0,
            ot_hours: Decimal::ZERO,
            punctuality_bonus: Decimal::ZERO,
            attendance_days: 0,
        },
    }
}

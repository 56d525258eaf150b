//! Attendance signals and the performance rating computed from them.
//!
//! Attendance, late arrivals and overtime logs are owned by collaborators;
//! the engine only reads them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{TenantId, Tenanted};

/// A recorded late arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateArrival {
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// The employee.
    pub employee_id: String,
    /// The day of the late arrival.
    pub date: NaiveDate,
    /// Minutes late.
    #[serde(default)]
    pub minutes_late: u32,
}

/// Approval state of an overtime log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeStatus {
    /// Not yet reviewed.
    Pending,
    /// Counted toward the rating.
    Approved,
    /// Ignored.
    Rejected,
}

/// Overtime worked on a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeLog {
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// The employee.
    pub employee_id: String,
    /// The day overtime was worked.
    pub date: NaiveDate,
    /// Overtime hours.
    pub hours: Decimal,
    /// Approval state.
    pub status: OvertimeStatus,
}

/// Daily attendance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// The employee.
    pub employee_id: String,
    /// The day.
    pub date: NaiveDate,
    /// Whether the employee was present.
    pub present: bool,
}

macro_rules! impl_tenanted {
    ($($ty:ty),*) => {
        $(impl Tenanted for $ty {
            fn tenant_id(&self) -> &TenantId {
                &self.tenant_id
            }
        })*
    };
}

impl_tenanted!(LateArrival, OvertimeLog, AttendanceRecord);

/// The inputs and constants behind a rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDetails {
    /// Starting score before adjustments.
    pub base_rating: Decimal,
    /// Late arrivals in the period.
    pub late_arrivals: u32,
    /// Approved overtime hours in the period.
    pub ot_hours: Decimal,
    /// Bonus granted for zero late arrivals.
    pub punctuality_bonus: Decimal,
    /// Days present in the period.
    pub attendance_days: u32,
}

/// An attendance-based performance rating for one employee and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingResult {
    /// The employee.
    pub employee_id: String,
    /// Month rated.
    pub month: u32,
    /// Year rated.
    pub year: i32,
    /// Whether the employee exists in the tenant.
    pub employee_found: bool,
    /// Score between the configured bounds.
    pub rating: Decimal,
    /// How the score was derived.
    pub details: RatingDetails,
}

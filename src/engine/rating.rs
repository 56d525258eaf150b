//! Employee performance ratings.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::calculation::{RatingInputs, calculate_rating, month_bounds, unknown_employee_rating};
use crate::error::{EngineError, EngineResult};
use crate::models::{RatingResult, TenantId};

use super::PayrollEngine;

impl PayrollEngine {
    /// Rates an employee for a month, defaulting to the month of `today`.
    ///
    /// An id with no employee record gets the policy's default rating rather
    /// than an error. An id owned by another tenant is still forbidden.
    pub fn employee_rating(
        &self,
        tenant: &TenantId,
        employee_id: &str,
        month: Option<u32>,
        year: Option<i32>,
        today: NaiveDate,
    ) -> EngineResult<RatingResult> {
        let month = month.unwrap_or_else(|| today.month());
        let year = year.unwrap_or_else(|| today.year());
        let (first, last) = month_bounds(month, year)?;
        let policy = self.config.rating_policy();
        let scope = self.scope(tenant);

        match scope.employee(employee_id) {
            Ok(_) => {}
            Err(EngineError::NotFound { .. }) => {
                debug!(tenant_id = %tenant, employee_id, "Rating requested for unknown employee");
                return Ok(unknown_employee_rating(employee_id, month, year, policy));
            }
            Err(error) => return Err(error),
        }

        let inputs = RatingInputs {
            late_arrivals: scope.late_arrival_count(employee_id, first, last),
            ot_hours: scope.approved_ot_hours(employee_id, first, last),
            attendance_days: scope.attendance_days(employee_id, first, last),
        };
        let result = calculate_rating(employee_id, month, year, inputs, policy);
        debug!(
            tenant_id = %tenant,
            employee_id,
            rating = %result.rating,
            late_arrivals = inputs.late_arrivals,
            "Employee rated"
        );
        Ok(result)
    }
}

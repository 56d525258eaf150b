//! Leave entitlement and monthly leave summaries.
//!
//! Casual leave accrues per month of service at the employee's custom rate
//! or the tenant-wide default; sick leave is a flat yearly allowance.
//! Balances are never reported below zero.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, LeaveApplication, LeaveEntitlementResponse, LeaveRequest, LeaveStatus,
    LeaveTransition, LeaveType, MonthlyLeaveSummary, TenantId,
};

use super::payroll_run::month_bounds;
use super::rounding::round_money;

fn half_day_amount() -> Decimal {
    Decimal::new(5, 1)
}

/// Counts the leave days of a date range.
///
/// A half-day on a single date counts 0.5; otherwise every calendar day of
/// the inclusive range counts as one.
pub fn leave_days(start: NaiveDate, end: NaiveDate, half_day: bool) -> EngineResult<Decimal> {
    if end < start {
        return Err(EngineError::validation(
            "end_date",
            "end date must not be before start date",
        ));
    }
    if half_day && start == end {
        return Ok(half_day_amount());
    }
    Ok(Decimal::from((end - start).num_days() + 1))
}

/// Whole months between the joining date and `as_of`.
///
/// Unknown or future joining dates give zero.
pub fn months_of_service(date_of_joining: Option<NaiveDate>, as_of: NaiveDate) -> u32 {
    let Some(joined) = date_of_joining else {
        return 0;
    };
    if joined > as_of {
        return 0;
    }
    let mut months = (as_of.year() - joined.year()) * 12 + as_of.month() as i32
        - joined.month() as i32;
    if as_of.day() < joined.day() {
        months -= 1;
    }
    u32::try_from(months.max(0)).unwrap_or(0)
}

/// The employee's casual accrual rate per month.
pub fn casual_rate(employee: &Employee, policy: &LeavePolicy) -> Decimal {
    employee
        .custom_casual_leave_per_month
        .unwrap_or(policy.casual_leave_per_month)
}

/// The employee's yearly sick allowance.
pub fn sick_allowance(employee: &Employee, policy: &LeavePolicy) -> Decimal {
    employee
        .custom_sick_leave_per_year
        .unwrap_or(policy.sick_leave_per_year)
}

/// Computes an employee's leave entitlement as of a date.
///
/// Used leave counts approved requests starting in `as_of`'s year.
/// `carried_forward` is the amount carried into that year.
pub fn compute_entitlement(
    employee: &Employee,
    requests: &[LeaveRequest],
    carried_forward: Decimal,
    policy: &LeavePolicy,
    as_of: NaiveDate,
) -> LeaveEntitlementResponse {
    let year = as_of.year();
    let used = |leave_type: LeaveType| -> Decimal {
        requests
            .iter()
            .filter(|r| {
                r.employee_id == employee.id
                    && r.status == LeaveStatus::Approved
                    && r.leave_type == leave_type
                    && r.start_date.year() == year
            })
            .map(|r| r.days)
            .sum()
    };

    let months = months_of_service(employee.date_of_joining, as_of);
    let casual_leave_per_month = casual_rate(employee, policy);
    let casual_leave_accrued = casual_leave_per_month * Decimal::from(months);
    let casual_leave_used = used(LeaveType::Casual);
    let casual_leave_balance = (casual_leave_accrued - casual_leave_used).max(Decimal::ZERO);

    let sick_leave_total = sick_allowance(employee, policy);
    let sick_leave_used = used(LeaveType::Sick);
    let sick_leave_balance = (sick_leave_total - sick_leave_used).max(Decimal::ZERO);

    let annual_leave_total = employee.custom_annual_leave_per_year;
    let annual_leave_used = used(LeaveType::Annual);
    let annual_leave_balance = annual_leave_total
        .map_or(Decimal::ZERO, |total| (total - annual_leave_used).max(Decimal::ZERO));

    LeaveEntitlementResponse {
        employee_id: employee.id.clone(),
        year,
        months_of_service: months,
        casual_leave_per_month,
        casual_leave_accrued,
        casual_leave_used,
        casual_leave_balance,
        sick_leave_total,
        sick_leave_used,
        sick_leave_balance,
        annual_leave_total,
        annual_leave_used,
        annual_leave_balance,
        carried_forward_leaves: carried_forward,
        total_available_leaves: casual_leave_balance
            + sick_leave_balance
            + annual_leave_balance
            + carried_forward,
    }
}

/// Leave days of a request that fall inside `[first, last]`.
pub fn days_within(request: &LeaveRequest, first: NaiveDate, last: NaiveDate) -> Decimal {
    let start = request.start_date.max(first);
    let end = request.end_date.min(last);
    if end < start {
        return Decimal::ZERO;
    }
    if request.half_day && request.start_date == request.end_date {
        return half_day_amount();
    }
    Decimal::from((end - start).num_days() + 1)
}

/// Summarises an employee's approved leave within a month against the
/// monthly entitlement. `employee` is `None` when the employee record is
/// gone; tenant defaults apply then.
pub fn monthly_leave_summary(
    employee: Option<&Employee>,
    requests: &[&LeaveRequest],
    policy: &LeavePolicy,
    month: u32,
    year: i32,
) -> EngineResult<MonthlyLeaveSummary> {
    let (first, last) = month_bounds(month, year)?;

    let mut casual_taken = Decimal::ZERO;
    let mut sick_taken = Decimal::ZERO;
    let mut other_days = Decimal::ZERO;
    for request in requests
        .iter()
        .filter(|r| r.status == LeaveStatus::Approved)
    {
        let days = days_within(request, first, last);
        match request.leave_type {
            LeaveType::Casual => casual_taken += days,
            LeaveType::Sick => sick_taken += days,
            LeaveType::Annual | LeaveType::Unpaid | LeaveType::Other => other_days += days,
        }
    }

    let (casual_entitled, yearly_sick) = match employee {
        Some(employee) => (casual_rate(employee, policy), sick_allowance(employee, policy)),
        None => (policy.casual_leave_per_month, policy.sick_leave_per_year),
    };
    let sick_entitled = round_money(yearly_sick / Decimal::from(12));
    let casual_excess = (casual_taken - casual_entitled).max(Decimal::ZERO);
    let sick_excess = (sick_taken - sick_entitled).max(Decimal::ZERO);

    Ok(MonthlyLeaveSummary {
        casual_taken,
        sick_taken,
        casual_entitled,
        sick_entitled,
        casual_excess,
        sick_excess,
        other_days,
        total_excess_days: casual_excess + sick_excess,
    })
}

/// Builds a pending leave request from an application.
pub fn new_leave_request(
    tenant_id: &TenantId,
    application: LeaveApplication,
    now: DateTime<Utc>,
) -> EngineResult<LeaveRequest> {
    if application.half_day && application.start_date != application.end_date {
        return Err(EngineError::validation(
            "half_day",
            "a half-day request must start and end on the same date",
        ));
    }
    let days = leave_days(
        application.start_date,
        application.end_date,
        application.half_day,
    )?;

    Ok(LeaveRequest {
        id: Uuid::new_v4(),
        tenant_id: tenant_id.clone(),
        employee_id: application.employee_id,
        leave_type: application.leave_type,
        start_date: application.start_date,
        end_date: application.end_date,
        half_day: application.half_day,
        days,
        reason: application.reason,
        status: LeaveStatus::Pending,
        created_date: now,
        approved: None,
        rejected: None,
        cancelled: None,
    })
}

/// Returns true when two requests share at least one calendar day.
pub fn overlaps(a: &LeaveRequest, b: &LeaveRequest) -> bool {
    a.start_date <= b.end_date && b.start_date <= a.end_date
}

/// Moves a leave request to a new status, recording who did it.
///
/// Only pending requests can be approved or rejected; pending and approved
/// requests can be cancelled.
pub fn transition_leave(
    request: &mut LeaveRequest,
    to: LeaveStatus,
    transition: LeaveTransition,
) -> EngineResult<()> {
    let allowed = matches!(
        (request.status, to),
        (LeaveStatus::Pending, LeaveStatus::Approved)
            | (LeaveStatus::Pending, LeaveStatus::Rejected)
            | (LeaveStatus::Pending, LeaveStatus::Cancelled)
            | (LeaveStatus::Approved, LeaveStatus::Cancelled)
    );
    if !allowed {
        return Err(EngineError::InvalidTransition {
            entity: "leave request",
            id: request.id.to_string(),
            from: request.status.to_string(),
            to: to.to_string(),
        });
    }

    match to {
        LeaveStatus::Approved => request.approved = Some(transition),
        LeaveStatus::Rejected => request.rejected = Some(transition),
        LeaveStatus::Cancelled => request.cancelled = Some(transition),
        LeaveStatus::Pending => {}
    }
    request.status = to;
    Ok(())
}

/// Casual balance carried into the next year, capped by policy.
pub fn carry_forward_amount(casual_balance: Decimal, policy: &LeavePolicy) -> Decimal {
    casual_balance
        .max(Decimal::ZERO)
        .min(policy.carry_forward_cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployeeStatus, SalaryStructure};
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(joined: Option<NaiveDate>) -> Employee {
        Employee {
            id: "emp_001".to_string(),
            tenant_id: TenantId::new("acme"),
            name: "Asha Rao".to_string(),
            status: EmployeeStatus::Active,
            date_of_joining: joined,
            custom_casual_leave_per_month: None,
            custom_sick_leave_per_year: None,
            custom_annual_leave_per_year: None,
            salary: SalaryStructure::default(),
        }
    }

    fn request(
        leave_type: LeaveType,
        start: NaiveDate,
        end: NaiveDate,
        half_day: bool,
        status: LeaveStatus,
    ) -> LeaveRequest {
        let mut request = new_leave_request(
            &TenantId::new("acme"),
            LeaveApplication {
                employee_id: "emp_001".to_string(),
                leave_type,
                start_date: start,
                end_date: end,
                half_day,
                reason: None,
            },
            Utc::now(),
        )
        .unwrap();
        request.status = status;
        request
    }

    fn approved(leave_type: LeaveType, start: NaiveDate, end: NaiveDate) -> LeaveRequest {
        request(leave_type, start, end, false, LeaveStatus::Approved)
    }

    #[test]
    fn test_leave_days() {
        assert_eq!(
            leave_days(date(2025, 3, 10), date(2025, 3, 12), false).unwrap(),
            dec("3")
        );
        assert_eq!(
            leave_days(date(2025, 3, 10), date(2025, 3, 10), true).unwrap(),
            dec("0.5")
        );
        assert!(leave_days(date(2025, 3, 12), date(2025, 3, 10), false).is_err());
    }

    #[test]
    fn test_months_of_service() {
        let joined = Some(date(2024, 1, 15));
        assert_eq!(months_of_service(joined, date(2024, 1, 20)), 0);
        assert_eq!(months_of_service(joined, date(2024, 2, 14)), 0);
        assert_eq!(months_of_service(joined, date(2024, 2, 15)), 1);
        assert_eq!(months_of_service(joined, date(2025, 1, 15)), 12);
        assert_eq!(months_of_service(joined, date(2023, 12, 31)), 0);
        assert_eq!(months_of_service(None, date(2025, 1, 1)), 0);
    }

    #[test]
    fn test_entitlement_with_default_policy() {
        let emp = employee(Some(date(2025, 1, 1)));
        let requests = vec![
            approved(LeaveType::Casual, date(2025, 3, 3), date(2025, 3, 4)),
            approved(LeaveType::Sick, date(2025, 4, 1), date(2025, 4, 1)),
            request(
                LeaveType::Casual,
                date(2025, 5, 5),
                date(2025, 5, 9),
                false,
                LeaveStatus::Pending,
            ),
        ];

        let result = compute_entitlement(
            &emp,
            &requests,
            dec("2"),
            &LeavePolicy::default(),
            date(2025, 7, 1),
        );

        assert_eq!(result.months_of_service, 6);
        assert_eq!(result.casual_leave_accrued, dec("9.0"));
        assert_eq!(result.casual_leave_used, dec("2"));
        assert_eq!(result.casual_leave_balance, dec("7"));
        assert_eq!(result.sick_leave_balance, dec("6"));
        assert_eq!(result.annual_leave_total, None);
        assert_eq!(result.total_available_leaves, dec("15"));
    }

    #[test]
    fn test_custom_rates_override_policy() {
        let mut emp = employee(Some(date(2025, 1, 1)));
        emp.custom_casual_leave_per_month = Some(dec("2"));
        emp.custom_sick_leave_per_year = Some(dec("10"));
        emp.custom_annual_leave_per_year = Some(dec("12"));
        let requests = vec![approved(LeaveType::Annual, date(2025, 2, 3), date(2025, 2, 7))];

        let result = compute_entitlement(
            &emp,
            &requests,
            Decimal::ZERO,
            &LeavePolicy::default(),
            date(2025, 4, 1),
        );
        assert_eq!(result.casual_leave_accrued, dec("6"));
        assert_eq!(result.sick_leave_total, dec("10"));
        assert_eq!(result.annual_leave_balance, dec("7"));
    }

    #[test]
    fn test_overdrawn_balance_is_clamped() {
        let emp = employee(Some(date(2025, 1, 1)));
        let requests = vec![approved(LeaveType::Casual, date(2025, 1, 6), date(2025, 1, 15))];
        let result = compute_entitlement(
            &emp,
            &requests,
            Decimal::ZERO,
            &LeavePolicy::default(),
            date(2025, 2, 1),
        );
        assert_eq!(result.casual_leave_balance, Decimal::ZERO);
    }

    #[test]
    fn test_monthly_summary_clips_to_month() {
        let emp = employee(Some(date(2024, 1, 1)));
        let spanning = approved(LeaveType::Casual, date(2025, 1, 30), date(2025, 2, 2));
        let half = request(
            LeaveType::Sick,
            date(2025, 2, 10),
            date(2025, 2, 10),
            true,
            LeaveStatus::Approved,
        );
        let unpaid = approved(LeaveType::Unpaid, date(2025, 2, 20), date(2025, 2, 21));
        let pending = request(
            LeaveType::Casual,
            date(2025, 2, 24),
            date(2025, 2, 28),
            false,
            LeaveStatus::Pending,
        );

        let summary = monthly_leave_summary(
            Some(&emp),
            &[&spanning, &half, &unpaid, &pending],
            &LeavePolicy::default(),
            2,
            2025,
        )
        .unwrap();

        assert_eq!(summary.casual_taken, dec("2"));
        assert_eq!(summary.sick_taken, dec("0.5"));
        assert_eq!(summary.other_days, dec("2"));
        assert_eq!(summary.casual_entitled, dec("1.5"));
        assert_eq!(summary.sick_entitled, dec("0.58"));
        assert_eq!(summary.casual_excess, dec("0.5"));
        assert_eq!(summary.sick_excess, Decimal::ZERO);
        assert_eq!(summary.total_excess_days, dec("0.5"));
    }

    #[test]
    fn test_half_day_with_range_is_rejected() {
        let result = new_leave_request(
            &TenantId::new("acme"),
            LeaveApplication {
                employee_id: "emp_001".to_string(),
                leave_type: LeaveType::Casual,
                start_date: date(2025, 3, 3),
                end_date: date(2025, 3, 4),
                half_day: true,
                reason: None,
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_leave_transitions() {
        let actor = || LeaveTransition {
            actor: "hr_admin".to_string(),
            at: Utc::now(),
            reason: None,
        };
        let mut leave = request(
            LeaveType::Casual,
            date(2025, 3, 3),
            date(2025, 3, 3),
            false,
            LeaveStatus::Pending,
        );

        transition_leave(&mut leave, LeaveStatus::Approved, actor()).unwrap();
        assert!(leave.approved.is_some());
        assert!(transition_leave(&mut leave, LeaveStatus::Rejected, actor()).is_err());

        transition_leave(&mut leave, LeaveStatus::Cancelled, actor()).unwrap();
        assert_eq!(leave.status, LeaveStatus::Cancelled);
        assert!(matches!(
            transition_leave(&mut leave, LeaveStatus::Approved, actor()),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_overlap_detection() {
        let a = approved(LeaveType::Casual, date(2025, 3, 3), date(2025, 3, 5));
        let b = approved(LeaveType::Sick, date(2025, 3, 5), date(2025, 3, 6));
        let c = approved(LeaveType::Sick, date(2025, 3, 6), date(2025, 3, 7));
        assert!(overlaps(&a, &b));
        assert!(!overlaps(&a, &c));
    }

    #[test]
    fn test_carry_forward_is_capped() {
        let policy = LeavePolicy::default();
        assert_eq!(carry_forward_amount(dec("3.5"), &policy), dec("3.5"));
        assert_eq!(carry_forward_amount(dec("12"), &policy), dec("5"));
        assert_eq!(carry_forward_amount(dec("-1"), &policy), Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_balances_never_negative(
            months in 0u32..120,
            casual_days in 0u32..60,
            sick_days in 0u32..30,
        ) {
            let as_of = date(2025, 12, 31);
            let joined = as_of
                .checked_sub_months(chrono::Months::new(months))
                .unwrap();
            let emp = employee(Some(joined));
            let mut requests = Vec::new();
            if casual_days > 0 {
                let start = date(2025, 1, 1);
                let end = start + chrono::Duration::days(i64::from(casual_days) - 1);
                requests.push(approved(LeaveType::Casual, start, end));
            }
            if sick_days > 0 {
                let start = date(2025, 6, 1);
                let end = start + chrono::Duration::days(i64::from(sick_days) - 1);
                requests.push(approved(LeaveType::Sick, start, end));
            }

            let result = compute_entitlement(
                &emp,
                &requests,
                Decimal::ZERO,
                &LeavePolicy::default(),
                as_of,
            );
            prop_assert!(result.casual_leave_balance >= Decimal::ZERO);
            prop_assert!(result.sick_leave_balance >= Decimal::ZERO);
            prop_assert!(result.total_available_leaves >= Decimal::ZERO);
        }
    }
}

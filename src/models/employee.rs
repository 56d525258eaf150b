//! Employee model and salary structure.
//!
//! An employee's salary structure carries two representations: the legacy
//! flat fields and the newer catalog-referenced assignments. The
//! `use_component_based_salary` discriminant decides which one is
//! authoritative; [`SalaryStructure::representation`] exposes that decision
//! as a tagged view so callers never branch on "is this field non-zero".

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CalculationMode, ComponentCategory, TenantId, Tenanted};

/// Employment status of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Currently employed and on payroll.
    #[default]
    Active,
    /// Temporarily off payroll.
    Inactive,
    /// Employment has ended.
    Terminated,
}

/// The named fields of the legacy flat salary schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyField {
    /// Basic salary.
    Basic,
    /// House rent allowance.
    Hra,
    /// Medical allowance.
    MedicalAllowance,
    /// Leave travel allowance.
    Lta,
    /// Conveyance allowance.
    Conveyance,
    /// Special allowance.
    SpecialAllowance,
    /// Incentive pay.
    Incentive,
    /// Other benefits.
    OtherBenefits,
    /// Food coupons.
    FoodCoupons,
    /// Telephone reimbursement.
    TelephoneReimbursement,
    /// Fuel reimbursement.
    FuelReimbursement,
    /// Employee provident fund contribution.
    EmployeePf,
    /// Employer provident fund contribution.
    EmployerPf,
    /// Employee state insurance contribution.
    EmployeeEsi,
    /// Employer state insurance contribution.
    EmployerEsi,
    /// Professional tax.
    ProfessionalTax,
    /// Tax deducted at source.
    Tds,
    /// Loan repayments.
    LoanDeductions,
    /// Labour welfare fund.
    LabourWelfareFund,
    /// Other deductions.
    OtherDeductions,
}

/// The legacy flat salary fields.
///
/// Missing fields deserialize as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct LegacySalaryFields {
    pub basic: Decimal,
    pub hra: Decimal,
    pub medical_allowance: Decimal,
    pub lta: Decimal,
    pub conveyance: Decimal,
    pub special_allowance: Decimal,
    pub incentive: Decimal,
    pub other_benefits: Decimal,
    pub food_coupons: Decimal,
    pub telephone_reimbursement: Decimal,
    pub fuel_reimbursement: Decimal,
    pub employee_pf: Decimal,
    pub employer_pf: Decimal,
    pub employee_esi: Decimal,
    pub employer_esi: Decimal,
    pub professional_tax: Decimal,
    pub tds: Decimal,
    pub loan_deductions: Decimal,
    pub labour_welfare_fund: Decimal,
    pub other_deductions: Decimal,
}

impl LegacySalaryFields {
    /// Returns the amount stored in the given legacy field.
    pub fn amount(&self, field: LegacyField) -> Decimal {
        match field {
            LegacyField::Basic => self.basic,
            LegacyField::Hra => self.hra,
            LegacyField::MedicalAllowance => self.medical_allowance,
            LegacyField::Lta => self.lta,
            LegacyField::Conveyance => self.conveyance,
            LegacyField::SpecialAllowance => self.special_allowance,
            LegacyField::Incentive => self.incentive,
            LegacyField::OtherBenefits => self.other_benefits,
            LegacyField::FoodCoupons => self.food_coupons,
            LegacyField::TelephoneReimbursement => self.telephone_reimbursement,
            LegacyField::FuelReimbursement => self.fuel_reimbursement,
            LegacyField::EmployeePf => self.employee_pf,
            LegacyField::EmployerPf => self.employer_pf,
            LegacyField::EmployeeEsi => self.employee_esi,
            LegacyField::EmployerEsi => self.employer_esi,
            LegacyField::ProfessionalTax => self.professional_tax,
            LegacyField::Tds => self.tds,
            LegacyField::LoanDeductions => self.loan_deductions,
            LegacyField::LabourWelfareFund => self.labour_welfare_fund,
            LegacyField::OtherDeductions => self.other_deductions,
        }
    }
}

/// A catalog component assigned to an employee.
///
/// Display fields are cached from the definition at assignment time so a
/// payslip can still be labelled if the definition is later renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponentAssignment {
    /// The referenced [`crate::models::SalaryComponentDefinition`].
    pub component_id: Uuid,
    /// Cached display name.
    pub name: String,
    /// Cached machine name.
    pub component_type: String,
    /// Cached category.
    pub category: ComponentCategory,
    /// Cached calculation mode.
    #[serde(default)]
    pub calculation_mode: CalculationMode,
    /// Employee-specific amount (a percentage for percentage-of-basic components).
    pub amount: Decimal,
    /// Cached tax flag.
    #[serde(default)]
    pub is_taxable: bool,
    /// Cached EPF flag.
    #[serde(default)]
    pub counts_for_epf: bool,
    /// Cached ESI flag.
    #[serde(default)]
    pub counts_for_esi: bool,
    /// Inactive assignments are skipped during resolution.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// An employee's salary structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryStructure {
    /// Selects which representation is authoritative.
    #[serde(default)]
    pub use_component_based_salary: bool,
    /// Legacy flat fields. Ignored once the structure is component based.
    #[serde(default)]
    pub legacy: LegacySalaryFields,
    /// Catalog-referenced assignments. Ignored while the structure is legacy.
    #[serde(default)]
    pub components: Vec<SalaryComponentAssignment>,
}

/// The authoritative view of a [`SalaryStructure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryRepresentation<'a> {
    /// The legacy flat fields are authoritative.
    Legacy(&'a LegacySalaryFields),
    /// The component assignments are authoritative.
    ComponentBased(&'a [SalaryComponentAssignment]),
}

impl SalaryStructure {
    /// Creates a legacy structure.
    pub fn legacy(fields: LegacySalaryFields) -> Self {
        Self {
            use_component_based_salary: false,
            legacy: fields,
            components: Vec::new(),
        }
    }

    /// Creates a component-based structure.
    pub fn component_based(components: Vec<SalaryComponentAssignment>) -> Self {
        Self {
            use_component_based_salary: true,
            legacy: LegacySalaryFields::default(),
            components,
        }
    }

    /// Returns the representation selected by the discriminant.
    pub fn representation(&self) -> SalaryRepresentation<'_> {
        if self.use_component_based_salary {
            SalaryRepresentation::ComponentBased(&self.components)
        } else {
            SalaryRepresentation::Legacy(&self.legacy)
        }
    }
}

/// An employee record as consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// Full name, used on payslips.
    pub name: String,
    /// Employment status.
    #[serde(default)]
    pub status: EmployeeStatus,
    /// The date the employee joined.
    #[serde(default)]
    pub date_of_joining: Option<NaiveDate>,
    /// Per-employee override of the monthly casual leave accrual.
    #[serde(default)]
    pub custom_casual_leave_per_month: Option<Decimal>,
    /// Per-employee override of the yearly sick leave allowance.
    #[serde(default)]
    pub custom_sick_leave_per_year: Option<Decimal>,
    /// Yearly annual leave allowance, when the tenant grants one.
    #[serde(default)]
    pub custom_annual_leave_per_year: Option<Decimal>,
    /// The salary structure.
    #[serde(default)]
    pub salary: SalaryStructure,
}

impl Employee {
    /// Returns true if the employee is on active payroll.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

impl Tenanted for Employee {
    fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }
}

//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Lookup tables are
//! immutable once loaded and are injected into every engine operation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{ComponentCategory, LegacyField};

/// Metadata about the engine deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMetadata {
    /// Human-readable name.
    pub name: String,
    /// Version or effective date of the configuration.
    pub version: String,
    /// ISO currency code used for all amounts.
    pub currency: String,
}

/// Loan types configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct LoanTypesConfig {
    /// Map of loan type name to annual interest rate in percent.
    pub loan_types: HashMap<String, Decimal>,
}

/// Loan type to default interest rate table.
#[derive(Debug, Clone, Default)]
pub struct LoanTypeTable {
    rates: HashMap<String, Decimal>,
}

impl LoanTypeTable {
    /// Creates a table from a map of loan type to annual rate.
    pub fn new(rates: HashMap<String, Decimal>) -> Self {
        Self { rates }
    }

    /// Returns the annual rate configured for a loan type.
    pub fn rate_for(&self, loan_type: &str) -> EngineResult<Decimal> {
        self.rates.get(loan_type).copied().ok_or_else(|| {
            EngineError::validation(
                "loan_type",
                format!("unknown loan type '{}' and no interest_rate given", loan_type),
            )
        })
    }

    /// Returns the configured loan type names.
    pub fn loan_types(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }
}

/// One legacy field to catalog component mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LegacyComponentMapping {
    /// The legacy flat field.
    pub legacy_field: LegacyField,
    /// Category of the component the field maps to.
    pub category: ComponentCategory,
    /// Machine name of the component.
    pub component_type: String,
    /// Display name.
    pub name: String,
    /// Payslip label.
    pub payslip_label: String,
    /// Tax flag.
    #[serde(default)]
    pub is_taxable: bool,
    /// EPF flag.
    #[serde(default)]
    pub counts_for_epf: bool,
    /// ESI flag.
    #[serde(default)]
    pub counts_for_esi: bool,
}

/// Salary components configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct SalaryComponentsConfig {
    /// Ordered mapping entries.
    pub mappings: Vec<LegacyComponentMapping>,
}

/// Ordered legacy field to component mapping table.
///
/// The order is the order line items appear in on payslips.
#[derive(Debug, Clone, Default)]
pub struct LegacyMappingTable {
    mappings: Vec<LegacyComponentMapping>,
}

impl LegacyMappingTable {
    /// Creates a table, rejecting duplicated legacy fields or component keys.
    pub fn new(mappings: Vec<LegacyComponentMapping>) -> EngineResult<Self> {
        for (index, mapping) in mappings.iter().enumerate() {
            let duplicate = mappings[..index].iter().any(|earlier| {
                earlier.legacy_field == mapping.legacy_field
                    || (earlier.category == mapping.category
                        && earlier.component_type == mapping.component_type)
            });
            if duplicate {
                return Err(EngineError::validation(
                    "mappings",
                    format!(
                        "duplicate mapping for {:?} / {}:{}",
                        mapping.legacy_field, mapping.category, mapping.component_type
                    ),
                ));
            }
        }
        Ok(Self { mappings })
    }

    /// Iterates over the mappings in order.
    pub fn iter(&self) -> impl Iterator<Item = &LegacyComponentMapping> {
        self.mappings.iter()
    }

    /// Returns the number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns true if there are no mappings.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Leave policy constants.
#[derive(Debug, Clone, Deserialize)]
pub struct LeavePolicy {
    /// Casual leave accrued per month of service.
    pub casual_leave_per_month: Decimal,
    /// Sick leave granted per year.
    pub sick_leave_per_year: Decimal,
    /// Maximum casual leave carried into the next year.
    pub carry_forward_cap: Decimal,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            casual_leave_per_month: Decimal::new(15, 1),
            sick_leave_per_year: Decimal::new(70, 1),
            carry_forward_cap: Decimal::from(5),
        }
    }
}

/// Rating formula constants.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingPolicy {
    /// Starting score.
    pub base_rating: Decimal,
    /// Points removed per late arrival.
    pub late_arrival_penalty: Decimal,
    /// Points added per approved overtime hour.
    pub ot_hour_bonus: Decimal,
    /// Points added when there were no late arrivals.
    pub punctuality_bonus: Decimal,
    /// Lower bound of the score.
    pub min_rating: Decimal,
    /// Upper bound of the score.
    pub max_rating: Decimal,
    /// Score reported for an employee that does not exist.
    pub unknown_employee_rating: Decimal,
}

impl Default for RatingPolicy {
    fn default() -> Self {
        Self {
            base_rating: Decimal::from(4),
            late_arrival_penalty: Decimal::new(5, 2),
            ot_hour_bonus: Decimal::new(2, 2),
            punctuality_bonus: Decimal::new(3, 1),
            min_rating: Decimal::ZERO,
            max_rating: Decimal::from(5),
            unknown_employee_rating: Decimal::from(4),
        }
    }
}

/// Policies configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoliciesConfig {
    /// Leave policy.
    #[serde(default)]
    pub leave: LeavePolicy,
    /// Rating policy.
    #[serde(default)]
    pub rating: RatingPolicy,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    metadata: EngineMetadata,
    loan_types: LoanTypeTable,
    legacy_mappings: LegacyMappingTable,
    policies: PoliciesConfig,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        metadata: EngineMetadata,
        loan_types: LoanTypeTable,
        legacy_mappings: LegacyMappingTable,
        policies: PoliciesConfig,
    ) -> Self {
        Self {
            metadata,
            loan_types,
            legacy_mappings,
            policies,
        }
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.metadata
    }

    /// Returns the loan type table.
    pub fn loan_types(&self) -> &LoanTypeTable {
        &self.loan_types
    }

    /// Returns the legacy mapping table.
    pub fn legacy_mappings(&self) -> &LegacyMappingTable {
        &self.legacy_mappings
    }

    /// Returns the leave policy.
    pub fn leave_policy(&self) -> &LeavePolicy {
        &self.policies.leave
    }

    /// Returns the rating policy.
    pub fn rating_policy(&self) -> &RatingPolicy {
        &self.policies.rating
    }
}

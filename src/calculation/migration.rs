//! Legacy salary migration.
//!
//! Converts the flat legacy salary fields of an employee into catalog
//! assignments, seeding the catalog entries the conversion needs. Both
//! functions are pure; the engine applies their output to the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::{LegacyComponentMapping, LegacyMappingTable};
use crate::models::{
    CalculationMode, SalaryComponentAssignment, SalaryComponentDefinition, SalaryStructure,
    TenantId,
};

/// Builds the catalog definitions a tenant is missing for the legacy mapping.
///
/// A definition is only created when the tenant has no entry for the
/// mapping's (category, component type) key, so repeated calls return an
/// empty list. Disabled entries count as present.
pub fn missing_definitions(
    tenant_id: &TenantId,
    mappings: &LegacyMappingTable,
    catalog: &[SalaryComponentDefinition],
    now: DateTime<Utc>,
) -> Vec<SalaryComponentDefinition> {
    mappings
        .iter()
        .filter(|mapping| find_definition(catalog, mapping).is_none())
        .map(|mapping| SalaryComponentDefinition {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.clone(),
            category: mapping.category,
            component_type: mapping.component_type.clone(),
            name: mapping.name.clone(),
            payslip_label: mapping.payslip_label.clone(),
            calculation_mode: CalculationMode::FlatAmount,
            value: Decimal::ZERO,
            is_taxable: mapping.is_taxable,
            counts_for_epf: mapping.counts_for_epf,
            counts_for_esi: mapping.counts_for_esi,
            is_active: true,
            created_date: now,
            updated_date: None,
        })
        .collect()
}

/// Outcome of converting one employee's salary structure.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureMigration {
    /// Already component-based, or no legacy field holds a positive amount.
    Unchanged,
    /// Some legacy amounts map onto disabled catalog entries. Migrating would
    /// drop them from pay, so the employee stays on the legacy path.
    Blocked {
        /// Component types whose catalog entry is disabled.
        component_types: Vec<String>,
    },
    /// The converted structure.
    Migrated(SalaryStructure),
}

/// Converts a legacy salary structure into a component-based one.
///
/// Every positive legacy field becomes a flat-amount assignment against the
/// catalog entry for its (category, component type). Legacy values are kept
/// alongside the new assignments.
pub fn migrate_structure(
    structure: &SalaryStructure,
    mappings: &LegacyMappingTable,
    catalog: &[SalaryComponentDefinition],
) -> StructureMigration {
    if structure.use_component_based_salary {
        return StructureMigration::Unchanged;
    }

    let mut components = Vec::new();
    let mut blocked = Vec::new();
    for mapping in mappings.iter() {
        let amount = structure.legacy.amount(mapping.legacy_field);
        if amount <= Decimal::ZERO {
            continue;
        }
        let Some(definition) = find_definition(catalog, mapping) else {
            continue;
        };
        if !definition.is_active {
            blocked.push(definition.component_type.clone());
            continue;
        }
        components.push(SalaryComponentAssignment {
            component_id: definition.id,
            name: definition.name.clone(),
            component_type: definition.component_type.clone(),
            category: definition.category,
            calculation_mode: CalculationMode::FlatAmount,
            amount,
            is_taxable: definition.is_taxable,
            counts_for_epf: definition.counts_for_epf,
            counts_for_esi: definition.counts_for_esi,
            is_active: true,
        });
    }

    if !blocked.is_empty() {
        return StructureMigration::Blocked {
            component_types: blocked,
        };
    }
    if components.is_empty() {
        return StructureMigration::Unchanged;
    }

    StructureMigration::Migrated(SalaryStructure {
        use_component_based_salary: true,
        legacy: structure.legacy.clone(),
        components,
    })
}

fn find_definition<'a>(
    catalog: &'a [SalaryComponentDefinition],
    mapping: &LegacyComponentMapping,
) -> Option<&'a SalaryComponentDefinition> {
    catalog
        .iter()
        .find(|d| d.category == mapping.category && d.component_type == mapping.component_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::resolve_components;
    use crate::config::ConfigLoader;
    use crate::models::{Employee, EmployeeStatus, LegacySalaryFields};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn mappings() -> LegacyMappingTable {
        ConfigLoader::load("./config/default")
            .expect("Failed to load config")
            .legacy_mappings()
            .clone()
    }

    fn legacy_fields() -> LegacySalaryFields {
        LegacySalaryFields {
            basic: dec("30000"),
            hra: dec("12000"),
            special_allowance: dec("4500.50"),
            fuel_reimbursement: dec("1500"),
            employee_pf: dec("1800"),
            professional_tax: dec("200"),
            loan_deductions: dec("2500"),
            ..Default::default()
        }
    }

    fn expect_migrated(outcome: StructureMigration) -> SalaryStructure {
        match outcome {
            StructureMigration::Migrated(structure) => structure,
            other => panic!("expected a migrated structure, got {:?}", other),
        }
    }

    #[test]
    fn test_seeds_every_mapping_once() {
        let tenant = TenantId::new("acme");
        let table = mappings();

        let seeded = missing_definitions(&tenant, &table, &[], Utc::now());
        assert_eq!(seeded.len(), table.len());
        assert!(seeded.iter().all(|d| d.tenant_id == tenant && d.is_active));

        let again = missing_definitions(&tenant, &table, &seeded, Utc::now());
        assert!(again.is_empty());
    }

    #[test]
    fn test_migrates_only_positive_fields() {
        let table = mappings();
        let catalog = missing_definitions(&TenantId::new("acme"), &table, &[], Utc::now());
        let structure = SalaryStructure::legacy(legacy_fields());

        let migrated = expect_migrated(migrate_structure(&structure, &table, &catalog));
        assert!(migrated.use_component_based_salary);
        assert_eq!(migrated.components.len(), 7);
        assert_eq!(migrated.legacy, structure.legacy);

        let loan = migrated
            .components
            .iter()
            .find(|c| c.component_type == "loan_deduction")
            .unwrap();
        assert_eq!(loan.amount, dec("2500"));
        assert_eq!(loan.name, "Loan Deduction");
    }

    #[test]
    fn test_already_migrated_is_untouched() {
        let table = mappings();
        let catalog = missing_definitions(&TenantId::new("acme"), &table, &[], Utc::now());
        let structure = SalaryStructure::legacy(legacy_fields());
        let migrated = expect_migrated(migrate_structure(&structure, &table, &catalog));

        assert_eq!(
            migrate_structure(&migrated, &table, &catalog),
            StructureMigration::Unchanged
        );
    }

    #[test]
    fn test_all_zero_legacy_is_not_migrated() {
        let table = mappings();
        let catalog = missing_definitions(&TenantId::new("acme"), &table, &[], Utc::now());
        let structure = SalaryStructure::legacy(LegacySalaryFields::default());

        assert_eq!(
            migrate_structure(&structure, &table, &catalog),
            StructureMigration::Unchanged
        );
    }

    #[test]
    fn test_disabled_definition_blocks_migration() {
        let table = mappings();
        let mut catalog = missing_definitions(&TenantId::new("acme"), &table, &[], Utc::now());
        for definition in catalog.iter_mut() {
            if definition.component_type == "employee_pf" {
                definition.is_active = false;
            }
        }
        let structure = SalaryStructure::legacy(legacy_fields());

        assert_eq!(
            migrate_structure(&structure, &table, &catalog),
            StructureMigration::Blocked {
                component_types: vec!["employee_pf".to_string()],
            }
        );

        // A disabled entry the employee has no amount for does not block.
        let no_pf = SalaryStructure::legacy(LegacySalaryFields {
            employee_pf: Decimal::ZERO,
            ..legacy_fields()
        });
        assert!(matches!(
            migrate_structure(&no_pf, &table, &catalog),
            StructureMigration::Migrated(_)
        ));
    }

    #[test]
    fn test_migrated_structure_resolves_like_legacy() {
        let table = mappings();
        let catalog = missing_definitions(&TenantId::new("acme"), &table, &[], Utc::now());
        let mut employee = Employee {
            id: "emp_001".to_string(),
            tenant_id: TenantId::new("acme"),
            name: "Asha Rao".to_string(),
            status: EmployeeStatus::Active,
            date_of_joining: None,
            custom_casual_leave_per_month: None,
            custom_sick_leave_per_year: None,
            custom_annual_leave_per_year: None,
            salary: SalaryStructure::legacy(legacy_fields()),
        };

        let before = resolve_components(&employee, &catalog, &table, 1).unwrap();
        employee.salary = expect_migrated(migrate_structure(&employee.salary, &table, &catalog));
        let after = resolve_components(&employee, &catalog, &table, 1).unwrap();

        assert_eq!(before.items, after.items);
    }
}

//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

use super::types::{
    EngineConfig, EngineMetadata, LeavePolicy, LegacyMappingTable, LoanTypeTable,
    LoanTypesConfig, PoliciesConfig, RatingPolicy, SalaryComponentsConfig,
};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── engine.yaml             # Engine metadata
/// ├── loan_types.yaml         # Loan type -> default annual interest rate
/// ├── salary_components.yaml  # Legacy field -> catalog component mappings
/// └── policies.yaml           # Leave and rating policy constants
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// let rate = loader.loan_rate("Personal Loan").unwrap();
/// println!("Personal loans default to {}%", rate);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing, contains invalid
    /// YAML, or if the legacy mapping table has duplicate entries.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<EngineMetadata>(&path.join("engine.yaml"))?;
        let loan_types = Self::load_yaml::<LoanTypesConfig>(&path.join("loan_types.yaml"))?;
        let components =
            Self::load_yaml::<SalaryComponentsConfig>(&path.join("salary_components.yaml"))?;
        let policies = Self::load_yaml::<PoliciesConfig>(&path.join("policies.yaml"))?;

        let legacy_mappings = LegacyMappingTable::new(components.mappings).map_err(|e| {
            EngineError::ConfigParseError {
                path: path.join("salary_components.yaml").display().to_string(),
                message: e.to_string(),
            }
        })?;

        let config = EngineConfig::new(
            metadata,
            LoanTypeTable::new(loan_types.loan_types),
            legacy_mappings,
            policies,
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        self.config.metadata()
    }

    /// Gets the default annual interest rate for a loan type.
    pub fn loan_rate(&self, loan_type: &str) -> EngineResult<Decimal> {
        self.config.loan_types().rate_for(loan_type)
    }

    /// Returns the loan type table.
    pub fn loan_types(&self) -> &LoanTypeTable {
        self.config.loan_types()
    }

    /// Returns the legacy field to component mapping table.
    pub fn legacy_mappings(&self) -> &LegacyMappingTable {
        self.config.legacy_mappings()
    }

    /// Returns the leave policy.
    pub fn leave_policy(&self) -> &LeavePolicy {
        self.config.leave_policy()
    }

    /// Returns the rating policy.
    pub fn rating_policy(&self) -> &RatingPolicy {
        self.config.rating_policy()
    }
}

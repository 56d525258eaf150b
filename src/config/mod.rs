//! Configuration loading and management for the payroll engine.
//!
//! This module loads the engine's external lookup tables (loan type rates,
//! the legacy salary field mapping) and policy constants from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, EngineMetadata, LeavePolicy, LegacyComponentMapping, LegacyMappingTable,
    LoanTypeTable, LoanTypesConfig, PoliciesConfig, RatingPolicy, SalaryComponentsConfig,
};

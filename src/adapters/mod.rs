//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod json_config_adapter;
pub mod json_registry_adapter;
pub mod json_report_adapter;
pub mod simulated_market;

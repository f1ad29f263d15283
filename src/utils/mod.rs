// file: src/utils/mod.rs
// description: utility functions module exports

pub mod logging;
pub mod telemetry;
pub mod validation;

pub use telemetry::{HealthCheck, HealthReport, HealthStatus, OperationTimer, PerformanceMetrics};
pub use validation::Validator;

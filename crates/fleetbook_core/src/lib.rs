//! Core data access for the Fleetbook vehicle registry.
//! This crate owns vehicle validation and persistence rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::vehicle::{Vehicle, VehicleId, VehicleValidationError, UNASSIGNED_VEHICLE_ID};
pub use repo::memory_repo::InMemoryVehicleRepository;
pub use repo::vehicle_repo::{
    RepoError, RepoResult, SqliteVehicleRepository, VehicleListQuery, VehicleRepository,
    DEFAULT_PAGE_SIZE,
};
pub use service::vehicle_service::VehicleService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

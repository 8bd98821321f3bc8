//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the vehicle data access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Vehicle::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to backing-store errors.

pub mod memory_repo;
pub mod vehicle_repo;

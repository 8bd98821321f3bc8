//! Domain model for the vehicle registry.
//!
//! # Responsibility
//! - Define canonical data structures used by repositories and services.
//!
//! # Invariants
//! - Every persisted vehicle is identified by a stable integer `VehicleId`.
//! - Deletion is a hard delete; ids are never handed out again.

pub mod vehicle;

//! Vehicle use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for core callers.
//! - Normalize free-text input before it reaches the repository.
//! - Emit metadata-only diagnostic events per operation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Repository errors are returned unchanged.
//! - Log lines never include vehicle names or brands.

use crate::model::vehicle::{Vehicle, VehicleId};
use crate::repo::vehicle_repo::{RepoError, RepoResult, VehicleListQuery, VehicleRepository};
use log::{debug, info, warn};
use std::time::Instant;

/// Use-case service wrapper for vehicle CRUD operations.
pub struct VehicleService<R: VehicleRepository> {
    repo: R,
}

impl<R: VehicleRepository> VehicleService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lists one page of vehicles using optional name/brand filters.
    pub fn list_vehicles(&self, query: &VehicleListQuery) -> RepoResult<Vec<Vehicle>> {
        let started_at = Instant::now();
        let result = self.repo.list_vehicles(query);
        if let Ok(items) = &result {
            debug!(
                "event=vehicle_list module=vehicle_service status=ok page={} name_filter={} brand_filter={} count={} duration_ms={}",
                query.effective_page(),
                query.name_filter().is_some(),
                query.brand_filter().is_some(),
                items.len(),
                started_at.elapsed().as_millis()
            );
        }
        log_failure("vehicle_list", None, &result);
        result
    }

    /// Gets one vehicle by id; absence is `Ok(None)`.
    pub fn find_vehicle_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>> {
        let result = self.repo.find_vehicle_by_id(id);
        log_failure("vehicle_get", Some(id), &result);
        result
    }

    /// Creates a vehicle after trimming `name`/`brand`.
    ///
    /// Returns the assigned (or caller-provided) id.
    pub fn create_vehicle(&self, vehicle: &Vehicle) -> RepoResult<VehicleId> {
        let started_at = Instant::now();
        let result = self.repo.create_vehicle(&normalized(vehicle));
        if let Ok(id) = &result {
            info!(
                "event=vehicle_create module=vehicle_service status=ok id={id} duration_ms={}",
                started_at.elapsed().as_millis()
            );
        }
        log_failure("vehicle_create", Some(vehicle.id), &result);
        result
    }

    /// Registers a new vehicle with a store-assigned id and returns the
    /// stored record.
    ///
    /// # Errors
    /// - Repository errors unchanged.
    /// - `InvalidData` when the created row cannot be read back.
    pub fn register_vehicle(
        &self,
        name: impl Into<String>,
        brand: impl Into<String>,
        year: i32,
    ) -> RepoResult<Vehicle> {
        let id = self.create_vehicle(&Vehicle::new(name, brand, year))?;
        self.repo.find_vehicle_by_id(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created vehicle {id} not found in read-back"))
        })
    }

    /// Replaces `name`, `brand` and `year` of an existing vehicle by id.
    pub fn update_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()> {
        let result = self.repo.update_vehicle(&normalized(vehicle));
        if result.is_ok() {
            info!(
                "event=vehicle_update module=vehicle_service status=ok id={}",
                vehicle.id
            );
        }
        log_failure("vehicle_update", Some(vehicle.id), &result);
        result
    }

    /// Deletes the vehicle with the same id.
    pub fn delete_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()> {
        let result = self.repo.delete_vehicle(vehicle);
        if result.is_ok() {
            info!(
                "event=vehicle_delete module=vehicle_service status=ok id={}",
                vehicle.id
            );
        }
        log_failure("vehicle_delete", Some(vehicle.id), &result);
        result
    }
}

fn normalized(vehicle: &Vehicle) -> Vehicle {
    Vehicle {
        id: vehicle.id,
        name: vehicle.name.trim().to_string(),
        brand: vehicle.brand.trim().to_string(),
        year: vehicle.year,
    }
}

fn log_failure<T>(event: &str, id: Option<VehicleId>, result: &RepoResult<T>) {
    let Err(err) = result else {
        return;
    };
    let id = id.map_or_else(|| "none".to_string(), |id| id.to_string());
    warn!(
        "event={event} module=vehicle_service status=error id={id} error_code={}",
        error_code(err)
    );
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation_failed",
        RepoError::Db(_) => "db_error",
        RepoError::NotFound(_) => "not_found",
        RepoError::Conflict(_) => "conflict",
        RepoError::IdSpaceExhausted => "id_space_exhausted",
        RepoError::InvalidData(_) => "invalid_data",
        RepoError::UninitializedConnection { .. }
        | RepoError::MissingRequiredTable(_)
        | RepoError::MissingRequiredColumn { .. } => "connection_not_ready",
    }
}

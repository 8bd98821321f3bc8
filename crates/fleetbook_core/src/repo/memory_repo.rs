//! In-memory vehicle repository.
//!
//! # Responsibility
//! - Provide the `VehicleRepository` contract without a database, for tests
//!   and embedders that do not need durability.
//!
//! # Invariants
//! - Same filter, ordering and paging semantics as `SqliteVehicleRepository`.
//! - Assigned ids are monotonic and never reused, even after deletes.

use crate::model::vehicle::{Vehicle, VehicleId};
use crate::repo::vehicle_repo::{
    normalize_page_size, RepoError, RepoResult, VehicleListQuery, VehicleRepository,
    DEFAULT_PAGE_SIZE,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Map-backed vehicle repository. Single-threaded.
#[derive(Debug)]
pub struct InMemoryVehicleRepository {
    vehicles: RefCell<BTreeMap<VehicleId, Vehicle>>,
    last_id: Cell<VehicleId>,
    page_size: u32,
}

impl Default for InMemoryVehicleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryVehicleRepository {
    pub fn new() -> Self {
        Self {
            vehicles: RefCell::new(BTreeMap::new()),
            last_id: Cell::new(0),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Overrides the list page size. `0` restores the default.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = normalize_page_size(page_size);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of stored vehicles.
    pub fn len(&self) -> usize {
        self.vehicles.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.borrow().is_empty()
    }
}

impl VehicleRepository for InMemoryVehicleRepository {
    fn list_vehicles(&self, query: &VehicleListQuery) -> RepoResult<Vec<Vehicle>> {
        let skip = usize::try_from(query.offset(self.page_size)).unwrap_or(usize::MAX);
        let take = usize::try_from(self.page_size).unwrap_or(usize::MAX);

        Ok(self
            .vehicles
            .borrow()
            .values()
            .filter(|vehicle| query.matches(vehicle))
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    fn find_vehicle_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>> {
        Ok(self.vehicles.borrow().get(&id).cloned())
    }

    fn create_vehicle(&self, vehicle: &Vehicle) -> RepoResult<VehicleId> {
        vehicle.validate()?;

        let mut vehicles = self.vehicles.borrow_mut();
        let id = if vehicle.has_id() {
            if vehicles.contains_key(&vehicle.id) {
                return Err(RepoError::Conflict(vehicle.id));
            }
            vehicle.id
        } else {
            self.last_id
                .get()
                .checked_add(1)
                .ok_or(RepoError::IdSpaceExhausted)?
        };

        // Same as SQLite AUTOINCREMENT: explicit ids advance the sequence.
        self.last_id.set(self.last_id.get().max(id));

        let mut stored = vehicle.clone();
        stored.id = id;
        vehicles.insert(id, stored);
        Ok(id)
    }

    fn update_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()> {
        vehicle.validate()?;

        match self.vehicles.borrow_mut().get_mut(&vehicle.id) {
            Some(stored) => {
                stored.name.clone_from(&vehicle.name);
                stored.brand.clone_from(&vehicle.brand);
                stored.year = vehicle.year;
                Ok(())
            }
            None => Err(RepoError::NotFound(vehicle.id)),
        }
    }

    fn delete_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()> {
        self.vehicles
            .borrow_mut()
            .remove(&vehicle.id)
            .map(|_| ())
            .ok_or(RepoError::NotFound(vehicle.id))
    }
}

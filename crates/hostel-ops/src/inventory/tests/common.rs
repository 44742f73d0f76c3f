use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::AllocationConfig;
use crate::inventory::architecture::{FloorSpec, RoomSpec};
use crate::inventory::domain::{Hostel, HostelId};
use crate::inventory::repository::{HostelRepository, RepositoryError, ResidentRepository};
use crate::inventory::residents::{Resident, ResidentId, ResidentSubmission};
use crate::inventory::service::{HostelRegistration, InventoryService};

pub(super) type MemoryService = InventoryService<MemoryHostels, MemoryResidents>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2026, 6, 1)
}

pub(super) fn allocation_config() -> AllocationConfig {
    AllocationConfig {
        lock_timeout: Duration::from_millis(200),
    }
}

/// One floor "Ground" with room 101 (capacity 2) and room 102 (capacity 1).
pub(super) fn ground_floor() -> Vec<FloorSpec> {
    vec![FloorSpec {
        name: "Ground".to_string(),
        rooms: vec![RoomSpec::new("101", 2), RoomSpec::new("102", 1)],
    }]
}

pub(super) fn single_rooms() -> Vec<FloorSpec> {
    vec![FloorSpec {
        name: "Ground".to_string(),
        rooms: vec![RoomSpec::new("101", 1), RoomSpec::new("102", 1)],
    }]
}

pub(super) fn submission(name: &str) -> ResidentSubmission {
    ResidentSubmission {
        name: name.to_string(),
        email: None,
        duration_months: 6,
        join_date: Some(today()),
    }
}

/// A submission whose tenancy ended before [`today`].
pub(super) fn lapsed_submission(name: &str) -> ResidentSubmission {
    ResidentSubmission {
        name: name.to_string(),
        email: None,
        duration_months: 1,
        join_date: Some(date(2026, 1, 10)),
    }
}

pub(super) fn build_service() -> (Arc<MemoryService>, Arc<MemoryHostels>, Arc<MemoryResidents>) {
    let hostels = Arc::new(MemoryHostels::default());
    let residents = Arc::new(MemoryResidents::default());
    let service = Arc::new(InventoryService::new(
        hostels.clone(),
        residents.clone(),
        allocation_config(),
    ));
    (service, hostels, residents)
}

pub(super) async fn hostel_with<H, R>(service: &InventoryService<H, R>, floors: Vec<FloorSpec>) -> Hostel
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    let hostel = service
        .register_hostel(HostelRegistration {
            name: "Riverside".to_string(),
        })
        .expect("hostel registers");
    service
        .define_architecture(hostel.id(), floors)
        .await
        .expect("architecture defined")
}

pub(super) fn assert_inventory_consistent(hostel: &Hostel) {
    for room in hostel.rooms() {
        assert!(
            room.occupants() <= room.capacity(),
            "room {} over capacity",
            room.number()
        );
        assert_eq!(room.is_occupied(), room.occupants() >= room.capacity());
    }
    let occupied = hostel.rooms().filter(|room| room.is_occupied()).count() as u32;
    assert_eq!(hostel.occupied_rooms(), occupied);
}

#[derive(Default, Clone)]
pub(super) struct MemoryHostels {
    pub(super) records: Arc<Mutex<HashMap<HostelId, Hostel>>>,
}

impl MemoryHostels {
    pub(super) fn remove(&self, id: &HostelId) {
        self.records.lock().expect("hostel mutex poisoned").remove(id);
    }
}

impl HostelRepository for MemoryHostels {
    fn insert(&self, hostel: Hostel) -> Result<Hostel, RepositoryError> {
        let mut guard = self.records.lock().expect("hostel mutex poisoned");
        if guard.contains_key(hostel.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(hostel.id().clone(), hostel.clone());
        Ok(hostel)
    }

    fn update(&self, hostel: Hostel) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("hostel mutex poisoned");
        guard.insert(hostel.id().clone(), hostel);
        Ok(())
    }

    fn fetch(&self, id: &HostelId) -> Result<Option<Hostel>, RepositoryError> {
        let guard = self.records.lock().expect("hostel mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryResidents {
    pub(super) records: Arc<Mutex<HashMap<ResidentId, Resident>>>,
}

impl MemoryResidents {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("resident mutex poisoned").len()
    }
}

impl ResidentRepository for MemoryResidents {
    fn insert(&self, resident: Resident) -> Result<Resident, RepositoryError> {
        let mut guard = self.records.lock().expect("resident mutex poisoned");
        if guard.contains_key(&resident.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(resident.id.clone(), resident.clone());
        Ok(resident)
    }

    fn update(&self, resident: Resident) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("resident mutex poisoned");
        guard.insert(resident.id.clone(), resident);
        Ok(())
    }

    fn fetch(&self, id: &ResidentId) -> Result<Option<Resident>, RepositoryError> {
        let guard = self.records.lock().expect("resident mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &ResidentId) -> Result<Option<Resident>, RepositoryError> {
        let mut guard = self.records.lock().expect("resident mutex poisoned");
        Ok(guard.remove(id))
    }

    fn for_hostel(&self, hostel_id: &HostelId) -> Result<Vec<Resident>, RepositoryError> {
        let guard = self.records.lock().expect("resident mutex poisoned");
        Ok(guard
            .values()
            .filter(|resident| &resident.hostel_id == hostel_id)
            .cloned()
            .collect())
    }

    fn expired(&self, today: NaiveDate) -> Result<Vec<Resident>, RepositoryError> {
        let guard = self.records.lock().expect("resident mutex poisoned");
        Ok(guard
            .values()
            .filter(|resident| resident.is_expired(today))
            .cloned()
            .collect())
    }
}

/// Accepts nothing new; reads succeed against an empty store.
pub(super) struct RejectingResidents;

impl ResidentRepository for RejectingResidents {
    fn insert(&self, _resident: Resident) -> Result<Resident, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _resident: Resident) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ResidentId) -> Result<Option<Resident>, RepositoryError> {
        Ok(None)
    }

    fn delete(&self, _id: &ResidentId) -> Result<Option<Resident>, RepositoryError> {
        Ok(None)
    }

    fn for_hostel(&self, _hostel_id: &HostelId) -> Result<Vec<Resident>, RepositoryError> {
        Ok(Vec::new())
    }

    fn expired(&self, _today: NaiveDate) -> Result<Vec<Resident>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Memory store whose deletes or a chosen update call can be made to fail.
#[derive(Default)]
pub(super) struct FlakyResidents {
    pub(super) inner: MemoryResidents,
    fail_deletes: AtomicBool,
    update_calls: AtomicUsize,
    failing_update: Mutex<Option<usize>>,
}

impl FlakyResidents {
    pub(super) fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Fails only the `call`-th update from now on, counting from zero.
    pub(super) fn fail_update_call(&self, call: usize) {
        self.update_calls.store(0, Ordering::SeqCst);
        *self.failing_update.lock().expect("flaky mutex poisoned") = Some(call);
    }
}

impl ResidentRepository for FlakyResidents {
    fn insert(&self, resident: Resident) -> Result<Resident, RepositoryError> {
        self.inner.insert(resident)
    }

    fn update(&self, resident: Resident) -> Result<(), RepositoryError> {
        let call = self.update_calls.fetch_add(1, Ordering::SeqCst);
        if *self.failing_update.lock().expect("flaky mutex poisoned") == Some(call) {
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        self.inner.update(resident)
    }

    fn fetch(&self, id: &ResidentId) -> Result<Option<Resident>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn delete(&self, id: &ResidentId) -> Result<Option<Resident>, RepositoryError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        self.inner.delete(id)
    }

    fn for_hostel(&self, hostel_id: &HostelId) -> Result<Vec<Resident>, RepositoryError> {
        self.inner.for_hostel(hostel_id)
    }

    fn expired(&self, today: NaiveDate) -> Result<Vec<Resident>, RepositoryError> {
        self.inner.expired(today)
    }
}

pub(super) type FlakyService = InventoryService<MemoryHostels, FlakyResidents>;

pub(super) fn build_flaky_service() -> (Arc<FlakyService>, Arc<MemoryHostels>, Arc<FlakyResidents>) {
    let hostels = Arc::new(MemoryHostels::default());
    let residents = Arc::new(FlakyResidents::default());
    let service = Arc::new(InventoryService::new(
        hostels.clone(),
        residents.clone(),
        allocation_config(),
    ));
    (service, hostels, residents)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

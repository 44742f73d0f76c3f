use chrono::NaiveDate;
use hostel_ops::inventory::{
    Hostel, HostelId, HostelRepository, RepositoryError, Resident, ResidentId,
    ResidentRepository, SweepTotals,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) sweeper: Arc<SweepTotals>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryHostelRepository {
    records: Arc<Mutex<HashMap<HostelId, Hostel>>>,
}

impl HostelRepository for InMemoryHostelRepository {
    fn insert(&self, hostel: Hostel) -> Result<Hostel, RepositoryError> {
        let mut guard = lock(&self.records);
        if guard.contains_key(hostel.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(hostel.id().clone(), hostel.clone());
        Ok(hostel)
    }

    fn update(&self, hostel: Hostel) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records);
        if guard.contains_key(hostel.id()) {
            guard.insert(hostel.id().clone(), hostel);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &HostelId) -> Result<Option<Hostel>, RepositoryError> {
        Ok(lock(&self.records).get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryResidentRepository {
    records: Arc<Mutex<HashMap<ResidentId, Resident>>>,
}

impl ResidentRepository for InMemoryResidentRepository {
    fn insert(&self, resident: Resident) -> Result<Resident, RepositoryError> {
        let mut guard = lock(&self.records);
        if guard.contains_key(&resident.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(resident.id.clone(), resident.clone());
        Ok(resident)
    }

    fn update(&self, resident: Resident) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records);
        if guard.contains_key(&resident.id) {
            guard.insert(resident.id.clone(), resident);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ResidentId) -> Result<Option<Resident>, RepositoryError> {
        Ok(lock(&self.records).get(id).cloned())
    }

    fn delete(&self, id: &ResidentId) -> Result<Option<Resident>, RepositoryError> {
        Ok(lock(&self.records).remove(id))
    }

    fn for_hostel(&self, hostel_id: &HostelId) -> Result<Vec<Resident>, RepositoryError> {
        Ok(lock(&self.records)
            .values()
            .filter(|resident| &resident.hostel_id == hostel_id)
            .cloned()
            .collect())
    }

    fn expired(&self, today: NaiveDate) -> Result<Vec<Resident>, RepositoryError> {
        Ok(lock(&self.records)
            .values()
            .filter(|resident| resident.is_expired(today))
            .cloned()
            .collect())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

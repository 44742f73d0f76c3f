use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::allocator::find_available_room;
use super::architecture::{define_architecture, FloorSpec};
use super::domain::{Hostel, HostelId, RoomNumber};
use super::error::InventoryError;
use super::locks::{HostelGuard, HostelLocks, LockTimeout};
use super::occupancy;
use super::repository::{HostelRepository, RepositoryError, ResidentRepository};
use super::residents::{Resident, ResidentId, ResidentSubmission};
use crate::config::AllocationConfig;

/// Service composing the lock registry, allocator, occupancy mutator, and repositories.
pub struct InventoryService<H, R> {
    hostels: Arc<H>,
    residents: Arc<R>,
    locks: HostelLocks,
}

static HOSTEL_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static RESIDENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_hostel_id() -> HostelId {
    let id = HOSTEL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    HostelId(format!("hostel-{id:04}"))
}

fn next_resident_id() -> ResidentId {
    let id = RESIDENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ResidentId(format!("res-{id:06}"))
}

/// Payload for registering a hostel before its architecture exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostelRegistration {
    pub name: String,
}

/// What happened to the room bookkeeping when a resident left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Discharge {
    Released { room: RoomNumber },
    HostelMissing,
    RoomMissing { room: RoomNumber },
}

impl Discharge {
    /// The resident was removed but no bed could be returned to the inventory.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Discharge::Released { .. })
    }
}

impl<H, R> InventoryService<H, R>
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    pub fn new(hostels: Arc<H>, residents: Arc<R>, config: AllocationConfig) -> Self {
        Self {
            hostels,
            residents,
            locks: HostelLocks::new(config.lock_timeout),
        }
    }

    pub fn locks(&self) -> &HostelLocks {
        &self.locks
    }

    pub fn register_hostel(
        &self,
        registration: HostelRegistration,
    ) -> Result<Hostel, InventoryServiceError> {
        let name = registration.name.trim();
        if name.is_empty() {
            return Err(InventoryError::InvalidHostel("name must not be empty".to_string()).into());
        }

        let hostel = self
            .hostels
            .insert(Hostel::register(next_hostel_id(), name))?;
        info!(hostel_id = %hostel.id(), name = %hostel.name(), "hostel registered");
        Ok(hostel)
    }

    pub fn hostel(&self, hostel_id: &HostelId) -> Result<Hostel, InventoryServiceError> {
        self.load_hostel(hostel_id)
    }

    pub fn resident(&self, resident_id: &ResidentId) -> Result<Resident, InventoryServiceError> {
        self.load_resident(resident_id)
    }

    pub fn residents(&self, hostel_id: &HostelId) -> Result<Vec<Resident>, InventoryServiceError> {
        self.load_hostel(hostel_id)?;
        let mut residents = self.residents.for_hostel(hostel_id)?;
        residents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(residents)
    }

    pub fn expired_residents(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Resident>, InventoryServiceError> {
        Ok(self.residents.expired(today)?)
    }

    /// Installs the hostel's floors and rooms. Allowed exactly once per hostel.
    pub async fn define_architecture(
        &self,
        hostel_id: &HostelId,
        floors: Vec<FloorSpec>,
    ) -> Result<Hostel, InventoryServiceError> {
        let _guard = self.lock(hostel_id).await?;
        let mut hostel = self.load_hostel(hostel_id)?;

        define_architecture(&mut hostel, &floors)?;
        self.hostels.update(hostel.clone())?;

        info!(
            %hostel_id,
            floors = hostel.floors().len(),
            total_rooms = hostel.total_rooms(),
            "architecture defined"
        );
        Ok(hostel)
    }

    /// Creates a resident in the first room with a free bed.
    pub async fn assign_new_resident(
        &self,
        hostel_id: &HostelId,
        submission: ResidentSubmission,
        today: NaiveDate,
    ) -> Result<Resident, InventoryServiceError> {
        let admission = submission.validate(today)?;

        let _guard = self.lock(hostel_id).await?;
        let original = self.load_hostel(hostel_id)?;
        let mut hostel = original.clone();

        let room = find_available_room(&hostel)?.number().clone();
        debug!(%hostel_id, %room, "allocator selected room");
        occupancy::assign(&mut hostel, &room)?;
        self.hostels.update(hostel)?;

        let resident = Resident::admit(next_resident_id(), hostel_id.clone(), room, admission);
        match self.residents.insert(resident) {
            Ok(stored) => {
                info!(
                    %hostel_id,
                    resident_id = %stored.id,
                    room = %stored.room(),
                    end_date = %stored.end_date(),
                    "resident assigned"
                );
                Ok(stored)
            }
            Err(err) => {
                self.restore_hostel(original);
                Err(err.into())
            }
        }
    }

    /// Moves a resident into a named room that still has a free bed.
    pub async fn relocate_resident(
        &self,
        resident_id: &ResidentId,
        new_room: RoomNumber,
    ) -> Result<Resident, InventoryServiceError> {
        let (guard, mut resident) = self.lock_resident(resident_id).await?;
        let original = self.load_hostel(guard.hostel_id())?;
        let mut hostel = original.clone();
        let previous = resident.room().clone();

        occupancy::relocate(&mut hostel, &mut resident, &new_room)?;
        if previous == new_room {
            return Ok(resident);
        }

        self.hostels.update(hostel)?;
        if let Err(err) = self.residents.update(resident.clone()) {
            self.restore_hostel(original);
            return Err(err.into());
        }

        info!(
            hostel_id = %resident.hostel_id,
            %resident_id,
            from = %previous,
            to = %new_room,
            "resident relocated"
        );
        Ok(resident)
    }

    /// Swaps the rooms of two residents of the same hostel. Room head counts are untouched.
    pub async fn exchange_rooms(
        &self,
        first_id: &ResidentId,
        second_id: &ResidentId,
    ) -> Result<(Resident, Resident), InventoryServiceError> {
        if first_id == second_id {
            return Err(InventoryError::SameResident {
                resident_id: first_id.clone(),
            }
            .into());
        }

        let (guard, mut first) = self.lock_resident(first_id).await?;
        let mut second = self.load_resident(second_id)?;
        if second.hostel_id != *guard.hostel_id() {
            return Err(InventoryError::CrossHostel {
                first: first_id.clone(),
                second: second_id.clone(),
            }
            .into());
        }

        let first_before = first.clone();
        occupancy::exchange(&mut first, &mut second)?;

        self.residents.update(first.clone())?;
        if let Err(err) = self.residents.update(second.clone()) {
            if let Err(rollback) = self.residents.update(first_before) {
                error!(resident_id = %first_id, error = %rollback, "failed to roll back room exchange");
            }
            return Err(err.into());
        }

        info!(
            hostel_id = %guard.hostel_id(),
            first = %first_id,
            second = %second_id,
            "rooms exchanged"
        );
        Ok((first, second))
    }

    /// Deletes a resident and returns their bed to the inventory.
    pub async fn remove_resident(
        &self,
        resident_id: &ResidentId,
    ) -> Result<(Resident, Discharge), InventoryServiceError> {
        let (_guard, resident) = self.lock_resident(resident_id).await?;
        let discharge = self.discharge(&resident)?;
        info!(
            hostel_id = %resident.hostel_id,
            %resident_id,
            degraded = discharge.is_degraded(),
            "resident removed"
        );
        Ok((resident, discharge))
    }

    /// Evicts a resident found by an expiry scan. Returns `None` when the record is
    /// already gone, which happens when a manual removal won the race.
    pub async fn evict(
        &self,
        resident: &Resident,
    ) -> Result<Option<Discharge>, InventoryServiceError> {
        let _guard = self.lock(&resident.hostel_id).await?;
        let current = match self.residents.fetch(&resident.id)? {
            Some(current) => current,
            None => return Ok(None),
        };
        self.discharge(&current).map(Some)
    }

    fn discharge(&self, resident: &Resident) -> Result<Discharge, InventoryServiceError> {
        let (outcome, original) = match self.hostels.fetch(&resident.hostel_id)? {
            None => {
                warn!(
                    hostel_id = %resident.hostel_id,
                    resident_id = %resident.id,
                    "hostel missing; removing resident without releasing a bed"
                );
                (Discharge::HostelMissing, None)
            }
            Some(original) => {
                let mut hostel = original.clone();
                match occupancy::release(&mut hostel, resident.room()) {
                    Ok(()) => {
                        self.hostels.update(hostel)?;
                        let released = Discharge::Released {
                            room: resident.room().clone(),
                        };
                        (released, Some(original))
                    }
                    Err(InventoryError::RoomNotFound { room }) => {
                        warn!(
                            hostel_id = %resident.hostel_id,
                            resident_id = %resident.id,
                            %room,
                            "room missing from inventory; removing resident without releasing a bed"
                        );
                        (Discharge::RoomMissing { room }, None)
                    }
                    Err(other) => return Err(other.into()),
                }
            }
        };

        // The bed must come back if the resident outlives this call.
        if let Err(err) = self.residents.delete(&resident.id) {
            if let Some(original) = original {
                self.restore_hostel(original);
            }
            return Err(err.into());
        }
        Ok(outcome)
    }

    async fn lock(&self, hostel_id: &HostelId) -> Result<HostelGuard, InventoryServiceError> {
        Ok(self.locks.acquire(hostel_id).await?)
    }

    /// Locks the resident's hostel and re-reads the resident under that lock.
    async fn lock_resident(
        &self,
        resident_id: &ResidentId,
    ) -> Result<(HostelGuard, Resident), InventoryServiceError> {
        let unlocked = self.load_resident(resident_id)?;
        let guard = self.lock(&unlocked.hostel_id).await?;
        let resident = self.load_resident(resident_id)?;
        Ok((guard, resident))
    }

    fn load_hostel(&self, hostel_id: &HostelId) -> Result<Hostel, InventoryServiceError> {
        self.hostels.fetch(hostel_id)?.ok_or_else(|| {
            InventoryError::HostelNotFound {
                hostel_id: hostel_id.clone(),
            }
            .into()
        })
    }

    fn load_resident(&self, resident_id: &ResidentId) -> Result<Resident, InventoryServiceError> {
        self.residents.fetch(resident_id)?.ok_or_else(|| {
            InventoryError::ResidentNotFound {
                resident_id: resident_id.clone(),
            }
            .into()
        })
    }

    fn restore_hostel(&self, original: Hostel) {
        let hostel_id = original.id().clone();
        if let Err(err) = self.hostels.update(original) {
            error!(%hostel_id, error = %err, "failed to restore inventory after a partial write");
        }
    }
}

/// Error raised by the inventory service.
#[derive(Debug, thiserror::Error)]
pub enum InventoryServiceError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("hostel {hostel_id} is busy; retry later")]
    Busy { hostel_id: HostelId },
}

impl From<LockTimeout> for InventoryServiceError {
    fn from(value: LockTimeout) -> Self {
        Self::Busy {
            hostel_id: value.hostel_id,
        }
    }
}

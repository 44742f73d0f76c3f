use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::domain::HostelId;

/// Per-hostel exclusive locks with a bounded wait.
///
/// Holding a hostel's guard makes "find a room" and "commit the assignment" one unit.
/// Different hostels never contend with each other.
#[derive(Debug)]
pub struct HostelLocks {
    slots: Mutex<HashMap<HostelId, Arc<AsyncMutex<()>>>>,
    timeout: Duration,
}

/// Proof that the caller holds a hostel's lock; released on drop.
#[derive(Debug)]
pub struct HostelGuard {
    hostel_id: HostelId,
    _guard: OwnedMutexGuard<()>,
}

impl HostelGuard {
    pub fn hostel_id(&self) -> &HostelId {
        &self.hostel_id
    }
}

/// The lock could not be acquired within the configured timeout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("hostel {hostel_id} is busy (waited {waited:?})")]
pub struct LockTimeout {
    pub hostel_id: HostelId,
    pub waited: Duration,
}

impl HostelLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn acquire(&self, hostel_id: &HostelId) -> Result<HostelGuard, LockTimeout> {
        let slot = self.slot(hostel_id);
        match tokio::time::timeout(self.timeout, slot.lock_owned()).await {
            Ok(guard) => Ok(HostelGuard {
                hostel_id: hostel_id.clone(),
                _guard: guard,
            }),
            Err(_) => Err(LockTimeout {
                hostel_id: hostel_id.clone(),
                waited: self.timeout,
            }),
        }
    }

    fn slot(&self, hostel_id: &HostelId) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(hostel_id.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

impl Default for HostelLocks {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

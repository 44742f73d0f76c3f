use chrono::NaiveDate;

use super::domain::{Hostel, HostelId};
use super::residents::{Resident, ResidentId};

/// Storage for hostel records, each embedding its full inventory.
pub trait HostelRepository: Send + Sync {
    fn insert(&self, hostel: Hostel) -> Result<Hostel, RepositoryError>;
    fn update(&self, hostel: Hostel) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &HostelId) -> Result<Option<Hostel>, RepositoryError>;
}

/// Storage for resident records, which reference rooms by number only.
pub trait ResidentRepository: Send + Sync {
    fn insert(&self, resident: Resident) -> Result<Resident, RepositoryError>;
    fn update(&self, resident: Resident) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ResidentId) -> Result<Option<Resident>, RepositoryError>;
    fn delete(&self, id: &ResidentId) -> Result<Option<Resident>, RepositoryError>;
    fn for_hostel(&self, hostel_id: &HostelId) -> Result<Vec<Resident>, RepositoryError>;
    /// Residents whose end date lies strictly before `today`.
    fn expired(&self, today: NaiveDate) -> Result<Vec<Resident>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

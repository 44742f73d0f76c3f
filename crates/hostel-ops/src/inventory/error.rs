use super::architecture::ArchitectureViolation;
use super::domain::{HostelId, RoomNumber};
use super::residents::ResidentId;

/// Expected, recoverable failures of the inventory core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("invalid architecture: {0}")]
    InvalidArchitecture(#[from] ArchitectureViolation),
    #[error("architecture for hostel {hostel_id} is already defined")]
    AlreadyDefined { hostel_id: HostelId },
    #[error("architecture for hostel {hostel_id} has not been defined")]
    ArchitectureNotDefined { hostel_id: HostelId },
    #[error("no room with free capacity in hostel {hostel_id}")]
    NoAvailableRoom { hostel_id: HostelId },
    #[error("room {room} does not exist")]
    RoomNotFound { room: RoomNumber },
    #[error("room {room} is full")]
    RoomFull { room: RoomNumber },
    #[error("resident {resident_id} not found")]
    ResidentNotFound { resident_id: ResidentId },
    #[error("hostel {hostel_id} not found")]
    HostelNotFound { hostel_id: HostelId },
    #[error("residents {first} and {second} belong to different hostels")]
    CrossHostel { first: ResidentId, second: ResidentId },
    #[error("resident {resident_id} cannot exchange rooms with themselves")]
    SameResident { resident_id: ResidentId },
    #[error("invalid resident: {0}")]
    InvalidResident(String),
    #[error("invalid hostel: {0}")]
    InvalidHostel(String),
}

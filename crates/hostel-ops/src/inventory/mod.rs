//! Hostel room inventory and occupancy allocation.
//!
//! Floors and rooms are defined once per hostel. New residents are placed by a first-fit
//! scan, and every change to room head counts goes through [`occupancy`] while the hostel's
//! lock is held. A background [`sweeper`] evicts residents whose tenancy has ended.

pub mod allocator;
pub mod architecture;
pub mod domain;
pub mod error;
pub mod locks;
pub mod occupancy;
pub mod repository;
pub mod residents;
pub mod router;
pub mod service;
pub mod sweeper;

#[cfg(test)]
mod tests;

pub use allocator::find_available_room;
pub use architecture::{
    define_architecture, validate_architecture, ArchitectureViolation, FloorSpec, RoomSpec,
    DEFAULT_ROOM_CAPACITY,
};
pub use domain::{Floor, Hostel, HostelId, HostelRecord, OccupancySummary, Room, RoomNumber};
pub use error::InventoryError;
pub use locks::{HostelGuard, HostelLocks, LockTimeout};
pub use repository::{HostelRepository, RepositoryError, ResidentRepository};
pub use residents::{Resident, ResidentAdmission, ResidentId, ResidentSubmission};
pub use router::inventory_router;
pub use service::{Discharge, HostelRegistration, InventoryService, InventoryServiceError};
pub use sweeper::{ExpirySweeper, SweepReport, SweepTotals, SweepTotalsSnapshot, SweeperState};

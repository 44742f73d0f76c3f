//! The only code that changes room head counts and the hostel aggregate.
//!
//! Every function leaves `occupied == (occupants >= capacity)` on the rooms it touched
//! and recounts `occupied_rooms` from the rooms instead of adjusting it incrementally.
//! Failures are reported before anything is mutated.

use super::domain::{Hostel, RoomNumber};
use super::error::InventoryError;
use super::residents::Resident;

/// Consumes one bed in `room`.
pub fn assign(hostel: &mut Hostel, room: &RoomNumber) -> Result<(), InventoryError> {
    let target = hostel
        .room_mut(room)
        .ok_or_else(|| InventoryError::RoomNotFound { room: room.clone() })?;
    if !target.has_free_capacity() {
        return Err(InventoryError::RoomFull { room: room.clone() });
    }

    target.occupants += 1;
    target.sync_occupied();
    hostel.recount_occupied();
    Ok(())
}

/// Frees one bed in `room`. The head count never drops below zero.
pub fn release(hostel: &mut Hostel, room: &RoomNumber) -> Result<(), InventoryError> {
    let target = hostel
        .room_mut(room)
        .ok_or_else(|| InventoryError::RoomNotFound { room: room.clone() })?;

    target.occupants = target.occupants.saturating_sub(1);
    target.sync_occupied();
    hostel.recount_occupied();
    Ok(())
}

/// Swaps the room assignments of two residents of the same hostel.
///
/// Both rooms keep their head counts; only the resident-to-room mapping changes.
pub fn exchange(first: &mut Resident, second: &mut Resident) -> Result<(), InventoryError> {
    if first.id == second.id {
        return Err(InventoryError::SameResident {
            resident_id: first.id.clone(),
        });
    }
    if first.hostel_id != second.hostel_id {
        return Err(InventoryError::CrossHostel {
            first: first.id.clone(),
            second: second.id.clone(),
        });
    }

    std::mem::swap(&mut first.room, &mut second.room);
    Ok(())
}

/// Moves a resident into a specific room that still has a free bed.
pub fn relocate(
    hostel: &mut Hostel,
    resident: &mut Resident,
    new_room: &RoomNumber,
) -> Result<(), InventoryError> {
    let target = hostel
        .room(new_room)
        .ok_or_else(|| InventoryError::RoomNotFound {
            room: new_room.clone(),
        })?;
    if resident.room == *new_room {
        return Ok(());
    }
    if target.is_occupied() {
        return Err(InventoryError::RoomFull {
            room: new_room.clone(),
        });
    }
    if hostel.room(&resident.room).is_none() {
        return Err(InventoryError::RoomNotFound {
            room: resident.room.clone(),
        });
    }

    release(hostel, &resident.room)?;
    assign(hostel, new_room)?;
    resident.room = new_room.clone();
    Ok(())
}

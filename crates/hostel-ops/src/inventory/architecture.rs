//! One-time definition of a hostel's floors and rooms.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{Floor, Hostel, Room, RoomNumber};
use super::error::InventoryError;

pub const DEFAULT_ROOM_CAPACITY: u32 = 1;

/// Requested layout of a single floor, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorSpec {
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<RoomSpec>,
}

/// Requested room; capacity falls back to [`DEFAULT_ROOM_CAPACITY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub number: String,
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl RoomSpec {
    pub fn new(number: impl Into<String>, capacity: u32) -> Self {
        Self {
            number: number.into(),
            capacity: Some(capacity),
        }
    }
}

/// Structural problems found in a requested layout. Positions are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArchitectureViolation {
    #[error("at least one floor is required")]
    NoFloors,
    #[error("floor {floor} has an empty name")]
    EmptyFloorName { floor: usize },
    #[error("floor '{name}' has no rooms")]
    FloorWithoutRooms { name: String },
    #[error("floor '{floor}' has a room with an empty number")]
    EmptyRoomNumber { floor: String },
    #[error("room {room} must have a capacity of at least 1")]
    ZeroCapacity { room: String },
    #[error("room {room} is declared more than once")]
    DuplicateRoomNumber { room: String },
}

/// Checks a layout without touching any hostel.
pub fn validate_architecture(floors: &[FloorSpec]) -> Result<(), ArchitectureViolation> {
    if floors.is_empty() {
        return Err(ArchitectureViolation::NoFloors);
    }

    let mut seen = HashSet::new();
    for (position, floor) in floors.iter().enumerate() {
        let name = floor.name.trim();
        if name.is_empty() {
            return Err(ArchitectureViolation::EmptyFloorName { floor: position });
        }
        if floor.rooms.is_empty() {
            return Err(ArchitectureViolation::FloorWithoutRooms {
                name: name.to_string(),
            });
        }

        for room in &floor.rooms {
            let number = room.number.trim();
            if number.is_empty() {
                return Err(ArchitectureViolation::EmptyRoomNumber {
                    floor: name.to_string(),
                });
            }
            if room.capacity == Some(0) {
                return Err(ArchitectureViolation::ZeroCapacity {
                    room: number.to_string(),
                });
            }
            if !seen.insert(number) {
                return Err(ArchitectureViolation::DuplicateRoomNumber {
                    room: number.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Installs the layout on a hostel that has none yet.
///
/// Declaration order becomes the explicit `sequence` of every floor and room, which is
/// what the allocator scans by. Room count is fixed from here on.
pub fn define_architecture(hostel: &mut Hostel, floors: &[FloorSpec]) -> Result<(), InventoryError> {
    if hostel.architecture_defined {
        return Err(InventoryError::AlreadyDefined {
            hostel_id: hostel.id.clone(),
        });
    }
    validate_architecture(floors)?;

    let floors: Vec<Floor> = floors
        .iter()
        .zip(0u32..)
        .map(|(spec, floor_sequence)| Floor {
            sequence: floor_sequence,
            name: spec.name.trim().to_string(),
            rooms: spec
                .rooms
                .iter()
                .zip(0u32..)
                .map(|(room, room_sequence)| {
                    Room::new(
                        room_sequence,
                        RoomNumber(room.number.trim().to_string()),
                        room.capacity.unwrap_or(DEFAULT_ROOM_CAPACITY),
                    )
                })
                .collect(),
        })
        .collect();

    let total_rooms: usize = floors.iter().map(|floor| floor.rooms.len()).sum();
    hostel.install_floors(floors);
    hostel.total_rooms = total_rooms as u32;
    hostel.recount_occupied();
    hostel.architecture_defined = true;
    Ok(())
}

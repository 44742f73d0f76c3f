use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered hostels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostelId(pub String);

impl fmt::Display for HostelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room numbers are unique within a hostel and are the only handle residents keep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomNumber(pub String);

impl RoomNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single room with a fixed capacity and a mutable head count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub(crate) sequence: u32,
    pub(crate) number: RoomNumber,
    pub(crate) capacity: u32,
    pub(crate) occupants: u32,
    pub(crate) occupied: bool,
}

impl Room {
    pub(crate) fn new(sequence: u32, number: RoomNumber, capacity: u32) -> Self {
        Self {
            sequence,
            number,
            capacity,
            occupants: 0,
            occupied: false,
        }
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn number(&self) -> &RoomNumber {
        &self.number
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn occupants(&self) -> u32 {
        self.occupants
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// A room can take another resident until its head count reaches capacity.
    pub fn has_free_capacity(&self) -> bool {
        self.occupants < self.capacity
    }

    pub fn free_beds(&self) -> u32 {
        self.capacity.saturating_sub(self.occupants)
    }

    pub(crate) fn sync_occupied(&mut self) {
        self.occupied = self.occupants >= self.capacity;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub(crate) sequence: u32,
    pub(crate) name: String,
    pub(crate) rooms: Vec<Room>,
}

impl Floor {
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RoomSlot {
    pub(crate) floor: usize,
    pub(crate) room: usize,
}

/// A hostel and its embedded room inventory.
///
/// Floors and rooms are kept sorted by their `sequence` keys and a room-number index is
/// maintained alongside them, so lookups by number never scan the whole inventory. The
/// index is not persisted; it is rebuilt whenever a [`HostelRecord`] is converted back, and
/// the `occupied` flags and aggregate are recomputed from the head counts at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HostelRecord", into = "HostelRecord")]
pub struct Hostel {
    pub(crate) id: HostelId,
    pub(crate) name: String,
    pub(crate) total_rooms: u32,
    pub(crate) occupied_rooms: u32,
    pub(crate) architecture_defined: bool,
    pub(crate) floors: Vec<Floor>,
    index: HashMap<RoomNumber, RoomSlot>,
}

impl Hostel {
    /// A freshly registered hostel has no floors until its architecture is defined.
    pub fn register(id: HostelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            total_rooms: 0,
            occupied_rooms: 0,
            architecture_defined: false,
            floors: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn id(&self) -> &HostelId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_rooms(&self) -> u32 {
        self.total_rooms
    }

    pub fn occupied_rooms(&self) -> u32 {
        self.occupied_rooms
    }

    pub fn architecture_defined(&self) -> bool {
        self.architecture_defined
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    /// Rooms in allocation order: floors by sequence, then rooms by sequence.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.floors.iter().flat_map(|floor| floor.rooms.iter())
    }

    pub fn room(&self, number: &RoomNumber) -> Option<&Room> {
        let slot = self.index.get(number)?;
        self.floors.get(slot.floor)?.rooms.get(slot.room)
    }

    pub(crate) fn room_mut(&mut self, number: &RoomNumber) -> Option<&mut Room> {
        let slot = *self.index.get(number)?;
        self.floors.get_mut(slot.floor)?.rooms.get_mut(slot.room)
    }

    pub(crate) fn install_floors(&mut self, floors: Vec<Floor>) {
        self.floors = floors;
        self.normalize();
    }

    /// Recomputes the aggregate from the rooms themselves.
    pub(crate) fn recount_occupied(&mut self) {
        self.occupied_rooms = self.rooms().filter(|room| room.occupied).count() as u32;
    }

    pub fn summary(&self) -> OccupancySummary {
        let mut summary = OccupancySummary {
            total_rooms: self.total_rooms,
            occupied_rooms: self.occupied_rooms,
            available_rooms: 0,
            total_capacity: 0,
            occupants: 0,
            free_beds: 0,
        };
        for room in self.rooms() {
            summary.total_capacity += room.capacity;
            summary.occupants += room.occupants;
            summary.free_beds += room.free_beds();
            if !room.occupied {
                summary.available_rooms += 1;
            }
        }
        summary
    }

    fn normalize(&mut self) {
        self.floors.sort_by_key(|floor| floor.sequence);
        for floor in &mut self.floors {
            floor.rooms.sort_by_key(|room| room.sequence);
            for room in &mut floor.rooms {
                room.sync_occupied();
            }
        }
        self.recount_occupied();

        self.index.clear();
        for (floor_slot, floor) in self.floors.iter().enumerate() {
            for (room_slot, room) in floor.rooms.iter().enumerate() {
                self.index.insert(
                    room.number.clone(),
                    RoomSlot {
                        floor: floor_slot,
                        room: room_slot,
                    },
                );
            }
        }
    }
}

/// Headline numbers for a hostel's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancySummary {
    pub total_rooms: u32,
    pub occupied_rooms: u32,
    pub available_rooms: u32,
    pub total_capacity: u32,
    pub occupants: u32,
    pub free_beds: u32,
}

/// Persisted layout of a hostel: embedded floors and rooms, no index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostelRecord {
    pub id: HostelId,
    pub name: String,
    pub total_rooms: u32,
    pub occupied_rooms: u32,
    pub architecture_defined: bool,
    #[serde(default)]
    pub floors: Vec<Floor>,
}

impl From<HostelRecord> for Hostel {
    fn from(record: HostelRecord) -> Self {
        let mut hostel = Hostel {
            id: record.id,
            name: record.name,
            total_rooms: record.total_rooms,
            occupied_rooms: record.occupied_rooms,
            architecture_defined: record.architecture_defined,
            floors: record.floors,
            index: HashMap::new(),
        };
        hostel.normalize();
        hostel
    }
}

impl From<Hostel> for HostelRecord {
    fn from(hostel: Hostel) -> Self {
        Self {
            id: hostel.id,
            name: hostel.name,
            total_rooms: hostel.total_rooms,
            occupied_rooms: hostel.occupied_rooms,
            architecture_defined: hostel.architecture_defined,
            floors: hostel.floors,
        }
    }
}

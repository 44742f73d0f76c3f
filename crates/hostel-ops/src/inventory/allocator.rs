//! First-fit room selection.

use super::domain::{Hostel, Room};
use super::error::InventoryError;

/// Returns the first room with spare capacity, scanning floors and then rooms by sequence.
///
/// The query reserves nothing. Callers must hold the hostel's lock across this call and
/// the [`assign`](super::occupancy::assign) that consumes the room.
pub fn find_available_room(hostel: &Hostel) -> Result<&Room, InventoryError> {
    if !hostel.architecture_defined() {
        return Err(InventoryError::ArchitectureNotDefined {
            hostel_id: hostel.id().clone(),
        });
    }

    hostel
        .rooms()
        .find(|room| room.has_free_capacity())
        .ok_or_else(|| InventoryError::NoAvailableRoom {
            hostel_id: hostel.id().clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::architecture::{define_architecture, FloorSpec, RoomSpec};
    use crate::inventory::domain::{HostelId, RoomNumber};
    use crate::inventory::occupancy::assign;

    fn two_floor_hostel() -> Hostel {
        let mut hostel = Hostel::register(HostelId("hostel-alloc".to_string()), "Alloc");
        let floors = vec![
            FloorSpec {
                name: "Ground".to_string(),
                rooms: vec![RoomSpec::new("101", 2), RoomSpec::new("102", 1)],
            },
            FloorSpec {
                name: "First".to_string(),
                rooms: vec![RoomSpec::new("201", 1)],
            },
        ];
        define_architecture(&mut hostel, &floors).expect("valid layout");
        hostel
    }

    #[test]
    fn picks_first_room_in_floor_then_room_order() {
        let hostel = two_floor_hostel();
        let room = find_available_room(&hostel).expect("room available");
        assert_eq!(room.number().as_str(), "101");
    }

    #[test]
    fn keeps_filling_a_shared_room_before_moving_on() {
        let mut hostel = two_floor_hostel();
        let mut picks = Vec::new();
        for _ in 0..4 {
            let number = find_available_room(&hostel).expect("room").number().clone();
            assign(&mut hostel, &number).expect("assign succeeds");
            picks.push(number.0);
        }
        assert_eq!(picks, vec!["101", "101", "102", "201"]);
        assert!(matches!(
            find_available_room(&hostel),
            Err(InventoryError::NoAvailableRoom { .. })
        ));
    }

    #[test]
    fn identical_inventories_yield_identical_choices() {
        let mut first = two_floor_hostel();
        assign(&mut first, &RoomNumber::from("101")).expect("assign");
        assign(&mut first, &RoomNumber::from("101")).expect("assign");
        let second = first.clone();

        let a = find_available_room(&first).expect("room").number().clone();
        let b = find_available_room(&second).expect("room").number().clone();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "102");
    }

    #[test]
    fn requires_a_defined_architecture() {
        let hostel = Hostel::register(HostelId("hostel-empty".to_string()), "Empty");
        assert!(matches!(
            find_available_room(&hostel),
            Err(InventoryError::ArchitectureNotDefined { .. })
        ));
    }
}

use std::collections::HashMap;

use rand::Rng;
use uuid::Uuid;

use pairquiz_common::room::Room;
use pairquiz_common::room_code::RoomCode;

/// The live-room store. Owned by `ServerState` and guarded by its lock, so
/// separate server instances never share rooms.
pub struct RoomRegistry {
    pub rooms: HashMap<RoomCode, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Register a fresh empty room under a code not currently in use.
    /// The creator is not added as a participant; every client joins
    /// explicitly, including the creator's own.
    pub fn create_room(&mut self, rng: &mut impl Rng) -> RoomCode {
        let code = loop {
            let candidate = RoomCode::generate(rng);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        self.rooms.insert(code.clone(), Room::new(code.clone()));
        code
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    pub fn remove(&mut self, code: &RoomCode) {
        self.rooms.remove(code);
    }

    /// Every room holding this connection. Normally at most one, but the
    /// scan tolerates stale membership in several.
    pub fn rooms_containing(&self, conn_id: Uuid) -> Vec<RoomCode> {
        self.rooms
            .iter()
            .filter(|(_, room)| room.participants.contains(&conn_id))
            .map(|(code, _)| code.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_created_codes_are_unique_among_live_rooms() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut registry = RoomRegistry::new();
        for _ in 0..200 {
            registry.create_room(&mut rng);
        }
        // Inserting 200 rooms under colliding codes would shrink the map.
        assert_eq!(registry.len(), 200);
    }

    #[test]
    fn test_lookup_is_case_insensitive_via_canonical_codes() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut registry = RoomRegistry::new();
        let code = registry.create_room(&mut rng);
        let lower = RoomCode::new(&code.as_str().to_ascii_lowercase());
        assert!(registry.get(&lower).is_some());
    }

    #[test]
    fn test_rooms_containing_scans_all_rooms() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut registry = RoomRegistry::new();
        let conn = Uuid::new_v4();

        let a = registry.create_room(&mut rng);
        let b = registry.create_room(&mut rng);
        registry.create_room(&mut rng);

        // Stale double-membership must not trip the scan.
        registry.get_mut(&a).unwrap().add_participant(conn).unwrap();
        registry.get_mut(&b).unwrap().add_participant(conn).unwrap();

        let mut found = registry.rooms_containing(conn);
        found.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        let mut expected = vec![a, b];
        expected.sort_by(|x, y| x.as_str().cmp(y.as_str()));
        assert_eq!(found, expected);
    }

    #[test]
    fn test_remove_deletes_room() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut registry = RoomRegistry::new();
        let code = registry.create_room(&mut rng);
        registry.remove(&code);
        assert!(registry.is_empty());
    }
}

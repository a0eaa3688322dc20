use serde::{Deserialize, Serialize};
use util::{srng, GameRng, IndexMap, Logos};

use crate::{mapgen, Map, MapId, Overworld};

/// Every map that has been generated so far, plus the overworld plan that
/// zone maps are generated from.
///
/// Maps are generated at most once per id and are kept for the rest of the
/// session, so changes to them persist across visits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldRegistry {
    pub seed: Logos,
    pub overworld: Overworld,
    maps: IndexMap<MapId, Map>,
}

impl WorldRegistry {
    pub fn new(seed: Logos, overworld: Overworld) -> Self {
        WorldRegistry {
            seed,
            overworld,
            maps: Default::default(),
        }
    }

    /// Deterministic generator for a map, depends only on the world seed
    /// and the map id.
    pub fn map_rng(&self, id: MapId) -> GameRng {
        srng(&(&self.seed, id))
    }

    pub fn contains(&self, id: MapId) -> bool {
        self.maps.contains_key(&id)
    }

    pub fn get(&self, id: MapId) -> Option<&Map> {
        self.maps.get(&id)
    }

    pub fn get_mut(&mut self, id: MapId) -> Option<&mut Map> {
        self.maps.get_mut(&id)
    }

    /// Return the cached map or build it with `generate`.
    ///
    /// The generator is only called on the first request for an id.
    pub fn get_or_insert_with(
        &mut self,
        id: MapId,
        generate: impl FnOnce(&mut GameRng) -> Map,
    ) -> &mut Map {
        if !self.maps.contains_key(&id) {
            let mut rng = self.map_rng(id);
            let map = generate(&mut rng);
            log::info!("registered map {id} {:?}", map.name);
            self.maps.insert(id, map);
        }
        &mut self.maps[&id]
    }

    /// Get a zone or house interior map, generating it from the overworld
    /// plan on first access.
    ///
    /// Returns `None` for zones outside the overworld and for dungeons that
    /// haven't been generated yet, dungeon generation needs the entering
    /// player's context.
    pub fn get_or_generate(&mut self, id: MapId) -> Option<&mut Map> {
        if self.maps.contains_key(&id) {
            return self.maps.get_mut(&id);
        }

        match id {
            MapId::Zone(_) => {
                let cell = self.overworld.get(id)?.clone();
                Some(self.get_or_insert_with(id, |rng| {
                    mapgen::generate_zone(rng, id, &cell)
                }))
            }
            MapId::Interior { .. } => {
                self.overworld.get(id.parent_zone())?;
                Some(self.get_or_insert_with(id, |rng| {
                    mapgen::generate_interior(rng, id)
                }))
            }
            MapId::Dungeon { .. } => None,
        }
    }

    pub fn maps(&self) -> impl Iterator<Item = &Map> {
        self.maps.values()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;
    use crate::{
        dungeon::{generate_dungeon, DungeonSpec},
        DungeonKind, EntityKind, Object, Tile,
    };

    fn registry(seed: &str) -> WorldRegistry {
        let seed = Logos::new(seed);
        let overworld = Overworld::generate(&mut srng(&seed), 7, 7);
        WorldRegistry::new(seed, overworld)
    }

    #[test]
    fn zones_are_generated_once() {
        let mut r = registry("once");
        let id = MapId::zone(1, 3);
        let first = r.get_or_generate(id).unwrap().clone();

        // Mutate, then look it up again, the change must stick.
        let m = r.get_or_generate(id).unwrap();
        m.spawn("shrine", ivec2(0, 0), EntityKind::Object(Object::Shrine));
        assert_eq!(r.get(id).unwrap().entities.len(), first.entities.len() + 1);
        assert_eq!(r.len(), 1);

        assert!(r.get_or_generate(MapId::zone(7, 0)).is_none());
        assert!(r.get_or_generate(MapId::zone(-1, 0)).is_none());
    }

    #[test]
    fn generation_depends_on_seed_and_id_only() {
        let id = MapId::zone(0, 2);
        let mut a = registry("alpha");
        let mut b = registry("alpha");
        // Visit order differs.
        b.get_or_generate(MapId::zone(4, 4));
        assert_eq!(
            a.get_or_generate(id).cloned(),
            b.get_or_generate(id).cloned()
        );
    }

    #[test]
    fn dungeons_are_cached_independently() {
        let mut r = registry("dungeons");
        let parent = MapId::zone(2, 2);
        let spec = |entry| DungeonSpec {
            id: MapId::Dungeon {
                zone: parent.zone_pos(),
                entry,
            },
            zone_name: "Test".into(),
            zone_difficulty: 2,
            kind: DungeonKind::Cave,
            parent,
            entry,
            player_level: 1,
            world_tier: 0,
        };

        let a = spec(ivec2(5, 5));
        let b = spec(ivec2(20, 9));
        assert!(r.get_or_generate(a.id).is_none());

        let first = r
            .get_or_insert_with(a.id, |rng| generate_dungeon(rng, &a))
            .clone();
        r.get_or_insert_with(b.id, |rng| generate_dungeon(rng, &b));
        let again = r
            .get_or_insert_with(a.id, |_| panic!("dungeon regenerated"))
            .clone();
        assert_eq!(first, again);
        assert_ne!(r.get(a.id).unwrap().terrain, r.get(b.id).unwrap().terrain);
        assert!(again.find_tile(Tile::StairsUp).is_some());
    }

    #[test]
    fn interiors_need_a_real_zone() {
        let mut r = registry("houses");
        let town = r.overworld.town;
        let inside = MapId::Interior {
            zone: town.zone_pos(),
            door: ivec2(8, 9),
        };
        assert!(r.get_or_generate(inside).is_some());
        let nowhere = MapId::Interior {
            zone: ivec2(99, 99),
            door: ivec2(1, 1),
        };
        assert!(r.get_or_generate(nowhere).is_none());
    }
}

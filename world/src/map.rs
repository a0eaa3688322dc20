use glam::IVec2;
use serde::{Deserialize, Serialize};
use util::s8;

use crate::{Entity, EntityId, EntityKind, MapId, Tile, TileGrid};

#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DungeonKind {
    Crypt,
    Cave,
    Tomb,
    IceCavern,
}

impl DungeonKind {
    pub fn name(self) -> &'static str {
        match self {
            DungeonKind::Crypt => "Crypt",
            DungeonKind::Cave => "Cave",
            DungeonKind::Tomb => "Tomb",
            DungeonKind::IceCavern => "Ice Cavern",
        }
    }
}

#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Biome {
    #[default]
    Grass,
    Forest,
    Snow,
    Desert,
    Interior,
    Dungeon(DungeonKind),
}

impl Biome {
    /// Difficulty added on top of distance from town.
    pub fn difficulty_bonus(self) -> i32 {
        match self {
            Biome::Grass | Biome::Interior => 0,
            Biome::Forest => 1,
            Biome::Desert => 2,
            Biome::Snow => 3,
            Biome::Dungeon(_) => 0,
        }
    }

    /// Kind of dungeon found under this biome.
    pub fn dungeon_kind(self) -> DungeonKind {
        match self {
            Biome::Forest => DungeonKind::Cave,
            Biome::Desert => DungeonKind::Tomb,
            Biome::Snow => DungeonKind::IceCavern,
            Biome::Dungeon(k) => k,
            Biome::Grass | Biome::Interior => DungeonKind::Crypt,
        }
    }

    pub fn ground(self) -> Tile {
        match self {
            Biome::Grass | Biome::Forest => Tile::Grass,
            Biome::Snow => Tile::Snow,
            Biome::Desert => Tile::Sand,
            Biome::Interior | Biome::Dungeon(_) => Tile::Floor,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::Grass => "Meadows",
            Biome::Forest => "Woods",
            Biome::Snow => "Frostlands",
            Biome::Desert => "Dunes",
            Biome::Interior => "House",
            Biome::Dungeon(k) => k.name(),
        }
    }
}

/// Adjacent overworld zones of a zone map.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Neighbors {
    pub north: Option<MapId>,
    pub east: Option<MapId>,
    pub south: Option<MapId>,
    pub west: Option<MapId>,
}

impl Neighbors {
    /// Neighbor in a cardinal direction vector.
    pub fn get(&self, dir: IVec2) -> Option<MapId> {
        match (dir.x.signum(), dir.y.signum()) {
            (0, -1) => self.north,
            (1, 0) => self.east,
            (0, 1) => self.south,
            (-1, 0) => self.west,
            _ => None,
        }
    }
}

/// A single generated map with everything on it.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Map {
    pub id: MapId,
    pub name: String,
    pub terrain: TileGrid,
    pub entities: Vec<Entity>,
    pub difficulty: i32,
    pub biome: Biome,
    pub neighbors: Neighbors,
    pub is_town: bool,
    /// Local clock advanced by enemy turns, drives spawner cooldowns.
    pub tick: u64,
    next_id: u32,
}

impl Map {
    pub fn new(
        id: MapId,
        name: impl Into<String>,
        terrain: TileGrid,
        biome: Biome,
        difficulty: i32,
    ) -> Self {
        Map {
            id,
            name: name.into(),
            terrain,
            entities: Vec::new(),
            difficulty,
            biome,
            neighbors: Default::default(),
            is_town: false,
            tick: 0,
            next_id: EntityId::PLAYER.0 + 1,
        }
    }

    pub fn dim(&self) -> IVec2 {
        self.terrain.dim()
    }

    pub fn contains(&self, p: IVec2) -> bool {
        self.terrain.contains(p)
    }

    pub fn tile(&self, p: IVec2) -> Option<Tile> {
        self.terrain.get(p)
    }

    /// Add an entity and return its fresh id.
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        pos: IVec2,
        kind: EntityKind,
    ) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            name: name.into(),
            pos,
            facing: IVec2::ZERO,
            kind,
        });
        id
    }

    /// Remove entity. Returns `None` if it was already gone, so effects of
    /// removal are only applied once.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// First entity on a cell.
    pub fn entity_at(&self, p: IVec2) -> Option<&Entity> {
        self.entities.iter().find(|e| e.pos == p)
    }

    pub fn entities_at(&self, p: IVec2) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.pos == p)
    }

    pub fn is_occupied(&self, p: IVec2) -> bool {
        self.entities.iter().any(|e| e.pos == p)
    }

    /// Cell that can be walked on and has nothing standing on it.
    pub fn is_free(&self, p: IVec2) -> bool {
        self.tile(p).is_some_and(Tile::is_walkable) && !self.is_occupied(p)
    }

    pub fn find_tile(&self, t: Tile) -> Option<IVec2> {
        self.terrain.find(t)
    }

    /// Closest free cell to `p` by chessboard distance, `p` itself
    /// included.
    pub fn nearest_free(&self, p: IVec2) -> Option<IVec2> {
        self.terrain
            .points()
            .filter(|&q| self.is_free(q))
            .min_by_key(|q| (s8::d(&p, q), q.y, q.x))
    }

    pub fn hostiles(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_hostile())
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;

    use super::*;
    use crate::{Collectible, Object};

    fn test_map() -> Map {
        Map::new(
            MapId::zone(0, 0),
            "Test",
            TileGrid::from_ascii(
                "
                #####
                #,,,#
                #,T,#
                #####",
            )
            .unwrap(),
            Biome::Grass,
            0,
        )
    }

    #[test]
    fn spawn_and_remove_once() {
        let mut map = test_map();
        let gold = EntityKind::Collectible(Collectible::Gold(5));
        let a = map.spawn("gold", ivec2(1, 1), gold);
        let shrine = EntityKind::Object(Object::Shrine);
        let b = map.spawn("shrine", ivec2(3, 1), shrine);
        assert_ne!(a, b);
        assert_ne!(a, EntityId::PLAYER);
        assert_eq!(map.entity_at(ivec2(1, 1)).map(|e| e.id), Some(a));

        assert!(map.remove(a).is_some());
        assert!(map.remove(a).is_none());
        assert!(map.entity_at(ivec2(1, 1)).is_none());
        assert!(map.entity(b).is_some());
    }

    #[test]
    fn free_cells() {
        let mut map = test_map();
        assert!(map.is_free(ivec2(1, 1)));
        assert!(!map.is_free(ivec2(2, 2)));
        assert!(!map.is_free(ivec2(9, 9)));
        map.spawn("shrine", ivec2(1, 1), EntityKind::Object(Object::Shrine));
        assert!(!map.is_free(ivec2(1, 1)));
        assert_eq!(map.nearest_free(ivec2(1, 1)), Some(ivec2(2, 1)));
    }

    #[test]
    fn neighbor_lookup() {
        let n = Neighbors {
            east: Some(MapId::zone(1, 0)),
            ..Default::default()
        };
        assert_eq!(n.get(ivec2(1, 0)), Some(MapId::zone(1, 0)));
        assert_eq!(n.get(ivec2(0, 1)), None);
    }
}

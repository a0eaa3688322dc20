//! World datatypes, content tables and procedural map generation.

mod content;

mod data;
pub use data::{
    register_data, register_data_from, Affix, ArmorPattern, Condition, Data,
    Material, MaterialTier, Monster, NamePart, Objective, Quest, Resource,
    Secret, WeaponArchetype,
};

pub mod dungeon;
pub use dungeon::DungeonSpec;

mod entity;
pub use entity::{
    Behavior, Chest, Collectible, DecorKind, Entity, EntityKind, Link,
    LinkKind, Mob, Npc, NpcRole, Object, Spawner, Station,
};

mod id;
pub use id::{EntityId, MapId};

mod item;
pub use item::{
    EquipSlot, Inventory, ItemKind, ItemStack, LootItem, Rarity, Stat,
    StatBundle, WeaponClass, WeaponStats,
};

mod map;
pub use map::{Biome, DungeonKind, Map, Neighbors};

pub mod mapgen;

mod overworld;
pub use overworld::{Overworld, ZoneCell};

mod registry;
pub use registry::WorldRegistry;

pub mod scaling;

mod tile;
pub use tile::{Tile, TileGrid};

/// Width of an overworld zone map in tiles.
pub const ZONE_WIDTH: i32 = 40;
/// Height of an overworld zone map in tiles.
pub const ZONE_HEIGHT: i32 = 30;

pub const DUNGEON_WIDTH: i32 = 48;
pub const DUNGEON_HEIGHT: i32 = 36;

/// House interiors are small single rooms.
pub const INTERIOR_WIDTH: i32 = 12;
pub const INTERIOR_HEIGHT: i32 = 9;

/// Default overworld side length in zones.
pub const OVERWORLD_SIZE: i32 = 21;

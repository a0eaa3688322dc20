pub use crate::{
    msg, Action, AttackOutcome, Interaction, Moved, Msg, Runtime, WorldSpec,
    WorldState,
};
pub use glam::{ivec2, IVec2};
pub use util::{HashMap, HashSet, IndexMap, IndexSet, VecExt, DIR_4, DIR_8};
pub use world::{EntityId, EntityKind, Map, MapId, Tile};

//! Game logic layer machinery.

/// How far around the player the map gets revealed.
pub const REVEAL_RADIUS: i32 = 4;

/// Extra reveal radius from the eagle eye perk.
pub const VISION_PERK_BONUS: i32 = 3;

/// A knocked out player loses this fraction of their gold.
pub const DEFEAT_GOLD_DIVISOR: i64 = 10;

mod action;
pub use action::{edge_entry, Action, Interaction, Moved};

pub mod ai;

pub mod combat;
pub use combat::AttackOutcome;

mod explore;
pub use explore::{Exploration, ExplorationGrid};

pub mod loot;

mod msg;
pub use msg::Msg;

pub mod prelude;

mod quest;
pub use quest::{condition_holds, quest_progress};

mod runtime;
pub use runtime::{render_map, town_center, Runtime, WorldSpec};

mod state;
pub use state::{
    Anim, Perk, QuestProgress, Skill, Skills, Stats, WorldState, HP_PER_VIT,
};

//! Events about things that happened during a turn, for the UI layer.

use world::{EntityId, MapId, Resource};

/// Interface for receiving game event messages for displaying.
#[derive(Clone, PartialEq, Debug)]
pub enum Msg {
    /// Text message.
    Message(String),

    /// Entity took damage, `EntityId::PLAYER` for the player.
    Hurt { target: EntityId, damage: i32, crit: bool },

    /// An attack missed.
    Miss(EntityId),

    /// An enemy died.
    Death { name: String, xp: i64, gold: i64 },

    /// Item went into the player's inventory.
    Loot(String),

    LevelUp(u32),

    SkillUp(Resource, u32),

    /// Player arrived on a different map.
    Entered(MapId),

    QuestAccepted(String),

    QuestCompleted(String),

    SecretFound(String),

    /// A boss died and the world got harder.
    WorldTier(u32),

    /// Player was knocked out and carried back to town.
    Defeated,
}

/// Push a text message into an event queue.
#[macro_export]
macro_rules! msg {
    // NB. Even the simple cases needs to be wrapped in `format!` in case the
    // fmt string is doing named variable capture.
    ($events:expr, $fmt:expr) => {
        $events.push($crate::Msg::Message(format!($fmt)))
    };

    ($events:expr, $fmt:expr, $($arg:expr),*) => {
        $events.push($crate::Msg::Message(format!($fmt, $($arg),*)))
    };
}

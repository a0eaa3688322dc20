use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::{
    scaling::{self, HpMods},
    EntityId, ItemStack, MapId, Monster,
};

/// Anything that lives on a map cell other than terrain.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub pos: IVec2,
    /// Last movement direction.
    pub facing: IVec2,
    pub kind: EntityKind,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Npc(Npc),
    Enemy(Mob),
    Spawner(Spawner),
    Object(Object),
    ItemDrop(ItemStack),
    Collectible(Collectible),
}

impl Entity {
    pub fn mob(&self) -> Option<&Mob> {
        match &self.kind {
            EntityKind::Enemy(m) => Some(m),
            _ => None,
        }
    }

    pub fn mob_mut(&mut self) -> Option<&mut Mob> {
        match &mut self.kind {
            EntityKind::Enemy(m) => Some(m),
            _ => None,
        }
    }

    pub fn spawner(&self) -> Option<&Spawner> {
        match &self.kind {
            EntityKind::Spawner(s) => Some(s),
            _ => None,
        }
    }

    /// Enemies and spawners can be attacked.
    pub fn is_hostile(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy(_) | EntityKind::Spawner(_))
    }

    /// Current and maximum hit points of things that have them.
    pub fn health(&self) -> Option<(i32, i32)> {
        match &self.kind {
            EntityKind::Enemy(m) => Some((m.hp, m.max_hp)),
            EntityKind::Spawner(s) => Some((s.hp, s.max_hp)),
            _ => None,
        }
    }

    pub fn hp_mut(&mut self) -> Option<&mut i32> {
        match &mut self.kind {
            EntityKind::Enemy(m) => Some(&mut m.hp),
            EntityKind::Spawner(s) => Some(&mut s.hp),
            _ => None,
        }
    }

    pub fn level(&self) -> u32 {
        match &self.kind {
            EntityKind::Enemy(m) => m.level,
            EntityKind::Spawner(s) => s.level,
            EntityKind::Object(Object::Chest(c)) => c.level,
            _ => 1,
        }
    }

    /// Whether the player is stopped by the entity when walking into its
    /// cell.
    pub fn blocks_movement(&self) -> bool {
        match &self.kind {
            EntityKind::ItemDrop(_) | EntityKind::Collectible(_) => false,
            EntityKind::Object(Object::Link(_)) => false,
            _ => true,
        }
    }
}

#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Behavior {
    #[default]
    Melee,
    Ranged,
}

/// A monster.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Mob {
    /// Bestiary entry the mob was made from.
    pub template: String,
    pub level: u32,
    pub hp: i32,
    pub max_hp: i32,
    /// Unscaled damage, scaled by level at attack time.
    pub base_dmg: i32,
    pub xp_mod: f64,
    pub behavior: Behavior,
    pub aggro_radius: i32,
    pub attack_range: i32,
    pub is_boss: bool,
    pub is_elite: bool,
    pub spawned_by: Option<EntityId>,
}

impl Mob {
    pub fn new(
        template: impl Into<String>,
        monster: &Monster,
        level: u32,
        mods: HpMods,
    ) -> Self {
        let max_hp = scaling::scaled_hp(monster.base_hp, level, mods);
        Mob {
            template: template.into(),
            level,
            hp: max_hp,
            max_hp,
            base_dmg: monster.base_dmg,
            xp_mod: monster.xp_mod,
            behavior: monster.behavior,
            aggro_radius: monster.aggro_radius,
            attack_range: monster.attack_range.max(1),
            is_boss: mods.boss,
            is_elite: mods.elite,
            spawned_by: None,
        }
    }

    pub fn dmg(&self) -> i32 {
        scaling::dmg(self.base_dmg, self.level)
    }
}

/// A structure that periodically produces mobs until destroyed.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Spawner {
    pub template: String,
    pub level: u32,
    pub hp: i32,
    pub max_hp: i32,
    /// Ticks between spawns.
    pub cooldown: u64,
    /// Map tick after which the next mob can appear.
    pub ready_at: u64,
    pub max_alive: usize,
}

/// Base hit points of spawners before level scaling.
pub const SPAWNER_BASE_HP: i32 = 30;

impl Spawner {
    pub fn new(template: impl Into<String>, level: u32) -> Self {
        let max_hp = scaling::hp(SPAWNER_BASE_HP, level);
        let cooldown = 12;
        Spawner {
            template: template.into(),
            level,
            hp: max_hp,
            max_hp,
            cooldown,
            ready_at: cooldown,
            max_alive: 3,
        }
    }
}

#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum NpcRole {
    /// Hands out quests.
    Elder,
    Merchant,
    Blacksmith,
    #[default]
    Villager,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Npc {
    pub role: NpcRole,
    pub greeting: String,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Object {
    Chest(Chest),
    /// Portal or door into another map.
    Link(Link),
    Decor(DecorKind),
    Station(Station),
    /// Restores health and registers a waypoint.
    Shrine,
    FishingSpot,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Chest {
    /// Dungeon whose key opens the chest, `None` for unlocked chests.
    pub lock: Option<MapId>,
    pub looted: bool,
    pub level: u32,
}

#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    Portal,
    Door,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Link {
    pub target: MapId,
    /// Arrival position on the target map.
    pub pos: IVec2,
    pub kind: LinkKind,
}

#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DecorKind {
    Urn,
    Crate,
    Barrel,
    Bones,
    Mushroom,
    Statue,
    Stalagmite,
}

impl DecorKind {
    /// Can be smashed by walking into it.
    pub fn is_destructible(self) -> bool {
        !matches!(self, DecorKind::Statue | DecorKind::Stalagmite)
    }

    pub fn name(self) -> &'static str {
        use DecorKind::*;
        match self {
            Urn => "urn",
            Crate => "crate",
            Barrel => "barrel",
            Bones => "pile of bones",
            Mushroom => "giant mushroom",
            Statue => "statue",
            Stalagmite => "stalagmite",
        }
    }
}

#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Station {
    Anvil,
    Workbench,
    Cauldron,
}

/// Walk-over pickups.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Collectible {
    Gold(i64),
    /// Named counter token, eg. lore pages.
    Token(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mob_from_template() {
        let slime = Monster {
            base_hp: 15,
            base_dmg: 2,
            ..Default::default()
        };
        let m = Mob::new("Slime", &slime, 3, HpMods::default());
        assert_eq!(m.hp, 22);
        assert_eq!(m.max_hp, 22);
        assert_eq!(m.attack_range, 1);
        assert!(!m.is_boss);

        let elite = Mob::new(
            "Slime",
            &slime,
            3,
            HpMods {
                elite: true,
                ..Default::default()
            },
        );
        assert_eq!(elite.max_hp, 34);
        assert!(elite.is_elite);
    }

    #[test]
    fn decor_destructibility() {
        assert!(DecorKind::Urn.is_destructible());
        assert!(!DecorKind::Statue.is_destructible());
    }
}

//! Persistent player-side game state.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use util::{IndexMap, IndexSet};
use world::{
    scaling, EntityId, EquipSlot, Inventory, LootItem, MapId, Resource,
    StatBundle, WeaponStats,
};

use crate::Exploration;

/// Max hit points each point of vitality gives.
pub const HP_PER_VIT: i32 = 5;

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Stats {
    pub str: i32,
    pub dex: i32,
    pub int: i32,
    pub regen: i32,
    pub hp: i32,
    pub max_hp: i32,
    /// Experience towards the next level.
    pub xp: i64,
    pub level: u32,
    pub gold: i64,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            str: 5,
            dex: 5,
            int: 5,
            regen: 0,
            hp: 100,
            max_hp: 100,
            xp: 0,
            level: 1,
            gold: 0,
        }
    }
}

#[derive(
    Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
#[serde(default)]
pub struct Skill {
    pub level: u32,
    pub xp: i64,
}

/// Gathering skills.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
#[serde(default)]
pub struct Skills {
    pub woodcutting: Skill,
    pub mining: Skill,
    pub fishing: Skill,
}

impl Skills {
    pub fn get(&self, r: Resource) -> Skill {
        match r {
            Resource::Wood => self.woodcutting,
            Resource::Ore => self.mining,
            Resource::Fish => self.fishing,
        }
    }

    pub fn get_mut(&mut self, r: Resource) -> &mut Skill {
        match r {
            Resource::Wood => &mut self.woodcutting,
            Resource::Ore => &mut self.mining,
            Resource::Fish => &mut self.fishing,
        }
    }

    /// Add experience and return the new level if it went up.
    pub fn train(&mut self, r: Resource, xp: i64) -> Option<u32> {
        let skill = self.get_mut(r);
        skill.xp += xp;
        let mut leveled = false;
        loop {
            let need = scaling::skill_xp_to_next(skill.level);
            if skill.xp < need {
                break;
            }
            skill.xp -= need;
            skill.level += 1;
            leveled = true;
        }
        leveled.then_some(skill.level)
    }
}

#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum Perk {
    /// Extended exploration radius.
    EagleEye,
    /// Better odds on loot drops.
    Lucky,
}

/// Transient visual tags for the renderer, cleared at the start of each
/// player action.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anim {
    Hurt,
    Dodge,
    Attack,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct QuestProgress {
    pub id: String,
    /// Kill count for kill quests, collect quests count the inventory at
    /// turn-in.
    pub progress: u32,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorldState {
    pub map: MapId,
    pub pos: IVec2,
    pub facing: IVec2,
    pub stats: Stats,
    pub skills: Skills,
    pub inventory: Inventory,
    pub equipment: IndexMap<EquipSlot, LootItem>,
    pub counters: IndexMap<String, i64>,
    pub flags: IndexSet<String>,
    pub quest: Option<QuestProgress>,
    pub completed_quests: IndexSet<String>,
    pub exploration: Exploration,
    /// Zones the player can travel to.
    pub waypoints: IndexSet<MapId>,
    pub visited: IndexSet<MapId>,
    pub anims: IndexMap<EntityId, Anim>,
    /// Templates of killed monsters.
    pub bestiary: IndexSet<String>,
    pub world_tier: u32,
    pub perks: IndexSet<Perk>,
    pub secrets: IndexSet<String>,
    /// Minutes since midnight.
    pub clock: u32,
}

impl WorldState {
    pub fn new(map: MapId, pos: IVec2) -> Self {
        WorldState {
            map,
            pos,
            facing: IVec2::Y,
            stats: Default::default(),
            skills: Default::default(),
            inventory: Default::default(),
            equipment: Default::default(),
            counters: Default::default(),
            flags: Default::default(),
            quest: None,
            completed_quests: Default::default(),
            exploration: Default::default(),
            waypoints: Default::default(),
            visited: Default::default(),
            anims: Default::default(),
            bestiary: Default::default(),
            world_tier: 0,
            perks: Default::default(),
            secrets: Default::default(),
            clock: 8 * 60,
        }
    }

    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn bump(&mut self, name: impl Into<String>, n: i64) {
        *self.counters.entry(name.into()).or_default() += n;
    }

    pub fn has_perk(&self, perk: Perk) -> bool {
        self.perks.contains(&perk)
    }

    /// Attribute totals with equipment bonuses.
    pub fn effective_stats(&self) -> StatBundle {
        let mut ret = StatBundle {
            str: self.stats.str,
            dex: self.stats.dex,
            int: self.stats.int,
            vit: 0,
            regen: self.stats.regen,
        };
        for item in self.equipment.values() {
            ret += item.stats;
        }
        ret
    }

    pub fn max_hp(&self) -> i32 {
        self.stats.max_hp + HP_PER_VIT * self.effective_stats().vit.max(0)
    }

    /// Set hit points, clamped to the valid range.
    pub fn set_hp(&mut self, hp: i32) {
        self.stats.hp = hp.clamp(0, self.max_hp());
    }

    pub fn is_alive(&self) -> bool {
        self.stats.hp > 0
    }

    /// Attack profile of the equipped weapon.
    pub fn weapon(&self) -> WeaponStats {
        self.equipment
            .get(&EquipSlot::Weapon)
            .and_then(|a| a.weapon)
            .unwrap_or_else(WeaponStats::fists)
    }

    /// Add experience, returns the levels gained.
    ///
    /// Each level adds 10 max hp and one point to the three attributes and
    /// restores hit points to full.
    pub fn gain_xp(&mut self, xp: i64) -> Vec<u32> {
        let mut ret = Vec::new();
        self.stats.xp += xp.max(0);
        loop {
            let need = scaling::xp_to_next(self.stats.level);
            if self.stats.xp < need {
                break;
            }
            self.stats.xp -= need;
            self.stats.level += 1;
            self.stats.max_hp += 10;
            self.stats.str += 1;
            self.stats.dex += 1;
            self.stats.int += 1;
            self.stats.hp = self.max_hp();
            ret.push(self.stats.level);
        }
        ret
    }

    /// Equipment slots in display order with what's in them.
    pub fn slots(
        &self,
    ) -> impl Iterator<Item = (EquipSlot, Option<&LootItem>)> {
        EquipSlot::iter().map(|s| (s, self.equipment.get(&s)))
    }
}

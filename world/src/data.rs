use std::{path::Path, sync::OnceLock};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use util::IndexMap;

use crate::{Behavior, Biome, DungeonKind, EquipSlot, Stat, Tile, WeaponClass};

static DATA: OnceLock<Data> = OnceLock::new();

/// Load content data from an IDM file.
pub fn register_data_from(path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let data: Data = idm::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    register_data(data)
}

/// Register content data directly from value.
///
/// Must happen before the first `Data::get` call, after that the built-in
/// tables are locked in.
pub fn register_data(data: Data) -> anyhow::Result<()> {
    match DATA.get() {
        None => {
            if DATA.set(data).is_err() {
                bail!("Game data was registered concurrently");
            }
        }
        Some(x) if x == &data => {
            log::info!("registering the same gamedata twice, ignored");
        }
        _ => {
            bail!(
                "Tried to register different gamedata when data is already \
                 registered"
            );
        }
    }
    Ok(())
}

/// Static global game content.
#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Data {
    pub bestiary: IndexMap<String, Monster>,
    /// Level-gated name prefixes for regular monsters.
    pub monster_prefixes: Vec<NamePart>,
    pub weapons: IndexMap<String, WeaponArchetype>,
    /// Name pools and stat biases of the non-weapon equipment slots.
    pub armor: IndexMap<EquipSlot, ArmorPattern>,
    pub prefixes: Vec<Affix>,
    pub suffixes: Vec<Affix>,
    /// Material tiers in ascending level order.
    pub tiers: Vec<MaterialTier>,
    pub materials: Vec<Material>,
    /// Quests in the order the elder hands them out.
    pub quests: Vec<Quest>,
    pub secrets: Vec<Secret>,
}

impl Data {
    pub fn get() -> &'static Data {
        DATA.get_or_init(Data::builtin)
    }

    /// Regular monsters that can appear at `level` in a habitat.
    ///
    /// If nothing is eligible at the level, falls back to the habitat's
    /// lowest level monsters so a map never ends up with an empty pool.
    pub fn monster_pool(&self, habitat: Biome, level: u32) -> Vec<&str> {
        let native: Vec<(&String, &Monster)> = self
            .bestiary
            .iter()
            .filter(|(_, m)| !m.is_boss && m.lives_in(habitat))
            .collect();

        let ret: Vec<&str> = native
            .iter()
            .filter(|(_, m)| m.min_level <= level)
            .map(|(n, _)| n.as_str())
            .collect();
        if !ret.is_empty() {
            return ret;
        }

        let Some(lowest) = native.iter().map(|(_, m)| m.min_level).min()
        else {
            return Vec::new();
        };
        native
            .iter()
            .filter(|(_, m)| m.min_level == lowest)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    pub fn boss_for(&self, kind: DungeonKind) -> Option<(&str, &Monster)> {
        self.bestiary
            .iter()
            .find(|(_, m)| m.is_boss && m.lives_in(Biome::Dungeon(kind)))
            .map(|(n, m)| (n.as_str(), m))
    }

    pub fn monster_prefixes_for(&self, level: u32) -> Vec<&str> {
        self.monster_prefixes
            .iter()
            .filter(|p| p.min_level <= level && level <= p.max_level)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Highest material tier unlocked at level.
    pub fn tier_for(&self, level: u32) -> Option<&MaterialTier> {
        self.tiers
            .iter()
            .filter(|t| t.min_level <= level)
            .last()
            .or_else(|| self.tiers.first())
    }

    /// Materials a resource yields at a gathering skill level, best last.
    pub fn materials_for(
        &self,
        resource: Resource,
        skill_level: u32,
    ) -> Vec<&Material> {
        self.materials
            .iter()
            .filter(|m| m.source == resource && m.min_level <= skill_level)
            .collect()
    }

    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Monster {
    pub base_hp: i32,
    pub base_dmg: i32,
    /// Multiplier on experience reward.
    pub xp_mod: f64,
    pub min_level: u32,
    pub behavior: Behavior,
    pub aggro_radius: i32,
    pub attack_range: i32,
    /// Biomes the monster spawns in, empty for anywhere.
    pub habitats: Vec<Biome>,
    pub is_boss: bool,
}

impl Default for Monster {
    fn default() -> Self {
        Monster {
            base_hp: 10,
            base_dmg: 2,
            xp_mod: 1.0,
            min_level: 1,
            behavior: Behavior::Melee,
            aggro_radius: 6,
            attack_range: 1,
            habitats: Vec::new(),
            is_boss: false,
        }
    }
}

impl Monster {
    pub fn lives_in(&self, biome: Biome) -> bool {
        self.habitats.is_empty() || self.habitats.contains(&biome)
    }
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NamePart {
    pub name: String,
    pub min_level: u32,
    pub max_level: u32,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WeaponArchetype {
    pub class: WeaponClass,
    pub min_dmg: i32,
    pub max_dmg: i32,
    pub crit_chance: f64,
    pub crit_mult: f64,
    pub multi_hit: f64,
}

#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ArmorPattern {
    pub names: Vec<String>,
    /// Stats the slot's base bonus goes into.
    pub bias: Vec<Stat>,
}

/// Name prefix or suffix that adds to one stat.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Affix {
    pub name: String,
    pub stat: Stat,
    pub magnitude: i32,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MaterialTier {
    pub name: String,
    pub min_level: u32,
    pub mult: f64,
}

#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Wood,
    Ore,
    Fish,
}

impl Resource {
    /// Resource gathered by bumping into a tile.
    pub fn from_tile(t: Tile) -> Option<Resource> {
        match t {
            Tile::Tree => Some(Resource::Wood),
            Tile::Rock => Some(Resource::Ore),
            _ => None,
        }
    }

    /// Short name used in counter keys.
    pub fn name(self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Ore => "ore",
            Resource::Fish => "fish",
        }
    }

    pub fn skill_name(self) -> &'static str {
        match self {
            Resource::Wood => "woodcutting",
            Resource::Ore => "mining",
            Resource::Fish => "fishing",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Material {
    pub name: String,
    pub source: Resource,
    pub min_level: u32,
    pub value: i64,
    /// Gathering experience per unit.
    pub xp: i64,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Quest {
    pub id: String,
    pub name: String,
    pub objective: Objective,
    pub reward_xp: i64,
    pub reward_gold: i64,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Objective {
    /// Kill monsters whose name contains the target.
    Kill { target: String, count: u32 },
    /// Carry a number of named items to the quest giver.
    Collect { item: String, count: u32 },
}

impl Objective {
    pub fn count(&self) -> u32 {
        match self {
            Objective::Kill { count, .. }
            | Objective::Collect { count, .. } => *count,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Secret {
    pub id: String,
    pub name: String,
    pub condition: Condition,
    pub reward_gold: i64,
}

/// Predicate over the persistent world state.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Flag(String),
    /// Named counter has reached a value.
    Counter(String, i64),
    /// Number of distinct monster kinds killed.
    Bestiary(usize),
    WorldTier(u32),
    MapsVisited(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables() {
        let data = Data::get();
        assert!(!data.bestiary.is_empty());
        assert!(data.bestiary.contains_key("Slime"));
        assert_eq!(data.bestiary["Slime"].base_hp, 15);

        for kind in [
            DungeonKind::Crypt,
            DungeonKind::Cave,
            DungeonKind::Tomb,
            DungeonKind::IceCavern,
        ] {
            assert!(data.boss_for(kind).is_some(), "no boss for {kind:?}");
            assert!(
                !data.monster_pool(Biome::Dungeon(kind), 1).is_empty(),
                "no monsters for {kind:?}"
            );
        }
        for biome in [Biome::Grass, Biome::Forest, Biome::Snow, Biome::Desert] {
            assert!(!data.monster_pool(biome, 1).is_empty());
        }
    }

    #[test]
    fn tiers_are_ordered() {
        let data = Data::get();
        for w in data.tiers.windows(2) {
            assert!(w[0].min_level < w[1].min_level);
            assert!(w[0].mult < w[1].mult);
        }
        assert_eq!(data.tier_for(0).map(|t| t.name.as_str()), Some("Crude"));
        assert_eq!(data.tier_for(11).map(|t| t.name.as_str()), Some("Steel"));
        assert_eq!(
            data.tier_for(1000).map(|t| t.name.as_str()),
            data.tiers.last().map(|t| t.name.as_str())
        );
    }

    #[test]
    fn pools_are_level_gated() {
        let data = Data::get();
        let low = data.monster_pool(Biome::Grass, 1);
        let high = data.monster_pool(Biome::Grass, 30);
        assert!(low.len() < high.len());
        for name in &low {
            assert!(data.bestiary[*name].min_level <= 1);
        }
        assert!(data.monster_prefixes_for(1).contains(&"Young"));
        assert!(!data.monster_prefixes_for(40).contains(&"Young"));
    }

    #[test]
    fn reregistering_builtin_is_allowed() {
        let _ = Data::get();
        assert!(register_data(Data::builtin()).is_ok());
        assert!(register_data(Data::default()).is_err());
        assert!(register_data_from("/nonexistent/content.idm").is_err());
    }
}

use std::{fmt, ops::AddAssign};

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::MapId;

#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
    Divine,
    Ascended,
}

impl Rarity {
    /// Relative drop weight of the rarity band.
    pub fn weight(self) -> f64 {
        use Rarity::*;
        match self {
            Common => 50.0,
            Uncommon => 25.0,
            Rare => 12.0,
            Epic => 7.0,
            Legendary => 3.5,
            Mythic => 1.5,
            Divine => 0.7,
            Ascended => 0.3,
        }
    }

    /// How many affixes an item of this rarity rolls.
    pub fn affix_count(self) -> usize {
        use Rarity::*;
        match self {
            Common => 0,
            Uncommon | Rare => 1,
            Epic | Legendary => 2,
            Mythic | Divine | Ascended => 3,
        }
    }

    /// Multiplier on stat and damage rolls.
    pub fn power(self) -> f64 {
        1.0 + 0.25 * self as usize as f64
    }

    pub fn name(self) -> &'static str {
        use Rarity::*;
        match self {
            Common => "Common",
            Uncommon => "Uncommon",
            Rare => "Rare",
            Epic => "Epic",
            Legendary => "Legendary",
            Mythic => "Mythic",
            Divine => "Divine",
            Ascended => "Ascended",
        }
    }

    pub fn all() -> impl Iterator<Item = Rarity> {
        Rarity::iter()
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum Stat {
    Str,
    Dex,
    Int,
    Vit,
    Regen,
}

/// Additive attribute bonuses.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
#[serde(default)]
pub struct StatBundle {
    pub str: i32,
    pub dex: i32,
    pub int: i32,
    pub vit: i32,
    pub regen: i32,
}

impl StatBundle {
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Str => self.str,
            Stat::Dex => self.dex,
            Stat::Int => self.int,
            Stat::Vit => self.vit,
            Stat::Regen => self.regen,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Str => &mut self.str,
            Stat::Dex => &mut self.dex,
            Stat::Int => &mut self.int,
            Stat::Vit => &mut self.vit,
            Stat::Regen => &mut self.regen,
        }
    }

    pub fn add(&mut self, stat: Stat, amount: i32) {
        *self.get_mut(stat) += amount;
    }

    pub fn is_zero(&self) -> bool {
        *self == StatBundle::default()
    }
}

impl AddAssign for StatBundle {
    fn add_assign(&mut self, rhs: Self) {
        for s in Stat::iter() {
            self.add(s, rhs.get(s));
        }
    }
}

#[derive(
    Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum EquipSlot {
    Weapon,
    Head,
    Chest,
    Legs,
    Feet,
    Hands,
    Ring,
    Amulet,
}

/// Weapon family, decides which attribute adds to the damage roll.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeaponClass {
    Blade,
    Blunt,
    Dagger,
    Bow,
    Staff,
    Wand,
}

impl WeaponClass {
    pub fn scaling_stat(self) -> Stat {
        use WeaponClass::*;
        match self {
            Blade | Blunt => Stat::Str,
            Dagger | Bow => Stat::Dex,
            Staff | Wand => Stat::Int,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WeaponStats {
    pub class: WeaponClass,
    pub min_dmg: i32,
    pub max_dmg: i32,
    pub crit_chance: f64,
    pub crit_mult: f64,
    /// Chance of striking a second time in the same attack.
    pub multi_hit: f64,
}

impl WeaponStats {
    /// Bare-handed attack profile.
    pub fn fists() -> Self {
        WeaponStats {
            class: WeaponClass::Blunt,
            min_dmg: 1,
            max_dmg: 3,
            crit_chance: 0.05,
            crit_mult: 1.5,
            multi_hit: 0.0,
        }
    }
}

#[derive(
    Copy, Clone, Default, Eq, PartialEq, Hash, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    #[default]
    Equipment,
    Material,
    Key,
}

#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LootItem {
    pub name: String,
    pub kind: ItemKind,
    pub slot: Option<EquipSlot>,
    pub rarity: Rarity,
    /// Material tier name, empty for items without one.
    pub tier: String,
    pub level: u32,
    pub stats: StatBundle,
    pub weapon: Option<WeaponStats>,
    /// The dungeon whose chest a key opens.
    pub opens: Option<MapId>,
    pub value: i64,
}

impl LootItem {
    pub fn material(name: impl Into<String>, level: u32, value: i64) -> Self {
        LootItem {
            name: name.into(),
            kind: ItemKind::Material,
            level,
            value,
            ..Default::default()
        }
    }

    pub fn key(name: impl Into<String>, opens: MapId) -> Self {
        LootItem {
            name: name.into(),
            kind: ItemKind::Key,
            opens: Some(opens),
            ..Default::default()
        }
    }

    pub fn is_equipment(&self) -> bool {
        self.kind == ItemKind::Equipment && self.slot.is_some()
    }

    /// Equipment never stacks, other items stack by name.
    pub fn stacks_with(&self, other: &LootItem) -> bool {
        self.kind != ItemKind::Equipment
            && self.kind == other.kind
            && self.name == other.name
            && self.opens == other.opens
    }
}

impl fmt::Display for LootItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: LootItem,
    pub count: u32,
}

impl ItemStack {
    pub fn one(item: LootItem) -> Self {
        ItemStack { item, count: 1 }
    }
}

impl From<LootItem> for ItemStack {
    fn from(item: LootItem) -> Self {
        ItemStack::one(item)
    }
}

/// Player's carried items.
#[derive(Clone, Default, PartialEq, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(Vec<ItemStack>);

impl Inventory {
    pub fn add(&mut self, stack: impl Into<ItemStack>) {
        let stack = stack.into();
        if stack.count == 0 {
            return;
        }
        if let Some(existing) =
            self.0.iter_mut().find(|s| s.item.stacks_with(&stack.item))
        {
            existing.count += stack.count;
        } else {
            self.0.push(stack);
        }
    }

    /// Number of items with the given name.
    pub fn count(&self, name: &str) -> u32 {
        self.0
            .iter()
            .filter(|s| s.item.name == name)
            .map(|s| s.count)
            .sum()
    }

    /// Remove `n` items with the given name. Does nothing and returns false
    /// if there aren't enough.
    pub fn remove(&mut self, name: &str, n: u32) -> bool {
        if self.count(name) < n {
            return false;
        }
        let mut left = n;
        for s in self.0.iter_mut().filter(|s| s.item.name == name) {
            let k = left.min(s.count);
            s.count -= k;
            left -= k;
        }
        self.0.retain(|s| s.count > 0);
        true
    }

    /// Take a single item out of the stack at index.
    pub fn take(&mut self, idx: usize) -> Option<LootItem> {
        let stack = self.0.get_mut(idx)?;
        let item = stack.item.clone();
        stack.count -= 1;
        if stack.count == 0 {
            self.0.remove(idx);
        }
        Some(item)
    }

    pub fn has_key_for(&self, dungeon: MapId) -> bool {
        self.0.iter().any(|s| s.item.opens == Some(dungeon))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemStack> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn materials_stack() {
        let mut inv = Inventory::default();
        inv.add(LootItem::material("Log", 1, 2));
        inv.add(ItemStack {
            item: LootItem::material("Log", 1, 2),
            count: 4,
        });
        inv.add(LootItem::material("Stone", 1, 1));
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.count("Log"), 5);

        assert!(!inv.remove("Log", 6));
        assert!(inv.remove("Log", 5));
        assert_eq!(inv.count("Log"), 0);
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn equipment_does_not_stack() {
        let sword = LootItem {
            name: "Iron Sword".into(),
            slot: Some(EquipSlot::Weapon),
            ..Default::default()
        };
        let mut inv = Inventory::default();
        inv.add(sword.clone());
        inv.add(sword.clone());
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.take(0), Some(sword));
        assert_eq!(inv.len(), 1);
        assert_eq!(inv.take(5), None);
    }

    #[test]
    fn keys_match_their_dungeon() {
        let a: MapId = "dungeon:1,1@5,5".parse().unwrap();
        let b: MapId = "dungeon:2,1@5,5".parse().unwrap();
        let mut inv = Inventory::default();
        inv.add(LootItem::key("Crypt Key", a));
        inv.add(LootItem::key("Crypt Key", b));
        assert_eq!(inv.len(), 2);
        assert!(inv.has_key_for(a));
        assert!(!inv.has_key_for(MapId::zone(0, 0)));
    }

    #[test]
    fn stat_bundle_sums() {
        let mut a = StatBundle {
            str: 1,
            ..Default::default()
        };
        a += StatBundle {
            str: 2,
            regen: 1,
            ..Default::default()
        };
        assert_eq!(a.get(Stat::Str), 3);
        assert_eq!(a.get(Stat::Regen), 1);
        assert!(!a.is_zero());
    }
}

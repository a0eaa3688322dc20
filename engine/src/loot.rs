//! Procedural item generation.

use rand::{seq::SliceRandom, Rng};
use strum::IntoEnumIterator;
use util::{RngExt, WeightedTable};
use world::{
    Data, EquipSlot, ItemKind, LootItem, Rarity, Resource, StatBundle,
    WeaponStats,
};

/// Drop chance of regular sources before bias.
pub const BASE_DROP_CHANCE: f64 = 0.35;

/// Drop chance of bosses before bias.
pub const BOSS_DROP_CHANCE: f64 = 0.95;

/// Drop bias for kills inside dungeons.
pub const DUNGEON_BIAS: f64 = 0.15;

/// Drop bias for boss kills.
pub const BOSS_BIAS: f64 = 0.5;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LootSource {
    Enemy,
    Boss,
    /// Chests always give something.
    Chest,
    /// Smashed pots and crates.
    Decor,
}

/// Roll for an item drop, `None` if the drop gate fails.
pub fn roll(
    rng: &mut impl Rng,
    level: u32,
    source: LootSource,
    bias: f64,
) -> Option<LootItem> {
    let gate = match source {
        LootSource::Boss => BOSS_DROP_CHANCE,
        LootSource::Chest => 1.0,
        LootSource::Enemy | LootSource::Decor => BASE_DROP_CHANCE,
    };
    if !rng.chance(gate + bias) {
        return None;
    }
    generate(rng, level, source == LootSource::Boss, bias)
}

/// Rarity weights, a positive `bias` shifts weight towards the better
/// rarities.
///
/// Each rarity's base weight is scaled by `1 + bias * rank`, so zero bias
/// gives the plain table.
pub fn rarity_table(bias: f64) -> WeightedTable<Rarity> {
    let bias = bias.max(0.0);
    WeightedTable::new(
        Rarity::all()
            .enumerate()
            .map(|(rank, r)| (r, r.weight() * (1.0 + bias * rank as f64))),
    )
}

pub fn roll_rarity(rng: &mut impl Rng, bias: f64) -> Rarity {
    rarity_table(bias).sample(rng).unwrap_or_default()
}

/// Tier index for an item level, bosses get one tier better.
pub fn tier_index(level: u32, is_boss: bool) -> Option<usize> {
    let tiers = &Data::get().tiers;
    if tiers.is_empty() {
        return None;
    }
    let base = tiers
        .iter()
        .rposition(|t| t.min_level <= level)
        .unwrap_or(0);
    Some(if is_boss {
        (base + 1).min(tiers.len() - 1)
    } else {
        base
    })
}

/// Synthesize a piece of equipment.
///
/// Returns `None` only if the content tables are missing the needed
/// entries.
pub fn generate(
    rng: &mut impl Rng,
    level: u32,
    is_boss: bool,
    bias: f64,
) -> Option<LootItem> {
    let data = Data::get();
    let tier = &data.tiers[tier_index(level, is_boss)?];
    let mult = tier.mult;

    let slots: Vec<EquipSlot> = EquipSlot::iter().collect();
    let slot = *slots.choose(rng)?;

    let (base_name, stat_bias, mut weapon) = if slot == EquipSlot::Weapon {
        let idx = rng.gen_range(0..data.weapons.len().max(1));
        let (name, w) = data.weapons.get_index(idx)?;
        let weapon = WeaponStats {
            class: w.class,
            min_dmg: w.min_dmg,
            max_dmg: w.max_dmg,
            crit_chance: w.crit_chance,
            crit_mult: w.crit_mult,
            multi_hit: w.multi_hit,
        };
        (name.clone(), vec![w.class.scaling_stat()], Some(weapon))
    } else {
        let pattern = data.armor.get(&slot)?;
        let name = pattern.names.choose(rng)?.clone();
        (name, pattern.bias.clone(), None)
    };

    let rarity = roll_rarity(rng, bias);

    // One point per increment, each on its own pick from the slot's stats.
    let mut stats = StatBundle::default();
    for _ in 0..(mult.floor() as i32).max(1) {
        if let Some(&stat) = stat_bias.choose(rng) {
            stats.add(stat, 1);
        }
    }

    let affix_magnitude =
        |m: i32| ((m as f64 * mult).floor() as i32).max(1);

    let mut prefix = None;
    if rarity > Rarity::Common {
        if let Some(a) = data.prefixes.choose(rng) {
            stats.add(a.stat, affix_magnitude(a.magnitude));
            prefix = Some(a.name.clone());
        }
    }
    let mut suffix = None;
    if rarity >= Rarity::Rare {
        if let Some(a) = data.suffixes.choose(rng) {
            stats.add(a.stat, affix_magnitude(a.magnitude));
            suffix = Some(a.name.clone());
        }
    }

    if let Some(w) = weapon.as_mut() {
        w.min_dmg = (w.min_dmg as f64 * mult).floor() as i32;
        w.max_dmg = ((w.max_dmg as f64 * mult).floor() as i32).max(w.min_dmg);
        if rarity >= Rarity::Rare {
            w.min_dmg += 1;
            w.max_dmg += 2;
            w.crit_chance += 0.02;
        }
        if rarity >= Rarity::Mythic {
            w.min_dmg = (w.min_dmg as f64 * 1.25).floor() as i32;
            w.max_dmg = (w.max_dmg as f64 * 1.25).floor() as i32;
            w.multi_hit = (w.multi_hit + 0.15).min(1.0);
        }
    }

    let name = [
        prefix.as_deref(),
        Some(tier.name.as_str()),
        Some(base_name.as_str()),
        suffix.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    let value =
        (level.max(1) as f64 * 5.0 * mult * rarity.power()).floor() as i64;

    Some(LootItem {
        name,
        kind: ItemKind::Equipment,
        slot: Some(slot),
        rarity,
        tier: tier.name.clone(),
        level,
        stats,
        weapon,
        opens: None,
        value,
    })
}

/// A gathered material for a resource at a skill level.
///
/// Usually the best material the skill allows, sometimes a lesser one.
pub fn material(
    rng: &mut impl Rng,
    resource: Resource,
    skill_level: u32,
) -> Option<LootItem> {
    let data = Data::get();
    let mut pool = data.materials_for(resource, skill_level);
    if pool.is_empty() {
        // Unskilled gatherers still get the most basic material.
        pool = data
            .materials
            .iter()
            .filter(|m| m.source == resource)
            .take(1)
            .collect();
    }
    let best = pool.last()?;
    let m = if pool.len() > 1 && rng.chance(0.3) {
        pool.choose(rng)?
    } else {
        best
    };
    Some(LootItem::material(&m.name, m.min_level, m.value))
}

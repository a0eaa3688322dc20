//! Built-in game content tables.

use crate::{
    Affix, ArmorPattern, Behavior, Biome, Condition, Data, DungeonKind,
    EquipSlot, Material, MaterialTier, Monster, NamePart, Objective, Quest,
    Resource, Secret, Stat, WeaponArchetype, WeaponClass,
};

use Biome::*;
use DungeonKind::*;

fn monster(
    base_hp: i32,
    base_dmg: i32,
    min_level: u32,
    habitats: &[Biome],
) -> Monster {
    Monster {
        base_hp,
        base_dmg,
        min_level,
        habitats: habitats.to_vec(),
        ..Default::default()
    }
}

fn ranged(mut m: Monster, range: i32) -> Monster {
    m.behavior = Behavior::Ranged;
    m.attack_range = range;
    m
}

fn boss(base_hp: i32, base_dmg: i32, kind: DungeonKind) -> Monster {
    Monster {
        base_hp,
        base_dmg,
        xp_mod: 5.0,
        aggro_radius: 8,
        habitats: vec![Dungeon(kind)],
        is_boss: true,
        ..Default::default()
    }
}

fn prefix(name: &str, min_level: u32, max_level: u32) -> NamePart {
    NamePart {
        name: name.into(),
        min_level,
        max_level,
    }
}

fn weapon(
    class: WeaponClass,
    (min_dmg, max_dmg): (i32, i32),
    crit_chance: f64,
    crit_mult: f64,
    multi_hit: f64,
) -> WeaponArchetype {
    WeaponArchetype {
        class,
        min_dmg,
        max_dmg,
        crit_chance,
        crit_mult,
        multi_hit,
    }
}

fn armor(names: &[&str], bias: &[Stat]) -> ArmorPattern {
    ArmorPattern {
        names: names.iter().map(|a| a.to_string()).collect(),
        bias: bias.to_vec(),
    }
}

fn affix(name: &str, stat: Stat, magnitude: i32) -> Affix {
    Affix {
        name: name.into(),
        stat,
        magnitude,
    }
}

fn tier(name: &str, min_level: u32, mult: f64) -> MaterialTier {
    MaterialTier {
        name: name.into(),
        min_level,
        mult,
    }
}

fn material(
    name: &str,
    source: Resource,
    min_level: u32,
    value: i64,
    xp: i64,
) -> Material {
    Material {
        name: name.into(),
        source,
        min_level,
        value,
        xp,
    }
}

fn kill(id: &str, name: &str, target: &str, count: u32, gold: i64) -> Quest {
    Quest {
        id: id.into(),
        name: name.into(),
        objective: Objective::Kill {
            target: target.into(),
            count,
        },
        reward_xp: gold * 4,
        reward_gold: gold,
    }
}

fn collect(id: &str, name: &str, item: &str, count: u32, gold: i64) -> Quest {
    Quest {
        id: id.into(),
        name: name.into(),
        objective: Objective::Collect {
            item: item.into(),
            count,
        },
        reward_xp: gold * 3,
        reward_gold: gold,
    }
}

fn secret(id: &str, name: &str, condition: Condition, gold: i64) -> Secret {
    Secret {
        id: id.into(),
        name: name.into(),
        condition,
        reward_gold: gold,
    }
}

impl Data {
    pub fn builtin() -> Data {
        let bestiary = [
            ("Slime", monster(15, 2, 1, &[Grass, Forest])),
            ("Rat", monster(10, 2, 1, &[Grass, Dungeon(Crypt), Dungeon(Cave)])),
            ("Goblin", monster(18, 3, 2, &[Grass, Forest])),
            ("Goblin Archer", ranged(monster(14, 3, 3, &[Grass, Forest]), 4)),
            ("Bandit", monster(22, 4, 5, &[Grass, Desert])),
            ("Wolf", monster(20, 4, 1, &[Forest, Snow])),
            ("Giant Spider", monster(24, 4, 4, &[Forest, Dungeon(Cave)])),
            ("Treant", monster(40, 5, 8, &[Forest])),
            ("Frost Wolf", monster(24, 4, 1, &[Snow])),
            ("Yeti", monster(45, 6, 6, &[Snow, Dungeon(IceCavern)])),
            (
                "Ice Wraith",
                ranged(monster(20, 5, 3, &[Snow, Dungeon(IceCavern)]), 4),
            ),
            ("Scorpion", monster(18, 4, 1, &[Desert])),
            ("Sand Serpent", monster(26, 5, 4, &[Desert, Dungeon(Tomb)])),
            ("Dust Mage", ranged(monster(16, 5, 6, &[Desert]), 5)),
            ("Skeleton", monster(20, 3, 1, &[Dungeon(Crypt), Dungeon(Tomb)])),
            (
                "Skeleton Archer",
                ranged(monster(16, 3, 2, &[Dungeon(Crypt)]), 4),
            ),
            ("Zombie", monster(30, 3, 3, &[Dungeon(Crypt)])),
            ("Ghoul", monster(28, 5, 8, &[Dungeon(Crypt), Dungeon(Tomb)])),
            ("Bat", monster(8, 2, 1, &[Dungeon(Cave), Dungeon(IceCavern)])),
            ("Cave Troll", monster(50, 6, 6, &[Dungeon(Cave)])),
            ("Mummy", monster(32, 4, 1, &[Dungeon(Tomb)])),
            (
                "Frost Sprite",
                ranged(monster(12, 3, 1, &[Dungeon(IceCavern)]), 4),
            ),
            ("Lich King", boss(60, 7, Crypt)),
            ("Broodmother", boss(70, 6, Cave)),
            ("Sand Pharaoh", boss(65, 7, Tomb)),
            ("Frost Giant", boss(80, 8, IceCavern)),
        ]
        .into_iter()
        .map(|(n, m)| (n.to_string(), m))
        .collect();

        let monster_prefixes = vec![
            prefix("Young", 1, 6),
            prefix("Feral", 2, 14),
            prefix("Rabid", 4, 20),
            prefix("Dire", 8, 30),
            prefix("Savage", 12, 45),
            prefix("Ancient", 20, u32::MAX),
            prefix("Elder", 30, u32::MAX),
        ];

        use WeaponClass::*;
        let weapons = [
            ("Sword", weapon(Blade, (3, 6), 0.05, 1.5, 0.0)),
            ("Axe", weapon(Blade, (4, 8), 0.05, 1.75, 0.0)),
            ("Mace", weapon(Blunt, (5, 7), 0.03, 2.0, 0.0)),
            ("Warhammer", weapon(Blunt, (6, 10), 0.03, 2.0, 0.0)),
            ("Dagger", weapon(Dagger, (2, 4), 0.15, 2.0, 0.2)),
            ("Bow", weapon(Bow, (3, 7), 0.10, 1.75, 0.1)),
            ("Staff", weapon(Staff, (3, 5), 0.05, 1.5, 0.0)),
            ("Wand", weapon(Wand, (2, 6), 0.08, 1.6, 0.1)),
        ]
        .into_iter()
        .map(|(n, w)| (n.to_string(), w))
        .collect();

        use Stat::*;
        let armor = [
            (EquipSlot::Head, armor(&["Helm", "Hood", "Circlet"], &[Vit, Int])),
            (
                EquipSlot::Chest,
                armor(&["Cuirass", "Robe", "Jerkin"], &[Vit, Str]),
            ),
            (EquipSlot::Legs, armor(&["Greaves", "Leggings"], &[Vit, Dex])),
            (EquipSlot::Feet, armor(&["Boots", "Sandals"], &[Dex])),
            (EquipSlot::Hands, armor(&["Gauntlets", "Gloves"], &[Str, Dex])),
            (EquipSlot::Ring, armor(&["Ring", "Band"], &[Int, Regen])),
            (
                EquipSlot::Amulet,
                armor(&["Amulet", "Pendant"], &[Int, Regen, Vit]),
            ),
        ]
        .into_iter()
        .collect();

        let prefixes = vec![
            affix("Mighty", Str, 2),
            affix("Brutal", Str, 3),
            affix("Nimble", Dex, 2),
            affix("Deft", Dex, 3),
            affix("Wise", Int, 2),
            affix("Arcane", Int, 3),
            affix("Sturdy", Vit, 2),
            affix("Vital", Regen, 1),
        ];

        let suffixes = vec![
            affix("of the Bear", Str, 2),
            affix("of the Fox", Dex, 2),
            affix("of the Owl", Int, 2),
            affix("of the Whale", Vit, 3),
            affix("of Renewal", Regen, 1),
        ];

        let tiers = vec![
            tier("Crude", 1, 1.0),
            tier("Iron", 5, 1.5),
            tier("Steel", 10, 2.2),
            tier("Mithril", 18, 3.2),
            tier("Adamant", 28, 4.5),
            tier("Runic", 40, 6.5),
            tier("Celestial", 55, 9.0),
        ];

        use Resource::*;
        let materials = vec![
            material("Log", Wood, 1, 2, 10),
            material("Oak Log", Wood, 6, 5, 18),
            material("Maple Log", Wood, 14, 9, 30),
            material("Yew Log", Wood, 24, 16, 48),
            material("Stone", Ore, 1, 1, 10),
            material("Copper Ore", Ore, 4, 4, 16),
            material("Iron Ore", Ore, 10, 8, 28),
            material("Mithril Ore", Ore, 20, 18, 45),
            material("Minnow", Fish, 1, 1, 8),
            material("Trout", Fish, 5, 4, 16),
            material("Salmon", Fish, 12, 8, 26),
            material("Pike", Fish, 20, 14, 40),
        ];

        let quests = vec![
            kill("slime-cull", "Slime Cull", "Slime", 5, 20),
            collect("firewood", "Firewood for the Winter", "Log", 10, 25),
            kill("goblin-menace", "The Goblin Menace", "Goblin", 8, 40),
            kill("wolf-hunt", "Wolf Hunt", "Wolf", 6, 50),
            collect("stonework", "Stonework", "Stone", 15, 45),
            kill("restless-dead", "The Restless Dead", "Skeleton", 10, 80),
            kill("crypt-lord", "Lord of the Crypt", "Lich King", 1, 250),
        ];

        let count = |name: &str, n| Condition::Counter(name.into(), n);
        let secrets = vec![
            secret("first-blood", "First Blood", count("kills", 1), 5),
            secret("slayer", "Slayer", count("kills", 100), 100),
            secret("naturalist", "Naturalist", Condition::Bestiary(10), 75),
            secret("wanderer", "Wanderer", Condition::MapsVisited(10), 50),
            secret(
                "delver",
                "Delver",
                Condition::Flag("entered-dungeon".into()),
                25,
            ),
            secret("lumberjack", "Lumberjack", count("harvest:wood", 50), 40),
            secret(
                "tier-breaker",
                "Beyond the Veil",
                Condition::WorldTier(1),
                200,
            ),
        ];

        Data {
            bestiary,
            monster_prefixes,
            weapons,
            armor,
            prefixes,
            suffixes,
            tiers,
            materials,
            quests,
            secrets,
        }
    }
}

//! Random-walk dungeon generation.

use glam::{ivec2, IVec2};
use rand::{seq::SliceRandom, Rng};
use util::{s8, RngExt, DIR_4};

use crate::{
    mapgen, scaling::HpMods, Biome, Chest, Data, DecorKind, DungeonKind,
    EntityKind, Link, LinkKind, LootItem, Map, MapId, Mob, Object, Tile,
    TileGrid, DUNGEON_HEIGHT, DUNGEON_WIDTH,
};

/// Fraction of the interior cells the walk tries to carve out.
pub const FLOOR_FRACTION: f64 = 0.35;

/// The walk gives up after this many steps per target floor cell.
pub const STEP_BUDGET: usize = 8;

const DECOR_CHANCE: f64 = 0.04;
const ENEMY_CHANCE: f64 = 0.03;

/// Things generation needs to know about where a dungeon is entered from.
#[derive(Clone, Debug)]
pub struct DungeonSpec {
    pub id: MapId,
    /// Display name of the parent zone.
    pub zone_name: String,
    pub zone_difficulty: i32,
    pub kind: DungeonKind,
    /// Zone the entrance is in.
    pub parent: MapId,
    /// Entrance cell on the parent zone.
    pub entry: IVec2,
    pub player_level: u32,
    pub world_tier: u32,
}

impl DungeonSpec {
    /// Level of regular dungeon monsters.
    pub fn floor_level(&self) -> u32 {
        let from_zone =
            (self.zone_difficulty.max(0) as f64 * 1.5).floor() as u32;
        from_zone.max(self.player_level + 1) + 2 * self.world_tier
    }
}

fn decor_kinds(kind: DungeonKind) -> &'static [DecorKind] {
    use DecorKind::*;
    match kind {
        DungeonKind::Crypt => &[Urn, Bones, Statue],
        DungeonKind::Cave => &[Mushroom, Stalagmite, Bones],
        DungeonKind::Tomb => &[Urn, Statue, Crate],
        DungeonKind::IceCavern => &[Stalagmite, Barrel, Bones],
    }
}

/// Key item that opens the boss chest of a dungeon.
pub fn dungeon_key(kind: DungeonKind, id: MapId) -> LootItem {
    LootItem::key(format!("{} Key", kind.name()), id)
}

/// Carve a dungeon with a drunkard's walk from the center.
///
/// The walk's last cell becomes the boss room with a locked chest next to
/// the boss, and the starting cell gets the stairs and a return portal.
pub fn generate_dungeon(rng: &mut impl Rng, spec: &DungeonSpec) -> Map {
    let (w, h) = (DUNGEON_WIDTH, DUNGEON_HEIGHT);
    let mut terrain = TileGrid::new(w, h, Tile::Wall);

    let interior = ((w - 2) * (h - 2)) as usize;
    let target = ((interior as f64) * FLOOR_FRACTION) as usize;
    let budget = target * STEP_BUDGET;

    let start = ivec2(w / 2, h / 2);
    let mut pos = start;
    terrain.set(pos, Tile::Floor);
    let mut floors = 1;
    let mut steps = 0;

    while floors < target && steps < budget {
        steps += 1;
        let Some(&dir) = DIR_4.choose(rng) else { break };
        pos = (pos + dir).clamp(ivec2(1, 1), ivec2(w - 2, h - 2));
        if terrain.get(pos) == Some(Tile::Wall) {
            terrain.set(pos, Tile::Floor);
            floors += 1;
        }
    }

    // A walk that wandered back home would put the boss on the stairs, use
    // the farthest carved cell instead.
    let boss_pos = if s8::d(&pos, &start) < 4 {
        terrain
            .iter()
            .filter(|(_, t)| *t == Tile::Floor)
            .max_by_key(|(p, _)| (s8::d(p, &start), -p.y, -p.x))
            .map_or(pos, |(p, _)| p)
    } else {
        pos
    };

    for d in s8::DIR {
        let p = (boss_pos + d).clamp(ivec2(1, 1), ivec2(w - 2, h - 2));
        terrain.set(p, Tile::Floor);
    }
    terrain.set(start, Tile::StairsUp);

    let mut map = Map::new(
        spec.id,
        format!("{} under {}", spec.kind.name(), spec.zone_name),
        terrain,
        Biome::Dungeon(spec.kind),
        spec.zone_difficulty,
    );

    map.spawn(
        "Return Portal",
        start,
        EntityKind::Object(Object::Link(Link {
            target: spec.parent,
            pos: spec.entry,
            kind: LinkKind::Portal,
        })),
    );

    let level = spec.floor_level();
    let data = Data::get();

    if let Some((name, monster)) = data.boss_for(spec.kind) {
        let mob = Mob::new(
            name,
            monster,
            level + 2,
            HpMods {
                boss: true,
                world_tier: spec.world_tier,
                ..Default::default()
            },
        );
        map.spawn(name, boss_pos, EntityKind::Enemy(mob));
    }

    if let Some(p) = s8::ns(boss_pos).find(|&p| map.is_free(p)) {
        map.spawn(
            "Boss Chest",
            p,
            EntityKind::Object(Object::Chest(Chest {
                lock: Some(spec.id),
                looted: false,
                level: level + 2,
            })),
        );
    }

    let cells: Vec<IVec2> = map
        .terrain
        .iter()
        .filter_map(|(p, t)| (t == Tile::Floor).then_some(p))
        .collect();
    for p in cells {
        // Keep the arrival area and boss room clear.
        if s8::d(&p, &start) <= 3 || s8::d(&p, &boss_pos) <= 2 {
            continue;
        }
        if !map.is_free(p) {
            continue;
        }

        if rng.chance(DECOR_CHANCE) {
            if let Some(&kind) = decor_kinds(spec.kind).choose(rng) {
                let decor = EntityKind::Object(Object::Decor(kind));
                map.spawn(kind.name(), p, decor);
            }
        } else if rng.chance(ENEMY_CHANCE) {
            let (name, mob) =
                mapgen::roll_mob(rng, Biome::Dungeon(spec.kind), level, 0.0);
            if let Some(mut mob) = mob {
                if spec.world_tier > 0 {
                    let mods = HpMods {
                        world_tier: spec.world_tier,
                        ..Default::default()
                    };
                    if let Some(m) = data.bestiary.get(&mob.template) {
                        mob = Mob::new(mob.template.clone(), m, level, mods);
                    }
                }
                map.spawn(name, p, EntityKind::Enemy(mob));
            }
        }
    }

    log::debug!(
        "generated dungeon {} with {floors} floor cells in {steps} steps",
        spec.id
    );
    map
}

#[cfg(test)]
mod tests {
    use util::srng;

    use super::*;

    fn spec(
        zone_difficulty: i32,
        player_level: u32,
        world_tier: u32,
    ) -> DungeonSpec {
        let parent = MapId::zone(10, 10);
        let entry = ivec2(31, 4);
        DungeonSpec {
            id: MapId::Dungeon {
                zone: parent.zone_pos(),
                entry,
            },
            zone_name: "Test Meadows".into(),
            zone_difficulty,
            kind: DungeonKind::Crypt,
            parent,
            entry,
            player_level,
            world_tier,
        }
    }

    #[test]
    fn floor_level_formula() {
        assert_eq!(spec(4, 1, 0).floor_level(), 6);
        assert_eq!(spec(4, 9, 0).floor_level(), 10);
        assert_eq!(spec(4, 1, 2).floor_level(), 10);
        assert_eq!(spec(0, 0, 0).floor_level(), 1);
    }

    #[test]
    fn layout() {
        for seed in 0..10 {
            let s = spec(3, 2, 0);
            let map = generate_dungeon(&mut srng(&seed), &s);
            assert_eq!(map.dim(), ivec2(DUNGEON_WIDTH, DUNGEON_HEIGHT));

            // Solid outer wall.
            for p in map.terrain.points().filter(|&p| map.terrain.is_edge(p)) {
                assert_eq!(map.tile(p), Some(Tile::Wall));
            }

            let start = map.find_tile(Tile::StairsUp).unwrap();
            let portal = map.entity_at(start).unwrap();
            assert_eq!(
                portal.kind,
                EntityKind::Object(Object::Link(Link {
                    target: s.parent,
                    pos: s.entry,
                    kind: LinkKind::Portal
                }))
            );

            let bosses: Vec<_> = map
                .entities
                .iter()
                .filter(|e| e.mob().is_some_and(|m| m.is_boss))
                .collect();
            assert_eq!(bosses.len(), 1);
            let boss = bosses[0];
            assert_eq!(boss.level(), s.floor_level() + 2);

            let chest = map
                .entities
                .iter()
                .find(|e| {
                    matches!(e.kind, EntityKind::Object(Object::Chest(_)))
                })
                .unwrap();
            assert_eq!(s8::d(&chest.pos, &boss.pos), 1);
            assert_eq!(
                chest.kind,
                EntityKind::Object(Object::Chest(Chest {
                    lock: Some(s.id),
                    looted: false,
                    level: s.floor_level() + 2,
                }))
            );

            let floors = map.terrain.count(Tile::is_walkable);
            let interior = ((DUNGEON_WIDTH - 2) * (DUNGEON_HEIGHT - 2)) as f64;
            assert!(floors as f64 <= interior * FLOOR_FRACTION + 10.0);
            assert!(floors > 100);

            for e in map.entities.iter().filter(|e| e.mob().is_some()) {
                assert!(s8::d(&e.pos, &start) > 3);
            }
        }
    }

    #[test]
    fn same_seed_same_dungeon() {
        let s = spec(5, 3, 1);
        let a = generate_dungeon(&mut srng(&(1, s.id)), &s);
        let b = generate_dungeon(&mut srng(&(1, s.id)), &s);
        assert_eq!(a, b);
    }

    #[test]
    fn boss_hp_scales_with_tier() {
        let base = generate_dungeon(&mut srng(&9), &spec(2, 1, 0));
        let tiered = generate_dungeon(&mut srng(&9), &spec(2, 1, 1));
        let boss_hp = |m: &Map| {
            m.entities
                .iter()
                .find_map(|e| e.mob().filter(|m| m.is_boss).map(|m| m.max_hp))
                .unwrap()
        };
        assert!(boss_hp(&tiered) > boss_hp(&base));
    }
}

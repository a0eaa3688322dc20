//! Overworld zone, town and house interior generation.

use glam::{ivec2, IVec2};
use rand::{seq::SliceRandom, Rng};
use util::{RngExt, WeightedTable};

use crate::{
    scaling::HpMods, Biome, Data, DecorKind, EntityKind, Link, LinkKind, Map,
    MapId, Mob, Npc, NpcRole, Object, Spawner, Station, Tile, TileGrid,
    ZoneCell, INTERIOR_HEIGHT, INTERIOR_WIDTH, ZONE_HEIGHT, ZONE_WIDTH,
};

/// Chance for a wild zone to have a dungeon entrance.
pub const DUNGEON_ENTRANCE_CHANCE: f64 = 0.35;

/// Chance for a wild zone to have a monster spawner.
pub const SPAWNER_CHANCE: f64 = 0.25;

/// Chance for a regular monster to be an elite.
pub const ELITE_CHANCE: f64 = 0.08;

const MAX_ENEMIES: i32 = 12;

/// Generate an overworld zone map from its plan.
pub fn generate_zone(rng: &mut impl Rng, id: MapId, cell: &ZoneCell) -> Map {
    let mut map = if cell.is_town {
        generate_town(id, &cell.name)
    } else {
        generate_wild(rng, id, cell)
    };
    map.neighbors = cell.neighbors;
    log::debug!(
        "generated zone {id} {:?}, {} entities",
        map.name,
        map.entities.len()
    );
    map
}

/// Position of the arrival cell inside a house.
pub fn interior_entry() -> IVec2 {
    ivec2(INTERIOR_WIDTH / 2, INTERIOR_HEIGHT - 2)
}

fn terrain_table(biome: Biome) -> WeightedTable<Tile> {
    use Tile::*;
    let weights: &[(Tile, f64)] = match biome {
        Biome::Grass => &[
            (Grass, 78.0),
            (Tree, 9.0),
            (Rock, 5.0),
            (Water, 6.0),
            (Path, 2.0),
        ],
        Biome::Forest => {
            &[(Grass, 62.0), (Tree, 28.0), (Rock, 4.0), (Water, 6.0)]
        }
        Biome::Snow => {
            &[(Snow, 78.0), (Tree, 8.0), (Rock, 10.0), (Water, 4.0)]
        }
        Biome::Desert => &[
            (Sand, 84.0),
            (Rock, 9.0),
            (Tree, 2.0),
            (Water, 3.0),
            (Lava, 2.0),
        ],
        Biome::Interior | Biome::Dungeon(_) => &[(Floor, 1.0)],
    };
    WeightedTable::new(weights.iter().copied())
}

fn generate_wild(rng: &mut impl Rng, id: MapId, cell: &ZoneCell) -> Map {
    let ground = cell.biome.ground();
    let table = terrain_table(cell.biome);

    let mut terrain = TileGrid::new(ZONE_WIDTH, ZONE_HEIGHT, ground);
    for p in terrain.points().collect::<Vec<_>>() {
        // Edge cells stay clear so zone transitions always have somewhere
        // to land.
        if !terrain.is_edge(p) {
            if let Some(t) = table.sample(rng) {
                terrain.set(p, t);
            }
        }
    }

    let mut map =
        Map::new(id, &cell.name, terrain, cell.biome, cell.difficulty);

    if rng.chance(DUNGEON_ENTRANCE_CHANCE) {
        let p = random_inner_cell(rng, &map, 3);
        for q in util::s8::ns(p) {
            map.terrain.set(q, ground);
        }
        map.terrain.set(p, Tile::DungeonEntrance);
    }

    // Fishing spots sit on water cells.
    let water: Vec<IVec2> = map
        .terrain
        .iter()
        .filter_map(|(p, t)| (t == Tile::Water).then_some(p))
        .collect();
    for p in water {
        if rng.one_chance_in(6) {
            map.spawn(
                "fishing spot",
                p,
                EntityKind::Object(Object::FishingSpot),
            );
        }
    }

    let data = Data::get();
    let difficulty = cell.difficulty.max(0);
    let count = (3 + difficulty / 2).min(MAX_ENEMIES);
    for _ in 0..count {
        let level = (difficulty + rng.gen_range(-1..=1)).max(1) as u32;
        let Some(p) = random_free_cell(rng, &map) else { break };
        let (name, mob) = roll_mob(rng, cell.biome, level, ELITE_CHANCE);
        if let Some(mob) = mob {
            map.spawn(name, p, EntityKind::Enemy(mob));
        }
    }

    if rng.chance(SPAWNER_CHANCE) {
        let level = difficulty.max(1) as u32;
        let pool = data.monster_pool(cell.biome, level);
        if let (Some(template), Some(p)) =
            (pool.choose(rng), random_free_cell(rng, &map))
        {
            map.spawn(
                format!("{template} Nest"),
                p,
                EntityKind::Spawner(Spawner::new(*template, level)),
            );
        }
    }

    map
}

/// Pick a regular monster for a habitat and roll its display name.
///
/// Returns the name and `None` for the mob if the habitat has no monsters.
pub fn roll_mob(
    rng: &mut impl Rng,
    habitat: Biome,
    level: u32,
    elite_chance: f64,
) -> (String, Option<Mob>) {
    let data = Data::get();
    let Some(template) = data.monster_pool(habitat, level).choose(rng).copied()
    else {
        return (String::new(), None);
    };
    let Some(monster) = data.bestiary.get(template) else {
        return (String::new(), None);
    };

    let elite = rng.chance(elite_chance);
    let mut name = match data.monster_prefixes_for(level).choose(rng) {
        Some(prefix) => format!("{prefix} {template}"),
        None => template.to_string(),
    };
    if elite {
        name = format!("Elite {name}");
    }

    let mob = Mob::new(
        template,
        monster,
        level,
        HpMods {
            elite,
            ..Default::default()
        },
    );
    (name, Some(mob))
}

/// Random walkable unoccupied cell away from the map edge.
pub fn random_free_cell(rng: &mut impl Rng, map: &Map) -> Option<IVec2> {
    let dim = map.dim();
    for _ in 0..200 {
        let p =
            ivec2(rng.gen_range(1..dim.x - 1), rng.gen_range(1..dim.y - 1));
        if map.is_free(p) {
            return Some(p);
        }
    }
    let mut cells: Vec<IVec2> = map
        .terrain
        .points()
        .filter(|&p| !map.terrain.is_edge(p) && map.is_free(p))
        .collect();
    cells.shuffle(rng);
    cells.pop()
}

fn random_inner_cell(rng: &mut impl Rng, map: &Map, margin: i32) -> IVec2 {
    let dim = map.dim();
    ivec2(
        rng.gen_range(margin..dim.x - margin),
        rng.gen_range(margin..dim.y - margin),
    )
}

/// House footprints as (top-left, bottom-right) wall corners, door at the
/// middle of the bottom wall.
const HOUSES: [(IVec2, IVec2); 2] = [
    (IVec2::from_array([5, 4]), IVec2::from_array([11, 9])),
    (IVec2::from_array([28, 20]), IVec2::from_array([34, 25])),
];

/// Fixed town layout. Uses no randomness, every world has the same town.
pub fn generate_town(id: MapId, name: &str) -> Map {
    let (w, h) = (ZONE_WIDTH, ZONE_HEIGHT);
    let c = ivec2(w / 2, h / 2);
    let mut terrain = TileGrid::new(w, h, Tile::Grass);

    for x in 0..w {
        terrain.set(ivec2(x, c.y), Tile::Path);
    }
    for y in 0..h {
        terrain.set(ivec2(c.x, y), Tile::Path);
    }
    for y in c.y - 3..=c.y + 3 {
        for x in c.x - 4..=c.x + 4 {
            terrain.set(ivec2(x, y), Tile::Cobble);
        }
    }

    let mut doors = Vec::new();
    for (a, b) in HOUSES {
        for y in a.y..=b.y {
            for x in a.x..=b.x {
                let edge = x == a.x || x == b.x || y == a.y || y == b.y;
                let t = if edge { Tile::Wall } else { Tile::Floor };
                terrain.set(ivec2(x, y), t);
            }
        }
        let door = ivec2((a.x + b.x) / 2, b.y);
        terrain.set(door, Tile::Door);
        doors.push(door);
    }

    // Fishing pond.
    for y in 4..=7 {
        for x in 30..=35 {
            terrain.set(ivec2(x, y), Tile::Water);
        }
    }

    let trees = [
        ivec2(3, 22),
        ivec2(4, 24),
        ivec2(6, 23),
        ivec2(36, 12),
        ivec2(37, 14),
    ];
    for p in trees {
        terrain.set(p, Tile::Tree);
    }
    for p in [ivec2(14, 24), ivec2(25, 5)] {
        terrain.set(p, Tile::Rock);
    }

    let mut map = Map::new(id, name, terrain, Biome::Grass, 0);
    map.is_town = true;

    let npc = |role, greeting: &str| {
        EntityKind::Npc(Npc {
            role,
            greeting: greeting.into(),
        })
    };
    map.spawn(
        "Elder",
        c + ivec2(-2, -1),
        npc(NpcRole::Elder, "The wilds grow restless, traveler."),
    );
    map.spawn(
        "Merchant",
        c + ivec2(2, -1),
        npc(NpcRole::Merchant, "Finest wares in Haven!"),
    );
    map.spawn(
        "Blacksmith",
        c + ivec2(2, 2),
        npc(NpcRole::Blacksmith, "Bring me ore and I'll make it sing."),
    );
    map.spawn("Shrine", c + ivec2(0, -2), EntityKind::Object(Object::Shrine));

    let station = |s| EntityKind::Object(Object::Station(s));
    map.spawn("Anvil", c + ivec2(6, 2), station(Station::Anvil));
    map.spawn("Workbench", c + ivec2(6, -2), station(Station::Workbench));
    map.spawn("Cauldron", c + ivec2(-6, -2), station(Station::Cauldron));

    for p in [ivec2(30, 5), ivec2(33, 7)] {
        map.spawn("fishing spot", p, EntityKind::Object(Object::FishingSpot));
    }

    for door in doors {
        map.spawn(
            "door",
            door,
            EntityKind::Object(Object::Link(Link {
                target: MapId::Interior {
                    zone: id.zone_pos(),
                    door,
                },
                pos: interior_entry(),
                kind: LinkKind::Door,
            })),
        );
    }

    map
}

/// Small house interior whose door leads back to the zone.
pub fn generate_interior(rng: &mut impl Rng, id: MapId) -> Map {
    let (w, h) = (INTERIOR_WIDTH, INTERIOR_HEIGHT);
    let mut terrain = TileGrid::new(w, h, Tile::Floor);
    for p in terrain.points().collect::<Vec<_>>() {
        if terrain.is_edge(p) {
            terrain.set(p, Tile::Wall);
        }
    }

    let door = ivec2(w / 2, h - 1);
    terrain.set(door, Tile::Door);

    let mut map = Map::new(id, "House", terrain, Biome::Interior, 0);

    let (zone, outside) = match id {
        MapId::Interior { zone, door } => {
            (MapId::Zone(zone), door + ivec2(0, 1))
        }
        other => (other.parent_zone(), IVec2::ZERO),
    };
    map.spawn(
        "door",
        door,
        EntityKind::Object(Object::Link(Link {
            target: zone,
            pos: outside,
            kind: LinkKind::Door,
        })),
    );

    map.spawn(
        "Villager",
        ivec2(2, 2),
        EntityKind::Npc(Npc {
            role: NpcRole::Villager,
            greeting: "Mind the mud on your boots.".into(),
        }),
    );

    for kind in [DecorKind::Crate, DecorKind::Barrel] {
        if let Some(p) = random_free_cell(rng, &map) {
            if p.y < h - 2 {
                let decor = EntityKind::Object(Object::Decor(kind));
                map.spawn(kind.name(), p, decor);
            }
        }
    }

    map
}

use std::fmt;

use glam::{ivec2, IVec2};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use util::IndexMap;

use crate::{Biome, MapId, Neighbors};

/// Plan for one overworld zone, the zone map itself is generated on first
/// visit.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct ZoneCell {
    pub name: String,
    pub biome: Biome,
    pub difficulty: i32,
    pub is_town: bool,
    pub neighbors: Neighbors,
}

/// Grid of zones making up the world surface.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Overworld {
    pub size: IVec2,
    pub town: MapId,
    pub cells: IndexMap<MapId, ZoneCell>,
}

const ZONE_ADJECTIVES: [&str; 12] = [
    "Whispering", "Old", "Gray", "Hollow", "Red", "Silent", "Bleak", "Golden",
    "Lost", "Windy", "Broken", "Pale",
];

impl Overworld {
    /// Lay out a `width` x `height` grid of zones with the town in the
    /// middle.
    ///
    /// The top quarter of rows is snow, the bottom quarter desert, and the
    /// rows between are grassland or forest. Difficulty grows with distance
    /// from town plus a per-biome bonus.
    pub fn generate(rng: &mut impl Rng, width: i32, height: i32) -> Overworld {
        let (width, height) = (width.max(1), height.max(1));
        let town_pos = ivec2(width / 2, height / 2);
        let band = height / 4;

        let mut cells = IndexMap::default();
        for y in 0..height {
            for x in 0..width {
                let p = ivec2(x, y);
                let is_town = p == town_pos;

                let biome = if is_town {
                    Biome::Grass
                } else if y < band {
                    Biome::Snow
                } else if y >= height - band {
                    Biome::Desert
                } else if rng.gen_bool(0.5) {
                    Biome::Grass
                } else {
                    Biome::Forest
                };

                let difficulty = if is_town {
                    0
                } else {
                    (p - town_pos).as_vec2().length().floor() as i32
                        + biome.difficulty_bonus()
                };

                let name = if is_town {
                    "Haven".to_string()
                } else {
                    let adj =
                        ZONE_ADJECTIVES.choose(rng).copied().unwrap_or("Wild");
                    format!("{adj} {}", biome.name())
                };

                let neighbor = |d: IVec2| {
                    let q = p + d;
                    (q.x >= 0 && q.y >= 0 && q.x < width && q.y < height)
                        .then_some(MapId::Zone(q))
                };

                cells.insert(
                    MapId::Zone(p),
                    ZoneCell {
                        name,
                        biome,
                        difficulty,
                        is_town,
                        neighbors: Neighbors {
                            north: neighbor(ivec2(0, -1)),
                            east: neighbor(ivec2(1, 0)),
                            south: neighbor(ivec2(0, 1)),
                            west: neighbor(ivec2(-1, 0)),
                        },
                    },
                );
            }
        }

        log::debug!(
            "generated {width}x{height} overworld, town at {town_pos}"
        );

        Overworld {
            size: ivec2(width, height),
            town: MapId::Zone(town_pos),
            cells,
        }
    }

    pub fn get(&self, id: MapId) -> Option<&ZoneCell> {
        self.cells.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MapId, &ZoneCell)> {
        self.cells.iter()
    }
}

impl fmt::Display for Overworld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size.y {
            for x in 0..self.size.x {
                let c = match self.get(MapId::zone(x, y)) {
                    Some(z) if z.is_town => '@',
                    Some(z) => match z.biome {
                        Biome::Grass => ',',
                        Biome::Forest => 'T',
                        Biome::Snow => '*',
                        Biome::Desert => ';',
                        _ => '?',
                    },
                    None => ' ',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

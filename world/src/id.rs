use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail};
use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Identifier of a map in the world registry.
///
/// Textual forms are `zone:10,10`, `dungeon:10,10@31,4` and
/// `interior:10,10@5,6`. Dungeons and interiors carry the coordinates of the
/// overworld zone they hang off and the zone cell of their entrance.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub enum MapId {
    Zone(IVec2),
    Dungeon { zone: IVec2, entry: IVec2 },
    Interior { zone: IVec2, door: IVec2 },
}

impl MapId {
    pub fn zone(x: i32, y: i32) -> Self {
        MapId::Zone(ivec2(x, y))
    }

    /// Overworld coordinates of the zone this map belongs to.
    pub fn zone_pos(&self) -> IVec2 {
        match *self {
            MapId::Zone(p) => p,
            MapId::Dungeon { zone, .. } | MapId::Interior { zone, .. } => zone,
        }
    }

    /// The overworld zone this map belongs to.
    pub fn parent_zone(&self) -> MapId {
        MapId::Zone(self.zone_pos())
    }

    pub fn is_zone(&self) -> bool {
        matches!(self, MapId::Zone(_))
    }

    pub fn is_dungeon(&self) -> bool {
        matches!(self, MapId::Dungeon { .. })
    }

    pub fn is_interior(&self) -> bool {
        matches!(self, MapId::Interior { .. })
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapId::Zone(p) => write!(f, "zone:{},{}", p.x, p.y),
            MapId::Dungeon { zone, entry } => write!(
                f,
                "dungeon:{},{}@{},{}",
                zone.x, zone.y, entry.x, entry.y
            ),
            MapId::Interior { zone, door } => write!(
                f,
                "interior:{},{}@{},{}",
                zone.x, zone.y, door.x, door.y
            ),
        }
    }
}

fn parse_pair(s: &str) -> anyhow::Result<IVec2> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| anyhow!("Bad coordinate pair {s:?}"))?;
    Ok(ivec2(x.trim().parse()?, y.trim().parse()?))
}

impl FromStr for MapId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Bad map id {s:?}"))?;

        match kind {
            "zone" => Ok(MapId::Zone(parse_pair(rest)?)),
            "dungeon" | "interior" => {
                let (zone, at) = rest
                    .split_once('@')
                    .ok_or_else(|| anyhow!("Map id {s:?} is missing '@'"))?;
                let (zone, at) = (parse_pair(zone)?, parse_pair(at)?);
                if kind == "dungeon" {
                    Ok(MapId::Dungeon { zone, entry: at })
                } else {
                    Ok(MapId::Interior { zone, door: at })
                }
            }
            _ => bail!("Unknown map kind {kind:?}"),
        }
    }
}

/// Handle of an entity within its map.
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
)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved for the player, never handed out to map entities.
    pub const PLAYER: EntityId = EntityId(0);
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_forms() {
        let ids = [
            ("zone:10,10", MapId::zone(10, 10)),
            (
                "dungeon:10,10@31,4",
                MapId::Dungeon {
                    zone: ivec2(10, 10),
                    entry: ivec2(31, 4),
                },
            ),
            (
                "interior:-1,2@5,6",
                MapId::Interior {
                    zone: ivec2(-1, 2),
                    door: ivec2(5, 6),
                },
            ),
        ];

        for (s, id) in ids {
            assert_eq!(id.to_string(), s);
            assert_eq!(s.parse::<MapId>().unwrap(), id);
        }
    }

    #[test]
    fn bad_ids() {
        for s in ["", "zone", "zone:1", "cave:1,1", "dungeon:1,1", "zone:a,b"] {
            assert!(s.parse::<MapId>().is_err(), "{s:?} parsed");
        }
    }

    #[test]
    fn parent_zone() {
        let id: MapId = "dungeon:3,4@1,1".parse().unwrap();
        assert_eq!(id.parent_zone(), MapId::zone(3, 4));
        assert!(id.is_dungeon());
        assert!(!id.is_zone());
    }
}

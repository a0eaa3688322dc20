use std::fmt;

use anyhow::bail;
use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use util::HashSet;

/// Terrain type of a single map cell.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Serialize,
    Deserialize,
    EnumIter,
)]
#[serde(try_from = "char", into = "char")]
pub enum Tile {
    #[default]
    Wall,
    Floor,
    Grass,
    Path,
    Cobble,
    Sand,
    Snow,
    Tree,
    Rock,
    Water,
    Lava,
    Door,
    DungeonEntrance,
    StairsUp,
    /// What's left of a tree after it's been cut down.
    Stump,
    /// What's left of a rock after it's been mined out.
    Rubble,
}

use Tile::*;

impl Tile {
    pub fn blocks_movement(self) -> bool {
        matches!(self, Wall | Tree | Rock | Water | Lava)
    }

    pub fn is_walkable(self) -> bool {
        !self.blocks_movement()
    }

    pub fn blocks_sight(self) -> bool {
        matches!(self, Wall | Tree | Rock)
    }

    /// Tile can be worked for materials by bumping into it.
    pub fn is_harvestable(self) -> bool {
        self.depleted().is_some()
    }

    /// The walkable tile a harvestable tile turns into.
    pub fn depleted(self) -> Option<Tile> {
        match self {
            Tree => Some(Stump),
            Rock => Some(Rubble),
            _ => None,
        }
    }

    pub fn is_path(self) -> bool {
        matches!(self, Path | Cobble)
    }
}

impl TryFrom<char> for Tile {
    type Error = anyhow::Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '#' => Ok(Wall),
            '.' => Ok(Floor),
            ',' => Ok(Grass),
            ':' => Ok(Path),
            '=' => Ok(Cobble),
            ';' => Ok(Sand),
            '*' => Ok(Snow),
            'T' => Ok(Tree),
            'o' => Ok(Rock),
            '~' => Ok(Water),
            '&' => Ok(Lava),
            '+' => Ok(Door),
            '>' => Ok(DungeonEntrance),
            '<' => Ok(StairsUp),
            't' => Ok(Stump),
            '%' => Ok(Rubble),
            _ => bail!("Bad tile {value:?}"),
        }
    }
}

impl From<Tile> for char {
    fn from(value: Tile) -> Self {
        // This must match the mapping in Tile::try_from.
        match value {
            Wall => '#',
            Floor => '.',
            Grass => ',',
            Path => ':',
            Cobble => '=',
            Sand => ';',
            Snow => '*',
            Tree => 'T',
            Rock => 'o',
            Water => '~',
            Lava => '&',
            Door => '+',
            DungeonEntrance => '>',
            StairsUp => '<',
            Stump => 't',
            Rubble => '%',
        }
    }
}

/// Rectangular tile map with an overlay of depleted resource cells.
///
/// The generated base layer never changes after generation, harvesting only
/// adds to the depletion set.
#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "GridRepr", into = "GridRepr")]
pub struct TileGrid {
    dim: IVec2,
    base: Vec<Tile>,
    depleted: HashSet<IVec2>,
}

impl TileGrid {
    pub fn new(width: i32, height: i32, fill: Tile) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        TileGrid {
            dim: ivec2(width, height),
            base: vec![fill; (width * height) as usize],
            depleted: Default::default(),
        }
    }

    pub fn dim(&self) -> IVec2 {
        self.dim
    }

    pub fn width(&self) -> i32 {
        self.dim.x
    }

    pub fn height(&self) -> i32 {
        self.dim.y
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.dim.x && p.y < self.dim.y
    }

    /// Cell is on the outermost ring of the grid.
    pub fn is_edge(&self, p: IVec2) -> bool {
        self.contains(p)
            && (p.x == 0
                || p.y == 0
                || p.x == self.dim.x - 1
                || p.y == self.dim.y - 1)
    }

    fn idx(&self, p: IVec2) -> Option<usize> {
        self.contains(p)
            .then(|| (p.x + p.y * self.dim.x) as usize)
    }

    /// Effective tile at position, `None` when out of bounds.
    pub fn get(&self, p: IVec2) -> Option<Tile> {
        let t = self.base(p)?;
        if self.depleted.contains(&p) {
            t.depleted()
        } else {
            Some(t)
        }
    }

    /// Generated tile at position ignoring depletion.
    pub fn base(&self, p: IVec2) -> Option<Tile> {
        self.idx(p).map(|i| self.base[i])
    }

    /// Write to the base layer, returns false if out of bounds.
    pub fn set(&mut self, p: IVec2, t: Tile) -> bool {
        let Some(i) = self.idx(p) else { return false };
        self.base[i] = t;
        self.depleted.remove(&p);
        true
    }

    /// Mark a harvestable cell as depleted, returning the tile it turns
    /// into. Cells that are not harvestable or already depleted return
    /// `None`.
    pub fn deplete(&mut self, p: IVec2) -> Option<Tile> {
        if self.depleted.contains(&p) {
            return None;
        }
        let ret = self.base(p)?.depleted()?;
        self.depleted.insert(p);
        Some(ret)
    }

    pub fn is_depleted(&self, p: IVec2) -> bool {
        self.depleted.contains(&p)
    }

    /// All cell positions in scanline order.
    pub fn points(&self) -> impl Iterator<Item = IVec2> {
        let dim = self.dim;
        (0..dim.y).flat_map(move |y| (0..dim.x).map(move |x| ivec2(x, y)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec2, Tile)> + '_ {
        self.points().filter_map(|p| Some((p, self.get(p)?)))
    }

    pub fn find(&self, t: Tile) -> Option<IVec2> {
        self.iter().find_map(|(p, u)| (u == t).then_some(p))
    }

    pub fn count(&self, pred: impl Fn(Tile) -> bool) -> usize {
        self.iter().filter(|(_, t)| pred(*t)).count()
    }

    /// Parse a grid from lines of tile glyphs. All lines must be of equal
    /// length.
    pub fn from_ascii(s: &str) -> anyhow::Result<Self> {
        let lines: Vec<&str> = s
            .lines()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        let width = lines.first().map_or(0, |a| a.chars().count());

        let mut base = Vec::with_capacity(width * lines.len());
        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                bail!("Ragged tile grid at line {y}");
            }
            for c in line.chars() {
                base.push(Tile::try_from(c)?);
            }
        }

        Ok(TileGrid {
            dim: ivec2(width as i32, lines.len() as i32),
            base,
            depleted: Default::default(),
        })
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.dim.y {
            for x in 0..self.dim.x {
                let c: char = self.get(ivec2(x, y)).unwrap_or_default().into();
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Clone, Default, Debug, Serialize, Deserialize)]
#[serde(default)]
struct GridRepr {
    map: String,
    depleted: Vec<IVec2>,
}

impl TryFrom<GridRepr> for TileGrid {
    type Error = anyhow::Error;

    fn try_from(value: GridRepr) -> Result<Self, Self::Error> {
        let mut ret = TileGrid::from_ascii(&value.map)?;
        for p in value.depleted {
            if ret.deplete(p).is_none() {
                bail!("Cell {p} can't be depleted");
            }
        }
        Ok(ret)
    }
}

impl From<TileGrid> for GridRepr {
    fn from(grid: TileGrid) -> Self {
        let mut map = String::new();
        for y in 0..grid.dim.y {
            map.extend(
                (0..grid.dim.x)
                    .filter_map(|x| grid.base(ivec2(x, y)))
                    .map(char::from),
            );
            map.push('\n');
        }
        let mut depleted: Vec<IVec2> = grid.depleted.into_iter().collect();
        depleted.sort_by_key(|p| (p.y, p.x));
        GridRepr { map, depleted }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn glyph_mapping() {
        for t in Tile::iter() {
            let c: char = t.into();
            assert_eq!(Tile::try_from(c).unwrap(), t);
        }
        assert!(Tile::try_from('Q').is_err());
    }

    #[test]
    fn passability() {
        for t in [Wall, Tree, Rock, Water, Lava] {
            assert!(t.blocks_movement());
        }
        for t in [Floor, Grass, Door, Stump, Rubble, DungeonEntrance] {
            assert!(t.is_walkable());
        }
        assert!(Tree.blocks_sight());
        assert!(!Water.blocks_sight());
    }

    #[test]
    fn depletion_overlay() {
        let mut grid = TileGrid::from_ascii(
            "
            ,T,
            ,o,",
        )
        .unwrap();

        assert_eq!(grid.deplete(ivec2(1, 0)), Some(Stump));
        // Second harvest of the same cell yields nothing.
        assert_eq!(grid.deplete(ivec2(1, 0)), None);
        assert_eq!(grid.deplete(ivec2(0, 0)), None);
        assert_eq!(grid.get(ivec2(1, 0)), Some(Stump));
        assert_eq!(grid.base(ivec2(1, 0)), Some(Tree));
        assert_eq!(grid.get(ivec2(1, 1)), Some(Rock));
        assert_eq!(grid.get(ivec2(3, 0)), None);
    }

    #[test]
    fn ascii_round_trip_keeps_depletion() {
        let mut grid = TileGrid::new(4, 3, Grass);
        grid.set(ivec2(2, 1), Rock);
        grid.deplete(ivec2(2, 1));

        let repr = GridRepr::from(grid.clone());
        assert_eq!(repr.depleted, vec![ivec2(2, 1)]);
        let back = TileGrid::try_from(repr).unwrap();
        assert_eq!(back, grid);
        assert_eq!(back.to_string(), ",,,,\n,,%,\n,,,,\n");
    }

    #[test]
    fn ragged_grid_is_rejected() {
        assert!(TileGrid::from_ascii("###\n##").is_err());
    }
}

//! Logic for revealing unexplored game terrain.

use derive_more::Deref;
use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};
use util::IndexMap;
use world::MapId;

/// Revealed cells of one map.
#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct ExplorationGrid {
    dim: IVec2,
    cells: Vec<bool>,
}

impl ExplorationGrid {
    pub fn new(dim: IVec2) -> Self {
        let dim = dim.max(IVec2::ZERO);
        ExplorationGrid {
            dim,
            cells: vec![false; (dim.x * dim.y) as usize],
        }
    }

    pub fn dim(&self) -> IVec2 {
        self.dim
    }

    fn idx(&self, p: IVec2) -> Option<usize> {
        (p.x >= 0 && p.y >= 0 && p.x < self.dim.x && p.y < self.dim.y)
            .then(|| (p.x + p.y * self.dim.x) as usize)
    }

    pub fn is_revealed(&self, p: IVec2) -> bool {
        self.idx(p).is_some_and(|i| self.cells[i])
    }

    /// Reveal a cell, returns whether it was hidden before.
    pub fn reveal(&mut self, p: IVec2) -> bool {
        match self.idx(p) {
            Some(i) if !self.cells[i] => {
                self.cells[i] = true;
                true
            }
            _ => false,
        }
    }

    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|&&a| a).count()
    }
}

/// Portions of maps that have been revealed to player.
#[derive(
    Clone, Default, Eq, PartialEq, Debug, Deref, Serialize, Deserialize,
)]
pub struct Exploration(IndexMap<MapId, ExplorationGrid>);

impl Exploration {
    /// Reveal every cell within euclidean `radius` of `center`.
    ///
    /// The map's grid is allocated on first use. Returns false when nothing
    /// new was revealed.
    pub fn reveal_area(
        &mut self,
        map: MapId,
        dim: IVec2,
        center: IVec2,
        radius: i32,
    ) -> bool {
        let grid = self
            .0
            .entry(map)
            .or_insert_with(|| ExplorationGrid::new(dim));

        let r = radius.max(0);
        let mut changed = false;
        for y in -r..=r {
            for x in -r..=r {
                if x * x + y * y <= r * r {
                    changed |= grid.reveal(center + ivec2(x, y));
                }
            }
        }
        changed
    }

    /// Reveal a whole map.
    pub fn reveal_all(&mut self, map: MapId, dim: IVec2) {
        let grid = self
            .0
            .entry(map)
            .or_insert_with(|| ExplorationGrid::new(dim));
        grid.cells.iter_mut().for_each(|a| *a = true);
    }

    pub fn is_revealed(&self, map: MapId, p: IVec2) -> bool {
        self.0.get(&map).is_some_and(|g| g.is_revealed(p))
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    const DIM: IVec2 = IVec2::from_array([40, 30]);

    #[test]
    fn reveal_is_idempotent() {
        let mut e = Exploration::default();
        let id = MapId::zone(0, 0);
        assert!(!e.is_revealed(id, ivec2(5, 5)));
        assert!(e.reveal_area(id, DIM, ivec2(5, 5), 4));
        assert!(!e.reveal_area(id, DIM, ivec2(5, 5), 4));
        assert!(!e.reveal_area(id, DIM, ivec2(5, 5), 2));
        assert!(e.reveal_area(id, DIM, ivec2(6, 5), 4));
    }

    #[test]
    fn reveal_shape() {
        let mut e = Exploration::default();
        let id = MapId::zone(0, 0);
        e.reveal_area(id, DIM, ivec2(10, 10), 4);
        assert!(e.is_revealed(id, ivec2(14, 10)));
        assert!(e.is_revealed(id, ivec2(13, 12)));
        assert!(!e.is_revealed(id, ivec2(14, 14)));
        assert!(!e.is_revealed(id, ivec2(15, 10)));
        // Lattice points within radius 4 of the origin.
        assert_eq!(e[&id].revealed_count(), 49);
    }

    #[test]
    fn reveal_clips_at_edges() {
        let mut e = Exploration::default();
        let id = MapId::zone(1, 0);
        assert!(e.reveal_area(id, DIM, ivec2(0, 0), 4));
        assert!(!e.is_revealed(id, ivec2(-1, 0)));
        assert_eq!(e[&id].dim(), DIM);
    }

    #[test]
    fn reveal_all_covers_everything() {
        let mut e = Exploration::default();
        let id = MapId::zone(2, 0);
        e.reveal_all(id, ivec2(12, 9));
        assert_eq!(e[&id].revealed_count(), 12 * 9);
        assert!(!e.reveal_area(id, ivec2(12, 9), ivec2(3, 3), 10));
    }

    #[quickcheck]
    fn second_reveal_changes_nothing(x: i8, y: i8, r: u8) -> bool {
        let mut e = Exploration::default();
        let id = MapId::zone(0, 0);
        let (c, r) = (ivec2(x as i32, y as i32), (r % 12) as i32);
        e.reveal_area(id, DIM, c, r);
        !e.reveal_area(id, DIM, c, r)
    }
}

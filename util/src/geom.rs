use glam::{ivec2, IVec2};

/// 8 directions, clock face order.
pub const DIR_8: [IVec2; 8] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([1, 1]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 1]),
    IVec2::from_array([-1, 0]),
    IVec2::from_array([-1, -1]),
];

/// 4 directions, clock face order.
pub const DIR_4: [IVec2; 4] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 0]),
];

/// 4-neighborhood operations.
pub mod s4 {
    use glam::IVec2;

    pub const DIR: [IVec2; 4] = super::DIR_4;

    /// Neighbors of a point.
    pub fn ns(p: IVec2) -> impl Iterator<Item = IVec2> {
        DIR.into_iter().map(move |d| p + d)
    }

    /// Taxicab distance.
    pub fn d(a: &IVec2, b: &IVec2) -> i32 {
        let v = *b - *a;
        v.x.abs() + v.y.abs()
    }
}

/// 8-neighborhood operations.
pub mod s8 {
    use glam::IVec2;

    pub const DIR: [IVec2; 8] = super::DIR_8;

    /// Neighbors of a point.
    pub fn ns(p: IVec2) -> impl Iterator<Item = IVec2> {
        DIR.into_iter().map(move |d| p + d)
    }

    /// Chebyshev distance, diagonal steps count as one.
    pub fn d(a: &IVec2, b: &IVec2) -> i32 {
        let v = (*b - *a).abs();
        v.x.max(v.y)
    }
}

pub trait VecExt: Sized + Default {
    /// Absolute size of vector in taxicab metric.
    fn taxi_len(&self) -> i32;

    /// Absolute size of vector in chessboard metric.
    fn chebyshev_len(&self) -> i32;

    /// Vec points to an adjacent cell, left, right, up or down.
    fn is_adjacent(&self) -> bool {
        self.taxi_len() == 1
    }

    /// Preferred cardinal direction vector pointing towards the other point.
    ///
    /// The axis with the larger absolute delta wins, ties go to the
    /// horizontal axis.
    fn dir4_towards(&self, other: &Self) -> Self;

    fn to_dir4(&self) -> Self {
        Self::default().dir4_towards(self)
    }
}

impl VecExt for IVec2 {
    fn taxi_len(&self) -> i32 {
        self[0].abs() + self[1].abs()
    }

    fn chebyshev_len(&self) -> i32 {
        self[0].abs().max(self[1].abs())
    }

    fn dir4_towards(&self, other: &Self) -> Self {
        let (dx, dy) = (other[0] - self[0], other[1] - self[1]);

        if dy.abs() > dx.abs() {
            ivec2(0, dy.signum())
        } else {
            ivec2(dx.signum(), 0)
        }
    }
}

/// Points on the line from `a` towards `b`, including `a` and excluding
/// `b`.
pub fn bresenham_line(
    a: impl Into<IVec2>,
    b: impl Into<IVec2>,
) -> impl Iterator<Item = IVec2> {
    let (a, b): (IVec2, IVec2) = (a.into(), b.into());

    let d = b - a;
    let step = d.signum();
    let d = d.abs() * ivec2(1, -1);
    let mut p = a;
    let mut err = d.x + d.y;

    std::iter::from_fn(move || {
        if p == b {
            None
        } else {
            let ret = p;

            let e2 = 2 * err;
            if e2 >= d.y {
                err += d.y;
                p.x += step.x;
            }
            if e2 <= d.x {
                err += d.x;
                p.y += step.y;
            }
            Some(ret)
        }
    })
}

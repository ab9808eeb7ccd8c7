use crate::{error::BuildError, mesh::HalfedgeMesh};
use glam::DVec3;

impl HalfedgeMesh {
    /// Makes a box with the following topology, spanning from the min point to
    /// the max point.
    ///
    ///  ```text
    ///       7-----------6
    ///      /|          /|
    ///     / |         / |
    ///    4-----------5  |
    ///    |  |        |  |
    ///    |  3--------|--2
    ///    | /         | /
    ///    |/          |/
    ///    0-----------1
    ///  ```
    pub fn quad_box(min: DVec3, max: DVec3) -> Result<Self, BuildError> {
        const BOX_POS: [(bool, bool, bool); 8] = [
            (false, false, false),
            (true, false, false),
            (true, true, false),
            (false, true, false),
            (false, false, true),
            (true, false, true),
            (true, true, true),
            (false, true, true),
        ];
        const BOX_IDX: [[usize; 4]; 6] = [
            [0, 3, 2, 1],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
            [4, 5, 6, 7],
        ];
        let pos: Vec<DVec3> = BOX_POS
            .iter()
            .map(|&(xf, yf, zf)| {
                DVec3::new(
                    if xf { max.x } else { min.x },
                    if yf { max.y } else { min.y },
                    if zf { max.z } else { min.z },
                )
            })
            .collect();
        Self::build(&BOX_IDX, &pos)
    }

    /// Create a mesh representing a box with quadrilateral faces, of size 1,
    /// spanning from the origin to (1, 1, 1).
    pub fn unit_cube() -> Result<Self, BuildError> {
        Self::quad_box(DVec3::ZERO, DVec3::ONE)
    }

    /// Tetrahedron with one vertex at the origin and the other three on the
    /// positive axes.
    pub fn tetrahedron() -> Result<Self, BuildError> {
        Self::build(
            &[[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
            &[DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z],
        )
    }

    /// Regular icosahedron centered at the origin.
    pub fn icosahedron() -> Result<Self, BuildError> {
        let t = (1.0 + 5.0f64.sqrt()) / 2.0;
        let pos = [
            DVec3::new(-1., t, 0.),
            DVec3::new(1., t, 0.),
            DVec3::new(-1., -t, 0.),
            DVec3::new(1., -t, 0.),
            DVec3::new(0., -1., t),
            DVec3::new(0., 1., t),
            DVec3::new(0., -1., -t),
            DVec3::new(0., 1., -t),
            DVec3::new(t, 0., -1.),
            DVec3::new(t, 0., 1.),
            DVec3::new(-t, 0., -1.),
            DVec3::new(-t, 0., 1.),
        ];
        Self::build(
            &[
                [0, 11, 5],
                [0, 5, 1],
                [0, 1, 7],
                [0, 7, 10],
                [0, 10, 11],
                [1, 5, 9],
                [5, 11, 4],
                [11, 10, 2],
                [10, 7, 6],
                [7, 1, 8],
                [3, 9, 4],
                [3, 4, 2],
                [3, 2, 6],
                [3, 6, 8],
                [3, 8, 9],
                [4, 9, 5],
                [2, 4, 11],
                [6, 2, 10],
                [8, 6, 7],
                [9, 8, 1],
            ],
            &pos,
        )
    }

    /// Flat grid of `nx` by `ny` unit quads in the XY plane, with its corner
    /// at the origin. It has a single boundary loop.
    pub fn quad_grid(nx: usize, ny: usize) -> Result<Self, BuildError> {
        let stride = nx + 1;
        let pos: Vec<DVec3> = (0..(ny + 1))
            .flat_map(|y| (0..stride).map(move |x| DVec3::new(x as f64, y as f64, 0.)))
            .collect();
        let quads: Vec<[usize; 4]> = (0..ny)
            .flat_map(|y| {
                (0..nx).map(move |x| {
                    let i = y * stride + x;
                    [i, i + 1, i + 1 + stride, i + stride]
                })
            })
            .collect();
        Self::build(&quads, &pos)
    }
}

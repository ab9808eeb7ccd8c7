use crate::{element::VH, error::Error, mesh::HalfedgeMesh};
use glam::DVec3;
use std::collections::HashMap;

/// Triangulated copy of the mesh, laid out for rendering.
#[derive(Debug, Clone, Default)]
pub struct TriangleSnapshot {
    pub positions: Vec<DVec3>,
    /// Area weighted vertex normals, one per position.
    pub normals: Vec<DVec3>,
    pub indices: Vec<[u32; 3]>,
}

impl HalfedgeMesh {
    /// Index of every vertex in the arrays produced by the export functions.
    fn vertex_indices(&self) -> HashMap<VH, usize> {
        self.vertices().enumerate().map(|(i, v)| (v, i)).collect()
    }

    /**
     * The faces of the mesh as lists of vertex indices, and the positions of
     * the vertices. The output can be fed back into [`Self::build`].
     *
     * Vertices are numbered in the order they are yielded by
     * [`Self::vertices`].
     */
    pub fn polygons(&self) -> (Vec<Vec<usize>>, Vec<DVec3>) {
        let index = self.vertex_indices();
        let polygons = self
            .faces()
            .map(|f| self.fv_iter(f).map(|v| index[&v]).collect())
            .collect();
        let positions = self.vertices().map(|v| self.position(v)).collect();
        (polygons, positions)
    }

    /// Triangulated snapshot of the mesh. Faces with more than three sides are
    /// split on a copy, so this mesh is not modified.
    pub fn triangle_snapshot(&self) -> Result<TriangleSnapshot, Error> {
        if !self.is_triangle_mesh() {
            let mut copy = self.clone();
            copy.triangulate()?;
            return copy.triangle_snapshot();
        }
        let index = self.vertex_indices();
        let mut indices = Vec::with_capacity(self.num_faces());
        for f in self.faces() {
            let mut verts = self.fv_iter(f).map(|v| index[&v] as u32);
            if let (Some(a), Some(b), Some(c)) = (verts.next(), verts.next(), verts.next()) {
                indices.push([a, b, c]);
            }
        }
        Ok(TriangleSnapshot {
            positions: self.vertices().map(|v| self.position(v)).collect(),
            normals: self.vertices().map(|v| self.calc_vertex_normal(v)).collect(),
            indices,
        })
    }
}

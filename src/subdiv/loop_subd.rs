use crate::{
    element::{EH, VH},
    error::Error,
    mesh::HalfedgeMesh,
};
use glam::DVec3;
use std::collections::{HashMap, HashSet};

/// Weight of each neighbor of an interior vertex with the given valence.
fn neighbor_weight(valence: usize) -> f64 {
    match valence {
        3 => 3.0 / 16.0,
        n => 3.0 / (8.0 * n as f64),
    }
}

impl HalfedgeMesh {
    fn loop_vertex_points(&self) -> HashMap<VH, DVec3> {
        self.vertices()
            .map(|v| {
                let pos = self.position(v);
                if let Some((prev, next)) = self.boundary_neighbors(v) {
                    return (v, (self.position(prev) + pos * 6.0 + self.position(next)) / 8.0);
                }
                let (n, sum) = self
                    .vv_iter(v)
                    .fold((0usize, DVec3::ZERO), |(n, sum), w| {
                        (n + 1, sum + self.position(w))
                    });
                let u = neighbor_weight(n);
                (v, pos * (1.0 - n as f64 * u) + sum * u)
            })
            .collect()
    }

    fn loop_edge_points(&self) -> HashMap<EH, DVec3> {
        self.edges()
            .map(|e| {
                if self.is_boundary_edge(e) {
                    return (e, self.calc_edge_midpoint(e));
                }
                let (a, b) = self.edge_vertices(e);
                let (h, oh) = (self.edge_halfedge(e, false), self.edge_halfedge(e, true));
                let (c, d) = (
                    self.to_vertex(self.next_halfedge(h)),
                    self.to_vertex(self.next_halfedge(oh)),
                );
                let pos = (self.position(a) + self.position(b)) * 0.375
                    + (self.position(c) + self.position(d)) * 0.125;
                (e, pos)
            })
            .collect()
    }

    /**
     * Subdivide the mesh according to the [Loop subdivision
     * scheme](https://en.wikipedia.org/wiki/Loop_subdivision_surface). Every
     * triangle is split into four, and the shape is smoothed. Loop subdivision
     * is meant for triangle meshes. If the mesh is not a triangle mesh, it is
     * triangulated first.
     *
     * Unlike [`Self::subdivide`], this edits the mesh in place, so handles to
     * the original vertices remain valid.
     *
     * If one of the new edges cannot be flipped, an error is returned and the
     * mesh is left as it was.
     */
    pub fn subdivide_loop(&mut self) -> Result<(), Error> {
        let mut mesh = self.clone();
        mesh.subdivide_loop_impl()?;
        *self = mesh;
        log::debug!(
            "Loop subdivision produced {} vertices, {} edges and {} faces",
            self.num_vertices(),
            self.num_edges(),
            self.num_faces()
        );
        Ok(())
    }

    fn subdivide_loop_impl(&mut self) -> Result<(), Error> {
        if !self.is_triangle_mesh() {
            self.triangulate()?;
        }
        let vertex_points = self.loop_vertex_points();
        let edge_points = self.loop_edge_points();
        // Split the original edges. Splitting creates new edges that must not
        // be split again.
        let edges: Vec<EH> = self.edges().collect();
        let mut new_verts: HashSet<VH> = HashSet::with_capacity(edges.len());
        let mut cross: Vec<EH> = Vec::with_capacity(edges.len() * 2);
        for e in edges {
            let split = self.split_edge_impl(e);
            self.set_position(split.vertex, edge_points[&e]);
            new_verts.insert(split.vertex);
            cross.extend(split.cross.into_iter().flatten());
        }
        // Flip the new edges that connect an old vertex to a new vertex.
        for e in cross {
            let (a, b) = self.edge_vertices(e);
            if new_verts.contains(&a) != new_verts.contains(&b) {
                self.flip_edge(e)?;
            }
        }
        for (v, pos) in vertex_points {
            self.set_position(v, pos);
        }
        Ok(())
    }
}

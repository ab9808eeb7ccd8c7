mod loop_subd;

use crate::{
    element::{EH, FH, VH},
    error::Error,
    mesh::HalfedgeMesh,
};
use glam::DVec3;
use std::collections::HashMap;

/// Rules used to place the vertices of a subdivided mesh.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SubdivisionScheme {
    /// New vertices are placed on the original surface, at edge midpoints and
    /// face centroids. Original vertices do not move.
    Linear,
    /// [Catmull-Clark](https://en.wikipedia.org/wiki/Catmull%E2%80%93Clark_subdivision_surface)
    /// smoothing.
    #[default]
    CatmullClark,
}

impl HalfedgeMesh {
    /// The two neighbors of a boundary vertex along its boundary loop, as
    /// (previous, next).
    pub(crate) fn boundary_neighbors(&self, v: VH) -> Option<(VH, VH)> {
        self.voh_iter(v)
            .find(|h| self.is_boundary_halfedge(*h))
            .map(|h| (self.from_vertex(self.prev_halfedge(h)), self.to_vertex(h)))
    }

    fn catmull_clark_positions(
        &self,
        face_points: &HashMap<FH, DVec3>,
    ) -> (HashMap<VH, DVec3>, HashMap<EH, DVec3>) {
        let edge_points: HashMap<EH, DVec3> = self
            .edges()
            .map(|e| {
                let pos = if self.is_boundary_edge(e) {
                    self.calc_edge_midpoint(e)
                } else {
                    let (a, b) = self.edge_vertices(e);
                    let (h, oh) = (self.edge_halfedge(e, false), self.edge_halfedge(e, true));
                    (self.position(a)
                        + self.position(b)
                        + face_points[&self.halfedge_face(h)]
                        + face_points[&self.halfedge_face(oh)])
                        * 0.25
                };
                (e, pos)
            })
            .collect();
        let vertex_points: HashMap<VH, DVec3> = self
            .vertices()
            .map(|v| {
                let pos = self.position(v);
                if let Some((prev, next)) = self.boundary_neighbors(v) {
                    // Crease rule.
                    return (v, (self.position(prev) + pos * 6.0 + self.position(next)) / 8.0);
                }
                let (n, qsum, rsum) = self.voh_iter(v).fold(
                    (0usize, DVec3::ZERO, DVec3::ZERO),
                    |(n, qsum, rsum), h| {
                        (
                            n + 1,
                            qsum + face_points[&self.halfedge_face(h)],
                            rsum + self.calc_edge_midpoint(self.halfedge_edge(h)),
                        )
                    },
                );
                let nf = n as f64;
                let (q, r) = (qsum / nf, rsum / nf);
                (v, (q + r * 2.0 + pos * (nf - 3.0)) / nf)
            })
            .collect();
        (vertex_points, edge_points)
    }

    fn linear_positions(&self) -> (HashMap<VH, DVec3>, HashMap<EH, DVec3>) {
        (
            self.vertices().map(|v| (v, self.position(v))).collect(),
            self.edges().map(|e| (e, self.calc_edge_midpoint(e))).collect(),
        )
    }

    /**
     * Subdivide every face into quads, one per corner, by connecting the
     * midpoint of every edge to the centroid of every face. The mesh is
     * rebuilt, so every handle issued before this call is stale afterwards.
     *
     * The new vertices are numbered with the original vertices first, then one
     * per edge, and then one per face.
     */
    pub fn subdivide(&mut self, scheme: SubdivisionScheme) -> Result<(), Error> {
        let face_points: HashMap<FH, DVec3> = self
            .faces()
            .map(|f| (f, self.calc_face_centroid(f)))
            .collect();
        let (vertex_points, edge_points) = match scheme {
            SubdivisionScheme::Linear => self.linear_positions(),
            SubdivisionScheme::CatmullClark => self.catmull_clark_positions(&face_points),
        };
        // Assign indices.
        let mut positions: Vec<DVec3> =
            Vec::with_capacity(self.num_vertices() + self.num_edges() + self.num_faces());
        let mut vindex: HashMap<VH, usize> = HashMap::with_capacity(self.num_vertices());
        for v in self.vertices() {
            vindex.insert(v, positions.len());
            positions.push(vertex_points[&v]);
        }
        let mut eindex: HashMap<EH, usize> = HashMap::with_capacity(self.num_edges());
        for e in self.edges() {
            eindex.insert(e, positions.len());
            positions.push(edge_points[&e]);
        }
        let mut findex: HashMap<FH, usize> = HashMap::with_capacity(self.num_faces());
        for f in self.faces() {
            findex.insert(f, positions.len());
            positions.push(face_points[&f]);
        }
        // One quad per corner of every face.
        let mut quads: Vec<[usize; 4]> = Vec::new();
        for f in self.faces() {
            for h in self.fh_iter(f) {
                let h2 = self.next_halfedge(h);
                quads.push([
                    vindex[&self.from_vertex(h2)],
                    eindex[&self.halfedge_edge(h2)],
                    findex[&f],
                    eindex[&self.halfedge_edge(h)],
                ]);
            }
        }
        self.rebuild(&quads, &positions)?;
        log::debug!(
            "Subdivided mesh has {} vertices, {} edges and {} faces",
            self.num_vertices(),
            self.num_edges(),
            self.num_faces()
        );
        Ok(())
    }
}

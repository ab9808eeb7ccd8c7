use crate::{
    element::{EH, VH},
    error::Error,
    mesh::HalfedgeMesh,
};
use glam::DVec3;
use std::collections::HashMap;

impl HalfedgeMesh {
    fn split_long_edges(&mut self, max_length: f64) -> Result<usize, Error> {
        let mut count = 0usize;
        loop {
            let long: Vec<EH> = self
                .edges()
                .filter(|e| self.calc_edge_length(*e) > max_length)
                .collect();
            if long.is_empty() {
                return Ok(count);
            }
            for e in long {
                self.split_edge(e)?;
                count += 1;
            }
        }
    }

    /// Position of the vertex that replaces the edge, if the edge is worth
    /// collapsing. Boundary vertices do not move.
    fn short_edge_target(&self, e: EH, min_length: f64, max_length: f64) -> Option<DVec3> {
        if self.is_boundary_edge(e)
            || self.calc_edge_length(e) >= min_length
            || !self.can_collapse_edge(e)
        {
            return None;
        }
        let (a, b) = self.edge_vertices(e);
        let pos = match (self.is_boundary_vertex(a), self.is_boundary_vertex(b)) {
            (true, false) => self.position(a),
            (false, true) => self.position(b),
            (false, false) => self.calc_edge_midpoint(e),
            (true, true) => return None,
        };
        // Don't create long edges.
        let short = self
            .vv_iter(a)
            .chain(self.vv_iter(b))
            .filter(|v| *v != a && *v != b)
            .all(|v| self.position(v).distance(pos) <= max_length);
        (short && self.collapse_keeps_orientation(a, b, pos)).then_some(pos)
    }

    /// Whether the faces that survive merging `a` and `b` at `pos` keep
    /// facing the same way.
    fn collapse_keeps_orientation(&self, a: VH, b: VH, pos: DVec3) -> bool {
        self.vf_iter(a).chain(self.vf_iter(b)).all(|f| {
            let verts: Vec<VH> = self.fv_iter(f).collect();
            if verts.contains(&a) && verts.contains(&b) {
                return true; // Degenerates and goes away.
            }
            let pts: Vec<DVec3> = verts
                .iter()
                .map(|v| match *v == a || *v == b {
                    true => pos,
                    false => self.position(*v),
                })
                .collect();
            (pts[1] - pts[0])
                .cross(pts[2] - pts[0])
                .dot(self.calc_face_normal(f))
                > 0.
        })
    }

    fn collapse_short_edges(&mut self, min_length: f64, max_length: f64) -> Result<usize, Error> {
        let edges: Vec<EH> = self.edges().collect();
        let mut count = 0usize;
        for e in edges {
            if !self.contains_edge(e) {
                continue; // Removed by an earlier collapse.
            }
            if let Some(pos) = self.short_edge_target(e, min_length, max_length) {
                self.collapse_edge_to(e, pos)?;
                count += 1;
            }
        }
        Ok(count)
    }

    fn target_valence(&self, v: VH) -> usize {
        match self.is_boundary_vertex(v) {
            true => 4,
            false => 6,
        }
    }

    /// Whether flipping the edge between two triangles brings the valences
    /// of the four vertices closer to their targets without folding the quad.
    fn flip_improves_valence(&self, e: EH) -> bool {
        let h = self.edge_halfedge(e, false);
        let t = self.opposite_halfedge(h);
        let (f0, f1) = (self.halfedge_face(h), self.halfedge_face(t));
        if self.face_valence(f0) != 3 || self.face_valence(f1) != 3 {
            return false;
        }
        let (a, b) = (self.from_vertex(h), self.from_vertex(t));
        let c = self.to_vertex(self.next_halfedge(h));
        let d = self.to_vertex(self.next_halfedge(t));
        let deviation = |v: VH, delta: isize| {
            (self.vertex_valence(v) as isize + delta - self.target_valence(v) as isize).abs()
        };
        let before = deviation(a, 0) + deviation(b, 0) + deviation(c, 0) + deviation(d, 0);
        let after = deviation(a, -1) + deviation(b, -1) + deviation(c, 1) + deviation(d, 1);
        if after >= before {
            return false;
        }
        let normal = self.calc_face_normal(f0) + self.calc_face_normal(f1);
        let [pa, pb, pc, pd] = [a, b, c, d].map(|v| self.position(v));
        (pc - pb).cross(pd - pb).dot(normal) > 0. && (pa - pc).cross(pd - pc).dot(normal) > 0.
    }

    fn equalize_valences(&mut self) -> Result<usize, Error> {
        let edges: Vec<EH> = self.edges().collect();
        let mut count = 0usize;
        for e in edges {
            if self.can_flip_edge(e) && self.flip_improves_valence(e) {
                self.flip_edge(e)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Move every interior vertex towards the centroid of its neighbors,
    /// within its tangent plane.
    fn smooth_tangential(&mut self, weight: f64) {
        let targets: HashMap<VH, DVec3> = self
            .vertices()
            .filter(|v| !self.is_boundary_vertex(*v))
            .map(|v| {
                let pos = self.position(v);
                let (n, sum) = self
                    .vv_iter(v)
                    .fold((0usize, DVec3::ZERO), |(n, sum), w| {
                        (n + 1, sum + self.position(w))
                    });
                let offset = sum / n as f64 - pos;
                let normal = self.calc_vertex_normal(v);
                (v, pos + (offset - normal * normal.dot(offset)) * weight)
            })
            .collect();
        for (v, pos) in targets {
            self.set_position(v, pos);
        }
    }

    /**
     * Isotropic remeshing, targeting the current mean edge length `L`. Each
     * iteration splits edges longer than `4L/3`, collapses edges shorter than
     * `4L/5`, flips edges to bring vertex valences closer to 6 (4 on the
     * boundary), and then applies `smoothing_steps` steps of tangential
     * smoothing with the given weight.
     *
     * The mesh is triangulated first if it is not a triangle mesh. Boundary
     * vertices never move, and boundary edges are only ever split.
     */
    pub fn remesh(
        &mut self,
        iterations: usize,
        smoothing_steps: usize,
        smoothing_weight: f64,
    ) -> Result<(), Error> {
        if !self.is_triangle_mesh() {
            self.triangulate()?;
        }
        let target = self.calc_mean_edge_length();
        let (min_length, max_length) = (target * 4. / 5., target * 4. / 3.);
        for i in 0..iterations {
            let splits = self.split_long_edges(max_length)?;
            let collapses = self.collapse_short_edges(min_length, max_length)?;
            let flips = self.equalize_valences()?;
            for _ in 0..smoothing_steps {
                self.smooth_tangential(smoothing_weight);
            }
            log::trace!(
                "Remesh iteration {i}: {splits} splits, {collapses} collapses, {flips} flips"
            );
        }
        log::debug!(
            "Remeshed to {} vertices, {} edges and {} faces",
            self.num_vertices(),
            self.num_edges(),
            self.num_faces()
        );
        Ok(())
    }
}

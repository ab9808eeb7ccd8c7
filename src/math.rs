use crate::{
    element::{EH, FH, HH, VH},
    mesh::HalfedgeMesh,
};
use glam::DVec3;

impl HalfedgeMesh {
    /// Vector from the root to the tip of the halfedge.
    pub fn calc_halfedge_vector(&self, h: HH) -> DVec3 {
        self.position(self.to_vertex(h)) - self.position(self.from_vertex(h))
    }

    /// Newell's vector of the face. Its direction is the face normal and its
    /// length is twice the area of the face.
    fn calc_newell_vector(&self, f: FH) -> DVec3 {
        self.fh_iter(f).fold(DVec3::ZERO, |total, h| {
            let pc = self.position(self.from_vertex(h));
            let pn = self.position(self.to_vertex(h));
            let (a, b) = (pc - pn, pc + pn);
            total + DVec3::new(a.y * b.z, a.z * b.x, a.x * b.y)
        })
    }

    /// Compute the face normal using Newell's method.
    pub fn calc_face_normal(&self, f: FH) -> DVec3 {
        self.calc_newell_vector(f).normalize_or_zero()
    }

    /// Area of the face. Approximate for non-planar faces.
    pub fn calc_face_area(&self, f: FH) -> f64 {
        self.calc_newell_vector(f).length() * 0.5
    }

    /// Average of the vertex positions of the face.
    pub fn calc_face_centroid(&self, f: FH) -> DVec3 {
        let (count, total) = self
            .fv_iter(f)
            .fold((0usize, DVec3::ZERO), |(count, total), v| {
                (count + 1, total + self.position(v))
            });
        total / count as f64
    }

    /// Normal of the vertex, as the average of the normals of incident faces,
    /// weighted by their area.
    pub fn calc_vertex_normal(&self, v: VH) -> DVec3 {
        self.vf_iter(v)
            .fold(DVec3::ZERO, |total, f| total + self.calc_newell_vector(f))
            .normalize_or_zero()
    }

    pub fn calc_edge_midpoint(&self, e: EH) -> DVec3 {
        let (a, b) = self.edge_vertices(e);
        (self.position(a) + self.position(b)) * 0.5
    }

    pub fn calc_edge_length(&self, e: EH) -> f64 {
        self.calc_halfedge_vector(self.edge_halfedge(e, false))
            .length()
    }

    /// Average length of all edges. Zero for an empty mesh.
    pub fn calc_mean_edge_length(&self) -> f64 {
        match self.num_edges() {
            0 => 0.,
            n => self.edges().map(|e| self.calc_edge_length(e)).sum::<f64>() / n as f64,
        }
    }

    /// Total area of all faces.
    pub fn calc_area(&self) -> f64 {
        self.faces().map(|f| self.calc_face_area(f)).sum()
    }

    /// Signed volume enclosed by the mesh, assuming it is closed.
    pub fn calc_volume(&self) -> f64 {
        self.faces()
            .map(|f| {
                let mut verts = self.fv_iter(f);
                let p0 = match verts.next() {
                    Some(v) => self.position(v),
                    None => return 0.,
                };
                let rest: Vec<DVec3> = verts.map(|v| self.position(v)).collect();
                rest.windows(2)
                    .map(|w| p0.dot(w[0].cross(w[1])) / 6.)
                    .sum::<f64>()
            })
            .sum()
    }

    /// Axis aligned bounding box of the vertices, as (min, max).
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        self.vertices().fold(
            (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
            |(min, max), v| {
                let p = self.position(v);
                (min.min(p), max.max(p))
            },
        )
    }
}

#[cfg(test)]
mod test {
    use crate::{
        macros::{assert_float_eq, assert_vec_eq},
        mesh::HalfedgeMesh,
    };
    use glam::DVec3;

    #[test]
    fn t_box_face_normals() {
        let mesh = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        let normals: Vec<DVec3> = mesh.faces().map(|f| mesh.calc_face_normal(f)).collect();
        for (n, expected) in normals.into_iter().zip([
            DVec3::NEG_Z,
            DVec3::NEG_Y,
            DVec3::X,
            DVec3::Y,
            DVec3::NEG_X,
            DVec3::Z,
        ]) {
            assert_vec_eq!(n, expected);
        }
    }

    #[test]
    fn t_box_measurements() {
        let mesh = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        assert_float_eq!(mesh.calc_area(), 6.0);
        assert_float_eq!(mesh.calc_volume(), 1.0);
        assert_float_eq!(mesh.calc_mean_edge_length(), 1.0);
        let (min, max) = mesh.bounding_box();
        assert_vec_eq!(min, DVec3::ZERO);
        assert_vec_eq!(max, DVec3::ONE);
        let f = mesh.faces().next().expect("Box has no faces");
        assert_vec_eq!(mesh.calc_face_centroid(f), DVec3::new(0.5, 0.5, 0.));
        assert_float_eq!(mesh.calc_face_area(f), 1.0);
    }

    #[test]
    fn t_box_vertex_normals() {
        let mesh = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        for v in mesh.vertices() {
            // Corners of the box point away from the center.
            let p = mesh.position(v);
            let expected = (p - DVec3::splat(0.5)).normalize();
            assert_vec_eq!(mesh.calc_vertex_normal(v), expected, 1e-12);
        }
    }
}

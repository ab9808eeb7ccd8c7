use crate::{
    element::{FH, VH},
    error::Error,
    mesh::HalfedgeMesh,
};

impl HalfedgeMesh {
    /**
     * Fan triangulate the face from its first vertex, adding `n - 3`
     * diagonals. The original face becomes the first triangle of the fan.
     * Returns all the triangles, starting with the original face.
     */
    pub fn split_polygon(&mut self, f: FH) -> Result<Vec<FH>, Error> {
        self.ensure_face(f)?;
        if self.is_boundary_face(f) {
            return Err(Error::BoundaryFace(f));
        }
        let mut faces = vec![f];
        let mut base = self.face_halfedge(f);
        if self.face_valence(f) > 3 {
            log::trace!("Splitting {f}");
        }
        while self.loop_iter(base).nth(3).is_some() {
            let far = self.next_halfedge(self.next_halfedge(base));
            let (u, w) = (self.from_vertex(base), self.from_vertex(far));
            let (dt, g) = self.connect(base, far);
            // The diagonal may now be the first interior halfedge of either end.
            self.adjust_outgoing_halfedge(u);
            self.adjust_outgoing_halfedge(w);
            faces.push(g);
            base = dt;
        }
        Ok(faces)
    }

    /// Split every face with more than three sides into triangles.
    pub fn triangulate(&mut self) -> Result<(), Error> {
        let faces: Vec<FH> = self.faces().collect();
        for f in faces {
            self.split_polygon(f)?;
        }
        Ok(())
    }

    /// Vertex triplets of the fan triangulation of a face, without modifying
    /// the mesh.
    pub fn triangulated_face_vertices(&self, f: FH) -> impl Iterator<Item = [VH; 3]> + '_ {
        let hstart = self.face_halfedge(f);
        let vstart = self.from_vertex(hstart);
        self.loop_iter(self.next_halfedge(hstart))
            .take_while(move |h| self.to_vertex(*h) != vstart)
            .map(move |h| [vstart, self.from_vertex(h), self.to_vertex(h)])
    }
}

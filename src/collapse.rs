use crate::{
    element::{EH, FH, HH, VH},
    error::Error,
    mesh::HalfedgeMesh,
};
use glam::DVec3;
use std::collections::{HashMap, HashSet};

impl HalfedgeMesh {
    /// The vertex opposite to `h` if the face of `h` is a triangle.
    fn triangle_apex(&self, h: HH) -> Option<VH> {
        let f = self.halfedge_face(h);
        match !self.is_boundary_face(f) && self.face_valence(f) == 3 {
            true => Some(self.to_vertex(self.next_halfedge(h))),
            false => None,
        }
    }

    /// Check whether the edge can be collapsed without breaking the manifold.
    pub fn can_collapse_edge(&self, e: EH) -> bool {
        if !self.contains_edge(e) {
            return false;
        }
        let h = self.edge_halfedge(e, false);
        let oh = self.opposite_halfedge(h);
        let (v0, v1) = (self.from_vertex(h), self.from_vertex(oh));
        if self.halfedge_face(h) == self.halfedge_face(oh) {
            return false;
        }
        // Check if the faces are triangles and the vertices opposite the edge
        // on those triangles are actually the same vertex.
        let mut apexes = [None, None];
        for (i, x) in [h, oh].into_iter().enumerate() {
            apexes[i] = self.triangle_apex(x);
            if apexes[i].is_some() {
                let h1 = self.next_halfedge(x);
                let h2 = self.next_halfedge(h1);
                if self.is_boundary_halfedge(self.opposite_halfedge(h1))
                    && self.is_boundary_halfedge(self.opposite_halfedge(h2))
                {
                    return false;
                }
            }
        }
        let [vl, vr] = apexes;
        if vl.is_some() && vl == vr {
            return false;
        }
        // Check if we're collapsing across two different boundaries.
        if self.is_boundary_vertex(v0) && self.is_boundary_vertex(v1) && !self.is_boundary_edge(e)
        {
            return false;
        }
        // Check the 'Link condition' Edelsbrunner [2006]. The intersection of
        // the one rings of both vertices must be the apexes of the adjacent
        // triangles.
        let ring: HashSet<VH> = self.vv_iter(v0).collect();
        if self
            .vv_iter(v1)
            .any(|v| ring.contains(&v) && Some(v) != vl && Some(v) != vr)
        {
            return false;
        }
        // Check for folded faces that might degenerate.
        for x in [h, oh] {
            if self.triangle_apex(x).is_none() {
                continue;
            }
            let fa = self.halfedge_face(self.opposite_halfedge(self.next_halfedge(x)));
            let fb = self.halfedge_face(self.opposite_halfedge(self.prev_halfedge(x)));
            if fa == fb && (self.is_boundary_face(fa) || self.face_valence(fa) != 3) {
                return false;
            }
        }
        true
    }

    /// Remove the two sided loop starting at `h` by merging its two edges.
    /// Returns the two vertices of the loop.
    fn collapse_degenerate_loop(&mut self, h: HH) -> [VH; 2] {
        let h1 = self.next_halfedge(h);
        debug_assert_eq!(self.next_halfedge(h1), h);
        let f = self.halfedge_face(h);
        let (o, o1) = (self.opposite_halfedge(h), self.opposite_halfedge(h1));
        let (v0, v1) = (self.from_vertex(h), self.from_vertex(h1));
        let (e, e1) = (self.halfedge_edge(h), self.halfedge_edge(h1));
        // Rewire halfedge -> halfedge.
        self.halfedge_mut(o).twin = o1;
        let he = self.halfedge_mut(o1);
        he.twin = o;
        he.edge = e;
        // Rewire edge -> halfedge.
        self.set_edge_halfedge(e, o);
        // Rewire vertex -> halfedge.
        if self.vertex_halfedge(v0) == h {
            self.set_vertex_halfedge(v0, o1);
        }
        if self.vertex_halfedge(v1) == h1 {
            self.set_vertex_halfedge(v1, o);
        }
        // Delete stuff.
        self.delete_halfedge(h);
        self.delete_halfedge(h1);
        self.delete_edge(e1);
        self.delete_face(f);
        [v0, v1]
    }

    /**
     * Collapse the edge, merging its two vertices into a new vertex at their
     * midpoint. Adjacent triangles degenerate and are removed. Both vertices
     * of the edge are deleted, and the new vertex is returned.
     */
    pub fn collapse_edge(&mut self, e: EH) -> Result<VH, Error> {
        self.ensure_edge(e)?;
        let pos = self.calc_edge_midpoint(e);
        self.collapse_edge_to(e, pos)
    }

    /// Same as [`Self::collapse_edge`], but the new vertex is placed at `pos`.
    pub fn collapse_edge_to(&mut self, e: EH, pos: DVec3) -> Result<VH, Error> {
        self.ensure_edge(e)?;
        if !self.can_collapse_edge(e) {
            return Err(Error::IllegalCollapse(e));
        }
        log::trace!("Collapsing {e}");
        // Collect neighboring topology.
        let h = self.edge_halfedge(e, false);
        let oh = self.opposite_halfedge(h);
        let (v0, v1) = (self.from_vertex(h), self.from_vertex(oh));
        let (fh, foh) = (self.halfedge_face(h), self.halfedge_face(oh));
        let (hn, hp) = (self.next_halfedge(h), self.prev_halfedge(h));
        let (on, op) = (self.next_halfedge(oh), self.prev_halfedge(oh));
        let outgoing: Vec<HH> = self
            .voh_iter(v0)
            .chain(self.voh_iter(v1))
            .filter(|x| *x != h && *x != oh)
            .collect();
        let vnew = self.new_vertex(pos);
        {
            // Carry over the auxiliary data.
            let (a, b) = (self.vertex(v0).clone(), self.vertex(v1).clone());
            let vert = self.vertex_mut(vnew);
            vert.bind_position = (a.bind_position + b.bind_position) * 0.5;
            vert.offset = (a.offset + b.offset) * 0.5;
            vert.velocity = (a.velocity + b.velocity) * 0.5;
        }
        // Rewire halfedge -> vertex
        for x in outgoing {
            self.halfedge_mut(x).vertex = vnew;
        }
        // Rewire halfedge -> halfedge
        self.set_next_halfedge(hp, hn);
        self.set_next_halfedge(op, on);
        // Rewire face -> halfedge
        if self.face_halfedge(fh) == h {
            self.set_face_halfedge(fh, hn);
        }
        if self.face_halfedge(foh) == oh {
            self.set_face_halfedge(foh, on);
        }
        // Rewire vertex -> halfedge
        self.set_vertex_halfedge(vnew, hn);
        // Delete stuff
        self.delete_halfedge(h);
        self.delete_halfedge(oh);
        self.delete_edge(e);
        self.delete_vertex(v0);
        self.delete_vertex(v1);
        // If the loops that used to contain the deleted halfedges had three
        // sides, they are now degenerate.
        let mut touched = vec![vnew];
        for (f, x) in [(fh, hn), (foh, on)] {
            if self.face_valence(f) == 2 {
                touched.extend(self.collapse_degenerate_loop(x));
            }
        }
        for v in touched {
            self.adjust_outgoing_halfedge(v);
        }
        Ok(vnew)
    }

    /// Check whether the face can be collapsed into a single vertex without
    /// breaking the manifold.
    pub fn can_collapse_face(&self, f: FH) -> bool {
        if !self.contains_face(f) || self.is_boundary_face(f) {
            return false;
        }
        let ring: Vec<HH> = self.fh_iter(f).collect();
        let n = ring.len();
        let verts: Vec<VH> = ring.iter().map(|h| self.from_vertex(*h)).collect();
        let nbs: Vec<FH> = ring
            .iter()
            .map(|h| self.halfedge_face(self.opposite_halfedge(*h)))
            .collect();
        // Each neighbor shares exactly one side, except for boundary loops.
        let mut unique: HashSet<FH> = HashSet::with_capacity(n);
        if nbs
            .iter()
            .any(|nb| !self.is_boundary_face(*nb) && !unique.insert(*nb))
        {
            return false;
        }
        let position: HashMap<VH, usize> = verts.iter().enumerate().map(|(i, v)| (*v, i)).collect();
        // Outside vertices touching the face vertices, and the corners they touch.
        let mut touching: HashMap<VH, Vec<usize>> = HashMap::new();
        for (i, &v) in verts.iter().enumerate() {
            for w in self.vv_iter(v) {
                match position.get(&w) {
                    Some(&j) => {
                        // Chords across the face.
                        if j != (i + 1) % n && i != (j + 1) % n {
                            return false;
                        }
                    }
                    None => touching.entry(w).or_default().push(i),
                }
            }
        }
        for (w, corners) in touching.iter() {
            match corners.as_slice() {
                [_] => {}
                [a, b] => {
                    // Must be the apex of the triangle across one side.
                    let i = if (*a + 1) % n == *b { *a } else { *b };
                    if (i + 1) % n != *a && (i + 1) % n != *b {
                        return false;
                    }
                    if self.triangle_apex(self.opposite_halfedge(ring[i])) != Some(*w) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        // Collapsing must not pinch the boundary.
        let on_boundary: Vec<usize> = (0..n)
            .filter(|i| self.is_boundary_vertex(verts[*i]))
            .collect();
        if on_boundary.len() > 1 {
            let sides: Vec<usize> = (0..n).filter(|i| self.is_boundary_face(nbs[*i])).collect();
            if sides.len() + 1 != on_boundary.len() || sides.len() == n {
                return false;
            }
            // The boundary sides must form one chain covering those vertices.
            let starts = sides
                .iter()
                .filter(|i| !sides.contains(&((*i + n - 1) % n)))
                .count();
            if starts != 1
                || !sides.iter().all(|i| {
                    on_boundary.contains(i) && on_boundary.contains(&((i + 1) % n))
                })
            {
                return false;
            }
        }
        true
    }

    /**
     * Collapse the face into a new vertex at its centroid. The sides of the
     * face are removed, and neighboring triangles degenerate and are removed.
     * The vertices of the face are deleted, and the new vertex is returned.
     */
    pub fn collapse_face(&mut self, f: FH) -> Result<VH, Error> {
        self.ensure_face(f)?;
        if self.is_boundary_face(f) {
            return Err(Error::BoundaryFace(f));
        }
        if !self.can_collapse_face(f) {
            return Err(Error::IllegalFaceCollapse(f));
        }
        log::trace!("Collapsing {f}");
        let pos = self.calc_face_centroid(f);
        let ring: Vec<HH> = self.fh_iter(f).collect();
        let verts: Vec<VH> = ring.iter().map(|h| self.from_vertex(*h)).collect();
        let twins: Vec<HH> = ring.iter().map(|h| self.opposite_halfedge(*h)).collect();
        let nbs: Vec<FH> = twins.iter().map(|h| self.halfedge_face(*h)).collect();
        let removed: HashSet<HH> = ring.iter().chain(twins.iter()).copied().collect();
        // Surviving neighbors of each removed twin in its loop.
        let links: Vec<(HH, HH)> = twins
            .iter()
            .map(|&t| {
                let mut prev = self.prev_halfedge(t);
                while removed.contains(&prev) {
                    prev = self.prev_halfedge(prev);
                }
                let mut next = self.next_halfedge(t);
                while removed.contains(&next) {
                    next = self.next_halfedge(next);
                }
                (prev, next)
            })
            .collect();
        let outgoing: Vec<HH> = verts
            .iter()
            .flat_map(|v| self.voh_iter(*v))
            .filter(|h| !removed.contains(h))
            .collect();
        let vnew = self.new_vertex(pos);
        // Rewire halfedge -> vertex
        for x in outgoing {
            self.halfedge_mut(x).vertex = vnew;
        }
        // Rewire halfedge -> halfedge, and face -> halfedge.
        for (i, &(prev, next)) in links.iter().enumerate() {
            self.set_next_halfedge(prev, next);
            if removed.contains(&self.face_halfedge(nbs[i])) {
                self.set_face_halfedge(nbs[i], next);
            }
        }
        self.set_vertex_halfedge(vnew, links[0].1);
        // Delete stuff
        for (&h, &t) in ring.iter().zip(twins.iter()) {
            self.delete_edge(self.halfedge_edge(h));
            self.delete_halfedge(h);
            self.delete_halfedge(t);
        }
        for v in verts {
            self.delete_vertex(v);
        }
        self.delete_face(f);
        let mut touched = vec![vnew];
        let mut visited: HashSet<FH> = HashSet::with_capacity(nbs.len());
        for nb in nbs {
            if visited.insert(nb) && self.face_valence(nb) == 2 {
                touched.extend(self.collapse_degenerate_loop(self.face_halfedge(nb)));
            }
        }
        for v in touched {
            self.adjust_outgoing_halfedge(v);
        }
        Ok(vnew)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        element::{FH, VH},
        error::Error,
        macros::assert_vec_eq,
        mesh::HalfedgeMesh,
    };
    use glam::DVec3;

    fn nth_vertex(mesh: &HalfedgeMesh, i: usize) -> VH {
        mesh.vertices().nth(i).expect("Vertex not found")
    }

    fn face_shapes(mesh: &HalfedgeMesh) -> (usize, usize) {
        mesh.faces()
            .fold((0usize, 0usize), |(t, q), f| match mesh.face_valence(f) {
                3 => (t + 1, q),
                4 => (t, q + 1),
                _ => (t, q),
            })
    }

    #[test]
    fn t_box_edge_collapse() {
        let mut qbox = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        let h = qbox
            .find_halfedge(nth_vertex(&qbox, 5), nth_vertex(&qbox, 6))
            .expect("Cannot find halfedge");
        let e = qbox.halfedge_edge(h);
        assert!(qbox.can_collapse_edge(e));
        let v = qbox.collapse_edge(e).expect("Cannot collapse edge");
        assert_vec_eq!(qbox.position(v), DVec3::new(1., 0.5, 1.));
        assert_eq!(
            (qbox.num_vertices(), qbox.num_edges(), qbox.num_faces()),
            (7, 11, 6)
        );
        assert_eq!(face_shapes(&qbox), (2, 4));
        assert!(!qbox.contains_edge(e));
        qbox.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_box_double_edge_collapse() {
        // Collapse two opposite edges of a face, to produce a triangular prism.
        let mut qbox = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        let (v4, v5, v6, v7) = (
            nth_vertex(&qbox, 4),
            nth_vertex(&qbox, 5),
            nth_vertex(&qbox, 6),
            nth_vertex(&qbox, 7),
        );
        let h = qbox.find_halfedge(v5, v6).expect("Cannot find halfedge");
        qbox.collapse_edge(qbox.halfedge_edge(h))
            .expect("Cannot collapse edge");
        let h = qbox.find_halfedge(v4, v7).expect("Cannot find halfedge");
        qbox.collapse_edge(qbox.halfedge_edge(h))
            .expect("Cannot collapse edge");
        assert_eq!(
            (qbox.num_vertices(), qbox.num_edges(), qbox.num_faces()),
            (6, 9, 5)
        );
        assert_eq!(face_shapes(&qbox), (2, 3));
        qbox.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_icosahedron_edge_collapse() {
        let mut mesh = HalfedgeMesh::icosahedron().expect("Cannot create icosahedron");
        let e = mesh.edges().next().expect("No edges");
        let (a, b) = mesh.edge_vertices(e);
        let v = mesh.collapse_edge(e).expect("Cannot collapse edge");
        // Both endpoints are replaced by the new vertex.
        assert!(!mesh.contains_vertex(a) && !mesh.contains_vertex(b));
        assert_eq!(
            (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()),
            (11, 27, 18)
        );
        assert_eq!(mesh.vertex_valence(v), 6);
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_tetrahedron_collapse_limit() {
        let mut mesh = HalfedgeMesh::tetrahedron().expect("Cannot create tetrahedron");
        let e = mesh.edges().next().expect("No edges");
        mesh.collapse_edge(e).expect("Cannot collapse edge");
        // Two triangles glued along their sides.
        assert_eq!(
            (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()),
            (3, 3, 2)
        );
        mesh.check_topology().expect("Topological errors found");
        // Nothing more can be collapsed.
        let edges: Vec<_> = mesh.edges().collect();
        for e in edges {
            assert_eq!(mesh.collapse_edge(e), Err(Error::IllegalCollapse(e)));
        }
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_grid_boundary_collapse() {
        let mut mesh = HalfedgeMesh::quad_grid(2, 2).expect("Cannot create a grid");
        // The edge from the middle of the bottom side to the center joins a
        // boundary vertex to an interior vertex.
        let h = mesh
            .find_halfedge(nth_vertex(&mesh, 1), nth_vertex(&mesh, 4))
            .expect("Cannot find halfedge");
        let e = mesh.halfedge_edge(h);
        mesh.collapse_edge(e).expect("Cannot collapse edge");
        assert_eq!(
            (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()),
            (8, 11, 4)
        );
        mesh.check_topology().expect("Topological errors found");
        // Edges joining two boundary vertices through the interior are refused.
        let mut grid = HalfedgeMesh::quad_grid(2, 1).expect("Cannot create a grid");
        let h = grid
            .find_halfedge(nth_vertex(&grid, 1), nth_vertex(&grid, 4))
            .expect("Cannot find halfedge");
        let e = grid.halfedge_edge(h);
        assert!(!grid.can_collapse_edge(e));
    }

    #[test]
    fn t_stale_collapse() {
        let mut mesh = HalfedgeMesh::icosahedron().expect("Cannot create icosahedron");
        let e = mesh.edges().next().expect("No edges");
        mesh.collapse_edge(e).expect("Cannot collapse edge");
        assert_eq!(mesh.collapse_edge(e), Err(Error::StaleEdge(e)));
    }

    #[test]
    fn t_box_face_collapse() {
        // Collapsing the top face produces a pyramid.
        let mut qbox = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        let top: FH = qbox.faces().last().expect("No faces");
        let v = qbox.collapse_face(top).expect("Cannot collapse face");
        assert_vec_eq!(qbox.position(v), DVec3::new(0.5, 0.5, 1.));
        assert_eq!(
            (qbox.num_vertices(), qbox.num_edges(), qbox.num_faces()),
            (5, 8, 5)
        );
        assert_eq!(face_shapes(&qbox), (4, 1));
        assert_eq!(qbox.vertex_valence(v), 4);
        assert!(!qbox.contains_face(top));
        qbox.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_icosahedron_face_collapse() {
        let mut mesh = HalfedgeMesh::icosahedron().expect("Cannot create icosahedron");
        let f = mesh.faces().next().expect("No faces");
        mesh.collapse_face(f).expect("Cannot collapse face");
        // The face and its three neighbors vanish.
        assert_eq!(
            (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()),
            (10, 24, 16)
        );
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_tetrahedron_face_collapse_refused() {
        let mut mesh = HalfedgeMesh::tetrahedron().expect("Cannot create tetrahedron");
        let f = mesh.faces().next().expect("No faces");
        assert_eq!(mesh.collapse_face(f), Err(Error::IllegalFaceCollapse(f)));
        mesh.check_topology().expect("Topological errors found");
        assert_eq!(mesh.num_faces(), 4);
    }

    #[test]
    fn t_grid_face_collapse() {
        // A corner face has two boundary sides in a row.
        let mut mesh = HalfedgeMesh::quad_grid(2, 2).expect("Cannot create a grid");
        let f = mesh.faces().next().expect("No faces");
        mesh.collapse_face(f).expect("Cannot collapse face");
        assert_eq!(
            (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()),
            (6, 8, 3)
        );
        mesh.check_topology().expect("Topological errors found");
        // A face whose corners touch the boundary without a boundary side
        // between them would pinch the boundary.
        let mut mesh = HalfedgeMesh::quad_grid(3, 1).expect("Cannot create a grid");
        let f = mesh.faces().nth(1).expect("No faces");
        assert!(!mesh.can_collapse_face(f));
        assert_eq!(mesh.collapse_face(f), Err(Error::IllegalFaceCollapse(f)));
    }
}

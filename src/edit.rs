use crate::{
    element::{EH, Element, FH, HH, VH},
    error::Error,
    mesh::HalfedgeMesh,
};
use std::collections::HashSet;

/// Topology created by splitting an edge.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeSplit {
    /// The new vertex.
    pub vertex: VH,
    /// Diagonals that cut the adjacent triangles, one per side.
    pub cross: [Option<EH>; 2],
}

impl HalfedgeMesh {
    /// Check whether the edge can be flipped without breaking the manifold.
    pub fn can_flip_edge(&self, e: EH) -> bool {
        if !self.contains_edge(e) || self.is_boundary_edge(e) {
            return false;
        }
        let h = self.edge_halfedge(e, false);
        let t = self.opposite_halfedge(h);
        let (a, b) = (self.from_vertex(h), self.from_vertex(t));
        if self.vertex_valence(a) < 3 || self.vertex_valence(b) < 3 {
            return false;
        }
        let c = self.to_vertex(self.next_halfedge(h));
        let d = self.to_vertex(self.next_halfedge(t));
        if c == d || self.find_halfedge(c, d).is_some() {
            return false;
        }
        // Each face gains the tip of the other side. It must not already be
        // on the face.
        let (f0, f1) = (self.halfedge_face(h), self.halfedge_face(t));
        !self.fv_iter(f0).any(|v| v == d) && !self.fv_iter(f1).any(|v| v == c)
    }

    /**
     * Flip the edge, so that it connects the two vertices that follow its
     * endpoints around the adjacent faces. For two triangles, this swaps the
     * diagonal of the quad they form. The edge handle stays valid.
     */
    pub fn flip_edge(&mut self, e: EH) -> Result<EH, Error> {
        self.ensure_edge(e)?;
        if self.is_boundary_edge(e) {
            return Err(Error::BoundaryEdge(e));
        }
        if !self.can_flip_edge(e) {
            return Err(Error::IllegalFlip(e));
        }
        log::trace!("Flipping {e}");
        let h = self.edge_halfedge(e, false);
        let t = self.opposite_halfedge(h);
        let (a, b) = (self.from_vertex(h), self.from_vertex(t));
        let (f0, f1) = (self.halfedge_face(h), self.halfedge_face(t));
        let (h1, hp) = (self.next_halfedge(h), self.prev_halfedge(h));
        let (t1, tp) = (self.next_halfedge(t), self.prev_halfedge(t));
        let (h2, t2) = (self.next_halfedge(h1), self.next_halfedge(t1));
        let (c, d) = (self.to_vertex(h1), self.to_vertex(t1));
        // Rewire halfedge -> halfedge
        self.set_next_halfedge(h, h2);
        self.set_next_halfedge(hp, t1);
        self.set_next_halfedge(t1, h);
        self.set_next_halfedge(t, t2);
        self.set_next_halfedge(tp, h1);
        self.set_next_halfedge(h1, t);
        // Rewire halfedge -> vertex
        self.halfedge_mut(h).vertex = d;
        self.halfedge_mut(t).vertex = c;
        // Rewire halfedge -> face
        self.set_halfedge_face(t1, f0);
        self.set_halfedge_face(h1, f1);
        // Rewire face -> halfedge
        self.set_face_halfedge(f0, h);
        self.set_face_halfedge(f1, t);
        // Rewire vertex -> halfedge
        if self.vertex_halfedge(a) == h {
            self.set_vertex_halfedge(a, t1);
        }
        if self.vertex_halfedge(b) == t {
            self.set_vertex_halfedge(b, h1);
        }
        for v in [a, b, c, d] {
            self.adjust_outgoing_halfedge(v);
        }
        Ok(e)
    }

    /**
     * Insert a new vertex at the midpoint of the edge. Adjacent triangles are
     * split in two towards their opposite vertex. Larger faces and boundary
     * loops gain the new vertex without being split. Returns the new vertex.
     */
    pub fn split_edge(&mut self, e: EH) -> Result<VH, Error> {
        self.ensure_edge(e)?;
        log::trace!("Splitting {e}");
        Ok(self.split_edge_impl(e).vertex)
    }

    pub(crate) fn split_edge_impl(&mut self, e: EH) -> EdgeSplit {
        let h = self.edge_halfedge(e, false);
        let t = self.opposite_halfedge(h);
        let (a, b) = (self.from_vertex(h), self.from_vertex(t));
        let (f, g) = (self.halfedge_face(h), self.halfedge_face(t));
        let (hn, tn) = (self.next_halfedge(h), self.next_halfedge(t));
        let vm = self.new_vertex(self.calc_edge_midpoint(e));
        {
            let (va, vb) = (self.vertex(a).clone(), self.vertex(b).clone());
            let vert = self.vertex_mut(vm);
            vert.bind_position = (va.bind_position + vb.bind_position) * 0.5;
            vert.offset = (va.offset + vb.offset) * 0.5;
            vert.velocity = (va.velocity + vb.velocity) * 0.5;
        }
        // Create a new edge and rewire topology.
        let hm = self.new_halfedge();
        let tm = self.new_halfedge();
        let enew = self.new_edge();
        self.set_neighbors(hm, hn, t, vm, enew, f);
        self.set_neighbors(tm, tn, h, vm, e, g);
        // Rewire halfedge -> halfedge.
        self.set_next_halfedge(h, hm);
        self.set_next_halfedge(t, tm);
        self.halfedge_mut(h).twin = tm;
        let the = self.halfedge_mut(t);
        the.twin = hm;
        the.edge = enew;
        // Rewire edge -> halfedge.
        self.set_edge_halfedge(e, h);
        self.set_edge_halfedge(enew, hm);
        // Rewire vertex -> halfedge.
        self.set_vertex_halfedge(vm, hm);
        // Cut the triangles towards their opposite vertices.
        let mut cross = [None, None];
        let mut touched = vec![a, b, vm];
        for (i, (fc, hc)) in [(f, hm), (g, tm)].into_iter().enumerate() {
            if self.is_boundary_face(fc) || self.face_valence(fc) != 4 {
                continue;
            }
            let apex = self.next_halfedge(self.next_halfedge(hc));
            touched.push(self.from_vertex(apex));
            let (dt, _) = self.connect(apex, hc);
            cross[i] = Some(self.halfedge_edge(dt));
        }
        for v in touched {
            self.adjust_outgoing_halfedge(v);
        }
        EdgeSplit { vertex: vm, cross }
    }

    /**
     * Merge all faces incident on the vertex into one face, and delete the
     * vertex along with its edges. Returns the merged face.
     */
    pub fn erase_vertex(&mut self, v: VH) -> Result<FH, Error> {
        self.ensure_vertex(v)?;
        if self.is_boundary_vertex(v) {
            return Err(Error::BoundaryVertex(v));
        }
        let outgoing: Vec<HH> = self.voh_iter(v).collect();
        let removed: HashSet<HH> = outgoing
            .iter()
            .flat_map(|h| [*h, self.opposite_halfedge(*h)])
            .collect();
        // Halfedges of the merged loop, face by face.
        let mut chain: Vec<HH> = Vec::new();
        for h in outgoing.iter().rev() {
            let mut x = self.next_halfedge(*h);
            while !removed.contains(&x) {
                chain.push(x);
                x = self.next_halfedge(x);
            }
        }
        let mut seen: HashSet<VH> = HashSet::with_capacity(chain.len());
        if chain.len() < 3 || !chain.iter().all(|h| seen.insert(self.from_vertex(*h))) {
            return Err(Error::IllegalErase(Element::from(v)));
        }
        log::trace!("Erasing {v}");
        let faces: Vec<FH> = outgoing.iter().map(|h| self.halfedge_face(*h)).collect();
        let fkeep = faces[0];
        // Rewire halfedge -> halfedge.
        let links: Vec<(HH, HH)> = outgoing
            .iter()
            .map(|&h| {
                let t = self.opposite_halfedge(h);
                (self.prev_halfedge(t), self.next_halfedge(h))
            })
            .collect();
        for (prev, next) in links {
            self.set_next_halfedge(prev, next);
        }
        // Rewire halfedge -> face, and face -> halfedge.
        for &x in &chain {
            self.set_halfedge_face(x, fkeep);
        }
        self.set_face_halfedge(fkeep, chain[0]);
        // Rewire vertex -> halfedge.
        for &h in &outgoing {
            let w = self.to_vertex(h);
            if removed.contains(&self.vertex_halfedge(w)) {
                let next = self.next_halfedge(h);
                self.set_vertex_halfedge(w, next);
            }
        }
        // Delete stuff.
        for &h in &outgoing {
            let t = self.opposite_halfedge(h);
            self.delete_edge(self.halfedge_edge(h));
            self.delete_halfedge(h);
            self.delete_halfedge(t);
        }
        for &f in &faces[1..] {
            self.delete_face(f);
        }
        self.delete_vertex(v);
        let neighbors: Vec<VH> = chain.iter().map(|h| self.from_vertex(*h)).collect();
        for w in neighbors {
            self.adjust_outgoing_halfedge(w);
        }
        Ok(fkeep)
    }

    /**
     * Merge the two faces on either side of the edge into one face, and delete
     * the edge. The face on the side of the stored halfedge of the edge is
     * kept and returned.
     */
    pub fn erase_edge(&mut self, e: EH) -> Result<FH, Error> {
        self.ensure_edge(e)?;
        if self.is_boundary_edge(e) {
            return Err(Error::BoundaryEdge(e));
        }
        let h = self.edge_halfedge(e, false);
        let t = self.opposite_halfedge(h);
        let (a, b) = (self.from_vertex(h), self.from_vertex(t));
        let (f0, f1) = (self.halfedge_face(h), self.halfedge_face(t));
        if self.vertex_valence(a) < 3 || self.vertex_valence(b) < 3 {
            return Err(Error::IllegalErase(Element::from(e)));
        }
        // The faces must only share the endpoints of the edge.
        let verts: HashSet<VH> = self.fv_iter(f0).collect();
        if self
            .fv_iter(f1)
            .any(|v| v != a && v != b && verts.contains(&v))
        {
            return Err(Error::IllegalErase(Element::from(e)));
        }
        log::trace!("Erasing {e}");
        let (hn, hp) = (self.next_halfedge(h), self.prev_halfedge(h));
        let (tn, tp) = (self.next_halfedge(t), self.prev_halfedge(t));
        let moved: Vec<HH> = self.loop_iter(tn).take_while(|x| *x != t).collect();
        // Rewire halfedge -> halfedge
        self.set_next_halfedge(hp, tn);
        self.set_next_halfedge(tp, hn);
        // Rewire halfedge -> face
        for x in moved {
            self.set_halfedge_face(x, f0);
        }
        // Rewire face -> halfedge
        self.set_face_halfedge(f0, hn);
        // Rewire vertex -> halfedge
        if self.vertex_halfedge(a) == h {
            self.set_vertex_halfedge(a, tn);
        }
        if self.vertex_halfedge(b) == t {
            self.set_vertex_halfedge(b, hn);
        }
        // Delete stuff
        self.delete_halfedge(h);
        self.delete_halfedge(t);
        self.delete_edge(e);
        self.delete_face(f1);
        self.adjust_outgoing_halfedge(a);
        self.adjust_outgoing_halfedge(b);
        Ok(f0)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        element::{Element, VH},
        error::Error,
        macros::assert_vec_eq,
        mesh::HalfedgeMesh,
    };
    use glam::DVec3;

    fn counts(mesh: &HalfedgeMesh) -> (usize, usize, usize) {
        (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces())
    }

    fn nth_vertex(mesh: &HalfedgeMesh, i: usize) -> VH {
        mesh.vertices().nth(i).expect("Vertex not found")
    }

    fn sorted_triangles(mesh: &HalfedgeMesh) -> Vec<[VH; 3]> {
        let mut tris: Vec<[VH; 3]> = mesh
            .faces()
            .map(|f| {
                let mut verts: Vec<VH> = mesh.fv_iter(f).collect();
                verts.sort();
                [verts[0], verts[1], verts[2]]
            })
            .collect();
        tris.sort();
        tris
    }

    #[test]
    fn t_icosahedron_flip() {
        let mut mesh = HalfedgeMesh::icosahedron().expect("Cannot create icosahedron");
        let before = sorted_triangles(&mesh);
        let e = mesh.edges().next().expect("No edges");
        let (a, b) = mesh.edge_vertices(e);
        assert!(mesh.can_flip_edge(e));
        assert_eq!(mesh.flip_edge(e), Ok(e));
        mesh.check_topology().expect("Topological errors found");
        assert_eq!(counts(&mesh), (12, 30, 20));
        assert_eq!(mesh.vertex_valence(a), 4);
        assert_eq!(mesh.vertex_valence(b), 4);
        let (c, d) = mesh.edge_vertices(e);
        assert_eq!(mesh.vertex_valence(c), 6);
        assert_eq!(mesh.vertex_valence(d), 6);
        assert_ne!(sorted_triangles(&mesh), before);
        // Flipping again restores the original triangles.
        mesh.flip_edge(e).expect("Cannot flip edge");
        mesh.check_topology().expect("Topological errors found");
        assert_eq!(sorted_triangles(&mesh), before);
    }

    #[test]
    fn t_box_flip() {
        let mut qbox = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        let e = qbox.edges().next().expect("No edges");
        qbox.flip_edge(e).expect("Cannot flip edge");
        qbox.check_topology().expect("Topological errors found");
        assert_eq!(counts(&qbox), (8, 12, 6));
        assert!(qbox.faces().all(|f| qbox.face_valence(f) == 4));
    }

    #[test]
    fn t_illegal_flip() {
        // Flipping any edge of a tetrahedron would duplicate an edge.
        let mut tet = HalfedgeMesh::tetrahedron().expect("Cannot create tetrahedron");
        let e = tet.edges().next().expect("No edges");
        assert!(!tet.can_flip_edge(e));
        assert_eq!(tet.flip_edge(e), Err(Error::IllegalFlip(e)));
        tet.check_topology().expect("Topological errors found");
        let mut grid = HalfedgeMesh::quad_grid(2, 2).expect("Cannot create a grid");
        let e = grid
            .edges()
            .find(|e| grid.is_boundary_edge(*e))
            .expect("No boundary edges");
        assert_eq!(grid.flip_edge(e), Err(Error::BoundaryEdge(e)));
    }

    #[test]
    fn t_icosahedron_split() {
        let mut mesh = HalfedgeMesh::icosahedron().expect("Cannot create icosahedron");
        let e = mesh.edges().next().expect("No edges");
        let mid = mesh.calc_edge_midpoint(e);
        let v = mesh.split_edge(e).expect("Cannot split edge");
        mesh.check_topology().expect("Topological errors found");
        assert_eq!(counts(&mesh), (13, 33, 22));
        assert_vec_eq!(mesh.position(v), mid);
        assert_eq!(mesh.vertex_valence(v), 4);
        assert!(mesh.is_triangle_mesh());
    }

    #[test]
    fn t_two_triangle_split() {
        let mut mesh = HalfedgeMesh::build(
            &[[0, 1, 2], [0, 2, 3]],
            &[DVec3::ZERO, DVec3::X, DVec3::new(1., 1., 0.), DVec3::Y],
        )
        .expect("Cannot build mesh");
        let h = mesh
            .find_halfedge(nth_vertex(&mesh, 0), nth_vertex(&mesh, 2))
            .expect("Cannot find halfedge");
        let v = mesh
            .split_edge(mesh.halfedge_edge(h))
            .expect("Cannot split edge");
        mesh.check_topology().expect("Topological errors found");
        assert_eq!(counts(&mesh), (5, 8, 4));
        assert_vec_eq!(mesh.position(v), DVec3::new(0.5, 0.5, 0.));
        assert!(!mesh.is_boundary_vertex(v));
        // A boundary edge only splits the triangle on one side.
        let e = mesh
            .edges()
            .find(|e| mesh.is_boundary_edge(*e))
            .expect("No boundary edges");
        let v = mesh.split_edge(e).expect("Cannot split edge");
        mesh.check_topology().expect("Topological errors found");
        assert_eq!(counts(&mesh), (6, 10, 5));
        assert!(mesh.is_boundary_vertex(v));
        assert_eq!(mesh.vertex_valence(v), 3);
    }

    #[test]
    fn t_box_split() {
        // Quads gain a vertex without being cut.
        let mut qbox = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        let e = qbox.edges().next().expect("No edges");
        let v = qbox.split_edge(e).expect("Cannot split edge");
        qbox.check_topology().expect("Topological errors found");
        assert_eq!(counts(&qbox), (9, 13, 6));
        assert_eq!(qbox.vertex_valence(v), 2);
        assert_eq!(
            qbox.faces().filter(|f| qbox.face_valence(*f) == 5).count(),
            2
        );
    }

    #[test]
    fn t_icosahedron_erase_vertex() {
        let mut mesh = HalfedgeMesh::icosahedron().expect("Cannot create icosahedron");
        let v = nth_vertex(&mesh, 0);
        let f = mesh.erase_vertex(v).expect("Cannot erase vertex");
        mesh.check_topology().expect("Topological errors found");
        assert_eq!(counts(&mesh), (11, 25, 16));
        assert_eq!(mesh.face_valence(f), 5);
        assert!(!mesh.contains_vertex(v));
    }

    #[test]
    fn t_grid_erase_vertex() {
        let mut mesh = HalfedgeMesh::quad_grid(2, 2).expect("Cannot create a grid");
        let center = nth_vertex(&mesh, 4);
        let f = mesh.erase_vertex(center).expect("Cannot erase vertex");
        mesh.check_topology().expect("Topological errors found");
        assert_eq!(counts(&mesh), (8, 8, 1));
        assert_eq!(mesh.face_valence(f), 8);
        let corner = nth_vertex(&mesh, 0);
        assert_eq!(mesh.erase_vertex(corner), Err(Error::BoundaryVertex(corner)));
    }

    #[test]
    fn t_tetrahedron_erase_vertex() {
        // The three faces around a corner merge into a triangle glued to the
        // opposite face.
        let mut tet = HalfedgeMesh::tetrahedron().expect("Cannot create tetrahedron");
        let v = nth_vertex(&tet, 0);
        let f = tet.erase_vertex(v).expect("Cannot erase vertex");
        tet.check_topology().expect("Topological errors found");
        assert_eq!(counts(&tet), (3, 3, 2));
        assert_eq!(tet.face_valence(f), 3);
        // The vertices left behind have only two faces, so their faces would
        // merge into one with the same edge on both sides.
        let w = nth_vertex(&tet, 0);
        assert_eq!(
            tet.erase_vertex(w),
            Err(Error::IllegalErase(Element::Vertex(w)))
        );
    }

    #[test]
    fn t_box_erase_edge() {
        let mut qbox = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        let e = qbox.edges().next().expect("No edges");
        let f = qbox.erase_edge(e).expect("Cannot erase edge");
        qbox.check_topology().expect("Topological errors found");
        assert_eq!(counts(&qbox), (8, 11, 5));
        assert_eq!(qbox.face_valence(f), 6);
        assert!(!qbox.contains_edge(e));
        // The endpoints of the erased edge now have valence 2.
        let e = qbox
            .edges()
            .find(|e| {
                let (a, b) = qbox.edge_vertices(*e);
                qbox.vertex_valence(a) == 2 || qbox.vertex_valence(b) == 2
            })
            .expect("No edge found");
        assert_eq!(qbox.erase_edge(e), Err(Error::IllegalErase(Element::Edge(e))));
    }

    #[test]
    fn t_illegal_erase_edge() {
        let mut grid = HalfedgeMesh::quad_grid(2, 2).expect("Cannot create a grid");
        let e = grid
            .edges()
            .find(|e| grid.is_boundary_edge(*e))
            .expect("No boundary edges");
        assert_eq!(grid.erase_edge(e), Err(Error::BoundaryEdge(e)));
        grid.check_topology().expect("Topological errors found");
    }
}

use crate::{
    arena::Arena,
    element::{EH, Edge, Element, FH, Face, HH, Halfedge, HandleParts, VH, Vertex},
    error::Error,
};
use glam::DVec3;

/**
 * A manifold polygon mesh, stored as a halfedge graph.
 *
 * Every edge owns two halfedges that are twins of each other. Each halfedge
 * knows its root vertex, its edge, the next halfedge around its face and the
 * face itself. Holes in the surface are closed by boundary loops. These are
 * faces flagged as boundary, and are not counted by [`Self::num_faces`].
 *
 * For a vertex on the boundary, the stored outgoing halfedge is the first
 * interior halfedge after the boundary, when rotating around the vertex.
 */
#[derive(Clone, Default)]
pub struct HalfedgeMesh {
    pub(crate) vertices: Arena<VH, Vertex>,
    pub(crate) halfedges: Arena<HH, Halfedge>,
    pub(crate) edges: Arena<EH, Edge>,
    pub(crate) faces: Arena<FH, Face>,
}

impl HalfedgeMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every element. Handles issued before this are stale afterwards.
    pub(crate) fn clear(&mut self) {
        self.vertices.clear();
        self.halfedges.clear();
        self.edges.clear();
        self.faces.clear();
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of faces, not including boundary loops.
    pub fn num_faces(&self) -> usize {
        self.faces.len() - self.num_boundaries()
    }

    pub fn num_boundaries(&self) -> usize {
        self.faces.handles().filter(|f| self.faces[*f].boundary).count()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + '_ {
        self.vertices.handles()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + '_ {
        self.halfedges.handles()
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + '_ {
        self.edges.handles()
    }

    /// All faces that are not boundary loops.
    pub fn faces(&self) -> impl Iterator<Item = FH> + '_ {
        self.faces.handles().filter(|f| !self.faces[*f].boundary)
    }

    /// All boundary loops.
    pub fn boundaries(&self) -> impl Iterator<Item = FH> + '_ {
        self.faces.handles().filter(|f| self.faces[*f].boundary)
    }

    pub fn contains_vertex(&self, v: VH) -> bool {
        self.vertices.contains(v)
    }

    pub fn contains_halfedge(&self, h: HH) -> bool {
        self.halfedges.contains(h)
    }

    pub fn contains_edge(&self, e: EH) -> bool {
        self.edges.contains(e)
    }

    pub fn contains_face(&self, f: FH) -> bool {
        self.faces.contains(f)
    }

    pub fn contains(&self, element: Element) -> bool {
        match element {
            Element::Vertex(v) => self.contains_vertex(v),
            Element::Edge(e) => self.contains_edge(e),
            Element::Face(f) => self.contains_face(f),
            Element::Halfedge(h) => self.contains_halfedge(h),
        }
    }

    pub(crate) fn ensure_vertex(&self, v: VH) -> Result<(), Error> {
        match self.contains_vertex(v) {
            true => Ok(()),
            false => Err(Error::StaleVertex(v)),
        }
    }

    pub(crate) fn ensure_edge(&self, e: EH) -> Result<(), Error> {
        match self.contains_edge(e) {
            true => Ok(()),
            false => Err(Error::StaleEdge(e)),
        }
    }

    pub(crate) fn ensure_face(&self, f: FH) -> Result<(), Error> {
        match self.contains_face(f) {
            true => Ok(()),
            false => Err(Error::StaleFace(f)),
        }
    }

    pub fn vertex(&self, v: VH) -> &Vertex {
        &self.vertices[v]
    }

    pub fn vertex_mut(&mut self, v: VH) -> &mut Vertex {
        &mut self.vertices[v]
    }

    pub fn position(&self, v: VH) -> DVec3 {
        self.vertices[v].position
    }

    pub fn set_position(&mut self, v: VH, pos: DVec3) {
        self.vertices[v].position = pos;
    }

    pub(crate) fn halfedge_mut(&mut self, h: HH) -> &mut Halfedge {
        &mut self.halfedges[h]
    }

    pub(crate) fn set_vertex_halfedge(&mut self, v: VH, h: HH) {
        self.vertices[v].halfedge = h;
    }

    pub(crate) fn set_edge_halfedge(&mut self, e: EH, h: HH) {
        self.edges[e].halfedge = h;
    }

    pub(crate) fn set_face_halfedge(&mut self, f: FH, h: HH) {
        self.faces[f].halfedge = h;
    }

    pub(crate) fn set_next_halfedge(&mut self, hprev: HH, hnext: HH) {
        self.halfedges[hprev].next = hnext;
    }

    pub(crate) fn set_halfedge_face(&mut self, h: HH, f: FH) {
        self.halfedges[h].face = f;
    }

    /// Overwrites every link of `h`.
    pub(crate) fn set_neighbors(&mut self, h: HH, next: HH, twin: HH, vertex: VH, edge: EH, face: FH) {
        let he = &mut self.halfedges[h];
        he.next = next;
        he.twin = twin;
        he.vertex = vertex;
        he.edge = edge;
        he.face = face;
    }

    /// Outgoing halfedge of the vertex.
    pub fn vertex_halfedge(&self, v: VH) -> HH {
        self.vertices[v].halfedge
    }

    /// The root vertex of the halfedge.
    pub fn from_vertex(&self, h: HH) -> VH {
        self.halfedges[h].vertex
    }

    /// The vertex the halfedge points to.
    pub fn to_vertex(&self, h: HH) -> VH {
        self.from_vertex(self.opposite_halfedge(h))
    }

    pub fn next_halfedge(&self, h: HH) -> HH {
        self.halfedges[h].next
    }

    /// Halfedges only store the forward link, so this walks around the face.
    pub fn prev_halfedge(&self, h: HH) -> HH {
        let mut prev = h;
        loop {
            let next = self.next_halfedge(prev);
            if next == h {
                return prev;
            }
            prev = next;
        }
    }

    pub fn opposite_halfedge(&self, h: HH) -> HH {
        self.halfedges[h].twin
    }

    pub fn halfedge_edge(&self, h: HH) -> EH {
        self.halfedges[h].edge
    }

    /// The face or boundary loop the halfedge belongs to.
    pub fn halfedge_face(&self, h: HH) -> FH {
        self.halfedges[h].face
    }

    /// One of the two halfedges of the edge. `flag` selects the twin of the
    /// stored halfedge.
    pub fn edge_halfedge(&self, e: EH, flag: bool) -> HH {
        let h = self.edges[e].halfedge;
        match flag {
            true => self.opposite_halfedge(h),
            false => h,
        }
    }

    pub fn edge_vertices(&self, e: EH) -> (VH, VH) {
        let h = self.edge_halfedge(e, false);
        (self.from_vertex(h), self.to_vertex(h))
    }

    pub fn face_halfedge(&self, f: FH) -> HH {
        self.faces[f].halfedge
    }

    /// Rotates to the next outgoing halfedge around the root vertex of `h`.
    pub fn cw_rotated_halfedge(&self, h: HH) -> HH {
        self.next_halfedge(self.opposite_halfedge(h))
    }

    pub fn is_boundary_face(&self, f: FH) -> bool {
        self.faces[f].boundary
    }

    pub fn is_boundary_halfedge(&self, h: HH) -> bool {
        self.is_boundary_face(self.halfedge_face(h))
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        let h = self.edge_halfedge(e, false);
        self.is_boundary_halfedge(h) || self.is_boundary_halfedge(self.opposite_halfedge(h))
    }

    pub fn is_boundary_vertex(&self, v: VH) -> bool {
        self.voh_iter(v).any(|h| self.is_boundary_halfedge(h))
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        self.voh_iter(from).find(|h| self.to_vertex(*h) == to)
    }

    /// Number of edges incident on the vertex.
    pub fn vertex_valence(&self, v: VH) -> usize {
        self.voh_iter(v).count()
    }

    /// Number of non-boundary faces incident on the vertex.
    pub fn vertex_degree(&self, v: VH) -> usize {
        self.voh_iter(v)
            .filter(|h| !self.is_boundary_halfedge(*h))
            .count()
    }

    /// Number of sides of the face.
    pub fn face_valence(&self, f: FH) -> usize {
        self.fh_iter(f).count()
    }

    /// Whether every face, not counting boundary loops, is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.faces().all(|f| self.face_valence(f) == 3)
    }

    pub(crate) fn new_vertex(&mut self, pos: DVec3) -> VH {
        self.vertices.insert(Vertex::new(pos))
    }

    pub(crate) fn new_halfedge(&mut self) -> HH {
        self.halfedges.insert(Halfedge::default())
    }

    pub(crate) fn new_edge(&mut self) -> EH {
        self.edges.insert(Edge {
            halfedge: HH::dangling(),
        })
    }

    pub(crate) fn new_face(&mut self) -> FH {
        self.faces.insert(Face {
            halfedge: HH::dangling(),
            boundary: false,
        })
    }

    pub(crate) fn new_boundary(&mut self) -> FH {
        self.faces.insert(Face {
            halfedge: HH::dangling(),
            boundary: true,
        })
    }

    pub(crate) fn delete_vertex(&mut self, v: VH) {
        self.vertices.remove(v);
    }

    pub(crate) fn delete_halfedge(&mut self, h: HH) {
        self.halfedges.remove(h);
    }

    pub(crate) fn delete_edge(&mut self, e: EH) {
        self.edges.remove(e);
    }

    pub(crate) fn delete_face(&mut self, f: FH) {
        self.faces.remove(f);
    }

    /// Restores the "first interior halfedge" convention for a boundary
    /// vertex. The current outgoing halfedge of `v` must be valid.
    pub(crate) fn adjust_outgoing_halfedge(&mut self, v: VH) {
        let h = self.voh_iter(v).find(|h| self.is_boundary_halfedge(*h));
        if let Some(h) = h {
            let first = self.cw_rotated_halfedge(h);
            self.set_vertex_halfedge(v, first);
        }
    }

    /**
     * Splits the face that contains both `h0` and `h1` by inserting an edge
     * between their root vertices. The loop starting at `h0` stays in the
     * original face, and the loop starting at `h1` moves to a new face.
     * Returns the new halfedge in the new face, which starts at the root of
     * `h0`, and the new face.
     */
    pub(crate) fn connect(&mut self, h0: HH, h1: HH) -> (HH, FH) {
        let f = self.halfedge_face(h0);
        debug_assert_eq!(f, self.halfedge_face(h1));
        let (u, w) = (self.from_vertex(h0), self.from_vertex(h1));
        let (p0, p1) = (self.prev_halfedge(h0), self.prev_halfedge(h1));
        let d = self.new_halfedge();
        let dt = self.new_halfedge();
        let e = self.new_edge();
        let g = self.new_face();
        self.set_neighbors(d, h0, dt, w, e, f);
        self.set_neighbors(dt, h1, d, u, e, g);
        self.set_next_halfedge(p1, d);
        self.set_next_halfedge(p0, dt);
        self.set_edge_halfedge(e, d);
        let moved: Vec<HH> = self.loop_iter(h1).collect();
        for h in moved {
            self.set_halfedge_face(h, g);
        }
        self.set_face_halfedge(f, h0);
        self.set_face_halfedge(g, h1);
        (dt, g)
    }
}

use crate::{
    element::{EH, Element, FH, HH, HandleParts, VH},
    error::Error,
    mesh::HalfedgeMesh,
};
use glam::DVec3;

/// The kind of element that was beveled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BevelKind {
    Vertex,
    Edge,
    Face,
}

/// A vertex created by a bevel, and where it moves as the bevel grows.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BevelCorner {
    pub vertex: VH,
    /// Position of the beveled vertex.
    pub origin: DVec3,
    /// The far end of the edge the corner slides along. For face bevels, this
    /// is the centroid of the face.
    pub toward: DVec3,
}

/**
 * The result of beveling an element. Beveling only changes the connectivity,
 * and all new vertices sit on top of the beveled element until the positions
 * are computed with the matching `*_compute_new_positions` function. The
 * positions are always computed from the state recorded here, so they can be
 * recomputed any number of times with different amounts.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Bevel {
    pub kind: BevelKind,
    /// The new face.
    pub face: FH,
    pub corners: Vec<BevelCorner>,
    /// Centroid of the beveled element.
    pub center: DVec3,
    /// Normal of the beveled element.
    pub normal: DVec3,
}

impl HalfedgeMesh {
    /**
     * Detach the outgoing halfedges `hs` from their root by giving each of
     * them a new vertex at `origin`, and connect consecutive new vertices with
     * new edges. If `closed`, the last halfedge is also connected to the first.
     * Returns the new vertices, and for each connection the new halfedge from
     * the later vertex to the earlier one. These halfedges are left without a
     * face and a next halfedge.
     */
    fn bevel_fan(&mut self, hs: &[HH], closed: bool, origin: DVec3) -> (Vec<VH>, Vec<HH>) {
        let verts: Vec<VH> = hs.iter().map(|_| self.new_vertex(origin)).collect();
        // The links must be read before the roots are changed.
        let prevs: Vec<HH> = hs.iter().map(|h| self.opposite_halfedge(*h)).collect();
        for (&h, &u) in hs.iter().zip(verts.iter()) {
            self.halfedge_mut(h).vertex = u;
            self.set_vertex_halfedge(u, h);
        }
        let m = hs.len();
        let start = if closed { 0 } else { 1 };
        let mut inner = Vec::with_capacity(m);
        for j in start..m {
            let i = (j + m - 1) % m;
            let f = self.halfedge_face(hs[j]);
            let p = self.new_halfedge();
            let q = self.new_halfedge();
            let e = self.new_edge();
            self.set_neighbors(p, hs[j], q, verts[i], e, f);
            self.set_neighbors(q, HH::dangling(), p, verts[j], e, FH::dangling());
            self.set_next_halfedge(prevs[i], p);
            self.set_edge_halfedge(e, p);
            inner.push(q);
        }
        (verts, inner)
    }

    /// Link the halfedges into a loop around a new face.
    fn close_loop(&mut self, hs: &[HH]) -> FH {
        let f = self.new_face();
        for (i, &h) in hs.iter().enumerate() {
            self.set_next_halfedge(h, hs[(i + 1) % hs.len()]);
            self.set_halfedge_face(h, f);
        }
        if let Some(&h) = hs.first() {
            self.set_face_halfedge(f, h);
        }
        f
    }

    /**
     * Replace the vertex with a new face, with one corner on each edge
     * incident on the vertex. The corners start at the position of the
     * vertex. The vertex is deleted.
     */
    pub fn bevel_vertex(&mut self, v: VH) -> Result<Bevel, Error> {
        self.ensure_vertex(v)?;
        if self.is_boundary_vertex(v) || self.vertex_valence(v) < 3 {
            return Err(Error::IllegalBevel(Element::from(v)));
        }
        log::trace!("Beveling {v}");
        let origin = self.position(v);
        let normal = self.calc_vertex_normal(v);
        let hs: Vec<HH> = self.voh_iter(v).collect();
        let towards: Vec<DVec3> = hs
            .iter()
            .map(|h| self.position(self.to_vertex(*h)))
            .collect();
        let (verts, mut inner) = self.bevel_fan(&hs, true, origin);
        // Inner halfedges run against the rotation.
        inner.reverse();
        let face = self.close_loop(&inner);
        self.delete_vertex(v);
        Ok(Bevel {
            kind: BevelKind::Vertex,
            face,
            corners: verts
                .into_iter()
                .zip(towards)
                .map(|(vertex, toward)| BevelCorner {
                    vertex,
                    origin,
                    toward,
                })
                .collect(),
            center: origin,
            normal,
        })
    }

    /**
     * Replace the edge with a new face. Each endpoint of the edge is replaced
     * by a corner on each of its other edges. The corners start at the
     * position of their endpoint. Both endpoints are deleted.
     */
    pub fn bevel_edge(&mut self, e: EH) -> Result<Bevel, Error> {
        self.ensure_edge(e)?;
        let h = self.edge_halfedge(e, false);
        let t = self.opposite_halfedge(h);
        let (a, b) = (self.from_vertex(h), self.from_vertex(t));
        if self.is_boundary_vertex(a) || self.is_boundary_vertex(b) {
            return Err(Error::IllegalBevel(Element::from(e)));
        }
        let xs: Vec<HH> = self.rotation_iter(h).skip(1).collect();
        let ys: Vec<HH> = self.rotation_iter(t).skip(1).collect();
        if xs.is_empty() || ys.is_empty() || xs.len() + ys.len() < 3 {
            return Err(Error::IllegalBevel(Element::from(e)));
        }
        log::trace!("Beveling {e}");
        let (pa, pb) = (self.position(a), self.position(b));
        let center = (pa + pb) * 0.5;
        let normal = (self.calc_face_normal(self.halfedge_face(h))
            + self.calc_face_normal(self.halfedge_face(t)))
        .normalize_or_zero();
        let mut corners: Vec<BevelCorner> = Vec::with_capacity(xs.len() + ys.len());
        for (hs, origin) in [(&xs, pa), (&ys, pb)] {
            for x in hs.iter() {
                corners.push(BevelCorner {
                    vertex: VH::dangling(),
                    origin,
                    toward: self.position(self.to_vertex(*x)),
                });
            }
        }
        let (us, qs) = self.bevel_fan(&xs, false, pa);
        let (ss, zs) = self.bevel_fan(&ys, false, pb);
        for (corner, vertex) in corners.iter_mut().zip(us.iter().chain(ss.iter())) {
            corner.vertex = *vertex;
        }
        // Both fans have one vertex per halfedge, and neither is empty.
        let (ulast, slast) = (us[xs.len() - 1], ss[ys.len() - 1]);
        // The halfedges of the edge now bridge the two fans.
        let (hb, tb) = (self.new_halfedge(), self.new_halfedge());
        let enew = self.new_edge();
        self.halfedge_mut(h).vertex = ulast;
        self.halfedge_mut(h).twin = hb;
        self.halfedge_mut(t).vertex = slast;
        self.halfedge_mut(t).twin = tb;
        self.halfedge_mut(t).edge = enew;
        self.set_neighbors(hb, HH::dangling(), h, ss[0], e, FH::dangling());
        self.set_neighbors(tb, HH::dangling(), t, us[0], enew, FH::dangling());
        self.set_edge_halfedge(e, h);
        self.set_edge_halfedge(enew, t);
        let ring: Vec<HH> = std::iter::once(tb)
            .chain(zs.iter().rev().copied())
            .chain(std::iter::once(hb))
            .chain(qs.iter().rev().copied())
            .collect();
        let face = self.close_loop(&ring);
        self.delete_vertex(a);
        self.delete_vertex(b);
        Ok(Bevel {
            kind: BevelKind::Edge,
            face,
            corners,
            center,
            normal,
        })
    }

    /**
     * Inset the face, surrounding it with a ring of new quads. The face keeps
     * its handle, and gets new vertices that start at the positions of the
     * original vertices.
     */
    pub fn bevel_face(&mut self, f: FH) -> Result<Bevel, Error> {
        self.ensure_face(f)?;
        if self.is_boundary_face(f) {
            return Err(Error::BoundaryFace(f));
        }
        log::trace!("Beveling {f}");
        let center = self.calc_face_centroid(f);
        let normal = self.calc_face_normal(f);
        let ring: Vec<HH> = self.fh_iter(f).collect();
        let n = ring.len();
        let old: Vec<VH> = ring.iter().map(|h| self.from_vertex(*h)).collect();
        let verts: Vec<VH> = old
            .iter()
            .map(|v| self.new_vertex(self.position(*v)))
            .collect();
        // Per side: spoke out of the far corner, the inner side of the quad,
        // the spoke into the near corner, and the side of the inset face.
        let sides: Vec<[HH; 4]> = (0..n)
            .map(|_| {
                [
                    self.new_halfedge(),
                    self.new_halfedge(),
                    self.new_halfedge(),
                    self.new_halfedge(),
                ]
            })
            .collect();
        for i in 0..n {
            let j = (i + 1) % n;
            let [a, b, c, g] = sides[i];
            let quad = self.new_face();
            let (espoke, eside) = (self.new_edge(), self.new_edge());
            let cnext = sides[j][2];
            self.set_neighbors(a, b, cnext, old[j], espoke, quad);
            self.set_neighbors(b, c, g, verts[j], eside, quad);
            self.set_neighbors(c, ring[i], sides[(i + n - 1) % n][0], verts[i], EH::dangling(), quad);
            self.set_neighbors(g, sides[j][3], b, verts[i], eside, f);
            self.set_next_halfedge(ring[i], a);
            self.set_halfedge_face(ring[i], quad);
            self.set_face_halfedge(quad, ring[i]);
            self.set_edge_halfedge(espoke, a);
            self.set_edge_halfedge(eside, g);
            self.set_vertex_halfedge(verts[i], g);
        }
        // The spoke into a corner shares the edge of the spoke out of it.
        for i in 0..n {
            let a = sides[(i + n - 1) % n][0];
            let e = self.halfedge_edge(a);
            self.halfedge_mut(sides[i][2]).edge = e;
        }
        self.set_face_halfedge(f, sides[0][3]);
        for v in old.iter() {
            self.adjust_outgoing_halfedge(*v);
        }
        Ok(Bevel {
            kind: BevelKind::Face,
            face: f,
            corners: verts
                .into_iter()
                .zip(old)
                .map(|(vertex, v)| BevelCorner {
                    vertex,
                    origin: self.position(v),
                    toward: center,
                })
                .collect(),
            center,
            normal,
        })
    }

    fn check_bevel(&self, bevel: &Bevel, kind: BevelKind) -> Result<(), Error> {
        if bevel.kind != kind {
            return Err(Error::BevelKindMismatch);
        }
        match bevel
            .corners
            .iter()
            .find(|c| !self.contains_vertex(c.vertex))
        {
            Some(c) => Err(Error::StaleVertex(c.vertex)),
            None => Ok(()),
        }
    }

    fn slide_corners(&mut self, bevel: &Bevel, tangential_inset: f64) {
        let t = tangential_inset.clamp(0., 1.);
        for c in &bevel.corners {
            self.set_position(c.vertex, c.origin.lerp(c.toward, t));
        }
    }

    /// Slide the corners of a vertex bevel along their edges, by the fraction
    /// `tangential_inset` of the edge length.
    pub fn bevel_vertex_compute_new_positions(
        &mut self,
        bevel: &Bevel,
        tangential_inset: f64,
    ) -> Result<(), Error> {
        self.check_bevel(bevel, BevelKind::Vertex)?;
        self.slide_corners(bevel, tangential_inset);
        Ok(())
    }

    /// Slide the corners of an edge bevel along their edges, by the fraction
    /// `tangential_inset` of the edge length.
    pub fn bevel_edge_compute_new_positions(
        &mut self,
        bevel: &Bevel,
        tangential_inset: f64,
    ) -> Result<(), Error> {
        self.check_bevel(bevel, BevelKind::Edge)?;
        self.slide_corners(bevel, tangential_inset);
        Ok(())
    }

    /// Move the corners of an inset face towards the centroid by the fraction
    /// `tangential_inset`, and along the normal by `normal_shift`.
    pub fn bevel_face_compute_new_positions(
        &mut self,
        bevel: &Bevel,
        tangential_inset: f64,
        normal_shift: f64,
    ) -> Result<(), Error> {
        self.check_bevel(bevel, BevelKind::Face)?;
        for c in &bevel.corners {
            self.set_position(
                c.vertex,
                c.origin.lerp(bevel.center, tangential_inset) + bevel.normal * normal_shift,
            );
        }
        Ok(())
    }
}

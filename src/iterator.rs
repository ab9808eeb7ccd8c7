use crate::{
    element::{EH, FH, HH, VH},
    mesh::HalfedgeMesh,
};

/// Rotates around a vertex, visiting every outgoing halfedge once, including
/// the one on a boundary loop.
struct OutgoingHalfedgeIter<'a> {
    mesh: &'a HalfedgeMesh,
    hstart: HH,
    hcurrent: Option<HH>,
}

impl Iterator for OutgoingHalfedgeIter<'_> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        match self.hcurrent {
            Some(current) => {
                let next = self.mesh.cw_rotated_halfedge(current);
                self.hcurrent = if next == self.hstart {
                    None
                } else {
                    Some(next)
                };
                Some(current)
            }
            None => None,
        }
    }
}

/// Walks the `next` links of a face or boundary loop.
struct LoopHalfedgeIter<'a> {
    mesh: &'a HalfedgeMesh,
    hstart: HH,
    hcurrent: Option<HH>,
}

impl Iterator for LoopHalfedgeIter<'_> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        match self.hcurrent {
            Some(current) => {
                let next = self.mesh.next_halfedge(current);
                self.hcurrent = if next == self.hstart {
                    None
                } else {
                    Some(next)
                };
                Some(current)
            }
            None => None,
        }
    }
}

impl HalfedgeMesh {
    /// Outgoing halfedges, rotating around the root vertex starting at `h`.
    pub fn rotation_iter(&self, h: HH) -> impl Iterator<Item = HH> + '_ {
        OutgoingHalfedgeIter {
            mesh: self,
            hstart: h,
            hcurrent: Some(h),
        }
    }

    /// Halfedges of the loop containing `h`, starting at `h`.
    pub fn loop_iter(&self, h: HH) -> impl Iterator<Item = HH> + '_ {
        LoopHalfedgeIter {
            mesh: self,
            hstart: h,
            hcurrent: Some(h),
        }
    }

    /// Outgoing halfedges of the vertex, starting with its stored halfedge.
    pub fn voh_iter(&self, v: VH) -> impl Iterator<Item = HH> + '_ {
        self.rotation_iter(self.vertex_halfedge(v))
    }

    /// Incoming halfedges of the vertex.
    pub fn vih_iter(&self, v: VH) -> impl Iterator<Item = HH> + '_ {
        self.voh_iter(v).map(|h| self.opposite_halfedge(h))
    }

    /// Neighboring vertices.
    pub fn vv_iter(&self, v: VH) -> impl Iterator<Item = VH> + '_ {
        self.voh_iter(v).map(|h| self.to_vertex(h))
    }

    pub fn ve_iter(&self, v: VH) -> impl Iterator<Item = EH> + '_ {
        self.voh_iter(v).map(|h| self.halfedge_edge(h))
    }

    /// Incident faces, skipping boundary loops.
    pub fn vf_iter(&self, v: VH) -> impl Iterator<Item = FH> + '_ {
        self.voh_iter(v).filter_map(|h| {
            let f = self.halfedge_face(h);
            match self.is_boundary_face(f) {
                true => None,
                false => Some(f),
            }
        })
    }

    pub fn fh_iter(&self, f: FH) -> impl Iterator<Item = HH> + '_ {
        self.loop_iter(self.face_halfedge(f))
    }

    pub fn fv_iter(&self, f: FH) -> impl Iterator<Item = VH> + '_ {
        self.fh_iter(f).map(|h| self.from_vertex(h))
    }

    pub fn fe_iter(&self, f: FH) -> impl Iterator<Item = EH> + '_ {
        self.fh_iter(f).map(|h| self.halfedge_edge(h))
    }

    /// Faces across the edges of `f`, skipping boundary loops.
    pub fn ff_iter(&self, f: FH) -> impl Iterator<Item = FH> + '_ {
        self.fh_iter(f).filter_map(|h| {
            let g = self.halfedge_face(self.opposite_halfedge(h));
            match self.is_boundary_face(g) {
                true => None,
                false => Some(g),
            }
        })
    }
}

use crate::{
    element::{HH, HandleParts, VH},
    error::BuildError,
    mesh::HalfedgeMesh,
};
use glam::DVec3;
use std::collections::HashMap;

impl HalfedgeMesh {
    /**
     * Build a mesh from a polygon soup.
     *
     * Each polygon is a list of indices into `positions`. The polygons must
     * describe a consistently oriented manifold surface, possibly with
     * boundaries, and every position must be used by at least one polygon.
     * The vertex created for `positions[i]` is the `i`-th vertex yielded by
     * [`Self::vertices`].
     */
    pub fn build<P: AsRef<[usize]>>(polygons: &[P], positions: &[DVec3]) -> Result<Self, BuildError> {
        let mut mesh = HalfedgeMesh::new();
        mesh.populate(polygons, positions)?;
        Ok(mesh)
    }

    /**
     * Discard every element of this mesh and build it again from the polygon
     * soup, as in [`Self::build`].
     *
     * This invalidates every handle obtained from this mesh before the call,
     * whether or not the call succeeds. If it fails, the mesh is left empty.
     */
    pub fn rebuild<P: AsRef<[usize]>>(
        &mut self,
        polygons: &[P],
        positions: &[DVec3],
    ) -> Result<(), BuildError> {
        self.clear();
        if let Err(e) = self.populate(polygons, positions) {
            self.clear();
            return Err(e);
        }
        Ok(())
    }

    fn populate<P: AsRef<[usize]>>(
        &mut self,
        polygons: &[P],
        positions: &[DVec3],
    ) -> Result<(), BuildError> {
        let degrees = match validate_polygons(polygons, positions.len()) {
            Ok(degrees) => degrees,
            Err(e) => {
                log::warn!("Rejected polygon soup: {e}");
                return Err(e);
            }
        };
        let verts: Vec<VH> = positions.iter().map(|p| self.new_vertex(*p)).collect();
        // Interior halfedges.
        let mut lookup: HashMap<(usize, usize), HH> =
            HashMap::with_capacity(degrees.iter().sum::<usize>());
        for poly in polygons {
            let poly = poly.as_ref();
            let f = self.new_face();
            let ring: Vec<HH> = poly.iter().map(|_| self.new_halfedge()).collect();
            self.set_face_halfedge(f, ring[0]);
            for (i, &h) in ring.iter().enumerate() {
                let (a, b) = (poly[i], poly[(i + 1) % poly.len()]);
                if lookup.insert((a, b), h).is_some() {
                    return Err(BuildError::DuplicateEdge { from: a, to: b });
                }
                {
                    let he = self.halfedge_mut(h);
                    he.next = ring[(i + 1) % ring.len()];
                    he.vertex = verts[a];
                    he.face = f;
                }
                self.set_vertex_halfedge(verts[a], h);
                if let Some(&t) = lookup.get(&(b, a)) {
                    let e = self.new_edge();
                    self.set_edge_halfedge(e, h);
                    for (x, y) in [(h, t), (t, h)] {
                        let he = self.halfedge_mut(x);
                        he.twin = y;
                        he.edge = e;
                    }
                }
            }
        }
        // Close the holes with boundary loops.
        let twinless: Vec<HH> = self
            .halfedges()
            .filter(|h| self.opposite_halfedge(*h).is_dangling())
            .collect();
        for h in twinless {
            if !self.opposite_halfedge(h).is_dangling() {
                // Already part of a boundary loop.
                continue;
            }
            let chain = self.boundary_chain(h, &verts)?;
            let boundary = self.new_boundary();
            let twins: Vec<HH> = chain.iter().map(|_| self.new_halfedge()).collect();
            for (i, (&hi, &ti)) in chain.iter().zip(twins.iter()).enumerate() {
                let e = self.new_edge();
                self.set_edge_halfedge(e, hi);
                let tip = self.from_vertex(self.next_halfedge(hi));
                self.set_neighbors(ti, twins[(i + 1) % twins.len()], hi, tip, e, boundary);
                let he = self.halfedge_mut(hi);
                he.twin = ti;
                he.edge = e;
            }
            self.set_face_halfedge(boundary, twins[0]);
        }
        // Compare the faces found by traversal with the scan.
        let nhalfedges = self.num_halfedges();
        for (vi, &v) in verts.iter().enumerate() {
            let hstart = self.vertex_halfedge(v);
            let mut h = hstart;
            let mut count = 0usize;
            for _ in 0..nhalfedges {
                if !self.is_boundary_halfedge(h) {
                    count += 1;
                }
                h = self.cw_rotated_halfedge(h);
                if h == hstart {
                    break;
                }
            }
            if count != degrees[vi] {
                log::warn!("Rejected polygon soup: vertex {vi} is non-manifold");
                return Err(BuildError::NonManifoldVertex(vi));
            }
            self.adjust_outgoing_halfedge(v);
        }
        log::debug!(
            "Built mesh with {} vertices, {} edges, {} faces and {} boundary loops",
            self.num_vertices(),
            self.num_edges(),
            self.num_faces(),
            self.num_boundaries()
        );
        Ok(())
    }

    /// Collects the twinless halfedges around the hole bordered by `hstart`,
    /// in the order the boundary loop visits their twins.
    fn boundary_chain(&self, hstart: HH, verts: &[VH]) -> Result<Vec<HH>, BuildError> {
        let limit = self.num_halfedges();
        let mut chain = vec![hstart];
        let mut current = hstart;
        loop {
            // Rotate around the root of `current` until the fan ends.
            let mut prev = self.prev_halfedge(current);
            let mut steps = 0usize;
            while !self.opposite_halfedge(prev).is_dangling() {
                prev = self.prev_halfedge(self.opposite_halfedge(prev));
                steps += 1;
                if steps > limit {
                    return Err(non_manifold(self.from_vertex(current), verts));
                }
            }
            if prev == hstart {
                return Ok(chain);
            }
            if chain.len() > limit || chain.contains(&prev) {
                return Err(non_manifold(self.from_vertex(current), verts));
            }
            chain.push(prev);
            current = prev;
        }
    }
}

fn non_manifold(v: VH, verts: &[VH]) -> BuildError {
    BuildError::NonManifoldVertex(verts.iter().position(|x| *x == v).unwrap_or_default())
}

/// Checks the polygons in isolation and returns the number of polygons
/// incident on each vertex.
fn validate_polygons<P: AsRef<[usize]>>(
    polygons: &[P],
    npositions: usize,
) -> Result<Vec<usize>, BuildError> {
    let mut degrees = vec![0usize; npositions];
    for (pi, poly) in polygons.iter().enumerate() {
        let poly = poly.as_ref();
        if poly.len() < 3 {
            return Err(BuildError::DegeneratePolygon {
                polygon: pi,
                degree: poly.len(),
            });
        }
        for (i, &vi) in poly.iter().enumerate() {
            if vi >= npositions {
                return Err(BuildError::MissingPosition {
                    polygon: pi,
                    vertex: vi,
                    available: npositions,
                });
            }
            if poly[..i].contains(&vi) {
                return Err(BuildError::RepeatedVertex {
                    polygon: pi,
                    vertex: vi,
                });
            }
            degrees[vi] += 1;
        }
    }
    match degrees.iter().position(|d| *d == 0) {
        Some(vi) => Err(BuildError::FloatingVertex(vi)),
        None => Ok(degrees),
    }
}

#[cfg(test)]
mod test {
    use crate::{element::Handle, error::BuildError, mesh::HalfedgeMesh};
    use glam::DVec3;

    fn square_positions(n: usize) -> Vec<DVec3> {
        (0..n).map(|i| DVec3::new(i as f64, (i % 2) as f64, 0.)).collect()
    }

    #[test]
    fn t_triangle() {
        let mesh = HalfedgeMesh::build(&[[0, 1, 2]], &square_positions(3))
            .expect("Cannot build a triangle");
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_edges(), 3);
        assert_eq!(mesh.num_halfedges(), 6);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_boundaries(), 1);
        assert!(mesh.vertices().all(|v| mesh.is_boundary_vertex(v)));
        assert!(mesh.edges().all(|e| mesh.is_boundary_edge(e)));
        let b = mesh.boundaries().next().expect("No boundary loop");
        // The boundary loop runs against the face.
        assert_eq!(
            mesh.fv_iter(b).map(|v| v.index()).collect::<Vec<_>>(),
            [1, 0, 2]
        );
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_two_triangles() {
        let mesh = HalfedgeMesh::build(&[[0, 1, 2], [0, 2, 3]], &square_positions(4))
            .expect("Cannot build two triangles");
        assert_eq!(
            (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()),
            (4, 5, 2)
        );
        assert_eq!(mesh.num_boundaries(), 1);
        assert_eq!(mesh.edges().filter(|e| !mesh.is_boundary_edge(*e)).count(), 1);
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_box_closed() {
        let mesh = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        assert_eq!(
            (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()),
            (8, 12, 6)
        );
        assert_eq!(mesh.num_boundaries(), 0);
        assert!(mesh.vertices().all(|v| mesh.vertex_valence(v) == 3));
        assert!(mesh.faces().all(|f| mesh.face_valence(f) == 4));
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_bind_position() {
        let mesh = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        for v in mesh.vertices() {
            assert_eq!(mesh.vertex(v).position, mesh.vertex(v).bind_position);
        }
    }

    #[test]
    fn t_rebuild_invalidates_handles() {
        let mut mesh = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        let verts: Vec<_> = mesh.vertices().collect();
        let faces: Vec<_> = mesh.faces().collect();
        let (polygons, positions) = mesh.polygons();
        mesh.rebuild(&polygons, &positions)
            .expect("Cannot rebuild the box");
        assert!(verts.iter().all(|v| !mesh.contains_vertex(*v)));
        assert!(faces.iter().all(|f| !mesh.contains_face(*f)));
        // Same slots, new generations.
        assert_eq!(
            mesh.vertices().map(|v| v.index()).collect::<Vec<_>>(),
            verts.iter().map(|v| v.index()).collect::<Vec<_>>()
        );
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_failed_rebuild_leaves_empty_mesh() {
        let mut mesh = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        let err = mesh
            .rebuild(&[[0, 1]], &square_positions(2))
            .expect_err("Degenerate polygon was accepted");
        assert_eq!(
            err,
            BuildError::DegeneratePolygon {
                polygon: 0,
                degree: 2
            }
        );
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
    }

    #[test]
    fn t_repeated_vertex() {
        let err = HalfedgeMesh::build(&[[0, 1, 0]], &square_positions(2))
            .err()
            .expect("Repeated vertex was accepted");
        assert_eq!(
            err,
            BuildError::RepeatedVertex {
                polygon: 0,
                vertex: 0
            }
        );
    }

    #[test]
    fn t_missing_position() {
        let err = HalfedgeMesh::build(&[[0, 1, 5]], &square_positions(3))
            .err()
            .expect("Missing position was accepted");
        assert_eq!(
            err,
            BuildError::MissingPosition {
                polygon: 0,
                vertex: 5,
                available: 3
            }
        );
    }

    #[test]
    fn t_floating_vertex() {
        let err = HalfedgeMesh::build(&[[0, 1, 2]], &square_positions(4))
            .err()
            .expect("Floating vertex was accepted");
        assert_eq!(err, BuildError::FloatingVertex(3));
    }

    #[test]
    fn t_duplicate_oriented_edge() {
        // The second triangle is flipped relative to the first.
        let err = HalfedgeMesh::build(&[[0, 1, 2], [0, 1, 3]], &square_positions(4))
            .err()
            .expect("Inconsistent orientation was accepted");
        assert_eq!(err, BuildError::DuplicateEdge { from: 0, to: 1 });
    }

    #[test]
    fn t_bowtie() {
        // Two triangles touching at vertex 0 only.
        let positions = [
            DVec3::ZERO,
            DVec3::new(1., 0., 0.),
            DVec3::new(1., 1., 0.),
            DVec3::new(-1., 0., 0.),
            DVec3::new(-1., -1., 0.),
        ];
        let err = HalfedgeMesh::build(&[[0, 1, 2], [0, 3, 4]], &positions)
            .err()
            .expect("Bowtie was accepted");
        assert_eq!(err, BuildError::NonManifoldVertex(0));
    }

    #[test]
    fn t_mixed_polygons() {
        // A quad and a triangle sharing an edge.
        let positions = [
            DVec3::new(0., 0., 0.),
            DVec3::new(1., 0., 0.),
            DVec3::new(1., 1., 0.),
            DVec3::new(0., 1., 0.),
            DVec3::new(2., 0.5, 0.),
        ];
        let polys: Vec<Vec<usize>> = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
        let mesh = HalfedgeMesh::build(&polys, &positions).expect("Cannot build the mesh");
        assert_eq!(
            (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()),
            (5, 6, 2)
        );
        let boundary = mesh.boundaries().next().expect("No boundary");
        assert_eq!(mesh.fh_iter(boundary).count(), 5);
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_empty() {
        let polys: [[usize; 3]; 0] = [];
        let mesh = HalfedgeMesh::build(&polys, &[]).expect("Cannot build an empty mesh");
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_faces(), 0);
    }
}

use crate::{
    element::{FH, HH},
    error::Error,
    mesh::HalfedgeMesh,
};
use std::collections::HashSet;

fn check_halfedges(mesh: &HalfedgeMesh) -> Result<(), Error> {
    for h in mesh.halfedges() {
        let he = &mesh.halfedges[h];
        // Links to deleted elements.
        if !mesh.contains_halfedge(he.twin)
            || !mesh.contains_halfedge(he.next)
            || !mesh.contains_vertex(he.vertex)
            || !mesh.contains_edge(he.edge)
            || !mesh.contains_face(he.face)
        {
            return Err(Error::DanglingLink(h));
        }
        let t = he.twin;
        if t == h || mesh.opposite_halfedge(t) != h || mesh.halfedge_edge(t) != he.edge {
            return Err(Error::InvalidTwin(h));
        }
        // Both sides of an edge cannot be boundary, or the same face.
        if mesh.halfedge_face(t) == he.face
            || (mesh.is_boundary_face(he.face) && mesh.is_boundary_halfedge(t))
        {
            return Err(Error::InvalidTwin(h));
        }
        // Degenerate.
        if mesh.from_vertex(t) == he.vertex {
            return Err(Error::InvalidTwin(h));
        }
    }
    Ok(())
}

fn check_loops(mesh: &HalfedgeMesh) -> Result<(), Error> {
    let mut visited: HashSet<HH> = HashSet::with_capacity(mesh.num_halfedges());
    for h in mesh.halfedges() {
        if visited.contains(&h) {
            continue;
        }
        let f = mesh.halfedge_face(h);
        let mut current = h;
        let mut count = 0usize;
        loop {
            if !visited.insert(current) || mesh.halfedge_face(current) != f {
                return Err(Error::InvalidLoop(current));
            }
            count += 1;
            // The tip of each halfedge is the root of the next one.
            let next = mesh.next_halfedge(current);
            if mesh.to_vertex(current) != mesh.from_vertex(next) {
                return Err(Error::InvalidLoop(current));
            }
            current = next;
            if current == h {
                break;
            }
        }
        if count < 3 {
            return Err(Error::DegenerateFace(f));
        }
    }
    Ok(())
}

fn check_faces(mesh: &HalfedgeMesh) -> Result<(), Error> {
    let mut seen: HashSet<FH> = HashSet::with_capacity(mesh.faces.len());
    for h in mesh.halfedges() {
        seen.insert(mesh.halfedge_face(h));
    }
    for f in mesh.faces.handles() {
        let h = mesh.face_halfedge(f);
        if !mesh.contains_halfedge(h) || mesh.halfedge_face(h) != f {
            return Err(Error::InvalidFaceHalfedge(f));
        }
        if !seen.contains(&f) {
            return Err(Error::InvalidFaceHalfedge(f));
        }
    }
    Ok(())
}

fn check_edges(mesh: &HalfedgeMesh) -> Result<(), Error> {
    for e in mesh.edges() {
        let h = mesh.edges[e].halfedge;
        if !mesh.contains_halfedge(h) || mesh.halfedge_edge(h) != e {
            return Err(Error::InvalidEdgeHalfedge(e));
        }
    }
    Ok(())
}

fn check_vertices(mesh: &HalfedgeMesh) -> Result<(), Error> {
    let mut visited: HashSet<HH> = HashSet::with_capacity(mesh.num_halfedges());
    for v in mesh.vertices() {
        let h = mesh.vertex_halfedge(v);
        if !mesh.contains_halfedge(h) || mesh.from_vertex(h) != v {
            return Err(Error::InvalidVertexHalfedge(v));
        }
        // Every outgoing halfedge must be reached by rotation exactly once.
        for x in mesh.voh_iter(v) {
            if mesh.from_vertex(x) != v || !visited.insert(x) {
                return Err(Error::InvalidVertexHalfedge(v));
            }
        }
        let nboundary = mesh
            .voh_iter(v)
            .filter(|x| mesh.is_boundary_halfedge(*x))
            .count();
        match nboundary {
            0 => {}
            1 => {
                // First interior halfedge after the boundary.
                if mesh.is_boundary_halfedge(h)
                    || !mesh.is_boundary_halfedge(
                        mesh.opposite_halfedge(mesh.prev_halfedge(h)),
                    )
                {
                    return Err(Error::BoundaryConvention(v));
                }
            }
            _ => return Err(Error::InvalidVertexHalfedge(v)),
        }
    }
    // Halfedges not reachable from their root vertex.
    match mesh.halfedges().find(|h| !visited.contains(h)) {
        Some(h) => Err(Error::InvalidLoop(h)),
        None => Ok(()),
    }
}

impl HalfedgeMesh {
    /**
     * Check the connectivity of the mesh. This verifies that twins are
     * consistent, that every loop closes, that faces have at least three
     * sides, that every vertex is manifold, and that boundary vertices store
     * their first interior halfedge.
     */
    pub fn check_topology(&self) -> Result<(), Error> {
        check_halfedges(self)?;
        check_loops(self)?;
        check_faces(self)?;
        check_edges(self)?;
        check_vertices(self)
    }
}

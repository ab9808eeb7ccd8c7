use super::queue::{Keyed, Queue};
use crate::{
    element::{EH, FH, VH},
    mesh::HalfedgeMesh,
};
use glam::{DMat3, DMat4, DVec3};
use std::cmp::Ordering;

/// Below this determinant, the quadric has no unique minimizer.
const SINGULAR_THRESHOLD: f64 = 1e-10;

/// Quadric that measures the squared distance from the plane with the given
/// unit normal, passing through the given point.
pub(crate) fn plane_quadric(normal: DVec3, point: DVec3) -> DMat4 {
    let plane = normal.extend(-normal.dot(point));
    DMat4::from_cols(
        plane * plane.x,
        plane * plane.y,
        plane * plane.z,
        plane * plane.w,
    )
}

impl HalfedgeMesh {
    /// Quadric of the plane of the face.
    pub fn calc_face_quadric(&self, f: FH) -> DMat4 {
        plane_quadric(
            self.calc_face_normal(f),
            self.position(self.from_vertex(self.face_halfedge(f))),
        )
    }

    /// Sum of the quadrics of the faces incident on the vertex.
    pub fn calc_vertex_quadric(&self, v: VH) -> DMat4 {
        self.vf_iter(v)
            .fold(DMat4::ZERO, |total, f| total + self.calc_face_quadric(f))
    }
}

/// Candidate collapse of an edge, with the point the edge collapses to and the
/// quadric error of placing the new vertex there.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRecord {
    pub edge: EH,
    pub optimal: DVec3,
    pub cost: f64,
}

impl EdgeRecord {
    /// Create a record for the edge, where `quadric` is the sum of the
    /// quadrics of its two vertices.
    pub fn new(mesh: &HalfedgeMesh, edge: EH, quadric: &DMat4) -> Self {
        let block = DMat3::from_mat4(*quadric);
        let optimal = if block.determinant().abs() > SINGULAR_THRESHOLD {
            block.inverse() * -quadric.w_axis.truncate()
        } else {
            mesh.calc_edge_midpoint(edge)
        };
        let x = optimal.extend(1.0);
        EdgeRecord {
            edge,
            optimal,
            cost: x.dot(*quadric * x),
        }
    }
}

impl Keyed for EdgeRecord {
    type Key = EH;

    fn key(&self) -> EH {
        self.edge
    }
}

impl PartialEq for EdgeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.edge == other.edge && self.cost.total_cmp(&other.cost) == Ordering::Equal
    }
}

impl PartialOrd for EdgeRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(
            self.cost
                .total_cmp(&other.cost)
                .then(self.edge.cmp(&other.edge)),
        )
    }
}

/// Queue of candidate edge collapses, cheapest first.
pub type EdgeQueue = Queue<EdgeRecord>;

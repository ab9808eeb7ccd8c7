mod quadric;
mod queue;

pub use quadric::{EdgeQueue, EdgeRecord};
pub use queue::{Keyed, Queue};

use crate::{
    element::{EH, VH},
    error::Error,
    mesh::HalfedgeMesh,
};
use glam::DMat4;
use std::collections::HashMap;

impl HalfedgeMesh {
    fn edge_record(&self, e: EH, quadrics: &HashMap<VH, DMat4>) -> EdgeRecord {
        let (a, b) = self.edge_vertices(e);
        EdgeRecord::new(self, e, &(quadrics[&a] + quadrics[&b]))
    }

    /// Runs the decimation and returns the number of collapses, along with the
    /// queue as it was when the loop ended.
    fn decimate_impl(&mut self, target_edges: usize) -> Result<(usize, EdgeQueue), Error> {
        if !self.is_triangle_mesh() {
            self.triangulate()?;
        }
        let mut quadrics: HashMap<VH, DMat4> = self
            .vertices()
            .map(|v| (v, self.calc_vertex_quadric(v)))
            .collect();
        let mut queue = EdgeQueue::new(self.num_edges());
        for e in self.edges() {
            queue.insert(self.edge_record(e, &quadrics));
        }
        let mut count = 0usize;
        let mut nbs: Vec<EH> = Vec::new();
        while self.num_edges() > target_edges {
            let record = match queue.pop() {
                Some(record) => record,
                None => {
                    log::warn!(
                        "Decimation ran out of collapsible edges with {} edges left, {} requested",
                        self.num_edges(),
                        target_edges
                    );
                    break;
                }
            };
            if !self.can_collapse_edge(record.edge) {
                continue;
            }
            let (a, b) = self.edge_vertices(record.edge);
            // Every edge deleted by the collapse touches one of the two vertices.
            nbs.clear();
            nbs.extend(self.ve_iter(a));
            nbs.extend(self.ve_iter(b));
            for e in nbs.drain(..) {
                queue.remove(e);
            }
            let quadric = quadrics.remove(&a).unwrap_or(DMat4::ZERO)
                + quadrics.remove(&b).unwrap_or(DMat4::ZERO);
            let v = self.collapse_edge_to(record.edge, record.optimal)?;
            quadrics.insert(v, quadric);
            nbs.extend(self.ve_iter(v));
            for e in nbs.drain(..) {
                queue.insert(self.edge_record(e, &quadrics));
            }
            count += 1;
        }
        log::debug!(
            "Decimation collapsed {count} edges, leaving {} vertices, {} edges and {} faces",
            self.num_vertices(),
            self.num_edges(),
            self.num_faces()
        );
        Ok((count, queue))
    }

    /**
     * Reduce the number of edges to at most `target_edges`, by repeatedly
     * collapsing the edge whose collapse introduces the least quadric error.
     * The mesh is triangulated first if it is not a triangle mesh.
     *
     * Edges that cannot be collapsed without breaking the mesh are skipped. If
     * the mesh runs out of collapsible edges, this stops early with more edges
     * than requested. Returns the number of edges collapsed.
     */
    pub fn decimate(&mut self, target_edges: usize) -> Result<usize, Error> {
        self.decimate_impl(target_edges).map(|(count, _)| count)
    }
}

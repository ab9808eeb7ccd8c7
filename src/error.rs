use crate::element::{EH, Element, FH, HH, VH};
use thiserror::Error;

/// Reasons a polygon soup cannot be turned into a manifold halfedge mesh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A polygon with fewer than three vertices.
    #[error("Polygon {polygon} has only {degree} vertices")]
    DegeneratePolygon { polygon: usize, degree: usize },
    /// A polygon visits the same vertex twice.
    #[error("Polygon {polygon} repeats vertex {vertex}")]
    RepeatedVertex { polygon: usize, vertex: usize },
    /// A polygon references a vertex for which there is no position.
    #[error("Polygon {polygon} references vertex {vertex}, but only {available} positions were given")]
    MissingPosition {
        polygon: usize,
        vertex: usize,
        available: usize,
    },
    /// The same oriented edge appears in two polygons. The surface is either
    /// non-manifold along this edge, or inconsistently oriented.
    #[error("The oriented edge ({from}, {to}) appears in more than one polygon")]
    DuplicateEdge { from: usize, to: usize },
    /// A position that is not referenced by any polygon.
    #[error("Vertex {0} is not referenced by any polygon")]
    FloatingVertex(usize),
    /// The faces around a vertex do not form a single fan, like a bowtie.
    #[error("Vertex {0} is non-manifold")]
    NonManifoldVertex(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] BuildError),
    // Handles.
    #[error("{0} does not refer to a live vertex")]
    StaleVertex(VH),
    #[error("{0} does not refer to a live edge")]
    StaleEdge(EH),
    #[error("{0} does not refer to a live face")]
    StaleFace(FH),
    #[error("{0} does not refer to a live halfedge")]
    StaleHalfedge(HH),
    // Preconditions.
    #[error("{0} lies on the boundary")]
    BoundaryEdge(EH),
    #[error("{0} is a boundary loop")]
    BoundaryFace(FH),
    #[error("{0} lies on the boundary")]
    BoundaryVertex(VH),
    #[error("Flipping {0} would break the mesh")]
    IllegalFlip(EH),
    #[error("Collapsing {0} would break the mesh")]
    IllegalCollapse(EH),
    #[error("Collapsing {0} would break the mesh")]
    IllegalFaceCollapse(FH),
    #[error("Erasing {0:?} would break the mesh")]
    IllegalErase(Element),
    #[error("Cannot bevel {0:?}")]
    IllegalBevel(Element),
    #[error("The bevel record does not match the requested kind of bevel")]
    BevelKindMismatch,
    // Topology.
    #[error("{0} and its twin do not point to each other")]
    InvalidTwin(HH),
    #[error("The loop starting at {0} is broken")]
    InvalidLoop(HH),
    #[error("{0} has fewer than three sides")]
    DegenerateFace(FH),
    #[error("The halfedge of {0} does not start at it")]
    InvalidVertexHalfedge(VH),
    #[error("The halfedge of {0} does not belong to it")]
    InvalidEdgeHalfedge(EH),
    #[error("The halfedge of {0} does not belong to it")]
    InvalidFaceHalfedge(FH),
    #[error("The halfedge of boundary vertex {0} is not the first interior halfedge")]
    BoundaryConvention(VH),
    #[error("{0} links to a deleted element")]
    DanglingLink(HH),
    // Parameters.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    // Obj.
    #[error("Failed to load OBJ file: {0}")]
    ObjLoadFailed(String),
    #[error("Expected three coordinates per vertex, found {0} numbers")]
    IncorrectNumberOfCoordinates(usize),
}

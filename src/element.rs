use glam::DVec3;
use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/**
 * All elements of the mesh implement this trait. They are identified by the
 * index of their slot in storage, and the generation of that slot at the time
 * the element was created. A handle whose generation no longer matches its slot
 * is stale and refers to nothing.
 */
pub trait Handle: Copy + Eq + Ord + Hash + Debug {
    /**
     * The index of the element's storage slot.
     */
    fn index(&self) -> u32;

    /**
     * The generation of the storage slot when this element was created.
     */
    fn generation(&self) -> u32;
}

/// Construction of handles is reserved for the mesh storage.
pub(crate) trait HandleParts: Handle {
    fn from_parts(index: u32, generation: u32) -> Self;

    /// A handle that can never match an occupied slot. Used for links that are
    /// about to be wired up.
    fn dangling() -> Self {
        Self::from_parts(u32::MAX, 0)
    }

    fn is_dangling(&self) -> bool {
        self.generation() == 0
    }
}

macro_rules! impl_handle {
    ($name:ident, $label:literal) => {
        impl Handle for $name {
            fn index(&self) -> u32 {
                self.idx
            }

            fn generation(&self) -> u32 {
                self.generation
            }
        }

        impl HandleParts for $name {
            fn from_parts(idx: u32, generation: u32) -> Self {
                $name { idx, generation }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", $label, self.idx)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({}:{})", $label, self.idx, self.generation)
            }
        }
    };
}

/**
 * Vertex handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VH {
    idx: u32,
    generation: u32,
}

/**
 * Halfedge handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HH {
    idx: u32,
    generation: u32,
}

/**
 * Edge handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EH {
    idx: u32,
    generation: u32,
}

/**
 * Face handle. Boundary loops are faces too, flagged as boundary.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FH {
    idx: u32,
    generation: u32,
}

impl_handle!(VH, "VH");
impl_handle!(HH, "HH");
impl_handle!(EH, "EH");
impl_handle!(FH, "FH");

/**
 * Any one element of the mesh, such as the current selection in an editor.
 */
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    Vertex(VH),
    Edge(EH),
    Face(FH),
    Halfedge(HH),
}

impl Element {
    pub fn vertex(&self) -> Option<VH> {
        match self {
            Element::Vertex(v) => Some(*v),
            _ => None,
        }
    }

    pub fn edge(&self) -> Option<EH> {
        match self {
            Element::Edge(e) => Some(*e),
            _ => None,
        }
    }

    pub fn face(&self) -> Option<FH> {
        match self {
            Element::Face(f) => Some(*f),
            _ => None,
        }
    }

    pub fn halfedge(&self) -> Option<HH> {
        match self {
            Element::Halfedge(h) => Some(*h),
            _ => None,
        }
    }
}

impl From<VH> for Element {
    fn from(v: VH) -> Self {
        Element::Vertex(v)
    }
}

impl From<EH> for Element {
    fn from(e: EH) -> Self {
        Element::Edge(e)
    }
}

impl From<FH> for Element {
    fn from(f: FH) -> Self {
        Element::Face(f)
    }
}

impl From<HH> for Element {
    fn from(h: HH) -> Self {
        Element::Halfedge(h)
    }
}

/// A vertex of the mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) halfedge: HH,
    /// Current position.
    pub position: DVec3,
    /// Reference pose used for skinning. Copied from the position when the
    /// vertex is created.
    pub bind_position: DVec3,
    /// Displacement along the normal, used by surface wave animation.
    pub offset: f64,
    pub velocity: f64,
}

impl Vertex {
    pub(crate) fn new(position: DVec3) -> Self {
        Vertex {
            halfedge: HH::dangling(),
            position,
            bind_position: position,
            offset: 0.,
            velocity: 0.,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Halfedge {
    pub twin: HH,
    pub next: HH,
    /// Root vertex.
    pub vertex: VH,
    pub edge: EH,
    pub face: FH,
}

impl Default for Halfedge {
    fn default() -> Self {
        Halfedge {
            twin: HH::dangling(),
            next: HH::dangling(),
            vertex: VH::dangling(),
            edge: EH::dangling(),
            face: FH::dangling(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub halfedge: HH,
}

#[derive(Debug, Clone)]
pub(crate) struct Face {
    pub halfedge: HH,
    pub boundary: bool,
}

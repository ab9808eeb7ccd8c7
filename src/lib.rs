/*!
This is a halfedge based polygon mesh library for interactive modeling. It
provides a manifold mesh with local editing operators, and global algorithms
for subdivision, decimation and remeshing.

# Overview

+ A halfedge datastructure is used to represent the topology of a mesh, i.e. the
  connectivity of vertices, edges and faces. Holes in the surface are closed by
  boundary loops, which behave like faces that are flagged as boundary.

+ Elements are referred to by generational handles: [`VH`], [`HH`], [`EH`] and
  [`FH`]. When an element is deleted, its handle becomes stale and never refers
  to another element, even if the storage slot is reused. Use
  [`HalfedgeMesh::contains`] to check whether a handle is still alive.

+ A mesh is built from a polygon soup with [`HalfedgeMesh::build`], loaded from
  an OBJ file with [`HalfedgeMesh::load_obj`], or created from one of the
  builtin primitives such as [`HalfedgeMesh::unit_cube`].

+ Local operators edit the mesh in place and return a [`Result`]. If an operator
  refuses to run, the mesh is left untouched. These include:

  + [`HalfedgeMesh::flip_edge`], [`HalfedgeMesh::split_edge`],
    [`HalfedgeMesh::collapse_edge`] and [`HalfedgeMesh::collapse_face`].

  + [`HalfedgeMesh::erase_vertex`] and [`HalfedgeMesh::erase_edge`], which merge
    faces.

  + Bevels of vertices, edges and faces, which insert a new face and return a
    [`Bevel`] record that can be used to interactively position the new
    vertices.

  + [`HalfedgeMesh::split_polygon`] and [`HalfedgeMesh::triangulate`].

+ Global algorithms change the resolution of the whole mesh. These are
  [`HalfedgeMesh::subdivide`] (linear or Catmull-Clark),
  [`HalfedgeMesh::subdivide_loop`], [`HalfedgeMesh::decimate`] and
  [`HalfedgeMesh::remesh`]. [`MeshResampler`] bundles their parameters. The
  `subdiv` and `decimate` features are required by the subdivision and
  decimation algorithms respectively.

+ The mesh can be exported as a triangulated [`TriangleSnapshot`] for
  rendering, or as a polygon soup with [`HalfedgeMesh::polygons`].
*/

mod arena;
mod bevel;
mod build;
mod check;
mod collapse;
mod edit;
mod element;
mod error;
mod export;
mod iterator;
mod macros;
mod math;
mod mesh;
mod obj;
mod primitive;
mod remesh;
mod resample;
mod triangulate;

#[cfg(feature = "decimate")]
mod decimate;
#[cfg(feature = "subdiv")]
mod subdiv;

pub use glam;

pub use bevel::{Bevel, BevelCorner, BevelKind};
#[cfg(feature = "decimate")]
pub use decimate::{EdgeQueue, EdgeRecord, Keyed, Queue};
pub use element::{EH, Element, FH, HH, Handle, VH, Vertex};
pub use error::{BuildError, Error};
pub use export::TriangleSnapshot;
pub use mesh::HalfedgeMesh;
pub use resample::MeshResampler;
#[cfg(feature = "subdiv")]
pub use subdiv::SubdivisionScheme;

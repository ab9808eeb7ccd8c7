use crate::{error::Error, mesh::HalfedgeMesh};
use glam::DVec3;
use std::path::Path;

impl HalfedgeMesh {
    /**
     * Load a mesh from a Wavefront OBJ file. Only vertex positions and polygon
     * faces are read. All the models in the file are combined into a single
     * mesh, so together they must form a manifold surface.
     */
    pub fn load_obj(path: &Path) -> Result<Self, Error> {
        let options = tobj::LoadOptions {
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };
        let (models, _) =
            tobj::load_obj(path, &options).map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        let mut positions: Vec<DVec3> = Vec::new();
        let mut polygons: Vec<Vec<usize>> = Vec::new();
        for model in models {
            let mesh = model.mesh;
            if mesh.positions.len() % 3 != 0 {
                return Err(Error::IncorrectNumberOfCoordinates(mesh.positions.len()));
            }
            let voffset = positions.len();
            positions.extend(
                mesh.positions
                    .chunks_exact(3)
                    .map(|p| DVec3::new(p[0], p[1], p[2])),
            );
            let to_polygon = |indices: &[u32]| -> Vec<usize> {
                indices.iter().map(|i| *i as usize + voffset).collect()
            };
            if mesh.face_arities.is_empty() {
                // Every face is a triangle.
                polygons.extend(mesh.indices.chunks_exact(3).map(to_polygon));
            } else {
                let mut start = 0usize;
                for size in mesh.face_arities {
                    let size = size as usize;
                    let indices = mesh
                        .indices
                        .get(start..(start + size))
                        .ok_or_else(|| Error::ObjLoadFailed("Face indices out of range".into()))?;
                    start += size;
                    polygons.push(to_polygon(indices));
                }
            }
        }
        log::debug!(
            "Loaded {} vertices and {} faces from {}",
            positions.len(),
            polygons.len(),
            path.display()
        );
        Ok(Self::build(&polygons, &positions)?)
    }
}

use crate::{error::Error, mesh::HalfedgeMesh};

/// Parameters for changing the resolution of a mesh as a whole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshResampler {
    /// Fraction of the edges kept by [`Self::downsample`].
    pub downsample_ratio: f64,
    /// Number of split, collapse, flip and smooth passes done by
    /// [`Self::resample`].
    pub remesh_iterations: usize,
    /// Smoothing steps in each remeshing pass.
    pub smoothing_steps: usize,
    /// How far each smoothing step moves a vertex towards the centroid of its
    /// neighbors, between 0 and 1.
    pub smoothing_weight: f64,
}

impl Default for MeshResampler {
    fn default() -> Self {
        MeshResampler {
            downsample_ratio: 0.25,
            remesh_iterations: 5,
            smoothing_steps: 10,
            smoothing_weight: 0.2,
        }
    }
}

impl MeshResampler {
    fn validate(&self) -> Result<(), Error> {
        if !(self.downsample_ratio > 0. && self.downsample_ratio <= 1.) {
            return Err(Error::InvalidParameter(format!(
                "Downsample ratio must be in (0, 1], found {}",
                self.downsample_ratio
            )));
        }
        if !(0. ..=1.).contains(&self.smoothing_weight) {
            return Err(Error::InvalidParameter(format!(
                "Smoothing weight must be in [0, 1], found {}",
                self.smoothing_weight
            )));
        }
        Ok(())
    }

    /// Reduce the number of edges of the mesh to the downsample ratio, using
    /// quadric error decimation. Returns the number of edges collapsed.
    #[cfg(feature = "decimate")]
    pub fn downsample(&self, mesh: &mut HalfedgeMesh) -> Result<usize, Error> {
        self.validate()?;
        let target = (mesh.num_edges() as f64 * self.downsample_ratio).floor() as usize;
        mesh.decimate(target)
    }

    /// Refine the mesh with one pass of Loop subdivision.
    #[cfg(feature = "subdiv")]
    pub fn upsample(&self, mesh: &mut HalfedgeMesh) -> Result<(), Error> {
        self.validate()?;
        mesh.subdivide_loop()
    }

    /// Make the edges of the mesh roughly equal in length, and the vertex
    /// valences as regular as possible, with isotropic remeshing.
    pub fn resample(&self, mesh: &mut HalfedgeMesh) -> Result<(), Error> {
        self.validate()?;
        mesh.remesh(
            self.remesh_iterations,
            self.smoothing_steps,
            self.smoothing_weight,
        )
    }
}

#[cfg(test)]
mod test {
    use super::MeshResampler;
    use crate::{error::Error, mesh::HalfedgeMesh};

    #[test]
    fn t_invalid_parameters() {
        let mut mesh = HalfedgeMesh::icosahedron().expect("Cannot create icosahedron");
        for resampler in [
            MeshResampler {
                downsample_ratio: 0.,
                ..Default::default()
            },
            MeshResampler {
                downsample_ratio: f64::NAN,
                ..Default::default()
            },
            MeshResampler {
                smoothing_weight: 1.5,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                resampler.resample(&mut mesh),
                Err(Error::InvalidParameter(_))
            ));
        }
        // Nothing was touched.
        assert_eq!(mesh.num_edges(), 30);
    }

    #[test]
    #[cfg(all(feature = "subdiv", feature = "decimate"))]
    fn t_upsample_downsample() {
        let resampler = MeshResampler::default();
        let mut mesh = HalfedgeMesh::icosahedron().expect("Cannot create icosahedron");
        resampler.upsample(&mut mesh).expect("Cannot upsample");
        resampler.upsample(&mut mesh).expect("Cannot upsample");
        assert_eq!(mesh.num_edges(), 480);
        resampler.downsample(&mut mesh).expect("Cannot downsample");
        mesh.check_topology().expect("Topological errors found");
        assert!(mesh.num_edges() <= 120);
    }

    #[test]
    #[cfg(feature = "subdiv")]
    fn t_tetrahedron_upsample() {
        let mut tet = HalfedgeMesh::tetrahedron().expect("Cannot create tetrahedron");
        MeshResampler::default()
            .upsample(&mut tet)
            .expect("Cannot upsample");
        assert_eq!(tet.num_faces(), 16);
    }

    #[test]
    fn t_resample() {
        let mut qbox = HalfedgeMesh::unit_cube().expect("Cannot create a box");
        MeshResampler::default()
            .resample(&mut qbox)
            .expect("Cannot resample");
        qbox.check_topology().expect("Topological errors found");
        assert!(qbox.is_triangle_mesh());
    }
}

// Angular distributions for emitted electrons
//
// Emission directions are cosine (Lambert) distributed about the inward
// wall normal. The chamber cross-section lives in the x-y plane; the
// normal has two components and z is the tangential beam direction.

use nalgebra::Vector3;
use rand::Rng;

/// Elementary charge in C, used to convert emission energies (eV) to
/// velocities.
const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;

/// Angular distribution of emitted electrons, selected by name from a
/// fixed registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryAngleDistribution {
    /// Cosine-distributed polar angle in the chamber cross-section plane;
    /// no tangential velocity component.
    Cosine2d,
    /// Cosine-distributed polar angle about the wall normal with a
    /// uniform azimuth, populating the tangential component.
    Cosine3d,
}

impl SecondaryAngleDistribution {
    /// Parse a distribution from its configuration name.
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name {
            "cosine_2D" => Ok(SecondaryAngleDistribution::Cosine2d),
            "cosine_3D" => Ok(SecondaryAngleDistribution::Cosine3d),
            other => Err(format!(
                "Unknown secondary angle distribution '{}'. \
                 Available distributions: cosine_2D, cosine_3D",
                other
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SecondaryAngleDistribution::Cosine2d => "cosine_2D",
            SecondaryAngleDistribution::Cosine3d => "cosine_3D",
        }
    }

    /// Generate emission velocities for `count` electrons with the given
    /// emission energies (eV), wall normals, and particle mass (kg).
    ///
    /// The returned components satisfy `|v| = sqrt(2 E q/m)` and point
    /// into the chamber (`v . n >= 0`).
    pub fn sample_velocities<R: Rng>(
        &self,
        count: usize,
        energies_ev: &[f64],
        norm_x: &[f64],
        norm_y: &[f64],
        mass: f64,
        rng: &mut R,
    ) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        assert_eq!(count, energies_ev.len());
        assert_eq!(count, norm_x.len());
        assert_eq!(count, norm_y.len());

        let mut vx = Vec::with_capacity(count);
        let mut vy = Vec::with_capacity(count);
        let mut vz = Vec::with_capacity(count);

        for i in 0..count {
            let vmod = (2.0 * ELEMENTARY_CHARGE * energies_ev[i] / mass).sqrt();
            let normal = Vector3::new(norm_x[i], norm_y[i], 0.0);
            let tangent = Vector3::new(-norm_y[i], norm_x[i], 0.0);

            let v = match self {
                SecondaryAngleDistribution::Cosine2d => {
                    // sin(theta) uniform in [-1, 1] gives a cosine-law
                    // polar angle in the cross-section plane
                    let sin_theta = 2.0 * rng.gen::<f64>() - 1.0;
                    let cos_theta = (1.0 - sin_theta * sin_theta).sqrt();
                    vmod * (cos_theta * normal + sin_theta * tangent)
                }
                SecondaryAngleDistribution::Cosine3d => {
                    // sin(theta) = sqrt(u) gives the Lambert law on the
                    // hemisphere about the normal
                    let sin_theta = rng.gen::<f64>().sqrt();
                    let cos_theta = (1.0 - sin_theta * sin_theta).sqrt();
                    let phi = 2.0 * std::f64::consts::PI * rng.gen::<f64>();
                    vmod
                        * (cos_theta * normal
                            + sin_theta * phi.cos() * tangent
                            + sin_theta * phi.sin() * Vector3::z())
                }
            };

            vx.push(v.x);
            vy.push(v.y);
            vz.push(v.z);
        }

        (vx, vy, vz)
    }
}

//! Rejection sampling of orbital densities into colored point clouds.
//!
//! Candidates are drawn uniformly inside a ball whose radius depends on the
//! shell, then accepted when a uniform draw falls below the boosted density
//! from [`probability_density`]. The loop is capped at
//! `target * MAX_ITERATION_FACTOR` candidates, so a cloud may come back short.
//! A short cloud is a normal result, not an error.

use bytemuck::{Pod, Zeroable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::orbitals::{OrbitalInfo, Rgb};
use crate::physics::{probability_density, radial_form, QuantumNumbers, RadialForm};

/// Sampling radius for the K shell. Tight, so the 1s acceptance rate stays usable.
pub const CORE_SAMPLING_RADIUS: f64 = 4.0;

/// Sampling radius per principal quantum number above the K shell.
pub const SHELL_RADIUS_STEP: f64 = 10.0;

/// Hard cap on candidates per requested point.
pub const MAX_ITERATION_FACTOR: usize = 50;

/// How often the cancellable sampler polls its flag.
pub const CANCEL_CHECK_INTERVAL: usize = 4096;

const INTENSITY_FLOOR: f64 = 0.7;
const INTENSITY_SPAN: f64 = 0.3;

/// Vertex layout handed to the renderer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Accepted points for one orbital. Positions and colors are parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointCloud {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
    /// Candidates drawn, accepted or not.
    pub iterations: usize,
    /// Requested point count.
    pub target: usize,
}

impl PointCloud {
    fn with_capacity(target: usize) -> Self {
        PointCloud {
            positions: Vec::with_capacity(target),
            colors: Vec::with_capacity(target),
            iterations: 0,
            target,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True when every requested point was accepted.
    pub fn is_complete(&self) -> bool {
        self.len() == self.target
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.len() as f64 / self.iterations as f64
    }

    pub fn vertices(&self) -> Vec<PointVertex> {
        self.positions
            .iter()
            .zip(&self.colors)
            .map(|(&position, &color)| PointVertex { position, color })
            .collect()
    }
}

/// Raw bytes of a vertex buffer, ready for a GPU upload.
pub fn vertex_bytes(vertices: &[PointVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

pub fn sampling_radius(n: u32) -> f64 {
    if n == 1 {
        CORE_SAMPLING_RADIUS
    } else {
        SHELL_RADIUS_STEP * n as f64
    }
}

/// Brightness factor for an accepted point, always within [0.7, 1.0].
pub fn color_intensity(density: f64) -> f64 {
    INTENSITY_FLOOR + density.clamp(0.0, 1.0) * INTENSITY_SPAN
}

/// Samples up to `target` points for one orbital.
pub fn generate_orbital_cloud<R: Rng + ?Sized>(
    qn: QuantumNumbers,
    color: Rgb,
    target: usize,
    rng: &mut R,
) -> PointCloud {
    sample_cloud(qn, color, target, rng, None)
}

/// Same as [`generate_orbital_cloud`], but stops early once `cancel` is set.
/// The flag is polled every [`CANCEL_CHECK_INTERVAL`] candidates.
pub fn generate_orbital_cloud_cancellable<R: Rng + ?Sized>(
    qn: QuantumNumbers,
    color: Rgb,
    target: usize,
    rng: &mut R,
    cancel: &AtomicBool,
) -> PointCloud {
    sample_cloud(qn, color, target, rng, Some(cancel))
}

fn sample_cloud<R: Rng + ?Sized>(
    qn: QuantumNumbers,
    color: Rgb,
    target: usize,
    rng: &mut R,
    cancel: Option<&AtomicBool>,
) -> PointCloud {
    if radial_form(qn.n, qn.l) == RadialForm::Fallback {
        tracing::warn!(
            n = qn.n,
            l = qn.l,
            "no tabulated radial form, using exp(-rho/2) approximation"
        );
    }

    let mut cloud = PointCloud::with_capacity(target);
    let max_radius = sampling_radius(qn.n);
    let max_attempts = target.saturating_mul(MAX_ITERATION_FACTOR);

    while cloud.len() < target && cloud.iterations < max_attempts {
        if let Some(flag) = cancel {
            if cloud.iterations % CANCEL_CHECK_INTERVAL == 0 && flag.load(Ordering::Relaxed) {
                tracing::debug!(?qn, accepted = cloud.len(), "sampling cancelled");
                break;
            }
        }
        cloud.iterations += 1;

        // Cube-root radius gives a uniform proposal over the ball volume.
        let r = max_radius * rng.gen::<f64>().cbrt();
        // cos(theta) uniform in [-1, 1]
        let theta = (2.0 * rng.gen::<f64>() - 1.0).acos();
        let phi = 2.0 * PI * rng.gen::<f64>();

        let density = probability_density(r, theta, phi, qn);

        if rng.gen::<f64>() < density {
            let (sin_theta, cos_theta) = theta.sin_cos();
            let x = r * sin_theta * phi.cos();
            let y = r * sin_theta * phi.sin();
            let z = r * cos_theta;

            cloud.positions.push([x as f32, y as f32, z as f32]);
            cloud.colors.push(color.scaled(color_intensity(density) as f32));
        }
    }

    if cloud.len() < target {
        tracing::warn!(
            ?qn,
            accepted = cloud.len(),
            target,
            iterations = cloud.iterations,
            "point cloud came back short"
        );
    } else {
        tracing::debug!(
            ?qn,
            accepted = cloud.len(),
            iterations = cloud.iterations,
            acceptance = cloud.acceptance_rate(),
            "point cloud generated"
        );
    }

    cloud
}

/// Derives an independent stream seed per orbital so that clouds sampled
/// side by side never share a random sequence.
pub fn stream_seed(seed: u64, orbital_id: &str) -> u64 {
    // FNV-1a over the id, then a SplitMix64 finalizer
    let id_hash = orbital_id
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
            (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
        });
    let mut z = seed ^ id_hash;
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Samples several orbitals on the rayon pool, one RNG stream each.
/// Output order follows `orbitals`.
pub fn generate_clouds_parallel(
    orbitals: &[&OrbitalInfo],
    point_count: usize,
    seed: Option<u64>,
) -> Vec<PointCloud> {
    orbitals
        .par_iter()
        .map(|orbital| {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(stream_seed(seed, orbital.id)),
                None => StdRng::from_entropy(),
            };
            generate_orbital_cloud(orbital.qn, orbital.color, point_count, &mut rng)
        })
        .collect()
}

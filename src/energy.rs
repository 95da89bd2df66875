// Emission energy sampling
//
// One inverse-transform sampler per event type. Backscattered and
// rediffused energies have closed-form inverses; the true-secondary
// spectrum is a multiplicity-weighted mixture that is integrated
// numerically on a fixed grid and inverted by table lookup.

use crate::math::{cumulative_trapezoid, interpolate_linear, linspace};
use rand::Rng;
use statrs::function::erf::{erf, erf_inv};
use statrs::function::factorial::binomial;
use statrs::function::gamma::{gamma, gamma_lr};
use std::collections::HashMap;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

// ---------------------------------------------------------------------
// Backscattered electrons
// ---------------------------------------------------------------------

/// Energy density of backscattered electrons, Eq. (26): a Gaussian
/// centered on the impact energy `e0`, truncated and normalized on
/// [0, e0].
pub fn backscattered_energy_pdf(energy_ev: f64, e0: f64, sigma_e: f64) -> f64 {
    let dev = energy_ev - e0;
    let a = 2.0 * (-dev * dev / (2.0 * sigma_e * sigma_e)).exp();
    let c = (2.0 * std::f64::consts::PI).sqrt() * sigma_e * erf(e0 / (SQRT_2 * sigma_e));
    a / c
}

/// Cumulative distribution matching [`backscattered_energy_pdf`].
pub fn backscattered_energy_cdf(energy_ev: f64, e0: f64, sigma_e: f64) -> f64 {
    1.0 - erf((e0 - energy_ev) / (SQRT_2 * sigma_e)) / erf(e0 / (SQRT_2 * sigma_e))
}

/// Sample backscattered energies, one per impact, by the closed-form
/// inverse of Eq. (26). Emitted energies lie in (0, e0].
pub fn sample_backscattered_energies<R: Rng>(
    e0_ev: &[f64],
    sigma_e: f64,
    rng: &mut R,
) -> Vec<f64> {
    e0_ev
        .iter()
        .map(|&e0| {
            let u: f64 = rng.gen();
            e0 - SQRT_2 * sigma_e * erf_inv((1.0 - u) * erf(e0 / (SQRT_2 * sigma_e)))
        })
        .collect()
}

// ---------------------------------------------------------------------
// Rediffused electrons
// ---------------------------------------------------------------------

/// Energy density of rediffused electrons, Eq. (29): a power law
/// `(q+1) E^q / e0^(q+1)` on [0, e0].
///
/// A negative impacting energy is invalid input and is reported as an
/// error rather than producing a meaningless density.
pub fn rediffused_energy_pdf(energy_ev: f64, e0: f64, q: f64) -> Result<f64, String> {
    if e0 < 0.0 {
        return Err(format!(
            "Impacting energy E_0 cannot be negative (got {})",
            e0
        ));
    }
    Ok((q + 1.0) * energy_ev.powf(q) / e0.powf(q + 1.0))
}

/// Cumulative distribution matching [`rediffused_energy_pdf`].
pub fn rediffused_energy_cdf(energy_ev: f64, e0: f64, q: f64) -> f64 {
    energy_ev.powf(q + 1.0) / e0.powf(q + 1.0)
}

/// Sample rediffused energies, one per impact, by the closed-form inverse
/// `u^(1/(q+1)) e0`.
pub fn sample_rediffused_energies<R: Rng>(e0_ev: &[f64], q: f64, rng: &mut R) -> Vec<f64> {
    e0_ev
        .iter()
        .map(|&e0| {
            let u: f64 = rng.gen();
            u.powf(1.0 / (q + 1.0)) * e0
        })
        .collect()
}

// ---------------------------------------------------------------------
// True secondaries
// ---------------------------------------------------------------------

/// Distribution of the number of secondaries per penetrated electron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiplicityModel {
    /// Binomial with M = 10 trials and success probability delta_ts / M
    Binomial,
    /// Poisson with mean delta_ts
    Poisson,
}

impl MultiplicityModel {
    /// Parse a model from its configuration name.
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name {
            "binomial" => Ok(MultiplicityModel::Binomial),
            "poisson" => Ok(MultiplicityModel::Poisson),
            other => Err(format!(
                "choice must be either 'binomial' or 'poisson', got '{}'",
                other
            )),
        }
    }
}

/// Shape parameters p_n of the per-multiplicity energy densities.
const P_N: [f64; 10] = [2.5, 3.3, 2.5, 2.5, 2.8, 1.3, 1.5, 1.5, 1.5, 1.5];
/// Scale parameters eps_n (eV) of the per-multiplicity energy densities.
const EPS_N: [f64; 10] = [1.5, 1.75, 1.0, 3.75, 8.5, 11.5, 2.5, 3.0, 2.5, 3.0];
/// Highest multiplicity carried by the mixture, and the binomial trial count.
const M_MAX: usize = 10;

/// True-secondary emission-energy spectrum.
///
/// The density is a mixture over multiplicities n = 1..10 of Gamma-like
/// densities weighted by the multiplicity probability P_n. The averaged
/// density is trapezoid-integrated over a fixed dense energy grid to
/// build a normalized CDF, which is inverted by table interpolation.
///
/// Building a CDF is expensive (1e5-point quadrature), so finished tables
/// are memoized keyed by `delta_ts` and `e0` rounded to a fixed
/// resolution. The material parameter set is immutable, so entries stay
/// valid for the life of the spectrum.
#[derive(Debug, Clone)]
pub struct TrueSecondarySpectrum {
    model: MultiplicityModel,
    energy_grid: Vec<f64>,
    cdf_cache: HashMap<(i64, i64, MultiplicityModel), Vec<f64>>,
}

/// Cache resolution for delta_ts
const DELTA_TS_RESOLUTION: f64 = 1e-3;
/// Cache resolution for the impact energy (eV)
const E0_RESOLUTION: f64 = 0.1;

impl TrueSecondarySpectrum {
    /// Spectrum on the standard grid: 1e5 points on [0.001, 300] eV.
    pub fn new(model: MultiplicityModel) -> Self {
        Self::with_grid(model, linspace(0.001, 300.0, 100_000))
    }

    /// Spectrum on a caller-provided energy grid (ascending, in eV).
    pub fn with_grid(model: MultiplicityModel, energy_grid: Vec<f64>) -> Self {
        TrueSecondarySpectrum {
            model,
            energy_grid,
            cdf_cache: HashMap::new(),
        }
    }

    pub fn model(&self) -> MultiplicityModel {
        self.model
    }

    pub fn energy_grid(&self) -> &[f64] {
        &self.energy_grid
    }

    /// Probability that one impact liberates exactly `n` secondaries.
    pub fn multiplicity_probability(&self, delta_ts: f64, n: usize) -> f64 {
        match self.model {
            MultiplicityModel::Poisson => {
                let n_fact = gamma(n as f64 + 1.0);
                delta_ts.powi(n as i32) * (-delta_ts).exp() / n_fact
            }
            MultiplicityModel::Binomial => {
                let p = delta_ts / M_MAX as f64;
                binomial(M_MAX as u64, n as u64)
                    * p.powi(n as i32)
                    * (1.0 - p).powi((M_MAX - n) as i32)
            }
        }
    }

    /// Unnormalized energy density for multiplicity `n` evaluated on the
    /// grid, together with the multiplicity probability P_n.
    pub fn multiplicity_energy_pdf(&self, delta_ts: f64, n: usize, e0: f64) -> (Vec<f64>, f64) {
        debug_assert!((1..=M_MAX).contains(&n));
        let p_shape = P_N[n - 1];
        let eps = EPS_N[n - 1];
        let p_n_ts = self.multiplicity_probability(delta_ts, n);

        let norm = (eps * gamma(p_shape)).powi(n as i32) * gamma_lr(n as f64 * p_shape, e0 / eps);
        let f_n = p_n_ts / norm;

        let density = self
            .energy_grid
            .iter()
            .map(|&en| f_n * en.powf(p_shape - 1.0) * (-en / eps).exp())
            .collect();
        (density, p_n_ts)
    }

    /// Multiplicity-averaged, normalized energy density on the grid.
    ///
    /// Returns all zeros when the spectrum is degenerate (vanishing
    /// `delta_ts` or non-positive impact energy), where no true-secondary
    /// charge is emitted anyway.
    pub fn average_energy_pdf(&self, delta_ts: f64, e0: f64) -> Vec<f64> {
        if delta_ts <= 0.0 || e0 <= 0.0 {
            return vec![0.0; self.energy_grid.len()];
        }

        let mut averaged = vec![0.0; self.energy_grid.len()];
        for n in 1..=M_MAX {
            let (density, p_n_ts) = self.multiplicity_energy_pdf(delta_ts, n, e0);
            for (avg, f) in averaged.iter_mut().zip(density.iter()) {
                *avg += f * p_n_ts;
            }
        }

        let area: f64 = cumulative_trapezoid(&averaged, &self.energy_grid)
            .last()
            .copied()
            .unwrap_or(0.0);
        if !(area > f64::MIN_POSITIVE) {
            return vec![0.0; self.energy_grid.len()];
        }
        for f in averaged.iter_mut() {
            *f /= area;
        }
        averaged
    }

    /// Normalized CDF of the averaged density on the grid.
    pub fn average_energy_cdf(&self, delta_ts: f64, e0: f64) -> Vec<f64> {
        let pdf = self.average_energy_pdf(delta_ts, e0);
        cumulative_trapezoid(&pdf, &self.energy_grid)
    }

    fn cache_key(&self, delta_ts: f64, e0: f64) -> (i64, i64, MultiplicityModel) {
        (
            (delta_ts / DELTA_TS_RESOLUTION).round() as i64,
            (e0 / E0_RESOLUTION).round() as i64,
            self.model,
        )
    }

    /// Sample `count` true-secondary energies for one impact with yield
    /// `delta_ts` and impact energy `e0`, consuming one fresh uniform per
    /// emitted particle.
    ///
    /// The CDF for the (rounded) `(delta_ts, e0)` pair is built once and
    /// memoized; batches of impacts with similar yields amortize the
    /// quadrature cost.
    pub fn sample<R: Rng>(
        &mut self,
        delta_ts: f64,
        e0: f64,
        count: usize,
        rng: &mut R,
    ) -> Vec<f64> {
        let key = self.cache_key(delta_ts, e0);
        if !self.cdf_cache.contains_key(&key) {
            let cdf = self.average_energy_cdf(delta_ts, e0);
            self.cdf_cache.insert(key, cdf);
        }
        let cdf = &self.cdf_cache[&key];

        // Degenerate spectrum: no mass, emitted weight is zero as well
        let total = *cdf.last().unwrap_or(&0.0);
        if !(total > 0.0) {
            return vec![self.energy_grid[0]; count];
        }

        (0..count)
            .map(|_| {
                let u: f64 = rng.gen();
                interpolate_linear(cdf, &self.energy_grid, u)
            })
            .collect()
    }
}

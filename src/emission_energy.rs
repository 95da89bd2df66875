// Hilleret secondary emission-energy model
//
// Log-normal fit to measured secondary-electron spectra, used as the
// legacy energy source for true-secondary events. Energies above the
// emission threshold are resampled; with the no-gain correction enabled,
// low-energy impacts may not emit more energy than they brought in.

use rand::Rng;
use rand_distr::{Distribution, LogNormal};

/// Number of rejection rounds before giving up on the log-normal tail.
const MAX_REJECTION_ROUNDS: usize = 100;

/// Sample one secondary energy per impact from the Hilleret log-normal
/// spectrum with parameters `mufit`/`sigmafit` (log-space mean and
/// standard deviation), rejecting draws above the emission threshold
/// `e_th`.
///
/// With `no_increase_energy` set, impacts below `thresh_low_energy` also
/// reject draws above their own impact energy, so slow electrons cannot
/// gain energy at the wall. For vanishing impact energies the log-normal
/// tail may carry almost no admissible mass; after a bounded number of
/// rounds the draw falls back to a uniform on [0, E_impact].
pub fn sec_energy_hilleret<R: Rng>(
    no_increase_energy: bool,
    sigmafit: f64,
    mufit: f64,
    e_th: f64,
    energy_impact_ev: &[f64],
    thresh_low_energy: Option<f64>,
    rng: &mut R,
) -> Result<Vec<f64>, String> {
    let log_normal = LogNormal::new(mufit, sigmafit)
        .map_err(|e| format!("Invalid Hilleret fit parameters: {}", e))?;

    let thresh_low = thresh_low_energy.unwrap_or(0.0);
    let mut energies = Vec::with_capacity(energy_impact_ev.len());
    for &e_imp in energy_impact_ev {
        let cap = if no_increase_energy && e_imp < thresh_low {
            e_th.min(e_imp)
        } else {
            e_th
        };

        let mut accepted = None;
        for _ in 0..MAX_REJECTION_ROUNDS {
            let en = log_normal.sample(rng);
            if en <= cap {
                accepted = Some(en);
                break;
            }
        }
        energies.push(accepted.unwrap_or_else(|| rng.gen::<f64>() * cap));
    }
    Ok(energies)
}

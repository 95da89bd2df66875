// Secondary emission model driving one wall-impact batch
//
// Ties the pieces together: classify every impact, sample an emission
// energy per event-type group, assign outgoing velocities through the
// configured angular distribution, and split heavy true-secondary
// macro-particles into clones.

use crate::angles::SecondaryAngleDistribution;
use crate::bank::SecondaryBank;
use crate::batch::{ImpactBatch, MacroParticleArrays};
use crate::emission_energy::sec_energy_hilleret;
use crate::energy::{
    sample_backscattered_energies, sample_rediffused_energies, MultiplicityModel,
    TrueSecondarySpectrum,
};
use crate::events::{sey_process, EventType, SeyOutcome};
use crate::parameters::FurmanPiviParameters;
use rand::Rng;

/// Energy source for true-secondary electrons.
///
/// Two strategies coexist: the legacy Hilleret log-normal fit and the
/// multiplicity-averaged Furman-Pivi spectrum. Which one feeds the
/// replacement and splitting paths is a model-construction choice.
#[derive(Debug, Clone)]
pub enum TrueSecondaryEnergy {
    /// Hilleret log-normal spectrum with rejection above `e_th`
    Hilleret {
        /// Emission threshold energy in eV
        e_th: f64,
        /// Log-space standard deviation of the fit
        sigmafit: f64,
        /// Log-space mean of the fit
        mufit: f64,
        /// Forbid energy gain for impacts below `thresh_low_energy`
        no_increase_energy: bool,
        thresh_low_energy: Option<f64>,
    },
    /// Multiplicity-averaged Furman-Pivi spectrum (inverse CDF)
    FurmanPivi { multiplicity: MultiplicityModel },
}

/// Model configuration beyond the material parameter set.
#[derive(Debug, Clone)]
pub struct EmissionModelConfig {
    /// Angular distribution name ("cosine_2D" or "cosine_3D"); may stay
    /// unset, but impact processing then fails with a configuration error
    pub secondary_angle_distribution: Option<String>,
    pub true_secondary_energy: TrueSecondaryEnergy,
    /// Override for the yield-curve form factor s (default: the value
    /// carried by the material parameter set, 1.54 for copper)
    pub shape_factor: Option<f64>,
}

/// Reserved per-batch metadata, empty for now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventInfo {}

/// Result of processing one impact batch.
#[derive(Debug, Clone)]
pub struct EmissionOutcome {
    /// Total emitted charge weight per impact
    pub nel_emit: Vec<f64>,
    /// Event type per impact
    pub event_types: Vec<EventType>,
    /// Reserved metadata
    pub event_info: EventInfo,
    /// In-place replacements of the impacting macro-particles
    pub replaced: MacroParticleArrays,
    /// Macro-particles cloned by the splitter; empty arrays when no
    /// impact split
    pub new_particles: MacroParticleArrays,
}

/// Furman-Pivi secondary emission model for one wall material.
#[derive(Debug, Clone)]
pub struct SecondaryEmissionModel {
    parameters: FurmanPiviParameters,
    angle_distribution: Option<SecondaryAngleDistribution>,
    true_secondary_energy: TrueSecondaryEnergy,
    spectrum: TrueSecondarySpectrum,
}

fn gather(values: &[f64], idx: &[usize]) -> Vec<f64> {
    idx.iter().map(|&i| values[i]).collect()
}

impl SecondaryEmissionModel {
    pub fn new(
        mut parameters: FurmanPiviParameters,
        config: EmissionModelConfig,
    ) -> Result<Self, String> {
        if let Some(s) = config.shape_factor {
            parameters.s = s;
        }
        let angle_distribution = match &config.secondary_angle_distribution {
            Some(name) => Some(SecondaryAngleDistribution::from_name(name)?),
            None => None,
        };
        let multiplicity = match &config.true_secondary_energy {
            TrueSecondaryEnergy::FurmanPivi { multiplicity } => *multiplicity,
            TrueSecondaryEnergy::Hilleret { .. } => MultiplicityModel::Binomial,
        };

        println!(
            "Secondary emission model: Furman-Pivi s={:.4}",
            parameters.s
        );

        Ok(SecondaryEmissionModel {
            parameters,
            angle_distribution,
            true_secondary_energy: config.true_secondary_energy,
            spectrum: TrueSecondarySpectrum::new(multiplicity),
        })
    }

    pub fn parameters(&self) -> &FurmanPiviParameters {
        &self.parameters
    }

    /// Select the angular distribution after construction.
    pub fn set_angle_distribution(&mut self, name: &str) -> Result<(), String> {
        self.angle_distribution = Some(SecondaryAngleDistribution::from_name(name)?);
        Ok(())
    }

    /// Classify a batch of impacts and compute emitted charge weights.
    pub fn sey_process<R: Rng>(
        &self,
        nel_impact: &[f64],
        energy_impact_ev: &[f64],
        costheta_impact: &[f64],
        rng: &mut R,
    ) -> SeyOutcome {
        sey_process(
            &self.parameters,
            nel_impact,
            energy_impact_ev,
            costheta_impact,
            rng,
        )
    }

    /// Sample true-secondary energies through the configured strategy:
    /// `counts[i]` energies for the impact with energy `e0[i]` and yield
    /// `delta_ts[i]`, flattened in impact order.
    fn true_secondary_energies<R: Rng>(
        &mut self,
        e0: &[f64],
        delta_ts: &[f64],
        counts: &[usize],
        rng: &mut R,
    ) -> Result<Vec<f64>, String> {
        match self.true_secondary_energy {
            TrueSecondaryEnergy::Hilleret {
                e_th,
                sigmafit,
                mufit,
                no_increase_energy,
                thresh_low_energy,
            } => {
                let expanded: Vec<f64> = e0
                    .iter()
                    .zip(counts.iter())
                    .flat_map(|(&e, &c)| std::iter::repeat(e).take(c))
                    .collect();
                sec_energy_hilleret(
                    no_increase_energy,
                    sigmafit,
                    mufit,
                    e_th,
                    &expanded,
                    thresh_low_energy,
                    rng,
                )
            }
            TrueSecondaryEnergy::FurmanPivi { .. } => {
                let total: usize = counts.iter().sum();
                let mut out = Vec::with_capacity(total);
                for i in 0..e0.len() {
                    out.extend(self.spectrum.sample(delta_ts[i], e0[i], counts[i], rng));
                }
                Ok(out)
            }
        }
    }

    /// Process one batch of wall impacts.
    ///
    /// Returns the emitted weight and event type per impact, the in-place
    /// replacement attributes for every impacting macro-particle, and the
    /// clones created by the splitter. `nel_mp_th` is the charge-weight
    /// threshold above which a true-secondary macro-particle is split;
    /// every split conserves the emitted weight exactly.
    pub fn impacts_on_surface<R: Rng>(
        &mut self,
        mass: f64,
        batch: &ImpactBatch,
        nel_mp_th: f64,
        rng: &mut R,
    ) -> Result<EmissionOutcome, String> {
        batch.validate()?;
        if !(nel_mp_th > 0.0) {
            return Err(format!(
                "Macro-particle weight threshold must be positive (got {})",
                nel_mp_th
            ));
        }

        let track_segments = batch.segment.is_some();
        if batch.is_empty() {
            return Ok(EmissionOutcome {
                nel_emit: Vec::new(),
                event_types: Vec::new(),
                event_info: EventInfo::default(),
                replaced: MacroParticleArrays::empty(track_segments),
                new_particles: MacroParticleArrays::empty(track_segments),
            });
        }

        let angle_distribution = self.angle_distribution.ok_or_else(|| {
            "No secondary angle distribution configured; select one before processing impacts"
                .to_string()
        })?;

        let outcome = self.sey_process(&batch.nel, &batch.energy_ev, &batch.costheta, rng);

        // Replacements start as copies of the impactors carrying the
        // emitted weight
        let mut replaced = MacroParticleArrays {
            nel: outcome.nel_emit.clone(),
            x: batch.x.clone(),
            y: batch.y.clone(),
            z: batch.z.clone(),
            vx: batch.vx.clone(),
            vy: batch.vy.clone(),
            vz: batch.vz.clone(),
            segment: batch.segment.clone(),
        };

        let mut idx_back = Vec::new();
        let mut idx_red = Vec::new();
        let mut idx_ts = Vec::new();
        for (i, t) in outcome.event_types.iter().enumerate() {
            match t {
                EventType::Backscattered => idx_back.push(i),
                EventType::Rediffused => idx_red.push(i),
                EventType::TrueSecondary => idx_ts.push(i),
            }
        }

        // Backscattered: energy close to the impact energy
        if !idx_back.is_empty() {
            let e0 = gather(&batch.energy_ev, &idx_back);
            let energies = sample_backscattered_energies(&e0, self.parameters.sigma_e, rng);
            self.assign_group_velocities(
                &angle_distribution,
                mass,
                batch,
                &idx_back,
                &energies,
                &mut replaced,
                rng,
            );
        }

        // Rediffused: broad power-law spectrum below the impact energy
        if !idx_red.is_empty() {
            let e0 = gather(&batch.energy_ev, &idx_red);
            let energies = sample_rediffused_energies(&e0, self.parameters.q, rng);
            self.assign_group_velocities(
                &angle_distribution,
                mass,
                batch,
                &idx_red,
                &energies,
                &mut replaced,
                rng,
            );
        }

        // True secondaries: split heavy macro-particles, then sample
        // fresh energies and angles for replacements and clones alike
        let mut new_particles = MacroParticleArrays::empty(track_segments);
        if !idx_ts.is_empty() {
            let mut n_add = vec![0usize; batch.len()];
            for &i in &idx_ts {
                // max(0) in case of underflow
                let extra = (replaced.nel[i] / nel_mp_th).ceil() as i64 - 1;
                n_add[i] = extra.max(0) as usize;
                replaced.nel[i] /= (n_add[i] + 1) as f64;
            }
            let n_add_total: usize = idx_ts.iter().map(|&i| n_add[i]).sum();

            let e0_ts = gather(&batch.energy_ev, &idx_ts);
            let delta_ts = gather(&outcome.delta_ts, &idx_ts);

            // Replacement macro-particles
            let ones = vec![1usize; idx_ts.len()];
            let energies = self.true_secondary_energies(&e0_ts, &delta_ts, &ones, rng)?;
            self.assign_group_velocities(
                &angle_distribution,
                mass,
                batch,
                &idx_ts,
                &energies,
                &mut replaced,
                rng,
            );

            // Cloned macro-particles
            if n_add_total > 0 {
                let counts: Vec<usize> = idx_ts.iter().map(|&i| n_add[i]).collect();
                let clone_energies =
                    self.true_secondary_energies(&e0_ts, &delta_ts, &counts, rng)?;

                let mut clone_norm_x = Vec::with_capacity(n_add_total);
                let mut clone_norm_y = Vec::with_capacity(n_add_total);
                for &i in &idx_ts {
                    for _ in 0..n_add[i] {
                        clone_norm_x.push(batch.norm_x[i]);
                        clone_norm_y.push(batch.norm_y[i]);
                    }
                }
                let (cvx, cvy, cvz) = angle_distribution.sample_velocities(
                    n_add_total,
                    &clone_energies,
                    &clone_norm_x,
                    &clone_norm_y,
                    mass,
                    rng,
                );

                let mut bank = SecondaryBank::with_capacity(track_segments, n_add_total);
                let mut offset = 0;
                for &i in &idx_ts {
                    let segment = batch.segment.as_ref().map(|seg| seg[i]);
                    for _ in 0..n_add[i] {
                        bank.bank_secondary(
                            replaced.nel[i],
                            batch.x[i],
                            batch.y[i],
                            batch.z[i],
                            cvx[offset],
                            cvy[offset],
                            cvz[offset],
                            segment,
                        );
                        offset += 1;
                    }
                }
                new_particles = bank.into_arrays();
            }
        }

        Ok(EmissionOutcome {
            nel_emit: outcome.nel_emit,
            event_types: outcome.event_types,
            event_info: EventInfo::default(),
            replaced,
            new_particles,
        })
    }

    /// Sample outgoing velocities for one event-type group and write them
    /// into the replacement arrays.
    #[allow(clippy::too_many_arguments)]
    fn assign_group_velocities<R: Rng>(
        &self,
        angle_distribution: &SecondaryAngleDistribution,
        mass: f64,
        batch: &ImpactBatch,
        idx: &[usize],
        energies: &[f64],
        replaced: &mut MacroParticleArrays,
        rng: &mut R,
    ) {
        let norm_x = gather(&batch.norm_x, idx);
        let norm_y = gather(&batch.norm_y, idx);
        let (vx, vy, vz) =
            angle_distribution.sample_velocities(idx.len(), energies, &norm_x, &norm_y, mass, rng);
        for (k, &i) in idx.iter().enumerate() {
            replaced.vx[i] = vx[k];
            replaced.vy[i] = vy[k];
            replaced.vz[i] = vz[k];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ELECTRON_MASS: f64 = 9.1093837015e-31;

    fn hilleret_config() -> EmissionModelConfig {
        EmissionModelConfig {
            secondary_angle_distribution: Some("cosine_3D".to_string()),
            true_secondary_energy: TrueSecondaryEnergy::Hilleret {
                e_th: 35.0,
                sigmafit: 1.0828,
                mufit: 1.6636,
                no_increase_energy: false,
                thresh_low_energy: None,
            },
            shape_factor: None,
        }
    }

    fn batch_of(nel: f64, n: usize, energy: f64) -> ImpactBatch {
        ImpactBatch {
            nel: vec![nel; n],
            x: vec![1.0; n],
            y: vec![-2.0; n],
            z: vec![0.5; n],
            vx: vec![-1e5; n],
            vy: vec![2e5; n],
            vz: vec![0.0; n],
            norm_x: vec![0.6; n],
            norm_y: vec![0.8; n],
            segment: Some((0..n).collect()),
            v_normal: vec![-1e5; n],
            energy_ev: vec![energy; n],
            costheta: vec![1.0; n],
        }
    }

    #[test]
    fn test_unset_angle_distribution_is_a_configuration_error() {
        let mut config = hilleret_config();
        config.secondary_angle_distribution = None;
        let mut model =
            SecondaryEmissionModel::new(FurmanPiviParameters::copper(), config).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = model
            .impacts_on_surface(ELECTRON_MASS, &batch_of(1.0, 4, 300.0), 1.0, &mut rng)
            .unwrap_err();
        assert!(err.contains("angle distribution"), "error was: {}", err);
    }

    #[test]
    fn test_unknown_angle_distribution_name_is_rejected() {
        let mut config = hilleret_config();
        config.secondary_angle_distribution = Some("specular".to_string());
        assert!(SecondaryEmissionModel::new(FurmanPiviParameters::copper(), config).is_err());
    }

    #[test]
    fn test_non_positive_weight_threshold_is_rejected() {
        let mut model =
            SecondaryEmissionModel::new(FurmanPiviParameters::copper(), hilleret_config())
                .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = model
            .impacts_on_surface(ELECTRON_MASS, &batch_of(1.0, 2, 300.0), 0.0, &mut rng)
            .unwrap_err();
        assert!(err.contains("threshold"), "error was: {}", err);
    }

    #[test]
    fn test_split_shares_weight_equally() {
        // Choose the impacting weight so that a true-secondary event
        // emits exactly 2.5: with threshold 1.0 it must split three ways.
        let cu = FurmanPiviParameters::copper();
        let (de, dr, dts) = cu.yields(300.0, 1.0);
        let nel_in = 2.5 * (1.0 - dr - de) / dts;

        let mut model = SecondaryEmissionModel::new(cu, hilleret_config()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let batch = batch_of(nel_in, 200, 300.0);
        let out = model
            .impacts_on_surface(ELECTRON_MASS, &batch, 1.0, &mut rng)
            .unwrap();

        let mut saw_split = false;
        for i in 0..batch.len() {
            if out.event_types[i] == EventType::TrueSecondary {
                assert!((out.nel_emit[i] - 2.5).abs() < 1e-12);
                assert!(
                    (out.replaced.nel[i] - 2.5 / 3.0).abs() < 1e-12,
                    "replacement weight = {}",
                    out.replaced.nel[i]
                );
                saw_split = true;
            }
        }
        assert!(saw_split, "expected true-secondary events in 200 impacts");

        // Two clones per split, each carrying the same share
        let n_ts = out
            .event_types
            .iter()
            .filter(|&&t| t == EventType::TrueSecondary)
            .count();
        assert_eq!(out.new_particles.len(), 2 * n_ts);
        for &w in &out.new_particles.nel {
            assert!((w - 2.5 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_clones_inherit_position_and_segment() {
        let cu = FurmanPiviParameters::copper();
        let (de, dr, dts) = cu.yields(300.0, 1.0);
        let nel_in = 3.5 * (1.0 - dr - de) / dts;

        let mut model = SecondaryEmissionModel::new(cu, hilleret_config()).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let mut batch = batch_of(nel_in, 50, 300.0);
        batch.x = (0..50).map(|i| i as f64).collect();
        batch.y = (0..50).map(|i| -(i as f64) * 0.5).collect();
        let out = model
            .impacts_on_surface(ELECTRON_MASS, &batch, 1.0, &mut rng)
            .unwrap();

        let segments = out.new_particles.segment.as_ref().unwrap();
        assert_eq!(segments.len(), out.new_particles.len());
        for (k, &seg) in segments.iter().enumerate() {
            assert_eq!(out.new_particles.x[k], batch.x[seg]);
            assert_eq!(out.new_particles.y[k], batch.y[seg]);
            assert_eq!(out.new_particles.z[k], batch.z[seg]);
        }
    }

    #[test]
    fn test_no_split_yields_empty_new_particle_arrays() {
        let mut model =
            SecondaryEmissionModel::new(FurmanPiviParameters::copper(), hilleret_config())
                .unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let batch = batch_of(1.0, 100, 300.0);
        // Threshold far above any emitted weight: nothing splits
        let out = model
            .impacts_on_surface(ELECTRON_MASS, &batch, 1e9, &mut rng)
            .unwrap();
        assert_eq!(out.new_particles.len(), 0);
        assert_eq!(out.new_particles.segment, Some(Vec::new()));
        assert_eq!(out.replaced.len(), 100);
    }

    #[test]
    fn test_empty_batch_is_well_formed() {
        let mut model =
            SecondaryEmissionModel::new(FurmanPiviParameters::copper(), hilleret_config())
                .unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let mut batch = batch_of(1.0, 0, 300.0);
        batch.segment = None;
        let out = model
            .impacts_on_surface(ELECTRON_MASS, &batch, 1.0, &mut rng)
            .unwrap();
        assert!(out.nel_emit.is_empty());
        assert!(out.replaced.is_empty());
        assert!(out.new_particles.is_empty());
        assert!(out.new_particles.segment.is_none());
    }

    #[test]
    fn test_replaced_positions_are_preserved() {
        let mut model =
            SecondaryEmissionModel::new(FurmanPiviParameters::copper(), hilleret_config())
                .unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let batch = batch_of(1.0, 30, 150.0);
        let out = model
            .impacts_on_surface(ELECTRON_MASS, &batch, 1.0, &mut rng)
            .unwrap();
        assert_eq!(out.replaced.x, batch.x);
        assert_eq!(out.replaced.y, batch.y);
        assert_eq!(out.replaced.z, batch.z);
        assert_eq!(out.replaced.segment, batch.segment);
    }

    #[test]
    fn test_furman_pivi_energy_strategy_runs_end_to_end() {
        let config = EmissionModelConfig {
            secondary_angle_distribution: Some("cosine_3D".to_string()),
            true_secondary_energy: TrueSecondaryEnergy::FurmanPivi {
                multiplicity: MultiplicityModel::Binomial,
            },
            shape_factor: None,
        };
        let mut model =
            SecondaryEmissionModel::new(FurmanPiviParameters::copper(), config).unwrap();
        let mut rng = StdRng::seed_from_u64(31);
        let batch = batch_of(2.0, 40, 300.0);
        let out = model
            .impacts_on_surface(ELECTRON_MASS, &batch, 1.0, &mut rng)
            .unwrap();
        assert_eq!(out.replaced.len(), 40);
        for i in 0..40 {
            let speed = (out.replaced.vx[i].powi(2)
                + out.replaced.vy[i].powi(2)
                + out.replaced.vz[i].powi(2))
            .sqrt();
            assert!(speed > 0.0, "replacement {} has zero velocity", i);
        }
    }

    #[test]
    fn test_shape_factor_override() {
        let mut config = hilleret_config();
        config.shape_factor = Some(1.8);
        let model = SecondaryEmissionModel::new(FurmanPiviParameters::copper(), config).unwrap();
        assert_eq!(model.parameters().s, 1.8);
    }
}

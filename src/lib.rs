// Furman-Pivi secondary electron emission for electron-cloud buildup
// simulations. Classifies wall impacts into backscattered, rediffused and
// true-secondary events, samples emission energies and directions, and
// splits heavy true-secondary macro-particles under a weight threshold.

mod angles;
mod bank;
mod batch;
mod emission_energy;
mod energy;
mod events;
mod materials;
mod math;
mod model;
mod parameters;
mod yields;

pub use angles::SecondaryAngleDistribution;
pub use bank::SecondaryBank;
pub use batch::{ImpactBatch, MacroParticleArrays};
pub use emission_energy::sec_energy_hilleret;
pub use energy::{
    backscattered_energy_cdf, backscattered_energy_pdf, rediffused_energy_cdf,
    rediffused_energy_pdf, sample_backscattered_energies, sample_rediffused_energies,
    MultiplicityModel, TrueSecondarySpectrum,
};
pub use events::{sey_process, EventType, SeyOutcome};
pub use materials::material_parameters;
pub use model::{
    EmissionModelConfig, EmissionOutcome, EventInfo, SecondaryEmissionModel, TrueSecondaryEnergy,
};
pub use parameters::FurmanPiviParameters;

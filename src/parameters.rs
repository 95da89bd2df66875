// Furman-Pivi material parameter sets
//
// One immutable bundle of fit constants per wall material. The field
// grouping and the copper values follow the published Furman-Pivi fits
// (M. A. Furman and M. T. F. Pivi, PRST-AB 5, 124404 (2002)); equation
// numbers in the comments refer to that paper.

use serde::{Deserialize, Serialize};

/// Fit constants for one wall material.
///
/// Immutable after construction: build one instance per material at model
/// setup and share it read-only. All energies are in eV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurmanPiviParameters {
    // Backscattered (elastically scattered) electrons, Eq. (25)
    /// Probability of elastic scattering at infinite energy
    pub p1_e_inf: f64,
    /// Peak probability of elastic scattering
    pub p1_e_hat: f64,
    /// Energy of the elastic peak
    pub e_e_hat: f64,
    /// Width of the elastic peak
    pub w: f64,
    /// Shape exponent of the elastic peak
    pub p: f64,
    // Angular dependence, Eq. (47a)
    pub e1: f64,
    pub e2: f64,
    /// Energy spread of backscattered electrons, Eq. (26)
    pub sigma_e: f64,

    // Rediffused electrons, Eq. (28)
    /// Probability of rediffusion at infinite energy
    pub p1_r_inf: f64,
    /// Energy scale of the rediffused rise
    pub e_r: f64,
    /// Shape exponent of the rediffused rise
    pub r: f64,
    /// Rediffused energy-spectrum exponent, Eq. (29)
    pub q: f64,
    // Angular dependence, Eq. (47b)
    pub r1: f64,
    pub r2: f64,

    // True secondaries, Eq. (31)
    /// Peak true-secondary yield
    pub delta_ts_hat: f64,
    /// Energy of the true-secondary yield peak at normal incidence
    pub e_hat0: f64,
    /// Form factor of the yield curve, Eq. (32)
    pub s: f64,
    // Angular dependence, Eqs. (48a) and (48b)
    pub t1: f64,
    pub t2: f64,
    pub t3: f64,
    pub t4: f64,
}

impl FurmanPiviParameters {
    /// Copper fit from the Furman-Pivi paper (their Table II).
    pub fn copper() -> Self {
        FurmanPiviParameters {
            p1_e_inf: 0.02,
            p1_e_hat: 0.496,
            e_e_hat: 0.0,
            w: 60.86,
            p: 1.0,
            e1: 0.26,
            e2: 2.0,
            sigma_e: 2.0,

            p1_r_inf: 0.2,
            e_r: 0.041,
            r: 0.104,
            q: 0.5,
            r1: 0.26,
            r2: 2.0,

            delta_ts_hat: 1.8848,
            e_hat0: 276.8,
            s: 1.54,
            t1: 0.66,
            t2: 0.8,
            t3: 0.7,
            t4: 1.0,
        }
    }

    /// Read a parameter set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse Furman-Pivi parameters: {}", e))
    }

    /// Serialize the parameter set to a JSON string.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self)
            .map_err(|e| format!("Failed to serialize Furman-Pivi parameters: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copper_constants() {
        let cu = FurmanPiviParameters::copper();
        assert_eq!(cu.p1_e_inf, 0.02);
        assert_eq!(cu.p1_e_hat, 0.496);
        assert_eq!(cu.w, 60.86);
        assert_eq!(cu.delta_ts_hat, 1.8848);
        assert_eq!(cu.e_hat0, 276.8);
        assert_eq!(cu.s, 1.54);
    }

    #[test]
    fn test_json_round_trip() {
        let cu = FurmanPiviParameters::copper();
        let json = cu.to_json().unwrap();
        let back = FurmanPiviParameters::from_json(&json).unwrap();
        assert_eq!(cu, back);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(FurmanPiviParameters::from_json("{not json").is_err());
    }
}

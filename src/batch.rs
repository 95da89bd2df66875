// Macro-particle impact batches
//
// All per-impact quantities are stored as parallel arrays of the same
// length; element i of every array describes the same impact.

/// One batch of simultaneous wall impacts.
///
/// `segment` carries the wall-segment index of each impact when the
/// chamber geometry is segmented; `None` otherwise. `v_normal` is the
/// velocity component along the wall normal, kept for specular-reflection
/// treatments of the backscattered group.
#[derive(Debug, Clone)]
pub struct ImpactBatch {
    /// Charge weight (number of electrons per macro-particle)
    pub nel: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub vz: Vec<f64>,
    /// Inward wall normal at the impact point (chamber cross-section)
    pub norm_x: Vec<f64>,
    pub norm_y: Vec<f64>,
    /// Wall-segment index per impact, when the chamber is segmented
    pub segment: Option<Vec<usize>>,
    /// Impact velocity component along the wall normal
    pub v_normal: Vec<f64>,
    /// Impact kinetic energy in eV
    pub energy_ev: Vec<f64>,
    /// Cosine of the incidence angle, in [0, 1]
    pub costheta: Vec<f64>,
}

impl ImpactBatch {
    pub fn len(&self) -> usize {
        self.nel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nel.is_empty()
    }

    /// Check that every per-impact array has the same length.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.nel.len();
        let lengths = [
            ("x", self.x.len()),
            ("y", self.y.len()),
            ("z", self.z.len()),
            ("vx", self.vx.len()),
            ("vy", self.vy.len()),
            ("vz", self.vz.len()),
            ("norm_x", self.norm_x.len()),
            ("norm_y", self.norm_y.len()),
            ("v_normal", self.v_normal.len()),
            ("energy_ev", self.energy_ev.len()),
            ("costheta", self.costheta.len()),
        ];
        for (name, len) in lengths {
            if len != n {
                return Err(format!(
                    "Impact batch field '{}' has length {} but 'nel' has length {}",
                    name, len, n
                ));
            }
        }
        if let Some(seg) = &self.segment {
            if seg.len() != n {
                return Err(format!(
                    "Impact batch field 'segment' has length {} but 'nel' has length {}",
                    seg.len(),
                    n
                ));
            }
        }
        Ok(())
    }
}

/// Outgoing macro-particle attribute arrays.
///
/// Used both for in-place replacements of the impacting macro-particles
/// and for the freshly cloned ones. Always well-formed: when no particle
/// was produced the arrays are present and empty, so callers can
/// concatenate unconditionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroParticleArrays {
    pub nel: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub vz: Vec<f64>,
    pub segment: Option<Vec<usize>>,
}

impl MacroParticleArrays {
    /// Empty arrays, with an empty segment array when the batch tracks
    /// segments.
    pub fn empty(track_segments: bool) -> Self {
        MacroParticleArrays {
            segment: track_segments.then(Vec::new),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.nel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nel.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_of(n: usize) -> ImpactBatch {
        ImpactBatch {
            nel: vec![1.0; n],
            x: vec![0.0; n],
            y: vec![0.0; n],
            z: vec![0.0; n],
            vx: vec![0.0; n],
            vy: vec![0.0; n],
            vz: vec![0.0; n],
            norm_x: vec![1.0; n],
            norm_y: vec![0.0; n],
            segment: None,
            v_normal: vec![0.0; n],
            energy_ev: vec![100.0; n],
            costheta: vec![1.0; n],
        }
    }

    #[test]
    fn test_validate_accepts_consistent_batch() {
        assert!(batch_of(5).validate().is_ok());
        assert!(batch_of(0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let mut batch = batch_of(5);
        batch.costheta.pop();
        let err = batch.validate().unwrap_err();
        assert!(err.contains("costheta"), "error was: {}", err);
    }

    #[test]
    fn test_validate_rejects_segment_mismatch() {
        let mut batch = batch_of(5);
        batch.segment = Some(vec![0; 4]);
        let err = batch.validate().unwrap_err();
        assert!(err.contains("segment"), "error was: {}", err);
    }

    #[test]
    fn test_empty_arrays_are_well_formed() {
        let without = MacroParticleArrays::empty(false);
        assert!(without.is_empty());
        assert!(without.segment.is_none());

        let with = MacroParticleArrays::empty(true);
        assert_eq!(with.len(), 0);
        assert_eq!(with.segment, Some(Vec::new()));
    }
}

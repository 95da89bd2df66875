// Bank for cloned macro-particles
//
// True-secondary events above the weight threshold spawn extra
// macro-particles. The bank accumulates their attributes in the same
// parallel-array layout the caller's macro-particle container uses, so a
// finished bank concatenates directly onto the live arrays.

use crate::batch::MacroParticleArrays;

/// Accumulator for macro-particles cloned during particle splitting.
#[derive(Debug, Clone)]
pub struct SecondaryBank {
    nel: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    vx: Vec<f64>,
    vy: Vec<f64>,
    vz: Vec<f64>,
    segment: Option<Vec<usize>>,
}

impl SecondaryBank {
    /// Create an empty bank. `track_segments` controls whether banked
    /// particles carry a wall-segment index.
    pub fn new(track_segments: bool) -> Self {
        Self::with_capacity(track_segments, 0)
    }

    /// Create an empty bank with room for `capacity` particles.
    pub fn with_capacity(track_segments: bool, capacity: usize) -> Self {
        SecondaryBank {
            nel: Vec::with_capacity(capacity),
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            vx: Vec::with_capacity(capacity),
            vy: Vec::with_capacity(capacity),
            vz: Vec::with_capacity(capacity),
            segment: track_segments.then(|| Vec::with_capacity(capacity)),
        }
    }

    /// Bank one cloned macro-particle.
    #[allow(clippy::too_many_arguments)]
    pub fn bank_secondary(
        &mut self,
        nel: f64,
        x: f64,
        y: f64,
        z: f64,
        vx: f64,
        vy: f64,
        vz: f64,
        segment: Option<usize>,
    ) {
        self.nel.push(nel);
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
        self.vx.push(vx);
        self.vy.push(vy);
        self.vz.push(vz);
        if let Some(seg) = &mut self.segment {
            debug_assert!(segment.is_some(), "segment-tracking bank needs a segment");
            seg.push(segment.unwrap_or(0));
        }
    }

    pub fn len(&self) -> usize {
        self.nel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nel.is_empty()
    }

    pub fn clear(&mut self) {
        self.nel.clear();
        self.x.clear();
        self.y.clear();
        self.z.clear();
        self.vx.clear();
        self.vy.clear();
        self.vz.clear();
        if let Some(seg) = &mut self.segment {
            seg.clear();
        }
    }

    /// Finish the bank into plain attribute arrays. Empty banks yield
    /// present-but-empty arrays.
    pub fn into_arrays(self) -> MacroParticleArrays {
        MacroParticleArrays {
            nel: self.nel,
            x: self.x,
            y: self.y,
            z: self.z,
            vx: self.vx,
            vy: self.vy,
            vz: self.vz,
            segment: self.segment,
        }
    }
}

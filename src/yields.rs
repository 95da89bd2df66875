// Furman-Pivi yield curves
//
// The three emission yields as functions of impact energy and incidence
// angle. Pure functions of the material parameter set; no randomness.

use crate::parameters::FurmanPiviParameters;

impl FurmanPiviParameters {
    /// Backscattered (elastically scattered) yield, Eq. (25) with the
    /// angular factor of Eq. (47a).
    pub fn delta_e(&self, energy_ev: f64, costheta: f64) -> f64 {
        let exp_factor = -((energy_ev - self.e_e_hat).abs() / self.w).powf(self.p) / self.p;
        let delta_e0 = self.p1_e_inf + (self.p1_e_hat - self.p1_e_inf) * exp_factor.exp();
        let angular_factor = 1.0 + self.e1 * (1.0 - costheta.powf(self.e2));
        delta_e0 * angular_factor
    }

    /// Rediffused yield, Eq. (28) with the angular factor of Eq. (47b).
    pub fn delta_r(&self, energy_ev: f64, costheta: f64) -> f64 {
        let exp_factor = -(energy_ev / self.e_r).powf(self.r);
        let delta_r0 = self.p1_r_inf * (1.0 - exp_factor.exp());
        let angular_factor = 1.0 + self.r1 * (1.0 - costheta.powf(self.r2));
        delta_r0 * angular_factor
    }

    /// True-secondary yield, Eq. (31) with the angular factors of
    /// Eqs. (48a) and (48b).
    pub fn delta_ts(&self, energy_ev: f64, costheta: f64) -> f64 {
        let e_hat = self.e_hat0 * (1.0 + self.t3 * (1.0 - costheta.powf(self.t4)));
        let delta_ts0 = self.delta_ts_hat * self.yield_shape(energy_ev / e_hat);
        let angular_factor = 1.0 + self.t1 * (1.0 - costheta.powf(self.t2));
        delta_ts0 * angular_factor
    }

    /// Universal yield-curve shape D(x) = s x / (s - 1 + x^s), Eq. (32).
    /// D(0) = 0 and D(1) = 1.
    pub fn yield_shape(&self, x: f64) -> f64 {
        self.s * x / (self.s - 1.0 + x.powf(self.s))
    }

    /// All three yields for a single impact.
    pub fn yields(&self, energy_ev: f64, costheta: f64) -> (f64, f64, f64) {
        (
            self.delta_e(energy_ev, costheta),
            self.delta_r(energy_ev, costheta),
            self.delta_ts(energy_ev, costheta),
        )
    }

    /// Element-wise yields over a batch of impacts.
    pub fn yields_batch(
        &self,
        energy_ev: &[f64],
        costheta: &[f64],
    ) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        debug_assert_eq!(energy_ev.len(), costheta.len());
        let n = energy_ev.len();
        let mut delta_e = Vec::with_capacity(n);
        let mut delta_r = Vec::with_capacity(n);
        let mut delta_ts = Vec::with_capacity(n);
        for (&e, &ct) in energy_ev.iter().zip(costheta.iter()) {
            delta_e.push(self.delta_e(e, ct));
            delta_r.push(self.delta_r(e, ct));
            delta_ts.push(self.delta_ts(e, ct));
        }
        (delta_e, delta_r, delta_ts)
    }
}

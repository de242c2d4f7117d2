//! Four-momentum arithmetic

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, AddAssign};

/// Cartesian four-momentum (px, py, pz, E)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct P4 {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub energy: f64,
}

impl P4 {
    pub fn new(px: f64, py: f64, pz: f64, energy: f64) -> Self {
        Self { px, py, pz, energy }
    }

    /// Build from (pt, eta, phi, mass)
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let p2 = px * px + py * py + pz * pz;
        let energy = (p2 + mass * mass).sqrt();
        Self { px, py, pz, energy }
    }

    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Magnitude of the three-momentum
    pub fn p(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }

    /// Pseudorapidity. Purely longitudinal momenta map to +/- infinity.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            return if self.pz == 0.0 {
                0.0
            } else {
                self.pz.signum() * f64::INFINITY
            };
        }
        (self.pz / pt).asinh()
    }

    pub fn phi(&self) -> f64 {
        if self.px == 0.0 && self.py == 0.0 {
            0.0
        } else {
            self.py.atan2(self.px)
        }
    }

    /// Invariant mass; negative m^2 from rounding is reported as -sqrt(|m^2|)
    pub fn mass(&self) -> f64 {
        let m2 = self.energy * self.energy - self.p() * self.p();
        if m2 >= 0.0 {
            m2.sqrt()
        } else {
            -(-m2).sqrt()
        }
    }

    /// Angular distance in (eta, phi)
    pub fn delta_r(&self, other: &P4) -> f64 {
        let deta = self.eta() - other.eta();
        let dphi = delta_phi(self.phi(), other.phi());
        deta.hypot(dphi)
    }
}

/// Phi difference wrapped into [-pi, pi]
pub fn delta_phi(a: f64, b: f64) -> f64 {
    let mut d = a - b;
    while d > PI {
        d -= 2.0 * PI;
    }
    while d < -PI {
        d += 2.0 * PI;
    }
    d
}

impl Add for P4 {
    type Output = P4;

    fn add(self, rhs: P4) -> P4 {
        P4 {
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
            energy: self.energy + rhs.energy,
        }
    }
}

impl AddAssign for P4 {
    fn add_assign(&mut self, rhs: P4) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for P4 {
    fn sum<I: Iterator<Item = P4>>(iter: I) -> P4 {
        iter.fold(P4::default(), |acc, p| acc + p)
    }
}

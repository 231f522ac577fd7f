//! Toy 1+1 dimensional fragmentation of a single q-qbar string.
//!
//! The string is split iteratively from both ends in light-cone momentum
//! with the Lund symmetric splitting function. Each step peels one primary
//! hadron off a randomly chosen end; when the leftover string becomes too
//! light it is split into a final hadron pair. Hadron species, masses and
//! the splitting parameters are simplified, so the resulting rapidity
//! plateau widens with the string energy roughly like `ln(E / m)`.

use std::f64::consts::SQRT_2;

use rand::{Rng, SeedableRng as _};
use rand_distr::{Distribution as _, Normal};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::source::{
    Entity, GenerationError, InitializationError, Trial, TrialSource, TrialSourceFactory,
};

/// Status of the original string endpoints after hadronization.
pub const STATUS_PARTON: i32 = -71;
/// Primary hadron split off the `+z` end of the string.
pub const STATUS_PRIMARY_FORWARD: i32 = 83;
/// Primary hadron split off the `-z` end of the string.
pub const STATUS_PRIMARY_BACKWARD: i32 = 84;
/// Product of a primary hadron decay.
pub const STATUS_DECAY_PRODUCT: i32 = 91;

const A_LUND: f64 = 0.68;
const B_LUND: f64 = 0.98;
// Extra invariant mass (GeV) the leftover string must keep above two hadrons
// before another step is attempted.
const STOP_MASS: f64 = 0.8;
const MAX_HADRONS: usize = 10_000;
// Lower bound of `E - pz` when computing the rapidity of a massless endpoint.
const TINY: f64 = 1e-20;

/// Flavour of the string endpoint quark.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quark {
    #[default]
    Down,
    Up,
    Strange,
    Charm,
    Bottom,
}

impl Quark {
    /// PDG particle id.
    #[must_use]
    pub fn id(self) -> i32 {
        match self {
            Self::Down => 1,
            Self::Up => 2,
            Self::Strange => 3,
            Self::Charm => 4,
            Self::Bottom => 5,
        }
    }

    /// Constituent mass in GeV.
    #[must_use]
    pub fn mass(self) -> f64 {
        match self {
            Self::Down | Self::Up => 0.33,
            Self::Strange => 0.5,
            Self::Charm => 1.5,
            Self::Bottom => 4.8,
        }
    }

    fn leading_hadron(self) -> Option<Hadron> {
        match self {
            Self::Down | Self::Up => None,
            Self::Strange => Some(Hadron::Kaon),
            Self::Charm => Some(Hadron::DMeson),
            Self::Bottom => Some(Hadron::BMeson),
        }
    }

    /// Lightest hadron that can carry this quark.
    fn lightest_hadron(self) -> Hadron {
        self.leading_hadron().unwrap_or(Hadron::Pion)
    }
}

impl TryFrom<i32> for Quark {
    type Error = InitializationError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        let quark = match id.abs() {
            1 => Self::Down,
            2 => Self::Up,
            3 => Self::Strange,
            4 => Self::Charm,
            5 => Self::Bottom,
            _ => {
                return Err(InitializationError::new(format!(
                    "unsupported quark id {id}"
                )));
            }
        };
        Ok(quark)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hadron {
    Pion,
    Kaon,
    Rho,
    DMeson,
    BMeson,
}

impl Hadron {
    fn mass(self) -> f64 {
        match self {
            Self::Pion => 0.139_57,
            Self::Kaon => 0.493_68,
            Self::Rho => 0.775_26,
            Self::DMeson => 1.869_66,
            Self::BMeson => 5.279_34,
        }
    }

    /// Draws a hadron made of light quarks.
    fn random_light<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let u: f64 = rng.random();
        if u < 0.6 {
            Self::Pion
        } else if u < 0.75 {
            Self::Kaon
        } else {
            Self::Rho
        }
    }
}

/// Parameters of one string configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringParams {
    /// Invariant mass of the string in GeV.
    pub energy: f64,
    pub quark: Quark,
    /// Treat the endpoint quarks as massless.
    pub massless_quarks: bool,
    /// Width of the transverse momentum of new quark pairs; zero keeps the
    /// event strictly 1+1 dimensional.
    pub pt_sigma: f64,
    /// Let unstable primary hadrons decay.
    pub hadron_decays: bool,
    pub seed: u64,
}

impl Default for StringParams {
    fn default() -> Self {
        Self {
            energy: 20.0,
            quark: Quark::Down,
            massless_quarks: true,
            pt_sigma: 0.0,
            hadron_decays: false,
            seed: 0,
        }
    }
}

/// Factory of [`StringEvents`] sources.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringFragmentation;

impl TrialSourceFactory for StringFragmentation {
    type Params = StringParams;
    type Source = StringEvents;

    fn configure(&self, params: &StringParams) -> Result<StringEvents, InitializationError> {
        StringEvents::new(params)
    }
}

/// Generates fragmentation events of one string configuration.
#[derive(Debug, Clone)]
pub struct StringEvents {
    energy: f64,
    quark: Quark,
    parton_rapidity: f64,
    pt: Option<Normal<f64>>,
    hadron_decays: bool,
    rng: Pcg32,
}

#[derive(Debug, Clone, Copy)]
struct StringEnd {
    /// Remaining light-cone momentum along this end's direction.
    momentum: f64,
    /// Transverse momentum of the quark currently sitting at the end.
    pt: (f64, f64),
    /// Hadron forced by the original endpoint flavour, until it is used.
    leading: Option<Hadron>,
    status: i32,
}

impl StringEnd {
    fn lightest_mass(&self) -> f64 {
        self.leading.unwrap_or(Hadron::Pion).mass()
    }
}

#[derive(Debug, Clone, Copy)]
struct Primary {
    hadron: Hadron,
    status: i32,
    rapidity: f64,
}

impl StringEvents {
    /// Sets up a source; fails if the string cannot produce two hadrons.
    pub fn new(params: &StringParams) -> Result<Self, InitializationError> {
        let energy = params.energy;
        if !energy.is_finite() || energy <= 0.0 {
            return Err(InitializationError::new(format!(
                "string energy must be positive and finite, got {energy}"
            )));
        }
        if !params.pt_sigma.is_finite() || params.pt_sigma < 0.0 {
            return Err(InitializationError::new(format!(
                "transverse momentum width must be non-negative, got {}",
                params.pt_sigma
            )));
        }
        let threshold = 2.0 * params.quark.lightest_hadron().mass();
        if energy <= threshold {
            return Err(InitializationError::new(format!(
                "string energy {energy} GeV is below the two-hadron threshold {threshold:.3} GeV"
            )));
        }

        let pt = if params.pt_sigma > 0.0 {
            let normal = Normal::new(0.0, params.pt_sigma / SQRT_2)
                .map_err(|e| InitializationError::new(e.to_string()))?;
            Some(normal)
        } else {
            None
        };

        // Each endpoint carries half the string energy along the z axis.
        let quark_mass = if params.massless_quarks {
            0.0
        } else {
            params.quark.mass()
        };
        let half = energy / 2.0;
        let pz = (half * half - quark_mass * quark_mass).max(0.0).sqrt();
        let parton_rapidity = 0.5 * ((half + pz) / (half - pz).max(TINY)).ln();

        Ok(Self {
            energy,
            quark: params.quark,
            parton_rapidity,
            pt,
            hadron_decays: params.hadron_decays,
            rng: Pcg32::seed_from_u64(params.seed),
        })
    }

    fn fragment(&mut self) -> Result<Vec<Primary>, GenerationError> {
        let leading = self.quark.leading_hadron();
        let mut forward = StringEnd {
            momentum: self.energy,
            pt: (0.0, 0.0),
            leading,
            status: STATUS_PRIMARY_FORWARD,
        };
        let mut backward = StringEnd {
            momentum: self.energy,
            pt: (0.0, 0.0),
            leading,
            status: STATUS_PRIMARY_BACKWARD,
        };
        // Hadrons from the backward end are collected separately and appended
        // in reverse, so the list is ordered along the string.
        let mut front = Vec::new();
        let mut back = Vec::new();

        loop {
            if front.len() + back.len() > MAX_HADRONS {
                return Err(GenerationError::new(format!(
                    "fragmentation did not terminate within {MAX_HADRONS} hadrons"
                )));
            }
            let remaining = (forward.momentum * backward.momentum).sqrt();
            let minimum = forward.lightest_mass() + backward.lightest_mass();
            if remaining < minimum + STOP_MASS {
                break;
            }

            let from_forward = self.rng.random_bool(0.5);
            let (end, other) = if from_forward {
                (&mut forward, &mut backward)
            } else {
                (&mut backward, &mut forward)
            };
            let hadron = end
                .leading
                .unwrap_or_else(|| Hadron::random_light(&mut self.rng));
            let (new_pt, hadron_pt) = break_pt(self.pt.as_ref(), &mut self.rng, end.pt);
            let mt2 = hadron.mass().powi(2) + hadron_pt.0.powi(2) + hadron_pt.1.powi(2);

            let z = sample_lund_z(&mut self.rng, mt2);
            let along = z * end.momentum;
            let against = mt2 / along;
            let left_along = end.momentum - along;
            let left_against = other.momentum - against;
            let next_minimum = Hadron::Pion.mass() + other.lightest_mass();
            if left_against <= 0.0 || left_along * left_against < next_minimum.powi(2) {
                // Not enough string left for this hadron; close the string.
                break;
            }

            end.momentum = left_along;
            end.pt = new_pt;
            end.leading = None;
            other.momentum = left_against;

            // Rapidity along the end's own direction.
            let y = 0.5 * (along / against).ln();
            let primary = Primary {
                hadron,
                status: end.status,
                rapidity: if from_forward { y } else { -y },
            };
            if from_forward {
                front.push(primary);
            } else {
                back.push(primary);
            }
        }

        let (last_forward, last_backward) = self.final_pair(&forward, &backward)?;
        front.push(last_forward);
        back.push(last_backward);
        front.extend(back.into_iter().rev());
        Ok(front)
    }

    /// Splits the leftover string into two hadrons in its rest frame.
    fn final_pair(
        &mut self,
        forward: &StringEnd,
        backward: &StringEnd,
    ) -> Result<(Primary, Primary), GenerationError> {
        let mass2 = forward.momentum * backward.momentum;
        let mass = mass2.sqrt();
        let pick = |end: &StringEnd, rng: &mut Pcg32| {
            end.leading.unwrap_or_else(|| Hadron::random_light(rng))
        };
        let mut first = pick(forward, &mut self.rng);
        let mut second = pick(backward, &mut self.rng);
        if first.mass() + second.mass() > mass {
            first = forward.leading.unwrap_or(Hadron::Pion);
            second = backward.leading.unwrap_or(Hadron::Pion);
        }
        let (m1, m2) = (first.mass(), second.mass());
        if m1 + m2 > mass {
            return Err(GenerationError::new(format!(
                "leftover string mass {mass:.3} GeV cannot form two hadrons"
            )));
        }

        let momentum =
            ((mass2 - (m1 + m2).powi(2)) * (mass2 - (m1 - m2).powi(2))).max(0.0).sqrt()
                / (2.0 * mass);
        let centre = 0.5 * (forward.momentum / backward.momentum).ln();
        Ok((
            Primary {
                hadron: first,
                status: forward.status,
                rapidity: centre + (momentum / m1).asinh(),
            },
            Primary {
                hadron: second,
                status: backward.status,
                rapidity: centre - (momentum / m2).asinh(),
            },
        ))
    }

    /// Rapidities of the two pions from a rho decay, isotropic in its rest
    /// frame and boosted along the string axis.
    fn decay_rho(&mut self, rapidity: f64) -> [f64; 2] {
        let half = Hadron::Rho.mass() / 2.0;
        let pion = Hadron::Pion.mass();
        let momentum = (half * half - pion * pion).sqrt();
        let cos_theta: f64 = self.rng.random_range(-1.0..=1.0);
        let pz = momentum * cos_theta;
        let y = 0.5 * ((half + pz) / (half - pz)).ln();
        [rapidity + y, rapidity - y]
    }
}

impl TrialSource for StringEvents {
    fn generate_trial(&mut self) -> Result<Trial, GenerationError> {
        let primaries = self.fragment()?;
        let mut trial = Trial::default();
        trial.push(Entity::new(STATUS_PARTON, self.parton_rapidity));
        trial.push(Entity::new(STATUS_PARTON, -self.parton_rapidity));
        for primary in primaries {
            if self.hadron_decays && primary.hadron == Hadron::Rho {
                trial.push(Entity::new(-primary.status, primary.rapidity));
                for y in self.decay_rho(primary.rapidity) {
                    trial.push(Entity::new(STATUS_DECAY_PRODUCT, y));
                }
            } else {
                trial.push(Entity::new(primary.status, primary.rapidity));
            }
        }
        Ok(trial)
    }
}

/// Transverse momenta of a string break: the new quark left at the string
/// end, and the hadron formed with the previous end quark.
fn break_pt<R>(
    normal: Option<&Normal<f64>>,
    rng: &mut R,
    end_pt: (f64, f64),
) -> ((f64, f64), (f64, f64))
where
    R: Rng + ?Sized,
{
    let Some(normal) = normal else {
        return ((0.0, 0.0), end_pt);
    };
    let new = (normal.sample(rng), normal.sample(rng));
    (new, (end_pt.0 - new.0, end_pt.1 - new.1))
}

/// Samples `z` from `f(z) = (1 - z)^a / z * exp(-b mT² / z)` by rejection
/// against its maximum.
fn sample_lund_z<R>(rng: &mut R, mt2: f64) -> f64
where
    R: Rng + ?Sized,
{
    let c = B_LUND * mt2;
    let z_max = if (A_LUND - 1.0).abs() < 1e-6 {
        c / (1.0 + c)
    } else {
        let d = 1.0 - A_LUND;
        ((1.0 + c) - ((1.0 + c).powi(2) - 4.0 * d * c).sqrt()) / (2.0 * d)
    };
    let log_f = |z: f64| A_LUND * (1.0 - z).ln() - z.ln() - c / z;
    let log_f_max = log_f(z_max);
    loop {
        let z: f64 = rng.random();
        if z <= 0.0 || z >= 1.0 {
            continue;
        }
        let accept: f64 = rng.random();
        if accept.ln() <= log_f(z) - log_f_max {
            return z;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;

    use super::*;
    use crate::selection::{EntitySelector as _, StatusRange};

    fn source(energy: f64) -> StringEvents {
        StringEvents::new(&StringParams {
            energy,
            seed: 42,
            ..StringParams::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_configurations() {
        let configure = |params: StringParams| StringFragmentation.configure(&params);
        assert!(configure(StringParams {
            energy: 0.0,
            ..StringParams::default()
        })
        .is_err());
        assert!(configure(StringParams {
            energy: f64::NAN,
            ..StringParams::default()
        })
        .is_err());
        assert!(configure(StringParams {
            pt_sigma: -0.1,
            ..StringParams::default()
        })
        .is_err());
        assert!(configure(StringParams {
            energy: 0.25,
            ..StringParams::default()
        })
        .is_err());
        assert!(configure(StringParams {
            energy: 8.0,
            quark: Quark::Bottom,
            ..StringParams::default()
        })
        .is_err());
    }

    #[test]
    fn test_every_trial_has_partons_and_primaries() {
        let mut events = source(20.0);
        for _ in 0..200 {
            let trial = events.generate_trial().unwrap();
            let partons = trial.entities().filter(|e| e.status == STATUS_PARTON).count();
            let primaries = trial
                .entities()
                .filter(|e| StatusRange::PRIMARY_HADRONS.accepts(e))
                .count();
            assert_eq!(partons, 2);
            assert!(primaries >= 2);
        }
    }

    #[test]
    fn test_primaries_stay_within_kinematic_limit() {
        let energy = 20.0;
        let limit = (energy / Hadron::Pion.mass()).ln();
        let mut events = source(energy);
        for _ in 0..200 {
            for entity in events.generate_trial().unwrap().entities() {
                if StatusRange::PRIMARY_HADRONS.contains(entity.status) {
                    assert!(entity.rapidity.is_finite());
                    assert!(entity.rapidity.abs() < limit, "{}", entity.rapidity);
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_events() {
        let mut a = source(100.0);
        let mut b = source(100.0);
        for _ in 0..20 {
            assert_eq!(a.generate_trial().unwrap(), b.generate_trial().unwrap());
        }
    }

    #[test]
    fn test_multiplicity_grows_with_energy() {
        let mean_primaries = |energy: f64| {
            let mut events = source(energy);
            let total: usize = (0..500)
                .map(|_| {
                    events
                        .generate_trial()
                        .unwrap()
                        .entities()
                        .filter(|e| StatusRange::PRIMARY_HADRONS.accepts(e))
                        .count()
                })
                .sum();
            total / 500
        };
        assert!(mean_primaries(5.0) < mean_primaries(100.0));
    }

    #[test]
    fn test_decays_replace_rho_with_pions() {
        let mut events = StringEvents::new(&StringParams {
            energy: 50.0,
            hadron_decays: true,
            seed: 3,
            ..StringParams::default()
        })
        .unwrap();
        let mut decayed = 0;
        let mut products = 0;
        for _ in 0..200 {
            for entity in events.generate_trial().unwrap().entities() {
                if [-STATUS_PRIMARY_FORWARD, -STATUS_PRIMARY_BACKWARD].contains(&entity.status) {
                    decayed += 1;
                }
                if entity.status == STATUS_DECAY_PRODUCT {
                    products += 1;
                }
            }
        }
        assert!(decayed > 0);
        assert_eq!(products, 2 * decayed);
    }

    #[test]
    fn test_massive_quark_endpoints() {
        let massless = source(20.0).parton_rapidity;
        let massive = StringEvents::new(&StringParams {
            energy: 20.0,
            massless_quarks: false,
            ..StringParams::default()
        })
        .unwrap()
        .parton_rapidity;
        assert!(massive < massless);
        assert!(massive > 0.0);
    }

    #[test]
    fn test_transverse_momentum_keeps_events_valid() {
        let mut events = StringEvents::new(&StringParams {
            energy: 20.0,
            pt_sigma: 0.36,
            seed: 11,
            ..StringParams::default()
        })
        .unwrap();
        for _ in 0..200 {
            let trial = events.generate_trial().unwrap();
            assert!(trial.entities().all(|e| e.rapidity.is_finite()));
        }
    }

    #[test]
    fn test_lund_z_in_unit_interval() {
        let mut rng = Pcg32::seed_from_u64(1);
        for mt2 in [0.02, 0.3, 4.0] {
            for _ in 0..100 {
                let z = sample_lund_z(&mut rng, mt2);
                assert!(z > 0.0 && z < 1.0);
            }
        }
    }

    #[test]
    fn test_quark_ids() {
        assert_eq!(Quark::try_from(1), Ok(Quark::Down));
        assert_eq!(Quark::try_from(-3), Ok(Quark::Strange));
        assert!(Quark::try_from(6).is_err());
        assert_eq!(Quark::Charm.id(), 4);
    }
}

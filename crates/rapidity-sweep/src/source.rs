use serde::{Deserialize, Serialize};

/// One outgoing particle of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Generator status code; primary hadrons are `81..=89`.
    pub status: i32,
    pub rapidity: f64,
}

impl Entity {
    #[must_use]
    pub fn new(status: i32, rapidity: f64) -> Self {
        Self { status, rapidity }
    }
}

/// The entities produced by one simulated event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trial {
    entities: Vec<Entity>,
}

impl Trial {
    #[must_use]
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<Entity> for Trial {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("trial source initialization failed: {reason}")]
pub struct InitializationError {
    pub reason: String,
}

impl InitializationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("trial generation failed: {reason}")]
pub struct GenerationError {
    pub reason: String,
}

impl GenerationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A configured event generator producing one trial per call.
///
/// A source is created for exactly one configuration and is only used by the
/// thread that created it.
pub trait TrialSource {
    fn generate_trial(&mut self) -> Result<Trial, GenerationError>;
}

impl<S> TrialSource for Box<S>
where
    S: TrialSource + ?Sized,
{
    fn generate_trial(&mut self) -> Result<Trial, GenerationError> {
        (**self).generate_trial()
    }
}

/// Creates a fresh [`TrialSource`] for each configuration.
///
/// Factories are shared between worker threads, so configuring must not need
/// exclusive access.
pub trait TrialSourceFactory: Sync {
    /// Per-configuration parameters, such as the string energy.
    type Params;
    type Source: TrialSource;

    fn configure(&self, params: &Self::Params) -> Result<Self::Source, InitializationError>;
}

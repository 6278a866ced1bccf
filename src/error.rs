use thiserror::Error;

/// Everything the engine can reject.
///
/// Operations that fail leave the session untouched: no timer is started, no
/// body is moved and nothing is clamped on the caller's behalf.
#[derive(Debug, Error)]
pub enum SimError {
    /// A numeric input (speed, period, radius, field size...) is out of range.
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A start or placement position lies outside the field.
    #[error("position ({x:.2}, {y:.2}) lies outside the {width}x{height} field")]
    OutOfBounds {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    /// A closed path needs at least two vertices.
    #[error("a closed path needs at least 2 vertices, got {0}")]
    TooFewVertices(usize),

    /// The entity is not a body of this session.
    #[error("no body {0:?} in this session")]
    UnknownBody(hecs::Entity),

    /// The entity already carries a body.
    #[error("body {0:?} is already spawned")]
    AlreadySpawned(hecs::Entity),

    /// The operation does not apply to this kind of body.
    #[error("body {entity:?} is a {kind}, expected a {expected}")]
    WrongKind {
        entity: hecs::Entity,
        kind: &'static str,
        expected: &'static str,
    },

    /// Orbit centers must form an acyclic chain.
    #[error("orbiting {center:?} would make {orbiter:?} depend on itself")]
    DependencyCycle {
        orbiter: hecs::Entity,
        center: hecs::Entity,
    },

    /// The operation is only allowed while the session is stopped.
    #[error("the session is running; stop it first")]
    Running,

    /// A config file refers to a body name that was never declared.
    #[error("unknown body name `{0}`")]
    UnknownName(String),

    /// Two bodies in one config share a name.
    #[error("duplicate body name `{0}`")]
    DuplicateName(String),

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Reject anything that is not a finite, strictly positive number.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::invalid(
            name,
            format!("must be a positive number, got {value}"),
        ))
    }
}

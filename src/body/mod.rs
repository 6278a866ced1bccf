pub mod anchor;
pub mod evasion;
pub mod mover;
pub mod orbiter;
pub mod pursuer;
pub mod walker;

use glam::DVec2;

use crate::geometry::Field;

pub use anchor::Anchor;
pub use evasion::Evasion;
pub use mover::FreeMover;
pub use orbiter::Orbiter;
pub use pursuer::Pursuer;
pub use walker::PathWalker;

/// Everything a body may look at while taking one step.
///
/// The field is passed in rather than held by the body, and the partner's
/// position (pursuit target, orbit center, evasion threat) is resolved by the
/// caller before the step.
pub struct StepContext<'a> {
    pub field: Field,
    pub partner: Option<DVec2>,
    pub rng: &'a mut fastrand::Rng,
}

/// A simulated moving entity.
pub trait Body {
    /// Advance one discrete tick.
    fn step(&mut self, ctx: &mut StepContext<'_>);

    fn position(&self) -> DVec2;

    /// Return to the initial state (position, heading, counters).
    fn reset(&mut self);

    /// Direction of travel in degrees, for bodies that have one.
    fn heading(&self) -> Option<f64> {
        None
    }

    /// The other body this one reads each tick.
    fn partner(&self) -> Option<hecs::Entity> {
        None
    }

    /// Called once when the scheduler starts running.
    fn on_start(&mut self, _rng: &mut fastrand::Rng) {}

    /// Re-derive position from the partner without advancing (orbiters).
    fn settle(&mut self, _partner: Option<DVec2>) {}
}

/// Which variant a body is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Anchor,
    PathWalker,
    FreeMover,
    Pursuer,
    Orbiter,
}

impl BodyKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Anchor => "anchor",
            Self::PathWalker => "path walker",
            Self::FreeMover => "free mover",
            Self::Pursuer => "pursuer",
            Self::Orbiter => "orbiter",
        }
    }
}

/// The body component stored on every entity of a session.
#[derive(Debug, Clone)]
pub enum Motion {
    Anchor(Anchor),
    PathWalker(PathWalker),
    FreeMover(FreeMover),
    Pursuer(Pursuer),
    Orbiter(Orbiter),
}

impl Motion {
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Anchor(_) => BodyKind::Anchor,
            Self::PathWalker(_) => BodyKind::PathWalker,
            Self::FreeMover(_) => BodyKind::FreeMover,
            Self::Pursuer(_) => BodyKind::Pursuer,
            Self::Orbiter(_) => BodyKind::Orbiter,
        }
    }

    /// Laps completed, for path walkers.
    pub fn laps(&self) -> Option<u32> {
        match self {
            Self::PathWalker(w) => Some(w.laps()),
            _ => None,
        }
    }

    /// Orbit center; the only relation that must stay acyclic.
    pub fn orbit_center(&self) -> Option<hecs::Entity> {
        match self {
            Self::Orbiter(o) => Some(o.center()),
            _ => None,
        }
    }

    fn as_body(&self) -> &dyn Body {
        match self {
            Self::Anchor(b) => b,
            Self::PathWalker(b) => b,
            Self::FreeMover(b) => b,
            Self::Pursuer(b) => b,
            Self::Orbiter(b) => b,
        }
    }

    fn as_body_mut(&mut self) -> &mut dyn Body {
        match self {
            Self::Anchor(b) => b,
            Self::PathWalker(b) => b,
            Self::FreeMover(b) => b,
            Self::Pursuer(b) => b,
            Self::Orbiter(b) => b,
        }
    }
}

impl Body for Motion {
    fn step(&mut self, ctx: &mut StepContext<'_>) {
        self.as_body_mut().step(ctx);
    }

    fn position(&self) -> DVec2 {
        self.as_body().position()
    }

    fn reset(&mut self) {
        self.as_body_mut().reset();
    }

    fn heading(&self) -> Option<f64> {
        self.as_body().heading()
    }

    fn partner(&self) -> Option<hecs::Entity> {
        self.as_body().partner()
    }

    fn on_start(&mut self, rng: &mut fastrand::Rng) {
        self.as_body_mut().on_start(rng);
    }

    fn settle(&mut self, partner: Option<DVec2>) {
        self.as_body_mut().settle(partner);
    }
}

impl From<Anchor> for Motion {
    fn from(b: Anchor) -> Self {
        Self::Anchor(b)
    }
}

impl From<PathWalker> for Motion {
    fn from(b: PathWalker) -> Self {
        Self::PathWalker(b)
    }
}

impl From<FreeMover> for Motion {
    fn from(b: FreeMover) -> Self {
        Self::FreeMover(b)
    }
}

impl From<Pursuer> for Motion {
    fn from(b: Pursuer) -> Self {
        Self::Pursuer(b)
    }
}

impl From<Orbiter> for Motion {
    fn from(b: Orbiter) -> Self {
        Self::Orbiter(b)
    }
}

use glam::DVec2;

/// Euclidean distance between two body positions.
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Touching counts: a distance equal to the threshold is a collision.
pub fn has_collided(distance: f64, threshold: f64) -> bool {
    distance <= threshold
}

/// A condition that halts a running session once it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop when the two bodies are within the session's collision threshold.
    Collision { a: hecs::Entity, b: hecs::Entity },
    /// Stop when the path walker has completed `laps` laps.
    Laps { walker: hecs::Entity, laps: u32 },
}

impl Termination {
    /// Does a tick of `entity` make this rule worth re-checking?
    pub fn involves(&self, entity: hecs::Entity) -> bool {
        match *self {
            Self::Collision { a, b } => a == entity || b == entity,
            Self::Laps { walker, .. } => walker == entity,
        }
    }
}

/// Why a session went from running to stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopReason {
    /// The caller toggled or stopped it.
    Paused,
    /// `reset()` was called while running.
    Reset,
    /// Two watched bodies came within the threshold.
    Collision {
        a: hecs::Entity,
        b: hecs::Entity,
        distance: f64,
    },
    /// A walker finished its laps.
    LapsCompleted { walker: hecs::Entity, laps: u32 },
}

impl StopReason {
    /// Stops the engine caused itself, as opposed to caller requests.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Collision { .. } | Self::LapsCompleted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean() {
        assert_eq!(distance(DVec2::new(0.0, 0.0), DVec2::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(DVec2::new(-1.0, 2.0), DVec2::new(-1.0, 2.0)), 0.0);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(has_collided(50.0, 50.0));
        assert!(has_collided(49.9, 50.0));
        assert!(!has_collided(50.01, 50.0));
        assert!(has_collided(0.5, 1.0));
        assert!(!has_collided(10.5, 10.0));
    }

    #[test]
    fn rule_involvement() {
        let mut world = hecs::World::new();
        let cat = world.spawn(());
        let mouse = world.spawn(());
        let walker = world.spawn(());
        let catch = Termination::Collision { a: cat, b: mouse };
        assert!(catch.involves(cat) && catch.involves(mouse));
        assert!(!catch.involves(walker));
        let lap = Termination::Laps { walker, laps: 1 };
        assert!(lap.involves(walker) && !lap.involves(cat));
    }
}

use std::time::Duration;

use glam::{DVec2, IVec2};

use crate::body::{Body, BodyKind, Motion};
use crate::ecs::components::{Label, Trail};
use crate::geometry::Field;

/// What a render sink gets to draw, once per refresh tick.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Refresh ticks since the session was created.
    pub index: u64,
    /// Session clock when the frame was taken.
    pub clock: Duration,
    pub field: Field,
    pub bodies: Vec<BodySnapshot>,
    /// Static curve drawn behind the bodies (the sine plot), if any.
    pub backdrop: Vec<IVec2>,
}

impl Frame {
    pub fn body(&self, entity: hecs::Entity) -> Option<&BodySnapshot> {
        self.bodies.iter().find(|b| b.entity == entity)
    }

    pub fn by_label(&self, label: &str) -> Option<&BodySnapshot> {
        self.bodies.iter().find(|b| b.label == label)
    }
}

/// Copy of one body's numbers at refresh time.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySnapshot {
    pub entity: hecs::Entity,
    pub label: String,
    pub kind: BodyKind,
    pub position: DVec2,
    pub heading: Option<f64>,
    /// Laps completed, for path walkers.
    pub laps: Option<u32>,
    /// Distance to the partner body (target, center or threat).
    pub partner_distance: Option<f64>,
    /// Polygon a path walker follows.
    pub outline: Option<Vec<IVec2>>,
    /// Oldest to newest recent positions; empty unless trails are on.
    pub trail: Vec<DVec2>,
}

impl BodySnapshot {
    /// Build a snapshot from ECS components.
    pub fn from_components(
        entity: hecs::Entity,
        motion: &Motion,
        label: Option<&Label>,
        trail: Option<&Trail>,
        partner_pos: Option<DVec2>,
    ) -> Self {
        let position = motion.position();
        let outline = match motion {
            Motion::PathWalker(walker) => Some(walker.path().vertices().to_vec()),
            _ => None,
        };

        Self {
            entity,
            label: label.map(|l| l.0.clone()).unwrap_or_default(),
            kind: motion.kind(),
            position,
            heading: motion.heading(),
            laps: motion.laps(),
            partner_distance: partner_pos.map(|p| position.distance(p)),
            outline,
            trail: trail.map(|t| t.0.to_vec()).unwrap_or_default(),
        }
    }
}

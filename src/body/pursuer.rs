use glam::DVec2;

use super::{Body, StepContext};

/// Steps straight toward a target body every tick (the cat).
///
/// Each tick covers `stride` units along the line to the target. Within one
/// stride of the target the step overshoots and the pursuer may hop back and
/// forth across it; sessions stop on a collision threshold well above that.
#[derive(Debug, Clone)]
pub struct Pursuer {
    pos: DVec2,
    start: DVec2,
    target: hecs::Entity,
    stride: f64,
}

impl Pursuer {
    pub fn new(pos: DVec2, target: hecs::Entity) -> Self {
        Self {
            pos,
            start: pos,
            target,
            stride: 1.0,
        }
    }

    /// Distance covered per tick instead of one unit.
    pub fn with_stride(mut self, stride: f64) -> Self {
        self.stride = stride;
        self
    }

    pub fn stride(&self) -> f64 {
        self.stride
    }

    pub fn target(&self) -> hecs::Entity {
        self.target
    }

    pub fn set_target(&mut self, target: hecs::Entity) {
        self.target = target;
    }

    pub fn place(&mut self, pos: DVec2) {
        self.pos = pos;
        self.start = pos;
    }
}

/// Next position one `stride` toward `target`, or `None` when already on it.
pub fn pursue(from: DVec2, target: DVec2, stride: f64) -> Option<DVec2> {
    let offset = target - from;
    let length = offset.length();
    if length == 0.0 || !length.is_finite() {
        return None;
    }
    Some(from + offset / length * stride)
}

impl Body for Pursuer {
    fn step(&mut self, ctx: &mut StepContext<'_>) {
        let Some(target) = ctx.partner else {
            return;
        };
        if let Some(next) = pursue(self.pos, target, self.stride) {
            self.pos = next;
        }
    }

    fn position(&self) -> DVec2 {
        self.pos
    }

    fn reset(&mut self) {
        self.pos = self.start;
    }

    fn partner(&self) -> Option<hecs::Entity> {
        Some(self.target)
    }
}

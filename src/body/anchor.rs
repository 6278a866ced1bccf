use glam::DVec2;

use super::{Body, StepContext};

/// A body that never moves: the sun, or a mouse pinned in place.
#[derive(Debug, Clone)]
pub struct Anchor {
    pos: DVec2,
    start: DVec2,
}

impl Anchor {
    pub fn new(pos: DVec2) -> Self {
        Self { pos, start: pos }
    }

    pub fn place(&mut self, pos: DVec2) {
        self.pos = pos;
        self.start = pos;
    }
}

impl Body for Anchor {
    fn step(&mut self, _ctx: &mut StepContext<'_>) {}

    fn position(&self) -> DVec2 {
        self.pos
    }

    fn reset(&mut self) {
        self.pos = self.start;
    }
}

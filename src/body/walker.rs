use glam::DVec2;

use super::{Body, StepContext};
use crate::geometry::ClosedPath;

/// Walks a closed path one lattice point per tick.
///
/// State is (segment, cursor): the cursor indexes the next point of the
/// current segment. When a segment runs out the walker moves on to the next
/// one; wrapping from the last segment back to segment 0 counts a lap. Laps
/// never stop the walker by themselves.
#[derive(Debug, Clone)]
pub struct PathWalker {
    path: ClosedPath,
    segment: usize,
    cursor: usize,
    laps: u32,
    pos: DVec2,
}

impl PathWalker {
    pub fn new(path: ClosedPath) -> Self {
        let pos = path.start().as_dvec2();
        Self {
            path,
            segment: 0,
            cursor: 0,
            laps: 0,
            pos,
        }
    }

    pub fn path(&self) -> &ClosedPath {
        &self.path
    }

    pub fn segment(&self) -> usize {
        self.segment
    }

    pub fn laps(&self) -> u32 {
        self.laps
    }

    /// Forget completed laps but keep the current position and cursor.
    pub fn clear_laps(&mut self) {
        self.laps = 0;
    }

    /// Swap in a new path and restart at its first vertex.
    pub fn set_path(&mut self, path: ClosedPath) {
        self.path = path;
        self.reset();
    }
}

impl Body for PathWalker {
    fn step(&mut self, _ctx: &mut StepContext<'_>) {
        if self.cursor >= self.path.segment(self.segment).len() {
            self.cursor = 0;
            self.segment += 1;
            if self.segment == self.path.segment_count() {
                self.segment = 0;
                self.laps += 1;
            }
        }
        self.pos = self.path.segment(self.segment)[self.cursor].as_dvec2();
        self.cursor += 1;
    }

    fn position(&self) -> DVec2 {
        self.pos
    }

    fn reset(&mut self) {
        self.segment = 0;
        self.cursor = 0;
        self.laps = 0;
        self.pos = self.path.start().as_dvec2();
    }
}

pub mod frame;

use crate::geometry::Field;

pub use frame::{BodySnapshot, Frame};

/// Draws frames. Implemented by whatever owns the canvas.
///
/// Called on the dispatch thread with the session locked, so it must not call
/// back into the session or runner.
pub trait RenderSink {
    fn render(&mut self, frame: &Frame);
}

impl<F: FnMut(&Frame)> RenderSink for F {
    fn render(&mut self, frame: &Frame) {
        self(frame)
    }
}

/// Pushes one tracked body's numbers back out to a display.
pub type StateCallback = Box<dyn FnMut(&BodySnapshot, &Field) + Send>;

/// Callbacks for one running stretch of a session; dropped when it stops.
#[derive(Default)]
pub struct Hooks {
    pub(crate) render: Option<Box<dyn RenderSink + Send>>,
    pub(crate) state: Option<StateCallback>,
}

impl Hooks {
    pub fn new(sink: impl RenderSink + Send + 'static) -> Self {
        Self {
            render: Some(Box::new(sink)),
            state: None,
        }
    }

    /// No drawing at all; refresh ticks still fire.
    pub fn headless() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, callback: impl FnMut(&BodySnapshot, &Field) + Send + 'static) -> Self {
        self.state = Some(Box::new(callback));
        self
    }

    pub(crate) fn deliver(&mut self, frame: &Frame, tracked: &[hecs::Entity]) {
        if let Some(sink) = &mut self.render {
            sink.render(frame);
        }
        if let Some(state) = &mut self.state {
            for body in frame.bodies.iter().filter(|b| tracked.contains(&b.entity)) {
                state(body, &frame.field);
            }
        }
    }
}

/// Render sink that writes frames to the log instead of a canvas.
pub struct LogSink {
    every: u64,
}

impl LogSink {
    /// Log one frame out of every `every` (at least 1).
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl RenderSink for LogSink {
    fn render(&mut self, frame: &Frame) {
        if frame.index % self.every != 0 {
            return;
        }
        for body in &frame.bodies {
            let screen = frame.field.to_screen(body.position);
            log::debug!(
                "frame {} | {:<10} ({:>8.2}, {:>8.2}) screen ({:>7.1}, {:>7.1}){}{}",
                frame.index,
                body.label,
                body.position.x,
                body.position.y,
                screen.x,
                screen.y,
                body.heading
                    .map(|h| format!(" heading {h:.1}°"))
                    .unwrap_or_default(),
                body.partner_distance
                    .map(|d| format!(" dist {d:.2}"))
                    .unwrap_or_default(),
            );
        }
    }
}

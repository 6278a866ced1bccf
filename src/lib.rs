//! Discrete-time 2D motion on a bounded field.
//!
//! Bodies (path walkers, ricochet movers, pursuers, orbiters, anchors) live in
//! a [`Session`] and advance one step per tick of their own repeating timer. A
//! refresh timer hands [`Frame`] snapshots to a render sink, and termination
//! rules (collision, completed laps) stop the session from inside a tick.
//!
//! [`Session::advance`] drives the timers deterministically; [`Runner`] does
//! the same against the wall clock on a dispatch thread.

pub mod body;
pub mod collision;
pub mod config;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod render;
pub mod util;

pub use body::{Anchor, Body, BodyKind, FreeMover, Motion, Orbiter, PathWalker, Pursuer};
pub use collision::{StopReason, Termination};
pub use config::{Preset, SessionConfig};
pub use engine::{BodySpec, RunState, Runner, Session, TickPlan};
pub use error::SimError;
pub use geometry::{ClosedPath, Field};
pub use render::{BodySnapshot, Frame, Hooks, LogSink, RenderSink};

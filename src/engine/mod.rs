pub mod runner;
pub mod session;

pub use runner::Runner;
pub use session::{speed_to_period, BodySpec, RunState, Session, TickPlan};

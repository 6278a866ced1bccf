use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use instant::Instant;

use super::session::{RunState, Session, TickPlan};
use crate::error::SimError;
use crate::render::Hooks;

/// Longest stretch of wall time handed to the session in one go.
/// A stalled dispatch thread slows the simulation down instead of bursting.
const MAX_CATCH_UP: Duration = Duration::from_millis(250);
/// How long the dispatch thread sleeps when nothing is scheduled.
const IDLE_WAIT: Duration = Duration::from_millis(50);
/// How often to log refresh statistics (seconds).
const STATS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Refresh timing
// ---------------------------------------------------------------------------

struct RefreshStats {
    frame_count: u64,
    last_log_time: Instant,
    interval_sum: f64,
    interval_min: f64,
    interval_max: f64,
    frames_since_log: u64,
}

impl RefreshStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            interval_sum: 0.0,
            interval_min: f64::MAX,
            interval_max: 0.0,
            frames_since_log: 0,
        }
    }

    /// `frames` refresh ticks ran over `dt` seconds of wall time.
    fn record(&mut self, frames: u64, dt: f64) {
        let per_frame = dt / frames as f64;
        self.frame_count += frames;
        self.frames_since_log += frames;
        self.interval_sum += dt;
        self.interval_min = self.interval_min.min(per_frame);
        self.interval_max = self.interval_max.max(per_frame);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= STATS_LOG_INTERVAL {
            let avg_ms = (self.interval_sum / self.frames_since_log as f64) * 1000.0;
            let fps = self.frames_since_log as f64 / elapsed;
            log::info!(
                "Refresh: {:.0}/s | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.interval_min * 1000.0,
                self.interval_max * 1000.0,
                self.frame_count,
            );
            self.last_log_time = Instant::now();
            self.interval_sum = 0.0;
            self.interval_min = f64::MAX;
            self.interval_max = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

struct Shared {
    session: Mutex<Session>,
    wake: Condvar,
}

/// Drives a [`Session`] in real time on one dispatch thread.
///
/// Every body tick and refresh tick runs on that thread with the session
/// locked. Control calls are serialized by their own lock, and once
/// [`Runner::stop`] returns no further tick runs.
pub struct Runner {
    shared: Arc<Shared>,
    /// Control lock; holds the dispatch thread while one is alive.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Runner {
    pub fn new(session: Session) -> Self {
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                wake: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Start if stopped, stop if running.
    pub fn toggle(&self, plan: TickPlan, hooks: Hooks) -> Result<RunState, SimError> {
        let mut worker = lock(&self.worker);
        let state = lock(&self.shared.session).toggle(plan, hooks)?;
        match state {
            RunState::Running => {
                join(worker.take());
                let shared = Arc::clone(&self.shared);
                let spawned = std::thread::Builder::new()
                    .name("motionfield-dispatch".into())
                    .spawn(move || dispatch(&shared));
                match spawned {
                    Ok(handle) => *worker = Some(handle),
                    Err(e) => {
                        lock(&self.shared.session).stop();
                        return Err(e.into());
                    }
                }
            }
            RunState::Stopped => {
                self.shared.wake.notify_all();
                join(worker.take());
            }
        }
        Ok(state)
    }

    /// Stop and wait for the dispatch thread. No-op when stopped.
    pub fn stop(&self) {
        let mut worker = lock(&self.worker);
        lock(&self.shared.session).stop();
        self.shared.wake.notify_all();
        join(worker.take());
    }

    /// Stop, then restore every body.
    pub fn reset(&self) {
        let mut worker = lock(&self.worker);
        lock(&self.shared.session).reset();
        self.shared.wake.notify_all();
        join(worker.take());
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared.session).is_running()
    }

    /// Run `f` with the session locked. The dispatch thread re-reads its
    /// deadlines afterwards.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let out = f(&mut lock(&self.shared.session));
        self.shared.wake.notify_all();
        out
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn dispatch(shared: &Shared) {
    let mut stats = RefreshStats::new();
    let mut last = Instant::now();
    let mut last_frame = last;
    let mut session = lock(&shared.session);

    while session.is_running() {
        let now = Instant::now();
        let dt = (now - last).min(MAX_CATCH_UP);
        last = now;

        let frames_before = session.frames();
        if let Some(reason) = session.advance(dt) {
            log::debug!("Dispatch thread exiting after {reason:?}");
            break;
        }
        let produced = session.frames() - frames_before;
        if produced > 0 {
            stats.record(produced, (now - last_frame).as_secs_f64());
            last_frame = now;
        }

        let wait = session.until_next_event().unwrap_or(IDLE_WAIT);
        session = match shared.wake.wait_timeout(session, wait) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        };
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn join(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        if handle.join().is_err() {
            log::error!("Dispatch thread panicked");
        }
    }
}

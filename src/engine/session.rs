use std::time::Duration;

use glam::{DVec2, IVec2};

use crate::body::{Body, Motion};
use crate::collision::{distance, StopReason, Termination};
use crate::ecs::components::{Label, Ticker, Tracked, Trail};
use crate::ecs::systems::{self, movement, snapshot};
use crate::error::{require_positive, SimError};
use crate::geometry::{random_rhombus, ClosedPath, Field};
use crate::render::{Frame, Hooks};
use crate::util::ring::RingBuffer;

/// Refresh timer rate when nothing else is configured.
pub const DEFAULT_REFRESH_HZ: f64 = 120.0;
/// Body timer period when a [`BodySpec`] does not set one.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(10);

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

/// Tick period for a speed in field units per second (one unit per tick).
pub fn speed_to_period(speed: f64) -> Result<Duration, SimError> {
    let speed = require_positive("speed", speed)?;
    let period = Duration::try_from_secs_f64(1.0 / speed)
        .map_err(|_| SimError::invalid("speed", format!("{speed} is too slow to schedule")))?;
    if period.is_zero() {
        return Err(SimError::invalid("speed", format!("{speed} is too fast to schedule")));
    }
    Ok(period)
}

/// Everything needed to put one body into a session.
#[derive(Debug, Clone)]
pub struct BodySpec {
    pub motion: Motion,
    pub label: Option<String>,
    pub period: Duration,
    pub tracked: bool,
    /// Recent positions to keep; 0 disables the trail.
    pub trail: usize,
}

impl BodySpec {
    pub fn new(motion: impl Into<Motion>) -> Self {
        Self {
            motion: motion.into(),
            label: None,
            period: DEFAULT_TICK_PERIOD,
            tracked: false,
            trail: 0,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn tracked(mut self) -> Self {
        self.tracked = true;
        self
    }

    pub fn trail(mut self, len: usize) -> Self {
        self.trail = len;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Rate {
    Period(Duration),
    Speed(f64),
}

/// Per-body tick rates applied when a session starts.
///
/// Bodies not mentioned keep the period they already have. Everything is
/// validated before any timer starts.
#[derive(Debug, Clone, Default)]
pub struct TickPlan {
    rates: Vec<(hecs::Entity, Rate)>,
}

impl TickPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period(mut self, entity: hecs::Entity, period: Duration) -> Self {
        self.rates.push((entity, Rate::Period(period)));
        self
    }

    /// Speed in units per second; the period becomes `1 / speed` seconds.
    pub fn speed(mut self, entity: hecs::Entity, speed: f64) -> Self {
        self.rates.push((entity, Rate::Speed(speed)));
        self
    }

    fn resolve(&self, world: &hecs::World) -> Result<Vec<(hecs::Entity, Duration)>, SimError> {
        self.rates
            .iter()
            .map(|&(entity, rate)| {
                if world.get::<&Ticker>(entity).is_err() {
                    return Err(SimError::UnknownBody(entity));
                }
                let period = match rate {
                    Rate::Period(p) if p.is_zero() => {
                        return Err(SimError::invalid("tick period", "must be longer than zero"))
                    }
                    Rate::Period(p) => p,
                    Rate::Speed(s) => speed_to_period(s)?,
                };
                Ok((entity, period))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Body(hecs::Entity),
    Refresh,
}

/// Bodies, field, timers and termination rules for one run.
///
/// Time only moves through [`Session::advance`], so the session is fully
/// deterministic: the real-time [`Runner`](super::Runner) feeds it wall-clock
/// deltas, tests feed it whatever they like.
pub struct Session {
    world: hecs::World,
    /// Spawn order; ties between timers fire in this order.
    order: Vec<hecs::Entity>,
    field: Field,
    collision_threshold: f64,
    rules: Vec<Termination>,
    refresh: Ticker,
    clock: Duration,
    state: RunState,
    hooks: Option<Hooks>,
    rng: fastrand::Rng,
    last_stop: Option<StopReason>,
    frame_index: u64,
    backdrop: Vec<IVec2>,
}

impl Session {
    pub fn new(field: Field, collision_threshold: f64) -> Result<Self, SimError> {
        if !(collision_threshold.is_finite() && collision_threshold >= 0.0) {
            return Err(SimError::invalid(
                "collision threshold",
                format!("must be a non-negative number, got {collision_threshold}"),
            ));
        }
        Ok(Self {
            world: hecs::World::new(),
            order: Vec::new(),
            field,
            collision_threshold,
            rules: Vec::new(),
            refresh: Ticker::new(Duration::from_secs_f64(1.0 / DEFAULT_REFRESH_HZ)),
            clock: Duration::ZERO,
            state: RunState::Stopped,
            hooks: None,
            rng: fastrand::Rng::new(),
            last_stop: None,
            frame_index: 0,
            backdrop: Vec::new(),
        })
    }

    /// A stopped session holding `bodies`, spawned in order.
    ///
    /// Bodies that refer to each other need handles before they exist; build
    /// those with [`Session::reserve`] and [`Session::spawn_as`] instead.
    pub fn create(
        field: Field,
        bodies: impl IntoIterator<Item = BodySpec>,
        collision_threshold: f64,
    ) -> Result<(Self, Vec<hecs::Entity>), SimError> {
        let mut session = Self::new(field, collision_threshold)?;
        let entities = bodies
            .into_iter()
            .map(|spec| session.spawn(spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((session, entities))
    }

    /// Make random choices (evasive turns, random rhombi) repeatable.
    pub fn seed(&mut self, seed: u64) {
        self.rng = fastrand::Rng::with_seed(seed);
    }

    pub fn set_refresh_rate(&mut self, hz: f64) -> Result<(), SimError> {
        let hz = require_positive("refresh rate", hz)?;
        let period = Duration::try_from_secs_f64(1.0 / hz)
            .ok()
            .filter(|p| !p.is_zero())
            .ok_or_else(|| SimError::invalid("refresh rate", format!("{hz} Hz cannot be scheduled")))?;
        self.refresh.period = period;
        Ok(())
    }

    pub fn set_backdrop(&mut self, points: Vec<IVec2>) {
        self.backdrop = points;
    }

    // -----------------------------------------------------------------------
    // Bodies
    // -----------------------------------------------------------------------

    /// A handle for a body that will be spawned later with [`Session::spawn_as`].
    ///
    /// Lets two bodies refer to each other (the cat chases the mouse, the
    /// mouse evades the cat).
    pub fn reserve(&self) -> hecs::Entity {
        self.world.reserve_entity()
    }

    pub fn spawn(&mut self, spec: BodySpec) -> Result<hecs::Entity, SimError> {
        let entity = self.reserve();
        self.spawn_as(entity, spec)
    }

    /// Spawn a body under a handle from [`Session::reserve`].
    pub fn spawn_as(&mut self, entity: hecs::Entity, spec: BodySpec) -> Result<hecs::Entity, SimError> {
        self.require_stopped()?;
        if self.world.get::<&Motion>(entity).is_ok() {
            log::warn!("Rejected second spawn of {entity:?}");
            return Err(SimError::AlreadySpawned(entity));
        }
        if spec.period.is_zero() {
            return Err(SimError::invalid("tick period", "must be longer than zero"));
        }
        self.validate_motion(entity, &spec.motion)?;

        let label = spec.label.clone();
        self.world
            .insert(entity, (spec.motion, Ticker::new(spec.period)))
            .map_err(|_| SimError::UnknownBody(entity))?;
        if let Some(name) = spec.label {
            let _ = self.world.insert_one(entity, Label(name));
        }
        if spec.tracked {
            let _ = self.world.insert_one(entity, Tracked);
        }
        if spec.trail > 0 {
            let _ = self.world.insert_one(entity, Trail(RingBuffer::new(spec.trail)));
        }
        self.order.push(entity);
        movement::settle_orbits(&mut self.world, &self.order);

        log::info!(
            "Spawned {} {:?} at {:?}",
            label.as_deref().unwrap_or("body"),
            entity,
            movement::position_of(&self.world, entity).unwrap_or_default()
        );
        Ok(entity)
    }

    /// Bodies in spawn order.
    pub fn bodies(&self) -> &[hecs::Entity] {
        &self.order
    }

    /// First body with this label.
    pub fn find(&self, label: &str) -> Option<hecs::Entity> {
        self.order.iter().copied().find(|&e| {
            self.world
                .get::<&Label>(e)
                .is_ok_and(|l| l.0 == label)
        })
    }

    pub fn position(&self, entity: hecs::Entity) -> Result<DVec2, SimError> {
        movement::position_of(&self.world, entity).ok_or(SimError::UnknownBody(entity))
    }

    pub fn heading(&self, entity: hecs::Entity) -> Result<Option<f64>, SimError> {
        Ok(self.motion(entity)?.heading())
    }

    pub fn laps(&self, entity: hecs::Entity) -> Result<Option<u32>, SimError> {
        Ok(self.motion(entity)?.laps())
    }

    /// Euclidean distance between two bodies.
    pub fn distance(&self, a: hecs::Entity, b: hecs::Entity) -> Result<f64, SimError> {
        Ok(distance(self.position(a)?, self.position(b)?))
    }

    /// Change a mover's heading; also the heading restored on reset.
    pub fn set_heading(&mut self, entity: hecs::Entity, heading: f64) -> Result<(), SimError> {
        if !heading.is_finite() {
            return Err(SimError::invalid("heading", format!("must be finite, got {heading}")));
        }
        match &mut *self.motion_mut(entity)? {
            Motion::FreeMover(mover) => {
                mover.set_heading(heading);
                Ok(())
            }
            other => Err(wrong_kind(entity, other, "free mover")),
        }
    }

    /// Move a body's start position (and the body) while stopped.
    pub fn place(&mut self, entity: hecs::Entity, pos: DVec2) -> Result<(), SimError> {
        self.require_stopped()?;
        let pos = self.field.check(pos)?;
        match &mut *self.motion_mut(entity)? {
            Motion::Anchor(anchor) => anchor.place(pos),
            Motion::FreeMover(mover) => mover.place(pos),
            Motion::Pursuer(pursuer) => pursuer.place(pos),
            other => return Err(wrong_kind(entity, other, "anchor, free mover or pursuer")),
        }
        movement::settle_orbits(&mut self.world, &self.order);
        Ok(())
    }

    /// Swap a walker's path while stopped; the walker restarts at the new first vertex.
    pub fn set_path(&mut self, entity: hecs::Entity, path: ClosedPath) -> Result<(), SimError> {
        self.require_stopped()?;
        self.field.check_vertices(path.vertices())?;
        match &mut *self.motion_mut(entity)? {
            Motion::PathWalker(walker) => {
                walker.set_path(path);
                Ok(())
            }
            other => Err(wrong_kind(entity, other, "path walker")),
        }
    }

    /// Give a walker a fresh random rhombus with coordinates in `[min, min + span)`.
    pub fn randomize_path(
        &mut self,
        entity: hecs::Entity,
        min: i32,
        span: i32,
    ) -> Result<[IVec2; 4], SimError> {
        self.require_stopped()?;
        let vertices = random_rhombus(&mut self.rng, min, span)?;
        self.field.check_vertices(&vertices)?;
        self.set_path(entity, ClosedPath::new(&vertices)?)?;
        log::info!("New random rhombus {vertices:?}");
        Ok(vertices)
    }

    /// Point an orbiter at a new center; rejects anything that closes a loop.
    pub fn set_orbit_center(
        &mut self,
        orbiter: hecs::Entity,
        center: hecs::Entity,
    ) -> Result<(), SimError> {
        self.require_stopped()?;
        self.motion(center)?;
        {
            let motion = self.motion(orbiter)?;
            if !matches!(*motion, Motion::Orbiter(_)) {
                return Err(wrong_kind(orbiter, &motion, "orbiter"));
            }
        }
        self.check_orbit(orbiter, center)?;
        if let Motion::Orbiter(o) = &mut *self.motion_mut(orbiter)? {
            o.set_center(center);
        }
        movement::settle_orbits(&mut self.world, &self.order);
        Ok(())
    }

    pub fn set_period(&mut self, entity: hecs::Entity, period: Duration) -> Result<(), SimError> {
        if period.is_zero() {
            return Err(SimError::invalid("tick period", "must be longer than zero"));
        }
        let mut ticker = self
            .world
            .get::<&mut Ticker>(entity)
            .map_err(|_| SimError::UnknownBody(entity))?;
        ticker.period = period;
        Ok(())
    }

    pub fn period(&self, entity: hecs::Entity) -> Result<Duration, SimError> {
        self.world
            .get::<&Ticker>(entity)
            .map(|t| t.period)
            .map_err(|_| SimError::UnknownBody(entity))
    }

    /// Push this body's numbers to the state callback on every refresh.
    pub fn track(&mut self, entity: hecs::Entity) -> Result<(), SimError> {
        self.motion(entity)?;
        let _ = self.world.insert_one(entity, Tracked);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Termination rules
    // -----------------------------------------------------------------------

    pub fn collision_threshold(&self) -> f64 {
        self.collision_threshold
    }

    /// Stop when `a` and `b` come within the collision threshold.
    pub fn watch_collision(&mut self, a: hecs::Entity, b: hecs::Entity) {
        self.rules.push(Termination::Collision { a, b });
    }

    /// Stop when `walker` has done `laps` laps.
    pub fn watch_laps(&mut self, walker: hecs::Entity, laps: u32) {
        self.rules.push(Termination::Laps { walker, laps });
    }

    pub fn rules(&self) -> &[Termination] {
        &self.rules
    }

    // -----------------------------------------------------------------------
    // Scheduler
    // -----------------------------------------------------------------------

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Session time; advances only while running.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn last_stop(&self) -> Option<StopReason> {
        self.last_stop
    }

    /// Refresh ticks since the session was created.
    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    /// Start if stopped, stop if running.
    ///
    /// Starting validates `plan` and the body graph first and fails without
    /// touching any timer. A start that follows a collision resets the bodies;
    /// one that follows a lap stop clears the lap counters.
    pub fn toggle(&mut self, plan: TickPlan, hooks: Hooks) -> Result<RunState, SimError> {
        match self.state {
            RunState::Running => {
                self.stop();
                Ok(RunState::Stopped)
            }
            RunState::Stopped => {
                self.start(plan, hooks)?;
                Ok(RunState::Running)
            }
        }
    }

    /// Cancel every body timer and the refresh timer. No-op when stopped.
    pub fn stop(&mut self) {
        self.halt(StopReason::Paused);
    }

    /// Stop, then put every body back where it started and zero its counters.
    pub fn reset(&mut self) {
        self.halt(StopReason::Reset);
        self.reset_bodies();
        self.last_stop = None;
        log::info!("Session reset ({} bodies)", self.order.len());
    }

    /// Run every timer that falls due within the next `dt` of session time.
    ///
    /// Returns why the session stopped if a termination rule fired.
    pub fn advance(&mut self, dt: Duration) -> Option<StopReason> {
        if self.state != RunState::Running {
            return None;
        }
        let until = self.clock.checked_add(dt).unwrap_or(Duration::MAX);

        while let Some((due, slot)) = self.next_event() {
            if due > until {
                break;
            }
            self.clock = due;
            match slot {
                Slot::Body(entity) => {
                    if let Ok(mut ticker) = self.world.get::<&mut Ticker>(entity) {
                        ticker.rearm();
                    }
                    let stop = systems::tick_body(
                        &mut self.world,
                        entity,
                        self.field,
                        &self.rules,
                        self.collision_threshold,
                        &mut self.rng,
                    );
                    if let Some(reason) = stop {
                        self.halt(reason);
                        return Some(reason);
                    }
                }
                Slot::Refresh => {
                    self.refresh.rearm();
                    self.refresh_tick();
                }
            }
        }

        self.clock = until;
        None
    }

    /// Session time until the next timer fires, if running.
    pub fn until_next_event(&self) -> Option<Duration> {
        if self.state != RunState::Running {
            return None;
        }
        self.next_event()
            .map(|(due, _)| due.saturating_sub(self.clock))
    }

    /// Current state of every body, as a render sink would see it.
    pub fn snapshot(&self) -> Frame {
        let mut bodies = Vec::with_capacity(self.order.len());
        snapshot::rebuild(&self.world, &self.order, &mut bodies);
        Frame {
            index: self.frame_index,
            clock: self.clock,
            field: self.field,
            bodies,
            backdrop: self.backdrop.clone(),
        }
    }

    fn start(&mut self, plan: TickPlan, hooks: Hooks) -> Result<(), SimError> {
        let periods = plan.resolve(&self.world)?;
        self.validate_graph()?;

        match self.last_stop {
            Some(StopReason::Collision { .. }) => self.reset_bodies(),
            Some(StopReason::LapsCompleted { .. }) => {
                for &entity in &self.order {
                    if let Ok(mut motion) = self.world.get::<&mut Motion>(entity) {
                        if let Motion::PathWalker(walker) = &mut *motion {
                            walker.clear_laps();
                        }
                    }
                }
            }
            _ => {}
        }

        for (entity, period) in periods {
            if let Ok(mut ticker) = self.world.get::<&mut Ticker>(entity) {
                ticker.period = period;
            }
        }
        let now = self.clock;
        for (_, ticker) in self.world.query_mut::<&mut Ticker>() {
            ticker.arm(now);
        }
        self.refresh.arm(now);

        for &entity in &self.order {
            if let Ok(mut motion) = self.world.get::<&mut Motion>(entity) {
                motion.on_start(&mut self.rng);
            }
        }

        self.hooks = Some(hooks);
        self.state = RunState::Running;
        self.last_stop = None;
        log::info!(
            "Session started: {} bodies, refresh every {:.2}ms",
            self.order.len(),
            self.refresh.period.as_secs_f64() * 1000.0
        );
        Ok(())
    }

    fn halt(&mut self, reason: StopReason) {
        if self.state != RunState::Running {
            return;
        }
        self.state = RunState::Stopped;
        self.hooks = None;
        self.last_stop = Some(reason);
        match reason {
            StopReason::Collision { distance, .. } => {
                log::info!("Collision at distance {distance:.2}, session stopped")
            }
            StopReason::LapsCompleted { laps, .. } => {
                log::info!("Lap {laps} completed, session stopped")
            }
            StopReason::Paused | StopReason::Reset => log::info!("Session stopped"),
        }
    }

    fn reset_bodies(&mut self) {
        for (_, motion) in self.world.query_mut::<&mut Motion>() {
            motion.reset();
        }
        for (_, trail) in self.world.query_mut::<&mut Trail>() {
            trail.0.clear();
        }
        movement::settle_orbits(&mut self.world, &self.order);
    }

    fn refresh_tick(&mut self) {
        self.frame_index += 1;
        if self.hooks.is_none() {
            return;
        }
        let tracked: Vec<hecs::Entity> = self
            .world
            .query::<&Tracked>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        let frame = self.snapshot();
        if let Some(hooks) = &mut self.hooks {
            hooks.deliver(&frame, &tracked);
        }
    }

    /// Earliest due timer. Bodies win ties against the refresh timer, and
    /// earlier spawns win ties against later ones. A timer pushed out to
    /// `Duration::MAX` never fires.
    fn next_event(&self) -> Option<(Duration, Slot)> {
        let mut best: Option<(Duration, Slot)> = None;
        for &entity in &self.order {
            if let Ok(ticker) = self.world.get::<&Ticker>(entity) {
                if ticker.next_due == Duration::MAX {
                    continue;
                }
                if best.map_or(true, |(due, _)| ticker.next_due < due) {
                    best = Some((ticker.next_due, Slot::Body(entity)));
                }
            }
        }
        let refresh = (self.refresh.next_due != Duration::MAX).then_some(self.refresh.next_due);
        match (best, refresh) {
            (Some((due, _)), Some(refresh)) if due <= refresh => best,
            (None, None) => None,
            (Some(_), None) => best,
            (_, Some(refresh)) => Some((refresh, Slot::Refresh)),
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    fn require_stopped(&self) -> Result<(), SimError> {
        if self.is_running() {
            log::warn!("Rejected change to a running session");
            return Err(SimError::Running);
        }
        Ok(())
    }

    fn motion(&self, entity: hecs::Entity) -> Result<hecs::Ref<'_, Motion>, SimError> {
        self.world
            .get::<&Motion>(entity)
            .map_err(|_| SimError::UnknownBody(entity))
    }

    fn motion_mut(&self, entity: hecs::Entity) -> Result<hecs::RefMut<'_, Motion>, SimError> {
        self.world
            .get::<&mut Motion>(entity)
            .map_err(|_| SimError::UnknownBody(entity))
    }

    fn validate_motion(&self, entity: hecs::Entity, motion: &Motion) -> Result<(), SimError> {
        match motion {
            Motion::Anchor(_) | Motion::FreeMover(_) | Motion::Pursuer(_) => {
                self.field.check(motion.position())?;
            }
            Motion::PathWalker(walker) => self.field.check_vertices(walker.path().vertices())?,
            Motion::Orbiter(_) => {}
        }
        match motion {
            Motion::FreeMover(mover) => {
                let heading = mover.heading().unwrap_or_default();
                if !heading.is_finite() {
                    return Err(SimError::invalid("heading", format!("must be finite, got {heading}")));
                }
            }
            Motion::Pursuer(pursuer) => {
                require_positive("pursuit stride", pursuer.stride())?;
            }
            Motion::Orbiter(orbiter) => {
                require_positive("orbit radius", orbiter.radius())?;
                if !orbiter.angular_step().is_finite() || !orbiter.angle().is_finite() {
                    return Err(SimError::invalid("orbit angle", "must be finite"));
                }
                self.check_orbit(entity, orbiter.center())?;
            }
            Motion::Anchor(_) | Motion::PathWalker(_) => {}
        }
        Ok(())
    }

    fn check_orbit(&self, orbiter: hecs::Entity, center: hecs::Entity) -> Result<(), SimError> {
        let limit = self.order.len() + 1;
        if movement::orbit_chain_reaches(&self.world, center, orbiter, limit) {
            log::warn!("Rejected orbit of {orbiter:?} around {center:?}: dependency cycle");
            return Err(SimError::DependencyCycle { orbiter, center });
        }
        Ok(())
    }

    /// Every partner and watched body exists and no orbit chain loops.
    fn validate_graph(&self) -> Result<(), SimError> {
        for &entity in &self.order {
            let motion = self.motion(entity)?;
            if let Some(partner) = motion.partner() {
                self.motion(partner)?;
            }
            if let Some(center) = motion.orbit_center() {
                let limit = self.order.len() + 1;
                if movement::orbit_chain_reaches(&self.world, center, entity, limit) {
                    return Err(SimError::DependencyCycle {
                        orbiter: entity,
                        center,
                    });
                }
            }
        }
        for rule in &self.rules {
            match *rule {
                Termination::Collision { a, b } => {
                    self.motion(a)?;
                    self.motion(b)?;
                }
                Termination::Laps { walker, .. } => {
                    self.motion(walker)?;
                }
            }
        }
        Ok(())
    }
}

fn wrong_kind(entity: hecs::Entity, motion: &Motion, expected: &'static str) -> SimError {
    SimError::WrongKind {
        entity,
        kind: motion.kind().label(),
        expected,
    }
}

//! Session descriptions: TOML files and the built-in presets.
//!
//! A [`SessionConfig`] names its bodies, so pursuit targets, orbit centers and
//! evasion threats can be written as plain strings. [`SessionConfig::build`]
//! resolves the names to entities and spawns everything into a stopped
//! [`Session`].
//!
//! ```toml
//! collision_threshold = 50.0
//!
//! [field]
//! width = 1000.0
//! height = 750.0
//!
//! [[bodies]]
//! name = "mouse"
//! kind = "mover"
//! at = [500.0, 375.0]
//! heading = 0.0
//! evade = "cat"
//!
//! [[bodies]]
//! name = "cat"
//! kind = "pursuer"
//! at = [60.0, 725.0]
//! target = "mouse"
//! speed = 80.0
//!
//! [[watch]]
//! rule = "collision"
//! a = "cat"
//! b = "mouse"
//! ```

use std::collections::HashMap;
use std::path::Path;

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::body::{Anchor, FreeMover, Motion, Orbiter, PathWalker, Pursuer};
use crate::engine::session::{speed_to_period, BodySpec, Session, DEFAULT_REFRESH_HZ};
use crate::error::SimError;
use crate::geometry::{field_diamond, ClosedPath, Field, SineWave};

/// Body speed in units per second when a config leaves it out.
pub const DEFAULT_SPEED: f64 = 100.0;

fn default_refresh_hz() -> f64 {
    DEFAULT_REFRESH_HZ
}

fn default_speed() -> f64 {
    DEFAULT_SPEED
}

fn default_stride() -> f64 {
    1.0
}

/// Everything needed to build a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub field: Field,
    #[serde(default)]
    pub collision_threshold: f64,
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: f64,
    /// Fixed seed for evasive turns and random paths.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Recent positions kept per body; 0 turns trails off.
    #[serde(default)]
    pub trail: usize,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
    #[serde(default)]
    pub watch: Vec<WatchConfig>,
    #[serde(default)]
    pub backdrop: Option<SineWave>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyConfig {
    pub name: String,
    /// Units per second; one tick moves one unit (or one degree for orbiters).
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Report this body to the state callback.
    #[serde(default)]
    pub track: bool,
    #[serde(flatten)]
    pub motion: MotionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionConfig {
    Anchor {
        at: [f64; 2],
    },
    Walker {
        path: PathConfig,
    },
    Mover {
        at: [f64; 2],
        heading: f64,
        /// Name of the body to run away from.
        #[serde(default)]
        evade: Option<String>,
    },
    Pursuer {
        at: [f64; 2],
        target: String,
        #[serde(default = "default_stride")]
        stride: f64,
    },
    Orbiter {
        center: String,
        radius: f64,
        /// Degrees per tick.
        step: f64,
        #[serde(default)]
        start_angle: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PathConfig {
    /// Corners at 10% and 90% of the field.
    Diamond,
    /// Random rhombus with coordinates in `[min, min + span)`.
    Random { min: i32, span: i32 },
    Vertices { points: Vec<[i32; 2]> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum WatchConfig {
    Collision { a: String, b: String },
    Laps { walker: String, laps: u32 },
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, SimError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded {} bodies from {}", config.bodies.len(), path.display());
        Ok(config)
    }

    /// Spawn every body into a new, stopped session.
    ///
    /// Returns the session and the entity behind each body name.
    pub fn build(&self) -> Result<(Session, HashMap<String, hecs::Entity>), SimError> {
        let field = Field::new(self.field.width, self.field.height)?;
        let mut session = Session::new(field, self.collision_threshold)?;
        session.set_refresh_rate(self.refresh_hz)?;
        if let Some(seed) = self.seed {
            session.seed(seed);
        }

        // Reserve first so bodies can name anything, declared earlier or later.
        let mut names = HashMap::with_capacity(self.bodies.len());
        for body in &self.bodies {
            if names.insert(body.name.clone(), session.reserve()).is_some() {
                return Err(SimError::DuplicateName(body.name.clone()));
            }
        }
        let resolve = |name: &str| {
            names
                .get(name)
                .copied()
                .ok_or_else(|| SimError::UnknownName(name.to_string()))
        };

        let mut random_paths = Vec::new();
        for body in &self.bodies {
            let entity = resolve(&body.name)?;
            let motion: Motion = match &body.motion {
                MotionConfig::Anchor { at } => Anchor::new(point(*at)).into(),
                MotionConfig::Walker { path } => {
                    let vertices = match path {
                        PathConfig::Diamond => field_diamond(&field).to_vec(),
                        PathConfig::Random { min, span } => {
                            random_paths.push((entity, *min, *span));
                            field_diamond(&field).to_vec()
                        }
                        PathConfig::Vertices { points } => {
                            points.iter().map(|&[x, y]| IVec2::new(x, y)).collect()
                        }
                    };
                    field.check_vertices(&vertices)?;
                    PathWalker::new(ClosedPath::new(&vertices)?).into()
                }
                MotionConfig::Mover { at, heading, evade } => {
                    let mover = FreeMover::new(point(*at), *heading);
                    match evade {
                        Some(threat) => mover.evading(resolve(threat)?).into(),
                        None => mover.into(),
                    }
                }
                MotionConfig::Pursuer { at, target, stride } => {
                    Pursuer::new(point(*at), resolve(target)?)
                        .with_stride(*stride)
                        .into()
                }
                MotionConfig::Orbiter {
                    center,
                    radius,
                    step,
                    start_angle,
                } => Orbiter::new(resolve(center)?, DVec2::ZERO, *radius, *step, *start_angle).into(),
            };

            let mut spec = BodySpec::new(motion)
                .label(body.name.clone())
                .period(speed_to_period(body.speed)?)
                .trail(self.trail);
            if body.track {
                spec = spec.tracked();
            }
            session.spawn_as(entity, spec)?;
        }

        for (walker, min, span) in random_paths {
            session.randomize_path(walker, min, span)?;
        }

        for watch in &self.watch {
            match watch {
                WatchConfig::Collision { a, b } => session.watch_collision(resolve(a)?, resolve(b)?),
                WatchConfig::Laps { walker, laps } => session.watch_laps(resolve(walker)?, *laps),
            }
        }

        if let Some(wave) = &self.backdrop {
            session.set_backdrop(wave.sample(field.width));
        }

        Ok((session, names))
    }
}

fn point([x, y]: [f64; 2]) -> DVec2 {
    DVec2::new(x, y)
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Diamond,
    RandomDiamond,
    Ricochet,
    CatMouse,
    CatMouseEvasive,
    SineWave,
    Solar,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Diamond,
        Preset::RandomDiamond,
        Preset::Ricochet,
        Preset::CatMouse,
        Preset::CatMouseEvasive,
        Preset::SineWave,
        Preset::Solar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Preset::Diamond => "diamond",
            Preset::RandomDiamond => "random-diamond",
            Preset::Ricochet => "ricochet",
            Preset::CatMouse => "cat-mouse",
            Preset::CatMouseEvasive => "cat-mouse-evasive",
            Preset::SineWave => "sine-wave",
            Preset::Solar => "solar",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Preset::Diamond => Preset::RandomDiamond,
            Preset::RandomDiamond => Preset::Ricochet,
            Preset::Ricochet => Preset::CatMouse,
            Preset::CatMouse => Preset::CatMouseEvasive,
            Preset::CatMouseEvasive => Preset::SineWave,
            Preset::SineWave => Preset::Solar,
            Preset::Solar => Preset::Diamond,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }

    pub fn config(self) -> SessionConfig {
        match self {
            Preset::Diamond => walker_scene(PathConfig::Diamond),
            Preset::RandomDiamond => walker_scene(PathConfig::Random { min: 25, span: 450 }),
            Preset::Ricochet => SessionConfig {
                bodies: vec![body(
                    "ball",
                    DEFAULT_SPEED,
                    MotionConfig::Mover {
                        at: [500.0, 400.0],
                        heading: 30.0,
                        evade: None,
                    },
                )],
                ..scene(1000.0, 800.0, 1.0)
            },
            Preset::CatMouse => chase_scene(None),
            Preset::CatMouseEvasive => chase_scene(Some("cat")),
            Preset::SineWave => SessionConfig {
                backdrop: Some(SineWave {
                    amplitude: 200.0,
                    degrees_per_unit: 4.0,
                    baseline: 250,
                }),
                ..chase_scene(Some("cat"))
            },
            Preset::Solar => {
                let orbit = |name: &str, center: &str, radius: f64, step: f64, speed: f64| {
                    body(
                        name,
                        speed,
                        MotionConfig::Orbiter {
                            center: center.to_string(),
                            radius,
                            step,
                            start_angle: 0.0,
                        },
                    )
                };
                SessionConfig {
                    bodies: vec![
                        body("sun", DEFAULT_SPEED, MotionConfig::Anchor { at: [375.0, 375.0] }),
                        orbit("earth", "sun", 185.0, 0.58, 25.0),
                        orbit("mars", "sun", 300.0, 0.5, 25.0),
                        orbit("moon", "earth", 25.0, 1.0, 50.0),
                        orbit("mercury", "sun", 50.0, 1.5, 25.0),
                        orbit("venus", "sun", 120.0, 0.75, 25.0),
                    ],
                    ..scene(750.0, 750.0, 0.0)
                }
            }
        }
    }
}

fn scene(width: f64, height: f64, collision_threshold: f64) -> SessionConfig {
    SessionConfig {
        field: Field { width, height },
        collision_threshold,
        refresh_hz: DEFAULT_REFRESH_HZ,
        seed: None,
        trail: 0,
        bodies: Vec::new(),
        watch: Vec::new(),
        backdrop: None,
    }
}

fn body(name: &str, speed: f64, motion: MotionConfig) -> BodyConfig {
    BodyConfig {
        name: name.to_string(),
        speed,
        track: true,
        motion,
    }
}

fn walker_scene(path: PathConfig) -> SessionConfig {
    SessionConfig {
        bodies: vec![body("dot", DEFAULT_SPEED, MotionConfig::Walker { path })],
        watch: vec![WatchConfig::Laps {
            walker: "dot".to_string(),
            laps: 1,
        }],
        ..scene(500.0, 500.0, 1.0)
    }
}

fn chase_scene(evade: Option<&str>) -> SessionConfig {
    SessionConfig {
        bodies: vec![
            body(
                "mouse",
                DEFAULT_SPEED,
                MotionConfig::Mover {
                    at: [500.0, 375.0],
                    heading: 0.0,
                    evade: evade.map(str::to_string),
                },
            ),
            body(
                "cat",
                80.0,
                MotionConfig::Pursuer {
                    at: [60.0, 725.0],
                    target: "mouse".to_string(),
                    stride: 1.0,
                },
            ),
        ],
        watch: vec![WatchConfig::Collision {
            a: "cat".to_string(),
            b: "mouse".to_string(),
        }],
        ..scene(1000.0, 750.0, 50.0)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::body::BodyKind;
    use crate::engine::TickPlan;
    use crate::render::Hooks;

    #[test]
    fn every_preset_builds() {
        for preset in Preset::ALL {
            let (session, names) = preset
                .config()
                .build()
                .unwrap_or_else(|e| panic!("{} failed: {e}", preset.label()));
            assert_eq!(session.bodies().len(), names.len(), "{}", preset.label());
            assert_eq!(Preset::from_label(preset.label()), Some(preset));
        }
    }

    #[test]
    fn next_cycles_through_all() {
        let mut preset = Preset::Diamond;
        for _ in 0..Preset::ALL.len() {
            preset = preset.next();
        }
        assert_eq!(preset, Preset::Diamond);
    }

    #[test]
    fn solar_moon_runs_twice_as_fast() {
        let (session, names) = Preset::Solar.config().build().unwrap();
        let earth = session.period(names["earth"]).unwrap();
        let moon = session.period(names["moon"]).unwrap();
        assert_eq!(earth, Duration::from_millis(40));
        assert_eq!(moon, Duration::from_millis(20));
        let gap = session.distance(names["moon"], names["earth"]).unwrap();
        assert!((gap - 25.0).abs() < 1e-9);
    }

    #[test]
    fn sine_backdrop_reaches_every_frame() {
        let (session, _) = Preset::SineWave.config().build().unwrap();
        let frame = session.snapshot();
        assert_eq!(frame.backdrop.len(), 1001);
        assert_eq!(frame.backdrop[0], IVec2::new(0, 250));
    }

    #[test]
    fn parses_named_bodies() {
        let text = r#"
            collision_threshold = 50.0
            seed = 11

            [field]
            width = 1000.0
            height = 750.0

            [[bodies]]
            name = "mouse"
            kind = "mover"
            at = [500.0, 375.0]
            heading = 0.0
            evade = "cat"

            [[bodies]]
            name = "cat"
            kind = "pursuer"
            at = [60.0, 725.0]
            target = "mouse"
            speed = 50.0

            [[watch]]
            rule = "collision"
            a = "cat"
            b = "mouse"
        "#;
        let config = SessionConfig::from_toml_str(text).unwrap();
        let (mut session, names) = config.build().unwrap();
        let cat = names["cat"];
        assert_eq!(session.period(cat).unwrap(), Duration::from_millis(20));
        assert_eq!(session.snapshot().body(cat).map(|b| b.kind), Some(BodyKind::Pursuer));
        assert_eq!(session.rules().len(), 1);

        session.toggle(TickPlan::new(), Hooks::headless()).unwrap();
        session.advance(Duration::from_millis(100));
        assert!(session.position(cat).unwrap().x > 60.0);
    }

    #[test]
    fn unknown_and_duplicate_names() {
        let mut config = Preset::CatMouse.config();
        config.watch.push(WatchConfig::Laps {
            walker: "dog".to_string(),
            laps: 1,
        });
        assert!(matches!(config.build(), Err(SimError::UnknownName(n)) if n == "dog"));

        let mut config = Preset::CatMouse.config();
        let copy = config.bodies[0].clone();
        config.bodies.push(copy);
        assert!(matches!(config.build(), Err(SimError::DuplicateName(n)) if n == "mouse"));
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut config = Preset::Ricochet.config();
        config.bodies[0].speed = 0.0;
        assert!(matches!(config.build(), Err(SimError::InvalidParameter { .. })));

        let mut config = Preset::Ricochet.config();
        config.field.width = -5.0;
        assert!(config.build().is_err());

        assert!(matches!(
            SessionConfig::from_toml_str("field = 3"),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn walker_vertices_outside_the_field() {
        let text = r#"
            [field]
            width = 500.0
            height = 500.0

            [[bodies]]
            name = "dot"
            kind = "walker"
            path = { shape = "vertices", points = [[-2147483648, 0], [2147483647, 0]] }
        "#;
        let config = SessionConfig::from_toml_str(text).unwrap();
        assert!(matches!(config.build(), Err(SimError::OutOfBounds { .. })));
    }

    #[test]
    fn random_path_range_must_fit() {
        let mut config = Preset::RandomDiamond.config();
        config.bodies[0].motion = MotionConfig::Walker {
            path: PathConfig::Random {
                min: i32::MAX - 5,
                span: 450,
            },
        };
        assert!(matches!(config.build(), Err(SimError::InvalidParameter { .. })));

        config.bodies[0].motion = MotionConfig::Walker {
            path: PathConfig::Random { min: 600, span: 450 },
        };
        assert!(matches!(config.build(), Err(SimError::OutOfBounds { .. })));
    }

    #[test]
    fn random_preset_is_seedable() {
        let mut config = Preset::RandomDiamond.config();
        config.seed = Some(5);
        let (a, names) = config.build().unwrap();
        let (b, _) = config.build().unwrap();
        let dot = names["dot"];
        assert_eq!(a.position(dot).unwrap(), b.position(dot).unwrap());
    }
}

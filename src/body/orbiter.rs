use glam::DVec2;

use super::{Body, StepContext};
use crate::geometry::orbit_position;

/// Circles a center body at a fixed radius (planets, the moon).
///
/// The angle only grows; trigonometric periodicity does the wrapping.
#[derive(Debug, Clone)]
pub struct Orbiter {
    center: hecs::Entity,
    radius: f64,
    angle: f64,
    angular_step: f64,
    start_angle: f64,
    /// Center position seen on the last step or settle.
    anchor: DVec2,
    pos: DVec2,
}

impl Orbiter {
    /// `center_pos` is where the center body is right now.
    pub fn new(
        center: hecs::Entity,
        center_pos: DVec2,
        radius: f64,
        angular_step: f64,
        start_angle: f64,
    ) -> Self {
        Self {
            center,
            radius,
            angle: start_angle,
            angular_step,
            start_angle,
            anchor: center_pos,
            pos: orbit_position(center_pos, radius, start_angle),
        }
    }

    pub fn center(&self) -> hecs::Entity {
        self.center
    }

    pub fn set_center(&mut self, center: hecs::Entity) {
        self.center = center;
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn angular_step(&self) -> f64 {
        self.angular_step
    }
}

impl Body for Orbiter {
    fn step(&mut self, ctx: &mut StepContext<'_>) {
        if let Some(center) = ctx.partner {
            self.anchor = center;
        }
        self.angle += self.angular_step;
        self.pos = orbit_position(self.anchor, self.radius, self.angle);
    }

    fn position(&self) -> DVec2 {
        self.pos
    }

    fn reset(&mut self) {
        self.angle = self.start_angle;
        self.pos = orbit_position(self.anchor, self.radius, self.angle);
    }

    fn partner(&self) -> Option<hecs::Entity> {
        Some(self.center)
    }

    fn settle(&mut self, partner: Option<DVec2>) {
        if let Some(center) = partner {
            self.anchor = center;
        }
        self.pos = orbit_position(self.anchor, self.radius, self.angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Field;

    fn sun() -> hecs::Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn full_turn_returns_home() {
        let center = DVec2::new(375.0, 375.0);
        let mut orbiter = Orbiter::new(sun(), center, 185.0, 1.0, 0.0);
        let start = orbiter.position();
        let mut rng = fastrand::Rng::with_seed(4);
        let mut ctx = StepContext {
            field: Field::new(750.0, 750.0).unwrap(),
            partner: Some(center),
            rng: &mut rng,
        };
        for _ in 0..359 {
            orbiter.step(&mut ctx);
            assert!((orbiter.position().distance(center) - 185.0).abs() < 1e-9);
        }
        assert!(orbiter.position().distance(start) > 1.0);
        orbiter.step(&mut ctx);
        assert!(orbiter.position().distance(start) < 1e-9);
        assert!((orbiter.angle() - 360.0).abs() < 1e-9);
    }

    #[test]
    fn follows_a_moving_center() {
        let mut moon = Orbiter::new(sun(), DVec2::ZERO, 25.0, 90.0, 0.0);
        let mut rng = fastrand::Rng::with_seed(4);
        let mut ctx = StepContext {
            field: Field::new(750.0, 750.0).unwrap(),
            partner: Some(DVec2::new(100.0, 0.0)),
            rng: &mut rng,
        };
        moon.step(&mut ctx);
        assert!((moon.position() - DVec2::new(100.0, 25.0)).length() < 1e-9);
    }

    #[test]
    fn reset_and_settle() {
        let mut earth = Orbiter::new(sun(), DVec2::new(375.0, 375.0), 185.0, 0.58, 0.0);
        let mut rng = fastrand::Rng::with_seed(4);
        let mut ctx = StepContext {
            field: Field::new(750.0, 750.0).unwrap(),
            partner: Some(DVec2::new(375.0, 375.0)),
            rng: &mut rng,
        };
        for _ in 0..100 {
            earth.step(&mut ctx);
        }
        earth.reset();
        assert_eq!(earth.angle(), 0.0);
        assert!((earth.position() - DVec2::new(560.0, 375.0)).length() < 1e-9);

        earth.settle(Some(DVec2::new(0.0, 0.0)));
        assert!((earth.position() - DVec2::new(185.0, 0.0)).length() < 1e-9);
    }
}

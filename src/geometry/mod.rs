pub mod path;
pub mod raster;

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::error::{require_positive, SimError};

pub use path::{field_diamond, random_rhombus, ClosedPath};
pub use raster::rasterize_segment;

/// The bounded rectangle bodies move in.
///
/// Origin is the bottom-left corner, y grows upward. Use [`Field::to_screen`]
/// when drawing onto a top-left-origin canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f64,
    pub height: f64,
}

impl Field {
    pub fn new(width: f64, height: f64) -> Result<Self, SimError> {
        Ok(Self {
            width: require_positive("field width", width)?,
            height: require_positive("field height", height)?,
        })
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Inclusive bounds check: the edges belong to the field.
    pub fn contains(&self, pos: DVec2) -> bool {
        pos.is_finite()
            && (0.0..=self.width).contains(&pos.x)
            && (0.0..=self.height).contains(&pos.y)
    }

    /// Error unless `pos` lies inside the field.
    pub fn check(&self, pos: DVec2) -> Result<DVec2, SimError> {
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(SimError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Error unless every lattice point lies inside the field.
    pub fn check_vertices(&self, vertices: &[IVec2]) -> Result<(), SimError> {
        for v in vertices {
            self.check(v.as_dvec2())?;
        }
        Ok(())
    }

    /// Flip the vertical axis for a canvas whose origin is the top-left corner.
    pub fn to_screen(&self, pos: DVec2) -> DVec2 {
        DVec2::new(pos.x, self.height - pos.y)
    }
}

/// Point on a circle of `radius` around `center`, `angle_deg` counter-clockwise from +x.
pub fn orbit_position(center: DVec2, radius: f64, angle_deg: f64) -> DVec2 {
    let theta = angle_deg.to_radians();
    center + radius * DVec2::new(theta.cos(), theta.sin())
}

/// Unit step for a heading in degrees.
pub fn heading_vector(heading_deg: f64) -> DVec2 {
    let theta = heading_deg.to_radians();
    DVec2::new(theta.cos(), theta.sin())
}

/// Shape of the sine backdrop drawn behind the chase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SineWave {
    pub amplitude: f64,
    /// Phase advance per unit of x, in degrees.
    pub degrees_per_unit: f64,
    pub baseline: i32,
}

impl SineWave {
    /// One lattice sample per unit of x across `[0, width]`.
    pub fn sample(&self, width: f64) -> Vec<IVec2> {
        let columns = width.max(0.0).floor() as i32;
        (0..=columns)
            .map(|x| {
                let y = self.amplitude * (f64::from(x) * self.degrees_per_unit).to_radians().sin();
                IVec2::new(x, (y as i32).saturating_add(self.baseline))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_rejects_degenerate_sizes() {
        assert!(Field::new(0.0, 10.0).is_err());
        assert!(Field::new(10.0, -1.0).is_err());
        assert!(Field::new(f64::NAN, 10.0).is_err());
        assert!(Field::new(500.0, 500.0).is_ok());
    }

    #[test]
    fn contains_is_inclusive() {
        let field = Field::new(100.0, 50.0).unwrap();
        assert!(field.contains(DVec2::new(0.0, 0.0)));
        assert!(field.contains(DVec2::new(100.0, 50.0)));
        assert!(!field.contains(DVec2::new(100.5, 10.0)));
        assert!(!field.contains(DVec2::new(10.0, -0.1)));
        assert!(matches!(
            field.check(DVec2::new(-1.0, 0.0)),
            Err(SimError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn sine_baseline_saturates() {
        let wave = SineWave {
            amplitude: 200.0,
            degrees_per_unit: 4.0,
            baseline: i32::MAX,
        };
        let points = wave.sample(40.0);
        assert_eq!(points[0], IVec2::new(0, i32::MAX));
        assert_eq!(points[20], IVec2::new(20, i32::MAX));
    }

    #[test]
    fn vertex_bounds() {
        let field = Field::new(500.0, 500.0).unwrap();
        assert!(field.check_vertices(&[IVec2::new(0, 0), IVec2::new(500, 500)]).is_ok());
        assert!(matches!(
            field.check_vertices(&[IVec2::new(10, 10), IVec2::new(i32::MIN, 0)]),
            Err(SimError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn screen_flip() {
        let field = Field::new(1000.0, 750.0).unwrap();
        assert_eq!(field.to_screen(DVec2::new(10.0, 0.0)), DVec2::new(10.0, 750.0));
        assert_eq!(field.to_screen(DVec2::new(10.0, 700.0)), DVec2::new(10.0, 50.0));
    }

    #[test]
    fn orbit_quarter_turns() {
        let c = DVec2::new(375.0, 375.0);
        assert!((orbit_position(c, 185.0, 0.0) - DVec2::new(560.0, 375.0)).length() < 1e-9);
        assert!((orbit_position(c, 185.0, 90.0) - DVec2::new(375.0, 560.0)).length() < 1e-9);
        assert!((orbit_position(c, 185.0, 180.0) - DVec2::new(190.0, 375.0)).length() < 1e-9);
    }

    #[test]
    fn sine_samples_span_the_width() {
        let wave = SineWave {
            amplitude: 200.0,
            degrees_per_unit: 4.0,
            baseline: 250,
        };
        let points = wave.sample(1000.0);
        assert_eq!(points.len(), 1001);
        assert_eq!(points[0], IVec2::new(0, 250));
        // sin(90°) at x = 22.5 is not a lattice column; x = 45 is 180°.
        assert_eq!(points[45].y, 250);
        assert!(points.iter().all(|p| (50..=450).contains(&p.y)));
    }
}

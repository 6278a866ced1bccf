use glam::IVec2;

use super::raster::rasterize_segment;
use super::Field;
use crate::error::SimError;

/// Cyclic polygon path, each edge pre-rasterized.
///
/// Segment `i` runs from vertex `i` to vertex `i + 1`; the last one wraps back
/// to vertex 0, so the last point of the last segment is the first point of
/// segment 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedPath {
    vertices: Vec<IVec2>,
    segments: Vec<Vec<IVec2>>,
}

impl ClosedPath {
    pub fn new(vertices: &[IVec2]) -> Result<Self, SimError> {
        if vertices.len() < 2 {
            return Err(SimError::TooFewVertices(vertices.len()));
        }
        let segments = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(&a, &b)| rasterize_segment(a, b))
            .collect();
        Ok(Self {
            vertices: vertices.to_vec(),
            segments,
        })
    }

    pub fn vertices(&self) -> &[IVec2] {
        &self.vertices
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Rasterized points of segment `index` (wraps around).
    pub fn segment(&self, index: usize) -> &[IVec2] {
        &self.segments[index % self.segments.len()]
    }

    /// First vertex; where a walker starts and ends each lap.
    pub fn start(&self) -> IVec2 {
        self.vertices[0]
    }

    /// Total points across all segments (corners counted once per segment).
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

/// Four random vertices in bottom/right/top/left order.
///
/// Every coordinate is drawn from `[min, min + span)`. Sorting each axis and
/// permuting the indices puts the lowest y at the bottom vertex, the highest x
/// at the right vertex, the highest y at the top vertex and the lowest x at the
/// left vertex, which keeps the quadrilateral simple and counter-clockwise.
pub fn random_rhombus(rng: &mut fastrand::Rng, min: i32, span: i32) -> Result<[IVec2; 4], SimError> {
    if span <= 0 {
        return Err(SimError::invalid(
            "rhombus span",
            format!("must be positive, got {span}"),
        ));
    }
    if min.checked_add(span).is_none() {
        return Err(SimError::invalid(
            "rhombus range",
            format!("{min} + {span} overflows"),
        ));
    }
    let mut xs = [0i32; 4];
    let mut ys = [0i32; 4];
    for i in 0..4 {
        xs[i] = min + rng.i32(0..span);
        ys[i] = min + rng.i32(0..span);
    }
    xs.sort_unstable();
    ys.sort_unstable();

    xs.swap(0, 1);
    xs.swap(1, 3);
    ys.swap(2, 3);

    Ok([
        IVec2::new(xs[0], ys[0]),
        IVec2::new(xs[1], ys[1]),
        IVec2::new(xs[2], ys[2]),
        IVec2::new(xs[3], ys[3]),
    ])
}

/// The default diamond inset 10% from every edge of the field.
pub fn field_diamond(field: &Field) -> [IVec2; 4] {
    let w = field.width;
    let h = field.height;
    [
        IVec2::new((w * 0.5) as i32, (h * 0.1) as i32),
        IVec2::new((w * 0.9) as i32, (h * 0.5) as i32),
        IVec2::new((w * 0.5) as i32, (h * 0.9) as i32),
        IVec2::new((w * 0.1) as i32, (h * 0.5) as i32),
    ]
}

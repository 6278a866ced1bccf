use glam::IVec2;

/// Lattice points of the segment `from -> to`, both ends included.
///
/// Bresenham over all octants: walk the axis with the larger delta one unit
/// per point and carry an integer error term for the other axis. The result
/// has `max(|dx|, |dy|) + 1` points and consecutive points are 8-connected.
pub fn rasterize_segment(from: IVec2, to: IVec2) -> Vec<IVec2> {
    let delta = (to - from).abs();
    let step = IVec2::new(
        if from.x < to.x { 1 } else { -1 },
        if from.y < to.y { 1 } else { -1 },
    );

    // Major axis first, minor second; swap back when pushing.
    let x_major = delta.x >= delta.y;
    let (major_len, minor_len) = if x_major {
        (delta.x, delta.y)
    } else {
        (delta.y, delta.x)
    };

    let mut points = Vec::with_capacity(major_len as usize + 1);
    let mut p = from;
    let mut error = 0;
    points.push(p);

    for _ in 0..major_len {
        error += 2 * minor_len;
        if x_major {
            p.x += step.x;
            if error > major_len {
                p.y += step.y;
                error -= 2 * major_len;
            }
        } else {
            p.y += step.y;
            if error > major_len {
                p.x += step.x;
                error -= 2 * major_len;
            }
        }
        points.push(p);
    }

    points
}

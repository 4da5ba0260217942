//! Signed distance functions on the ground plane
//!
//! Wall geometry is probed by sphere tracing the SDF of its boxes. All
//! functions work in XZ, packed into a `Vec2` as (x, z).

use glam::{Vec2, Vec3};

/// Project a world point onto the ground plane as (x, z)
#[inline]
pub fn ground(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Signed distance to an axis-aligned box
#[inline]
pub fn sd_box(p: Vec2, center: Vec2, half_extents: Vec2) -> f32 {
    let q = (p - center).abs() - half_extents;
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0)
}

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Sphere-trace from `start` to `end` with a probe of the given radius
///
/// Returns the fraction along the segment where the probe first touches the
/// surface, or `None` if the whole segment is clear.
pub fn raymarch<F>(start: Vec2, end: Vec2, radius: f32, max_steps: usize, sdf: F) -> Option<f32>
where
    F: Fn(Vec2) -> f32,
{
    let dir = end - start;
    let total_dist = dir.length();
    if total_dist < 1e-6 {
        return (sdf(start) < radius).then_some(0.0);
    }
    let dir_norm = dir / total_dist;
    let min_step = total_dist * 0.01;

    let mut t = 0.0;
    for _ in 0..max_steps {
        let d = sdf(start + dir_norm * t);
        if d < radius {
            return Some(t / total_dist);
        }
        t += (d - radius).max(min_step);
        if t >= total_dist {
            break;
        }
    }

    // The end point is part of the segment; never step past it unchecked.
    (sdf(end) < radius).then_some(1.0)
}

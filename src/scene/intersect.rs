//! Ray intersection against primitive shapes in their local frame
//!
//! Shapes are centered at the origin with their axis along +Y. The ray is
//! not required to be unit length; the returned `t` is in the caller's ray
//! parameter, so it stays comparable after an affine transform.

use glam::Vec3;

const EPS: f32 = 1e-6;

/// Nearest non-negative hit on a Y-axis tube with an optional hole.
/// `inner == 0` gives a solid cylinder.
pub fn ray_ring(origin: Vec3, dir: Vec3, outer: f32, inner: f32, half_height: f32) -> Option<f32> {
    let mut best: Option<f32> = None;
    let mut consider = |t: f32| {
        if t >= 0.0 && best.is_none_or(|b| t < b) {
            best = Some(t);
        }
    };

    // Side walls
    let a = dir.x * dir.x + dir.z * dir.z;
    if a > EPS {
        let b = 2.0 * (origin.x * dir.x + origin.z * dir.z);
        let radii: &[f32] = if inner > 0.0 { &[outer, inner] } else { &[outer] };
        for &r in radii {
            let c = origin.x * origin.x + origin.z * origin.z - r * r;
            let disc = b * b - 4.0 * a * c;
            if disc < 0.0 {
                continue;
            }
            let sq = disc.sqrt();
            for t in [(-b - sq) / (2.0 * a), (-b + sq) / (2.0 * a)] {
                let y = origin.y + t * dir.y;
                if y.abs() <= half_height {
                    consider(t);
                }
            }
        }
    }

    // Top and bottom annuli
    if dir.y.abs() > EPS {
        for cap in [half_height, -half_height] {
            let t = (cap - origin.y) / dir.y;
            let p = origin + dir * t;
            let r2 = p.x * p.x + p.z * p.z;
            if r2 <= outer * outer && r2 >= inner * inner {
                consider(t);
            }
        }
    }

    best
}

/// Nearest non-negative hit on an axis-aligned box (slab method)
pub fn ray_box(origin: Vec3, dir: Vec3, half: Vec3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let (o, d, h) = (origin[axis], dir[axis], half[axis]);
        if d.abs() < EPS {
            if o.abs() > h {
                return None;
            }
            continue;
        }
        let (mut t1, mut t2) = ((-h - o) / d, (h - o) / d);
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        None
    } else if t_min >= 0.0 {
        Some(t_min)
    } else {
        // Origin inside the box
        Some(t_max)
    }
}

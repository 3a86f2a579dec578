//! Circle layouts for Venn diagrams.

use crate::diagram::Circle;
use crate::error::{OverlapError, Result};
use std::f64::consts::PI;

const BISECTION_STEPS: usize = 100;
/// Spacing added between disjoint circles, as a fraction of the radius sum.
const DISJOINT_MARGIN: f64 = 0.05;
/// Centre distance of the schematic layouts, in radii.
const SCHEMATIC_SPACING: f64 = 1.2;

/// Radius of a circle with the given area.
#[inline]
pub fn radius_for_area(area: f64) -> f64 {
    (area / PI).sqrt()
}

/// Area of the lens where two circles at distance `d` intersect.
pub fn lens_area(r1: f64, r2: f64, d: f64) -> f64 {
    if d >= r1 + r2 {
        return 0.0;
    }
    if d <= (r1 - r2).abs() {
        let r = r1.min(r2);
        return PI * r * r;
    }
    let a1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1)).clamp(-1.0, 1.0).acos();
    let a2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2)).clamp(-1.0, 1.0).acos();
    let k = (-d + r1 + r2) * (d + r1 - r2) * (d - r1 + r2) * (d + r1 + r2);
    r1 * r1 * a1 + r2 * r2 * a2 - 0.5 * k.max(0.0).sqrt()
}

/// Centre distance at which two circles overlap by `overlap` area.
///
/// The lens area decreases monotonically between internal tangency and
/// external tangency, so bisection on that range converges.
pub fn solve_distance(r1: f64, r2: f64, overlap: f64) -> Result<f64> {
    if !(r1.is_finite() && r2.is_finite() && overlap.is_finite()) || overlap < 0.0 {
        return Err(OverlapError::render("non-finite Venn geometry"));
    }
    let max_overlap = PI * r1.min(r2).powi(2);
    if overlap > max_overlap * (1.0 + 1e-9) {
        return Err(OverlapError::render(format!(
            "overlap area {:.3} exceeds the smaller circle ({:.3})",
            overlap, max_overlap
        )));
    }
    if overlap == 0.0 {
        return Ok((r1 + r2) * (1.0 + DISJOINT_MARGIN));
    }
    if overlap >= max_overlap * (1.0 - 1e-9) {
        return Ok((r1 - r2).abs());
    }

    let mut lo = (r1 - r2).abs();
    let mut hi = r1 + r2;
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if lens_area(r1, r2, mid) > overlap {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(0.5 * (lo + hi))
}

/// Single circle sized by `count`, or a unit circle when unscaled.
pub fn single_layout(count: usize, scaled: bool) -> Result<Circle> {
    if count == 0 {
        return Err(OverlapError::render("cannot draw a Venn diagram of an empty set"));
    }
    let r = if scaled { radius_for_area(count as f64) } else { 1.0 };
    Ok(Circle { cx: 0.0, cy: 0.0, r })
}

/// Two circles along the x axis.
pub fn pairwise_layout(area1: usize, area2: usize, cross: usize, scaled: bool) -> Result<[Circle; 2]> {
    if area1 == 0 && area2 == 0 {
        return Err(OverlapError::render("cannot draw a Venn diagram of empty sets"));
    }
    let (r1, r2, d) = if scaled {
        let r1 = radius_for_area(area1 as f64);
        let r2 = radius_for_area(area2 as f64);
        (r1, r2, solve_distance(r1, r2, cross as f64)?)
    } else {
        (1.0, 1.0, SCHEMATIC_SPACING)
    };
    Ok([
        Circle { cx: 0.0, cy: 0.0, r: r1 },
        Circle { cx: d, cy: 0.0, r: r2 },
    ])
}

/// Three equal circles on an equilateral triangle. Never area-proportional.
pub fn triple_layout() -> [Circle; 3] {
    let s = SCHEMATIC_SPACING;
    [
        Circle { cx: 0.0, cy: 0.0, r: 1.0 },
        Circle { cx: s, cy: 0.0, r: 1.0 },
        Circle { cx: s / 2.0, cy: s * 3f64.sqrt() / 2.0, r: 1.0 },
    ]
}

/// Label anchor for the region inside exactly the circles flagged in `members`.
pub fn region_anchor(circles: &[Circle], members: &[bool]) -> (f64, f64) {
    let n = circles.len();
    let centroid = |pick: &dyn Fn(usize) -> bool| {
        let chosen: Vec<&Circle> = (0..n).filter(|&i| pick(i)).map(|i| &circles[i]).collect();
        let k = chosen.len().max(1) as f64;
        (
            chosen.iter().map(|c| c.cx).sum::<f64>() / k,
            chosen.iter().map(|c| c.cy).sum::<f64>() / k,
        )
    };

    match n {
        1 => (circles[0].cx, circles[0].cy),
        2 => pair_anchor(&circles[0], &circles[1], members),
        _ => {
            let inside = centroid(&|i| members[i]);
            let degree = members.iter().filter(|m| **m).count();
            if degree == n {
                return inside;
            }
            let outside = centroid(&|i| !members[i]);
            let push = if degree == 1 { 0.6 } else { 0.35 };
            (
                inside.0 + (inside.0 - outside.0) * push,
                inside.1 + (inside.1 - outside.1) * push,
            )
        }
    }
}

/// Midpoints of the x-axis segments each two-set region occupies.
fn pair_anchor(a: &Circle, b: &Circle, members: &[bool]) -> (f64, f64) {
    let (a_lo, a_hi) = (a.cx - a.r, a.cx + a.r);
    let (b_lo, b_hi) = (b.cx - b.r, b.cx + b.r);
    let x = match (members[0], members[1]) {
        (true, true) => {
            let (lo, hi) = (a_lo.max(b_lo), a_hi.min(b_hi));
            if lo < hi {
                0.5 * (lo + hi)
            } else {
                0.5 * (a.cx + b.cx)
            }
        }
        (true, false) => 0.5 * (a_lo + b_lo.max(a_lo).min(a_hi)),
        _ => 0.5 * (b_hi + a_hi.min(b_hi).max(b_lo)),
    };
    (x, a.cy)
}

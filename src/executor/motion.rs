//! Synthetic human pointer motion: a cubic Bézier path with randomized
//! duration, curvature and per-sample jitter, so injected moves pace like a
//! hand on a mouse rather than a single teleport.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::errors::GhosthandResult;
use crate::executor::device::PointerDevice;

const MIN_DURATION_SECS: f64 = 0.3;
const CONTROL_OFFSET_PX: i32 = 300;
const SAMPLE_JITTER_PX: i32 = 2;

/// Evaluate a Bézier curve at `t` by repeated pairwise interpolation until a
/// single point remains (de Casteljau). Exact at t=0 and t=1.
pub fn point_on_curve(points: &[(f64, f64)], t: f64) -> (f64, f64) {
    if points.len() == 1 {
        return points[0];
    }
    let reduced: Vec<(f64, f64)> = points
        .windows(2)
        .map(|pair| {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            ((1.0 - t) * x0 + t * x1, (1.0 - t) * y0 + t * y1)
        })
        .collect();
    point_on_curve(&reduced, t)
}

/// Apply a random duration offset and enforce the floor that keeps moves
/// from degenerating into robotic instant jumps.
fn perturb_duration(nominal_secs: f64, offset_secs: f64) -> f64 {
    (nominal_secs + offset_secs).max(MIN_DURATION_SECS)
}

fn clamp_to_screen(x: f64, y: f64, width: u32, height: u32) -> (i32, i32) {
    let cx = x.max(0.0).min((width - 1) as f64);
    let cy = y.max(0.0).min((height - 1) as f64);
    (cx as i32, cy as i32)
}

/// Glide the pointer from its current position to `target` along a fresh
/// randomized curve, then land exactly on `target`. Pointer failures
/// propagate; there is no local recovery.
pub fn glide<P: PointerDevice>(
    pointer: &mut P,
    target: (i32, i32),
    nominal_secs: f64,
) -> GhosthandResult<()> {
    let mut rng = rand::thread_rng();

    let (start_x, start_y) = pointer.position()?;
    let (width, height) = pointer.screen_size()?;
    let duration = perturb_duration(nominal_secs, rng.gen_range(-0.1..=0.3));

    let points = [
        (start_x as f64, start_y as f64),
        (
            (start_x + rng.gen_range(-CONTROL_OFFSET_PX..=CONTROL_OFFSET_PX)) as f64,
            (start_y + rng.gen_range(-CONTROL_OFFSET_PX..=CONTROL_OFFSET_PX)) as f64,
        ),
        (
            (target.0 + rng.gen_range(-CONTROL_OFFSET_PX..=CONTROL_OFFSET_PX)) as f64,
            (target.1 + rng.gen_range(-CONTROL_OFFSET_PX..=CONTROL_OFFSET_PX)) as f64,
        ),
        (target.0 as f64, target.1 as f64),
    ];

    tracing::debug!(
        from = ?(start_x, start_y),
        to = ?target,
        duration_secs = duration,
        "gliding pointer"
    );

    let started = Instant::now();
    while started.elapsed().as_secs_f64() < duration {
        let t = started.elapsed().as_secs_f64() / duration;
        let (x, y) = point_on_curve(&points, t);
        let (sx, sy) = clamp_to_screen(
            x + rng.gen_range(-SAMPLE_JITTER_PX..=SAMPLE_JITTER_PX) as f64,
            y + rng.gen_range(-SAMPLE_JITTER_PX..=SAMPLE_JITTER_PX) as f64,
            width,
            height,
        );
        pointer.move_to(sx, sy)?;
        std::thread::sleep(Duration::from_secs_f64(rng.gen_range(0.001..=0.01)));
    }

    // Land on the untouched target regardless of sampling and jitter error.
    pointer.move_to(target.0, target.1)
}

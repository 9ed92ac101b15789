use std::f32::consts::TAU;

/// Clamp `v` to `[vmin, vmax]` and rescale it linearly into `[tmin, tmax]`.
///
/// The bounds map exactly: `normalize(vmin, ..) == tmin` and
/// `normalize(vmax, ..) == tmax`. An empty or unbounded input range yields
/// `tmin`.
pub fn normalize(v: f32, vmin: f32, vmax: f32, tmin: f32, tmax: f32) -> f32 {
    let dv = vmax - vmin;
    if !(dv > 0.0 && dv.is_finite()) {
        return tmin;
    }
    let nv = v.max(vmin).min(vmax);
    if nv == vmin {
        return tmin;
    }
    if nv == vmax {
        return tmax;
    }
    let pc = (nv - vmin) / dv;
    let tv = tmin + pc * (tmax - tmin);
    // Rounding near the ends must not step past the target bounds.
    if tmin <= tmax {
        tv.max(tmin).min(tmax)
    } else {
        tv.max(tmax).min(tmin)
    }
}

/// Move `current` a fraction `factor` of the remaining way toward `target`.
pub fn ease_toward(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Reduce an angle into `[0, 2π)`.
pub fn wrap_angle(a: f32) -> f32 {
    let w = a.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if w >= TAU { 0.0 } else { w }
}

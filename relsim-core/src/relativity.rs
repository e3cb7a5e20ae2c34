//! Simplified special-relativistic kinematics.
//!
//! Velocities are in grid units per turn and `c` is the universe's speed of
//! light in the same units. Every function tolerates `|v| >= c` by clamping
//! just below light speed instead of producing NaN.

use crate::state::Double3D;

/// Largest `v / c` accepted before clamping.
const MAX_BETA: f64 = 0.999_999;

fn beta(speed: f64, speed_of_light: f64) -> f64 {
    if speed_of_light <= 0.0 {
        return 0.0;
    }
    (speed / speed_of_light).abs().min(MAX_BETA)
}

/// Lorentz factor `1 / sqrt(1 - v^2 / c^2)`.
pub fn gamma(speed: f64, speed_of_light: f64) -> f64 {
    let b = beta(speed, speed_of_light);
    1.0 / (1.0 - b * b).sqrt()
}

/// Proper time elapsed for a mover during one universe turn.
pub fn proper_time_fraction(speed: f64, speed_of_light: f64) -> f64 {
    let b = beta(speed, speed_of_light);
    (1.0 - b * b).sqrt()
}

/// Rapidity `atanh(v / c)`.
pub fn rapidity(speed: f64, speed_of_light: f64) -> f64 {
    beta(speed, speed_of_light).atanh()
}

/// Velocity of `v` as seen from a frame moving at `u`.
///
/// Standard relativistic velocity subtraction for arbitrary directions.
pub fn relative_velocity(v: &Double3D, u: &Double3D, speed_of_light: f64) -> Double3D {
    let c2 = speed_of_light * speed_of_light;
    let u2 = u.dot(u);
    if u2 == 0.0 {
        return *v;
    }
    let g = gamma(u2.sqrt(), speed_of_light);
    let uv = u.dot(v);
    let denominator = 1.0 - uv / c2;

    // v_parallel and v_perpendicular with respect to u
    let v_parallel = u.scale(uv / u2);
    let v_perpendicular = v.sub(&v_parallel);

    v_parallel
        .sub(u)
        .add(&v_perpendicular.scale(1.0 / g))
        .scale(1.0 / denominator)
}

/// Fuel rest mass burned to go from `from` to `to` with total rest mass
/// `rest_mass`, using the photon rocket mass ratio `exp(Δrapidity)`.
pub fn fuel_for_velocity_change(
    rest_mass: f64,
    from: &Double3D,
    to: &Double3D,
    speed_of_light: f64,
) -> f64 {
    if rest_mass <= 0.0 {
        return 0.0;
    }
    let delta = relative_velocity(to, from, speed_of_light);
    let mass_ratio = rapidity(delta.magnitude(), speed_of_light).exp();
    rest_mass * (1.0 - 1.0 / mass_ratio)
}

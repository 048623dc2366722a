/// Orbit and spin kinematics. Pure math, no engine dependencies.
///
/// f64 throughout: angles are never wrapped, so they grow without bound.
/// Conversion to f32 happens only when visuals are synced in game.rs.

use glam::{DQuat, DVec3, EulerRot};

const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Step used to sample the look-ahead point for scripted-model orientation.
pub const LOOK_AHEAD: f64 = 0.01;

/// Simulation speed (degrees/second) to radians/second.
pub fn angular_speed(sim_speed_deg: f64) -> f64 {
    sim_speed_deg * DEG_TO_RAD
}

/// Point on a horizontal ellipse centred on the origin.
pub fn ellipse_point(a: f64, b: f64, angle: f64) -> DVec3 {
    DVec3::new(a * angle.cos(), 0.0, b * angle.sin())
}

/// Comet position: the ellipse lifted out of the plane by the inclination.
pub fn comet_point(a: f64, b: f64, inclination: f64, angle: f64) -> DVec3 {
    DVec3::new(
        a * angle.cos(),
        a * angle.sin() * inclination.sin(),
        b * angle.sin(),
    )
}

/// Horizontal circle around `center` (moons).
pub fn circle_point(center: DVec3, r: f64, angle: f64) -> DVec3 {
    center + DVec3::new(r * angle.cos(), 0.0, r * angle.sin())
}

/// Inclined circle around `anchor` (scripted models).
pub fn tethered_point(anchor: DVec3, r: f64, inclination: f64, theta: f64) -> DVec3 {
    anchor + DVec3::new(
        r * theta.cos(),
        r * theta.sin() * inclination.sin(),
        r * theta.sin(),
    )
}

/// Orientation that turns the model's +Z axis toward `target`.
///
/// Forward-difference approximation of the tangent: callers pass the orbit
/// sampled at `theta + LOOK_AHEAD`. Coincident points keep identity.
pub fn look_at_rotation(from: DVec3, target: DVec3) -> DQuat {
    match (target - from).try_normalize() {
        Some(dir) => DQuat::from_rotation_arc(DVec3::Z, dir),
        None => DQuat::IDENTITY,
    }
}

/// Absolute tilt plus the accumulated spin about the body's vertical axis.
pub fn body_rotation(tilt: DVec3, spin: f64) -> DQuat {
    DQuat::from_euler(EulerRot::XYZ, tilt.x, tilt.y + spin, tilt.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angular_speed_of_one_degree() {
        assert!((angular_speed(180.0) - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn ellipse_invariant_holds() {
        let (a, b) = (7.0, 5.6);
        for i in 0..100 {
            let p = ellipse_point(a, b, i as f64 * 0.37);
            let k = (p.x / a).powi(2) + (p.z / b).powi(2);
            assert!((k - 1.0).abs() < 1e-12, "k = {k}");
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn flat_comet_stays_in_plane() {
        let p = comet_point(20.0, 10.0, 0.0, 1.0);
        assert!(p.y.abs() < 1e-12);
        let p = comet_point(20.0, 10.0, 0.5, std::f64::consts::FRAC_PI_2);
        assert!((p.y - 20.0 * 0.5_f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn tethered_orbit_keeps_radius() {
        let anchor = DVec3::new(7.0, 0.0, 0.0);
        let p = tethered_point(anchor, 1.5, 0.0, 2.0);
        assert!(((p - anchor).length() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn look_ahead_points_along_the_orbit() {
        let anchor = DVec3::ZERO;
        let theta = 0.0;
        let here = tethered_point(anchor, 2.0, 0.0, theta);
        let ahead = tethered_point(anchor, 2.0, 0.0, theta + LOOK_AHEAD);
        let forward = look_at_rotation(here, ahead) * DVec3::Z;
        // At theta = 0 the tangent is +Z.
        assert!(forward.dot(DVec3::Z) > 0.999);
    }

    #[test]
    fn coincident_points_give_identity() {
        assert_eq!(look_at_rotation(DVec3::ONE, DVec3::ONE), DQuat::IDENTITY);
    }

    #[test]
    fn spin_rotates_about_vertical() {
        let q = body_rotation(DVec3::ZERO, std::f64::consts::FRAC_PI_2);
        let x = q * DVec3::X;
        assert!((x - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }
}

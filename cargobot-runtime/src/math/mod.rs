use std::f64::consts::PI;

pub use self::pid::Pid;
pub use self::table::InterpolationTable;

mod pid;
mod table;

/// Calculate the shortest rotation between two points on a circle
pub fn shortest_rotation(distance: f64) -> f64 {
    let dist_normal = distance.rem_euclid(2.0 * PI);

    if dist_normal > PI {
        dist_normal - (2.0 * PI)
    } else {
        dist_normal
    }
}

/// Linear interpolation.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Apply a deadband to an axis value.
///
/// Values within the deadband are zero. Values outside the deadband are
/// rescaled so the output still spans the full range.
pub fn deadband(value: f64, deadband: f64) -> f64 {
    if value.abs() > deadband {
        if value > 0.0 {
            (value - deadband) / (1.0 - deadband)
        } else {
            (value + deadband) / (1.0 - deadband)
        }
    } else {
        0.0
    }
}

/// Shape a joystick axis.
///
/// Applies the deadband and squares the axis, keeping the sign, for finer
/// control at low speed.
pub fn modify_axis(value: f64, band: f64) -> f64 {
    let value = deadband(value, band);

    (value * value).copysign(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortest_rotation() {
        assert!((shortest_rotation(45.0_f64.to_radians()) - 45.0_f64.to_radians()).abs() < 1e-9);
        assert!(
            (shortest_rotation(270.0_f64.to_radians()) + 90.0_f64.to_radians()).abs() < 1e-9
        );
        assert!(
            (shortest_rotation(-270.0_f64.to_radians()) - 90.0_f64.to_radians()).abs() < 1e-9
        );
        assert!(shortest_rotation(179.0_f64.to_radians()) < PI);
    }

    #[test]
    fn test_deadband() {
        assert_eq!(deadband(0.04, 0.05), 0.0);
        assert_eq!(deadband(-0.05, 0.05), 0.0);
        assert_eq!(deadband(1.0, 0.05), 1.0);
        assert_eq!(deadband(-1.0, 0.05), -1.0);
        assert!((deadband(0.525, 0.05) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_modify_axis() {
        assert_eq!(modify_axis(0.02, 0.05), 0.0);
        assert_eq!(modify_axis(1.0, 0.05), 1.0);
        assert_eq!(modify_axis(-1.0, 0.05), -1.0);
        assert!((modify_axis(-0.525, 0.05) + 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
    }
}

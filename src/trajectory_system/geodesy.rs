use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::EARTH_RADIUS;
use crate::utils::conversions::normalize_heading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    fn sign(&self) -> f64 {
        match self {
            TurnDirection::Left => -1.0,
            TurnDirection::Right => 1.0,
        }
    }
}

fn normalize_longitude(lon: f64) -> f64 {
    (lon + 540.0) % 360.0 - 180.0
}

pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS * a.sqrt().atan2((1.0 - a).sqrt())
}

pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    normalize_heading(y.atan2(x).to_degrees())
}

pub fn final_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    normalize_heading(bearing(lat2, lon2, lat1, lon1) + 180.0)
}

pub fn destination_point(lat: f64, lon: f64, distance: f64, bearing_deg: f64) -> (f64, f64) {
    let delta = distance / EARTH_RADIUS;
    let theta = bearing_deg.to_radians();
    let phi1 = lat.to_radians();
    let lambda1 = lon.to_radians();

    let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let y = theta.sin() * delta.sin() * phi1.cos();
    let x = delta.cos() - phi1.sin() * sin_phi2;
    let lambda2 = lambda1 + y.atan2(x);

    (phi2.to_degrees(), normalize_longitude(lambda2.to_degrees()))
}

pub fn rhumb_destination(lat: f64, lon: f64, distance: f64, bearing_deg: f64) -> (f64, f64) {
    let delta = distance / EARTH_RADIUS;
    let theta = bearing_deg.to_radians();
    let phi1 = lat.to_radians();
    let lambda1 = lon.to_radians();

    let d_phi = delta * theta.cos();
    let mut phi2 = phi1 + d_phi;
    // Past a pole: reflect back.
    if phi2.abs() > PI / 2.0 {
        phi2 = if phi2 > 0.0 { PI - phi2 } else { -PI - phi2 };
    }

    let d_psi = ((phi2 / 2.0 + PI / 4.0).tan() / (phi1 / 2.0 + PI / 4.0).tan()).ln();
    // East-west lines make the stretched latitude ratio ill-conditioned.
    let q = if d_psi.abs() > 1e-11 {
        d_phi / d_psi
    } else {
        phi1.cos()
    };
    let d_lambda = delta * theta.sin() / q;
    let lambda2 = lambda1 + d_lambda;

    (phi2.to_degrees(), normalize_longitude(lambda2.to_degrees()))
}

pub fn turn_radius(tas: f64, rate_of_turn: f64) -> f64 {
    let omega = rate_of_turn.abs().to_radians();
    if omega <= f64::EPSILON {
        f64::INFINITY
    } else {
        tas / omega
    }
}

pub fn turn_destination(
    lat: f64,
    lon: f64,
    initial_bearing: f64,
    tas: f64,
    rate_of_turn: f64,
    time: f64,
    direction: TurnDirection,
) -> (f64, f64, f64) {
    let heading_change = rate_of_turn.abs() * time;
    let final_heading = normalize_heading(initial_bearing + direction.sign() * heading_change);

    if rate_of_turn.abs() <= f64::EPSILON {
        let (lat2, lon2) = destination_point(lat, lon, tas * time, initial_bearing);
        return (lat2, lon2, normalize_heading(initial_bearing));
    }
    if tas <= f64::EPSILON {
        return (lat, lon, final_heading);
    }

    let radius = turn_radius(tas, rate_of_turn);
    let to_centre = initial_bearing + direction.sign() * 90.0;
    let (centre_lat, centre_lon) = destination_point(lat, lon, radius, to_centre);

    let start_radial = bearing(centre_lat, centre_lon, lat, lon);
    let end_radial = start_radial + direction.sign() * heading_change;
    let (lat2, lon2) = destination_point(centre_lat, centre_lon, radius, end_radial);

    (lat2, lon2, final_heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_destination_due_north() {
        let (lat, lon) = destination_point(0.0, 0.0, 111_194.9, 0.0);

        assert_abs_diff_eq!(lat, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(lon, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_destination_consistent_with_distance_and_bearing() {
        let (lat, lon) = destination_point(48.0, 11.0, 250_000.0, 63.0);

        assert_relative_eq!(distance(48.0, 11.0, lat, lon), 250_000.0, epsilon = 1e-3);
        assert_abs_diff_eq!(bearing(48.0, 11.0, lat, lon), 63.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rhumb_keeps_bearing_along_parallel() {
        let (lat, lon) = rhumb_destination(45.0, 0.0, 100_000.0, 90.0);

        assert_abs_diff_eq!(lat, 45.0, epsilon = 1e-9);
        assert!(lon > 1.2 && lon < 1.3, "Longitude change along 45N: {}", lon);
    }

    #[test]
    fn test_rhumb_matches_great_circle_on_meridian() {
        let rhumb = rhumb_destination(10.0, 20.0, 300_000.0, 180.0);
        let great = destination_point(10.0, 20.0, 300_000.0, 180.0);

        assert_abs_diff_eq!(rhumb.0, great.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rhumb.1, great.1, epsilon = 1e-9);
    }

    #[test]
    fn test_turn_changes_heading_by_rate_times_time() {
        let (_, _, heading) =
            turn_destination(50.0, 8.0, 350.0, 120.0, 3.0, 10.0, TurnDirection::Right);
        assert_abs_diff_eq!(heading, 20.0, epsilon = 1e-9);

        let (_, _, heading) =
            turn_destination(50.0, 8.0, 10.0, 120.0, 3.0, 10.0, TurnDirection::Left);
        assert_abs_diff_eq!(heading, 340.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_circle_returns_to_start() {
        let (lat, lon, heading) =
            turn_destination(50.0, 8.0, 90.0, 100.0, 3.0, 120.0, TurnDirection::Right);

        assert!(distance(50.0, 8.0, lat, lon) < 1.0);
        assert_abs_diff_eq!(heading, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hover_turn_only_rotates() {
        let (lat, lon, heading) =
            turn_destination(50.0, 8.0, 0.0, 0.0, 6.0, 5.0, TurnDirection::Right);

        assert_eq!((lat, lon), (50.0, 8.0));
        assert_abs_diff_eq!(heading, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_turn_radius() {
        assert_relative_eq!(turn_radius(100.0, 3.0), 100.0 / 3.0_f64.to_radians());
        assert!(turn_radius(100.0, 0.0).is_infinite());
    }
}

use serde::{Deserialize, Serialize};

use super::geodesy::{self, TurnDirection};
use crate::constants::GRAVITY;
use crate::errors::TrajectoryError;
use crate::utils::conversions::normalize_heading;

// Magnetic declination lookup, east positive: `magnetic = true - declination`.
pub trait MagneticDeclination {
    fn declination(&self, latitude: f64, longitude: f64) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroDeclination;

impl MagneticDeclination for ZeroDeclination {
    fn declination(&self, _latitude: f64, _longitude: f64) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConstantDeclination(pub f64);

impl MagneticDeclination for ConstantDeclination {
    fn declination(&self, _latitude: f64, _longitude: f64) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HeadingReference {
    #[default]
    True,
    Magnetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PathKind {
    #[default]
    GreatCircle,
    RhumbLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TurnRate {
    // deg/s
    RateOfTurn(f64),
    // deg
    BankAngle(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnMetrics {
    pub rate: TurnRate,
    pub direction: TurnDirection,
}

impl TurnMetrics {
    pub fn rate_of_turn(&self, tas: f64) -> f64 {
        match self.rate {
            TurnRate::RateOfTurn(rate) => rate.abs(),
            TurnRate::BankAngle(bank) => {
                if tas <= f64::EPSILON {
                    0.0
                } else {
                    (GRAVITY * bank.to_radians().tan() / tas).abs().to_degrees()
                }
            }
        }
    }

    pub fn bank_angle(&self, tas: f64) -> f64 {
        match self.rate {
            TurnRate::BankAngle(bank) => bank.abs(),
            TurnRate::RateOfTurn(rate) => {
                (rate.abs().to_radians() * tas / GRAVITY).atan().to_degrees()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationSetup {
    pub latitude: f64,
    pub longitude: f64,
    pub true_heading: Option<f64>,
    pub magnetic_heading: Option<f64>,
    #[serde(default)]
    pub reference: HeadingReference,
    #[serde(default)]
    pub path: PathKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub true_heading: f64,
    pub magnetic_heading: f64,
}

// Advances latitude, longitude and heading step by step.
pub struct Navigator<'a> {
    setup: NavigationSetup,
    declination: &'a dyn MagneticDeclination,
    origin: Position,
}

impl<'a> Navigator<'a> {
    // Ok(None) when no heading is given: position is then not propagated.
    pub fn new(
        setup: NavigationSetup,
        declination: &'a dyn MagneticDeclination,
    ) -> Result<Option<Self>, TrajectoryError> {
        TrajectoryError::require_finite("latitude", setup.latitude)?;
        TrajectoryError::require_finite("longitude", setup.longitude)?;
        if setup.latitude.abs() > 90.0 {
            return Err(TrajectoryError::InvalidInput(format!(
                "latitude {} outside [-90, 90]",
                setup.latitude
            )));
        }
        for heading in [setup.true_heading, setup.magnetic_heading].into_iter().flatten() {
            TrajectoryError::require_finite("heading", heading)?;
        }

        let local = declination.declination(setup.latitude, setup.longitude);
        let (true_heading, magnetic_heading) =
            match (setup.reference, setup.true_heading, setup.magnetic_heading) {
                (_, None, None) => return Ok(None),
                (HeadingReference::Magnetic, None, Some(_))
                    if setup.path == PathKind::GreatCircle =>
                {
                    return Err(TrajectoryError::HeadingSpecification(String::from(
                        "flying a non-constant magnetic heading needs an initial true heading",
                    )))
                }
                (HeadingReference::Magnetic, _, Some(magnetic)) => (magnetic + local, magnetic),
                (_, Some(true_heading), _) => (true_heading, true_heading - local),
                (_, None, Some(magnetic)) => (magnetic + local, magnetic),
            };

        let origin = Position {
            latitude: setup.latitude,
            longitude: setup.longitude,
            true_heading: normalize_heading(true_heading),
            magnetic_heading: normalize_heading(magnetic_heading),
        };
        Ok(Some(Navigator {
            setup,
            declination,
            origin,
        }))
    }

    pub fn start(&self) -> Position {
        self.origin
    }

    pub fn advance(
        &self,
        from: &Position,
        ground_distance: f64,
        time: f64,
        turn: Option<&TurnMetrics>,
        tas: f64,
    ) -> Position {
        let (latitude, longitude, true_heading) = match turn {
            Some(turn) if turn.rate_of_turn(tas) > 0.0 => {
                let speed = if time > 0.0 { ground_distance / time } else { 0.0 };
                geodesy::turn_destination(
                    from.latitude,
                    from.longitude,
                    from.true_heading,
                    speed,
                    turn.rate_of_turn(tas),
                    time,
                    turn.direction,
                )
            }
            _ => self.straight(from, ground_distance),
        };

        let declination = self.declination.declination(latitude, longitude);
        let constant_magnetic = turn.is_none()
            && self.setup.path == PathKind::RhumbLine
            && self.setup.reference == HeadingReference::Magnetic;

        let (true_heading, magnetic_heading) = if constant_magnetic {
            (from.magnetic_heading + declination, from.magnetic_heading)
        } else {
            (true_heading, true_heading - declination)
        };

        Position {
            latitude,
            longitude,
            true_heading: normalize_heading(true_heading),
            magnetic_heading: normalize_heading(magnetic_heading),
        }
    }

    fn straight(&self, from: &Position, ground_distance: f64) -> (f64, f64, f64) {
        if ground_distance <= 0.0 {
            return (from.latitude, from.longitude, from.true_heading);
        }

        match self.setup.path {
            PathKind::GreatCircle => {
                let (lat, lon) = geodesy::destination_point(
                    from.latitude,
                    from.longitude,
                    ground_distance,
                    from.true_heading,
                );
                let heading = geodesy::final_bearing(from.latitude, from.longitude, lat, lon);
                (lat, lon, heading)
            }
            PathKind::RhumbLine => {
                let (lat, lon) = geodesy::rhumb_destination(
                    from.latitude,
                    from.longitude,
                    ground_distance,
                    from.true_heading,
                );
                (lat, lon, from.true_heading)
            }
        }
    }
}

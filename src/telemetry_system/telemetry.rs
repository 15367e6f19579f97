use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aircraft::AeroConfig;
use crate::trajectory_system::navigation::Position;
use crate::utils::conversions::{m_to_ft, m_to_nm, mps_to_fpm, mps_to_kt};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AircraftState {
    pub altitude: f64,
    pub mass: f64,
    pub soc: Option<f64>,
    pub time: f64,
    pub distance: f64,
    pub fuel_consumed: f64,
    pub position: Option<Position>,
}

impl AircraftState {
    pub fn new(altitude: f64, mass: f64) -> Self {
        AircraftState {
            altitude,
            mass,
            soc: None,
            time: 0.0,
            distance: 0.0,
            fuel_consumed: 0.0,
            position: None,
        }
    }

    pub fn with_soc(mut self, soc: f64) -> Self {
        self.soc = Some(soc);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub distance: f64,
    pub altitude: f64,
    pub tas: f64,
    pub cas: f64,
    pub mach: f64,
    pub mass: f64,
    pub fuel_consumed: f64,
    pub fuel_flow: f64,
    pub soc: Option<f64>,
    pub soc_rate: Option<f64>,
    pub rocd: f64,
    // Flight-path angle (deg).
    pub slope: f64,
    pub acceleration: f64,
    pub esf: f64,
    pub ground_speed: f64,
    pub thrust: f64,
    pub drag: f64,
    pub engine_power: f64,
    pub power_required: f64,
    pub lift_coefficient: f64,
    pub drag_coefficient: f64,
    pub config: AeroConfig,
    pub engine_setting: String,
    pub bank_angle: f64,
    pub rate_of_turn: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub true_heading: Option<f64>,
    pub magnetic_heading: Option<f64>,
    pub comment: String,
}

impl TrajectoryPoint {
    pub fn position(&self) -> Option<Position> {
        match (self.latitude, self.longitude, self.true_heading, self.magnetic_heading) {
            (Some(latitude), Some(longitude), Some(true_heading), Some(magnetic_heading)) => {
                Some(Position {
                    latitude,
                    longitude,
                    true_heading,
                    magnetic_heading,
                })
            }
            _ => None,
        }
    }

    pub(crate) fn set_position(&mut self, position: Option<Position>) {
        self.latitude = position.map(|p| p.latitude);
        self.longitude = position.map(|p| p.longitude);
        self.true_heading = position.map(|p| p.true_heading);
        self.magnetic_heading = position.map(|p| p.magnetic_heading);
    }

    pub fn state(&self) -> AircraftState {
        AircraftState {
            altitude: self.altitude,
            mass: self.mass,
            soc: self.soc,
            time: self.time,
            distance: self.distance,
            fuel_consumed: self.fuel_consumed,
            position: self.position(),
        }
    }

    pub fn specific_range(&self) -> Option<f64> {
        if self.fuel_flow > 0.0 {
            Some(self.ground_speed / self.fuel_flow)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySummary {
    pub duration: f64,
    pub distance: f64,
    pub fuel_consumed: f64,
    pub max_altitude: f64,
    pub min_altitude: f64,
    pub max_rocd: f64,
    pub min_rocd: f64,
    pub final_mass: f64,
    pub final_soc: Option<f64>,
}

impl Trajectory {
    pub fn new() -> Self {
        Trajectory { points: Vec::new() }
    }

    pub fn push(&mut self, point: TrajectoryPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&TrajectoryPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectoryPoint> {
        self.points.iter()
    }

    pub fn append(&mut self, other: Trajectory) {
        let skip_first = match (self.points.last(), other.points.first()) {
            (Some(last), Some(first)) => {
                last.time == first.time && last.distance == first.distance
            }
            _ => false,
        };
        self.points
            .extend(other.points.into_iter().skip(usize::from(skip_first)));
    }

    pub fn summary(&self) -> Option<TrajectorySummary> {
        let first = self.points.first()?;
        let last = self.points.last()?;

        let mut summary = TrajectorySummary {
            duration: last.time - first.time,
            distance: last.distance - first.distance,
            fuel_consumed: last.fuel_consumed - first.fuel_consumed,
            max_altitude: f64::MIN,
            min_altitude: f64::MAX,
            max_rocd: f64::MIN,
            min_rocd: f64::MAX,
            final_mass: last.mass,
            final_soc: last.soc,
        };
        for point in &self.points {
            summary.max_altitude = summary.max_altitude.max(point.altitude);
            summary.min_altitude = summary.min_altitude.min(point.altitude);
            summary.max_rocd = summary.max_rocd.max(point.rocd);
            summary.min_rocd = summary.min_rocd.min(point.rocd);
        }
        Some(summary)
    }

    pub(crate) fn points_mut(&mut self) -> &mut Vec<TrajectoryPoint> {
        &mut self.points
    }
}

pub fn format_time(elapsed_time: f64) -> String {
    if elapsed_time >= 3600.0 {
        let hours = (elapsed_time / 3600.0).floor();
        let minutes = ((elapsed_time % 3600.0) / 60.0).floor();
        let seconds = elapsed_time % 60.0;
        format!("{:.0}h {:.0}m {:.0}s", hours, minutes, seconds)
    } else if elapsed_time >= 60.0 {
        let minutes = (elapsed_time / 60.0).floor();
        let seconds = elapsed_time % 60.0;
        format!("{:.0}m {:.0}s", minutes, seconds)
    } else {
        format!("{:.1}s", elapsed_time)
    }
}

pub fn format_altitude(altitude: f64) -> String {
    if altitude >= 3048.0 {
        format!("FL{:03.0}", m_to_ft(altitude) / 100.0)
    } else {
        format!("{:.0} ft", m_to_ft(altitude))
    }
}

impl fmt::Display for TrajectoryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>10} {:>8.1} NM {:>8} {:>6.1} kt M{:.3} {:>7.0} fpm {:>9.1} kg {:>2} {:<7} {}",
            format_time(self.time),
            m_to_nm(self.distance),
            format_altitude(self.altitude),
            mps_to_kt(self.cas),
            self.mach,
            mps_to_fpm(self.rocd),
            self.mass,
            self.config.label(),
            self.engine_setting,
            self.comment
        )
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Trajectory ---")?;
        for point in &self.points {
            writeln!(f, "{}", point)?;
        }
        if let Some(summary) = self.summary() {
            writeln!(f, "--- Summary ---")?;
            writeln!(f, "Duration: {}", format_time(summary.duration))?;
            writeln!(f, "Distance: {:.1} NM", m_to_nm(summary.distance))?;
            writeln!(f, "Fuel: {:.1} kg", summary.fuel_consumed)?;
            writeln!(f, "Max Altitude: {}", format_altitude(summary.max_altitude))?;
            writeln!(f, "Final Mass: {:.1} kg", summary.final_mass)?;
            if let Some(soc) = summary.final_soc {
                writeln!(f, "Final SOC: {:.1} %", soc)?;
            }
        }
        Ok(())
    }
}

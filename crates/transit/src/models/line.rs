//! Lines and their stops, as published in a static timetable.

use std::sync::Arc;

use geo::{Coord, LineString, Point};

use crate::identifiers::LineIdentifier;
use crate::models::types::*;

/// A scheduled stop on a line.
///
/// `times[k]` is the "HH:mm" time at which run `k` serves this stop.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub name: Arc<str>,
    /// x = longitude, y = latitude
    pub location: Point,
    pub times: Vec<String>,
}

impl Stop {
    pub fn new(name: impl Into<Arc<str>>, lat: f64, lng: f64, times: Vec<String>) -> Self {
        Self {
            name: name.into(),
            location: Point::new(lng, lat),
            times,
        }
    }

    pub fn lat(&self) -> f64 {
        self.location.y()
    }

    pub fn lng(&self) -> f64 {
        self.location.x()
    }
}

/// A transit line: an ordered list of stops sharing one timetable.
///
/// Construction validates that there are at least two stops and that every
/// stop carries one time per run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "LineRecord"))]
pub struct Line {
    id: LineIdentifier,
    name: Arc<str>,
    color: Arc<str>,
    kind: TransportKind,
    stops: Vec<Stop>,
}

impl Line {
    pub fn new(
        id: impl Into<LineIdentifier>,
        name: impl Into<Arc<str>>,
        color: impl Into<Arc<str>>,
        kind: TransportKind,
        stops: Vec<Stop>,
    ) -> Result<Self> {
        let id = id.into();

        if stops.len() < 2 {
            return Err(TransitError::InvalidData(format!(
                "Line {} has {} stop(s), at least 2 are required",
                id,
                stops.len()
            )));
        }

        let runs = stops[0].times.len();
        if let Some(stop) = stops.iter().find(|s| s.times.len() != runs) {
            return Err(TransitError::InvalidData(format!(
                "Line {}: stop {:?} has {} times, expected {}",
                id,
                stop.name,
                stop.times.len(),
                runs
            )));
        }

        Ok(Self {
            id,
            name: name.into(),
            color: color.into(),
            kind,
            stops,
        })
    }

    pub fn id(&self) -> &LineIdentifier {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Stops in route order
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Number of scheduled runs (identical for every stop)
    pub fn run_count(&self) -> usize {
        self.stops[0].times.len()
    }

    pub fn origin(&self) -> &Stop {
        &self.stops[0]
    }

    pub fn terminus(&self) -> &Stop {
        &self.stops[self.stops.len() - 1]
    }

    /// Locate a stop by exact name and coordinates.
    pub fn find_stop(&self, name: &str, lat: f64, lng: f64) -> Option<usize> {
        self.stops
            .iter()
            .position(|s| &*s.name == name && s.lat() == lat && s.lng() == lng)
    }

    /// Stop coordinates in route order, used as routing waypoints.
    pub fn waypoints(&self) -> LineString {
        self.stops
            .iter()
            .map(|s| Coord {
                x: s.lng(),
                y: s.lat(),
            })
            .collect()
    }
}

// ============================================================================
// Deserialization
// ============================================================================

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct StopRecord {
    name: String,
    lat: f64,
    lng: f64,
    #[serde(alias = "times")]
    time: Vec<String>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct LineRecord {
    id: LineIdentifier,
    name: String,
    #[serde(default)]
    color: String,
    #[serde(default, rename = "type")]
    kind: TransportKind,
    stops: Vec<StopRecord>,
}

#[cfg(feature = "serde")]
impl TryFrom<LineRecord> for Line {
    type Error = TransitError;

    fn try_from(record: LineRecord) -> Result<Self> {
        let stops = record
            .stops
            .into_iter()
            .map(|s| Stop::new(s.name, s.lat, s.lng, s.time))
            .collect();
        Line::new(record.id, record.name, record.color, record.kind, stops)
    }
}

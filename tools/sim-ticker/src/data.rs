use anyhow::{Context, Result};
use geo::{Coord, LineString};
use std::collections::HashMap;
use std::path::Path;
use transit_sim::prelude::*;

/// Read the timetable: a JSON array of lines
pub fn read_lines(path: &Path) -> Result<Vec<Line>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schedule {}", path.display()))?;
    let lines: Vec<Line> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse schedule {}", path.display()))?;
    tracing::info!("Loaded {} lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Read simulation settings, falling back to defaults when no file is given
pub fn read_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Pre-fetched route polylines keyed by line id.
///
/// File format: `{ "<line id>": [[lat, lng], ...], ... }`
pub struct RouteFile {
    routes: HashMap<LineIdentifier, LineString>,
}

impl RouteFile {
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read routes {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Failed to parse routes {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<[f64; 2]>> = serde_json::from_str(text)?;
        let routes = raw
            .into_iter()
            .map(|(id, points)| {
                let line: LineString = points
                    .into_iter()
                    .map(|[lat, lng]| Coord { x: lng, y: lat })
                    .collect();
                (LineIdentifier::new(id), line)
            })
            .collect();
        Ok(Self { routes })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

impl PolylineSource for RouteFile {
    fn fetch_polyline<'a>(&'a self, line: &'a Line) -> PolylineFuture<'a> {
        let found = self.routes.get(line.id()).cloned().ok_or_else(|| TransitError::RouteUnavailable {
            line: line.id().clone(),
            reason: "not present in routes file".into(),
        });
        Box::pin(async move { found })
    }
}

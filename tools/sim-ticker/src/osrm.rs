//! Route polylines from an OSRM server.
//!
//! One `route` request per line with the line's stops as waypoints. There is
//! no retry: a line whose request fails simply has no vehicles this session.

use geo::{Coord, LineString};
use serde::Deserialize;
use transit_sim::prelude::*;

pub struct OsrmClient {
    client: reqwest::Client,
    base_url: String,
    profile: String,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    geometry: GeoJsonLine,
}

#[derive(Debug, Deserialize)]
struct GeoJsonLine {
    /// [lng, lat] pairs
    coordinates: Vec<[f64; 2]>,
}

impl OsrmClient {
    pub fn new(base_url: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            profile: profile.into(),
        }
    }

    /// Request URL for a line, waypoints in stop order
    pub fn route_url(&self, line: &Line) -> String {
        let waypoints = line
            .stops()
            .iter()
            .map(|s| format!("{},{}", s.lng(), s.lat()))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/{}/{}?overview=full&geometries=geojson",
            self.base_url.trim_end_matches('/'),
            self.profile,
            waypoints
        )
    }

    async fn request(&self, line: &Line) -> std::result::Result<LineString, String> {
        let url = self.route_url(line);
        tracing::debug!(line = %line.id(), %url, "requesting route");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;
        let body: RouteResponse = response.json().await.map_err(|e| e.to_string())?;
        decode(body)
    }
}

fn decode(body: RouteResponse) -> std::result::Result<LineString, String> {
    if body.code != "Ok" {
        return Err(match body.message {
            Some(message) => format!("{}: {}", body.code, message),
            None => body.code,
        });
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| "response contained no routes".to_string())?;

    Ok(route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lng, lat]| Coord { x: lng, y: lat })
        .collect())
}

impl PolylineSource for OsrmClient {
    fn fetch_polyline<'a>(&'a self, line: &'a Line) -> PolylineFuture<'a> {
        Box::pin(async move {
            self.request(line)
                .await
                .map_err(|reason| TransitError::RouteUnavailable {
                    line: line.id().clone(),
                    reason,
                })
        })
    }
}

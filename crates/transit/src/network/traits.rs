//! Pluggable route polyline sources.
//!
//! The simulation never talks to a routing provider itself. Whoever owns the
//! simulator implements this trait (an HTTP client, a file on disk, a test
//! fixture) and hands the result over.

use std::future::Future;
use std::pin::Pin;

use geo::LineString;

use crate::models::line::Line;
use crate::models::types::Result;

/// Boxed future returned by [`PolylineSource::fetch_polyline`]
pub type PolylineFuture<'a> = Pin<Box<dyn Future<Output = Result<LineString>> + Send + 'a>>;

/// Fetch the drivable path through a line's stops
pub trait PolylineSource: Send + Sync {
    /// Ordered route coordinates (x = longitude, y = latitude) passing through
    /// `line`'s stops in route order.
    ///
    /// Called at most once per line per session. Failures are not retried.
    fn fetch_polyline<'a>(&'a self, line: &'a Line) -> PolylineFuture<'a>;
}

//! Per-line store of built route geometry.
//!
//! Geometry is expensive to obtain (one routing request plus an anchor scan),
//! so it is built once per line and then shared. Entries are published whole
//! behind an `Arc`; the first geometry stored for a line is the one everybody
//! sees for the rest of the session.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::geometry::RouteGeometry;
use crate::identifiers::LineIdentifier;

#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: RwLock<HashMap<LineIdentifier, Arc<RouteGeometry>>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry for a line, or `None` while it is not ready yet.
    pub fn get(&self, line: &LineIdentifier) -> Option<Arc<RouteGeometry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(line)
            .cloned()
    }

    /// Publish geometry for a line. First write wins.
    ///
    /// Returns the geometry that is stored for the line afterwards, which is
    /// the earlier one if the line already had geometry.
    pub fn insert(&self, line: LineIdentifier, geometry: RouteGeometry) -> Arc<RouteGeometry> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(line)
            .or_insert_with(|| Arc::new(geometry))
            .clone()
    }

    pub fn contains(&self, line: &LineIdentifier) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(line)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lines that currently have geometry, sorted by id
    pub fn ready_lines(&self) -> Vec<LineIdentifier> {
        let mut lines: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        lines.sort();
        lines
    }
}

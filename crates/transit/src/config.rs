//! Simulation tunables.

use std::time::Duration;

/// Time windows used by the simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// How long before its scheduled arrival a run that matches no segment is
    /// shown waiting at the terminus, in seconds
    pub dwell_window_secs: u32,

    /// Runs that left a stop at most this many seconds ago still show up in
    /// its arrivals list
    pub arrivals_lookbehind_secs: u32,

    /// How far ahead the arrivals list looks, in seconds
    pub arrivals_horizon_secs: u32,

    /// Interval between ticks for drivers that poll the simulator
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub tick_interval: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dwell_window_secs: 60,
            arrivals_lookbehind_secs: 60,
            arrivals_horizon_secs: 7200,
            tick_interval: Duration::from_secs(1),
        }
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

//! Timetable lookups: which runs are on the road right now, and what is
//! arriving next at a stop.

use std::sync::Arc;

use tracing::trace;

use crate::config::SimConfig;
use crate::identifiers::LineIdentifier;
use crate::models::line::Line;
use crate::time::parse_time_to_seconds;

/// What a run is doing at a given moment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RunState {
    /// Travelling between two consecutive stops
    InTransit {
        run: usize,
        from_stop: usize,
        to_stop: usize,
        /// Elapsed share of the scheduled segment time, in [0, 1)
        progress: f64,
    },
    /// Finished its last segment and waiting at the terminus
    AtTerminus { run: usize },
}

impl RunState {
    pub fn run(&self) -> usize {
        match *self {
            Self::InTransit { run, .. } | Self::AtTerminus { run } => run,
        }
    }

    pub fn progress(&self) -> f64 {
        match *self {
            Self::InTransit { progress, .. } => progress,
            Self::AtTerminus { .. } => 1.0,
        }
    }
}

/// Every run of `line` that is active at `now` (seconds since midnight).
pub fn active_runs(line: &Line, now: u32, config: &SimConfig) -> Vec<RunState> {
    (0..line.run_count())
        .filter_map(|run| run_state(line, run, now, config))
        .collect()
}

/// State of a single run at `now`, or `None` when it is not on the road.
///
/// Runs with an unparseable departure or arrival time are never active.
pub fn run_state(line: &Line, run: usize, now: u32, config: &SimConfig) -> Option<RunState> {
    let depart = parse_time_to_seconds(line.origin().times.get(run)?).ok()?;
    let arrive = parse_time_to_seconds(line.terminus().times.get(run)?).ok()?;

    if now < depart || now > arrive {
        return None;
    }

    let stops = line.stops();
    for (from_stop, pair) in stops.windows(2).enumerate() {
        let (Ok(start), Ok(end)) = (
            parse_time_to_seconds(&pair[0].times[run]),
            parse_time_to_seconds(&pair[1].times[run]),
        ) else {
            continue;
        };

        if start <= now && now < end {
            let total = end as f64 - start as f64;
            let progress = if total > 0.0 {
                (now - start) as f64 / total
            } else {
                0.0
            };
            return Some(RunState::InTransit {
                run,
                from_stop,
                to_stop: from_stop + 1,
                progress,
            });
        }
    }

    if now >= arrive.saturating_sub(config.dwell_window_secs) {
        return Some(RunState::AtTerminus { run });
    }

    trace!(
        line = %line.id(),
        run,
        now,
        "run is inside its service window but matches no segment"
    );
    None
}

/// A scheduled arrival of a run at a stop.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Arrival {
    pub line_id: LineIdentifier,
    pub line_name: Arc<str>,
    pub color: Arc<str>,
    pub run: usize,
    /// Seconds until the scheduled time; negative if it has just passed
    pub time_until_arrival: i64,
    pub scheduled_time: String,
}

/// Upcoming arrivals at stop `stop_index` of `line`, soonest first.
///
/// Includes runs due within the configured horizon and runs that passed the
/// stop no longer ago than the look-behind.
pub fn next_arrivals(line: &Line, stop_index: usize, now: u32, config: &SimConfig) -> Vec<Arrival> {
    let Some(stop) = line.stops().get(stop_index) else {
        return Vec::new();
    };

    let earliest = -(config.arrivals_lookbehind_secs as i64);
    let latest = config.arrivals_horizon_secs as i64;

    let mut arrivals: Vec<Arrival> = stop
        .times
        .iter()
        .enumerate()
        .filter_map(|(run, scheduled)| {
            let at = parse_time_to_seconds(scheduled).ok()?;
            let until = at as i64 - now as i64;
            (earliest..=latest).contains(&until).then(|| Arrival {
                line_id: line.id().clone(),
                line_name: line.name().into(),
                color: line.color().into(),
                run,
                time_until_arrival: until,
                scheduled_time: scheduled.clone(),
            })
        })
        .collect();

    arrivals.sort_by_key(|a| a.time_until_arrival);
    arrivals
}

/// Arrivals across several lines serving the same place, soonest first.
pub fn merged_arrivals<'a>(
    stops: impl IntoIterator<Item = (&'a Line, usize)>,
    now: u32,
    config: &SimConfig,
) -> Vec<Arrival> {
    let mut arrivals: Vec<Arrival> = stops
        .into_iter()
        .flat_map(|(line, stop_index)| next_arrivals(line, stop_index, now, config))
        .collect();
    arrivals.sort_by_key(|a| a.time_until_arrival);
    arrivals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::line::Stop;
    use crate::models::types::TransportKind;
    use crate::time::parse_time_to_seconds as secs;

    fn line(stops: &[(&str, Vec<&str>)]) -> Line {
        let stops = stops
            .iter()
            .enumerate()
            .map(|(i, (name, times))| {
                Stop::new(*name, 0.0, i as f64 * 0.01, times.iter().map(|t| t.to_string()).collect())
            })
            .collect();
        Line::new("7", "Test", "#123456", TransportKind::Bus, stops).unwrap()
    }

    #[test]
    fn test_progress_halfway_through_segment() {
        let line = line(&[("A", vec!["08:00"]), ("B", vec!["08:10"])]);
        let now = secs("08:05").unwrap();

        let runs = active_runs(&line, now, &SimConfig::default());
        assert_eq!(
            runs,
            vec![RunState::InTransit {
                run: 0,
                from_stop: 0,
                to_stop: 1,
                progress: 0.5
            }]
        );
    }

    #[test]
    fn test_picks_segment_containing_now() {
        let line = line(&[("A", vec!["08:00"]), ("B", vec!["08:10"]), ("C", vec!["08:30"])]);
        let now = secs("08:15").unwrap();

        let state = run_state(&line, 0, now, &SimConfig::default()).unwrap();
        assert_eq!(
            state,
            RunState::InTransit {
                run: 0,
                from_stop: 1,
                to_stop: 2,
                progress: 0.25
            }
        );
    }

    #[test]
    fn test_runs_outside_window_are_inactive() {
        let line = line(&[("A", vec!["08:00", "09:00"]), ("B", vec!["08:10", "09:10"])]);
        let config = SimConfig::default();

        assert!(active_runs(&line, secs("07:59").unwrap(), &config).is_empty());
        assert!(active_runs(&line, secs("09:11").unwrap(), &config).is_empty());

        let runs = active_runs(&line, secs("09:01").unwrap(), &config);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run(), 1);
    }

    #[test]
    fn test_terminal_dwell_at_arrival_time() {
        let line = line(&[("A", vec!["08:00"]), ("B", vec!["08:10"])]);
        let now = secs("08:10").unwrap();

        let state = run_state(&line, 0, now, &SimConfig::default()).unwrap();
        assert_eq!(state, RunState::AtTerminus { run: 0 });
        assert_eq!(state.progress(), 1.0);
    }

    #[test]
    fn test_terminal_dwell_when_last_segment_has_no_duration() {
        // Schedule lists the last two stops at the same minute
        let line = line(&[("A", vec!["08:00"]), ("B", vec!["08:10"]), ("C", vec!["08:10"])]);
        let now = secs("08:10").unwrap() - 1;

        // 08:09:59 is still inside A -> B
        let state = run_state(&line, 0, now, &SimConfig::default()).unwrap();
        assert!(matches!(state, RunState::InTransit { from_stop: 0, .. }));

        let state = run_state(&line, 0, now + 1, &SimConfig::default()).unwrap();
        assert_eq!(state, RunState::AtTerminus { run: 0 });
    }

    #[test]
    fn test_unmatched_run_outside_dwell_is_dropped() {
        // An unreadable interior time leaves a hole in the run's timeline
        let line = line(&[("A", vec!["08:00"]), ("B", vec!["??"]), ("C", vec!["09:00"])]);
        let config = SimConfig::default();

        assert!(run_state(&line, 0, secs("08:30").unwrap(), &config).is_none());

        let dwelling = secs("09:00").unwrap() - 30;
        assert_eq!(
            run_state(&line, 0, dwelling, &config),
            Some(RunState::AtTerminus { run: 0 })
        );
    }

    #[test]
    fn test_invalid_times_disable_run() {
        let line = line(&[("A", vec!["8h", "09:00"]), ("B", vec!["08:10", "09:10"])]);
        let runs = active_runs(&line, secs("08:05").unwrap(), &SimConfig::default());
        assert!(runs.is_empty());

        let runs = active_runs(&line, secs("09:05").unwrap(), &SimConfig::default());
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn test_next_arrivals_window_and_order() {
        let line = line(&[
            ("A", vec!["06:00", "08:00", "07:59", "09:30", "10:01", "07:58"]),
            ("B", vec!["06:10", "08:10", "08:09", "09:40", "10:11", "08:08"]),
        ]);
        let now = secs("08:00").unwrap();

        let arrivals = next_arrivals(&line, 0, now, &SimConfig::default());
        let runs: Vec<usize> = arrivals.iter().map(|a| a.run).collect();
        assert_eq!(runs, vec![2, 1, 3]);

        let until: Vec<i64> = arrivals.iter().map(|a| a.time_until_arrival).collect();
        assert_eq!(until, vec![-60, 0, 5400]);
        assert!(until.iter().all(|t| (-60..=7200).contains(t)));
        assert_eq!(arrivals[0].scheduled_time, "07:59");
    }

    #[test]
    fn test_next_arrivals_includes_horizon_edge() {
        let line = line(&[("A", vec!["10:00", "10:01"]), ("B", vec!["10:10", "10:11"])]);
        let now = secs("08:00").unwrap();

        let arrivals = next_arrivals(&line, 0, now, &SimConfig::default());
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].time_until_arrival, 7200);
    }

    #[test]
    fn test_next_arrivals_unknown_stop() {
        let line = line(&[("A", vec!["08:00"]), ("B", vec!["08:10"])]);
        assert!(next_arrivals(&line, 5, 0, &SimConfig::default()).is_empty());
    }

    #[test]
    fn test_merged_arrivals_sorted_across_lines() {
        let first = line(&[("A", vec!["08:20"]), ("B", vec!["08:30"])]);
        let second = line(&[("A", vec!["08:05"]), ("B", vec!["08:15"])]);
        let now = secs("08:00").unwrap();

        let arrivals = merged_arrivals([(&first, 0), (&second, 0)], now, &SimConfig::default());
        let until: Vec<i64> = arrivals.iter().map(|a| a.time_until_arrival).collect();
        assert_eq!(until, vec![300, 1200]);
    }
}

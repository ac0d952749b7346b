use anyhow::Result;
use std::io::Write;
use transit_sim::prelude::*;
use transit_sim::time::format_countdown;

/// How results are written to stdout
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Human readable lines
    Text,
    /// One JSON object per line
    Json,
}

pub fn position_line(p: &VehiclePosition) -> String {
    let status = match p.phase {
        Phase::InTransit => format!("{} -> {} {:>3.0}%", p.from_stop, p.to_stop, p.progress * 100.0),
        Phase::AtTerminus => format!("at {}", p.from_stop),
    };
    format!(
        "[{}] {} {} #{:<3} {:>9.5},{:>9.5} {:>3.0}°  {}  ({} - {})",
        p.current_time,
        p.kind,
        p.line_id,
        p.run + 1,
        p.lat,
        p.lng,
        p.heading,
        status,
        p.departure_time,
        p.arrival_time
    )
}

pub fn arrival_line(a: &Arrival) -> String {
    let countdown = format_countdown(a.time_until_arrival);
    format!(
        "{:<6} {:<24} #{:<3} {}  {}{}",
        a.line_id,
        a.line_name,
        a.run + 1,
        a.scheduled_time,
        if a.time_until_arrival < 0 { "" } else { "in " },
        countdown
    )
}

pub fn write_positions(out: &mut impl Write, positions: &[VehiclePosition], format: Format) -> Result<()> {
    for p in positions {
        match format {
            Format::Text => writeln!(out, "{}", position_line(p))?,
            Format::Json => writeln!(out, "{}", serde_json::to_string(p)?)?,
        }
    }
    Ok(())
}

pub fn write_arrivals(out: &mut impl Write, arrivals: &[Arrival], format: Format) -> Result<()> {
    if arrivals.is_empty() && format == Format::Text {
        writeln!(out, "No upcoming departures")?;
    }
    for a in arrivals {
        match format {
            Format::Text => writeln!(out, "{}", arrival_line(a))?,
            Format::Json => writeln!(out, "{}", serde_json::to_string(a)?)?,
        }
    }
    Ok(())
}

pub fn write_stops(out: &mut impl Write, stops: &[NearbyStop]) -> Result<()> {
    for s in stops {
        writeln!(
            out,
            "{:>7.0} m  line {:<6} stop {:<3} {}",
            s.distance_m, s.line_id, s.stop_index, s.name
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(phase: Phase) -> VehiclePosition {
        VehiclePosition {
            line_id: LineIdentifier::new("3"),
            kind: TransportKind::Bus,
            run: 0,
            lat: 42.45,
            lng: 18.53,
            heading: 90.0,
            from_stop: "Igalo".into(),
            to_stop: "Meljine".into(),
            progress: 0.5,
            on_route: true,
            phase,
            departure_time: "07:00".into(),
            arrival_time: "07:25".into(),
            current_time: "07:10:00".into(),
        }
    }

    #[test]
    fn test_position_line() {
        let text = position_line(&position(Phase::InTransit));
        assert!(text.starts_with("[07:10:00] bus 3 #1"));
        assert!(text.contains("Igalo -> Meljine  50%"));

        let text = position_line(&position(Phase::AtTerminus));
        assert!(text.contains("at Igalo"));
    }

    #[test]
    fn test_json_positions() {
        let mut out = Vec::new();
        write_positions(&mut out, &[position(Phase::InTransit)], Format::Json).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["line_id"], "3");
        assert_eq!(value["phase"], "in_transit");
        assert_eq!(value["kind"], "bus");
    }

    fn arrival(time_until_arrival: i64) -> Arrival {
        Arrival {
            line_id: LineIdentifier::new("3"),
            line_name: "Igalo - Meljine".into(),
            color: "#e11d48".into(),
            run: 2,
            time_until_arrival,
            scheduled_time: "07:25".into(),
        }
    }

    #[test]
    fn test_arrival_line() {
        let text = arrival_line(&arrival(12 * 60));
        assert!(text.starts_with("3      Igalo - Meljine"));
        assert!(text.ends_with("#3   07:25  in 12 min"));

        let text = arrival_line(&arrival(-30));
        assert!(text.ends_with("07:25  now"), "{text}");
    }

    #[test]
    fn test_empty_arrivals_text() {
        let mut out = Vec::new();
        write_arrivals(&mut out, &[], Format::Text).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No upcoming departures\n");
    }
}

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use geo::Point;
use std::path::PathBuf;
use std::sync::Arc;
use transit_sim::prelude::*;
use transit_sim::time::SECONDS_PER_DAY;

mod data;
mod osrm;
mod output;

use data::{read_config, read_lines, RouteFile};
use osrm::OsrmClient;
use output::{write_arrivals, write_positions, write_stops, Format};

#[derive(Parser, Debug)]
#[command(
    name = "sim-ticker",
    author,
    version,
    about = "Play back a transit timetable as simulated vehicle positions",
    long_about = "Loads a static timetable, obtains one route polyline per line \
                  (from a routes file or a single OSRM request), and prints where \
                  every scheduled vehicle is. No live tracking is involved: positions \
                  come from the timetable alone."
)]
struct Args {
    /// Timetable JSON (array of lines)
    #[arg(short, long, env = "SIM_SCHEDULE", global = true)]
    schedule: Option<PathBuf>,

    /// Simulation settings JSON (defaults are used for missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (show debug messages)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print vehicle positions once
    Positions {
        #[command(flatten)]
        routes: RouteArgs,

        /// Time of day ("HH:mm" or "HH:mm:ss"), defaults to now
        #[arg(long)]
        at: Option<String>,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print vehicle positions on every tick until interrupted
    Watch {
        #[command(flatten)]
        routes: RouteArgs,

        /// Start the simulated clock at this time instead of following the wall clock
        #[arg(long)]
        from: Option<String>,

        /// Simulated seconds per tick interval when --from is given
        #[arg(long, default_value = "1")]
        speed: u32,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Upcoming arrivals at a stop, or at every stop near a point
    Arrivals {
        /// Line id of the stop
        #[arg(long)]
        line: Option<String>,

        /// Stop name on that line
        #[arg(long, requires = "line")]
        stop: Option<String>,

        /// Stop position on that line (0 = origin), for names used more than once
        #[arg(long, requires = "line", conflicts_with = "stop")]
        stop_index: Option<usize>,

        #[arg(long, allow_hyphen_values = true, requires = "lng", conflicts_with = "line")]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lng: Option<f64>,

        /// Search radius in meters around --lat/--lng
        #[arg(long, default_value = "300")]
        radius: f64,

        /// Time of day ("HH:mm" or "HH:mm:ss"), defaults to now
        #[arg(long)]
        at: Option<String>,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// List the stops closest to a point
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// How many stops to list
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,
    },
}

/// Where route polylines come from
#[derive(ClapArgs, Debug)]
struct RouteArgs {
    /// Routes JSON: {"<line id>": [[lat, lng], ...]}
    #[arg(long, conflicts_with = "osrm_url")]
    routes: Option<PathBuf>,

    /// OSRM route service base URL, e.g. http://localhost:5000/route/v1
    #[arg(long, env = "OSRM_URL")]
    osrm_url: Option<String>,

    /// OSRM profile
    #[arg(long, default_value = "driving")]
    osrm_profile: String,
}

impl RouteArgs {
    fn source(&self) -> Result<Arc<dyn PolylineSource>> {
        if let Some(path) = &self.routes {
            let file = RouteFile::read(path)?;
            tracing::info!("Loaded {} routes from {}", file.len(), path.display());
            return Ok(Arc::new(file));
        }
        if let Some(url) = &self.osrm_url {
            tracing::info!("Routing through OSRM at {}", url);
            return Ok(Arc::new(OsrmClient::new(url.clone(), self.osrm_profile.clone())));
        }
        bail!("No route source: pass --routes <file> or --osrm-url <url>");
    }
}

/// Time source for the tick loop
#[derive(Clone, Copy, Debug, PartialEq)]
enum Clock {
    Wall,
    Simulated { start: u32, speed: u32 },
}

impl Clock {
    /// Seconds since midnight at the given tick
    fn at_tick(&self, tick: u64) -> u32 {
        match *self {
            Clock::Wall => now_in_seconds(),
            Clock::Simulated { start, speed } => {
                let elapsed = tick * speed as u64 % SECONDS_PER_DAY as u64;
                ((start as u64 + elapsed) % SECONDS_PER_DAY as u64) as u32
            }
        }
    }
}

fn time_or_now(at: Option<&str>) -> Result<u32> {
    match at {
        Some(text) => parse_clock(text).with_context(|| format!("Invalid --at time {:?}", text)),
        None => Ok(now_in_seconds()),
    }
}

/// Index of the stop picked on the command line.
///
/// A name shared by several stops (a loop line's origin and terminus) has to
/// be disambiguated with `--stop-index`.
fn resolve_stop(line: &Line, name: Option<&str>, index: Option<usize>) -> Result<usize> {
    if let Some(index) = index {
        if index >= line.stops().len() {
            bail!("Line {} has {} stops, no index {}", line.id(), line.stops().len(), index);
        }
        return Ok(index);
    }
    let Some(name) = name else {
        bail!("Pass --stop or --stop-index together with --line");
    };

    let matches: Vec<usize> = line
        .stops()
        .iter()
        .enumerate()
        .filter(|(_, s)| &*s.name == name)
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [] => bail!("Line {} has no stop named {:?}", line.id(), name),
        [only] => Ok(*only),
        many => bail!(
            "Stop {:?} appears {} times on line {} (indices {:?}), pass --stop-index",
            name,
            many.len(),
            line.id(),
            many
        ),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let Some(schedule) = &args.schedule else {
        bail!("No timetable given: pass --schedule <file> or set SIM_SCHEDULE");
    };
    let config = read_config(args.config.as_deref())?;
    let lines = read_lines(schedule)?;
    let sim = Arc::new(Simulator::new(lines, config).context("Invalid timetable")?);

    let stdout = std::io::stdout();

    match args.command {
        Command::Positions { routes, at, format } => {
            let now = time_or_now(at.as_deref())?;
            let source = routes.source()?;
            sim.load_routes(source.as_ref()).await;
            write_positions(&mut stdout.lock(), &sim.tick(now), format)?;
        }

        Command::Watch {
            routes,
            from,
            speed,
            format,
        } => {
            let clock = match from {
                Some(text) => Clock::Simulated {
                    start: time_or_now(Some(&text))?,
                    speed,
                },
                None => Clock::Wall,
            };
            watch(sim, routes.source()?, clock, format).await?;
        }

        Command::Arrivals {
            line,
            stop,
            stop_index,
            lat,
            lng,
            radius,
            at,
            format,
        } => {
            let now = time_or_now(at.as_deref())?;
            let arrivals = match (line, lat, lng) {
                (Some(line), _, _) => {
                    let id = LineIdentifier::new(&line);
                    let found = sim
                        .line(&id)
                        .with_context(|| format!("Unknown line {}", line))?;
                    let index = resolve_stop(found, stop.as_deref(), stop_index)?;
                    sim.next_arrivals(&id, index, now)?
                }
                (None, Some(lat), Some(lng)) => sim.arrivals_near(Point::new(lng, lat), radius, now),
                _ => bail!("Pass either --line with --stop or --stop-index, or --lat and --lng"),
            };
            write_arrivals(&mut stdout.lock(), &arrivals, format)?;
        }

        Command::Nearest { lat, lng, count } => {
            let stops = sim.nearest_stops(Point::new(lng, lat), count);
            write_stops(&mut stdout.lock(), &stops)?;
        }
    }

    Ok(())
}

/// Load routes in the background and print positions on every tick.
///
/// Lines whose route has not arrived yet are skipped until it does.
async fn watch(
    sim: Arc<Simulator>,
    source: Arc<dyn PolylineSource>,
    clock: Clock,
    format: Format,
) -> Result<()> {
    let loader = {
        let sim = sim.clone();
        tokio::spawn(async move { sim.load_routes(source.as_ref()).await })
    };

    let mut interval = tokio::time::interval(sim.config().tick_interval);
    let mut tick: u64 = 0;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = clock.at_tick(tick);
                let positions = sim.tick(now);
                tracing::debug!("tick {} at {}: {} vehicles", tick, format_clock(now), positions.len());
                write_positions(&mut std::io::stdout().lock(), &positions, format)?;
                tick += 1;
            }
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted, stopping");
                break;
            }
        }
    }

    loader.abort();
    Ok(())
}

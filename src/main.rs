use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::bounded;

use mihrab::config::{CompassConfig, HeadingSourceKind};
use mihrab::error::CompassError;
use mihrab::geo::Coordinates;
use mihrab::heading::{MagneticVector, PlatformHeading, SensorEvent};
use mihrab::output::{OutputFormat, create_formatter};
use mihrab::pipeline::{CompassPipeline, LocationState};

#[derive(Parser, Debug)]
#[command(name = "mihrab")]
#[command(about = "Replay or simulate a heading sensor trace through the qibla compass pipeline", long_about = None)]
struct Args {
    /// Sensor trace CSV to replay (ms,heading,accuracy or ms,x,y,z).
    /// Without a trace, a synthetic walk is generated (requires the
    /// `simulation` feature).
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Device latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f32>,

    /// Device longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f32>,

    /// Heading strategy: platform, magnetometer
    #[arg(short = 's', long, value_enum, default_value = "platform")]
    source: HeadingSourceKind,

    /// Output format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print every processed sample in full
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Compass configuration TOML file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Maximum printed snapshots per second
    #[arg(long, default_value = "10.0")]
    output_rate_hz: f32,

    /// Replay at sensor timestamps instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Synthetic walk duration in seconds
    #[arg(long, default_value = "10.0")]
    duration_secs: f32,

    /// Synthetic heading jitter stddev in degrees
    #[arg(long, default_value = "2.0")]
    jitter: f32,

    /// Synthetic walk RNG seed
    #[arg(long, default_value = "7")]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CompassConfig::load(path)?,
        None => CompassConfig::default(),
    };
    config.sensor.source = args.source;

    let mut pipeline = CompassPipeline::new(config, true)?;
    match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => {
            pipeline.set_location_state(LocationState::Granted(Coordinates::new(lat, lon)));
            log::info!(
                "qibla bearing from ({lat}, {lon}): {:.1}°",
                pipeline.qibla().unwrap_or(0.0)
            );
        }
        (None, None) => {
            log::warn!("no location given; dial will not settle toward the qibla");
        }
        _ => anyhow::bail!("--lat and --lon must be given together"),
    }

    let events = match &args.trace {
        Some(path) => load_trace(path)?,
        None => synthetic_trace(&args)?,
    };

    let (event_tx, event_rx) = bounded::<(u64, SensorEvent)>(32);
    let realtime = args.realtime;
    let producer = thread::spawn(move || {
        let started = Instant::now();
        for (t_ms, event) in events {
            if realtime {
                let due = Duration::from_millis(t_ms);
                if let Some(wait) = due.checked_sub(started.elapsed()) {
                    thread::sleep(wait);
                }
            }
            if event_tx.send((t_ms, event)).is_err() {
                break;
            }
        }
    });

    let formatter = create_formatter(args.format, args.verbose);
    if let Some(header) = formatter.header() {
        println!("{header}");
    }

    let output_interval = Duration::from_secs_f32(1.0 / args.output_rate_hz.max(0.1));
    let mut last_output: Option<Instant> = None;

    while let Ok((t_ms, event)) = event_rx.recv() {
        let Some(snapshot) = pipeline.handle_sensor_event(event, t_ms) else {
            continue;
        };

        // Alignment edges always print; everything else is throttled.
        let due = last_output.is_none_or(|at| at.elapsed() >= output_interval);
        if due || snapshot.just_aligned {
            println!("{}", formatter.format(&snapshot));
            last_output = Some(Instant::now());
        }
    }

    producer
        .join()
        .map_err(|_| anyhow::anyhow!("sensor producer thread panicked"))?;
    Ok(())
}

/// Parse a CSV sensor trace. Three fields per line are a platform heading
/// sample (`ms,heading,accuracy_level`), four are a raw magnetometer sample
/// (`ms,x,y,z`). Blank lines and `#` comments are skipped.
fn load_trace(path: &PathBuf) -> anyhow::Result<Vec<(u64, SensorEvent)>> {
    let text = std::fs::read_to_string(path)?;
    let mut events = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let parse = |field: &str| -> Result<f32, CompassError> {
            field.parse().map_err(|_| CompassError::Trace {
                line: idx + 1,
                message: format!("bad number: {field}"),
            })
        };
        let t_ms: u64 = fields[0].parse().map_err(|_| CompassError::Trace {
            line: idx + 1,
            message: format!("bad timestamp: {}", fields[0]),
        })?;
        let event = match fields.len() {
            3 => {
                let heading = parse(fields[1])?;
                let level = parse(fields[2])? as u8;
                SensorEvent::Heading(PlatformHeading::with_true(heading, heading, level))
            }
            4 => SensorEvent::MagneticField(MagneticVector::new(
                parse(fields[1])?,
                parse(fields[2])?,
                parse(fields[3])?,
            )),
            n => {
                return Err(CompassError::Trace {
                    line: idx + 1,
                    message: format!("expected 3 or 4 fields, got {n}"),
                }
                .into());
            }
        };
        events.push((t_ms, event));
    }
    Ok(events)
}

#[cfg(feature = "simulation")]
fn synthetic_trace(args: &Args) -> anyhow::Result<Vec<(u64, SensorEvent)>> {
    let options = mihrab::simulation::TraceOptions {
        duration_ms: (args.duration_secs * 1000.0) as u64,
        jitter_degrees: args.jitter,
        seed: args.seed,
        ..mihrab::simulation::TraceOptions::default()
    };
    Ok(match args.source {
        HeadingSourceKind::Platform => mihrab::simulation::platform_trace(&options, 3),
        HeadingSourceKind::Magnetometer => mihrab::simulation::magnetometer_trace(&options, 50.0),
    })
}

#[cfg(not(feature = "simulation"))]
fn synthetic_trace(_args: &Args) -> anyhow::Result<Vec<(u64, SensorEvent)>> {
    anyhow::bail!("no --trace given and this build lacks the `simulation` feature")
}

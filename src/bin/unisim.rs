//! Unisim command line front-end
//!
//! Preloads every tracked body from the cache (downloading what is missing),
//! then prints the loaded bodies and their state at the current instant.
//!
//! Usage:
//!   cargo run --bin unisim -- [--data-dir ./data] [--center 399] [--focus 301]
//!   cargo run --bin unisim -- --convert

extern crate pretty_env_logger as pel;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};
use log::{error, LevelFilter};
use unisim::constants::DEFAULT_DATA_DIR;
use unisim::data::convert_csv_tree;
use unisim::time::{secs_since_start_of_month, TdbTime};
use unisim::{App, Frame, Loader, Result, UnisimError};

/// Solar system ephemeris loader
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Loads and caches Horizons trajectories of the tracked solar system bodies",
    long_about = None
)]
struct Args {
    /// Cache directory holding meta.json, track_bodies.json and month folders
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Number of consecutive months to preload
    #[arg(long, default_value_t = 2)]
    months: usize,

    /// Identifier of the body trajectories are drawn relative to (the Sun when tracked)
    #[arg(long)]
    center: Option<String>,

    /// Identifier of the body the camera follows (defaults to the center)
    #[arg(long)]
    focus: Option<String>,

    /// Seconds added to the current time
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset: i64,

    /// Write binary files for every cached CSV and exit
    #[arg(long, action = ArgAction::SetTrue)]
    convert: bool,

    /// Log debug output
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

fn print_bodies(app: &App) {
    print_section_header("Loaded bodies");
    println!(
        "{:<10} {:<28} {:>14} {:>12} {:>9}",
        "ID", "Name", "GM (m^3/s^2)", "Radius (m)", "Samples"
    );
    for body in app.bodies() {
        println!(
            "{:<10} {:<28} {:>14.6e} {:>12.4e} {:>9}",
            body.id,
            body.name,
            body.gm,
            body.radius.x,
            body.trajectory.len()
        );
    }
}

fn print_frame(app: &App, frame: &Frame, view_secs: f64) {
    print_section_header(&format!("State at {:.0} s into the month", view_secs));
    if let Some(center) = app.center() {
        println!("Center: {}", center.name);
    }
    if let Some(focus) = app.focus() {
        println!("Focus: {} (camera distance {:.4e} m)", focus.name, app.camera_distance());
    }
    for snapshot in &frame.bodies {
        let p = snapshot.relative.position();
        let v = snapshot.relative.velocity();
        println!(
            "{:<28} r = ({:>13.6e}, {:>13.6e}, {:>13.6e}) m  |v| = {:>10.3} m/s{}",
            snapshot.name,
            p.x,
            p.y,
            p.z,
            v.norm(),
            if snapshot.drawn { "" } else { "  (not drawn)" }
        );
    }
}

fn run(args: Args) -> Result<()> {
    if args.convert {
        let converted = convert_csv_tree(&args.data_dir)?;
        println!("Converted {} CSV files", converted);
        return Ok(());
    }

    let now = Utc::now() + chrono::Duration::seconds(args.offset);
    let bodies = Loader::new()
        .with_data_dir(&args.data_dir)
        .with_months(args.months)
        .preload(now)?;
    println!("preload done.");

    let mut app = App::new(bodies);
    if app.bodies().is_empty() {
        println!(
            "No bodies tracked; add identifiers to {}",
            args.data_dir.join(unisim::constants::TRACK_FILE).display()
        );
        return Ok(());
    }

    app.select(args.center.as_deref(), args.focus.as_deref())?;

    let view_secs = secs_since_start_of_month(TdbTime::from_utc(now), 0);
    print_bodies(&app);
    print_frame(&app, &app.frame(view_secs), view_secs);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    pel::formatted_builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ UnisimError::TransportError(_)) => {
            error!("{}", e);
            ExitCode::from(1)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(2)
        }
    }
}

//! Start PTS probe command line tool
//!
//! Prints the transport-stream start timestamp stored in the ID3v2 tag of
//! an HLS packed audio segment as `{ "start_pts":<n> }`. Prints nothing when
//! the segment carries no timestamp frame.

use pts_probe::probe::{find_timestamp, read_tag_file};
use pts_probe::{ConfigError, ProbeConfig, ProbeResult, StartPts};
use std::env;
use std::io::Write;
use std::process;

/// Print usage information
fn print_usage() {
    println!("Usage: pts-probe -filename <file> [options]");
    println!();
    println!("Options:");
    println!(" -filename <file>  file to parse id3 tags from");
    println!(" -v                enable verbose logging output");
    println!(" -report <file>    write a JSON probe report (diagnostics builds)");
    println!(" -h                this help message");
}

/// Probe the configured file and print its start timestamp
fn run(config: &ProbeConfig) -> ProbeResult<()> {
    let tag = read_tag_file(&config.filename)?;
    let found = find_timestamp(&tag.frames)?;

    if let Some(report_path) = &config.report {
        write_report(config, report_path, &tag, found.as_ref())?;
    }

    if let Some(found) = found {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", StartPts(found.start_pts))?;
        stdout.flush()?;
    }
    Ok(())
}

#[cfg(feature = "diagnostics")]
fn write_report(
    config: &ProbeConfig,
    path: &std::path::Path,
    tag: &pts_probe::Tag,
    found: Option<&pts_probe::TimestampMatch>,
) -> ProbeResult<()> {
    pts_probe::ProbeReport::new(&config.filename, tag, found).save_to_file(path)
}

#[cfg(not(feature = "diagnostics"))]
fn write_report(
    _config: &ProbeConfig,
    path: &std::path::Path,
    _tag: &pts_probe::Tag,
    _found: Option<&pts_probe::TimestampMatch>,
) -> ProbeResult<()> {
    log::warn!(
        "Built without the diagnostics feature, report {} not written",
        path.display()
    );
    Ok(())
}

fn main() {
    let config = match ProbeConfig::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(ConfigError::HelpRequested) => {
            print_usage();
            process::exit(0);
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            process::exit(1);
        }
    };

    // Errors only unless -v; RUST_LOG still overrides
    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    if let Err(err) = config.validate() {
        log::error!("{}", err);
        process::exit(1);
    }

    if let Err(err) = run(&config) {
        log::error!("{}", err);
        process::exit(1);
    }
}

/// Dashboard over the accumulated transition history.
///
/// Loads every transitions CSV from a data directory, applies optional
/// sensor/event/date filters, and prints a table plus a per-sensor scatter
/// strip. `--json` emits the filtered records instead, for downstream
/// plotting. Read-only — never mutates the monitor's files.
///
/// Usage:
///   dashboard <data_dir> [--sensor sensorN]... [--event ON|OFF]...
///             [--date YYYY-MM-DD]... [--json]

use std::path::PathBuf;
use std::process::exit;

use chrono::NaiveDate;

use luxmon_service::dashboard::{
    load_transitions, render_scatter, render_table, to_json, TransitionFilter,
};
use luxmon_service::model::EventKind;

struct Args {
    data_dir: PathBuf,
    filter: TransitionFilter,
    json: bool,
}

fn usage() -> ! {
    eprintln!(
        "usage: dashboard <data_dir> [--sensor sensorN]... [--event ON|OFF]... \
         [--date YYYY-MM-DD]... [--json]"
    );
    exit(2);
}

fn parse_args() -> Args {
    let mut args = std::env::args().skip(1);
    let Some(data_dir) = args.next().filter(|a| !a.starts_with("--")) else {
        usage();
    };

    let mut sensors: Vec<String> = Vec::new();
    let mut events: Vec<EventKind> = Vec::new();
    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut json = false;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--sensor" => match args.next() {
                Some(sensor) => sensors.push(sensor),
                None => usage(),
            },
            "--event" => match args.next().as_deref().and_then(EventKind::parse) {
                Some(event) => events.push(event),
                None => usage(),
            },
            "--date" => {
                let parsed = args
                    .next()
                    .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());
                match parsed {
                    Some(date) => dates.push(date),
                    None => usage(),
                }
            }
            "--json" => json = true,
            _ => usage(),
        }
    }

    let filter = TransitionFilter {
        sensors: if sensors.is_empty() { None } else { Some(sensors) },
        events: if events.is_empty() { None } else { Some(events) },
        dates: if dates.is_empty() { None } else { Some(dates) },
    };
    Args { data_dir: PathBuf::from(data_dir), filter, json }
}

fn main() {
    let args = parse_args();

    let loaded = match load_transitions(&args.data_dir) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("cannot load {}: {}", args.data_dir.display(), err);
            exit(1);
        }
    };

    let filtered = args.filter.retain(&loaded.records);

    if args.json {
        match to_json(&filtered) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("serialization failed: {}", err);
                exit(1);
            }
        }
        return;
    }

    println!(
        "Loaded {} transition(s) from {} file(s){}",
        loaded.records.len(),
        loaded.files_read,
        if loaded.rows_skipped > 0 {
            format!(", skipped {} corrupt row(s)", loaded.rows_skipped)
        } else {
            String::new()
        }
    );
    println!();
    print!("{}", render_table(&filtered));
    println!();
    print!("{}", render_scatter(&filtered));
}

#![allow(clippy::print_stdout)]

mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use serde::Deserialize;
use timelane_core::model::{Event, EventsGroup};
use timelane_protocol::{Era, EraConstraints, TimeRange};

/// One event in the input file. Only `label`, `min`, and `max` are
/// required.
#[derive(Debug, Deserialize)]
struct EventRecord {
    label: String,
    min: i64,
    max: i64,
    #[serde(default)]
    classes: Vec<String>,
    #[serde(default)]
    min_edge: Option<TimeRange>,
    #[serde(default)]
    max_edge: Option<TimeRange>,
    #[serde(default = "default_draggable")]
    draggable: bool,
}

fn default_draggable() -> bool {
    true
}

fn load(path: &Path) -> Result<EventsGroup> {
    let data =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let records: Vec<EventRecord> =
        serde_json::from_slice(&data).context("events file must be a JSON array of events")?;

    let mut group = EventsGroup::new();
    for record in records {
        ensure!(
            record.min <= record.max,
            "event {:?}: min {} exceeds max {}",
            record.label,
            record.min,
            record.max
        );
        let event = Event::new(record.label, Era::new(record.min, record.max))
            .with_classes(record.classes.into_iter().collect())
            .with_constraints(EraConstraints::new(record.min_edge, record.max_edge))
            .with_allows_user_drag(record.draggable);
        group.add_event(event)?;
    }
    Ok(group)
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: timelane <events.json> [width]");
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[1]);
    let width: usize = match args.get(2) {
        Some(raw) => raw.parse().context("width must be a positive integer")?,
        None => 100,
    };
    if width < 20 {
        bail!("width must be at least 20 columns");
    }

    let group = load(&path)?;
    for line in render::render(&group, width) {
        println!("{line}");
    }
    println!("{} events in {} lane(s)", group.len(), group.lanes().len());
    Ok(())
}

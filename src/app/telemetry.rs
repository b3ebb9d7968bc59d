//! Tracking sinks: where interaction events end up.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::tracking::{TrackingEvent, TrackingSink};

/// Emits every event as a structured log line on the `tracking` target.
#[derive(Debug, Default)]
pub struct LogSink;

impl TrackingSink for LogSink {
    fn record(&mut self, event: &TrackingEvent) {
        tracing::info!(
            target: "tracking",
            action = %event.action,
            category = %event.category,
            label = %event.label,
            "event"
        );
    }
}

#[derive(Serialize)]
struct Record<'a> {
    timestamp: String,
    #[serde(flatten)]
    event: &'a TrackingEvent,
}

/// Appends one JSON object per event to a file.
pub struct JsonLinesSink {
    path: PathBuf,
    out: BufWriter<File>,
}

impl JsonLinesSink {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open tracking log {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }

    fn write(&mut self, event: &TrackingEvent) -> Result<()> {
        let record = Record {
            timestamp: chrono::Local::now().to_rfc3339(),
            event,
        };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl TrackingSink for JsonLinesSink {
    fn record(&mut self, event: &TrackingEvent) {
        if let Err(err) = self.write(event) {
            tracing::warn!(path = %self.path.display(), %err, "tracking record lost");
        }
    }
}

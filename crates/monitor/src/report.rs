//! Console reporting of USB additions

use clap::ValueEnum;
use protocol::{DeviceDetail, ReportableAttributes};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// How reported events are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable block per event
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Writes reportable events to an output sink
pub struct Reporter<W> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Write one event and flush
    pub fn report(&mut self, attrs: &ReportableAttributes) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => self.write_text(attrs)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, attrs)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    fn write_text(&mut self, attrs: &ReportableAttributes) -> io::Result<()> {
        writeln!(self.out, "---- USB Add Event ----")?;
        writeln!(self.out, "Devpath: {}", attrs.devpath)?;
        match &attrs.detail {
            Some(DeviceDetail::Type(code)) => writeln!(self.out, "Type: {}", code),
            Some(DeviceDetail::Interface(code)) => writeln!(self.out, "Interface: {}", code),
            None => Ok(()),
        }
    }
}

//! Reporting sinks for decoded packets.
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::debug;

use crate::packet::EotPacket;
use crate::Result;

/// CSV log column names, in row order.
pub const CSV_HEADER: [&str; 9] = [
    "Timestamp",
    "Unit Address",
    "Pressure",
    "Motion",
    "Marker Light",
    "Turbine",
    "Battery Cond",
    "Battery Charge",
    "Arm Status",
];

// Local ISO-8601 with microseconds, e.g., 2018-08-09T12:34:56.123456
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const CONSOLE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Receives every valid packet, in the order decoded.
pub trait Sink: Send {
    /// # Errors
    /// Any error is fatal to the dispatch loop.
    fn report(&mut self, packet: &EotPacket) -> Result<()>;
}

/// The reported fields of a packet, in [CSV_HEADER] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Unit Address")]
    pub unit_address: u32,
    #[serde(rename = "Pressure")]
    pub pressure: u8,
    #[serde(rename = "Motion")]
    pub motion: String,
    #[serde(rename = "Marker Light")]
    pub marker_light: String,
    #[serde(rename = "Turbine")]
    pub turbine: String,
    #[serde(rename = "Battery Cond")]
    pub battery_condition: String,
    #[serde(rename = "Battery Charge")]
    pub battery_charge: u8,
    #[serde(rename = "Arm Status")]
    pub arm_status: String,
}

impl Summary {
    pub fn new(packet: &EotPacket, timestamp: String) -> Self {
        Summary {
            timestamp,
            unit_address: packet.unit_address,
            pressure: packet.pressure,
            motion: packet.motion_text().to_string(),
            marker_light: packet.marker_light_text().to_string(),
            turbine: packet.turbine_text().to_string(),
            battery_condition: packet.battery_condition.to_string(),
            battery_charge: packet.battery_charge_percent(),
            arm_status: packet.arm_status().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human readable block.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Writes each packet to a writer, typically stdout.
pub struct ConsoleReport<W>
where
    W: Write + Send,
{
    writer: W,
    format: Format,
}

impl<W> ConsoleReport<W>
where
    W: Write + Send,
{
    pub fn new(writer: W, format: Format) -> Self {
        ConsoleReport { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_text(&mut self, packet: &EotPacket, now: &DateTime<Local>) -> Result<()> {
        let w = &mut self.writer;
        writeln!(w)?;
        writeln!(w, "EOT {}", now.format(CONSOLE_FORMAT))?;
        writeln!(w, "---------------------")?;
        writeln!(w, "Unit Address:   {}", packet.unit_address)?;
        writeln!(w, "Pressure:       {} psig", packet.pressure)?;
        writeln!(w, "Motion:         {}", packet.motion_text())?;
        writeln!(w, "Marker Light:   {}", packet.marker_light_text())?;
        writeln!(w, "Turbine:        {}", packet.turbine_text())?;
        writeln!(w, "Battery Cond:   {}", packet.battery_condition)?;
        writeln!(w, "Battery Charge: {}%", packet.battery_charge_percent())?;
        writeln!(w, "Arm Status:     {}", packet.arm_status())?;
        Ok(())
    }
}

impl<W> Sink for ConsoleReport<W>
where
    W: Write + Send,
{
    fn report(&mut self, packet: &EotPacket) -> Result<()> {
        let now = Local::now();
        match self.format {
            Format::Text => self.write_text(packet, &now)?,
            Format::Json => {
                let summary = Summary::new(packet, now.format(ISO_FORMAT).to_string());
                serde_json::to_writer(&mut self.writer, &summary)?;
                writeln!(self.writer)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Append-only CSV log with one row per packet.
///
/// The file is created, or truncated, with a header row when the log is opened and
/// each row is flushed as it is written.
pub struct CsvLog {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvLog {
    /// Create a log in `dir` named for the current local time, creating `dir` if
    /// necessary.
    ///
    /// # Errors
    /// If the directory or file cannot be created.
    pub fn create_in(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let name = format!("eot_log_{}.csv", Local::now().format(ISO_FORMAT));
        Self::create(&dir.join(name))
    }

    /// Create a log at `path`.
    ///
    /// # Errors
    /// If the file cannot be created or the header cannot be written.
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        debug!("logging packets to {path:?}");
        Ok(CsvLog {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for CsvLog {
    fn report(&mut self, packet: &EotPacket) -> Result<()> {
        let summary = Summary::new(packet, Local::now().format(ISO_FORMAT).to_string());
        self.writer.serialize(&summary)?;
        self.writer.flush()?;
        Ok(())
    }
}

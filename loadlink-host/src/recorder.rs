//! CSV recording of received samples
//!
//! One header row (`Time (s)` followed by the channel labels), then one
//! row per sample: seconds since contact, then the channel values.

use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header of the time column
pub const TIME_HEADER: &str = "Time (s)";

/// Row-per-sample CSV writer
pub struct Recorder<W: Write> {
    out: W,
    channels: usize,
    rows: u64,
}

impl Recorder<BufWriter<File>> {
    /// Create (or truncate) a CSV file
    pub fn create<P: AsRef<Path>>(path: P, labels: &[String]) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        log::info!("Recording to {}", path.as_ref().display());
        Self::new(BufWriter::new(file), labels)
    }
}

impl<W: Write> Recorder<W> {
    /// Start a recording; writes the header row
    pub fn new(mut out: W, labels: &[String]) -> Result<Self> {
        write!(out, "{}", TIME_HEADER)?;
        for label in labels {
            write!(out, ",{}", escape(label))?;
        }
        writeln!(out)?;

        Ok(Self {
            out,
            channels: labels.len(),
            rows: 0,
        })
    }

    /// Append one sample row
    ///
    /// Values beyond the header's channel count are dropped; missing ones
    /// leave empty cells so columns stay aligned.
    pub fn record(&mut self, elapsed_s: f64, values: &[f32]) -> Result<()> {
        write!(self.out, "{:.3}", elapsed_s)?;
        for index in 0..self.channels {
            match values.get(index) {
                Some(value) => write!(self.out, ",{}", value)?,
                None => write!(self.out, ",")?,
            }
        }
        writeln!(self.out)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far (header excluded)
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush buffered rows
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Quote a CSV field when it contains a delimiter or quote
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn text(recorder: Recorder<Vec<u8>>) -> String {
        String::from_utf8(recorder.into_inner()).unwrap()
    }

    #[test]
    fn test_header_row() {
        let recorder = Recorder::new(Vec::new(), &labels(&["Load Cell 1 (N)", "Load Cell 2 (N)"])).unwrap();
        assert_eq!(text(recorder), "Time (s),Load Cell 1 (N),Load Cell 2 (N)\n");
    }

    #[test]
    fn test_rows() {
        let mut recorder = Recorder::new(Vec::new(), &labels(&["Fz", "Fx"])).unwrap();
        recorder.record(0.0, &[12.5, -3.0]).unwrap();
        recorder.record(0.25, &[13.0, -2.5]).unwrap();

        assert_eq!(recorder.rows(), 2);
        assert_eq!(
            text(recorder),
            "Time (s),Fz,Fx\n0.000,12.5,-3\n0.250,13,-2.5\n"
        );
    }

    #[test]
    fn test_short_sample_keeps_columns() {
        let mut recorder = Recorder::new(Vec::new(), &labels(&["a", "b", "c"])).unwrap();
        recorder.record(1.0, &[1.0]).unwrap();
        assert_eq!(text(recorder), "Time (s),a,b,c\n1.000,1,,\n");
    }

    #[test]
    fn test_label_escaping() {
        let recorder = Recorder::new(Vec::new(), &labels(&["force, z", "say \"hi\""])).unwrap();
        assert_eq!(
            text(recorder),
            "Time (s),\"force, z\",\"say \"\"hi\"\"\"\n"
        );
    }
}

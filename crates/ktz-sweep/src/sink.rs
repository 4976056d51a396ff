// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Result Sinks
//!
//! A sink receives an optional header followed by rows in grid order. The
//! text sink writes the whitespace-separated format read by plotting
//! scripts:
//!
//! ```text
//! x_R T ISI Frequency
//! -0.199 0.234 7 3
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{SweepError, SweepResult};
use crate::row::ResultRow;

/// Consumer of sweep output
pub trait ResultSink {
    /// Called once before any row
    fn begin(&mut self, header: Option<&str>) -> SweepResult<()>;

    fn write_row(&mut self, row: &ResultRow) -> SweepResult<()>;

    /// Called once after the last row
    fn finish(&mut self) -> SweepResult<()>;
}

/// Space-separated, newline-terminated text output
#[derive(Debug)]
pub struct DelimitedTextSink<W: Write> {
    writer: W,
    rows_written: usize,
}

impl DelimitedTextSink<BufWriter<File>> {
    /// Create (or truncate) the output file
    pub fn create(path: &Path) -> SweepResult<Self> {
        let file = File::create(path).map_err(|source| SweepError::OutputFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> DelimitedTextSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            rows_written: 0,
        }
    }

    /// Write one row of raw values
    pub fn write_fields(&mut self, fields: &[f64]) -> SweepResult<()> {
        let mut first = true;
        for value in fields {
            if first {
                write!(self.writer, "{}", value)?;
                first = false;
            } else {
                write!(self.writer, " {}", value)?;
            }
        }
        self.writer.write_all(b"\n")?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for DelimitedTextSink<W> {
    fn begin(&mut self, header: Option<&str>) -> SweepResult<()> {
        if let Some(header) = header {
            writeln!(self.writer, "{}", header)?;
        }
        Ok(())
    }

    fn write_row(&mut self, row: &ResultRow) -> SweepResult<()> {
        writeln!(self.writer, "{}", row)?;
        self.rows_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> SweepResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects rows in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub header: Option<String>,
    pub rows: Vec<ResultRow>,
    pub finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for MemorySink {
    fn begin(&mut self, header: Option<&str>) -> SweepResult<()> {
        self.header = header.map(str::to_string);
        self.rows.clear();
        self.finished = false;
        Ok(())
    }

    fn write_row(&mut self, row: &ResultRow) -> SweepResult<()> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> SweepResult<()> {
        self.finished = true;
        Ok(())
    }
}

//! Diagnostic output sinks for power monitor elements
//!
//! A power monitor can stream one record per quadrature point: the global
//! position, the polar angle and the power-density integrand. The sink
//! abstraction keeps the numerical kernel independent of any particular
//! stream or file type; inactive sinks are skipped entirely and never change
//! the computed power.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// One power-density record, emitted per quadrature point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerSample {
    /// Radial coordinate of the quadrature point
    pub r: f64,
    /// Axial coordinate of the quadrature point
    pub z: f64,
    /// Polar angle atan2(r, z), measured from the symmetry axis
    pub theta: f64,
    /// Power-density integrand at the point
    pub integrand: f64,
}

/// Consumer of per-quadrature-point power diagnostics
pub trait PowerSink {
    /// Whether records should be produced at all
    ///
    /// Inactive sinks receive neither group markers nor records.
    fn is_active(&self) -> bool {
        true
    }

    /// Marks the start of a new face element's group of records
    fn begin_face(&mut self) -> io::Result<()>;

    /// Accept one record
    fn record(&mut self, sample: &PowerSample) -> io::Result<()>;
}

/// Sink that discards everything
///
/// Power computed against this sink is bit-identical to power computed
/// against any other inactive sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PowerSink for NullSink {
    fn is_active(&self) -> bool {
        false
    }

    fn begin_face(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn record(&mut self, _sample: &PowerSample) -> io::Result<()> {
        Ok(())
    }
}

/// Plain-text sink: a `ZONE` marker per face element, then one
/// `r z theta integrand` line per quadrature point
#[derive(Debug)]
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PowerSink for TextSink<W> {
    fn begin_face(&mut self) -> io::Result<()> {
        writeln!(self.writer, "ZONE")
    }

    fn record(&mut self, sample: &PowerSample) -> io::Result<()> {
        writeln!(
            self.writer,
            "{} {} {} {}",
            sample.r, sample.z, sample.theta, sample.integrand
        )
    }
}

/// Sink that collects records in memory, grouped per face element
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    /// One group of samples per face element that reported
    pub faces: Vec<Vec<PowerSample>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of recorded samples across all faces
    pub fn len(&self) -> usize {
        self.faces.iter().map(|f| f.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.iter().all(|f| f.is_empty())
    }
}

impl PowerSink for MemorySink {
    fn begin_face(&mut self) -> io::Result<()> {
        self.faces.push(Vec::new());
        Ok(())
    }

    fn record(&mut self, sample: &PowerSample) -> io::Result<()> {
        match self.faces.last_mut() {
            Some(face) => face.push(*sample),
            // record without a preceding group marker
            None => self.faces.push(vec![*sample]),
        }
        Ok(())
    }
}

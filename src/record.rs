//! Trajectory files for offline playback.
//!
//! The binary format is a flat sequence of packed little-endian records,
//! one per timestep. This is the `=3f3fi` struct layout the plotting
//! tooling reads, which is native order only on little-endian hosts.
//!
//! | offset | field      | type       |
//! |--------|------------|------------|
//! | 0      | position   | `[f32; 3]` |
//! | 12     | velocity   | `[f32; 3]` |
//! | 24     | step index | `i32`      |

use std::io::{self, BufWriter, Read, Write};

use nalgebra::Vector3;

use crate::{
    error::{Result, SimError},
    sim::Sample,
};

pub const RECORD_SIZE: usize = 28;

pub fn encode(sample: &Sample) -> Result<[u8; RECORD_SIZE]> {
    let index = i32::try_from(sample.index).map_err(|_| SimError::IndexOverflow(sample.index))?;
    let mut buf = [0u8; RECORD_SIZE];
    let fields = sample.position.iter().chain(sample.velocity.iter());
    for (chunk, value) in buf.chunks_exact_mut(4).zip(fields) {
        chunk.copy_from_slice(&value.to_le_bytes());
    }
    buf[24..].copy_from_slice(&index.to_le_bytes());
    Ok(buf)
}

pub fn decode(buf: &[u8; RECORD_SIZE]) -> Sample {
    let f = |i: usize| {
        let off = i * 4;
        f32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
    };
    let index = i32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]);
    Sample {
        index: index as u32,
        position: Vector3::new(f(0), f(1), f(2)),
        velocity: Vector3::new(f(3), f(4), f(5)),
    }
}

/// Buffered writer of binary trajectory records.
pub struct TrajectoryWriter<W: Write> {
    out: BufWriter<W>,
    records: u64,
}

impl<W: Write> TrajectoryWriter<W> {
    pub fn new(inner: W) -> Self {
        TrajectoryWriter {
            out: BufWriter::new(inner),
            records: 0,
        }
    }

    pub fn write(&mut self, sample: &Sample) -> Result<()> {
        self.out.write_all(&encode(sample)?)?;
        self.records += 1;
        Ok(())
    }

    /// Flush and return the number of records written and the inner writer.
    pub fn finish(self) -> Result<(u64, W)> {
        let records = self.records;
        let inner = self.out.into_inner().map_err(|e| e.into_error())?;
        Ok((records, inner))
    }
}

/// Reads records back until a clean end of input.
pub struct TrajectoryReader<R: Read> {
    input: R,
}

impl<R: Read> TrajectoryReader<R> {
    pub fn new(input: R) -> Self {
        TrajectoryReader { input }
    }

    pub fn read_all(self) -> Result<Vec<Sample>> {
        self.collect()
    }

    fn read_record(&mut self) -> Result<Option<Sample>> {
        let mut buf = [0u8; RECORD_SIZE];
        let mut filled = 0;
        while filled < RECORD_SIZE {
            match self.input.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(None),
            RECORD_SIZE => Ok(Some(decode(&buf))),
            len => Err(SimError::TruncatedRecord { len }),
        }
    }
}

impl<R: Read> Iterator for TrajectoryReader<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// Write samples as a pretty-printed JSON array.
pub fn write_json<W: Write>(out: W, samples: &[Sample]) -> Result<()> {
    let mut out = BufWriter::new(out);
    serde_json::to_writer_pretty(&mut out, samples)?;
    out.flush()?;
    Ok(())
}

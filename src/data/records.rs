//! Packed binary trajectory records and CSV row ingestion
//!
//! A `.csv.bin` file is a bare sequence of fixed-size records, one per
//! [`State`]: seven little-endian `f64` values in the order
//! `time, x, y, z, vx, vy, vz`. There is no header, count or checksum; the
//! file length must be a whole multiple of [`RECORD_SIZE`].

use crate::celestial::State;
use crate::constants::KM_TO_M;
use crate::{Result, UnisimError};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Size of one binary record in bytes (7 x f64)
pub const RECORD_SIZE: usize = 7 * 8;

/// Write one state as a binary record
#[inline]
pub fn write_record<W: Write>(writer: &mut W, state: &State) -> io::Result<()> {
    for value in [
        state.time, state.x, state.y, state.z, state.vx, state.vy, state.vz,
    ] {
        writer.write_f64::<LittleEndian>(value)?;
    }
    Ok(())
}

/// Read one binary record
#[inline]
pub fn read_record<R: Read>(reader: &mut R) -> io::Result<State> {
    Ok(State {
        time: reader.read_f64::<LittleEndian>()?,
        x: reader.read_f64::<LittleEndian>()?,
        y: reader.read_f64::<LittleEndian>()?,
        z: reader.read_f64::<LittleEndian>()?,
        vx: reader.read_f64::<LittleEndian>()?,
        vy: reader.read_f64::<LittleEndian>()?,
        vz: reader.read_f64::<LittleEndian>()?,
    })
}

/// Encode states into an in-memory buffer
pub fn encode_states(states: &[State]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(states.len() * RECORD_SIZE);
    for state in states {
        // Writing into a Vec cannot fail
        let _ = write_record(&mut buffer, state);
    }
    buffer
}

/// Decode a buffer of back-to-back records
pub fn decode_states(bytes: &[u8]) -> Result<Vec<State>> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(UnisimError::DataError(format!(
            "Binary trajectory length {} is not a multiple of {} bytes",
            bytes.len(),
            RECORD_SIZE
        )));
    }

    let mut reader = bytes;
    let mut states = Vec::with_capacity(bytes.len() / RECORD_SIZE);
    while !reader.is_empty() {
        states.push(read_record(&mut reader)?);
    }
    Ok(states)
}

/// Save states to a binary trajectory file
pub fn save_states<P: AsRef<Path>>(path: P, states: &[State]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for state in states {
        write_record(&mut writer, state)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load states from a binary trajectory file
pub fn load_states<P: AsRef<Path>>(path: P) -> Result<Vec<State>> {
    let file = File::open(&path)?;
    let mut bytes = Vec::new();
    BufReader::new(file).read_to_end(&mut bytes)?;
    decode_states(&bytes).map_err(|e| {
        UnisimError::DataError(format!("{}: {}", path.as_ref().display(), e))
    })
}

/// One row of the Horizons vector table, in km and km/s
#[derive(Debug, Deserialize, PartialEq)]
pub struct VectorRow {
    #[serde(rename = "JDTDB")]
    pub jd: f64,
    #[serde(rename = "Calendar Date (TDB)")]
    pub date: String,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
    #[serde(rename = "VX")]
    pub vx: f64,
    #[serde(rename = "VY")]
    pub vy: f64,
    #[serde(rename = "VZ")]
    pub vz: f64,
}

impl VectorRow {
    /// Convert to meters and swap into the viewer's axes
    ///
    /// The viewer is y-up: ecliptic Z becomes -y and ecliptic Y becomes z.
    /// The calendar date column is dropped.
    pub fn to_state(&self) -> State {
        State {
            time: self.jd,
            x: self.x * KM_TO_M,
            y: -self.z * KM_TO_M,
            z: self.y * KM_TO_M,
            vx: self.vx * KM_TO_M,
            vy: -self.vz * KM_TO_M,
            vz: self.vy * KM_TO_M,
        }
    }
}

/// Parse the reduced CSV produced by the decoder into states
pub fn parse_vector_csv<R: Read>(reader: R) -> Result<Vec<State>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut states = Vec::new();
    for row in csv_reader.deserialize::<VectorRow>() {
        states.push(row?.to_state());
    }
    Ok(states)
}

/// Parse a reduced CSV file into states
pub fn load_vector_csv<P: AsRef<Path>>(path: P) -> Result<Vec<State>> {
    let file = File::open(path)?;
    parse_vector_csv(BufReader::new(file))
}

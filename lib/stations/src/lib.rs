pub use anyhow::Result;

use std::fmt;

pub type Map<K, V> = fnv::FnvHashMap<K, V>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    MalformedRecord { line: usize, reason: String },
    MissingColumn { line: usize, column: usize },
    NotEnoughStations { requested: usize, available: usize },
}


impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedRecord { line, reason } => write!(f, "malformed record on line {}: {}", line, reason),
            Error::MissingColumn { line, column } => write!(f, "line {} has no column {}", line, column),
            Error::NotEnoughStations { requested, available } =>
                write!(f, "requested {} stations but only {} are available", requested, available),
        }
    }
}

impl std::error::Error for Error {}


pub mod dataset;
pub mod derived;
pub mod raw;
pub mod select;

mod parsers;
pub use parsers::{
    ParseTable,
    LocationsCsv,
    DistancesCsv,
    PopulationCsv,
    HubDistanceCsv,
    DelayCsv,
};

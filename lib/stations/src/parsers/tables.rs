use std::path::Path;
use anyhow::Context;
use crate::{Result, Map};
use crate::raw::*;
use super::{
  ParseTable,
  common::*,
};

/// Station locations: `name, lat, lon, ...`
#[derive(Debug, Copy, Clone)]
pub struct LocationsCsv<P>(pub P);

/// Directed pairwise distances: `from, to, distance`
#[derive(Debug, Copy, Clone)]
pub struct DistancesCsv<P>(pub P);

/// Population served: station in column 1, value in column 3.
#[derive(Debug, Copy, Clone)]
pub struct PopulationCsv<P>(pub P);

/// Distance to the nearest alternate-mode hub: station in column 0, value in column 2.
#[derive(Debug, Copy, Clone)]
pub struct HubDistanceCsv<P>(pub P);

/// Expected delay: station in column 1, value in column 3.
#[derive(Debug, Copy, Clone)]
pub struct DelayCsv<P>(pub P);

fn read(path: &Path) -> Result<String> {
  std::fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))
}

pub(crate) fn locations(data: &str) -> Result<LocationTable> {
  let mut table = Vec::new();
  for (line, fields) in records(data)? {
    let name = column(line, &fields, 0)?.to_string();
    let lat = float_column(line, &fields, 1)?;
    let lon = float_column(line, &fields, 2)?;
    table.push((name, (lat, lon)));
  }
  Ok(LocationTable(table))
}

pub(crate) fn distances(data: &str) -> Result<DistanceRecords> {
  let mut entries = Vec::new();
  for (line, fields) in records(data)? {
    let from = column(line, &fields, 0)?.to_string();
    let to = column(line, &fields, 1)?.to_string();
    let d = float_column(line, &fields, 2)?;
    entries.push((from, to, d));
  }
  Ok(DistanceRecords::from_entries(entries))
}

pub(crate) fn metric(data: &str, key: usize, value: usize) -> Result<MetricTable> {
  let mut table = Map::default();
  for (line, fields) in records(data)? {
    let station = column(line, &fields, key)?.to_string();
    let v = float_column(line, &fields, value)?;
    table.insert(station, v);
  }
  Ok(MetricTable(table))
}

impl<P: AsRef<Path>> ParseTable<LocationsCsv<P>> for LocationTable {
  fn parse(input: LocationsCsv<P>) -> Result<Self> {
    let path = input.0.as_ref();
    locations(&read(path)?).with_context(|| format!("failed to parse {:?}", path))
  }
}

impl<P: AsRef<Path>> ParseTable<DistancesCsv<P>> for DistanceRecords {
  fn parse(input: DistancesCsv<P>) -> Result<Self> {
    let path = input.0.as_ref();
    distances(&read(path)?).with_context(|| format!("failed to parse {:?}", path))
  }
}

impl<P: AsRef<Path>> ParseTable<PopulationCsv<P>> for MetricTable {
  fn parse(input: PopulationCsv<P>) -> Result<Self> {
    let path = input.0.as_ref();
    metric(&read(path)?, 1, 3).with_context(|| format!("failed to parse {:?}", path))
  }
}

impl<P: AsRef<Path>> ParseTable<HubDistanceCsv<P>> for MetricTable {
  fn parse(input: HubDistanceCsv<P>) -> Result<Self> {
    let path = input.0.as_ref();
    metric(&read(path)?, 0, 2).with_context(|| format!("failed to parse {:?}", path))
  }
}

impl<P: AsRef<Path>> ParseTable<DelayCsv<P>> for MetricTable {
  fn parse(input: DelayCsv<P>) -> Result<Self> {
    let path = input.0.as_ref();
    metric(&read(path)?, 1, 3).with_context(|| format!("failed to parse {:?}", path))
  }
}

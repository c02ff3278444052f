use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing::*;

use crate::parsers::*;
use crate::raw::*;


/// File names inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNames {
  pub locations: String,
  pub distances: String,
  pub population: String,
  pub hub_distance: String,
  pub delay: String,
}

impl Default for FileNames {
  fn default() -> Self {
    FileNames {
      locations: "bus_station_location.csv".to_string(),
      distances: "station_distance.csv".to_string(),
      population: "station_pop_clean.csv".to_string(),
      hub_distance: "bus_metro_distance.csv".to_string(),
      delay: "metro_delay.csv".to_string(),
    }
  }
}


/// A directory holding the five station tables.  Either given explicitly or taken from the
/// `DATA_ROOT` environment variable.
#[derive(Debug, Clone)]
pub struct DataDir {
  dir: PathBuf,
  files: FileNames,
}

impl DataDir {
  pub fn new(dir: impl AsRef<Path>) -> Result<DataDir> {
    let dir = dir.as_ref();
    let ctx = format!("try read directory {:?}", dir);
    let dir = dir.canonicalize().context(ctx)?;
    Ok(DataDir { dir, files: FileNames::default() })
  }

  pub fn from_env() -> Result<DataDir> {
    let root = std::env::var("DATA_ROOT").context("environment variable DATA_ROOT must be defined")?;
    Self::new(root)
  }

  pub fn with_files(mut self, files: FileNames) -> Self {
    self.files = files;
    self
  }

  pub fn dir(&self) -> &Path { &self.dir }

  fn path(&self, name: &str) -> PathBuf {
    self.dir.join(name)
  }

  #[instrument(level = "debug", skip(self), fields(dir = ?self.dir))]
  pub fn load(&self) -> Result<RawStationData> {
    let f = &self.files;
    let data = RawStationData {
      locations: LocationTable::parse(LocationsCsv(self.path(&f.locations)))?,
      distances: DistanceRecords::parse(DistancesCsv(self.path(&f.distances)))?,
      population: MetricTable::parse(PopulationCsv(self.path(&f.population)))?,
      hub_distance: MetricTable::parse(HubDistanceCsv(self.path(&f.hub_distance)))?,
      delay: MetricTable::parse(DelayCsv(self.path(&f.delay)))?,
    };
    info!(
      stations = data.locations.0.len(),
      distances = data.distances.len(),
      "loaded station data"
    );
    Ok(data)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  fn write_fixture(dir: &Path) -> Result<()> {
    fs::write(dir.join("bus_station_location.csv"), "name,lat,lon\nA,40.70,-73.90\nB,40.71,-73.91\n")?;
    fs::write(dir.join("station_distance.csv"), "from,to,distance\nA,B,12.5\n")?;
    fs::write(dir.join("station_pop_clean.csv"), "id,station,year,pop\n0,A,2020,100\n1,B,2020,50\n")?;
    fs::write(dir.join("bus_metro_distance.csv"), "station,metro,distance\nA,M1,0.4\nB,M2,1.1\n")?;
    fs::write(dir.join("metro_delay.csv"), "id,station,line,delay\n0,A,4,3.5\n1,B,6,1.0\n")?;
    Ok(())
  }

  #[test]
  fn load_directory() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    write_fixture(tmp.path())?;
    let data = DataDir::new(tmp.path())?.load()?;
    assert_eq!(data.locations.0.len(), 2);
    assert_eq!(data.distances.0[0].distance, 12.5);
    assert_eq!(data.population.0["B"], 50.0);
    assert_eq!(data.hub_distance.0["B"], 1.1);
    assert_eq!(data.delay.0["A"], 3.5);
    Ok(())
  }

  #[test]
  fn missing_file() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    assert!(DataDir::new(tmp.path())?.load().is_err());
    Ok(())
  }

  #[test]
  fn missing_directory() {
    assert!(DataDir::new("/definitely/not/a/data/dir").is_err());
  }
}

use std::borrow::Cow;
use crate::Map;

pub type StationId = String;

/// `(latitude, longitude)`
pub type Coord = (f64, f64);

pub trait FromRaw<T> where Self: Sized {
  fn from_raw(raw: T, id: Cow<str>) -> Self;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceRecord {
  pub from: StationId,
  pub to: StationId,
  pub distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationTable(pub Vec<(StationId, Coord)>);

/// Directed distance entries in file order.  A repeated `(from, to)` key replaces the earlier
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceRecords(pub Vec<DistanceRecord>);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTable(pub Map<StationId, f64>);

impl DistanceRecords {
  pub fn from_entries(entries: impl IntoIterator<Item=(StationId, StationId, f64)>) -> Self {
    let mut records: Vec<DistanceRecord> = Vec::new();
    let mut position: Map<(StationId, StationId), usize> = Map::default();
    for (from, to, distance) in entries {
      match position.get(&(from.clone(), to.clone())) {
        Some(&k) => records[k].distance = distance,
        None => {
          position.insert((from.clone(), to.clone()), records.len());
          records.push(DistanceRecord { from, to, distance });
        }
      }
    }
    DistanceRecords(records)
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// Everything read from a data directory, before any station selection has been applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStationData {
  pub locations: LocationTable,
  pub distances: DistanceRecords,
  /// Population served by each station (demand axis).
  pub population: MetricTable,
  /// Distance to the nearest alternate-mode hub (isolation axis).
  pub hub_distance: MetricTable,
  /// Expected delay at the station (service axis).
  pub delay: MetricTable,
}

impl RawStationData {
  /// Replace the station list with `selected` and drop metric rows of stations that are no longer
  /// present.  The distance table is left untouched; the graph builder filters it.
  pub fn restrict(self, selected: Vec<(StationId, Coord)>) -> Self {
    let keep = |table: MetricTable| -> MetricTable {
      MetricTable(table.0.into_iter()
        .filter(|(id, _)| selected.iter().any(|(s, _)| s == id))
        .collect())
    };
    RawStationData {
      population: keep(self.population),
      hub_distance: keep(self.hub_distance),
      delay: keep(self.delay),
      distances: self.distances,
      locations: LocationTable(selected),
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duplicate_distance_keeps_position() {
    let d = DistanceRecords::from_entries(vec![
      ("a".to_string(), "b".to_string(), 1.0),
      ("b".to_string(), "c".to_string(), 2.0),
      ("a".to_string(), "b".to_string(), 3.0),
    ]);
    assert_eq!(d.len(), 2);
    assert_eq!(d.0[0].distance, 3.0);
    assert_eq!(d.0[1].from, "b");
  }

  #[test]
  fn restrict_drops_unselected_metrics() {
    let mut raw = RawStationData::default();
    raw.locations = LocationTable(vec![("a".into(), (0.0, 0.0)), ("b".into(), (1.0, 1.0))]);
    raw.population.0.insert("a".into(), 10.0);
    raw.population.0.insert("b".into(), 20.0);
    raw.delay.0.insert("b".into(), 2.0);

    let raw = raw.restrict(vec![("a".into(), (0.0, 0.0))]);
    assert_eq!(raw.locations.0.len(), 1);
    assert_eq!(raw.population.0.len(), 1);
    assert!(raw.delay.0.is_empty());
  }
}

use crate::Map;
use crate::raw::{DistanceRecords, MetricTable};

/// Distance from each station to the closest *other* station it has a distance entry to.  Only
/// stations that appear as a source in `distances` get a value.
pub fn nearest_site_distance(distances: &DistanceRecords) -> MetricTable {
  let mut nearest: Map<String, f64> = Map::default();
  for r in distances.0.iter().filter(|r| r.from != r.to) {
    nearest.entry(r.from.clone())
      .and_modify(|d| *d = d.min(r.distance))
      .or_insert(r.distance);
  }
  MetricTable(nearest)
}

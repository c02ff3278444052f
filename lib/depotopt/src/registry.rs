use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use tracing::*;

use stations::raw::{FromRaw, RawStationData};
use crate::*;

/// The three per-station axes feeding the node cost.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Metric {
    /// `f`: population served
    Demand,
    /// `g`: distance to the nearest alternate-mode hub
    Isolation,
    /// `h`: expected delay
    Delay,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Demand, Metric::Isolation, Metric::Delay];

    fn slot(self) -> usize {
        match self {
            Metric::Demand => 0,
            Metric::Isolation => 1,
            Metric::Delay => 2,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}


/// Every value of a metric is the same, so min-max scaling would divide by zero.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DegenerateMetricError {
    pub metric: Option<Metric>,
    pub value: f64,
}

impl fmt::Display for DegenerateMetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.metric {
            Some(m) => write!(f, "metric {} is constant ({}) and cannot be normalized", m, self.value),
            None => write!(f, "metric is constant ({}) and cannot be normalized", self.value),
        }
    }
}

impl std::error::Error for DegenerateMetricError {}


/// What to do when a metric is constant over its domain.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DegeneratePolicy {
    Fail,
    /// Give every station this normalized value.
    Fill(f64),
}

impl Default for DegeneratePolicy {
    fn default() -> Self { DegeneratePolicy::Fail }
}


/// Min-max scale `values` onto `[0, 1]`.  An empty map normalizes to an empty map.
pub fn normalize<K: Clone + Eq + Hash>(values: &Map<K, f64>) -> Result<Map<K, f64>, DegenerateMetricError> {
    let mut it = values.values().copied();
    let first = match it.next() {
        None => return Ok(Map::default()),
        Some(v) => v,
    };
    let (min, max) = it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if max == min {
        return Err(DegenerateMetricError { metric: None, value: min });
    }
    let range = max - min;
    return Ok(values.iter().map(|(k, &v)| (k.clone(), (v - min) / range)).collect());
}


#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedMetrics {
    pub demand: Map<StationId, f64>,
    pub isolation: Map<StationId, f64>,
    pub delay: Map<StationId, f64>,
}

impl NormalizedMetrics {
    pub fn get(&self, metric: Metric) -> &Map<StationId, f64> {
        match metric {
            Metric::Demand => &self.demand,
            Metric::Isolation => &self.isolation,
            Metric::Delay => &self.delay,
        }
    }

    fn get_mut(&mut self, metric: Metric) -> &mut Map<StationId, f64> {
        match metric {
            Metric::Demand => &mut self.demand,
            Metric::Isolation => &mut self.isolation,
            Metric::Delay => &mut self.delay,
        }
    }

    /// `(f, g, h)` for `station`, if all three are present.
    pub fn triple(&self, station: &str) -> Option<(f64, f64, f64)> {
        Some((*self.demand.get(station)?, *self.isolation.get(station)?, *self.delay.get(station)?))
    }
}


/// Stations with their positions, in insertion order, and the raw metric values.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    pub id: String,
    order: Vec<StationId>,
    positions: Map<StationId, Coord>,
    raw: [Map<StationId, f64>; 3],
}

impl StationRegistry {
    pub fn new(id: impl Into<String>) -> Self {
        StationRegistry { id: id.into(), ..Default::default() }
    }

    /// Register a station.  Registering it again moves it nowhere; only the position is updated.
    pub fn insert_station(&mut self, station: impl Into<StationId>, position: Coord) {
        let station = station.into();
        if self.positions.insert(station.clone(), position).is_none() {
            self.order.push(station);
        }
    }

    pub fn set_metric(&mut self, metric: Metric, station: &str, value: f64) -> anyhow::Result<()> {
        if !self.positions.contains_key(station) {
            return Err(Error::UnknownStation(station.to_string()).into());
        }
        self.raw[metric.slot()].insert(station.to_string(), value);
        Ok(())
    }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn station_ids(&self) -> &[StationId] { &self.order }

    pub fn stations<'a>(&'a self) -> impl Iterator<Item=(&'a StationId, Coord)> + 'a {
        self.order.iter().map(move |s| (s, self.positions[s]))
    }

    pub fn position(&self, station: &str) -> Option<Coord> {
        self.positions.get(station).copied()
    }

    pub fn raw_metric(&self, metric: Metric) -> &Map<StationId, f64> {
        &self.raw[metric.slot()]
    }

    /// Normalize each metric over the stations that have a value for it.
    #[instrument(level = "debug", skip(self), fields(registry = %self.id))]
    pub fn normalized(&self, policy: DegeneratePolicy) -> Result<NormalizedMetrics, DegenerateMetricError> {
        let mut out = NormalizedMetrics::default();
        for &m in &Metric::ALL {
            let raw = self.raw_metric(m);
            let scaled = match normalize(raw) {
                Ok(scaled) => scaled,
                Err(e) => match policy {
                    DegeneratePolicy::Fail => return Err(DegenerateMetricError { metric: Some(m), ..e }),
                    DegeneratePolicy::Fill(v) => {
                        warn!(metric = %m, value = e.value, fill = v, "constant metric, filling");
                        raw.keys().map(|k| (k.clone(), v)).collect()
                    }
                }
            };
            *out.get_mut(m) = scaled;
        }
        Ok(out)
    }
}

impl FromRaw<RawStationData> for StationRegistry {
    fn from_raw(raw: RawStationData, id: Cow<str>) -> Self {
        let mut reg = StationRegistry::new(id.into_owned());
        for (station, position) in raw.locations.0 {
            reg.insert_station(station, position);
        }
        let tables = [(Metric::Demand, raw.population), (Metric::Isolation, raw.hub_distance), (Metric::Delay, raw.delay)];
        for (m, table) in tables.iter() {
            for (station, &v) in &table.0 {
                if reg.set_metric(*m, station, v).is_err() {
                    trace!(metric = %m, %station, "metric for unregistered station ignored");
                }
            }
        }
        return reg
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use stations::raw::{LocationTable, MetricTable};

    fn map(entries: &[(&str, f64)]) -> Map<StationId, f64> {
        entries.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn normalize_simple() {
        let n = normalize(&map(&[("a", 2.0), ("b", 4.0), ("c", 3.0)])).unwrap();
        assert_eq!(n["a"], 0.0);
        assert_eq!(n["b"], 1.0);
        assert_eq!(n["c"], 0.5);
    }

    #[test]
    fn normalize_constant() {
        let e = normalize(&map(&[("a", 7.0), ("b", 7.0)])).unwrap_err();
        assert_eq!(e.value, 7.0);
        assert!(normalize(&map(&[("a", 1.0)])).is_err());
        assert!(normalize(&Map::<StationId, f64>::default()).unwrap().is_empty());
    }

    #[test]
    fn registry_order_is_insertion_order() {
        let mut reg = StationRegistry::new("t");
        reg.insert_station("z", (0.0, 0.0));
        reg.insert_station("a", (1.0, 1.0));
        reg.insert_station("z", (2.0, 2.0));
        assert_eq!(reg.station_ids(), &["z".to_string(), "a".to_string()]);
        assert_eq!(reg.position("z"), Some((2.0, 2.0)));
        assert!(reg.set_metric(Metric::Delay, "q", 1.0).is_err());
    }

    #[test]
    fn degenerate_policy() {
        let mut reg = StationRegistry::new("t");
        for (k, s) in ["a", "b"].iter().enumerate() {
            reg.insert_station(*s, (0.0, 0.0));
            reg.set_metric(Metric::Demand, s, k as f64).unwrap();
            reg.set_metric(Metric::Isolation, s, k as f64).unwrap();
            reg.set_metric(Metric::Delay, s, 3.0).unwrap();
        }
        let e = reg.normalized(DegeneratePolicy::Fail).unwrap_err();
        assert_eq!(e.metric, Some(Metric::Delay));

        let n = reg.normalized(DegeneratePolicy::Fill(0.5)).unwrap();
        assert_eq!(n.delay["a"], 0.5);
        assert_eq!(n.demand["b"], 1.0);
        assert_eq!(n.triple("a"), Some((0.0, 0.0, 0.5)));
    }

    #[test]
    fn from_raw_ignores_unknown_stations() {
        let mut raw = RawStationData::default();
        raw.locations = LocationTable(vec![("a".into(), (1.0, 2.0))]);
        raw.population = MetricTable(map(&[("a", 1.0), ("ghost", 2.0)]));
        let reg = StationRegistry::from_raw(raw, "bus".into());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.raw_metric(Metric::Demand).len(), 1);
        assert_eq!(reg.id, "bus");
    }

    proptest! {
        #[test]
        fn normalized_range(values in proptest::collection::vec(-1e6..1e6f64, 2..40)) {
            let m: Map<usize, f64> = values.iter().copied().enumerate().collect();
            let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assume!(lo < hi);
            let n = normalize(&m).unwrap();
            for (k, &v) in &m {
                prop_assert!((0.0..=1.0).contains(&n[k]));
                if v == lo { prop_assert_eq!(n[k], 0.0); }
                if v == hi { prop_assert_eq!(n[k], 1.0); }
            }
        }
    }
}

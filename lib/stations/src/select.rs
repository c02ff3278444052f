//! Choosing the working set of stations: a spatial window around a centre point followed by a
//! seeded random subsample.
use itertools::Itertools;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::*;

use crate::{Error, Result};
use crate::raw::{StationId, Coord};

/// Squared coordinate distance from `center` must lie in `[start/100, end/100]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Window {
  pub center: Coord,
  pub start: f64,
  pub end: f64,
}

impl Default for Window {
  fn default() -> Self {
    Window { center: (40.76903, -73.969649), start: 1.0, end: 20.0 }
  }
}

impl Window {
  pub fn contains(&self, p: Coord) -> bool {
    let d2 = (p.0 - self.center.0).powi(2) + (p.1 - self.center.1).powi(2);
    self.start / 100.0 <= d2 && d2 <= self.end / 100.0
  }
}

pub fn within_window(stations: &[(StationId, Coord)], window: &Window) -> Vec<(StationId, Coord)> {
  let kept: Vec<_> = stations.iter()
    .filter(|(_, p)| window.contains(*p))
    .cloned()
    .collect();
  debug!(before = stations.len(), after = kept.len(), ?window, "spatial window");
  kept
}

/// Pick `n` stations uniformly at random without replacement.  The result keeps the input order,
/// and the same `seed` always picks the same stations.
pub fn subsample(stations: Vec<(StationId, Coord)>, n: usize, seed: u64) -> Result<Vec<(StationId, Coord)>> {
  if n > stations.len() {
    return Err(Error::NotEnoughStations { requested: n, available: stations.len() }.into());
  }
  let mut rng = ChaCha8Rng::seed_from_u64(seed);
  let chosen: Vec<usize> = rand::seq::index::sample(&mut rng, stations.len(), n)
    .into_iter()
    .sorted()
    .collect();

  let mut chosen = chosen.into_iter().peekable();
  let picked = stations.into_iter()
    .enumerate()
    .filter_map(|(k, s)| {
      if chosen.peek() == Some(&k) {
        chosen.next();
        Some(s)
      } else {
        None
      }
    })
    .collect();
  Ok(picked)
}

use std::io;
use anyhow::Result;
use itertools::Itertools;

use crate::*;
use crate::graph::NodeIndex;
use crate::registry::StationRegistry;
use crate::solve::DecodedSample;

#[derive(Debug, Clone, PartialEq)]
pub struct Depot {
    pub name: StationId,
    pub lat: f64,
    pub lon: f64,
}

/// The winning assignment keyed by station, in node-index order.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub assignment: Vec<(StationId, u8)>,
    pub energy: f64,
}

impl Solution {
    pub fn from_sample(index: &NodeIndex, sample: &DecodedSample) -> Self {
        let assignment = sample.assignment.iter()
            .enumerate()
            .map(|(i, &x)| (index.name(i).clone(), x))
            .collect();
        Solution { assignment, energy: sample.energy }
    }

    pub fn assignment_map(&self) -> Map<StationId, u8> {
        self.assignment.iter().cloned().collect()
    }

    pub fn selected<'a>(&'a self) -> impl Iterator<Item=&'a StationId> + 'a {
        self.assignment.iter().filter(|(_, x)| *x == 1).map(|(s, _)| s)
    }

    pub fn depots(&self, registry: &StationRegistry) -> Result<Vec<Depot>> {
        self.selected()
            .map(|s| {
                let (lat, lon) = registry.position(s).ok_or_else(|| Error::UnknownStation(s.clone()))?;
                Ok(Depot { name: s.clone(), lat, lon })
            })
            .collect()
    }
}

/// `{ "depots": [ { "lat": .., "lon": .. }, .. ] }`
pub fn depots_json(depots: &[Depot]) -> json::JsonValue {
    let list: json::JsonValue = depots.iter()
        .map(|d| json::object! { lat: d.lat, lon: d.lon })
        .collect_vec()
        .into();
    json::object! { depots: list }
}

pub fn write_depots(depots: &[Depot], mut buf: impl io::Write) -> Result<()> {
    depots_json(depots).write_pretty(&mut buf, 2)?;
    return Ok(())
}

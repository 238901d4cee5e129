//! Population statistics.

use std::collections::BTreeMap;

use mycelia_topology::{Mesh, NodeId, Role};
use serde::Serialize;

/// Mean and standard deviation of a degree sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DegreeStats {
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
}

impl DegreeStats {
    pub fn from_degrees(degrees: impl IntoIterator<Item = usize>) -> Self {
        let degrees: Vec<f64> = degrees.into_iter().map(|d| d as f64).collect();
        let count = degrees.len();
        if count == 0 {
            return Self::default();
        }
        let mean = degrees.iter().sum::<f64>() / count as f64;
        let variance = degrees.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / count as f64;
        Self {
            count,
            mean,
            stddev: variance.sqrt(),
        }
    }

    fn of(mesh: &Mesh, nodes: &[NodeId], keep: impl Fn(Role) -> bool) -> Self {
        Self::from_degrees(
            nodes
                .iter()
                .filter(|&&n| keep(mesh.role(n)))
                .map(|&n| mesh.degree(n)),
        )
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Snapshot of the live population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub cycle: u64,
    pub live: usize,
    pub roles: BTreeMap<Role, usize>,
    pub degree: DegreeStats,
    pub biomass_degree: DegreeStats,
    pub hypha_degree: DegreeStats,
    pub mean_parent_target: f64,
    /// Hyphal parents per biomass node, as seen at the end of each node's
    /// last turn
    pub mean_observed_parents: f64,
    /// Concentration summed over every live node
    pub total_signal: f64,
}

impl Report {
    pub fn capture(mesh: &Mesh, cycle: u64) -> Self {
        let live = mesh.live_nodes();
        let mut roles = BTreeMap::new();
        for &n in &live {
            *roles.entry(mesh.role(n)).or_insert(0) += 1;
        }
        let mean_parent_target = mean(live.iter().map(|&n| mesh.profile(n).parent_target()));
        let mean_observed_parents = mean(
            live.iter()
                .filter(|&&n| mesh.role(n) == Role::Biomass)
                .map(|&n| f64::from(mesh.profile(n).observed_parents)),
        );
        Self {
            cycle,
            live: live.len(),
            degree: DegreeStats::of(mesh, &live, |_| true),
            biomass_degree: DegreeStats::of(mesh, &live, |r| r == Role::Biomass),
            hypha_degree: DegreeStats::of(mesh, &live, Role::is_hyphal),
            mean_parent_target,
            mean_observed_parents,
            total_signal: live.iter().map(|&n| mesh.concentration(n)).sum(),
            roles,
        }
    }

    pub fn count(&self, role: Role) -> usize {
        self.roles.get(&role).copied().unwrap_or(0)
    }
}

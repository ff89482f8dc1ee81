//! Fixed-shape feature encoding of the world state for training records.

use crate::moves::Phase;
use crate::state::WorldGraph;
use serde::{Deserialize, Serialize};

/// Numeric features per territory, after the owner one-hot.
pub const NODE_STATS: [&str; 7] = [
    "total_units",
    "avg_attack",
    "avg_defense",
    "frac_in_combat",
    "avg_moved",
    "is_victory_city",
    "in_battle",
];

/// Phases with a slot in the global one-hot. Placement has none.
pub const GLOBAL_PHASES: [Phase; 3] = [Phase::Purchase, Phase::Combat, Phase::NonCombat];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEncoding {
    /// One row per territory in map order: owner one-hot, then [`NODE_STATS`].
    pub node_features: Vec<Vec<f32>>,
    /// Territory x territory 0/1 matrix.
    pub adjacency: Vec<Vec<f32>>,
    /// Phase one-hot over [`GLOBAL_PHASES`].
    pub global_features: Vec<f32>,
}

impl StateEncoding {
    /// Width of a node feature row for a graph with `owners` owner records.
    pub fn node_width(owners: usize) -> usize {
        owners + NODE_STATS.len()
    }
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, n) = values.fold((0.0f32, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f32
    }
}

/// Encode the current graph as seen during `phase`.
pub fn encode(graph: &WorldGraph, phase: Phase) -> StateEncoding {
    let owners: Vec<&str> = graph.owners().map(|o| o.name.as_str()).collect();
    let catalog = graph.catalog();
    let n = graph.territories().len();

    let node_features = graph
        .territories()
        .iter()
        .enumerate()
        .map(|(id, territory)| {
            let mut row: Vec<f32> = owners
                .iter()
                .map(|&o| if o == territory.owner { 1.0 } else { 0.0 })
                .collect();

            let stacks = &territory.units;
            // Only purchasable types carry combat stats
            let rules = || {
                stacks
                    .iter()
                    .filter_map(|s| catalog.get(&s.unit))
                    .filter(|r| r.cost.is_some())
            };
            let total_units: u32 = stacks.iter().map(|s| s.quantity).sum();

            row.extend([
                total_units as f32,
                mean(rules().map(|r| r.attack as f32)),
                mean(rules().map(|r| r.defense as f32)),
                mean(stacks.iter().map(|s| if s.props.was_in_combat { 1.0 } else { 0.0 })),
                mean(stacks.iter().map(|s| s.props.already_moved as f32)),
                if graph.is_victory_city(id) { 1.0 } else { 0.0 },
                if territory.props.battle { 1.0 } else { 0.0 },
            ]);
            row
        })
        .collect();

    let adjacency = (0..n)
        .map(|a| {
            let mut row = vec![0.0f32; n];
            for b in graph.neighbors_of(a) {
                row[b] = 1.0;
            }
            row
        })
        .collect();

    let global_features = GLOBAL_PHASES
        .iter()
        .map(|&p| if p == phase { 1.0 } else { 0.0 })
        .collect();

    StateEncoding {
        node_features,
        adjacency,
        global_features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::WAS_IN_COMBAT;
    use crate::testing::sample_graph;

    #[test]
    fn test_shapes() {
        let graph = sample_graph();
        let enc = encode(&graph, Phase::Purchase);
        assert_eq!(enc.node_features.len(), 5);
        assert!(enc
            .node_features
            .iter()
            .all(|row| row.len() == StateEncoding::node_width(2)));
        assert_eq!(enc.adjacency.len(), 5);
        assert_eq!(enc.global_features, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_place_has_no_phase_slot() {
        let graph = sample_graph();
        assert_eq!(encode(&graph, Phase::Place).global_features, vec![0.0; 3]);
        assert_eq!(
            encode(&graph, Phase::NonCombat).global_features,
            vec![0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_moscow_row() {
        let mut graph = sample_graph();
        let moscow = graph.territory_id("Moscow").unwrap();
        graph.set_unit_property(moscow, "infantry", "Russians", WAS_IN_COMBAT, "true");
        graph.mark_battle(moscow);

        let enc = encode(&graph, Phase::Combat);
        // Owners sorted: Germans, Russians
        let row = &enc.node_features[moscow];
        assert_eq!(&row[..2], &[0.0, 1.0]);
        // factory + aaGun + 3 infantry
        assert_eq!(row[2], 5.0);
        // factory and aaGun have no production rule; only infantry counts
        assert!((row[3] - 1.0).abs() < 1e-6);
        assert!((row[4] - 2.0).abs() < 1e-6);
        // one of three stacks in combat
        assert!((row[5] - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(row[6], 0.0);
        assert_eq!(row[7], 1.0);
        assert_eq!(row[8], 1.0);
    }

    #[test]
    fn test_neutral_has_zero_owner_vector() {
        let graph = sample_graph();
        let ukraine = graph.territory_id("Ukraine").unwrap();
        let enc = encode(&graph, Phase::Purchase);
        assert_eq!(&enc.node_features[ukraine][..2], &[0.0, 0.0]);
        assert_eq!(enc.node_features[ukraine][2], 0.0);
    }

    #[test]
    fn test_stats_ignore_unpurchasable_units() {
        let graph = sample_graph();
        let berlin = graph.territory_id("Berlin").unwrap();
        let poland = graph.territory_id("Poland").unwrap();
        let enc = encode(&graph, Phase::Purchase);
        // Berlin: factory + 2 infantry averages like Poland's lone infantry
        assert_eq!(enc.node_features[berlin][3], enc.node_features[poland][3]);
        assert_eq!(enc.node_features[berlin][4], enc.node_features[poland][4]);
        assert_eq!(enc.node_features[berlin][4], 2.0);
    }

    #[test]
    fn test_adjacency_symmetric() {
        let graph = sample_graph();
        let enc = encode(&graph, Phase::Purchase);
        for a in 0..5 {
            assert_eq!(enc.adjacency[a][a], 0.0);
            for b in 0..5 {
                assert_eq!(enc.adjacency[a][b], enc.adjacency[b][a]);
            }
        }
        assert_eq!(enc.adjacency[0].iter().sum::<f32>(), 2.0);
    }
}

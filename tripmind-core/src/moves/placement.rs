//! Placement: assign each pending unit type to a factory or leave it unplaced.

use crate::state::WorldGraph;
use serde::Serialize;

/// Place all pending units of one type in one factory territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementMove {
    pub unit: String,
    pub to: String,
    pub quantity: u32,
}

/// Cartesian product of pending unit types x (factories + "not this turn").
///
/// Each candidate lists the placed types only, so the all-unplaced assignment
/// is an empty list. The last unit type varies fastest. Returns nothing when
/// the player has no factory or nothing pending.
pub fn placement_moves(graph: &WorldGraph, player: &str) -> Vec<Vec<PlacementMove>> {
    let factories: Vec<&str> = graph
        .factories_of(player)
        .into_iter()
        .map(|id| graph.territory(id).name.as_str())
        .collect();
    if factories.is_empty() {
        return Vec::new();
    }

    let pending: Vec<(&str, u32)> = graph
        .unplaced_of(player)
        .map(|pool| {
            pool.iter()
                .filter(|&(_, &n)| n > 0)
                .map(|(unit, &n)| (unit.as_str(), n))
                .collect()
        })
        .unwrap_or_default();
    if pending.is_empty() {
        return Vec::new();
    }

    // Choice index per pending type; factories.len() means "not placed"
    let options = factories.len() + 1;
    let mut choice = vec![0usize; pending.len()];
    let mut moves = Vec::new();

    loop {
        moves.push(
            pending
                .iter()
                .zip(&choice)
                .filter_map(|(&(unit, quantity), &c)| {
                    factories.get(c).map(|&to| PlacementMove {
                        unit: unit.to_string(),
                        to: to.to_string(),
                        quantity,
                    })
                })
                .collect(),
        );

        // Odometer increment, rightmost digit first
        let mut digit = pending.len();
        loop {
            if digit == 0 {
                return moves;
            }
            digit -= 1;
            choice[digit] += 1;
            if choice[digit] < options {
                break;
            }
            choice[digit] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_graph, MapRecordBuilder};

    #[test]
    fn test_nothing_pending() {
        let graph = sample_graph();
        assert!(placement_moves(&graph, "Russians").is_empty());
    }

    #[test]
    fn test_single_factory_assignments() {
        let mut graph = sample_graph();
        graph.add_unplaced("Russians", "infantry", 2);
        graph.add_unplaced("Russians", "armour", 1);

        let moves = placement_moves(&graph, "Russians");
        // (Moscow | none) x (Moscow | none)
        assert_eq!(moves.len(), 4);
        assert_eq!(
            moves[0],
            vec![
                PlacementMove {
                    unit: "armour".into(),
                    to: "Moscow".into(),
                    quantity: 1
                },
                PlacementMove {
                    unit: "infantry".into(),
                    to: "Moscow".into(),
                    quantity: 2
                },
            ]
        );
        assert_eq!(moves[1].len(), 1);
        assert_eq!(moves[1][0].unit, "armour");
        assert!(moves[3].is_empty());
    }

    #[test]
    fn test_two_factories() {
        let record = MapRecordBuilder::new()
            .territory("A", "Red")
            .territory("B", "Red")
            .player("Red", 0)
            .factory("A", "Red")
            .factory("B", "Red")
            .build();
        let mut graph = WorldGraph::from_record(&record);
        graph.add_unplaced("Red", "infantry", 1);
        graph.add_unplaced("Red", "tank", 1);

        let moves = placement_moves(&graph, "Red");
        assert_eq!(moves.len(), 9);
        assert!(moves
            .iter()
            .flatten()
            .all(|p| p.to == "A" || p.to == "B"));
    }

    #[test]
    fn test_no_factory_no_placement() {
        let mut graph = sample_graph();
        let moscow = graph.territory_id("Moscow").unwrap();
        graph.remove_units(moscow, "factory", "Russians", 1);
        graph.add_unplaced("Russians", "infantry", 1);
        assert!(placement_moves(&graph, "Russians").is_empty());
    }
}

//! Combat and non-combat movement: bounded BFS from every mobile stack.

use super::{Phase, IMMOBILE_UNITS};
use crate::state::{TerritoryId, WorldGraph};
use game_pathfinding::{BoundedBfs, Visit};
use serde::Serialize;

/// Move one stack (any number of its units) to a destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementMove {
    pub delegate: Phase,
    pub from: String,
    pub to: String,
    /// Edges travelled, 1 for a neighbor.
    pub steps: u32,
    pub unit: String,
    /// Size of the moving stack.
    pub max_quantity: u32,
    pub target_owner: String,
    /// Territory names, `from` first and `to` last.
    pub path: Vec<String>,
}

/// Attacks: destinations not owned by `player`, reached within the unit's
/// movement range. Own territory may be crossed but is never a destination.
pub fn combat_moves(graph: &WorldGraph, player: &str) -> Vec<MovementMove> {
    stack_moves(graph, player, Phase::Combat, |graph, node| {
        if graph.owner_of(node) == player {
            Visit::PASS_THROUGH
        } else {
            Visit::RECORD_AND_EXPAND
        }
    })
}

/// Repositioning: destinations owned by `player`, reached without leaving
/// friendly territory.
pub fn noncombat_moves(graph: &WorldGraph, player: &str) -> Vec<MovementMove> {
    stack_moves(graph, player, Phase::NonCombat, |graph, node| {
        if graph.owner_of(node) == player {
            Visit::RECORD_AND_EXPAND
        } else {
            Visit::SKIP
        }
    })
}

/// Run one search per mobile stack of `player`. Each stack gets its own visited
/// set, so stacks in different territories may report the same destination.
fn stack_moves<F>(graph: &WorldGraph, player: &str, phase: Phase, policy: F) -> Vec<MovementMove>
where
    F: Fn(&WorldGraph, TerritoryId) -> Visit,
{
    let catalog = graph.catalog();
    let mut moves = Vec::new();

    for (from, territory) in graph.territories().iter().enumerate() {
        for stack in &territory.units {
            if stack.owner != player || stack.quantity == 0 {
                continue;
            }
            if IMMOBILE_UNITS.contains(&stack.unit.as_str()) {
                continue;
            }
            let range = catalog.movement(&stack.unit);
            if range == 0 {
                continue;
            }

            let reached = BoundedBfs::explore(graph, from, range, |&node| policy(graph, node));
            moves.extend(reached.into_iter().map(|r| MovementMove {
                delegate: phase,
                from: territory.name.clone(),
                to: graph.territory(r.node).name.clone(),
                steps: r.steps,
                unit: stack.unit.clone(),
                max_quantity: stack.quantity,
                target_owner: graph.owner_of(r.node).to_string(),
                path: r
                    .path
                    .iter()
                    .map(|&id| graph.territory(id).name.clone())
                    .collect(),
            }));
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_graph, MapRecordBuilder};

    fn destinations(moves: &[MovementMove], unit: &str) -> Vec<String> {
        let mut to: Vec<String> = moves
            .iter()
            .filter(|m| m.unit == unit)
            .map(|m| m.to.clone())
            .collect();
        to.sort();
        to
    }

    #[test]
    fn test_combat_from_sample() {
        let graph = sample_graph();
        let moves = combat_moves(&graph, "Russians");

        // Infantry (range 1) in Moscow reaches only neutral Ukraine
        let infantry: Vec<_> = moves.iter().filter(|m| m.unit == "infantry").collect();
        assert_eq!(infantry.len(), 1);
        assert_eq!(infantry[0].to, "Ukraine");
        assert_eq!(infantry[0].max_quantity, 3);
        assert_eq!(infantry[0].target_owner, "Neutral");

        // Armour (range 2) in Karelia: Ukraine, then Poland through it; Moscow is own land
        assert_eq!(destinations(&moves, "armour"), vec!["Poland", "Ukraine"]);
        let poland = moves.iter().find(|m| m.to == "Poland").unwrap();
        assert_eq!(poland.steps, 2);
        assert_eq!(poland.path, vec!["Karelia", "Ukraine", "Poland"]);

        // Factories and AA guns stay put
        assert!(moves.iter().all(|m| m.unit != "factory" && m.unit != "aaGun"));
    }

    #[test]
    fn test_combat_crosses_own_territory() {
        let record = MapRecordBuilder::new()
            .territory("Home", "Red")
            .territory("Road", "Red")
            .territory("Enemy", "Blue")
            .connect("Home", "Road")
            .connect("Road", "Enemy")
            .unit("armour", 3, 3, 2)
            .units("Home", "armour", "Red", 1)
            .build();
        let graph = WorldGraph::from_record(&record);
        let moves = combat_moves(&graph, "Red");
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, "Enemy");
        assert_eq!(moves[0].path, vec!["Home", "Road", "Enemy"]);
    }

    #[test]
    fn test_noncombat_from_sample() {
        let graph = sample_graph();
        let moves = noncombat_moves(&graph, "Russians");
        assert_eq!(destinations(&moves, "infantry"), vec!["Karelia"]);
        assert_eq!(destinations(&moves, "armour"), vec!["Moscow"]);
        assert!(moves.iter().all(|m| m.delegate == Phase::NonCombat));
    }

    #[test]
    fn test_noncombat_stops_at_hostile_border() {
        let record = MapRecordBuilder::new()
            .territory("A", "Red")
            .territory("B", "Blue")
            .territory("C", "Red")
            .connect("A", "B")
            .connect("B", "C")
            .unit("armour", 3, 3, 2)
            .units("A", "armour", "Red", 2)
            .build();
        let graph = WorldGraph::from_record(&record);
        assert!(noncombat_moves(&graph, "Red").is_empty());
    }

    #[test]
    fn test_foreign_stacks_ignored() {
        let graph = sample_graph();
        let moves = combat_moves(&graph, "Germans");
        assert!(moves.iter().all(|m| m.from == "Poland" || m.from == "Berlin"));
        // German infantry in Poland attacks Ukraine
        assert!(moves.iter().any(|m| m.from == "Poland" && m.to == "Ukraine"));
    }

    #[test]
    fn test_zero_movement_stack_stays() {
        let record = MapRecordBuilder::new()
            .territory("A", "Red")
            .territory("B", "Blue")
            .connect("A", "B")
            .unit("fortress", 0, 4, 0)
            .units("A", "fortress", "Red", 1)
            .build();
        let graph = WorldGraph::from_record(&record);
        assert!(combat_moves(&graph, "Red").is_empty());
    }
}

//! Applying classified change lines to the [`WorldGraph`].
//!
//! [`tripmind_txt::Classifier`] knows what a line says; this module knows what
//! it means for the graph. Composite batches are expanded with an explicit
//! work stack so adversarial nesting cannot exhaust the call stack.

use crate::state::WorldGraph;
use std::collections::{BTreeMap, HashMap};
use tripmind_txt::{ChangeEvent, Classifier, UnitToken};

/// Properties waiting for their unit to show up, keyed by `(unit, owner)`.
type PendingProps = HashMap<(String, String), BTreeMap<String, String>>;

/// Stateful parser: the classifier plus the pending-properties buffer that
/// outlives a single line.
#[derive(Debug, Clone)]
pub struct ChangeParser {
    classifier: Classifier,
    pending: PendingProps,
}

impl ChangeParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            classifier: Classifier::new()?,
            pending: HashMap::new(),
        })
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Apply one protocol line to `graph`.
    ///
    /// Never fails: lines and fragments that match no known form are logged
    /// at debug level and dropped, and the rest of the batch still applies.
    pub fn apply(&mut self, graph: &mut WorldGraph, line: &str, nested: bool) {
        // Depth-first, in order: push fragments reversed
        let mut work: Vec<(String, bool)> = vec![(line.to_string(), nested)];

        while let Some((text, nested)) = work.pop() {
            match self.classifier.classify(&text) {
                Ok(ChangeEvent::Composite { fragments, closed }) => {
                    if !closed {
                        log::debug!("Unclosed composite, taking the rest of the line");
                    }
                    work.extend(
                        fragments
                            .into_iter()
                            .rev()
                            .filter(|f| !f.trim().is_empty())
                            .map(|f| (f, true)),
                    );
                }
                Ok(event) => self.apply_event(graph, event),
                Err(e) => {
                    let scope = if nested { "fragment" } else { "line" };
                    log::debug!("Ignoring {}: {}", scope, e);
                }
            }
        }
    }

    fn apply_event(&mut self, graph: &mut WorldGraph, event: ChangeEvent) {
        match event {
            ChangeEvent::Role { player } => {
                log::info!("Controlling player: {}", player);
                graph.set_controlled(&player);
            }
            ChangeEvent::BattleRecords { battles } => {
                for battle in battles {
                    match graph.territory_id(&battle.territory) {
                        Some(id) => graph.mark_battle(id),
                        None => log::debug!("Battle {} in unknown territory {}", battle.id, battle.territory),
                    }
                }
            }
            ChangeEvent::Ownership {
                player, territory, ..
            } => {
                if !graph.set_owner(&territory, &player) {
                    log::debug!("{} takes unknown territory {}", player, territory);
                }
            }
            ChangeEvent::AddUnits { target, units } => self.add_units(graph, &target, &units),
            ChangeEvent::RemoveUnits { target, units } => remove_units(graph, &target, &units),
            ChangeEvent::Resource { player, quantity } => {
                let balance = graph.adjust_resources(&player, quantity);
                log::debug!("{} PU {:+} -> {}", player, quantity, balance);
            }
            ChangeEvent::Property {
                unit,
                owner,
                property,
                new_value,
                ..
            } => self.set_property(graph, unit, owner, property, new_value),
            ChangeEvent::Composite { .. } => {
                // Expanded by `apply` before we get here
            }
        }
    }

    fn add_units(&mut self, graph: &mut WorldGraph, target: &str, units: &[UnitToken]) {
        if let Some(id) = graph.territory_id(target) {
            for token in units {
                let stack = graph.add_units(id, &token.unit, &token.owner, 1);
                let key = (token.unit.clone(), token.owner.clone());
                if let Some(props) = self.pending.remove(&key) {
                    log::trace!(
                        "Flushing {} pending properties onto {} of {}",
                        props.len(),
                        token.unit,
                        token.owner
                    );
                    for (property, value) in &props {
                        stack.props.set(property, value);
                    }
                }
            }
        } else if graph.has_owner(target) {
            // Purchases land in the buyer's unplaced pool
            for token in units {
                graph.add_unplaced(target, &token.unit, 1);
            }
        } else {
            log::debug!("Add to unknown target {}", target);
        }
    }

    fn set_property(
        &mut self,
        graph: &mut WorldGraph,
        unit: String,
        owner: String,
        property: String,
        value: String,
    ) {
        let latest = graph.owner(&owner).and_then(|o| o.latest_territory);
        if let Some(id) = latest {
            if graph.set_unit_property(id, &unit, &owner, &property, &value) {
                return;
            }
        }
        log::trace!("Buffering {}={} for {} of {}", property, value, unit, owner);
        self.pending
            .entry((unit, owner))
            .or_default()
            .insert(property, value);
    }

    /// Drop all buffered properties.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Number of `(unit, owner)` pairs with buffered properties.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn remove_units(graph: &mut WorldGraph, target: &str, units: &[UnitToken]) {
    if let Some(id) = graph.territory_id(target) {
        for token in units {
            if !graph.remove_units(id, &token.unit, &token.owner, 1) {
                log::debug!(
                    "No {} of {} to remove from {}",
                    token.unit,
                    token.owner,
                    target
                );
            }
        }
    } else if graph.has_owner(target) {
        // Placed units leave the unplaced pool
        for token in units {
            graph.remove_unplaced(target, &token.unit, 1);
        }
    } else {
        log::debug!("Remove from unknown target {}", target);
    }
}

#[cfg(test)]
#[path = "changes_tests.rs"]
mod tests;

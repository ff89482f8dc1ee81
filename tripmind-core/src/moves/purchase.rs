//! Purchase enumeration: every affordable multiset of purchasable unit types.

use crate::state::WorldGraph;
use serde::Serialize;
use std::collections::BTreeMap;

/// A purchase combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseMove {
    /// Unit type -> quantity. Never empty, no zero entries.
    pub purchase: BTreeMap<String, u32>,
    /// Total cost in PUs.
    pub cost: i64,
    /// Factory territories the units may be placed in later, in map order.
    pub place_in: Vec<String>,
}

impl PurchaseMove {
    /// Price a purchase reported by the engine, e.g. one parsed with
    /// [`Classifier::purchase_choice`](tripmind_txt::Classifier::purchase_choice).
    ///
    /// Unit types the catalogue cannot price are counted at 0 and logged.
    pub fn from_choice(graph: &WorldGraph, player: &str, purchase: BTreeMap<String, u32>) -> Self {
        let catalog = graph.catalog();
        let cost = purchase
            .iter()
            .map(|(unit, &n)| match catalog.get(unit).and_then(|r| r.cost) {
                Some(cost) => cost * i64::from(n),
                None => {
                    log::warn!("No cost found for {}", unit);
                    0
                }
            })
            .sum();
        Self {
            purchase,
            cost,
            place_in: factory_names(graph, player),
        }
    }
}

fn factory_names(graph: &WorldGraph, player: &str) -> Vec<String> {
    graph
        .factories_of(player)
        .into_iter()
        .map(|id| graph.territory(id).name.clone())
        .collect()
}

/// All non-empty combinations with repetition of purchasable unit types whose
/// total cost fits the player's PU balance.
///
/// Combinations come out by size, then in unit-name order within a size. Returns
/// nothing when the player owns no factory or has no PUs to spend. Unit types
/// with a non-positive cost are ignored.
pub fn purchase_moves(graph: &WorldGraph, player: &str) -> Vec<PurchaseMove> {
    let place_in = factory_names(graph, player);
    let budget = graph.resources_of(player);
    if place_in.is_empty() || budget <= 0 {
        return Vec::new();
    }

    let units: Vec<(&str, i64)> = graph
        .catalog()
        .purchasable()
        .filter(|&(_, cost)| cost > 0)
        .collect();
    let Some(cheapest) = units.iter().map(|&(_, cost)| cost).min() else {
        return Vec::new();
    };
    let max_units = budget / cheapest;

    let mut moves = Vec::new();
    let mut counts = vec![0u32; units.len()];
    for size in 1..=max_units {
        let mut search = Search {
            units: &units,
            counts: &mut counts,
            place_in: &place_in,
            out: &mut moves,
        };
        search.fill(0, size, budget, 0);
    }
    moves
}

/// Depth-first walk over non-decreasing unit indices.
struct Search<'a> {
    units: &'a [(&'a str, i64)],
    counts: &'a mut Vec<u32>,
    place_in: &'a [String],
    out: &'a mut Vec<PurchaseMove>,
}

impl Search<'_> {
    fn fill(&mut self, start: usize, remaining: i64, budget: i64, spent: i64) {
        if remaining == 0 {
            let purchase = self
                .units
                .iter()
                .zip(self.counts.iter())
                .filter(|&(_, &n)| n > 0)
                .map(|(&(unit, _), &n)| (unit.to_string(), n))
                .collect();
            self.out.push(PurchaseMove {
                purchase,
                cost: spent,
                place_in: self.place_in.to_vec(),
            });
            return;
        }

        for i in start..self.units.len() {
            let cost = self.units[i].1;
            if cost > budget {
                continue;
            }
            self.counts[i] += 1;
            self.fill(i, remaining - 1, budget - cost, spent + cost);
            self.counts[i] -= 1;
        }
    }
}

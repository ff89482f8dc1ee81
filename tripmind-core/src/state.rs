//! The mutable territory/owner graph mirroring the engine's world state.
//!
//! The graph never sees a full snapshot from the engine. It starts from the
//! static [`MapRecord`] and is kept current by the change parser, one event at a
//! time. Territories are never added or removed; only their owners, unit stacks
//! and flags change.

use crate::map::{MapRecord, UnitCatalog, FACTORY, NEUTRAL};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Index of a territory in map order.
pub type TerritoryId = usize;

/// Property flag the engine sets on units that fought this turn.
pub const WAS_IN_COMBAT: &str = "wasInCombat";
/// Property holding the movement a unit has already spent this turn.
pub const ALREADY_MOVED: &str = "alreadyMoved";

/// Dynamic per-stack flags set by property-change events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitProps {
    pub was_in_combat: bool,
    pub already_moved: f64,
    /// Properties we do not interpret, kept verbatim.
    pub other: BTreeMap<String, String>,
}

impl UnitProps {
    pub fn set(&mut self, property: &str, value: &str) {
        match property {
            WAS_IN_COMBAT => self.was_in_combat = value.eq_ignore_ascii_case("true"),
            ALREADY_MOVED => match value.parse::<f64>() {
                Ok(moved) => self.already_moved = moved,
                Err(_) => {
                    self.already_moved = 0.0;
                    self.other.insert(property.to_string(), value.to_string());
                }
            },
            _ => {
                self.other.insert(property.to_string(), value.to_string());
            }
        }
    }
}

/// Territory-level flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerritoryProps {
    /// A battle is pending here this turn.
    pub battle: bool,
    pub other: BTreeMap<String, String>,
}

/// Same-type, same-owner units at one territory.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitStack {
    pub unit: String,
    pub owner: String,
    pub quantity: u32,
    pub props: UnitProps,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    pub name: String,
    pub owner: String,
    pub units: Vec<UnitStack>,
    pub props: TerritoryProps,
}

impl Territory {
    fn stack_mut(&mut self, unit: &str, owner: &str) -> Option<&mut UnitStack> {
        self.units
            .iter_mut()
            .find(|s| s.unit == unit && s.owner == owner)
    }
}

/// Per-player bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owner {
    pub name: String,
    /// PU balance; may dip below zero while a batch is half applied.
    pub pu: i64,
    /// Purchased units waiting to be placed: unit type -> quantity.
    pub unplaced: BTreeMap<String, u32>,
    /// Territory most recently taken by this owner. Property changes that name
    /// no territory are resolved against it.
    pub latest_territory: Option<TerritoryId>,
}

impl Owner {
    fn new(name: &str, pu: i64) -> Self {
        Self {
            name: name.to_string(),
            pu,
            ..Default::default()
        }
    }
}

/// Starting configuration, restored by [`WorldGraph::reset`].
#[derive(Debug, Clone)]
struct Baseline {
    territories: Vec<Territory>,
    adjacency: Vec<BTreeSet<TerritoryId>>,
    owners: BTreeMap<String, Owner>,
}

/// Territories, connections and owners, with the mutation API used by the
/// change parser and the read API used by the move enumerators.
#[derive(Debug, Clone)]
pub struct WorldGraph {
    catalog: UnitCatalog,
    index: HashMap<String, TerritoryId>,
    victory_cities: HashSet<TerritoryId>,
    territories: Vec<Territory>,
    adjacency: Vec<BTreeSet<TerritoryId>>,
    owners: BTreeMap<String, Owner>,
    baseline: Baseline,
    controlled: Option<String>,
    turn: u32,
}

impl WorldGraph {
    /// Build the starting configuration from a static map record.
    ///
    /// Connections, ownership and units naming territories absent from the
    /// record's territory list are skipped.
    pub fn from_record(record: &MapRecord) -> Self {
        let index: HashMap<String, TerritoryId> = record
            .territories
            .iter()
            .enumerate()
            .map(|(id, name)| (name.clone(), id))
            .collect();

        let mut territories: Vec<Territory> = record
            .territories
            .iter()
            .map(|name| Territory {
                name: name.clone(),
                owner: record
                    .starting_ownership
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| NEUTRAL.to_string()),
                units: Vec::new(),
                props: TerritoryProps::default(),
            })
            .collect();

        for placement in &record.starting_units {
            let Some(&id) = index.get(&placement.territory) else {
                log::warn!(
                    "Starting units in unknown territory {}",
                    placement.territory
                );
                continue;
            };
            let territory = &mut territories[id];
            match territory.stack_mut(&placement.unit, &placement.owner) {
                Some(stack) => stack.quantity += placement.quantity,
                None => territory.units.push(UnitStack {
                    unit: placement.unit.clone(),
                    owner: placement.owner.clone(),
                    quantity: placement.quantity,
                    props: UnitProps::default(),
                }),
            }
        }

        let mut adjacency = vec![BTreeSet::new(); territories.len()];
        for conn in &record.connections {
            match (index.get(&conn.from), index.get(&conn.to)) {
                (Some(&a), Some(&b)) if a != b => {
                    adjacency[a].insert(b);
                    adjacency[b].insert(a);
                }
                _ => log::warn!("Skipping connection {} - {}", conn.from, conn.to),
            }
        }

        let mut owners: BTreeMap<String, Owner> = record
            .players
            .iter()
            .map(|name| (name.clone(), Owner::new(name, 0)))
            .collect();
        for (name, pu) in &record.initial_resources {
            owners
                .entry(name.clone())
                .or_insert_with(|| Owner::new(name, 0))
                .pu = *pu;
        }

        let victory_cities = record
            .victory_cities
            .iter()
            .filter_map(|name| index.get(name).copied())
            .collect();

        let baseline = Baseline {
            territories: territories.clone(),
            adjacency: adjacency.clone(),
            owners: owners.clone(),
        };

        Self {
            catalog: UnitCatalog::from_record(record),
            index,
            victory_cities,
            territories,
            adjacency,
            owners,
            baseline,
            controlled: None,
            turn: 1,
        }
    }

    /// Restore the starting configuration: owners, units, connections, PU
    /// balances, unplaced pools and flags. The controlled player is kept.
    pub fn reset(&mut self) {
        self.territories = self.baseline.territories.clone();
        self.adjacency = self.baseline.adjacency.clone();
        self.owners = self.baseline.owners.clone();
        self.turn = 1;
        log::info!("World graph reset to starting configuration");
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn territory_id(&self, name: &str) -> Option<TerritoryId> {
        self.index.get(name).copied()
    }

    pub fn territory(&self, id: TerritoryId) -> &Territory {
        &self.territories[id]
    }

    pub fn territories(&self) -> &[Territory] {
        &self.territories
    }

    pub fn owner(&self, name: &str) -> Option<&Owner> {
        self.owners.get(name)
    }

    /// Owners in name order.
    pub fn owners(&self) -> impl Iterator<Item = &Owner> + '_ {
        self.owners.values()
    }

    pub fn has_owner(&self, name: &str) -> bool {
        self.owners.contains_key(name)
    }

    pub fn is_victory_city(&self, id: TerritoryId) -> bool {
        self.victory_cities.contains(&id)
    }

    /// The player this process moves for, once the engine has told us.
    pub fn controlled(&self) -> Option<&str> {
        self.controlled.as_deref()
    }

    pub fn set_controlled(&mut self, player: &str) {
        self.controlled = Some(player.to_string());
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    // -------------------------------------------------------------------------
    // Read primitives
    // -------------------------------------------------------------------------

    /// Neighbors in territory order.
    pub fn neighbors_of(&self, id: TerritoryId) -> impl Iterator<Item = TerritoryId> + '_ {
        self.adjacency[id].iter().copied()
    }

    pub fn units_at(&self, id: TerritoryId) -> &[UnitStack] {
        &self.territories[id].units
    }

    pub fn owner_of(&self, id: TerritoryId) -> &str {
        &self.territories[id].owner
    }

    /// Territories holding at least one factory owned by `player`, in map order.
    pub fn factories_of(&self, player: &str) -> Vec<TerritoryId> {
        self.territories
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                t.units
                    .iter()
                    .any(|s| s.unit == FACTORY && s.owner == player && s.quantity > 0)
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// PU balance; 0 for players we have never heard of.
    pub fn resources_of(&self, player: &str) -> i64 {
        self.owners.get(player).map_or(0, |o| o.pu)
    }

    pub fn unplaced_of(&self, player: &str) -> Option<&BTreeMap<String, u32>> {
        self.owners.get(player).map(|o| &o.unplaced)
    }

    // -------------------------------------------------------------------------
    // Mutation primitives
    // -------------------------------------------------------------------------

    fn owner_mut(&mut self, name: &str) -> &mut Owner {
        self.owners.entry(name.to_string()).or_insert_with(|| {
            log::debug!("Creating owner record for {}", name);
            Owner::new(name, 0)
        })
    }

    /// Give `territory` to `player` and remember it as the player's latest
    /// touched territory. Returns `false` for unknown territories.
    pub fn set_owner(&mut self, territory: &str, player: &str) -> bool {
        let Some(id) = self.territory_id(territory) else {
            return false;
        };
        self.territories[id].owner = player.to_string();
        self.owner_mut(player).latest_territory = Some(id);
        true
    }

    /// Add units to a stack, creating the stack if needed.
    pub fn add_units(
        &mut self,
        id: TerritoryId,
        unit: &str,
        owner: &str,
        quantity: u32,
    ) -> &mut UnitStack {
        let units = &mut self.territories[id].units;
        let pos = match units.iter().position(|s| s.unit == unit && s.owner == owner) {
            Some(pos) => pos,
            None => {
                units.push(UnitStack {
                    unit: unit.to_string(),
                    owner: owner.to_string(),
                    quantity: 0,
                    props: UnitProps::default(),
                });
                units.len() - 1
            }
        };
        let stack = &mut units[pos];
        stack.quantity += quantity;
        stack
    }

    /// Remove units from a stack; a stack reaching zero is dropped. Returns
    /// `false` if no such stack existed.
    pub fn remove_units(&mut self, id: TerritoryId, unit: &str, owner: &str, quantity: u32) -> bool {
        let units = &mut self.territories[id].units;
        let Some(pos) = units.iter().position(|s| s.unit == unit && s.owner == owner) else {
            return false;
        };
        let stack = &mut units[pos];
        stack.quantity = stack.quantity.saturating_sub(quantity);
        if stack.quantity == 0 {
            units.remove(pos);
        }
        true
    }

    /// Set a property on the `(unit, owner)` stack at `id`. Returns `false` if
    /// there is no such stack.
    pub fn set_unit_property(
        &mut self,
        id: TerritoryId,
        unit: &str,
        owner: &str,
        property: &str,
        value: &str,
    ) -> bool {
        match self.territories[id].stack_mut(unit, owner) {
            Some(stack) => {
                stack.props.set(property, value);
                true
            }
            None => false,
        }
    }

    /// Put purchased units in a player's unplaced pool.
    pub fn add_unplaced(&mut self, player: &str, unit: &str, quantity: u32) {
        *self
            .owner_mut(player)
            .unplaced
            .entry(unit.to_string())
            .or_insert(0) += quantity;
    }

    /// Take units out of a player's unplaced pool; entries reaching zero are
    /// dropped.
    pub fn remove_unplaced(&mut self, player: &str, unit: &str, quantity: u32) {
        let unplaced = &mut self.owner_mut(player).unplaced;
        if let Some(pending) = unplaced.get_mut(unit) {
            *pending = pending.saturating_sub(quantity);
            if *pending == 0 {
                unplaced.remove(unit);
            }
        }
    }

    pub fn clear_unplaced(&mut self, player: &str) {
        if let Some(owner) = self.owners.get_mut(player) {
            owner.unplaced.clear();
        }
    }

    /// Add a signed delta to a player's PU balance and return the new balance.
    pub fn adjust_resources(&mut self, player: &str, delta: i64) -> i64 {
        let owner = self.owner_mut(player);
        owner.pu += delta;
        owner.pu
    }

    pub fn mark_battle(&mut self, id: TerritoryId) {
        self.territories[id].props.battle = true;
    }

    /// Returns `false` if either territory is unknown.
    pub fn add_connection(&mut self, from: &str, to: &str) -> bool {
        match (self.territory_id(from), self.territory_id(to)) {
            (Some(a), Some(b)) if a != b => {
                self.adjacency[a].insert(b);
                self.adjacency[b].insert(a);
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if an edge was removed.
    pub fn remove_connection(&mut self, from: &str, to: &str) -> bool {
        match (self.territory_id(from), self.territory_id(to)) {
            (Some(a), Some(b)) => {
                let removed = self.adjacency[a].remove(&b);
                self.adjacency[b].remove(&a);
                removed
            }
            _ => false,
        }
    }
}

impl game_pathfinding::Graph<TerritoryId> for WorldGraph {
    fn neighbors(&self, node: &TerritoryId) -> Vec<TerritoryId> {
        self.neighbors_of(*node).collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;

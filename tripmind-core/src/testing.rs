//! Test utilities for building map records and world graphs.
//!
//! Provides a fluent builder API for constructing a [`MapRecord`] without
//! writing JSON by hand, plus a small fixture map shared by the test suites.
//!
//! # Example
//!
//! ```
//! use tripmind_core::testing::MapRecordBuilder;
//! use tripmind_core::WorldGraph;
//!
//! let record = MapRecordBuilder::new()
//!     .territory("Moscow", "Russians")
//!     .territory("Berlin", "Germans")
//!     .connect("Moscow", "Berlin")
//!     .player("Russians", 10)
//!     .build();
//!
//! let graph = WorldGraph::from_record(&record);
//! assert_eq!(graph.resources_of("Russians"), 10);
//! ```

use crate::map::{
    ConnectionDef, MapRecord, ProductionRule, StartingUnit, UnitStats, FACTORY, NEUTRAL,
};
use crate::state::WorldGraph;

/// Fluent builder for [`MapRecord`].
#[derive(Debug, Default)]
pub struct MapRecordBuilder {
    record: MapRecord,
}

impl MapRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a territory with a starting owner. Pass [`NEUTRAL`] for unowned land.
    pub fn territory(mut self, name: &str, owner: &str) -> Self {
        self.record.territories.push(name.to_string());
        if owner != NEUTRAL {
            self.record
                .starting_ownership
                .insert(name.to_string(), owner.to_string());
        }
        self
    }

    pub fn connect(mut self, from: &str, to: &str) -> Self {
        self.record.connections.push(ConnectionDef {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    /// Add a player with a starting PU balance.
    pub fn player(mut self, name: &str, pu: i64) -> Self {
        self.record.players.push(name.to_string());
        self.record.initial_resources.insert(name.to_string(), pu);
        self
    }

    /// Declare a unit type with its stats.
    pub fn unit(mut self, name: &str, attack: i32, defense: i32, movement: u32) -> Self {
        self.record.units.push(name.to_string());
        self.record.unit_stats.insert(
            name.to_string(),
            UnitStats {
                attack: Some(attack),
                defense: Some(defense),
                movement: Some(movement),
            },
        );
        self
    }

    /// Make a unit type purchasable. The rule is named `buy<Unit>`.
    pub fn cost(mut self, unit: &str, cost: i64) -> Self {
        let mut rule_name = String::from("buy");
        let mut chars = unit.chars();
        if let Some(first) = chars.next() {
            rule_name.extend(first.to_uppercase());
            rule_name.push_str(chars.as_str());
        }
        self.record.production_rules.insert(
            rule_name,
            ProductionRule {
                unit: unit.to_string(),
                cost,
            },
        );
        self
    }

    /// Place starting units.
    pub fn units(mut self, territory: &str, unit: &str, owner: &str, quantity: u32) -> Self {
        self.record.starting_units.push(StartingUnit {
            unit: unit.to_string(),
            territory: territory.to_string(),
            quantity,
            owner: owner.to_string(),
        });
        self
    }

    pub fn factory(self, territory: &str, owner: &str) -> Self {
        self.units(territory, FACTORY, owner, 1)
    }

    pub fn victory_city(mut self, territory: &str) -> Self {
        self.record.victory_cities.push(territory.to_string());
        self
    }

    pub fn build(self) -> MapRecord {
        self.record
    }
}

/// A five-territory front between two players.
///
/// ```text
/// Moscow(R) - Karelia(R) - Ukraine(N) - Poland(G) - Berlin(G)
///     \___________________/
/// ```
///
/// Russians: factory, aaGun and 3 infantry in Moscow, 1 armour in Karelia, 10 PU.
/// Germans: factory and 2 infantry in Berlin, 1 infantry in Poland, 12 PU.
pub fn sample_record() -> MapRecord {
    MapRecordBuilder::new()
        .territory("Moscow", "Russians")
        .territory("Karelia", "Russians")
        .territory("Ukraine", NEUTRAL)
        .territory("Poland", "Germans")
        .territory("Berlin", "Germans")
        .connect("Moscow", "Karelia")
        .connect("Karelia", "Ukraine")
        .connect("Moscow", "Ukraine")
        .connect("Ukraine", "Poland")
        .connect("Poland", "Berlin")
        .player("Russians", 10)
        .player("Germans", 12)
        .unit("infantry", 1, 2, 1)
        .unit("artillery", 2, 2, 1)
        .unit("armour", 3, 3, 2)
        .unit(FACTORY, 0, 0, 0)
        .unit("aaGun", 0, 1, 1)
        .cost("infantry", 3)
        .cost("artillery", 4)
        .cost("armour", 5)
        .factory("Moscow", "Russians")
        .units("Moscow", "aaGun", "Russians", 1)
        .units("Moscow", "infantry", "Russians", 3)
        .units("Karelia", "armour", "Russians", 1)
        .factory("Berlin", "Germans")
        .units("Berlin", "infantry", "Germans", 2)
        .units("Poland", "infantry", "Germans", 1)
        .victory_city("Moscow")
        .victory_city("Berlin")
        .build()
}

/// [`sample_record`] loaded into a fresh graph.
pub fn sample_graph() -> WorldGraph {
    WorldGraph::from_record(&sample_record())
}

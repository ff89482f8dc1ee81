//! Static map record: the fixed description of a game produced from the engine's
//! map-definition document before play starts.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// Owner of territories and units that belong to no player.
pub const NEUTRAL: &str = "Neutral";

/// Unit type that enables purchasing and placement in its territory.
pub const FACTORY: &str = "factory";

fn neutral() -> String {
    NEUTRAL.to_string()
}

#[derive(Error, Debug)]
pub enum MapError {
    #[error("IO error reading map record: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid map record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Undirected edge between two territories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDef {
    pub from: String,
    pub to: String,
}

/// Combat and movement stats of a unit type. Missing stats fall back to the
/// defaults in [`UnitCatalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    #[serde(default)]
    pub attack: Option<i32>,
    #[serde(default)]
    pub defense: Option<i32>,
    #[serde(default)]
    pub movement: Option<u32>,
}

/// A production rule: what one purchase of this rule yields and costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRule {
    pub unit: String,
    pub cost: i64,
}

/// Units present at game start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingUnit {
    pub unit: String,
    pub territory: String,
    pub quantity: u32,
    #[serde(default = "neutral")]
    pub owner: String,
}

/// The whole static record, as produced by the external map extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub territories: Vec<String>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default)]
    pub units: Vec<String>,
    #[serde(default)]
    pub unit_stats: HashMap<String, UnitStats>,
    /// Keyed by rule name (e.g. `buyInfantry`).
    #[serde(default)]
    pub production_rules: BTreeMap<String, ProductionRule>,
    #[serde(default)]
    pub starting_ownership: HashMap<String, String>,
    #[serde(default)]
    pub starting_units: Vec<StartingUnit>,
    #[serde(default)]
    pub initial_resources: HashMap<String, i64>,
    #[serde(default)]
    pub victory_cities: Vec<String>,
}

impl MapRecord {
    pub fn from_json(text: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a map record from a JSON file.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        log::info!("Loading map record: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let record = Self::from_json(&text)?;
        log::info!(
            "Loaded {} territories, {} connections, {} production rules",
            record.territories.len(),
            record.connections.len(),
            record.production_rules.len()
        );
        Ok(record)
    }
}

/// Everything the enumerators need to know about one unit type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRule {
    /// Purchase price in PUs; `None` if no production rule yields this unit.
    pub cost: Option<i64>,
    pub attack: i32,
    pub defense: i32,
    /// Maximum steps per move phase (default 1).
    pub movement: u32,
}

impl Default for UnitRule {
    fn default() -> Self {
        Self {
            cost: None,
            attack: 0,
            defense: 0,
            movement: 1,
        }
    }
}

/// Unit rules merged from the unit list, stat table, production rules and the
/// starting placement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitCatalog {
    rules: BTreeMap<String, UnitRule>,
}

impl UnitCatalog {
    pub fn from_record(record: &MapRecord) -> Self {
        let mut rules: BTreeMap<String, UnitRule> = BTreeMap::new();

        let known = record
            .units
            .iter()
            .chain(record.unit_stats.keys())
            .chain(record.production_rules.values().map(|r| &r.unit))
            .chain(record.starting_units.iter().map(|u| &u.unit));
        for unit in known {
            rules.entry(unit.clone()).or_default();
        }

        for (unit, stats) in &record.unit_stats {
            if let Some(rule) = rules.get_mut(unit) {
                rule.attack = stats.attack.unwrap_or(0);
                rule.defense = stats.defense.unwrap_or(0);
                rule.movement = stats.movement.unwrap_or(1);
            }
        }

        for production in record.production_rules.values() {
            if let Some(rule) = rules.get_mut(&production.unit) {
                rule.cost = Some(production.cost);
            }
        }

        Self { rules }
    }

    pub fn get(&self, unit: &str) -> Option<&UnitRule> {
        self.rules.get(unit)
    }

    /// Movement range of a unit type; unknown types move 1.
    pub fn movement(&self, unit: &str) -> u32 {
        self.rules.get(unit).map_or(1, |r| r.movement)
    }

    /// Purchasable unit types and their costs, in unit-name order.
    pub fn purchasable(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.rules
            .iter()
            .filter_map(|(name, rule)| rule.cost.map(|cost| (name.as_str(), cost)))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{
        "territories": ["Moscow", "Berlin"],
        "connections": [{"from": "Moscow", "to": "Berlin"}],
        "players": ["Russians", "Germans"],
        "units": ["infantry", "armour", "factory"],
        "unit_stats": {
            "infantry": {"attack": 1, "defense": 2, "movement": 1},
            "armour": {"attack": 3, "defense": 3, "movement": 2}
        },
        "production_rules": {
            "buyInfantry": {"unit": "infantry", "cost": 3},
            "buyArmour": {"unit": "armour", "cost": 5}
        },
        "starting_ownership": {"Moscow": "Russians", "Berlin": "Germans"},
        "starting_units": [
            {"unit": "factory", "territory": "Moscow", "quantity": 1, "owner": "Russians"},
            {"unit": "infantry", "territory": "Berlin", "quantity": 2}
        ],
        "initial_resources": {"Russians": 10, "Germans": 12},
        "victory_cities": ["Berlin"]
    }"#;

    #[test]
    fn test_parse_record() {
        let record = MapRecord::from_json(RECORD).unwrap();
        assert_eq!(record.territories.len(), 2);
        assert_eq!(record.connections[0].to, "Berlin");
        // Owner defaults to Neutral
        assert_eq!(record.starting_units[1].owner, NEUTRAL);
        assert_eq!(record.initial_resources["Germans"], 12);
    }

    #[test]
    fn test_minimal_record() {
        let record = MapRecord::from_json(r#"{"territories": ["A"]}"#).unwrap();
        assert!(record.connections.is_empty());
        assert!(record.production_rules.is_empty());
    }

    #[test]
    fn test_invalid_record() {
        assert!(matches!(
            MapRecord::from_json("{\"connections\": []}"),
            Err(MapError::Json(_))
        ));
    }

    #[test]
    fn test_catalog_merges_sources() {
        let record = MapRecord::from_json(RECORD).unwrap();
        let catalog = UnitCatalog::from_record(&record);

        let armour = catalog.get("armour").unwrap();
        assert_eq!(armour.cost, Some(5));
        assert_eq!(armour.movement, 2);

        // No stats and no production rule
        let factory = catalog.get("factory").unwrap();
        assert_eq!(factory.cost, None);
        assert_eq!(factory.movement, 1);

        let purchasable: Vec<_> = catalog.purchasable().collect();
        assert_eq!(purchasable, vec![("armour", 5), ("infantry", 3)]);
        assert_eq!(catalog.movement("submarine"), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = MapRecord::load(Path::new("/nonexistent/map.json")).unwrap_err();
        assert!(matches!(err, MapError::Io(_)));
    }
}

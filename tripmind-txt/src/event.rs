//! Classification of single change lines into [`ChangeEvent`]s.

use crate::error::ParseError;
use crate::scan;
use regex::Regex;
use std::collections::BTreeMap;

/// One `<unitType> owned by <owner>` token from a unit list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitToken {
    pub unit: String,
    pub owner: String,
}

/// One `id:...battle in <territory>` entry of a battle-record batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleRecord {
    pub id: String,
    pub territory: String,
}

/// A structured change reconstructed from one engine line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// `Role: <name>`: which player this process controls.
    Role { player: String },
    /// `Adding Battle Records: [...]`.
    BattleRecords { battles: Vec<BattleRecord> },
    /// `CompositeChange <[ ... ]>`, already split into sibling fragments.
    Composite { fragments: Vec<String>, closed: bool },
    /// `<player> takes <territory> from <previous_owner>`.
    Ownership {
        player: String,
        territory: String,
        previous_owner: String,
    },
    /// `Add unit change ... Add to: <target> units: [...]`.
    ///
    /// `target` is a territory, or a player name when units enter the unplaced pool.
    AddUnits { target: String, units: Vec<UnitToken> },
    /// `Remove unit change ... Remove from: <target> units: [...]`.
    RemoveUnits { target: String, units: Vec<UnitToken> },
    /// `Resource:PUs quantity:<n> Player:<name>`.
    Resource { player: String, quantity: i64 },
    /// `Property change, unit:<u> owned by <o> property:<p> newValue:<v> oldValue:<old>`.
    Property {
        unit: String,
        owner: String,
        property: String,
        new_value: String,
        old_value: String,
    },
}

impl ChangeEvent {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Role { .. } => "role",
            ChangeEvent::BattleRecords { .. } => "battle-records",
            ChangeEvent::Composite { .. } => "composite",
            ChangeEvent::Ownership { .. } => "ownership",
            ChangeEvent::AddUnits { .. } => "add-units",
            ChangeEvent::RemoveUnits { .. } => "remove-units",
            ChangeEvent::Resource { .. } => "resource",
            ChangeEvent::Property { .. } => "property",
        }
    }
}

/// Compiled patterns for every recognised change form.
///
/// Build once and reuse; [`Classifier::classify`] is called for every line the
/// engine sends.
#[derive(Debug, Clone)]
pub struct Classifier {
    role: Regex,
    battle: Regex,
    takes: Regex,
    add: Regex,
    remove: Regex,
    unit_token: Regex,
    resource: Regex,
    property: Regex,
    production: Regex,
}

impl Classifier {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            role: Regex::new(r"Role: (\w+)")?,
            battle: Regex::new(r"([0-9a-f]+):.*?battle in (\w+)")?,
            takes: Regex::new(r"(\w+) takes (\w+) from (\w+)")?,
            add: Regex::new(r"Add unit change.*Add to: (\w+) units: \[(.+)\]")?,
            remove: Regex::new(r"Remove unit change.*Remove from: (\w+) units: \[(.+)\]")?,
            unit_token: Regex::new(r"^(\w+) owned by (\w+)")?,
            resource: Regex::new(r"Resource:PUs quantity:(-?\d+) Player:(\w+)")?,
            property: Regex::new(
                r"Property change, unit:(\w+) owned by (\w+) property:(\w+) newValue:([\w.-]+) oldValue:([\w.-]+)",
            )?,
            production: Regex::new(r"ProductionRule:buy(\w+)\s*->\s*(\d+)")?,
        })
    }

    /// Classify one line. The first matching form wins, in this order: role,
    /// battle records, composite, ownership, add units, remove units, resource,
    /// property.
    pub fn classify(&self, line: &str) -> Result<ChangeEvent, ParseError> {
        let line = line.trim();

        if let Some(caps) = self.role.captures(line) {
            return Ok(ChangeEvent::Role {
                player: caps[1].to_string(),
            });
        }

        if let Some(idx) = line.find("Adding Battle Records:") {
            let records = &line[idx..];
            let battles = self
                .battle
                .captures_iter(records)
                .map(|caps| BattleRecord {
                    id: caps[1].to_string(),
                    territory: caps[2].to_string(),
                })
                .collect();
            return Ok(ChangeEvent::BattleRecords { battles });
        }

        if line.contains("CompositeChange") {
            let block = scan::extract_block(line).ok_or(ParseError::MissingCompositeBlock)?;
            let fragments = scan::split_sub_changes(block.inner)
                .into_iter()
                .map(str::to_string)
                .collect();
            return Ok(ChangeEvent::Composite {
                fragments,
                closed: block.closed,
            });
        }

        if let Some(caps) = self.takes.captures(line) {
            return Ok(ChangeEvent::Ownership {
                player: caps[1].to_string(),
                territory: caps[2].to_string(),
                previous_owner: caps[3].to_string(),
            });
        }

        if let Some(caps) = self.add.captures(line) {
            return Ok(ChangeEvent::AddUnits {
                target: caps[1].to_string(),
                units: self.unit_list(&caps[2]),
            });
        }

        if let Some(caps) = self.remove.captures(line) {
            return Ok(ChangeEvent::RemoveUnits {
                target: caps[1].to_string(),
                units: self.unit_list(&caps[2]),
            });
        }

        if let Some(caps) = self.resource.captures(line) {
            let quantity = caps[1].parse().map_err(|_| ParseError::MalformedField {
                field: "quantity",
                value: caps[1].to_string(),
            })?;
            return Ok(ChangeEvent::Resource {
                player: caps[2].to_string(),
                quantity,
            });
        }

        if let Some(caps) = self.property.captures(line) {
            return Ok(ChangeEvent::Property {
                unit: caps[1].to_string(),
                owner: caps[2].to_string(),
                property: caps[3].to_string(),
                new_value: caps[4].to_string(),
                old_value: caps[5].to_string(),
            });
        }

        Err(ParseError::Unrecognized {
            line: line.to_string(),
        })
    }

    /// Parse the inside of a `units: [...]` list. Stray `]` / `>` left over from
    /// an enclosing composite are stripped; tokens that do not read
    /// `<unit> owned by <owner>` are skipped.
    pub fn unit_list(&self, csv: &str) -> Vec<UnitToken> {
        csv.trim_end_matches([']', '>'])
            .split(',')
            .filter_map(|token| {
                let caps = self.unit_token.captures(token.trim())?;
                Some(UnitToken {
                    unit: caps[1].to_string(),
                    owner: caps[2].to_string(),
                })
            })
            .collect()
    }

    /// Parse a purchase echoed back by the engine, e.g.
    /// `ProductionRule:buyArtillery -> 1 ProductionRule:buyInfantry -> 2`.
    ///
    /// Unit names are lower-cased and repeated rules summed. Returns `None` if no
    /// rule is mentioned.
    pub fn purchase_choice(&self, text: &str) -> Option<BTreeMap<String, u32>> {
        let mut purchase = BTreeMap::new();
        for caps in self.production.captures_iter(text) {
            let Ok(quantity) = caps[2].parse::<u32>() else {
                log::debug!("Ignoring oversized purchase quantity {}", &caps[2]);
                continue;
            };
            *purchase.entry(caps[1].to_lowercase()).or_insert(0) += quantity;
        }
        (!purchase.is_empty()).then_some(purchase)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

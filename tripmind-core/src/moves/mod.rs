//! Legal-move enumeration.
//!
//! Four independent queries over a [`WorldGraph`], one per move phase. None of
//! them mutate the graph. An empty result means "nothing to do, pass", never an
//! error.
//!
//! | Phase       | Query                                  | Shape                     |
//! |-------------|----------------------------------------|---------------------------|
//! | `purchase`  | [`purchase::purchase_moves`]           | multiset of unit types    |
//! | `combat`    | [`movement::combat_moves`]             | one stack, one destination|
//! | `noncombat` | [`movement::noncombat_moves`]          | one stack, one destination|
//! | `place`     | [`placement::placement_moves`]         | unit type -> factory      |

pub mod movement;
pub mod placement;
pub mod purchase;

use crate::action::Action;
use crate::map::FACTORY;
use crate::state::WorldGraph;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use movement::{combat_moves, noncombat_moves, MovementMove};
pub use placement::{placement_moves, PlacementMove};
pub use purchase::{purchase_moves, PurchaseMove};

/// Unit types that never move.
pub const IMMOBILE_UNITS: &[&str] = &[FACTORY, "aaGun"];

/// The move phases the engine asks us about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Purchase,
    Combat,
    NonCombat,
    Place,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Purchase, Phase::Combat, Phase::NonCombat, Phase::Place];

    /// Parse the phase word of a `[MY_MOVE]` prompt.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "purchase" => Some(Phase::Purchase),
            "combat" => Some(Phase::Combat),
            "noncombat" => Some(Phase::NonCombat),
            "place" => Some(Phase::Place),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Purchase => "purchase",
            Phase::Combat => "combat",
            Phase::NonCombat => "noncombat",
            Phase::Place => "place",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candidate move of any phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LegalMove {
    Purchase(PurchaseMove),
    Movement(MovementMove),
    /// Full assignment of pending unit types; types left unplaced are omitted.
    Place(Vec<PlacementMove>),
}

impl LegalMove {
    pub fn phase(&self) -> Phase {
        match self {
            LegalMove::Purchase(_) => Phase::Purchase,
            LegalMove::Movement(m) => m.delegate,
            LegalMove::Place(_) => Phase::Place,
        }
    }

    /// Translate the move into the engine's action objects.
    ///
    /// Purchases and placements explode into one action per unit. A purchase
    /// with no factory to place in yields no actions.
    pub fn to_actions(&self) -> Vec<Action> {
        match self {
            LegalMove::Purchase(m) => {
                let Some(target) = m.place_in.first() else {
                    return Vec::new();
                };
                m.purchase
                    .iter()
                    .flat_map(|(unit, &n)| {
                        (0..n).map(move |_| Action::new(Phase::Purchase, "", target, unit))
                    })
                    .collect()
            }
            LegalMove::Movement(m) => vec![Action::new(m.delegate, &m.from, &m.to, &m.unit)],
            LegalMove::Place(placements) => placements
                .iter()
                .flat_map(|p| {
                    (0..p.quantity).map(move |_| Action::new(Phase::Place, "", &p.to, &p.unit))
                })
                .collect(),
        }
    }
}

/// Every legal move of `phase` for `player`.
pub fn legal_moves(graph: &WorldGraph, player: &str, phase: Phase) -> Vec<LegalMove> {
    let moves: Vec<LegalMove> = match phase {
        Phase::Purchase => purchase_moves(graph, player)
            .into_iter()
            .map(LegalMove::Purchase)
            .collect(),
        Phase::Combat => combat_moves(graph, player)
            .into_iter()
            .map(LegalMove::Movement)
            .collect(),
        Phase::NonCombat => noncombat_moves(graph, player)
            .into_iter()
            .map(LegalMove::Movement)
            .collect(),
        Phase::Place => placement_moves(graph, player)
            .into_iter()
            .map(LegalMove::Place)
            .collect(),
    };
    log::debug!("{} legal {} moves for {}", moves.len(), phase, player);
    moves
}

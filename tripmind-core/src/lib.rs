//! # Tripmind Core
//!
//! A live mirror of a running strategy-game engine's world state, and the
//! legal-move enumeration built on it.
//!
//! The engine never sends snapshots. It narrates its internal changes as text
//! lines; [`ChangeParser`] applies each one to a [`WorldGraph`] loaded from the
//! static [`MapRecord`]. When the engine asks for a move, [`legal_moves`]
//! enumerates the candidates for the requested [`Phase`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ engine line │────▶│ ChangeParser │────▶│ WorldGraph  │
//! │ (free text) │     │ (classify +  │     │ (mutable    │
//! └─────────────┘     │  apply)      │     │  state)     │
//!                     └──────────────┘     └──────┬──────┘
//!                                                 │
//!                     ┌──────────────┐     ┌──────▼──────┐
//!                     │ MovePicker   │◀────│ legal_moves │
//!                     │ (sample one) │     │ (pure fns)  │
//!                     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`WorldGraph`] | Territories, connections, owners, unit stacks |
//! | [`ChangeParser`] | Applies change lines, buffers early unit properties |
//! | [`LegalMove`] | Candidate move of any phase, convertible to [`Action`]s |
//! | [`MoveDictionary`] | Stable ids for purchase combinations |
//! | [`StateEncoding`] | Feature matrices for training records |

pub mod action;
pub mod changes;
pub mod dictionary;
pub mod encoding;
pub mod map;
pub mod moves;
pub mod picker;
pub mod state;
pub mod testing;

pub use action::Action;
pub use changes::ChangeParser;
pub use dictionary::{canonical_key, DictionaryError, MoveDictionary};
pub use encoding::{encode, StateEncoding};
pub use map::{MapError, MapRecord, UnitCatalog};
pub use moves::{legal_moves, LegalMove, Phase};
pub use picker::{MovePicker, RandomPicker};
pub use state::{TerritoryId, WorldGraph};

//! A classifier for the free-text change notifications a running game engine
//! writes about its own state.
//!
//! The engine was never meant to be read by machines: each line is the
//! `toString()` of some internal change object, and batches of changes arrive
//! as one `CompositeChange <[ ... ]>` line that may nest further composites.
//! This crate turns a single line into a [`ChangeEvent`] and leaves applying it
//! to whoever holds the game state.
//!
//! ```
//! use tripmind_txt::{ChangeEvent, Classifier};
//!
//! let classifier = Classifier::new().unwrap();
//! let event = classifier
//!     .classify("Resource:PUs quantity:-6 Player:Russians")
//!     .unwrap();
//! assert_eq!(
//!     event,
//!     ChangeEvent::Resource { player: "Russians".into(), quantity: -6 }
//! );
//! ```

pub mod error;
pub mod event;
pub mod scan;

pub use error::ParseError;
pub use event::{BattleRecord, ChangeEvent, Classifier, UnitToken};
pub use scan::{Block, extract_block, split_sub_changes};

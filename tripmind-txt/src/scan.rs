//! Depth-counted scanning of composite change blocks.
//!
//! A composite renders as `CompositeChange <[a, b, CompositeChange <[c, d]>, e]>`.
//! Unit lists inside a single sub-change also contain commas and square brackets,
//! so neither the block end nor the sibling boundaries can be found with a plain
//! search: both scans below track the `<[` / `]>` nesting depth.

/// Opening marker of a composite block.
pub const OPEN: &str = "<[";
/// Closing marker of a composite block.
pub const CLOSE: &str = "]>";

/// Headers that begin a new sibling sub-change inside a composite block.
///
/// Ownership transfers (`<player> takes <territory> from <owner>`) start with the
/// player name instead, see [`starts_sub_change`].
pub const SUB_CHANGE_HEADERS: &[&str] = &[
    "Property change",
    "Add unit change",
    "Remove unit change",
    "Change resource",
    "CompositeChange ",
    "takes ",
];

/// Payload of the first composite block found in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Text between the outermost markers, nested markers included verbatim.
    pub inner: &'a str,
    /// `false` when the line ended before the matching close marker.
    pub closed: bool,
}

/// Extract the payload of the first `<[ ... ]>` block in `line`.
///
/// Only the close marker that brings the depth back to zero ends the block. If the
/// line ends first, everything after the open marker is returned with
/// `closed == false`. Returns `None` when there is no open marker at all.
pub fn extract_block(line: &str) -> Option<Block<'_>> {
    let start = line.find(OPEN)? + OPEN.len();
    let rest = &line[start..];
    let bytes = rest.as_bytes();

    let mut depth = 1usize;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(OPEN.as_bytes()) {
            depth += 1;
            i += OPEN.len();
        } else if bytes[i..].starts_with(CLOSE.as_bytes()) {
            depth -= 1;
            if depth == 0 {
                return Some(Block {
                    inner: &rest[..i],
                    closed: true,
                });
            }
            i += CLOSE.len();
        } else {
            i += 1;
        }
    }

    Some(Block {
        inner: rest,
        closed: false,
    })
}

/// Split a composite payload into its sibling sub-changes.
///
/// A boundary is a `", "` at nesting depth zero that is immediately followed by a
/// sub-change header. Commas inside unit lists and inside nested composites are
/// left alone. Empty fragments are dropped.
pub fn split_sub_changes(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut part_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i..].starts_with(OPEN.as_bytes()) {
            depth += 1;
            i += OPEN.len();
            continue;
        }
        if bytes[i..].starts_with(CLOSE.as_bytes()) {
            depth = depth.saturating_sub(1);
            i += CLOSE.len();
            continue;
        }
        if depth == 0 && bytes[i..].starts_with(b", ") && starts_sub_change(&inner[i + 2..]) {
            push_trimmed(&mut parts, &inner[part_start..i]);
            part_start = i + 2;
            i += 2;
            continue;
        }
        i += 1;
    }
    push_trimmed(&mut parts, &inner[part_start..]);

    parts
}

/// Does `text` begin with one of the recognised sub-change headers?
pub fn starts_sub_change(text: &str) -> bool {
    if SUB_CHANGE_HEADERS.iter().any(|h| text.starts_with(h)) {
        return true;
    }
    let word_len = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    word_len > 0 && text[word_len..].starts_with(" takes ")
}

fn push_trimmed<'a>(parts: &mut Vec<&'a str>, fragment: &'a str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        parts.push(fragment);
    }
}

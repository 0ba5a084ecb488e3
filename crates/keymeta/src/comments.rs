//! Comment codec
//!
//! A comment with N lines is stored as:
//!
//! ```text
//! comments     = #<N-1>
//! comments/#0  = #<line 0>
//! ...
//! comments/#<N-1> = #<line N-1>
//! ```
//!
//! An empty comment is stored as no `comments*` entries at all. Lines are
//! always written unpadded, replacing any padded entry for the same index.

use keyset::Key;

use crate::array::{self, ArrayMeta};

/// Name of the comment array entry
pub const COMMENTS: &str = "comments";

const LINES: ArrayMeta<'static> = ArrayMeta::new(COMMENTS);

/// Whether `name` belongs to the comment codec
pub fn is_comment_meta(name: &str) -> bool {
    name == COMMENTS
        || name
            .strip_prefix(COMMENTS)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Read the comment stored on `key`.
///
/// Lines are taken in numeric index order with one marker stripped from
/// each. A key without comment lines yields `""`.
pub fn decode(key: &Key) -> String {
    LINES
        .elements(key)
        .into_iter()
        .map(|(_, value)| array::strip_marker(value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Store `comment` on `key`, replacing any previous comment.
///
/// Line entries left over from a longer previous comment are removed.
pub fn encode(key: &mut Key, comment: &str) {
    let lines: Vec<&str> = if comment.is_empty() {
        Vec::new()
    } else {
        comment.split('\n').collect()
    };

    match array::size_marker(lines.len()) {
        Some(marker) => key.set_meta(COMMENTS, &marker),
        None => {
            key.remove_meta(COMMENTS);
        }
    }

    for (i, line) in lines.iter().enumerate() {
        key.set_meta(&LINES.element_name(i), &format!("#{line}"));
    }

    // Padded names (`#_10`) share a slot with the name just written
    for name in key.meta_names() {
        if LINES
            .index_of(&name)
            .is_some_and(|i| i >= lines.len() || name != LINES.element_name(i))
        {
            key.remove_meta(&name);
        }
    }
}

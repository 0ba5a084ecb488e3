//! Array metadata convention
//!
//! An ordered sequence stored as flat metadata uses one entry per element,
//! named `<base>/#<index>`. Element values carry a leading `#` marker, and
//! the entry named `<base>` itself holds `#<last index>`.
//!
//! libelektra pads larger indices with underscores (`#_10`, `#__100`);
//! those are accepted when reading but never written; writers replace them
//! with the unpadded name.

use keyset::Key;

/// The `<base>/#<index>` entries of one metadata array.
#[derive(Debug, Clone, Copy)]
pub struct ArrayMeta<'a> {
    base: &'a str,
}

impl<'a> ArrayMeta<'a> {
    pub const fn new(base: &'a str) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &'a str {
        self.base
    }

    /// Metadata name of element `index`
    pub fn element_name(&self, index: usize) -> String {
        format!("{}/#{index}", self.base)
    }

    /// Index of `name` if it names an element of this array
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let rest = name.strip_prefix(self.base)?.strip_prefix("/#")?;
        parse_index(rest)
    }

    /// All elements present on `key`, sorted by numeric index
    pub fn elements<'k>(&self, key: &'k Key) -> Vec<(usize, &'k str)> {
        let mut elements: Vec<_> = key
            .meta_iter()
            .filter_map(|(name, value)| self.index_of(name).map(|i| (i, value)))
            .collect();
        elements.sort_by_key(|(i, _)| *i);
        elements
    }
}

/// Parse an array index written after `#`, e.g. `3`, `_10`, `__100`.
pub fn parse_index(s: &str) -> Option<usize> {
    let digits = s.trim_start_matches('_');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Value of the `<base>` entry for an array of `len` elements
pub fn size_marker(len: usize) -> Option<String> {
    len.checked_sub(1).map(|last| format!("#{last}"))
}

/// Remove a single leading `# ` or `#` element marker.
pub fn strip_marker(value: &str) -> &str {
    value
        .strip_prefix("# ")
        .or_else(|| value.strip_prefix('#'))
        .unwrap_or(value)
}

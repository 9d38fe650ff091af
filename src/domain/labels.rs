// ============================================================
// Layer 3 — Label Names
// ============================================================
// Maps a class index to the text drawn on prediction videos.
// Indices without a configured name fall back to the NTU action
// code, e.g. class 12 → "A013".

use std::borrow::Cow;

#[derive(Debug, Clone, Default)]
pub struct LabelNames {
    names: Vec<String>,
}

impl LabelNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Display name for a class index
    pub fn name(&self, class: usize) -> Cow<'_, str> {
        match self.names.get(class) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None       => Cow::Owned(format!("A{:03}", class + 1)),
        }
    }
}

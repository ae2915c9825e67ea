//! Reader configuration

/// Deepest element nesting accepted by default.
///
/// Forcing, rendering and dropping a tree recurse once per level, so the
/// limit keeps deep input an error instead of a stack overflow.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options controlling how raw XML is turned into events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Verify every end tag closes the innermost open element
    pub check_end_names: bool,
    /// Trim text content and drop whitespace-only runs
    pub trim_text: bool,
    /// Decode entity references in text and attribute values
    pub decode_entities: bool,
    /// Deepest element nesting allowed before reading fails
    pub max_depth: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            check_end_names: true,
            trim_text: false,
            decode_entities: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_end_names(mut self, yes: bool) -> Self {
        self.check_end_names = yes;
        self
    }

    pub fn trim_text(mut self, yes: bool) -> Self {
        self.trim_text = yes;
        self
    }

    pub fn decode_entities(mut self, yes: bool) -> Self {
        self.decode_entities = yes;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

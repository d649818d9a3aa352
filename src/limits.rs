/// Bounds applied while encoding and decoding nested containers.
///
/// Decoding attacker-controlled input recurses once per nesting level and
/// allocates per declared element, so every container walk checks these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Deepest nesting of lists and records, counting the outermost as 1.
    pub max_depth: usize,
    /// Most children a single list or record may hold.
    pub max_block_count: usize,
    /// Largest length prefix accepted for a single frame, in bytes.
    pub max_block_size: usize,
}

impl Limits {
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    pub const fn new() -> Self {
        Limits {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_block_count: i32::MAX as usize,
            max_block_size: i32::MAX as usize,
        }
    }

    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub const fn with_max_block_count(mut self, max_block_count: usize) -> Self {
        self.max_block_count = max_block_count;
        self
    }

    pub const fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits::new()
    }
}

//! Pool configuration.

/// Default backing page size (64 KiB).
pub const DEFAULT_PAGE_SIZE: usize = 64 * 1024;

/// Configuration for a [`crate::BlockPool`].
///
/// Every pool carries its own configuration, so pools with different page
/// sizes can coexist and be tested independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Size in bytes of each backing page.
    pub page_size: usize,

    /// Maximum number of backing pages (`None` = unlimited).
    pub max_pages: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
        }
    }
}

impl PoolConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backing page size.
    #[must_use]
    pub const fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Limits the number of backing pages the pool may provision.
    #[must_use]
    pub const fn max_pages(mut self, pages: usize) -> Self {
        self.max_pages = Some(pages);
        self
    }
}

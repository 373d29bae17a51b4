//! Block pool implementation.

use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// An exclusively owned block handed out by a [`BlockPool`].
///
/// `Block` is neither `Clone` nor `Copy`. [`BlockPool::deallocate`] consumes
/// the handle, so a block cannot be freed twice. Dropping a block without
/// deallocating it leaks the slot until the pool is released.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Block {
    pool_id: u64,
    index: usize,
}

impl Block {
    /// Returns the slot index of this block within its pool.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Statistics about a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Size of each block in bytes.
    pub block_size: usize,
    /// Number of backing pages provisioned.
    pub pages: usize,
    /// Total number of block slots across all pages.
    pub capacity: usize,
    /// Slots currently on the free list.
    pub free: usize,
    /// Blocks currently handed out.
    pub in_use: usize,
}

/// A backing page: one contiguous buffer holding `blocks_per_page` blocks.
#[derive(Debug)]
struct Page {
    data: Mutex<Box<[u8]>>,
}

#[derive(Debug, Default)]
struct FreeList {
    /// Stack of free slot indices. Most recently freed slots are reused first.
    free: Vec<usize>,
    /// Total slots provisioned so far.
    capacity: usize,
    in_use: usize,
}

/// A fixed-size block allocator.
///
/// Blocks are provisioned in pages of `page_size / block_size` blocks. A new
/// page is only requested when the free list is empty, and pages are never
/// returned to the system until [`BlockPool::release`].
#[derive(Debug)]
pub struct BlockPool {
    id: u64,
    block_size: usize,
    config: PoolConfig,
    free_list: Mutex<FreeList>,
    pages: RwLock<Vec<Arc<Page>>>,
}

impl BlockPool {
    /// Creates an empty pool for blocks of `block_size` bytes.
    ///
    /// No memory is provisioned until the first allocation. A block size of
    /// zero or larger than the configured page size makes every allocation
    /// fail.
    #[must_use]
    pub fn new(block_size: usize, config: PoolConfig) -> Self {
        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            block_size,
            config,
            free_list: Mutex::new(FreeList::default()),
            pages: RwLock::new(Vec::new()),
        }
    }

    /// Returns the block size of this pool.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns true once at least one backing page has been provisioned.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.pages.read().is_empty()
    }

    fn blocks_per_page(&self) -> usize {
        self.config.page_size / self.block_size
    }

    /// Allocates a block.
    ///
    /// The contents of a reused block are whatever the previous owner left
    /// in it; use [`BlockPool::allocate_zeroed`] for a cleared block.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The block size is zero or exceeds the page size
    /// - The page limit has been reached
    /// - The system allocator cannot provide a new page
    pub fn allocate(&self) -> PoolResult<Block> {
        if self.block_size == 0 {
            return Err(PoolError::InvalidBlockSize);
        }
        if self.block_size > self.config.page_size {
            return Err(PoolError::BlockTooLarge {
                block_size: self.block_size,
                page_size: self.config.page_size,
            });
        }

        let mut free_list = self.free_list.lock();
        if free_list.free.is_empty() {
            self.provision_page(&mut free_list)?;
        }

        // provision_page always pushes at least one slot
        let index = free_list.free.pop().ok_or(PoolError::AllocationFailed {
            bytes: self.config.page_size,
        })?;
        free_list.in_use += 1;

        Ok(Block {
            pool_id: self.id,
            index,
        })
    }

    /// Allocates a block and fills it with zeros.
    ///
    /// # Errors
    ///
    /// Same as [`BlockPool::allocate`].
    pub fn allocate_zeroed(&self) -> PoolResult<Block> {
        let block = self.allocate()?;
        self.with_block_mut(&block, |bytes| bytes.fill(0))?;
        Ok(block)
    }

    /// Returns a block to the free list.
    ///
    /// This is O(1) and never returns memory to the system allocator.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ForeignBlock`] if the block came from another pool.
    pub fn deallocate(&self, block: Block) -> PoolResult<()> {
        self.check_owner(&block)?;

        let mut free_list = self.free_list.lock();
        free_list.free.push(block.index);
        free_list.in_use = free_list.in_use.saturating_sub(1);
        Ok(())
    }

    /// Runs `f` with read access to the block's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ForeignBlock`] if the block came from another pool.
    pub fn with_block<R>(&self, block: &Block, f: impl FnOnce(&[u8]) -> R) -> PoolResult<R> {
        let (page, start) = self.locate(block)?;
        let data = page.data.lock();
        Ok(f(&data[start..start + self.block_size]))
    }

    /// Runs `f` with write access to the block's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ForeignBlock`] if the block came from another pool.
    pub fn with_block_mut<R>(
        &self,
        block: &Block,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> PoolResult<R> {
        let (page, start) = self.locate(block)?;
        let mut data = page.data.lock();
        Ok(f(&mut data[start..start + self.block_size]))
    }

    /// Copies `data` into the block starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write would extend past the end of the block
    /// or the block came from another pool.
    pub fn write(&self, block: &Block, offset: usize, data: &[u8]) -> PoolResult<()> {
        let end = offset.saturating_add(data.len());
        if end > self.block_size {
            return Err(PoolError::OutOfBounds {
                offset,
                len: data.len(),
                block_size: self.block_size,
            });
        }
        self.with_block_mut(block, |bytes| bytes[offset..end].copy_from_slice(data))
    }

    /// Returns a copy of the block's bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ForeignBlock`] if the block came from another pool.
    pub fn read(&self, block: &Block) -> PoolResult<Vec<u8>> {
        self.with_block(block, <[u8]>::to_vec)
    }

    /// Returns current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let free_list = self.free_list.lock();
        PoolStats {
            block_size: self.block_size,
            pages: self.pages.read().len(),
            capacity: free_list.capacity,
            free: free_list.free.len(),
            in_use: free_list.in_use,
        }
    }

    /// Releases the pool and every backing page.
    ///
    /// Every allocated block must have been deallocated first. Outstanding
    /// blocks are not an error, but their handles become meaningless and
    /// a warning is logged.
    pub fn release(self) -> PoolStats {
        let stats = self.stats();
        if stats.in_use > 0 {
            warn!(
                block_size = stats.block_size,
                in_use = stats.in_use,
                "releasing pool with outstanding blocks"
            );
        }
        debug!(pages = stats.pages, "released pool");
        stats
    }

    fn check_owner(&self, block: &Block) -> PoolResult<()> {
        if block.pool_id == self.id {
            Ok(())
        } else {
            Err(PoolError::ForeignBlock)
        }
    }

    fn locate(&self, block: &Block) -> PoolResult<(Arc<Page>, usize)> {
        self.check_owner(block)?;
        let per_page = self.blocks_per_page();
        let pages = self.pages.read();
        let page = pages
            .get(block.index / per_page)
            .cloned()
            .ok_or(PoolError::ForeignBlock)?;
        Ok((page, (block.index % per_page) * self.block_size))
    }

    /// Adds one page worth of slots to the free list. Caller holds the
    /// free-list lock.
    fn provision_page(&self, free_list: &mut FreeList) -> PoolResult<()> {
        let mut pages = self.pages.write();
        if let Some(max_pages) = self.config.max_pages {
            if pages.len() >= max_pages {
                return Err(PoolError::Exhausted { max_pages });
            }
        }

        let per_page = self.blocks_per_page();
        let bytes = per_page * self.block_size;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(bytes)
            .map_err(|_| PoolError::AllocationFailed { bytes })?;
        buffer.resize(bytes, 0);

        pages.push(Arc::new(Page {
            data: Mutex::new(buffer.into_boxed_slice()),
        }));

        let first = free_list.capacity;
        free_list.capacity += per_page;
        // Push in reverse so the lowest index is handed out first.
        free_list.free.extend((first..first + per_page).rev());

        debug!(
            block_size = self.block_size,
            blocks = per_page,
            pages = pages.len(),
            "provisioned pool page"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    fn small_pool(block_size: usize) -> BlockPool {
        BlockPool::new(block_size, PoolConfig::new().page_size(256))
    }

    #[test]
    fn new_pool_is_uninitialized() {
        let pool = small_pool(32);
        assert!(!pool.is_active());
        assert_eq!(pool.stats().pages, 0);
    }

    #[test]
    fn first_allocation_provisions_page() {
        let pool = small_pool(32);
        let block = pool.allocate().unwrap();
        assert!(pool.is_active());

        let stats = pool.stats();
        assert_eq!(stats.pages, 1);
        assert_eq!(stats.capacity, 8);
        assert_eq!(stats.free, 7);
        assert_eq!(stats.in_use, 1);

        pool.deallocate(block).unwrap();
    }

    #[test]
    fn allocations_are_distinct() {
        let pool = small_pool(32);
        let blocks: Vec<Block> = (0..20).map(|_| pool.allocate().unwrap()).collect();
        let indices: HashSet<usize> = blocks.iter().map(Block::index).collect();
        assert_eq!(indices.len(), 20);
        assert_eq!(pool.stats().pages, 3);

        for block in blocks {
            pool.deallocate(block).unwrap();
        }
        assert_eq!(pool.stats().in_use, 0);
    }

    #[test]
    fn freed_block_is_reused() {
        let pool = small_pool(32);
        let a = pool.allocate().unwrap();
        let index = a.index();
        pool.deallocate(a).unwrap();

        let b = pool.allocate().unwrap();
        assert_eq!(b.index(), index);
        assert_eq!(pool.stats().pages, 1);
        pool.deallocate(b).unwrap();
    }

    #[test]
    fn block_larger_than_page_is_refused() {
        let pool = small_pool(512);
        assert_eq!(
            pool.allocate(),
            Err(PoolError::BlockTooLarge {
                block_size: 512,
                page_size: 256
            })
        );
        assert!(!pool.is_active());
    }

    #[test]
    fn zero_block_size_is_refused() {
        let pool = small_pool(0);
        assert_eq!(pool.allocate(), Err(PoolError::InvalidBlockSize));
    }

    #[test]
    fn page_limit_exhausts_pool() {
        let pool = BlockPool::new(128, PoolConfig::new().page_size(256).max_pages(1));
        let a = pool.allocate().unwrap();
        let b = pool.allocate().unwrap();
        assert_eq!(pool.allocate(), Err(PoolError::Exhausted { max_pages: 1 }));

        pool.deallocate(a).unwrap();
        let c = pool.allocate().unwrap();
        pool.deallocate(b).unwrap();
        pool.deallocate(c).unwrap();
    }

    #[test]
    fn allocate_zeroed_clears_reused_block() {
        let pool = small_pool(16);
        let block = pool.allocate().unwrap();
        pool.write(&block, 0, &[0xAB; 16]).unwrap();
        pool.deallocate(block).unwrap();

        let block = pool.allocate_zeroed().unwrap();
        assert_eq!(pool.read(&block).unwrap(), vec![0u8; 16]);
        pool.deallocate(block).unwrap();
    }

    #[test]
    fn write_and_read_block() {
        let pool = small_pool(16);
        let a = pool.allocate_zeroed().unwrap();
        let b = pool.allocate_zeroed().unwrap();

        pool.write(&a, 2, b"abc").unwrap();
        pool.write(&b, 0, b"xyz").unwrap();

        assert_eq!(&pool.read(&a).unwrap()[..5], b"\0\0abc");
        assert_eq!(&pool.read(&b).unwrap()[..3], b"xyz");

        pool.deallocate(a).unwrap();
        pool.deallocate(b).unwrap();
    }

    #[test]
    fn write_past_end_fails() {
        let pool = small_pool(8);
        let block = pool.allocate().unwrap();
        let result = pool.write(&block, 4, b"too long");
        assert!(matches!(result, Err(PoolError::OutOfBounds { .. })));
        pool.deallocate(block).unwrap();
    }

    #[test]
    fn foreign_block_is_rejected() {
        let a = small_pool(16);
        let b = small_pool(16);
        let block = a.allocate().unwrap();

        assert!(matches!(b.read(&block), Err(PoolError::ForeignBlock)));
        assert_eq!(b.deallocate(block), Err(PoolError::ForeignBlock));
    }

    #[test]
    fn release_reports_stats() {
        let pool = small_pool(32);
        let block = pool.allocate().unwrap();
        pool.deallocate(block).unwrap();

        let stats = pool.release();
        assert_eq!(stats.pages, 1);
        assert_eq!(stats.in_use, 0);
    }

    #[test]
    fn release_with_outstanding_blocks() {
        let pool = small_pool(32);
        let _leaked = pool.allocate().unwrap();
        let stats = pool.release();
        assert_eq!(stats.in_use, 1);
    }

    #[test]
    fn concurrent_allocations_are_distinct() {
        let pool = Arc::new(BlockPool::new(24, PoolConfig::new().page_size(240)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    (0..50)
                        .map(|_| pool.allocate().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let blocks: Vec<Block> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let indices: HashSet<usize> = blocks.iter().map(Block::index).collect();
        assert_eq!(indices.len(), 400);

        for block in blocks {
            pool.deallocate(block).unwrap();
        }
        assert_eq!(pool.stats().in_use, 0);
    }

    #[test]
    fn concurrent_churn_keeps_blocks_exclusive() {
        let pool = Arc::new(small_pool(8));
        let handles: Vec<_> = (0..4u8)
            .map(|tag| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let block = pool.allocate().unwrap();
                        pool.write(&block, 0, &[tag; 8]).unwrap();
                        assert_eq!(pool.read(&block).unwrap(), vec![tag; 8]);
                        pool.deallocate(block).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(pool.stats().in_use, 0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn alloc_dealloc_sequences_balance(ops in prop::collection::vec(any::<bool>(), 1..200)) {
                let pool = small_pool(32);
                let mut held = Vec::new();

                for allocate in ops {
                    if allocate || held.is_empty() {
                        held.push(pool.allocate().unwrap());
                    } else {
                        pool.deallocate(held.pop().unwrap()).unwrap();
                    }
                    let stats = pool.stats();
                    prop_assert_eq!(stats.in_use, held.len());
                    prop_assert_eq!(stats.free + stats.in_use, stats.capacity);
                }

                for block in held.drain(..) {
                    pool.deallocate(block).unwrap();
                }
                prop_assert_eq!(pool.release().in_use, 0);
            }
        }
    }
}

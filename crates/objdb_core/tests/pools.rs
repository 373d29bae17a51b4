//! Block pools shared through a connection.

use objdb_core::{Connection, CoreError};
use objdb_pool::PoolConfig;
use objdb_testkit::TestConnection;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

#[test]
fn threads_share_one_pool_per_size() {
    let test = TestConnection::memory();
    let pool = test.pool(48).unwrap();

    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                let mut held = Vec::new();
                for i in 0..64u8 {
                    let block = pool.allocate().unwrap();
                    pool.write(&block, 0, &[t, i]).unwrap();
                    held.push((block, [t, i]));
                }
                let mut indices = Vec::new();
                for (block, expected) in held {
                    assert_eq!(&pool.read(&block).unwrap()[..2], &expected);
                    indices.push(block.index());
                    pool.deallocate(block).unwrap();
                }
                indices
            })
        })
        .collect();

    let mut seen = 0;
    for handle in handles {
        seen += handle.join().unwrap().len();
    }
    assert_eq!(seen, 256);

    let stats = pool.stats();
    assert_eq!(stats.in_use, 0);
    assert_eq!(stats.free, stats.capacity);
}

#[test]
fn blocks_in_use_are_distinct() {
    let conn = Connection::open(&objdb_backend::BackendConfig::memory("p"))
        .unwrap()
        .with_pool_config(PoolConfig::new().page_size(256));
    let pool = conn.pool(32).unwrap();

    let blocks: Vec<_> = (0..20).map(|_| pool.allocate().unwrap()).collect();
    let distinct: HashSet<_> = blocks.iter().map(|b| b.index()).collect();
    assert_eq!(distinct.len(), 20);
    assert_eq!(pool.stats().pages, 3);

    for block in blocks {
        pool.deallocate(block).unwrap();
    }
}

#[test]
fn page_limit_surfaces_as_allocation_error() {
    let conn = Connection::open(&objdb_backend::BackendConfig::memory("p"))
        .unwrap()
        .with_pool_config(PoolConfig::new().page_size(64).max_pages(1));
    let pool = conn.pool(32).unwrap();

    let a = pool.allocate().unwrap();
    let b = pool.allocate().unwrap();
    let err = CoreError::from(pool.allocate().unwrap_err());
    assert_eq!(err.code(), objdb_core::ErrorCode::Allocation);

    pool.deallocate(a).unwrap();
    pool.deallocate(b).unwrap();
}

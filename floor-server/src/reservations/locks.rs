//! 桌台锁
//!
//! 冲突检测与写入之间必须互斥。每张桌台一把 `tokio::sync::Mutex`，
//! 多张桌台按 ID 排序去重后依次加锁，避免死锁。
//! 锁释放后若无其他持有者，条目即从表中移除。

use std::sync::Arc;

use dashmap::DashMap;
use surrealdb::RecordId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 进程内桌台锁表
#[derive(Debug, Default)]
pub struct TableLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

/// 持有一组桌台锁，drop 时释放
#[derive(Debug)]
pub struct TableLockGuard {
    tables: Vec<String>,
    guards: Vec<OwnedMutexGuard<()>>,
    registry: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TableLockGuard {
    /// 已锁定的桌台 ("dining_table:id")
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// 是否覆盖全部给定桌台
    pub fn covers(&self, tables: &[RecordId]) -> bool {
        tables
            .iter()
            .all(|t| self.tables.binary_search(&t.to_string()).is_ok())
    }
}

impl Drop for TableLockGuard {
    fn drop(&mut self) {
        self.guards.clear();
        // 仅剩表内引用 = 无人持有或等待
        for key in &self.tables {
            self.registry
                .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
        }
    }
}

impl TableLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 按排序后的顺序锁定所有桌台
    pub async fn acquire(&self, tables: &[RecordId]) -> TableLockGuard {
        let mut keys: Vec<String> = tables.iter().map(|t| t.to_string()).collect();
        keys.sort();
        keys.dedup();

        // 逐把加锁；中途被取消时 drop 同样会清理已登记的条目
        let mut held = TableLockGuard {
            tables: Vec::with_capacity(keys.len()),
            guards: Vec::with_capacity(keys.len()),
            registry: self.locks.clone(),
        };
        for key in keys {
            // DashMap 的 entry 引用不能跨 await 持有，先克隆出 Arc
            let lock = self.lock_for(&key);
            held.guards.push(lock.lock_owned().await);
            held.tables.push(key);
        }
        held
    }

    /// 当前登记的锁数量
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

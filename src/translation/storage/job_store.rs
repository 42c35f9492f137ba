//! 内存任务存储
//!
//! 进程级、可并发访问的任务表。时间来源通过 [`Clock`] 注入，测试可以手动推进时间。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use tokio::task::JoinHandle;

use super::job::{Job, JobSnapshot};

/// 时间来源
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 任务存储错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobStoreError {
    #[error("任务已存在: {0}")]
    AlreadyExists(String),
}

/// 任务存储
pub struct JobStore {
    jobs: DashMap<String, Job>,
    clock: Arc<dyn Clock>,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            jobs: DashMap::new(),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// 创建任务，id 已存在时失败
    pub fn create(&self, id: &str, chunk_count: usize) -> Result<Job, JobStoreError> {
        match self.jobs.entry(id.to_string()) {
            Entry::Occupied(_) => Err(JobStoreError::AlreadyExists(id.to_string())),
            Entry::Vacant(slot) => {
                let job = Job::new(id, chunk_count, self.clock.now());
                slot.insert(job.clone());
                Ok(job)
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Job> {
        self.jobs.get(id).map(|job| job.clone())
    }

    pub fn snapshot(&self, id: &str) -> Option<JobSnapshot> {
        self.jobs.get(id).map(|job| job.snapshot())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.jobs.contains_key(id)
    }

    /// 对仍存在的任务执行修改；任务已被删除时什么也不做，返回 `None`
    pub fn update<R>(&self, id: &str, mutator: impl FnOnce(&mut Job) -> R) -> Option<R> {
        self.jobs.get_mut(id).map(|mut job| mutator(job.value_mut()))
    }

    /// 删除任务，重复删除返回 `false`
    pub fn delete(&self, id: &str) -> bool {
        self.jobs.remove(id).is_some()
    }

    /// 删除创建时间早于 `now - max_age` 的全部任务，返回删除数量
    pub fn sweep_expired(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return 0;
        };

        let mut removed = 0;
        self.jobs.retain(|_, job| {
            let keep = now.signed_duration_since(job.created_at()) <= max_age;
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            metrics::counter!("parallel_reader_jobs_swept_total").increment(removed as u64);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// 启动周期性清理任务
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration, max_age: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // 第一次 tick 立即返回
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = store.sweep_expired(max_age, store.now());
                if removed > 0 {
                    tracing::info!("清理过期翻译任务: {} 个", removed);
                } else {
                    tracing::debug!("没有过期的翻译任务");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedClock(Mutex<DateTime<Utc>>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    impl FixedClock {
        fn advance(&self, by: chrono::Duration) {
            let mut now = self.0.lock().unwrap();
            *now += by;
        }
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let store = JobStore::new();
        let job = store.create("job-1", 3).unwrap();
        assert_eq!(job.total_chunks(), 3);

        assert_eq!(
            store.create("job-1", 5).unwrap_err(),
            JobStoreError::AlreadyExists("job-1".to_string())
        );
        assert_eq!(store.get("job-1").unwrap().total_chunks(), 3);
    }

    #[test]
    fn test_update_after_delete_is_noop() {
        let store = JobStore::new();
        store.create("job-1", 1).unwrap();

        assert_eq!(
            store.update("job-1", |job| job.fill_chunk(0, "x".into())),
            Some(true)
        );
        assert!(store.delete("job-1"));
        assert!(!store.delete("job-1"));
        assert_eq!(store.update("job-1", |job| job.fill_chunk(0, "y".into())), None);
        assert!(store.get("job-1").is_none());
    }

    #[test]
    fn test_sweep_removes_only_old_jobs() {
        let clock = Arc::new(FixedClock(Mutex::new(Utc::now())));
        let store = JobStore::with_clock(clock.clone());

        store.create("old", 1).unwrap();
        clock.advance(chrono::Duration::minutes(50));
        store.create("young", 1).unwrap();
        clock.advance(chrono::Duration::minutes(20));

        let removed = store.sweep_expired(Duration::from_secs(3600), store.now());
        assert_eq!(removed, 1);
        assert!(!store.contains("old"));
        assert!(store.contains("young"));
    }

    #[test]
    fn test_sweep_ignores_status() {
        let clock = Arc::new(FixedClock(Mutex::new(Utc::now())));
        let store = JobStore::with_clock(clock.clone());

        store.create("done", 1).unwrap();
        let now = store.now();
        store.update("done", |job| {
            job.fill_chunk(0, "x".into());
            job.complete(now)
        });
        store.create("running", 2).unwrap();

        clock.advance(chrono::Duration::hours(2));
        assert_eq!(store.sweep_expired(Duration::from_secs(3600), store.now()), 2);
        assert!(store.is_empty());
    }
}

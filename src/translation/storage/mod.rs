//! 存储模块
//!
//! 提供进程内的翻译任务存储，任务状态不做持久化。

pub mod job;
pub mod job_store;

pub use job::{ChunkView, Job, JobSnapshot, JobStatus, Progress};
pub use job_store::{Clock, JobStore, JobStoreError, SystemClock};

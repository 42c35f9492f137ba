//! 翻译任务模型
//!
//! 任务记录只由后台处理循环写入。`snapshot()` 是轮询接口和推送事件共用的唯一投影。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::translation::pipeline::cleaner;

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

/// 翻译任务
#[derive(Debug, Clone)]
pub struct Job {
    id: String,
    status: JobStatus,
    /// 长度在创建时固定，槽位一旦填入就不会被清空
    chunks: Vec<Option<String>>,
    result: Option<String>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(id: impl Into<String>, chunk_count: usize, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Processing,
            chunks: vec![None; chunk_count],
            result: None,
            error: None,
            created_at,
            completed_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn total_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn completed_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_some()).count()
    }

    pub fn chunk(&self, index: usize) -> Option<&str> {
        self.chunks.get(index).and_then(|c| c.as_deref())
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// 写入一个分片的译文
    ///
    /// 已填充的槽位、越界索引或终态任务都会被拒绝，返回 `false`。
    pub fn fill_chunk(&mut self, index: usize, text: String) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        match self.chunks.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(text);
                true
            }
            _ => false,
        }
    }

    /// 拼接全部分片并标记完成，仍有空槽位时不做任何改变
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let Some(filled) = self
            .chunks
            .iter()
            .map(|c| c.as_deref())
            .collect::<Option<Vec<&str>>>()
        else {
            return false;
        };

        self.result = Some(cleaner::reassemble(&filled));
        self.status = JobStatus::Completed;
        self.completed_at = Some(now);
        true
    }

    /// 标记整个任务失败
    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.error = Some(message.into());
        self.status = JobStatus::Error;
        self.completed_at = Some(now);
        true
    }

    /// 某个时间点的任务视图
    pub fn snapshot(&self) -> JobSnapshot {
        let completed_chunks: Vec<ChunkView> = self
            .chunks
            .iter()
            .enumerate()
            .filter_map(|(index, chunk)| {
                chunk.as_ref().map(|text| ChunkView {
                    index,
                    text: text.clone(),
                })
            })
            .collect();

        JobSnapshot {
            id: self.id.clone(),
            status: self.status,
            progress: Progress {
                completed: completed_chunks.len(),
                total: self.chunks.len(),
            },
            completed_chunks,
            translated_text: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

/// 进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// 百分比，0..=100
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed * 100) / self.total).min(100) as u8
    }
}

/// 已完成分片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkView {
    pub index: usize,
    pub text: String,
}

/// 任务快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub id: String,
    pub status: JobStatus,
    pub progress: Progress,
    pub completed_chunks: Vec<ChunkView>,
    pub translated_text: Option<String>,
    pub error: Option<String>,
}

impl JobSnapshot {
    pub fn chunk_text(&self, index: usize) -> Option<&str> {
        self.completed_chunks
            .iter()
            .find(|c| c.index == index)
            .map(|c| c.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(n: usize) -> Job {
        Job::new("translation-test", n, Utc::now())
    }

    #[test]
    fn test_new_job_is_processing_and_empty() {
        let job = job(3);
        assert_eq!(job.status(), JobStatus::Processing);
        assert_eq!(job.total_chunks(), 3);
        assert_eq!(job.completed_chunks(), 0);
        assert!(job.result().is_none());
    }

    #[test]
    fn test_slots_fill_once() {
        let mut job = job(2);
        assert!(job.fill_chunk(0, "<p>a</p>".to_string()));
        assert!(!job.fill_chunk(0, "<p>b</p>".to_string()));
        assert!(!job.fill_chunk(5, "<p>c</p>".to_string()));
        assert_eq!(job.chunk(0), Some("<p>a</p>"));
        assert_eq!(job.total_chunks(), 2);
    }

    #[test]
    fn test_complete_requires_all_slots() {
        let mut job = job(2);
        job.fill_chunk(0, "<p>one</p>".to_string());
        assert!(!job.complete(Utc::now()));
        assert_eq!(job.status(), JobStatus::Processing);

        job.fill_chunk(1, "<p>p two</p>".to_string());
        assert!(job.complete(Utc::now()));
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.result(), Some("<p>one</p><p>two</p>"));
        assert!(job.completed_at().is_some());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut job = job(1);
        assert!(job.fail("boom", Utc::now()));
        assert!(!job.fill_chunk(0, "late".to_string()));
        assert!(!job.complete(Utc::now()));
        assert!(!job.fail("again", Utc::now()));
        assert_eq!(job.error(), Some("boom"));
        assert_eq!(job.status(), JobStatus::Error);
    }

    #[test]
    fn test_snapshot_projection() {
        let mut job = job(3);
        job.fill_chunk(0, "zero".to_string());
        job.fill_chunk(1, "one".to_string());

        let snapshot = job.snapshot();
        assert_eq!(snapshot.progress, Progress { completed: 2, total: 3 });
        assert_eq!(snapshot.progress.percent(), 66);
        assert_eq!(snapshot.chunk_text(1), Some("one"));
        assert_eq!(snapshot.chunk_text(2), None);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["status"], "processing");
        assert_eq!(value["progress"]["total"], 3);
        assert_eq!(value["completedChunks"][1]["index"], 1);
        assert!(value["translatedText"].is_null());
        assert!(value["error"].is_null());
    }
}

//! 翻译任务编排器
//!
//! 负责创建翻译任务，并在后台按顺序驱动每个分片经过翻译网关。
//!
//! ## 处理流程
//!
//! 1. 短文本（字符数低于阈值）直接同步翻译，不创建任务
//! 2. 长文本先分片，再在任务存储中创建记录，立即返回任务 id
//! 3. 后台任务逐个翻译分片，每个分片写入后推送一次更新
//! 4. 全部分片写入后拼接、清理，标记完成，并在保留期结束后删除
//!
//! ## 取消
//!
//! 没有显式的取消操作。删除任务记录就是取消：后台循环在每一步之前检查任务是否存在，
//! 不存在时静默退出，不再写入任何内容。
//!
//! ## 失败隔离
//!
//! - 单个分片失败只会在该位置写入错误占位内容，任务继续
//! - 循环本身出错或 panic 时，任务进入 `error` 终态

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;
use uuid::Uuid;

use super::gateway::{FragmentPosition, TranslationGateway};
use crate::realtime::{
    ErrorEvent, Notifier, ServerEvent, TranslationComplete, TranslationStart, TranslationUpdate,
};
use crate::translation::config::TranslationConfig;
use crate::translation::error::{
    helpers::{internal_error, log_error, validation_error},
    TranslationError, TranslationResult,
};
use crate::translation::pipeline::Chunker;
use crate::translation::storage::{JobSnapshot, JobStore, JobStoreError};

/// 创建任务 id 时的最大重试次数
const MAX_ID_ATTEMPTS: usize = 5;

/// 整个任务失败时推送的错误代码
const JOB_FAILED_CODE: &str = "TRANSLATION_FAILED";

/// 编排器参数
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    pub max_chunk_length: usize,
    pub direct_translation_threshold: usize,
    pub chunk_delay: Duration,
    pub completed_retention: Duration,
}

impl From<&TranslationConfig> for OrchestratorSettings {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            max_chunk_length: config.max_chunk_length,
            direct_translation_threshold: config.direct_translation_threshold,
            chunk_delay: config.chunk_delay(),
            completed_retention: config.completed_retention(),
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&TranslationConfig::default())
    }
}

/// 提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 短文本直接翻译的结果
    Direct { translated_text: String },
    /// 已创建后台任务
    Job {
        translation_id: String,
        total_chunks: usize,
    },
}

/// 后台循环的正常结束方式
enum LoopOutcome {
    Completed,
    /// 任务在处理中被删除
    Deleted,
}

/// 翻译任务编排器
///
/// 所有字段都可以廉价克隆，后台任务持有自己的一份。
#[derive(Clone)]
pub struct JobOrchestrator {
    store: Arc<JobStore>,
    gateway: TranslationGateway,
    notifier: Arc<Notifier>,
    settings: OrchestratorSettings,
}

impl JobOrchestrator {
    pub fn new(
        store: Arc<JobStore>,
        gateway: TranslationGateway,
        notifier: Arc<Notifier>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// 提交一段待翻译的 HTML
    ///
    /// # 参数
    ///
    /// * `text` - 任意长度的 HTML 文本
    /// * `client_id` - 推送通道的客户端 id，任务事件会推送给它
    ///
    /// # 返回值
    ///
    /// 短文本返回 [`SubmitOutcome::Direct`]；长文本在后台任务启动后立即返回
    /// [`SubmitOutcome::Job`]。
    ///
    /// # 错误
    ///
    /// - 空白文本返回 `InvalidInput`，不会创建任务
    /// - 直接翻译时翻译服务的错误原样返回
    pub async fn submit(
        &self,
        text: &str,
        client_id: Option<String>,
    ) -> TranslationResult<SubmitOutcome> {
        if text.trim().is_empty() {
            return Err(validation_error("Text is required"));
        }

        let length = text.chars().count();
        if length < self.settings.direct_translation_threshold {
            tracing::info!("直接翻译 {} 个字符", length);
            metrics::counter!("parallel_reader_direct_translations_total").increment(1);
            let translated_text = self.gateway.translate(text, None).await?;
            return Ok(SubmitOutcome::Direct { translated_text });
        }

        let fragments = Chunker::new(self.settings.max_chunk_length).chunk(text);
        let total_chunks = fragments.len();
        let translation_id = self.create_job(total_chunks)?;

        metrics::counter!("parallel_reader_jobs_created_total").increment(1);
        tracing::info!(
            "创建翻译任务 {}: {} 个字符，{} 个分片",
            translation_id,
            length,
            total_chunks
        );

        if let Some(client_id) = client_id.as_deref() {
            self.notifier.send(
                client_id,
                ServerEvent::TranslationStart(TranslationStart {
                    translation_id: translation_id.clone(),
                    total_chunks,
                }),
            );
        }

        let this = self.clone();
        let id = translation_id.clone();
        tokio::spawn(async move { this.drive(id, fragments, client_id).await });

        Ok(SubmitOutcome::Job {
            translation_id,
            total_chunks,
        })
    }

    /// 查询任务快照
    pub fn status(&self, translation_id: &str) -> TranslationResult<JobSnapshot> {
        self.store
            .snapshot(translation_id)
            .ok_or_else(|| TranslationError::JobNotFound(translation_id.to_string()))
    }

    fn create_job(&self, total_chunks: usize) -> TranslationResult<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = generate_translation_id();
            match self.store.create(&id, total_chunks) {
                Ok(_) => return Ok(id),
                Err(JobStoreError::AlreadyExists(existing)) => {
                    tracing::debug!("任务 id 冲突，重新生成: {}", existing);
                }
            }
        }
        Err(internal_error("无法生成唯一的任务 id"))
    }

    /// 运行一个任务直到完成、失败或被删除
    async fn drive(self, id: String, fragments: Vec<String>, client_id: Option<String>) {
        let span = tracing::info_span!("translation_job", job_id = %id);

        async move {
            // 在独立任务里跑循环，panic 只会变成 JoinError
            let worker = {
                let this = self.clone();
                let id = id.clone();
                let client_id = client_id.clone();
                tokio::spawn(
                    async move { this.process_chunks(&id, &fragments, client_id.as_deref()).await }
                        .in_current_span(),
                )
            };

            let outcome = match worker.await {
                Ok(result) => result,
                Err(join_error) if join_error.is_panic() => Err(TranslationError::ProcessingError(
                    panic_message(join_error.into_panic()),
                )),
                Err(join_error) => Err(internal_error(join_error)),
            };

            match outcome {
                Ok(LoopOutcome::Completed) => self.finish(&id, client_id.as_deref()),
                Ok(LoopOutcome::Deleted) => {
                    tracing::debug!("任务在处理中被删除，停止处理");
                }
                Err(error) => self.fail(&id, error, client_id.as_deref()),
            }
        }
        .instrument(span)
        .await
    }

    async fn process_chunks(
        &self,
        id: &str,
        fragments: &[String],
        client_id: Option<&str>,
    ) -> TranslationResult<LoopOutcome> {
        let total = fragments.len();

        for (index, fragment) in fragments.iter().enumerate() {
            if !self.store.contains(id) {
                return Ok(LoopOutcome::Deleted);
            }

            let position = FragmentPosition { index, total };
            let text = match self.gateway.translate(fragment, Some(position)).await {
                Ok(text) => text,
                Err(error) => {
                    tracing::warn!("分片 {}/{} 翻译失败: {}", index + 1, total, error);
                    metrics::counter!("parallel_reader_chunk_failures_total").increment(1);
                    error_placeholder(index, &error)
                }
            };

            let Some((filled, snapshot)) = self.store.update(id, |job| {
                let filled = job.fill_chunk(index, text);
                (filled, job.snapshot())
            }) else {
                return Ok(LoopOutcome::Deleted);
            };

            if !filled {
                return Err(internal_error(format!("分片 {} 无法写入", index + 1)));
            }

            tracing::info!("分片 {}/{} 处理完成", index + 1, total);
            if let Some(client_id) = client_id {
                if let Some(update) = TranslationUpdate::from_snapshot(&snapshot, index) {
                    self.notifier
                        .send(client_id, ServerEvent::TranslationUpdate(update));
                }
            }

            if index + 1 < total {
                tokio::time::sleep(self.settings.chunk_delay).await;
            }
        }

        let now = self.store.now();
        match self.store.update(id, |job| job.complete(now)) {
            Some(true) => Ok(LoopOutcome::Completed),
            Some(false) => Err(internal_error("仍有分片未完成，无法汇总结果")),
            None => Ok(LoopOutcome::Deleted),
        }
    }

    fn finish(&self, id: &str, client_id: Option<&str>) {
        metrics::counter!("parallel_reader_jobs_completed_total").increment(1);
        tracing::info!("翻译任务 {} 完成", id);

        if let Some(client_id) = client_id {
            self.notifier.send(
                client_id,
                ServerEvent::TranslationComplete(TranslationComplete {
                    translation_id: id.to_string(),
                    timestamp: self.store.now().timestamp_millis(),
                }),
            );
        }

        self.schedule_deletion(id);
    }

    fn fail(&self, id: &str, error: TranslationError, client_id: Option<&str>) {
        let error = log_error(error);
        let message = error.to_string();
        let now = self.store.now();

        if self.store.update(id, |job| job.fail(message.clone(), now)) != Some(true) {
            return;
        }
        metrics::counter!("parallel_reader_jobs_failed_total").increment(1);

        if let Some(client_id) = client_id {
            self.notifier.send(
                client_id,
                ServerEvent::Error(ErrorEvent {
                    translation_id: Some(id.to_string()),
                    message,
                    code: JOB_FAILED_CODE.to_string(),
                }),
            );
        }

        self.schedule_deletion(id);
    }

    /// 保留期结束后删除任务；期间被清理任务删掉也没关系
    fn schedule_deletion(&self, id: &str) {
        let store = Arc::clone(&self.store);
        let retention = self.settings.completed_retention;
        let id = id.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            if store.delete(&id) {
                tracing::info!("清理翻译任务 {}", id);
            }
        });
    }
}

fn generate_translation_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "translation-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}

fn error_placeholder(index: usize, error: &TranslationError) -> String {
    format!(
        "<div class=\"translation-error\">Translation error in part {}: {}</div>",
        index + 1,
        error
    )
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("翻译任务异常终止: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("翻译任务异常终止: {}", message)
    } else {
        "翻译任务异常终止".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_id_format() {
        let id = generate_translation_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "translation");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn test_placeholder_names_part() {
        let placeholder = error_placeholder(2, &TranslationError::RateLimitExceeded);
        assert!(placeholder.starts_with("<div class=\"translation-error\">"));
        assert!(placeholder.contains("Translation error in part 3"));
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("kaput");
        assert!(panic_message(payload).contains("kaput"));

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert!(panic_message(payload).contains("owned"));
    }
}

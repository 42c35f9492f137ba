// 集成测试公共模块
//
// 提供测试替身翻译服务、手动时钟和文档构建工具

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Semaphore;

use parallel_reader::realtime::Notifier;
use parallel_reader::translation::{
    create_orchestrator_with, Clock, JobOrchestrator, JobSnapshot, JobStatus, JobStore,
    TranslationConfig, TranslationError, TranslationResult, Translator,
};

// ============================================================================
// 翻译服务替身
// ============================================================================

/// 原样返回输入，并记录每次调用的提示词
#[derive(Default)]
pub struct EchoTranslator {
    prompts: Mutex<Vec<String>>,
}

impl EchoTranslator {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Translator for EchoTranslator {
    async fn complete(&self, system_prompt: &str, input: &str) -> TranslationResult<String> {
        self.prompts.lock().unwrap().push(system_prompt.to_string());
        Ok(input.to_string())
    }
}

/// 按调用序号决定结果的翻译服务
pub struct ScriptedTranslator<F> {
    script: F,
    calls: AtomicUsize,
}

impl<F> ScriptedTranslator<F>
where
    F: Fn(usize, &str) -> TranslationResult<String> + Send + Sync,
{
    pub fn new(script: F) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<F> Translator for ScriptedTranslator<F>
where
    F: Fn(usize, &str) -> TranslationResult<String> + Send + Sync,
{
    async fn complete(&self, _system_prompt: &str, input: &str) -> TranslationResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(call, input)
    }
}

/// 第 `index` 次调用失败，其余原样返回
pub fn failing_at(
    index: usize,
    error: TranslationError,
) -> ScriptedTranslator<impl Fn(usize, &str) -> TranslationResult<String> + Send + Sync> {
    ScriptedTranslator::new(move |call, input| {
        if call == index {
            Err(error.clone())
        } else {
            Ok(input.to_string())
        }
    })
}

/// 每次调用都要等测试放行一次
pub struct GatedTranslator {
    gate: Semaphore,
    calls: AtomicUsize,
}

impl GatedTranslator {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release(&self, permits: usize) {
        self.gate.add_permits(permits);
    }

    /// 已经开始的调用次数（包括还在等待放行的）
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for GatedTranslator {
    async fn complete(&self, _system_prompt: &str, input: &str) -> TranslationResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| TranslationError::InternalError(e.to_string()))?;
        permit.forget();
        Ok(input.to_string())
    }
}

/// 第 `index` 次调用时 panic
pub struct PanickingTranslator {
    index: usize,
    calls: AtomicUsize,
}

impl PanickingTranslator {
    pub fn at(index: usize) -> Self {
        Self {
            index,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Translator for PanickingTranslator {
    async fn complete(&self, _system_prompt: &str, input: &str) -> TranslationResult<String> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.index {
            panic!("kaput");
        }
        Ok(input.to_string())
    }
}

// ============================================================================
// 时钟
// ============================================================================

/// 手动推进的时钟
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ============================================================================
// 测试环境
// ============================================================================

/// 一套组装好的编排器、存储和通知器
pub struct TestEnvironment {
    pub config: TranslationConfig,
    pub store: Arc<JobStore>,
    pub notifier: Arc<Notifier>,
    pub orchestrator: JobOrchestrator,
}

impl TestEnvironment {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self::with_store(translator, Arc::new(JobStore::new()))
    }

    pub fn with_store(translator: Arc<dyn Translator>, store: Arc<JobStore>) -> Self {
        let config = TranslationConfig::default();
        let notifier = Arc::new(Notifier::new());
        let orchestrator =
            create_orchestrator_with(&config, translator, Arc::clone(&store), Arc::clone(&notifier));

        Self {
            config,
            store,
            notifier,
            orchestrator,
        }
    }

    /// 轮询直到任务满足条件，超时返回最后一次快照
    pub async fn wait_for<P>(&self, id: &str, predicate: P) -> JobSnapshot
    where
        P: Fn(&JobSnapshot) -> bool,
    {
        for _ in 0..10_000 {
            if let Ok(snapshot) = self.orchestrator.status(id) {
                if predicate(&snapshot) {
                    return snapshot;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} never reached the expected state", id);
    }

    pub async fn wait_for_status(&self, id: &str, status: JobStatus) -> JobSnapshot {
        self.wait_for(id, |snapshot| snapshot.status == status).await
    }
}

// ============================================================================
// HTML 构建工具
// ============================================================================

pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 总长度恰好为 `len` 个字符的段落，正文不含任何标签名单词
    pub fn paragraph(len: usize) -> String {
        const FILLER: &str = "lorem ipsum dolor sit amet consectetur elit ";
        let body_len = len.saturating_sub("<p></p>".len());
        let mut body: String = FILLER.chars().cycle().take(body_len).collect();
        if body.ends_with(' ') {
            body.pop();
            body.push('x');
        }
        format!("<p>{}</p>", body)
    }

    /// `count` 个长度为 `paragraph_len` 的段落直接相连
    pub fn document(count: usize, paragraph_len: usize) -> String {
        (0..count).map(|_| Self::paragraph(paragraph_len)).collect()
    }

    /// 正文为中文的段落，总长度恰好为 `len` 个字符
    pub fn cjk_paragraph(len: usize) -> String {
        const FILLER: &str = "并行阅读把长文章切成片段逐段翻译";
        let body_len = len.saturating_sub("<p></p>".len());
        let body: String = FILLER.chars().cycle().take(body_len).collect();
        format!("<p>{}</p>", body)
    }

    pub fn cjk_document(count: usize, paragraph_len: usize) -> String {
        (0..count).map(|_| Self::cjk_paragraph(paragraph_len)).collect()
    }
}

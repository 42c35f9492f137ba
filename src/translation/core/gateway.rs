//! 翻译网关
//!
//! 对单个片段调用翻译服务，并清理返回结果中的标签名泄漏。不做内部重试。

use std::sync::Arc;

use super::translator::Translator;
use crate::translation::error::TranslationResult;
use crate::translation::pipeline::cleaner;

/// 片段在整篇文档中的位置，从 0 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentPosition {
    pub index: usize,
    pub total: usize,
}

/// 翻译网关
#[derive(Clone)]
pub struct TranslationGateway {
    translator: Arc<dyn Translator>,
    target_lang: String,
}

impl TranslationGateway {
    pub fn new(translator: Arc<dyn Translator>, target_lang: impl Into<String>) -> Self {
        Self {
            translator,
            target_lang: target_lang.into(),
        }
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    /// 翻译一个片段；`position` 为空表示整段直接翻译
    pub async fn translate(
        &self,
        fragment: &str,
        position: Option<FragmentPosition>,
    ) -> TranslationResult<String> {
        let prompt = self.system_prompt(position);
        let raw = self.translator.complete(&prompt, fragment).await?;
        Ok(cleaner::clean(&raw))
    }

    pub fn system_prompt(&self, position: Option<FragmentPosition>) -> String {
        let header = match position {
            Some(FragmentPosition { index, total }) => format!(
                "You are a translator. Translate the following HTML fragment to {}.\n\
                 This is part {} of {} of a larger text.",
                self.target_lang,
                index + 1,
                total
            ),
            None => format!(
                "You are a translator. Translate the following text to {}.",
                self.target_lang
            ),
        };

        format!("{}\n\n{}", header, PROMPT_RULES)
    }
}

const PROMPT_RULES: &str = r#"VERY IMPORTANT INSTRUCTIONS:
1. The text contains HTML tags like <div>, <p>, etc.
2. DO NOT translate HTML tags or attributes
3. DO NOT add tag names as text content in your output
4. DO NOT add any text like 'div', 'p', 'span', etc. before or after tags
5. Only translate the actual text BETWEEN the HTML tags
6. Keep all HTML structure and formatting intact

For example:
Input: "<div>Hello world</div>"
Correct output: "<div>Hello world</div>"
INCORRECT output: "<div>div Hello world</div>" or "<div>Hello world div</div>"

Input: "<p>Bonjour le monde</p>"
Correct output: "<p>Hello world</p>"
INCORRECT output: "<p>p Hello world</p>" or "<p>Hello world p</p>""#;

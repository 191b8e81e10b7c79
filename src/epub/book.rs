//! 解析结果模块
//!
//! 流水线的最终输出。结果构造完成后不再修改，只通过只读方法访问。

use crate::epub::cover::Cover;
use crate::epub::opf::Metadata;
use crate::epub::render::{SectionOutcome, SkipReason};
use crate::epub::version::EpubVersion;
use serde::Serialize;

/// 一个章节的渲染结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Content {
    /// 自包含的HTML正文(图片已内联)
    pub html: String,
    /// 章节标题
    pub title: String,
}

/// 对外的元数据，每一项只取第一个值，缺失时为空字符串
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultMetadata {
    pub main_id: String,
    pub title: String,
    pub identifier: String,
    pub language: String,
    pub creator: String,
    pub contributor: String,
    pub publisher: String,
    pub subject: String,
    pub description: String,
    pub date: String,
    /// `<meta name="cover">` 指向的清单项id
    pub cover_id: String,
}

impl From<&Metadata> for ResultMetadata {
    fn from(metadata: &Metadata) -> Self {
        let owned = |value: Option<&str>| value.unwrap_or_default().to_string();
        Self {
            main_id: owned(metadata.main_id()),
            title: owned(metadata.title()),
            identifier: owned(metadata.identifier()),
            language: owned(metadata.language()),
            creator: owned(metadata.creator().map(|c| c.name.as_str())),
            contributor: owned(metadata.contributor().map(|c| c.name.as_str())),
            publisher: owned(metadata.publisher()),
            subject: owned(metadata.subject()),
            description: owned(metadata.description()),
            date: owned(metadata.date()),
            cover_id: metadata.cover_id.clone(),
        }
    }
}

/// 解析结果：元数据 + 按脊柱顺序排列的章节
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedBookResult {
    metadata: ResultMetadata,
    texts: Vec<Content>,
}

impl ParsedBookResult {
    pub fn new(metadata: ResultMetadata, texts: Vec<Content>) -> Self {
        Self { metadata, texts }
    }

    /// 获取元数据
    pub fn metadata(&self) -> &ResultMetadata {
        &self.metadata
    }

    /// 获取全部章节
    pub fn texts(&self) -> &[Content] {
        &self.texts
    }

    /// 章节标题列表
    pub fn titles(&self) -> Vec<&str> {
        self.texts.iter().map(|content| content.title.as_str()).collect()
    }
}

/// 被跳过的脊柱项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSection {
    pub idref: String,
    pub reason: SkipReason,
}

/// 一次完整提取的全部产物
///
/// 除了 [`ParsedBookResult`] 之外，还带有封面、完整元数据以及被跳过的脊柱项，
/// 便于诊断。
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedBook {
    pub version: EpubVersion,
    /// OPF文件在归档中的路径
    pub rootfile: String,
    pub result: ParsedBookResult,
    /// 完整的元数据列表
    pub full_metadata: Metadata,
    pub cover: Option<Cover>,
    pub skipped: Vec<SkippedSection>,
}

impl ExtractedBook {
    /// 按脊柱顺序汇总渲染结果：渲染成功的进入章节列表，其余记入跳过列表
    pub(crate) fn assemble(
        version: EpubVersion,
        rootfile: String,
        metadata: Metadata,
        outcomes: Vec<SectionOutcome>,
        cover: Option<Cover>,
    ) -> Self {
        let mut texts = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();

        for outcome in outcomes {
            match outcome {
                SectionOutcome::Rendered(content) => texts.push(content),
                SectionOutcome::Skipped { idref, reason } => {
                    skipped.push(SkippedSection { idref, reason });
                }
            }
        }

        let result = ParsedBookResult::new(ResultMetadata::from(&metadata), texts);
        Self {
            version,
            rootfile,
            result,
            full_metadata: metadata,
            cover,
            skipped,
        }
    }

    pub fn into_result(self) -> ParsedBookResult {
        self.result
    }
}

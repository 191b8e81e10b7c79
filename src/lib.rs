pub mod epub;

// === 核心API重新导出 ===

/// EPUB读取器（主要接口）
pub use epub::Epub;

/// 错误处理
pub use epub::{EpubError, Result};

/// 解析选项
pub use epub::ParseOptions;

// === 解析结果 ===

pub use epub::{Content, ExtractedBook, ParsedBookResult, ResultMetadata, SkipReason, SkippedSection};

/// 封面图片
pub use epub::Cover;

/// EPUB版本
pub use epub::EpubVersion;

// === 底层组件（高级用法） ===

/// 归档与容器组件
pub use epub::{Container, EpubArchive, RootFile};

/// OPF组件
pub use epub::{
    Creator,
    DateEntry,
    Identifier,
    Manifest,
    ManifestItem,
    Metadata,
    Package,
    Spine,
    SpineItemRef,
    Title,
};

/// 目录组件
pub use epub::{NavMap, NavPoint, TocEntry, TocMap, TocSource};

// === 库信息 ===

/// 库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库的描述
pub const DESCRIPTION: &str = "EPUB 2/3 元数据与正文提取库";

// === 便捷函数 ===

/// 解析EPUB文件，返回元数据和按阅读顺序排列的章节
///
/// 这是 `Epub::open(path)?.parse()` 的便捷包装函数，使用默认解析选项。
///
/// # 参数
/// * `path` - EPUB文件路径
///
/// # 返回值
/// * `Result<ParsedBookResult>` - 解析结果
///
/// # 示例
///
/// ```no_run
/// let book = epub_parser::parse_epub("book.epub")?;
/// println!("书名: {}", book.metadata().title);
/// for content in book.texts() {
///     println!("{}", content.title);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_epub<P: AsRef<std::path::Path>>(path: P) -> Result<ParsedBookResult> {
    Ok(Epub::open(path)?.parse()?.into_result())
}

pub mod archive;
pub mod book;
pub mod config;
pub mod container;
pub mod cover;
pub mod error;
pub mod opf;
pub mod reader;
pub mod render;
pub mod toc;
pub mod version;

#[cfg(test)]
pub(crate) mod fixtures;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出归档与容器
pub use archive::EpubArchive;
pub use container::{Container, RootFile};

// 重新导出读取器和解析结果
pub use book::{Content, ExtractedBook, ParsedBookResult, ResultMetadata, SkippedSection};
pub use config::ParseOptions;
pub use cover::Cover;
pub use reader::Epub;
pub use render::{ContentRenderer, SectionOutcome, SkipReason};
pub use version::EpubVersion;

// 重新导出OPF相关
pub use opf::{
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

// 重新导出目录相关
pub use toc::{NavMap, NavPoint, TocEntry, TocMap, TocSource};

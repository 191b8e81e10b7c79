use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// Epub解析过程中对调用方可见的错误类型
///
/// 只有结构性错误会出现在这里；单个章节或图片读取失败属于可降级情况，
/// 不会以错误形式返回。
#[derive(Error, Debug)]
pub enum EpubError {
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("非法路径(越出归档根目录): {0}")]
    InvalidPath(String),

    #[error("归档中不存在条目: {0}")]
    EntryNotFound(String),

    #[error("container.xml解析错误: {0}")]
    MalformedContainer(String),

    #[error("不支持的EPUB版本: '{0}'")]
    UnsupportedVersion(String),

    #[error("OPF文件解析错误: {0}")]
    MalformedPackage(String),

    #[error("OPF缺少必需的元数据: {0}")]
    MissingMetadata(String),

    #[error("目录文件 '{path}' 解析失败: {reason}")]
    TocParseFailed { path: String, reason: String },

    #[error("XML解析错误: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("配置文件错误: {0}")]
    ConfigError(String),
}

impl EpubError {
    /// 将底层错误归入目录解析失败
    pub(crate) fn toc(path: &str, reason: impl ToString) -> Self {
        EpubError::TocParseFailed {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

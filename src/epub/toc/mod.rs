//! 目录解析模块
//!
//! 把NCX(EPUB2)或导航文档(EPUB3)解析成 [`TocMap`]：内容文件完整路径 → 显示标题。
//! 两种来源都是"先到先得"，同一路径只保留第一次出现的标题。

mod nav_doc;
mod navigation;
mod ncx;

use crate::epub::archive::{EpubArchive, decode_utf8, parent_dir};
use crate::epub::error::{EpubError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::io::{Read, Seek};

pub use nav_doc::parse_nav_document;
pub use navigation::{NavMap, NavPoint};
pub use ncx::parse_ncx;

/// 目录中的一项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocEntry {
    /// 内容文件在归档中的完整路径(不含片段)
    pub path: String,
    pub title: String,
}

/// 路径到标题的映射，按首次出现的顺序保存
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TocMap {
    entries: Vec<TocEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl TocMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个标题；路径已存在时忽略并返回 `false`
    pub fn insert(&mut self, path: String, title: String) -> bool {
        if self.index.contains_key(&path) {
            return false;
        }
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push(TocEntry { path, title });
        true
    }

    /// 查找路径对应的标题
    pub fn get(&self, path: &str) -> Option<&str> {
        self.index
            .get(path)
            .map(|&i| self.entries[i].title.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TocEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 目录来源，携带目录文件在归档中的完整路径
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TocSource {
    /// NCX文件
    Ncx(String),
    /// EPUB3导航文档
    NavDocument(String),
}

impl TocSource {
    pub fn path(&self) -> &str {
        match self {
            TocSource::Ncx(path) | TocSource::NavDocument(path) => path,
        }
    }

    /// 读取并解析目录文件
    ///
    /// 目录中的href相对于目录文件自身所在目录解析。
    ///
    /// # 返回值
    /// * `Result<TocMap>` - 读取、解码或解析失败都返回 `TocParseFailed`
    pub fn resolve<R: Read + Seek>(&self, archive: &mut EpubArchive<R>) -> Result<TocMap> {
        let path = self.path();
        let bytes = archive.read(path).map_err(|e| EpubError::toc(path, e))?;
        let content = decode_utf8(&bytes).ok_or_else(|| EpubError::toc(path, "不是有效的UTF-8文本"))?;
        let base_dir = parent_dir(path);

        let toc = match self {
            TocSource::Ncx(_) => parse_ncx(content, base_dir),
            TocSource::NavDocument(_) => Ok(parse_nav_document(content, base_dir)),
        }
        .map_err(|e| match e {
            EpubError::TocParseFailed { .. } => e,
            other => EpubError::toc(path, other),
        })?;

        tracing::debug!(source = %path, entries = toc.len(), "目录解析完成");
        Ok(toc)
    }
}

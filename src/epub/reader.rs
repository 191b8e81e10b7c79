//! EPUB读取入口
//!
//! 把各阶段串成一条流水线：container → 版本分派 → OPF → 目录 → 正文渲染 → 封面 → 汇总。
//! 结构性错误立即返回，不产生部分结果。

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::epub::archive::{EpubArchive, decode_utf8, parent_dir};
use crate::epub::book::ExtractedBook;
use crate::epub::config::ParseOptions;
use crate::epub::container::{CONTAINER_PATH, Container};
use crate::epub::cover::Cover;
use crate::epub::error::{EpubError, Result};
use crate::epub::opf::Package;
use crate::epub::render::ContentRenderer;
use crate::epub::toc::TocMap;
use crate::epub::version::EpubVersion;

/// 表示一个已打开的EPUB文件
pub struct Epub<R: Read + Seek = File> {
    archive: EpubArchive<R>,
}

impl Epub<File> {
    /// 从文件路径打开EPUB
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<Epub, EpubError>` - 文件不存在返回 `FileNotFound`，不是zip返回 `Zip`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            archive: EpubArchive::open(path)?,
        })
    }
}

impl Epub<Cursor<Vec<u8>>> {
    /// 从内存中的字节打开EPUB
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self {
            archive: EpubArchive::from_bytes(bytes)?,
        })
    }
}

impl<R: Read + Seek> Epub<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        Ok(Self {
            archive: EpubArchive::from_reader(reader)?,
        })
    }

    /// 列出归档中的所有条目
    pub fn list_files(&self) -> Vec<String> {
        self.archive.file_names()
    }

    /// 读取container.xml并返回OPF文件路径
    ///
    /// # 返回值
    /// * `Result<String, EpubError>` - container.xml缺失、不是UTF-8或没有rootfile时返回 `MalformedContainer`
    pub fn rootfile_path(&mut self) -> Result<String> {
        let bytes = self.archive.read(CONTAINER_PATH).map_err(|e| match e {
            EpubError::EntryNotFound(_) => {
                EpubError::MalformedContainer(format!("归档中缺少 {}", CONTAINER_PATH))
            }
            other => other,
        })?;
        let content = decode_utf8(&bytes)
            .ok_or_else(|| EpubError::MalformedContainer("不是有效的UTF-8文本".to_string()))?;

        let container = Container::parse_xml(content)?;
        container
            .get_opf_path()
            .map(str::to_string)
            .ok_or_else(|| EpubError::MalformedContainer("没有rootfile条目".to_string()))
    }

    /// 读取OPF文件文本
    fn read_package_text(&mut self, rootfile: &str) -> Result<String> {
        let bytes = self.archive.read(rootfile).map_err(|e| match e {
            EpubError::EntryNotFound(_) | EpubError::InvalidPath(_) => {
                EpubError::MalformedPackage(format!("无法读取OPF文件 {}: {}", rootfile, e))
            }
            other => other,
        })?;
        decode_utf8(&bytes)
            .map(str::to_string)
            .ok_or_else(|| EpubError::MalformedPackage(format!("{} 不是有效的UTF-8文本", rootfile)))
    }

    /// 检测EPUB版本
    pub fn version(&mut self) -> Result<EpubVersion> {
        let rootfile = self.rootfile_path()?;
        let opf = self.read_package_text(&rootfile)?;
        EpubVersion::detect(&opf)
    }

    /// 按版本解析OPF文件
    pub fn package(&mut self) -> Result<(EpubVersion, Package)> {
        let rootfile = self.rootfile_path()?;
        self.load_package(&rootfile)
    }

    fn load_package(&mut self, rootfile: &str) -> Result<(EpubVersion, Package)> {
        let opf = self.read_package_text(rootfile)?;
        let version = EpubVersion::detect(&opf)?;
        tracing::debug!(%rootfile, %version, "检测到EPUB版本");
        let package = version.parse_package(&opf)?;
        Ok((version, package))
    }

    /// 解析目录，得到 完整路径 → 标题 的映射
    pub fn toc_map(&mut self) -> Result<TocMap> {
        let rootfile = self.rootfile_path()?;
        let (version, package) = self.load_package(&rootfile)?;
        let source = version.toc_source(&package.manifest, &package.spine, parent_dir(&rootfile))?;
        source.resolve(&mut self.archive)
    }

    /// 使用默认选项解析整本书
    pub fn parse(&mut self) -> Result<ExtractedBook> {
        self.parse_with_options(&ParseOptions::default_config())
    }

    /// 解析整本书
    ///
    /// # 参数
    /// * `options` - 解析选项
    ///
    /// # 返回值
    /// * `Result<ExtractedBook, EpubError>` - 只有结构性错误会返回Err，
    ///   单个章节、图片或封面的失败只会体现在结果中
    pub fn parse_with_options(&mut self, options: &ParseOptions) -> Result<ExtractedBook> {
        let rootfile = self.rootfile_path()?;
        let (version, package) = self.load_package(&rootfile)?;
        let root_dir = parent_dir(&rootfile);

        let index = package.manifest.index(root_dir);
        let source = version.toc_source(&package.manifest, &package.spine, root_dir)?;
        tracing::debug!(toc = %source.path(), "选定目录来源");
        let toc = source.resolve(&mut self.archive)?;

        let renderer = ContentRenderer::new(&index, &toc, options);
        let outcomes = renderer.render_spine(&mut self.archive, &package.spine);

        let cover = Cover::resolve(&mut self.archive, &package.manifest, &index, &options.cover_marker);
        if cover.is_none() {
            tracing::debug!("未找到封面");
        }

        let book = ExtractedBook::assemble(version, rootfile, package.metadata, outcomes, cover);
        tracing::info!(
            version = %book.version,
            sections = book.result.texts().len(),
            skipped = book.skipped.len(),
            "EPUB解析完成"
        );
        Ok(book)
    }
}

//! 版本分派模块
//!
//! 只预读OPF根元素的version属性来确定EPUB版本，之后所有与版本相关的差异
//! (OPF元数据写法、目录来源)都通过 [`EpubVersion`] 的方法完成，不再到处判断版本号。

use crate::epub::archive::resolve_href;
use crate::epub::error::{EpubError, Result};
use crate::epub::opf::{self, Manifest, ManifestItem, Package, Spine};
use crate::epub::toc::TocSource;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Serialize;
use std::fmt;

/// 支持的EPUB版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EpubVersion {
    /// 2.x，NCX目录
    V2,
    /// 3.x，导航文档目录
    V3,
}

impl EpubVersion {
    /// 从OPF文件内容中检测版本
    ///
    /// 只读取第一个元素(即package根元素)的version属性，按小数解释：
    /// `[2.0, 3.0)` 为EPUB2，`[3.0, 4.0)` 为EPUB3。
    ///
    /// # 返回值
    /// * `Result<EpubVersion>` - 其余取值(包括缺失和无法解析)返回 `UnsupportedVersion`
    pub fn detect(opf_content: &str) -> Result<Self> {
        let version = Self::read_version_attr(opf_content).map_err(|e| match e {
            EpubError::XmlError(xml_err) => EpubError::MalformedPackage(xml_err.to_string()),
            other => other,
        })?;
        Self::from_version_str(&version)
    }

    /// 按版本字符串选择版本
    pub fn from_version_str(version: &str) -> Result<Self> {
        let number: f64 = version
            .trim()
            .parse()
            .map_err(|_| EpubError::UnsupportedVersion(version.to_string()))?;

        if (2.0..3.0).contains(&number) {
            Ok(EpubVersion::V2)
        } else if (3.0..4.0).contains(&number) {
            Ok(EpubVersion::V3)
        } else {
            Err(EpubError::UnsupportedVersion(version.to_string()))
        }
    }

    fn read_version_attr(opf_content: &str) -> Result<String> {
        let mut reader = Reader::from_str(opf_content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    for attr_result in e.attributes() {
                        let attr = attr_result
                            .map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
                        if attr.key.local_name().as_ref() == b"version" {
                            return Ok(String::from_utf8_lossy(&attr.value).to_string());
                        }
                    }
                    return Ok(String::new());
                }
                Event::Eof => {
                    return Err(EpubError::MalformedPackage("OPF文件中没有任何元素".to_string()));
                }
                _ => {}
            }
            buf.clear();
        }
    }

    /// 使用对应版本的解析器解析OPF文件
    pub fn parse_package(&self, opf_content: &str) -> Result<Package> {
        match self {
            EpubVersion::V2 => opf::v2::parse_package(opf_content),
            EpubVersion::V3 => opf::v3::parse_package(opf_content),
        }
    }

    /// 选择目录来源
    ///
    /// EPUB2使用spine的toc属性指向的NCX，否则使用第一个NCX。
    /// EPUB3优先使用导航文档，其次是href中带 `toc` 的非NCX文件，都没有时退回NCX。
    ///
    /// # 参数
    /// * `manifest` - 清单
    /// * `spine` - 脊柱
    /// * `root_dir` - OPF文件所在目录
    pub fn toc_source(&self, manifest: &Manifest, spine: &Spine, root_dir: &str) -> Result<TocSource> {
        let legacy = spine
            .toc
            .as_deref()
            .and_then(|id| manifest.get(id))
            .filter(|item| item.is_ncx())
            .or_else(|| manifest.iter().find(|item| item.is_ncx()));

        let source = match self {
            EpubVersion::V2 => legacy.map(|item| (item, false)),
            EpubVersion::V3 => manifest
                .iter()
                .find(|item| !item.is_ncx() && item.is_nav())
                .or_else(|| manifest.iter().find(|item| !item.is_ncx() && item.href.contains("toc")))
                .map(|item| (item, true))
                .or_else(|| legacy.map(|item| (item, false))),
        };

        let Some((item, is_nav_doc)) = source else {
            return Err(EpubError::toc("", "清单中没有可用的目录文件"));
        };
        Self::locate(item, is_nav_doc, root_dir)
    }

    fn locate(item: &ManifestItem, is_nav_doc: bool, root_dir: &str) -> Result<TocSource> {
        let path = resolve_href(root_dir, &item.href).map_err(|e| EpubError::toc(&item.href, e))?;
        Ok(if is_nav_doc {
            TocSource::NavDocument(path)
        } else {
            TocSource::Ncx(path)
        })
    }
}

impl fmt::Display for EpubVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpubVersion::V2 => write!(f, "EPUB 2"),
            EpubVersion::V3 => write!(f, "EPUB 3"),
        }
    }
}

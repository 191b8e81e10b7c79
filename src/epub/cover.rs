//! 封面解析模块

use crate::epub::archive::EpubArchive;
use crate::epub::opf::{Manifest, ManifestIndex};
use serde::Serialize;
use std::io::{Read, Seek};
use std::path::Path;

/// 封面图片
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cover {
    /// 文件名(不含目录)
    pub filename: String,
    /// 小写扩展名，不含点号
    pub extension: String,
    /// 清单中记录的媒体类型
    pub media_type: String,
    /// 在归档中的完整路径
    pub path: String,
    /// 图片数据
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Cover {
    /// 查找并读取封面
    ///
    /// 取清单中第一个id包含 `marker` 的项。找不到或读取失败都返回None，不视为错误。
    pub fn resolve<R: Read + Seek>(
        archive: &mut EpubArchive<R>,
        manifest: &Manifest,
        index: &ManifestIndex<'_>,
        marker: &str,
    ) -> Option<Cover> {
        if marker.is_empty() {
            return None;
        }

        let Some(item) = manifest.iter().find(|item| item.id.contains(marker)) else {
            tracing::debug!("清单中没有封面项");
            return None;
        };
        let path = index.path_of(&item.id)?;

        let data = match archive.read(path) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(%path, error = %e, "封面读取失败");
                return None;
            }
        };

        let file_path = Path::new(path);
        Some(Cover {
            filename: file_path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
            extension: file_path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .unwrap_or_default(),
            media_type: item.media_type.clone(),
            path: path.to_string(),
            data,
        })
    }

    /// 数据大小(字节)
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::fixtures::build_archive;
    use crate::epub::opf::ManifestItem;

    fn manifest(items: &[(&str, &str, &str)]) -> Manifest {
        let mut manifest = Manifest::new();
        for (id, href, media_type) in items {
            manifest.push(ManifestItem::new(id.to_string(), href.to_string(), media_type.to_string()));
        }
        manifest
    }

    #[test]
    fn test_first_cover_like_item_wins() {
        let manifest = manifest(&[
            ("chapter", "ch.xhtml", "application/xhtml+xml"),
            ("item-cover", "images/Cover.JPG", "image/jpeg"),
            ("coverpage", "cover.xhtml", "application/xhtml+xml"),
        ]);
        let index = manifest.index("OEBPS");
        let bytes = build_archive(&[
            ("OEBPS/images/Cover.JPG", b"jpeg-bytes".as_slice()),
            ("OEBPS/cover.xhtml", b"<html/>".as_slice()),
        ]);
        let mut archive = EpubArchive::from_bytes(bytes).unwrap();

        let cover = Cover::resolve(&mut archive, &manifest, &index, "cover").unwrap();
        assert_eq!(cover.filename, "Cover.JPG");
        assert_eq!(cover.extension, "jpg");
        assert_eq!(cover.media_type, "image/jpeg");
        assert_eq!(cover.path, "OEBPS/images/Cover.JPG");
        assert_eq!(cover.data, b"jpeg-bytes");
        assert_eq!(cover.size(), 10);
    }

    #[test]
    fn test_missing_cover_is_none() {
        let unreadable = manifest(&[
            ("chapter", "ch.xhtml", "application/xhtml+xml"),
            ("cover", "missing.jpg", "image/jpeg"),
        ]);
        let index = unreadable.index("");
        let mut archive = EpubArchive::from_bytes(build_archive(&[])).unwrap();

        assert!(Cover::resolve(&mut archive, &unreadable, &index, "cover").is_none());

        let no_cover = manifest(&[("chapter", "ch.xhtml", "application/xhtml+xml")]);
        let index = no_cover.index("");
        assert!(Cover::resolve(&mut archive, &no_cover, &index, "cover").is_none());
    }
}

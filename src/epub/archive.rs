//! 归档访问模块
//!
//! 对EPUB(zip)容器中条目的安全随机读取。所有条目名在查找前都会先做路径规范化，
//! 越出归档根目录的路径直接被拒绝，不会发生任何读取。

use crate::epub::error::{EpubError, Result};
use encoding_rs::{Encoding, WINDOWS_1252};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

/// EPUB归档的只读访问器
pub struct EpubArchive<R: Read + Seek = File> {
    zip: ZipArchive<R>,
}

impl EpubArchive<File> {
    /// 从文件路径打开EPUB归档
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<EpubArchive>` - 文件不存在时返回 `FileNotFound`，不是zip时返回 `Zip`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EpubError::FileNotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl EpubArchive<Cursor<Vec<u8>>> {
    /// 从内存中的字节创建归档
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> EpubArchive<R> {
    /// 从任意可随机读取的数据源创建归档
    pub fn from_reader(reader: R) -> Result<Self> {
        let zip = ZipArchive::new(reader)?;
        Ok(Self { zip })
    }

    /// 读取指定条目的全部字节
    ///
    /// 路径先经过 [`normalize_path`]，越界路径返回 `InvalidPath`，
    /// 规范化后找不到完全同名的条目返回 `EntryNotFound`。
    pub fn read(&mut self, path: &str) -> Result<Vec<u8>> {
        let name = normalize_path(path)?;
        if name.is_empty() {
            return Err(EpubError::EntryNotFound(path.to_string()));
        }

        let mut file = match self.zip.by_name(&name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(EpubError::EntryNotFound(name)),
            Err(e) => return Err(e.into()),
        };

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// 列出归档中的所有条目名
    pub fn file_names(&self) -> Vec<String> {
        self.zip.file_names().map(str::to_string).collect()
    }
}

/// 对归档内路径做词法规范化
///
/// 去掉空段和 `.`，`..` 回退一级。结果以 `..` 开头(即越出根目录)或者是绝对路径时
/// 返回 `InvalidPath`。反斜杠按分隔符处理。
pub fn normalize_path(path: &str) -> Result<String> {
    let unified = path.replace('\\', "/");
    if unified.starts_with('/') || has_drive_prefix(&unified) {
        return Err(EpubError::InvalidPath(path.to_string()));
    }

    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(EpubError::InvalidPath(path.to_string()));
                }
            }
            _ => parts.push(segment),
        }
    }

    Ok(parts.join("/"))
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// 获取路径所在目录，根目录下的文件返回空字符串
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// 拼接目录与相对路径(不做规范化)
pub fn join_path(dir: &str, href: &str) -> String {
    if dir.is_empty() {
        href.to_string()
    } else {
        format!("{}/{}", dir, href)
    }
}

/// 去掉href中的 `#片段`
pub fn strip_fragment(href: &str) -> &str {
    href.split_once('#').map_or(href, |(path, _)| path)
}

/// 将相对于 `base_dir` 的href解析为归档内的完整路径
///
/// 依次去掉片段、做百分号解码、与目录拼接并规范化。manifest、目录和图片引用
/// 都走这一个函数，保证三者得到的键可以直接比较。
pub fn resolve_href(base_dir: &str, href: &str) -> Result<String> {
    let href = strip_fragment(href);
    let decoded = percent_decode_str(href)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(href));
    normalize_path(&join_path(base_dir, &decoded))
}

/// 将条目字节解码为UTF-8文本，去掉可能存在的BOM
pub fn decode_utf8(bytes: &[u8]) -> Option<&str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes).ok()
}

/// 宽松地解码内容文档，总能得到文本
///
/// 有BOM时按BOM(包括UTF-16)解码；没有BOM时先按UTF-8，失败再依次尝试
/// XML声明中的encoding和Windows-1252。
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return text;
    }

    if let Some(encoding) = declared_encoding(bytes).and_then(Encoding::for_label) {
        let (text, _, _) = encoding.decode(bytes);
        return text;
    }

    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text
}

/// 读取 `<?xml ... encoding="..."?>` 中声明的编码名
fn declared_encoding(bytes: &[u8]) -> Option<&[u8]> {
    let head = &bytes[..bytes.len().min(256)];
    if !head.starts_with(b"<?xml") {
        return None;
    }
    let decl = &head[..head.windows(2).position(|w| w == b"?>")?];
    let start = decl.windows(9).position(|w| w == b"encoding=")? + 9;
    let quote = *decl.get(start)?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let value = &decl[start + 1..];
    let end = value.iter().position(|&b| b == quote)?;
    Some(&value[..end])
}

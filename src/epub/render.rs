//! 正文渲染模块
//!
//! 按脊柱顺序把每个内容文档的body重新序列化成自包含的HTML：丢弃非内容标签，
//! 图片内联为data URI，并在目录没有标题时从正文推导一个备用标题。
//!
//! 单个章节或图片的失败不会中断整本书的解析，而是以 [`SectionOutcome::Skipped`]
//! 或不带src的 `<img>` 体现。

use crate::epub::archive::{EpubArchive, decode_text, parent_dir, resolve_href};
use crate::epub::book::Content;
use crate::epub::config::ParseOptions;
use crate::epub::opf::{ManifestIndex, Spine};
use crate::epub::toc::TocMap;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::io::{Read, Seek};

/// 脊柱项被跳过的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// idref在清单中不存在(或其路径非法)
    NotInManifest,
    /// 封面项
    CoverEntry,
    /// 内容文件无法从归档读取
    Unreadable,
}

/// 单个脊柱项的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum SectionOutcome {
    Rendered(Content),
    Skipped { idref: String, reason: SkipReason },
}

/// 显式遍历栈中的一步
enum Step<'d, N> {
    Visit(N),
    Close(&'d str),
}

/// 正文渲染器
///
/// 只持有构建完成的只读索引，渲染期间不修改任何共享状态。
pub struct ContentRenderer<'a> {
    index: &'a ManifestIndex<'a>,
    toc: &'a TocMap,
    options: &'a ParseOptions,
}

impl<'a> ContentRenderer<'a> {
    pub fn new(index: &'a ManifestIndex<'a>, toc: &'a TocMap, options: &'a ParseOptions) -> Self {
        Self { index, toc, options }
    }

    /// 按脊柱顺序渲染全部章节，输出与脊柱项一一对应
    pub fn render_spine<R: Read + Seek>(&self, archive: &mut EpubArchive<R>, spine: &Spine) -> Vec<SectionOutcome> {
        spine
            .iter()
            .map(|itemref| self.render_item(archive, &itemref.idref))
            .collect()
    }

    /// 渲染单个脊柱项
    pub fn render_item<R: Read + Seek>(&self, archive: &mut EpubArchive<R>, idref: &str) -> SectionOutcome {
        let skipped = |reason: SkipReason| {
            tracing::debug!(%idref, ?reason, "跳过脊柱项");
            SectionOutcome::Skipped {
                idref: idref.to_string(),
                reason,
            }
        };

        if self.options.is_cover_id(idref) {
            return skipped(SkipReason::CoverEntry);
        }
        let Some(path) = self.index.path_of(idref) else {
            return skipped(SkipReason::NotInManifest);
        };
        let bytes = match archive.read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(%path, error = %e, "内容文件读取失败");
                return skipped(SkipReason::Unreadable);
            }
        };
        let text = decode_text(&bytes);

        SectionOutcome::Rendered(self.render_document(archive, &text, path))
    }

    /// 渲染一个内容文档
    ///
    /// # 参数
    /// * `archive` - 用于读取图片
    /// * `content` - 文档文本
    /// * `doc_path` - 文档在归档中的完整路径，图片路径相对于它的目录解析
    pub fn render_document<R: Read + Seek>(
        &self,
        archive: &mut EpubArchive<R>,
        content: &str,
        doc_path: &str,
    ) -> Content {
        let document = Html::parse_document(content);
        let body = document
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name().eq_ignore_ascii_case("body"));

        let mut html = String::new();
        let mut fallback_title = None;
        match body {
            Some(body) => {
                fallback_title = self.write_body(archive, body, parent_dir(doc_path), &mut html);
            }
            None => tracing::debug!(%doc_path, "内容文档没有body元素"),
        }
        html.push_str(&self.options.section_separator);

        let title = match self.toc.get(doc_path) {
            Some(title) => title.to_string(),
            None => fallback_title.unwrap_or_default(),
        };

        Content { html, title }
    }

    /// 深度优先序列化body的子节点，返回第一个非空文本节点(截断后)作为备用标题
    ///
    /// 文本节点按解码后的原文写出，不做转义，`&lt;script&gt;` 会还原成标签文本；
    /// 属性名同样原样写出，只有属性值经过 [`escape_attribute`]。
    fn write_body<R: Read + Seek>(
        &self,
        archive: &mut EpubArchive<R>,
        body: ElementRef<'_>,
        doc_dir: &str,
        out: &mut String,
    ) -> Option<String> {
        let mut fallback_title = None;
        let mut stack: Vec<Step<'_, _>> = body.children().rev().map(Step::Visit).collect();

        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Close(name) => {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                    continue;
                }
                Step::Visit(node) => node,
            };

            match node.value() {
                Node::Text(text) => {
                    out.push_str(text);
                    if fallback_title.is_none() && !text.trim().is_empty() {
                        fallback_title = Some(
                            text.trim()
                                .chars()
                                .take(self.options.title_max_chars)
                                .collect(),
                        );
                    }
                }
                Node::Element(element) => {
                    let name = element.name();
                    if self.options.is_stripped(name) {
                        continue;
                    }

                    let is_img = name.eq_ignore_ascii_case("img");
                    out.push('<');
                    out.push_str(name);
                    write_attributes(element, is_img, out);
                    if is_img {
                        if let Some(src) = self.image_src(archive, element, doc_dir) {
                            out.push_str(" src=\"");
                            out.push_str(&escape_attribute(&src));
                            out.push('"');
                        }
                    }

                    if is_img && !node.has_children() {
                        out.push_str(" />");
                        continue;
                    }
                    out.push('>');
                    stack.push(Step::Close(name));
                    stack.extend(node.children().rev().map(Step::Visit));
                }
                // 注释、文档类型等节点不输出
                _ => {}
            }
        }

        fallback_title
    }

    /// 计算图片的替换src；任何一步失败都返回None，图片保留但不带src
    fn image_src<R: Read + Seek>(
        &self,
        archive: &mut EpubArchive<R>,
        element: &Element,
        doc_dir: &str,
    ) -> Option<String> {
        let src = element.attr("src")?.trim();
        if src.is_empty() {
            return None;
        }
        if src.starts_with("data:") {
            return Some(src.to_string());
        }
        if !self.options.inline_images {
            return None;
        }

        let path = resolve_href(doc_dir, src)
            .inspect_err(|e| tracing::debug!(%src, error = %e, "图片路径非法"))
            .ok()?;
        let bytes = archive
            .read(&path)
            .inspect_err(|e| tracing::debug!(%path, error = %e, "图片读取失败"))
            .ok()?;
        let Some(item) = self.index.item_at(&path) else {
            tracing::debug!(%path, "图片不在清单中");
            return None;
        };

        Some(format!("data:{};base64,{}", item.media_type, STANDARD.encode(bytes)))
    }
}

/// 输出元素属性：丢弃class，img的src由调用方单独处理；按属性名排序保证输出稳定
fn write_attributes(element: &Element, is_img: bool, out: &mut String) {
    let mut attributes: Vec<(&str, &str)> = element
        .attrs()
        .filter(|(name, _)| !name.eq_ignore_ascii_case("class"))
        .filter(|(name, _)| !(is_img && name.eq_ignore_ascii_case("src")))
        .collect();
    attributes.sort_by(|a, b| a.0.cmp(b.0));

    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
}

/// 转义属性值中的 `& < > " '`
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

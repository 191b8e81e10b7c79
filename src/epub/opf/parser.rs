//! OPF解析器模块
//!
//! 提供OPF（Open Packaging Format）文件的XML扫描功能。这里只负责把XML事件
//! 收集成与版本无关的原始结构，元数据的语义解释由 `v2` / `v3` 两个模块完成。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::manifest::{Manifest, ManifestItem};
use crate::epub::opf::spine::{Spine, SpineItemRef};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;

/// 需要收集的Dublin Core元素(本地名)
const DUBLIN_CORE_ELEMENTS: &[&str] = &[
    "identifier",
    "title",
    "language",
    "creator",
    "contributor",
    "publisher",
    "subject",
    "description",
    "date",
    "rights",
];

/// 一个Dublin Core元素，属性以本地名为键(`opf:role` → `role`，`xml:lang` → `lang`)
#[derive(Debug, Clone, Default)]
pub(crate) struct DcElement {
    pub name: String,
    pub text: String,
    pub attributes: HashMap<String, String>,
}

impl DcElement {
    /// 获取非空的属性值
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn attr_owned(&self, key: &str) -> Option<String> {
        self.attr(key).map(str::to_string)
    }
}

/// 一个meta元素
#[derive(Debug, Clone, Default)]
pub(crate) struct MetaElement {
    pub name: String,
    pub content: String,
    pub property: String,
    /// 被精化的元素ID（不包含#前缀）
    pub refines: String,
    pub scheme: String,
    pub id: String,
    pub text: String,
}

impl MetaElement {
    /// 元素值：EPUB3写在文本里，EPUB2写在content属性里
    pub fn value(&self) -> &str {
        if self.text.is_empty() {
            &self.content
        } else {
            &self.text
        }
    }
}

/// 扫描得到的原始包结构
#[derive(Debug, Clone, Default)]
pub(crate) struct RawPackage {
    pub version: String,
    pub unique_identifier: Option<String>,
    pub dublin_core: Vec<DcElement>,
    pub metas: Vec<MetaElement>,
    pub manifest: Manifest,
    pub spine: Spine,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    None,
    Metadata,
    Manifest,
    Spine,
}

impl RawPackage {
    /// 扫描OPF文件内容
    ///
    /// # 参数
    /// * `xml_content` - OPF文件的XML内容
    ///
    /// # 返回值
    /// * `Result<RawPackage, EpubError>` - XML无法解析时返回 `MalformedPackage`
    pub fn parse(xml_content: &str) -> Result<RawPackage> {
        Self::scan(xml_content).map_err(|e| match e {
            EpubError::XmlError(xml_err) => EpubError::MalformedPackage(xml_err.to_string()),
            other => other,
        })
    }

    fn scan(xml_content: &str) -> Result<RawPackage> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);
        reader.config_mut().expand_empty_elements = true;

        let mut package = RawPackage::default();
        let mut buf = Vec::new();
        let mut section = Section::None;
        let mut current_dc: Option<DcElement> = None;
        let mut current_meta: Option<MetaElement> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match (section, local_name.as_ref()) {
                        (_, "package") => {
                            let attributes = collect_attributes(e)?;
                            package.version = attributes.get("version").cloned().unwrap_or_default();
                            package.unique_identifier = attributes
                                .get("unique-identifier")
                                .filter(|value| !value.is_empty())
                                .cloned();
                        }
                        (Section::None, "metadata") => section = Section::Metadata,
                        (Section::None, "manifest") => section = Section::Manifest,
                        (Section::None, "spine") => {
                            section = Section::Spine;
                            package.spine.toc = collect_attributes(e)?
                                .remove("toc")
                                .filter(|toc| !toc.is_empty());
                        }
                        (Section::Manifest, "item") => {
                            Self::parse_manifest_item(e, &mut package.manifest)?;
                        }
                        (Section::Spine, "itemref") => {
                            Self::parse_spine_item(e, &mut package.spine)?;
                        }
                        (Section::Metadata, "meta") => {
                            current_meta = Some(Self::parse_meta(e)?);
                        }
                        (Section::Metadata, name)
                            if current_dc.is_none() && DUBLIN_CORE_ELEMENTS.contains(&name) =>
                        {
                            current_dc = Some(DcElement {
                                name: name.to_string(),
                                text: String::new(),
                                attributes: collect_attributes(e)?,
                            });
                        }
                        _ => {}
                    }
                }
                Event::End(ref e) => {
                    let local_name_bytes = e.local_name();
                    let local_name = String::from_utf8_lossy(local_name_bytes.as_ref());

                    match local_name.as_ref() {
                        "metadata" | "manifest" | "spine" => section = Section::None,
                        "meta" => {
                            if let Some(mut meta) = current_meta.take() {
                                meta.text = meta.text.trim().to_string();
                                package.metas.push(meta);
                            }
                        }
                        name if current_dc.as_ref().is_some_and(|dc| dc.name == name) => {
                            if let Some(mut dc) = current_dc.take() {
                                dc.text = dc.text.trim().to_string();
                                package.dublin_core.push(dc);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    Self::append_text(&mut current_dc, &mut current_meta, &text);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    Self::append_text(&mut current_dc, &mut current_meta, &text);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(package)
    }

    fn append_text(current_dc: &mut Option<DcElement>, current_meta: &mut Option<MetaElement>, text: &str) {
        if let Some(meta) = current_meta.as_mut() {
            meta.text.push_str(text);
        } else if let Some(dc) = current_dc.as_mut() {
            dc.text.push_str(text);
        }
    }

    /// 解析清单项，缺少id或href的项被忽略
    fn parse_manifest_item(e: &BytesStart, manifest: &mut Manifest) -> Result<()> {
        let mut attributes = collect_attributes(e)?;

        let id = attributes.remove("id").unwrap_or_default();
        let href = attributes.remove("href").unwrap_or_default();
        if id.is_empty() || href.is_empty() {
            tracing::debug!(%id, %href, "清单项缺少id或href，已忽略");
            return Ok(());
        }

        let item = ManifestItem {
            id,
            href,
            media_type: attributes.remove("media-type").unwrap_or_default(),
            properties: attributes.remove("properties").unwrap_or_default(),
            fallback: attributes.remove("fallback").filter(|fallback| !fallback.is_empty()),
        };

        if !manifest.push(item) {
            tracing::debug!("清单中存在重复id，保留第一个");
        }
        Ok(())
    }

    /// 解析脊柱项
    fn parse_spine_item(e: &BytesStart, spine: &mut Spine) -> Result<()> {
        let mut attributes = collect_attributes(e)?;

        let idref = attributes.remove("idref").unwrap_or_default();
        if idref.is_empty() {
            return Ok(());
        }
        let linear = attributes.get("linear").is_none_or(|linear| linear != "no");

        spine.itemrefs.push(SpineItemRef::with_linear(idref, linear));
        Ok(())
    }

    fn parse_meta(e: &BytesStart) -> Result<MetaElement> {
        let mut attributes = collect_attributes(e)?;
        let mut take = |key: &str| attributes.remove(key).unwrap_or_default();

        let refines = take("refines");
        Ok(MetaElement {
            name: take("name"),
            content: take("content"),
            property: take("property"),
            // 移除开头的#号（如果存在）
            refines: refines.strip_prefix('#').unwrap_or(&refines).to_string(),
            scheme: take("scheme"),
            id: take("id"),
            text: String::new(),
        })
    }

    /// 检查必需的identifier元素组
    pub fn require_identifiers(&self) -> Result<()> {
        if self.elements("identifier").next().is_none() {
            return Err(EpubError::MissingMetadata("dc:identifier".to_string()));
        }
        Ok(())
    }

    /// 按文档顺序遍历指定名称的Dublin Core元素
    pub fn elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DcElement> + 'a {
        self.dublin_core.iter().filter(move |dc| dc.name == name)
    }

    /// 按文档顺序收集指定元素的非空文本
    pub fn texts(&self, name: &str) -> Vec<String> {
        self.elements(name)
            .map(|dc| dc.text.clone())
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// 第一个 `<meta name="cover">` 的content，没有时为空
    pub fn cover_id(&self) -> String {
        self.metas
            .iter()
            .find(|meta| meta.name == "cover" && !meta.content.is_empty())
            .map(|meta| meta.content.clone())
            .unwrap_or_default()
    }
}

/// 以本地名为键收集元素的全部属性
fn collect_attributes(e: &BytesStart) -> Result<HashMap<String, String>> {
    let mut attributes = HashMap::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        attributes.entry(key).or_insert_with(|| attribute_value(&attr));
    }
    Ok(attributes)
}

/// 获取属性值，实体无法展开时按原文保留
pub(crate) fn attribute_value(attr: &Attribute) -> String {
    attr.unescape_value()
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string())
}

//! EPUB3 包文件解析
//!
//! EPUB3 不再使用 `opf:` 属性，附加信息写在独立的 `<meta refines="#id">` 元素里。
//! 解析前先把这些精化元素索引成 id → property → meta，再逐个解析Dublin Core元素。

use crate::epub::error::Result;
use crate::epub::opf::Package;
use crate::epub::opf::metadata::{Creator, DateEntry, Identifier, Metadata, Title};
use crate::epub::opf::parser::{DcElement, MetaElement, RawPackage};
use crate::epub::opf::relator;
use std::collections::HashMap;

const MARC_RELATORS_SCHEME: &str = "marc:relators";

/// 精化元数据索引：被精化元素id → property → meta
struct RefinementIndex<'a> {
    by_id: HashMap<&'a str, HashMap<&'a str, &'a MetaElement>>,
}

impl<'a> RefinementIndex<'a> {
    /// 同一(id, property)出现多次时保留第一个
    fn build(metas: &'a [MetaElement]) -> Self {
        let mut by_id: HashMap<&str, HashMap<&str, &MetaElement>> = HashMap::new();
        for meta in metas {
            if meta.refines.is_empty() || meta.property.is_empty() {
                continue;
            }
            by_id
                .entry(meta.refines.as_str())
                .or_default()
                .entry(meta.property.as_str())
                .or_insert(meta);
        }
        Self { by_id }
    }

    fn get(&self, id: Option<&str>, property: &str) -> Option<&'a MetaElement> {
        let properties = self.by_id.get(id?)?;
        properties.get(property).copied()
    }

    fn value(&self, id: Option<&str>, property: &str) -> Option<String> {
        self.get(id, property)
            .map(|meta| meta.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

/// 解析EPUB3的OPF文件
///
/// # 参数
/// * `xml_content` - OPF文件的XML内容
///
/// # 返回值
/// * `Result<Package, EpubError>` - XML错误返回 `MalformedPackage`，没有identifier返回 `MissingMetadata`
pub fn parse_package(xml_content: &str) -> Result<Package> {
    let raw = RawPackage::parse(xml_content)?;
    raw.require_identifiers()?;

    let refinements = RefinementIndex::build(&raw.metas);

    let metadata = Metadata {
        identifiers: raw.elements("identifier").filter_map(split_identifier).collect(),
        titles: raw
            .elements("title")
            .filter(|dc| !dc.text.is_empty())
            .map(|dc| {
                let id = dc.attr("id");
                Title {
                    text: dc.text.clone(),
                    lang: dc.attr_owned("lang"),
                    id: id.map(str::to_string),
                    file_as: refinements.value(id, "file-as"),
                    title_type: refinements.value(id, "title-type"),
                }
            })
            .collect(),
        languages: raw.texts("language"),
        creators: raw
            .elements("creator")
            .filter_map(|dc| creator_from(dc, &refinements))
            .collect(),
        contributors: raw
            .elements("contributor")
            .filter_map(|dc| creator_from(dc, &refinements))
            .collect(),
        publishers: raw.texts("publisher"),
        subjects: raw.texts("subject"),
        descriptions: raw.texts("description"),
        dates: raw
            .elements("date")
            .filter(|dc| !dc.text.is_empty())
            .map(|dc| DateEntry {
                text: dc.text.clone(),
                event: None,
            })
            .collect(),
        rights: raw.texts("rights"),
        cover_id: raw.cover_id(),
        unique_identifier: raw.unique_identifier.clone(),
    };

    Ok(Package {
        version: raw.version,
        metadata,
        manifest: raw.manifest,
        spine: raw.spine,
    })
}

/// 标识符文本形如 `scheme:value`，在第一个冒号处拆开；不是这种形状的直接丢弃
fn split_identifier(dc: &DcElement) -> Option<Identifier> {
    let Some((scheme, value)) = dc.text.split_once(':') else {
        tracing::debug!(identifier = %dc.text, "标识符不是scheme:value形式，已忽略");
        return None;
    };

    let (scheme, value) = (scheme.trim(), value.trim());
    if scheme.is_empty() || value.is_empty() {
        tracing::debug!(identifier = %dc.text, "标识符缺少scheme或value，已忽略");
        return None;
    }

    Some(Identifier {
        value: value.to_string(),
        scheme: Some(scheme.to_string()),
        id: dc.attr_owned("id"),
    })
}

/// 角色来自 `property="role"` 的精化元素，只有声明了marc:relators才查表
fn creator_from(dc: &DcElement, refinements: &RefinementIndex) -> Option<Creator> {
    if dc.text.is_empty() {
        return None;
    }

    let id = dc.attr("id");
    let role_meta = refinements.get(id, "role");
    let raw_role = role_meta.map(|meta| meta.value().to_string()).unwrap_or_default();
    let role = match role_meta {
        None => String::new(),
        Some(meta) if meta.scheme == MARC_RELATORS_SCHEME => relator::resolve(&raw_role),
        Some(_) => relator::UNKNOWN_ROLE.to_string(),
    };

    Some(Creator {
        name: dc.text.clone(),
        file_as: refinements
            .value(id, "file-as")
            .or_else(|| dc.attr_owned("file-as")),
        language: dc.attr_owned("lang"),
        raw_role,
        role,
        id: id.map(str::to_string),
    })
}

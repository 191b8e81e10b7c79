//! EPUB2 包文件解析
//!
//! EPUB2 把附加信息直接写在Dublin Core元素的 `opf:` 属性上：
//! 标识符类型在 `opf:scheme`，角色代码在 `opf:role`，排序名在 `opf:file-as`。

use crate::epub::error::Result;
use crate::epub::opf::Package;
use crate::epub::opf::metadata::{Creator, DateEntry, Identifier, Metadata, Title};
use crate::epub::opf::parser::{DcElement, RawPackage};
use crate::epub::opf::relator;

/// 解析EPUB2的OPF文件
///
/// # 参数
/// * `xml_content` - OPF文件的XML内容
///
/// # 返回值
/// * `Result<Package, EpubError>` - XML错误返回 `MalformedPackage`，没有identifier返回 `MissingMetadata`
pub fn parse_package(xml_content: &str) -> Result<Package> {
    let raw = RawPackage::parse(xml_content)?;
    raw.require_identifiers()?;

    let metadata = Metadata {
        identifiers: raw
            .elements("identifier")
            .filter(|dc| !dc.text.is_empty())
            .map(|dc| Identifier {
                value: dc.text.clone(),
                scheme: dc.attr_owned("scheme"),
                id: dc.attr_owned("id"),
            })
            .collect(),
        titles: raw
            .elements("title")
            .filter(|dc| !dc.text.is_empty())
            .map(|dc| Title {
                text: dc.text.clone(),
                lang: dc.attr_owned("lang"),
                id: dc.attr_owned("id"),
                file_as: dc.attr_owned("file-as"),
                title_type: None,
            })
            .collect(),
        languages: raw.texts("language"),
        creators: raw.elements("creator").filter_map(creator_from).collect(),
        contributors: raw.elements("contributor").filter_map(creator_from).collect(),
        publishers: raw.texts("publisher"),
        subjects: raw.texts("subject"),
        descriptions: raw.texts("description"),
        dates: raw
            .elements("date")
            .filter(|dc| !dc.text.is_empty())
            .map(|dc| DateEntry {
                text: dc.text.clone(),
                event: dc.attr_owned("event"),
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

/// 角色直接取自元素上的role属性：未声明为空，无法识别为 `unknown`
fn creator_from(dc: &DcElement) -> Option<Creator> {
    if dc.text.is_empty() {
        return None;
    }

    let raw_role = dc.attr("role").unwrap_or_default().to_string();
    Some(Creator {
        name: dc.text.clone(),
        file_as: dc.attr_owned("file-as"),
        language: dc.attr_owned("lang"),
        role: relator::resolve(&raw_role),
        raw_role,
        id: dc.attr_owned("id"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::error::EpubError;

    const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:rights>Public domain in the USA.</dc:rights>
    <dc:identifier id="id" opf:scheme="URI">http://www.gutenberg.org/43</dc:identifier>
    <dc:creator opf:file-as="Stevenson, Robert Louis" opf:role="aut">Robert Louis Stevenson</dc:creator>
    <dc:contributor opf:role="xyz">Mystery Helper</dc:contributor>
    <dc:contributor>Nameless Helper</dc:contributor>
    <dc:title>The Strange Case of Dr. Jekyll and Mr. Hyde</dc:title>
    <dc:language xsi:type="dcterms:RFC4646">en</dc:language>
    <dc:subject>Science fiction</dc:subject>
    <dc:date opf:event="publication">2008-06-27</dc:date>
    <meta name="cover" content="item1"/>
  </metadata>
  <manifest>
    <item href="pgepub.css" id="item2" media-type="text/css"/>
    <item href="toc.ncx" id="ncx" media-type="application/x-dtbncx+xml"/>
  </manifest>
  <spine toc="ncx"/>
</package>"#;

    #[test]
    fn test_parse_v2_metadata() {
        let package = parse_package(OPF).unwrap();
        let metadata = &package.metadata;

        assert_eq!(package.version, "2.0");
        assert_eq!(metadata.identifier(), Some("http://www.gutenberg.org/43"));
        assert_eq!(metadata.identifiers[0].scheme.as_deref(), Some("URI"));
        assert_eq!(metadata.main_id(), Some("http://www.gutenberg.org/43"));
        assert_eq!(metadata.title(), Some("The Strange Case of Dr. Jekyll and Mr. Hyde"));
        assert_eq!(metadata.language(), Some("en"));
        assert_eq!(metadata.subject(), Some("Science fiction"));
        assert_eq!(metadata.date(), Some("2008-06-27"));
        assert_eq!(metadata.dates[0].event.as_deref(), Some("publication"));
        assert_eq!(metadata.rights, vec!["Public domain in the USA."]);
        assert_eq!(metadata.publisher(), None);
        assert_eq!(metadata.cover_id(), Some("item1"));
    }

    #[test]
    fn test_v2_creator_roles() {
        let metadata = parse_package(OPF).unwrap().metadata;

        let author = metadata.creator().unwrap();
        assert_eq!(author.name, "Robert Louis Stevenson");
        assert_eq!(author.file_as.as_deref(), Some("Stevenson, Robert Louis"));
        assert_eq!(author.raw_role, "aut");
        assert_eq!(author.role, "author");

        assert_eq!(metadata.contributors[0].raw_role, "xyz");
        assert_eq!(metadata.contributors[0].role, "unknown");
        assert_eq!(metadata.contributors[1].raw_role, "");
        assert_eq!(metadata.contributors[1].role, "");
    }

    #[test]
    fn test_v2_requires_identifier() {
        let opf = r#"<package version="2.0"><metadata><dc:title>Untitled</dc:title></metadata><manifest/><spine/></package>"#;
        assert!(matches!(parse_package(opf), Err(EpubError::MissingMetadata(_))));
    }

    #[test]
    fn test_main_id_is_first_identifier() {
        let opf = r#"<package version="2.0" unique-identifier="uid" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
<metadata>
  <dc:identifier opf:scheme="ISBN" id="isbn">9780000000001</dc:identifier>
  <dc:identifier id="uid">urn:uuid:abc</dc:identifier>
</metadata>
<manifest/><spine/></package>"#;
        let metadata = parse_package(opf).unwrap().metadata;

        assert_eq!(metadata.main_id(), Some("9780000000001"));
        assert_eq!(metadata.identifier(), Some("9780000000001"));
        assert_eq!(metadata.package_identifier(), Some("urn:uuid:abc"));
    }
}

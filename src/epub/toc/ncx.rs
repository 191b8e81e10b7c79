//! NCX解析器模块
//!
//! 提供NCX（Navigation Control file for XML）文件的XML解析功能。

use crate::epub::error::{EpubError, Result};
use crate::epub::opf::attribute_value;
use crate::epub::toc::navigation::{NavMap, NavPoint};
use crate::epub::toc::TocMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// 解析NCX文件并展开为目录映射
///
/// # 参数
/// * `xml_content` - NCX文件的XML内容
/// * `base_dir` - NCX文件所在目录
///
/// # 返回值
/// * `Result<TocMap, EpubError>` - XML无法解析时返回错误
pub fn parse_ncx(xml_content: &str, base_dir: &str) -> Result<TocMap> {
    Ok(parse_nav_map(xml_content)?.to_toc_map(base_dir))
}

/// 解析NCX文件中的docTitle和navMap
///
/// navPoint的嵌套用显式栈维护：开始标签入栈，结束标签出栈并挂到新的栈顶(或作为顶层节点)。
pub fn parse_nav_map(xml_content: &str) -> Result<NavMap> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);
    reader.config_mut().expand_empty_elements = true;

    let mut nav_map = NavMap::new();
    let mut buf = Vec::new();
    let mut text_content = String::new();

    let mut in_nav_map = false;
    let mut in_doc_title = false;
    let mut in_label = false;
    let mut nav_point_stack: Vec<NavPoint> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                match e.local_name().as_ref() {
                    b"docTitle" => in_doc_title = true,
                    b"navMap" => in_nav_map = true,
                    b"navPoint" if in_nav_map => {
                        let id = attribute(e, b"id")?.unwrap_or_default();
                        nav_point_stack.push(NavPoint::new(id));
                    }
                    b"navLabel" if in_nav_map => in_label = true,
                    b"content" if in_nav_map => {
                        if let Some(current) = nav_point_stack.last_mut() {
                            if current.src.is_empty() {
                                current.src = attribute(e, b"src")?.unwrap_or_default();
                            }
                        }
                    }
                    _ => {}
                }
                text_content.clear();
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"docTitle" => in_doc_title = false,
                b"navMap" => in_nav_map = false,
                b"navLabel" => in_label = false,
                b"text" if in_doc_title => {
                    if nav_map.doc_title.is_none() {
                        nav_map.doc_title = Some(text_content.trim().to_string());
                    }
                }
                b"text" if in_label => {
                    if let Some(current) = nav_point_stack.last_mut() {
                        if current.label.is_empty() {
                            current.label = text_content.trim().to_string();
                        }
                    }
                }
                b"navPoint" if in_nav_map => {
                    if let Some(nav_point) = nav_point_stack.pop() {
                        match nav_point_stack.last_mut() {
                            Some(parent) => parent.add_child(nav_point),
                            None => nav_map.add_nav_point(nav_point),
                        }
                    }
                }
                _ => {}
            },
            Event::Text(e) => {
                text_content.push_str(&e.unescape()?);
            }
            Event::CData(e) => {
                text_content.push_str(&String::from_utf8_lossy(&e));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // 未闭合的navPoint按原有层级收尾
    while let Some(nav_point) = nav_point_stack.pop() {
        match nav_point_stack.last_mut() {
            Some(parent) => parent.add_child(nav_point),
            None => nav_map.add_nav_point(nav_point),
        }
    }

    Ok(nav_map)
}

/// 读取元素上指定本地名的属性
fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|err| EpubError::XmlError(quick_xml::Error::InvalidAttr(err)))?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attribute_value(&attr)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="id"/></head>
  <docTitle><text>Dr. Jekyll</text></docTitle>
  <navMap>
    <navPoint id="np-1" playOrder="1">
      <navLabel><text>Part &amp; Parcel</text></navLabel>
      <content src="part.xhtml#top"/>
      <navPoint id="np-2" playOrder="2">
        <navLabel><text>Nested</text></navLabel>
        <content src="nested.xhtml"/>
      </navPoint>
    </navPoint>
    <navPoint id="np-3" playOrder="3">
      <navLabel><text>Duplicate</text></navLabel>
      <content src="part.xhtml#later"/>
    </navPoint>
    <navPoint id="np-4" playOrder="4">
      <navLabel><text></text></navLabel>
      <content src="unlabeled.xhtml"/>
      <navPoint id="np-5" playOrder="5">
        <navLabel><text>Child Of Unlabeled</text></navLabel>
        <content src="child.xhtml"/>
      </navPoint>
    </navPoint>
  </navMap>
</ncx>"#;

    #[test]
    fn test_parse_nav_map_tree() {
        let nav_map = parse_nav_map(NCX).unwrap();

        assert_eq!(nav_map.doc_title.as_deref(), Some("Dr. Jekyll"));
        assert_eq!(nav_map.nav_points.len(), 3);
        let first = &nav_map.nav_points[0];
        assert_eq!(first.id, "np-1");
        assert_eq!(first.label, "Part & Parcel");
        assert_eq!(first.src, "part.xhtml#top");
        assert_eq!(first.children.len(), 1);
        assert_eq!(first.children[0].label, "Nested");
    }

    #[test]
    fn test_parse_ncx_first_wins() {
        let toc = parse_ncx(NCX, "OEBPS").unwrap();

        assert_eq!(toc.get("OEBPS/part.xhtml"), Some("Part & Parcel"));
        assert_eq!(toc.get("OEBPS/nested.xhtml"), Some("Nested"));
        assert_eq!(toc.get("OEBPS/unlabeled.xhtml"), None);
        assert_eq!(toc.get("OEBPS/child.xhtml"), Some("Child Of Unlabeled"));
        assert_eq!(toc.len(), 3);
    }

    #[test]
    fn test_broken_ncx_is_error() {
        assert!(parse_ncx("<ncx><navMap><navPoint></navMap></ncx>", "").is_err());
    }
}

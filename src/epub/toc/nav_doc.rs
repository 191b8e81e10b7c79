//! EPUB3导航文档解析

use crate::epub::archive::resolve_href;
use crate::epub::toc::TocMap;
use scraper::{ElementRef, Html};

/// 解析导航文档中的全部链接
///
/// 按文档顺序扫描所有 `<a>` 元素，标题为其全部后代文本拼接后去掉首尾空白。
/// href或标题为空的链接被忽略，同一路径只保留第一次出现的标题。
///
/// # 参数
/// * `content` - 导航文档的XHTML文本
/// * `base_dir` - 导航文档所在目录
pub fn parse_nav_document(content: &str, base_dir: &str) -> TocMap {
    let document = Html::parse_document(content);
    let mut toc = TocMap::new();

    let anchors = document
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name().eq_ignore_ascii_case("a"));

    for anchor in anchors {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        let title: String = anchor.text().collect();
        let title = title.trim();
        if href.is_empty() || title.is_empty() {
            continue;
        }

        match resolve_href(base_dir, href) {
            Ok(path) if !path.is_empty() => {
                toc.insert(path, title.to_string());
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(%href, error = %e, "导航链接路径非法，已跳过"),
        }
    }

    toc
}

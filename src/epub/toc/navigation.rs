//! 导航结构模块
//!
//! NCX中嵌套的navPoint树，以及把树展开为 [`TocMap`] 的遍历。

use crate::epub::archive::resolve_href;
use crate::epub::toc::TocMap;

/// 导航点
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavPoint {
    /// 导航点ID
    pub id: String,
    /// navLabel中的文本
    pub label: String,
    /// content的src(可能带 `#片段`)
    pub src: String,
    /// 子导航点
    pub children: Vec<NavPoint>,
}

impl NavPoint {
    pub fn new(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// 添加子导航点
    pub fn add_child(&mut self, child: NavPoint) {
        self.children.push(child);
    }
}

/// 导航地图
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavMap {
    /// 文档标题(docTitle)
    pub doc_title: Option<String>,
    /// 顶层导航点
    pub nav_points: Vec<NavPoint>,
}

impl NavMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加顶层导航点
    pub fn add_nav_point(&mut self, nav_point: NavPoint) {
        self.nav_points.push(nav_point);
    }

    /// 按深度优先先序展开为目录映射
    ///
    /// 父节点先于子节点记录，同一路径只保留第一次出现的标题。没有标签或没有src的
    /// 导航点本身不记录，但其子节点照常遍历。
    ///
    /// # 参数
    /// * `base_dir` - src相对的目录(NCX文件所在目录)
    pub fn to_toc_map(&self, base_dir: &str) -> TocMap {
        let mut toc = TocMap::new();
        let mut stack: Vec<&NavPoint> = self.nav_points.iter().rev().collect();

        while let Some(point) = stack.pop() {
            let label = point.label.trim();
            if !label.is_empty() && !point.src.trim().is_empty() {
                match resolve_href(base_dir, point.src.trim()) {
                    Ok(path) => {
                        toc.insert(path, label.to_string());
                    }
                    Err(e) => tracing::debug!(src = %point.src, error = %e, "导航点路径非法，已跳过"),
                }
            }
            stack.extend(point.children.iter().rev());
        }

        toc
    }
}

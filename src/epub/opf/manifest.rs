//! 清单模块
//!
//! 提供EPUB包中文件清单的结构定义，以及渲染阶段使用的只读索引。

use crate::epub::archive::resolve_href;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// 清单项信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestItem {
    /// 项目ID(包内唯一)
    pub id: String,
    /// 文件路径(相对于OPF文件)
    pub href: String,
    /// 媒体类型
    pub media_type: String,
    /// 属性(如nav、cover-image等)，没有时为空字符串
    pub properties: String,
    /// 回退项ID(fallback属性)
    pub fallback: Option<String>,
}

impl ManifestItem {
    /// 创建新的清单项
    pub fn new(id: String, href: String, media_type: String) -> Self {
        Self {
            id,
            href,
            media_type,
            properties: String::new(),
            fallback: None,
        }
    }

    /// 创建带属性的清单项
    pub fn with_properties(id: String, href: String, media_type: String, properties: String) -> Self {
        Self {
            properties,
            ..Self::new(id, href, media_type)
        }
    }

    /// 检查是否包含指定属性
    pub fn has_property(&self, property: &str) -> bool {
        self.properties.split_whitespace().any(|p| p == property)
    }

    /// 检查是否为导航文档
    pub fn is_nav(&self) -> bool {
        self.has_property("nav")
    }

    /// 检查是否为NCX文件(按扩展名判断)
    pub fn is_ncx(&self) -> bool {
        Path::new(&self.href)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ncx"))
    }
}

/// 按文档顺序保存的清单
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    /// id → items中的下标
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加清单项，id重复时保留先出现的项并返回 `false`
    pub fn push(&mut self, item: ManifestItem) -> bool {
        if self.positions.contains_key(&item.id) {
            return false;
        }
        self.positions.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        true
    }

    /// 根据ID获取清单项
    pub fn get(&self, id: &str) -> Option<&ManifestItem> {
        self.positions.get(id).map(|&position| &self.items[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 构建渲染阶段使用的只读索引
    ///
    /// # 参数
    /// * `root_dir` - OPF文件所在目录，所有href都相对于它解析
    pub fn index(&self, root_dir: &str) -> ManifestIndex<'_> {
        let mut by_id = HashMap::new();
        let mut by_path = HashMap::new();

        for item in &self.items {
            // 越出归档根目录的href不可能被读到，直接不进索引
            let Ok(full_path) = resolve_href(root_dir, &item.href) else {
                tracing::debug!(id = %item.id, href = %item.href, "清单项路径非法，已忽略");
                continue;
            };
            by_path.entry(full_path.clone()).or_insert(item);
            by_id.insert(item.id.as_str(), full_path);
        }

        ManifestIndex { by_id, by_path }
    }
}

/// 清单的两个方向的查找表：id → 完整路径，完整路径 → 清单项
///
/// 构建后不再修改，渲染期间只读共享。
#[derive(Debug)]
pub struct ManifestIndex<'a> {
    by_id: HashMap<&'a str, String>,
    by_path: HashMap<String, &'a ManifestItem>,
}

impl<'a> ManifestIndex<'a> {
    /// 根据id获取归档内完整路径
    pub fn path_of(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    /// 根据归档内完整路径获取清单项
    pub fn item_at(&self, full_path: &str) -> Option<&'a ManifestItem> {
        self.by_path.get(full_path).copied()
    }
}

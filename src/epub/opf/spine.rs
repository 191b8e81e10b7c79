//! 脊柱模块
//!
//! 提供EPUB包中阅读顺序（脊柱）的结构定义。

use serde::Serialize;

/// 脊柱项信息(阅读顺序)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpineItemRef {
    /// 引用的清单项ID
    pub idref: String,
    /// 是否线性阅读
    pub linear: bool,
}

impl SpineItemRef {
    /// 创建新的脊柱项
    pub fn new(idref: String) -> Self {
        Self { idref, linear: true }
    }

    /// 创建指定线性属性的脊柱项
    pub fn with_linear(idref: String, linear: bool) -> Self {
        Self { idref, linear }
    }
}

/// 脊柱
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Spine {
    /// spine元素的toc属性(NCX清单项的id)
    pub toc: Option<String>,
    /// 按阅读顺序排列的脊柱项
    pub itemrefs: Vec<SpineItemRef>,
}

impl Spine {
    pub fn len(&self) -> usize {
        self.itemrefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemrefs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpineItemRef> {
        self.itemrefs.iter()
    }
}

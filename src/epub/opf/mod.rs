//! OPF（Open Packaging Format）文件解析模块
//!
//! 此模块提供EPUB文件中OPF包文件的解析功能，包括元数据、清单、脊柱等信息的提取。
//! EPUB2和EPUB3的元数据写法不兼容，分别由 `v2`、`v3` 解析，输出同一个 [`Package`]。

mod manifest;
mod metadata;
mod parser;
pub mod relator;
pub mod v2;
pub mod v3;
mod spine;

use serde::Serialize;

pub use manifest::{Manifest, ManifestIndex, ManifestItem};
pub use metadata::{Creator, DateEntry, Identifier, Metadata, Title};
pub use spine::{Spine, SpineItemRef};
pub(crate) use parser::attribute_value;

/// OPF文件解析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    /// package元素上声明的版本
    pub version: String,
    /// 元数据(完整列表)
    pub metadata: Metadata,
    /// 清单项(文件列表)
    pub manifest: Manifest,
    /// 脊柱(阅读顺序)
    pub spine: Spine,
}

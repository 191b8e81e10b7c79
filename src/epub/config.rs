//! 解析选项配置模块
//!
//! 提供解析流程的可调参数，支持从YAML文件加载和生成配置。
//! 默认值即标准行为，不提供配置文件时无需任何额外操作。

use crate::epub::error::{EpubError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 解析流程的可配置参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// 目录没有提供标题时，从正文推导的备用标题的最大字符数
    pub title_max_chars: usize,
    /// 每个章节正文之后追加的分隔标记
    pub section_separator: String,
    /// 渲染时整体丢弃(连同子节点)的非内容标签
    pub stripped_tags: Vec<String>,
    /// 判断封面条目的id子串：spine中包含它的条目被跳过，manifest中第一个包含它的条目作为封面
    pub cover_marker: String,
    /// 是否把图片内联为data URI
    pub inline_images: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::default_config()
    }
}

impl ParseOptions {
    /// 获取默认配置
    pub fn default_config() -> Self {
        Self {
            title_max_chars: 50,
            section_separator: "\n<hr />\n".to_string(),
            stripped_tags: ["script", "style", "link", "meta", "head", "title", "svg"]
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            cover_marker: "cover".to_string(),
            inline_images: true,
        }
    }

    /// 从YAML配置文件加载，缺失的字段使用默认值
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use epub_parser::ParseOptions;
    /// let options = ParseOptions::from_file("epub-parser.yaml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EpubError::ConfigError(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// 从YAML文本解析配置
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yml::from_str(content)
            .map_err(|e| EpubError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 序列化为YAML文本
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self)
            .map_err(|e| EpubError::ConfigError(format!("序列化配置失败: {}", e)))
    }

    /// 把默认配置写到指定路径
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml_content = Self::default_config().to_yaml()?;
        let content_with_header = format!(
            "# epub-parser 解析选项\n# 删除某一项即回退到默认值\n\n{}",
            yaml_content
        );

        fs::write(path.as_ref(), content_with_header)
            .map_err(|e| EpubError::ConfigError(format!("写入配置文件失败: {}", e)))
    }

    /// 标签是否属于需要丢弃的非内容标签
    pub fn is_stripped(&self, tag: &str) -> bool {
        self.stripped_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// id是否带有封面标记
    pub fn is_cover_id(&self, id: &str) -> bool {
        !self.cover_marker.is_empty() && id.contains(&self.cover_marker)
    }
}

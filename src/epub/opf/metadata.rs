//! 元数据处理模块
//!
//! 提供EPUB元数据的结构定义。两个版本的OPF解析器都输出这里的 [`Metadata`]，
//! 所有Dublin Core元素都按文档顺序完整保留，由上层再决定取哪一个。

use serde::Serialize;

/// 标识符信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identifier {
    /// 标识符值
    pub value: String,
    /// 标识符类型(如ISBN、URI等)
    pub scheme: Option<String>,
    /// 元素ID，与package的unique-identifier对应
    pub id: Option<String>,
}

/// 标题信息
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
    pub lang: Option<String>,
    pub id: Option<String>,
    /// 排序用名称(EPUB3 file-as精化)
    pub file_as: Option<String>,
    /// 标题类型，如main、subtitle(EPUB3 title-type精化)
    pub title_type: Option<String>,
}

/// 创建者信息(作者、编辑者等)，同时用于贡献者
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Creator {
    /// 创建者姓名
    pub name: String,
    /// 排序用名称
    pub file_as: Option<String>,
    /// 语言标记
    pub language: Option<String>,
    /// 原始角色代码(如aut)，没有声明时为空
    pub raw_role: String,
    /// 解析后的角色名称：未声明为空，无法识别为 `unknown`
    pub role: String,
    /// 元素ID（用于关联refines元数据）
    pub id: Option<String>,
}

/// 日期信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateEntry {
    pub text: String,
    /// 日期事件(EPUB2 opf:event，如publication、modification)
    pub event: Option<String>,
}

/// OPF文件中的元数据信息
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub identifiers: Vec<Identifier>,
    pub titles: Vec<Title>,
    pub languages: Vec<String>,
    pub creators: Vec<Creator>,
    pub contributors: Vec<Creator>,
    pub publishers: Vec<String>,
    pub subjects: Vec<String>,
    pub descriptions: Vec<String>,
    pub dates: Vec<DateEntry>,
    pub rights: Vec<String>,
    /// `<meta name="cover">` 指向的清单项id，没有时为空字符串
    pub cover_id: String,
    /// package元素的unique-identifier属性
    pub unique_identifier: Option<String>,
}

impl Metadata {
    /// 创建新的元数据实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取书籍主标识符，即第一个标识符
    pub fn main_id(&self) -> Option<&str> {
        self.identifiers.first().map(|identifier| identifier.value.as_str())
    }

    /// 获取package根元素unique-identifier指向的标识符
    pub fn package_identifier(&self) -> Option<&str> {
        let uid = self.unique_identifier.as_deref()?;
        self.identifiers
            .iter()
            .find(|identifier| identifier.id.as_deref() == Some(uid))
            .map(|identifier| identifier.value.as_str())
    }

    /// 获取第一个标识符
    pub fn identifier(&self) -> Option<&str> {
        self.identifiers.first().map(|identifier| identifier.value.as_str())
    }

    /// 获取书名
    pub fn title(&self) -> Option<&str> {
        self.titles.first().map(|title| title.text.as_str())
    }

    /// 获取语言
    pub fn language(&self) -> Option<&str> {
        self.languages.first().map(String::as_str)
    }

    /// 获取第一作者
    pub fn creator(&self) -> Option<&Creator> {
        self.creators.first()
    }

    /// 获取第一贡献者
    pub fn contributor(&self) -> Option<&Creator> {
        self.contributors.first()
    }

    /// 获取出版社
    pub fn publisher(&self) -> Option<&str> {
        self.publishers.first().map(String::as_str)
    }

    /// 获取主题
    pub fn subject(&self) -> Option<&str> {
        self.subjects.first().map(String::as_str)
    }

    /// 获取描述
    pub fn description(&self) -> Option<&str> {
        self.descriptions.first().map(String::as_str)
    }

    /// 获取日期
    pub fn date(&self) -> Option<&str> {
        self.dates.first().map(|date| date.text.as_str())
    }

    /// 获取封面清单项id
    pub fn cover_id(&self) -> Option<&str> {
        if self.cover_id.is_empty() {
            None
        } else {
            Some(&self.cover_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier(value: &str, id: Option<&str>) -> Identifier {
        Identifier {
            value: value.to_string(),
            scheme: None,
            id: id.map(str::to_string),
        }
    }

    #[test]
    fn test_main_id_is_first_identifier() {
        let metadata = Metadata {
            identifiers: vec![
                identifier("urn:isbn:123", Some("isbn")),
                identifier("urn:uuid:abc", Some("uid")),
            ],
            unique_identifier: Some("uid".to_string()),
            ..Metadata::default()
        };

        assert_eq!(metadata.main_id(), Some("urn:isbn:123"));
        assert_eq!(metadata.identifier(), Some("urn:isbn:123"));
        assert_eq!(metadata.package_identifier(), Some("urn:uuid:abc"));
    }

    #[test]
    fn test_package_identifier_not_found() {
        let metadata = Metadata {
            identifiers: vec![identifier("first", None), identifier("second", None)],
            unique_identifier: Some("missing".to_string()),
            ..Metadata::default()
        };
        assert_eq!(metadata.main_id(), Some("first"));
        assert_eq!(metadata.package_identifier(), None);
    }

    #[test]
    fn test_empty_metadata_accessors() {
        let metadata = Metadata::new();
        assert_eq!(metadata.main_id(), None);
        assert_eq!(metadata.title(), None);
        assert!(metadata.creator().is_none());
        assert_eq!(metadata.cover_id(), None);
    }
}

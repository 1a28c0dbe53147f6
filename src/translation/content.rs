//! 内容对象
//!
//! 一个可翻译对象由内容类型、翻译键（同一对象的各语言版本共享）和语言标识确定。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 可翻译对象的引用
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    pub content_type: String,
    pub translation_key: String,
    pub locale: String,
}

/// 字段值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// 纯文本或富文本
    Text(String),
    /// 块数据或任意可覆盖值
    Json(serde_json::Value),
    /// 外键引用的对象
    Object(Option<Box<ContentObject>>),
    /// 归属于本对象的子对象
    Children(Vec<ContentObject>),
}

/// 内容对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentObject {
    pub content_type: String,
    pub translation_key: String,
    pub locale: String,
    /// 父对象的翻译键，父对象未翻译时本对象不能先物化
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl ContentObject {
    pub fn new(content_type: &str, translation_key: &str, locale: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            translation_key: translation_key.to_string(),
            locale: locale.to_string(),
            parent: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn with_text(self, name: &str, text: &str) -> Self {
        self.with_field(name, FieldValue::Text(text.to_string()))
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn set_field(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            content_type: self.content_type.clone(),
            translation_key: self.translation_key.clone(),
            locale: self.locale.clone(),
        }
    }

    /// 生成目标语言的副本，归属的子对象一并换成目标语言
    ///
    /// 外键引用的对象是独立的可翻译对象，保持原样，回填时再替换。
    pub fn copy_for_translation(&self, locale: &str) -> Self {
        let fields = self
            .fields
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    FieldValue::Children(children) => FieldValue::Children(
                        children
                            .iter()
                            .map(|child| child.copy_for_translation(locale))
                            .collect(),
                    ),
                    other => other.clone(),
                };
                (name.clone(), value)
            })
            .collect();

        Self {
            content_type: self.content_type.clone(),
            translation_key: self.translation_key.clone(),
            locale: locale.to_string(),
            parent: self.parent.clone(),
            fields,
        }
    }
}

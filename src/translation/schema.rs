//! 内容模型定义
//!
//! 字段和块的类型是封闭的枚举，提取器和回填器都对它们做穷尽匹配，
//! 新增一种类型时编译器会要求所有使用方一起处理。
//! `Registry` 在启动时构造一次，以引用方式传给提取器和回填器。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

/// 块定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockDef {
    /// 单行文本
    Char,
    /// 多行纯文本
    Text,
    /// 富文本 HTML
    RichText,
    /// 具名子块的组合
    Struct(StructBlockDef),
    /// 同类子块的列表
    List { child: Box<BlockDef> },
    /// 按类型名分派的子块序列
    Stream(StreamBlockDef),
    /// 原样同步的值（图片、文档、嵌入等）
    Overridable,
    /// 指向另一个可翻译对象
    Related { content_type: String },
    /// 没有可翻译内容
    Static,
}

impl BlockDef {
    /// 用于错误信息的类型名
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockDef::Char => "char",
            BlockDef::Text => "text",
            BlockDef::RichText => "rich_text",
            BlockDef::Struct(_) => "struct",
            BlockDef::List { .. } => "list",
            BlockDef::Stream(_) => "stream",
            BlockDef::Overridable => "overridable",
            BlockDef::Related { .. } => "related",
            BlockDef::Static => "static",
        }
    }
}

/// 带名字的子块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedBlock {
    pub name: String,
    #[serde(flatten)]
    pub def: BlockDef,
}

impl NamedBlock {
    pub fn new(name: &str, def: BlockDef) -> Self {
        Self {
            name: name.to_string(),
            def,
        }
    }
}

/// 结构块定义
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructBlockDef {
    pub children: Vec<NamedBlock>,
    /// 需要翻译的子块名；为空时全部子块都参与
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translatable_blocks: Option<Vec<String>>,
}

impl StructBlockDef {
    pub fn new(children: Vec<NamedBlock>) -> Self {
        Self {
            children,
            translatable_blocks: None,
        }
    }

    pub fn with_translatable_blocks(mut self, names: &[&str]) -> Self {
        self.translatable_blocks = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    pub fn child(&self, name: &str) -> Option<&BlockDef> {
        self.children
            .iter()
            .find(|child| child.name == name)
            .map(|child| &child.def)
    }

    /// 参与翻译的子块
    pub fn translatable_children(&self) -> impl Iterator<Item = &NamedBlock> {
        self.children.iter().filter(move |child| match &self.translatable_blocks {
            Some(names) => names.iter().any(|name| *name == child.name),
            None => true,
        })
    }
}

/// 流块定义
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamBlockDef {
    pub children: Vec<NamedBlock>,
}

impl StreamBlockDef {
    pub fn new(children: Vec<NamedBlock>) -> Self {
        Self { children }
    }

    /// 按类型名查找子块定义，未声明的类型视为不支持
    pub fn child(&self, block_type: &str) -> TranslationResult<&BlockDef> {
        self.children
            .iter()
            .find(|child| child.name == block_type)
            .map(|child| &child.def)
            .ok_or_else(|| TranslationError::UnsupportedBlockType(block_type.to_string()))
    }
}

/// 字段类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Char,
    Text,
    RichText,
    Stream(StreamBlockDef),
    /// 外键，指向另一个可翻译对象
    ForeignKey { content_type: String },
    /// 归属关系的子对象集合
    ChildCollection { content_type: String },
    Overridable,
}

/// 字段定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// 一个内容类型及其可翻译字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDef {
    pub content_type: String,
    pub translatable_fields: Vec<FieldDef>,
}

impl ModelDef {
    pub fn new(content_type: &str, translatable_fields: Vec<FieldDef>) -> Self {
        Self {
            content_type: content_type.to_string(),
            translatable_fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.translatable_fields.iter().find(|field| field.name == name)
    }
}

/// 内容类型注册表
#[derive(Debug, Clone, Default)]
pub struct Registry {
    models: HashMap<String, ModelDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_models(models: Vec<ModelDef>) -> Self {
        let mut registry = Self::new();
        for model in models {
            registry.register(model);
        }
        registry
    }

    /// 从 JSON 数组加载模型定义
    pub fn from_json(json: &str) -> TranslationResult<Self> {
        let models: Vec<ModelDef> = serde_json::from_str(json)?;
        Ok(Self::from_models(models))
    }

    pub fn register(&mut self, model: ModelDef) {
        tracing::debug!("注册内容类型: {}", model.content_type);
        self.models.insert(model.content_type.clone(), model);
    }

    pub fn get(&self, content_type: &str) -> TranslationResult<&ModelDef> {
        self.models
            .get(content_type)
            .ok_or_else(|| TranslationError::UnknownContentType(content_type.to_string()))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

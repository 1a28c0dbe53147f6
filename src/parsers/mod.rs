//! # 解析器模块
//!
//! 目前只有 `html`：富文本片段的解析、遍历与序列化。

pub mod html;

pub use html::{decode_html, parse_fragment, serialize_nodes, Element, Node};

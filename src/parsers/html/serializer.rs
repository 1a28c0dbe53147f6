use std::io;

use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::{namespace_url, ns, LocalName, QualName};

use super::dom::{Element, Node};

fn html_name(name: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(name))
}

impl Serialize for Element {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        if let TraversalScope::IncludeNode = traversal_scope {
            let attr_names: Vec<QualName> = self
                .attrs
                .iter()
                .map(|(name, _)| QualName::new(None, ns!(), LocalName::from(name.as_str())))
                .collect();
            let attrs = attr_names
                .iter()
                .zip(self.attrs.iter())
                .map(|(name, (_, value))| (name, value.as_str()));

            serializer.start_elem(html_name(&self.name), attrs)?;
        }

        for child in &self.children {
            child.serialize(serializer, TraversalScope::IncludeNode)?;
        }

        if let TraversalScope::IncludeNode = traversal_scope {
            serializer.end_elem(html_name(&self.name))?;
        }

        Ok(())
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match self {
            Node::Element(element) => element.serialize(serializer, traversal_scope),
            Node::Text(text) => serializer.write_text(text),
            Node::Comment(text) => serializer.write_comment(text),
        }
    }
}

/// 一组兄弟节点，序列化时只输出节点本身，不带外层容器
struct NodeList<'a>(&'a [Node]);

impl Serialize for NodeList<'_> {
    fn serialize<S>(&self, serializer: &mut S, _traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        for node in self.0 {
            node.serialize(serializer, TraversalScope::IncludeNode)?;
        }
        Ok(())
    }
}

/// 序列化节点列表为 HTML 字符串
pub fn serialize_nodes(nodes: &[Node]) -> String {
    let mut buf: Vec<u8> = Vec::new();

    serialize(&mut buf, &NodeList(nodes), SerializeOpts::default())
        .expect("Unable to serialize nodes into buffer");

    String::from_utf8_lossy(&buf).into_owned()
}

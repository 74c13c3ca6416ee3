use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

/// `checked` and `disabled` are live state, seeded from the attributes at
/// parse time. The attribute map keeps the parsed defaults.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: NodeId, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            node_type,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let checked = attrs.contains_key("checked");
        let disabled = attrs.contains_key("disabled");
        let id_attr = attrs.get("id").cloned();
        let node = self.create_node(
            parent,
            NodeType::Element(Element {
                tag_name,
                attrs,
                checked,
                disabled,
            }),
        );
        if let Some(id_attr) = id_attr {
            if !id_attr.is_empty() {
                self.id_index.insert(id_attr, node);
            }
        }
        node
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(parent, NodeType::Text(text))
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn checked(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.checked).unwrap_or(false)
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.disabled).unwrap_or(false)
    }

    pub(crate) fn set_checked_flag(&mut self, node_id: NodeId, checked: bool) {
        if let Some(element) = self.element_mut(node_id) {
            element.checked = checked;
        }
    }

    /// Checks a radio and unchecks the rest of its group, as assigning the
    /// `checked` property does in a browser.
    pub(crate) fn check_radio(&mut self, target: NodeId) {
        self.uncheck_group_peers(target);
        self.set_checked_flag(target, true);
    }

    fn uncheck_group_peers(&mut self, target: NodeId) {
        let group_name = self.attr(target, "name").unwrap_or_default();
        if group_name.is_empty() {
            return;
        }
        let group_form = self.form_owner(target);

        for node in self.all_element_nodes() {
            if node == target {
                continue;
            }
            if !is_radio_input(self, node) {
                continue;
            }
            if self.attr(node, "name").unwrap_or_default() != group_name {
                continue;
            }
            if self.form_owner(node) != group_form {
                continue;
            }
            self.set_checked_flag(node, false);
        }
    }

    pub(crate) fn form_owner(&self, node_id: NodeId) -> Option<NodeId> {
        self.find_ancestor_by_tag(node_id, "form")
    }

    fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(node) = cursor {
            if self
                .tag_name(node)
                .map(|t| t.eq_ignore_ascii_case(tag))
                .unwrap_or(false)
            {
                return Some(node);
            }
            cursor = self.parent(node);
        }
        None
    }

    pub(crate) fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(self.root, &mut out);
        out
    }

    fn collect_elements(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        if self.element(node_id).is_some() {
            out.push(node_id);
        }
        for child in &self.nodes[node_id.0].children {
            self.collect_elements(*child, out);
        }
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    /// Detaches an element's children and drops their ids from the index.
    /// The arena slots stay allocated; nothing references them afterwards.
    pub(crate) fn clear_children(&mut self, node_id: NodeId) {
        for child in self.nodes[node_id.0].children.clone() {
            self.drop_subtree_ids(child);
        }
        self.nodes[node_id.0].children.clear();
    }

    fn drop_subtree_ids(&mut self, node_id: NodeId) {
        if let Some(id_attr) = self.attr(node_id, "id") {
            if self.id_index.get(&id_attr) == Some(&node_id) {
                self.id_index.remove(&id_attr);
            }
        }
        for child in self.nodes[node_id.0].children.clone() {
            self.drop_subtree_ids(child);
        }
    }

    /// Serialization for diagnostics. Attributes come out sorted so snippets
    /// are stable; the live `checked` state replaces the parsed attribute.
    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
            NodeType::Element(element) => {
                let mut out = String::new();
                out.push('<');
                out.push_str(&element.tag_name);
                let mut keys: Vec<&String> = element.attrs.keys().collect();
                keys.sort();
                for key in keys {
                    if key == "checked" {
                        continue;
                    }
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&element.attrs[key]);
                    out.push('"');
                }
                if element.checked {
                    out.push_str(" checked");
                }
                out.push('>');
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.dump_node(*child));
                }
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
                out
            }
        }
    }
}

fn input_type(dom: &Dom, node_id: NodeId) -> Option<String> {
    let element = dom.element(node_id)?;
    if !element.tag_name.eq_ignore_ascii_case("input") {
        return None;
    }
    Some(
        element
            .attrs
            .get("type")
            .map(|kind| kind.to_ascii_lowercase())
            .unwrap_or_else(|| "text".to_string()),
    )
}

pub(crate) fn is_radio_input(dom: &Dom, node_id: NodeId) -> bool {
    input_type(dom, node_id).as_deref() == Some("radio")
}

pub(crate) fn is_checkbox_input(dom: &Dom, node_id: NodeId) -> bool {
    input_type(dom, node_id).as_deref() == Some("checkbox")
}

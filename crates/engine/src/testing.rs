//! In-memory page, rule store and overlay for exercising the session natively.

use crate::dom::PageDom;
use crate::error::{DomError, StoreError};
use crate::overlay::{HistoryState, Notification, Overlay};
use crate::rules::RuleStore;
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
struct FakeNode {
    tag: String,
    id: Option<String>,
    /// `None` simulates a node whose class list cannot be introspected
    classes: Option<Vec<String>>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    sheet_display: String,
    inline_display: String,
    outline: String,
    attached: bool,
}

impl FakeNode {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_lowercase(),
            id: None,
            classes: Some(Vec::new()),
            parent,
            children: Vec::new(),
            sheet_display: "block".to_string(),
            inline_display: String::new(),
            outline: String::new(),
            attached: true,
        }
    }
}

/// Element tree rooted at `<html><body>`, with `body` as the content root.
///
/// Supports the selector subset the engine emits: `#id` and child-combinator
/// paths of `tag.class:nth-of-type(k)` compounds.
#[derive(Debug)]
pub struct FakeDom {
    nodes: RefCell<Vec<FakeNode>>,
    crosshair: Cell<bool>,
}

impl FakeDom {
    pub fn new() -> Self {
        let html = FakeNode::new("html", None);
        let body = FakeNode::new("body", Some(NodeId(0)));
        let mut nodes = vec![html, body];
        nodes[0].children.push(NodeId(1));
        Self {
            nodes: RefCell::new(nodes),
            crosshair: Cell::new(false),
        }
    }

    pub fn body(&self) -> NodeId {
        NodeId(1)
    }

    pub fn append(&self, parent: NodeId, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId(nodes.len());
        nodes.push(FakeNode::new(tag, Some(parent)));
        nodes[parent.0].children.push(id);
        id
    }

    pub fn set_id(&self, node: NodeId, id: &str) {
        self.nodes.borrow_mut()[node.0].id = Some(id.to_string());
    }

    pub fn set_classes(&self, node: NodeId, classes: &[&str]) {
        self.nodes.borrow_mut()[node.0].classes =
            Some(classes.iter().map(|c| c.to_string()).collect());
    }

    pub fn break_class_list(&self, node: NodeId) {
        self.nodes.borrow_mut()[node.0].classes = None;
    }

    /// Display value coming from the page's stylesheets
    pub fn set_sheet_display(&self, node: NodeId, display: &str) {
        self.nodes.borrow_mut()[node.0].sheet_display = display.to_string();
    }

    /// Removes the subtree from the page; handles into it go stale
    pub fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node.0].parent {
            nodes[parent.0].children.retain(|child| *child != node);
        }
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            nodes[current.0].attached = false;
            stack.extend(nodes[current.0].children.iter().copied());
        }
    }

    pub fn inline_display(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].inline_display.clone()
    }

    /// Computed display, also for detached nodes
    pub fn display(&self, node: NodeId) -> String {
        let nodes = self.nodes.borrow();
        let n = &nodes[node.0];
        if n.inline_display.is_empty() {
            n.sheet_display.clone()
        } else {
            n.inline_display.clone()
        }
    }

    pub fn outline(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0].outline.clone()
    }

    pub fn crosshair(&self) -> bool {
        self.crosshair.get()
    }

    fn document_order(nodes: &[FakeNode]) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![NodeId(0)];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(nodes[current.0].children.iter().rev().copied());
        }
        order
    }
}

impl Default for FakeDom {
    fn default() -> Self {
        Self::new()
    }
}

impl PageDom for FakeDom {
    type Handle = NodeId;

    fn is_live(&self, element: &NodeId) -> bool {
        self.nodes
            .borrow()
            .get(element.0)
            .map(|n| n.attached)
            .unwrap_or(false)
    }

    fn computed_display(&self, element: &NodeId) -> Option<String> {
        if !self.is_live(element) {
            return None;
        }
        Some(self.display(*element))
    }

    fn set_inline_display(&self, element: &NodeId, value: &str) {
        self.nodes.borrow_mut()[element.0].inline_display = value.to_string();
    }

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let path = parse_selector(selector)
            .ok_or_else(|| DomError::InvalidSelector(selector.to_string()))?;
        let nodes = self.nodes.borrow();
        Ok(Self::document_order(&nodes)
            .into_iter()
            .filter(|id| matches_path(&nodes, *id, &path))
            .collect())
    }

    fn set_outline(&self, element: &NodeId, value: &str) {
        self.nodes.borrow_mut()[element.0].outline = value.to_string();
    }

    fn element_id(&self, element: &NodeId) -> Option<String> {
        self.nodes.borrow()[element.0].id.clone()
    }

    fn tag_name(&self, element: &NodeId) -> Option<String> {
        Some(self.nodes.borrow()[element.0].tag.clone())
    }

    fn class_names(&self, element: &NodeId) -> Result<Vec<String>, DomError> {
        self.nodes.borrow()[element.0]
            .classes
            .clone()
            .ok_or_else(|| DomError::Unsupported("class list".to_string()))
    }

    fn parent(&self, element: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[element.0].parent
    }

    fn children(&self, element: &NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[element.0].children.clone()
    }

    fn is_content_root(&self, element: &NodeId) -> bool {
        *element == self.body() || *element == NodeId(0)
    }

    fn set_crosshair(&self, enabled: bool) {
        self.crosshair.set(enabled);
    }
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    nth_of_type: Option<usize>,
}

fn parse_selector(selector: &str) -> Option<Vec<Compound>> {
    selector
        .split('>')
        .map(str::trim)
        .map(|part| {
            if part.is_empty() {
                None
            } else {
                parse_compound(part)
            }
        })
        .collect()
}

fn parse_compound(part: &str) -> Option<Compound> {
    const NTH_OF_TYPE: &str = ":nth-of-type(";

    let chars: Vec<char> = part.chars().collect();
    let mut compound = Compound::default();
    let mut i = 0;

    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '-' || chars[i] == '*') {
        i += 1;
    }
    let tag: String = chars[..i].iter().collect();
    if !tag.is_empty() && tag != "*" {
        compound.tag = Some(tag.to_lowercase());
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (ident, next) = read_ident(&chars, i + 1)?;
                compound.id = Some(ident);
                i = next;
            }
            '.' => {
                let (ident, next) = read_ident(&chars, i + 1)?;
                compound.classes.push(ident);
                i = next;
            }
            ':' => {
                let rest: String = chars[i..].iter().collect();
                let inner = rest.strip_prefix(NTH_OF_TYPE)?;
                let end = inner.find(')')?;
                let position: usize = inner[..end].trim().parse().ok()?;
                if position == 0 {
                    return None;
                }
                compound.nth_of_type = Some(position);
                i += NTH_OF_TYPE.len() + end + 1;
            }
            _ => return None,
        }
    }

    Some(compound)
}

fn read_ident(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut ident = String::new();
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                i += 1;
                let hex_start = i;
                while i < chars.len() && i - hex_start < 6 && chars[i].is_ascii_hexdigit() {
                    i += 1;
                }
                if i > hex_start {
                    let hex: String = chars[hex_start..i].iter().collect();
                    let code = u32::from_str_radix(&hex, 16).ok()?;
                    ident.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                    if chars.get(i) == Some(&' ') {
                        i += 1;
                    }
                } else {
                    ident.push(*chars.get(i)?);
                    i += 1;
                }
            }
            '.' | '#' | ':' => break,
            ch => {
                ident.push(ch);
                i += 1;
            }
        }
    }
    if ident.is_empty() {
        None
    } else {
        Some((ident, i))
    }
}

fn nth_of_type(nodes: &[FakeNode], id: NodeId) -> Option<usize> {
    let parent = nodes[id.0].parent?;
    let tag = &nodes[id.0].tag;
    nodes[parent.0]
        .children
        .iter()
        .filter(|child| &nodes[child.0].tag == tag)
        .position(|child| *child == id)
        .map(|position| position + 1)
}

fn matches_compound(nodes: &[FakeNode], id: NodeId, compound: &Compound) -> bool {
    let node = &nodes[id.0];
    if let Some(tag) = &compound.tag {
        if &node.tag != tag {
            return false;
        }
    }
    if let Some(want) = &compound.id {
        if node.id.as_deref() != Some(want.as_str()) {
            return false;
        }
    }
    let classes = node.classes.as_deref().unwrap_or(&[]);
    if !compound.classes.iter().all(|class| classes.contains(class)) {
        return false;
    }
    match compound.nth_of_type {
        Some(position) => nth_of_type(nodes, id) == Some(position),
        None => true,
    }
}

fn matches_path(nodes: &[FakeNode], id: NodeId, path: &[Compound]) -> bool {
    let Some((last, rest)) = path.split_last() else {
        return true;
    };
    if !matches_compound(nodes, id, last) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match nodes[id.0].parent {
        Some(parent) => matches_path(nodes, parent, rest),
        None => false,
    }
}

/// Rule store backed by a map, with switchable failures
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Vec<String>>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, selectors: &[&str]) -> Self {
        self.entries.borrow_mut().insert(
            key.to_string(),
            selectors.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn get(&self, key: &str) -> Option<Vec<String>> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Makes both writes and removals fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

#[async_trait(?Send)]
impl RuleStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Vec<String>, StoreError> {
        if self.fail_reads.get() {
            return Err(StoreError::Read {
                key: key.to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(self.get(key).unwrap_or_default())
    }

    async fn write(&self, key: &str, selectors: &[String]) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Write {
                key: key.to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.writes.set(self.writes.get() + 1);
        self.entries
            .borrow_mut()
            .insert(key.to_string(), selectors.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Remove {
                key: key.to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Overlay that records what the session asked of it
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    pub attached: bool,
    pub attach_count: usize,
    pub detach_count: usize,
    pub last_state: Option<HistoryState>,
    notifications: RefCell<Vec<Notification>>,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications.borrow().last().cloned()
    }
}

impl Overlay for RecordingOverlay {
    fn attach(&mut self) {
        self.attached = true;
        self.attach_count += 1;
    }

    fn detach(&mut self) {
        self.attached = false;
        self.detach_count += 1;
    }

    fn refresh(&mut self, state: HistoryState) {
        self.last_state = Some(state);
    }

    fn notify(&self, notification: &Notification) {
        self.notifications.borrow_mut().push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_subset() {
        let dom = FakeDom::new();
        let list = dom.append(dom.body(), "ul");
        dom.set_classes(list, &["menu"]);
        let first = dom.append(list, "li");
        let second = dom.append(list, "li");
        dom.set_id(second, "1st");

        assert_eq!(dom.query_all("ul.menu > li").unwrap(), vec![first, second]);
        assert_eq!(dom.query_all("li:nth-of-type(2)").unwrap(), vec![second]);
        assert_eq!(dom.query_all("#\\31 st").unwrap(), vec![second]);
        assert!(dom.query_all("ul >> li").is_err());
        assert!(dom.query_all("li[data-x]").is_err());
    }

    #[test]
    fn test_detached_nodes_do_not_match() {
        let dom = FakeDom::new();
        let div = dom.append(dom.body(), "div");
        dom.detach(div);
        assert!(!dom.is_live(&div));
        assert!(dom.query_all("div").unwrap().is_empty());
    }
}

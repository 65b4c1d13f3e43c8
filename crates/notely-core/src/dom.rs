//! Document tree observed by the delete handler.
//!
//! A small arena-backed element tree with just enough of the browser DOM to
//! express event delegation: selector lookup, nearest-ancestor search, data
//! attributes, click listeners and bubbling dispatch. A binding layer (or a
//! test) owns the [`Document`] and forwards user clicks into
//! [`Document::dispatch_click`].

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::selector::Selector;

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A click travelling through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// Element the click landed on
    pub target: NodeId,
    /// Element whose listener is currently running
    pub current_target: NodeId,
}

/// Listener invoked during bubbling dispatch.
pub type ClickListener = Box<dyn Fn(&Document, &ClickEvent) + Send + Sync>;

/// A single element: tag, classes, attributes and tree links.
///
/// Tag and attribute names are stored lowercase. The class list and the
/// `class` attribute always agree, whichever of them was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| existing == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Read a `data-*` attribute, e.g. `data("note-id")` reads `data-note-id`.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.attribute(&format!("data-{key}"))
    }

    fn set_attribute(&mut self, name: String, value: &str) {
        if name == CLASS_ATTRIBUTE {
            self.classes.clear();
            for class in value.split_whitespace() {
                if !self.has_class(class) {
                    self.classes.push(class.to_string());
                }
            }
        }
        self.attributes.insert(name, value.to_string());
    }

    fn remove_attribute(&mut self, name: &str) -> Option<String> {
        if name == CLASS_ATTRIBUTE {
            self.classes.clear();
        }
        self.attributes.remove(name)
    }
}

const CLASS_ATTRIBUTE: &str = "class";

struct Node {
    element: Element,
    listeners: Vec<ClickListener>,
}

/// Arena of elements rooted at an `html` element.
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners: usize = self.nodes.iter().map(|node| node.listeners.len()).sum();
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("listeners", &listeners)
            .field("root", &self.root)
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the root element.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                element: Element::new("html"),
                listeners: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element. Attach it with [`Document::append_child`].
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            element: Element::new(tag),
            listeners: Vec::new(),
        });
        id
    }

    pub fn element(&self, node: NodeId) -> Result<&Element> {
        self.nodes
            .get(node.0)
            .map(|entry| &entry.element)
            .ok_or(Error::UnknownNode(node))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element> {
        self.nodes
            .get_mut(node.0)
            .map(|entry| &mut entry.element)
            .ok_or(Error::UnknownNode(node))
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.element(parent)?;
        if self.element(child)?.parent.is_some() {
            return Err(Error::AlreadyAttached(child));
        }
        if child == self.root {
            return Err(Error::RootNode);
        }
        if self.ancestors_inclusive(parent).any(|ancestor| ancestor == child) {
            return Err(Error::Cycle { parent, child });
        }

        self.element_mut(child)?.parent = Some(parent);
        self.element_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Remove `node` (and its subtree) from its parent.
    ///
    /// The subtree stays in the arena, so its ids remain valid, but it is no
    /// longer reachable from the root.
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(Error::RootNode);
        }
        let Some(parent) = self.element(node)?.parent else {
            return Ok(());
        };
        self.element_mut(parent)?
            .children
            .retain(|child| *child != node);
        self.element_mut(node)?.parent = None;
        Ok(())
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        if !element.has_class(class) {
            element.classes.push(class.to_string());
            let joined = element.classes.join(" ");
            element.attributes.insert(CLASS_ATTRIBUTE.to_string(), joined);
        }
        Ok(())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_ok_and(|element| element.has_class(class))
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.element_mut(node)?
            .set_attribute(name.to_ascii_lowercase(), value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<Option<String>> {
        Ok(self
            .element_mut(node)?
            .remove_attribute(&name.to_ascii_lowercase()))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).ok()?.attribute(name)
    }

    /// Read a `data-*` attribute of `node`.
    pub fn data(&self, node: NodeId, key: &str) -> Option<&str> {
        self.element(node).ok()?.data(key)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).ok()?.parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.element(node)
            .map(|element| element.children.as_slice())
            .unwrap_or_default()
    }

    /// Iterate from `node` up to the top of its tree, `node` included.
    pub fn ancestors_inclusive(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.element(node).ok().map(|_| node),
        }
    }

    /// Whether `node` is reachable from the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.ancestors_inclusive(node).last() == Some(self.root)
    }

    /// Nearest element, starting with `node` itself, that satisfies
    /// `predicate`. The walk gives up after examining `boundary`.
    pub fn closest(
        &self,
        node: NodeId,
        predicate: impl Fn(&Element) -> bool,
        boundary: Option<NodeId>,
    ) -> Option<NodeId> {
        for ancestor in self.ancestors_inclusive(node) {
            if self.element(ancestor).is_ok_and(&predicate) {
                return Some(ancestor);
            }
            if Some(ancestor) == boundary {
                break;
            }
        }
        None
    }

    /// [`Document::closest`] with a selector as the predicate.
    pub fn closest_matching(
        &self,
        node: NodeId,
        selector: &Selector,
        boundary: Option<NodeId>,
    ) -> Option<NodeId> {
        self.closest(node, |element| selector.matches(element), boundary)
    }

    /// First connected element matching `selector`, in document order.
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.preorder().find(|node| {
            self.element(*node)
                .is_ok_and(|element| selector.matches(element))
        })
    }

    /// Every connected element matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.preorder()
            .filter(|node| {
                self.element(*node)
                    .is_ok_and(|element| selector.matches(element))
            })
            .collect()
    }

    fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(self.children(node).iter().rev().copied());
            Some(node)
        })
    }

    /// Register a click listener on `node`.
    pub fn add_click_listener(
        &mut self,
        node: NodeId,
        listener: impl Fn(&Self, &ClickEvent) + Send + Sync + 'static,
    ) -> Result<()> {
        self.element(node)?;
        self.nodes[node.0].listeners.push(Box::new(listener));
        Ok(())
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.nodes.get(node.0).map_or(0, |entry| entry.listeners.len())
    }

    /// Dispatch a click on `target` and let it bubble to the root.
    ///
    /// Listeners on the target run first, then those on each ancestor.
    /// Returns how many listeners were invoked; clicks on detached or unknown
    /// nodes invoke nothing.
    pub fn dispatch_click(&self, target: NodeId) -> usize {
        if !self.is_connected(target) {
            tracing::trace!(%target, "click on detached node ignored");
            return 0;
        }

        let mut invoked = 0;
        for current_target in self.ancestors_inclusive(target) {
            let event = ClickEvent {
                target,
                current_target,
            };
            for listener in &self.nodes[current_target.0].listeners {
                listener(self, &event);
                invoked += 1;
            }
        }
        tracing::trace!(%target, invoked, "click dispatched");
        invoked
    }
}

/// Iterator returned by [`Document::ancestors_inclusive`].
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

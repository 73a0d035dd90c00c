//! In-memory document used as a layout host.
//!
//! The document models just enough box geometry for the waterfall layout:
//! widths come from an explicit layout width, then a `width: Npx` inline
//! style, then the parent. Element heights are an explicit height, then a
//! `height: Npx` inline style, then the stacked heights of their children.
//! Images are zero-height until they complete, after which they scale their
//! natural size to the used width.

use std::collections::{HashMap, HashSet};

use anyhow::{Context as _, Result, anyhow, bail};
use indextree::{Arena, NodeId};
use log::{debug, trace};
use tokio::sync::mpsc;

use crate::{LayoutEvent, LayoutHost, NodeKey, NotificationHost};

/// Kind of a document node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// The document root.
    Root,
    /// A block element.
    Element { tag: String },
    /// An image with its natural size and load state.
    Image {
        natural_width: f32,
        natural_height: f32,
        complete: bool,
    },
}

#[derive(Debug)]
struct DocumentNode {
    key: NodeKey,
    kind: NodeKind,
    layout_width: Option<f32>,
    explicit_height: Option<f32>,
    styles: HashMap<String, String>,
}

impl DocumentNode {
    fn new(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            kind,
            layout_width: None,
            explicit_height: None,
            styles: HashMap::new(),
        }
    }
}

/// Arena-backed document tree that reports layout notifications over a channel.
#[derive(Debug)]
pub struct Document {
    arena: Arena<DocumentNode>,
    root: NodeId,
    ids: HashMap<NodeKey, NodeId>,
    next_key: u64,
    resize_observed: HashSet<NodeKey>,
    load_listeners: HashMap<NodeKey, NodeKey>,
    sender: mpsc::UnboundedSender<LayoutEvent>,
}

impl Document {
    /// Create an empty document that sends notifications to `sender`.
    pub fn new(sender: mpsc::UnboundedSender<LayoutEvent>) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DocumentNode::new(NodeKey::ROOT, NodeKind::Root));
        let mut ids = HashMap::new();
        ids.insert(NodeKey::ROOT, root);
        Self {
            arena,
            root,
            ids,
            next_key: 1,
            resize_observed: HashSet::new(),
            load_listeners: HashMap::new(),
            sender,
        }
    }

    /// Create a document together with the receiving end of its notifications.
    pub fn with_channel() -> (Self, mpsc::UnboundedReceiver<LayoutEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    /// The root node key.
    pub fn root(&self) -> NodeKey {
        self.arena
            .get(self.root)
            .map_or(NodeKey::ROOT, |node| node.get().key)
    }

    /// Append a block element under `parent`.
    ///
    /// # Errors
    /// Returns an error if `parent` is not in the document.
    pub fn append_element(&mut self, parent: NodeKey, tag: &str) -> Result<NodeKey> {
        self.append(
            parent,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
        )
    }

    /// Append an image under `parent`.
    ///
    /// # Errors
    /// Returns an error if `parent` is not in the document.
    pub fn append_image(
        &mut self,
        parent: NodeKey,
        natural_width: f32,
        natural_height: f32,
        complete: bool,
    ) -> Result<NodeKey> {
        self.append(
            parent,
            NodeKind::Image {
                natural_width,
                natural_height,
                complete,
            },
        )
    }

    fn append(&mut self, parent: NodeKey, kind: NodeKind) -> Result<NodeKey> {
        let parent_id = self.node_id(parent)?;
        let key = NodeKey(self.next_key);
        self.next_key += 1;
        let id = self.arena.new_node(DocumentNode::new(key, kind));
        parent_id
            .checked_append(id, &mut self.arena)
            .with_context(|| format!("cannot append {key} under {parent}"))?;
        self.ids.insert(key, id);
        Ok(key)
    }

    /// Remove `node` and its subtree, dropping any registrations on them.
    ///
    /// # Errors
    /// Returns an error for the root or an unknown node.
    pub fn remove(&mut self, node: NodeKey) -> Result<()> {
        if node == NodeKey::ROOT {
            bail!("the document root cannot be removed");
        }
        let id = self.node_id(node)?;
        let keys: Vec<NodeKey> = id
            .descendants(&self.arena)
            .filter_map(|descendant| self.arena.get(descendant))
            .map(|entry| entry.get().key)
            .collect();
        for key in &keys {
            self.ids.remove(key);
            self.resize_observed.remove(key);
            self.load_listeners.remove(key);
        }
        id.remove_subtree(&mut self.arena);
        debug!("removed {node} ({} nodes)", keys.len());
        Ok(())
    }

    /// Set the layout width of `node`, as an outer layout would.
    ///
    /// Observed nodes in the subtree whose used width changes are reported
    /// as [`LayoutEvent::Resized`].
    ///
    /// # Errors
    /// Returns an error if `node` is not in the document.
    pub fn resize(&mut self, node: NodeKey, width: f32) -> Result<()> {
        let id = self.node_id(node)?;
        let before = self.observed_widths(id);
        if let Some(entry) = self.arena.get_mut(id) {
            entry.get_mut().layout_width = Some(width);
        }
        self.emit_resizes(before);
        Ok(())
    }

    /// Pin the height of `node`, or clear the pin with `None`.
    ///
    /// # Errors
    /// Returns an error if `node` is not in the document.
    pub fn set_height(&mut self, node: NodeKey, height: Option<f32>) -> Result<()> {
        let id = self.node_id(node)?;
        if let Some(entry) = self.arena.get_mut(id) {
            entry.get_mut().explicit_height = height;
        }
        Ok(())
    }

    /// Mark `image` as loaded and notify its listener, if any.
    ///
    /// # Errors
    /// Returns an error if `image` is unknown or not an image.
    pub fn complete_image(&mut self, image: NodeKey) -> Result<()> {
        let id = self.node_id(image)?;
        let entry = self
            .arena
            .get_mut(id)
            .ok_or_else(|| anyhow!("{image} was removed"))?;
        match &mut entry.get_mut().kind {
            NodeKind::Image { complete, .. } => *complete = true,
            other => bail!("{image} is not an image: {other:?}"),
        }
        if let Some(owner) = self.load_listeners.remove(&image) {
            self.emit(LayoutEvent::ImageLoaded { image, owner });
        }
        Ok(())
    }

    /// Current inline style value of `property` on `node`.
    pub fn style(&self, node: NodeKey, property: &str) -> Option<&str> {
        let id = self.ids.get(&node)?;
        self.arena
            .get(*id)?
            .get()
            .styles
            .get(property)
            .map(String::as_str)
    }

    /// Kind of `node`.
    pub fn kind(&self, node: NodeKey) -> Option<&NodeKind> {
        let id = self.ids.get(&node)?;
        Some(&self.arena.get(*id)?.get().kind)
    }

    /// Whether resize observation is active for `node`.
    pub fn is_observed(&self, node: NodeKey) -> bool {
        self.resize_observed.contains(&node)
    }

    /// Container listening for completion of `image`.
    pub fn load_listener(&self, image: NodeKey) -> Option<NodeKey> {
        self.load_listeners.get(&image).copied()
    }

    fn node_id(&self, node: NodeKey) -> Result<NodeId> {
        self.ids
            .get(&node)
            .copied()
            .ok_or_else(|| anyhow!("unknown node {node}"))
    }

    fn emit(&self, event: LayoutEvent) {
        if self.sender.send(event).is_err() {
            trace!("no layout subscriber for {event:?}");
        }
    }

    fn observed_widths(&self, id: NodeId) -> Vec<(NodeKey, f32)> {
        id.descendants(&self.arena)
            .filter_map(|descendant| {
                let key = self.arena.get(descendant)?.get().key;
                self.resize_observed
                    .contains(&key)
                    .then(|| (key, self.used_width(descendant)))
            })
            .collect()
    }

    fn emit_resizes(&self, before: Vec<(NodeKey, f32)>) {
        for (key, previous) in before {
            let Some(id) = self.ids.get(&key) else {
                continue;
            };
            if (self.used_width(*id) - previous).abs() > f32::EPSILON {
                self.emit(LayoutEvent::Resized { node: key });
            }
        }
    }

    fn used_width(&self, id: NodeId) -> f32 {
        let Some(entry) = self.arena.get(id) else {
            return 0.0;
        };
        let data = entry.get();
        if let Some(width) = data.layout_width {
            return width;
        }
        if let Some(width) = data.styles.get("width").and_then(|value| parse_px(value)) {
            return width;
        }
        entry
            .parent()
            .map_or(0.0, |parent| self.used_width(parent))
    }

    fn used_height(&self, id: NodeId) -> f32 {
        let Some(entry) = self.arena.get(id) else {
            return 0.0;
        };
        let data = entry.get();
        match &data.kind {
            NodeKind::Image {
                natural_width,
                natural_height,
                complete,
            } => {
                if !*complete {
                    0.0
                } else if *natural_width > 0.0 {
                    natural_height * self.used_width(id) / natural_width
                } else {
                    *natural_height
                }
            }
            NodeKind::Root | NodeKind::Element { .. } => data
                .explicit_height
                .or_else(|| data.styles.get("height").and_then(|value| parse_px(value)))
                .unwrap_or_else(|| {
                    id.children(&self.arena)
                        .map(|child| self.used_height(child))
                        .sum()
                }),
        }
    }
}

impl LayoutHost for Document {
    fn contains(&self, node: NodeKey) -> bool {
        self.ids.contains_key(&node)
    }

    fn width(&self, node: NodeKey) -> Option<f32> {
        self.ids.get(&node).map(|id| self.used_width(*id))
    }

    fn height(&self, node: NodeKey) -> Option<f32> {
        self.ids.get(&node).map(|id| self.used_height(*id))
    }

    fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        let Some(id) = self.ids.get(&node) else {
            return Vec::new();
        };
        id.children(&self.arena)
            .filter_map(|child| self.arena.get(child))
            .map(|entry| entry.get().key)
            .collect()
    }

    fn set_style(&mut self, node: NodeKey, property: &str, value: &str) {
        let Some(id) = self.ids.get(&node).copied() else {
            trace!("style {property} dropped for missing {node}");
            return;
        };
        let before = if property == "width" {
            self.observed_widths(id)
        } else {
            Vec::new()
        };
        if let Some(entry) = self.arena.get_mut(id) {
            entry
                .get_mut()
                .styles
                .insert(property.to_owned(), value.to_owned());
        }
        self.emit_resizes(before);
    }

    fn pending_images(&self, node: NodeKey) -> Vec<NodeKey> {
        let Some(id) = self.ids.get(&node) else {
            return Vec::new();
        };
        id.descendants(&self.arena)
            .filter_map(|descendant| self.arena.get(descendant))
            .map(indextree::Node::get)
            .filter(|data| matches!(data.kind, NodeKind::Image { complete: false, .. }))
            .map(|data| data.key)
            .collect()
    }
}

impl NotificationHost for Document {
    fn observe_resize(&mut self, node: NodeKey) {
        if self.ids.contains_key(&node) {
            self.resize_observed.insert(node);
        }
    }

    fn unobserve_resize(&mut self, node: NodeKey) {
        self.resize_observed.remove(&node);
    }

    fn add_load_listener(&mut self, image: NodeKey, owner: NodeKey) {
        if self.ids.contains_key(&image) {
            self.load_listeners.insert(image, owner);
        }
    }

    fn remove_load_listener(&mut self, image: NodeKey) {
        self.load_listeners.remove(&image);
    }
}

/// Parse a CSS pixel length such as `"120px"` or `"12.5 px"`.
pub fn parse_px(value: &str) -> Option<f32> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

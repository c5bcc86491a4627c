use crate::document::Document;
use crate::error::{BridgeError, Result};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Handle to a node. Goes stale once the node is removed, even if its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            style: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Supports tag names and compound class selectors (`div`, `.a`, `.a.b`, `div.a`).
    fn matches(&self, selector: &str) -> bool {
        let mut parts = selector.split('.');
        let tag = parts.next().unwrap_or_default();
        if !tag.is_empty() && tag != self.tag {
            return false;
        }
        parts.all(|class| !class.is_empty() && self.classes.iter().any(|c| c == class))
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// Node storage with slot reuse, so per-frame refreshes don't grow it.
#[derive(Debug, Default)]
struct Arena {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl Arena {
    fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
    }

    fn insert(&mut self, data: NodeData) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.data = Some(data);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    data: Some(data),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    /// Free `id` and every node below it.
    fn release_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.slots.get_mut(id.index) else {
                continue;
            };
            if slot.generation != id.generation {
                continue;
            }
            if let Some(data) = slot.data.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                stack.extend(data.children);
            }
        }
    }

    fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

/// Headless document tree with a manual clock for deferred removals.
///
/// Unlike a browser DOM, `remove` drops the subtree outright: ids into it go
/// stale and read back as empty.
pub struct MemoryDocument {
    nodes: RefCell<Arena>,
    root: NodeId,
    now_ms: Cell<u64>,
    pending_removals: RefCell<Vec<(u64, NodeId)>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        let mut arena = Arena::default();
        let root = arena.insert(NodeData::new("body"));
        Self {
            nodes: RefCell::new(arena),
            root,
            now_ms: Cell::new(0),
            pending_removals: RefCell::new(Vec::new()),
        }
    }

    /// Page layout produced by the game's UI: play area with player,
    /// score panels, menu overlay and hidden game-over overlay.
    pub fn game_page() -> Self {
        let doc = Self::new();
        let body = doc.root();

        let container = doc.append_new(body, "div", "game-container");
        let area = doc.append_new(container, "div", "game-area");
        doc.append_new(area, "div", "player running");

        let ui = doc.append_new(body, "div", "game-ui");
        for (class, initial) in [
            ("distance-value", "0m"),
            ("coins-value", "0"),
            ("speed-value", "2.0x"),
            ("score-value", "0"),
            ("high-score-value", "0"),
        ] {
            let label = doc.append_new(ui, "span", class);
            doc.set_text(&label, initial);
        }

        let menu = doc.append_new(body, "div", "game-menu");
        doc.set_style_value(menu, "display", "block");

        let game_over = doc.append_new(body, "div", "game-over-screen");
        doc.set_style_value(game_over, "display", "none");
        for (class, initial) in [
            ("final-score-value", "0"),
            ("final-distance-value", "0m"),
            ("final-coins-value", "0"),
        ] {
            let label = doc.append_new(game_over, "span", class);
            doc.set_text(&label, initial);
        }

        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create an element with `class_name` and attach it under `parent`.
    pub fn append_new(&self, parent: NodeId, tag: &str, class_name: &str) -> NodeId {
        let id = self.alloc(tag);
        self.set_class_name(&id, class_name);
        self.attach(parent, id);
        id
    }

    fn read<R: Default>(&self, node: NodeId, f: impl FnOnce(&NodeData) -> R) -> R {
        self.nodes.borrow().get(node).map(f).unwrap_or_default()
    }

    pub fn class_name(&self, node: NodeId) -> String {
        self.read(node, |n| n.classes.join(" "))
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.read(node, |n| n.tag.clone())
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.read(node, |n| n.style.get(property).cloned())
    }

    pub fn text(&self, node: NodeId) -> String {
        self.read(node, |n| n.text.clone())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.read(node, |n| n.parent)
    }

    /// Text of the first element matching `selector`, if any.
    pub fn text_of(&self, selector: &str) -> Option<String> {
        self.query(selector).map(|node| self.text(node))
    }

    /// Number of connected elements matching `selector`.
    pub fn count(&self, selector: &str) -> usize {
        self.query_all_in(&self.root, selector).len()
    }

    /// Nodes currently held, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().live()
    }

    /// Slots ever allocated; only grows when no freed slot is available.
    pub fn slot_count(&self) -> usize {
        self.nodes.borrow().slots.len()
    }

    /// Whether `node` is still reachable from the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match nodes.get(current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    pub fn pending_removals(&self) -> usize {
        self.pending_removals.borrow().len()
    }

    /// Move the clock forward and run removals that have come due.
    pub fn advance(&self, ms: u64) {
        let now = self.now_ms.get() + ms;
        self.now_ms.set(now);

        let due: Vec<NodeId> = {
            let mut pending = self.pending_removals.borrow_mut();
            let (due, later): (Vec<_>, Vec<_>) =
                pending.drain(..).partition(|(at, _)| *at <= now);
            *pending = later;
            due.into_iter().map(|(_, node)| node).collect()
        };

        for node in due {
            self.remove(&node);
        }
    }

    fn set_style_value(&self, node: NodeId, property: &str, value: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(node) {
            n.style.insert(property.to_string(), value.to_string());
        }
    }

    fn alloc(&self, tag: &str) -> NodeId {
        self.nodes.borrow_mut().insert(NodeData::new(tag))
    }

    fn attach(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        if nodes.get(parent).is_none() {
            return;
        }
        if let Some(c) = nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        if let Some(p) = nodes.get_mut(parent) {
            p.children.push(child);
        }
    }

    fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        let Some(parent) = nodes.get_mut(node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = nodes.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
    }

    fn collect_matches(&self, scope: NodeId, selector: &str, out: &mut Vec<NodeId>) {
        let nodes = self.nodes.borrow();
        let Some(scope) = nodes.get(scope) else {
            return;
        };
        let mut stack: Vec<NodeId> = scope.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = nodes.get(id) else {
                continue;
            };
            if node.matches(selector) {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_in(&self.root, selector)
    }

    fn query_in(&self, scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.query_all_in(scope, selector).into_iter().next()
    }

    fn query_all_in(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_matches(*scope, selector, &mut out);
        out
    }

    fn create_element(&self, tag: &str) -> Result<NodeId> {
        Ok(self.alloc(tag))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<()> {
        {
            let nodes = self.nodes.borrow();
            if nodes.get(*parent).is_none() || nodes.get(*child).is_none() {
                return Err(BridgeError::Dom("append with a removed node".into()));
            }
        }
        self.attach(*parent, *child);
        Ok(())
    }

    fn remove(&self, node: &NodeId) {
        if *node == self.root {
            return;
        }
        self.detach(*node);
        self.nodes.borrow_mut().release_subtree(*node);
    }

    fn set_class_name(&self, node: &NodeId, class_name: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(*node) {
            n.classes = class_name.split_whitespace().map(str::to_string).collect();
        }
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) -> Result<()> {
        self.set_style_value(*node, property, value);
        Ok(())
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(*node) {
            n.text = text.to_string();
        }
    }

    fn remove_after(&self, node: NodeId, delay_ms: u32) {
        let due = self.now_ms.get() + u64::from(delay_ms);
        self.pending_removals.borrow_mut().push((due, node));
    }
}

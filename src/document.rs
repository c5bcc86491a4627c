use crate::error::Result;

/// Trait that abstracts the page the bridge writes into.
/// This allows for different backends (browser DOM, in-memory tree, etc.)
///
/// Methods take `&self`: both backends are handles onto a tree that lives
/// elsewhere, and mutation happens through them.
pub trait Document {
    type Node: Clone;

    /// First element in the document matching `selector`.
    fn query(&self, selector: &str) -> Option<Self::Node>;

    /// First descendant of `scope` matching `selector`.
    fn query_in(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// All descendants of `scope` matching `selector`, in document order.
    fn query_all_in(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Node>;

    fn create_element(&self, tag: &str) -> Result<Self::Node>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<()>;

    /// Detach `node` from the tree. The node must not be reused afterwards.
    fn remove(&self, node: &Self::Node);

    /// Replace the full class list.
    fn set_class_name(&self, node: &Self::Node, class_name: &str);

    fn set_style(&self, node: &Self::Node, property: &str, value: &str) -> Result<()>;

    fn set_text(&self, node: &Self::Node, text: &str);

    /// Detach `node` once `delay_ms` has elapsed. Fire-and-forget.
    fn remove_after(&self, node: Self::Node, delay_ms: u32);
}

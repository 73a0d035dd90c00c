use crate::NodeKey;

/// Measurement and style access used by a layout pass.
///
/// Every method tolerates unknown keys: reads return `None` or an empty list,
/// writes are dropped. A layout pass over a detached node is a no-op rather
/// than an error.
pub trait LayoutHost {
    /// Whether `node` is currently attached to the tree.
    fn contains(&self, node: NodeKey) -> bool;

    /// Rendered width of `node` in pixels.
    fn width(&self, node: NodeKey) -> Option<f32>;

    /// Rendered height of `node` in pixels, measured with the current styles.
    fn height(&self, node: NodeKey) -> Option<f32>;

    /// Element children of `node` in document order.
    fn children(&self, node: NodeKey) -> Vec<NodeKey>;

    /// Set one inline style property on `node`.
    fn set_style(&mut self, node: NodeKey, property: &str, value: &str);

    /// Descendant images of `node` whose natural size is not known yet.
    fn pending_images(&self, node: NodeKey) -> Vec<NodeKey>;
}

/// Registration surface for resize and image-load notifications.
pub trait NotificationHost {
    /// Start reporting width changes of `node`.
    fn observe_resize(&mut self, node: NodeKey);

    /// Stop reporting width changes of `node`.
    fn unobserve_resize(&mut self, node: NodeKey);

    /// Report completion of `image` on behalf of the container `owner`.
    fn add_load_listener(&mut self, image: NodeKey, owner: NodeKey);

    /// Drop the load listener registered for `image`.
    fn remove_load_listener(&mut self, image: NodeKey);
}

//! Greedy shortest-column reflow.
//!
//! Items are visited in document order. Each goes to the column that is
//! currently shortest (lowest index on ties), is positioned at that column's
//! accumulated height, and then grows the column by its measured height plus
//! the gap. The pass is order-dependent and does not look ahead.
//!
//! Every column receives an item once there are at least as many items as
//! columns, except when the gap is 0 and items have no height (e.g. images
//! that have not loaded): all columns then tie at 0 and every item lands in
//! column 0 until a later reflow sees real heights.

use log::debug;
use masonry_dom::{LayoutHost, NodeKey};

use crate::columns::ColumnState;
use crate::config::LayoutConfig;

/// Transition applied to every item so reflows animate.
pub const ITEM_TRANSITION: &str =
    "transform 0.3s ease-out, width 0.3s ease-out, left 0.3s ease-out, top 0.3s ease-out";

/// Final position of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<NodeId = NodeKey> {
    /// Item identifier
    pub node: NodeId,
    /// Column index in `[0, column_count)`
    pub column: usize,
    /// Offset from the container's left edge
    pub left: f32,
    /// Offset from the container's top edge
    pub top: f32,
    /// Item width (same for every item in a pass)
    pub width: f32,
    /// Measured item height
    pub height: f32,
}

/// Result of one reflow pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflowOutcome<NodeId = NodeKey> {
    /// Resolved column count
    pub column_count: usize,
    /// Width applied to every item
    pub item_width: f32,
    /// Placements in document order
    pub placements: Vec<Placement<NodeId>>,
    /// Accumulated height of each column, gap included
    pub column_heights: Vec<f32>,
    /// Height given to the container
    pub container_height: f32,
}

/// Where the next item goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Target column
    pub column: usize,
    /// Left offset of that column
    pub left: f32,
    /// Current height of that column
    pub top: f32,
}

/// State of a single in-progress reflow.
#[derive(Debug, Clone)]
pub struct MasonryPass {
    gap: f32,
    item_width: f32,
    columns: ColumnState,
}

impl MasonryPass {
    /// Start a pass for a container of `container_width` pixels.
    pub fn new(container_width: f32, config: &LayoutConfig) -> Self {
        let column_count = config.resolve_columns(container_width);
        Self {
            gap: config.gap(),
            item_width: config.item_width(container_width, column_count),
            columns: ColumnState::new(column_count),
        }
    }

    /// Column count of this pass.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Width applied to every item.
    pub fn item_width(&self) -> f32 {
        self.item_width
    }

    /// Slot the next item would occupy.
    pub fn next_slot(&self) -> Slot {
        let (column, top) = self.columns.shortest();
        Slot {
            column,
            left: column as f32 * (self.item_width + self.gap),
            top,
        }
    }

    /// Record an item of `height` placed in `column`.
    pub fn commit(&mut self, column: usize, height: f32) {
        self.columns.place(column, height, self.gap);
    }

    /// Close the pass over the collected placements.
    pub fn finish<NodeId>(self, placements: Vec<Placement<NodeId>>) -> ReflowOutcome<NodeId> {
        ReflowOutcome {
            column_count: self.columns.len(),
            item_width: self.item_width,
            placements,
            column_heights: self.columns.heights().to_vec(),
            container_height: self.columns.max_height(),
        }
    }
}

/// Run the greedy pass over pre-measured `heights`.
///
/// Placements are keyed by item index. No host is involved, so heights that
/// depend on the item width must be measured by the caller beforehand.
pub fn layout_heights(
    container_width: f32,
    heights: &[f32],
    config: &LayoutConfig,
) -> ReflowOutcome<usize> {
    let mut pass = MasonryPass::new(container_width, config);
    let mut placements = Vec::with_capacity(heights.len());
    for (node, &height) in heights.iter().enumerate() {
        let slot = pass.next_slot();
        pass.commit(slot.column, height);
        placements.push(Placement {
            node,
            column: slot.column,
            left: slot.left,
            top: slot.top,
            width: pass.item_width(),
            height,
        });
    }
    pass.finish(placements)
}

/// Lay out the children of `container` in `host`.
///
/// Every child gets absolute positioning, the shared item width, border-box
/// sizing, zero margin, and a transition; its height is measured after the
/// width is applied. The container then gets `position: relative` and the
/// height of its tallest column.
///
/// Returns `None` without touching any style when the container is missing
/// or has no children.
pub fn reflow<H>(host: &mut H, container: NodeKey, config: &LayoutConfig) -> Option<ReflowOutcome>
where
    H: LayoutHost + ?Sized,
{
    let Some(container_width) = host.width(container) else {
        debug!("reflow skipped: {container} is not attached");
        return None;
    };
    let children = host.children(container);
    if children.is_empty() {
        debug!("reflow skipped: {container} has no children");
        return None;
    }

    let mut pass = MasonryPass::new(container_width, config);
    let width_px = px(pass.item_width());
    let mut placements = Vec::with_capacity(children.len());

    for child in children {
        let slot = pass.next_slot();
        host.set_style(child, "position", "absolute");
        host.set_style(child, "width", &width_px);
        host.set_style(child, "box-sizing", "border-box");
        host.set_style(child, "margin", "0");
        host.set_style(child, "transition", ITEM_TRANSITION);
        host.set_style(child, "left", &px(slot.left));
        host.set_style(child, "top", &px(slot.top));

        let height = host.height(child).unwrap_or(0.0);
        pass.commit(slot.column, height);
        placements.push(Placement {
            node: child,
            column: slot.column,
            left: slot.left,
            top: slot.top,
            width: pass.item_width(),
            height,
        });
    }

    let outcome = pass.finish(placements);
    host.set_style(container, "height", &px(outcome.container_height));
    host.set_style(container, "position", "relative");
    debug!(
        "reflowed {container}: width={container_width} columns={} items={} height={}",
        outcome.column_count,
        outcome.placements.len(),
        outcome.container_height
    );
    Some(outcome)
}

fn px(value: f32) -> String {
    format!("{value}px")
}

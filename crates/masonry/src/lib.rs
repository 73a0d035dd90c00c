//! Masonry ("waterfall") layout for absolutely positioned cards.
//!
//! A container's children are distributed over a responsive number of
//! equal-width columns. Each child goes to the currently shortest column, and
//! the container is sized to its tallest column. Reflows rerun when the
//! container resizes or an image inside it finishes loading, coalesced to one
//! per container per frame.

// Breakpoints, column counts and gap
mod config;
pub use config::{Breakpoint, DEFAULT_BREAKPOINTS, DEFAULT_COLUMNS, DEFAULT_GAP, LayoutConfig, MAX_COLUMNS};

// Per-pass column heights
mod columns;
pub use columns::ColumnState;

// Greedy shortest-column reflow
mod engine;
pub use engine::{
    ITEM_TRANSITION, MasonryPass, Placement, ReflowOutcome, Slot, layout_heights, reflow,
};

// Frame coalescing
mod scheduler;
pub use scheduler::FrameScheduler;

// Widget lifecycle
mod injector;
pub use injector::{ContainerState, WaterfallInjector};

// Editor properties
mod props;
pub use props::WaterfallProps;

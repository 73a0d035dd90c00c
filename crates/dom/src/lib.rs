//! Layout-host boundary for the waterfall layout.
//!
//! Layout code never talks to a concrete document. It reads measurements and
//! writes inline styles through [`LayoutHost`], and registers for resize and
//! image-load notifications through [`NotificationHost`]. Notifications are
//! delivered as typed [`LayoutEvent`] values to a [`LayoutSubscriber`].
//!
//! [`Document`] is an in-memory host used by tests and by embedders that
//! mirror a real document tree.

use core::fmt;

/// Host traits consumed by the layout engine.
mod host;
pub use host::{LayoutHost, NotificationHost};

/// Typed notifications and their subscriber trait.
mod events;
pub use events::{LayoutEvent, LayoutSubscriber};

/// In-memory document implementing both host traits.
mod document;
pub use document::{Document, NodeKind, parse_px};

/// A stable key identifying a node in a layout host.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The root node key (always present).
    pub const ROOT: Self = Self(0);
}

impl fmt::Display for NodeKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

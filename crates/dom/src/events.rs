use anyhow::Error;

use crate::NodeKey;

/// A notification emitted by a layout host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent {
    /// An observed node changed width.
    Resized { node: NodeKey },
    /// An image finished loading; `owner` is the container that listened for it.
    ImageLoaded { image: NodeKey, owner: NodeKey },
}

impl LayoutEvent {
    /// The node whose layout the event invalidates.
    pub fn target(self) -> NodeKey {
        match self {
            Self::Resized { node } => node,
            Self::ImageLoaded { owner, .. } => owner,
        }
    }
}

/// Receiver side of host notifications.
pub trait LayoutSubscriber {
    /// Handle a single notification.
    ///
    /// # Errors
    /// Returns an error if the subscriber cannot process the event.
    fn handle_event(&mut self, event: LayoutEvent) -> Result<(), Error>;
}

//! Per-frame coalescing of reflow requests.

use std::collections::HashSet;

use masonry_dom::NodeKey;

/// Coalesces reflow requests so each container reflows at most once per frame.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: Vec<NodeKey>,
    queued: HashSet<NodeKey>,
}

impl FrameScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reflow of `container` for the next frame.
    ///
    /// Returns `false` if one is already queued.
    pub fn request(&mut self, container: NodeKey) -> bool {
        if !self.queued.insert(container) {
            tracing::trace!("reflow of {container} already queued");
            return false;
        }
        self.pending.push(container);
        true
    }

    /// Drop a queued reflow of `container`.
    pub fn cancel(&mut self, container: NodeKey) {
        if self.queued.remove(&container) {
            self.pending.retain(|queued| *queued != container);
        }
    }

    /// Whether a reflow of `container` is queued.
    pub fn is_pending(&self, container: NodeKey) -> bool {
        self.queued.contains(&container)
    }

    /// Number of queued containers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take this frame's containers in request order.
    pub fn take_frame(&mut self) -> Vec<NodeKey> {
        self.queued.clear();
        let frame = core::mem::take(&mut self.pending);
        if !frame.is_empty() {
            tracing::debug!("frame with {} pending reflows", frame.len());
        }
        frame
    }

    /// Drop every queued reflow.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.queued.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces_repeated_requests() {
        let mut scheduler = FrameScheduler::new();
        assert!(scheduler.request(NodeKey(3)));
        assert!(scheduler.request(NodeKey(1)));
        assert!(!scheduler.request(NodeKey(3)));
        assert_eq!(scheduler.len(), 2);

        assert_eq!(scheduler.take_frame(), vec![NodeKey(3), NodeKey(1)]);
        assert!(scheduler.is_empty());
        assert!(scheduler.request(NodeKey(3)));
    }

    #[test]
    fn cancel_removes_pending_request() {
        let mut scheduler = FrameScheduler::new();
        scheduler.request(NodeKey(1));
        scheduler.request(NodeKey(2));
        scheduler.cancel(NodeKey(1));
        scheduler.cancel(NodeKey(9));

        assert!(!scheduler.is_pending(NodeKey(1)));
        assert!(scheduler.is_pending(NodeKey(2)));
        assert_eq!(scheduler.take_frame(), vec![NodeKey(2)]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut scheduler = FrameScheduler::new();
        scheduler.request(NodeKey(1));
        scheduler.clear();
        assert!(scheduler.take_frame().is_empty());
    }
}

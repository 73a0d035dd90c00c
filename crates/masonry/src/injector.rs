//! Waterfall widget lifecycle: attach to containers, react to notifications,
//! and detach.

use std::collections::HashMap;

use anyhow::{Error, Result};
use log::{debug, info};
use masonry_dom::{LayoutEvent, LayoutHost, LayoutSubscriber, NodeKey, NotificationHost};
use tokio::sync::mpsc;

use crate::config::LayoutConfig;
use crate::engine::{ReflowOutcome, reflow};
use crate::scheduler::FrameScheduler;

/// Per-container record kept by the injector.
#[derive(Debug, Default)]
pub struct ContainerState {
    images: Vec<NodeKey>,
    last: Option<ReflowOutcome>,
    reflows: u64,
}

impl ContainerState {
    /// Images still being waited on.
    pub fn pending_images(&self) -> &[NodeKey] {
        &self.images
    }

    /// Outcome of the most recent reflow that had children to place.
    pub fn last_outcome(&self) -> Option<&ReflowOutcome> {
        self.last.as_ref()
    }

    /// Number of reflows run for this container.
    pub fn reflow_count(&self) -> u64 {
        self.reflows
    }

    fn record(&mut self, outcome: Option<ReflowOutcome>) {
        self.reflows += 1;
        if outcome.is_some() {
            self.last = outcome;
        }
    }
}

/// Keeps a set of containers laid out as a waterfall.
///
/// Attaching runs an immediate reflow, observes the container's width, and
/// listens for every image inside it that has not loaded yet. Notifications
/// only queue work; [`WaterfallInjector::run_frame`] performs at most one
/// reflow per container.
#[derive(Debug)]
pub struct WaterfallInjector {
    config: LayoutConfig,
    enabled: bool,
    attached: Vec<NodeKey>,
    containers: HashMap<NodeKey, ContainerState>,
    scheduler: FrameScheduler,
}

impl WaterfallInjector {
    /// Create an enabled injector with no containers.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            enabled: true,
            attached: Vec::new(),
            containers: HashMap::new(),
            scheduler: FrameScheduler::new(),
        }
    }

    /// Builder-style variant of [`WaterfallInjector::set_enabled`] for an
    /// injector with nothing attached yet.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Whether the injector lays anything out.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Containers handed to [`WaterfallInjector::attach`], in order.
    pub fn attached(&self) -> &[NodeKey] {
        &self.attached
    }

    /// State of a connected container.
    pub fn container(&self, node: NodeKey) -> Option<&ContainerState> {
        self.containers.get(&node)
    }

    /// Whether a reflow of `node` is queued for the next frame.
    pub fn is_pending(&self, node: NodeKey) -> bool {
        self.scheduler.is_pending(node)
    }

    /// Attach to `containers` and lay each one out.
    ///
    /// While disabled the containers are only remembered. Missing containers
    /// are skipped. Returns the number of containers connected by this call.
    pub fn attach<H>(&mut self, host: &mut H, containers: &[NodeKey]) -> usize
    where
        H: LayoutHost + NotificationHost + ?Sized,
    {
        let mut connected = 0;
        for &container in containers {
            if !self.attached.contains(&container) {
                self.attached.push(container);
            }
            if self.enabled && self.connect(host, container) {
                connected += 1;
            }
        }
        connected
    }

    fn connect<H>(&mut self, host: &mut H, container: NodeKey) -> bool
    where
        H: LayoutHost + NotificationHost + ?Sized,
    {
        if !host.contains(container) {
            debug!("waterfall container {container} is not in the document");
            return false;
        }
        if let Some(state) = self.containers.get_mut(&container) {
            state.record(reflow(host, container, &self.config));
            return false;
        }

        let mut state = ContainerState::default();
        state.record(reflow(host, container, &self.config));
        host.observe_resize(container);
        state.images = host.pending_images(container);
        for &image in &state.images {
            host.add_load_listener(image, container);
        }
        debug!(
            "attached {container}, waiting on {} images",
            state.images.len()
        );
        self.containers.insert(container, state);
        true
    }

    fn disconnect<H>(&mut self, host: &mut H, container: NodeKey)
    where
        H: NotificationHost + ?Sized,
    {
        self.scheduler.cancel(container);
        let Some(state) = self.containers.remove(&container) else {
            return;
        };
        host.unobserve_resize(container);
        for image in state.images {
            host.remove_load_listener(image);
        }
    }

    /// Reflow every queued container once. Returns the number of reflows run.
    ///
    /// Containers no longer in the document are disconnected and forgotten
    /// instead of reflowed.
    pub fn run_frame<H>(&mut self, host: &mut H) -> usize
    where
        H: LayoutHost + NotificationHost + ?Sized,
    {
        let frame = self.scheduler.take_frame();
        let mut reflowed = 0;
        for container in frame {
            if !host.contains(container) {
                debug!("dropping waterfall container {container}, it left the document");
                self.disconnect(host, container);
                self.attached.retain(|attached| *attached != container);
                continue;
            }
            let Some(state) = self.containers.get_mut(&container) else {
                continue;
            };
            state.record(reflow(host, container, &self.config));
            reflowed += 1;
        }
        reflowed
    }

    /// Drain queued notifications from `events`, then run one frame.
    ///
    /// # Errors
    /// Returns an error if handling a notification fails.
    pub fn pump<H>(
        &mut self,
        host: &mut H,
        events: &mut mpsc::UnboundedReceiver<LayoutEvent>,
    ) -> Result<usize>
    where
        H: LayoutHost + NotificationHost + ?Sized,
    {
        while let Ok(event) = events.try_recv() {
            self.handle_event(event)?;
        }
        Ok(self.run_frame(host))
    }

    /// Replace the configuration and lay every connected container out again.
    pub fn set_config<H>(&mut self, host: &mut H, config: LayoutConfig)
    where
        H: LayoutHost + ?Sized,
    {
        self.config = config;
        for &container in &self.attached {
            if let Some(state) = self.containers.get_mut(&container) {
                self.scheduler.cancel(container);
                state.record(reflow(host, container, &self.config));
            }
        }
    }

    /// Enable or disable the layout.
    ///
    /// Disabling disconnects every container but remembers them; enabling
    /// connects them again with a fresh reflow.
    pub fn set_enabled<H>(&mut self, host: &mut H, enabled: bool)
    where
        H: LayoutHost + NotificationHost + ?Sized,
    {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        let containers = self.attached.clone();
        if enabled {
            self.attach(host, &containers);
        } else {
            for container in containers {
                self.disconnect(host, container);
            }
        }
        info!("waterfall layout {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Stop observing every container and forget them.
    ///
    /// Inline styles written by earlier reflows are left in place.
    pub fn detach<H>(&mut self, host: &mut H)
    where
        H: NotificationHost + ?Sized,
    {
        for container in core::mem::take(&mut self.attached) {
            self.disconnect(host, container);
        }
        self.containers.clear();
        self.scheduler.clear();
    }
}

impl Default for WaterfallInjector {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutSubscriber for WaterfallInjector {
    fn handle_event(&mut self, event: LayoutEvent) -> Result<(), Error> {
        if let LayoutEvent::ImageLoaded { image, owner } = event {
            if let Some(state) = self.containers.get_mut(&owner) {
                state.images.retain(|waiting| *waiting != image);
            }
        }
        let container = event.target();
        if self.containers.contains_key(&container) {
            self.scheduler.request(container);
        } else {
            tracing::trace!("ignoring {event:?} for unattached {container}");
        }
        Ok(())
    }
}

//! Editor notification events.
//!
//! The editor publishes these to registered listeners after every state
//! change. Delivery is synchronous and happens on the same thread that
//! mutated the editor.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Rect, Size};
use crate::ids::NodeId;

/// Ticket identifying an asynchronous resource request.
///
/// `session` is the editor session that issued the request and
/// `generation` distinguishes successive requests within the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadTicket {
    pub session: Uuid,
    pub generation: u64,
}

impl std::fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", &self.session.to_string()[..8], self.generation)
    }
}

/// Notification emitted by the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    /// The selected node set changed
    SelectionChanged { old: Vec<NodeId>, new: Vec<NodeId> },
    /// The super-selection path changed
    SuperSelectionChanged { old: Vec<NodeId>, new: Vec<NodeId> },
    /// Part of the document needs repainting. `None` means everything.
    RepaintRequested { region: Option<Rect> },
    /// The first undoable change of a transaction was recorded
    UndoTransactionOpened { title: String },
    /// A transaction was committed to the undo stack
    UndoTransactionCommitted { title: String, changes: usize },
    /// The document's active page changed
    ActivePageChanged { old: Option<NodeId>, new: NodeId },
    /// An image node needs its source loaded by the host
    ImageLoadRequested {
        ticket: LoadTicket,
        node: NodeId,
        source: String,
    },
    /// Host finished loading an image
    ImageLoaded { node: NodeId, size: Size },
}

impl EditorEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            EditorEvent::SelectionChanged { .. } | EditorEvent::SuperSelectionChanged { .. } => {
                EventCategory::Selection
            }
            EditorEvent::RepaintRequested { .. } => EventCategory::Repaint,
            EditorEvent::UndoTransactionOpened { .. }
            | EditorEvent::UndoTransactionCommitted { .. } => EventCategory::Undo,
            EditorEvent::ActivePageChanged { .. }
            | EditorEvent::ImageLoadRequested { .. }
            | EditorEvent::ImageLoaded { .. } => EventCategory::Document,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            EditorEvent::SelectionChanged { old, new } => {
                format!("Selection: {} -> {} node(s)", old.len(), new.len())
            }
            EditorEvent::SuperSelectionChanged { new, .. } => match new.last() {
                Some(node) => format!("Super-selected {} (depth {})", node, new.len()),
                None => "Super-selection cleared".to_string(),
            },
            EditorEvent::RepaintRequested { region: Some(r) } => format!(
                "Repaint {:.1},{:.1} {:.1}x{:.1}",
                r.x, r.y, r.width, r.height
            ),
            EditorEvent::RepaintRequested { region: None } => "Repaint all".to_string(),
            EditorEvent::UndoTransactionOpened { title } => format!("Undo opened: {}", title),
            EditorEvent::UndoTransactionCommitted { title, changes } => {
                format!("Undo committed: {} ({} changes)", title, changes)
            }
            EditorEvent::ActivePageChanged { new, .. } => format!("Active page: {}", new),
            EditorEvent::ImageLoadRequested { node, source, .. } => {
                format!("Load image for {}: {}", node, source)
            }
            EditorEvent::ImageLoaded { node, size } => {
                format!("Image loaded for {}: {}x{}", node, size.width, size.height)
            }
        }
    }
}

impl std::fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Selection and super-selection events.
    Selection,
    /// Repaint requests.
    Repaint,
    /// Undo transaction events.
    Undo,
    /// Page and resource events.
    Document,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Repaint => write!(f, "Repaint"),
            EventCategory::Undo => write!(f, "Undo"),
            EventCategory::Document => write!(f, "Document"),
        }
    }
}

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &EditorEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Box<dyn FnMut(&EditorEvent)>;

/// Synchronous, single-threaded event dispatcher. Handlers run in
/// subscription order.
pub struct EventDispatcher {
    handlers: Vec<(SubscriptionId, EventFilter, EventHandler)>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler; returns an id for `unsubscribe`
    pub fn subscribe<F>(&mut self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.push((id, filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _, _)| *sid != id);
        let removed = self.handlers.len() != before;
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Deliver an event to every matching handler
    pub fn publish(&mut self, event: EditorEvent) {
        tracing::trace!(category = %event.category(), "{}", event.description());
        for (_, filter, handler) in self.handlers.iter_mut() {
            if filter.matches(&event) {
                handler(&event);
            }
        }
    }
}

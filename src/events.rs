use super::*;

/// Listener behavior as data; the page executes it during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Handler {
    FragmentSync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Listener {
    pub(crate) capture: bool,
    pub(crate) handler: Handler,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    /// Registers a listener. An identical (event, capture, handler)
    /// registration is ignored, as `addEventListener` ignores duplicates.
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, listener: Listener) -> bool {
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default();
        if listeners.contains(&listener) {
            return false;
        }
        listeners.push(listener);
        true
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
        }
    }
}

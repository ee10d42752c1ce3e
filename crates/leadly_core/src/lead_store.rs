use leadly_logging::leadly_debug;

use crate::view_model::LeadsView;
use crate::Lead;

/// Identifies one lead-list refresh request.
pub type RefreshTicket = u64;

/// How overlapping refresh responses are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Only the response to the most recently issued refresh is applied.
    #[default]
    LatestRequest,
    /// Whichever response arrives last replaces the collection.
    LastResponse,
}

/// Most recently fetched leads. Replaced wholesale on every applied refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeadStore {
    policy: RefreshPolicy,
    items: Vec<Lead>,
    loaded: bool,
    last_ticket: RefreshTicket,
    in_flight: usize,
    notice: Option<String>,
}

impl LeadStore {
    pub fn new(policy: RefreshPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[Lead] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub(crate) fn begin_refresh(&mut self) -> RefreshTicket {
        self.last_ticket += 1;
        self.in_flight += 1;
        self.last_ticket
    }

    /// Applies a fetched list. Returns false when the response was discarded.
    pub(crate) fn apply_loaded(&mut self, ticket: RefreshTicket, leads: Vec<Lead>) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.is_superseded(ticket) {
            leadly_debug!(
                "Discarding lead list for ticket {} (latest is {})",
                ticket,
                self.last_ticket
            );
            return false;
        }
        self.items = leads;
        self.loaded = true;
        self.notice = None;
        true
    }

    /// Records a failed refresh. The held collection is left unchanged.
    pub(crate) fn apply_failed(&mut self, ticket: RefreshTicket, message: String) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.is_superseded(ticket) {
            return false;
        }
        self.notice = Some(format!("Could not load leads: {message}"));
        true
    }

    fn is_superseded(&self, ticket: RefreshTicket) -> bool {
        match self.policy {
            RefreshPolicy::LatestRequest => ticket != self.last_ticket,
            RefreshPolicy::LastResponse => false,
        }
    }

    pub(crate) fn view(&self) -> LeadsView {
        LeadsView {
            items: self.items.clone(),
            loaded: self.loaded,
            loading: self.is_loading(),
            notice: self.notice.clone(),
        }
    }
}

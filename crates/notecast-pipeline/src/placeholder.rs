//! Placeholder allocation and resolution.
//!
//! Constructs whose final content depends on a remote service cannot be
//! rendered inside the synchronous serialization pass. A renderer instead
//! records a [`PlaceholderId`] on the token; the resolve phase fulfills the
//! id in the session's [`PlaceholderTable`] before serialization reads it.
//!
//! Serialized output wraps async content in `<span id="nc-async-N">` so a
//! caller holding an already-serialized string can still patch it via
//! [`update_element_by_id`]. Fulfilling or patching an id that no longer
//! exists is a silent no-op: a resolution arriving after the document has
//! been replaced must not touch the new output.

use std::collections::HashMap;

use tracing::debug;

/// Unique placeholder id within one render session.
///
/// Ids are allocated from a monotonic counter that resets per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderId(u32);

impl PlaceholderId {
    /// Raw counter value.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// The `id` attribute used for this placeholder in serialized output.
    #[must_use]
    pub fn element_id(self) -> String {
        format!("nc-async-{}", self.0)
    }
}

/// Result of a remote render job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// Markup returned by the remote service.
    Rendered(String),
    /// Sentinel failure payload; rendered as inline diagnostic content so one
    /// failing fragment never loses the rest of the document.
    Failed(String),
}

#[derive(Debug)]
enum Slot {
    Pending,
    Fulfilled(RemoteOutcome),
}

/// Session-scoped table mapping placeholder ids to resolution state.
#[derive(Debug, Default)]
pub struct PlaceholderTable {
    next: u32,
    slots: HashMap<u32, Slot>,
}

impl PlaceholderTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id in pending state.
    pub fn allocate(&mut self) -> PlaceholderId {
        let id = PlaceholderId(self.next);
        self.next += 1;
        self.slots.insert(id.0, Slot::Pending);
        id
    }

    /// Fulfill a placeholder with a remote outcome.
    ///
    /// Unknown ids (allocated by a superseded session) are ignored.
    pub fn fulfill(&mut self, id: PlaceholderId, outcome: RemoteOutcome) {
        match self.slots.get_mut(&id.0) {
            Some(slot) => *slot = Slot::Fulfilled(outcome),
            None => debug!(id = id.0, "dropping resolution for unknown placeholder"),
        }
    }

    /// Resolution for `id`, or `None` while still pending.
    #[must_use]
    pub fn get(&self, id: PlaceholderId) -> Option<&RemoteOutcome> {
        match self.slots.get(&id.0) {
            Some(Slot::Fulfilled(outcome)) => Some(outcome),
            _ => None,
        }
    }

    /// Total ids allocated this session.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Ids still pending.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Pending))
            .count()
    }
}

/// Patch the inner content of `<span id="nc-async-N">...</span>` in an
/// already-serialized output string.
///
/// Returns `false` (without modifying the output) when the element is absent,
/// which happens when the output has since been replaced. The replacement
/// content must not itself contain `</span>`.
pub fn update_element_by_id(html: &mut String, id: PlaceholderId, content: &str) -> bool {
    let open = format!(r#"<span id="{}">"#, id.element_id());
    let Some(start) = html.find(&open) else {
        debug!(id = id.value(), "no element for placeholder; skipping patch");
        return false;
    };
    let inner_start = start + open.len();
    let Some(inner_len) = html[inner_start..].find("</span>") else {
        debug!(id = id.value(), "unterminated placeholder element");
        return false;
    };
    html.replace_range(inner_start..inner_start + inner_len, content);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ids_unique_and_monotonic() {
        let mut table = PlaceholderTable::new();
        let a = table.allocate();
        let b = table.allocate();
        let c = table.allocate();
        assert!(a < b && b < c);
        assert_eq!(table.allocated(), 3);
        assert_eq!(table.pending(), 3);
    }

    #[test]
    fn test_fulfill_and_get() {
        let mut table = PlaceholderTable::new();
        let id = table.allocate();
        assert_eq!(table.get(id), None);

        table.fulfill(id, RemoteOutcome::Rendered("<svg/>".to_owned()));
        assert_eq!(
            table.get(id),
            Some(&RemoteOutcome::Rendered("<svg/>".to_owned()))
        );
        assert_eq!(table.pending(), 0);
    }

    #[test]
    fn test_stale_fulfill_is_noop() {
        let mut old = PlaceholderTable::new();
        let stale = old.allocate();

        // A new session replaces the old table; the stale id is unknown to it.
        let mut fresh = PlaceholderTable::new();
        let current = fresh.allocate();
        fresh.fulfill(current, RemoteOutcome::Rendered("ok".to_owned()));

        let mut unrelated = PlaceholderTable::new();
        unrelated.fulfill(stale, RemoteOutcome::Rendered("late".to_owned()));
        assert_eq!(unrelated.allocated(), 0);
    }

    #[test]
    fn test_update_element_by_id() {
        let id = PlaceholderTable::new().allocate();
        let mut html = format!(
            r#"<p>before</p><span id="{}">pending</span><p>after</p>"#,
            id.element_id()
        );
        assert!(update_element_by_id(&mut html, id, "<svg>x</svg>"));
        assert_eq!(
            html,
            r#"<p>before</p><span id="nc-async-0"><svg>x</svg></span><p>after</p>"#
        );
    }

    #[test]
    fn test_update_element_missing_is_noop() {
        let mut table = PlaceholderTable::new();
        let _ = table.allocate();
        let stale = table.allocate();
        let mut html = "<p>replaced document</p>".to_owned();
        assert!(!update_element_by_id(&mut html, stale, "late"));
        assert_eq!(html, "<p>replaced document</p>");
    }
}

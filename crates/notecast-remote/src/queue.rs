//! Single-flight FIFO render queue with per-input caching.
//!
//! The queue mediates every call to the rate-sensitive rendering endpoint:
//! jobs drain strictly in submission order with exactly one request in
//! flight at a time, bounding load on the endpoint regardless of burst size.
//! A map from raw input text to the previously returned outcome
//! short-circuits repeats without issuing a request.

use std::collections::{HashMap, VecDeque};

use tracing::warn;

use notecast_pipeline::{
    JobKind, PlaceholderId, PlaceholderTable, RemoteOutcome, RemoteRenderer,
};

use crate::client::RenderService;

struct Job {
    kind: JobKind,
    source: String,
    placeholder: PlaceholderId,
}

/// FIFO job queue over a [`RenderService`].
pub struct RenderQueue {
    service: Box<dyn RenderService>,
    jobs: VecDeque<Job>,
    /// De-duplication cache keyed by the raw input text.
    cache: HashMap<String, RemoteOutcome>,
    requests_made: usize,
}

impl RenderQueue {
    pub fn new(service: impl RenderService + 'static) -> Self {
        Self {
            service: Box::new(service),
            jobs: VecDeque::new(),
            cache: HashMap::new(),
            requests_made: 0,
        }
    }

    /// Jobs waiting to drain.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.jobs.len()
    }

    /// Requests actually issued to the endpoint (cache misses).
    #[must_use]
    pub fn requests_made(&self) -> usize {
        self.requests_made
    }

    /// Drop cached outcomes, e.g. on a configuration change that affects
    /// rendered output.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn outcome_for(&mut self, kind: JobKind, source: &str) -> RemoteOutcome {
        if let Some(cached) = self.cache.get(source) {
            return cached.clone();
        }
        self.requests_made += 1;
        let outcome = match self.service.render(kind, source) {
            Ok(markup) => RemoteOutcome::Rendered(markup),
            Err(err) => {
                // Failure is local to one placeholder; keep draining.
                warn!(error = %err, "remote render failed");
                RemoteOutcome::Failed(err.to_string())
            }
        };
        self.cache.insert(source.to_owned(), outcome.clone());
        outcome
    }
}

impl RemoteRenderer for RenderQueue {
    fn submit(&mut self, kind: JobKind, source: &str, placeholder: PlaceholderId) {
        self.jobs.push_back(Job {
            kind,
            source: source.to_owned(),
            placeholder,
        });
    }

    /// Drain the queue in FIFO order, one request at a time, fulfilling the
    /// session's placeholder table as each job completes.
    fn resolve(&mut self, placeholders: &mut PlaceholderTable) {
        while let Some(job) = self.jobs.pop_front() {
            let outcome = self.outcome_for(job.kind, &job.source);
            placeholders.fulfill(job.placeholder, outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use std::sync::{Arc, Mutex};

    struct FakeService {
        calls: Arc<Mutex<Vec<String>>>,
        fail_on: Option<String>,
    }

    impl RenderService for FakeService {
        fn render(&self, _kind: JobKind, source: &str) -> Result<String, RemoteError> {
            self.calls.lock().unwrap().push(source.to_owned());
            if self.fail_on.as_deref() == Some(source) {
                return Err(RemoteError::HttpResponse {
                    status: 500,
                    body: "boom".to_owned(),
                });
            }
            Ok(format!("<svg>{source}</svg>"))
        }
    }

    fn queue_with_calls(fail_on: Option<&str>) -> (RenderQueue, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let queue = RenderQueue::new(FakeService {
            calls: Arc::clone(&calls),
            fail_on: fail_on.map(str::to_owned),
        });
        (queue, calls)
    }

    #[test]
    fn test_fifo_order() {
        let (mut queue, calls) = queue_with_calls(None);
        let mut table = PlaceholderTable::new();
        for source in ["a", "b", "c"] {
            let id = table.allocate();
            queue.submit(JobKind::MathInline, source, id);
        }
        queue.resolve(&mut table);
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_identical_inputs_issue_one_request() {
        let (mut queue, calls) = queue_with_calls(None);
        let mut table = PlaceholderTable::new();
        let first = table.allocate();
        let second = table.allocate();
        queue.submit(JobKind::MathInline, "x^2", first);
        queue.submit(JobKind::MathInline, "x^2", second);
        queue.resolve(&mut table);

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(queue.requests_made(), 1);
        assert_eq!(table.get(first), table.get(second));
        assert_eq!(
            table.get(first),
            Some(&RemoteOutcome::Rendered("<svg>x^2</svg>".to_owned()))
        );
    }

    #[test]
    fn test_cache_survives_sessions() {
        let (mut queue, calls) = queue_with_calls(None);
        let mut first_session = PlaceholderTable::new();
        let id = first_session.allocate();
        queue.submit(JobKind::MathBlock, "y", id);
        queue.resolve(&mut first_session);

        let mut second_session = PlaceholderTable::new();
        let id = second_session.allocate();
        queue.submit(JobKind::MathBlock, "y", id);
        queue.resolve(&mut second_session);

        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failure_is_local_and_queue_keeps_draining() {
        let (mut queue, calls) = queue_with_calls(Some("bad"));
        let mut table = PlaceholderTable::new();
        let ok_before = table.allocate();
        let failing = table.allocate();
        let ok_after = table.allocate();
        queue.submit(JobKind::Widget, "fine", ok_before);
        queue.submit(JobKind::Widget, "bad", failing);
        queue.submit(JobKind::Widget, "also fine", ok_after);
        queue.resolve(&mut table);

        assert_eq!(calls.lock().unwrap().len(), 3);
        assert!(matches!(table.get(failing), Some(RemoteOutcome::Failed(_))));
        assert!(matches!(
            table.get(ok_before),
            Some(RemoteOutcome::Rendered(_))
        ));
        assert!(matches!(
            table.get(ok_after),
            Some(RemoteOutcome::Rendered(_))
        ));
    }

    #[test]
    fn test_failures_are_cached_too() {
        let (mut queue, calls) = queue_with_calls(Some("bad"));
        let mut table = PlaceholderTable::new();
        let first = table.allocate();
        let second = table.allocate();
        queue.submit(JobKind::Widget, "bad", first);
        queue.submit(JobKind::Widget, "bad", second);
        queue.resolve(&mut table);

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(table.get(first), table.get(second));
    }

    #[test]
    fn test_clear_cache_forces_rerender() {
        let (mut queue, calls) = queue_with_calls(None);
        let mut table = PlaceholderTable::new();
        let id = table.allocate();
        queue.submit(JobKind::MathInline, "z", id);
        queue.resolve(&mut table);
        queue.clear_cache();

        let id = table.allocate();
        queue.submit(JobKind::MathInline, "z", id);
        queue.resolve(&mut table);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }
}

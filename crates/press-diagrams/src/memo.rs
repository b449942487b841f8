//! Render results shared between the backends of one request.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::chain::{DiagramChain, DiagramOutcome};

/// In-memory outcomes keyed by diagram source.
///
/// Clones share the same entries. A fallback backend reusing the memo of
/// an earlier attempt renders no diagram twice.
#[derive(Clone, Default)]
pub struct DiagramMemo {
    entries: Arc<Mutex<HashMap<String, DiagramOutcome>>>,
}

impl DiagramMemo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct sources rendered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outcomes for `sources` in input order. Sources not seen before go
    /// through `chain` in one parallel batch.
    pub fn render_all<S: AsRef<str> + Sync>(
        &self,
        chain: &DiagramChain,
        sources: &[S],
    ) -> Vec<DiagramOutcome> {
        let mut missing: Vec<&str> = Vec::new();
        {
            let entries = self.lock();
            for source in sources.iter().map(AsRef::as_ref) {
                if !entries.contains_key(source) && !missing.contains(&source) {
                    missing.push(source);
                }
            }
        }

        if missing.is_empty() {
            tracing::debug!(diagrams = sources.len(), "Reusing rendered diagrams");
        } else {
            let rendered = chain.render_all(&missing);
            let mut entries = self.lock();
            for (source, outcome) in missing.iter().zip(rendered) {
                entries.insert((*source).to_owned(), outcome);
            }
        }

        let entries = self.lock();
        sources
            .iter()
            .map(|source| {
                let source = source.as_ref();
                entries
                    .get(source)
                    .cloned()
                    .unwrap_or_else(|| chain.render(source))
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, DiagramOutcome>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for DiagramMemo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagramMemo")
            .field("entries", &self.len())
            .finish()
    }
}

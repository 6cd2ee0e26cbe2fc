use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use librarian_core::errors::{LibrarianError, LibrarianResult};
use librarian_core::models::{
    EvidenceChain, EvidenceEntry, EvidenceFilter, EvidenceId, NewEvidence,
};

use crate::chain;
use crate::guard;

type Callback = Arc<dyn Fn(&EvidenceEntry) + Send + Sync>;

struct Subscriber {
    id: u64,
    filter: EvidenceFilter,
    callback: Callback,
}

/// Append-only, queryable, subscribable evidence log.
///
/// Entries are immutable once appended and ids are assigned from an atomic
/// sequence, so id order agrees with insertion order. Subscriber callbacks
/// run synchronously inside `append`, after the entry is stored and with no
/// internal lock held — a callback may safely re-enter the ledger (append,
/// query, unsubscribe).
pub struct EvidenceLedger {
    entries: Mutex<Vec<EvidenceEntry>>,
    index: DashMap<EvidenceId, usize>,
    next_id: AtomicU64,
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    next_subscriber_id: AtomicU64,
}

impl EvidenceLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            index: DashMap::new(),
            next_id: AtomicU64::new(1),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Append one entry: assign id + timestamp + payload hash, store, then
    /// notify matching subscribers before returning. Notification is part of
    /// the append operation, not deferred, so a triggered subscriber always
    /// sees a ledger that already contains the triggering entry.
    pub fn append(&self, new: NewEvidence) -> LibrarianResult<EvidenceEntry> {
        guard::check_new_entry(&new)?;

        let payload_hash = blake3::hash(new.payload.to_string().as_bytes())
            .to_hex()
            .to_string();

        // Id assignment and storage share one critical section, so vec
        // position order always agrees with id order under concurrency.
        let entry = {
            let mut entries = self.entries.lock().expect("ledger lock poisoned");
            let id = EvidenceId(self.next_id.fetch_add(1, Ordering::SeqCst));
            let entry = EvidenceEntry {
                id,
                timestamp: Utc::now(),
                kind: new.kind,
                payload: new.payload,
                provenance: new.provenance,
                related_entries: new.related_entries,
                session_id: new.session_id,
                confidence: new.confidence,
                payload_hash,
            };
            self.index.insert(id, entries.len());
            entries.push(entry.clone());
            entry
        };
        debug!(id = %entry.id, kind = ?entry.kind, "evidence appended");

        // Snapshot matching callbacks, then dispatch without holding the
        // subscriber lock so callbacks can unsubscribe or re-append.
        let callbacks: Vec<Callback> = {
            let subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
            subscribers
                .iter()
                .filter(|s| s.filter.matches(&entry))
                .map(|s| Arc::clone(&s.callback))
                .collect()
        };
        for callback in callbacks {
            callback(&entry);
        }

        Ok(entry)
    }

    /// Ordered sequential application of `append`. Fails fast; entries
    /// appended before the failure stay appended (the ledger never retracts).
    pub fn append_batch(&self, batch: Vec<NewEvidence>) -> LibrarianResult<Vec<EvidenceEntry>> {
        let mut appended = Vec::with_capacity(batch.len());
        for new in batch {
            appended.push(self.append(new)?);
        }
        Ok(appended)
    }

    /// Matches in insertion order, truncated to `filter.limit`. Claim-kind
    /// results are re-checked at the read boundary.
    pub fn query(&self, filter: &EvidenceFilter) -> LibrarianResult<Vec<EvidenceEntry>> {
        let matching: Vec<EvidenceEntry> = {
            let entries = self.entries.lock().expect("ledger lock poisoned");
            let matching = entries.iter().filter(|e| filter.matches(e));
            match filter.limit {
                Some(limit) => matching.take(limit).cloned().collect(),
                None => matching.cloned().collect(),
            }
        };
        for entry in &matching {
            Self::check_claim_read(entry, "ledger.query")?;
        }
        Ok(matching)
    }

    /// Exact entry by id, or `None`. Claim-kind payloads are re-checked at
    /// the read boundary.
    pub fn get(&self, id: EvidenceId) -> LibrarianResult<Option<EvidenceEntry>> {
        let position = match self.index.get(&id) {
            Some(position) => *position,
            None => return Ok(None),
        };
        let entries = self.entries.lock().expect("ledger lock poisoned");
        let entry = entries[position].clone();
        drop(entries);
        Self::check_claim_read(&entry, "ledger.get")?;
        Ok(Some(entry))
    }

    /// All entries for a session, in insertion order.
    pub fn get_session_entries(&self, session_id: &str) -> LibrarianResult<Vec<EvidenceEntry>> {
        self.query(&EvidenceFilter {
            session_id: Some(session_id.to_string()),
            ..Default::default()
        })
    }

    fn check_claim_read(entry: &EvidenceEntry, boundary: &str) -> LibrarianResult<()> {
        if entry.kind == librarian_core::models::EvidenceKind::Claim {
            guard::check_payload(&entry.payload, boundary)?;
        }
        Ok(())
    }

    /// Reconstruct the lineage rooted at `id`: all entries reachable via
    /// `related_entries`, the AND-combined chain confidence, and any
    /// contradiction entries touching the chain.
    pub fn get_chain(&self, id: EvidenceId) -> LibrarianResult<EvidenceChain> {
        if !self.index.contains_key(&id) {
            return Err(LibrarianError::not_found("evidence entry", id.to_string()));
        }
        let entries = self.entries.lock().expect("ledger lock poisoned").clone();
        let chain = chain::reconstruct(id, &entries)?;
        for member in &chain.entries {
            Self::check_claim_read(member, "ledger.get_chain")?;
        }
        Ok(chain)
    }

    /// Register a callback for entries matching `filter`. Multiple
    /// independent subscriptions may coexist. Dropping the handle does NOT
    /// unsubscribe; call [`SubscriptionHandle::unsubscribe`].
    pub fn subscribe(
        &self,
        filter: EvidenceFilter,
        callback: impl Fn(&EvidenceEntry) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push(Subscriber {
                id,
                filter,
                callback: Arc::new(callback),
            });
        SubscriptionHandle {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("ledger lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EvidenceLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Unsubscribes the associated callback. Idempotent, and safe to call from
/// within a subscriber callback (dispatch never holds the subscriber lock).
pub struct SubscriptionHandle {
    id: u64,
    subscribers: Weak<Mutex<Vec<Subscriber>>>,
}

impl SubscriptionHandle {
    pub fn unsubscribe(&self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers
                .lock()
                .expect("subscriber lock poisoned")
                .retain(|s| s.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use librarian_core::models::{EvidenceKind, Provenance};

    fn stored_entry(kind: EvidenceKind, payload: serde_json::Value) -> EvidenceEntry {
        EvidenceEntry {
            id: EvidenceId(1),
            timestamp: Utc::now(),
            kind,
            payload,
            provenance: Provenance::new("test", "test"),
            related_entries: Vec::new(),
            session_id: None,
            confidence: None,
            payload_hash: String::new(),
        }
    }

    // The append guard normally keeps these out; the read check covers
    // entries deserialized or migrated from elsewhere.
    #[test]
    fn read_check_rejects_raw_confidence_in_stored_claim() {
        let entry = stored_entry(
            EvidenceKind::Claim,
            serde_json::json!({ "proposition": "p", "confidence": 0.7 }),
        );
        let err = EvidenceLedger::check_claim_read(&entry, "ledger.query").unwrap_err();
        assert!(err.is_d7_violation());
    }

    #[test]
    fn read_check_ignores_non_claim_kinds() {
        let entry = stored_entry(
            EvidenceKind::Outcome,
            serde_json::json!({ "confidence": 0.9 }),
        );
        assert!(EvidenceLedger::check_claim_read(&entry, "ledger.query").is_ok());
    }
}

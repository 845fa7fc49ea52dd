//! Destination-chain event cache and block-scan cursors.
//!
//! For each chain with at least one active subscriber, the tracker advances
//! a cursor from the lowest requested start height towards the chain's
//! current height, one block at a time, caching the xCall events found in
//! every scanned block (empty results included, so a block is queried at
//! most once). Lookups by `sn` then resolve a later CallExecuted event
//! through the `req_id` carried by the CallMessage event, since execution
//! events are reported under the request id rather than the sequence number.

use std::collections::{BTreeMap, HashMap};

use crate::types::{XCallEvent, XCallEventMap, XCallEventType, XChainId};

/// Per-chain scan state.
#[derive(Debug, Clone)]
pub struct ScannerState {
    /// Active subscribers and the start height each one requires.
    subscribers: BTreeMap<String, u64>,
    /// Lowest start height any subscriber requires.
    pub start_height: u64,
    /// Next block to scan. Never exceeds `chain_height`.
    pub cursor: u64,
    /// Last observed chain height (scan ceiling).
    pub chain_height: u64,
}

impl ScannerState {
    pub fn enabled(&self) -> bool {
        !self.subscribers.is_empty()
    }
}

/// Process-local cache of discovered events plus scanner cursors.
#[derive(Debug, Default)]
pub struct XCallEventStore {
    /// Events per chain, indexed by block height.
    events: HashMap<XChainId, BTreeMap<u64, Vec<XCallEvent>>>,
    scanners: HashMap<XChainId, ScannerState>,
}

impl XCallEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin (or join) scanning `chain_id` from `start_height`.
    ///
    /// Subscribers on the same chain are merged with lowest-start-wins
    /// semantics: a later subscriber never causes blocks below an earlier
    /// subscriber's start to be skipped, and a lower start moves the cursor
    /// back so the union of requested ranges is scanned.
    pub fn enable_scanner(&mut self, subscriber: &str, chain_id: &XChainId, start_height: u64) {
        let state = self
            .scanners
            .entry(chain_id.clone())
            .or_insert_with(|| ScannerState {
                subscribers: BTreeMap::new(),
                start_height,
                cursor: start_height,
                chain_height: start_height,
            });

        let was_enabled = state.enabled();
        state.subscribers.insert(subscriber.to_string(), start_height);

        let lowest = state
            .subscribers
            .values()
            .copied()
            .min()
            .unwrap_or(start_height);

        if !was_enabled {
            // Re-activation after all previous subscribers left: resume from
            // the new lowest start. Cached blocks below it are no-ops anyway.
            state.start_height = lowest;
            state.cursor = lowest;
            state.chain_height = state.chain_height.max(lowest);
        } else if lowest < state.start_height {
            state.start_height = lowest;
            state.cursor = state.cursor.min(lowest);
        }

        tracing::debug!(
            %chain_id,
            subscriber,
            start_height,
            effective_start = state.start_height,
            cursor = state.cursor,
            "Scanner enabled"
        );
    }

    /// Remove a subscriber from every chain it watches. Scanning stops on a
    /// chain once its last subscriber leaves; cached events are retained so
    /// late-arriving lookups still succeed.
    pub fn disable_scanner(&mut self, subscriber: &str) {
        for (chain_id, state) in self.scanners.iter_mut() {
            if state.subscribers.remove(subscriber).is_some() && !state.enabled() {
                tracing::debug!(%chain_id, subscriber, "Scanner disabled, no subscribers left");
            }
        }
    }

    /// Stop scanning everywhere. Cached events are retained.
    pub fn disable_all(&mut self) {
        for state in self.scanners.values_mut() {
            state.subscribers.clear();
        }
    }

    pub fn is_scanner_enabled(&self, subscriber: &str) -> bool {
        self.scanners
            .values()
            .any(|s| s.subscribers.contains_key(subscriber))
    }

    /// Chains that currently have at least one subscriber.
    pub fn enabled_chains(&self) -> Vec<XChainId> {
        self.scanners
            .iter()
            .filter(|(_, s)| s.enabled())
            .map(|(c, _)| c.clone())
            .collect()
    }

    pub fn scanner(&self, chain_id: &XChainId) -> Option<&ScannerState> {
        self.scanners.get(chain_id)
    }

    /// Record the chain's current height as the scan ceiling.
    pub fn set_chain_height(&mut self, chain_id: &XChainId, height: u64) {
        if let Some(state) = self.scanners.get_mut(chain_id) {
            state.chain_height = height;
        }
    }

    /// The block the cursor points at, if it has not been fetched yet.
    pub fn next_unscanned(&self, chain_id: &XChainId) -> Option<u64> {
        let state = self.scanners.get(chain_id)?;
        if !state.enabled() {
            return None;
        }
        let cursor = state.cursor;
        let scanned = self
            .events
            .get(chain_id)
            .is_some_and(|blocks| blocks.contains_key(&cursor));
        (!scanned).then_some(cursor)
    }

    /// Cache the events found at one block height (empty results included,
    /// so the block is never re-queried). Idempotent per height.
    pub fn record_block(&mut self, chain_id: &XChainId, height: u64, events: Vec<XCallEvent>) {
        self.events
            .entry(chain_id.clone())
            .or_default()
            .entry(height)
            .or_insert(events);
    }

    /// Advance the cursor by exactly one block, only while it is strictly
    /// below the chain height. Returns the new cursor when it moved.
    pub fn increment_cursor(&mut self, chain_id: &XChainId) -> Option<u64> {
        let state = self.scanners.get_mut(chain_id)?;
        if state.cursor >= state.chain_height {
            return None;
        }
        state.cursor += 1;
        Some(state.cursor)
    }

    /// All cached events correlated with `sn` on `chain_id`.
    ///
    /// Two-phase lookup: events matching `sn` directly, then (if a
    /// CallMessage event was found) any event sharing its `req_id`, which
    /// is how CallExecuted events (carrying no `sn`) are picked up.
    pub fn destination_events(&self, chain_id: &XChainId, sn: u64) -> XCallEventMap {
        let mut result = XCallEventMap::new();
        let Some(blocks) = self.events.get(chain_id) else {
            return result;
        };

        for events in blocks.values() {
            for event in events {
                if event.sn == Some(sn) {
                    result.insert(event.event_type, event.clone());
                }
            }
        }

        if let Some(req_id) = result
            .get(&XCallEventType::CallMessage)
            .and_then(|e| e.req_id)
        {
            for events in blocks.values() {
                for event in events {
                    if event.req_id == Some(req_id) {
                        result.insert(event.event_type, event.clone());
                    }
                }
            }
        }

        result
    }

    /// Number of cached blocks for a chain (diagnostics).
    pub fn cached_block_count(&self, chain_id: &XChainId) -> usize {
        self.events.get(chain_id).map_or(0, |b| b.len())
    }
}

//! Concurrent multi-page fan-out and ordered result assembly.
//!
//! One task runs per page. Every task funnels its records through a
//! shared [`Collector`] that owns both the dedup set and the ordered
//! storage behind a single lock, so the membership check and the slot
//! write form one critical region. Slots are keyed `(page index,
//! discovery sequence)`: each page writes into its own disjoint key
//! range of the map, which keeps inter-page ordering stable no matter
//! which page completes first.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::Result;

/// One page request: its byte offset into the result stream and its
/// ordinal position among all pages of the query (0 = seed page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub offset: usize,
    pub index: usize,
}

/// Offset schedule and result ceiling for one endpoint family.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    /// Offset of the first fan-out page (the seed page is always 0).
    pub first_offset: usize,
    /// Distance between consecutive fan-out offsets.
    pub step: usize,
    /// Provider-side maximum result count.
    pub ceiling: usize,
}

impl Pagination {
    pub const TEXT: Self = Self {
        first_offset: 23,
        step: 50,
        ceiling: 500,
    };
    pub const IMAGES: Self = Self {
        first_offset: 100,
        step: 100,
        ceiling: 500,
    };
    pub const VIDEOS: Self = Self {
        first_offset: 59,
        step: 59,
        ceiling: 400,
    };
    pub const NEWS: Self = Self {
        first_offset: 59,
        step: 59,
        ceiling: 400,
    };

    /// Clamps a requested maximum to the endpoint ceiling.
    pub fn clamp(&self, requested: usize) -> usize {
        requested.min(self.ceiling)
    }

    /// Pages to request: the seed page, plus fan-out offsets covering
    /// the clamped maximum when one was requested.
    pub fn pages(&self, max_results: usize) -> Vec<PageRequest> {
        let mut pages = vec![PageRequest {
            offset: 0,
            index: 0,
        }];
        if max_results > 0 {
            let clamped = self.clamp(max_results);
            let mut offset = self.first_offset;
            let mut index = 1;
            while offset < clamped {
                pages.push(PageRequest { offset, index });
                offset += self.step;
                index += 1;
            }
        }
        pages
    }

    /// Output truncation bound; `None` when only the seed page runs.
    pub fn limit(&self, max_results: usize) -> Option<usize> {
        (max_results > 0).then(|| self.clamp(max_results))
    }
}

/// Shared ordered storage with intra-query deduplication.
///
/// Duplicate identity keys resolve deterministically: the occurrence
/// from the lowest page index wins, evicting any higher-page slot that
/// landed first; within one page the first discovery wins.
#[derive(Debug)]
pub(crate) struct Collector<T> {
    state: Mutex<CollectorState<T>>,
}

#[derive(Debug)]
struct CollectorState<T> {
    slots: BTreeMap<(usize, usize), T>,
    seen: HashMap<String, (usize, usize)>,
    cursors: HashMap<usize, usize>,
}

impl<T> Collector<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CollectorState {
                slots: BTreeMap::new(),
                seen: HashMap::new(),
                cursors: HashMap::new(),
            }),
        }
    }

    /// Records a value into the page's slot band unless its identity
    /// key already resolved to an equal-or-lower page. Returns whether
    /// the value was stored.
    pub fn insert(&self, page: usize, key: &str, value: T) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let prior = state.seen.get(key).copied();
        if let Some((held_page, held_seq)) = prior {
            if page >= held_page {
                return false;
            }
            state.slots.remove(&(held_page, held_seq));
        }

        let cursor = state.cursors.entry(page).or_insert(0);
        let seq = *cursor;
        *cursor += 1;

        state.seen.insert(key.to_string(), (page, seq));
        state.slots.insert((page, seq), value);
        true
    }

    /// Compacts the storage in key order (page ascending, discovery
    /// order ascending) and truncates to `limit` when given.
    pub fn drain_ordered(&self, limit: Option<usize>) -> Vec<T> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.seen.clear();
        state.cursors.clear();
        let slots = std::mem::take(&mut state.slots);
        match limit {
            Some(n) => slots.into_values().take(n).collect(),
            None => slots.into_values().collect(),
        }
    }
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatches one task per page and joins them all.
///
/// Each task resolves to the page's `(identity key, record)` pairs and
/// feeds them into the collector. A failed page is dropped with a
/// warning; siblings are unaffected. There is no early cancellation: a
/// slow page delays only the final join.
pub(crate) async fn fan_out<T, F, Fut>(
    pages: Vec<PageRequest>,
    collector: &Arc<Collector<T>>,
    run_page: F,
) where
    T: Send + 'static,
    F: Fn(PageRequest) -> Fut,
    Fut: Future<Output = Result<Vec<(String, T)>>> + Send + 'static,
{
    let tasks: Vec<_> = pages
        .into_iter()
        .map(|page| {
            let task = run_page(page);
            let collector = Arc::clone(collector);
            tokio::spawn(async move {
                match task.await {
                    Ok(records) => {
                        let extracted = records.len();
                        let mut stored = 0usize;
                        for (key, value) in records {
                            if collector.insert(page.index, &key, value) {
                                stored += 1;
                            }
                        }
                        debug!(page = page.index, extracted, stored, "page assembled");
                    }
                    Err(e) => {
                        warn!(page = page.index, error = %e, "page dropped");
                    }
                }
            })
        })
        .collect();

    join_all(tasks).await;
}

//! Random affirmation lookups guarded against stale responses.
//!
//! Every lookup gets a [`FetchIntent`] from a counter owned by the [`RandomFetcher`].
//! Network completion order is not issuance order, so a completion only touches the view
//! when its intent is still the latest one handed out. Older completions are dropped.
//!
//! The fetcher itself never awaits: [`RandomFetcher::begin`] hands out a [`PendingFetch`],
//! the caller runs [`resolve`] wherever it likes (typically a spawned task), and feeds the
//! [`FetchCompletion`] back through [`RandomFetcher::complete`] on the thread that owns the
//! view.

use std::time::Instant;
use tracing::{debug, warn};

use crate::api::AffirmationSource;
use crate::error::{ApiError, ApiResult};
use crate::model::{CategoryFilter, RandomAffirmation};
use crate::state::{AffirmationView, PinTarget, ViewSnapshot, NOTICE_TTL, NO_AFFIRMATIONS_TEXT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchIntent(u64);

impl FetchIntent {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// An issued lookup. Consumed by [`RandomFetcher::complete`], so it completes at most once.
#[derive(Debug)]
pub struct PendingFetch {
    intent: FetchIntent,
    filter: CategoryFilter,
    previous: ViewSnapshot,
}

impl PendingFetch {
    pub fn intent(&self) -> FetchIntent {
        self.intent
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }
}

#[derive(Debug)]
pub struct FetchCompletion {
    pub pending: PendingFetch,
    pub result: ApiResult<RandomAffirmation>,
}

/// Terminal state of one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Superseded,
    Rendered,
    NotFound,
    RateLimited,
    RolledBack,
}

pub struct RandomFetcher<V> {
    latest: u64,
    view: V,
}

impl<V: AffirmationView> RandomFetcher<V> {
    pub fn new(view: V) -> Self {
        Self { latest: 0, view }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn latest(&self) -> FetchIntent {
        FetchIntent(self.latest)
    }

    pub fn is_current(&self, intent: FetchIntent) -> bool {
        intent.0 == self.latest
    }

    /// Start a lookup. Supersedes every lookup issued before it.
    pub fn begin(&mut self, filter: CategoryFilter) -> PendingFetch {
        self.latest += 1;
        PendingFetch {
            intent: FetchIntent(self.latest),
            filter,
            previous: self.view.snapshot(),
        }
    }

    /// Apply a finished lookup to the view, unless a newer one has been issued since.
    pub fn complete(&mut self, completion: FetchCompletion, now: Instant) -> FetchState {
        let FetchCompletion { pending, result } = completion;

        if !self.is_current(pending.intent) {
            debug!(
                intent = pending.intent.0,
                latest = self.latest,
                "discarding stale affirmation response"
            );
            return FetchState::Superseded;
        }

        match result {
            Ok(found) => {
                self.view.show(&found.affirmation, &found.categories.joined());
                let target = found
                    .affirmation_id
                    .map(PinTarget::Enabled)
                    .unwrap_or(PinTarget::Disabled);
                self.view.set_pin_target(target);
                FetchState::Rendered
            }
            Err(ApiError::NotFound(_)) => {
                self.view.show(NO_AFFIRMATIONS_TEXT, "");
                self.view.set_pin_target(PinTarget::Disabled);
                FetchState::NotFound
            }
            Err(ApiError::RateLimited(message)) => {
                self.view.flash_notice(&message, now + NOTICE_TTL);
                FetchState::RateLimited
            }
            Err(err) => {
                warn!(filter = %pending.filter, "affirmation lookup failed: {}", err);
                self.view.restore(&pending.previous);
                FetchState::RolledBack
            }
        }
    }
}

/// Perform the network half of a lookup.
pub async fn resolve<S>(source: &S, pending: PendingFetch) -> FetchCompletion
where
    S: AffirmationSource + ?Sized,
{
    let result = source.random(pending.filter).await;
    FetchCompletion { pending, result }
}

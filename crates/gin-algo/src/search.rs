//! Shared machinery for the attack and defense searches.
//!
//! Each subset evaluation is one independent dispatch solve against the same
//! read-only model. The lazy subset stream is cut into chunks; a chunk is
//! solved with rayon (order-preserving collect) and its results are folded
//! into the incumbent sequentially, in enumeration order. Parallel and
//! sequential runs therefore select exactly the same subset.

use crate::backends::ClarabelBackend;
use crate::dispatch::DispatchConfig;
use crate::lp::LpBackend;
use gin_core::{GinError, GinResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use web_time::Instant;

static DEFAULT_BACKEND: ClarabelBackend = ClarabelBackend;

/// Search execution settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Evaluate each chunk of subsets on the rayon pool
    pub parallel: bool,
    /// Subsets materialized and solved per batch
    pub chunk_size: usize,
    /// Absolute margin a candidate must beat the incumbent by to replace it
    pub tie_tolerance: f64,
    /// Wall-clock limit for a whole search, checked between batches
    pub time_limit_secs: Option<f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 64,
            tie_tolerance: 1e-6,
            time_limit_secs: None,
        }
    }
}

impl SearchConfig {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        // Negative, NaN and out-of-range values mean no limit
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Everything a search needs besides the model.
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub backend: &'a dyn LpBackend,
    pub dispatch: DispatchConfig,
    pub search: SearchConfig,
}

impl<'a> SearchContext<'a> {
    pub fn new(backend: &'a dyn LpBackend) -> Self {
        Self {
            backend,
            dispatch: DispatchConfig::default(),
            search: SearchConfig::default(),
        }
    }

    pub fn with_dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }
}

impl Default for SearchContext<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_BACKEND)
    }
}

impl std::fmt::Debug for SearchContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchContext")
            .field("backend", &self.backend.id())
            .field("dispatch", &self.dispatch)
            .field("search", &self.search)
            .finish()
    }
}

/// Wall-clock and solve accounting for one top-level search.
#[derive(Debug)]
pub(crate) struct SearchBudget {
    start: Instant,
    limit: Option<Duration>,
    pub evaluated: usize,
}

impl SearchBudget {
    pub fn start(config: &SearchConfig) -> Self {
        Self {
            start: Instant::now(),
            limit: config.time_limit(),
            evaluated: 0,
        }
    }

    pub fn check(&self) -> GinResult<()> {
        match self.limit {
            Some(limit) if self.start.elapsed() >= limit => Err(GinError::TimeLimit {
                evaluated: self.evaluated,
            }),
            _ => Ok(()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Goal {
    Maximize,
    Minimize,
}

/// Best candidate so far; a newcomer must be strictly better by more than
/// the tolerance, so the first of a tied group is kept.
#[derive(Debug)]
pub(crate) struct Incumbent<T> {
    goal: Goal,
    tolerance: f64,
    best: Option<(f64, T)>,
}

impl<T> Incumbent<T> {
    pub fn new(goal: Goal, tolerance: f64) -> Self {
        Self {
            goal,
            tolerance: tolerance.max(0.0),
            best: None,
        }
    }

    pub fn offer(&mut self, score: f64, item: T) -> bool {
        let improves = match &self.best {
            None => true,
            Some((best, _)) => match self.goal {
                Goal::Maximize => score > best + self.tolerance,
                Goal::Minimize => score < best - self.tolerance,
            },
        };
        if improves {
            self.best = Some((score, item));
        }
        improves
    }

    pub fn score(&self) -> Option<f64> {
        self.best.as_ref().map(|(score, _)| *score)
    }

    pub fn into_inner(self) -> Option<T> {
        self.best.map(|(_, item)| item)
    }
}

/// Evaluate every subset, batch by batch, and hand results to `sink` in
/// enumeration order.
pub(crate) fn for_each_evaluated<I, R, E, S>(
    subsets: I,
    config: &SearchConfig,
    budget: &mut SearchBudget,
    eval: E,
    mut sink: S,
) -> GinResult<()>
where
    I: Iterator<Item = Vec<usize>>,
    R: Send,
    E: Fn(&[usize]) -> GinResult<R> + Sync,
    S: FnMut(Vec<usize>, R),
{
    let chunk_size = config.chunk_size.max(1);
    let mut subsets = subsets;
    loop {
        budget.check()?;
        let chunk: Vec<Vec<usize>> = subsets.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            return Ok(());
        }
        let results: Vec<GinResult<R>> = if config.parallel {
            chunk.par_iter().map(|subset| eval(subset.as_slice())).collect()
        } else {
            chunk.iter().map(|subset| eval(subset.as_slice())).collect()
        };
        for (subset, result) in chunk.into_iter().zip(results) {
            budget.evaluated += 1;
            sink(subset, result?);
        }
    }
}

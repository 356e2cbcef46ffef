//! Attack search: which ≤ k lines hurt the most when taken out?
//!
//! Exhaustive over subset sizes `1..=min(k, L)`, combinations drawn over the
//! candidate lines in their stored order. One dispatch per subset; the
//! strictly greatest `total_shed` wins and ties keep the first subset seen.
//!
//! ## Scaling
//!
//! The search performs `Σ_{s=1}^{k} C(L, s)` dispatch solves. With L = 40
//! and k = 3 that is already 10 700 LPs; treat anything beyond a few dozen
//! lines or k > 3 as out of reach.

use crate::combinations::{combinations_up_to, count_up_to};
use crate::dispatch::{format_lines, solve_dispatch_positions, DispatchResult};
use crate::search::{for_each_evaluated, Goal, Incumbent, SearchBudget, SearchContext};
use gin_core::{GinResult, GridModel, LineKey};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Worst dispatch found for an attack budget.
#[derive(Debug, Clone, Serialize)]
pub struct AttackResult {
    #[serde(flatten)]
    pub dispatch: DispatchResult,
    pub attack_budget: usize,
    /// Dispatch solves performed
    pub evaluations: usize,
}

impl AttackResult {
    pub fn total_shed(&self) -> f64 {
        self.dispatch.total_shed
    }

    pub fn disabled_lines(&self) -> &[LineKey] {
        &self.dispatch.disabled_lines
    }

    pub fn summary(&self) -> String {
        let mut s = format!("Attack Budget: {}\n", self.attack_budget);
        s.push_str(&format!(
            "Worst Attack: {}\n",
            format_lines(&self.dispatch.disabled_lines)
        ));
        s.push_str(&format!("Total Shed: {:.3} MW\n", self.dispatch.total_shed));
        s.push_str(&format!("Status: {}\n", self.dispatch.status));
        s.push_str(&format!("Dispatch Solves: {}\n", self.evaluations));
        s
    }
}

/// Attack restricted to `candidates` (line positions, stored order).
///
/// Falls back to the undisturbed dispatch when the budget or the candidate
/// set is empty, and when no attacked dispatch solved to optimality.
pub(crate) fn attack_over(
    model: &GridModel,
    candidates: &[usize],
    budget: usize,
    ctx: &SearchContext<'_>,
    search_budget: &mut SearchBudget,
) -> GinResult<AttackResult> {
    let started_at = search_budget.evaluated;
    let k = budget.min(candidates.len());
    let mut best = Incumbent::new(Goal::Maximize, ctx.search.tie_tolerance);

    if k > 0 {
        for_each_evaluated(
            combinations_up_to(candidates.len(), k),
            &ctx.search,
            search_budget,
            |subset| {
                let lines: Vec<usize> = subset.iter().map(|&i| candidates[i]).collect();
                solve_dispatch_positions(model, &lines, ctx.backend, &ctx.dispatch)
            },
            |_, result| {
                if result.is_optimal() {
                    best.offer(result.total_shed, result);
                }
            },
        )?;
    }

    let dispatch = match best.into_inner() {
        Some(result) => result,
        None => {
            if k > 0 {
                warn!(
                    budget = k,
                    candidates = candidates.len(),
                    "no attacked dispatch was optimal; falling back to undisturbed dispatch"
                );
            }
            search_budget.check()?;
            search_budget.evaluated += 1;
            solve_dispatch_positions(model, &[], ctx.backend, &ctx.dispatch)?
        }
    };

    debug!(
        budget = k,
        candidates = candidates.len(),
        total_shed = dispatch.total_shed,
        disabled = %format_lines(&dispatch.disabled_lines),
        "attack search finished"
    );
    Ok(AttackResult {
        dispatch,
        attack_budget: budget,
        evaluations: search_budget.evaluated - started_at,
    })
}

fn run(
    model: &GridModel,
    candidates: &[usize],
    budget: usize,
    ctx: &SearchContext<'_>,
) -> GinResult<AttackResult> {
    info!(
        lines = candidates.len(),
        budget,
        subsets = %count_up_to(candidates.len(), budget),
        backend = ctx.backend.id(),
        "starting attack search"
    );
    let mut search_budget = SearchBudget::start(&ctx.search);
    let result = attack_over(model, candidates, budget, ctx, &mut search_budget)?;
    info!(
        total_shed = result.total_shed(),
        attack = %format_lines(result.disabled_lines()),
        evaluations = result.evaluations,
        elapsed = ?search_budget.elapsed(),
        "attack search complete"
    );
    Ok(result)
}

/// Find the ≤ `budget` lines whose removal maximizes total shed.
///
/// A budget above the line count is clamped. Budget 0, or a model without
/// lines, yields the undisturbed dispatch.
pub fn attack(model: &GridModel, budget: usize, ctx: &SearchContext<'_>) -> GinResult<AttackResult> {
    let candidates: Vec<usize> = (0..model.num_lines()).collect();
    run(model, &candidates, budget, ctx)
}

/// [`attack`] with the attacker limited to `candidate_lines`.
///
/// Candidates are enumerated in the model's line order regardless of how
/// they are listed; unknown pairs fail with `UnknownLine`.
pub fn attack_restricted(
    model: &GridModel,
    budget: usize,
    candidate_lines: &[LineKey],
    ctx: &SearchContext<'_>,
) -> GinResult<AttackResult> {
    let mut candidates = model.resolve_lines(candidate_lines.iter().copied())?;
    candidates.sort_unstable();
    candidates.dedup();
    run(model, &candidates, budget, ctx)
}

//! Defense search: which lines to harden against a budgeted attacker.
//!
//! Every combination of `min(d, L)` lines is tried as the protected set. For
//! each, the attacker runs the full attack search over the remaining lines;
//! the protection whose worst case sheds strictly least wins, first seen on
//! ties. Cost is `C(L, d) · Σ_{s=1}^{a} C(L − d, s)` dispatch solves, so this
//! is the most expensive operation in the crate by far.

use crate::attack::{attack_over, AttackResult};
use crate::combinations::{binomial, count_up_to, Combinations};
use crate::dispatch::{format_lines, solve_dispatch_positions};
use crate::search::{Goal, Incumbent, SearchBudget, SearchContext};
use gin_core::{GinResult, GridModel, LineKey};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct DefenseResult {
    /// Protected lines, in line-list order
    pub defended: Vec<LineKey>,
    pub attack_budget: usize,
    pub defend_budget: usize,
    /// Best attack against the chosen protection
    pub worst_case: AttackResult,
    /// Dispatch solves across the whole search
    pub evaluations: usize,
}

impl DefenseResult {
    pub fn summary(&self) -> String {
        let mut s = format!(
            "Budgets: attack {} / defend {}\n",
            self.attack_budget, self.defend_budget
        );
        s.push_str(&format!("Defended Lines: {}\n", format_lines(&self.defended)));
        s.push_str(&format!(
            "Worst-Case Attack: {}\n",
            format_lines(self.worst_case.disabled_lines())
        ));
        s.push_str(&format!(
            "Worst-Case Shed: {:.3} MW\n",
            self.worst_case.total_shed()
        ));
        s.push_str(&format!("Dispatch Solves: {}\n", self.evaluations));
        s
    }
}

/// Choose `defend_budget` lines to protect so that the worst attack of up to
/// `attack_budget` unprotected lines sheds as little as possible.
///
/// With nothing to protect (budget 0 or no lines) the worst case is the
/// unrestricted [`attack`](crate::attack::attack). If no protection yields an
/// optimal worst case, the undisturbed dispatch is reported with no lines
/// defended.
pub fn defend(
    model: &GridModel,
    attack_budget: usize,
    defend_budget: usize,
    ctx: &SearchContext<'_>,
) -> GinResult<DefenseResult> {
    let n_lines = model.num_lines();
    let d = defend_budget.min(n_lines);
    info!(
        lines = n_lines,
        attack_budget,
        defend_budget,
        protections = %binomial(n_lines, d),
        attacks_per_protection = %count_up_to(n_lines - d, attack_budget),
        backend = ctx.backend.id(),
        "starting defense search"
    );

    let mut search_budget = SearchBudget::start(&ctx.search);
    let mut best = Incumbent::new(Goal::Minimize, ctx.search.tie_tolerance);

    for protected in Combinations::new(n_lines, d) {
        search_budget.check()?;
        let unprotected: Vec<usize> = (0..n_lines)
            .filter(|pos| protected.binary_search(pos).is_err())
            .collect();
        let worst = attack_over(model, &unprotected, attack_budget, ctx, &mut search_budget)?;
        debug!(
            protected = ?protected,
            worst_shed = worst.total_shed(),
            "evaluated protection"
        );
        if worst.dispatch.is_optimal() {
            best.offer(worst.total_shed(), (protected, worst));
        }
    }

    let (protected, worst_case) = match best.into_inner() {
        Some(found) => found,
        None => {
            warn!("no protection produced an optimal worst case; reporting undisturbed dispatch");
            search_budget.check()?;
            search_budget.evaluated += 1;
            let dispatch = solve_dispatch_positions(model, &[], ctx.backend, &ctx.dispatch)?;
            let fallback = AttackResult {
                dispatch,
                attack_budget,
                evaluations: 1,
            };
            (Vec::new(), fallback)
        }
    };

    let defended: Vec<LineKey> = protected
        .iter()
        .filter_map(|&pos| model.line(pos).map(|line| line.key()))
        .collect();
    info!(
        defended = %format_lines(&defended),
        worst_shed = worst_case.total_shed(),
        evaluations = search_budget.evaluated,
        elapsed = ?search_budget.elapsed(),
        "defense search complete"
    );
    Ok(DefenseResult {
        defended,
        attack_budget,
        defend_budget,
        worst_case,
        evaluations: search_budget.evaluated,
    })
}

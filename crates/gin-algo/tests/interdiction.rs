//! Attack and defense search tests

use gin_algo::combinations::combinations_up_to;
use gin_algo::{
    attack, attack_restricted, defend, dispatch, ClarabelBackend, SearchConfig, SearchContext,
};
use gin_core::{islands, random_grid, BusId, GridModel, LineKey, RandomGridConfig};
use proptest::prelude::*;

const TOL: f64 = 1e-4;

/// 3-bus ring, every line b = 10, cap = 100; 50 MW at bus 0, generator at bus 1
fn ring() -> GridModel {
    let mut model = GridModel::new(3);
    model.add_line(BusId::new(0), BusId::new(1), 10.0, 100.0).unwrap();
    model.add_line(BusId::new(1), BusId::new(2), 10.0, 100.0).unwrap();
    model.add_line(BusId::new(2), BusId::new(0), 10.0, 100.0).unwrap();
    model.set_demand(BusId::new(0), 50.0).unwrap();
    model.set_generator(BusId::new(1), 0.0, 100.0, 0.0).unwrap();
    model
}

fn small_grid(seed: u64) -> GridModel {
    random_grid(&RandomGridConfig::new(5, 0.5, seed)).unwrap()
}

#[test]
fn ring_single_outage_is_harmless() {
    let model = ring();
    let result = attack(&model, 1, &SearchContext::default()).unwrap();
    assert!(result.total_shed().abs() < TOL, "shed {}", result.total_shed());
    assert_eq!(result.disabled_lines().len(), 1);
    assert_eq!(result.attack_budget, 1);
    assert_eq!(result.evaluations, 3);
}

#[test]
fn ring_double_outage_islands_the_load() {
    let model = ring();
    let result = attack(&model, 2, &SearchContext::default()).unwrap();
    assert!((result.total_shed() - 50.0).abs() < TOL);
    assert_eq!(result.disabled_lines().len(), 2);
    assert_eq!(result.evaluations, 3 + 3);

    // Whatever pair wins, bus 0 ends up without a generator
    let analysis = islands(&model, result.disabled_lines()).unwrap();
    let island = analysis.island_of(BusId::new(0)).unwrap();
    assert!(!analysis.islands[island].contains(&BusId::new(1)));
}

#[test]
fn first_seen_pair_wins_ties() {
    // Every pair isolates bus 0 from the generator; the first pair in
    // enumeration order is (0-1, 1-2)
    let model = ring();
    let result = attack(&model, 2, &SearchContext::default()).unwrap();
    assert_eq!(
        result.disabled_lines(),
        &[LineKey::between(0, 1), LineKey::between(1, 2)]
    );
}

#[test]
fn zero_budget_is_undisturbed_dispatch() {
    let model = ring();
    let result = attack(&model, 0, &SearchContext::default()).unwrap();
    assert!(result.disabled_lines().is_empty());
    assert!(result.total_shed().abs() < TOL);
    assert_eq!(result.evaluations, 1);
}

#[test]
fn budget_is_clamped_to_line_count() {
    let model = ring();
    let result = attack(&model, 10, &SearchContext::default()).unwrap();
    assert_eq!(result.attack_budget, 10);
    assert_eq!(result.evaluations, 7);
    assert!((result.total_shed() - 50.0).abs() < TOL);
}

#[test]
fn model_without_lines() {
    let mut model = GridModel::new(2);
    model.set_demand(BusId::new(1), 5.0).unwrap();
    let result = attack(&model, 3, &SearchContext::default()).unwrap();
    assert!(result.disabled_lines().is_empty());
    assert!((result.total_shed() - 5.0).abs() < TOL);
}

#[test]
fn restricted_attack_only_uses_candidates() {
    let model = ring();
    let candidates = [LineKey::between(2, 1), LineKey::between(0, 1)];
    let result = attack_restricted(&model, 2, &candidates, &SearchContext::default()).unwrap();
    assert_eq!(
        result.disabled_lines(),
        &[LineKey::between(0, 1), LineKey::between(1, 2)]
    );
    assert!((result.total_shed() - 50.0).abs() < TOL);
}

#[test]
fn attack_is_monotone_in_budget() {
    for seed in 0..3 {
        let model = small_grid(seed);
        let ctx = SearchContext::default();
        let mut previous = 0.0;
        for k in 1..=3 {
            let shed = attack(&model, k, &ctx).unwrap().total_shed();
            assert!(shed >= previous - 1e-6, "seed {seed}: k={k} {shed} < {previous}");
            previous = shed;
        }
    }
}

#[test]
fn attack_dominates_brute_force() {
    let model = small_grid(11);
    let k = 2;
    let result = attack(&model, k, &SearchContext::default()).unwrap();
    let lines = model.lines();
    for subset in combinations_up_to(lines.len(), k) {
        let cut: Vec<LineKey> = subset.iter().map(|&i| lines[i]).collect();
        let shed = dispatch(&model, &cut).unwrap().total_shed;
        assert!(
            result.total_shed() >= shed - 1e-5,
            "subset {cut:?} sheds {shed} > {}",
            result.total_shed()
        );
    }
}

#[test]
fn parallel_and_sequential_agree() {
    let model = small_grid(4);
    let sequential = SearchContext::default().with_search(SearchConfig::sequential());
    let parallel = SearchContext::default().with_search(SearchConfig {
        chunk_size: 2,
        ..SearchConfig::default()
    });

    let a = attack(&model, 2, &sequential).unwrap();
    let b = attack(&model, 2, &parallel).unwrap();
    assert_eq!(a.disabled_lines(), b.disabled_lines());
    assert_eq!(a.total_shed(), b.total_shed());
    assert_eq!(a.evaluations, b.evaluations);

    let a = defend(&model, 1, 1, &sequential).unwrap();
    let b = defend(&model, 1, 1, &parallel).unwrap();
    assert_eq!(a.defended, b.defended);
    assert_eq!(a.worst_case.disabled_lines(), b.worst_case.disabled_lines());
}

#[test]
fn ring_defense_protects_bus_zero() {
    // Only protecting 0-1 keeps bus 0 tied to the generator under every
    // remaining attack
    let model = ring();
    let result = defend(&model, 2, 1, &SearchContext::default()).unwrap();
    assert_eq!(result.defended, vec![LineKey::between(0, 1)]);
    assert!(result.worst_case.total_shed().abs() < TOL);
    assert!(!result
        .worst_case
        .disabled_lines()
        .contains(&result.defended[0]));
    // 3 protections × (2 singles + 1 pair)
    assert_eq!(result.evaluations, 9);
}

#[test]
fn defense_keeps_first_protection_on_ties() {
    // No single outage sheds load on the ring, so every protection ties at 0
    let model = ring();
    let ctx = SearchContext::default();

    let result = defend(&model, 1, 1, &ctx).unwrap();
    assert_eq!(result.defended, vec![LineKey::between(0, 1)]);
    assert_eq!(result.worst_case.disabled_lines(), &[LineKey::between(1, 2)]);
    assert!(result.worst_case.total_shed().abs() < TOL);

    let result = defend(&model, 1, 2, &ctx).unwrap();
    assert_eq!(
        result.defended,
        vec![LineKey::between(0, 1), LineKey::between(1, 2)]
    );
    assert_eq!(result.worst_case.disabled_lines(), &[LineKey::between(0, 2)]);
    assert!(result.worst_case.total_shed().abs() < TOL);
}

#[test]
fn zero_defense_budget_matches_attack() {
    let model = ring();
    let ctx = SearchContext::default();
    let defended = defend(&model, 2, 0, &ctx).unwrap();
    let attacked = attack(&model, 2, &ctx).unwrap();
    assert!(defended.defended.is_empty());
    assert_eq!(defended.worst_case.disabled_lines(), attacked.disabled_lines());
    assert!((defended.worst_case.total_shed() - attacked.total_shed()).abs() < 1e-9);
}

#[test]
fn protecting_everything_leaves_undisturbed_dispatch() {
    let model = ring();
    let result = defend(&model, 2, 5, &SearchContext::default()).unwrap();
    assert_eq!(result.defended, model.lines());
    assert!(result.worst_case.disabled_lines().is_empty());
    assert!(result.worst_case.total_shed().abs() < TOL);
}

#[test]
fn time_limit_is_reported_as_error() {
    let model = ring();
    let ctx = SearchContext::new(&ClarabelBackend).with_search(SearchConfig {
        time_limit_secs: Some(0.0),
        ..SearchConfig::default()
    });
    assert!(matches!(
        defend(&model, 1, 1, &ctx),
        Err(gin_core::GinError::TimeLimit { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn defense_never_hurts(seed in 0u64..1000, a in 1usize..3, d in 0usize..2) {
        let model = small_grid(seed);
        let ctx = SearchContext::default();
        let defended = defend(&model, a, d, &ctx).unwrap();
        let attacked = attack(&model, a, &ctx).unwrap();
        prop_assert!(defended.worst_case.total_shed() <= attacked.total_shed() + 1e-5);
    }

    /// Removing lines is not assumed to hurt: single-line attacks are
    /// compared against every single outage, not against the intact grid.
    #[test]
    fn single_line_attack_is_worst_single_outage(seed in 0u64..1000) {
        let model = small_grid(seed);
        let result = attack(&model, 1, &SearchContext::default()).unwrap();
        let worst = model
            .lines()
            .into_iter()
            .map(|line| dispatch(&model, &[line]).unwrap().total_shed)
            .fold(f64::NEG_INFINITY, f64::max);
        prop_assert!((result.total_shed() - worst).abs() < 1e-5);
    }
}

//! # gin-algo: Line interdiction on DC networks
//!
//! Three nested optimizations over a [`gin_core::GridModel`]:
//!
//! | Operation | Question answered | Cost |
//! |-----------|-------------------|------|
//! | [`dispatch`] | How little load must be shed with these lines out? | 1 LP |
//! | [`attack`] | Which ≤ k lines maximize shed? | Σ C(L, s) LPs |
//! | [`defend`] | Which d lines to protect to minimize the worst attack? | C(L, d) · Σ C(L−d, s) LPs |
//!
//! ### Architecture
//!
//! - **[`lp`]**: solver-agnostic linear program and the [`LpBackend`] trait
//! - **[`backends`]**: `good_lp` implementations (Clarabel by default, HiGHS
//!   behind `solver-highs`)
//! - **[`dispatch`]**: the load-shedding DC formulation, written only against [`lp`]
//! - **[`search`]**: chunked rayon evaluation with a deterministic,
//!   first-seen-wins reduction
//! - **[`attack`]** / **[`defense`]**: exhaustive enumeration over
//!   [`combinations`]
//! - **[`validation`]**: constraint residuals of a returned dispatch
//!
//! ## Example
//!
//! ```no_run
//! use gin_algo::{attack, dispatch, SearchContext};
//! use gin_core::{BusId, GridModel};
//!
//! let mut model = GridModel::new(3);
//! model.add_line(BusId::new(0), BusId::new(1), 10.0, 100.0)?;
//! model.add_line(BusId::new(1), BusId::new(2), 10.0, 100.0)?;
//! model.add_line(BusId::new(2), BusId::new(0), 10.0, 100.0)?;
//! model.set_demand(BusId::new(0), 50.0)?;
//! model.set_generator(BusId::new(1), 0.0, 100.0, 0.0)?;
//!
//! let base = dispatch(&model, &[])?;
//! let worst = attack(&model, 2, &SearchContext::default())?;
//! println!("{} MW -> {} MW", base.total_shed, worst.total_shed());
//! # Ok::<(), gin_core::GinError>(())
//! ```

pub mod attack;
pub mod backends;
pub mod combinations;
pub mod defense;
pub mod dispatch;
pub mod lp;
pub mod search;
pub mod validation;

pub use attack::{attack, attack_restricted, AttackResult};
pub use backends::{ClarabelBackend, LpBackendKind};
#[cfg(feature = "solver-highs")]
pub use backends::HighsBackend;
pub use combinations::{binomial, combinations_up_to, count_up_to, Combinations};
pub use defense::{defend, DefenseResult};
pub use dispatch::{dispatch, format_lines, solve_dispatch, DispatchConfig, DispatchResult};
pub use lp::{LinearProgram, LpBackend, LpOutcome, LpStatus};
pub use search::{SearchConfig, SearchContext};
pub use validation::{validate_dispatch, DispatchViolations};

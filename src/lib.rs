#![warn(missing_docs)]

//! # `constraint-puzzles`
//!
//! Solvers for puzzles whose rules are linear: hailstone trajectories, claw machines, and factory lights, plus one
//! graph puzzle, wiring diagrams, which is a minimum cut.
//! Pick a [`Puzzle`] and a [`Part`], hand it the puzzle text, and [`solve()`](Puzzle::solve) it into an [`Answer`].
//!
//! Every linear puzzle goes the same way: parse text into [`NumericRecord`](record::NumericRecord)s, allocate
//! unknowns and add constraints in a [`ModelBuilder`], build a [`Model`], submit it once to a
//! [`ConstraintSolver`](solver::ConstraintSolver), and read the answer off the [`Assignment`](model::Assignment).
//!
//! ```
//! use constraint_puzzles::{ModelBuilder, Verdict};
//! use constraint_puzzles::solver::Backend;
//!
//! let mut builder = ModelBuilder::new();
//! let a = builder.integer("hit_a");
//! let b = builder.integer("hit_b");
//! builder
//!     .constrain(a.at_least(0i64))
//!     .constrain(b.at_least(0i64))
//!     .constrain((a * 94i64 + b * 22i64).equals(8400i64))
//!     .constrain((a * 34i64 + b * 67i64).equals(5400i64))
//!     .minimize(a * 3i64 + b);
//!
//! let solved = builder.build().unwrap().solve(Backend::Cascade.solver().as_ref());
//! assert!(matches!(solved.verdict(), Verdict::Satisfiable(_)));
//! assert_eq!(solved.require("claw machine").unwrap().integer(a).unwrap(), num_bigint::BigInt::from(80));
//! ```
//!
//! # Internals
//! No single solver handles every model well, so [`ConstraintSolver`](solver::ConstraintSolver) is a narrow capability
//! with several backends:
//!
//! 1. [`RationalSolver`](exact::RationalSolver) row-reduces the equalities over exact rationals.
//! When they pin down every unknown, the one candidate is checked against everything else and is trivially optimal.
//! When they leave one integer unknown free, the solutions lie on a line and the best integral point on it is found
//! exactly. This settles the hailstones, every claw machine, and the crossing counts, with no rounding anywhere.
//! 2. [`MilpSolver`](lp::MilpSolver) hands the model to a mixed-integer LP solver.
//! This settles open systems such as factory machines with more buttons than lights.
//! 3. [`Cascade`](solver::Cascade) tries the first and falls back to the second only when the first cannot decide.
//!
//! Whatever the backend, [`Model::solve`] re-checks a satisfying assignment exactly before believing it.
//!
//! The light parity question is Boolean rather than linear and goes to a SAT solver through
//! [`ParitySystem`](parity::ParitySystem): one XOR per light and a counter bounding the presses.
//!
//! Wiring diagrams become an undirected graph whose [`MinCut`](cut::MinCut) is found by
//! [`StoerWagner`](cut::StoerWagner).

pub use builder::{BuilderInvalidReason, ModelBuilder};
pub use error::{Error, ParseError, Result};
pub use model::{Model, Solved, Verdict};
pub use puzzles::{Answer, Part, Puzzle};

pub mod builder;
pub mod config;
pub mod cut;
pub mod error;
pub mod exact;
pub mod expr;
pub(crate) mod logic;
pub mod lp;
pub mod model;
pub mod parity;
pub mod puzzles;
pub mod record;
pub mod solver;
mod tests;

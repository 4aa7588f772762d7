use serde::Deserialize;
use strum::{Display, EnumString, VariantArray};
use tracing::debug;

use crate::exact::RationalSolver;
use crate::lp::MilpSolver;
use crate::model::{Model, Verdict};

/// The capability of deciding a [`Model`]: given constraints and an optional objective, answer with a [`Verdict`].
///
/// Implementations are stateless between calls; every call is an independent query.
pub trait ConstraintSolver {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Decide `model`. A [`Verdict::Satisfiable`] assignment must be optimal when the model has an objective.
    fn check(&self, model: &Model) -> Verdict;
}

/// Ask `first`, and only if it cannot decide, ask `then`.
pub struct Cascade<A, B> {
    first: A,
    then: B,
}

impl<A, B> Cascade<A, B>
where
    A: ConstraintSolver,
    B: ConstraintSolver,
{
    /// Chain two solvers.
    pub fn new(first: A, then: B) -> Self {
        Self { first, then }
    }
}

impl<A, B> ConstraintSolver for Cascade<A, B>
where
    A: ConstraintSolver,
    B: ConstraintSolver,
{
    fn name(&self) -> &'static str {
        "cascade"
    }

    fn check(&self, model: &Model) -> Verdict {
        match self.first.check(model) {
            Verdict::Indeterminate => {
                debug!(from = self.first.name(), to = self.then.name(), "falling back");
                self.then.check(model)
            }
            verdict => verdict,
        }
    }
}

/// Selectable solver backends.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Display, EnumString, VariantArray, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Exact rational elimination only; under-determined systems are indeterminate.
    Exact,
    /// Mixed-integer LP only.
    Lp,
    /// Exact elimination, falling back to mixed-integer LP.
    #[default]
    Cascade,
}

impl Backend {
    /// A fresh solver for this backend.
    pub fn solver(self) -> Box<dyn ConstraintSolver> {
        match self {
            Backend::Exact => Box::new(RationalSolver),
            Backend::Lp => Box::new(MilpSolver),
            Backend::Cascade => Box::new(Cascade::new(RationalSolver, MilpSolver)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::VariantArray;

    use crate::model::{Model, Verdict};
    use crate::solver::{Backend, Cascade, ConstraintSolver};

    struct Fixed(Verdict, &'static str);

    impl ConstraintSolver for Fixed {
        fn name(&self) -> &'static str {
            self.1
        }

        fn check(&self, _model: &Model) -> Verdict {
            self.0.clone()
        }
    }

    fn empty_model() -> Model {
        crate::builder::ModelBuilder::new().build().unwrap()
    }

    #[test]
    fn cascade_only_falls_back_when_undecided() {
        let model = empty_model();

        let decided = Cascade::new(Fixed(Verdict::Unsatisfiable, "a"), Fixed(Verdict::Indeterminate, "b"));
        assert_eq!(decided.check(&model), Verdict::Unsatisfiable);

        let undecided = Cascade::new(Fixed(Verdict::Indeterminate, "a"), Fixed(Verdict::Unsatisfiable, "b"));
        assert_eq!(undecided.check(&model), Verdict::Unsatisfiable);
    }

    #[test]
    fn backend_names_round_trip() {
        for backend in Backend::VARIANTS {
            assert_eq!(Backend::from_str(&backend.to_string()).unwrap(), *backend);
        }
        assert_eq!(Backend::from_str("lp").unwrap(), Backend::Lp);
        assert!(Backend::from_str("z3").is_err());
        assert_eq!(Backend::default(), Backend::Cascade);
    }
}

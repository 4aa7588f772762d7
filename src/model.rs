use std::fmt::{Display, Formatter};

use num_bigint::BigInt;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::expr::{Coef, Constraint, Domain, LinExpr, Objective, ScopeId, Unknown};
use crate::solver::ConstraintSolver;

#[derive(Clone, Debug)]
pub(crate) struct UnknownInfo {
    pub(crate) name: String,
    pub(crate) domain: Domain,
}

/// A finished constraint model for one puzzle instance, built by a [`ModelBuilder`](crate::builder::ModelBuilder).
///
/// [`Self::solve`] consumes the model: each instance is submitted exactly once.
#[derive(Clone, Debug)]
pub struct Model {
    scope: ScopeId,
    unknowns: Vec<UnknownInfo>,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
}

impl Model {
    pub(crate) fn new(scope: ScopeId, unknowns: Vec<UnknownInfo>, constraints: Vec<Constraint>, objective: Option<Objective>) -> Self {
        Self { scope, unknowns, constraints, objective }
    }

    /// All unknowns, in allocation order.
    pub fn unknowns(&self) -> impl Iterator<Item = Unknown> + '_ {
        (0..self.unknowns.len()).map(|index| Unknown { scope: self.scope, index })
    }

    /// Number of unknowns.
    pub fn unknown_count(&self) -> usize {
        self.unknowns.len()
    }

    /// The name `unknown` was allocated with.
    pub fn name(&self, unknown: Unknown) -> &str {
        &self.unknowns[unknown.index].name
    }

    /// The domain `unknown` was allocated with.
    pub fn domain(&self, unknown: Unknown) -> Domain {
        self.unknowns[unknown.index].domain
    }

    /// The constraints, in the order they were added.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The objective, if any.
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Wrap `values`, indexed like [`Self::unknowns`], as an [`Assignment`] for this model.
    ///
    /// Returns `None` if the number of values is wrong. For use by [`ConstraintSolver`] implementations.
    pub fn assign(&self, values: Vec<Coef>) -> Option<Assignment> {
        if values.len() != self.unknowns.len() {
            return None;
        }

        Some(Assignment { scope: self.scope, values })
    }

    /// Whether `assignment` meets every constraint and gives every integer unknown an integral value.
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        if assignment.scope != self.scope {
            return false;
        }

        let integral = self.unknowns()
            .filter(|unknown| self.domain(*unknown) == Domain::Integer)
            .all(|unknown| assignment.values[unknown.index].is_integer());

        integral && self.constraints.iter().all(|constraint| {
            constraint.expr.evaluate(|unknown| assignment.value(unknown))
                .is_some_and(|value| constraint.relation.holds_for(&value))
        })
    }

    /// Submit this model to `solver` as a single query.
    ///
    /// A satisfying answer that does not actually satisfy the model is downgraded to [`Verdict::Indeterminate`].
    pub fn solve(self, solver: &dyn ConstraintSolver) -> Solved {
        trace!(
            backend = solver.name(),
            unknowns = self.unknowns.len(),
            constraints = self.constraints.len(),
            objective = self.objective.is_some(),
            "submitting model"
        );

        let verdict = match solver.check(&self) {
            Verdict::Satisfiable(assignment) if !self.is_satisfied_by(&assignment) => {
                warn!(backend = solver.name(), "assignment does not satisfy the model, discarding it");
                Verdict::Indeterminate
            }
            verdict => verdict,
        };
        debug!(backend = solver.name(), %verdict, "model solved");

        Solved { model: self, verdict }
    }
}

/// Concrete values for every unknown of one model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    scope: ScopeId,
    values: Vec<Coef>,
}

impl Assignment {
    /// The value of `unknown`, or `None` if it belongs to another model.
    pub fn value(&self, unknown: Unknown) -> Option<&Coef> {
        if unknown.scope != self.scope {
            return None;
        }

        self.values.get(unknown.index)
    }

    /// The value of `unknown` as an integer.
    pub fn integer(&self, unknown: Unknown) -> Result<BigInt> {
        let value = self.value(unknown)
            .ok_or_else(|| Error::Indeterminate(format!("a value for unknown {}", unknown.index)))?;
        if !value.is_integer() {
            return Err(Error::NotIntegral { what: format!("unknown {}", unknown.index), value: value.clone() });
        }

        Ok(value.to_integer())
    }

    /// Evaluate `expr` under this assignment.
    pub fn evaluate(&self, expr: &LinExpr) -> Option<Coef> {
        expr.evaluate(|unknown| self.value(unknown))
    }
}

/// What a solver has to say about a model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The constraints hold under the given assignment, which is optimal if the model has an objective.
    Satisfiable(Assignment),
    /// No assignment meets the constraints.
    Unsatisfiable,
    /// The solver could not decide.
    Indeterminate,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Verdict::Satisfiable(_) => "sat",
            Verdict::Unsatisfiable => "unsat",
            Verdict::Indeterminate => "unknown",
        })
    }
}

/// A model after its one solve. Terminal; there is no way back to building.
#[derive(Debug)]
pub struct Solved {
    model: Model,
    verdict: Verdict,
}

impl Solved {
    /// The model that was submitted.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The solver's verdict.
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// The assignment, treating anything but a satisfiable verdict as an error about `what`.
    pub fn require(self, what: &str) -> Result<Assignment> {
        match self.verdict {
            Verdict::Satisfiable(assignment) => Ok(assignment),
            Verdict::Unsatisfiable => Err(Error::Unsatisfiable(what.to_string())),
            Verdict::Indeterminate => Err(Error::Indeterminate(what.to_string())),
        }
    }

    /// The assignment if there is one, `None` if unsatisfiable; indeterminate verdicts about `what` are errors.
    pub fn optional(self, what: &str) -> Result<Option<Assignment>> {
        match self.verdict {
            Verdict::Satisfiable(assignment) => Ok(Some(assignment)),
            Verdict::Unsatisfiable => Ok(None),
            Verdict::Indeterminate => Err(Error::Indeterminate(what.to_string())),
        }
    }
}

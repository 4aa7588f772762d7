use std::sync::atomic::{AtomicUsize, Ordering};

use crate::expr::{Constraint, Domain, LinExpr, Objective, ScopeId, Sense, Unknown};
use crate::model::{Model, UnknownInfo};

static NEXT_SCOPE: AtomicUsize = AtomicUsize::new(0);

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BuilderInvalidReason {
    /// A constraint or objective used an [`Unknown`] allocated by a different builder.
    ForeignUnknown(Unknown),
    /// An objective was registered twice; a model holds at most one.
    SecondObjective,
}

/// Accumulates unknowns, constraints and an optional objective for one puzzle instance.
///
/// The builder is the only source of [`Unknown`]s for the model it builds, so every unknown a constraint mentions is registered by construction.
/// Unknowns from another builder are caught and make this builder invalid.
///
/// Like other builders, it mutates itself while building; [`Self::build`] consumes it, so a built model can never gain constraints again.
#[derive(Debug)]
pub struct ModelBuilder {
    scope: ScopeId,
    unknowns: Vec<UnknownInfo>,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder {
    /// Start an empty model with a fresh scope for its unknowns.
    pub fn new() -> Self {
        Self {
            scope: ScopeId(NEXT_SCOPE.fetch_add(1, Ordering::Relaxed)),
            unknowns: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            invalid_reasons: Vec::new(),
        }
    }

    /// Allocate a new unknown named `name` over `domain`.
    pub fn unknown(&mut self, name: impl Into<String>, domain: Domain) -> Unknown {
        let unknown = Unknown { scope: self.scope, index: self.unknowns.len() };
        self.unknowns.push(UnknownInfo { name: name.into(), domain });
        unknown
    }

    /// Shorthand for an integer-valued [`Self::unknown`].
    pub fn integer(&mut self, name: impl Into<String>) -> Unknown {
        self.unknown(name, Domain::Integer)
    }

    /// Shorthand for a real-valued [`Self::unknown`].
    pub fn real(&mut self, name: impl Into<String>) -> Unknown {
        self.unknown(name, Domain::Real)
    }

    fn check_owned(&mut self, expr: &LinExpr) -> bool {
        match expr.terms().find(|(unknown, _)| unknown.scope != self.scope) {
            None => true,
            Some((unknown, _)) => {
                self.invalid_reasons.push(BuilderInvalidReason::ForeignUnknown(unknown));
                false
            }
        }
    }

    /// Add a constraint. Order does not matter; the model is a conjunction.
    ///
    /// May cause the builder to enter a [`ForeignUnknown`](BuilderInvalidReason::ForeignUnknown) invalid state.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn constrain(&mut self, constraint: Constraint) -> &mut Self {
        if !self.invalid_reasons.is_empty() || !self.check_owned(&constraint.expr) {
            return self;
        }

        self.constraints.push(constraint);
        self
    }

    /// Shorthand for multiple calls to [`Self::constrain`].
    pub fn constrain_all(&mut self, constraints: impl IntoIterator<Item = Constraint>) -> &mut Self {
        for constraint in constraints {
            self.constrain(constraint);
        }

        self
    }

    /// Register `expr` as the expression to minimize.
    ///
    /// May cause the builder to enter a [`SecondObjective`](BuilderInvalidReason::SecondObjective) or [`ForeignUnknown`](BuilderInvalidReason::ForeignUnknown) invalid state.
    pub fn minimize(&mut self, expr: impl Into<LinExpr>) -> &mut Self {
        self.optimize(Sense::Minimize, expr.into())
    }

    /// Register `expr` as the expression to maximize, with the same conditions as [`Self::minimize`].
    pub fn maximize(&mut self, expr: impl Into<LinExpr>) -> &mut Self {
        self.optimize(Sense::Maximize, expr.into())
    }

    fn optimize(&mut self, sense: Sense, expr: LinExpr) -> &mut Self {
        if !self.invalid_reasons.is_empty() || !self.check_owned(&expr) {
            return self;
        }

        if self.objective.is_some() {
            self.invalid_reasons.push(BuilderInvalidReason::SecondObjective);
            return self;
        }

        self.objective = Some(Objective { sense, expr });
        self
    }

    /// Check the validity of this builder.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert this builder into a [`Model`] ready to be solved.
    /// If the builder is invalid for any reason, the [`Vec`] of [`BuilderInvalidReason`]s says why.
    pub fn build(self) -> Result<Model, Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(self.invalid_reasons);
        }

        Ok(Model::new(self.scope, self.unknowns, self.constraints, self.objective))
    }
}

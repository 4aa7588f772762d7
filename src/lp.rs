use good_lp::{constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};
use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use tracing::{debug, trace};

use crate::expr::{Coef, Domain, LinExpr, Relation, Sense};
use crate::model::{Model, Verdict};
use crate::solver::ConstraintSolver;

/// Largest constraint coefficient or constant for which an infeasible answer is believed.
const TRUSTED_MAGNITUDE: f64 = (1u64 << 24) as f64;

/// Decides models with the mixed-integer LP solver bundled with `good_lp`.
///
/// Coefficients are converted to `f64` on the way in and values back to rationals on the way out,
/// integer unknowns being rounded to the nearest integer.
/// Because of that round trip, every answer is re-checked exactly by [`Model::solve`].
/// A claim of infeasibility cannot be re-checked, so it only stands for models whose numbers are all small;
/// past that the verdict is [`Verdict::Indeterminate`].
#[derive(Copy, Clone, Debug, Default)]
pub struct MilpSolver;

impl MilpSolver {
    fn largest_magnitude(model: &Model) -> Option<f64> {
        model.constraints().iter()
            .flat_map(|constraint| {
                let expr = constraint.expr();
                expr.terms().map(|(_, coef)| coef).chain([expr.constant()])
            })
            .map(|coef| coef.to_f64().map(f64::abs))
            .fold_options(0.0, f64::max)
    }

    fn expression(expr: &LinExpr, handles: &[Variable]) -> Option<Expression> {
        expr.terms()
            .map(|(unknown, coef)| coef.to_f64().map(|coef| coef * handles[unknown.index()]))
            .sum::<Option<Expression>>()
    }

    fn value(domain: Domain, value: f64) -> Option<Coef> {
        match domain {
            Domain::Integer => BigInt::from_f64(value.round()).map(Coef::from_integer),
            Domain::Real => Coef::from_float(value),
        }
    }
}

impl ConstraintSolver for MilpSolver {
    fn name(&self) -> &'static str {
        "lp"
    }

    fn check(&self, model: &Model) -> Verdict {
        let mut variables = ProblemVariables::new();
        let handles = model.unknowns()
            .map(|unknown| variables.add(match model.domain(unknown) {
                Domain::Integer => variable().integer(),
                Domain::Real => variable(),
            }))
            .collect_vec();

        let objective = match model.objective() {
            None => Some(Expression::from(0.0)),
            Some(objective) => Self::expression(&objective.expr, &handles),
        };
        let Some(objective) = objective else {
            debug!("objective does not fit in f64");
            return Verdict::Indeterminate;
        };

        let problem = match model.objective().map(|objective| objective.sense) {
            Some(Sense::Maximize) => variables.maximise(objective),
            _ => variables.minimise(objective),
        };
        let mut problem = problem.using(default_solver);

        for constraint in model.constraints() {
            let lhs = Self::expression(constraint.expr(), &handles);
            let rhs = (-constraint.expr().constant()).to_f64();
            let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
                debug!("constraint does not fit in f64");
                return Verdict::Indeterminate;
            };

            problem = problem.with(match constraint.relation() {
                Relation::Eq => constraint!(lhs == rhs),
                Relation::Le => constraint!(lhs <= rhs),
                Relation::Ge => constraint!(lhs >= rhs),
            });
        }

        let largest = Self::largest_magnitude(model).unwrap_or(f64::INFINITY);
        let solution = match problem.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) if largest <= TRUSTED_MAGNITUDE => return Verdict::Unsatisfiable,
            Err(error) => {
                debug!(%error, "lp solver gave up");
                return Verdict::Indeterminate;
            }
        };

        let values = model.unknowns()
            .zip(handles.iter())
            .map(|(unknown, handle)| Self::value(model.domain(unknown), solution.value(*handle)))
            .collect::<Option<Vec<_>>>();
        trace!(found = values.is_some(), "lp solution converted");

        values
            .and_then(|values| model.assign(values))
            .map_or(Verdict::Indeterminate, Verdict::Satisfiable)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use crate::builder::ModelBuilder;
    use crate::lp::MilpSolver;
    use crate::model::Verdict;
    use crate::solver::ConstraintSolver;

    #[test]
    fn overlapping_buttons_cannot_reach_all_ones() {
        // buttons (0,1) and (1,2) reaching [1, 1, 1]; light 1 is hit by both
        let mut builder = ModelBuilder::new();
        let first = builder.integer("button_0");
        let second = builder.integer("button_1");
        builder
            .constrain(first.at_least(0i64))
            .constrain(second.at_least(0i64))
            .constrain(first.equals(1i64))
            .constrain((first + second).equals(1i64))
            .constrain(second.equals(1i64))
            .minimize(first + second);
        let model = builder.build().unwrap();

        assert_eq!(MilpSolver.check(&model), Verdict::Unsatisfiable);
    }

    #[test]
    fn infeasibility_at_scale_is_not_believed() {
        // 3a + 5b = 10000000000001 at a = 2, b = 1999999999999
        let mut builder = ModelBuilder::new();
        let a = builder.integer("hit_a");
        let b = builder.integer("hit_b");
        builder
            .constrain_all([a.at_least(0i64), b.at_least(0i64)])
            .constrain((a * 3i64 + b * 5i64).equals(10000000000001i64))
            .constrain((a * 3i64 + b * 5i64).equals(10000000000001i64))
            .minimize(a * 3i64 + b);
        let model = builder.build().unwrap();

        assert_ne!(MilpSolver.check(&model), Verdict::Unsatisfiable);
        assert!(!matches!(model.solve(&MilpSolver).verdict(), Verdict::Unsatisfiable));
    }

    #[test]
    fn finds_optimum_of_open_system() {
        let mut builder = ModelBuilder::new();
        let a = builder.integer("a");
        let b = builder.integer("b");
        let c = builder.integer("c");
        builder
            .constrain_all([a.at_least(0i64), b.at_least(0i64), c.at_least(0i64)])
            .constrain((a + c).equals(3i64))
            .constrain((b + c).equals(5i64))
            .minimize(a + b + c);
        let model = builder.build().unwrap();

        let solved = model.solve(&MilpSolver);
        let assignment = solved.require("presses").unwrap();
        assert_eq!(assignment.integer(c).unwrap(), BigInt::from(3));
        assert_eq!(assignment.integer(a).unwrap(), BigInt::from(0));
        assert_eq!(assignment.integer(b).unwrap(), BigInt::from(2));
    }
}

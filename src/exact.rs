use itertools::Itertools;
use ndarray::Array2;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use tracing::{debug, trace};

use crate::expr::{Coef, Domain, LinExpr, Relation, Sense};
use crate::model::{Model, Verdict};
use crate::solver::ConstraintSolver;

/// Decides models whose equality constraints leave at most one integer degree of freedom, using exact rational
/// elimination.
///
/// # Method
/// The equalities are written as an augmented matrix `[A | b]` and brought to reduced row echelon form.
/// - A row `0 = c` with `c != 0` means the equalities alone are contradictory: [`Verdict::Unsatisfiable`].
/// - If every unknown has a pivot, the single candidate is checked against the inequalities and integer domains.
///   It is the only point the equalities admit, so it is also optimal for any objective.
/// - If exactly one integer unknown `t` has no pivot, every unknown is `base + slope·t` along a line:
///   1. integer unknowns must be integral, which holds exactly on a residue class `t ≡ r (mod m)`;
///   2. every other constraint bounds `t` from below or above;
///   3. the objective is linear in `t`, so the optimum is the lowest or highest admissible `t`.
/// - Anything else leaves a family of solutions this solver will not search: [`Verdict::Indeterminate`].
#[derive(Copy, Clone, Debug, Default)]
pub struct RationalSolver;

/// Solutions of `value ≡ residue (mod modulus)`, with `0 <= residue < modulus`.
type Residue = (BigInt, BigInt);

fn inverse(value: &BigInt, modulus: &BigInt) -> BigInt {
    value.extended_gcd(modulus).x.mod_floor(modulus)
}

/// The integers `t` for which `base + slope·t` is an integer, or `None` if there are none.
fn integral_along(base: &Coef, slope: &Coef) -> Option<Residue> {
    let scale = base.denom().lcm(slope.denom());
    let rate = (slope * Coef::from_integer(scale.clone())).to_integer().mod_floor(&scale);
    let target = (-(base * Coef::from_integer(scale.clone()))).to_integer().mod_floor(&scale);

    let common = rate.gcd(&scale);
    if !target.is_multiple_of(&common) {
        return None;
    }

    let modulus = &scale / &common;
    let residue = (target / &common * inverse(&(rate / &common), &modulus)).mod_floor(&modulus);
    Some((residue, modulus))
}

/// The integers in both residue classes, or `None` if there are none.
fn both((first, first_mod): Residue, (second, second_mod): Residue) -> Option<Residue> {
    let common = first_mod.gcd(&second_mod);
    let gap = &second - &first;
    if !gap.is_multiple_of(&common) {
        return None;
    }

    let step = &second_mod / &common;
    let hops = (gap / &common * inverse(&(&first_mod / &common).mod_floor(&step), &step)).mod_floor(&step);
    let modulus = first_mod.lcm(&second_mod);
    Some(((first + first_mod * hops).mod_floor(&modulus), modulus))
}

impl RationalSolver {
    fn augmented_matrix(model: &Model) -> Array2<Coef> {
        let width = model.unknown_count();
        let equalities = model.constraints().iter()
            .filter(|constraint| constraint.relation() == Relation::Eq)
            .collect_vec();

        let mut matrix = Array2::from_elem((equalities.len(), width + 1), Coef::zero());
        for (row, constraint) in equalities.into_iter().enumerate() {
            for (unknown, coef) in constraint.expr().terms() {
                matrix[[row, unknown.index()]] = coef.clone();
            }
            // expr == 0 means terms == -constant
            matrix[[row, width]] = -constraint.expr().constant().clone();
        }

        matrix
    }

    /// Reduce `matrix` in place, returning the pivot column of each leading row.
    fn row_reduce(matrix: &mut Array2<Coef>) -> Vec<usize> {
        let (rows, cols) = matrix.dim();
        let mut pivots = Vec::new();

        for col in 0..cols - 1 {
            let pivot_row = pivots.len();
            let Some(found) = (pivot_row..rows).find(|row| !matrix[[*row, col]].is_zero()) else {
                continue;
            };

            if found != pivot_row {
                for c in 0..cols {
                    matrix.swap([found, c], [pivot_row, c]);
                }
            }

            let inverse = matrix[[pivot_row, col]].recip();
            for c in col..cols {
                let scaled = &matrix[[pivot_row, c]] * &inverse;
                matrix[[pivot_row, c]] = scaled;
            }

            for row in (0..rows).filter(|row| *row != pivot_row) {
                let factor = matrix[[row, col]].clone();
                if factor.is_zero() {
                    continue;
                }

                for c in col..cols {
                    let reduced = &matrix[[row, c]] - &factor * &matrix[[pivot_row, c]];
                    matrix[[row, c]] = reduced;
                }
            }

            pivots.push(col);
            if pivots.len() == rows {
                break;
            }
        }

        pivots
    }

    /// `expr` without its constant, evaluated at the point `line`.
    fn along(expr: &LinExpr, line: &[Coef]) -> Coef {
        expr.terms().fold(Coef::zero(), |total, (unknown, coef)| total + coef * &line[unknown.index()])
    }

    /// Search the line left by a single unpivoted integer column `free`.
    fn along_free(model: &Model, matrix: &Array2<Coef>, pivots: &[usize], free: usize) -> Verdict {
        let width = model.unknown_count();
        let mut base = vec![Coef::zero(); width];
        let mut slope = vec![Coef::zero(); width];
        slope[free] = Coef::one();
        for (row, col) in pivots.iter().enumerate() {
            base[*col] = matrix[[row, width]].clone();
            slope[*col] = -matrix[[row, free]].clone();
        }

        let integral = model.unknowns()
            .filter(|unknown| unknown.index() != free && model.domain(*unknown) == Domain::Integer)
            .try_fold((BigInt::zero(), BigInt::one()), |class, unknown| {
                both(class, integral_along(&base[unknown.index()], &slope[unknown.index()])?)
            });
        let Some((residue, modulus)) = integral else {
            return Verdict::Unsatisfiable;
        };

        let (mut lower, mut upper): (Option<Coef>, Option<Coef>) = (None, None);
        for constraint in model.constraints() {
            let rate = Self::along(constraint.expr(), &slope);
            let start = constraint.expr().constant() + Self::along(constraint.expr(), &base);
            if rate.is_zero() {
                if !constraint.relation().holds_for(&start) {
                    return Verdict::Unsatisfiable;
                }
                continue;
            }

            let bound = -start / &rate;
            let (below, above) = match constraint.relation() {
                Relation::Eq => (true, true),
                Relation::Le => (rate.is_negative(), rate.is_positive()),
                Relation::Ge => (rate.is_positive(), rate.is_negative()),
            };
            if below && lower.as_ref().map_or(true, |lower| bound > *lower) {
                lower = Some(bound.clone());
            }
            if above && upper.as_ref().map_or(true, |upper| bound < *upper) {
                upper = Some(bound);
            }
        }

        let lowest = lower.as_ref().map(|lower| {
            let lower = lower.ceil().to_integer();
            (&residue - &lower).mod_floor(&modulus) + lower
        });
        let highest = upper.as_ref().map(|upper| {
            let upper = upper.floor().to_integer();
            upper.clone() - (&upper - &residue).mod_floor(&modulus)
        });

        let rate = model.objective().map_or_else(Coef::zero, |objective| match objective.sense {
            Sense::Minimize => Self::along(&objective.expr, &slope),
            Sense::Maximize => -Self::along(&objective.expr, &slope),
        });
        let chosen = if rate.is_positive() {
            lowest
        } else if rate.is_negative() {
            highest
        } else {
            lowest.or(highest).or(Some(residue))
        };
        let Some(chosen) = chosen.map(Coef::from_integer) else {
            debug!("objective is unbounded along the free unknown");
            return Verdict::Indeterminate;
        };
        trace!(%chosen, %modulus, "free unknown chosen");

        if lower.is_some_and(|lower| chosen < lower) || upper.is_some_and(|upper| chosen > upper) {
            return Verdict::Unsatisfiable;
        }

        let values = base.into_iter().zip(slope).map(|(base, slope)| base + slope * &chosen).collect_vec();
        match model.assign(values) {
            Some(assignment) if model.is_satisfied_by(&assignment) => Verdict::Satisfiable(assignment),
            _ => Verdict::Indeterminate,
        }
    }
}

impl ConstraintSolver for RationalSolver {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn check(&self, model: &Model) -> Verdict {
        let width = model.unknown_count();
        let mut matrix = Self::augmented_matrix(model);
        let pivots = Self::row_reduce(&mut matrix);
        trace!(rows = matrix.nrows(), unknowns = width, rank = pivots.len(), "row reduced");

        // rows past the rank have all-zero coefficients
        if (pivots.len()..matrix.nrows()).any(|row| !matrix[[row, width]].is_zero()) {
            return Verdict::Unsatisfiable;
        }

        if pivots.len() < width {
            let free = (0..width).filter(|col| !pivots.contains(col)).collect_vec();
            return match free[..] {
                [free] if model.unknowns().nth(free).is_some_and(|unknown| model.domain(unknown) == Domain::Integer) => {
                    Self::along_free(model, &matrix, &pivots, free)
                }
                _ => Verdict::Indeterminate,
            };
        }

        let mut values = vec![Coef::zero(); width];
        for (row, col) in pivots.into_iter().enumerate() {
            debug_assert!(matrix[[row, col]].is_one());
            values[col] = matrix[[row, width]].clone();
        }

        match model.assign(values) {
            Some(assignment) if model.is_satisfied_by(&assignment) => Verdict::Satisfiable(assignment),
            Some(_) => Verdict::Unsatisfiable,
            None => Verdict::Indeterminate,
        }
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use crate::builder::ModelBuilder;
    use crate::exact::RationalSolver;
    use crate::expr::{Coef, Unknown};
    use crate::model::Verdict;
    use crate::solver::ConstraintSolver;

    #[test]
    fn solves_square_system() {
        let mut builder = ModelBuilder::new();
        let a = builder.integer("hit_a");
        let b = builder.integer("hit_b");
        builder
            .constrain((a * 94i64 + b * 22i64).equals(8400i64))
            .constrain((a * 34i64 + b * 67i64).equals(5400i64));
        let model = builder.build().unwrap();

        let Verdict::Satisfiable(assignment) = RationalSolver.check(&model) else { panic!("expected a solution") };
        assert_eq!(assignment.integer(a).unwrap(), BigInt::from(80));
        assert_eq!(assignment.integer(b).unwrap(), BigInt::from(40));
    }

    #[test]
    fn redundant_rows_are_harmless() {
        let mut builder = ModelBuilder::new();
        let x = builder.real("x");
        let y = builder.real("y");
        builder
            .constrain((x + y).equals(3i64))
            .constrain((x - y).equals(1i64))
            .constrain((x * 2i64 + y * 2i64).equals(6i64));
        let model = builder.build().unwrap();

        let Verdict::Satisfiable(assignment) = RationalSolver.check(&model) else { panic!("expected a solution") };
        assert_eq!(assignment.value(x), Some(&Coef::from_integer(BigInt::from(2))));
    }

    #[test]
    fn rejects_inconsistent_system() {
        let mut builder = ModelBuilder::new();
        let x = builder.real("x");
        let y = builder.real("y");
        builder
            .constrain((x + y).equals(3i64))
            .constrain((x + y).equals(4i64));

        assert_eq!(RationalSolver.check(&builder.build().unwrap()), Verdict::Unsatisfiable);
    }

    #[test]
    fn under_determined_is_indeterminate() {
        let mut builder = ModelBuilder::new();
        let x = builder.integer("x");
        let y = builder.integer("y");
        let z = builder.integer("z");
        builder.constrain((x + y + z).equals(3i64)).minimize(x + y);
        assert_eq!(RationalSolver.check(&builder.build().unwrap()), Verdict::Indeterminate);

        let mut builder = ModelBuilder::new();
        let x = builder.real("x");
        let y = builder.real("y");
        builder.constrain((x + y).equals(3i64));
        assert_eq!(RationalSolver.check(&builder.build().unwrap()), Verdict::Indeterminate);
    }

    fn parallel_buttons(prize: i64) -> (ModelBuilder, Unknown, Unknown) {
        let mut builder = ModelBuilder::new();
        let a = builder.integer("hit_a");
        let b = builder.integer("hit_b");
        builder
            .constrain_all([a.at_least(0i64), b.at_least(0i64)])
            .constrain((a * 3i64 + b * 5i64).equals(prize))
            .constrain((a * 6i64 + b * 10i64).equals(prize * 2))
            .minimize(a * 3i64 + b);
        (builder, a, b)
    }

    #[test]
    fn walks_a_single_free_unknown() {
        let (builder, a, b) = parallel_buttons(10000000000001);
        let Verdict::Satisfiable(assignment) = RationalSolver.check(&builder.build().unwrap()) else {
            panic!("expected a solution")
        };
        assert_eq!(assignment.integer(a).unwrap(), BigInt::from(2));
        assert_eq!(assignment.integer(b).unwrap(), BigInt::from(1999999999999i64));
    }

    #[test]
    fn free_unknown_respects_bounds_and_residues() {
        // 3a + 5b = 7 has no non-negative integer solution
        let (builder, _, _) = parallel_buttons(7);
        assert_eq!(RationalSolver.check(&builder.build().unwrap()), Verdict::Unsatisfiable);

        // 3a + 5b = 31 at (7, 2) or (2, 5); the cap on b rules out the cheaper one
        let (mut builder, a, b) = parallel_buttons(31);
        builder.constrain(b.at_most(4i64));
        let Verdict::Satisfiable(assignment) = RationalSolver.check(&builder.build().unwrap()) else {
            panic!("expected a solution")
        };
        assert_eq!(assignment.integer(a).unwrap(), BigInt::from(7));
        assert_eq!(assignment.integer(b).unwrap(), BigInt::from(2));
    }

    #[test]
    fn unbounded_objective_is_indeterminate() {
        let mut builder = ModelBuilder::new();
        let x = builder.integer("x");
        let y = builder.integer("y");
        builder.constrain((x - y).equals(1i64)).maximize(x + y);
        assert_eq!(RationalSolver.check(&builder.build().unwrap()), Verdict::Indeterminate);
    }

    #[test]
    fn even_sums_need_even_halves() {
        let mut builder = ModelBuilder::new();
        let x = builder.integer("x");
        let y = builder.integer("y");
        builder.constrain((x * 2i64 + y * 4i64).equals(3i64));
        assert_eq!(RationalSolver.check(&builder.build().unwrap()), Verdict::Unsatisfiable);
    }

    #[test]
    fn checks_integrality_and_inequalities() {
        let mut builder = ModelBuilder::new();
        let x = builder.integer("x");
        builder.constrain((x * 2i64).equals(3i64));
        assert_eq!(RationalSolver.check(&builder.build().unwrap()), Verdict::Unsatisfiable);

        let mut builder = ModelBuilder::new();
        let x = builder.integer("x");
        builder.constrain(x.equals(-2i64)).constrain(x.at_least(0i64));
        assert_eq!(RationalSolver.check(&builder.build().unwrap()), Verdict::Unsatisfiable);
    }

    #[test]
    fn empty_model_is_satisfiable() {
        let model = ModelBuilder::new().build().unwrap();
        assert!(matches!(RationalSolver.check(&model), Verdict::Satisfiable(_)));
    }
}

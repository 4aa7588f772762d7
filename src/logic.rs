use itertools::Itertools;
use varisat::{Lit, Var};

/// Hands out SAT variables in index order.
#[derive(Debug, Default)]
pub(crate) struct VarPool {
    next: usize,
}

impl VarPool {
    pub(crate) fn fresh(&mut self) -> Var {
        let var = Var::from_index(self.next);
        self.next += 1;
        var
    }

    pub(crate) fn len(&self) -> usize {
        self.next
    }
}

/// Clauses forcing the XOR of `lits` to be `odd`.
///
/// Long XORs are chained through fresh variables: `y_1 = x_0 ^ x_1`, `y_2 = y_1 ^ x_2`, ...
/// Each link `y = a ^ b` is `(!y + a + b)(!y + !a + !b)(y + !a + b)(y + a + !b)`.
/// An empty `lits` with `odd` set yields the empty clause.
pub(crate) fn xor_equals(pool: &mut VarPool, lits: &[Lit], odd: bool) -> Vec<Vec<Lit>> {
    let Some((&first, rest)) = lits.split_first() else {
        return if odd { vec![vec![]] } else { vec![] };
    };

    let mut clauses = Vec::with_capacity(4 * rest.len() + 1);
    let mut acc = first;
    for &next in rest {
        let y = pool.fresh().positive();
        clauses.extend([
            vec![!y, acc, next],
            vec![!y, !acc, !next],
            vec![y, !acc, next],
            vec![y, acc, !next],
        ]);
        acc = y;
    }
    clauses.push(vec![if odd { acc } else { !acc }]);

    clauses
}

/// A sequential counter over some literals.
///
/// `at_least[j - 1]` is forced true whenever `j` or more of the counted literals are true.
/// Only that direction is encoded, which is all a bound needs: assuming `!at_least[k]` allows at most `k`.
#[derive(Debug)]
pub(crate) struct Counter {
    at_least: Vec<Lit>,
}

impl Counter {
    /// Build the counter over `lits`, returning it with its clauses.
    pub(crate) fn new(pool: &mut VarPool, lits: &[Lit]) -> (Self, Vec<Vec<Lit>>) {
        let mut clauses = Vec::new();
        // registers of the previous prefix; prev[j - 1] means "at least j so far"
        let mut prev: Vec<Lit> = Vec::new();

        for &x in lits {
            let regs = (0..=prev.len()).map(|_| pool.fresh().positive()).collect_vec();

            // x alone counts one
            clauses.push(vec![!x, regs[0]]);
            for (j, &before) in prev.iter().enumerate() {
                // counts carry over
                clauses.push(vec![!before, regs[j]]);
                // and x adds one to them
                clauses.push(vec![!x, !before, regs[j + 1]]);
            }

            prev = regs;
        }

        (Self { at_least: prev }, clauses)
    }

    /// The assumption that caps the count at `k`, or `None` if any count is at most `k`.
    pub(crate) fn at_most(&self, k: usize) -> Option<Lit> {
        self.at_least.get(k).map(|lit| !*lit)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::identity;

    use itertools::Itertools;
    use varisat::{CnfFormula, Lit, Solver};

    use crate::logic::{xor_equals, Counter, VarPool};

    fn solve(clauses: Vec<Vec<Lit>>, assumptions: &[Lit]) -> Option<Vec<Lit>> {
        let mut solver = Solver::new();
        solver.add_formula(&CnfFormula::from(clauses));
        solver.assume(assumptions);
        solver.solve().is_ok_and(identity).then(|| solver.model()).flatten()
    }

    #[test]
    fn xor_respects_every_input_pattern() {
        for pattern in 0..16u32 {
            let mut pool = VarPool::default();
            let lits = (0..4).map(|_| pool.fresh().positive()).collect_vec();
            let fixed = lits.iter().enumerate()
                .map(|(i, lit)| if pattern & (1 << i) != 0 { *lit } else { !*lit })
                .collect_vec();
            let odd = pattern.count_ones() % 2 == 1;

            assert!(solve(xor_equals(&mut pool, &lits, odd), &fixed).is_some(), "pattern {pattern:04b}");
            assert!(solve(xor_equals(&mut pool, &lits, !odd), &fixed).is_none(), "pattern {pattern:04b}");
        }
    }

    #[test]
    fn empty_xor() {
        let mut pool = VarPool::default();
        assert!(xor_equals(&mut pool, &[], false).is_empty());
        assert_eq!(xor_equals(&mut pool, &[], true), vec![Vec::<Lit>::new()]);
    }

    #[test]
    fn counter_caps_true_literals() {
        let mut pool = VarPool::default();
        let lits = (0..5).map(|_| pool.fresh().positive()).collect_vec();
        let (counter, mut clauses) = Counter::new(&mut pool, &lits);
        // at least three of the five must hold
        clauses.extend(lits.iter().copied().combinations(3));

        assert!(solve(clauses.clone(), &[counter.at_most(2).unwrap()]).is_none());
        let model = solve(clauses, &[counter.at_most(3).unwrap()]).unwrap();
        assert_eq!(lits.iter().filter(|lit| model.contains(lit)).count(), 3);
        assert_eq!(counter.at_most(5), None);
    }
}

use std::convert::identity;

use itertools::Itertools;
use tracing::{debug, trace};
use varisat::{CnfFormula, Lit, Solver};

use crate::logic::{xor_equals, Counter, VarPool};

/// Buttons that each toggle a set of lights, and the on/off pattern they should produce from all-off.
///
/// Pressing a button twice undoes it, so a solution presses every button at most once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParitySystem {
    buttons: Vec<Vec<usize>>,
    target: Vec<bool>,
}

impl ParitySystem {
    /// A system over `target.len()` lights. Light indices in `buttons` are assumed to be in range.
    pub fn new(buttons: Vec<Vec<usize>>, target: Vec<bool>) -> Self {
        Self { buttons, target }
    }

    /// The fewest presses reaching the target pattern, or `None` if it cannot be reached.
    ///
    /// # Logical setup
    /// There is one variable per button, true if the button is pressed.
    ///
    /// For each light L, the XOR of the buttons toggling L an odd number of times equals L's target state.
    ///
    /// A sequential counter over the button variables bounds the number pressed.
    /// The bound is searched upwards from zero, passed to the solver as an assumption so the clauses are built once.
    pub fn min_presses(&self) -> Option<usize> {
        let mut pool = VarPool::default();
        let presses = self.buttons.iter().map(|_| pool.fresh().positive()).collect_vec();

        let mut formula: Vec<Vec<Lit>> = Vec::new();
        for (light, &on) in self.target.iter().enumerate() {
            // a button listing a light twice leaves it as it was
            let toggling = self.buttons.iter()
                .zip(presses.iter())
                .filter(|(lights, _)| lights.iter().filter(|l| **l == light).count() % 2 == 1)
                .map(|(_, press)| *press)
                .collect_vec();

            if toggling.is_empty() && on {
                trace!(light, "no button reaches light");
                return None;
            }

            formula.extend(xor_equals(&mut pool, &toggling, on));
        }

        let (counter, counter_clauses) = Counter::new(&mut pool, &presses);
        formula.extend(counter_clauses);
        trace!(buttons = presses.len(), lights = self.target.len(), vars = pool.len(), clauses = formula.len(), "parity system encoded");

        let mut solver = Solver::new();
        solver.add_formula(&CnfFormula::from(formula));
        if !solver.solve().is_ok_and(identity) {
            debug!("indicator pattern unreachable");
            return None;
        }

        let found = (0..presses.len())
            .find(|k| {
                let bound = counter.at_most(*k).into_iter().collect_vec();
                solver.assume(&bound);
                solver.solve().is_ok_and(identity)
            })
            .unwrap_or(presses.len());
        debug!(presses = found, "parity system solved");

        Some(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::parity::ParitySystem;

    fn pattern(diagram: &str) -> Vec<bool> {
        diagram.chars().map(|c| c == '#').collect()
    }

    #[test]
    fn first_factory_machine() {
        let system = ParitySystem::new(
            vec![vec![3], vec![1, 3], vec![2], vec![2, 3], vec![0, 2], vec![0, 1]],
            pattern(".##."),
        );
        assert_eq!(system.min_presses(), Some(2));
    }

    #[test]
    fn all_off_needs_nothing() {
        let system = ParitySystem::new(vec![vec![0, 1], vec![1]], pattern("..."));
        assert_eq!(system.min_presses(), Some(0));
    }

    #[test]
    fn unreachable_light() {
        let system = ParitySystem::new(vec![vec![0, 1]], pattern("..#"));
        assert_eq!(system.min_presses(), None);
    }

    #[test]
    fn conflicting_parities() {
        // the only button toggles both lights together
        let system = ParitySystem::new(vec![vec![0, 1]], pattern("#."));
        assert_eq!(system.min_presses(), None);
    }

    #[test]
    fn double_listing_cancels() {
        let system = ParitySystem::new(vec![vec![0, 0], vec![0]], pattern("#"));
        assert_eq!(system.min_presses(), Some(1));
    }
}

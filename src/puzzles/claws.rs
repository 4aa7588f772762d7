//! Claw machines with two buttons, each moving the claw by a fixed offset.
//!
//! ```text
//! Button A: X+94, Y+34
//! Button B: X+22, Y+67
//! Prize: X=8400, Y=5400
//! ```
//!
//! Button A costs three tokens, button B one. The answer is the fewest tokens winning every winnable prize.

use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::Zero;
use serde::Deserialize;
use tracing::debug;

use crate::builder::ModelBuilder;
use crate::error::{ParseError, Result};
use crate::puzzles::non_empty;
use crate::record::NumericRecord;
use crate::solver::ConstraintSolver;

/// How prizes are placed and how often a button may be pressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ClawRules {
    /// Added to both prize coordinates.
    #[serde(default)]
    pub prize_offset: i64,
    /// Most presses allowed per button, if limited.
    #[serde(default)]
    pub press_limit: Option<u64>,
}

impl ClawRules {
    /// Prizes where they are written, and at most 100 presses per button.
    pub const PART_ONE: ClawRules = ClawRules { prize_offset: 0, press_limit: Some(100) };
    /// Prizes ten trillion units further along both axes, and no press limit.
    pub const PART_TWO: ClawRules = ClawRules { prize_offset: 10000000000000, press_limit: None };
}

/// One claw machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClawMachine {
    line: usize,
    a: [BigInt; 2],
    b: [BigInt; 2],
    prize: [BigInt; 2],
}

impl ClawMachine {
    /// A machine with the given button deltas and prize, as if read from `line`.
    pub fn new(line: usize, a: [BigInt; 2], b: [BigInt; 2], prize: [BigInt; 2]) -> Self {
        Self { line, a, b, prize }
    }

    /// The line the machine's first button was read from.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Fewest tokens winning this machine's prize under `rules`, or `None` if it cannot be won.
    pub fn cost(&self, rules: &ClawRules, solver: &dyn ConstraintSolver) -> Result<Option<BigInt>> {
        let offset = BigInt::from(rules.prize_offset);

        let mut builder = ModelBuilder::new();
        let hit_a = builder.integer("hit_a");
        let hit_b = builder.integer("hit_b");
        builder
            .constrain(hit_a.at_least(0i64))
            .constrain(hit_b.at_least(0i64));
        if let Some(limit) = rules.press_limit {
            let limit = BigInt::from(limit);
            builder
                .constrain(hit_a.at_most(&limit))
                .constrain(hit_b.at_most(&limit));
        }
        for axis in 0..2 {
            builder.constrain((hit_a * &self.a[axis] + hit_b * &self.b[axis]).equals(&self.prize[axis] + &offset));
        }
        let tokens = hit_a * 3i64 + hit_b;
        builder.minimize(tokens.clone());

        let what = format!("claw machine on line {}", self.line);
        let Some(assignment) = builder.build()?.solve(solver).optional(&what)? else {
            debug!(line = self.line, "prize cannot be won");
            return Ok(None);
        };

        let cost = assignment.evaluate(&tokens)
            .filter(|cost| cost.is_integer())
            .map(|cost| cost.to_integer());
        debug!(line = self.line, cost = ?cost, "prize won");

        Ok(cost)
    }
}

fn machine(chunk: &[(usize, &str)]) -> std::result::Result<ClawMachine, ParseError> {
    match *chunk {
        [(line, a), (b_line, b), (prize_line, prize)] => {
            let a = NumericRecord::parse(line, a)?.exactly::<2>()?;
            let b = NumericRecord::parse(b_line, b)?.exactly::<2>()?;
            let prize = NumericRecord::parse(prize_line, prize)?.exactly::<2>()?;
            Ok(ClawMachine::new(line, a, b, prize))
        }
        [(line, _)] => Err(ParseError::IncompleteMachine { line, missing: "button B" }),
        [_, (line, _)] => Err(ParseError::IncompleteMachine { line, missing: "prize" }),
        [_, _, _, (line, _), ..] => Err(ParseError::OverlongMachine { line }),
        [] => Err(ParseError::EmptyInput),
    }
}

/// Read machines: blocks of three lines separated by blank lines, with two integers per line.
pub fn parse(input: &str) -> std::result::Result<Vec<ClawMachine>, ParseError> {
    let blocks = input.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .chunk_by(|(_, line)| line.is_empty());
    let machines = blocks.into_iter()
        .filter(|(blank, _)| !blank)
        .map(|(_, block)| machine(&block.collect_vec()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    non_empty(machines)
}

/// Total tokens over all winnable machines; machines that cannot be won count zero.
pub fn total_cost(machines: &[ClawMachine], rules: &ClawRules, solver: &dyn ConstraintSolver) -> Result<BigInt> {
    machines.iter()
        .map(|machine| machine.cost(rules, solver).map(Option::unwrap_or_default))
        .fold_ok(BigInt::zero(), |total, cost| total + cost)
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use crate::error::ParseError;
    use crate::exact::RationalSolver;
    use crate::lp::MilpSolver;
    use crate::puzzles::claws::{parse, ClawMachine, ClawRules};
    use crate::solver::Cascade;

    fn machine(a: [i64; 2], b: [i64; 2], prize: [i64; 2]) -> ClawMachine {
        ClawMachine::new(1, a.map(BigInt::from), b.map(BigInt::from), prize.map(BigInt::from))
    }

    #[test]
    fn first_example_machine() {
        let machine = machine([94, 34], [22, 67], [8400, 5400]);
        assert_eq!(machine.cost(&ClawRules::PART_ONE, &RationalSolver).unwrap(), Some(BigInt::from(280)));
        assert_eq!(machine.cost(&ClawRules::PART_TWO, &RationalSolver).unwrap(), None);
    }

    #[test]
    fn second_example_machine_far_away() {
        let machine = machine([26, 66], [67, 21], [12748, 12176]);
        assert_eq!(machine.cost(&ClawRules::PART_ONE, &RationalSolver).unwrap(), None);
        assert_eq!(machine.cost(&ClawRules::PART_TWO, &RationalSolver).unwrap(), Some(BigInt::from(459236326669i64)));
    }

    #[test]
    fn parallel_buttons_far_away() {
        // 3a + 5b = 10000000000001 is won at a = 2, b = 1999999999999
        let machine = machine([3, 3], [5, 5], [1, 1]);
        let expected = Some(BigInt::from(2000000000005i64));
        assert_eq!(machine.cost(&ClawRules::PART_TWO, &RationalSolver).unwrap(), expected);
        assert_eq!(machine.cost(&ClawRules::PART_TWO, &Cascade::new(RationalSolver, MilpSolver)).unwrap(), expected);
        assert_eq!(machine.cost(&ClawRules::PART_ONE, &RationalSolver).unwrap(), None);
    }

    #[test]
    fn press_limit_applies() {
        // exactly 101 presses of A needed
        let machine = machine([1, 1], [5, 7], [101, 101]);
        assert_eq!(machine.cost(&ClawRules::PART_ONE, &RationalSolver).unwrap(), None);
        let unlimited = ClawRules { prize_offset: 0, press_limit: None };
        assert_eq!(machine.cost(&unlimited, &RationalSolver).unwrap(), Some(BigInt::from(303)));
    }

    #[test]
    fn parses_groups() {
        let machines = parse("Button A: X+94, Y+34\nButton B: X+22, Y+67\nPrize: X=8400, Y=5400\n\n\
            Button A: X+26, Y+66\nButton B: X+67, Y+21\nPrize: X=12748, Y=12176\n").unwrap();
        assert_eq!(machines.len(), 2);
        assert_eq!(machines[1].line(), 5);
    }

    #[test]
    fn rejects_incomplete_group() {
        assert_eq!(
            parse("Button A: X+94, Y+34\nButton B: X+22, Y+67\nPrize: X=8400, Y=5400\n\nButton A: X+26, Y+66\n"),
            Err(ParseError::IncompleteMachine { line: 5, missing: "button B" }),
        );
        assert_eq!(
            parse("Button A: X+94, Y+34\nButton B: X+22\nPrize: X=8400, Y=5400\n"),
            Err(ParseError::TokenCount { line: 2, expected: 2, found: 1 }),
        );
        assert_eq!(parse("\n\n"), Err(ParseError::EmptyInput));
    }

    #[test]
    fn short_machine_does_not_borrow_from_the_next() {
        assert_eq!(
            parse("Button A: X+94, Y+34\nButton B: X+22, Y+67\n\n\
                Button A: X+26, Y+66\nButton B: X+67, Y+21\nPrize: X=12748, Y=12176\n\n\
                Button A: X+17, Y+86\nButton B: X+84, Y+37\nPrize: X=7870, Y=6450\nPrize: X=1, Y=1\n"),
            Err(ParseError::IncompleteMachine { line: 2, missing: "prize" }),
        );
        assert_eq!(
            parse("Button A: X+94, Y+34\nButton B: X+22, Y+67\nPrize: X=8400, Y=5400\nPrize: X=1, Y=1\n"),
            Err(ParseError::OverlongMachine { line: 4 }),
        );
    }
}

//! One module per puzzle. Each parses its input, builds models or graphs, and reduces them to one integer.

use std::fmt;

use num_bigint::BigInt;
use strum::{Display, EnumString, VariantArray};
use tracing::info;

use crate::config::PuzzleConfig;
use crate::cut::StoerWagner;
use crate::error::{ParseError, Result};

pub mod claws;
pub mod hailstones;
pub mod lights;
pub mod wiring;

/// The puzzles this crate knows how to solve.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Display, EnumString, VariantArray)]
#[strum(serialize_all = "lowercase")]
pub enum Puzzle {
    /// Throw a rock through every hailstone; or count crossing hailstone paths.
    Hailstones,
    /// Win prizes from claw machines with as few tokens as possible.
    Claws,
    /// Configure factory machines with as few button presses as possible.
    Lights,
    /// Cut a wiring diagram in two.
    Wiring,
}

/// Which half of a puzzle to answer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Display, EnumString, VariantArray)]
#[strum(serialize_all = "lowercase")]
pub enum Part {
    /// The first, usually smaller, question.
    One,
    /// The second question.
    #[default]
    Two,
}

/// The integer a puzzle asks for, and any lines worth showing before it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Answer {
    /// The answer.
    pub value: BigInt,
    /// Lines to print ahead of the answer, in order.
    pub diagnostics: Vec<String>,
}

impl From<BigInt> for Answer {
    fn from(value: BigInt) -> Self {
        Self { value, diagnostics: Vec::new() }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.diagnostics.iter() {
            writeln!(f, "{line}")?;
        }
        write!(f, "{}", self.value)
    }
}

impl Puzzle {
    /// Answer `part` of this puzzle for the puzzle text `input`.
    pub fn solve(self, part: Part, input: &str, config: &PuzzleConfig) -> Result<Answer> {
        info!(puzzle = %self, %part, backend = %config.backend, "solving");
        let solver = config.backend.solver();

        let answer = match (self, part) {
            (Puzzle::Hailstones, Part::One) => {
                let stones = hailstones::parse(input)?;
                hailstones::count_crossings(&stones, &config.hailstones).map(Answer::from)?
            }
            (Puzzle::Hailstones, Part::Two) => hailstones::rock_through_all(&hailstones::parse(input)?, solver.as_ref())?,
            (Puzzle::Claws, part) => {
                let rules = match part {
                    Part::One => &config.claws.part_one,
                    Part::Two => &config.claws.part_two,
                };
                claws::total_cost(&claws::parse(input)?, rules, solver.as_ref()).map(Answer::from)?
            }
            (Puzzle::Lights, Part::One) => lights::fewest_toggles(&lights::parse(input)?).map(Answer::from)?,
            (Puzzle::Lights, Part::Two) => lights::fewest_presses(&lights::parse(input)?, solver.as_ref()).map(Answer::from)?,
            (Puzzle::Wiring, _) => {
                let graph = wiring::parse(input)?;
                wiring::split(&graph, config.wiring.expected_cut, &StoerWagner).map(Answer::from)?
            }
        };
        info!(puzzle = %self, %part, value = %answer.value, "solved");

        Ok(answer)
    }
}

/// The non-blank lines of `input`, trimmed, with their 1-based line numbers.
pub(crate) fn numbered_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Fail with [`ParseError::EmptyInput`] if `items` is empty.
pub(crate) fn non_empty<T>(items: Vec<T>) -> std::result::Result<Vec<T>, ParseError> {
    if items.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    Ok(items)
}

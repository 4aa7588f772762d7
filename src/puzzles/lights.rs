//! Factory machines, one per line:
//!
//! ```text
//! [.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
//! ```
//!
//! The diagram in square brackets is the indicator pattern, each parenthesised list is a button and the lights it
//! affects, and the list in braces is the target count per light. A target may also be written in square brackets.

use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::Zero;
use tracing::debug;

use crate::builder::ModelBuilder;
use crate::error::{ParseError, Result};
use crate::expr::{LinExpr, Unknown};
use crate::parity::ParitySystem;
use crate::puzzles::{non_empty, numbered_lines};
use crate::solver::ConstraintSolver;

/// One machine: an optional indicator diagram, its buttons, and the target value of each light.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightMachine {
    line: usize,
    indicator: Option<Vec<bool>>,
    buttons: Vec<Vec<usize>>,
    target: Vec<BigInt>,
}

fn delimited<'a>(token: &'a str, open: char, close: char) -> Option<&'a str> {
    token.strip_prefix(open)?.strip_suffix(close)
}

fn list<T: std::str::FromStr>(line: usize, token: &str, inner: &str) -> std::result::Result<Vec<T>, ParseError> {
    inner.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().map_err(|_| ParseError::BadToken { line, token: token.to_string() }))
        .collect()
}

impl LightMachine {
    /// Read a machine from `text` on 1-based line `line`.
    pub fn parse(line: usize, text: &str) -> std::result::Result<Self, ParseError> {
        let mut tokens = text.split_whitespace().collect_vec();

        let indicator = match tokens.first().and_then(|token| delimited(token, '[', ']')) {
            Some(diagram) if diagram.chars().all(|c| c == '.' || c == '#') => {
                tokens.remove(0);
                Some(diagram.chars().map(|c| c == '#').collect_vec())
            }
            _ => None,
        };

        let target_token = tokens.pop().ok_or(ParseError::MissingTarget { line })?;
        let target_inner = delimited(target_token, '{', '}')
            .or_else(|| delimited(target_token, '[', ']'))
            .ok_or(ParseError::MissingTarget { line })?;
        let target: Vec<BigInt> = list(line, target_token, target_inner)?;

        let buttons = tokens.into_iter()
            .map(|token| {
                let inner = delimited(token, '(', ')').ok_or_else(|| ParseError::BadToken { line, token: token.to_string() })?;
                list::<usize>(line, token, inner)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if let Some(light) = buttons.iter().flatten().copied().find(|light| *light >= target.len()) {
            return Err(ParseError::LightOutOfRange { line, light, lights: target.len() });
        }
        if let Some(indicator) = indicator.as_ref().filter(|indicator| indicator.len() != target.len()) {
            return Err(ParseError::IndicatorMismatch { line, indicator: indicator.len(), target: target.len() });
        }

        Ok(Self { line, indicator, buttons, target })
    }

    /// The line this machine was read from.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Fewest button presses bringing every light's counter from zero to its target, or `None` if impossible.
    ///
    /// Each press adds one to every light the button lists.
    pub fn fewest_presses(&self, solver: &dyn ConstraintSolver) -> Result<Option<BigInt>> {
        let mut builder = ModelBuilder::new();
        let presses = (0..self.buttons.len())
            .map(|i| builder.integer(format!("button_{i}")))
            .collect_vec();
        builder.constrain_all(presses.iter().map(|press| press.at_least(0i64)));

        for (light, expr) in self.light_sums(&presses).into_iter().enumerate() {
            builder.constrain(expr.equals(&self.target[light]));
        }
        let total = presses.iter().copied().sum::<LinExpr>();
        builder.minimize(total.clone());

        let what = format!("machine on line {}", self.line);
        let Some(assignment) = builder.build()?.solve(solver).optional(&what)? else {
            debug!(line = self.line, "targets unreachable");
            return Ok(None);
        };

        let count = assignment.evaluate(&total)
            .filter(|count| count.is_integer())
            .map(|count| count.to_integer());
        debug!(line = self.line, presses = ?count, "targets reached");

        Ok(count)
    }

    /// For each light, the sum of the presses of the buttons affecting it.
    fn light_sums(&self, presses: &[Unknown]) -> Vec<LinExpr> {
        (0..self.target.len())
            .map(|light| self.buttons.iter()
                .zip(presses)
                .map(|(button, press)| *press * button.iter().filter(|l| **l == light).count() as i64)
                .sum::<LinExpr>())
            .collect()
    }

    /// Fewest presses turning exactly the indicator's `#` lights on, or `None` if impossible.
    pub fn fewest_toggles(&self) -> std::result::Result<Option<usize>, ParseError> {
        let indicator = self.indicator.clone().ok_or(ParseError::MissingIndicator { line: self.line })?;
        Ok(ParitySystem::new(self.buttons.clone(), indicator).min_presses())
    }
}

/// Read every line starting with `[` as a machine; other lines are ignored.
pub fn parse(input: &str) -> std::result::Result<Vec<LightMachine>, ParseError> {
    let machines = numbered_lines(input)
        .filter(|(_, text)| text.starts_with('['))
        .map(|(line, text)| LightMachine::parse(line, text))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    non_empty(machines)
}

/// Total presses over all machines when counting up to targets; impossible machines count zero.
pub fn fewest_presses(machines: &[LightMachine], solver: &dyn ConstraintSolver) -> Result<BigInt> {
    machines.iter()
        .map(|machine| machine.fewest_presses(solver).map(Option::unwrap_or_default))
        .fold_ok(BigInt::zero(), |total, presses| total + presses)
}

/// Total presses over all machines when matching indicator patterns; impossible machines count zero.
pub fn fewest_toggles(machines: &[LightMachine]) -> Result<BigInt> {
    let total = machines.iter()
        .map(|machine| machine.fewest_toggles().map(Option::unwrap_or_default))
        .fold_ok(0usize, |total, presses| total + presses)?;

    Ok(BigInt::from(total))
}

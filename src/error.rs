use num_rational::BigRational;
use thiserror::Error;

use crate::builder::BuilderInvalidReason;
use crate::config::ConfigError;

/// Reasons puzzle text may be rejected. Line numbers are 1-based.
#[allow(missing_docs)]
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input held no non-blank lines.
    #[error("input is empty")]
    EmptyInput,
    /// A line expected to carry numbers carried none.
    #[error("line {line}: no integers found")]
    NoNumbers { line: usize },
    /// A line carried a different number of integers than its grammar allows.
    #[error("line {line}: expected {expected} integers, found {found}")]
    TokenCount { line: usize, expected: usize, found: usize },
    /// A claw machine was cut short by the end of the input.
    #[error("line {line}: machine is missing its {missing} line")]
    IncompleteMachine { line: usize, missing: &'static str },
    /// A claw machine ran past its prize line without a blank line.
    #[error("line {line}: machine has more than three lines")]
    OverlongMachine { line: usize },
    /// A token did not match the grammar of its position.
    #[error("line {line}: malformed token `{token}`")]
    BadToken { line: usize, token: String },
    /// A machine line did not end in a target vector.
    #[error("line {line}: missing target vector")]
    MissingTarget { line: usize },
    /// Part one of the light puzzle needs the `[.##.]` diagram.
    #[error("line {line}: missing indicator diagram")]
    MissingIndicator { line: usize },
    /// A button refers to a light the target vector does not have.
    #[error("line {line}: button toggles light {light} but only {lights} lights exist")]
    LightOutOfRange { line: usize, light: usize, lights: usize },
    /// The diagram and the target vector disagree on the number of lights.
    #[error("line {line}: indicator has {indicator} lights but target has {target}")]
    IndicatorMismatch { line: usize, indicator: usize, target: usize },
    /// A wiring line was not of the form `<node>: <node> ...`.
    #[error("line {line}: expected `<node>: <node> ...`")]
    BadWiring { line: usize },
}

/// Everything that can go wrong between reading puzzle text and printing an answer.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum Error {
    /// The puzzle text was malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A model was built incorrectly.
    #[error("model is invalid: {0:?}")]
    Build(Vec<BuilderInvalidReason>),
    /// A model that must have a solution has none.
    #[error("no assignment satisfies {0}")]
    Unsatisfiable(String),
    /// The solver answered neither sat nor unsat.
    #[error("solver could not decide {0}")]
    Indeterminate(String),
    /// A value that must be whole was fractional.
    #[error("{what} is not an integer: {value}")]
    NotIntegral { what: String, value: BigRational },
    /// The rock would have to hit a hailstone before it is thrown.
    #[error("hailstone on line {line} would be hit at negative time {time}")]
    NegativeTime { line: usize, time: BigRational },
    /// The rock misses a hailstone.
    #[error("hailstone on line {line} is never hit by the rock")]
    Missed { line: usize },
    /// The graph has fewer than two nodes.
    #[error("graph has no edge to cut")]
    NoCut,
    /// The minimum cut was not of the expected size.
    #[error("minimum cut has {found} edges, expected {expected}")]
    CutSize { found: usize, expected: usize },
    /// Removing the cut did not leave exactly two components.
    #[error("cutting the graph left {0} components, expected 2")]
    Partition(usize),
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<Vec<BuilderInvalidReason>> for Error {
    fn from(reasons: Vec<BuilderInvalidReason>) -> Self {
        Self::Build(reasons)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

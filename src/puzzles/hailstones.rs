//! Hailstones flying in straight lines at constant speed, one per line: `px, py, pz @ vx, vy, vz`.

use itertools::Itertools;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use tracing::debug;

use crate::builder::ModelBuilder;
use crate::config::HailstoneConfig;
use crate::error::{Error, ParseError, Result};
use crate::exact::RationalSolver;
use crate::expr::{Coef, LinExpr, Unknown};
use crate::model::Verdict;
use crate::puzzles::{non_empty, numbered_lines, Answer};
use crate::record::NumericRecord;
use crate::solver::ConstraintSolver;

/// One hailstone's position at time zero and its velocity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hailstone {
    line: usize,
    position: [BigInt; 3],
    velocity: [BigInt; 3],
}

impl Hailstone {
    /// Read a hailstone from `text` on 1-based line `line`.
    pub fn parse(line: usize, text: &str) -> std::result::Result<Self, ParseError> {
        let [px, py, pz, vx, vy, vz] = NumericRecord::parse(line, text)?.exactly::<6>()?;
        Ok(Self { line, position: [px, py, pz], velocity: [vx, vy, vz] })
    }

    /// The line this hailstone was read from.
    pub fn line(&self) -> usize {
        self.line
    }

    fn position_cross_velocity(&self) -> [BigInt; 3] {
        cross(&self.position, &self.velocity)
    }
}

fn cross(a: &[BigInt; 3], b: &[BigInt; 3]) -> [BigInt; 3] {
    std::array::from_fn(|axis| {
        let (next, last) = ((axis + 1) % 3, (axis + 2) % 3);
        &a[next] * &b[last] - &a[last] * &b[next]
    })
}

fn difference(a: &[BigInt; 3], b: &[BigInt; 3]) -> [BigInt; 3] {
    std::array::from_fn(|axis| &a[axis] - &b[axis])
}

/// Read one hailstone per non-blank line.
pub fn parse(input: &str) -> std::result::Result<Vec<Hailstone>, ParseError> {
    let stones = numbered_lines(input)
        .map(|(line, text)| Hailstone::parse(line, text))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    non_empty(stones)
}

/// The rock thrown from `(x, y, z)` at `(dx, dy, dz)` that hits every hailstone, answered by `x + y + z`.
///
/// # Model
/// The rock hits stone `i` at time `t_i` if `P + t_i V = p_i + t_i v_i`, i.e. if `(P - p_i) × (V - v_i) = 0`.
/// Expanding, `P × V - P × v_i - p_i × V + p_i × v_i = 0`.
/// The `P × V` term is the same for every stone, so subtracting stone 0's equation from stone `i`'s leaves
///
/// ```text
///   P × (v_i - v_0) + (p_i - p_0) × V = p_i × v_i - p_0 × v_0
/// ```
///
/// which is linear in the six unknowns. Every stone contributes three such rows.
///
/// The times are recovered from the solution and must be non-negative and agree across the three axes.
///
/// The answer's diagnostics are the verdict and each coordinate of the starting position.
pub fn rock_through_all(stones: &[Hailstone], solver: &dyn ConstraintSolver) -> Result<Answer> {
    let Some((first, rest)) = stones.split_first() else {
        return Err(ParseError::EmptyInput.into());
    };

    let mut builder = ModelBuilder::new();
    let position: [Unknown; 3] = ["x", "y", "z"].map(|name| builder.real(name));
    let velocity: [Unknown; 3] = ["dx", "dy", "dz"].map(|name| builder.real(name));

    let first_moment = first.position_cross_velocity();
    for stone in rest {
        let dp = difference(&stone.position, &first.position);
        let dv = difference(&stone.velocity, &first.velocity);
        let moment = stone.position_cross_velocity();

        for axis in 0..3 {
            let (next, last) = ((axis + 1) % 3, (axis + 2) % 3);
            let lhs = position[next] * &dv[last] - position[last] * &dv[next]
                + velocity[last] * &dp[next] - velocity[next] * &dp[last];
            builder.constrain(lhs.equals(&moment[axis] - &first_moment[axis]));
        }
    }

    let solved = builder.build()?.solve(solver);
    let verdict = solved.verdict().to_string();
    let rock = solved.require("rock trajectory")?;

    let start = position.map(|unknown| rock.value(unknown).cloned().unwrap_or_else(Coef::zero));
    let speed = velocity.map(|unknown| rock.value(unknown).cloned().unwrap_or_else(Coef::zero));
    for stone in stones {
        let time = collision_time(stone, &start, &speed)?;
        debug!(line = stone.line, %time, "rock hits hailstone");
    }

    let sum = position.into_iter().map(LinExpr::from).sum::<LinExpr>();
    let total = rock.evaluate(&sum).unwrap_or_else(Coef::zero);
    if !total.is_integer() {
        return Err(Error::NotIntegral { what: "x + y + z".to_string(), value: total });
    }

    let mut diagnostics = vec![verdict];
    diagnostics.extend(["x", "y", "z"].iter().zip(start.iter()).map(|(name, value)| format!("{name} = {value}")));

    Ok(Answer { value: total.to_integer(), diagnostics })
}

/// When the rock from `start` at `speed` meets `stone`.
fn collision_time(stone: &Hailstone, start: &[Coef; 3], speed: &[Coef; 3]) -> Result<Coef> {
    let offsets = (0..3)
        .map(|axis| (
            Coef::from_integer(stone.position[axis].clone()) - &start[axis],
            &speed[axis] - Coef::from_integer(stone.velocity[axis].clone()),
        ))
        .collect_vec();

    // t * closing_speed == offset on every axis
    let time = offsets.iter()
        .find(|(_, closing)| !closing.is_zero())
        .map(|(offset, closing)| offset / closing)
        .unwrap_or_else(Coef::zero);

    if offsets.iter().any(|(offset, closing)| &time * closing != *offset) {
        return Err(Error::Missed { line: stone.line });
    }
    if time.is_negative() {
        return Err(Error::NegativeTime { line: stone.line, time });
    }

    Ok(time)
}

/// Number of pairs of hailstones whose future paths in the XY plane cross inside the test area. Z is ignored.
///
/// Each pair is its own two-unknown model: times `s, t >= 0` with `p_a + s v_a = p_b + t v_b` on X and Y,
/// and the crossing point within bounds. Parallel paths leave the model undetermined and do not count.
pub fn count_crossings(stones: &[Hailstone], area: &HailstoneConfig) -> Result<BigInt> {
    let (min, max) = (BigInt::from(area.test_min), BigInt::from(area.test_max));
    let solver = RationalSolver;

    let mut count = 0usize;
    for (a, b) in stones.iter().tuple_combinations() {
        let mut builder = ModelBuilder::new();
        let s = builder.real("s");
        let t = builder.real("t");
        builder.constrain(s.at_least(0i64)).constrain(t.at_least(0i64));

        for axis in 0..2 {
            let crossing = s * &a.velocity[axis] + &a.position[axis];
            builder
                .constrain(crossing.clone().equals(t * &b.velocity[axis] + &b.position[axis]))
                .constrain(crossing.clone().at_least(&min))
                .constrain(crossing.at_most(&max));
        }

        match *builder.build()?.solve(&solver).verdict() {
            Verdict::Satisfiable(_) => count += 1,
            Verdict::Unsatisfiable | Verdict::Indeterminate => (),
        }
    }
    debug!(pairs = stones.len() * stones.len().saturating_sub(1) / 2, count, "crossings counted");

    Ok(BigInt::from(count))
}

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Exact coefficients and values.
pub type Coef = BigRational;

/// Identifies the [`ModelBuilder`](crate::builder::ModelBuilder) an [`Unknown`] was allocated by.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(pub(crate) usize);

/// A scalar the solver is asked to find, handed out by a [`ModelBuilder`](crate::builder::ModelBuilder).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Unknown {
    pub(crate) scope: ScopeId,
    pub(crate) index: usize,
}

impl Unknown {
    /// Position of this unknown within its model.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Shorthand for `LinExpr::from(self).equals(rhs)`.
    pub fn equals(self, rhs: impl Into<LinExpr>) -> Constraint {
        LinExpr::from(self).equals(rhs)
    }

    /// Shorthand for `LinExpr::from(self).at_most(rhs)`.
    pub fn at_most(self, rhs: impl Into<LinExpr>) -> Constraint {
        LinExpr::from(self).at_most(rhs)
    }

    /// Shorthand for `LinExpr::from(self).at_least(rhs)`.
    pub fn at_least(self, rhs: impl Into<LinExpr>) -> Constraint {
        LinExpr::from(self).at_least(rhs)
    }
}

/// The values an [`Unknown`] may take.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Domain {
    /// Whole numbers.
    Integer,
    /// Any rational number.
    Real,
}

/// A linear expression.
///
/// ```text
///   constant + coef1 * unknown1 + coef2 * unknown2 + ...
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinExpr {
    constant: Coef,
    // zero coefficients are never stored
    terms: BTreeMap<Unknown, Coef>,
}

impl LinExpr {
    /// The expression `0`.
    pub fn zero() -> Self {
        Self { constant: Coef::zero(), terms: BTreeMap::new() }
    }

    /// The constant part.
    pub fn constant(&self) -> &Coef {
        &self.constant
    }

    /// The non-zero terms, ordered by unknown.
    pub fn terms(&self) -> impl Iterator<Item = (Unknown, &Coef)> {
        self.terms.iter().map(|(unknown, coef)| (*unknown, coef))
    }

    /// The coefficient of `unknown`, zero if it does not appear.
    pub fn coefficient(&self, unknown: Unknown) -> Coef {
        self.terms.get(&unknown).cloned().unwrap_or_else(Coef::zero)
    }

    /// Add `coef * unknown` in place.
    pub fn add_term(&mut self, unknown: Unknown, coef: Coef) {
        let sum = self.coefficient(unknown) + coef;
        if sum.is_zero() {
            self.terms.remove(&unknown);
        } else {
            self.terms.insert(unknown, sum);
        }
    }

    /// Evaluate with the values given by `value_of`, or `None` if some unknown has no value.
    pub fn evaluate<'v>(&self, value_of: impl Fn(Unknown) -> Option<&'v Coef>) -> Option<Coef> {
        self.terms.iter().try_fold(self.constant.clone(), |acc, (unknown, coef)| {
            value_of(*unknown).map(|value| acc + coef * value)
        })
    }

    /// `self == rhs`.
    pub fn equals(self, rhs: impl Into<LinExpr>) -> Constraint {
        Constraint { expr: self - rhs, relation: Relation::Eq }
    }

    /// `self <= rhs`.
    pub fn at_most(self, rhs: impl Into<LinExpr>) -> Constraint {
        Constraint { expr: self - rhs, relation: Relation::Le }
    }

    /// `self >= rhs`.
    pub fn at_least(self, rhs: impl Into<LinExpr>) -> Constraint {
        Constraint { expr: self - rhs, relation: Relation::Ge }
    }

    fn scale(mut self, factor: &Coef) -> Self {
        if factor.is_zero() {
            return Self::zero();
        }

        self.constant = &self.constant * factor;
        self.terms.values_mut().for_each(|coef| *coef = &*coef * factor);
        self
    }
}

impl From<Unknown> for LinExpr {
    fn from(unknown: Unknown) -> Self {
        let mut expr = Self::zero();
        expr.add_term(unknown, Coef::one());
        expr
    }
}

impl From<Coef> for LinExpr {
    fn from(constant: Coef) -> Self {
        Self { constant, terms: BTreeMap::new() }
    }
}

impl From<BigInt> for LinExpr {
    fn from(constant: BigInt) -> Self {
        Self::from(Coef::from_integer(constant))
    }
}

impl From<&BigInt> for LinExpr {
    fn from(constant: &BigInt) -> Self {
        Self::from(constant.clone())
    }
}

impl From<i64> for LinExpr {
    fn from(constant: i64) -> Self {
        Self::from(BigInt::from(constant))
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> LinExpr {
        let rhs = rhs.into();
        self.constant += rhs.constant;
        for (unknown, coef) in rhs.terms {
            self.add_term(unknown, coef);
        }
        self
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self.scale(&-Coef::one())
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        let rhs: LinExpr = rhs.into();
        self + -rhs
    }
}

impl Mul<&BigInt> for LinExpr {
    type Output = LinExpr;

    fn mul(self, rhs: &BigInt) -> LinExpr {
        self.scale(&Coef::from_integer(rhs.clone()))
    }
}

impl Mul<&Coef> for LinExpr {
    type Output = LinExpr;

    fn mul(self, rhs: &Coef) -> LinExpr {
        self.scale(rhs)
    }
}

impl<T: Into<LinExpr>> Add<T> for Unknown {
    type Output = LinExpr;

    fn add(self, rhs: T) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl<T: Into<LinExpr>> Sub<T> for Unknown {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Mul<&BigInt> for Unknown {
    type Output = LinExpr;

    fn mul(self, rhs: &BigInt) -> LinExpr {
        LinExpr::from(self) * rhs
    }
}

impl Mul<i64> for Unknown {
    type Output = LinExpr;

    fn mul(self, rhs: i64) -> LinExpr {
        LinExpr::from(self) * &BigInt::from(rhs)
    }
}

impl Sum<LinExpr> for LinExpr {
    fn sum<I: Iterator<Item = LinExpr>>(iter: I) -> Self {
        iter.fold(LinExpr::zero(), |acc, expr| acc + expr)
    }
}

impl Sum<Unknown> for LinExpr {
    fn sum<I: Iterator<Item = Unknown>>(iter: I) -> Self {
        iter.fold(LinExpr::zero(), |acc, unknown| acc + unknown)
    }
}

impl Display for LinExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.constant)?;

        for (unknown, coef) in self.terms.iter() {
            let sign = if coef.is_negative() { '-' } else { '+' };
            if coef.abs().is_one() {
                write!(f, " {} u{}", sign, unknown.index)?;
            } else {
                write!(f, " {} {} * u{}", sign, coef.abs(), unknown.index)?;
            }
        }

        Ok(())
    }
}

/// How a constraint's expression relates to zero.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Relation {
    /// `expr == 0`
    Eq,
    /// `expr <= 0`
    Le,
    /// `expr >= 0`
    Ge,
}

impl Relation {
    /// Whether `value` (the left-hand side minus the right-hand side) satisfies this relation.
    pub fn holds_for(&self, value: &Coef) -> bool {
        match self {
            Relation::Eq => value.is_zero(),
            Relation::Le => !value.is_positive(),
            Relation::Ge => !value.is_negative(),
        }
    }
}

/// A linear constraint, normalised to `expr REL 0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub(crate) expr: LinExpr,
    pub(crate) relation: Relation,
}

impl Constraint {
    /// The normalised left-hand side.
    pub fn expr(&self) -> &LinExpr {
        &self.expr
    }

    /// The relation to zero.
    pub fn relation(&self) -> Relation {
        self.relation
    }
}

/// Whether an [`Objective`] is to be made small or large.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Sense {
    #[allow(missing_docs)]
    Minimize,
    #[allow(missing_docs)]
    Maximize,
}

/// A linear expression to optimize. A model holds at most one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Objective {
    /// Which way to push.
    pub sense: Sense,
    /// What to push.
    pub expr: LinExpr,
}

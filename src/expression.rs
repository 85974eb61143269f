use crate::linalg::dot;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A decision variable. Its index doubles as its tableau column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Variable {
    index: usize,
    name: String,
}

impl Variable {
    pub(crate) fn new(index: usize, name: String) -> Self {
        Self { index, name }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An affine combination of variables: `sum(coef * var) + constant`.
///
/// Expressions are values; every combinator returns a new expression and
/// leaves its operands untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinExpr {
    /// An ordered sequence of (coefficient, Variable), one entry per variable.
    terms: Vec<(f64, Variable)>,
    /// A mapping from Variable.index to position within LinExpr.terms
    cipher: HashMap<usize, usize>,
    constant: f64,
}

impl LinExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(coef: f64, variable: &Variable) -> Self {
        let mut linexpr = Self::new();
        linexpr.push_term(coef, variable);
        linexpr
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn terms(&self) -> impl Iterator<Item = (f64, &Variable)> {
        self.terms.iter().map(|(coef, var)| (*coef, var))
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.terms.iter().map(|(_, var)| var)
    }

    /// Coefficient of `variable`, zero when it does not appear.
    pub fn coefficient(&self, variable: &Variable) -> f64 {
        self.cipher
            .get(&variable.index)
            .map(|&i| self.terms[i].0)
            .unwrap_or_default()
    }

    /// Dense coefficient vector ordered by variable index.
    ///
    /// # Panics
    ///
    /// Panics if a variable index is `>= len`.
    pub fn coefficients(&self, len: usize) -> Vec<f64> {
        let mut dense = vec![0.0; len];
        for (coef, var) in &self.terms {
            assert!(
                var.index < len,
                "variable {} has index {} outside of 0..{}",
                var.name,
                var.index,
                len
            );
            dense[var.index] = *coef;
        }
        dense
    }

    /// True when no variable carries a non-zero coefficient.
    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|(coef, _)| *coef == 0.0)
    }

    /// Value of the expression with `values[i]` assigned to the variable of index `i`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        dot(&self.coefficients(values.len()), values) + self.constant
    }

    /// Removes and returns the constant term.
    pub(crate) fn take_constant(&mut self) -> f64 {
        std::mem::take(&mut self.constant)
    }

    pub(crate) fn push_term(&mut self, coef: f64, variable: &Variable) {
        let len = self.terms.len();
        match self.cipher.entry(variable.index) {
            Entry::Occupied(e) => self.terms[*e.get()].0 += coef,
            Entry::Vacant(e) => {
                e.insert(len);
                self.terms.push((coef, variable.clone()));
            }
        }
    }

    fn accumulate(mut self, other: &LinExpr, factor: f64) -> Self {
        for (coef, var) in &other.terms {
            self.push_term(factor * coef, var);
        }
        self.constant += factor * other.constant;
        self
    }

    fn scaled(mut self, factor: f64) -> Self {
        for (coef, _) in &mut self.terms {
            *coef *= factor;
        }
        self.constant *= factor;
        self
    }
}

/// The expression `1 * variable`.
pub fn variable(variable: &Variable) -> LinExpr {
    LinExpr::term(1.0, variable)
}

/// Unions the variable sets, summing coefficients and constants.
pub fn add(lhs: &LinExpr, rhs: &LinExpr) -> LinExpr {
    lhs.clone().accumulate(rhs, 1.0)
}

pub fn subtract(lhs: &LinExpr, rhs: &LinExpr) -> LinExpr {
    lhs.clone().accumulate(rhs, -1.0)
}

/// Multiplies every coefficient and the constant by `factor`.
pub fn scale(expr: &LinExpr, factor: f64) -> LinExpr {
    expr.clone().scaled(factor)
}

pub fn negate(expr: &LinExpr) -> LinExpr {
    scale(expr, -1.0)
}

impl From<&Variable> for LinExpr {
    fn from(var: &Variable) -> Self {
        variable(var)
    }
}

impl From<Variable> for LinExpr {
    fn from(var: Variable) -> Self {
        variable(&var)
    }
}

impl From<f64> for LinExpr {
    fn from(constant: f64) -> Self {
        Self {
            constant,
            ..Self::default()
        }
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(self, rhs: T) -> LinExpr {
        self.accumulate(&rhs.into(), 1.0)
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        self.accumulate(&rhs.into(), -1.0)
    }
}

impl<T: Into<LinExpr>> Add<T> for &Variable {
    type Output = LinExpr;

    fn add(self, rhs: T) -> LinExpr {
        variable(self) + rhs
    }
}

impl<T: Into<LinExpr>> Sub<T> for &Variable {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        variable(self) - rhs
    }
}

impl Mul<f64> for LinExpr {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        self.scaled(rhs)
    }
}

impl Mul<LinExpr> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: LinExpr) -> LinExpr {
        rhs.scaled(self)
    }
}

impl Mul<f64> for &Variable {
    type Output = LinExpr;

    fn mul(self, rhs: f64) -> LinExpr {
        LinExpr::term(rhs, self)
    }
}

impl Mul<&Variable> for f64 {
    type Output = LinExpr;

    fn mul(self, rhs: &Variable) -> LinExpr {
        LinExpr::term(self, rhs)
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        self.scaled(-1.0)
    }
}

impl Neg for &Variable {
    type Output = LinExpr;

    fn neg(self) -> LinExpr {
        LinExpr::term(-1.0, self)
    }
}

impl fmt::Display for LinExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut empty = true;
        let mut write_part = |f: &mut fmt::Formatter<'_>, value: f64, name: Option<&str>| {
            let magnitude = value.abs();
            match (empty, value < 0.0) {
                (true, true) => write!(f, "-")?,
                (true, false) => {}
                (false, true) => write!(f, " - ")?,
                (false, false) => write!(f, " + ")?,
            }
            empty = false;
            match name {
                Some(name) if magnitude == 1.0 => write!(f, "{name}"),
                Some(name) => write!(f, "{magnitude}*{name}"),
                None => write!(f, "{magnitude}"),
            }
        };

        for (coef, var) in self.terms.iter().filter(|(coef, _)| *coef != 0.0) {
            write_part(f, *coef, Some(var.name()))?;
        }
        if self.constant != 0.0 {
            write_part(f, self.constant, None)?;
        }
        if empty {
            write!(f, "0")?;
        }
        Ok(())
    }
}

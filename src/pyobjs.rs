use crate::error::Error;
use crate::expression::{LinExpr, Variable};
use crate::model::{Model, Relation};
use crate::solution::Solution;
use pyo3::exceptions::{PyException, PyValueError};
use pyo3::prelude::*;

pyo3::create_exception!(tableau_simplex, MalformedModelError, PyException);

impl From<Error> for PyErr {
    fn from(err: Error) -> Self {
        MalformedModelError::new_err(err.to_string())
    }
}

/// Anything that can appear on either side of an arithmetic operator.
#[derive(FromPyObject)]
pub(crate) enum Operand {
    Expr(PyLinExpr),
    Var(PyVariable),
    Scalar(f64),
}

impl From<Operand> for LinExpr {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Expr(expr) => expr.linexpr,
            Operand::Var(var) => LinExpr::from(var.variable),
            Operand::Scalar(constant) => LinExpr::from(constant),
        }
    }
}

#[pyclass(module = "tableau_simplex.rust", name = "Variable")]
#[derive(Clone)]
pub(crate) struct PyVariable {
    pub(crate) variable: Variable,
}

#[pymethods]
impl PyVariable {
    #[getter]
    fn index(&self) -> usize {
        self.variable.index()
    }

    #[getter]
    fn name(&self) -> String {
        self.variable.name().to_string()
    }

    fn __repr__(&self) -> String {
        format!("Variable({}, {})", self.variable.index(), self.variable.name())
    }

    fn __neg__(&self) -> PyLinExpr {
        PyLinExpr::from(-&self.variable)
    }

    fn __add__(&self, other: Operand) -> PyLinExpr {
        PyLinExpr::from(&self.variable + LinExpr::from(other))
    }

    fn __radd__(&self, other: Operand) -> PyLinExpr {
        self.__add__(other)
    }

    fn __sub__(&self, other: Operand) -> PyLinExpr {
        PyLinExpr::from(&self.variable - LinExpr::from(other))
    }

    fn __rsub__(&self, other: Operand) -> PyLinExpr {
        PyLinExpr::from(LinExpr::from(other) - &self.variable)
    }

    fn __mul__(&self, factor: f64) -> PyLinExpr {
        PyLinExpr::from(factor * &self.variable)
    }

    fn __rmul__(&self, factor: f64) -> PyLinExpr {
        self.__mul__(factor)
    }
}

#[pyclass(module = "tableau_simplex.rust", name = "LinExpr")]
#[derive(Clone)]
pub(crate) struct PyLinExpr {
    pub(crate) linexpr: LinExpr,
}

impl From<LinExpr> for PyLinExpr {
    fn from(linexpr: LinExpr) -> Self {
        Self { linexpr }
    }
}

#[pymethods]
impl PyLinExpr {
    #[getter]
    fn constant(&self) -> f64 {
        self.linexpr.constant()
    }

    fn coefficient(&self, variable: PyVariable) -> f64 {
        self.linexpr.coefficient(&variable.variable)
    }

    fn __str__(&self) -> String {
        self.linexpr.to_string()
    }

    fn __neg__(&self) -> Self {
        Self::from(-self.linexpr.clone())
    }

    fn __add__(&self, other: Operand) -> Self {
        Self::from(self.linexpr.clone() + LinExpr::from(other))
    }

    fn __radd__(&self, other: Operand) -> Self {
        self.__add__(other)
    }

    fn __sub__(&self, other: Operand) -> Self {
        Self::from(self.linexpr.clone() - LinExpr::from(other))
    }

    fn __rsub__(&self, other: Operand) -> Self {
        Self::from(LinExpr::from(other) - self.linexpr.clone())
    }

    fn __mul__(&self, factor: f64) -> Self {
        Self::from(self.linexpr.clone() * factor)
    }

    fn __rmul__(&self, factor: f64) -> Self {
        self.__mul__(factor)
    }
}

#[pyclass(module = "tableau_simplex.rust", name = "Model")]
pub(crate) struct PyModel {
    model: Model,
}

#[pymethods]
impl PyModel {
    #[new]
    fn new(name: String) -> Self {
        Self {
            model: Model::new(name),
        }
    }

    #[getter]
    fn name(&self) -> String {
        self.model.name().to_string()
    }

    fn create_variable(&mut self, name: String) -> PyVariable {
        PyVariable {
            variable: self.model.create_variable(name),
        }
    }

    /// `relation` is one of `"<="`, `">="` or `"=="`.
    #[pyo3(signature = (expression, relation, bound))]
    fn add_constraint(&mut self, expression: Operand, relation: &str, bound: f64) -> PyResult<()> {
        let relation = match relation {
            "<=" => Relation::LessEqual,
            ">=" => Relation::GreaterEqual,
            "==" | "=" => Relation::Equal,
            other => {
                return Err(PyValueError::new_err(format!(
                    "unknown relation {other:?}"
                )))
            }
        };
        self.model
            .add_constraint(LinExpr::from(expression), relation, bound)?;
        Ok(())
    }

    fn maximize(&mut self, expression: Operand) -> PyResult<()> {
        Ok(self.model.maximize(LinExpr::from(expression))?)
    }

    fn minimize(&mut self, expression: Operand) -> PyResult<()> {
        Ok(self.model.minimize(LinExpr::from(expression))?)
    }

    fn solve(&self) -> PyResult<PySolution> {
        let solution = self.model.solve()?;
        Ok(PySolution { solution })
    }

    fn __str__(&self) -> String {
        self.model.to_string()
    }
}

#[pyclass(module = "tableau_simplex.rust", name = "Solution")]
pub(crate) struct PySolution {
    solution: Solution,
}

#[pymethods]
impl PySolution {
    #[getter]
    fn status(&self) -> String {
        self.solution.status().to_string()
    }

    #[getter]
    fn objective_value(&self) -> Option<f64> {
        self.solution.objective_value()
    }

    #[getter]
    fn is_feasible(&self) -> bool {
        self.solution.is_feasible()
    }

    #[getter]
    fn is_bounded(&self) -> bool {
        self.solution.is_bounded()
    }

    #[getter]
    fn iterations(&self) -> usize {
        self.solution.iterations()
    }

    fn assignment(&self, model: PyRef<'_, PyModel>) -> Option<Vec<f64>> {
        self.solution.assignment(&model.model)
    }

    fn __getitem__(&self, variable: PyVariable) -> Option<f64> {
        self.solution.value(&variable.variable)
    }

    fn __str__(&self) -> String {
        self.solution.to_string()
    }
}

mod error;
mod expression;
mod linalg;
mod model;
#[cfg(feature = "python")]
mod pyobjs;
mod settings;
mod simplex;
mod solution;
mod tableau;

pub use crate::error::{Error, Result};
pub use crate::expression::{add, negate, scale, subtract, variable, LinExpr, Variable};
pub use crate::linalg::Matrix;
pub use crate::model::{Constraint, Direction, Model, Objective, Relation};
pub use crate::settings::{PivotRule, Settings};
pub use crate::simplex::Solver;
pub use crate::solution::{Solution, Status};
pub use crate::tableau::Tableau;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn rust(py: Python<'_>, m: &PyModule) -> PyResult<()> {
    use crate::pyobjs::{MalformedModelError, PyLinExpr, PyModel, PySolution, PyVariable};

    m.add_class::<PyVariable>()?;
    m.add_class::<PyLinExpr>()?;
    m.add_class::<PyModel>()?;
    m.add_class::<PySolution>()?;
    m.add("MalformedModelError", py.get_type::<MalformedModelError>())?;
    Ok(())
}

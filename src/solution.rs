use crate::expression::Variable;
use crate::model::Model;
use crate::tableau::Tableau;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Optimal,
    Infeasible,
    Unbounded,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Optimal => write!(f, "optimal"),
            Status::Infeasible => write!(f, "infeasible"),
            Status::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Outcome of a solve.
///
/// The tableaux are kept for diagnostics. For an infeasible model they are
/// the first and last tableaux of phase one; otherwise they bracket phase two.
#[derive(Clone, Debug)]
pub struct Solution {
    status: Status,
    /// Indexed like the augmented model; empty unless optimal.
    raw_assignment: Vec<f64>,
    objective_value: Option<f64>,
    variables: Vec<Variable>,
    initial_tableau: Tableau,
    final_tableau: Tableau,
    phase_one_tableau: Option<Tableau>,
    iterations: usize,
}

impl Solution {
    pub(crate) fn optimal(
        model: &Model,
        raw_assignment: Vec<f64>,
        initial_tableau: Tableau,
        final_tableau: Tableau,
        phase_one_tableau: Option<Tableau>,
        iterations: usize,
    ) -> Self {
        let n = model.variables().len();
        let objective_value = model
            .objective()
            .map(|objective| objective.expression().evaluate(&raw_assignment[..n]));
        Self {
            status: Status::Optimal,
            raw_assignment,
            objective_value,
            variables: model.variables().to_vec(),
            initial_tableau,
            final_tableau,
            phase_one_tableau,
            iterations,
        }
    }

    pub(crate) fn infeasible(
        model: &Model,
        initial_tableau: Tableau,
        final_tableau: Tableau,
        iterations: usize,
    ) -> Self {
        Self {
            status: Status::Infeasible,
            raw_assignment: Vec::new(),
            objective_value: None,
            variables: model.variables().to_vec(),
            phase_one_tableau: Some(initial_tableau.clone()),
            initial_tableau,
            final_tableau,
            iterations,
        }
    }

    pub(crate) fn unbounded(
        model: &Model,
        initial_tableau: Tableau,
        final_tableau: Tableau,
        phase_one_tableau: Option<Tableau>,
        iterations: usize,
    ) -> Self {
        Self {
            status: Status::Unbounded,
            raw_assignment: Vec::new(),
            objective_value: None,
            variables: model.variables().to_vec(),
            initial_tableau,
            final_tableau,
            phase_one_tableau,
            iterations,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_optimal(&self) -> bool {
        self.status == Status::Optimal
    }

    pub fn is_feasible(&self) -> bool {
        self.status != Status::Infeasible
    }

    pub fn is_bounded(&self) -> bool {
        self.status != Status::Unbounded
    }

    /// Values of `model`'s variables in index order, dropping the auxiliary
    /// columns added while solving. `None` unless optimal.
    pub fn assignment(&self, model: &Model) -> Option<Vec<f64>> {
        if !self.is_optimal() {
            return None;
        }
        self.raw_assignment
            .get(..model.variables().len())
            .map(<[f64]>::to_vec)
    }

    pub fn value(&self, variable: &Variable) -> Option<f64> {
        if !self.is_optimal() {
            return None;
        }
        self.raw_assignment.get(variable.index()).copied()
    }

    /// The caller's objective evaluated at the assignment.
    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    pub fn initial_tableau(&self) -> &Tableau {
        &self.initial_tableau
    }

    pub fn final_tableau(&self) -> &Tableau {
        &self.final_tableau
    }

    /// First tableau of phase one, if the solve needed one.
    pub fn phase_one_tableau(&self) -> Option<&Tableau> {
        self.phase_one_tableau.as_ref()
    }

    /// Pivots performed across both phases.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "status: {}", self.status)?;
        if let Some(value) = self.objective_value {
            writeln!(f, "objective value: {value}")?;
        }
        if self.is_optimal() {
            for (var, value) in self.variables.iter().zip(&self.raw_assignment) {
                writeln!(f, "  {var} = {value}")?;
            }
        }
        Ok(())
    }
}

use crate::linalg::Matrix;
use crate::model::Model;
use crate::settings::PivotRule;
use std::fmt;

/// Dense simplex tableau.
///
/// Row 0 holds the negated reduced costs with the current objective value in
/// the last column; rows `1..=m` hold the constraint rows with their
/// right-hand side. Columns follow the variable indices of `model`.
#[derive(Clone, Debug)]
pub struct Tableau {
    model: Model,
    matrix: Matrix,
    tolerance: f64,
}

impl Tableau {
    /// # Panics
    ///
    /// Panics unless `matrix` has one column per variable of `model` plus the
    /// right-hand side.
    pub(crate) fn new(model: Model, matrix: Matrix, tolerance: f64) -> Self {
        assert_eq!(
            matrix.n(),
            model.variables().len() + 1,
            "tableau width does not match the model"
        );
        Self {
            model,
            matrix,
            tolerance,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    fn rhs_column(&self) -> usize {
        self.matrix.n() - 1
    }

    /// Right-hand side of `row`.
    pub fn rhs(&self, row: usize) -> f64 {
        self.matrix.at(row, self.rhs_column())
    }

    /// Objective value of the current basis, in the tableau's own
    /// (maximization) sign convention.
    pub fn objective_value(&self) -> f64 {
        self.rhs(0)
    }

    fn reduced_costs(&self) -> &[f64] {
        &self.matrix.row(0)[..self.rhs_column()]
    }

    pub fn is_optimal(&self) -> bool {
        self.reduced_costs().iter().all(|&c| c >= -self.tolerance)
    }

    /// Column to bring into the basis, `None` once optimal.
    pub fn choose_entering_variable(&self, rule: PivotRule) -> Option<usize> {
        let mut improving = self
            .reduced_costs()
            .iter()
            .enumerate()
            .filter(|(_, c)| **c < -self.tolerance);

        match rule {
            PivotRule::Dantzig => improving
                .fold(None, |best: Option<(usize, f64)>, (j, &c)| match best {
                    Some((_, lowest)) if lowest <= c => best,
                    _ => Some((j, c)),
                })
                .map(|(j, _)| j),
            PivotRule::Bland => improving.next().map(|(j, _)| j),
        }
    }

    /// No constraint row limits how far `column` can increase.
    pub fn is_unbounded(&self, column: usize) -> bool {
        (1..self.matrix.m()).all(|row| self.matrix.at(row, column) <= self.tolerance)
    }

    /// Minimum-ratio test over the rows with a positive entry in `column`.
    pub fn choose_leaving_variable(&self, column: usize, rule: PivotRule) -> Option<usize> {
        let candidates = (1..self.matrix.m()).filter_map(|row| {
            let entry = self.matrix.at(row, column);
            (entry > self.tolerance).then(|| (row, self.rhs(row) / entry))
        });

        match rule {
            PivotRule::Dantzig => candidates
                .fold(None, |best: Option<(usize, f64)>, (row, ratio)| match best {
                    Some((_, lowest)) if lowest <= ratio => best,
                    _ => Some((row, ratio)),
                })
                .map(|(row, _)| row),
            PivotRule::Bland => {
                let candidates = candidates.collect::<Vec<_>>();
                let lowest = candidates
                    .iter()
                    .map(|&(_, ratio)| ratio)
                    .fold(f64::INFINITY, f64::min);
                let basis = self.extract_basis();
                candidates
                    .into_iter()
                    .filter(|&(_, ratio)| ratio <= lowest + self.tolerance)
                    .min_by_key(|&(row, _)| basis[row - 1].unwrap_or(usize::MAX))
                    .map(|(row, _)| row)
            }
        }
    }

    /// Makes `column` basic in `row`.
    ///
    /// # Panics
    ///
    /// Panics if the pivot element is within tolerance of zero.
    pub fn pivot(&mut self, row: usize, column: usize) {
        let entry = self.matrix.at(row, column);
        assert!(
            entry.abs() > self.tolerance,
            "pivot element {entry} at ({row}, {column}) is numerically zero"
        );

        self.matrix.scale_row(row, 1.0 / entry);
        self.matrix.set(row, column, 1.0);
        for i in 0..self.matrix.m() {
            if i != row {
                let factor = self.matrix.at(i, column);
                self.matrix.row_operation(i, row, factor);
                self.matrix.set(i, column, 0.0);
            }
        }
    }

    /// Subtracts `row` from the objective row as many times as needed to zero
    /// the objective entry of `column`.
    pub(crate) fn price_out(&mut self, row: usize, column: usize) {
        let factor = self.matrix.at(0, column);
        self.matrix.row_operation(0, row, factor);
        self.matrix.set(0, column, 0.0);
    }

    /// Zeroes a constraint row that carries no information.
    pub(crate) fn clear_row(&mut self, row: usize) {
        for x in self.matrix.row_mut(row) {
            *x = 0.0;
        }
    }

    /// Constraint row holding the single 1 of `column`, if every other
    /// constraint entry of the column is zero.
    pub fn unit_row(&self, column: usize) -> Option<usize> {
        let mut found = None;
        for row in 1..self.matrix.m() {
            let x = self.matrix.at(row, column);
            if found.is_none() && (x - 1.0).abs() <= self.tolerance {
                found = Some(row);
            } else if x.abs() > self.tolerance {
                return None;
            }
        }
        found
    }

    /// Basic column of each constraint row; entry `i` belongs to row `i + 1`.
    ///
    /// A column is basic when it is a unit column with a zero reduced cost.
    /// When several columns qualify for the same row the lowest index wins.
    /// A row is `None` when it has been cleared as redundant.
    pub fn extract_basis(&self) -> Vec<Option<usize>> {
        let mut basis = vec![None; self.matrix.m() - 1];
        for column in 0..self.rhs_column() {
            if self.matrix.at(0, column).abs() > self.tolerance {
                continue;
            }
            if let Some(row) = self.unit_row(column) {
                basis[row - 1].get_or_insert(column);
            }
        }
        basis
    }

    /// Value of every column: its row's right-hand side when basic, else zero.
    pub fn extract_assignment(&self) -> Vec<f64> {
        let mut assignment = vec![0.0; self.rhs_column()];
        for (i, column) in self.extract_basis().into_iter().enumerate() {
            if let Some(column) = column {
                let value = self.rhs(i + 1);
                assignment[column] = if value.abs() <= self.tolerance {
                    0.0
                } else {
                    value
                };
            }
        }
        assignment
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for var in self.model.variables() {
            write!(f, "{:>10}", var.name())?;
        }
        writeln!(f, "{:>10}", "rhs")?;
        for row in self.matrix.rows() {
            for x in row {
                write!(f, "{x:>10.3}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

use crate::error::{Error, Result};
use crate::expression::LinExpr;
use crate::linalg::Matrix;
use crate::model::{Direction, Model, Relation};
use crate::settings::{PivotRule, Settings};
use crate::solution::Solution;
use crate::tableau::Tableau;
use log::{debug, info, trace, warn};
use std::iter::once;

/// Two-phase tableau simplex.
///
/// All bookkeeping lives in the call, so one solver can serve concurrent
/// solves of independent models.
#[derive(Clone, Debug, Default)]
pub struct Solver {
    settings: Settings,
}

/// A model in standard form: non-negative bounds, equality constraints only.
struct Augmented {
    model: Model,
    /// Slack column added to each constraint, by constraint index.
    slacks: Vec<Option<usize>>,
}

impl Augmented {
    /// Constraints without a slack have no ready-made basic column.
    fn needs_presolve(&self) -> bool {
        self.slacks.iter().any(Option::is_none)
    }
}

#[derive(Clone, Copy, Debug)]
struct Artificial {
    row: usize,
    column: usize,
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Optimal,
    Unbounded,
}

enum Presolve {
    Feasible {
        phase_one: Tableau,
        tableau: Tableau,
        iterations: usize,
    },
    Infeasible {
        initial: Tableau,
        last: Tableau,
        iterations: usize,
    },
}

impl Solver {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Solves `model` without modifying it.
    ///
    /// Infeasible and unbounded models produce an `Ok` solution carrying the
    /// corresponding status; only malformed models and numerical breakdowns
    /// are errors.
    pub fn solve(&self, model: &Model) -> Result<Solution> {
        if model.objective().is_none() {
            return Err(Error::MissingObjective);
        }
        if model.constraints().is_empty() {
            return Err(Error::NoConstraints);
        }
        info!(
            "solving `{}`: {} variables, {} constraints",
            model.name(),
            model.variables().len(),
            model.constraints().len()
        );

        let augmented = self.augment_model(model);
        let (mut tableau, phase_one, mut iterations) = if augmented.needs_presolve() {
            match self.presolve(&augmented)? {
                Presolve::Feasible {
                    phase_one,
                    tableau,
                    iterations,
                } => (tableau, Some(phase_one), iterations),
                Presolve::Infeasible {
                    initial,
                    last,
                    iterations,
                } => {
                    info!("`{}` is infeasible", model.name());
                    return Ok(Solution::infeasible(model, initial, last, iterations));
                }
            }
        } else {
            debug!("every constraint has a slack, skipping phase one");
            (self.basic_initial_tableau(&augmented.model), None, 0)
        };

        let initial = tableau.clone();
        let (outcome, pivots) = self.optimize(&mut tableau, 2)?;
        iterations += pivots;

        match outcome {
            Outcome::Unbounded => {
                info!("`{}` is unbounded", model.name());
                Ok(Solution::unbounded(
                    model, initial, tableau, phase_one, iterations,
                ))
            }
            Outcome::Optimal => {
                let assignment = tableau.extract_assignment();
                let solution =
                    Solution::optimal(model, assignment, initial, tableau, phase_one, iterations);
                info!(
                    "`{}` solved after {} pivots, objective {:?}",
                    model.name(),
                    iterations,
                    solution.objective_value()
                );
                Ok(solution)
            }
        }
    }

    /// Clones `original` into standard form: constants moved to the bounds,
    /// a maximization objective, non-negative bounds, and a slack (`<=`) or
    /// surplus (`>=`) variable turning every inequality into an equality.
    fn augment_model(&self, original: &Model) -> Augmented {
        let mut model = original.clone();
        model.simplify();

        if let Some(objective) = model.objective_mut() {
            if objective.direction() == Direction::Minimize {
                objective.invert();
            }
        }
        for constraint in model.constraints_mut() {
            if constraint.bound() < 0.0 {
                constraint.invert();
            }
        }

        let slacks = add_auxiliary_variables(&mut model, Relation::LessEqual, 1.0, "s");
        add_auxiliary_variables(&mut model, Relation::GreaterEqual, -1.0, "e");
        Augmented { model, slacks }
    }

    /// Phase one: minimizes the total of one artificial variable per
    /// constraint lacking a slack, then rebuilds the phase two tableau.
    fn presolve(&self, augmented: &Augmented) -> Result<Presolve> {
        let (model, artificials) = create_presolve_model(augmented)?;
        info!("phase one with {} artificial variables", artificials.len());

        let mut tableau = self.presolve_initial_tableau(&model, &artificials);
        let initial = tableau.clone();

        let (outcome, iterations) = self.optimize(&mut tableau, 1)?;
        if outcome == Outcome::Unbounded {
            return Err(Error::Numerical(
                "phase one objective is bounded by zero but was reported unbounded".to_string(),
            ));
        }

        let assignment = tableau.extract_assignment();
        let mass: f64 = artificials.iter().map(|a| assignment[a.column]).sum();
        if artificials
            .iter()
            .any(|a| assignment[a.column] > self.settings.tolerance)
        {
            debug!("artificial variables keep a total of {mass} after phase one");
            return Ok(Presolve::Infeasible {
                initial,
                last: tableau,
                iterations,
            });
        }

        self.expunge_artificial_variables(&mut tableau, &artificials);
        let restored = self.restore_initial_tableau(&tableau, &augmented.model, &artificials);
        Ok(Presolve::Feasible {
            phase_one: initial,
            tableau: restored,
            iterations,
        })
    }

    /// Objective row holds the negated objective; each constraint row its
    /// coefficients and bound. A basic feasible tableau only when every row
    /// has a slack.
    fn basic_initial_tableau(&self, model: &Model) -> Tableau {
        let n = model.variables().len();
        let rows = once(objective_row(model))
            .chain(model.constraints().iter().map(|c| {
                c.expression()
                    .coefficients(n)
                    .into_iter()
                    .chain(once(c.bound()))
                    .collect()
            }))
            .collect();
        Tableau::new(model.clone(), Matrix::new(rows), self.settings.tolerance)
    }

    /// Prices the artificial columns out of the phase one objective row so
    /// that they start basic.
    fn presolve_initial_tableau(&self, model: &Model, artificials: &[Artificial]) -> Tableau {
        let mut tableau = self.basic_initial_tableau(model);
        for artificial in artificials {
            tableau.price_out(artificial.row, artificial.column);
        }
        tableau
    }

    /// Pivots every artificial variable still basic (at level zero) out of
    /// the basis. A row with nothing left to pivot on is redundant and is
    /// cleared.
    fn expunge_artificial_variables(&self, tableau: &mut Tableau, artificials: &[Artificial]) {
        let first_artificial = artificials
            .iter()
            .map(|a| a.column)
            .min()
            .unwrap_or_else(|| tableau.model().variables().len());

        for (i, column) in tableau.extract_basis().into_iter().enumerate() {
            let row = i + 1;
            match column {
                Some(column) if column >= first_artificial => {
                    let replacement = (0..first_artificial)
                        .find(|&j| tableau.matrix().at(row, j).abs() > self.settings.tolerance);
                    match replacement {
                        Some(j) => {
                            debug!("driving artificial column {column} out of row {row} via column {j}");
                            tableau.pivot(row, j);
                        }
                        None => {
                            debug!("row {row} is redundant");
                            tableau.clear_row(row);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Drops the artificial columns, restores the true objective row and
    /// re-expresses it in terms of the current basis.
    fn restore_initial_tableau(
        &self,
        phase_one: &Tableau,
        model: &Model,
        artificials: &[Artificial],
    ) -> Tableau {
        let basis = phase_one.extract_basis();

        let mut matrix = phase_one.matrix().clone();
        let columns = artificials.iter().map(|a| a.column).collect::<Vec<_>>();
        matrix.remove_columns(&columns);
        matrix.row_mut(0).copy_from_slice(&objective_row(model));

        let mut tableau = Tableau::new(model.clone(), matrix, self.settings.tolerance);
        for (i, column) in basis.into_iter().enumerate() {
            if let Some(column) = column {
                tableau.price_out(i + 1, column);
            }
        }
        tableau
    }

    /// Pivots until no improving column remains or one is unbounded.
    ///
    /// Under `PivotRule::Dantzig` a run of degenerate pivots switches the
    /// rest of the phase to `PivotRule::Bland`, which cannot cycle.
    fn optimize(&self, tableau: &mut Tableau, phase: u8) -> Result<(Outcome, usize)> {
        let tolerance = self.settings.tolerance;
        let mut rule = self.settings.pivot_rule;
        let mut degenerate = 0;
        let mut iterations = 0;

        trace!("phase {phase} initial tableau\n{tableau}");
        while let Some(column) = tableau.choose_entering_variable(rule) {
            if tableau.is_unbounded(column) {
                debug!("phase {phase}: column {column} is unbounded");
                return Ok((Outcome::Unbounded, iterations));
            }
            if iterations == self.settings.max_iterations {
                return Err(Error::IterationLimit { phase, iterations });
            }

            let row = tableau
                .choose_leaving_variable(column, rule)
                .ok_or_else(|| Error::Numerical(format!("no leaving row for column {column}")))?;
            let step = tableau.rhs(row);
            tableau.pivot(row, column);
            iterations += 1;
            debug!(
                "phase {phase} pivot {iterations}: column {column} enters at row {row}, objective {}",
                tableau.objective_value()
            );
            trace!("\n{tableau}");

            if step.abs() > tolerance {
                degenerate = 0;
                continue;
            }
            degenerate += 1;
            if rule == PivotRule::Dantzig && degenerate >= self.settings.degenerate_pivot_limit {
                warn!("phase {phase}: {degenerate} degenerate pivots in a row, switching to Bland's rule");
                rule = PivotRule::Bland;
            }
        }

        debug_assert!(tableau.is_optimal());
        Ok((Outcome::Optimal, iterations))
    }
}

/// Appends `coef * variable` to every constraint with `relation`, one new
/// variable per constraint, and returns the new column of each constraint.
fn add_auxiliary_variables(
    model: &mut Model,
    relation: Relation,
    coef: f64,
    prefix: &str,
) -> Vec<Option<usize>> {
    let mut columns = vec![None; model.constraints().len()];
    for index in 0..model.constraints().len() {
        if model.constraints()[index].relation() == relation {
            let variable = model.create_variable(format!("{prefix}{index}"));
            model.constraints_mut()[index].absorb(coef, &variable);
            columns[index] = Some(variable.index());
        }
    }
    columns
}

/// Clones the augmented model, adds an artificial variable to every
/// constraint without a slack and replaces the objective with the negated
/// sum of the artificial variables.
fn create_presolve_model(augmented: &Augmented) -> Result<(Model, Vec<Artificial>)> {
    let mut model = augmented.model.clone();
    let mut artificials = Vec::new();
    let mut mass = LinExpr::new();

    for (index, slack) in augmented.slacks.iter().enumerate() {
        if slack.is_none() {
            let variable = model.create_variable(format!("R{index}"));
            model.constraints_mut()[index].absorb(1.0, &variable);
            mass = mass - &variable;
            artificials.push(Artificial {
                row: index + 1,
                column: variable.index(),
            });
        }
    }

    model.maximize(mass)?;
    Ok((model, artificials))
}

/// Negated objective coefficients followed by a zero right-hand side.
fn objective_row(model: &Model) -> Vec<f64> {
    let n = model.variables().len();
    let coefficients = model
        .objective()
        .map(|objective| objective.expression().coefficients(n))
        .unwrap_or_else(|| vec![0.0; n]);
    coefficients.into_iter().map(|c| -c).chain(once(0.0)).collect()
}

use crate::error::{Error, Result};
use crate::expression::{LinExpr, Variable};
use crate::settings::Settings;
use crate::simplex::Solver;
use crate::solution::Solution;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl Relation {
    fn inverted(self) -> Self {
        match self {
            Relation::LessEqual => Relation::GreaterEqual,
            Relation::GreaterEqual => Relation::LessEqual,
            Relation::Equal => Relation::Equal,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessEqual => write!(f, "<="),
            Relation::GreaterEqual => write!(f, ">="),
            Relation::Equal => write!(f, "="),
        }
    }
}

/// `expression <relation> bound`, stored at row `index + 1` of every tableau.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    expression: LinExpr,
    relation: Relation,
    bound: f64,
    index: usize,
}

impl Constraint {
    pub fn expression(&self) -> &LinExpr {
        &self.expression
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn bound(&self) -> f64 {
        self.bound
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves the constant term of the expression to the bound. Idempotent.
    pub fn simplify(&mut self) {
        self.bound -= self.expression.take_constant();
    }

    /// Negates both sides and flips the relation. Its own inverse.
    pub fn invert(&mut self) {
        self.expression = -std::mem::take(&mut self.expression);
        self.bound = -self.bound;
        self.relation = self.relation.inverted();
    }

    /// `bound - expression(values)`; non-negative for a satisfied `<=`.
    pub fn slack_at(&self, values: &[f64]) -> f64 {
        self.bound - self.expression.evaluate(values)
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let slack = self.slack_at(values);
        match self.relation {
            Relation::LessEqual => slack >= -tolerance,
            Relation::GreaterEqual => slack <= tolerance,
            Relation::Equal => slack.abs() <= tolerance,
        }
    }

    /// Appends `coef * variable` and turns the constraint into an equality.
    pub(crate) fn absorb(&mut self, coef: f64, variable: &Variable) {
        self.expression.push_term(coef, variable);
        self.relation = Relation::Equal;
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.expression, self.relation, self.bound)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Maximize,
    Minimize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Objective {
    expression: LinExpr,
    direction: Direction,
}

impl Objective {
    pub fn expression(&self) -> &LinExpr {
        &self.expression
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Negates the expression and flips the direction; the optimum is unchanged.
    pub fn invert(&mut self) {
        self.expression = -std::mem::take(&mut self.expression);
        self.direction = match self.direction {
            Direction::Maximize => Direction::Minimize,
            Direction::Minimize => Direction::Maximize,
        };
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Maximize => write!(f, "max {}", self.expression),
            Direction::Minimize => write!(f, "min {}", self.expression),
        }
    }
}

/// A linear program over non-negative variables.
///
/// Variable and constraint indices are contiguous from zero and never reused.
/// `Clone` is a deep copy that preserves every index, which the solver relies
/// on when it maps tableau columns back onto the caller's variables.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Appends a variable with the next free index. Names need not be unique.
    pub fn create_variable(&mut self, name: impl Into<String>) -> Variable {
        let variable = Variable::new(self.variables.len(), name.into());
        self.variables.push(variable.clone());
        variable
    }

    /// Adds `expression <relation> bound`, moving any constant of the
    /// expression to the bound.
    pub fn add_constraint(
        &mut self,
        expression: impl Into<LinExpr>,
        relation: Relation,
        bound: f64,
    ) -> Result<&Constraint> {
        let index = self.constraints.len();
        let expression = expression.into();
        self.validate(&expression)?;
        if expression.is_constant() {
            return Err(Error::EmptyConstraint { index });
        }
        if !bound.is_finite() {
            return Err(Error::NonFinite {
                what: format!("bound of constraint {index}"),
            });
        }

        let mut constraint = Constraint {
            expression,
            relation,
            bound,
            index,
        };
        constraint.simplify();
        self.constraints.push(constraint);
        Ok(&self.constraints[index])
    }

    pub fn maximize(&mut self, expression: impl Into<LinExpr>) -> Result<()> {
        self.set_objective(expression.into(), Direction::Maximize)
    }

    pub fn minimize(&mut self, expression: impl Into<LinExpr>) -> Result<()> {
        self.set_objective(expression.into(), Direction::Minimize)
    }

    fn set_objective(&mut self, expression: LinExpr, direction: Direction) -> Result<()> {
        self.validate(&expression)?;
        self.objective = Some(Objective {
            expression,
            direction,
        });
        Ok(())
    }

    /// Canonicalizes every constraint. Idempotent.
    pub fn simplify(&mut self) {
        for constraint in &mut self.constraints {
            constraint.simplify();
        }
    }

    pub fn solve(&self) -> Result<Solution> {
        Solver::default().solve(self)
    }

    pub fn solve_with(&self, settings: &Settings) -> Result<Solution> {
        Solver::new(settings.clone()).solve(self)
    }

    /// Whether `values` (one per variable, by index) is non-negative and
    /// satisfies every constraint within `tolerance`.
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.variables.len()
            && values.iter().all(|&x| x >= -tolerance)
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied(values, tolerance))
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut [Constraint] {
        &mut self.constraints
    }

    pub(crate) fn objective_mut(&mut self) -> Option<&mut Objective> {
        self.objective.as_mut()
    }

    /// Fails unless every variable in `expression` matches the variable this
    /// model holds at its index, and every coefficient is finite.
    ///
    /// Variables compare by index and name, so a variable from another model
    /// with the same index and name passes and stands for this model's one.
    fn validate(&self, expression: &LinExpr) -> Result<()> {
        for (coef, var) in expression.terms() {
            if self.variables.get(var.index()) != Some(var) {
                return Err(Error::UnknownVariable {
                    index: var.index(),
                    name: var.name().to_string(),
                });
            }
            if !coef.is_finite() {
                return Err(Error::NonFinite {
                    what: format!("coefficient of {var}"),
                });
            }
        }
        if !expression.constant().is_finite() {
            return Err(Error::NonFinite {
                what: "constant term".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "model {}", self.name)?;
        match &self.objective {
            Some(objective) => writeln!(f, "  {objective}")?,
            None => writeln!(f, "  (no objective)")?,
        }
        writeln!(f, "subject to")?;
        for constraint in &self.constraints {
            writeln!(f, "  {constraint}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_sequential() {
        let mut model = Model::new("indices");
        let x = model.create_variable("x");
        let y = model.create_variable("x");

        assert_eq!(x.index(), 0);
        assert_eq!(y.index(), 1);

        let c0 = model
            .add_constraint(&x + &y, Relation::LessEqual, 4.0)
            .unwrap()
            .index();
        let c1 = model
            .add_constraint(&x - &y, Relation::GreaterEqual, 1.0)
            .unwrap()
            .index();
        assert_eq!((c0, c1), (0, 1));
    }

    #[test]
    fn test_constant_moves_to_bound() {
        let mut model = Model::new("constant");
        let x = model.create_variable("x");

        let constraint = model
            .add_constraint(2.0 * &x + 3.0, Relation::LessEqual, 10.0)
            .unwrap();
        assert_eq!(constraint.bound(), 7.0);
        assert_eq!(constraint.expression().constant(), 0.0);
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let mut model = Model::new("simplify");
        let x = model.create_variable("x");
        model.add_constraint(&x - 1.0, Relation::Equal, 2.0).unwrap();

        model.simplify();
        let once = model.clone();
        model.simplify();
        assert_eq!(model, once);
        assert_eq!(model.constraints()[0].bound(), 3.0);
    }

    #[test]
    fn test_invert_is_involution() {
        let mut model = Model::new("invert");
        let x = model.create_variable("x");
        let y = model.create_variable("y");
        model
            .add_constraint(&x - 2.0 * &y, Relation::GreaterEqual, -3.0)
            .unwrap();

        let original = model.constraints()[0].clone();
        let mut constraint = original.clone();

        constraint.invert();
        assert_eq!(constraint.relation(), Relation::LessEqual);
        assert_eq!(constraint.bound(), 3.0);
        assert_eq!(constraint.expression().coefficients(2), &[-1.0, 2.0]);

        constraint.invert();
        assert_eq!(constraint, original);
    }

    #[test]
    fn test_rejects_foreign_variable() {
        let mut other = Model::new("other");
        other.create_variable("a");
        let foreign = other.create_variable("b");

        let mut model = Model::new("model");
        model.create_variable("x");

        let err = model
            .add_constraint(&foreign, Relation::LessEqual, 1.0)
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnknownVariable {
                index: 1,
                name: "b".to_string()
            }
        );
        assert!(model.maximize(&foreign).is_err());

        let renamed = other.variables()[0].clone();
        assert_eq!(
            model.minimize(&renamed).unwrap_err(),
            Error::UnknownVariable {
                index: 0,
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_variables_match_by_index_and_name() {
        let mut other = Model::new("other");
        let twin = other.create_variable("x");

        let mut model = Model::new("model");
        let x = model.create_variable("x");

        assert_eq!(twin, x);
        model.add_constraint(&twin, Relation::LessEqual, 1.0).unwrap();
        assert_eq!(model.constraints()[0].expression().coefficient(&x), 1.0);
    }

    #[test]
    fn test_rejects_empty_constraint() {
        let mut model = Model::new("empty");
        let x = model.create_variable("x");

        let err = model
            .add_constraint(&x - &x, Relation::LessEqual, 1.0)
            .unwrap_err();
        assert_eq!(err, Error::EmptyConstraint { index: 0 });
        assert!(model.constraints().is_empty());
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let mut model = Model::new("nan");
        let x = model.create_variable("x");

        assert!(model
            .add_constraint(f64::NAN * &x, Relation::LessEqual, 1.0)
            .is_err());
        assert!(model
            .add_constraint(&x, Relation::LessEqual, f64::INFINITY)
            .is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut model = Model::new("clone");
        let x = model.create_variable("x");
        model.add_constraint(&x, Relation::LessEqual, 5.0).unwrap();
        model.maximize(&x).unwrap();

        let mut clone = model.clone();
        clone.constraints_mut()[0].invert();
        clone.objective_mut().unwrap().invert();
        let s = clone.create_variable("s");

        assert_eq!(s.index(), 1);
        assert_eq!(model.variables().len(), 1);
        assert_eq!(model.constraints()[0].relation(), Relation::LessEqual);
        assert_eq!(model.objective().unwrap().direction(), Direction::Maximize);
    }

    #[test]
    fn test_is_satisfied_by() {
        let mut model = Model::new("check");
        let x = model.create_variable("x");
        let y = model.create_variable("y");
        model.add_constraint(&x + &y, Relation::Equal, 10.0).unwrap();
        model.add_constraint(&x, Relation::GreaterEqual, 2.0).unwrap();

        assert!(model.is_satisfied_by(&[2.0, 8.0], 1e-9));
        assert!(!model.is_satisfied_by(&[1.0, 9.0], 1e-9));
        assert!(!model.is_satisfied_by(&[11.0, -1.0], 1e-9));
    }
}

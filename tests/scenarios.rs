//! End-to-end solves through the public model API.

use approx::assert_abs_diff_eq;
use tableau_simplex::{
    add, negate, scale, subtract, variable, Error, Model, PivotRule, Relation, Settings, Status,
};

const TOL: f64 = 1e-9;

fn solvable_with_artificial_variables() -> Model {
    let mut model = Model::new("solvable_artificial");
    let x1 = model.create_variable("x1");
    let x2 = model.create_variable("x2");

    model
        .add_constraint(&x1 + 2.0 * &x2, Relation::LessEqual, 20.0)
        .unwrap();
    model.add_constraint(&x1 + &x2, Relation::Equal, 10.0).unwrap();
    model.maximize(2.0 * &x1 + &x2).unwrap();
    model
}

fn unbounded() -> Model {
    let mut model = Model::new("unbounded");
    let x1 = model.create_variable("x1");
    let x2 = model.create_variable("x2");
    let x3 = model.create_variable("x3");

    model
        .add_constraint(&x1 - 3.0 * &x2 + &x3, Relation::GreaterEqual, 10.0)
        .unwrap();
    model
        .add_constraint(&x1 + 2.0 * &x2 - &x3, Relation::LessEqual, -10.0)
        .unwrap();
    model.maximize(5.0 * &x1 + 8.0 * &x2).unwrap();
    model
}

fn slack_only() -> Model {
    let mut model = Model::new("slack_only");
    let x1 = model.create_variable("x1");
    let x2 = model.create_variable("x2");

    model.add_constraint(&x1, Relation::LessEqual, 4.0).unwrap();
    model.add_constraint(&x2, Relation::LessEqual, 6.0).unwrap();
    model.add_constraint(&x1 + &x2, Relation::LessEqual, 8.0).unwrap();
    model.maximize(3.0 * &x1 + 2.0 * &x2).unwrap();
    model
}

fn infeasible() -> Model {
    let mut model = Model::new("infeasible");
    let x1 = model.create_variable("x1");
    let x2 = model.create_variable("x2");
    let x3 = model.create_variable("x3");

    model
        .add_constraint(&x1 - 3.0 * &x2 + &x3, Relation::GreaterEqual, 10.0)
        .unwrap();
    model
        .add_constraint(&x1 - 3.0 * &x2 + &x3, Relation::LessEqual, -10.0)
        .unwrap();
    model.maximize(5.0 * &x1 + 8.0 * &x2).unwrap();
    model
}

#[test]
fn solvable_with_artificial_variables_is_optimal() {
    let model = solvable_with_artificial_variables();
    let solution = model.solve().unwrap();

    assert_eq!(solution.status(), Status::Optimal);
    assert_eq!(solution.assignment(&model), Some(vec![10.0, 0.0]));
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 20.0, epsilon = TOL);
    assert!(solution.phase_one_tableau().is_some());
}

#[test]
fn unbounded_is_reported() {
    let model = unbounded();
    let solution = model.solve().unwrap();

    assert_eq!(solution.status(), Status::Unbounded);
    assert!(!solution.is_bounded());
    assert_eq!(solution.assignment(&model), None);
}

#[test]
fn slack_only_skips_phase_one() {
    let model = slack_only();
    let solution = model.solve().unwrap();

    assert_eq!(solution.status(), Status::Optimal);
    assert!(solution.phase_one_tableau().is_none());
    assert_eq!(solution.assignment(&model), Some(vec![4.0, 4.0]));
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 20.0, epsilon = TOL);
    assert_eq!(solution.iterations(), 2);
}

#[test]
fn contradictory_constraints_are_infeasible() {
    let model = infeasible();
    let solution = model.solve().unwrap();

    assert_eq!(solution.status(), Status::Infeasible);
    assert!(!solution.is_feasible());
    assert_eq!(solution.objective_value(), None);
}

#[test]
fn equality_and_greater_equal_trigger_phase_one() {
    for relation in [Relation::Equal, Relation::GreaterEqual] {
        let mut model = slack_only();
        let x1 = model.variables()[0].clone();
        model.add_constraint(&x1, relation, 1.0).unwrap();

        let solution = model.solve().unwrap();
        assert!(solution.phase_one_tableau().is_some(), "{relation}");
        assert!(solution.is_optimal());
    }
}

#[test]
fn minimization() {
    let mut model = Model::new("diet");
    let x = model.create_variable("x");
    let y = model.create_variable("y");
    model.add_constraint(&x, Relation::GreaterEqual, 1.0).unwrap();
    model.add_constraint(&y, Relation::GreaterEqual, 2.0).unwrap();
    model.add_constraint(&x + &y, Relation::LessEqual, 10.0).unwrap();
    model.minimize(2.0 * &x + 3.0 * &y + 1.0).unwrap();

    let solution = model.solve().unwrap();

    assert_eq!(solution.assignment(&model), Some(vec![1.0, 2.0]));
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 9.0, epsilon = TOL);
}

#[test]
fn constants_on_both_sides() {
    // (x + 5) + (y - 2) <= 7  is  x + y <= 4
    let mut model = Model::new("constants");
    let x = model.create_variable("x");
    let y = model.create_variable("y");
    let lhs = add(&(&x + 5.0), &(&y - 2.0));
    model.add_constraint(lhs, Relation::LessEqual, 7.0).unwrap();
    model.maximize(scale(&variable(&x), 2.0) + &y).unwrap();

    let solution = model.solve().unwrap();

    assert_eq!(model.constraints()[0].bound(), 4.0);
    assert_eq!(solution.assignment(&model), Some(vec![4.0, 0.0]));
}

#[test]
fn negative_bounds_are_normalized() {
    // -x - y <= -3 together with x <= 1, y <= 5; min x + 2y  ->  x = 1, y = 2
    let mut model = Model::new("negative_bound");
    let x = model.create_variable("x");
    let y = model.create_variable("y");
    model
        .add_constraint(negate(&(&x + &y)), Relation::LessEqual, -3.0)
        .unwrap();
    model.add_constraint(&x, Relation::LessEqual, 1.0).unwrap();
    model.add_constraint(&y, Relation::LessEqual, 5.0).unwrap();
    model
        .minimize(subtract(&(2.0 * &y), &negate(&variable(&x))))
        .unwrap();

    let solution = model.solve().unwrap();

    assert_eq!(solution.status(), Status::Optimal);
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 5.0, epsilon = TOL);
    let values = solution.assignment(&model).unwrap();
    assert_abs_diff_eq!(values[0], 1.0, epsilon = TOL);
    assert_abs_diff_eq!(values[1], 2.0, epsilon = TOL);
}

#[test]
fn solving_does_not_mutate_the_model() {
    for model in [
        solvable_with_artificial_variables(),
        unbounded(),
        slack_only(),
        infeasible(),
    ] {
        let before = model.clone();
        model.solve().unwrap();
        assert_eq!(model, before);
    }
}

#[test]
fn solving_is_deterministic() {
    let model = solvable_with_artificial_variables();
    let first = model.solve().unwrap().assignment(&model).unwrap();
    let second = model.solve().unwrap().assignment(&model).unwrap();

    assert_eq!(
        first.iter().map(|x| x.to_bits()).collect::<Vec<_>>(),
        second.iter().map(|x| x.to_bits()).collect::<Vec<_>>()
    );
}

#[test]
fn bland_rule_agrees() {
    let settings = Settings::default().with_pivot_rule(PivotRule::Bland);
    for model in [solvable_with_artificial_variables(), slack_only()] {
        let dantzig = model.solve().unwrap();
        let bland = model.solve_with(&settings).unwrap();

        assert_abs_diff_eq!(
            dantzig.objective_value().unwrap(),
            bland.objective_value().unwrap(),
            epsilon = TOL
        );
    }
    assert_eq!(
        unbounded().solve_with(&settings).unwrap().status(),
        Status::Unbounded
    );
    assert_eq!(
        infeasible().solve_with(&settings).unwrap().status(),
        Status::Infeasible
    );
}

#[test]
fn malformed_models_fail_fast() {
    let mut model = Model::new("malformed");
    let x = model.create_variable("x");

    assert_eq!(model.solve().unwrap_err(), Error::MissingObjective);
    model.maximize(&x).unwrap();
    assert_eq!(model.solve().unwrap_err(), Error::NoConstraints);
    assert_eq!(
        model
            .add_constraint(0.0 * &x + 1.0, Relation::LessEqual, 2.0)
            .unwrap_err(),
        Error::EmptyConstraint { index: 0 }
    );
}

#[test]
fn solution_display_lists_original_variables() {
    let model = slack_only();
    let rendered = model.solve().unwrap().to_string();

    assert!(rendered.contains("status: optimal"));
    assert!(rendered.contains("x1 = 4"));
    assert!(rendered.contains("x2 = 4"));
    assert!(!rendered.contains("s0"));
}

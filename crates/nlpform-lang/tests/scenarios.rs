use approx::assert_abs_diff_eq;
use nlpform_lang::{
    codegen, presets, solve, Bound, Error, EvalError, FormatError, ModelBuilder, ProblemSpec,
    Target,
};
use nlpform_solver::{CobylaSolver, Sense, SolveError};

const EPS: f64 = 1e-3;

#[test]
fn sum_of_squares_on_simplex() {
    let spec = ProblemSpec::new(3, "x1**2 + x2**2 + x3**2").with_constraint("x1 + x2 + x3 == 1");
    let report = solve(&spec).unwrap();

    for name in ["x1", "x2", "x3"] {
        assert_abs_diff_eq!(report.value(name).unwrap(), 1.0 / 3.0, epsilon = EPS);
    }
    assert_abs_diff_eq!(report.objective_value, 1.0 / 3.0, epsilon = EPS);
    assert!(report.all_satisfied(), "{}", report);
}

#[test]
fn shifted_paraboloid_with_inequality() {
    let spec = ProblemSpec::new(2, "(x1-3)**2 + (x2-2)**2").with_constraint("x1 + x2 <= 5");
    let report = solve(&spec).unwrap();

    assert_abs_diff_eq!(report.value("x1").unwrap(), 3.0, epsilon = EPS);
    assert_abs_diff_eq!(report.value("x2").unwrap(), 2.0, epsilon = EPS);
    assert_abs_diff_eq!(report.objective_value, 0.0, epsilon = EPS);
    assert!(report.constraints[0].satisfied);
}

#[test]
fn undeclared_variable_is_a_binding_error() {
    let spec = ProblemSpec::new(3, "x1 + x9");
    match solve(&spec) {
        Err(Error::Binding(EvalError::UnknownIdentifier { name, .. })) => assert_eq!(name, "x9"),
        other => panic!("Expected binding error, got {:?}", other),
    }
}

#[test]
fn constraint_without_relation_is_a_format_error() {
    let spec = ProblemSpec::new(2, "x1 + x2").with_constraint("x1 - x2");
    let err = solve(&spec).unwrap_err();
    assert!(matches!(err, Error::Format(FormatError::MissingRelation(_))));
    assert_eq!(err.kind(), "format error");
    assert!(err.to_string().contains("x1 - x2"));
}

#[test]
fn maximize_linear_objective() {
    let spec = ProblemSpec::new(2, "x1 + 2*x2")
        .with_sense(Sense::Maximize)
        .with_constraint("x1 + x2 <= 4")
        .with_bounds(vec![Bound::new(0.0, Some(3.0)), Bound::new(0.0, Some(3.0))]);
    let report = solve(&spec).unwrap();

    assert_abs_diff_eq!(report.value("x1").unwrap(), 1.0, epsilon = EPS);
    assert_abs_diff_eq!(report.value("x2").unwrap(), 3.0, epsilon = EPS);
    assert_abs_diff_eq!(report.objective_value, 7.0, epsilon = EPS);
    assert!(report.to_string().contains("Objective (maximized)"));
}

#[test]
fn emitted_problem_file_reproduces_the_solve() {
    let spec = ProblemSpec::new(3, "2*x1**2 + 2*x2**2 + x3**2 - 2*x1*x2 - 4*x1 - 6*x2")
        .with_constraint("x1 + x2 + x3 == 2")
        .with_constraint("x1**2 + 5*x2 == 5");
    let model = ModelBuilder::build(&spec).unwrap();
    let text = codegen::emit(&model, &spec.solver, Target::Toml).unwrap();
    let reloaded = ProblemSpec::from_toml(&text).unwrap();
    assert_eq!(reloaded.solver, spec.solver);

    let solver = CobylaSolver::with_config(spec.solver.clone());
    let (direct, _) = model.solve_with(&solver).unwrap();
    let (again, _) = ModelBuilder::build(&reloaded)
        .unwrap()
        .solve_with(&solver)
        .unwrap();
    assert_eq!(direct.values, again.values);
}

#[test]
fn default_preset_matches_inline_problem() {
    let preset = presets::find("default").unwrap().spec();
    let report = solve(&preset).unwrap();
    assert_abs_diff_eq!(report.objective_value, 1.0 / 3.0, epsilon = EPS);
}

#[test]
fn unreachable_equality_is_reported_by_the_solver() {
    // x1 is capped at 1 so x1 == 5 cannot hold
    let spec = ProblemSpec::new(1, "x1")
        .with_constraint("x1 == 5")
        .with_bounds(vec![Bound::new(0.0, Some(1.0))]);
    match solve(&spec) {
        Err(Error::Solver(SolveError::Infeasible { .. } | SolveError::Backend { .. })) => {}
        other => panic!("Expected solver error, got {:?}", other),
    }
}

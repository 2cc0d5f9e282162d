//! End-to-end scenarios driving whole programs through [`Session`], the way
//! a caller embedding this crate would: source text in, printed normal form
//! (or an error) out.

use lambdagraph::{FreeVariableOutcome, Session, SessionConfig};

fn session() -> Session {
    Session::new(SessionConfig::default())
}

#[test]
fn identity_on_a_free_variable() {
    let mut s = session();
    assert_eq!(s.reduce_lambda("eval (\\x.x)y;").unwrap(), "y");
}

#[test]
fn identity_applied_to_a_literal() {
    let mut s = session();
    assert_eq!(s.reduce_lambda("eval (\\x.x)5;").unwrap(), "5");
}

#[test]
fn k_combinator_via_a_let_definition() {
    let mut s = session();
    let src = "let K _ \\x.\\y.x; eval ((K)a)b;";
    assert_eq!(s.reduce_lambda(src).unwrap(), "a");
}

#[test]
fn k_combinator_discards_its_second_argument() {
    let mut s = session();
    assert_eq!(s.reduce_lambda("eval ((\\x.\\y.x)1)2;").unwrap(), "1");
}

#[test]
fn factorial_via_y_combinator_and_church_selector() {
    let mut s = session();
    let src = "let fact _ (?)\\f.\\n.(((zero)n)1)((*)n)(f)(pred)n; eval (fact)4;";
    assert_eq!(s.reduce_lambda(src).unwrap(), "24");
}

#[test]
fn iota_builds_an_ascending_list() {
    let mut s = session();
    assert_eq!(s.reduce_lambda("eval (iota)3;").unwrap(), "[1,2,3]");
}

#[test]
fn map_squares_every_element() {
    let mut s = session();
    assert_eq!(
        s.reduce_lambda("eval ((map)\\x.((*)x)x)[1,2,3];").unwrap(),
        "[1,4,9]"
    );
}

#[test]
fn append_concatenates_two_lists() {
    let mut s = session();
    assert_eq!(
        s.reduce_lambda("eval ((append)[1,2])[3,4];").unwrap(),
        "[1,2,3,4]"
    );
}

#[test]
fn head_of_an_append_and_tail_of_a_literal_list() {
    let mut s = session();
    assert_eq!(
        s.reduce_lambda("eval (^)((append)[1,2])[3,4];").unwrap(),
        "1"
    );
    assert_eq!(s.reduce_lambda("eval (~)[1,2,3];").unwrap(), "[2,3]");
}

#[test]
fn infix_arithmetic_and_relational_operators() {
    let mut s = session();
    assert_eq!(s.reduce_lambda("eval ((+)1)2;").unwrap(), "3");
    assert_eq!(s.reduce_lambda("eval ((<)1)2;").unwrap(), "TRUE");
    assert_eq!(s.reduce_lambda("eval ((<)2)1;").unwrap(), "FALSE");
}

#[test]
fn named_arithmetic_folds_a_list() {
    let mut s = session();
    assert_eq!(s.reduce_lambda("eval (add)[1,2,3];").unwrap(), "6");
    assert_eq!(s.reduce_lambda("eval (mult)[1,2,3,4];").unwrap(), "24");
}

#[test]
fn boolean_selectors_pick_a_branch_without_forcing_the_other() {
    let mut s = session();
    assert_eq!(s.reduce_lambda("eval ((TRUE)1)2;").unwrap(), "1");
    assert_eq!(s.reduce_lambda("eval ((FALSE)1)2;").unwrap(), "2");
    assert_eq!(s.reduce_lambda("eval (not)TRUE;").unwrap(), "FALSE");
    assert_eq!(s.reduce_lambda("eval ((and)TRUE)FALSE;").unwrap(), "FALSE");
    assert_eq!(s.reduce_lambda("eval ((or)TRUE)FALSE;").unwrap(), "TRUE");
}

#[test]
fn let_definitions_are_visible_to_later_evals_in_the_same_call() {
    let mut s = session();
    let src = "let two _ 2; eval ((+)two)two;";
    assert_eq!(s.reduce_lambda(src).unwrap(), "4");
}

#[test]
fn space_limit_is_reported_when_the_heap_is_too_small() {
    let mut cfg = SessionConfig::default();
    cfg.heap_size = 4;
    let mut s = Session::new(cfg);
    let err = s.reduce_lambda("eval ((+)1)2;").unwrap_err();
    assert!(matches!(err, lambdagraph::EngineError::SpaceLimit { .. }));
    assert_eq!(s.counters().space_limit_hits, 1);
}

#[test]
fn cycle_limit_stops_a_non_terminating_reduction() {
    let mut cfg = SessionConfig::default();
    cfg.cycle_limit = 50;
    let mut s = Session::new(cfg);
    let err = s
        .reduce_lambda("eval (\\x.(x)x)\\x.(x)x;")
        .unwrap_err();
    assert!(matches!(err, lambdagraph::EngineError::CycleLimit { .. }));
    assert_eq!(s.counters().cycle_limit_hits, 1);
}

#[test]
fn a_failing_eval_aborts_the_whole_call_but_still_counts() {
    let mut s = session();
    let before = s.counters().errors_occurred;
    let err = s.reduce_lambda("eval (pred)[1,2];").unwrap_err();
    assert!(matches!(
        err,
        lambdagraph::EngineError::WrongOperandForPredSucc
    ));
    assert_eq!(s.counters().errors_occurred, before + 1);
}

#[test]
fn standardize_renames_bound_variables_to_a_canonical_form() {
    let mut s = session();
    assert_eq!(s.standardize("\\a.a").unwrap(), "\\x1.x1");
    assert_eq!(s.standardize("\\banana.banana").unwrap(), "\\x1.x1");
}

#[test]
fn bind_all_free_vars_closes_a_term_outermost_first_discovered() {
    let mut s = session();
    assert_eq!(s.bind_all_free_vars("(f)x").unwrap(), "\\f.\\x.(f)x");
}

#[test]
fn free_variables_is_tri_valued() {
    let mut s = session();
    assert_eq!(s.free_variables("(f)x"), FreeVariableOutcome::HasFree);
    assert_eq!(s.free_variables("\\x.x"), FreeVariableOutcome::NoFree);
    assert_eq!(s.free_variables("(((("), FreeVariableOutcome::None);
}

//! End-to-end points-to scenarios
//!
//! Each test replays one C program path through `PointerAnalyzer` and checks
//! the resulting points-to facts.

mod common;

use common::*;
use cpa_pointer::config::{PointerAnalysisConfig, Preset, StructHandlingStrategy};
use cpa_pointer::features::points_to::{
    InvalidReason, LocationSet, PointerAnalysisError, PointerAnalysisState, PointerAnalyzer, PointerLocation,
    PointsToQuery,
};
use cpa_pointer::shared::models::{BinaryOperator, CExpression, CInitializer, CStatement, CType, CompositeMember};
use pretty_assertions::assert_eq;

fn analyze(config: PointerAnalysisConfig, edges: &[cpa_pointer::shared::models::CfaEdge]) -> cpa_pointer::PathAnalysisResult {
    PointerAnalyzer::from_config(config)
        .analyze_path(edges)
        .expect("path analysis")
}

// ═══════════════════════════════════════════════════════════════════════════
// Basic assignments
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_end_to_end_copy_through_pointer() {
    // int x = 1; int *p = &x; int *q = p; *q = 2;
    let main = Scope::new("main");
    let edges = PathBuilder::new()
        .declare(main.declaration("x", CType::int(), Some(CInitializer::Expression(CExpression::int_literal(1)))))
        .declare(main.declaration("p", int_ptr(), Some(CInitializer::Expression(main.addr("x")))))
        .declare(main.declaration("q", int_ptr(), Some(CInitializer::Expression(main.var("p", int_ptr())))))
        .assign(CExpression::deref(main.var("q", int_ptr())), CExpression::int_literal(2))
        .build();

    let result = analyze(PointerAnalysisConfig::default(), &edges);
    assert!(result.is_feasible());
    assert_eq!(result.points_to(&main.loc("p")), main.set(&["x"]));
    assert_eq!(result.points_to(&main.loc("q")), main.set(&["x"]));
    assert_eq!(result.stats.edges_processed, 4);
    assert_eq!(result.stats.strong_updates, 2);
}

#[test]
fn test_strong_update_through_single_target() {
    // int *x = &a; int **p = &x; *p = &y;
    let main = Scope::new("main");
    let pp = CType::pointer_to(int_ptr());
    let edges = PathBuilder::new()
        .declare(main.declaration("x", int_ptr(), Some(CInitializer::Expression(main.addr("a")))))
        .declare(main.declaration(
            "p",
            pp.clone(),
            Some(CInitializer::Expression(CExpression::address_of(main.var("x", int_ptr())))),
        ))
        .assign(CExpression::deref(main.var("p", pp)), main.addr("y"))
        .build();

    let result = analyze(PointerAnalysisConfig::default(), &edges);
    assert_eq!(result.points_to(&main.loc("x")), main.set(&["y"]));
    assert_eq!(result.stats.weak_updates, 0);
}

#[test]
fn test_weak_update_through_ambiguous_target() {
    let main = Scope::new("main");
    let pp = CType::pointer_to(int_ptr());
    let initial = PointerAnalysisState::new()
        .with_points_to(main.loc("p"), main.set(&["a", "b"]))
        .with_points_to(main.loc("a"), main.set(&["u"]))
        .with_points_to(main.loc("b"), main.set(&["v"]));
    let edges = PathBuilder::new()
        .assign(CExpression::deref(main.var("p", pp)), main.addr("y"))
        .build();

    let result = PointerAnalyzer::new()
        .with_initial_state(initial)
        .analyze_path(&edges)
        .expect("path analysis");
    assert_eq!(result.points_to(&main.loc("a")), main.set(&["u", "y"]));
    assert_eq!(result.points_to(&main.loc("b")), main.set(&["v", "y"]));
    assert_eq!(result.stats.weak_updates, 1);
}

#[test]
fn test_unknown_value_forgets() {
    // int *p = &x; p = external();
    let main = Scope::new("main");
    let external = function("external", int_ptr(), vec![]);
    let edges = PathBuilder::new()
        .declare(main.declaration("p", int_ptr(), Some(CInitializer::Expression(main.addr("x")))))
        .call_assign(main.var("p", int_ptr()), call(&external, vec![]))
        .build();

    let result = analyze(PointerAnalysisConfig::default(), &edges);
    assert!(result.points_to(&main.loc("p")).is_top());
    assert!(!result.final_state.has_entry(&main.loc("p")));
    assert_eq!(result.stats.forgets, 1);
}

#[test]
fn test_string_literals_share_storage() {
    let main = Scope::new("main");
    let edges = PathBuilder::new()
        .declare(main.declaration("s", char_ptr(), Some(CInitializer::Expression(CExpression::string_literal("abc")))))
        .declare(main.declaration("t", char_ptr(), Some(CInitializer::Expression(CExpression::string_literal("abc")))))
        .declare(main.declaration("u", char_ptr(), Some(CInitializer::Expression(CExpression::string_literal("xyz")))))
        .build();

    let analyzer = PointerAnalyzer::new();
    let result = analyzer.analyze_path(&edges).expect("path analysis");
    let view = analyzer.view(&result.final_state);
    let s = main.var("s", char_ptr());
    assert!(view.may_alias(&s, &main.var("t", char_ptr())).expect("query"));
    assert!(!view.may_alias(&s, &main.var("u", char_ptr())).expect("query"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Crash paths
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_write_through_null_is_infeasible() {
    // int **p = 0; *p = &x; p = 0;
    let main = Scope::new("main");
    let pp = CType::pointer_to(int_ptr());
    let edges = PathBuilder::new()
        .declare(main.declaration("p", pp.clone(), Some(CInitializer::Expression(CExpression::int_literal(0)))))
        .assign(CExpression::deref(main.var("p", pp.clone())), main.addr("x"))
        .assign(main.var("p", pp), CExpression::int_literal(0))
        .build();

    let result = analyze(PointerAnalysisConfig::default(), &edges);
    assert!(!result.is_feasible());
    assert_eq!(result.infeasible_at, Some(1));
    assert!(result.final_state.is_bottom());
    assert_eq!(result.stats.edges_processed, 2);
    assert_eq!(result.stats.infeasible, 1);
}

#[test]
fn test_field_through_null_is_infeasible() {
    // struct pair *sp = 0; sp->first = &x;
    let main = Scope::new("main");
    let sp_ty = CType::pointer_to(pair_type());
    let edges = PathBuilder::new()
        .declare(main.declaration("sp", sp_ty.clone(), Some(CInitializer::Expression(CExpression::null_pointer(pair_type())))))
        .assign(CExpression::arrow(main.var("sp", sp_ty), "first"), main.addr("x"))
        .build();

    let result = analyze(PointerAnalysisConfig::default(), &edges);
    assert_eq!(result.infeasible_at, Some(1));
}

#[test]
fn test_arithmetic_on_null_is_invalid() {
    // int *p = 0; int *q = p + 1;
    let main = Scope::new("main");
    let p = main.var("p", int_ptr());
    let edges = PathBuilder::new()
        .declare(main.declaration("p", int_ptr(), Some(CInitializer::Expression(CExpression::int_literal(0)))))
        .declare(main.declaration(
            "q",
            int_ptr(),
            Some(CInitializer::Expression(CExpression::binary(
                BinaryOperator::Plus,
                p,
                CExpression::int_literal(1),
                int_ptr(),
            ))),
        ))
        .build();

    let result = analyze(PointerAnalysisConfig::default(), &edges);
    assert_eq!(
        result.points_to(&main.loc("q")),
        LocationSet::singleton(PointerLocation::Invalid(InvalidReason::PointerArithmetic))
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Aggregates
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_union_members_alias() {
    // union { int *a; int *b; } u; u.a = &x; u.b = &y;
    let main = Scope::new("main");
    let union_ty = CType::union_type(
        "u_t",
        vec![CompositeMember::new("a", int_ptr()), CompositeMember::new("b", int_ptr())],
    );
    let u = main.var("u", union_ty.clone());
    let edges = PathBuilder::new()
        .declare(main.declaration("u", union_ty, None))
        .assign(CExpression::field(u.clone(), "a"), main.addr("x"))
        .assign(CExpression::field(u.clone(), "b"), main.addr("y"))
        .build();

    let analyzer = PointerAnalyzer::new();
    let result = analyzer.analyze_path(&edges).expect("path analysis");
    let view = analyzer.view(&result.final_state);
    let expected = main.set(&["x", "y"]);
    assert_eq!(view.points_to(&CExpression::field(u.clone(), "a")).expect("query"), expected);
    assert_eq!(view.points_to(&CExpression::field(u, "b")).expect("query"), expected);
    assert_eq!(result.stats.weak_updates, 1);
}

#[test]
fn test_struct_strategy_switch() {
    // struct pair s; s.first = &x; s.second = &y;
    let main = Scope::new("main");
    let s = main.var("s", pair_type());
    let edges = PathBuilder::new()
        .declare(main.declaration("s", pair_type(), None))
        .assign(CExpression::field(s.clone(), "first"), main.addr("x"))
        .assign(CExpression::field(s.clone(), "second"), main.addr("y"))
        .build();
    let first = CExpression::field(s, "first");

    let per_field = PointerAnalyzer::from_config(
        PointerAnalysisConfig::default().struct_strategy(StructHandlingStrategy::AllFields),
    );
    let result = per_field.analyze_path(&edges).expect("path analysis");
    assert_eq!(per_field.view(&result.final_state).points_to(&first).expect("query"), main.set(&["x"]));

    let merged = PointerAnalyzer::from_config(
        PointerAnalysisConfig::default().struct_strategy(StructHandlingStrategy::JustStruct),
    );
    let result = merged.analyze_path(&edges).expect("path analysis");
    assert_eq!(merged.view(&result.final_state).points_to(&first).expect("query"), main.set(&["x", "y"]));
}

#[test]
fn test_struct_access_through_pointer() {
    // struct pair s; struct pair *sp = &s; sp->first = &x;
    let main = Scope::new("main");
    let sp_ty = CType::pointer_to(pair_type());
    let s = main.var("s", pair_type());
    let edges = PathBuilder::new()
        .declare(main.declaration("s", pair_type(), None))
        .declare(main.declaration("sp", sp_ty.clone(), Some(CInitializer::Expression(CExpression::address_of(s.clone())))))
        .assign(CExpression::arrow(main.var("sp", sp_ty), "first"), main.addr("x"))
        .build();

    let analyzer = PointerAnalyzer::new();
    let result = analyzer.analyze_path(&edges).expect("path analysis");
    let view = analyzer.view(&result.final_state);
    assert_eq!(view.points_to(&CExpression::field(s, "first")).expect("query"), main.set(&["x"]));
}

#[test]
fn test_arrays_by_offset_sensitivity() {
    // int *arr[2] = { &x, &y }; int **q = arr + 1;
    let main = Scope::new("main");
    let arr_ty = CType::array_of(int_ptr(), Some(2));
    let pp = CType::pointer_to(int_ptr());
    let arr = main.var("arr", arr_ty.clone());
    let edges = PathBuilder::new()
        .declare(main.declaration(
            "arr",
            arr_ty,
            Some(CInitializer::List(vec![
                CInitializer::Expression(main.addr("x")),
                CInitializer::Expression(main.addr("y")),
            ])),
        ))
        .declare(main.declaration(
            "q",
            pp.clone(),
            Some(CInitializer::Expression(CExpression::binary(
                BinaryOperator::Plus,
                arr.clone(),
                CExpression::int_literal(1),
                pp.clone(),
            ))),
        ))
        .build();
    let through_q = CExpression::deref(main.var("q", pp));

    let thorough = PointerAnalyzer::from_config(PointerAnalysisConfig::from_preset(Preset::Thorough));
    let result = thorough.analyze_path(&edges).expect("path analysis");
    let view = thorough.view(&result.final_state);
    assert_eq!(view.points_to(&through_q).expect("query"), main.set(&["y"]));
    assert_eq!(view.points_to(&CExpression::subscript(arr.clone(), 0)).expect("query"), main.set(&["x"]));

    let collapsed = PointerAnalyzer::from_config(PointerAnalysisConfig::from_preset(Preset::Balanced));
    let result = collapsed.analyze_path(&edges).expect("path analysis");
    let view = collapsed.view(&result.final_state);
    assert_eq!(view.points_to(&through_q).expect("query"), main.set(&["x", "y"]));
}

#[test]
fn test_collapsed_array_write_is_weak() {
    // int *arr[2] = { &x, &y }; arr[0] = &z;
    let main = Scope::new("main");
    let arr_ty = CType::array_of(int_ptr(), Some(2));
    let arr = main.var("arr", arr_ty.clone());
    let edges = PathBuilder::new()
        .declare(main.declaration(
            "arr",
            arr_ty,
            Some(CInitializer::List(vec![
                CInitializer::Expression(main.addr("x")),
                CInitializer::Expression(main.addr("y")),
            ])),
        ))
        .assign(CExpression::subscript(arr, 0), main.addr("z"))
        .build();

    let result = analyze(PointerAnalysisConfig::default(), &edges);
    assert_eq!(result.points_to(&main.element("arr", 0)), main.set(&["x", "y", "z"]));
}

#[test]
fn test_write_through_pointer_into_collapsed_array_is_weak() {
    // int *arr[2] = { &x, &y }; int **p = arr; *p = &z;
    let main = Scope::new("main");
    let arr_ty = CType::array_of(int_ptr(), Some(2));
    let pp = CType::pointer_to(int_ptr());
    let edges = PathBuilder::new()
        .declare(main.declaration(
            "arr",
            arr_ty.clone(),
            Some(CInitializer::List(vec![
                CInitializer::Expression(main.addr("x")),
                CInitializer::Expression(main.addr("y")),
            ])),
        ))
        .declare(main.declaration("p", pp.clone(), Some(CInitializer::Expression(main.var("arr", arr_ty)))))
        .assign(CExpression::deref(main.var("p", pp)), main.addr("z"))
        .build();

    let result = analyze(PointerAnalysisConfig::default(), &edges);
    assert_eq!(result.points_to(&main.loc("p")), LocationSet::singleton(main.element("arr", 0)));
    assert_eq!(result.points_to(&main.element("arr", 0)), main.set(&["x", "y", "z"]));
    assert_eq!(result.stats.weak_updates, 1);

    // with offsets tracked, *p names exactly arr[0]
    let result = analyze(PointerAnalysisConfig::default().offset_sensitive(true), &edges);
    assert_eq!(result.points_to(&main.element("arr", 0)), main.set(&["z"]));
    assert_eq!(result.points_to(&main.element("arr", 1)), main.set(&["y"]));
}

// ═══════════════════════════════════════════════════════════════════════════
// Calls and branches
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_parameter_and_return_value_flow() {
    // int *id(int *v) { return v; }
    // int x; int *r; r = id(&x);
    let main = Scope::new("main");
    let id_scope = Scope::new("id");
    let id = function("id", int_ptr(), vec![id_scope.parameter("v", int_ptr())]);
    let id_call = call(&id, vec![main.addr("x")]);
    let r = main.var("r", int_ptr());

    let edges = PathBuilder::new()
        .declare(main.declaration("x", CType::int(), None))
        .declare(main.declaration("r", int_ptr(), None))
        .enter(id_call.clone(), id.clone())
        .ret("id", Some(id_scope.var("v", int_ptr())), int_ptr())
        .exit(
            "id",
            CStatement::FunctionCallAssignment {
                lhs: r,
                call: id_call,
            },
        )
        .build();

    let result = analyze(PointerAnalysisConfig::default(), &edges);
    assert_eq!(result.points_to(&id_scope.loc("v")), main.set(&["x"]));
    assert_eq!(result.points_to(&main.loc("r")), main.set(&["x"]));
    assert!(!result.final_state.has_entry(&PointerLocation::return_value("id")));

    // after the return statement, the value waits in the return location
    let before_exit = result.state_after(3).expect("state after return");
    assert_eq!(before_exit.points_to_set(&PointerLocation::return_value("id")), main.set(&["x"]));
}

#[test]
fn test_assume_prunes_impossible_null_branch() {
    // int *p = &x; if (p == 0) ...
    let main = Scope::new("main");
    let p = main.var("p", int_ptr());
    let is_null = CExpression::binary(BinaryOperator::Equals, p.clone(), CExpression::int_literal(0), CType::int());
    let declare = PathBuilder::new().declare(main.declaration("p", int_ptr(), Some(CInitializer::Expression(main.addr("x")))));

    let then_branch = declare.assume(is_null.clone(), true).build();
    let result = analyze(PointerAnalysisConfig::default(), &then_branch);
    assert_eq!(result.infeasible_at, Some(1));

    let else_branch = PathBuilder::new()
        .declare(main.declaration("p", int_ptr(), Some(CInitializer::Expression(main.addr("x")))))
        .assume(is_null, false)
        .build();
    let result = analyze(PointerAnalysisConfig::default(), &else_branch);
    assert!(result.is_feasible());
    assert_eq!(result.points_to(&main.loc("p")), main.set(&["x"]));
}

#[test]
fn test_assume_keeps_possible_alias() {
    // p → {x, y}, q → {y}: p == q may hold
    let main = Scope::new("main");
    let initial = PointerAnalysisState::new()
        .with_points_to(main.loc("p"), main.set(&["x", "y"]))
        .with_points_to(main.loc("q"), main.set(&["y"]));
    let same = CExpression::binary(
        BinaryOperator::Equals,
        main.var("p", int_ptr()),
        main.var("q", int_ptr()),
        CType::int(),
    );
    let edges = PathBuilder::new().assume(same, true).build();
    let result = PointerAnalyzer::new()
        .with_initial_state(initial.clone())
        .analyze_path(&edges)
        .expect("path analysis");
    assert!(result.is_feasible());
    assert_eq!(result.final_state, initial);
}

// ═══════════════════════════════════════════════════════════════════════════
// Analyzer behavior
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_path_limit_from_config() {
    let main = Scope::new("main");
    let mut builder = PathBuilder::new();
    for _ in 0..5 {
        builder = builder.assign(main.var("p", int_ptr()), main.addr("x"));
    }
    let edges = builder.build();

    let limited = PointerAnalyzer::from_config(PointerAnalysisConfig::default().max_path_edges(Some(4)));
    match limited.analyze_path(&edges) {
        Err(PointerAnalysisError::PathTooLong { length, limit }) => {
            assert_eq!(length, 5);
            assert_eq!(limit, 4);
        }
        other => panic!("expected PathTooLong, got {:?}", other.map(|r| r.stats)),
    }

    let unlimited = PointerAnalyzer::from_config(PointerAnalysisConfig::default().max_path_edges(None));
    assert_eq!(unlimited.analyze_path(&edges).expect("path analysis").stats.strong_updates, 5);
}

#[test]
fn test_unsupported_expression_names_edge() {
    let main = Scope::new("main");
    let label = CExpression::AddressOfLabel {
        label: "done".to_string(),
        ty: CType::pointer_to(CType::Void),
    };
    let edges = PathBuilder::new()
        .assign(main.var("p", int_ptr()), main.addr("x"))
        .assign(main.var("target", CType::pointer_to(CType::Void)), label)
        .build();

    let err = PointerAnalyzer::new().analyze_path(&edges).expect_err("address of label");
    assert!(err.to_string().starts_with("scenario.c:2"));
    assert!(matches!(err.root_cause(), PointerAnalysisError::UnsupportedExpression { .. }));
}

#[test]
fn test_state_snapshot_json() {
    let main = Scope::new("main");
    let edges = PathBuilder::new()
        .declare(main.declaration("p", int_ptr(), Some(CInitializer::Expression(main.addr("x")))))
        .build();
    let result = analyze(PointerAnalysisConfig::default(), &edges);
    let json = result.final_state.to_json();
    assert_eq!(json["bottom"], serde_json::json!(false));
    assert_eq!(json["points_to"]["main::p"], serde_json::json!(["main::x"]));
}

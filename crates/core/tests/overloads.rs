//! Overload resolution: first-match order, variadic tails, default filling.
//!
//! Resolution order is a load-bearing contract: the first structurally
//! compatible overload wins, with no scoring. These tests pin that down.

mod common;

use common::{Log, record, run, run_err, sprite_reader};
use cmdscript_core::{
    Color, CommandParam, ErrorClass, Interpreter, ModeSet, Point, codes, parse_args, strip_spans,
};

fn reader(signatures: &[&str]) -> Interpreter<Log> {
    let mut interp = Interpreter::new();
    interp
        .add_command("CMD", ModeSet::ROOT, signatures, record)
        .unwrap();
    interp
}

fn dispatch(interp: &Interpreter<Log>, line: &str) -> (usize, CommandParam) {
    let session = run(interp, line).unwrap_or_else(|e| panic!("{line:?}: {}", e.render()));
    let call = session.state.calls.last().unwrap();
    (call.overload, call.args.clone())
}

// ── Declaration order ───────────────────────────────────────────────────

#[test]
fn bare_number_binds_int_when_int_is_declared_first() {
    let interp = reader(&["int x", "string x"]);
    let (overload, args) = dispatch(&interp, "CMD 5");
    assert_eq!(overload, 0);
    assert_eq!(args.get_int(0).unwrap(), 5);
}

#[test]
fn swapping_declaration_order_changes_the_winner() {
    let interp = reader(&["string x", "int x"]);
    let (overload, args) = dispatch(&interp, "CMD 5");
    assert_eq!(overload, 0, "string accepts any scalar, so it now wins");
    assert_eq!(args.get_string(0).unwrap(), "5");
}

#[test]
fn quoted_number_never_binds_int() {
    let interp = reader(&["int x", "string x"]);
    let (overload, args) = dispatch(&interp, "CMD \"5\"");
    assert_eq!(overload, 1);
    assert_eq!(args.get_int(0).unwrap_err().id, codes::ARG_KIND_MISMATCH);
}

#[test]
fn definitions_for_one_name_resolve_in_registration_order() {
    let mut interp: Interpreter<Log> = Interpreter::new();
    interp.add_command("CMD", ModeSet::ROOT, &["float x"], record).unwrap();
    interp.add_command("CMD", ModeSet::ROOT, &["int x"], record).unwrap();
    let (overload, args) = dispatch(&interp, "CMD 5");
    assert_eq!(overload, 0);
    assert_eq!(args.get_float(0).unwrap(), 5.0);
}

// ── Variadic tails ──────────────────────────────────────────────────────

#[test]
fn grouped_variadic_binds_all_trailing_ints() {
    let interp = reader(&["string a, (int b...)"]);
    let (_, args) = dispatch(&interp, "CMD \"walk\", (1, 2, 3, 4)");
    let tail = args.get_param(1).unwrap();
    assert_eq!(tail.child_count(), 4);
    assert_eq!(tail.get_int(3).unwrap(), 4);
    // The group itself is unnamed; each element is bound to `b`.
    assert!(tail.name.is_none());
    assert_eq!(tail.get_param(0).unwrap().name.as_deref(), Some("b"));
}

#[test]
fn variadic_composite_mixes_alternatives() {
    let interp = reader(&["Color tints..."]);
    let (overload, args) = dispatch(&interp, "CMD (1, 2, 3), red, (4, 5, 6, 0)");
    assert_eq!(overload, 0);
    let tints = args.get_param(0).unwrap();
    assert_eq!(tints.child_count(), 3);
    assert_eq!(tints.get_color(0).unwrap(), Color::rgb(1, 2, 3));
    assert_eq!(tints.get_color(1).unwrap(), Color::rgb(255, 0, 0));
    assert_eq!(tints.get_color(2).unwrap().a, 0);
    // Each element is bound with the alternative it matched.
    let rgba = tints.get_param(2).unwrap();
    assert_eq!(rgba.get_param(3).unwrap().name.as_deref(), Some("a"));

    let (code, ..) = run_err(&interp, "CMD (1, 2, 3), (1, 2)");
    assert_eq!(code, codes::NO_MATCHING_SIGNATURE);
}

#[test]
fn grouped_variadic_accepts_empty_group() {
    let interp = reader(&["string a, (int b...)"]);
    let (_, args) = dispatch(&interp, "CMD \"walk\", ()");
    let tail = args.get_param(1).unwrap();
    assert!(tail.is_array());
    assert_eq!(tail.child_count(), 0);
}

#[test]
fn top_level_variadic_collects_remaining_siblings() {
    let interp = reader(&["string a, int b..."]);
    let (_, args) = dispatch(&interp, "CMD \"walk\", 1, 2, 3, 4");
    assert_eq!(args.child_count(), 2);
    let tail = args.get_param(1).unwrap();
    assert_eq!(tail.name.as_deref(), Some("b"));
    let values: Vec<i32> = (0..4).map(|i| tail.get_int(i).unwrap()).collect();
    assert_eq!(values, [1, 2, 3, 4]);
}

#[test]
fn top_level_variadic_with_no_values_is_empty_array() {
    let interp = reader(&["string a, int b..."]);
    let (_, args) = dispatch(&interp, "CMD \"walk\"");
    let tail = args.get_param(1).unwrap();
    assert!(tail.is_array());
    assert_eq!(tail.child_count(), 0);
}

#[test]
fn variadic_element_mismatch_rejects() {
    let interp = reader(&["string a, int b..."]);
    let (code, ..) = run_err(&interp, "CMD \"walk\", 1, x");
    assert_eq!(code, codes::NO_MATCHING_SIGNATURE);
}

// ── Defaults ────────────────────────────────────────────────────────────

#[test]
fn omitted_default_equals_parsed_literal() {
    let (interp, _) = sprite_reader();
    let session = run(&interp, "SPRITE \"hero\"\nBASIC \"foo\", (1,2)\n").unwrap();
    let args = session.state.args_of("BASIC", 0);
    let offset = args.get_param(2).unwrap();
    let expected = parse_args("(0,0)").unwrap();
    assert_eq!(strip_spans(offset), strip_spans(&expected.children()[0]));
    assert_eq!(offset.name.as_deref(), Some("drawOffset"));
}

#[test]
fn basic_scenario_reads_back_typed_values() {
    let (interp, _) = sprite_reader();
    let session = run(&interp, "SPRITE \"hero\"\nBASIC \"foo\", (1,2)").unwrap();
    let args = session.state.args_of("BASIC", 0);
    assert_eq!(args.get_string(0).unwrap(), "foo");
    assert_eq!(args.get_point(1).unwrap(), Point::new(1, 2));
    assert_eq!(args.get_point(2).unwrap(), Point::new(0, 0));
    assert_eq!(args.find("sourceIndex").unwrap().as_point().unwrap(), Point::new(1, 2));
}

#[test]
fn explicit_argument_overrides_default() {
    let (interp, _) = sprite_reader();
    let session = run(&interp, "SPRITE \"hero\"\nBASIC \"foo\", (1,2), (-3, 4)").unwrap();
    let args = session.state.args_of("BASIC", 0);
    assert_eq!(args.get_point(2).unwrap(), Point::new(-3, 4));
}

#[test]
fn default_nodes_are_anchored_at_end_of_line() {
    let (interp, _) = sprite_reader();
    let script = "SPRITE \"hero\"\nBASIC \"foo\", (1,2)";
    let session = run(&interp, script).unwrap();
    let offset = session.state.args_of("BASIC", 0).get_param(2).unwrap();
    assert!(offset.span.is_empty());
    assert_eq!(offset.span.start, script.len());
}

// ── Failures ────────────────────────────────────────────────────────────

#[test]
fn no_match_lists_shape_and_candidates() {
    let interp = reader(&["int x", "Point p"]);
    let (code, line, column, rendered) = run_err(&interp, "CMD \"a\", 2");
    assert_eq!(code, codes::NO_MATCHING_SIGNATURE);
    assert_eq!((line, column), (1, 5));
    assert!(rendered.contains("accepts (string, int)"), "{rendered}");
    assert!(rendered.contains("CMD int x"), "{rendered}");
    assert!(rendered.contains("CMD (int x, int y) p"), "{rendered}");
    assert!(rendered.contains("argument 1: expected int, found string"), "{rendered}");
}

#[test]
fn missing_and_extra_arguments_reject() {
    let interp = reader(&["int a, int b"]);
    let session = run(&interp, "CMD 1");
    let err = session.unwrap_err();
    assert_eq!(err.class(), Some(ErrorClass::Structural));
    assert!(err.to_string().contains("missing argument 2"), "{err}");

    let (code, ..) = run_err(&interp, "CMD 1, 2, 3");
    assert_eq!(code, codes::NO_MATCHING_SIGNATURE);
}

#[test]
fn nested_arity_must_match() {
    let interp = reader(&["Point p"]);
    for bad in ["CMD (1)", "CMD (1, 2, 3)", "CMD 1", "CMD ((1, 2))"] {
        let (code, ..) = run_err(&interp, bad);
        assert_eq!(code, codes::NO_MATCHING_SIGNATURE, "{bad:?}");
    }
}

#[test]
fn const_token_matches_case_insensitively() {
    let interp = reader(&["const none", "string sprite"]);
    let (overload, _) = dispatch(&interp, "CMD NONE");
    assert_eq!(overload, 0);
    let (overload, _) = dispatch(&interp, "CMD hero");
    assert_eq!(overload, 1);
}

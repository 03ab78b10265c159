//! Typed accessors used from inside command callbacks.

mod common;

use common::{Log, record, run, run_err};
use cmdscript_core::access::ScriptEnum;
use cmdscript_core::{
    Call, Color, ErrorClass, Interpreter, ModeSet, Rect, Session, Transition, Vector, codes,
    parse_args,
};

cmdscript_core::script_enum! {
    /// Animation playback order.
    enum Playback { Forward, Reverse, PingPong }
}

/// Reader whose TINT command stores the tint it read.
fn tint_reader() -> Interpreter<Log> {
    let mut interp = Interpreter::new();
    interp
        .add_command(
            "TINT",
            ModeSet::ROOT,
            &["Color c"],
            |call: &Call<'_>, session: &mut Session<Log>| {
                call.args().get_color(0)?;
                record(call, session)
            },
        )
        .unwrap();
    interp
}

#[test]
fn color_alpha_must_be_binary() {
    let interp = tint_reader();
    let (code, line, column, rendered) = run_err(&interp, "TINT (255, 0, 0, 128)");
    assert_eq!(code, codes::VALUE_OUT_OF_RANGE);
    assert_eq!((line, column), (1, 18));
    assert!(rendered.contains("alpha must be 0 or 255"), "{rendered}");

    let session = run(&interp, "TINT (255, 0, 0, 255)").unwrap();
    let color = session.state.args_of("TINT", 0).get_color(0).unwrap();
    assert_eq!(color, Color::rgb(255, 0, 0));
}

#[test]
fn color_forms() {
    let interp = tint_reader();
    let session = run(&interp, "TINT (1, 2, 3)\nTINT Magenta\nTINT (0, 0, 0, 0)").unwrap();
    let log = &session.state;
    assert_eq!(log.args_of("TINT", 0).get_color(0).unwrap(), Color::rgb(1, 2, 3));
    assert_eq!(log.args_of("TINT", 1).get_color(0).unwrap(), Color::rgb(255, 0, 255));
    assert_eq!(log.args_of("TINT", 2).get_color(0).unwrap().a, 0);

    let (code, ..) = run_err(&interp, "TINT (256, 0, 0)");
    assert_eq!(code, codes::VALUE_OUT_OF_RANGE);
    let (code, _, _, rendered) = run_err(&interp, "TINT mauve");
    assert_eq!(code, codes::INVALID_ENUM);
    assert!(rendered.contains("magenta"), "{rendered}");
}

#[test]
fn scalar_accessors_convert_representation_only() {
    let args = parse_args(r#"7, -3, 2.5, 4f, true, "12", walk"#).unwrap();
    assert_eq!(args.get_int(0).unwrap(), 7);
    assert_eq!(args.get_int(1).unwrap(), -3);
    assert_eq!(args.get_float(0).unwrap(), 7.0);
    assert_eq!(args.get_float(2).unwrap(), 2.5);
    assert_eq!(args.get_float(3).unwrap(), 4.0);
    assert!(args.get_bool(4).unwrap());
    assert_eq!(args.get_string(0).unwrap(), "7");

    let err = args.get_int(5).unwrap_err();
    assert_eq!(err.id, codes::ARG_KIND_MISMATCH);
    assert_eq!(err.class(), ErrorClass::Semantic);
    assert_eq!(args.get_int(2).unwrap_err().id, codes::ARG_KIND_MISMATCH);
    assert_eq!(args.get_bool(6).unwrap_err().id, codes::ARG_KIND_MISMATCH);

    let err = args.get_int(7).unwrap_err();
    assert_eq!(err.id, codes::ARG_INDEX_OUT_OF_RANGE);
}

#[test]
fn integer_overflow_is_a_domain_error() {
    let args = parse_args("99999999999").unwrap();
    assert_eq!(args.get_int(0).unwrap_err().id, codes::VALUE_OUT_OF_RANGE);
}

#[test]
fn composite_accessors() {
    let args = parse_args("(1.5, -2), (0, 0, 16, 8), ((4, 4), (2, 2)), (0, 0, -1, 5)").unwrap();
    assert_eq!(args.get_vector(0).unwrap(), Vector { x: 1.5, y: -2.0 });
    assert_eq!(
        args.get_rect(1).unwrap(),
        Rect {
            x: 0,
            y: 0,
            width: 16,
            height: 8
        }
    );
    assert_eq!(args.get_rect(2).unwrap().width, 2);
    assert_eq!(args.get_rect(3).unwrap_err().id, codes::VALUE_OUT_OF_RANGE);
    assert_eq!(args.get_point(1).unwrap_err().id, codes::ARG_KIND_MISMATCH);
}

#[test]
fn enums_read_from_identifiers_or_strings() {
    let args = parse_args(r#"pingpong, "Reverse", sideways"#).unwrap();
    assert_eq!(args.get_enum::<Playback>(0).unwrap(), Playback::PingPong);
    assert_eq!(args.get_enum::<Playback>(1).unwrap(), Playback::Reverse);
    let err = args.get_enum::<Playback>(2).unwrap_err();
    assert_eq!(err.id, codes::INVALID_ENUM);
    assert!(err.message.contains("Forward, Reverse, PingPong"), "{}", err.message);
    assert_eq!(Playback::TYPE_NAME, "Playback");
}

#[test]
fn none_is_recognised_case_insensitively() {
    let args = parse_args(r#"NONE, null, "none", nothing"#).unwrap();
    let flags: Vec<bool> = args.children().iter().map(|c| c.is_none()).collect();
    assert_eq!(flags, [true, true, false, false]);
}

#[test]
fn callback_errors_point_at_the_offending_argument() {
    let mut interp: Interpreter<Log> = Interpreter::new();
    interp
        .add_command(
            "DELAY",
            ModeSet::ROOT,
            &["string name, int ticks"],
            |call: &Call<'_>, _: &mut Session<Log>| {
                let ticks = call.args().get_param(1)?;
                if ticks.as_int()? <= 0 {
                    return Err(call.error_at(ticks, "delay must be positive"));
                }
                Ok(Transition::Stay)
            },
        )
        .unwrap();
    let (code, line, column, rendered) = run_err(&interp, "DELAY \"a\", 1\nDELAY \"b\", 0");
    assert_eq!(code, codes::COMMAND_FAILED);
    assert_eq!((line, column), (2, 12));
    assert!(rendered.contains("delay must be positive"), "{rendered}");
}

#[test]
fn callback_errors_without_span_cover_the_invocation() {
    let mut interp: Interpreter<Log> = Interpreter::new();
    interp
        .add_command("FAIL", ModeSet::ROOT, &[""], |_: &Call<'_>, _: &mut Session<Log>| {
            Err(cmdscript_core::Diagnostic::error(codes::COMMAND_FAILED, "nope", None))
        })
        .unwrap();
    let (code, line, column, _) = run_err(&interp, "\n  FAIL");
    assert_eq!(code, codes::COMMAND_FAILED);
    assert_eq!((line, column), (2, 3));
}

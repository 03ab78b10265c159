//! Whole-script reads: comments, positions, abort-on-first-error, files.

mod common;

use std::io::Write as _;

use common::{Log, record, run, run_err, sprite_reader};
use cmdscript_core::source::{all_lines, split_lines};
use cmdscript_core::{
    Interpreter, ModeSet, ReadSummary, ReaderConfig, ScriptError, Session, codes,
};

const SCRIPT: &str = "\
// Character sprites
SPRITESET \"heroes\"       # opened at root

  SPRITE \"hero\"
    BASIC \"idle\", (0, 0)  // default offset
    BASIC \"walk\", (1, 0), (2, -1)
    FRAMES \"walk\", (1, 2, 3)
  END
END
";

#[test]
fn reads_a_commented_script() {
    let (interp, _) = sprite_reader();
    let mut session = Session::new(Log::default());
    let summary = interp.read_str("sprites.txt", SCRIPT, &mut session).unwrap();
    assert_eq!(
        summary,
        ReadSummary {
            lines: 9,
            commands: 7,
            open_scopes: 0
        }
    );
    let names: Vec<&str> = session.state.calls.iter().map(|c| c.command.as_str()).collect();
    assert_eq!(names, ["SPRITESET", "SPRITE", "BASIC", "BASIC", "FRAMES", "END", "END"]);
}

#[test]
fn comment_markers_inside_strings_are_text() {
    let (interp, _) = sprite_reader();
    let session = run(&interp, "SPRITE \"a // b # c\" // real comment").unwrap();
    assert_eq!(session.state.args_of("SPRITE", 0).get_string(0).unwrap(), "a // b # c");
}

#[test]
fn first_error_aborts_the_read() {
    let (interp, _) = sprite_reader();
    let script = "SPRITE \"a\"\n  BASIC \"x\", 5\n  BASIC \"y\", (1, 1)\n";
    let (code, line, column, rendered) = run_err(&interp, script);
    assert_eq!(code, codes::NO_MATCHING_SIGNATURE);
    assert_eq!((line, column), (2, 9));
    assert!(rendered.contains("--> test.txt:2:9"), "{rendered}");
    assert!(rendered.contains("2 |   BASIC \"x\", 5"), "{rendered}");

    // Nothing after the failing line ran.
    let mut session = Session::new(Log::default());
    interp.read_str("t", script, &mut session).unwrap_err();
    assert_eq!(session.state.calls.len(), 1);
}

#[test]
fn unknown_command_reports_the_name() {
    let (interp, _) = sprite_reader();
    let (code, line, column, rendered) = run_err(&interp, "\n\n   BOGUS 1");
    assert_eq!(code, codes::UNKNOWN_COMMAND);
    assert_eq!((line, column), (3, 4));
    assert!(rendered.contains("unknown command `BOGUS`"), "{rendered}");
}

#[test]
fn command_names_are_case_insensitive() {
    let (interp, _) = sprite_reader();
    let session = run(&interp, "sprite \"a\"\nBasic \"b\", (0, 0)\nend").unwrap();
    assert_eq!(session.state.calls.len(), 3);
    assert_eq!(session.state.calls[1].command, "Basic");
}

#[test]
fn lexical_errors_are_located_in_the_script() {
    let (interp, _) = sprite_reader();
    let (code, line, column, _) = run_err(&interp, "SPRITE \"a\"\nBASIC \"oops, (1, 2)");
    assert_eq!(code, codes::UNTERMINATED_STRING);
    assert_eq!((line, column), (2, 7));
}

#[test]
fn crlf_scripts_read_like_lf() {
    let (interp, _) = sprite_reader();
    let text = SCRIPT.replace('\n', "\r\n");
    let session = run(&interp, &text).unwrap();
    assert_eq!(session.state.calls.len(), 7);
    let (_, line, column, _) = run_err(&interp, "SPRITE \"a\"\r\nBASIC 1\r\n");
    assert_eq!((line, column), (2, 7));
}

#[test]
fn byte_order_mark_is_ignored() {
    let (interp, _) = sprite_reader();
    let session = run(&interp, "\u{FEFF}SPRITE \"a\"\nBASIC \"x\", (0, 0)").unwrap();
    assert_eq!(session.state.calls.len(), 2);

    let (code, line, column, rendered) = run_err(&interp, "\u{FEFF}SPRITE \"oops");
    assert_eq!(code, codes::UNTERMINATED_STRING);
    assert_eq!((line, column), (1, 8));
    assert!(rendered.contains("1 | SPRITE \"oops\n  |        ^"), "{rendered}");
}

#[test]
fn custom_comment_markers() {
    let (mut interp, _) = sprite_reader();
    interp.set_config(ReaderConfig::default().with_line_comments([";"]));
    let session = run(&interp, "SPRITE \"a\" ; comment\nEND").unwrap();
    assert_eq!(session.state.calls.len(), 2);
    let (code, ..) = run_err(&interp, "SPRITE \"a\" // no longer a comment");
    assert_eq!(code, codes::UNEXPECTED_CHAR);
}

#[test]
fn prefixes_reach_the_callback() {
    let mut interp: Interpreter<Log> = Interpreter::new();
    interp.add_prefix("CONTINUE").unwrap();
    interp.add_command("FRAME", ModeSet::ROOT, &["int n"], record).unwrap();
    let session = run(&interp, "FRAME 1\ncontinue FRAME 2").unwrap();
    let calls = &session.state.calls;
    assert!(calls[0].prefixes.is_empty());
    assert_eq!(calls[1].prefixes, ["continue"]);
    assert!(interp.is_prefix("Continue"));

    // A prefix is not a command on its own.
    let (code, ..) = run_err(&interp, "CONTINUE");
    assert_eq!(code, codes::UNKNOWN_COMMAND);
}

#[test]
fn depth_limit_comes_from_config() {
    let config = ReaderConfig::default().with_max_depth(2);
    let mut interp: Interpreter<Log> = Interpreter::with_config(config);
    interp.add_command("P", ModeSet::ROOT, &["any v"], record).unwrap();
    assert!(run(&interp, "P ((1))").is_ok());
    let (code, ..) = run_err(&interp, "P (((1)))");
    assert_eq!(code, codes::NESTING_TOO_DEEP);
}

#[test]
fn read_file_uses_the_path_in_errors() {
    let (interp, _) = sprite_reader();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "SPRITE \"a\"\nEND\nEND\n").unwrap();
    let mut session = Session::new(Log::default());
    let err = interp.read_file(file.path(), &mut session).unwrap_err();
    let ScriptError::Located { path, line, .. } = &err else {
        panic!("expected located error, got {err}");
    };
    assert_eq!(path, &file.path().display().to_string());
    assert_eq!(*line, 3);
}

#[test]
fn missing_file_is_an_io_error() {
    let (interp, _) = sprite_reader();
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(Log::default());
    let err = interp
        .read_file(dir.path().join("absent.txt"), &mut session)
        .unwrap_err();
    assert!(matches!(err, ScriptError::Io { .. }), "{err}");
    assert!(err.diagnostic().is_none());
    assert!(err.render().starts_with("error: failed to read"));
}

#[test]
fn source_lines_keep_comments_and_offsets() {
    let lines = all_lines(SCRIPT, &["//", "#"]);
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0].code, "");
    assert_eq!(lines[0].comment, Some("// Character sprites"));
    assert!(lines[2].is_blank());
    assert_eq!(lines[1].code, "SPRITESET \"heroes\"");
    assert_eq!(lines[1].comment, Some("# opened at root"));
    let basic = &lines[4];
    assert_eq!(&SCRIPT[basic.offset..basic.offset + basic.code.len()], basic.code);

    let code: Vec<usize> = split_lines(SCRIPT, &["//", "#"]).iter().map(|l| l.number).collect();
    assert_eq!(code, [2, 4, 5, 6, 7, 8, 9]);
}

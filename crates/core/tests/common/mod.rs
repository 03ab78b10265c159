//! Shared test helpers for `cmdscript_core` integration tests.

#![allow(unreachable_pub)]

use cmdscript_core::{
    Call, CommandParam, Diagnostic, Interpreter, ModeSet, ScriptError, Session, Transition,
};

/// One recorded dispatch.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub command: String,
    pub overload: usize,
    pub prefixes: Vec<String>,
    pub args: CommandParam,
}

/// Reader state that remembers every dispatched command.
#[derive(Debug, Default)]
pub struct Log {
    pub calls: Vec<Dispatched>,
}

impl Log {
    /// Bound arguments of the `n`th call to `command`.
    #[allow(dead_code)]
    pub fn args_of(&self, command: &str, n: usize) -> &CommandParam {
        &self
            .calls
            .iter()
            .filter(|c| c.command.eq_ignore_ascii_case(command))
            .nth(n)
            .unwrap_or_else(|| panic!("no call #{n} to {command}"))
            .args
    }
}

/// Callback that records the call and stays in the current mode.
#[allow(dead_code)]
pub fn record(call: &Call<'_>, session: &mut Session<Log>) -> Result<Transition, Diagnostic> {
    push(call, session);
    Ok(Transition::Stay)
}

fn push(call: &Call<'_>, session: &mut Session<Log>) {
    session.state.calls.push(Dispatched {
        command: call.command().to_string(),
        overload: call.overload(),
        prefixes: call.prefixes().to_vec(),
        args: call.args().clone(),
    });
}

/// Callback factory: record, then apply `t`.
#[allow(dead_code)]
pub fn record_then(
    t: Transition,
) -> impl Fn(&Call<'_>, &mut Session<Log>) -> Result<Transition, Diagnostic> + 'static {
    move |call: &Call<'_>, session: &mut Session<Log>| {
        push(call, session);
        Ok(t)
    }
}

/// Modes of [`sprite_reader`].
#[allow(dead_code)]
pub struct SpriteModes {
    pub set: ModeSet,
    pub sprite: ModeSet,
}

/// A small sprite-definition reader:
///
/// ```text
/// SPRITESET "name"          Root         enter SpriteSet
/// SPRITE "name"             Root|Set     enter Sprite
/// BASIC "name", src[, off]  Sprite
/// FRAMES "name", (n...)     Sprite
/// END                       Set|Sprite   exit innermost
/// ```
#[allow(dead_code)]
pub fn sprite_reader() -> (Interpreter<Log>, SpriteModes) {
    let mut interp = Interpreter::new();
    let set = interp.define_mode("SpriteSet").unwrap();
    let sprite = interp.define_mode("Sprite").unwrap();
    interp.nest(sprite, ModeSet::ROOT | set);
    interp.nest(set, ModeSet::ROOT);
    interp
        .add_command(
            "SPRITESET",
            ModeSet::ROOT,
            &["string name"],
            record_then(Transition::Enter(set)),
        )
        .unwrap();
    interp
        .add_command(
            "SPRITE",
            ModeSet::ROOT | set,
            &["string name"],
            record_then(Transition::Enter(sprite)),
        )
        .unwrap();
    interp
        .add_command(
            "BASIC",
            sprite,
            &["string name, Point sourceIndex, Point drawOffset = (0, 0)"],
            record,
        )
        .unwrap();
    interp
        .add_command("FRAMES", sprite, &["string a, (int b...)"], record)
        .unwrap();
    interp
        .add_command("END", set | sprite, &[""], record_then(Transition::Exit(set | sprite)))
        .unwrap();
    (interp, SpriteModes { set, sprite })
}

/// Read `text` into a fresh session.
#[allow(dead_code)]
pub fn run(interp: &Interpreter<Log>, text: &str) -> Result<Session<Log>, ScriptError> {
    let mut session = Session::new(Log::default());
    interp.read_str("test.txt", text, &mut session)?;
    Ok(session)
}

/// Read `text`, expecting a located failure.
///
/// Returns the diagnostic code, 1-based line and column, and the rendered report.
#[allow(dead_code)]
pub fn run_err(interp: &Interpreter<Log>, text: &str) -> (String, usize, usize, String) {
    let err = run(interp, text).expect_err("script should fail");
    match &err {
        ScriptError::Located {
            line,
            column,
            diagnostic,
            ..
        } => (diagnostic.id.to_string(), *line, *column, err.render()),
        other => panic!("expected located error, got {other}"),
    }
}

//! Declarative command sets loaded from JSON manifests.

use std::io::Write as _;

use cmdscript_core::manifest::TransitionSpec;
use cmdscript_core::{Manifest, ModeSet, RegistryError, ScriptError, Session, codes};

const SPRITES: &str = r#"{
  "modes": ["SpriteSet", "Sprite", "Animation"],
  "nesting": { "Sprite": ["Root", "SpriteSet"], "Animation": ["Root"] },
  "prefixes": ["CONTINUE"],
  "types": [ { "name": "Frame", "shapes": ["(int index, int ticks)", "int"] } ],
  "commands": [
    { "name": "SHEET", "signatures": ["string name, string path"],
      "defines": { "arg": 0, "kind": "sheet" } },
    { "name": "SPRITESET", "signatures": ["string name"],
      "transition": { "enter": ["SpriteSet"] } },
    { "name": "SPRITE", "modes": ["Root", "SpriteSet"],
      "signatures": ["string name, string sheet", "string name, const none"],
      "transition": { "enter": ["Sprite"] },
      "defines": { "arg": 0, "kind": "sprite" },
      "requires": [ { "arg": 1, "kind": "sheet" } ] },
    { "name": "BASIC", "modes": ["Sprite"],
      "signatures": ["string name, Point sourceIndex, Point drawOffset = (0, 0)"] },
    { "name": "ANIMATION", "signatures": ["string name, string sprite"],
      "transition": { "enter": ["Animation"] },
      "requires": [ { "arg": 1, "kind": "sprite" } ] },
    { "name": "FRAME", "modes": ["Animation"], "signatures": ["Frame f"] },
    { "name": "END", "modes": ["SpriteSet", "Sprite", "Animation"], "signatures": [""],
      "transition": { "exit": ["SpriteSet", "Sprite", "Animation"] } }
  ],
  "config": { "require_closed_scopes": true }
}"#;

fn check(script: &str) -> Result<Session<()>, ScriptError> {
    let interp = Manifest::from_json(SPRITES).unwrap().build().unwrap();
    let mut session = Session::new(());
    interp.read_str("anim.txt", script, &mut session)?;
    Ok(session)
}

fn err_code(script: &str) -> String {
    check(script)
        .unwrap_err()
        .diagnostic()
        .map(|d| d.id.to_string())
        .unwrap_or_default()
}

#[test]
fn parses_every_section() {
    let manifest = Manifest::from_json(SPRITES).unwrap();
    assert_eq!(manifest.modes, ["SpriteSet", "Sprite", "Animation"]);
    assert_eq!(manifest.commands.len(), 7);
    assert_eq!(manifest.commands[1].transition, TransitionSpec::Enter(vec!["SpriteSet".into()]));
    assert_eq!(manifest.commands[0].transition, TransitionSpec::Stay);
    assert!(manifest.commands[0].modes.is_empty());
    assert!(manifest.config.as_ref().unwrap().require_closed_scopes);
}

#[test]
fn builds_an_interpreter() {
    let interp = Manifest::from_json(SPRITES).unwrap().build().unwrap();
    assert!(interp.commands().contains("sprite"));
    assert!(interp.is_prefix("continue"));
    assert!(interp.types().contains("frame"));
    let sprite = interp.modes().lookup("Sprite").unwrap();
    assert_eq!(interp.commands().get("BASIC").unwrap()[0].modes, sprite);
    assert_eq!(interp.commands().get("SHEET").unwrap()[0].modes, ModeSet::ROOT);
    assert!(interp.config().require_closed_scopes);
}

#[test]
fn checks_a_valid_script() {
    let script = "\
SHEET \"chars\", \"chars.png\"
SPRITESET \"heroes\"
  SPRITE \"hero\", \"chars\"
    BASIC \"idle\", (0, 0)
  END
END
SPRITE \"ghost\", none
END
ANIMATION \"walk\", \"hero\"
  FRAME (0, 4)
  CONTINUE FRAME 1
END
";
    let session = check(script).unwrap();
    assert_eq!(session.resources.names(), ["chars", "ghost", "hero"]);
}

#[test]
fn reports_dangling_and_mistyped_references() {
    assert_eq!(err_code("SPRITE \"hero\", \"chars\"\nEND"), codes::RESOURCE_MISSING);
    let mistyped = "SHEET \"chars\", \"c.png\"\nANIMATION \"walk\", \"chars\"\nEND";
    let err = check(mistyped).unwrap_err();
    let diag = err.diagnostic().unwrap();
    assert_eq!(diag.id, codes::RESOURCE_TYPE_MISMATCH);
    assert!(diag.message.contains("is a sheet, not a sprite"), "{}", diag.message);
}

#[test]
fn enforces_modes_nesting_and_closure() {
    assert_eq!(err_code("BASIC \"a\", (0, 0)"), codes::MODE_MISMATCH);
    assert_eq!(err_code("SPRITE \"a\", none\nANIMATION \"w\", \"a\""), codes::MODE_MISMATCH);
    assert_eq!(err_code("SPRITE \"a\", none"), codes::UNCLOSED_SCOPE);
    assert_eq!(err_code("SPRITE \"a\", none\nFRAME 1\nEND"), codes::MODE_MISMATCH);
}

#[test]
fn manifest_nesting_rules_apply() {
    let json = r#"{
      "modes": ["Outer", "Inner"],
      "nesting": { "Inner": ["Outer"] },
      "commands": [
        { "name": "OUTER", "signatures": [""], "transition": { "enter": ["Outer"] } },
        { "name": "INNER", "modes": ["any"], "signatures": [""], "transition": { "enter": ["Inner"] } }
      ]
    }"#;
    let interp = Manifest::from_json(json).unwrap().build().unwrap();
    let mut session = Session::new(());
    interp.read_str("n", "OUTER\nINNER", &mut session).unwrap();
    let err = interp.read_str("n", "INNER", &mut session).unwrap_err();
    assert_eq!(err.diagnostic().unwrap().id, codes::ILLEGAL_NESTING);
}

#[test]
fn rejects_bad_manifests() {
    let unknown_field = r#"{ "modez": [] }"#;
    assert!(matches!(Manifest::from_json(unknown_field), Err(RegistryError::ManifestJson(_))));

    let unknown_mode = r#"{ "commands": [ { "name": "A", "modes": ["Nope"], "signatures": [""] } ] }"#;
    let err = Manifest::from_json(unknown_mode).unwrap().build().unwrap_err();
    assert!(matches!(err, RegistryError::UnknownMode(ref m) if m == "Nope"), "{err}");

    let empty_enter = r#"{ "commands": [ { "name": "A", "signatures": [""], "transition": { "enter": [] } } ] }"#;
    let err = Manifest::from_json(empty_enter).unwrap().build().unwrap_err();
    assert!(matches!(err, RegistryError::Manifest(_)), "{err}");

    let bad_sig = r#"{ "commands": [ { "name": "A", "signatures": ["int x = oops"] } ] }"#;
    let err = Manifest::from_json(bad_sig).unwrap().build().unwrap_err();
    assert!(matches!(err, RegistryError::InvalidDefault { .. }), "{err}");

    let dup_mode = r#"{ "modes": ["A", "a"] }"#;
    let err = Manifest::from_json(dup_mode).unwrap().build().unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateMode(_)), "{err}");
}

#[test]
fn load_reads_files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SPRITES.as_bytes()).unwrap();
    let manifest = Manifest::load(file.path()).unwrap();
    assert_eq!(manifest.commands.len(), 7);

    let dir = tempfile::tempdir().unwrap();
    let err = Manifest::load(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, RegistryError::ManifestIo { .. }), "{err}");
}

#[test]
fn manifests_round_trip_through_serde() {
    let manifest = Manifest::from_json(SPRITES).unwrap();
    let json = serde_json::to_string(&manifest).unwrap();
    assert_eq!(Manifest::from_json(&json).unwrap(), manifest);
}

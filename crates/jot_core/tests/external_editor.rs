#![cfg(unix)]

mod common;

use common::backends;
use jot_core::{Editor, EditorError, ExternalEditor, JotError};
use std::path::Path;

fn shell_editor(script: &str) -> ExternalEditor {
    ExternalEditor::new("sh").with_args(["-c", script])
}

#[test]
fn external_editor_returns_file_content_and_removes_scratch() {
    let dir = tempfile::tempdir().unwrap();
    let record = dir.path().join("scratch-path");
    let script = format!(
        "cat \"$0\" > '{}.seen'; echo \"$0\" > '{}'; printf edited > \"$0\"",
        record.display(),
        record.display()
    );

    let mut editor = shell_editor(&script);
    let edited = editor.edit("initial text").unwrap();
    assert_eq!(edited, "edited");

    let seen = std::fs::read_to_string(format!("{}.seen", record.display())).unwrap();
    assert_eq!(seen, "initial text");

    let scratch = std::fs::read_to_string(&record).unwrap();
    assert!(!Path::new(scratch.trim()).exists());
}

#[test]
fn non_zero_exit_is_reported_and_nothing_is_saved() {
    for backend in backends() {
        let (name, service, _dir) = backend.into_service();
        let namespace = service.track_path(Path::new("/proj")).unwrap();

        let mut editor = shell_editor("printf partial > \"$0\"; exit 3");
        let err = service.edit(namespace.id, "todo", &mut editor).unwrap_err();
        assert!(
            matches!(
                &err,
                JotError::EditorFailed { source: EditorError::Exited { status, .. }, .. }
                    if status.code() == Some(3)
            ),
            "{name}: {err}"
        );
        assert!(service.list_entries(namespace.id).unwrap().is_empty(), "{name}");
    }
}

#[test]
fn missing_program_is_a_spawn_failure() {
    let mut editor = ExternalEditor::new("jot-test-no-such-editor");
    let err = editor.edit("").unwrap_err();
    assert!(matches!(err, EditorError::Spawn { .. }), "{err}");
}

#[test]
fn external_editor_drives_a_full_session() {
    for backend in backends() {
        let (name, service, _dir) = backend.into_service();
        let namespace = service.track_path(Path::new("/proj")).unwrap();

        let mut append = shell_editor("printf 'more\\n' >> \"$0\"");
        service.edit(namespace.id, "log", &mut append).unwrap();
        service.edit(namespace.id, "log", &mut append).unwrap();

        let entry = service.show(namespace.id, "log").unwrap();
        assert_eq!(entry.content, "more\nmore\n", "{name}");
    }
}

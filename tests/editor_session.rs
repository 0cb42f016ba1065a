//! End-to-end tests for the editor loop
//!
//! These tests feed raw keystroke bytes (including escape sequences) into an
//! editor whose input is an in-memory queue and whose output is a byte
//! vector, then inspect the buffer, the file on disk and the emitted frames.

use std::collections::VecDeque;
use std::fs;
use std::io::{Read, Seek};
use std::os::fd::AsRawFd;

use quill::app::Config;
use quill::input::ctrl;
use quill::{Control, Cursor, Editor, EditorResult, TtyOutput, WindowSize};

type TestEditor = Editor<VecDeque<u8>, Vec<u8>>;

/// Helper to build an editor for an 80x24 terminal
fn new_editor() -> TestEditor {
    Editor::new(
        VecDeque::new(),
        Vec::new(),
        WindowSize::new(24, 80),
        &Config::default(),
    )
}

/// Helper to queue keystrokes and process them all, rendering after each
/// key like the real loop does
fn type_bytes(editor: &mut TestEditor, bytes: &[u8]) -> EditorResult<Control> {
    editor.input_mut().extend(bytes.iter().copied());

    let mut control = Control::Continue;
    while !editor.input_mut().is_empty() {
        editor.refresh_screen()?;
        control = editor.process_keypress()?;
        if control == Control::Quit {
            break;
        }
    }
    Ok(control)
}

fn lines(editor: &TestEditor) -> Vec<String> {
    editor
        .buffer()
        .rows()
        .iter()
        .map(|r| String::from_utf8_lossy(r.chars()).into_owned())
        .collect()
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn test_type_text_with_newlines() {
    let mut editor = new_editor();
    type_bytes(&mut editor, b"hello\rworld").unwrap();

    assert_eq!(lines(&editor), vec!["hello", "world"]);
    assert_eq!(editor.buffer().cursor(), Cursor::new(5, 1));
}

#[test]
fn test_arrow_keys_and_delete() {
    let mut editor = new_editor();
    editor
        .buffer_mut()
        .load(vec![b"abc".to_vec(), b"def".to_vec()]);

    // Down, Right, Delete -> removes 'e'
    type_bytes(&mut editor, b"\x1b[B\x1b[C\x1b[3~").unwrap();
    assert_eq!(lines(&editor), vec!["abc", "df"]);

    // Home, Backspace -> joins lines
    type_bytes(&mut editor, b"\x1b[H\x7f").unwrap();
    assert_eq!(lines(&editor), vec!["abcdf"]);
    assert_eq!(editor.buffer().cursor(), Cursor::new(3, 0));
}

#[test]
fn test_end_key_variants() {
    let mut editor = new_editor();
    editor.buffer_mut().load(vec![b"abcdef".to_vec()]);

    let end_keys: [&[u8]; 4] = [b"\x1b[F", b"\x1bOF", b"\x1b[4~", b"\x1b[8~"];
    for seq in end_keys {
        type_bytes(&mut editor, b"\x1b[1~").unwrap();
        assert_eq!(editor.buffer().cursor().cx, 0);
        type_bytes(&mut editor, seq).unwrap();
        assert_eq!(editor.buffer().cursor().cx, 6, "sequence {:?}", seq);
    }
}

#[test]
fn test_lone_escape_changes_nothing() {
    let mut editor = new_editor();
    editor.buffer_mut().load(vec![b"abc".to_vec()]);

    type_bytes(&mut editor, b"\x1b").unwrap();

    assert_eq!(lines(&editor), vec!["abc"]);
    assert!(!editor.buffer().is_dirty());
}

#[test]
fn test_garbled_sequence_then_text() {
    let mut editor = new_editor();
    type_bytes(&mut editor, b"\x1b[2~ok").unwrap();
    assert_eq!(lines(&editor), vec!["ok"]);
}

// ============================================================================
// Quit confirmation
// ============================================================================

#[test]
fn test_quit_dirty_three_times() {
    let mut editor = new_editor();
    type_bytes(&mut editor, b"x").unwrap();

    let q = ctrl(b'q');
    assert_eq!(type_bytes(&mut editor, &[q]).unwrap(), Control::Continue);
    assert_eq!(type_bytes(&mut editor, &[q]).unwrap(), Control::Continue);
    assert_eq!(type_bytes(&mut editor, &[q]).unwrap(), Control::Quit);
}

#[test]
fn test_quit_countdown_restarts_after_other_key() {
    let mut editor = new_editor();
    type_bytes(&mut editor, b"x").unwrap();

    let q = ctrl(b'q');
    type_bytes(&mut editor, &[q, q]).unwrap();
    // Intervening arrow key resets the countdown
    type_bytes(&mut editor, b"\x1b[D").unwrap();

    assert_eq!(type_bytes(&mut editor, &[q]).unwrap(), Control::Continue);
    assert!(editor.status_message().contains("2 more times"));
}

#[test]
fn test_quit_clean_exits_immediately() {
    let mut editor = new_editor();
    assert_eq!(type_bytes(&mut editor, &[ctrl(b'q')]).unwrap(), Control::Quit);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_open_edit_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    fs::write(&path, "alpha\r\nbeta\n").unwrap();

    let mut editor = new_editor();
    editor.open(&path).unwrap();
    assert_eq!(lines(&editor), vec!["alpha", "beta"]);

    type_bytes(&mut editor, b"\x1b[B\x1b[F!").unwrap();
    type_bytes(&mut editor, &[ctrl(b's')]).unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"alpha\nbeta!\n");
    assert!(!editor.buffer().is_dirty());
    assert_eq!(editor.status_message(), "12 bytes written to disk");

    // Saved buffers quit on the first press
    assert_eq!(type_bytes(&mut editor, &[ctrl(b'q')]).unwrap(), Control::Quit);
}

#[test]
fn test_save_as_through_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.txt");

    let mut editor = new_editor();
    type_bytes(&mut editor, b"text").unwrap();

    let mut keys = vec![ctrl(b's')];
    keys.extend_from_slice(path.to_str().unwrap().as_bytes());
    keys.push(b'\r');
    type_bytes(&mut editor, &keys).unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"text\n");
    assert_eq!(editor.buffer().filename(), Some(path.as_path()));
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_frames_are_complete() {
    let mut editor = new_editor();
    editor.buffer_mut().load(vec![b"first".to_vec()]);
    editor.refresh_screen().unwrap();

    let frame = String::from_utf8_lossy(editor.output()).into_owned();
    assert!(frame.starts_with("\x1b[?25l\x1b[H"));
    assert!(frame.contains("first\x1b[K\r\n"));
    assert!(frame.contains("\x1b[7m[No Name] - 1 lines"));
    assert!(frame.contains("HELP: Ctrl-S = save | Ctrl-Q = quit"));
    assert!(frame.ends_with("\x1b[1;1H\x1b[?25h"));
    // 22 text rows + status bar
    assert_eq!(frame.matches("\r\n").count(), 23);
}

#[test]
fn test_tty_output_receives_each_frame_unbuffered() {
    let mut file = tempfile::tempfile().unwrap();
    let mut editor = Editor::new(
        VecDeque::new(),
        TtyOutput::from_raw_fd(file.as_raw_fd()),
        WindowSize::new(24, 80),
        &Config::default(),
    );
    editor.buffer_mut().load(vec![b"first".to_vec()]);
    editor.refresh_screen().unwrap();

    let mut written = Vec::new();
    file.rewind().unwrap();
    file.read_to_end(&mut written).unwrap();
    let frame = String::from_utf8_lossy(&written).into_owned();

    // The message bar and cursor placement after the last line break are
    // already on the descriptor
    assert!(frame.starts_with("\x1b[?25l\x1b[H"));
    assert!(frame.contains("HELP: Ctrl-S = save | Ctrl-Q = quit"));
    assert!(frame.ends_with("\x1b[1;1H\x1b[?25h"));
}

#[test]
fn test_scrolling_follows_cursor() {
    let mut editor = new_editor();
    let many: Vec<Vec<u8>> = (0..100).map(|i| format!("row {}", i).into_bytes()).collect();
    editor.buffer_mut().load(many);

    for _ in 0..30 {
        type_bytes(&mut editor, b"\x1b[B").unwrap();
    }
    editor.refresh_screen().unwrap();

    assert_eq!(editor.viewport().row_offset, 30 + 1 - 22);

    let output = String::from_utf8_lossy(editor.output()).into_owned();
    let last_frame = output.rsplit("\x1b[?25l").next().unwrap();
    assert!(last_frame.contains("row 30\x1b[K"));
    assert!(!last_frame.contains("row 8\x1b[K"));
    assert!(last_frame.ends_with("\x1b[22;1H\x1b[?25h"));
}

#[test]
fn test_long_line_scrolls_horizontally() {
    let mut editor = new_editor();
    editor.buffer_mut().load(vec![vec![b'x'; 200]]);

    type_bytes(&mut editor, b"\x1b[F").unwrap();
    editor.refresh_screen().unwrap();

    assert_eq!(editor.viewport().col_offset, 200 + 1 - 80);
}

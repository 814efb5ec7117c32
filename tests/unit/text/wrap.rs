use super::*;
use crate::assets::font::BuiltinFont;

fn texts(lines: &[WrappedLine]) -> Vec<&str> {
    lines.iter().map(|l| l.text.as_str()).collect()
}

#[test]
fn short_text_is_one_line() {
    let font = BuiltinFont::new(8.0);
    let lines = wrap_text("BIG SALE", 200.0, &font).unwrap();
    assert_eq!(texts(&lines), ["BIG SALE"]);
    assert_eq!(lines[0].char_start, 0);
    assert_eq!(lines[0].char_len, 8);
}

#[test]
fn greedy_breaks_between_words() {
    // 8px per char: 10 chars per 80px line.
    let font = BuiltinFont::new(8.0);
    let lines = wrap_text("sofa and chair set today", 80.0, &font).unwrap();
    assert_eq!(texts(&lines), ["sofa and", "chair set", "today"]);
    assert_eq!(lines[1].char_start, 9);
    assert_eq!(lines[2].char_start, 19);
    for l in &lines {
        assert!(font.measure(&l.text).unwrap().0 <= 80.0);
    }
}

#[test]
fn explicit_newlines_break_and_keep_offsets() {
    let font = BuiltinFont::new(8.0);
    let lines = wrap_text("CALL\n\n0800", 400.0, &font).unwrap();
    assert_eq!(texts(&lines), ["CALL", "", "0800"]);
    assert_eq!(lines[2].char_start, 6);
}

#[test]
fn overlong_word_breaks_by_chars() {
    let font = BuiltinFont::new(8.0);
    let lines = wrap_text("abcdefghij xy", 32.0, &font).unwrap();
    assert_eq!(texts(&lines), ["abcd", "efgh", "ij", "xy"]);
    assert_eq!(lines[3].char_start, 11);
}

#[test]
fn single_char_wider_than_limit_still_progresses() {
    let font = BuiltinFont::new(16.0);
    let lines = wrap_text("ab", 4.0, &font).unwrap();
    assert_eq!(texts(&lines), ["a", "b"]);
}

#[test]
fn empty_and_blank_inputs() {
    let font = BuiltinFont::new(8.0);
    assert!(wrap_text("", 100.0, &font).unwrap().is_empty());
    assert_eq!(texts(&wrap_text("   ", 100.0, &font).unwrap()), [""]);
    assert!(wrap_text("x", 0.0, &font).is_err());
    assert!(wrap_text("x", f32::NAN, &font).is_err());
}

#[test]
fn wrapping_is_deterministic() {
    let font = BuiltinFont::new(12.0);
    let text = "Handmade oak dining table, free delivery this week only";
    let a = wrap_text(text, 150.0, &font).unwrap();
    let b = wrap_text(text, 150.0, &font).unwrap();
    assert_eq!(a, b);
}

#[test]
fn visible_chars_clamps_to_line() {
    let line = WrappedLine {
        text: "chair".to_owned(),
        char_start: 5,
        char_len: 5,
    };
    assert_eq!(line.visible_chars(0), 0);
    assert_eq!(line.visible_chars(5), 0);
    assert_eq!(line.visible_chars(7), 2);
    assert_eq!(line.visible_chars(100), 5);
}

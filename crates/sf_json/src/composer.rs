use alloc::string::String;
use core::fmt::{Display, Write};

/// The output buffer of the encoder.
///
/// In pretty mode every [`next_item`](Self::next_item) starts a new line
/// indented to the current level; otherwise layout calls write nothing.
#[derive(Debug)]
pub(crate) struct Composer<'c> {
    out: String,
    indent: Option<&'c str>,
    level: usize,
}

impl<'c> Composer<'c> {
    pub fn new(indent: Option<&'c str>) -> Self {
        Self {
            out: String::with_capacity(128),
            indent,
            level: 0,
        }
    }

    #[inline]
    pub fn indent(&mut self) {
        self.level += 1;
    }

    #[inline]
    pub fn unindent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub fn next_item(&mut self) {
        if let Some(indent) = self.indent {
            self.out.push('\n');
            for _ in 0..self.level {
                self.out.push_str(indent);
            }
        }
    }

    #[inline]
    pub fn space(&mut self) {
        if self.indent.is_some() {
            self.out.push(' ');
        }
    }

    #[inline]
    pub fn print_char(&mut self, c: char) {
        self.out.push(c);
    }

    pub fn print_display(&mut self, value: impl Display) {
        // Writing into a `String` cannot fail.
        let _ = write!(self.out, "{value}");
    }

    pub fn print_quoted(&mut self, value: &str) {
        write_escaped(&mut self.out, value);
    }

    #[inline]
    pub fn finish(self) -> String {
        self.out
    }
}

/// Appends `value` as a JSON string literal.
pub(crate) fn write_escaped(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if u32::from(c) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{Composer, write_escaped};

    #[test]
    fn escapes_control_characters() {
        let mut out = String::new();
        write_escaped(&mut out, "a\"b\\c\nd\u{1}é");
        assert_eq!(out, r#""a\"b\\c\nd\u0001é""#);
    }

    #[test]
    fn pretty_layout() {
        let mut composer = Composer::new(Some("  "));
        composer.print_char('{');
        composer.indent();
        composer.next_item();
        composer.print_quoted("a");
        composer.print_char(':');
        composer.space();
        composer.print_display(1);
        composer.unindent();
        composer.next_item();
        composer.print_char('}');
        assert_eq!(composer.finish(), "{\n  \"a\": 1\n}");

        let mut compact = Composer::new(None);
        compact.next_item();
        compact.space();
        compact.print_char('[');
        compact.print_char(']');
        assert_eq!(compact.finish(), "[]");
    }
}

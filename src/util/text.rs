use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

fn is_stripped_control(c: char) -> bool {
    c == '\u{7f}' || (c < ' ' && c != '\t' && c != '\n' && c != '\r')
}

/// Removes terminal control characters and ANSI escape sequences from feed text.
///
/// Post bodies, titles and author names come from a remote server and are
/// printed straight to the terminal, so CSI (`ESC [ ... final`) and OSC
/// (`ESC ] ... BEL|ESC \`) sequences and bare C0 controls are dropped.
/// Tab, newline and carriage return are kept.
///
/// Returns `Cow::Borrowed` when there is nothing to strip.
///
/// ```
/// use beluga::util::strip_control_chars;
///
/// assert_eq!(strip_control_chars("\x1b[31mred\x1b[0m"), "red");
/// assert_eq!(strip_control_chars("plain"), "plain");
/// ```
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| c == '\x1b' || is_stripped_control(c)) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    // Parameters and intermediates run until a final byte in 0x40..=0x7e
                    for c in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
        } else if !is_stripped_control(c) {
            out.push(c);
        }
    }

    Cow::Owned(out)
}

/// Display width in terminal columns (CJK and emoji count as two).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cuts `s` to at most `max_width` columns, ending in `...` when shortened.
///
/// Widths too narrow for a character plus the ellipsis get a bare prefix.
///
/// ```
/// use beluga::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let ellipsis_width = ELLIPSIS.len();
    let (budget, suffix) = if max_width <= ellipsis_width {
        (max_width, "")
    } else {
        (max_width - ellipsis_width, ELLIPSIS)
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

/// Greedy word wrap to `width` columns, preserving existing line breaks.
///
/// Words wider than `width` are placed on a line of their own rather than
/// split. A `width` of 0 disables wrapping.
pub fn wrap_to_width(s: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in s.lines() {
        if width == 0 || display_width(paragraph) <= width {
            lines.push(paragraph.trim_end().to_string());
            continue;
        }

        let mut line = String::new();
        let mut line_width = 0;
        for word in paragraph.split_whitespace() {
            let word_width = display_width(word);
            if line_width > 0 && line_width + 1 + word_width > width {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }
            line.push_str(word);
            line_width += word_width;
        }
        lines.push(line);
    }

    lines
}

//! JS adapter: single-pass heuristic minifier.
//!
//! A character scanner tracking quote-string state, block/line comments and
//! regex literals. This is not a JavaScript parser: the regex-vs-division
//! decision looks at the last significant character, so constructs like
//! `a /regex/ b` are ambiguous and may be mis-scanned. Known limitation,
//! kept on purpose; output is best effort.

/// Characters that never need an adjacent space after whitespace collapse.
const NO_SPACE: &str = "{}()[]<>|&!?:;,+-*/=\"'";

/// Characters after which a `/` starts a regex literal rather than division.
const REGEX_PRECEDERS: &str = "([{=,:;!&|?+-*%~^<>";

/// Strip block comments, keep everything else, trim.
pub fn merge(input: &str) -> String {
    scan(input, false)
}

/// Strip all comments, collapse whitespace, drop `;` before `}`.
pub fn minify(input: &str) -> String {
    scan(input, true)
}

fn no_space(c: char) -> bool {
    NO_SPACE.contains(c)
}

/// Single pass over the input.
///
/// `minify = false` removes block comments only (the merge transform);
/// `minify = true` additionally removes line comments, collapses whitespace
/// runs to a single space (dropped entirely next to punctuation) and strips
/// a trailing `;` before `}`.
fn scan(input: &str, minify: bool) -> String {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    // Space owed from a collapsed whitespace run (minify mode).
    let mut pending_space = false;
    // Last significant character emitted, for the regex heuristic.
    let mut last_sig: Option<char> = None;

    // Emit one normal-mode character, settling any owed space.
    macro_rules! emit {
        ($c:expr) => {{
            let c: char = $c;
            if minify {
                if pending_space
                    && !out.is_empty()
                    && !last_sig.is_none_or(no_space)
                    && !no_space(c)
                {
                    out.push(' ');
                }
                pending_space = false;
                if c == '}' && out.ends_with(';') {
                    out.pop();
                }
            }
            out.push(c);
            last_sig = Some(c);
        }};
    }

    while i < len {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match c {
            '\'' | '"' => {
                // String literal, copied verbatim with escapes.
                emit!(c);
                i += 1;
                while i < len {
                    let s = chars[i];
                    out.push(s);
                    i += 1;
                    if s == '\\' {
                        if i < len {
                            out.push(chars[i]);
                            i += 1;
                        }
                    } else if s == c {
                        break;
                    }
                }
                last_sig = Some(c);
            }
            '/' if next == Some('*') => {
                // Block comment: dropped in both modes.
                i += 2;
                while i < len && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(len);
                if minify {
                    pending_space = true;
                }
            }
            '/' if next == Some('/') => {
                if minify {
                    // Line comment: skip to end of line.
                    while i < len && chars[i] != '\n' {
                        i += 1;
                    }
                    pending_space = true;
                } else {
                    // Merge keeps line comments.
                    while i < len && chars[i] != '\n' {
                        out.push(chars[i]);
                        i += 1;
                    }
                    last_sig = Some('/');
                }
            }
            '/' if last_sig.is_none_or(|p| REGEX_PRECEDERS.contains(p)) => {
                // Heuristic: regex literal. Copy verbatim, honoring escapes
                // and character classes. A newline aborts the literal.
                emit!('/');
                i += 1;
                let mut in_class = false;
                while i < len {
                    let r = chars[i];
                    if r == '\n' {
                        break;
                    }
                    out.push(r);
                    i += 1;
                    if r == '\\' {
                        if i < len && chars[i] != '\n' {
                            out.push(chars[i]);
                            i += 1;
                        }
                    } else if r == '[' {
                        in_class = true;
                    } else if r == ']' {
                        in_class = false;
                    } else if r == '/' && !in_class {
                        break;
                    }
                }
                last_sig = Some('/');
            }
            _ if c.is_whitespace() => {
                if minify {
                    pending_space = true;
                } else {
                    out.push(c);
                }
                i += 1;
            }
            _ => {
                emit!(c);
                i += 1;
            }
        }
    }

    out.trim().to_string()
}

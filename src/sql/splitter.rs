//! SQL statement splitter
//!
//! A single forward character scan divides a multi-statement script
//! into individually executable statements. Three flags track context:
//! `in_quote` (with the remembered quote character, `"` or `'`),
//! `in_line_comment` (`--` to end of line) and `in_block_comment`
//! (`/*` to `*/`). Quote characters toggle only outside comments,
//! comment openers are honoured only outside strings, and inside a
//! comment nothing is recognized except its own terminator. Escaped
//! quotes (preceded by `\`) do not toggle the string flag.
//!
//! A semicolon ends a statement only when all three flags are clear.
//! Comment text, including the markers, is not copied into the emitted
//! statements; a line comment contributes its terminating newline and a
//! block comment a single space so surrounding tokens never fuse.
//! Trailing text without a final semicolon is emitted as the last
//! statement. Statements that are empty after trimming are dropped.

/// Split a script into trimmed, non-empty statements, in order.
pub fn split_statements(script: &str) -> Vec<String> {
    let chars: Vec<char> = script.chars().collect();
    let mut statements = Vec::new();
    let mut current = String::new();

    let mut in_quote: Option<char> = None;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();

        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                current.push('\n');
            }
            i += 1;
            continue;
        }

        if in_block_comment {
            if ch == '*' && next == Some('/') {
                in_block_comment = false;
                current.push(' ');
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        if let Some(quote) = in_quote {
            if ch == '\\' {
                current.push(ch);
                if let Some(escaped) = next {
                    current.push(escaped);
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }
            if ch == quote {
                in_quote = None;
            }
            current.push(ch);
            i += 1;
            continue;
        }

        match ch {
            '\'' | '"' => {
                in_quote = Some(ch);
                current.push(ch);
                i += 1;
            }
            '-' if next == Some('-') => {
                in_line_comment = true;
                i += 2;
            }
            '/' if next == Some('*') => {
                in_block_comment = true;
                i += 2;
            }
            ';' => {
                push_statement(&mut statements, &mut current);
                i += 1;
            }
            _ => {
                current.push(ch);
                i += 1;
            }
        }
    }

    push_statement(&mut statements, &mut current);
    statements
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

//! Static prechecks for submissions
//!
//! These decide the first three rungs of the judging precedence chain without
//! running anything: does the source compile, does it fault, does it loop
//! forever. Every check is conservative. When a pattern is ambiguous the
//! check returns `None` and leaves the decision to the judge backend.

use std::ops::ControlFlow;

use crate::outcome::SubmissionOutcome;
use crate::types::Language;

/// A fault detected before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    Compilation(String),
    Runtime(String),
    NonTermination(String),
}

impl Fault {
    #[must_use]
    pub fn into_outcome(self) -> SubmissionOutcome {
        match self {
            Self::Compilation(message) => SubmissionOutcome::compilation_error(message),
            Self::Runtime(message) => SubmissionOutcome::runtime_error(message),
            Self::NonTermination(message) => SubmissionOutcome::time_limit_exceeded(message),
        }
    }
}

/// Words that let control leave an otherwise unbounded loop.
const LOOP_ESCAPES: [&str; 11] = [
    "break", "return", "raise", "throw", "panic", "goto", "exit", "Exit", "quit", "abort",
    "yield",
];

/// Run all prechecks in precedence order.
pub fn precheck(language: Language, source: &str) -> Option<Fault> {
    if source.trim().is_empty() {
        return Some(Fault::Compilation("empty source".to_string()));
    }

    let code = match strip_literals(language, source) {
        Ok(code) => code,
        Err(message) => return Some(Fault::Compilation(message)),
    };

    if let Some(message) = unbalanced_delimiter(&code) {
        return Some(Fault::Compilation(message));
    }

    if matches!(language, Language::Go | Language::Rust)
        && let Some(line) = literal_zero_divisor(&code)
    {
        // constant division by zero is rejected at compile time
        return Some(Fault::Compilation(format!("line {line}: division by zero")));
    }

    straight_line_fault(language, &code)
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Remove comments and the contents of string literals, keeping newlines so
/// line numbers survive. Fails on unterminated strings and block comments.
fn strip_literals(language: Language, source: &str) -> Result<String, String> {
    let chars: Vec<char> = source.chars().collect();
    let scripted = matches!(language, Language::JavaScript | Language::TypeScript);
    let mut out = String::with_capacity(source.len());
    let mut line = 1;
    let mut last_significant: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let prev = i.checked_sub(1).map(|p| chars[p]);

        match c {
            '\n' => {
                line += 1;
                out.push('\n');
                i += 1;
            }
            '#' if language.hash_comments() => {
                i = skip_to_newline(&chars, i);
            }
            '/' if !language.hash_comments() && next == Some('/') => {
                i = skip_to_newline(&chars, i);
            }
            '/' if !language.hash_comments() && next == Some('*') => {
                let start_line = line;
                let mut j = i + 2;
                loop {
                    match chars.get(j) {
                        None => {
                            return Err(format!(
                                "line {start_line}: unterminated block comment"
                            ));
                        }
                        Some('*') if chars.get(j + 1) == Some(&'/') => break,
                        Some('\n') => {
                            line += 1;
                            out.push('\n');
                        }
                        Some(_) => {}
                    }
                    j += 1;
                }
                i = j + 2;
            }
            '/' if scripted && regex_may_start(last_significant) => {
                match regex_end(&chars, i) {
                    Some(end) => {
                        out.push_str("/re/");
                        last_significant = Some('/');
                        i = end + 1;
                    }
                    None => {
                        out.push('/');
                        last_significant = Some('/');
                        i += 1;
                    }
                }
            }
            'r' if language == Language::Rust
                && matches!(next, Some('#') | Some('"'))
                && !prev.is_some_and(is_ident) =>
            {
                let hashes = chars[i + 1..].iter().take_while(|&&h| h == '#').count();
                let open = i + 1 + hashes;
                if chars.get(open) != Some(&'"') {
                    out.push(c);
                    i += 1;
                    continue;
                }
                let start_line = line;
                let mut j = open + 1;
                loop {
                    match chars.get(j) {
                        None => {
                            return Err(format!(
                                "line {start_line}: unterminated raw string literal"
                            ));
                        }
                        Some('"')
                            if chars[j + 1..].iter().take_while(|&&h| h == '#').count()
                                >= hashes =>
                        {
                            break;
                        }
                        Some('\n') => {
                            line += 1;
                            out.push('\n');
                        }
                        Some(_) => {}
                    }
                    j += 1;
                }
                out.push_str("\"\"");
                last_significant = Some('"');
                i = j + 1 + hashes;
            }
            '\'' if language == Language::Rust
                && next != Some('\\')
                && chars.get(i + 2) != Some(&'\'') =>
            {
                // lifetime or label
                out.push(c);
                last_significant = Some(c);
                i += 1;
            }
            '"' | '\'' | '`' => {
                let triple = language == Language::Python
                    && c != '`'
                    && next == Some(c)
                    && chars.get(i + 2) == Some(&c);
                let multiline = triple || (c == '`' && !language.hash_comments());
                if c == '`' && !multiline {
                    out.push(c);
                    i += 1;
                    continue;
                }

                let start_line = line;
                let mut j = if triple { i + 3 } else { i + 1 };
                loop {
                    match chars.get(j) {
                        None => {
                            return Err(format!(
                                "line {start_line}: unterminated string literal"
                            ));
                        }
                        Some('\\') if language != Language::Go || c != '`' => {
                            if chars.get(j + 1) == Some(&'\n') {
                                line += 1;
                                out.push('\n');
                            }
                            j += 2;
                            continue;
                        }
                        Some('\n') if !multiline => {
                            return Err(format!(
                                "line {start_line}: unterminated string literal"
                            ));
                        }
                        Some('\n') => {
                            line += 1;
                            out.push('\n');
                        }
                        Some(&q)
                            if q == c
                                && (!triple
                                    || (chars.get(j + 1) == Some(&c)
                                        && chars.get(j + 2) == Some(&c))) =>
                        {
                            break;
                        }
                        Some(_) => {}
                    }
                    j += 1;
                }
                out.push(c);
                out.push(c);
                last_significant = Some(c);
                i = if triple { j + 3 } else { j + 1 };
            }
            _ => {
                out.push(c);
                if !c.is_whitespace() {
                    last_significant = Some(c);
                }
                i += 1;
            }
        }
    }

    Ok(out)
}

fn skip_to_newline(chars: &[char], from: usize) -> usize {
    chars[from..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(chars.len(), |offset| from + offset)
}

/// A `/` starts a regex literal when it cannot be a division operator.
fn regex_may_start(last_significant: Option<char>) -> bool {
    match last_significant {
        None => true,
        Some(c) => "(,=:[!&|?{};+-*%<>~^".contains(c),
    }
}

/// Index of the closing `/` of a regex literal starting at `start`, if it ends
/// on the same line.
fn regex_end(chars: &[char], start: usize) -> Option<usize> {
    let mut in_class = false;
    let mut j = start + 1;
    while let Some(&c) = chars.get(j) {
        match c {
            '\n' => return None,
            '\\' => j += 1,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => return Some(j),
            _ => {}
        }
        j += 1;
    }
    None
}

fn unbalanced_delimiter(code: &str) -> Option<String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    for c in code.chars() {
        match c {
            '\n' => line += 1,
            '(' | '[' | '{' => stack.push((c, line)),
            ')' | ']' | '}' => {
                let open = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((top, _)) if top == open => {}
                    Some((top, top_line)) => {
                        return Some(format!(
                            "line {line}: '{c}' does not match '{top}' opened on line {top_line}"
                        ));
                    }
                    None => return Some(format!("line {line}: unexpected '{c}'")),
                }
            }
            _ => {}
        }
    }
    stack
        .pop()
        .map(|(open, open_line)| format!("line {open_line}: '{open}' is never closed"))
}

/// Line of the first `/ 0` or `% 0` with an integer zero literal.
fn literal_zero_divisor(code: &str) -> Option<usize> {
    let chars: Vec<char> = code.chars().collect();
    let mut line = 1;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            line += 1;
        } else if c == '/' || c == '%' {
            let mut j = i + 1;
            while chars.get(j) == Some(&'/') {
                j += 1;
            }
            if chars.get(j) == Some(&'=') {
                j += 1;
            }
            while matches!(chars.get(j), Some(' ') | Some('\t')) {
                j += 1;
            }
            let operand_before = chars[..i]
                .iter()
                .rev()
                .find(|c| !c.is_whitespace())
                .is_some_and(|&p| is_ident(p) || p == ')' || p == ']');
            if operand_before
                && chars.get(j) == Some(&'0')
                && !chars.get(j + 1).is_some_and(|&n| is_ident(n) || n == '.')
            {
                return Some(line);
            }
            i = j;
            continue;
        }
        i += 1;
    }
    None
}

fn contains_word(text: &str, word: &str) -> bool {
    text.match_indices(word).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + word.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

fn has_escape(body: &str) -> bool {
    LOOP_ESCAPES.iter().any(|word| contains_word(body, word)) || body.contains("exit(")
}

/// Words and symbols that make part of a statement conditional, deferred or
/// guarded by a handler.
const GUARD_WORDS: [&str; 24] = [
    "if", "else", "elif", "and", "or", "for", "while", "lambda", "with", "try", "except",
    "catch", "assert", "def", "class", "yield", "async", "await", "function", "switch", "case",
    "match", "go", "defer",
];
const GUARD_SYMBOLS: [&str; 5] = ["&&", "|", "?", "=>", "->"];

/// Block headers that define code rather than run it.
const DEFINITION_WORDS: [&str; 8] = [
    "function", "class", "fn", "func", "struct", "impl", "interface", "enum",
];

fn is_guarded(statement: &str) -> bool {
    GUARD_WORDS.iter().any(|word| contains_word(statement, word))
        || GUARD_SYMBOLS.iter().any(|symbol| statement.contains(symbol))
}

fn defines_code(header: &str) -> bool {
    DEFINITION_WORDS.iter().any(|word| contains_word(header, word))
        || header.contains("=>")
        || header.contains('|')
        || header.contains("](")
        || header.contains("] (")
}

/// Whether a literal division by zero faults at run time rather than at
/// compile time or not at all.
fn divides_at_runtime(language: Language) -> bool {
    matches!(
        language,
        Language::Python | Language::Java | Language::C | Language::Cpp
    )
}

fn line_of(chars: &[char], at: usize) -> usize {
    chars[..at].iter().filter(|&&c| c == '\n').count() + 1
}

/// Walk the statements that run on every execution, in order, and report the
/// first certain fault.
fn straight_line_fault(language: Language, code: &str) -> Option<Fault> {
    if language == Language::Python {
        python_straight_line_fault(code)
    } else {
        braced_straight_line_fault(language, code)
    }
}

fn no_exit(line: usize) -> Fault {
    Fault::NonTermination(format!("line {line}: loop has no exit"))
}

fn zero_divisor(line: usize) -> Fault {
    Fault::Runtime(format!("line {line}: division by zero"))
}

/// Only unindented statements are certain to run in a Python script.
fn python_straight_line_fault(code: &str) -> Option<Fault> {
    let lines: Vec<&str> = code.lines().collect();
    for (idx, raw) in lines.iter().enumerate() {
        if raw.trim().is_empty() || raw.starts_with(char::is_whitespace) {
            continue;
        }
        let line = idx + 1;
        if let Some(body) = python_unbounded_loop_body(&lines, idx) {
            // with an exit, later statements may never run
            return (!has_escape(&body)).then(|| no_exit(line));
        }
        if has_escape(raw) {
            return None;
        }
        if is_guarded(raw) {
            continue;
        }
        if literal_zero_divisor(raw).is_some() {
            return Some(zero_divisor(line));
        }
    }
    None
}

/// Body of a `while True:` / `while 1:` loop starting on line `idx`.
fn python_unbounded_loop_body(lines: &[&str], idx: usize) -> Option<String> {
    let raw = lines[idx];
    let trimmed = raw.trim_start();
    let indent = raw.len() - trimmed.len();
    let rest = trimmed.strip_prefix("while")?;
    if !rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
        return None;
    }
    let (condition, inline_body) = rest.split_once(':')?;
    let condition: String = condition
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect();
    if condition != "True" && condition != "1" {
        return None;
    }

    let mut body = inline_body.to_string();
    for next in &lines[idx + 1..] {
        if next.trim().is_empty() {
            continue;
        }
        let next_indent = next.len() - next.trim_start().len();
        if next_indent <= indent {
            break;
        }
        body.push('\n');
        body.push_str(next);
    }
    Some(body)
}

fn skip_ws(chars: &[char], mut i: usize) -> usize {
    while chars.get(i).is_some_and(|c| c.is_whitespace()) {
        i += 1;
    }
    i
}

/// Index of the delimiter closing the one at `open_at`.
fn matching_close(chars: &[char], open_at: usize) -> Option<usize> {
    let open = chars[open_at];
    let close = match open {
        '(' => ')',
        '{' => '}',
        _ => return None,
    };
    let mut depth = 0usize;
    for (offset, &c) in chars[open_at..].iter().enumerate() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(open_at + offset);
            }
        }
    }
    None
}

/// Char range of the body of `main`, between its braces.
fn main_body(chars: &[char]) -> Option<(usize, usize)> {
    let mut from = 0;
    loop {
        let at = (from..chars.len()).find(|&i| {
            chars[i..].starts_with(&['m', 'a', 'i', 'n'])
                && (i == 0 || !is_ident(chars[i - 1]) && chars[i - 1] != '.')
                && !chars.get(i + 4).is_some_and(|&c| is_ident(c))
        })?;
        from = at + 4;
        let open = skip_ws(chars, from);
        if chars.get(open) != Some(&'(') {
            continue;
        }
        let Some(close) = matching_close(chars, open) else {
            continue;
        };
        // return type or `throws` clause up to the body; a `;` means a declaration
        let Some(brace) = (close + 1..chars.len()).find(|&k| matches!(chars[k], '{' | ';')) else {
            return None;
        };
        if chars[brace] == '{' {
            return Some((brace + 1, matching_close(chars, brace)?));
        }
    }
}

/// If `statement` opens with a parenthesized loop header whose condition is
/// constantly true, the rest of the statement.
fn braceless_loop_body(statement: &str) -> Option<&str> {
    let chars: Vec<char> = statement.chars().collect();
    let word = if statement.starts_with("while") {
        "while"
    } else if statement.starts_with("for") {
        "for"
    } else {
        return None;
    };
    let open = skip_ws(&chars, word.len());
    if chars.get(open) != Some(&'(') {
        return None;
    }
    let close = matching_close(&chars, open)?;
    let condition: String = chars[open + 1..close]
        .iter()
        .filter(|c| !c.is_whitespace())
        .collect();
    let infinite = match word {
        "while" => matches!(condition.as_str(), "true" | "1"),
        _ => condition == ";;",
    };
    let rest_at: usize = chars[..=close].iter().map(|c| c.len_utf8()).sum();
    infinite.then(|| statement[rest_at..].trim())
}

fn is_infinite_loop_header(language: Language, header: &str) -> bool {
    if braceless_loop_body(header).is_some_and(str::is_empty) {
        return true;
    }
    let normalized: String = header.chars().filter(|c| !c.is_whitespace()).collect();
    match language {
        Language::Rust => normalized == "loop" || normalized == "whiletrue",
        Language::Go => normalized == "for" || normalized == "fortrue",
        _ => false,
    }
}

/// Offset of the last statement in `header` when automatic semicolon
/// insertion split it from the ones before.
fn header_start(language: Language, header: &str) -> usize {
    if !matches!(language, Language::JavaScript | Language::TypeScript) {
        return 0;
    }
    let Some(split) = header.trim_end().rfind('\n') else {
        return 0;
    };
    let before = header[..split].trim_end();
    let continues = before.ends_with(|c: char| "()=+-*/,&|?:!<>".contains(c))
        || before.ends_with("else")
        || before.ends_with("do");
    if before.is_empty() || continues {
        0
    } else {
        split + 1
    }
}

/// What one straight-line statement means for the statements after it.
fn statement_step(
    language: Language,
    statement: &str,
    line: usize,
    after_do: bool,
) -> ControlFlow<Option<Fault>> {
    if statement.is_empty() {
        return ControlFlow::Continue(());
    }
    if let Some(body) = braceless_loop_body(statement) {
        if after_do {
            // tail of a `do { ... } while (true);`
            return ControlFlow::Break(None);
        }
        return ControlFlow::Break((!has_escape(body)).then(|| no_exit(line)));
    }
    if has_escape(statement) {
        return ControlFlow::Break(None);
    }
    if is_guarded(statement) {
        return ControlFlow::Continue(());
    }
    if divides_at_runtime(language) && literal_zero_divisor(statement).is_some() {
        return ControlFlow::Break(Some(zero_divisor(line)));
    }
    ControlFlow::Continue(())
}

/// Straight-line statements are those directly in `main` (or at the top level
/// of a JavaScript/TypeScript script), outside any nested block.
fn braced_straight_line_fault(language: Language, code: &str) -> Option<Fault> {
    let chars: Vec<char> = code.chars().collect();
    let (start, end) = if matches!(language, Language::JavaScript | Language::TypeScript) {
        (0, chars.len())
    } else {
        main_body(&chars)?
    };
    let text = |from: usize, to: usize| -> String { chars[from..to].iter().collect() };
    let first_significant = |from: usize| skip_ws(&chars, from).min(end.max(from));

    let mut i = start;
    let mut statement_start = start;
    let mut paren = 0usize;
    let mut after_do = false;

    while i < end {
        let c = chars[i];
        match c {
            '(' | '[' => paren += 1,
            ')' | ']' => paren = paren.saturating_sub(1),
            '{' => {
                let close = matching_close(&chars, i)?;
                if paren > 0 {
                    // an object or callback inside an expression
                    i = close + 1;
                    continue;
                }
                let full = text(statement_start, i);
                let offset = header_start(language, &full);
                let header = full[offset..].trim();
                let body = text(i + 1, close);
                if is_infinite_loop_header(language, header) {
                    let keyword_at = first_significant(
                        statement_start + full[..offset].chars().count(),
                    );
                    return (!has_escape(&body)).then(|| no_exit(line_of(&chars, keyword_at)));
                }
                if !defines_code(header) && has_escape(&body) {
                    return None;
                }
                after_do = header == "do";
                i = close + 1;
                statement_start = i;
                continue;
            }
            ';' | '\n' if paren == 0 && (c == ';' || language == Language::Go) => {
                let statement = text(statement_start, i);
                let line = line_of(&chars, first_significant(statement_start));
                if let ControlFlow::Break(fault) =
                    statement_step(language, statement.trim(), line, after_do)
                {
                    return fault;
                }
                if !statement.trim().is_empty() {
                    after_do = false;
                }
                statement_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

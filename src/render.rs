//! Purpose: Turn an identify response into an indented, type-coloured tree.
//! Exports: `render`, `VisualTree`, `Line`, `Span`, `SpanKind`, `INDENT_UNIT`.
//! Role: Pure formatter between `RequestState::Succeeded` and the terminal.
//! Invariants: Object keys appear in the value's own (insertion) order.
//! Invariants: Traversal uses an explicit work stack; nesting depth never grows the call stack.
//! Invariants: ANSI escapes appear only in `to_ansi` output.
use serde_json::{Map, Value};
use std::fmt;

pub const INDENT_UNIT: &str = "  ";

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpanKind {
    Key,
    String,
    Number,
    Bool,
    Null,
    Punct,
}

impl SpanKind {
    fn color(self) -> &'static str {
        match self {
            SpanKind::Key => COLOR_KEY,
            SpanKind::String => COLOR_STRING,
            SpanKind::Number => COLOR_NUMBER,
            SpanKind::Bool => COLOR_BOOL,
            SpanKind::Null => COLOR_NULL,
            SpanKind::Punct => COLOR_PUNCT,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Span {
    pub kind: SpanKind,
    pub text: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Line {
    /// Nesting level; printed as that many `INDENT_UNIT`s.
    pub indent: usize,
    pub spans: Vec<Span>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VisualTree {
    pub lines: Vec<Line>,
}

impl VisualTree {
    pub fn to_plain(&self) -> String {
        self.write(false)
    }

    pub fn to_ansi(&self) -> String {
        self.write(true)
    }

    fn write(&self, use_color: bool) -> String {
        let mut out = String::new();
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            for _ in 0..line.indent {
                out.push_str(INDENT_UNIT);
            }
            for span in &line.spans {
                push_colored(&span.text, span.kind.color(), use_color, &mut out);
            }
        }
        out
    }
}

impl fmt::Display for VisualTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain())
    }
}

enum Task<'a> {
    Value(&'a Value, usize),
    Key(&'a str),
    Punct(&'static str),
    Break(usize),
}

/// Renders `value` whose closing delimiter sits at nesting level `depth`.
///
/// Arrays stay on the current line with `, ` between elements, each element
/// rendered at the same depth. Objects put every entry on its own line at
/// `depth + 1` and close on a fresh line at `depth`.
pub fn render(value: &Value, depth: usize) -> VisualTree {
    let mut lines = vec![Line {
        indent: depth,
        spans: Vec::new(),
    }];
    let mut stack = vec![Task::Value(value, depth)];

    while let Some(task) = stack.pop() {
        match task {
            Task::Value(value, depth) => match value {
                Value::Null => push_span(&mut lines, SpanKind::Null, "null".to_string()),
                Value::Bool(val) => {
                    let text = if *val { "true" } else { "false" };
                    push_span(&mut lines, SpanKind::Bool, text.to_string());
                }
                Value::Number(num) => push_span(&mut lines, SpanKind::Number, num.to_string()),
                Value::String(text) => push_span(&mut lines, SpanKind::String, quote(text)),
                Value::Array(items) => schedule_array(items, depth, &mut stack),
                Value::Object(map) => schedule_object(map, depth, &mut stack),
            },
            Task::Key(key) => push_span(&mut lines, SpanKind::Key, quote(key)),
            Task::Punct(text) => push_span(&mut lines, SpanKind::Punct, text.to_string()),
            Task::Break(indent) => lines.push(Line {
                indent,
                spans: Vec::new(),
            }),
        }
    }

    VisualTree { lines }
}

fn schedule_array<'a>(items: &'a [Value], depth: usize, stack: &mut Vec<Task<'a>>) {
    if items.is_empty() {
        stack.push(Task::Punct("[]"));
        return;
    }
    stack.push(Task::Punct("]"));
    for (idx, item) in items.iter().enumerate().rev() {
        stack.push(Task::Value(item, depth));
        if idx > 0 {
            stack.push(Task::Punct(", "));
        }
    }
    stack.push(Task::Punct("["));
}

fn schedule_object<'a>(map: &'a Map<String, Value>, depth: usize, stack: &mut Vec<Task<'a>>) {
    if map.is_empty() {
        stack.push(Task::Punct("{}"));
        return;
    }
    let len = map.len();
    stack.push(Task::Punct("}"));
    stack.push(Task::Break(depth));
    // Pushed last-to-first so entries pop in insertion order.
    for (idx, (key, value)) in map.iter().enumerate().rev() {
        if idx + 1 < len {
            stack.push(Task::Punct(","));
        }
        stack.push(Task::Value(value, depth + 1));
        stack.push(Task::Punct(": "));
        stack.push(Task::Key(key));
        stack.push(Task::Break(depth + 1));
    }
    stack.push(Task::Punct("{"));
}

fn push_span(lines: &mut [Line], kind: SpanKind, text: String) {
    if let Some(line) = lines.last_mut() {
        line.spans.push(Span { kind, text });
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}

#[cfg(test)]
mod tests {
    use super::{SpanKind, render};
    use serde_json::{Value, json};

    #[test]
    fn scalars_render_as_json_text() {
        assert_eq!(render(&json!("x"), 0).to_plain(), "\"x\"");
        assert_eq!(render(&json!(5), 0).to_plain(), "5");
        assert_eq!(render(&json!(2.5), 0).to_plain(), "2.5");
        assert_eq!(render(&json!(true), 0).to_plain(), "true");
        assert_eq!(render(&json!(false), 0).to_plain(), "false");
        assert_eq!(render(&Value::Null, 0).to_plain(), "null");
    }

    #[test]
    fn empty_containers_are_compact() {
        assert_eq!(render(&json!([]), 0).to_plain(), "[]");
        assert_eq!(render(&json!({}), 0).to_plain(), "{}");
        assert_eq!(render(&json!({}), 3).lines.len(), 1);
    }

    #[test]
    fn object_entries_keep_insertion_order() {
        let value: Value = serde_json::from_str(r#"{"b":1,"a":2}"#).expect("json");
        assert_eq!(render(&value, 0).to_plain(), "{\n  \"b\": 1,\n  \"a\": 2\n}");
    }

    #[test]
    fn arrays_stay_inline() {
        let value = json!({"emails": ["a@x.com", "b@x.com"], "ids": [1, 2, 3]});
        let expected = "{\n  \"emails\": [\"a@x.com\", \"b@x.com\"],\n  \"ids\": [1, 2, 3]\n}";
        assert_eq!(render(&value, 0).to_plain(), expected);
    }

    #[test]
    fn nested_objects_indent_deeper() {
        let value = json!({"contact": {"primaryContatctId": 1, "secondaryContactIds": []}});
        let expected = concat!(
            "{\n",
            "  \"contact\": {\n",
            "    \"primaryContatctId\": 1,\n",
            "    \"secondaryContactIds\": []\n",
            "  }\n",
            "}"
        );
        assert_eq!(render(&value, 0).to_plain(), expected);
    }

    #[test]
    fn objects_inside_arrays_open_on_the_bracket_line() {
        let value = json!([{"a": 1}, {"b": null}]);
        let expected = "[{\n  \"a\": 1\n}, {\n  \"b\": null\n}]";
        assert_eq!(render(&value, 0).to_plain(), expected);
    }

    #[test]
    fn start_depth_offsets_every_line() {
        let tree = render(&json!({"k": "v"}), 2);
        let indents: Vec<_> = tree.lines.iter().map(|line| line.indent).collect();
        assert_eq!(indents, [2, 3, 2]);
    }

    #[test]
    fn strings_and_keys_are_escaped() {
        let value = json!({"quo\"te": "line\nbreak"});
        assert_eq!(
            render(&value, 0).to_plain(),
            "{\n  \"quo\\\"te\": \"line\\nbreak\"\n}"
        );
    }

    #[test]
    fn strings_are_styled_apart_from_other_scalars() {
        let tree = render(&json!(["s", 1, true, null]), 0);
        let kinds: Vec<_> = tree.lines[0]
            .spans
            .iter()
            .map(|span| span.kind)
            .filter(|kind| *kind != SpanKind::Punct)
            .collect();
        assert_eq!(
            kinds,
            [SpanKind::String, SpanKind::Number, SpanKind::Bool, SpanKind::Null]
        );
    }

    #[test]
    fn ansi_output_wraps_each_span() {
        let colored = render(&json!({"k": "v", "n": 1, "b": true, "z": null}), 0).to_ansi();
        assert!(colored.contains("\u{1b}[36m\"k\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"v\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[39mnull\u{1b}[0m"));
    }

    #[test]
    fn plain_output_has_no_escapes() {
        let plain = render(&json!({"k": ["v", 1]}), 0).to_plain();
        assert!(!plain.contains('\u{1b}'));
    }

    #[test]
    fn display_matches_plain() {
        let tree = render(&json!({"k": [1]}), 1);
        assert_eq!(tree.to_string(), tree.to_plain());
    }
}

// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! YAML Test Suite integration tests.
//!
//! This module runs the processor against the official YAML test suite
//! from <https://github.com/yaml/yaml-test-suite>, when a checkout of its
//! data branch is present under `tests/yaml-test-suite`.

use std::fs;
use std::path::Path;

use yaml_cst::{Content, Document, Node, Options, ScalarStyle, cst, parse_all_documents, parse_cst};

/// Event notation for YAML test suite comparison. Tags are not compared.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    StreamStart,
    StreamEnd,
    DocumentStart { explicit: bool },
    DocumentEnd,
    MappingStart { flow: bool, anchor: Option<String> },
    MappingEnd,
    SequenceStart { flow: bool, anchor: Option<String> },
    SequenceEnd,
    Scalar { style: ScalarStyle, value: String, anchor: Option<String> },
    Alias { name: String },
}

/// Parse the test.event file format.
fn parse_event_file(content: &str) -> Vec<Event> {
    let mut events = Vec::new();
    for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
        let event = match head {
            "+STR" => Event::StreamStart,
            "-STR" => Event::StreamEnd,
            "+DOC" => Event::DocumentStart { explicit: rest == "---" },
            "-DOC" => Event::DocumentEnd,
            "+MAP" => {
                let (anchor, flow) = parse_collection_event(rest);
                Event::MappingStart { flow, anchor }
            }
            "-MAP" => Event::MappingEnd,
            "+SEQ" => {
                let (anchor, flow) = parse_collection_event(rest);
                Event::SequenceStart { flow, anchor }
            }
            "-SEQ" => Event::SequenceEnd,
            "=VAL" => parse_scalar_event(rest),
            "=ALI" => Event::Alias {
                name: rest.trim_start_matches('*').to_owned(),
            },
            _ => continue,
        };
        events.push(event);
    }
    events
}

/// Split leading `&anchor` and `<tag>` properties off an event line.
fn split_props(input: &str) -> (Option<String>, &str) {
    let mut anchor = None;
    let mut rest = input;
    loop {
        if let Some(after) = rest.strip_prefix('&') {
            let (name, tail) = after.split_once(' ').unwrap_or((after, ""));
            anchor = Some(name.to_owned());
            rest = tail;
        } else if rest.starts_with('<')
            && let Some((_, tail)) = rest.split_once('>')
        {
            rest = tail.trim_start();
        } else {
            return (anchor, rest);
        }
    }
}

fn parse_collection_event(input: &str) -> (Option<String>, bool) {
    let (anchor, rest) = split_props(input);
    (anchor, rest == "{}" || rest == "[]")
}

fn parse_scalar_event(input: &str) -> Event {
    let (anchor, rest) = split_props(input);
    let mut chars = rest.chars();
    let style = match chars.next() {
        Some('"') => ScalarStyle::QuoteDouble,
        Some('\'') => ScalarStyle::QuoteSingle,
        Some('|') => ScalarStyle::BlockLiteral,
        Some('>') => ScalarStyle::BlockFolded,
        _ => ScalarStyle::Plain,
    };
    Event::Scalar {
        style,
        value: unescape_event_value(chars.as_str()),
        anchor,
    }
}

fn unescape_event_value(input: &str) -> String {
    let mut result = String::new();
    let mut chars = input.chars();
    while let Some(current_char) = chars.next() {
        if current_char != '\\' {
            result.push(current_char);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('b') => result.push('\x08'),
            Some('\\') => result.push('\\'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Event stream of composed documents.
fn document_events(docs: &[Document]) -> Vec<Event> {
    let mut events = vec![Event::StreamStart];
    for doc in docs {
        events.push(Event::DocumentStart {
            explicit: doc.directives_end_marker,
        });
        match &doc.contents {
            Some(node) => node_events(node, &mut events),
            None => events.push(Event::Scalar {
                style: ScalarStyle::Plain,
                value: String::new(),
                anchor: None,
            }),
        }
        events.push(Event::DocumentEnd);
    }
    events.push(Event::StreamEnd);
    events
}

fn node_events(node: &Node, events: &mut Vec<Event>) {
    let anchor = node.anchor.clone();
    match &node.content {
        Content::Scalar(scalar) => events.push(Event::Scalar {
            style: scalar.style,
            value: scalar.source.clone(),
            anchor,
        }),
        Content::Alias { name } => events.push(Event::Alias { name: name.clone() }),
        Content::Sequence(seq) => {
            events.push(Event::SequenceStart { flow: seq.flow, anchor });
            for item in &seq.items {
                node_events(item, events);
            }
            events.push(Event::SequenceEnd);
        }
        Content::Mapping(map) => {
            events.push(Event::MappingStart { flow: map.flow, anchor });
            for pair in &map.items {
                node_events(&pair.key, events);
                match &pair.value {
                    Some(value) => node_events(value, events),
                    None => events.push(Event::Scalar {
                        style: ScalarStyle::Plain,
                        value: String::new(),
                        anchor: None,
                    }),
                }
            }
            events.push(Event::MappingEnd);
        }
    }
}

/// Test case structure.
struct TestCase {
    id: String,
    name: String,
    input: String,
    expected_events: Vec<Event>,
    expects_error: bool,
}

/// Load the test cases under `dir`, including numbered sub-tests.
fn load_test_cases(dir: &Path, id: &str, cases: &mut Vec<TestCase>) {
    let input_file = dir.join("in.yaml");
    let event_file = dir.join("test.event");
    if let Ok(input) = fs::read_to_string(&input_file) {
        let name = fs::read_to_string(dir.join("==="))
            .map_or_else(|_| id.to_owned(), |content| content.trim().to_owned());
        let expected_events = fs::read_to_string(&event_file)
            .map(|content| parse_event_file(&content))
            .unwrap_or_default();
        cases.push(TestCase {
            id: id.to_owned(),
            name,
            input,
            expected_events,
            expects_error: dir.join("error").exists(),
        });
    }

    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut subdirs: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();
    for path in subdirs {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.starts_with('.') || name == "name" || name == "tags" {
            continue;
        }
        let sub_id = if id.is_empty() {
            name.to_owned()
        } else {
            format!("{id}/{name}")
        };
        load_test_cases(&path, &sub_id, cases);
    }
}

fn run_single_test(test: &TestCase) -> Result<(), String> {
    let rebuilt: String = parse_cst(&test.input).iter().map(cst::stringify).collect();
    if rebuilt != test.input {
        return Err("CST does not reproduce the input".to_owned());
    }

    let docs = parse_all_documents(&test.input, &Options::default());
    let has_errors = docs.iter().any(Document::has_errors);
    if test.expects_error {
        return if has_errors {
            Ok(())
        } else {
            Err("Expected error but parsing succeeded".to_owned())
        };
    }
    if let Some(err) = docs.iter().flat_map(|doc| &doc.errors).next() {
        return Err(format!("Parse error: {err}"));
    }

    let events = document_events(&docs);
    if events != test.expected_events {
        return Err(format!(
            "Event mismatch:\n  expected {:?}\n  got      {events:?}",
            test.expected_events
        ));
    }
    Ok(())
}

fn test_suite_dir() -> Option<std::path::PathBuf> {
    let test_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/yaml-test-suite");
    test_dir.exists().then_some(test_dir)
}

#[test]
#[allow(
    clippy::print_stderr,
    clippy::cast_precision_loss,
    clippy::as_conversions,
    clippy::tests_outside_test_module,
    reason = "Integration test with test output and statistics calculation"
)]
fn yaml_test_suite() {
    let Some(test_dir) = test_suite_dir() else {
        eprintln!("Test suite not found. Skipping tests.");
        return;
    };
    let mut cases = Vec::new();
    load_test_cases(&test_dir, "", &mut cases);

    let mut failures = Vec::new();
    for test_case in &cases {
        if let Err(err) = run_single_test(test_case) {
            failures.push(format!("{}: {} - {err}", test_case.id, test_case.name));
        }
    }

    let passed = cases.len() - failures.len();
    eprintln!("\n=== YAML Test Suite Results ===");
    eprintln!("Passed: {passed}");
    eprintln!("Failed: {}", failures.len());
    if !cases.is_empty() {
        let pass_rate = (passed as f64 / cases.len() as f64) * 100.0;
        eprintln!("Pass rate: {pass_rate:.1}%");
    }
    for failure in &failures {
        eprintln!("  {failure}");
    }
}

/// Concatenate every error input into one stream and check that recovery
/// keeps going, in both orders, with every diagnostic inside the input.
#[test]
#[allow(
    clippy::print_stderr,
    clippy::tests_outside_test_module,
    reason = "Integration test with test output"
)]
fn error_recovery_combined_stream() {
    let Some(test_dir) = test_suite_dir() else {
        eprintln!("Test suite not found. Skipping test.");
        return;
    };
    let mut cases = Vec::new();
    load_test_cases(&test_dir, "", &mut cases);
    cases.retain(|case| case.expects_error);
    if cases.is_empty() {
        return;
    }

    for reverse in [false, true] {
        let mut combined_input = String::new();
        let ordered: Vec<&TestCase> = if reverse {
            cases.iter().rev().collect()
        } else {
            cases.iter().collect()
        };
        for case in ordered {
            combined_input.push_str(&case.input);
            if !case.input.ends_with('\n') {
                combined_input.push('\n');
            }
        }

        let rebuilt: String = parse_cst(&combined_input).iter().map(cst::stringify).collect();
        assert_eq!(rebuilt, combined_input);

        let docs = parse_all_documents(&combined_input, &Options::default());
        let diagnostics: Vec<_> = docs
            .iter()
            .flat_map(|doc| doc.errors.iter().chain(&doc.warnings))
            .collect();
        assert!(!diagnostics.is_empty(), "Expected errors for combined error inputs");
        for diagnostic in diagnostics {
            assert!(
                diagnostic.span.end <= combined_input.len(),
                "Error span {:?} exceeds input length {}",
                diagnostic.span,
                combined_input.len()
            );
        }
        eprintln!("Combined stream (reverse: {reverse}): {} documents", docs.len());
    }
}

#[test]
#[allow(clippy::tests_outside_test_module, reason = "Integration test")]
fn event_stream_of_inline_sample() {
    let input = "--- &top\n- !!str a\n- 'b'\n- {c: *top}\n- |\n  d\n";
    let events = document_events(&parse_all_documents(input, &Options::default()));
    let expected = parse_event_file(
        "+STR\n+DOC ---\n+SEQ &top\n=VAL <tag:yaml.org,2002:str> :a\n=VAL 'b\n+MAP {}\n=VAL :c\n=ALI *top\n-MAP\n=VAL |d\\n\n-SEQ\n-DOC\n-STR\n",
    );
    assert_eq!(events, expected);
}

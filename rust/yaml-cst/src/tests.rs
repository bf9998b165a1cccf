// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! End-to-end tests of the crate entry points.
//!
//! These tests run source text through every stage, from the lexer to the
//! materialized values, and check the diagnostics recorded on the way.

use ordermap::OrderMap;

use super::*;

fn mapping(pairs: &[(&str, Value)]) -> Value {
    Value::Mapping(
        pairs
            .iter()
            .map(|(key, value)| (Value::from(*key), value.clone()))
            .collect::<OrderMap<_, _>>(),
    )
}

fn value_of(source: &str, key: &str) -> Value {
    let value = parse(source).unwrap();
    value.get(key).cloned().unwrap()
}

fn error_kinds(doc: &Document) -> Vec<ErrorKind> {
    doc.errors.iter().map(|err| err.kind).collect()
}

#[test]
fn test_empty_input() {
    assert!(parse_all_documents("", &Options::default()).is_empty());

    let doc = parse_document("", &Options::default());
    assert!(doc.errors.is_empty());
    assert!(doc.contents.is_none());
    assert_eq!(parse("").unwrap(), Value::Null);
}

#[test]
fn test_simple_mapping() {
    let value = parse("key: value\nnumber: 12\nfloat: 1.5\nflag: true\nnothing: ~\n").unwrap();
    assert_eq!(
        value,
        mapping(&[
            ("key", "value".into()),
            ("number", Value::Int(12)),
            ("float", Value::Float(1.5)),
            ("flag", Value::Bool(true)),
            ("nothing", Value::Null),
        ])
    );
}

#[test]
fn test_nested_structure() {
    let input = "
name: John
address:
  street: 123 Main St
  city: Springfield
items:
  - {name: foo, value: 1}
  - [bar, 2]
";
    let doc = parse_document(input, &Options::default());
    assert!(doc.errors.is_empty(), "{:?}", doc.errors);
    let address = doc.get("address").unwrap();
    assert_eq!(
        address.get("city").and_then(Node::scalar_value),
        Some(&Value::from("Springfield"))
    );
    let items = doc.get("items").and_then(Node::as_sequence).unwrap();
    assert_eq!(items.items.len(), 2);
    assert!(items.get(0).and_then(Node::as_mapping).is_some_and(|map| map.flow));
}

#[test]
fn test_block_scalar_chomping() {
    assert_eq!(value_of("a: |\n  x\n", "a"), Value::from("x\n"));
    assert_eq!(value_of("a: |-\n  x\n", "a"), Value::from("x"));
    assert_eq!(value_of("a: |+\n  x\n\n\n", "a"), Value::from("x\n\n\n"));
}

#[test]
fn test_block_scalar_folding() {
    assert_eq!(value_of("a: >\n  one\n  two\n", "a"), Value::from("one two\n"));
    assert_eq!(value_of("a: >\n  one\n\n  two\n", "a"), Value::from("one\ntwo\n"));
}

#[test]
fn test_anchors_and_aliases() {
    let value = parse("one: &a 42\ntwo: *a\n").unwrap();
    assert_eq!(
        value,
        mapping(&[("one", Value::Int(42)), ("two", Value::Int(42))])
    );
}

#[test]
fn test_dangling_alias_fails_only_when_materialized() {
    let doc = parse_document("a: *nowhere\n", &Options::default());
    assert!(doc.errors.is_empty());
    let alias = doc.get("a").unwrap();
    assert_eq!(alias.alias_name(), Some("nowhere"));

    let err = doc.to_value().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AliasResolveFailed);
    assert_eq!(err.offset(), 3);

    assert!(matches!(
        parse("a: *nowhere\n"),
        Err(Error::Reference(ReferenceError::Unresolved { .. }))
    ));
}

#[test]
fn test_anchor_rebinding() {
    let value = parse("- &a 1\n- *a\n- &a 2\n- *a\n").unwrap();
    assert_eq!(
        value,
        Value::Sequence(vec![Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(2)])
    );

    let doc = parse_document("- &a 1\n- &a 2\n", &Options::default());
    assert_eq!(
        doc.anchors.get("a").and_then(Node::scalar_value),
        Some(&Value::Int(2))
    );
}

#[test]
fn test_merge_keys() {
    let value = parse("foo: &a\n  x: 1\nbar:\n  <<: *a\n  x: 2\n").unwrap();
    assert_eq!(value.get("bar"), Some(&mapping(&[("x", Value::Int(2))])));

    let value = parse("a: &a {x: 1, y: 1}\nb: &b {y: 2, z: 2}\nc:\n  <<: [*a, *b]\n").unwrap();
    assert_eq!(
        value.get("c"),
        Some(&mapping(&[
            ("x", Value::Int(1)),
            ("y", Value::Int(1)),
            ("z", Value::Int(2)),
        ]))
    );
}

#[test]
fn test_merge_keys_disabled() {
    let options = Options {
        merge_keys: false,
        ..Options::default()
    };
    let value = parse_with("a: &a {x: 1}\nb:\n  <<: *a\n", &options).unwrap();
    let b = value.get("b").and_then(Value::as_mapping).unwrap();
    assert!(b.contains_key(&Value::from("<<")));
}

#[test]
fn test_merge_of_scalar_is_an_error() {
    let doc = parse_document("a:\n  <<: 1\n", &Options::default());
    assert!(error_kinds(&doc).contains(&ErrorKind::BadCollectionType));
}

#[test]
fn test_multiline_implicit_key() {
    let doc = parse_document("? [a\n,b]: 1", &Options::default());
    let err = doc
        .errors
        .iter()
        .find(|err| err.kind == ErrorKind::MultilineImplicitKey)
        .unwrap();
    assert_eq!(err.span.start, 2);
}

#[test]
fn test_multiline_quoted_key() {
    let doc = parse_document("\"c\n d\": 1", &Options::default());
    assert!(error_kinds(&doc).contains(&ErrorKind::MultilineImplicitKey));
}

#[test]
fn test_tag_directive_scope() {
    let source = "%TAG !e! tag:example.com,2000:\n--- !e!foo x\n...\n--- !e!foo y\n";

    let docs = parse_all_documents(source, &Options::default());
    assert_eq!(docs.len(), 2);
    assert!(docs[0].errors.is_empty(), "{:?}", docs[0].errors);
    assert_eq!(
        docs[0].contents.as_ref().and_then(|node| node.tag.as_deref()),
        Some("tag:example.com,2000:foo")
    );
    assert!(docs[1].errors.is_empty(), "{:?}", docs[1].errors);
    assert!(
        docs[1]
            .warnings
            .iter()
            .any(|w| w.kind == ErrorKind::TagResolveFailed && w.message.contains("!e!foo"))
    );

    let options = Options::default().with_carry_directives(true);
    let docs = parse_all_documents(source, &options);
    assert!(docs[1].errors.is_empty(), "{:?}", docs[1].errors);
    assert_eq!(
        docs[1].contents.as_ref().and_then(|node| node.tag.as_deref()),
        Some("tag:example.com,2000:foo")
    );
}

#[test]
fn test_yaml_directive() {
    let doc = parse_document("%YAML 1.1\n---\na: 1\n", &Options::default());
    assert_eq!(doc.version, Version::V1_1);
    assert!(doc.directives_end_marker);
    assert_eq!(doc.directives, vec![DirectiveEntry::Yaml { version: Version::V1_1 }]);

    let doc = parse_document("%YAML 1.2\na: 1\n", &Options::default());
    assert!(error_kinds(&doc).contains(&ErrorKind::MissingChar));
}

#[test]
fn test_unknown_directive_is_a_warning() {
    let doc = parse_document("%FOO bar\n---\na\n", &Options::default());
    assert!(doc.errors.is_empty());
    assert!(doc.warnings.iter().any(|w| w.kind == ErrorKind::BadDirective));
}

#[test]
fn test_malformed_directives_are_warnings() {
    for source in ["%TAG\n--- x\n", "%YAML\n--- x\n", "%YAML abc\n--- x\n", "%TAG !e!\n--- x\n"] {
        let doc = parse_document(source, &Options::default());
        assert!(doc.errors.is_empty(), "{source:?}: {:?}", doc.errors);
        assert!(
            doc.warnings.iter().any(|w| w.kind == ErrorKind::BadDirective),
            "{source:?}"
        );
        assert_eq!(
            doc.contents.as_ref().and_then(Node::scalar_value),
            Some(&Value::from("x"))
        );
    }
}

#[test]
fn test_round_trip() {
    for source in [
        "a: 1\nb:\n  - x # comment\n  - {y: [1, 2]}\n",
        "%YAML 1.2\n--- !!map\n? complex\n: >-\n  folded\n...\n",
        "[unterminated, \"quote\n- bad: : indent\n  x\n",
        "\u{feff}# only a comment",
    ] {
        let rebuilt: String = parse_cst(source).iter().map(cst::stringify).collect();
        assert_eq!(rebuilt, source);
    }
}

#[test]
fn test_chunked_feeding() {
    let source = "one: &a \"quoted\n  text\"\ntwo: |\n  block\n---\n- *a\n- [x, y]\n";
    let expected = parse_all_documents(source, &Options::default());

    let mut parser = Parser::new();
    let mut composer = Composer::new(&Options::default());
    let mut docs = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    for chunk in chars.chunks(5) {
        parser.feed(&chunk.iter().collect::<String>(), false);
        docs.extend(parser.by_ref().filter_map(|token| composer.next(token)));
    }
    parser.feed("", true);
    docs.extend(parser.by_ref().filter_map(|token| composer.next(token)));
    docs.extend(composer.end(false, source.len()));

    assert_eq!(docs, expected);
}

#[test]
fn test_yaml11_schema() {
    let options = Options::default().with_schema(SchemaKind::Yaml11);
    let value = parse_with("a: yes\nb: 0b101\nc: 1:30\nd: 010\ne: ~\n", &options).unwrap();
    assert_eq!(
        value,
        mapping(&[
            ("a", Value::Bool(true)),
            ("b", Value::Int(5)),
            ("c", Value::Int(90)),
            ("d", Value::Int(8)),
            ("e", Value::Null),
        ])
    );
}

#[test]
fn test_yaml11_timestamps() {
    let options = Options::default().with_schema(SchemaKind::Yaml11);
    let doc = parse_document("a: !!timestamp 2001-12-14\nb: 2001-12-14 21:59:43.10 -5\n", &options);
    assert!(doc.errors.is_empty(), "{:?}", doc.errors);
    assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);
    let b = doc.get("b").unwrap();
    assert_eq!(b.tag.as_deref(), Some(schema::tags::TIMESTAMP));
    assert_eq!(b.scalar_value(), Some(&Value::from("2001-12-14 21:59:43.10 -5")));

    let doc = parse_document("a: !!timestamp 2001-12-14\n", &Options::default());
    assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);

    let doc = parse_document("a: !!timestamp 2001-14-01\n", &options);
    assert!(doc.warnings.iter().any(|w| w.kind == ErrorKind::TagResolveFailed));
}

#[test]
fn test_core_schema() {
    let value = parse("a: yes\nb: 0o17\nc: 0x1F\nd: .inf\ne: Null\n").unwrap();
    assert_eq!(value.get("a"), Some(&Value::from("yes")));
    assert_eq!(value.get("b"), Some(&Value::Int(15)));
    assert_eq!(value.get("c"), Some(&Value::Int(31)));
    assert_eq!(value.get("d"), Some(&Value::Float(f64::INFINITY)));
    assert_eq!(value.get("e"), Some(&Value::Null));
}

#[test]
fn test_failsafe_schema() {
    let options = Options::default().with_schema(SchemaKind::Failsafe);
    let value = parse_with("a: 1\nb: true\n", &options).unwrap();
    assert_eq!(value.get("a"), Some(&Value::from("1")));
    assert_eq!(value.get("b"), Some(&Value::from("true")));
}

#[test]
fn test_json_schema_unresolved_scalar() {
    let options = Options::default().with_schema(SchemaKind::Json);
    let doc = parse_document("a: yes\nb: 1\n", &options);
    assert!(doc.errors.is_empty());
    assert!(
        doc.warnings
            .iter()
            .any(|w| w.kind == ErrorKind::TagResolveFailed && w.message.contains("yes"))
    );
    let value = doc.to_value().unwrap();
    assert_eq!(value.get("a"), Some(&Value::from("yes")));
    assert_eq!(value.get("b"), Some(&Value::Int(1)));
}

#[test]
fn test_compat_warnings() {
    let options = Options {
        compat: Some(SchemaKind::Yaml11),
        ..Options::default()
    };
    let doc = parse_document("a: yes\nb: plain\n", &options);
    assert_eq!(doc.warnings.len(), 1, "{:?}", doc.warnings);
    assert_eq!(doc.warnings[0].kind, ErrorKind::TagResolveFailed);

    let doc = parse_document("%YAML 1.1\n---\na: on\n", &Options::default());
    assert!(doc.warnings.iter().any(|w| w.kind == ErrorKind::TagResolveFailed));
}

#[test]
fn test_explicit_tags() {
    let value = parse("a: !!str 12\nb: !!int \"7\"\nc: !!binary aGVsbG8=\nd: !local x\n").unwrap();
    assert_eq!(value.get("a"), Some(&Value::from("12")));
    assert_eq!(value.get("b"), Some(&Value::Int(7)));
    assert_eq!(value.get("c"), Some(&Value::Binary(b"hello".to_vec())));
    assert_eq!(value.get("d"), Some(&Value::from("x")));

    let doc = parse_document("d: !local x\n", &Options::default());
    assert!(doc.warnings.iter().any(|w| w.message.contains("!local")));
}

#[test]
fn test_bad_tagged_scalar() {
    let doc = parse_document("a: !!int nope\n", &Options::default());
    assert!(doc.errors.is_empty());
    assert!(doc.warnings.iter().any(|w| w.kind == ErrorKind::TagResolveFailed));
    assert_eq!(doc.to_value().unwrap().get("a"), Some(&Value::from("nope")));
}

#[test]
fn test_collection_tags() {
    let value = parse("!!omap\n- a: 1\n- b: 2\n").unwrap();
    assert_eq!(value, mapping(&[("a", Value::Int(1)), ("b", Value::Int(2))]));

    let value = parse("!!set\n? a\n? b\n").unwrap();
    assert_eq!(value, mapping(&[("a", Value::Null), ("b", Value::Null)]));

    let doc = parse_document("!!omap\n- a: 1\n- a: 2\n", &Options::default());
    assert!(!doc.errors.is_empty());

    let doc = parse_document("!!set [a]\n", &Options::default());
    assert!(doc.warnings.iter().any(|w| w.kind == ErrorKind::BadCollectionType));

    let doc = parse_document("!!seq {a: 1}\n", &Options::default());
    assert!(doc.warnings.iter().any(|w| w.kind == ErrorKind::TagResolveFailed));
}

#[test]
fn test_unique_keys() {
    let doc = parse_document("a: 1\na: 2\n", &Options::default());
    assert!(doc.errors.is_empty());
    assert_eq!(doc.to_value().unwrap().get("a"), Some(&Value::Int(2)));

    let doc = parse_document("a: 1\na: 2\n", &Options::default().with_unique_keys(true));
    assert_eq!(error_kinds(&doc), vec![ErrorKind::DuplicateKey]);

    let doc = parse_document("{a: 1, a: 2}", &Options::default().with_unique_keys(true));
    assert_eq!(error_kinds(&doc), vec![ErrorKind::DuplicateKey]);
}

#[test]
fn test_multiple_documents() {
    let docs = parse_all_documents("a\n---\nb\n---\nc\n", &Options::default());
    assert_eq!(docs.len(), 3);
    assert_eq!(
        docs[2].contents.as_ref().and_then(Node::scalar_value),
        Some(&Value::from("c"))
    );

    let doc = parse_document("a\n---\nb\n", &Options::default());
    assert_eq!(error_kinds(&doc), vec![ErrorKind::MultipleDocs]);
    assert_eq!(doc.errors[0].span.start, 2);
    assert!(matches!(parse("a\n---\nb\n"), Err(Error::Parse(_))));
}

#[test]
fn test_comments() {
    let doc = parse_document("# head\n\na: 1 # trailing\n# tail\n", &Options::default());
    assert!(doc.errors.is_empty());
    assert_eq!(doc.comment_before.as_deref(), Some(" head"));
    assert_eq!(doc.get("a").and_then(|node| node.comment.as_deref()), Some(" trailing"));
}

#[test]
fn test_error_recovery() {
    let doc = parse_document("a: [1, 2\nb: 3\n", &Options::default());
    assert!(!doc.errors.is_empty());
    assert!(doc.contents.is_some());

    let doc = parse_document("a: \"\\q\"\n", &Options::default());
    assert!(error_kinds(&doc).contains(&ErrorKind::BadDqEscape));

    let doc = parse_document("a: &x &y 1\n", &Options::default());
    assert!(error_kinds(&doc).contains(&ErrorKind::MultipleAnchors));
}

#[test]
fn test_strict_mode() {
    let source = "a: 1#not a comment\nb: \"x\"# comment\n";
    let doc = parse_document(source, &Options::default());
    assert!(error_kinds(&doc).contains(&ErrorKind::MissingChar));

    let doc = parse_document(source, &Options::default().with_strict(false));
    assert!(doc.errors.is_empty(), "{:?}", doc.errors);
}

#[test]
fn test_excessive_aliasing() {
    let source = "a: &a [x, x, x, x, x, x, x, x, x, x]\nb: &b [*a, *a, *a, *a, *a, *a, *a, *a, *a, *a]\nc: [*b, *b, *b, *b, *b, *b, *b, *b, *b, *b, *b]\n";
    assert!(matches!(
        parse(source),
        Err(Error::Reference(ReferenceError::ExcessiveAliasing { .. }))
    ));

    let options = Options {
        max_alias_count: None,
        ..Options::default()
    };
    assert!(parse_with(source, &options).is_ok());
}

#[test]
fn test_document_mutation() {
    let mut doc = parse_document("a: 1\nb: [x]\n", &Options::default());
    if let Some(node) = doc.get_mut("a") {
        *node = Node::scalar(Value::Int(2), "2", ScalarStyle::Plain, node.range);
    }
    if let Some(seq) = doc.get_mut("b").and_then(Node::as_sequence_mut) {
        seq.items.clear();
    }
    assert_eq!(
        doc.to_value().unwrap(),
        mapping(&[("a", Value::Int(2)), ("b", Value::Sequence(Vec::new()))])
    );
}

#[test]
fn test_stream_line_counter() {
    let options = Options {
        line_counter: true,
        ..Options::default()
    };
    let stream = parse_stream("a: 1\nb: *x\n", &options);
    assert_eq!(stream.documents.len(), 1);
    let line_counter = stream.line_counter.unwrap();
    assert_eq!(line_counter.line_pos(8), Position { line: 2, col: 4 });

    let stream = parse_stream("%YAML 1.2\n", &Options::default());
    assert!(stream.documents.is_empty());
    assert!(stream.line_counter.is_none());
}

#[test]
fn test_json_output() {
    let value = parse("a: [1, 2.5, null, true]\n").unwrap();
    assert_eq!(
        value.to_json(),
        serde_json::json!({"a": [1, 2.5, null, true]})
    );

    let tokens = parse_cst("- x\n");
    let json = serde_json::to_value(&tokens).unwrap();
    assert_eq!(json[0]["type"], "document");
    assert_eq!(json[0]["value"]["type"], "block-seq");
    assert_eq!(json[0]["value"]["items"][0]["start"][0]["type"], "seq-item-ind");
}

#[test]
fn test_document_serialization() {
    let doc = parse_document("%TAG !e! tag:e/\n--- &top\n? [1]\n: !!binary aGk=\n", &Options::default());
    let json = serde_json::to_value(&doc).unwrap();
    assert_eq!(json["tags"]["!e!"], "tag:e/");
    assert_eq!(json["contents"]["anchor"], "top");
    let pair = &json["contents"]["content"]["items"][0];
    assert_eq!(pair["key"]["content"]["kind"], "sequence");
    assert_eq!(pair["value"]["content"]["value"], "aGk=");
    assert!(json["anchors"]["top"].is_object());
}

#[test]
fn test_diagnostic_serialization() {
    let doc = parse_document("a: 1\na: 2\n", &Options::default().with_unique_keys(true));
    let json = serde_json::to_value(&doc.errors).unwrap();
    assert_eq!(json[0]["kind"], "DUPLICATE_KEY");
}

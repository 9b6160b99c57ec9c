//! Test harness for the dictionary parser against fixture files.
//!
//! Every .foam file under test/foam/ must parse, and parsing the generated
//! text again must give an equal tree. When a sibling .expected file exists,
//! the generated text must match it. Every .nofoam file under test/nofoam/
//! must fail, with the message from a sibling .error file when present.
//!
//! The parse mode follows the fixture name: `boundary*` files are mesh
//! boundary files, `list_*` files are bare lists, `expand_*` files are
//! parsed with macro expansion and `unparsed_*` files keep length-prefixed
//! lists of three or more items as raw text.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use libfoam::{
    encode, encode_value, parse, parse_with_filename, Aggregate, Directive, Field, FoamDict,
    FoamError, Key, ParseOptions, Scalar, Value,
};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All files matching `pattern` under a subdirectory of test/, sorted.
fn fixture_files(subdir: &str, pattern: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(subdir).join(pattern);
    let mut files: Vec<PathBuf> = glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();
    files
}

fn sibling(path: &Path, ext: &str) -> Option<String> {
    fs::read_to_string(path.with_extension(ext)).ok()
}

fn options_for(path: &Path) -> ParseOptions {
    let stem = path.file_stem().unwrap().to_string_lossy();
    if stem.starts_with("boundary") {
        ParseOptions::default().with_boundary_dict()
    } else if stem.starts_with("list_") {
        ParseOptions::default().with_list_dict()
    } else if stem.starts_with("expand_") {
        ParseOptions::default().with_macro_expansion(true)
    } else if stem.starts_with("unparsed_") {
        ParseOptions::default().with_list_length_unparsed(3)
    } else {
        ParseOptions::default()
    }
}

/// Drop expanded includes (they are written commented out) and renumber
/// the remaining positional keys.
fn normalize(value: &Value) -> Value {
    match value {
        Value::Dict(dict) => {
            let mut out = FoamDict::new();
            for (key, v) in dict.iter() {
                if matches!(v, Value::Directive(Directive::Include { expanded: true, .. })) {
                    continue;
                }
                match key {
                    Key::Index(_) => {
                        out.push_positional(normalize(v));
                    }
                    Key::Name(name) => {
                        out.insert(name.as_str(), normalize(v));
                    }
                }
            }
            Value::Dict(out)
        }
        Value::List(items) => Value::List(items.iter().map(normalize).collect()),
        Value::Tuple(items) => Value::Tuple(items.iter().map(normalize).collect()),
        other => other.clone(),
    }
}

/// Parse a fixture, generate text, re-parse it and compare.
fn check_fixture(path: &Path) -> Result<(), String> {
    let input = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let options = options_for(path);
    let name = path.to_string_lossy().into_owned();
    let parsed = parse_with_filename(&input, Some(name.as_str()), &options)
        .map_err(|e| format!("parse failed: {}", e))?;

    let generated =
        encode(parsed.header.as_ref(), &parsed.body).map_err(|e| format!("encode failed: {}", e))?;

    let reread_options = ParseOptions {
        do_macro_expansion: false,
        ..options
    };
    let reparsed = parse(&generated, &reread_options)
        .map_err(|e| format!("re-parse failed: {}\n{}", e, generated))?;

    if reparsed.header != parsed.header {
        return Err(format!("header changed on round trip\n{}", generated));
    }
    if normalize(&reparsed.body) != normalize(&parsed.body) {
        return Err(format!("body changed on round trip\n{}", generated));
    }

    if let Some(expected) = sibling(path, "expected") {
        if expected.trim() != generated.trim() {
            return Err(format!(
                "output mismatch\n  expected: {:?}\n  actual:   {:?}",
                expected.trim(),
                generated.trim()
            ));
        }
    }
    Ok(())
}

#[test]
fn test_foam_fixtures() {
    let files = fixture_files("foam", "*.foam");
    assert!(!files.is_empty(), "no fixtures found");

    let mut passed = 0;
    let mut failed = 0;
    for path in &files {
        match check_fixture(path) {
            Ok(()) => passed += 1,
            Err(msg) => {
                println!("FAIL: {}\n  {}", path.display(), msg);
                failed += 1;
            }
        }
    }

    println!("\nResults: {} passed, {} failed", passed, failed);
    assert!(failed == 0, "{} fixture(s) failed", failed);
}

#[test]
fn test_nofoam_fixtures() {
    let files = fixture_files("nofoam", "*.nofoam");
    assert!(!files.is_empty(), "no fixtures found");

    let mut passed = 0;
    let mut failed = 0;
    for path in &files {
        let input = fs::read_to_string(path).unwrap();
        match parse(&input, &options_for(path)) {
            Ok(_) => {
                println!("FAIL: {} parsed but should not", path.display());
                failed += 1;
            }
            Err(e) => match sibling(path, "error") {
                Some(expected) if expected.trim() != e.to_string() => {
                    println!(
                        "FAIL: {}\n  expected: {}\n  actual:   {}",
                        path.display(),
                        expected.trim(),
                        e
                    );
                    failed += 1;
                }
                _ => passed += 1,
            },
        }
    }

    println!("\nResults: {} passed, {} failed", passed, failed);
    assert!(failed == 0, "{} fixture(s) failed", failed);
}

// ============================================================================
// Scenarios
// ============================================================================

fn body(input: &str) -> FoamDict {
    parse(input, &ParseOptions::default())
        .unwrap()
        .into_dict()
        .unwrap()
}

#[test]
fn test_end_to_end() {
    let input = "FoamFile { version 2.0; format ascii; class dictionary; object test; } \
                 key1 1; key2 (1 2 3); sub { a 1; b 2; }";
    let parsed = parse(input, &ParseOptions::default()).unwrap();
    let header = parsed.header.clone().unwrap();
    assert_eq!(header.len(), 4);

    let dict = parsed.body.as_dict().unwrap();
    assert_eq!(dict.len(), 3);
    assert_eq!(dict.get("key1"), Some(&Value::from(1)));
    assert!(matches!(
        dict.get("key2"),
        Some(Value::Aggregate(Aggregate::Vector(_)))
    ));
    let sub = dict.get("sub").and_then(Value::as_dict).unwrap();
    assert_eq!(sub.get("a"), Some(&Value::from(1)));
    assert_eq!(sub.get("b"), Some(&Value::from(2)));

    let text = encode(Some(&header), &parsed.body).unwrap();
    let again = parse(&text, &ParseOptions::default()).unwrap();
    assert_eq!(again.body, parsed.body);
    assert_eq!(again.header, parsed.header);
}

#[test]
fn test_aggregate_promotion_by_length() {
    let dict = body(
        "v (1 2 3); s (1 2 3 4 5 6); t (1 2 3 4 5 6 7 8 9); \
         l4 (1 2 3 4); l5 (1 2 3 4 5); l7 (1 2 3 4 5 6 7); l8 (1 2 3 4 5 6 7 8); \
         mixed (1 x 3);",
    );
    assert!(matches!(dict.get("v"), Some(Value::Aggregate(Aggregate::Vector(_)))));
    assert!(matches!(dict.get("s"), Some(Value::Aggregate(Aggregate::SymmTensor(_)))));
    assert!(matches!(dict.get("t"), Some(Value::Aggregate(Aggregate::Tensor(_)))));
    for key in ["l4", "l5", "l7", "l8", "mixed"] {
        assert!(matches!(dict.get(key), Some(Value::List(_))), "{} should be a list", key);
    }
    assert_eq!(
        dict.get("v").and_then(Value::as_aggregate).unwrap().components(),
        &[Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)]
    );
}

#[test]
fn test_large_list_fallback() {
    let numbers: Vec<String> = (0..2000).map(|i| format!("{}.5", i)).collect();
    let span = format!("\n{}\n", numbers.join("\n"));
    let input = format!("points 2000({});", span);

    let options = ParseOptions::default().with_list_length_unparsed(1000);
    let parsed = parse(&input, &options).unwrap();
    let value = parsed.body.as_dict().and_then(|d| d.get("points")).unwrap();
    match value {
        Value::UnparsedList(list) => {
            assert_eq!(list.length, 2000);
            assert_eq!(list.data, span);
        }
        other => panic!("expected an unparsed list, got {}", other.kind_name()),
    }
    assert_eq!(encode_value(value, 0).unwrap(), format!("2000({})", span));

    // Below the threshold the list is parsed.
    let parsed = parse(&input, &ParseOptions::default().with_list_length_unparsed(5000)).unwrap();
    let list = parsed.body.as_dict().and_then(|d| d.get("points")).unwrap();
    assert_eq!(list.as_list().map(Vec::len), Some(2000));
}

#[test]
fn test_unparsed_field_values() {
    let options = ParseOptions::default().with_list_length_unparsed(2);
    let parsed = parse("value nonuniform List<scalar> 3(1 2 3);", &options).unwrap();
    let field = parsed
        .body
        .as_dict()
        .and_then(|d| d.get("value"))
        .and_then(Value::as_field)
        .unwrap();
    assert!(matches!(field.value(), Value::UnparsedList(_)));
    let text = encode(None, &parsed.body).unwrap();
    assert_eq!(text, "value nonuniform List<scalar> 3(1 2 3);\n");
}

#[test]
fn test_dimension_arity() {
    let dict = body("d [0 1 2 3 4];");
    let dim = dict.get("d").and_then(Value::as_dimension).unwrap();
    assert_eq!(dim[4], Scalar::Int(4));
    assert_eq!(dim[5], Scalar::Int(0));
    assert_eq!(dim[6], Scalar::Int(0));

    let err = parse("d [0 1 2 3];", &ParseOptions::default()).unwrap_err();
    assert!(matches!(err, FoamError::MalformedDimension { count: 4, .. }));
}

#[test]
fn test_substitution_toggle() {
    let input = "foo 42; bar $foo;";
    let expanded = parse(input, &ParseOptions::default().with_macro_expansion(true))
        .unwrap()
        .into_dict()
        .unwrap();
    assert_eq!(expanded.get("bar"), Some(&Value::from(42)));

    let literal = body(input);
    assert_eq!(literal.get("bar"), Some(&Value::Word("$foo".to_string())));
}

#[test]
fn test_unresolved_substitution_policies() {
    let tolerant = ParseOptions::default().with_macro_expansion(true);
    let dict = parse("bar $missing;", &tolerant).unwrap().into_dict().unwrap();
    assert_eq!(
        dict.get("bar"),
        Some(&Value::String("<Symbol 'missing' not found>".to_string()))
    );

    let strict = tolerant.with_strict_substitution(true);
    let err = parse("a 1;\nbar $missing;", &strict).unwrap_err();
    assert_eq!(err.to_string(), "Symbol 'missing' not found on line 2");
}

#[test]
fn test_order_preservation() {
    let mut dict = body("c 1; a 2; b 3; d 4;");
    dict.insert("a", Value::from(20));
    dict.remove("b");
    dict.insert("e", Value::from(5));
    dict.insert("b", Value::from(30));
    let keys: Vec<String> = dict.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, ["c", "a", "d", "e", "b"]);

    let text = encode(None, &Value::Dict(dict.clone())).unwrap();
    let reread = body(&text);
    let reread_keys: Vec<String> = reread.keys().map(|k| k.to_string()).collect();
    assert_eq!(reread_keys, keys);
}

#[test]
fn test_field_invariant() {
    assert!(matches!(
        Field::new(Value::List(vec![Value::from(1)]), false, None),
        Err(FoamError::ShapeInvariant(_))
    ));

    let mut field = Field::nonuniform("List<scalar>", Value::List(vec![Value::from(1)]));
    field.set_uniform(Value::from(3.5));
    assert!(field.is_uniform());
    assert_eq!(field.name(), None);
    assert_eq!(field.value(), &Value::from(3.5));
}

#[test]
fn test_conflicting_start_modes() {
    let options = ParseOptions::default().with_no_header().with_no_body();
    assert!(matches!(
        parse("a 1;", &options),
        Err(FoamError::ConflictingStartModes(2))
    ));
}

#[test]
fn test_include_expansion_and_limits() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("base"), "x 1;\n#inputMode merge\n").unwrap();
    let main = dir.path().join("main");
    fs::write(&main, "#include \"base\"\ny $x;\n").unwrap();

    let options = ParseOptions::default().with_macro_expansion(true);
    let input = fs::read_to_string(&main).unwrap();
    let name = main.to_string_lossy().into_owned();
    let parsed = parse_with_filename(&input, Some(name.as_str()), &options).unwrap();
    let dict = parsed.body.as_dict().unwrap();
    assert_eq!(dict.get("x"), Some(&Value::from(1)));
    assert_eq!(dict.get("y"), Some(&Value::from(1)));
    assert!(matches!(
        dict.get(0usize),
        Some(Value::Directive(Directive::Include { expanded: true, .. }))
    ));
    assert!(matches!(
        dict.get(1usize),
        Some(Value::Directive(Directive::InputMode(_)))
    ));
    let text = encode(None, &parsed.body).unwrap();
    assert!(text.starts_with("// #include \"base\"\n"));

    // A file that includes itself hits the depth guard.
    let looped = dir.path().join("loop");
    fs::write(&looped, "#include \"loop\"\n").unwrap();
    let input = fs::read_to_string(&looped).unwrap();
    let name = looped.to_string_lossy().into_owned();
    let err = parse_with_filename(&input, Some(name.as_str()), &options.clone().with_max_include_depth(4))
        .unwrap_err();
    assert!(matches!(err, FoamError::RecursionLimit { limit: 4, .. }));

    let missing = parse_with_filename("#include \"nowhere\"", Some(name.as_str()), &options).unwrap_err();
    assert!(matches!(missing, FoamError::IncludeResolution { .. }));
}

#[test]
fn test_syntax_error_context() {
    let err = parse("a 1;\nb (1 2;\n", &ParseOptions::default()).unwrap_err();
    match err {
        FoamError::Syntax {
            found,
            line,
            offset,
            context,
            ..
        } => {
            assert_eq!(found, ";");
            assert_eq!(line, 2);
            assert_eq!(offset, 11);
            assert_eq!(context.before, "a 1;\nb (1 2");
            assert_eq!(context.at, ";");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_positional_counter_is_per_parse() {
    let first = body("#inputMode merge\n");
    let second = body("#inputMode merge\n");
    assert!(first.contains_key(0usize));
    assert!(second.contains_key(0usize));
}

#[test]
fn test_round_trip_with_unparsed_threshold() {
    let numbers: Vec<String> = (0..25).map(|i| i.to_string()).collect();
    let input = format!("l ({});\nv nonuniform List<scalar> (1 2 3);", numbers.join(" "));
    let options = ParseOptions::default().with_list_length_unparsed(2);
    let parsed = parse(&input, &options).unwrap();
    let dict = parsed.body.as_dict().unwrap();
    assert!(matches!(dict.get("l"), Some(Value::List(_))));

    let text = encode(None, &parsed.body).unwrap();
    assert!(text.contains("v nonuniform List<scalar> (1 2 3);"));
    let reparsed = parse(&text, &options).unwrap();
    assert_eq!(reparsed.body, parsed.body);
}

#[test]
fn test_round_trip_of_substituted_fields() {
    let expand = ParseOptions::default().with_macro_expansion(true);
    for input in [
        "x 5; v uniform $x;",
        "flowVelocity (10 0 0); internalField uniform $flowVelocity;",
    ] {
        let parsed = parse(input, &expand).unwrap();
        let text = encode(None, &parsed.body).unwrap();
        let reparsed = parse(&text, &ParseOptions::default()).unwrap();
        assert_eq!(reparsed.body, parsed.body, "{}", text);
    }
}

// tests/integration_tests.rs

use json_filter::{
    CompileError, FilterStats, JsonFilter, Node, Record, RecordError, SyntaxError, compile,
};

fn run_filter(query: &str, input: &str) -> (String, String, FilterStats) {
    let filter = JsonFilter::new(query).unwrap();
    let mut output = Vec::new();
    let mut errors = Vec::new();
    let stats = filter.run(input.as_bytes(), &mut output, &mut errors).unwrap();
    (
        String::from_utf8(output).unwrap(),
        String::from_utf8(errors).unwrap(),
        stats,
    )
}

fn keeps(query: &str, line: &str) -> bool {
    JsonFilter::new(query)
        .unwrap()
        .apply(1, line)
        .unwrap()
        .is_some()
}

// ============================================================================
// End-to-End Filtering
// ============================================================================

#[test]
fn test_filter_by_age_and_name_pattern() {
    let input = concat!(
        r#"{"age":20,"name":"Alice"}"#,
        "\n",
        r#"{"age":15,"name":"Amy"}"#,
        "\n",
        r#"{"age":30,"name":"Bob"}"#,
        "\n",
    );
    let (output, errors, stats) = run_filter(
        "select * from t where age > 18 and name like 'A%'",
        input,
    );

    assert_eq!(output, "{\"age\":20,\"name\":\"Alice\"}\n");
    assert_eq!(errors, "");
    assert_eq!(
        stats,
        FilterStats {
            read: 3,
            kept: 1,
            dropped: 2,
            failed: 0
        }
    );
}

#[test]
fn test_select_all_emits_record_verbatim() {
    let line = r#"{ "b" : 1,  "a":  [1, 2] }"#;
    let (output, _, _) = run_filter("select * from t", line);
    assert_eq!(output, format!("{}\n", line));
}

#[test]
fn test_select_all_trims_surrounding_whitespace() {
    let (output, _, _) = run_filter("select * from t", "   {\"a\":1}  \n");
    assert_eq!(output, "{\"a\":1}\n");
}

#[test]
fn test_keywords_are_case_insensitive() {
    let (output, _, _) = run_filter(
        "SELECT name FROM T WHERE age >= 18 AND name IS NOT NULL",
        "{\"name\":\"Alice\",\"age\":18}\n",
    );
    assert_eq!(output, "{\"name\":\"Alice\"}\n");
}

#[test]
fn test_nested_path_predicate() {
    let query = "select * from t where user.address.city = 'Paris'";
    assert!(keeps(query, r#"{"user":{"address":{"city":"Paris"}}}"#));
    assert!(!keeps(query, r#"{"user":{"address":{"city":"Rome"}}}"#));
    assert!(!keeps(query, r#"{"user":"Paris"}"#));
}

#[test]
fn test_array_index_paths() {
    let query = "select * from t where tags.0 = 'a' and tags.2 = 'c'";
    assert!(keeps(query, r#"{"tags":["a","b","c"]}"#));
    assert!(!keeps(query, r#"{"tags":["a","b"]}"#));
}

#[test]
fn test_negative_index_lookup() {
    // `-` always lexes as an operator, so negative indices only come through the record API.
    let record = Record::parse(r#"{"tags":["a","b","c"]}"#).unwrap();
    assert_eq!(record.lookup("tags.-1"), Some(&serde_json::json!("c")));
    assert_eq!(record.lookup("tags.-4"), None);
    assert_eq!(record.lookup("tags.x"), None);
}

#[test]
fn test_json_null_is_absent() {
    let query = "select * from t where email is null";
    assert!(keeps(query, r#"{"email":null}"#));
    assert!(keeps(query, r#"{}"#));
    assert!(!keeps(query, r#"{"email":""}"#));
}

#[test]
fn test_decimal_arithmetic_on_records() {
    let query = "select * from t where a + b = 0.3";
    assert!(keeps(query, r#"{"a":0.1,"b":0.2}"#));
}

#[test]
fn test_in_list_on_records() {
    let query = "select id from t where status in ('active', 'trial') and id not in (3)";
    let input = concat!(
        r#"{"id":1,"status":"active"}"#,
        "\n",
        r#"{"id":2,"status":"closed"}"#,
        "\n",
        r#"{"id":3,"status":"trial"}"#,
        "\n",
        r#"{"id":4,"status":"trial"}"#,
        "\n",
    );
    let (output, _, _) = run_filter(query, input);
    assert_eq!(output, "{\"id\":1}\n{\"id\":4}\n");
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_projection_sorted_keys() {
    let line = r#"{"name":"Alice","age":20,"city":"X"}"#;
    for query in ["select name, age from t", "select age, name from t"] {
        let (output, _, _) = run_filter(query, line);
        assert_eq!(output, "{\"age\":20,\"name\":\"Alice\"}\n", "Failed for query: {}", query);
    }
}

#[test]
fn test_projection_missing_field_is_null() {
    let (output, _, _) = run_filter("select name, email from t", r#"{"name":"Bob"}"#);
    assert_eq!(output, "{\"email\":null,\"name\":\"Bob\"}\n");
}

#[test]
fn test_projection_of_nested_path() {
    let (output, _, _) = run_filter(
        "select user.name from t",
        r#"{"user":{"name":"Eve","id":9}}"#,
    );
    assert_eq!(output, "{\"user.name\":\"Eve\"}\n");
}

#[test]
fn test_star_inside_field_list_is_skipped() {
    let (output, _, _) = run_filter("select *, name from t", r#"{"name":"Eve","id":9}"#);
    assert_eq!(output, "{\"name\":\"Eve\"}\n");
}

#[test]
fn test_keys_pseudo_field() {
    let (output, _, _) = run_filter("select [keys] from t", r#"{"b":1,"c":2,"a":3}"#);
    assert_eq!(output, "{\"[keys]\":\"a,b,c\"}\n");
}

#[test]
fn test_keys_in_predicate() {
    let query = "select * from t where [keys] = 'age,name'";
    assert!(keeps(query, r#"{"name":"x","age":1}"#));
    assert!(!keeps(query, r#"{"name":"x","age":1,"id":2}"#));
}

#[test]
fn test_record_projection_api() {
    let record = Record::parse(r#"{"a":{"b":[10,20]}}"#).unwrap();
    let fields = vec!["a.b.1".to_string()];
    assert_eq!(
        record.project(&fields).unwrap().to_string(),
        r#"{"a.b.1":20}"#
    );
}

// ============================================================================
// Error Isolation
// ============================================================================

#[test]
fn test_bad_record_is_reported_and_skipped() {
    let input = concat!(
        r#"{"age":"N/A"}"#,
        "\n",
        r#"{"age":42}"#,
        "\n",
    );
    let (output, errors, stats) = run_filter("select * from t where age > 10", input);

    assert_eq!(output, "{\"age\":42}\n");
    assert!(errors.starts_with("check line error: line 1:"), "errors: {}", errors);
    assert_eq!(errors.lines().count(), 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.kept, 1);
}

#[test]
fn test_invalid_json_is_reported_and_skipped() {
    let input = "not json\n{\"a\":1}\n";
    let (output, errors, stats) = run_filter("select * from t", input);

    assert_eq!(output, "{\"a\":1}\n");
    assert!(errors.contains("line 1: invalid JSON"), "errors: {}", errors);
    assert_eq!(stats.failed, 1);
}

#[test]
fn test_invalid_utf8_line_is_reported_and_skipped() {
    let input: &[u8] = b"{\"a\":1}\n{\"a\":\"\xFF\"}\n{\"a\":3}\n";
    let filter = JsonFilter::new("select * from t").unwrap();
    let mut output = Vec::new();
    let mut errors = Vec::new();
    let stats = filter.run(input, &mut output, &mut errors).unwrap();

    assert_eq!(String::from_utf8(output).unwrap(), "{\"a\":1}\n{\"a\":3}\n");
    let errors = String::from_utf8(errors).unwrap();
    assert!(
        errors.starts_with("check line error: line 2: invalid UTF-8"),
        "errors: {}",
        errors
    );
    assert_eq!(
        stats,
        FilterStats {
            read: 3,
            kept: 2,
            dropped: 0,
            failed: 1
        }
    );
}

#[test]
fn test_crlf_line_endings() {
    let (output, errors, stats) = run_filter(
        "select a from t where a > 1",
        "{\"a\":1}\r\n{\"a\":2}\r\n\r\n",
    );
    assert_eq!(output, "{\"a\":2}\n");
    assert_eq!(errors, "");
    assert_eq!(stats.read, 2);
}

#[test]
fn test_last_line_without_newline() {
    let (output, _, _) = run_filter("select * from t", "{\"a\":1}\n{\"a\":2}");
    assert_eq!(output, "{\"a\":1}\n{\"a\":2}\n");
}

#[test]
fn test_tiny_values_survive_arithmetic() {
    let (output, errors, stats) =
        run_filter("select * from t where x * 1000000 > 0", "{\"x\":1e-30}\n");
    assert_eq!(output, "{\"x\":1e-30}\n");
    assert_eq!(errors, "");
    assert_eq!(stats.kept, 1);
}

#[test]
fn test_blank_lines_are_skipped() {
    let input = "\n{\"a\":1}\n   \n{\"a\":2}\n";
    let (output, errors, stats) = run_filter("select * from t", input);
    assert_eq!(output, "{\"a\":1}\n{\"a\":2}\n");
    assert_eq!(errors, "");
    assert_eq!(stats.read, 2);
}

#[test]
fn test_error_reports_physical_line_number() {
    let input = "\n\n{\"age\":\"x\"}\n";
    let filter = JsonFilter::new("select * from t where age > 1").unwrap();
    let err = filter.apply(3, input.lines().nth(2).unwrap()).unwrap_err();
    assert_eq!(err.line(), 3);

    let (_, errors, _) = run_filter("select * from t where age > 1", input);
    assert!(errors.contains("line 3:"), "errors: {}", errors);
}

#[test]
fn test_keys_on_non_object_record() {
    let filter = JsonFilter::new("select [keys] from t").unwrap();
    assert!(matches!(filter.apply(1, "[1,2]"), Err(RecordError::Eval { .. })));
}

// ============================================================================
// Compilation
// ============================================================================

#[test]
fn test_query_without_where_is_always_true() {
    let plan = compile("select a, b from t").unwrap();
    assert_eq!(plan.fields, vec!["a", "b"]);
    assert_eq!(plan.predicate, Node::True);
    assert!(!plan.selects_all());
    assert!(compile("select * from t").unwrap().selects_all());
}

#[test]
fn test_compile_errors_name_their_phase() {
    let test_cases = vec![
        ("select * from t where name = 'x", "tokenize error:"),
        ("", "syntax error:"),
        ("delete from t", "syntax error:"),
        ("select a from", "syntax error:"),
        ("select a from users", "syntax error:"),
        ("select from t", "syntax error:"),
        ("select a from t limit 1", "syntax error:"),
        ("select a from t where", "syntax error:"),
        ("select a from t where a >", "parse error:"),
        ("select a from t where name > 'x'", "parse error:"),
        ("select a from t where a b c", "parse error:"),
        ("select a from t where a + 1", "parse error:"),
    ];

    for (query, prefix) in test_cases {
        let err = compile(query).unwrap_err();
        assert!(
            err.to_string().starts_with(prefix),
            "query {:?} gave {:?}, expected prefix {:?}",
            query,
            err.to_string(),
            prefix
        );
    }
}

#[test]
fn test_specific_syntax_errors() {
    assert_eq!(
        compile(""),
        Err(CompileError::Syntax(SyntaxError::EmptyQuery))
    );
    assert_eq!(
        compile("select a from users"),
        Err(CompileError::Syntax(SyntaxError::UnknownTable("users".to_string())))
    );
    assert_eq!(
        compile("select from t"),
        Err(CompileError::Syntax(SyntaxError::EmptyFieldList))
    );
    assert_eq!(
        compile("select a from t limit 1"),
        Err(CompileError::Syntax(SyntaxError::ExpectedWhere {
            found: "limit".to_string(),
            position: 4
        }))
    );
}

#[test]
fn test_invalid_field_in_select_list() {
    assert!(matches!(
        compile("select (a) from t"),
        Err(CompileError::Syntax(SyntaxError::InvalidField(_)))
    ));
}

#[test]
fn test_from_inside_string_is_not_the_clause() {
    let plan = compile("select a from t where a = 'from t'").unwrap();
    assert_eq!(plan.fields, vec!["a"]);
}

#[test]
fn test_compilation_is_deterministic() {
    let query = "select * from t where (a > 1 or b like 'x%') and [keys] != 'a' and c in (1, 'y')";
    let first = compile(query).unwrap();
    let second = compile(query).unwrap();
    assert_eq!(first, second);

    let records = [
        r#"{"a":2,"c":1}"#,
        r#"{"b":"xyz","c":"y"}"#,
        r#"{"a":0,"b":"q","c":1}"#,
        r#"{"a":5}"#,
    ];
    let f1 = JsonFilter::from_plan(first);
    let f2 = JsonFilter::from_plan(second);
    for line in records {
        let record = Record::parse(line).unwrap();
        assert_eq!(f1.decide(&record), f2.decide(&record), "Failed for record: {}", line);
    }
}

use super::*;
use proptest::prelude::*;

fn rewrite(path: &str, source: &str, policy: &InlinePolicy, env: &EnvSnapshot) -> Result<String> {
    rewrite_with(TreeSitterTransform::new(), path, source, policy, env)
}

fn rewrite_with(
    engine: TreeSitterTransform,
    path: &str,
    source: &str,
    policy: &InlinePolicy,
    env: &EnvSnapshot,
) -> Result<String> {
    let parsed = engine.parse(Path::new(path), source.to_string())?;
    let substituted = engine.substitute(parsed, policy, env)?;
    Ok(engine.print(&substituted))
}

fn env() -> EnvSnapshot {
    EnvSnapshot::from_pairs([("API_KEY", "abc123"), ("EMPTY", ""), ("MULTI", "a\nb\"c")])
}

#[test]
fn test_inlines_value_on_same_line() {
    let source = "const key = process.env.API_KEY;\nmodule.exports = { key };\n";
    let output = rewrite("/fn/hello.js", source, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(output, "const key = \"abc123\";\nmodule.exports = { key };\n");
}

#[test]
fn test_bracket_access_is_inlined() {
    let source = "const key = process.env['API_KEY'];\n";
    let output = rewrite("/fn/hello.js", source, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(output, "const key = \"abc123\";\n");
}

#[test]
fn test_excluded_reference_is_left_alone() {
    let source = "const key = process.env.API_KEY;\n";
    let policy = InlinePolicy::new(Vec::<&str>::new(), ["API_KEY"]);
    let output = rewrite("/fn/hello.js", source, &policy, &env()).unwrap();

    assert_eq!(output, source);
}

#[test]
fn test_include_and_exclude_precedence() {
    let source = "a(process.env.API_KEY, process.env.EMPTY);\n";

    let both = InlinePolicy::new(["API_KEY", "EMPTY"], ["API_KEY"]);
    let output = rewrite("/fn/a.js", source, &both, &env()).unwrap();
    assert_eq!(output, "a(process.env.API_KEY, \"\");\n");

    let narrow = InlinePolicy::new(["EMPTY"], Vec::<&str>::new());
    let output = rewrite("/fn/a.js", source, &narrow, &env()).unwrap();
    assert_eq!(output, "a(process.env.API_KEY, \"\");\n");
}

#[test]
fn test_absent_variable_stays_a_lookup_by_default() {
    let source = "const v = process.env.NOT_SET;\n";
    let output = rewrite("/fn/a.js", source, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(output, source);
}

#[test]
fn test_absent_variable_as_undefined() {
    let source = "const v = process.env.NOT_SET;\n";
    let engine = TreeSitterTransform::new().with_absent_variables(AbsentVariables::Undefined);
    let output = rewrite_with(engine, "/fn/a.js", source, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(output, "const v = undefined;\n");
}

#[test]
fn test_empty_string_value_is_inlined() {
    let source = "const v = process.env.EMPTY || 'fallback';\n";
    let output = rewrite("/fn/a.js", source, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(output, "const v = \"\" || 'fallback';\n");
}

#[test]
fn test_value_with_newline_and_quote_is_escaped() {
    let source = "const v = process.env.MULTI;\n";
    let output = rewrite("/fn/a.js", source, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(output, "const v = \"a\\nb\\\"c\";\n");
    assert_eq!(output.lines().count(), source.lines().count());
}

#[test]
fn test_multiline_lookup_keeps_following_lines_in_place() {
    let source = "const v = process\n  .env\n  .API_KEY;\nconst after = 1;\n";
    let output = rewrite("/fn/a.js", source, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(output, "const v = \"abc123\"\n\n;\nconst after = 1;\n");
    assert_eq!(output.lines().count(), source.lines().count());
}

#[test]
fn test_assignment_targets_are_not_rewritten() {
    let source = "process.env.API_KEY = 'x';\ndelete process.env.API_KEY;\n";
    let output = rewrite("/fn/a.js", source, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(output, source);
}

#[test]
fn test_destructuring_and_loop_targets_are_not_rewritten() {
    let targets = [
        "[process.env.API_KEY] = ['x'];\n",
        "({ k: process.env.API_KEY } = { k: 'x' });\n",
        "[...process.env.API_KEY] = 'xy';\n",
        "[process.env.API_KEY = 'd'] = [];\n",
        "for (process.env.API_KEY of ['x']) {}\n",
        "for (process.env.API_KEY in { a: 1 }) {}\n",
        "(process.env.API_KEY) = 'x';\n",
        "(process.env.API_KEY)++;\n",
    ];
    for source in targets {
        let output = rewrite("/fn/a.js", source, &InlinePolicy::default(), &env()).unwrap();
        assert_eq!(output, source, "write target was rewritten in {source:?}");
    }
}

#[test]
fn test_pattern_defaults_are_reads() {
    let source = "[a = process.env.API_KEY] = [];\n";
    let output = rewrite("/fn/a.js", source, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(output, "[a = \"abc123\"] = [];\n");
    let again = rewrite("/fn/a.js", &output, &InlinePolicy::default(), &env()).unwrap();
    assert_eq!(again, output);
}

#[test]
fn test_typescript_annotations_are_preserved() {
    let source = "type Env = { key: string };\nexport const env: Env = { key: process.env.API_KEY as string };\n";
    let output = rewrite("/fn/a.ts", source, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(
        output,
        "type Env = { key: string };\nexport const env: Env = { key: \"abc123\" as string };\n"
    );
}

#[test]
fn test_tsx_source() {
    let source = "export const T = (p: { n: number }) => <b>{process.env.API_KEY}</b>;\n";
    let output = rewrite("/fn/a.tsx", source, &InlinePolicy::default(), &env()).unwrap();

    assert!(output.contains("<b>{\"abc123\"}</b>"));
}

#[test]
fn test_syntax_error_reports_location() {
    let source = "const ok = 1;\nconst broken = ;\n";
    let err = rewrite("/fn/broken.js", source, &InlinePolicy::default(), &env()).unwrap_err();

    match &err {
        InlineError::Parse {
            file_path, line, ..
        } => {
            assert_eq!(file_path.as_deref(), Some(Path::new("/fn/broken.js")));
            assert_eq!(*line, Some(2));
        }
        other => panic!("Expected parse error, got {other:?}"),
    }
    assert!(err.to_string().contains("/fn/broken.js"));
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let err = rewrite("/fn/a.py", "x = 1\n", &InlinePolicy::default(), &env()).unwrap_err();
    assert!(matches!(err, InlineError::Unsupported { .. }));
}

#[test]
fn test_second_pass_is_a_no_op() {
    let source = "const a = process.env.API_KEY;\nconst b = process.env.NOT_SET;\n";
    let first = rewrite("/fn/a.js", source, &InlinePolicy::default(), &env()).unwrap();
    let second = rewrite("/fn/a.js", &first, &InlinePolicy::default(), &env()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_render_string_literal() {
    assert_eq!(render_string_literal("abc123"), "\"abc123\"");
    assert_eq!(render_string_literal(""), "\"\"");
    assert_eq!(render_string_literal("tab\there"), "\"tab\\there\"");
    assert_eq!(render_string_literal("back\\slash"), "\"back\\\\slash\"");
    assert_eq!(
        render_string_literal("a\u{2028}b\u{2029}c"),
        "\"a\\u2028b\\u2029c\""
    );
}

#[test]
fn test_unicode_line_separators_do_not_leak_into_output() {
    let env = EnvSnapshot::from_pairs([("SEP", "x\u{2028}y\u{2029}z")]);
    let source = "const v = process.env.SEP;\n";
    let output = rewrite("/fn/a.js", source, &InlinePolicy::default(), &env).unwrap();

    assert_eq!(output, "const v = \"x\\u2028y\\u2029z\";\n");
    assert!(!output.contains(['\u{2028}', '\u{2029}']));
}

proptest! {
    /// Rewriting never changes the number of lines, whatever the values are.
    #[test]
    fn prop_line_count_is_preserved(
        value in "[a-zA-Z0-9 \\n\\t\"'\\\\]{0,24}",
        breaks in 0usize..3,
        padding in 0usize..4,
    ) {
        let literal = render_string_literal(&value);
        let env = EnvSnapshot::from_pairs([("VALUE", value)]);
        let mut source = String::new();
        for i in 0..padding {
            source.push_str(&format!("const pad{i} = {i};\n"));
        }
        source.push_str("const v = process");
        for _ in 0..breaks {
            source.push('\n');
        }
        source.push_str(".env.VALUE;\nexport default v;\n");

        let output = rewrite("/fn/p.js", &source, &InlinePolicy::default(), &env).unwrap();
        prop_assert_eq!(output.lines().count(), source.lines().count());
        prop_assert!(output.contains(&literal));

        let again = rewrite("/fn/p.js", &output, &InlinePolicy::default(), &env).unwrap();
        prop_assert_eq!(again, output);
    }
}

use std::{
    fs::{self},
    thread,
};

use lilt::{
    error::{BindError, LanguageError, ParseError, RuntimeError},
    interpreter::value::core::Value,
    run_source,
};
use walkdir::WalkDir;

#[test]
fn script_examples_work() {
    let mut count = 0;

    for entry in
        WalkDir::new("tests/scripts").into_iter()
                                     .filter_map(Result::ok)
                                     .filter(|e| e.path().extension().is_some_and(|ext| ext == "lilt"))
    {
        let path = entry.path();
        let script =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        count += 1;
        if let Err(e) = run_source(&script, false) {
            panic!("Script {path:?} failed:\n{script}\nError: {e}");
        }
    }

    assert!(count > 0, "No scripts found in tests/scripts");
}

fn assert_success(src: &str) {
    if let Err(e) = run_source(src, false) {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) {
    if run_source(src, false).is_ok() {
        panic!("Script succeeded but was expected to fail")
    }
}

fn assert_value(src: &str, expected: Value) {
    match run_source(src, false) {
        Ok(value) => assert_eq!(value, expected, "unexpected value for:\n{src}"),
        Err(e) => panic!("Script failed: {e}"),
    }
}

fn error_of(src: &str) -> LanguageError {
    match run_source(src, false) {
        Ok(value) => panic!("Script succeeded with {value} but was expected to fail"),
        Err(e) => e,
    }
}

#[test]
fn arithmetic_follows_precedence() {
    assert_value("1 + 2 * 3", Value::from(7.0));
    assert_value("(1 + 2) * 3", Value::from(9.0));
    assert_value("10 - 4 - 3", Value::from(3.0));
    assert_value("- 2 * 3", Value::from(-6.0));
    assert_value("1 + 2 < 4 and 2 * 2 = 4", Value::from(true));
}

#[test]
fn parenthesized_lines_continue_the_statement() {
    assert_value("(1 +\n    2)", Value::from(3.0));
    assert_value("x: (1\n      + 2)\nx * 2", Value::from(6.0));
    assert_failure("1 +\n    2");
}

#[test]
fn visually_aligned_arguments_do_not_open_blocks() {
    assert_value("fn total(a, b): a + b\nresult: total (1 +\n               2) 3\nresult",
                 Value::from(6.0));
    assert_success("fn check(v):\n    if (v >\n            1):\n            v\n    else:\n        0\nassert (check 3 = 3)");
}

#[test]
fn bodies_continue_inline_inside_parentheses() {
    assert_value("fn twice(f, x): f (f x)\ntwice (fn (v):\n    v * 3) 2", Value::from(18.0));
    assert_value("fn size(n): (if n > 1:\n    \"big\"\n    else \"small\")\nsize 3",
                 Value::from("big"));
}

#[test]
fn bindings_and_sequences() {
    assert_value("x: 1, y: x + 1\ny", Value::from(2.0));
    assert_value("a: 2\nb: a * a\nb", Value::from(4.0));
    assert_value("x: 5", Value::from(5.0));
}

#[test]
fn if_expressions() {
    assert_value("if 2 < 3 then 7 else 11", Value::from(7.0));
    assert_value("if false then 1", Value::None);
    assert_value("x: if true:\n    a: 1\n    a + 1\nelse:\n    0\nx", Value::from(2.0));
    assert_value("n: 0\nif n < 0 then \"neg\" else if n = 0 then \"zero\" else \"pos\"",
                 Value::from("zero"));
}

#[test]
fn zero_argument_calls_ignore_inner_whitespace() {
    let src = "fn seven(): 7\nassert (seven() = 7)\nassert (seven () = 7)\nassert (seven ( ) = 7)";
    assert_success(src);
    assert_value("fn make(): fn (): 3\n(make ()) ()", Value::from(3.0));
}

#[test]
fn zero_argument_calls_cannot_be_extended() {
    assert!(matches!(error_of("fn f(): 1\nf () ()"),
                     LanguageError::Syntax(ParseError::CallAfterZeroArgumentCall { .. })));
    assert!(matches!(error_of("fn f(): 1\nx: 2\nf () x"),
                     LanguageError::Syntax(ParseError::CallAfterZeroArgumentCall { .. })));
}

#[test]
fn argument_order_rules() {
    let define = "fn foo(a, b = 0, -verbose = false): a + b\n";
    assert_failure(&format!("{define}x: 1\nfoo -verbose true x"));
    assert!(matches!(error_of(&format!("{define}foo -verbose true 1")),
                     LanguageError::Syntax(ParseError::PositionalAfterNamed { .. })));
    assert_value(&format!("{define}foo 1 -verbose true"), Value::from(1.0));
    assert_value(&format!("{define}foo 1, 2"), Value::from(3.0));
    assert_value(&format!("{define}foo 1, 2,"), Value::from(3.0));
}

#[test]
fn comma_after_named_argument_belongs_to_its_value() {
    let src = "fn bar(a): a * 2\nfn foo(-verbose): verbose\nfoo -verbose bar, 3";
    assert_value(src, Value::from(6.0));
}

#[test]
fn enum_arguments_need_identifiers() {
    let define = "fn paint(-color: red | blue = red): color\n";
    assert_value(&format!("{define}paint -color:blue"), Value::from("blue"));
    assert_value(&format!("{define}paint ()"), Value::from("red"));
    assert!(matches!(error_of(&format!("{define}paint -color:1")),
                     LanguageError::Syntax(ParseError::EnumValueNotIdentifier { .. })));
    assert!(matches!(error_of(&format!("{define}paint -color:green")),
                     LanguageError::Binding(BindError::InvalidCall { .. })));
}

#[test]
fn flags_default_to_true() {
    assert_value("fn f(-quiet = false): quiet\nf -quiet", Value::from(true));
    assert_value("fn f(-quiet = false): quiet\nf ()", Value::from(false));
}

#[test]
fn flag_parameters_without_default_are_required() {
    assert_value("fn f(-verbose): verbose\nf -verbose", Value::from(true));
    assert!(matches!(error_of("fn f(-verbose): verbose\nf ()"),
                     LanguageError::Binding(BindError::InvalidCall { .. })));
}

#[test]
fn flag_outside_call_is_error() {
    assert!(matches!(error_of("-verbose"),
                     LanguageError::Syntax(ParseError::FlagOutsideCall { .. })));
}

#[test]
fn block_bindings_stay_in_their_block() {
    assert_failure("if true:\n    inner: 1\ninner");
    assert_failure("fn f():\n    local: 1\n    local\nlocal");
    assert_success("outer: 1\nif true:\n    outer + 1\nouter");
}

#[test]
fn use_before_definition_is_error() {
    assert!(matches!(error_of("y: x + 1\nx: 2"),
                     LanguageError::Binding(BindError::UndefinedIdentifier { .. })));
}

#[test]
fn redefinition_in_same_scope_is_error() {
    assert!(matches!(error_of("x: 1\nx: 2"),
                     LanguageError::Binding(BindError::Redefinition { .. })));
    assert_success("x: 1\nif true:\n    x: 2\n    assert (x = 2)\nassert (x = 1)");
}

#[test]
fn calls_are_checked_before_running() {
    assert!(matches!(error_of("print 1\nfn f(a, b): a\nf 1 2 3"),
                     LanguageError::Binding(BindError::InvalidCall { .. })));
    assert!(matches!(error_of("fn f(a): a\nf -b 2"),
                     LanguageError::Binding(BindError::InvalidCall { .. })));
    assert!(matches!(error_of("fn f(a, b): a\nf 1"),
                     LanguageError::Binding(BindError::InvalidCall { .. })));
}

#[test]
fn closures_capture_their_frame() {
    let src = "fn adder(n): fn (x): x + n\nadd5: adder 5\nadd5 10";
    assert_value(src, Value::from(15.0));
}

#[test]
fn recursion() {
    let src = "fn fib(n): if n < 2 then n else fib (n - 1) + fib (n - 2)\nfib 10";
    assert_value(src, Value::from(55.0));
}

/// Runs `src` on a thread whose stack is large enough for the maximum call
/// depth.
fn run_with_large_stack(src: String) -> Result<String, LanguageError> {
    thread::Builder::new().stack_size(512 * 1024 * 1024)
                          .spawn(move || run_source(&src, false).map(|value| value.to_string()))
                          .unwrap()
                          .join()
                          .unwrap()
}

#[test]
fn deep_recursion_is_an_error() {
    let def = "fn down(n): if n = 0 then 0 else down (n - 1)\n";
    assert_eq!(run_with_large_stack(format!("{def}down 500")).unwrap(), "0");
    assert!(matches!(run_with_large_stack(format!("{def}down 5000")),
                     Err(LanguageError::Runtime(RuntimeError::RecursionLimit { limit: 1000, .. }))));
}

#[test]
fn generic_dispatch_picks_first_match() {
    let src = "fn f(x): \"one\"\nfn f(x, y): \"two\"\nf 1 2";
    assert_value(src, Value::from("two"));

    let src = "fn f(x: string): \"s\"\nfn f(x): \"any\"\nf 1";
    assert_value(src, Value::from("any"));

    let src = "fn f(x: string): \"s\"\nf 1";
    assert!(matches!(error_of(src),
                     LanguageError::Runtime(RuntimeError::NoMatchingInstance { .. })));
}

#[test]
fn generic_instances_in_inner_scopes_do_not_leak() {
    let src = "fn f(x): 1\nfn g():\n    fn f(x, y): 2\n    f 1 2\nassert (g () = 2)\nf 1";
    assert_value(src, Value::from(1.0));
    assert_failure("fn f(x): 1\nfn g():\n    fn f(x, y): 2\n    0\nf 1 2");
}

#[test]
fn union_types_and_members() {
    let src = "type point: pt(x, y)\np: pt 3 4\np.x * p.y";
    assert_value(src, Value::from(12.0));
    assert_failure("type point: pt(x, y)\np: pt 3 4\np.z");
}

#[test]
fn member_of_none_is_error() {
    assert!(matches!(error_of("fn f(): if false then 1\n(f ()).x"),
                     LanguageError::Runtime(RuntimeError::MemberOfNone { .. })));
}

#[test]
fn calling_a_non_function_is_error() {
    assert!(matches!(error_of("x: 1\nx 2"),
                     LanguageError::Runtime(RuntimeError::NotCallable { .. })));
}

#[test]
fn division_by_zero_is_error() {
    assert!(matches!(error_of("x: 1 / 0"),
                     LanguageError::Runtime(RuntimeError::DivisionByZero { .. })));
    assert_failure("5 % 0");
}

#[test]
fn failed_assertion_is_error() {
    assert!(matches!(error_of("assert (1 = 2)"),
                     LanguageError::Runtime(RuntimeError::AssertionFailed { .. })));
}

#[test]
fn builtin_functions() {
    assert_value("abs (0 - 5)", Value::from(5.0));
    assert_value("sqrt 9", Value::from(3.0));
    assert_value("floor 3.7", Value::from(3.0));
    assert_value("min 3 4", Value::from(3.0));
    assert_value("max 3 4", Value::from(4.0));
    assert_value("length \"hello\"", Value::from(5.0));
    assert_value("string 42", Value::from("42"));
    assert_failure("sqrt (0 - 1)");
}

#[test]
fn inconsistent_indentation_is_error() {
    assert!(matches!(error_of("if true:\n    1\n  2"), LanguageError::Lexical(_)));
    assert!(matches!(error_of("x: 1\n    y: 2"),
                     LanguageError::Syntax(ParseError::UnexpectedIndentation { .. })));
}

#[test]
fn missing_block_is_error() {
    assert!(matches!(error_of("if true:\n1"),
                     LanguageError::Syntax(ParseError::EmptyStatementBlock { .. })));
}

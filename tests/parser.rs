use lilt::{
    error::{LanguageError, ParseError},
    parse_module,
};

fn parsed(src: &str, globals: &[&str]) -> String {
    match parse_module(src, globals) {
        Ok(module) => module.to_string(),
        Err(e) => panic!("Failed to parse {src:?}: {e}"),
    }
}

fn syntax_error(src: &str, globals: &[&str]) -> ParseError {
    match parse_module(src, globals) {
        Ok(module) => panic!("Parsed {src:?} as {module} but expected a syntax error"),
        Err(LanguageError::Syntax(e)) => e,
        Err(e) => panic!("Expected a syntax error for {src:?}, got: {e}"),
    }
}

#[test]
fn operator_precedence() {
    assert_eq!(parsed("1 + 2 * 3", &[]), "(+ 1 (* 2 3))");
    assert_eq!(parsed("1 - 2 - 3", &[]), "(- (- 1 2) 3)");
    assert_eq!(parsed("1 + 2 < 4 and true", &[]), "(and (< (+ 1 2) 4) true)");
    assert_eq!(parsed("not a = b", &["a", "b"]), "(not (= a b))");
    assert_eq!(parsed("- a * b", &["a", "b"]), "(* (- a) b)");
    assert_eq!(parsed("a.b.c", &["a"]), "(. (. a b) c)");
}

#[test]
fn parentheses_only_group() {
    assert_eq!(parsed("(1 + 2)", &[]), parsed("1 + 2", &[]));
    assert_eq!(parsed("((x))", &["x"]), "x");
}

#[test]
fn line_breaks_inside_parentheses_are_ignored() {
    assert_eq!(parsed("(1 +\n    2)", &[]), parsed("1 + 2", &[]));
    assert_eq!(parsed("f (g a,\n     b)", &["f", "g", "a", "b"]), "(call f (call g a b))");
    assert_eq!(parsed("twice (fn (v):\n    v * 3) 2", &["twice"]),
               parsed("twice (fn (v): v * 3) 2", &["twice"]));
    assert_eq!(parsed("(if a:\n    b\n    else c)", &["a", "b", "c"]),
               parsed("if a then b else c", &["a", "b", "c"]));
    assert_eq!(parsed("(1\n\n  + 2)", &[]), "(+ 1 2)");
}

#[test]
fn line_breaks_outside_parentheses_end_statements() {
    assert!(matches!(syntax_error("1 +\n    2", &[]),
                     ParseError::UnexpectedToken { .. }));
    assert_eq!(parsed("1\n2", &[]), "1\n2");
}

#[test]
fn juxtaposition_calls() {
    assert_eq!(parsed("f x y", &["f", "x", "y"]), "(call f x y)");
    assert_eq!(parsed("f x, y", &["f", "x", "y"]), "(call f x y)");
    assert_eq!(parsed("f x.y", &["f", "x"]), "(call f (. x y))");
    assert_eq!(parsed("f (g x) 1", &["f", "g", "x"]), "(call f (call g x) 1)");
    assert_eq!(parsed("f x + 1", &["f", "x"]), "(+ (call f x) 1)");
    assert_eq!(parsed("x.f 1", &["x"]), "(call (. x f) 1)");
}

#[test]
fn only_names_and_groups_can_be_called() {
    assert!(matches!(syntax_error("1 2", &[]), ParseError::InvalidCallHead { .. }));
    assert_eq!(parsed("(f) 2", &["f"]), "(call f 2)");
}

#[test]
fn zero_argument_call_forms_are_equivalent() {
    let expected = "(call foo)";
    assert_eq!(parsed("foo()", &["foo"]), expected);
    assert_eq!(parsed("foo ()", &["foo"]), expected);
    assert_eq!(parsed("foo ( )", &["foo"]), expected);
    assert_eq!(parsed("(foo ()) ()", &["foo"]), "(call (call foo))");
    assert_eq!(parsed("foo x ()", &["foo", "x"]), "(call foo (call x))");
}

#[test]
fn zero_argument_call_is_final() {
    assert!(matches!(syntax_error("foo () ()", &["foo"]),
                     ParseError::CallAfterZeroArgumentCall { .. }));
    assert!(matches!(syntax_error("foo () x", &["foo", "x"]),
                     ParseError::CallAfterZeroArgumentCall { .. }));
}

#[test]
fn named_flag_and_enum_arguments() {
    assert_eq!(parsed("foo -nmd 123 + 456", &["foo"]), "(+ (call foo -nmd=123) 456)");
    assert_eq!(parsed("foo 1 -quiet", &["foo"]), "(call foo 1 -quiet)");
    assert_eq!(parsed("foo -quiet -level 2", &["foo"]), "(call foo -quiet -level=2)");
    assert_eq!(parsed("foo -mode:fast", &["foo"]), "(call foo -mode:fast)");
}

#[test]
fn positional_after_named_is_rejected() {
    assert!(matches!(syntax_error("foo -verbose true x", &["foo", "x"]),
                     ParseError::PositionalAfterNamed { .. }));
    assert!(matches!(syntax_error("foo -verbose bar, x, y", &["foo", "bar", "x", "y"]),
                     ParseError::PositionalAfterNamed { .. }));
}

#[test]
fn comma_after_named_value_extends_it() {
    assert_eq!(parsed("foo -verbose bar, x", &["foo", "bar", "x"]),
               "(call foo -verbose=(call bar x))");
}

#[test]
fn enum_value_must_be_identifier() {
    assert!(matches!(syntax_error("foo -e:1", &["foo"]),
                     ParseError::EnumValueNotIdentifier { .. }));
    assert!(matches!(syntax_error("foo -e:\"s\"", &["foo"]),
                     ParseError::EnumValueNotIdentifier { .. }));
}

#[test]
fn flags_only_appear_in_calls() {
    assert!(matches!(syntax_error("x: -quiet", &[]), ParseError::FlagOutsideCall { .. }));
}

#[test]
fn bindings() {
    assert_eq!(parsed("x: 1", &[]), "(bind x 1)");
    assert_eq!(parsed("x: 1, y: x", &[]), "(bind x 1 y x)");
    assert_eq!(parsed("x: f 1, y: 2", &["f"]), "(bind x (call f 1) y 2)");
    assert_eq!(parsed("x: (f 1, 2)", &["f"]), "(bind x (call f 1 2))");
    assert!(matches!(syntax_error("1: 2", &[]), ParseError::InvalidBindingTarget { .. }));
}

#[test]
fn if_forms() {
    assert_eq!(parsed("if a then b", &["a", "b"]), "(if a {b})");
    assert_eq!(parsed("if a then b else c", &["a", "b", "c"]), "(if a {b} {c})");
    assert_eq!(parsed("if a:\n    b\n    c\nelse:\n    d", &["a", "b", "c", "d"]),
               "(if a {b; c} {d})");
    assert_eq!(parsed("if a then b else if c then d", &["a", "b", "c", "d"]),
               "(if a {b} {(if c {d})})");
}

#[test]
fn function_definitions() {
    assert_eq!(parsed("fn id(x): x", &[]), "(fn id (x) {x})");
    assert_eq!(parsed("fn f(a, -b = 2, -c: x | y = y): a", &[]),
               "(fn f (a -b=2 -c:x|y=\"y\") {a})");
    assert_eq!(parsed("fn f(n: number):\n    m: n\n    m", &[]),
               "(fn f (n:number) {(bind m n); m})");
    assert_eq!(parsed("g: fn (x): x", &[]), "(bind g (fn (x) {x}))");
    assert!(matches!(syntax_error("fn f(a, a): a", &[]),
                     ParseError::InvalidParameter { .. }));
}

#[test]
fn type_declarations() {
    assert_eq!(parsed("type t: a | b(x)", &[]), "(type t a() b(x))");
    assert_eq!(parsed("type t:\n    a\n    b(x, y)", &[]), "(type t a() b(x y))");
}

#[test]
fn blocks_need_indentation() {
    assert!(matches!(syntax_error("fn f():\nx", &["x"]),
                     ParseError::EmptyStatementBlock { .. }));
    assert!(matches!(syntax_error("x\n    y", &["x", "y"]),
                     ParseError::UnexpectedIndentation { .. }));
}

#[test]
fn statement_after_nested_block() {
    let src = "fn f(a):\n    if a:\n        1\n    else:\n        2\nf 1";
    assert_eq!(parsed(src, &[]), "(fn f (a) {(if a {1} {2})})\n(call f 1)");
}

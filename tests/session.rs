use std::collections::HashMap;

use lilt::{
    EvaluateOptions, Evaluation,
    error::{LanguageError, RuntimeError},
    evaluate,
    interpreter::{
        evaluator::{
            core::Interpreter,
            function::core::{BUILTIN_FUNCTIONS, prelude},
            scope::Scope,
        },
        value::core::Value,
    },
    parse_module,
};

/// Runs one entry against `scope`, the way the REPL does.
fn run_entry(source: &str, scope: Scope) -> Result<Evaluation, LanguageError> {
    let names: Vec<&str> = scope.global_names().collect();
    let module = parse_module(source, &names)?;
    evaluate(&module,
             EvaluateOptions { scope:           Some(scope),
                               initial_globals: HashMap::new(), })
}

fn session() -> Scope {
    Scope::with_globals(prelude())
}

#[test]
fn generic_instances_accumulate_across_entries() {
    let first = run_entry("fn describe(x: number): \"number\"", session()).unwrap();
    let second = run_entry("fn describe(x: string): \"string\"", first.scope).unwrap();

    let text = run_entry("describe \"a\"", second.scope.clone()).unwrap();
    assert_eq!(text.value, Value::from("string"));
    let number = run_entry("describe 1", second.scope).unwrap();
    assert_eq!(number.value, Value::from("number"));
}

#[test]
fn closures_outlive_their_entry() {
    let first = run_entry("fn adder(n): fn (x): x + n\nadd5: adder 5", session()).unwrap();
    let second = run_entry("add5 10", first.scope).unwrap();
    assert_eq!(second.value, Value::from(15.0));
}

#[test]
fn failed_entry_leaves_the_session_intact() {
    let first = run_entry("x: 41", session()).unwrap();

    let failed = run_entry("x: 0\n1 / 0", first.scope.clone());
    assert!(matches!(failed,
                     Err(LanguageError::Runtime(RuntimeError::DivisionByZero { .. }))));

    let next = run_entry("x + 1", first.scope).unwrap();
    assert_eq!(next.value, Value::from(42.0));
}

#[test]
fn if_without_else_is_none_when_false() {
    let module = parse_module("if x > y then z", &["x", "y", "z"]).unwrap();
    let globals = HashMap::from([("x".to_string(), Value::from(1.0)),
                                 ("y".to_string(), Value::from(2.0)),
                                 ("z".to_string(), Value::from(9.0))]);
    let options = EvaluateOptions { scope:           None,
                                    initial_globals: globals, };
    assert_eq!(evaluate(&module, options).unwrap().value, Value::None);
}

#[test]
fn dropped_closures_free_their_frames() {
    let src = "fn make(n): fn (): n\nfn spin(n):\n    f: make n\n    if n = 0 then f () else \
               spin (n - 1)\nspin 40";
    let first = run_entry(src, session()).unwrap();
    assert_eq!(first.value, Value::from(0.0));
    assert_eq!(first.scope.frame_count(), 1);

    let second = run_entry("spin 40", first.scope).unwrap();
    assert_eq!(second.scope.frame_count(), 1);
}

#[test]
fn local_functions_do_not_keep_their_frame() {
    let src = "fn outer(n):\n    fn helper(x): x + n\n    helper 1\nouter 1\nouter 2";
    let evaluation = run_entry(src, session()).unwrap();
    assert_eq!(evaluation.value, Value::from(3.0));
    assert_eq!(evaluation.scope.frame_count(), 1);
}

#[test]
fn reachable_closures_keep_their_frame() {
    let src = "fn make(n): fn (): n\nkeep: make 7";
    let first = run_entry(src, session()).unwrap();
    assert_eq!(first.scope.frame_count(), 2);

    let second = run_entry("keep ()", first.scope).unwrap();
    assert_eq!(second.value, Value::from(7.0));
    assert_eq!(second.scope.frame_count(), 2);
}

#[test]
fn call_depth_is_limited() {
    let module = parse_module("fn down(n): if n = 0 then 0 else down (n - 1)\ndown 20",
                              BUILTIN_FUNCTIONS).unwrap();

    let mut interpreter = Interpreter::new(session());
    interpreter.max_depth = 10;
    assert!(matches!(interpreter.eval_module(&module),
                     Err(RuntimeError::RecursionLimit { limit: 10, .. })));

    let mut interpreter = Interpreter::new(interpreter.into_scope());
    interpreter.max_depth = 30;
    assert_eq!(interpreter.eval_module(&module).unwrap(), Value::from(0.0));
}

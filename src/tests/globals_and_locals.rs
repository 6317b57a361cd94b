use crate::value::Value;

#[test]
fn global_round_trips_every_literal_type() {
  assert_global!("let x = 1\n", "x", Value::Int(1));
  let state = super::common::run("let x = 1.5\n");
  assert!(matches!(super::common::global(&state, "x"), Value::Float(f) if (*f - 1.5).abs() < f64::EPSILON));
  assert_global!("let x = \"hi\"\n", "x", Value::String(_));
  assert_global!("let x = 'a'\n", "x", Value::Char(b'a'));
  assert_global!("let x = true\n", "x", Value::Bool(true));
  assert_global!("let x = nil\n", "x", Value::Nil);
}

#[test]
fn reassigning_a_global_uses_set_global() {
  let src = "let x = 1\nx = 2\n";
  assert_global!(src, "x", Value::Int(2));
}

#[test]
fn assigning_an_undefined_global_is_a_runtime_error() {
  let err = super::common::run_err("x = 1\n");
  assert!(err.to_string().contains("nonexistent global"));
}

#[test]
fn reading_an_undefined_global_is_a_runtime_error() {
  let err = super::common::run_err("let x = y\n");
  assert!(err.to_string().contains("does not exist"));
}

#[test]
fn locals_inside_a_function_do_not_leak_to_globals() {
  let src = "function f():\n        let local = 1\nf()\n";
  let state = super::common::run(src);
  assert!(state.globals().get_str("local").is_none());
}

#[test]
fn duplicate_local_declaration_in_same_scope_is_a_compile_error() {
  let src = "function f():\n        let v = 1\n        let v = 2\n";
  let err = super::common::run_err(src);
  assert!(err.to_string().contains("already exists"));
}

#[test]
fn reading_a_local_in_its_own_initializer_is_a_compile_error() {
  let src = "function f():\n        let v = v\n";
  let err = super::common::run_err(src);
  assert!(err.to_string().contains("its own initializer"));
}

#[test]
fn two_hundred_fifty_six_locals_is_the_cap() {
  let mut src = String::from("function f():\n");
  for i in 0..300 {
    src.push_str(&format!("        let v{i} = 0\n"));
  }
  let err = super::common::run_err(&src);
  assert!(err.to_string().contains("Too many local"));
}

#[test]
fn function_parameters_are_locals() {
  let src = "function f(a):\n        a = a + 1\n        return a\nlet r = f(10)\n";
  assert_global!(src, "r", Value::Int(11));
}

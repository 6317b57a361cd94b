use crate::object::CFunction;
use crate::state::State;
use crate::value::Value;

fn state_with_math_table() -> State {
  let mut state = State::new();
  crate::builtins::install(&mut state);
  state.load_table(
    "math",
    &[(
      "double",
      CFunction::new(|state, argc| {
        if argc != 1 {
          return Err(crate::error::RuntimeError::new("double takes 1 argument"));
        }
        let n = state.as_int(-1).ok_or_else(|| crate::error::RuntimeError::new("expected int"))?;
        state.pop_value();
        state.push_int(n * 2);
        Ok(())
      }),
    )],
  );
  state
}

#[test]
fn field_access_on_a_host_table_reaches_its_method() {
  let mut state = state_with_math_table();
  state.execute_string("test", "let r = math.double(21)\n").unwrap();
  assert_eq!(state.globals().get_str("r").unwrap().as_int(), Some(42));
}

#[test]
fn missing_field_on_a_table_is_nil() {
  let mut state = state_with_math_table();
  state.execute_string("test", "let r = math.missing\n").unwrap();
  assert!(matches!(state.globals().get_str("r"), Some(Value::Nil)));
}

#[test]
fn indexing_a_non_table_value_is_a_type_error() {
  let err = super::common::run_err("let t = 5\nlet x = t.foo\n");
  assert!(err.to_string().contains("Cannot index non table objects"));
}

#[test]
fn indexing_nil_reports_its_type_name() {
  let err = super::common::run_err("let t = nil\nlet x = t.foo\n");
  assert!(err.to_string().contains("'nil'"));
}

#[test]
fn table_installed_as_a_global_is_visible_to_is_table() {
  let mut state = state_with_math_table();
  assert!(state.get_global("math"));
  assert!(state.is_table(-1));
}

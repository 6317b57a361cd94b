//! Shared harness for the integration tests in this module: run a snippet
//! of source through a fresh [`State`] and assert on the resulting
//! globals, the way `original_source`'s concrete scenarios (spec §8) are
//! phrased.

use crate::state::State;
use crate::value::Value;

pub fn run(src: &str) -> State {
  let mut state = State::new();
  crate::builtins::install(&mut state);
  state.execute_string("test", src).expect("expected script to execute successfully");
  state
}

pub fn run_err(src: &str) -> crate::error::Error {
  let mut state = State::new();
  crate::builtins::install(&mut state);
  state.execute_string("test", src).expect_err("expected script to fail")
}

pub fn global<'a>(state: &'a State, name: &str) -> &'a Value {
  state.globals().get_str(name).unwrap_or_else(|| panic!("global '{name}' was never defined"))
}

/// Asserts that running `$src` leaves global `$name` equal to `$expected`
/// under the given value pattern.
#[macro_export]
macro_rules! assert_global {
  ($src:expr, $name:expr, $pat:pat) => {{
    let state = $crate::tests::common::run($src);
    let value = $crate::tests::common::global(&state, $name);
    assert!(matches!(value, $pat), "global `{}` was {:?}", $name, value);
  }};
}

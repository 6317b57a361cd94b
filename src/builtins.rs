//! The `io` native library: `io.print` and `io.input`.
//!
//! Grounded in `original_source/src/stdlib/io.c`. The per-type print
//! formatting is carried over line for line; `io.input`'s reference
//! implementation reads into a 2-byte stack buffer (so it can only ever
//! return zero or one characters before "too long"), which is plainly an
//! accidental buffer size rather than a contractual limit, so this reads a
//! full line instead (see DESIGN.md).

use std::io::Write;

use crate::error::RuntimeError;
use crate::object::CFunction;
use crate::state::State;
use crate::value::Type;

fn print(state: &mut State, argc: u16) -> Result<(), RuntimeError> {
  if argc != 1 {
    return Err(RuntimeError::new("print only accepts 1 argument"));
  }
  match state.get_type(-1) {
    Type::Nil => println!("nil"),
    Type::Char => println!("{}", state.as_char(-1).unwrap() as char),
    Type::Bool => println!("{}", if state.as_bool(-1).unwrap() { "true" } else { "false" }),
    Type::Int => println!("{}", state.as_int(-1).unwrap()),
    Type::Float => println!("{}", state.as_float(-1).unwrap()),
    Type::String => println!("{}", state.as_str(-1).unwrap()),
    Type::Table => println!("<table>"),
    Type::Function => println!("<function>"),
    Type::CFunction => println!("<cfunction>"),
  }
  state.pop_value();
  state.push_nil();
  Ok(())
}

fn input(state: &mut State, argc: u16) -> Result<(), RuntimeError> {
  if argc != 0 {
    return Err(RuntimeError::new("io.input accepts no arguments"));
  }
  std::io::stdout().flush().ok();
  let mut line = String::new();
  match std::io::stdin().read_line(&mut line) {
    Ok(0) | Err(_) => return Err(RuntimeError::new("failed to read from stdin")),
    Ok(_) => {}
  }
  if line.ends_with('\n') {
    line.pop();
    if line.ends_with('\r') {
      line.pop();
    }
  }
  state.push_string(line);
  Ok(())
}

/// Registers the `io` table global on `state`, matching `io_bootstrap`.
pub fn install(state: &mut State) {
  state.load_table(
    "io",
    &[("print", CFunction::new(print)), ("input", CFunction::new(input))],
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn io_table_is_installed_under_global() {
    let mut state = State::new();
    install(&mut state);
    assert!(state.get_global("io"));
    assert!(state.is_table(-1));
  }

  #[test]
  fn print_called_through_the_vm_leaves_no_net_stack_items() {
    let mut state = State::new();
    install(&mut state);
    state.execute_string("test", "io.print(\"hi\")\n").unwrap();
  }
}

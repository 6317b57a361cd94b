use crate::value::Value;

#[test]
fn int_plus_int_is_int() {
  assert_global!("let x = 1 + 2\n", "x", Value::Int(3));
}

#[test]
fn int_plus_float_promotes_to_float() {
  let state = super::common::run("let x = 1 + 2.0\n");
  let x = super::common::global(&state, "x");
  assert!(matches!(x, Value::Float(f) if (*f - 3.0).abs() < f64::EPSILON));
}

#[test]
fn subtraction_reads_both_operands() {
  // This is the reference's known bug: arithmetic ops must read the right
  // operand, not re-read the left one. `5 - 2` would be `5 - 5 = 0` if the
  // bug were reproduced.
  assert_global!("let x = 5 - 2\n", "x", Value::Int(3));
}

#[test]
fn division_reads_both_operands() {
  assert_global!("let x = 10 / 2\n", "x", Value::Int(5));
}

#[test]
fn division_by_zero_is_a_runtime_error() {
  let err = super::common::run_err("let x = 1 / 0\n");
  assert!(err.to_string().contains("divide by zero"));
}

#[test]
fn power_of_ints_stays_int() {
  assert_global!("let x = 2 ** 10\n", "x", Value::Int(1024));
}

#[test]
fn unary_negate_int_and_float() {
  assert_global!("let x = -5\n", "x", Value::Int(-5));
  let state = super::common::run("let y = -5.5\n");
  let y = super::common::global(&state, "y");
  assert!(matches!(y, Value::Float(f) if (*f + 5.5).abs() < f64::EPSILON));
}

#[test]
fn bitwise_ops_on_ints() {
  assert_global!("let x = 6 & 3\n", "x", Value::Int(2));
  assert_global!("let x = 6 | 1\n", "x", Value::Int(7));
  assert_global!("let x = 6 ^ 3\n", "x", Value::Int(5));
  assert_global!("let x = 1 << 4\n", "x", Value::Int(16));
  assert_global!("let x = 16 >> 2\n", "x", Value::Int(4));
  assert_global!("let x = ~0\n", "x", Value::Int(-1));
}

#[test]
fn arithmetic_type_error_on_non_numeric_operand() {
  let err = super::common::run_err("let x = 1 + nil\n");
  assert!(err.to_string().contains("Invalid operands"));
}

#[test]
fn parenthesized_expression_matches_unparenthesized() {
  assert_global!("let x = (((1 + 2)))\n", "x", Value::Int(3));
}

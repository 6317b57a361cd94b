use crate::value::Value;

#[test]
fn nil_is_falsy() {
  assert_global!("let x = !nil\n", "x", Value::Bool(true));
}

#[test]
fn false_is_falsy_true_is_truthy() {
  assert_global!("let x = !false\n", "x", Value::Bool(true));
  assert_global!("let x = !true\n", "x", Value::Bool(false));
}

#[test]
fn zero_int_and_zero_float_are_truthy() {
  // Que follows the reference's truthiness table exactly: only nil and
  // false are falsy, unlike languages where 0 is also falsy.
  assert_global!("let x = !0\n", "x", Value::Bool(false));
  assert_global!("let x = !0.0\n", "x", Value::Bool(false));
}

#[test]
fn empty_string_is_truthy() {
  assert_global!("let x = !\"\"\n", "x", Value::Bool(false));
}

#[test]
fn not_does_negate_unlike_reference_bug() {
  // The reference's OP_NOT just re-pushes truthiness without negating; this
  // is not reproduced, so `!true` must be `false` and `!false` must be `true`.
  assert_global!("let x = !true\n", "x", Value::Bool(false));
}

#[test]
fn and_or_combine_truthiness_into_a_bool() {
  assert_global!("let x = false && 1\n", "x", Value::Bool(false));
  assert_global!("let x = 0 || 5\n", "x", Value::Bool(true));
  assert_global!("let x = true && false\n", "x", Value::Bool(false));
}

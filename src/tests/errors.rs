#[test]
fn only_the_first_compile_error_is_surfaced() {
  // Two unrelated mistakes on two lines; panic-mode recovery means only
  // the first is ever reported, never a cascade.
  let src = "let 1 = 2\nlet 3 = 4\n";
  let err = super::common::run_err(src);
  match err {
    crate::error::Error::Compile(e) => assert!(e.message.contains("identifier")),
    other => panic!("expected a compile error, got {other:?}"),
  }
}

#[test]
fn compile_error_prevents_any_bytecode_from_running() {
  let src = "let 1 = 2\nio.print(\"should never run\")\n";
  let err = super::common::run_err(src);
  assert!(matches!(err, crate::error::Error::Compile(_)));
}

#[test]
fn runtime_error_is_distinguished_from_compile_error() {
  let err = super::common::run_err("let x = 1 / 0\n");
  assert!(matches!(err, crate::error::Error::Runtime(_)));
}

#[test]
fn compile_error_report_uses_filename_line_and_column() {
  let src = "let 1 = 2\n";
  let err = super::common::run_err(src);
  let report = err.report("myscript.que", src).to_string();
  assert!(report.starts_with("myscript.que:1:"));
}

#[test]
fn runtime_error_report_uses_the_bang_prefix() {
  let err = super::common::run_err("let x = 1 / 0\n");
  let report = err.report("myscript.que", "let x = 1 / 0\n").to_string();
  assert!(report.starts_with("[!]"));
}

#[test]
fn unexpected_character_is_a_lexer_error_surfaced_at_compile_time() {
  let err = super::common::run_err("let x = 1 $ 2\n");
  assert!(matches!(err, crate::error::Error::Compile(_)));
}

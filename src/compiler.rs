//! Single-pass, recursive-descent compiler: tokens in, a [`FunctionObj`]
//! carrying a finished [`Chunk`] out. There is no intermediate AST — every
//! parse function emits directly into the current frame's chunk, exactly
//! the same shape as `original_source/src/parser.c`'s `parse_*` family.
//!
//! Grammar and precedence are grounded in that file; local-variable
//! resolution (`resolve_local`/`declare_local`), `if`/`while` compilation,
//! and the `(args)` call syntax are filled in per the language spec, which
//! that source's parser only partially implements (it declares a `Local`
//! array it never uses for `let`, and leaves `if`/`while` as `assert(0)`).

use std::rc::Rc;

use span::Span;

use crate::error::CompileError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::object::FunctionObj;
use crate::op::Op;
use crate::value::Value;

const MAX_LOCALS: usize = 256;

struct Local {
  name: String,
  /// `-1` while the initializer is still being compiled (guards against
  /// `let x = x`); set to the owning scope's depth once initialized.
  depth: i32,
}

#[derive(PartialEq, Eq)]
enum FrameKind {
  Script,
  Function,
}

struct Frame {
  kind: FrameKind,
  function: FunctionObj,
  locals: Vec<Local>,
  scope_depth: i32,
}

impl Frame {
  fn new(kind: FrameKind, name: impl Into<Rc<str>>, arity: u16) -> Self {
    Frame {
      kind,
      function: FunctionObj::new(name, arity),
      // slot 0 is reserved for the callee itself.
      locals: vec![Local {
        name: String::new(),
        depth: 0,
      }],
      scope_depth: 0,
    }
  }
}

pub struct Compiler<'src> {
  lexer: Lexer<'src>,
  src: &'src str,
  filename: String,
  previous: Token,
  current: Token,
  had_error: bool,
  panic_mode: bool,
  error: Option<CompileError>,
  frames: Vec<Frame>,
}

pub fn compile(filename: &str, src: &str) -> Result<Rc<FunctionObj>, CompileError> {
  let mut compiler = Compiler::new(filename, src);
  compiler.run()
}

impl<'src> Compiler<'src> {
  fn new(filename: &str, src: &'src str) -> Self {
    let mut lexer = Lexer::new(src);
    let current = lexer.next();
    Compiler {
      lexer,
      src,
      filename: filename.to_string(),
      previous: current,
      current,
      had_error: false,
      panic_mode: false,
      error: None,
      frames: vec![Frame::new(FrameKind::Script, filename, 0)],
    }
  }

  fn run(mut self) -> Result<Rc<FunctionObj>, CompileError> {
    while !self.check(TokenKind::Eof) {
      self.declaration();
    }
    let function = self.end_frame();
    match self.error {
      Some(err) => Err(err),
      None => Ok(Rc::new(function)),
    }
  }

  // --- token plumbing -----------------------------------------------

  fn advance(&mut self) {
    self.previous = self.current;
    loop {
      self.current = self.lexer.next();
      if self.current.kind != TokenKind::Error {
        break;
      }
      let msg = self.current.error.unwrap_or("invalid token");
      self.error_at(self.current.span, msg);
    }
  }

  fn check(&self, kind: TokenKind) -> bool {
    self.current.kind == kind
  }

  fn matches(&mut self, kind: TokenKind) -> bool {
    if self.check(kind) {
      self.advance();
      true
    } else {
      false
    }
  }

  fn consume(&mut self, kind: TokenKind, message: &str) {
    if self.check(kind) {
      self.advance();
    } else {
      self.error_at(self.current.span, message);
    }
  }

  fn lexeme(&self, token: Token) -> &'src str {
    &self.src[token.span.range()]
  }

  /// Reports a compile error. Only the first is ever surfaced; the panic
  /// flag keeps the parser from producing a cascade while it still
  /// consumes tokens looking for a recognizable place to resume.
  fn error_at(&mut self, span: Span, message: impl Into<String>) {
    if self.panic_mode {
      return;
    }
    self.panic_mode = true;
    if !self.had_error {
      self.had_error = true;
      self.error = Some(CompileError::new(span, message.into()));
    }
  }

  // --- frame / scope --------------------------------------------------

  fn frame(&mut self) -> &mut Frame {
    self.frames.last_mut().unwrap()
  }

  fn chunk_write_op(&mut self, op: Op) -> usize {
    self.frame().function.chunk.write_op(op)
  }

  fn chunk_write_op_arg(&mut self, op: Op, arg: u16) {
    self.frame().function.chunk.write_op_arg(op, arg)
  }

  fn make_constant(&mut self, value: Value) -> u16 {
    self.frame().function.chunk.write_constant(value)
  }

  fn begin_scope(&mut self) {
    self.frame().scope_depth += 1;
  }

  /// Mirrors the reference: only the depth counter moves. Locals declared
  /// in the exited scope stay in the locals table (and keep their slot)
  /// for the rest of the function, so they are never popped off the value
  /// stack either — there is no opcode for it. This does waste a slot per
  /// nested declaration but matches observable behavior of the source.
  fn end_scope(&mut self) {
    self.frame().scope_depth -= 1;
  }

  fn end_frame(&mut self) -> FunctionObj {
    self.chunk_write_op(Op::Return);
    let frame = self.frames.pop().unwrap();
    frame.function
  }

  fn declare_local(&mut self, name: &str, span: Span) {
    let frame = self.frames.last_mut().unwrap();
    if frame.locals.len() >= MAX_LOCALS {
      self.error_at(span, "Too many local variables in function");
      return;
    }
    let current_depth = frame.scope_depth;
    for local in frame.locals.iter().rev() {
      if local.depth != -1 && local.depth < current_depth {
        break;
      }
      if local.name == name {
        self.error_at(span, format!("a variable already exists with the name {name} in this scope"));
        return;
      }
    }
    self.frames.last_mut().unwrap().locals.push(Local {
      name: name.to_string(),
      depth: -1,
    });
  }

  fn mark_initialized(&mut self) {
    let frame = self.frames.last_mut().unwrap();
    let depth = frame.scope_depth;
    frame.locals.last_mut().unwrap().depth = depth;
  }

  /// Walks the current frame's locals top-down; `None` means "treat as
  /// global". `Some(Err)` means the name resolved to an uninitialized
  /// local (reading a variable from inside its own initializer).
  fn resolve_local(&self, name: &str) -> Option<Result<u16, ()>> {
    let frame = self.frames.last().unwrap();
    for (slot, local) in frame.locals.iter().enumerate().rev() {
      if local.name == name {
        return Some(if local.depth == -1 { Err(()) } else { Ok(slot as u16) });
      }
    }
    None
  }

  // --- expressions ------------------------------------------------------

  fn expression(&mut self) {
    self.and_or();
  }

  fn and_or(&mut self) {
    self.bitwise_and_or_xor();
    loop {
      if self.matches(TokenKind::AmpAmp) {
        self.bitwise_and_or_xor();
        self.chunk_write_op(Op::And);
      } else if self.matches(TokenKind::PipePipe) {
        self.bitwise_and_or_xor();
        self.chunk_write_op(Op::Or);
      } else {
        break;
      }
    }
  }

  fn bitwise_and_or_xor(&mut self) {
    self.comparison();
    loop {
      if self.matches(TokenKind::Amp) {
        self.comparison();
        self.chunk_write_op(Op::BAnd);
      } else if self.matches(TokenKind::Pipe) {
        self.comparison();
        self.chunk_write_op(Op::BOr);
      } else if self.matches(TokenKind::Caret) {
        self.comparison();
        self.chunk_write_op(Op::BXor);
      } else {
        break;
      }
    }
  }

  fn comparison(&mut self) {
    self.shift();
    loop {
      if self.matches(TokenKind::EqualEqual) {
        self.shift();
        self.chunk_write_op(Op::Eq);
      } else if self.matches(TokenKind::BangEqual) {
        self.shift();
        self.chunk_write_op(Op::Eq);
        self.chunk_write_op(Op::Not);
      } else if self.matches(TokenKind::Greater) {
        self.shift();
        self.chunk_write_op(Op::Gr);
      } else if self.matches(TokenKind::GreaterEqual) {
        self.shift();
        self.chunk_write_op(Op::GrEq);
      } else if self.matches(TokenKind::Less) {
        self.shift();
        self.chunk_write_op(Op::Le);
      } else if self.matches(TokenKind::LessEqual) {
        self.shift();
        self.chunk_write_op(Op::LeEq);
      } else {
        break;
      }
    }
  }

  fn shift(&mut self) {
    self.add_subtract();
    loop {
      if self.matches(TokenKind::LShift) {
        self.add_subtract();
        self.chunk_write_op(Op::LShift);
      } else if self.matches(TokenKind::RShift) {
        self.add_subtract();
        self.chunk_write_op(Op::RShift);
      } else {
        break;
      }
    }
  }

  fn add_subtract(&mut self) {
    self.multiply_divide();
    loop {
      if self.matches(TokenKind::Plus) {
        self.multiply_divide();
        self.chunk_write_op(Op::Add);
      } else if self.matches(TokenKind::Minus) {
        self.multiply_divide();
        self.chunk_write_op(Op::Sub);
      } else {
        break;
      }
    }
  }

  fn multiply_divide(&mut self) {
    self.prefix();
    loop {
      if self.matches(TokenKind::Star) {
        self.prefix();
        self.chunk_write_op(Op::Mul);
      } else if self.matches(TokenKind::StarStar) {
        self.prefix();
        self.chunk_write_op(Op::Pow);
      } else if self.matches(TokenKind::Slash) {
        self.prefix();
        self.chunk_write_op(Op::Div);
      } else {
        break;
      }
    }
  }

  fn prefix(&mut self) {
    if self.matches(TokenKind::Bang) {
      self.prefix();
      self.chunk_write_op(Op::Not);
    } else if self.matches(TokenKind::Tilde) {
      self.prefix();
      self.chunk_write_op(Op::BNot);
    } else if self.matches(TokenKind::Minus) {
      self.prefix();
      self.chunk_write_op(Op::Negate);
    } else {
      self.access_call();
    }
  }

  fn access_call(&mut self) {
    self.primary();
    loop {
      if self.matches(TokenKind::Dot) {
        let name_token = self.current;
        self.consume(TokenKind::Identifier, "expected identifier for table field");
        let field = self.lexeme(name_token).to_string();
        let k = self.make_constant(Value::string(field));
        self.chunk_write_op_arg(Op::Push, k);
        self.chunk_write_op(Op::TableGet);
      } else if self.matches(TokenKind::LeftParen) {
        let mut argc: u16 = 0;
        if !self.check(TokenKind::RightParen) {
          loop {
            self.expression();
            argc += 1;
            if !self.matches(TokenKind::Comma) {
              break;
            }
          }
        }
        self.consume(TokenKind::RightParen, "expected ')' after arguments");
        self.chunk_write_op_arg(Op::Call, argc);
      } else {
        break;
      }
    }
  }

  fn primary(&mut self) {
    if self.matches(TokenKind::Int) {
      let text = self.lexeme(self.previous);
      let v = text.parse::<i64>().unwrap_or(0);
      let k = self.make_constant(Value::Int(v));
      self.chunk_write_op_arg(Op::Push, k);
    } else if self.matches(TokenKind::Float) {
      let text = self.lexeme(self.previous);
      let v = text.parse::<f64>().unwrap_or(0.0);
      let k = self.make_constant(Value::Float(v));
      self.chunk_write_op_arg(Op::Push, k);
    } else if self.matches(TokenKind::String) {
      let text = self.lexeme(self.previous).to_string();
      let k = self.make_constant(Value::string(text));
      self.chunk_write_op_arg(Op::Push, k);
    } else if self.matches(TokenKind::Char) {
      let text = self.lexeme(self.previous);
      let c = text.as_bytes().first().copied().unwrap_or(0);
      let k = self.make_constant(Value::Char(c));
      self.chunk_write_op_arg(Op::Push, k);
    } else if self.matches(TokenKind::True) {
      self.chunk_write_op(Op::PushTrue);
    } else if self.matches(TokenKind::False) {
      self.chunk_write_op(Op::PushFalse);
    } else if self.matches(TokenKind::Nil) {
      self.chunk_write_op(Op::PushNil);
    } else if self.matches(TokenKind::LeftParen) {
      self.expression();
      self.consume(TokenKind::RightParen, "expected ')' after expression");
    } else if self.matches(TokenKind::Identifier) {
      self.identifier_expr();
    } else {
      self.error_at(self.current.span, "unexpected token");
      self.advance();
    }
  }

  fn identifier_expr(&mut self) {
    let name_token = self.previous;
    let name = self.lexeme(name_token).to_string();

    if self.matches(TokenKind::Equal) {
      self.expression();
      self.emit_assignment(&name, name_token.span);
      return;
    }

    match self.resolve_local(&name) {
      Some(Ok(slot)) => self.chunk_write_op_arg(Op::GetLocal, slot),
      Some(Err(())) => {
        self.error_at(name_token.span, format!("can't read local variable '{name}' in its own initializer"));
      }
      None => {
        let k = self.make_constant(Value::string(name));
        self.chunk_write_op_arg(Op::GetGlobal, k);
      }
    }
  }

  fn emit_assignment(&mut self, name: &str, span: Span) {
    match self.resolve_local(name) {
      Some(Ok(slot)) => self.chunk_write_op_arg(Op::SetLocal, slot),
      Some(Err(())) => {
        self.error_at(span, format!("can't assign to '{name}' while it is still initializing"));
      }
      None => {
        let k = self.make_constant(Value::string(name.to_string()));
        self.chunk_write_op_arg(Op::SetGlobal, k);
      }
    }
  }

  // --- declarations / statements -----------------------------------------

  fn declaration(&mut self) {
    if self.matches(TokenKind::Let) {
      self.var_declaration();
    } else if self.matches(TokenKind::Function) {
      self.function_declaration();
    } else {
      self.statement();
    }
    if self.panic_mode {
      self.synchronize();
    }
  }

  /// After an error, skip tokens until something that plausibly starts a
  /// new declaration, so one mistake doesn't cascade into a wall of
  /// spurious diagnostics (only the first of which would be shown anyway).
  fn synchronize(&mut self) {
    self.panic_mode = false;
    while !self.check(TokenKind::Eof) {
      if self.previous.kind == TokenKind::Eol {
        return;
      }
      match self.current.kind {
        TokenKind::Let | TokenKind::Function | TokenKind::If | TokenKind::While | TokenKind::Return => return,
        _ => self.advance(),
      }
    }
  }

  fn var_declaration(&mut self) {
    let name_token = self.current;
    self.consume(TokenKind::Identifier, "expected identifier for variable");
    let name = self.lexeme(name_token).to_string();

    let is_function_scope = self.frames.last().unwrap().kind == FrameKind::Function;
    if is_function_scope {
      self.declare_local(&name, name_token.span);
    }

    if self.matches(TokenKind::Equal) {
      self.expression();
    } else {
      self.chunk_write_op(Op::PushNil);
    }
    self.consume(TokenKind::Eol, "expected newline after variable declaration");

    if is_function_scope {
      self.mark_initialized();
    } else {
      let k = self.make_constant(Value::string(name));
      self.chunk_write_op_arg(Op::DefineGlobal, k);
    }
  }

  fn function_declaration(&mut self) {
    let name_token = self.current;
    self.consume(TokenKind::Identifier, "expected function identifier");
    let name = self.lexeme(name_token).to_string();

    let mut params = Vec::new();
    self.consume(TokenKind::LeftParen, "expected '(' after function name");
    if !self.check(TokenKind::RightParen) {
      loop {
        let p = self.current;
        self.consume(TokenKind::Identifier, "expected identifier for parameter");
        params.push(self.lexeme(p).to_string());
        if !self.matches(TokenKind::Comma) {
          break;
        }
      }
    }
    self.consume(TokenKind::RightParen, "expected ')' after parameters");
    self.consume(TokenKind::Colon, "expected ':'");
    self.consume(TokenKind::Eol, "expected newline after function signature");
    self.consume(TokenKind::Indent, "expected indent after function");

    self.frames.push(Frame::new(FrameKind::Function, name.clone(), params.len() as u16));
    for p in &params {
      self.declare_local(p, name_token.span);
      self.mark_initialized();
    }

    while !self.matches(TokenKind::Dedent) && !self.check(TokenKind::Eof) {
      self.declaration();
    }

    let function = self.end_frame();
    let k_func = self.make_constant(Value::Function(Rc::new(function)));
    self.chunk_write_op_arg(Op::Push, k_func);
    let k_name = self.make_constant(Value::string(name));
    self.chunk_write_op_arg(Op::DefineGlobal, k_name);
  }

  fn if_statement(&mut self) {
    self.expression();
    self.consume(TokenKind::Colon, "expected ':' after if condition");
    self.consume(TokenKind::Eol, "expected newline after ':'");
    self.consume(TokenKind::Indent, "expected indent after 'if'");

    self.chunk_write_op_arg(Op::JumpIfFalse, 0xffff);
    let then_jump = self.frame().function.chunk.len() - 2;

    self.begin_scope();
    while !self.matches(TokenKind::Dedent) && !self.check(TokenKind::Eof) {
      self.declaration();
    }
    self.end_scope();

    self.chunk_write_op_arg(Op::Jump, 0xffff);
    let else_jump = self.frame().function.chunk.len() - 2;
    self.patch_jump(then_jump);

    if self.matches(TokenKind::Else) {
      self.consume(TokenKind::Colon, "expected ':' after else");
      self.consume(TokenKind::Eol, "expected newline after ':'");
      self.consume(TokenKind::Indent, "expected indent after 'else'");
      self.begin_scope();
      while !self.matches(TokenKind::Dedent) && !self.check(TokenKind::Eof) {
        self.declaration();
      }
      self.end_scope();
    }
    self.patch_jump(else_jump);
  }

  fn while_statement(&mut self) {
    let loop_start = self.frame().function.chunk.len();
    self.expression();
    self.consume(TokenKind::Colon, "expected ':' after while condition");
    self.consume(TokenKind::Eol, "expected newline after ':'");
    self.consume(TokenKind::Indent, "expected indent after 'while'");

    self.chunk_write_op_arg(Op::JumpIfFalse, 0xffff);
    let exit_jump = self.frame().function.chunk.len() - 2;

    self.begin_scope();
    while !self.matches(TokenKind::Dedent) && !self.check(TokenKind::Eof) {
      self.declaration();
    }
    self.end_scope();

    // JUMP's operand is an absolute chunk offset, not a relative delta, so
    // jumping back to re-evaluate the condition is just "jump to where we
    // started".
    self.chunk_write_op_arg(Op::Jump, loop_start as u16);
    self.patch_jump(exit_jump);
  }

  /// Patches the jump operand written at `offset` to land on the
  /// instruction immediately following the current one.
  fn patch_jump(&mut self, offset: usize) {
    let target = self.frame().function.chunk.len() as u16;
    self.frame().function.chunk.patch_word(offset, target);
  }

  fn block_statement(&mut self) {
    self.begin_scope();
    while !self.matches(TokenKind::Dedent) && !self.check(TokenKind::Eof) {
      self.declaration();
    }
    self.end_scope();
  }

  fn expression_statement(&mut self) {
    self.expression();
    self.consume(TokenKind::Eol, "expected newline after expression");
    self.chunk_write_op(Op::Pop);
  }

  fn return_statement(&mut self) {
    self.expression();
    self.consume(TokenKind::Eol, "expected newline after return value");
    self.chunk_write_op(Op::Return);
  }

  fn statement(&mut self) {
    if self.matches(TokenKind::While) {
      self.while_statement();
    } else if self.matches(TokenKind::If) {
      self.if_statement();
    } else if self.matches(TokenKind::Return) {
      self.return_statement();
    } else if self.matches(TokenKind::Indent) {
      self.block_statement();
    } else if self.matches(TokenKind::Eol) {
      // empty statement
    } else {
      self.expression_statement();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn compile_ok(src: &str) -> Rc<FunctionObj> {
    compile("test", src).expect("expected successful compile")
  }

  #[test]
  fn simple_let_defines_global() {
    let f = compile_ok("let x = 1 + 2\n");
    assert!(f.chunk.code.contains(&(Op::DefineGlobal as u8)));
  }

  #[test]
  fn duplicate_local_in_same_scope_errors() {
    let src = "function f():\n        let x = 1\n        let x = 2\n";
    let err = compile("test", src).unwrap_err();
    assert!(err.message.contains("already exists"));
  }

  #[test]
  fn too_many_locals_errors() {
    let mut src = String::from("function f():\n");
    for i in 0..300 {
      src.push_str(&format!("        let v{i} = 0\n"));
    }
    let err = compile("test", &src).unwrap_err();
    assert!(err.message.contains("Too many local"));
  }

  #[test]
  fn function_declaration_emits_define_global() {
    let f = compile_ok("function f(a, b):\n        return a + b\n");
    assert!(f.chunk.code.contains(&(Op::DefineGlobal as u8)));
  }
}

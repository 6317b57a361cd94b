//! Hand-written lexer: character stream in, token stream out.
//!
//! The one piece of state that makes this more than a flat scanner is the
//! indent stack, which synthesizes `Indent`/`Dedent` tokens the way Python's
//! tokenizer does, so the compiler never has to look at raw whitespace.

use span::Span;

pub const INDENT_WIDTH: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
  // Punctuation
  LeftParen,
  RightParen,
  LeftBracket,
  RightBracket,
  Comma,
  Colon,
  Dot,

  // Operators
  Plus,
  Minus,
  Star,
  StarStar,
  Slash,
  LShift,
  RShift,
  Greater,
  GreaterEqual,
  Less,
  LessEqual,
  Amp,
  Pipe,
  Caret,
  Tilde,
  AmpAmp,
  PipePipe,
  Bang,
  EqualEqual,
  BangEqual,

  // Assignment
  Equal,

  // Keywords
  Function,
  Let,
  Return,
  While,
  Break,
  Continue,
  If,
  Else,
  Nil,
  True,
  False,

  // Literals
  Int,
  Float,
  Char,
  String,
  Identifier,

  // Structural
  Indent,
  Dedent,
  Eol,
  Eof,

  // Diagnostic
  Error,
}

#[derive(Clone, Copy, Debug)]
pub struct Token {
  pub kind: TokenKind,
  pub span: Span,
  /// Set only on `TokenKind::Error` tokens.
  pub error: Option<&'static str>,
}

impl Token {
  fn simple(kind: TokenKind, span: Span) -> Token {
    Token {
      kind,
      span,
      error: None,
    }
  }

  fn error(span: Span, message: &'static str) -> Token {
    Token {
      kind: TokenKind::Error,
      span,
      error: Some(message),
    }
  }
}

pub struct Lexer<'src> {
  src: &'src [u8],
  start: usize,
  current: usize,

  at_line_begin: bool,
  indents: Vec<usize>,
  pending_dedents: usize,
  eof_dedented: bool,
}

impl<'src> Lexer<'src> {
  pub fn new(src: &'src str) -> Self {
    Lexer {
      src: src.as_bytes(),
      start: 0,
      current: 0,
      at_line_begin: true,
      indents: vec![0],
      pending_dedents: 0,
      eof_dedented: false,
    }
  }

  fn is_at_end(&self) -> bool {
    self.current >= self.src.len()
  }

  fn peek(&self) -> u8 {
    if self.is_at_end() {
      0
    } else {
      self.src[self.current]
    }
  }

  fn peek_next(&self) -> u8 {
    if self.current + 1 >= self.src.len() {
      0
    } else {
      self.src[self.current + 1]
    }
  }

  fn advance(&mut self) -> u8 {
    let c = self.peek();
    self.current += 1;
    c
  }

  fn matches(&mut self, expected: u8) -> bool {
    if self.peek() == expected {
      self.advance();
      true
    } else {
      false
    }
  }

  fn span(&self) -> Span {
    (self.start..self.current).into()
  }

  fn simple(&self, kind: TokenKind) -> Token {
    Token::simple(kind, self.span())
  }

  /// Handles the start of a new line. Returns `Some` if an `Indent`,
  /// `Dedent`, or `Error` token was produced; `None` if the indentation is
  /// unchanged and the caller should continue lexing the rest of the line.
  fn lex_indentation(&mut self) -> Option<Token> {
    let mut spaces = 0usize;
    while self.peek() == b' ' {
      self.advance();
      spaces += 1;
    }

    if spaces % INDENT_WIDTH != 0 {
      return Some(Token::error(self.span(), "invalid number of spaces for indent"));
    }
    let level = spaces / INDENT_WIDTH;
    let top = *self.indents.last().unwrap();

    match level.cmp(&top) {
      std::cmp::Ordering::Greater => {
        self.indents.push(level);
        Some(self.simple(TokenKind::Indent))
      }
      std::cmp::Ordering::Less => {
        let mut popped = 0;
        while *self.indents.last().unwrap() > level {
          self.indents.pop();
          popped += 1;
        }
        self.pending_dedents = popped - 1;
        Some(self.simple(TokenKind::Dedent))
      }
      std::cmp::Ordering::Equal => None,
    }
  }

  fn string(&mut self) -> Token {
    loop {
      match self.advance() {
        b'\\' => {
          self.advance();
        }
        b'"' | 0 => break,
        _ => {}
      }
    }
    let span = Span {
      start: self.start + 1,
      end: self.current - 1,
    };
    Token::simple(TokenKind::String, span)
  }

  fn char_literal(&mut self) -> Token {
    self.advance();
    if !self.matches(b'\'') {
      return Token::error(self.span(), "expected ' after char");
    }
    let span = Span {
      start: self.start + 1,
      end: self.current - 1,
    };
    Token::simple(TokenKind::Char, span)
  }

  fn number(&mut self) -> Token {
    while self.peek().is_ascii_digit() {
      self.advance();
    }
    if self.peek() != b'.' || !self.peek_next().is_ascii_digit() {
      return self.simple(TokenKind::Int);
    }
    self.advance();
    while self.peek().is_ascii_digit() {
      self.advance();
    }
    self.simple(TokenKind::Float)
  }

  fn identifier(&mut self) -> Token {
    while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
      self.advance();
    }
    let lexeme = &self.src[self.start..self.current];
    self.simple(keyword_or_identifier(lexeme))
  }

  pub fn next(&mut self) -> Token {
    if self.pending_dedents > 0 {
      self.pending_dedents -= 1;
      self.start = self.current;
      return self.simple(TokenKind::Dedent);
    }

    if self.at_line_begin {
      self.start = self.current;
      if let Some(tok) = self.lex_indentation() {
        self.at_line_begin = false;
        return tok;
      }
      self.at_line_begin = false;
    }

    while matches!(self.peek(), b' ' | b'\r' | b'\t') {
      self.advance();
    }
    self.start = self.current;

    if self.is_at_end() {
      if !self.eof_dedented {
        self.eof_dedented = true;
        if self.indents.len() > 1 {
          let popped = self.indents.len() - 1;
          self.indents.truncate(1);
          self.pending_dedents = popped - 1;
          return self.simple(TokenKind::Dedent);
        }
      }
      return self.simple(TokenKind::Eof);
    }

    let c = self.advance();
    match c {
      b'(' => self.simple(TokenKind::LeftParen),
      b')' => self.simple(TokenKind::RightParen),
      b'[' => self.simple(TokenKind::LeftBracket),
      b']' => self.simple(TokenKind::RightBracket),
      b',' => self.simple(TokenKind::Comma),
      b'.' => self.simple(TokenKind::Dot),
      b':' => self.simple(TokenKind::Colon),
      b'+' => self.simple(TokenKind::Plus),
      b'-' => self.simple(TokenKind::Minus),
      b'*' => {
        let kind = if self.matches(b'*') { TokenKind::StarStar } else { TokenKind::Star };
        self.simple(kind)
      }
      b'/' => self.simple(TokenKind::Slash),
      b'>' => {
        let kind = if self.matches(b'>') {
          TokenKind::RShift
        } else if self.matches(b'=') {
          TokenKind::GreaterEqual
        } else {
          TokenKind::Greater
        };
        self.simple(kind)
      }
      b'<' => {
        let kind = if self.matches(b'<') {
          TokenKind::LShift
        } else if self.matches(b'=') {
          TokenKind::LessEqual
        } else {
          TokenKind::Less
        };
        self.simple(kind)
      }
      b'&' => {
        let kind = if self.matches(b'&') { TokenKind::AmpAmp } else { TokenKind::Amp };
        self.simple(kind)
      }
      b'|' => {
        let kind = if self.matches(b'|') { TokenKind::PipePipe } else { TokenKind::Pipe };
        self.simple(kind)
      }
      b'^' => self.simple(TokenKind::Caret),
      b'~' => self.simple(TokenKind::Tilde),
      b'!' => {
        let kind = if self.matches(b'=') { TokenKind::BangEqual } else { TokenKind::Bang };
        self.simple(kind)
      }
      b'=' => {
        let kind = if self.matches(b'=') { TokenKind::EqualEqual } else { TokenKind::Equal };
        self.simple(kind)
      }
      b'\n' => {
        self.at_line_begin = true;
        self.simple(TokenKind::Eol)
      }
      b'"' => self.string(),
      b'\'' => self.char_literal(),
      c if c.is_ascii_digit() => self.number(),
      c if c.is_ascii_alphabetic() || c == b'_' => self.identifier(),
      _ => Token::error(self.span(), "unexpected character"),
    }
  }
}

fn keyword_or_identifier(lexeme: &[u8]) -> TokenKind {
  // Mirrors the original's per-first-letter dispatch; matching on the whole
  // slice reads better in Rust but keeps the same branching shape.
  match lexeme {
    b"break" => TokenKind::Break,
    b"continue" => TokenKind::Continue,
    b"else" => TokenKind::Else,
    b"false" => TokenKind::False,
    b"function" => TokenKind::Function,
    b"if" => TokenKind::If,
    b"let" => TokenKind::Let,
    b"nil" => TokenKind::Nil,
    b"return" => TokenKind::Return,
    b"true" => TokenKind::True,
    b"while" => TokenKind::While,
    _ => TokenKind::Identifier,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(src: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(src);
    let mut out = vec![];
    loop {
      let tok = lexer.next();
      let done = tok.kind == TokenKind::Eof;
      out.push(tok.kind);
      if done {
        break;
      }
    }
    out
  }

  #[test]
  fn indent_dedent_balanced() {
    use TokenKind::*;
    let src = "function f():\n        let x = 1\nlet y = 2\n";
    let kinds = kinds(src);
    // one indent for the function body, one dedent when it ends
    assert_eq!(kinds.iter().filter(|k| **k == Indent).count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == Dedent).count(), 1);
    assert_eq!(*kinds.last().unwrap(), Eof);
  }

  #[test]
  fn unclosed_block_dedents_at_eof() {
    use TokenKind::*;
    let src = "function f():\n        let x = 1";
    let kinds = kinds(src);
    assert_eq!(kinds.iter().filter(|k| **k == Indent).count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == Dedent).count(), 1);
  }

  #[test]
  fn bad_indent_width_is_error() {
    let src = "   let x = 1\n";
    let mut lexer = Lexer::new(src);
    let tok = lexer.next();
    assert_eq!(tok.kind, TokenKind::Error);
  }

  #[test]
  fn string_and_char_spans_exclude_quotes() {
    let src = "\"hi\" 'a'";
    let mut lexer = Lexer::new(src);
    let s = lexer.next();
    assert_eq!(&src[s.span.range()], "hi");
    let c = lexer.next();
    assert_eq!(&src[c.span.range()], "a");
  }

  #[test]
  fn keywords_recognized() {
    use TokenKind::*;
    assert_eq!(kinds("let"), vec![Let, Eof]);
    assert_eq!(kinds("function"), vec![Function, Eof]);
    assert_eq!(kinds("nothing"), vec![Identifier, Eof]);
  }
}

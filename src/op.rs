//! The opcode set the compiler emits and the VM dispatches on.
//!
//! Grounded in `original_source/src/opcodes.h`/`opcodes.txt`: every opcode is
//! one byte, and arguments (when present) are a following big-endian `u16`.
//! `JUMP`/`JUMP_IF_FALSE` are additions for `if`/`while`, per the REDESIGN
//! FLAGS — the reference left these as a compile-time fatal.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Op {
  Push = 0,
  PushTrue,
  PushFalse,
  PushNil,
  Pop,

  Add,
  Sub,
  Mul,
  Div,
  Pow,
  Negate,

  BAnd,
  BOr,
  BXor,
  LShift,
  RShift,
  BNot,

  And,
  Or,
  Not,

  Eq,
  Gr,
  GrEq,
  Le,
  LeEq,

  DefineGlobal,
  GetGlobal,
  SetGlobal,
  GetLocal,
  SetLocal,

  TableGet,

  Jump,
  JumpIfFalse,

  Call,
  Return,
  Halt,
}

impl Op {
  /// Whether this opcode is followed by a big-endian `u16` operand.
  pub const fn has_arg(self) -> bool {
    matches!(
      self,
      Op::Push
        | Op::DefineGlobal
        | Op::GetGlobal
        | Op::SetGlobal
        | Op::GetLocal
        | Op::SetLocal
        | Op::Jump
        | Op::JumpIfFalse
        | Op::Call
    )
  }

  pub const fn name(self) -> &'static str {
    match self {
      Op::Push => "PUSH",
      Op::PushTrue => "PUSH_TRUE",
      Op::PushFalse => "PUSH_FALSE",
      Op::PushNil => "PUSH_NIL",
      Op::Pop => "POP",
      Op::Add => "ADD",
      Op::Sub => "SUB",
      Op::Mul => "MUL",
      Op::Div => "DIV",
      Op::Pow => "POW",
      Op::Negate => "NEGATE",
      Op::BAnd => "BAND",
      Op::BOr => "BOR",
      Op::BXor => "BXOR",
      Op::LShift => "LSHIFT",
      Op::RShift => "RSHIFT",
      Op::BNot => "BNOT",
      Op::And => "AND",
      Op::Or => "OR",
      Op::Not => "NOT",
      Op::Eq => "EQ",
      Op::Gr => "GR",
      Op::GrEq => "GREQ",
      Op::Le => "LE",
      Op::LeEq => "LEQ",
      Op::DefineGlobal => "DEFINE_GLOBAL",
      Op::GetGlobal => "GET_GLOBAL",
      Op::SetGlobal => "SET_GLOBAL",
      Op::GetLocal => "GET_LOCAL",
      Op::SetLocal => "SET_LOCAL",
      Op::TableGet => "TABLE_GET",
      Op::Jump => "JUMP",
      Op::JumpIfFalse => "JUMP_IF_FALSE",
      Op::Call => "CALL",
      Op::Return => "RETURN",
      Op::Halt => "HALT",
    }
  }

  /// Decodes a byte emitted by the compiler. Panics on an invalid byte —
  /// chunk bytes are never read from anywhere but the compiler's own
  /// output, so a bad byte means a compiler bug, not untrusted input.
  pub fn from_byte(b: u8) -> Op {
    const TABLE: &[Op] = &[
      Op::Push,
      Op::PushTrue,
      Op::PushFalse,
      Op::PushNil,
      Op::Pop,
      Op::Add,
      Op::Sub,
      Op::Mul,
      Op::Div,
      Op::Pow,
      Op::Negate,
      Op::BAnd,
      Op::BOr,
      Op::BXor,
      Op::LShift,
      Op::RShift,
      Op::BNot,
      Op::And,
      Op::Or,
      Op::Not,
      Op::Eq,
      Op::Gr,
      Op::GrEq,
      Op::Le,
      Op::LeEq,
      Op::DefineGlobal,
      Op::GetGlobal,
      Op::SetGlobal,
      Op::GetLocal,
      Op::SetLocal,
      Op::TableGet,
      Op::Jump,
      Op::JumpIfFalse,
      Op::Call,
      Op::Return,
      Op::Halt,
    ];
    TABLE[b as usize]
  }
}

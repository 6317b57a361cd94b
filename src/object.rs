//! Heap-allocated object variants.
//!
//! Spec's object model gives every heap object a common header (type tag,
//! a `next` link reserved for a future sweep, a mark byte reserved for a
//! future trace) so that all three concrete kinds can hang off one singly
//! linked free list. Since this crate owns objects through `Rc` instead of
//! implementing that sweep, the header collapses into ordinary Rust
//! ownership and the three kinds become a plain enum instead of a tagged
//! union wrapping a common struct (see DESIGN.md, "Heap object
//! polymorphism").

use std::cell::RefCell;
use std::rc::Rc;

use crate::chunk::Chunk;
use crate::error::RuntimeError;
use crate::state::State;
use crate::table::Table;

#[derive(Debug, PartialEq, Eq)]
pub struct StringObj {
  bytes: Box<str>,
}

impl StringObj {
  pub fn new(s: impl Into<Box<str>>) -> Rc<StringObj> {
    Rc::new(StringObj { bytes: s.into() })
  }

  pub fn as_str(&self) -> &str {
    &self.bytes
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }
}

#[derive(Debug)]
pub struct FunctionObj {
  pub name: Rc<str>,
  pub arity: u16,
  pub chunk: Chunk,
}

impl FunctionObj {
  pub fn new(name: impl Into<Rc<str>>, arity: u16) -> Self {
    FunctionObj {
      name: name.into(),
      arity,
      chunk: Chunk::new(),
    }
  }
}

#[derive(Debug, Default)]
pub struct TableObj {
  pub table: RefCell<Table>,
}

impl TableObj {
  pub fn new() -> Rc<TableObj> {
    Rc::new(TableObj::default())
  }
}

/// A host-provided native callable, registered with a `State` and invoked by
/// `CALL` exactly like a scripted function.
///
/// Kept as its own variant rather than stuffed into the object enum above —
/// the reference implementation stores the function pointer in the object's
/// pointer field, which works in C because every object decays to a void
/// pointer, but is exactly the kind of type-pun a Rust reimplementation
/// should not carry forward (see DESIGN.md, "CFUNCTION stored in the object
/// pointer slot").
#[derive(Clone)]
pub struct CFunction(pub Rc<dyn Fn(&mut State, u16) -> Result<(), RuntimeError>>);

impl CFunction {
  pub fn new(f: impl Fn(&mut State, u16) -> Result<(), RuntimeError> + 'static) -> Self {
    CFunction(Rc::new(f))
  }

  pub fn call(&self, state: &mut State, argc: u16) -> Result<(), RuntimeError> {
    (self.0)(state, argc)
  }
}

impl std::fmt::Debug for CFunction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "<cfunction>")
  }
}

//! A fixed-bucket hash map from [`Value`] to [`Value`], used for both the
//! globals table and user-created tables.
//!
//! Grounded in `original_source/src/table.c`: FNV-1a hashing, a 256×256
//! two-level bucket matrix (here a flat `Vec` of 65536 chains indexed by the
//! hash's low two bytes), no resize and no delete. Per the REDESIGN FLAGS,
//! the original's pointer-chasing linked chains become plain `Vec<Entry>`
//! chains — same observable collision semantics, simpler layout.

use crate::value::{Type, Value};

const BUCKET_COUNT: usize = 256 * 256;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
  let mut hash = FNV_OFFSET;
  for &b in bytes {
    hash ^= b as u64;
    hash = hash.wrapping_mul(FNV_PRIME);
  }
  hash
}

fn hash_key(key: &Value) -> u64 {
  match key {
    // Strings get a dedicated hash over their bytes rather than the
    // address of the heap object, so equal string contents always collide
    // into the same bucket.
    Value::String(s) => fnv1a(s.as_str().as_bytes()),
    Value::Int(i) => fnv1a(&i.to_ne_bytes()),
    Value::Float(x) => fnv1a(&x.to_ne_bytes()),
    Value::Char(c) => fnv1a(&[*c]),
    Value::Bool(b) => fnv1a(&[*b as u8]),
    Value::Nil => FNV_OFFSET,
    // Tables, functions and cfunctions have no stable byte representation;
    // nothing in this language ever uses one as a table key, so identity
    // via the allocation address is as good as any other answer here.
    Value::Table(t) => fnv1a(&(std::rc::Rc::as_ptr(t) as usize).to_ne_bytes()),
    Value::Function(f) => fnv1a(&(std::rc::Rc::as_ptr(f) as usize).to_ne_bytes()),
    Value::CFunction(c) => fnv1a(&(std::rc::Rc::as_ptr(&c.0) as *const () as usize).to_ne_bytes()),
  }
}

fn keys_equal(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::String(a), Value::String(b)) => a.as_str() == b.as_str(),
    _ => a.ty() == b.ty(),
  }
}

#[derive(Debug)]
struct Entry {
  hash: u64,
  key: Value,
  value: Value,
}

#[derive(Debug)]
pub struct Table {
  buckets: Vec<Vec<Entry>>,
}

impl Default for Table {
  fn default() -> Self {
    let mut buckets = Vec::with_capacity(BUCKET_COUNT);
    buckets.resize_with(BUCKET_COUNT, Vec::new);
    Table { buckets }
  }
}

impl Table {
  pub fn new() -> Self {
    Table::default()
  }

  fn bucket_index(hash: u64) -> usize {
    (hash & 0xffff) as usize
  }

  /// Returns the value of the *earliest* inserted binding for `key`, i.e.
  /// the first chain entry whose hash (and, for strings, raw bytes) match.
  pub fn get(&self, key: &Value) -> Option<&Value> {
    let hash = hash_key(key);
    let chain = &self.buckets[Self::bucket_index(hash)];
    chain
      .iter()
      .find(|e| e.hash == hash && keys_equal(&e.key, key))
      .map(|e| &e.value)
  }

  pub fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
    let hash = hash_key(key);
    let chain = &mut self.buckets[Self::bucket_index(hash)];
    chain
      .iter_mut()
      .find(|e| e.hash == hash && keys_equal(&e.key, key))
      .map(|e| &mut e.value)
  }

  pub fn contains(&self, key: &Value) -> bool {
    self.get(key).is_some()
  }

  /// Appends a new binding at the tail of its bucket's chain. Duplicate
  /// inserts of the same key do not overwrite — they append, so `get`
  /// keeps returning the first one (spec §3, Table invariants).
  pub fn insert(&mut self, key: Value, value: Value) {
    let hash = hash_key(&key);
    self.buckets[Self::bucket_index(hash)].push(Entry { hash, key, value });
  }

  pub fn insert_str(&mut self, key: &str, value: Value) {
    self.insert(Value::string(key), value);
  }

  pub fn get_str(&self, key: &str) -> Option<&Value> {
    // Avoid allocating a Value::String just to hash it.
    let hash = fnv1a(key.as_bytes());
    let chain = &self.buckets[Self::bucket_index(hash)];
    chain
      .iter()
      .find(|e| e.hash == hash && matches!(&e.key, Value::String(s) if s.as_str() == key))
      .map(|e| &e.value)
  }

  /// Overwrites the earliest existing binding for `key` in place; returns
  /// `false` if no binding exists (SET_GLOBAL on an undefined global).
  pub fn set_existing(&mut self, key: &Value, value: Value) -> bool {
    match self.get_mut(key) {
      Some(slot) => {
        *slot = value;
        true
      }
      None => false,
    }
  }

  pub fn key_type_name(key: &Value) -> &'static str {
    key.ty().name()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn earliest_binding_wins_on_duplicate_insert() {
    let mut t = Table::new();
    t.insert_str("x", Value::Int(1));
    t.insert_str("x", Value::Int(2));
    assert_eq!(t.get_str("x").unwrap().as_int(), Some(1));
  }

  #[test]
  fn set_existing_overwrites_earliest_binding() {
    let mut t = Table::new();
    t.insert_str("x", Value::Int(1));
    assert!(t.set_existing(&Value::string("x"), Value::Int(9)));
    assert_eq!(t.get_str("x").unwrap().as_int(), Some(9));
  }

  #[test]
  fn set_existing_fails_when_absent() {
    let mut t = Table::new();
    assert!(!t.set_existing(&Value::string("missing"), Value::Nil));
  }

  #[test]
  fn distinct_keys_do_not_collide_in_practice() {
    let mut t = Table::new();
    t.insert_str("a", Value::Int(1));
    t.insert_str("b", Value::Int(2));
    assert_eq!(t.get_str("a").unwrap().as_int(), Some(1));
    assert_eq!(t.get_str("b").unwrap().as_int(), Some(2));
  }
}

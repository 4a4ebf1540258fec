/*! Storage for the action text attached to each rule.

Action texts are copied verbatim from the rule lines and are never modified
afterwards. They are interned, so rules with identical actions share a single
copy, and the total size of the pool is bounded.
*/

use std::fmt::{Debug, Formatter};
use std::hash::BuildHasherDefault;

use bstr::BStr;
use intaglio::Symbol;
use rustc_hash::FxHasher;
use serde::de::Visitor;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CapacityError;

/// Hash builder that replaces the default hashing algorithm used by the
/// pool (the same one used by [`std::collections::HashMap`]) with a faster
/// one [`rustc_hash::FxHasher`].
type HashBuilder = BuildHasherDefault<FxHasher>;

/// Identifies an action text within an [`ActionPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(u32);

impl From<u32> for ActionId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ActionId> for u32 {
    fn from(value: ActionId) -> Self {
        value.0
    }
}

/// Interned action texts.
pub struct ActionPool {
    pool: intaglio::bytes::SymbolTable<HashBuilder>,
    size: usize,
    max_size: usize,
}

impl ActionPool {
    /// Creates a new [`ActionPool`] that holds at most `max_size` bytes.
    pub fn new(max_size: usize) -> Self {
        Self {
            pool: intaglio::bytes::SymbolTable::with_hasher(
                HashBuilder::default(),
            ),
            size: 0,
            max_size,
        }
    }

    /// Changes the maximum number of bytes the pool can hold.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }

    /// Returns the ID corresponding to `text`, interning the text if not
    /// already interned.
    pub fn get_or_intern<S>(
        &mut self,
        text: S,
    ) -> Result<ActionId, CapacityError>
    where
        S: AsRef<[u8]>,
    {
        let bytes = text.as_ref();
        if let Some(s) = self.pool.check_interned(bytes) {
            return Ok(ActionId::from(s.id()));
        }
        if self.size + bytes.len() > self.max_size {
            return Err(CapacityError::ActionText(self.max_size));
        }
        let symbol = self
            .pool
            .intern(bytes.to_owned())
            .map_err(|_| CapacityError::ActionText(self.max_size))?;
        self.size += bytes.len();
        Ok(ActionId::from(symbol.id()))
    }

    /// Returns the text corresponding to a given ID if it was previously
    /// interned. If not returns [`None`].
    #[inline]
    pub fn get(&self, id: ActionId) -> Option<&BStr> {
        self.pool.get(Symbol::from(u32::from(id))).map(BStr::new)
    }

    /// Total number of bytes interned.
    #[cfg(test)]
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of distinct texts interned.
    #[inline]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Forgets every text interned after the first `len` ones.
    ///
    /// The underlying symbol table can't remove symbols, so the pool is
    /// rebuilt from the texts that are kept. IDs of those texts don't change.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            *self = self.prefix(len);
        }
    }

    fn prefix(&self, len: usize) -> Self {
        // The texts already fit, they must not be rejected if the limit was
        // lowered after they were interned.
        let mut pool = ActionPool::new(usize::MAX);
        // Texts are interned in the same order, so they keep their IDs.
        for text in self.pool.bytestrings().take(len) {
            if pool.get_or_intern(text).is_err() {
                break;
            }
        }
        pool.max_size = self.max_size;
        pool
    }
}

impl Debug for ActionPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.pool.bytestrings().map(BStr::new)).finish()
    }
}

impl Clone for ActionPool {
    fn clone(&self) -> Self {
        self.prefix(self.len())
    }
}

impl Serialize for ActionPool {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.pool.len()))?;

        for text in self.pool.bytestrings() {
            seq.serialize_element(text)?
        }

        seq.end()
    }
}

impl<'de> Deserialize<'de> for ActionPool {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(ActionPoolVisitor)
    }
}

struct ActionPoolVisitor;

impl<'de> Visitor<'de> for ActionPoolVisitor {
    type Value = ActionPool;

    fn expecting(
        &self,
        formatter: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        formatter.write_str("an ActionPool")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        // A deserialized pool is read-only, it has no size limit.
        let mut pool = ActionPool::new(usize::MAX);

        while let Some(text) = seq.next_element::<&[u8]>()? {
            pool.get_or_intern(text).map_err(serde::de::Error::custom)?;
        }

        Ok(pool)
    }
}

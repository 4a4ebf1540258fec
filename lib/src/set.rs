/*! A growable set of non-negative integers backed by a bitmap.

[`CharSet`] is used for two different things: character classes (where each
member is a byte value) and sets of NFA states (where each member is a
[`crate::nfa::StateId`]). The set starts with enough inline room for the whole
128-characters alphabet and grows on demand, one 64-bits word at a time. It
never shrinks unless explicitly truncated.

Bits beyond the current capacity read as absent. Operations that depend on
the capacity, like [`CharSet::invert`] and [`CharSet::iter_absent`], only
consider the bits below it, so callers must [`CharSet::grow`] the set up to
the intended universe before using them.
*/

use std::fmt::{Display, Formatter};
use std::iter::zip;

use bitvec::order::Lsb0;
use bitvec::slice::{BitSlice, IterOnes, IterZeros};
use bitvec::view::BitView;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

const WORD_BITS: usize = u64::BITS as usize;

/// Number of words stored inline, without heap allocation. Two words are
/// enough for the 128-characters alphabet.
const INLINE_WORDS: usize = 2;

/// Relation between two sets, as computed by [`CharSet::relation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    /// Both sets contain exactly the same members.
    Equal,
    /// The sets are different but have at least one member in common.
    Intersecting,
    /// The sets are different and have no members in common.
    Disjoint,
}

/// A set of non-negative integers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CharSet {
    words: SmallVec<[u64; INLINE_WORDS]>,
}

impl Default for CharSet {
    fn default() -> Self {
        Self::new()
    }
}

impl CharSet {
    /// Creates a new empty set with the default capacity.
    pub fn new() -> Self {
        Self { words: smallvec![0; INLINE_WORDS] }
    }

    /// Creates a new empty set that can hold at least `bits` members
    /// without growing.
    pub fn with_capacity(bits: usize) -> Self {
        let mut set = Self::new();
        set.grow(bits);
        set
    }

    /// Number of bits currently backed by storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    /// Makes sure that the set can hold members in the range `0..bits`.
    /// Newly added bits are all absent.
    pub fn grow(&mut self, bits: usize) {
        let needed = bits.div_ceil(WORD_BITS);
        if needed > self.words.len() {
            self.words.resize(needed, 0);
        }
    }

    #[inline]
    fn bits(&self) -> &BitSlice<u64, Lsb0> {
        self.words.as_slice().view_bits::<Lsb0>()
    }

    #[inline]
    fn bits_mut(&mut self) -> &mut BitSlice<u64, Lsb0> {
        self.words.as_mut_slice().view_bits_mut::<Lsb0>()
    }

    /// Adds a member to the set, growing it if necessary.
    pub fn add(&mut self, member: usize) {
        self.grow(member + 1);
        self.bits_mut().set(member, true);
    }

    /// Adds every member yielded by `members`.
    pub fn add_members<I>(&mut self, members: I)
    where
        I: IntoIterator<Item = usize>,
    {
        for member in members {
            self.add(member);
        }
    }

    /// Removes a member from the set. Returns `true` if the member was
    /// present. Removing a member beyond the current capacity is a no-op.
    pub fn remove(&mut self, member: usize) -> bool {
        if member >= self.capacity() {
            return false;
        }
        self.bits_mut().replace(member, false)
    }

    /// Removes every member yielded by `members`.
    pub fn remove_members<I>(&mut self, members: I)
    where
        I: IntoIterator<Item = usize>,
    {
        for member in members {
            self.remove(member);
        }
    }

    /// Returns `true` if `member` is in the set.
    #[inline]
    pub fn contains(&self, member: usize) -> bool {
        self.bits().get(member).is_some_and(|bit| *bit)
    }

    /// Number of members in the set.
    pub fn len(&self) -> usize {
        self.bits().count_ones()
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.bits().not_any()
    }

    /// Flips every bit up to the current capacity. Members that would lie
    /// beyond the capacity are not added.
    pub fn invert(&mut self) {
        for mut bit in self.bits_mut().iter_mut() {
            *bit = !*bit;
        }
    }

    /// Removes all members without changing the capacity.
    pub fn clear(&mut self) {
        self.bits_mut().fill(false);
    }

    /// Adds every member below the current capacity.
    pub fn fill(&mut self) {
        self.bits_mut().fill(true);
    }

    /// Removes all members and shrinks the set back to its default
    /// capacity.
    pub fn truncate(&mut self) {
        self.words = smallvec![0; INLINE_WORDS];
    }

    /// Adds the members of `other` to this set.
    pub fn union(&mut self, other: &CharSet) {
        self.grow(other.capacity());
        for (dst, src) in zip(self.words.iter_mut(), other.words.iter()) {
            *dst |= *src;
        }
    }

    /// Keeps only the members that are also in `other`.
    pub fn intersect(&mut self, other: &CharSet) {
        self.grow(other.capacity());
        for (dst, src) in zip(self.words.iter_mut(), other.words.iter()) {
            *dst &= *src;
        }
        self.words[other.words.len()..].fill(0);
    }

    /// Removes the members that are in `other`.
    pub fn difference(&mut self, other: &CharSet) {
        self.grow(other.capacity());
        for (dst, src) in zip(self.words.iter_mut(), other.words.iter()) {
            *dst &= !*src;
        }
    }

    /// Replaces the content of this set with the members of `other`.
    pub fn assign(&mut self, other: &CharSet) {
        self.grow(other.capacity());
        let n = other.words.len();
        self.words[..n].copy_from_slice(&other.words);
        self.words[n..].fill(0);
    }

    /// Classifies the relation between this set and `other` with a single
    /// pass over their words.
    ///
    /// Sets with different capacities can be equal, bits beyond the
    /// capacity of the shorter set are considered absent.
    pub fn relation(&self, other: &CharSet) -> Relation {
        let (short, long) = if self.words.len() <= other.words.len() {
            (&self.words, &other.words)
        } else {
            (&other.words, &self.words)
        };

        let mut equal = true;
        let mut common = false;

        for (a, b) in zip(short.iter(), long.iter()) {
            if a & b != 0 {
                common = true;
            }
            if a != b {
                equal = false;
            }
            if common && !equal {
                return Relation::Intersecting;
            }
        }

        if long[short.len()..].iter().any(|w| *w != 0) {
            equal = false;
        }

        match (equal, common) {
            (true, _) => Relation::Equal,
            (false, true) => Relation::Intersecting,
            (false, false) => Relation::Disjoint,
        }
    }

    /// Returns `true` if both sets have the same members.
    #[inline]
    pub fn is_equal(&self, other: &CharSet) -> bool {
        self.relation(other) == Relation::Equal
    }

    /// Returns `true` if the sets have no members in common.
    pub fn is_disjoint(&self, other: &CharSet) -> bool {
        match self.relation(other) {
            Relation::Disjoint => true,
            // Two equal sets are disjoint only when both are empty.
            Relation::Equal => self.is_empty(),
            Relation::Intersecting => false,
        }
    }

    /// Returns `true` if the sets have at least one member in common.
    #[inline]
    pub fn intersects(&self, other: &CharSet) -> bool {
        !self.is_disjoint(other)
    }

    /// Returns `true` if every member of this set is also in `other`.
    pub fn is_subset(&self, other: &CharSet) -> bool {
        for (a, b) in zip(self.words.iter(), other.words.iter()) {
            if a & !b != 0 {
                return false;
            }
        }
        self.words.iter().skip(other.words.len()).all(|w| *w == 0)
    }

    /// Returns an iterator over the members of the set, in ascending order.
    ///
    /// Each iterator keeps its own cursor, so any number of them can be
    /// alive at the same time.
    pub fn iter(&self) -> Iter<'_> {
        self.bits().iter_ones()
    }

    /// Returns an iterator over the integers below the current capacity
    /// that are not members of the set, in ascending order.
    pub fn iter_absent(&self) -> IterAbsent<'_> {
        self.bits().iter_zeros()
    }
}

impl PartialEq for CharSet {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

impl Eq for CharSet {}

impl FromIterator<usize> for CharSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut set = CharSet::new();
        set.add_members(iter);
        set
    }
}

impl Extend<usize> for CharSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        self.add_members(iter)
    }
}

impl<'a> IntoIterator for &'a CharSet {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`CharSet::iter`].
pub type Iter<'a> = IterOnes<'a, u64, Lsb0>;

/// Iterator returned by [`CharSet::iter_absent`].
pub type IterAbsent<'a> = IterZeros<'a, u64, Lsb0>;

impl Display for CharSet {
    /// Prints the members of the set. When more than half of the bits are
    /// set the absent members are listed instead.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let len = self.len();
        let capacity = self.capacity();

        write!(f, "set[{}/{}]: ", len, capacity)?;

        if len * 2 < capacity {
            write!(f, "{}", self.iter().join(" "))
        } else {
            write!(f, "all except: {}", self.iter_absent().join(" "))
        }
    }
}

//! The LZW dictionary.
//!
//! Entries `0..256` stand for the single bytes and always exist. Entry 256 is reserved and never
//! assigned. Every later entry is stored as one trailing byte plus a link to the entry of its
//! prefix, so sequences live in an arena of links and are rebuilt by walking those links
//! backwards.
//!
//! Lookup goes through an open-addressed hash table keyed by the full byte sequence. Since the
//! hash of a sequence is a running fold over its bytes, the hash of an extension is computed from
//! the stored hash of its prefix in constant time.
use crate::error::{Error, Result};
use crate::{Code, FIRST_FREE_ENTRY, MAX_ENTRIES_LIMIT, RESERVED_ENTRY};

/// Marks the end of a prefix chain.
const NO_PARENT: Code = Code::MAX;
/// Marks an unused hash slot.
const EMPTY: Code = Code::MAX;
/// The number of single-byte entries.
const LITERALS: Code = 256;

#[derive(Clone, Copy)]
struct Link {
    /// The entry of the sequence without its last byte.
    parent: Code,
    /// The last byte of the sequence.
    byte: u8,
    /// The hash of the whole sequence.
    hash: u32,
}

/// A table of byte sequences numbered in insertion order.
pub struct Dictionary {
    links: Vec<Link>,
    slots: Box<[Code]>,
    next_free: Code,
    max_entries: Code,
}

impl Dictionary {
    /// Create a dictionary holding at most `max_entries` entries, reserved ones included.
    pub fn new(max_entries: u32) -> Result<Self> {
        Dictionary::check_capacity(max_entries)?;

        let buckets = bucket_count(max_entries);
        let mut links = Vec::with_capacity(max_entries as usize);
        links.extend((0..LITERALS).map(|byte| Link {
            parent: NO_PARENT,
            byte: byte as u8,
            hash: fold(0, byte as u8, buckets),
        }));
        // Placeholder for the reserved entry, never reachable through lookup.
        links.push(Link {
            parent: NO_PARENT,
            byte: 0,
            hash: 0,
        });

        Ok(Dictionary {
            links,
            slots: vec![EMPTY; buckets as usize].into_boxed_slice(),
            next_free: FIRST_FREE_ENTRY,
            max_entries,
        })
    }

    /// Check that a dictionary of `max_entries` entries can be built, without building it.
    pub fn check_capacity(max_entries: u32) -> Result<()> {
        if max_entries <= FIRST_FREE_ENTRY {
            return Err(Error::InvalidConfig(format!(
                "a dictionary needs more than {} entries, got {}",
                FIRST_FREE_ENTRY, max_entries
            )));
        }
        if max_entries > MAX_ENTRIES_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "a dictionary holds at most {} entries, got {}",
                MAX_ENTRIES_LIMIT, max_entries
            )));
        }
        Ok(())
    }

    /// The entry number the next insertion will receive.
    pub fn next_free(&self) -> Code {
        self.next_free
    }

    /// The maximum number of entries.
    pub fn capacity(&self) -> u32 {
        self.max_entries
    }

    /// Whether no further entry can be inserted before a reset.
    pub fn is_full(&self) -> bool {
        self.next_free >= self.max_entries
    }

    /// Whether `entry` currently stands for a sequence.
    pub fn contains(&self, entry: Code) -> bool {
        entry < LITERALS || (FIRST_FREE_ENTRY..self.next_free).contains(&entry)
    }

    /// Find the entry for the full sequence `seq`.
    pub fn lookup(&self, seq: &[u8]) -> Option<Code> {
        let (&first, rest) = seq.split_first()?;
        rest.iter()
            .try_fold(Code::from(first), |prefix, &byte| self.child(prefix, byte))
    }

    /// Find the entry for the sequence of `prefix` extended by `byte`.
    pub fn child(&self, prefix: Code, byte: u8) -> Option<Code> {
        debug_assert!(self.contains(prefix));
        let buckets = self.slots.len();
        let mut slot = fold(self.links[prefix as usize].hash, byte, buckets as u32) as usize;
        loop {
            let entry = self.slots[slot];
            if entry == EMPTY {
                return None;
            }

            let link = &self.links[entry as usize];
            if link.parent == prefix && link.byte == byte {
                return Some(entry);
            }
            slot = (slot + 1) % buckets;
        }
    }

    /// Add the sequence of `prefix` extended by `byte` as the next entry.
    pub fn insert(&mut self, prefix: Code, byte: u8) -> Result<Code> {
        if !self.contains(prefix) {
            return Err(Error::UndefinedEntry {
                entry: prefix,
                next_free: self.next_free,
            });
        }
        if self.is_full() {
            return Err(Error::DictionaryOverflow {
                capacity: self.max_entries,
            });
        }

        let entry = self.next_free;
        let buckets = self.slots.len();
        let hash = fold(self.links[prefix as usize].hash, byte, buckets as u32);
        debug_assert_eq!(self.links.len(), entry as usize);
        self.links.push(Link {
            parent: prefix,
            byte,
            hash,
        });

        let mut slot = hash as usize;
        while self.slots[slot] != EMPTY {
            slot = (slot + 1) % buckets;
        }
        self.slots[slot] = entry;
        self.next_free += 1;
        Ok(entry)
    }

    /// Append the bytes of `entry` to `out`, returning how many were appended.
    pub fn reconstruct(&self, entry: Code, out: &mut Vec<u8>) -> Result<usize> {
        if !self.contains(entry) {
            return Err(Error::UndefinedEntry {
                entry,
                next_free: self.next_free,
            });
        }

        let start = out.len();
        let mut code = entry;
        loop {
            let link = &self.links[code as usize];
            out.push(link.byte);
            if link.parent == NO_PARENT {
                break;
            }
            code = link.parent;
        }
        out[start..].reverse();
        Ok(out.len() - start)
    }

    /// Forget all entries but the single bytes.
    pub fn reset(&mut self) {
        self.next_free = FIRST_FREE_ENTRY;
        self.links.truncate(FIRST_FREE_ENTRY as usize);
        for slot in self.slots.iter_mut() {
            *slot = EMPTY;
        }
    }
}

/// Extend the hash of a sequence by one byte.
fn fold(hash: u32, byte: u8, buckets: u32) -> u32 {
    ((u64::from(hash) * 257 + u64::from(byte)) % u64::from(buckets)) as u32
}

/// A prime number of hash buckets, about `sqrt(2)` times the entry count.
fn bucket_count(max_entries: u32) -> u32 {
    let target = (f64::from(max_entries) * core::f64::consts::SQRT_2) as u32;
    let mut candidate = target.max(max_entries.saturating_add(1));
    while !is_prime(candidate) {
        candidate = candidate.saturating_add(1);
    }
    candidate
}

fn is_prime(n: u32) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut divisor = 3u32;
    while u64::from(divisor) * u64::from(divisor) <= u64::from(n) {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

// The reserved entry sits between the literals and the first free entry.
const _: () = assert!(RESERVED_ENTRY == LITERALS && FIRST_FREE_ENTRY == RESERVED_ENTRY + 1);

//! Enumeration of teacher subsets.
//!
//! A subset of an ordered roster is a bitmask: bit `i` set means roster entry
//! `i` is a member. Rosters are capped well below 64 entries by the search
//! guard, so a `u64` always suffices.

use rustc_hash::FxHashMap;

/// Bitmask over roster positions.
pub type TeacherMask = u64;

/// Lazy iterator over every non-empty subset in natural mask order (1 .. 2^n - 1).
#[derive(Clone, Debug)]
pub struct Combinations {
    next: u64,
    end: u64,
}

impl Combinations {
    pub fn new(n: usize) -> Self {
        debug_assert!(n < 64);
        Self {
            next: 1,
            end: 1u64 << n,
        }
    }
}

impl Iterator for Combinations {
    type Item = TeacherMask;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let mask = self.next;
        self.next += 1;
        Some(mask)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end.saturating_sub(self.next)) as usize;
        (remaining, Some(remaining))
    }
}

/// Every non-empty subset of `items`, in natural mask order.
pub fn enumerate<T>(items: &[T]) -> impl Iterator<Item = Vec<&T>> + '_ {
    Combinations::new(items.len()).map(move |mask| select(items, mask))
}

/// Masks over `n` positions with exactly `k` members, in increasing numeric order.
///
/// Uses Gosper's hack to step from one k-subset to the next.
pub fn masks_of_size(n: usize, k: usize) -> Vec<TeacherMask> {
    if k == 0 || k > n {
        return Vec::new();
    }
    let limit = 1u64 << n;
    let mut result = Vec::new();
    let mut mask: u64 = (1u64 << k) - 1;
    while mask < limit {
        result.push(mask);
        let lowest = mask & mask.wrapping_neg();
        let ripple = mask + lowest;
        mask = (((ripple ^ mask) >> 2) / lowest) | ripple;
    }
    result
}

/// Roster positions contained in `mask`, ascending.
pub fn members(mask: TeacherMask) -> impl Iterator<Item = usize> {
    let mut rest = mask;
    std::iter::from_fn(move || {
        if rest == 0 {
            return None;
        }
        let index = rest.trailing_zeros() as usize;
        rest &= rest - 1;
        Some(index)
    })
}

/// Borrow the members of `mask` from `items`, preserving roster order.
pub fn select<T>(items: &[T], mask: TeacherMask) -> Vec<&T> {
    members(mask).filter_map(|i| items.get(i)).collect()
}

/// Per-position name bits: entries sharing a name share a bit.
///
/// Callers must refuse rosters wider than the mask before building one.
///
/// Subset tests "by name" become `a & !b == 0` on the translated masks.
#[derive(Clone, Debug)]
pub struct NameBits {
    bits: Vec<u64>,
}

impl NameBits {
    pub fn new<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ids: FxHashMap<&'a str, u32> = FxHashMap::default();
        let bits = names
            .into_iter()
            .map(|name| {
                let next = ids.len() as u32;
                let id = *ids.entry(name).or_insert(next);
                debug_assert!(id < 64, "more distinct names than mask bits");
                1u64 << id
            })
            .collect();
        Self { bits }
    }

    /// Translate a roster mask into a mask over distinct names.
    pub fn name_mask(&self, mask: TeacherMask) -> u64 {
        members(mask)
            .filter_map(|i| self.bits.get(i))
            .fold(0, |acc, bit| acc | bit)
    }

    /// Whether every name in `inner` also appears in `outer`.
    #[inline]
    pub fn is_subset(&self, inner: TeacherMask, outer: TeacherMask) -> bool {
        let inner_names = self.name_mask(inner);
        let outer_names = self.name_mask(outer);
        inner_names & !outer_names == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_empty_roster_yields_nothing() {
        assert_eq!(Combinations::new(0).count(), 0);
        let empty: [u8; 0] = [];
        assert_eq!(enumerate(&empty).count(), 0);
    }

    #[test]
    fn test_every_subset_exactly_once() {
        for n in 1..=8 {
            let masks: Vec<TeacherMask> = Combinations::new(n).collect();
            let unique: FxHashSet<TeacherMask> = masks.iter().copied().collect();
            assert_eq!(masks.len() as u64, (1u64 << n) - 1);
            assert_eq!(unique.len(), masks.len());
            assert!(!masks.contains(&0));
        }
    }

    #[test]
    fn test_enumerate_selects_set_bits() {
        let roster = ["a", "b", "c"];
        let subsets: Vec<Vec<&&str>> = enumerate(&roster).collect();
        assert_eq!(subsets.len(), 7);
        assert_eq!(subsets[0], vec![&"a"]);
        assert_eq!(subsets[2], vec![&"a", &"b"]);
        assert_eq!(subsets[6], vec![&"a", &"b", &"c"]);
    }

    #[test]
    fn test_masks_of_size_matches_filter() {
        for n in 0..=7 {
            for k in 0..=n {
                let expected: Vec<TeacherMask> = Combinations::new(n)
                    .filter(|m| m.count_ones() as usize == k)
                    .collect();
                assert_eq!(masks_of_size(n, k), expected, "n={} k={}", n, k);
            }
        }
    }

    #[test]
    fn test_members_ascending() {
        let positions: Vec<usize> = members(0b1010_0101).collect();
        assert_eq!(positions, vec![0, 2, 5, 7]);
    }

    #[test]
    fn test_name_bits_merge_duplicate_names() {
        let bits = NameBits::new(["anna", "boris", "anna"]);
        // {anna(0)} is a subset of {anna(2), boris} by name
        assert!(bits.is_subset(0b001, 0b110));
        assert!(!bits.is_subset(0b010, 0b101));
        assert_eq!(bits.name_mask(0b101), 0b01);
    }
}

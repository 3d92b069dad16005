//! Push-generated entry keys.

use crate::entry::EntryKey;
use ulid::Ulid;

/// Generates time-ordered entry keys.
///
/// Keys minted within the same millisecond are made monotonic so that key
/// order always matches generation order. Only the store mints keys;
/// clients treat them as opaque.
#[derive(Debug, Default)]
pub struct KeyGenerator {
    last: Option<Ulid>,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_key(&mut self) -> EntryKey {
        let mut next = Ulid::new();
        if let Some(prev) = self.last {
            if next <= prev {
                next = prev.increment().unwrap_or(next);
            }
        }
        self.last = Some(next);
        EntryKey(next.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_strictly_increasing() {
        let mut keys = KeyGenerator::new();
        let mut previous = keys.next_key();
        for _ in 0..1000 {
            let next = keys.next_key();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys = KeyGenerator::new();
        let generated: std::collections::HashSet<_> =
            (0..100).map(|_| keys.next_key()).collect();
        assert_eq!(generated.len(), 100);
    }
}

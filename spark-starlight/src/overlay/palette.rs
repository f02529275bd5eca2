use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spark_media::RGB;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Channel range of generated colors; the floor keeps tints visible on dark frames.
const CHANNEL_MIN: u8 = 50;

/// Identity a color is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassKey {
    Id(u32),
    Name(String),
}

impl ClassKey {
    pub fn name(name: impl Into<String>) -> Self {
        ClassKey::Name(name.into())
    }

    fn seed(&self) -> u64 {
        match self {
            ClassKey::Id(id) => *id as u64,
            ClassKey::Name(name) => {
                let mut hasher = DefaultHasher::new();
                name.hash(&mut hasher);
                hasher.finish() & 0xFFFF_FFFF
            }
        }
    }
}

/// Class to color assignments shared by every frame of a process.
///
/// The color of a key is derived from the key alone, so two tables always
/// agree. The table only caches; concurrent first lookups of the same key are
/// serialized so each key is inserted once.
#[derive(Debug, Default)]
pub struct ClassColorTable {
    colors: RwLock<HashMap<ClassKey, RGB>>,
}

impl ClassColorTable {
    pub fn new() -> Self {
        ClassColorTable::default()
    }

    pub fn color_for(&self, key: &ClassKey) -> RGB {
        if let Some(color) = self.colors.read().get(key) {
            return *color;
        }

        let colors = self.colors.upgradable_read();
        if let Some(color) = colors.get(key) {
            return *color;
        }

        let mut colors = RwLockUpgradableReadGuard::upgrade(colors);
        *colors
            .entry(key.clone())
            .or_insert_with(|| Self::generate(key))
    }

    pub fn len(&self) -> usize {
        self.colors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.read().is_empty()
    }

    fn generate(key: &ClassKey) -> RGB {
        let mut rng = StdRng::seed_from_u64(key.seed());
        RGB(
            rng.gen_range(CHANNEL_MIN..=u8::MAX),
            rng.gen_range(CHANNEL_MIN..=u8::MAX),
            rng.gen_range(CHANNEL_MIN..=u8::MAX),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;
    use std::sync::Arc;

    #[test]
    fn colors_are_stable_and_bright_enough() {
        let table = ClassColorTable::new();
        let first = table.color_for(&ClassKey::Id(7));

        assert_eq!(table.color_for(&ClassKey::Id(7)), first);
        assert_eq!(ClassColorTable::new().color_for(&ClassKey::Id(7)), first);
        assert!(first.0 >= CHANNEL_MIN && first.1 >= CHANNEL_MIN && first.2 >= CHANNEL_MIN);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_classes_rarely_share_a_color() {
        let table = ClassColorTable::new();
        let colors = (0..200)
            .map(|id| table.color_for(&ClassKey::Id(id)))
            .map(|RGB(r, g, b)| (r, g, b))
            .collect::<HashSet<_>>();

        assert!(colors.len() >= 198, "only {} distinct colors", colors.len());
        assert_ne!(
            table.color_for(&ClassKey::name("wall")),
            table.color_for(&ClassKey::name("person"))
        );
    }

    #[test]
    fn concurrent_lookups_insert_once() {
        let table = Arc::new(ClassColorTable::new());
        let handles = (0..8)
            .map(|_| {
                let table = table.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|id| table.color_for(&ClassKey::Id(id)))
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        let results = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(table.len(), 50);
    }
}

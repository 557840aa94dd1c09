use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A value that carries its own identifier.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Insertion-ordered map of records keyed by their id.
///
/// Serializes as a JSON object whose keys appear in insertion order, and
/// deserializes back in document order. Inserting a key that is already
/// present is a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedMap<V> {
    entries: Vec<V>,
    index: HashMap<String, usize>,
}

impl<V> Default for KeyedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V: Keyed> KeyedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i]),
            None => None,
        }
    }

    /// Insert `value` unless its key is already present.
    ///
    /// Returns `true` if the value was inserted.
    pub fn insert_if_absent(&mut self, value: V) -> bool {
        if self.index.contains_key(value.key()) {
            return false;
        }
        self.index
            .insert(value.key().to_string(), self.entries.len());
        self.entries.push(value);
        true
    }

    /// Get the value for `key`, creating it with `make` on first sight.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.entries.push(make());
                self.index.insert(key.to_string(), i);
                i
            }
        };
        &mut self.entries[i]
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Keyed::key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, V> {
        self.entries.iter_mut()
    }
}

impl<'a, V> IntoIterator for &'a KeyedMap<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<V> IntoIterator for KeyedMap<V> {
    type Item = V;
    type IntoIter = std::vec::IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Keyed> FromIterator<V> for KeyedMap<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut map = Self::new();
        for value in iter {
            map.insert_if_absent(value);
        }
        map
    }
}

impl<V: Keyed + Serialize> Serialize for KeyedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for value in &self.entries {
            map.serialize_entry(value.key(), value)?;
        }
        map.end()
    }
}

impl<'de, V: Keyed + Deserialize<'de>> Deserialize<'de> for KeyedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Keyed + Deserialize<'de>> Visitor<'de> for KeyedMapVisitor<V> {
            type Value = KeyedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of records keyed by id")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = KeyedMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if key != value.key() {
                        return Err(serde::de::Error::custom(format!(
                            "key {:?} does not match record id {:?}",
                            key,
                            value.key()
                        )));
                    }
                    map.insert_if_absent(value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(KeyedMapVisitor(PhantomData))
    }
}

//! Serde support: maps serialize as maps and sets as sequences.
//!
//! Only the entries are written. Table size, load factor, and the default
//! return value are not, and deserialization builds a table sized for the
//! incoming entries with the default load factor.

use core::fmt;
use core::marker::PhantomData;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as _;
use serde::de::MapAccess;
use serde::de::SeqAccess;
use serde::de::Visitor;

use crate::hash_map::PrimitiveHashMap;
use crate::hash_set::PrimitiveHashSet;
use crate::hash_table::DEFAULT_LOAD_FACTOR;
use crate::key::Key;

/// Upper bound on the entries preallocated from an untrusted size hint.
const MAX_PREALLOCATED: usize = 1 << 16;

impl<K, V> Serialize for PrimitiveHashMap<K, V>
where
    K: Key + Serialize,
    V: Default + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

impl<'de, K, V> Deserialize<'de> for PrimitiveHashMap<K, V>
where
    K: Key + Deserialize<'de>,
    V: Default + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for MapVisitor<K, V>
        where
            K: Key + Deserialize<'de>,
            V: Default + Deserialize<'de>,
        {
            type Value = PrimitiveHashMap<K, V>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let expected = access.size_hint().unwrap_or(0).min(MAX_PREALLOCATED);
                let mut map =
                    PrimitiveHashMap::with_capacity_and_load_factor(expected, DEFAULT_LOAD_FACTOR)
                        .map_err(A::Error::custom)?;

                while let Some((key, value)) = access.next_entry()? {
                    map.try_insert(key, value).map_err(A::Error::custom)?;
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MapVisitor(PhantomData))
    }
}

impl<K> Serialize for PrimitiveHashSet<K>
where
    K: Key + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, K> Deserialize<'de> for PrimitiveHashSet<K>
where
    K: Key + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SetVisitor<K>(PhantomData<K>);

        impl<'de, K> Visitor<'de> for SetVisitor<K>
        where
            K: Key + Deserialize<'de>,
        {
            type Value = PrimitiveHashSet<K>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a sequence")
            }

            fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let expected = access.size_hint().unwrap_or(0).min(MAX_PREALLOCATED);
                let mut set =
                    PrimitiveHashSet::with_capacity_and_load_factor(expected, DEFAULT_LOAD_FACTOR)
                        .map_err(A::Error::custom)?;

                while let Some(key) = access.next_element()? {
                    set.try_insert(key).map_err(A::Error::custom)?;
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(SetVisitor(PhantomData))
    }
}

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use crate::descriptors::{GenericDescriptorCell, SerialDescriptor, SerialKind};
use crate::encoding::{Decoder, ElementIndex, Encoder};
use crate::{DeserializationStrategy, Described, SerialError, SerialResult};
use crate::{Serializable, SerializationStrategy};

/// Strategy of `BTreeMap<K, V>` and `HashMap<K, V>`.
///
/// Entry `i` is written as the key at index `2 * i` followed by the value at
/// `2 * i + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapSerializer<KS, VS> {
    key: KS,
    value: VS,
}

impl<KS, VS> MapSerializer<KS, VS> {
    #[inline]
    pub const fn new(key: KS, value: VS) -> Self {
        Self { key, value }
    }
}

impl<KS, VS> Described for MapSerializer<KS, VS>
where
    KS: Described + 'static,
    VS: Described + 'static,
{
    fn descriptor(&self) -> &'static SerialDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<(KS, VS)>(|| {
            SerialDescriptor::map("Map", self.key.descriptor(), self.value.descriptor())
        })
    }
}

impl<KS, VS> MapSerializer<KS, VS>
where
    KS: Described + 'static,
    VS: Described + 'static,
{
    fn encode_entries<'v, K, V>(
        &self,
        encoder: &mut dyn Encoder,
        len: usize,
        entries: impl Iterator<Item = (&'v K, &'v V)>,
    ) -> SerialResult<()>
    where
        K: 'v,
        V: 'v,
        KS: SerializationStrategy<K>,
        VS: SerializationStrategy<V>,
    {
        let descriptor = self.descriptor();
        let mut composite = encoder.begin_collection(descriptor, len)?;
        for (i, (key, value)) in entries.enumerate() {
            composite.encode_serializable_element(descriptor, 2 * i, &self.key, key)?;
            composite.encode_serializable_element(descriptor, 2 * i + 1, &self.value, value)?;
        }
        composite.end_structure(descriptor)
    }

    fn decode_entries<K, V>(&self, decoder: &mut dyn Decoder) -> SerialResult<Vec<(K, V)>>
    where
        KS: DeserializationStrategy<K>,
        VS: DeserializationStrategy<V>,
    {
        let descriptor = self.descriptor();
        debug_assert_eq!(descriptor.kind(), SerialKind::Map);

        let mut composite = decoder.begin_structure(descriptor)?;
        let mut entries = match composite.decode_collection_size(descriptor)? {
            Some(size) => Vec::with_capacity(size),
            None => Vec::new(),
        };
        loop {
            let key_index = match composite.decode_element_index(descriptor)? {
                ElementIndex::Done => break,
                ElementIndex::Element(index) => index,
                ElementIndex::UnknownName(name) => {
                    return Err(SerialError::unknown_element_name(descriptor, &name));
                }
            };
            let key = composite.decode_serializable_element(descriptor, key_index, &self.key)?;
            let value_index = match composite.decode_element_index(descriptor)? {
                ElementIndex::Element(index) if index == key_index + 1 => index,
                other => {
                    let returned = match other {
                        ElementIndex::Element(index) => format!("{index}"),
                        ElementIndex::Done => "DONE".into(),
                        ElementIndex::UnknownName(name) => name,
                    };
                    return Err(SerialError::serialization(format!(
                        "Value must follow key in a map, index for key: {key_index}, \
                         returned index for value: {returned}"
                    )));
                }
            };
            let value =
                composite.decode_serializable_element(descriptor, value_index, &self.value)?;
            entries.push((key, value));
        }
        composite.end_structure(descriptor)?;
        Ok(entries)
    }
}

// -----------------------------------------------------------------------------
// BTreeMap

impl<K, V, KS, VS> SerializationStrategy<BTreeMap<K, V>> for MapSerializer<KS, VS>
where
    KS: SerializationStrategy<K> + 'static,
    VS: SerializationStrategy<V> + 'static,
{
    fn serialize(&self, encoder: &mut dyn Encoder, value: &BTreeMap<K, V>) -> SerialResult<()> {
        self.encode_entries(encoder, value.len(), value.iter())
    }
}

impl<K, V, KS, VS> DeserializationStrategy<BTreeMap<K, V>> for MapSerializer<KS, VS>
where
    K: Ord,
    KS: DeserializationStrategy<K> + 'static,
    VS: DeserializationStrategy<V> + 'static,
{
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<BTreeMap<K, V>> {
        Ok(self.decode_entries(decoder)?.into_iter().collect())
    }
}

impl<K: Serializable + Ord, V: Serializable> Serializable for BTreeMap<K, V> {
    type Serializer = MapSerializer<K::Serializer, V::Serializer>;

    #[inline]
    fn serializer() -> Self::Serializer {
        MapSerializer::new(K::serializer(), V::serializer())
    }
}

// -----------------------------------------------------------------------------
// HashMap

impl<K, V, H, KS, VS> SerializationStrategy<HashMap<K, V, H>> for MapSerializer<KS, VS>
where
    KS: SerializationStrategy<K> + 'static,
    VS: SerializationStrategy<V> + 'static,
{
    fn serialize(&self, encoder: &mut dyn Encoder, value: &HashMap<K, V, H>) -> SerialResult<()> {
        self.encode_entries(encoder, value.len(), value.iter())
    }
}

impl<K, V, H, KS, VS> DeserializationStrategy<HashMap<K, V, H>> for MapSerializer<KS, VS>
where
    K: Eq + Hash,
    H: BuildHasher + Default,
    KS: DeserializationStrategy<K> + 'static,
    VS: DeserializationStrategy<V> + 'static,
{
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<HashMap<K, V, H>> {
        let entries = self.decode_entries(decoder)?;
        let mut map = HashMap::with_capacity_and_hasher(entries.len(), H::default());
        map.extend(entries);
        Ok(map)
    }
}

impl<K, V, H> Serializable for HashMap<K, V, H>
where
    K: Serializable + Eq + Hash,
    V: Serializable,
    H: BuildHasher + Default,
{
    type Serializer = MapSerializer<K::Serializer, V::Serializer>;

    #[inline]
    fn serializer() -> Self::Serializer {
        MapSerializer::new(K::serializer(), V::serializer())
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::HashMap;

    use crate::testing::{Token, begin, decode, encode, str};
    use crate::{Described, SerialErrorKind, Serializable};

    #[test]
    fn entries_alternate_key_and_value() {
        let map = BTreeMap::from([("a".to_string(), 1_i32), ("b".to_string(), 2)]);
        assert_eq!(
            encode(&map),
            [
                begin("Map"),
                Token::Element(0),
                str("a"),
                Token::Element(1),
                Token::I32(1),
                Token::Element(2),
                str("b"),
                Token::Element(3),
                Token::I32(2),
                Token::End,
            ]
        );
        assert_eq!(decode::<BTreeMap<String, i32>>(encode(&map)).unwrap(), map);
    }

    #[test]
    fn hash_map_round_trip() {
        let map: HashMap<i32, Vec<bool>> = HashMap::from([(1, vec![true]), (2, vec![])]);
        assert_eq!(decode::<HashMap<i32, Vec<bool>>>(encode(&map)).unwrap(), map);
    }

    #[test]
    fn value_must_follow_key() {
        let tokens = vec![
            begin("Map"),
            Token::Element(0),
            str("a"),
            Token::Element(2),
            Token::I32(1),
            Token::End,
        ];
        let error = decode::<BTreeMap<String, i32>>(tokens).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::Serialization);
        assert_eq!(
            error.message(),
            "Value must follow key in a map, index for key: 0, returned index for value: 2"
        );
    }

    #[test]
    fn descriptor_shape() {
        let descriptor = <BTreeMap<String, i64> as Serializable>::serializer().descriptor();
        assert_eq!(descriptor.elements_count(), 2);
        assert_eq!(descriptor.element_descriptor(4).serial_name(), "String");
        assert_eq!(descriptor.element_descriptor(7).serial_name(), "i64");
    }
}

use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::HashSet;

use crate::descriptors::{GenericDescriptorCell, SerialDescriptor};
use crate::encoding::{Decoder, ElementIndex, Encoder};
use crate::{DeserializationStrategy, Described, SerialError, SerialResult};
use crate::{Serializable, SerializationStrategy};

// -----------------------------------------------------------------------------
// Helpers

fn encode_items<'v, T, S>(
    encoder: &mut dyn Encoder,
    descriptor: &'static SerialDescriptor,
    element: &S,
    len: usize,
    items: impl Iterator<Item = &'v T>,
) -> SerialResult<()>
where
    T: 'v,
    S: SerializationStrategy<T> + ?Sized,
{
    let mut composite = encoder.begin_collection(descriptor, len)?;
    for (index, item) in items.enumerate() {
        composite.encode_serializable_element(descriptor, index, element, item)?;
    }
    composite.end_structure(descriptor)
}

fn decode_items<T, S>(
    decoder: &mut dyn Decoder,
    descriptor: &'static SerialDescriptor,
    element: &S,
) -> SerialResult<Vec<T>>
where
    S: DeserializationStrategy<T> + ?Sized,
{
    let mut composite = decoder.begin_structure(descriptor)?;
    // The size is only a hint; the loop below still runs until `Done`.
    let mut items = match composite.decode_collection_size(descriptor)? {
        Some(size) => Vec::with_capacity(size),
        None => Vec::new(),
    };
    loop {
        match composite.decode_element_index(descriptor)? {
            ElementIndex::Done => break,
            ElementIndex::Element(index) => {
                items.push(composite.decode_serializable_element(descriptor, index, element)?);
            }
            ElementIndex::UnknownName(name) => {
                return Err(SerialError::unknown_element_name(descriptor, &name));
            }
        }
    }
    composite.end_structure(descriptor)?;
    Ok(items)
}

// -----------------------------------------------------------------------------
// ListSerializer

/// Strategy of ordered sequences: `Vec<T>`, `VecDeque<T>` and (writing only) `[T]`.
///
/// # Examples
///
/// ```
/// use sf_serial::builtins::{I32Serializer, ListSerializer};
/// use sf_serial::descriptors::SerialKind;
/// use sf_serial::Described;
///
/// let numbers = ListSerializer::new(I32Serializer);
/// assert_eq!(numbers.descriptor().kind(), SerialKind::List);
/// assert_eq!(numbers.descriptor().element_descriptor(0).serial_name(), "i32");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSerializer<S> {
    element: S,
}

impl<S> ListSerializer<S> {
    #[inline]
    pub const fn new(element: S) -> Self {
        Self { element }
    }
}

impl<S: Described + 'static> Described for ListSerializer<S> {
    fn descriptor(&self) -> &'static SerialDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<S>(|| SerialDescriptor::list("List", self.element.descriptor()))
    }
}

impl<T, S: SerializationStrategy<T> + 'static> SerializationStrategy<[T]> for ListSerializer<S> {
    fn serialize(&self, encoder: &mut dyn Encoder, value: &[T]) -> SerialResult<()> {
        encode_items(encoder, self.descriptor(), &self.element, value.len(), value.iter())
    }
}

impl<T, S: SerializationStrategy<T> + 'static> SerializationStrategy<Vec<T>> for ListSerializer<S> {
    fn serialize(&self, encoder: &mut dyn Encoder, value: &Vec<T>) -> SerialResult<()> {
        encode_items(encoder, self.descriptor(), &self.element, value.len(), value.iter())
    }
}

impl<T, S> SerializationStrategy<VecDeque<T>> for ListSerializer<S>
where
    S: SerializationStrategy<T> + 'static,
{
    fn serialize(&self, encoder: &mut dyn Encoder, value: &VecDeque<T>) -> SerialResult<()> {
        encode_items(encoder, self.descriptor(), &self.element, value.len(), value.iter())
    }
}

impl<T, S> DeserializationStrategy<Vec<T>> for ListSerializer<S>
where
    S: DeserializationStrategy<T> + 'static,
{
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<Vec<T>> {
        decode_items(decoder, self.descriptor(), &self.element)
    }
}

impl<T, S: DeserializationStrategy<T> + 'static> DeserializationStrategy<VecDeque<T>>
    for ListSerializer<S>
{
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<VecDeque<T>> {
        decode_items(decoder, self.descriptor(), &self.element).map(VecDeque::from)
    }
}

impl<T: Serializable> Serializable for Vec<T> {
    type Serializer = ListSerializer<T::Serializer>;

    #[inline]
    fn serializer() -> Self::Serializer {
        ListSerializer::new(T::serializer())
    }
}

impl<T: Serializable> Serializable for VecDeque<T> {
    type Serializer = ListSerializer<T::Serializer>;

    #[inline]
    fn serializer() -> Self::Serializer {
        ListSerializer::new(T::serializer())
    }
}

// -----------------------------------------------------------------------------
// SetSerializer

/// Strategy of `BTreeSet<T>` and `HashSet<T>`. Duplicates in the input collapse.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetSerializer<S> {
    element: S,
}

impl<S> SetSerializer<S> {
    #[inline]
    pub const fn new(element: S) -> Self {
        Self { element }
    }
}

impl<S: Described + 'static> Described for SetSerializer<S> {
    fn descriptor(&self) -> &'static SerialDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<S>(|| SerialDescriptor::list("Set", self.element.descriptor()))
    }
}

impl<T, S> SerializationStrategy<BTreeSet<T>> for SetSerializer<S>
where
    S: SerializationStrategy<T> + 'static,
{
    fn serialize(&self, encoder: &mut dyn Encoder, value: &BTreeSet<T>) -> SerialResult<()> {
        encode_items(encoder, self.descriptor(), &self.element, value.len(), value.iter())
    }
}

impl<T, H, S> SerializationStrategy<HashSet<T, H>> for SetSerializer<S>
where
    S: SerializationStrategy<T> + 'static,
{
    fn serialize(&self, encoder: &mut dyn Encoder, value: &HashSet<T, H>) -> SerialResult<()> {
        encode_items(encoder, self.descriptor(), &self.element, value.len(), value.iter())
    }
}

impl<T: Ord, S: DeserializationStrategy<T> + 'static> DeserializationStrategy<BTreeSet<T>>
    for SetSerializer<S>
{
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<BTreeSet<T>> {
        let items = decode_items(decoder, self.descriptor(), &self.element)?;
        Ok(items.into_iter().collect())
    }
}

impl<T, H, S> DeserializationStrategy<HashSet<T, H>> for SetSerializer<S>
where
    T: Eq + Hash,
    H: BuildHasher + Default,
    S: DeserializationStrategy<T> + 'static,
{
    fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<HashSet<T, H>> {
        let items = decode_items(decoder, self.descriptor(), &self.element)?;
        let mut set = HashSet::with_capacity_and_hasher(items.len(), H::default());
        set.extend(items);
        Ok(set)
    }
}

impl<T: Serializable + Ord> Serializable for BTreeSet<T> {
    type Serializer = SetSerializer<T::Serializer>;

    #[inline]
    fn serializer() -> Self::Serializer {
        SetSerializer::new(T::serializer())
    }
}

impl<T, H> Serializable for HashSet<T, H>
where
    T: Serializable + Eq + Hash,
    H: BuildHasher + Default,
{
    type Serializer = SetSerializer<T::Serializer>;

    #[inline]
    fn serializer() -> Self::Serializer {
        SetSerializer::new(T::serializer())
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::{BTreeSet, VecDeque};
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::HashSet;

    use crate::testing::{Token, begin, decode, encode};
    use crate::{Described, Serializable};

    #[test]
    fn list_layout() {
        assert_eq!(
            encode(&vec![1_i32, 2]),
            [
                begin("List"),
                Token::Element(0),
                Token::I32(1),
                Token::Element(1),
                Token::I32(2),
                Token::End,
            ]
        );
        assert_eq!(encode(&Vec::<i32>::new()), [begin("List"), Token::End]);
    }

    #[test]
    fn list_round_trip() {
        let items = vec![Some("a".to_string()), None];
        assert_eq!(decode::<Vec<Option<String>>>(encode(&items)).unwrap(), items);

        let queue: VecDeque<i64> = [3, 4, 5].into_iter().collect();
        assert_eq!(decode::<VecDeque<i64>>(encode(&queue)).unwrap(), queue);
    }

    #[test]
    fn sets_collapse_duplicates() {
        let tokens = vec![
            begin("Set"),
            Token::Element(0),
            Token::I32(1),
            Token::Element(1),
            Token::I32(1),
            Token::End,
        ];
        let tree: BTreeSet<i32> = decode(tokens.clone()).unwrap();
        let hash: HashSet<i32> = decode(tokens).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(hash.len(), 1);
    }

    #[test]
    fn unknown_name_in_list() {
        let tokens = vec![begin("List"), Token::Name("x".into()), Token::End];
        let error = decode::<Vec<i32>>(tokens).unwrap_err();
        assert_eq!(error.kind(), crate::SerialErrorKind::UnknownField);
    }

    #[test]
    fn descriptors_are_cached_per_element() {
        let ints = <Vec<i32> as Serializable>::serializer().descriptor();
        let strings = <Vec<String> as Serializable>::serializer().descriptor();
        assert!(!core::ptr::eq(ints, strings));
        assert_eq!(ints.element_descriptor(5).serial_name(), "i32");
        assert_eq!(strings.element_descriptor(0).serial_name(), "String");
        assert!(core::ptr::eq(ints, <Vec<i32> as Serializable>::serializer().descriptor()));
    }
}

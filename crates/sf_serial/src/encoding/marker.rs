use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::descriptors::SerialDescriptor;
use crate::{SerialError, SerialResult};

/// Records which elements of a composite have been decoded.
///
/// The first 64 elements live in one inline word, larger descriptors spill
/// into a vector.
///
/// # Examples
///
/// ```
/// use sf_serial::encoding::ElementMarker;
///
/// let mut marker = ElementMarker::new(3);
/// marker.mark(2);
/// assert!(marker.is_marked(2));
/// assert_eq!(marker.next_unmarked(|index| index > 0), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct ElementMarker {
    count: usize,
    lower: u64,
    upper: Vec<u64>,
}

impl ElementMarker {
    pub fn new(count: usize) -> Self {
        let words = count.saturating_sub(1) / 64;
        Self {
            count,
            lower: 0,
            upper: alloc::vec![0; words],
        }
    }

    #[inline]
    fn word(&self, index: usize) -> (u64, u64) {
        let bit = 1 << (index % 64);
        match index / 64 {
            0 => (self.lower, bit),
            n => (self.upper[n - 1], bit),
        }
    }

    /// # Panics
    ///
    /// If `index` is outside the tracked range.
    #[inline]
    pub fn mark(&mut self, index: usize) {
        assert!(index < self.count, "element index {index} out of range");
        let bit = 1 << (index % 64);
        match index / 64 {
            0 => self.lower |= bit,
            n => self.upper[n - 1] |= bit,
        }
    }

    #[inline]
    pub fn is_marked(&self, index: usize) -> bool {
        if index >= self.count {
            return false;
        }
        let (word, bit) = self.word(index);
        word & bit != 0
    }

    /// Finds the first unmarked element accepted by `accept`, marks it and
    /// returns it.
    pub fn next_unmarked(&mut self, mut accept: impl FnMut(usize) -> bool) -> Option<usize> {
        let index = (0..self.count).find(|&index| !self.is_marked(index) && accept(index))?;
        self.mark(index);
        Some(index)
    }

    /// Fails with [`SerialError::MissingField`] naming every unmarked element
    /// that is not optional.
    pub fn check_required(&self, descriptor: &SerialDescriptor) -> SerialResult<()> {
        let missing: Vec<String> = (0..self.count.min(descriptor.elements_count()))
            .filter(|&index| !self.is_marked(index) && !descriptor.is_element_optional(index))
            .map(|index| descriptor.element_name(index).to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SerialError::missing_fields(descriptor.serial_name(), missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ElementMarker;
    use crate::SerialErrorKind;
    use crate::descriptors::{SerialDescriptor, SerialKind};
    use crate::{Described, Serializable};

    #[test]
    fn spills_past_one_word() {
        let mut marker = ElementMarker::new(130);
        marker.mark(0);
        marker.mark(64);
        marker.mark(129);
        assert!(marker.is_marked(64) && marker.is_marked(129));
        assert!(!marker.is_marked(65));
        assert!(!marker.is_marked(500));
    }

    #[test]
    fn reports_every_missing_required_element() {
        let int = <i32 as Serializable>::serializer().descriptor();
        let descriptor = SerialDescriptor::builder("Triple", SerialKind::Class)
            .element("a", int)
            .optional_element("b", int)
            .element("c", int)
            .element("d", int)
            .build();

        let mut marker = ElementMarker::new(descriptor.elements_count());
        marker.mark(2);
        let err = marker.check_required(&descriptor).unwrap_err();

        assert_eq!(err.kind(), SerialErrorKind::MissingField);
        match err {
            crate::SerialError::MissingField { fields, .. } => assert_eq!(fields, ["a", "d"]),
            other => panic!("unexpected error {other:?}"),
        }
    }
}

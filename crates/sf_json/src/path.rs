use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Display, Formatter, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// A composite was entered but no element has been reached yet.
    Open,
    Key(String),
    MapKey(String),
    Index(usize),
}

/// The location of the decoder inside the input, rendered as `$.a.b[2]`.
///
/// One segment is pushed per open composite and updated as its elements
/// are reached.
#[derive(Debug, Default, Clone)]
pub(crate) struct JsonPath {
    stack: Vec<Segment>,
}

impl JsonPath {
    pub const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self) {
        self.stack.push(Segment::Open);
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    fn set(&mut self, segment: Segment) {
        match self.stack.last_mut() {
            Some(top) => *top = segment,
            None => self.stack.push(segment),
        }
    }

    pub fn key(&mut self, name: &str) {
        self.set(Segment::Key(name.into()));
    }

    pub fn map_key(&mut self, key: &str) {
        self.set(Segment::MapKey(key.into()));
    }

    pub fn index(&mut self, index: usize) {
        self.set(Segment::Index(index));
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_char('$')?;
        for segment in &self.stack {
            match segment {
                Segment::Open => {}
                Segment::Key(name) => write!(f, ".{name}")?,
                Segment::MapKey(key) => write!(f, "['{key}']")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::JsonPath;

    #[test]
    fn renders_nested_locations() {
        let mut path = JsonPath::new();
        assert_eq!(path.to_string(), "$");

        path.push();
        path.key("projects");
        path.push();
        assert_eq!(path.to_string(), "$.projects");
        path.index(2);
        path.push();
        path.key("tags");
        assert_eq!(path.to_string(), "$.projects[2].tags");

        path.pop();
        path.pop();
        path.key("owners");
        path.push();
        path.map_key("rust");
        assert_eq!(path.to_string(), "$.owners['rust']");
    }
}

use crate::record::Record;

/// An ordered sequence of [`Record`]s produced by a single source read, or
/// returned by a single processor invocation. Order is significant and is
/// preserved end to end; a batch may be empty.
#[derive(Debug, Clone, Default)]
pub struct Batch(Vec<Record>);

impl Batch {
    pub fn new(records: Vec<Record>) -> Self {
        Self(records)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.0
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.0
    }
}

impl From<Vec<Record>> for Batch {
    fn from(records: Vec<Record>) -> Self {
        Self(records)
    }
}

impl IntoIterator for Batch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Record> for Batch {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

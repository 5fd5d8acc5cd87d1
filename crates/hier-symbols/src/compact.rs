/// A list optimized for the overwhelmingly common zero- and one-element cases.
///
/// Member lists, supertype lists and qualified-name buckets almost always hold
/// at most one entry; only the rare larger lists pay for a heap allocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Compact<T> {
    Empty,
    One(T),
    Many(Box<[T]>),
}

impl<T> Default for Compact<T> {
    fn default() -> Self {
        Compact::Empty
    }
}

impl<T> Compact<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            Compact::Empty => &[],
            Compact::One(value) => std::slice::from_ref(value),
            Compact::Many(values) => values,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Compact::Empty)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn push(&mut self, value: T) {
        let len = self.len();
        self.insert(len, value);
    }

    /// Insert `value` at `index`, shifting later elements.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        *self = match std::mem::take(self) {
            Compact::Empty => {
                assert!(index == 0, "insert index {index} out of bounds");
                Compact::One(value)
            }
            Compact::One(existing) => {
                let pair = match index {
                    0 => vec![value, existing],
                    1 => vec![existing, value],
                    _ => panic!("insert index {index} out of bounds"),
                };
                Compact::Many(pair.into_boxed_slice())
            }
            Compact::Many(values) => {
                let mut values = values.into_vec();
                values.insert(index, value);
                Compact::Many(values.into_boxed_slice())
            }
        };
    }

    /// Insert keeping the list sorted by `key`; equal keys keep insertion order.
    pub fn insert_sorted_by_key<K: Ord>(&mut self, value: T, key: impl Fn(&T) -> K) {
        let probe = key(&value);
        let index = self.as_slice().partition_point(|existing| key(existing) <= probe);
        self.insert(index, value);
    }

    /// The contiguous run of elements whose key equals `probe`, in a list
    /// sorted by `key`.
    pub fn equal_range_by_key<K: Ord>(&self, probe: &K, key: impl Fn(&T) -> K) -> &[T] {
        let slice = self.as_slice();
        let start = slice.partition_point(|existing| key(existing) < *probe);
        let end = start + slice[start..].partition_point(|existing| key(existing) == *probe);
        &slice[start..end]
    }
}

impl<T> From<Vec<T>> for Compact<T> {
    fn from(mut values: Vec<T>) -> Self {
        match values.len() {
            0 => Compact::Empty,
            1 => match values.pop() {
                Some(value) => Compact::One(value),
                None => Compact::Empty,
            },
            _ => Compact::Many(values.into_boxed_slice()),
        }
    }
}

impl<T> FromIterator<T> for Compact<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Compact::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a, T> IntoIterator for &'a Compact<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

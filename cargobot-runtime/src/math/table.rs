/// Lookup table with linear interpolation.
///
/// Keys are kept in ascending order. A lookup below the first key or above
/// the last key is clamped to the outermost value. Lookups in an empty table
/// return zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InterpolationTable {
    points: Vec<(f64, f64)>,
}

impl InterpolationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point, replacing the value of an existing key.
    pub fn insert(&mut self, key: f64, value: f64) {
        match self.points.binary_search_by(|(k, _)| k.total_cmp(&key)) {
            Ok(index) => self.points[index].1 = value,
            Err(index) => self.points.insert(index, (key, value)),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lookup the value at the key.
    pub fn get(&self, key: f64) -> f64 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return 0.0;
        };

        if key <= first.0 {
            return first.1;
        }
        if key >= last.0 {
            return last.1;
        }

        let upper = self.points.partition_point(|(k, _)| *k <= key);
        let (k0, v0) = self.points[upper - 1];
        let (k1, v1) = self.points[upper];

        if k1 == k0 {
            return v0;
        }

        super::lerp(v0, v1, (key - k0) / (k1 - k0))
    }
}

impl FromIterator<(f64, f64)> for InterpolationTable {
    fn from_iter<T: IntoIterator<Item = (f64, f64)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (key, value) in iter {
            table.insert(key, value);
        }
        table
    }
}

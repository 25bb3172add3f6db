//! Named attribute arrays and their containers.

/// A named array of `num_tuples × num_components` values, stored tuple-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    pub name: String,
    pub num_components: usize,
    pub values: Vec<f64>,
}

impl DataArray {
    pub fn new(name: impl Into<String>, num_components: usize, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            num_components,
            values,
        }
    }

    pub fn num_tuples(&self) -> usize {
        if self.num_components == 0 {
            0
        } else {
            self.values.len() / self.num_components
        }
    }

    /// Values of one tuple.
    pub fn tuple(&self, index: usize) -> &[f64] {
        let start = index * self.num_components;
        &self.values[start..start + self.num_components]
    }
}

/// Capability interface of an attribute container: list, look up and add
/// arrays by name.
pub trait NamedArrays {
    fn names(&self) -> Vec<&str>;

    fn get(&self, name: &str) -> Option<&DataArray>;

    /// Insert an array; an existing array with the same name is replaced.
    fn add(&mut self, array: DataArray);
}

/// Ordered attribute container (point, cell or field data).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataArrays {
    arrays: Vec<DataArray>,
}

impl DataArrays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataArray> {
        self.arrays.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DataArray> {
        self.arrays.iter_mut()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DataArray> {
        self.arrays.iter_mut().find(|a| a.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<DataArray> {
        let idx = self.arrays.iter().position(|a| a.name == name)?;
        Some(self.arrays.remove(idx))
    }
}

impl NamedArrays for DataArrays {
    fn names(&self) -> Vec<&str> {
        self.arrays.iter().map(|a| a.name.as_str()).collect()
    }

    fn get(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    fn add(&mut self, array: DataArray) {
        match self.arrays.iter_mut().find(|a| a.name == array.name) {
            Some(existing) => *existing = array,
            None => self.arrays.push(array),
        }
    }
}

impl FromIterator<DataArray> for DataArrays {
    fn from_iter<I: IntoIterator<Item = DataArray>>(iter: I) -> Self {
        let mut arrays = DataArrays::new();
        for array in iter {
            arrays.add(array);
        }
        arrays
    }
}

impl IntoIterator for DataArrays {
    type Item = DataArray;
    type IntoIter = std::vec::IntoIter<DataArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.arrays.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_replaces_same_name() {
        let mut arrays = DataArrays::new();
        arrays.add(DataArray::new("p", 1, vec![1.0, 2.0]));
        arrays.add(DataArray::new("u", 3, vec![0.0; 6]));
        arrays.add(DataArray::new("p", 1, vec![5.0, 6.0]));

        assert_eq!(arrays.len(), 2);
        assert_eq!(arrays.names(), vec!["p", "u"]);
        assert_eq!(arrays.get("p").map(|a| a.values.clone()), Some(vec![5.0, 6.0]));
    }

    #[test]
    fn tuples() {
        let array = DataArray::new("u", 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(array.num_tuples(), 2);
        assert_eq!(array.tuple(1), &[4.0, 5.0, 6.0]);
        assert_eq!(DataArray::new("empty", 0, vec![]).num_tuples(), 0);
    }

    #[test]
    fn remove_by_name() {
        let mut arrays: DataArrays = vec![
            DataArray::new("a", 1, vec![1.0]),
            DataArray::new("b", 1, vec![2.0]),
        ]
        .into_iter()
        .collect();
        assert!(arrays.remove("a").is_some());
        assert!(arrays.remove("a").is_none());
        assert_eq!(arrays.names(), vec!["b"]);
    }
}

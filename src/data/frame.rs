use indexmap::IndexMap;

use super::Scalar;
use crate::error::{Error, Result};

/// A column-oriented table: an index plus ordered, equal-length named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub name: Option<String>,
    pub index_name: Option<String>,
    index: Vec<Scalar>,
    columns: IndexMap<String, Vec<Scalar>>,
}

impl Frame {
    /// An empty frame over `index`.
    pub fn new(index: Vec<Scalar>) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// A frame over `columns` with a positional index. All columns must have the same length.
    pub fn from_columns<I, K, V>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        let mut frame: Option<Frame> = None;
        for (name, values) in columns {
            let values: Vec<Scalar> = values.into_iter().map(Into::into).collect();
            let current =
                frame.get_or_insert_with(|| Frame::new((0..values.len()).map(Scalar::from).collect()));
            current.push_column(name, values)?;
        }
        Ok(frame.unwrap_or_default())
    }

    /// Rows of `(column, value)` records sharing the key order of the first record. Every record
    /// must have a value for every column.
    pub fn from_records(records: Vec<IndexMap<String, Scalar>>) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let mut frame = Frame::new((0..records.len()).map(Scalar::from).collect());
        for name in names {
            let column = records
                .iter()
                .enumerate()
                .map(|(row, record)| {
                    record.get(&name).cloned().ok_or_else(|| {
                        Error::load(format!("record {row} has no value for column \"{name}\""))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            frame.push_column(name, column)?;
        }
        Ok(frame)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Scalar>) -> Result<Self> {
        self.push_column(name, values)?;
        Ok(self)
    }

    /// Append a column, replacing any column of the same name in place.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Scalar>) -> Result<()> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(Error::load(format!(
                "column \"{name}\" has {} values but the index has {}",
                values.len(),
                self.index.len()
            )));
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn index(&self) -> &[Scalar] {
        &self.index
    }

    pub fn set_index(&mut self, index: Vec<Scalar>) -> Result<()> {
        if index.len() != self.index.len() {
            return Err(Error::load(
                "length of index must be equal to number of rows of frame",
            ));
        }
        self.index = index;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[Scalar]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Scalar])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// A frame holding only `names`, in that order.
    pub fn select(&self, names: &[String]) -> Result<Frame> {
        let mut selected = Frame {
            name: self.name.clone(),
            index_name: self.index_name.clone(),
            index: self.index.clone(),
            columns: IndexMap::new(),
        };
        for name in names {
            let column = self
                .column(name)
                .ok_or_else(|| Error::load(format!("column \"{name}\" not found")))?;
            selected.columns.insert(name.clone(), column.to_vec());
        }
        Ok(selected)
    }
}

/// A single named column with its own index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub name: Option<String>,
    pub index: Vec<Scalar>,
    pub values: Vec<Scalar>,
}

impl Series {
    /// A series with a positional index.
    pub fn new<V: Into<Scalar>>(values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Scalar> = values.into_iter().map(Into::into).collect();
        Self {
            name: None,
            index: (0..values.len()).map(Scalar::from).collect(),
            values,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_index(mut self, index: Vec<Scalar>) -> Result<Self> {
        if index.len() != self.values.len() {
            return Err(Error::load(
                "length of index must be equal to number of values",
            ));
        }
        self.index = index;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_must_match_index_length() {
        let frame = Frame::from_columns([("a", vec![1, 2, 3]), ("b", vec![4, 5, 6])]).unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.column_names().collect::<Vec<_>>(), ["a", "b"]);

        let err = Frame::from_columns([("a", vec![1, 2, 3]), ("b", vec![4])]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "column \"b\" has 1 values but the index has 3"
        );
    }

    #[test]
    fn records_must_share_columns() {
        let records = vec![
            IndexMap::from([("x".to_owned(), Scalar::Int(1))]),
            IndexMap::from([
                ("x".to_owned(), Scalar::Int(2)),
                ("y".to_owned(), Scalar::Int(3)),
            ]),
        ];
        let err = Frame::from_records(records).unwrap_err();
        assert!(matches!(err, Error::Load(_)));
        assert_eq!(err.to_string(), "record 0 has no value for column \"y\"");
    }

    #[test]
    fn select_missing_column() {
        let frame = Frame::from_columns([("a", vec![1])]).unwrap();
        assert!(frame.select(&["b".to_owned()]).is_err());
    }
}

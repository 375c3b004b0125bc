//! Loaders turning tabular input into `Data` rows.
//!
//! Long-form rows look like `{"idx": <index>, "col": <column>, "val": <value>}`, which is the
//! shape every chart template reads through `data.idx`, `data.col` and `data.val`.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::*;

use super::{serialize, Data, Frame, Scalar, Series, DEFAULT_INDEX_KEY};
use crate::error::{Error, Result};
use crate::grammar::Kind;

/// Column name used by single-sequence loaders.
const SEQUENCE_COLUMN: &str = "data";

/// Options shared by the table loaders.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Data set name. Falls back to the input's own name, then `"table"`.
    pub name: Option<String>,
    /// Only load these columns, in this order.
    pub columns: Option<Vec<String>>,
    /// Use this column's values as the index.
    pub key_on: Option<String>,
    /// Key the index is stored under. Falls back to the index name, then `"idx"`.
    pub index_key: Option<String>,
    /// `col` value for a series. Falls back to the series name, then `"data"`.
    pub series_key: Option<String>,
    /// Tag every row with the position of its column under `"group"`.
    pub grouped: bool,
    /// For JSON objects of arrays: load with [`Data::from_mult_iters`] using this column as the
    /// index.
    pub iter_idx: Option<String>,
}

impl LoadOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Input accepted by [`Data::keypairs`].
#[derive(Debug, Clone)]
pub enum KeyPairs {
    /// Values keyed by position.
    Sequence(Vec<Scalar>),
    Pairs(Vec<(Scalar, Scalar)>),
    /// Loaded in key order.
    Map(BTreeMap<String, Scalar>),
    /// With `use_index`, `x` is the index and `y` the first of `columns`. Otherwise `x` and `y`
    /// are the first two of `columns`.
    Frame {
        frame: Frame,
        columns: Vec<String>,
        use_index: bool,
    },
}

fn long_row(index_key: &str, idx: Value, col: &str, val: Value, group: Option<usize>) -> Value {
    let mut row = Map::new();
    row.insert(index_key.to_owned(), idx);
    row.insert("col".to_owned(), Value::String(col.to_owned()));
    row.insert("val".to_owned(), val);
    if let Some(group) = group {
        row.insert("group".to_owned(), Value::from(group));
    }
    Value::Object(row)
}

fn xy_row(x: Value, y: Value) -> Value {
    let mut row = Map::new();
    row.insert("x".to_owned(), x);
    row.insert("y".to_owned(), y);
    Value::Object(row)
}

fn frame_column<'a>(frame: &'a Frame, name: &str) -> Result<&'a [Scalar]> {
    frame
        .column(name)
        .ok_or_else(|| Error::load(format!("column \"{name}\" not found")))
}

impl Data {
    /// Load a [`Frame`] as long-form rows, row-major: every column of the first row, then every
    /// column of the second, and so on.
    pub fn from_table(frame: &Frame, options: &LoadOptions) -> Result<Self> {
        let name = options.name.as_deref().or(frame.name.as_deref());

        let mut table = match &options.columns {
            Some(columns) => frame.select(columns)?,
            None => frame.clone(),
        };
        if let Some(key_on) = &options.key_on {
            table.set_index(frame_column(frame, key_on)?.to_vec())?;
        }

        let index_key = options
            .index_key
            .as_deref()
            .or(table.index_name.as_deref())
            .unwrap_or(DEFAULT_INDEX_KEY);

        let mut rows = Vec::new();
        for (i, idx) in table.index().iter().enumerate() {
            let idx = serialize(idx.clone())?;
            for (group, (col, values)) in table.columns().enumerate() {
                rows.push(long_row(
                    index_key,
                    idx.clone(),
                    col,
                    serialize(values[i].clone())?,
                    options.grouped.then_some(group),
                ));
            }
        }

        Self::with_rows(name, rows)
    }

    /// Load a single [`Series`] as long-form rows.
    pub fn from_series(series: &Series, options: &LoadOptions) -> Result<Self> {
        let name = options.name.as_deref().or(series.name.as_deref());
        let col = options
            .series_key
            .as_deref()
            .or(series.name.as_deref())
            .unwrap_or(SEQUENCE_COLUMN);
        let index_key = options.index_key.as_deref().unwrap_or(DEFAULT_INDEX_KEY);

        let rows = series
            .index
            .iter()
            .zip(&series.values)
            .map(|(idx, val)| {
                Ok(long_row(
                    index_key,
                    serialize(idx.clone())?,
                    col,
                    serialize(val.clone())?,
                    options.grouped.then_some(0),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::with_rows(name, rows)
    }

    /// Load a two-dimensional array as wide rows `{idx, <column>: value, ...}`.
    ///
    /// `index` defaults to row positions.
    pub fn from_array(
        rows: Vec<Vec<Scalar>>,
        columns: &[&str],
        index: Option<Vec<Scalar>>,
        options: &LoadOptions,
    ) -> Result<Self> {
        let index = index.unwrap_or_else(|| (0..rows.len()).map(Scalar::from).collect());
        if index.len() != rows.len() {
            return Err(Error::load(
                "length of index must be equal to number of rows of array",
            ));
        }
        if rows.iter().any(|row| row.len() != columns.len()) {
            return Err(Error::load(
                "length of columns must be equal to number of columns of array",
            ));
        }

        let index_key = options.index_key.as_deref().unwrap_or(DEFAULT_INDEX_KEY);
        let values = index
            .into_iter()
            .zip(rows)
            .map(|(idx, row)| {
                let mut wide = Map::new();
                wide.insert(index_key.to_owned(), serialize(idx)?);
                for (col, value) in columns.iter().zip(row) {
                    wide.insert((*col).to_owned(), serialize(value)?);
                }
                Ok(Value::Object(wide))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::with_rows(options.name.as_deref(), values)
    }

    /// Load a sequence, indexed by position, under the column `"data"`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<V: Into<Scalar>>(
        values: impl IntoIterator<Item = V>,
        name: Option<&str>,
    ) -> Result<Self> {
        Self::from_iter_pairs(
            values
                .into_iter()
                .enumerate()
                .map(|(i, value)| (Scalar::from(i), value.into())),
            name,
        )
    }

    /// Load `(index, value)` pairs under the column `"data"`.
    pub fn from_iter_pairs<K: Into<Scalar>, V: Into<Scalar>>(
        pairs: impl IntoIterator<Item = (K, V)>,
        name: Option<&str>,
    ) -> Result<Self> {
        let rows = pairs
            .into_iter()
            .map(|(idx, val)| {
                Ok(long_row(
                    DEFAULT_INDEX_KEY,
                    serialize(idx)?,
                    SEQUENCE_COLUMN,
                    serialize(val)?,
                    None,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::with_rows(name, rows)
    }

    /// Load named, equal-length columns. Column `idx` becomes the index; every other column is
    /// loaded in name order, column-major.
    pub fn from_mult_iters(
        columns: IndexMap<String, Vec<Scalar>>,
        idx: &str,
        name: Option<&str>,
    ) -> Result<Self> {
        let mut lengths = columns.values().map(Vec::len);
        if let Some(first) = lengths.next() {
            if lengths.any(|len| len != first) {
                return Err(Error::load("iterables must all be same length"));
            }
        }

        let index = columns
            .get(idx)
            .ok_or_else(|| Error::load(format!("index iterable \"{idx}\" not found")))?
            .iter()
            .map(|value| serialize(value.clone()))
            .collect::<Result<Vec<_>>>()?;

        let mut others: Vec<(&String, &Vec<Scalar>)> =
            columns.iter().filter(|(col, _)| *col != idx).collect();
        others.sort_by(|a, b| a.0.cmp(b.0));

        let mut rows = Vec::new();
        for (col, values) in others {
            for (i, value) in index.iter().zip(values) {
                rows.push(long_row(
                    DEFAULT_INDEX_KEY,
                    i.clone(),
                    col,
                    serialize(value.clone())?,
                    None,
                ));
            }
        }

        Self::with_rows(name, rows)
    }

    /// Load `{"x": ..., "y": ...}` rows.
    pub fn keypairs(input: KeyPairs, name: Option<&str>) -> Result<Self> {
        let pairs: Vec<(Scalar, Scalar)> = match input {
            KeyPairs::Sequence(values) => values
                .into_iter()
                .enumerate()
                .map(|(i, value)| (Scalar::from(i), value))
                .collect(),
            KeyPairs::Pairs(pairs) => pairs,
            KeyPairs::Map(map) => map
                .into_iter()
                .map(|(key, value)| (Scalar::Str(key), value))
                .collect(),
            KeyPairs::Frame {
                frame,
                columns,
                use_index,
            } => {
                let (x, y) = match (use_index, columns.as_slice()) {
                    (true, [y, ..]) => (frame.index().to_vec(), frame_column(&frame, y)?.to_vec()),
                    (false, [x, y, ..]) => (
                        frame_column(&frame, x)?.to_vec(),
                        frame_column(&frame, y)?.to_vec(),
                    ),
                    _ => {
                        return Err(Error::load(
                            "not enough columns given to load key pairs",
                        ))
                    }
                };
                x.into_iter().zip(y).collect()
            }
        };

        let rows = pairs
            .into_iter()
            .map(|(x, y)| Ok(xy_row(serialize(x)?, serialize(y)?)))
            .collect::<Result<Vec<_>>>()?;
        Self::with_rows(name, rows)
    }

    /// Load a runtime JSON document, dispatching on its shape:
    ///
    /// * an array of scalars loads with [`Data::from_iter`];
    /// * an array of two-element arrays loads as `(index, value)` pairs;
    /// * an array of objects loads as a table of records;
    /// * an object of arrays loads as a table of columns, or with [`Data::from_mult_iters`]
    ///   when `options.iter_idx` is set;
    /// * an object of scalars loads as `(key, value)` pairs in key order.
    pub fn from_json_input(input: Value, options: &LoadOptions) -> Result<Self> {
        let name = options.name.as_deref();
        match input {
            Value::Array(items) => {
                if items.iter().all(is_scalar) {
                    debug!("loading array of scalars");
                    Self::from_iter(items, name)
                } else if items.iter().all(is_pair) {
                    debug!("loading array of pairs");
                    let pairs = items.into_iter().filter_map(|item| match item {
                        Value::Array(pair) => {
                            let mut pair = pair.into_iter();
                            Some((pair.next()?, pair.next()?))
                        }
                        _ => None,
                    });
                    Self::from_iter_pairs(pairs, name)
                } else if items.iter().all(Value::is_object) {
                    debug!("loading array of records");
                    let records = items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::Object(record) => Some(
                                record
                                    .into_iter()
                                    .map(|(key, value)| (key, Scalar::from(value)))
                                    .collect(),
                            ),
                            _ => None,
                        })
                        .collect();
                    Self::from_table(&Frame::from_records(records)?, options)
                } else {
                    Err(unsupported(&Value::Array(items)))
                }
            }
            Value::Object(map) => {
                if map.values().all(Value::is_array) {
                    let columns: IndexMap<String, Vec<Scalar>> = map
                        .into_iter()
                        .map(|(key, value)| {
                            let values = match value {
                                Value::Array(items) => items.into_iter().map(Scalar::from).collect(),
                                _ => Vec::new(),
                            };
                            (key, values)
                        })
                        .collect();
                    match &options.iter_idx {
                        Some(idx) => {
                            debug!(%idx, "loading object of iterables");
                            Self::from_mult_iters(columns, idx, name)
                        }
                        None => {
                            debug!("loading object of columns");
                            Self::from_table(&Frame::from_columns(columns)?, options)
                        }
                    }
                } else if map.values().all(is_scalar) {
                    debug!("loading object of scalars");
                    let sorted: BTreeMap<String, Value> = map.into_iter().collect();
                    Self::from_iter_pairs(sorted, name)
                } else {
                    Err(unsupported(&Value::Object(map)))
                }
            }
            other => Err(unsupported(&other)),
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(Kind::of(value), Kind::Str | Kind::Int | Kind::Float)
}

fn is_pair(value: &Value) -> bool {
    value.as_array().is_some_and(|pair| pair.len() == 2)
}

fn unsupported(value: &Value) -> Error {
    Error::load(format!(
        "This data type is not supported: {}",
        Kind::of(value)
    ))
}

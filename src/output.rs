//! Serializing a visualization to JSON text and files.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::*;

use crate::error::{Error, Result};
use crate::grammar::GrammarValue;
use crate::visualization::Visualization;

/// Scaffold page loading a grammar file; `$path` is replaced with the grammar's path.
pub const HTML_TEMPLATE: &str = include_str!("../templates/vega_template.html");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Indent with two spaces.
    pub pretty: bool,
    /// Run `validate()` first and fail instead of producing output.
    pub validate: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            validate: false,
        }
    }
}

/// Where [`Visualization::write_split`] puts its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// The grammar file.
    pub path: PathBuf,
    /// The data file. The grammar references it by this path.
    pub data_path: PathBuf,
    /// Also write the HTML scaffold here.
    pub html_path: Option<PathBuf>,
    pub json: JsonOptions,
}

impl SplitOptions {
    pub fn new(path: impl Into<PathBuf>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data_path: data_path.into(),
            html_path: None,
            json: JsonOptions::default(),
        }
    }
}

/// The HTML scaffold for a grammar stored at `path`.
pub fn render_html(path: &str) -> String {
    HTML_TEMPLATE.replace("$path", path)
}

fn encode(value: &Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    debug!(path = %path.display(), bytes = contents.len(), "writing file");
    fs::write(path, contents).map_err(|source| Error::io(path, source))
}

impl Visualization {
    /// The whole tree flattened to a JSON value. Nothing is validated.
    pub fn to_json_value(&self) -> Value {
        GrammarValue::to_json(self)
    }

    pub fn to_json(&self, options: &JsonOptions) -> Result<String> {
        if options.validate {
            GrammarValue::validate(self)?;
        }
        encode(&self.to_json_value(), options.pretty)
    }

    pub fn write_json(&self, path: impl AsRef<Path>, options: &JsonOptions) -> Result<()> {
        write_file(path.as_ref(), &self.to_json(options)?)
    }

    /// Split off the `values` of the first data set.
    ///
    /// Returns the grammar, whose first data set loads from `data_path` instead of carrying its
    /// values inline, and the values themselves. `self` is left untouched. A first data set that
    /// already loads from elsewhere has nothing to split and is an error.
    pub fn split_json(&self, data_path: &str) -> Result<(Value, Value)> {
        let mut split = self.clone();
        let data = split
            .data_mut()
            .and_then(|data| data.get_by_index_mut(0))
            .ok_or_else(|| {
                Error::Validation("data must be defined for valid visualization".to_owned())
            })?;

        let values = data.values().cloned().ok_or_else(|| {
            Error::Validation("first data set has no values to split".to_owned())
        })?;
        data.clear_values().set_url(data_path)?;
        trace!(data_path, rows = values.len(), "split data values");

        Ok((split.to_json_value(), Value::Array(values)))
    }

    /// Write the grammar and its first data set's values to separate files, plus the HTML
    /// scaffold if asked.
    pub fn write_split(&self, options: &SplitOptions) -> Result<()> {
        if options.json.validate {
            GrammarValue::validate(self)?;
        }

        let data_url = options.data_path.to_string_lossy();
        let (grammar, values) = self.split_json(&data_url)?;
        write_file(&options.data_path, &encode(&values, options.json.pretty)?)?;
        write_file(&options.path, &encode(&grammar, options.json.pretty)?)?;

        if let Some(html_path) = &options.html_path {
            write_file(html_path, &render_html(&options.path.to_string_lossy()))?;
        }
        Ok(())
    }
}

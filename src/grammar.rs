//! The validated-field mechanism every grammar class is built from.
//!
//! A grammar object owns a [`Grammar`] store: an insertion-ordered map from serialized key to a
//! type-erased value. Each field is described by a [`Field`] constant that knows its in-language
//! name, its serialized key, the runtime kinds it accepts and a validator. Writes go through
//! [`Grammar::set`], which runs the kind check and the validator before touching the map, so a
//! rejected write leaves the previous value in place.
//!
//! The accessors themselves are generated by [`grammar_class!`](crate::grammar_class).

use std::any::Any;
use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Runtime kind of a grammar value, used for declared type constraints and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
    /// A grammar class, named by its class name.
    Object(&'static str),
}

impl Kind {
    /// Kind of a JSON literal. Numbers that fit an integer are `Int`, everything else is `Float`.
    pub fn of(value: &Value) -> Kind {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => Kind::Int,
            Value::Number(_) => Kind::Float,
            Value::String(_) => Kind::Str,
            Value::Array(_) => Kind::List,
            Value::Object(_) => Kind::Map,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Null => f.write_str("null"),
            Kind::Bool => f.write_str("bool"),
            Kind::Int => f.write_str("int"),
            Kind::Float => f.write_str("float"),
            Kind::Str => f.write_str("str"),
            Kind::List => f.write_str("list"),
            Kind::Map => f.write_str("dict"),
            Kind::Object(class) => f.write_str(class),
        }
    }
}

/// Object-safe helpers every [`GrammarValue`] gets for free.
pub trait ErasedValue {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn clone_boxed(&self) -> Box<dyn GrammarValue>;
}

impl<T: GrammarValue + Clone> ErasedValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn GrammarValue> {
        Box::new(self.clone())
    }
}

/// Anything that can be stored in a [`Grammar`] and flattened to JSON.
pub trait GrammarValue: ErasedValue + fmt::Debug + 'static {
    fn kind(&self) -> Kind;

    fn to_json(&self) -> Value;

    /// Validate nested grammar objects. Plain values have nothing to check.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// The value as a lookup key, if it is a string.
    fn as_key(&self) -> Option<&str> {
        None
    }
}

impl Clone for Box<dyn GrammarValue> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

/// Construction from a runtime JSON document, used by `from_json` on every grammar class.
pub trait FromJson: Sized {
    /// `field` names the destination for error messages.
    fn from_json(value: Value, field: &str) -> Result<Self>;
}

impl GrammarValue for String {
    fn kind(&self) -> Kind {
        Kind::Str
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }

    fn as_key(&self) -> Option<&str> {
        Some(self)
    }
}

impl FromJson for String {
    fn from_json(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(Error::mismatch(field, &[Kind::Str])),
        }
    }
}

impl GrammarValue for bool {
    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromJson for bool {
    fn from_json(value: Value, field: &str) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::mismatch(field, &[Kind::Bool]))
    }
}

impl GrammarValue for i64 {
    fn kind(&self) -> Kind {
        Kind::Int
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl FromJson for i64 {
    fn from_json(value: Value, field: &str) -> Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| Error::mismatch(field, &[Kind::Int]))
    }
}

impl GrammarValue for f64 {
    fn kind(&self) -> Kind {
        Kind::Float
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl FromJson for f64 {
    fn from_json(value: Value, field: &str) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| Error::mismatch(field, &[Kind::Int, Kind::Float]))
    }
}

/// Union-typed fields hold a JSON literal; its runtime kind is checked against the field's
/// `accepts` list on every write.
impl GrammarValue for Value {
    fn kind(&self) -> Kind {
        Kind::of(self)
    }

    fn to_json(&self) -> Value {
        self.clone()
    }

    fn as_key(&self) -> Option<&str> {
        self.as_str()
    }
}

impl FromJson for Value {
    fn from_json(value: Value, _field: &str) -> Result<Self> {
        Ok(value)
    }
}

impl<T: GrammarValue + Clone> GrammarValue for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::List
    }

    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(GrammarValue::to_json).collect())
    }

    fn validate(&self) -> Result<()> {
        self.iter().try_for_each(GrammarValue::validate)
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(value: Value, field: &str) -> Result<Self> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| T::from_json(item, &format!("{field}[{i}]")))
                .collect(),
            _ => Err(Error::mismatch(field, &[Kind::List])),
        }
    }
}

/// Declaration of one validated field of a grammar class.
pub struct Field<T> {
    /// In-language name, used in error messages.
    pub name: &'static str,
    /// Key the value is stored and serialized under.
    pub key: &'static str,
    /// Allowed runtime kinds; empty means unconstrained.
    pub accepts: &'static [Kind],
    pub check: fn(&T) -> Result<()>,
}

impl<T: GrammarValue> Field<T> {
    /// Run the kind constraint and then the validator against a candidate value.
    pub fn admit(&self, value: &T) -> Result<()> {
        if !self.accepts.is_empty() && !self.accepts.contains(&value.kind()) {
            return Err(Error::mismatch(self.name, self.accepts));
        }
        (self.check)(value)
    }

    pub fn info(&self) -> FieldInfo {
        FieldInfo {
            name: self.name,
            key: self.key,
            accepts: self.accepts,
        }
    }
}

/// Validator for fields with no semantic constraint.
pub fn no_check<T>(_: &T) -> Result<()> {
    Ok(())
}

/// Type-erased view of a [`Field`], for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub key: &'static str,
    pub accepts: &'static [Kind],
}

/// The private, insertion-ordered field store of a grammar object.
///
/// Only fields that were explicitly assigned have a key. Clearing a field removes its key.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    entries: IndexMap<&'static str, Box<dyn GrammarValue>>,
}

impl Grammar {
    pub fn get<T: GrammarValue>(&self, field: &Field<T>) -> Option<&T> {
        self.entries
            .get(field.key)
            .and_then(|value| (**value).as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: GrammarValue>(&mut self, field: &Field<T>) -> Option<&mut T> {
        self.entries
            .get_mut(field.key)
            .and_then(|value| (**value).as_any_mut().downcast_mut::<T>())
    }

    /// Validate and store. On error the store is left untouched. Re-assigning an existing key
    /// keeps its position.
    pub fn set<T: GrammarValue>(&mut self, field: &Field<T>, value: T) -> Result<()> {
        field.admit(&value)?;
        self.entries.insert(field.key, Box::new(value));
        Ok(())
    }

    /// Remove a field. Clearing an absent field is a no-op.
    pub fn clear<T: GrammarValue>(&mut self, field: &Field<T>) {
        self.entries.shift_remove(field.key);
    }

    /// Mutable access to a field, storing `default()` first when it is unset.
    pub(crate) fn get_or_insert_with<T: GrammarValue>(
        &mut self,
        field: &Field<T>,
        default: impl FnOnce() -> T,
    ) -> &mut T {
        let slot = self
            .entries
            .entry(field.key)
            .or_insert_with(|| Box::new(default()));
        (**slot)
            .as_any_mut()
            .downcast_mut::<T>()
            .expect("infallible; a key is only ever written through its own field")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The stored value under a serialized key, without downcasting.
    pub fn raw(&self, key: &str) -> Option<&dyn GrammarValue> {
        self.entries.get(key).map(|value| &**value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &dyn GrammarValue)> + '_ {
        self.entries.iter().map(|(key, value)| (*key, &**value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten the store, recursing into every contained grammar value.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        self.to_json() == other.to_json()
    }
}

/// Common surface of every grammar class generated by [`grammar_class!`](crate::grammar_class).
pub trait GrammarObject: GrammarValue + FromJson + Clone + Default {
    const CLASS: &'static str;
    /// Attribute a [`KeyedList`](crate::KeyedList) of this class is keyed on by default.
    const KEY_ATTR: &'static str;
    const FIELD_TABLE: &'static [FieldInfo];

    fn grammar(&self) -> &Grammar;

    fn grammar_mut(&mut self) -> &mut Grammar;

    /// Re-run every stored value through its field's constraint and validator, then recurse.
    fn check_fields(&self) -> Result<()>;

    /// Look a field up by in-language name or serialized key.
    fn field_info(name_or_key: &str) -> Option<&'static FieldInfo> {
        Self::FIELD_TABLE
            .iter()
            .find(|info| info.name == name_or_key || info.key == name_or_key)
    }
}

/// Wrap a field-level failure found by whole-tree validation.
pub(crate) fn invalid_contents(err: Error) -> Error {
    match err {
        Error::Validation(_) => err,
        other => Error::Validation(format!("invalid contents: {other}")),
    }
}

pub(crate) fn expect_object(
    value: Value,
    class: &'static str,
    field: &str,
) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::mismatch(field, &[Kind::Object(class)])),
    }
}

/// Declare a grammar class: a struct wrapping a [`Grammar`] store plus one validated accessor
/// set per field.
///
/// ```ignore
/// grammar_class! {
///     pub struct Axis keyed "type" {
///         kind: String = "type" => check_axis_type;
///         title_offset: i64 = "titleOffset";
///         subdivide: Value = "subdivide" [Kind::Int, Kind::Float];
///     }
/// }
/// ```
///
/// Per field this generates a `FIELD` constant, `field()`, `field_mut()`, `set_field()`,
/// `with_field()` and `clear_field()`. The optional `init` hook runs inside `Default`, the
/// optional `validate` hook runs after the per-field checks of `validate()`.
#[macro_export]
macro_rules! grammar_class {
    (@check) => {
        $crate::grammar::no_check
    };
    (@check $check:expr) => {
        $check
    };
    (@key_attr) => {
        "name"
    };
    (@key_attr $key_attr:literal) => {
        $key_attr
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $class:ident
            $(keyed $key_attr:literal)?
            $(init $init:ident)?
            $(validate $extra:ident)?
        {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty = $key:literal
                    $([$($kind:expr),* $(,)?])?
                    $(=> $check:expr)?
            );* $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $class {
            grammar: $crate::grammar::Grammar,
        }

        impl Default for $class {
            fn default() -> Self {
                #[allow(unused_mut)]
                let mut this = Self {
                    grammar: $crate::grammar::Grammar::default(),
                };
                $($init(&mut this);)?
                this
            }
        }

        ::paste::paste! {
            #[allow(dead_code)]
            impl $class {
                $(
                    pub const [<$field:upper>]: $crate::grammar::Field<$ty> = $crate::grammar::Field {
                        name: stringify!($field),
                        key: $key,
                        accepts: &[$($($kind),*)?],
                        check: $crate::grammar_class!(@check $($check)?),
                    };
                )*

                pub fn new() -> Self {
                    Self::default()
                }

                $(
                    $(#[$fmeta])*
                    pub fn $field(&self) -> Option<&$ty> {
                        self.grammar.get(&Self::[<$field:upper>])
                    }

                    pub fn [<$field _mut>](&mut self) -> Option<&mut $ty> {
                        self.grammar.get_mut(&Self::[<$field:upper>])
                    }

                    pub fn [<set_ $field>](
                        &mut self,
                        value: impl Into<$ty>,
                    ) -> $crate::Result<&mut Self> {
                        self.grammar.set(&Self::[<$field:upper>], value.into())?;
                        Ok(self)
                    }

                    pub fn [<with_ $field>](mut self, value: impl Into<$ty>) -> $crate::Result<Self> {
                        self.grammar.set(&Self::[<$field:upper>], value.into())?;
                        Ok(self)
                    }

                    pub fn [<clear_ $field>](&mut self) -> &mut Self {
                        self.grammar.clear(&Self::[<$field:upper>]);
                        self
                    }
                )*

                /// Build from a JSON object. Unknown keys are rejected.
                pub fn from_json(value: ::serde_json::Value) -> $crate::Result<Self> {
                    <Self as $crate::grammar::FromJson>::from_json(value, "value")
                }
            }

            impl $crate::grammar::GrammarObject for $class {
                const CLASS: &'static str = stringify!($class);
                const KEY_ATTR: &'static str = $crate::grammar_class!(@key_attr $($key_attr)?);
                const FIELD_TABLE: &'static [$crate::grammar::FieldInfo] = &[
                    $(
                        $crate::grammar::FieldInfo {
                            name: stringify!($field),
                            key: $key,
                            accepts: &[$($($kind),*)?],
                        },
                    )*
                ];

                fn grammar(&self) -> &$crate::grammar::Grammar {
                    &self.grammar
                }

                fn grammar_mut(&mut self) -> &mut $crate::grammar::Grammar {
                    &mut self.grammar
                }

                fn check_fields(&self) -> $crate::Result<()> {
                    $(
                        if let Some(value) = self.grammar.get(&Self::[<$field:upper>]) {
                            Self::[<$field:upper>].admit(value)?;
                            $crate::grammar::GrammarValue::validate(value)?;
                        }
                    )*
                    Ok(())
                }
            }

            impl $crate::grammar::GrammarValue for $class {
                fn kind(&self) -> $crate::grammar::Kind {
                    $crate::grammar::Kind::Object(stringify!($class))
                }

                fn to_json(&self) -> ::serde_json::Value {
                    self.grammar.to_json()
                }

                fn validate(&self) -> $crate::Result<()> {
                    ::tracing::trace!(class = stringify!($class), "validating");
                    $crate::grammar::GrammarObject::check_fields(self)
                        .map_err($crate::grammar::invalid_contents)?;
                    $($extra(self)?;)?
                    Ok(())
                }
            }

            impl $crate::grammar::FromJson for $class {
                fn from_json(value: ::serde_json::Value, field: &str) -> $crate::Result<Self> {
                    let map = $crate::grammar::expect_object(value, stringify!($class), field)?;
                    let mut this = Self::default();
                    for (key, value) in map {
                        match key.as_str() {
                            $(
                                $key => {
                                    let value = <$ty as $crate::grammar::FromJson>::from_json(
                                        value,
                                        stringify!($field),
                                    )?;
                                    this.grammar.set(&Self::[<$field:upper>], value)?;
                                }
                            )*
                            _ => {
                                let keys = [$($key),*];
                                return Err($crate::Error::UnknownField {
                                    class: stringify!($class),
                                    suggestion: $crate::edit_distance::find_best_match(&key, &keys),
                                    field: key,
                                });
                            }
                        }
                    }
                    Ok(this)
                }
            }
        }
    };
}

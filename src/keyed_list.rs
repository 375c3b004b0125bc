use serde_json::Value;
use tracing::*;

use crate::error::{Error, Result};
use crate::grammar::{FromJson, GrammarObject, GrammarValue, Kind};

/// State of an element's key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAttr<'a> {
    /// The element's class does not declare the attribute at all.
    Missing,
    /// Declared but never assigned (or assigned a non-string value).
    Unset,
    Set(&'a str),
}

impl<'a> KeyAttr<'a> {
    fn as_option(self) -> Option<&'a str> {
        match self {
            KeyAttr::Set(key) => Some(key),
            KeyAttr::Missing | KeyAttr::Unset => None,
        }
    }
}

/// Elements that expose a named attribute usable as a lookup key.
pub trait Keyed {
    /// Look the attribute up by in-language name or serialized key.
    fn key_attr(&self, attr: &str) -> KeyAttr<'_>;
}

impl<T: GrammarObject> Keyed for T {
    fn key_attr(&self, attr: &str) -> KeyAttr<'_> {
        let Some(info) = T::field_info(attr) else {
            return KeyAttr::Missing;
        };
        match self.grammar().raw(info.key).and_then(|value| value.as_key()) {
            Some(key) => KeyAttr::Set(key),
            None => KeyAttr::Unset,
        }
    }
}

/// An ordered list addressable by position or by the value of a key attribute of its elements.
///
/// Key uniqueness is only enforced when a string key is looked up: every key-based read or
/// removal first fails with [`Error::DuplicateKey`] if any two elements share a key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedList<T> {
    attr: String,
    items: Vec<T>,
}

impl<T> Default for KeyedList<T> {
    fn default() -> Self {
        Self::new("name")
    }
}

impl<T> KeyedList<T> {
    /// An empty list keyed on `attr`.
    pub fn new(attr: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            items: Vec::new(),
        }
    }

    pub fn attr(&self) -> &str {
        &self.attr
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    pub fn get_by_index(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_by_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Replace the element at `index`. No key checks are made.
    pub fn set_by_index(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    pub fn remove_by_index(&mut self, index: usize) -> Result<T> {
        if index >= self.items.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }
}

impl<T: Keyed> KeyedList<T> {
    /// Every element's key, in order. Fails if any two elements share a key; elements without
    /// a key count as sharing the absent key.
    pub fn keys(&self) -> Result<Vec<Option<&str>>> {
        let keys: Vec<Option<&str>> = self
            .items
            .iter()
            .map(|item| item.key_attr(&self.attr).as_option())
            .collect();

        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) {
                debug!(attr = %self.attr, ?key, "duplicate key in keyed list");
                return Err(Error::DuplicateKey);
            }
        }

        Ok(keys)
    }

    fn position(&self, key: &str) -> Result<usize> {
        self.keys()?
            .iter()
            .position(|k| *k == Some(key))
            .ok_or_else(|| Error::KeyNotFound(key.to_owned()))
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.keys()?.contains(&Some(key)))
    }

    pub fn get_by_key(&self, key: &str) -> Result<&T> {
        let index = self.position(key)?;
        Ok(&self.items[index])
    }

    pub fn get_by_key_mut(&mut self, key: &str) -> Result<&mut T> {
        let index = self.position(key)?;
        Ok(&mut self.items[index])
    }

    pub fn remove_by_key(&mut self, key: &str) -> Result<T> {
        let index = self.position(key)?;
        Ok(self.items.remove(index))
    }

    /// Store `value` under `key`, replacing the first element holding that key or appending.
    ///
    /// The value's own key attribute must equal `key`. Duplicates already in the list are not
    /// an error here.
    pub fn set_by_key(&mut self, key: &str, value: T) -> Result<()> {
        match value.key_attr(&self.attr) {
            KeyAttr::Missing => return Err(Error::MissingKeyAttribute(self.attr.clone())),
            KeyAttr::Set(own) if own == key => {}
            KeyAttr::Set(_) | KeyAttr::Unset => return Err(Error::KeyMismatch(self.attr.clone())),
        }

        let existing = self
            .items
            .iter()
            .position(|item| item.key_attr(&self.attr) == KeyAttr::Set(key));

        match existing {
            Some(index) => self.items[index] = value,
            None => self.items.push(value),
        }
        Ok(())
    }
}

impl<T> Extend<T> for KeyedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<'a, T> IntoIterator for &'a KeyedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut KeyedList<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}

impl<T> IntoIterator for KeyedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Keyed on the class's default key attribute.
impl<T: GrammarObject> From<Vec<T>> for KeyedList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            attr: T::KEY_ATTR.to_owned(),
            items,
        }
    }
}

impl<T: GrammarValue + Clone> GrammarValue for KeyedList<T> {
    fn kind(&self) -> Kind {
        Kind::List
    }

    fn to_json(&self) -> Value {
        Value::Array(self.items.iter().map(GrammarValue::to_json).collect())
    }

    fn validate(&self) -> Result<()> {
        self.items.iter().try_for_each(GrammarValue::validate)
    }
}

impl<T: GrammarObject> FromJson for KeyedList<T> {
    fn from_json(value: Value, field: &str) -> Result<Self> {
        Vec::<T>::from_json(value, field).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Axis, Scale};

    fn scale(name: &str) -> Scale {
        Scale::new().with_name(name).unwrap()
    }

    fn names(list: &KeyedList<Scale>) -> Vec<String> {
        list.iter()
            .map(|s| s.name().cloned().unwrap_or_default())
            .collect()
    }

    #[test]
    fn distinct_keys_round_trip() {
        let mut list = KeyedList::new("name");
        list.push(scale("x"));
        list.push(scale("y"));

        assert_eq!(list.get_by_key("y").unwrap().name().unwrap(), "y");
        assert_eq!(list.keys().unwrap(), [Some("x"), Some("y")]);

        let replacement = scale("x").with_reverse(true).unwrap();
        list.set_by_key("x", replacement).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get_by_index(0).unwrap().reverse(), Some(&true));

        list.set_by_key("color", scale("color")).unwrap();
        assert_eq!(names(&list), ["x", "y", "color"]);

        let removed = list.remove_by_key("y").unwrap();
        assert_eq!(removed.name().unwrap(), "y");
        assert_eq!(names(&list), ["x", "color"]);
    }

    #[test]
    fn missing_key_is_reported() {
        let mut list = KeyedList::new("name");
        list.push(scale("x"));

        let err = list.get_by_key("z").unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(ref k) if k == "z"));
        assert_eq!(err.to_string(), "\"z\" is an invalid key");
    }

    #[test]
    fn duplicates_fail_lookup_but_not_positional_access() {
        let mut list = KeyedList::new("name");
        list.push(scale("x"));
        list.push(scale("y"));
        list.push(scale("x"));

        assert!(matches!(list.get_by_key("y"), Err(Error::DuplicateKey)));
        assert!(matches!(list.remove_by_key("y"), Err(Error::DuplicateKey)));
        assert_eq!(list.get_by_index(1).unwrap().name().unwrap(), "y");
        list.set_by_index(1, scale("z")).unwrap();
        assert_eq!(names(&list), ["x", "z", "x"]);
    }

    #[test]
    fn key_assignment_requires_matching_attribute() {
        let mut list = KeyedList::new("name");
        list.push(scale("x"));

        let err = list.set_by_key("y", scale("x")).unwrap_err();
        assert_eq!(err.to_string(), "key must be equal to 'name' attribute");
        assert_eq!(names(&list), ["x"]);

        let err = list.set_by_key("y", Scale::new()).unwrap_err();
        assert!(matches!(err, Error::KeyMismatch(_)));

        let mut axes: KeyedList<Axis> = KeyedList::new("name");
        let err = axes
            .set_by_key("x", Axis::new().with_kind("x").unwrap())
            .unwrap_err();
        assert_eq!(err.to_string(), "object must have name attribute");
        assert!(axes.is_empty());
    }

    #[test]
    fn key_assignment_replaces_first_match_even_with_duplicates() {
        let mut list = KeyedList::new("name");
        list.push(scale("x"));
        list.push(scale("x"));

        list.set_by_key("x", scale("x").with_zero(false).unwrap())
            .unwrap();
        assert_eq!(list.get_by_index(0).unwrap().zero(), Some(&false));
        assert_eq!(list.get_by_index(1).unwrap().zero(), None);
    }

    #[test]
    fn keyed_on_serialized_key() {
        let mut axes: KeyedList<Axis> = KeyedList::new("type");
        axes.push(Axis::new().with_kind("x").unwrap());
        axes.push(Axis::new().with_kind("y").unwrap());

        assert_eq!(axes.get_by_key("y").unwrap().kind().unwrap(), "y");
    }

    #[test]
    fn index_errors() {
        let mut list: KeyedList<Scale> = KeyedList::default();
        assert!(matches!(
            list.set_by_index(0, scale("x")),
            Err(Error::IndexOutOfRange { index: 0, len: 0 })
        ));
        assert!(list.remove_by_index(3).is_err());
    }
}

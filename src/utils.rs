use std::io::Read;

use hashbrown::HashMap;

use crate::element::Element;
use crate::error::{Error, ErrorCode, Errors, Loaded, Result};

pub(crate) fn read_file(path: &std::path::Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Fail unless `elem` has the tag a loader expects.
pub(crate) fn expect_tag(elem: &Element, tag: &str, what: &str) -> Result<()> {
    if elem.name() == tag {
        return Ok(());
    }
    Err(Error::new(
        ErrorCode::ElementIncorrectType,
        format!(
            "attempting to load a {what}, but the provided element is a <{}>, not a <{tag}>",
            elem.name()
        ),
    ))
}

/// Read the required `name` attribute. A missing name is recorded and
/// the empty string is used.
pub(crate) fn load_name(elem: &Element, what: &str, errors: &mut Errors) -> String {
    match elem.attribute("name") {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => {
            errors.push(Error::attribute_missing(format!(
                "a {what} name is required, but the name is not set"
            )));
            String::new()
        }
    }
}

/// Typed value or `default`, recording a parse failure instead of aborting.
pub(crate) fn get_or_record<T: crate::element::ParseValue>(
    elem: &Element,
    key: &str,
    default: T,
    errors: &mut Errors,
) -> T {
    match elem.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(err) => {
            tracing::warn!(key, element = elem.name(), "invalid value, using default");
            errors.push(err);
            default
        }
    }
}

/// A DOM object loaded from one element of a fixed tag.
pub trait Loadable: Sized {
    const TAG: &'static str;

    /// `Err` is fatal for this object only; recoverable problems travel
    /// inside [`Loaded`].
    fn load(elem: &Element) -> Result<Loaded<Self>>;

    fn name(&self) -> &str;
}

/// Ordered children with a name index.
#[derive(Debug, Clone)]
pub struct Children<T> {
    items: Vec<T>,
    by_name: HashMap<String, usize>,
}

impl<T> Default for Children<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<T: Loadable> Children<T> {
    /// Append `item` unless its name is taken; hands the item back on conflict.
    pub(crate) fn push(&mut self, item: T) -> std::result::Result<(), T> {
        if self.by_name.contains_key(item.name()) {
            return Err(item);
        }
        self.by_name.insert(item.name().to_owned(), self.items.len());
        self.items.push(item);
        Ok(())
    }
}

impl<T> Children<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&T> {
        self.by_name.get(name).map(|&i| &self.items[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }
}

impl<'a, T> IntoIterator for &'a Children<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Load every `<T::TAG>` child of `elem`. Siblings reusing a name are
/// reported and left out; a fatal error on one sibling does not stop
/// the others.
pub(crate) fn load_unique_repeated<T: Loadable>(elem: &Element) -> Loaded<Children<T>> {
    let mut children = Children::default();
    let mut errors = Errors::new();
    for child in elem.elements(T::TAG) {
        let item = match T::load(&child) {
            Ok(loaded) => loaded.merge_into(&mut errors),
            Err(err) => {
                errors.push(err);
                continue;
            }
        };
        if let Err(item) = children.push(item) {
            tracing::warn!(name = item.name(), tag = T::TAG, "duplicate sibling name, skipping");
            errors.push(Error::new(
                ErrorCode::DuplicateName,
                format!(
                    "{} with name[{}] already exists; each <{}> must have a unique name",
                    T::TAG,
                    item.name(),
                    T::TAG
                ),
            ));
        }
    }
    Loaded::with_errors(children, errors)
}

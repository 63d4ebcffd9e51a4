//! Read-only element tree walked by the DOM loaders.
//!
//! Wraps a parsed `roxmltree` node with the small accessor surface the
//! loaders need: tag name, parent, child lookup, sibling iteration and
//! typed value access. Values are read from an attribute first and from
//! the text of a child element of the same name second, so both
//! `<model static="true">` and `<model><static>true</static></model>`
//! are accepted.

use nalgebra::{Vector2, Vector3, Vector4};
use roxmltree::Node;

use crate::error::{Error, Result};

/// One node of a parsed document.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a, 'input> {
    node: Node<'a, 'input>,
}

impl<'a, 'input> From<Node<'a, 'input>> for Element<'a, 'input> {
    fn from(node: Node<'a, 'input>) -> Self {
        Self { node }
    }
}

impl<'a, 'input> Element<'a, 'input> {
    pub fn name(&self) -> &'a str {
        self.node.tag_name().name()
    }

    pub fn parent(&self) -> Option<Self> {
        self.node.parent_element().map(Self::from)
    }

    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.node.attribute(key)
    }

    /// Trimmed text content, `None` when empty.
    pub fn text(&self) -> Option<&'a str> {
        self.node
            .text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn has_element(&self, name: &str) -> bool {
        self.element(name).is_some()
    }

    /// First child element with the given tag.
    pub fn element(&self, name: &str) -> Option<Self> {
        self.node
            .children()
            .find(|child| child.is_element() && child.tag_name().name() == name)
            .map(Self::from)
    }

    /// Next sibling element with the given tag.
    pub fn next_element(&self, name: &str) -> Option<Self> {
        let mut sibling = self.node.next_sibling_element();
        while let Some(node) = sibling {
            if node.tag_name().name() == name {
                return Some(Self::from(node));
            }
            sibling = node.next_sibling_element();
        }
        None
    }

    /// All child elements with the given tag, in document order.
    pub fn elements<'n>(&self, name: &'n str) -> Elements<'a, 'input, 'n> {
        Elements {
            next: self.element(name),
            name,
        }
    }

    /// Typed value of `key`, read from an attribute or a child element.
    ///
    /// Returns `Ok(None)` when the key is absent and an
    /// `AttributeInvalid` error when the text does not parse.
    pub fn get<T: ParseValue>(&self, key: &str) -> Result<Option<T>> {
        let text = match self.attribute(key) {
            Some(text) => Some(text.trim()),
            None => self.element(key).and_then(|child| child.text()),
        };
        match text {
            None => Ok(None),
            Some(text) => T::parse_value(text).map(Some).ok_or_else(|| {
                Error::attribute_invalid(format!(
                    "unable to read value [{text}] of [{key}] on <{}>",
                    self.name()
                ))
            }),
        }
    }

    /// Typed value of `key` or `default`, plus whether the key was present.
    pub fn get_or<T: ParseValue>(&self, key: &str, default: T) -> Result<(T, bool)> {
        Ok(match self.get(key)? {
            Some(value) => (value, true),
            None => (default, false),
        })
    }

    /// The element's own text parsed as `T`.
    pub fn value<T: ParseValue>(&self) -> Result<Option<T>> {
        match self.text() {
            None => Ok(None),
            Some(text) => T::parse_value(text).map(Some).ok_or_else(|| {
                Error::attribute_invalid(format!(
                    "unable to read value [{text}] of <{}>",
                    self.name()
                ))
            }),
        }
    }
}

/// Iterator over same-tag siblings, see [`Element::elements`].
pub struct Elements<'a, 'input, 'n> {
    next: Option<Element<'a, 'input>>,
    name: &'n str,
}

impl<'a, 'input> Iterator for Elements<'a, 'input, '_> {
    type Item = Element<'a, 'input>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.next_element(self.name);
        Some(current)
    }
}

/// Conversion from element text into a typed value.
pub trait ParseValue: Sized {
    fn parse_value(text: &str) -> Option<Self>;
}

impl ParseValue for String {
    fn parse_value(text: &str) -> Option<Self> {
        Some(text.to_owned())
    }
}

impl ParseValue for bool {
    fn parse_value(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ParseValue for f64 {
    fn parse_value(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl ParseValue for u32 {
    fn parse_value(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

/// Parse exactly `N` whitespace separated floats.
pub(crate) fn parse_floats<const N: usize>(text: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut parts = text.split_whitespace();
    for slot in out.iter_mut() {
        *slot = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

impl ParseValue for Vector2<f64> {
    fn parse_value(text: &str) -> Option<Self> {
        parse_floats::<2>(text).map(Vector2::from)
    }
}

impl ParseValue for Vector3<f64> {
    fn parse_value(text: &str) -> Option<Self> {
        parse_floats::<3>(text).map(Vector3::from)
    }
}

impl ParseValue for Vector4<f64> {
    fn parse_value(text: &str) -> Option<Self> {
        parse_floats::<4>(text).map(Vector4::from)
    }
}

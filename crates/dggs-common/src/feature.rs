//! Feature and layer model shared by sources, generated grids and outputs.

use geo::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bbox::BoundingBox;

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    /// Numeric view of the value. Only integers and floats are numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Null => "null",
            AttributeValue::Bool(_) => "bool",
            AttributeValue::Integer(_) => "integer",
            AttributeValue::Float(_) => "float",
            AttributeValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Null => write!(f, "null"),
            AttributeValue::Bool(v) => write!(f, "{}", v),
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<&serde_json::Value> for AttributeValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttributeValue::Null,
            serde_json::Value::Bool(b) => AttributeValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => AttributeValue::Text(s.clone()),
            other => AttributeValue::Text(other.to_string()),
        }
    }
}

impl From<&AttributeValue> for serde_json::Value {
    fn from(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::Null => serde_json::Value::Null,
            AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
            AttributeValue::Integer(i) => serde_json::Value::from(*i),
            AttributeValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            AttributeValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

/// Ordered attribute record. Insertion order is the schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, AttributeValue)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Set a value, overwriting in place when the name already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

/// A polygonal feature in geographic coordinates with typed attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: MultiPolygon<f64>,
    pub attributes: Attributes,
}

impl Feature {
    pub fn new(geometry: MultiPolygon<f64>, attributes: Attributes) -> Self {
        Self {
            geometry,
            attributes,
        }
    }

    pub fn from_polygon(polygon: Polygon<f64>, attributes: Attributes) -> Self {
        Self::new(MultiPolygon(vec![polygon]), attributes)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

/// An ordered collection of features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn first(&self) -> Option<&Feature> {
        self.features.first()
    }

    /// Union of all feature bounding boxes.
    pub fn extent(&self) -> Option<BoundingBox> {
        self.features
            .iter()
            .filter_map(|feature| BoundingBox::of_geometry(&feature.geometry))
            .reduce(|acc, bbox| acc.union(&bbox))
    }
}

impl From<Vec<Feature>> for Layer {
    fn from(features: Vec<Feature>) -> Self {
        Self::new(features)
    }
}

impl IntoIterator for Layer {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_view() {
        assert_eq!(AttributeValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(AttributeValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(AttributeValue::Text("3".into()).as_f64(), None);
        assert_eq!(AttributeValue::Null.as_f64(), None);
        assert_eq!(AttributeValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut attrs = Attributes::new().with("a", 1i64).with("b", "x");
        attrs.insert("a", 2.5);
        assert_eq!(attrs.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(attrs.get("a"), Some(&AttributeValue::Float(2.5)));
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!({"n": 4, "f": 1.5, "s": "hi", "z": null});
        let obj = json.as_object().unwrap();
        assert_eq!(AttributeValue::from(&obj["n"]), AttributeValue::Integer(4));
        assert_eq!(AttributeValue::from(&obj["f"]), AttributeValue::Float(1.5));
        assert_eq!(AttributeValue::from(&obj["s"]), AttributeValue::Text("hi".into()));
        assert_eq!(AttributeValue::from(&obj["z"]), AttributeValue::Null);
    }

    #[test]
    fn test_layer_extent() {
        let a = Feature::from_polygon(BoundingBox::new(0.0, 0.0, 1.0, 1.0).to_polygon(), Attributes::new());
        let b = Feature::from_polygon(BoundingBox::new(2.0, -1.0, 3.0, 0.5).to_polygon(), Attributes::new());
        let layer = Layer::new(vec![a, b]);
        assert_eq!(layer.extent(), Some(BoundingBox::new(0.0, -1.0, 3.0, 1.0)));
        assert_eq!(Layer::default().extent(), None);
    }
}

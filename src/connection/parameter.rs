//! Bound query parameters
//!
//! Parameters keep their insertion order and are looked up by name when the
//! statement is submitted. Names are passed to the engine verbatim; matching
//! them against `$name` placeholders is the engine's job.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::core::{DbError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: JsonValue,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Bind any serializable value.
    pub fn from_serializable<T: Serialize + ?Sized>(name: impl Into<String>, value: &T) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            value: serde_json::to_value(value)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &JsonValue {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<JsonValue>) {
        self.value = value.into();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterCollection {
    parameters: Vec<Parameter>,
}

impl ParameterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every top-level field of a serializable struct or map.
    ///
    /// ```
    /// # use doctab::ParameterCollection;
    /// #[derive(serde::Serialize)]
    /// struct Args<'a> { name: &'a str }
    ///
    /// let params = ParameterCollection::from_serializable(&Args { name: "Matt" }).unwrap();
    /// assert_eq!(params.get_by_name("name").unwrap().value(), "Matt");
    /// ```
    pub fn from_serializable<T: Serialize + ?Sized>(args: &T) -> Result<Self> {
        match serde_json::to_value(args)? {
            JsonValue::Object(fields) => Ok(Self {
                parameters: fields
                    .into_iter()
                    .map(|(name, value)| Parameter { name, value })
                    .collect(),
            }),
            JsonValue::Null => Ok(Self::new()),
            other => Err(DbError::TypeMismatch(format!(
                "Parameters must serialize to an object, got {}",
                other
            ))),
        }
    }

    /// Append a parameter and return its position.
    pub fn add(&mut self, parameter: Parameter) -> usize {
        self.parameters.push(parameter);
        self.parameters.len() - 1
    }

    pub fn add_with_value(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> usize {
        self.add(Parameter::new(name, value))
    }

    pub fn get(&self, index: usize) -> Result<&Parameter> {
        self.parameters
            .get(index)
            .ok_or(DbError::ParameterIndexOutOfRange(index, self.parameters.len()))
    }

    pub fn set(&mut self, index: usize, parameter: Parameter) -> Result<()> {
        let len = self.parameters.len();
        let slot = self
            .parameters
            .get_mut(index)
            .ok_or(DbError::ParameterIndexOutOfRange(index, len))?;
        *slot = parameter;
        Ok(())
    }

    /// First parameter with the given name.
    pub fn get_by_name(&self, name: &str) -> Result<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| DbError::ParameterNotFound(name.to_string()))
    }

    /// Replace the first parameter with the given name.
    pub fn set_by_name(&mut self, name: &str, parameter: Parameter) -> Result<()> {
        let index = self
            .index_of(name)
            .ok_or_else(|| DbError::ParameterNotFound(name.to_string()))?;
        self.parameters[index] = parameter;
        Ok(())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    /// Name to value map handed to the engine, in insertion order.
    ///
    /// When a name is bound twice the first binding wins, matching
    /// [`get_by_name`](Self::get_by_name).
    pub fn to_named_arguments(&self) -> Map<String, JsonValue> {
        let mut args = Map::with_capacity(self.parameters.len());
        for p in &self.parameters {
            if !args.contains_key(&p.name) {
                args.insert(p.name.clone(), p.value.clone());
            }
        }
        args
    }
}

impl<'a> IntoIterator for &'a ParameterCollection {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

impl FromIterator<Parameter> for ParameterCollection {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self {
            parameters: iter.into_iter().collect(),
        }
    }
}

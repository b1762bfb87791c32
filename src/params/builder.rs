use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::raw::RawParameters;
use crate::error::{BodyError, Error, Result};
use crate::model::{Operation, Parameter, ParameterLocation};
use crate::validation::Validators;

/// Turns the raw string values of one parameter into a JSON value.
///
/// Parse failures are reported as the violated rule.
pub trait ParameterParser: Send + Sync {
    fn parse(&self, parameter: &Parameter, values: &[&str]) -> std::result::Result<Value, String>;
}

impl<F> ParameterParser for F
where
    F: Fn(&Parameter, &[&str]) -> std::result::Result<Value, String> + Send + Sync,
{
    fn parse(&self, parameter: &Parameter, values: &[&str]) -> std::result::Result<Value, String> {
        self(parameter, values)
    }
}

/// One value as a string, several as an array of strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringParser;

impl ParameterParser for StringParser {
    fn parse(&self, _parameter: &Parameter, values: &[&str]) -> std::result::Result<Value, String> {
        Ok(match values {
            [single] => Value::String((*single).to_string()),
            many => Value::Array(many.iter().map(|v| Value::String((*v).to_string())).collect()),
        })
    }
}

static STRING_PARSER: StringParser = StringParser;

/// Parameter values of one location, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterContainer {
    values: Map<String, Value>,
}

impl ParameterContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any serializable struct or map.
    pub fn from_typed<T: Serialize>(typed: &T) -> Result<Self> {
        match serde_json::to_value(typed).map_err(BodyError::from)? {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(BodyError::Json(serde::ser::Error::custom(format!(
                "parameters must serialize to an object, got {other}"
            )))
            .into()),
        }
    }

    /// Deserialize into the generated parameter type.
    pub fn to_typed<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.values.clone()))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// String value of a parameter, if it is one.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Render a JSON value the way it travels in a string position.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds and serializes the parameter container of one location.
#[derive(Clone, Copy)]
pub struct ParameterBuilder<'a> {
    location: ParameterLocation,
    definitions: &'a [Parameter],
    parser: &'a dyn ParameterParser,
    validators: Option<&'a Validators>,
}

impl<'a> ParameterBuilder<'a> {
    pub fn new(location: ParameterLocation, definitions: &'a [Parameter]) -> Self {
        Self {
            location,
            definitions,
            parser: &STRING_PARSER,
            validators: None,
        }
    }

    /// Builder for one location of an operation.
    pub fn for_operation(operation: &'a Operation, location: ParameterLocation) -> Self {
        Self::new(location, operation.parameters(location))
    }

    pub fn with_parser(mut self, parser: &'a dyn ParameterParser) -> Self {
        self.parser = parser;
        self
    }

    /// Run validators on every value; `None` disables validation.
    pub fn with_validators(mut self, validators: Option<&'a Validators>) -> Self {
        self.validators = validators;
        self
    }

    fn check(&self, parameter: &Parameter, value: &Value) -> Result<()> {
        let Some(validators) = self.validators else {
            return Ok(());
        };
        validators
            .validate(parameter.schema_id.as_deref(), value)
            .map_err(|failure| Error::ParameterValidationFailed {
                location: self.location,
                name: parameter.name.clone(),
                rule: failure.to_string(),
            })
    }

    /// Incoming direction: decode, then validate.
    ///
    /// Source entries without a definition are ignored.
    pub fn build(&self, source: &RawParameters) -> Result<ParameterContainer> {
        let mut container = ParameterContainer::new();
        for parameter in self.definitions {
            let values = source.get_all(&parameter.name);
            if values.is_empty() {
                if parameter.required {
                    return Err(Error::MissingParameter {
                        location: self.location,
                        name: parameter.name.clone(),
                    });
                }
                continue;
            }

            let value = self.parser.parse(parameter, &values).map_err(|rule| {
                Error::ParameterValidationFailed {
                    location: self.location,
                    name: parameter.name.clone(),
                    rule,
                }
            })?;
            self.check(parameter, &value)?;
            container.insert(parameter.name.clone(), value);
        }
        debug!(
            location = %self.location,
            count = container.len(),
            "Parameters decoded"
        );
        Ok(container)
    }

    /// Outgoing direction: validate, then assemble raw values.
    ///
    /// Arrays become repeated values; `null` counts as absent.
    pub fn to_raw(&self, container: &ParameterContainer) -> Result<RawParameters> {
        let mut raw = match self.location {
            ParameterLocation::Header => RawParameters::headers(),
            _ => RawParameters::new(),
        };
        for parameter in self.definitions {
            let value = match container.get(&parameter.name) {
                None | Some(Value::Null) => {
                    if parameter.required {
                        return Err(Error::MissingParameter {
                            location: self.location,
                            name: parameter.name.clone(),
                        });
                    }
                    continue;
                }
                Some(value) => value,
            };
            self.check(parameter, value)?;
            match value {
                Value::Array(items) => {
                    for item in items {
                        raw.push(parameter.name.clone(), value_text(item));
                    }
                }
                other => raw.push(parameter.name.clone(), value_text(other)),
            }
        }
        Ok(raw)
    }
}

/// Raw sources of every request parameter location.
#[derive(Debug, Clone, Default)]
pub struct ParameterSources {
    pub path: RawParameters,
    pub query: RawParameters,
    pub header: RawParameters,
    pub cookie: RawParameters,
}

impl ParameterSources {
    pub fn get(&self, location: ParameterLocation) -> &RawParameters {
        match location {
            ParameterLocation::Path => &self.path,
            ParameterLocation::Query => &self.query,
            ParameterLocation::Header => &self.header,
            ParameterLocation::Cookie => &self.cookie,
        }
    }
}

/// The parameter aggregate of one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestParameters {
    pub path: ParameterContainer,
    pub query: ParameterContainer,
    pub header: ParameterContainer,
    pub cookie: ParameterContainer,
}

impl RequestParameters {
    pub fn get(&self, location: ParameterLocation) -> &ParameterContainer {
        match location {
            ParameterLocation::Path => &self.path,
            ParameterLocation::Query => &self.query,
            ParameterLocation::Header => &self.header,
            ParameterLocation::Cookie => &self.cookie,
        }
    }

    pub fn get_mut(&mut self, location: ParameterLocation) -> &mut ParameterContainer {
        match location {
            ParameterLocation::Path => &mut self.path,
            ParameterLocation::Query => &mut self.query,
            ParameterLocation::Header => &mut self.header,
            ParameterLocation::Cookie => &mut self.cookie,
        }
    }

    /// Decode every location of `operation` from its raw sources.
    pub fn decode(
        operation: &Operation,
        sources: &ParameterSources,
        parser: &dyn ParameterParser,
        validators: Option<&Validators>,
    ) -> Result<Self> {
        let mut parameters = Self::default();
        for location in ParameterLocation::ALL {
            *parameters.get_mut(location) = ParameterBuilder::for_operation(operation, location)
                .with_parser(parser)
                .with_validators(validators)
                .build(sources.get(location))?;
        }
        Ok(parameters)
    }

    /// Encode every location of `operation` into raw sources.
    pub fn encode(
        &self,
        operation: &Operation,
        validators: Option<&Validators>,
    ) -> Result<ParameterSources> {
        let encode = |location| {
            ParameterBuilder::for_operation(operation, location)
                .with_validators(validators)
                .to_raw(self.get(location))
        };
        Ok(ParameterSources {
            path: encode(ParameterLocation::Path)?,
            query: encode(ParameterLocation::Query)?,
            header: encode(ParameterLocation::Header)?,
            cookie: encode(ParameterLocation::Cookie)?,
        })
    }
}

//! Upstream endpoint descriptions and request templating
//!
//! Each endpoint is a `{url, method, params, headers, body}` record taken from
//! the configuration file. Values may contain `{name}` placeholders that are
//! filled in per request by [`Endpoint::render`].

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// HTTP method of an upstream endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// A configured upstream query
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub url: String,

    #[serde(default)]
    pub method: HttpMethod,

    /// Query-string parameters
    #[serde(default)]
    pub params: BTreeMap<String, Value>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// JSON body, only sent with POST
    #[serde(default)]
    pub body: Option<Value>,
}

/// Template variables for a single request
#[derive(Debug, Clone, Default)]
pub struct Vars(Vec<(String, Value)>);

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a variable
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// A fully rendered request, ready for the executor
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: String,
    pub method: HttpMethod,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Endpoint {
    /// Creates a GET endpoint with no parameters
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            params: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Creates a POST endpoint with the given body template
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            body: Some(body),
            ..Self::get(url)
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Fills every placeholder with the given variables
    ///
    /// A string that is exactly `{name}` takes the variable's JSON value, so a
    /// numeric page stays numeric in the body. Placeholders embedded in longer
    /// strings are substituted textually. Unknown placeholders are left as is.
    pub fn render(&self, vars: &Vars) -> ApiRequest {
        ApiRequest {
            url: substitute(&self.url, vars),
            method: self.method,
            params: self
                .params
                .iter()
                .map(|(k, v)| (k.clone(), value_to_query(&render_value(v, vars))))
                .collect(),
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), substitute(v, vars)))
                .collect(),
            body: match self.method {
                HttpMethod::Post => self.body.as_ref().map(|b| render_value(b, vars)),
                HttpMethod::Get => None,
            },
        }
    }
}

fn render_value(value: &Value, vars: &Vars) -> Value {
    match value {
        Value::String(s) => {
            let whole = s
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
                .and_then(|name| vars.get(name));
            match whole {
                Some(v) => v.clone(),
                None => Value::String(substitute(s, vars)),
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| render_value(v, vars)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), render_value(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn substitute(template: &str, vars: &Vars) -> String {
    let mut out = template.to_string();
    for (name, value) in &vars.0 {
        let placeholder = format!("{{{}}}", name);
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, &value_to_query(value));
        }
    }
    out
}

fn value_to_query(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

//! Request parameter extraction.
//!
//! A parameter spec is a name with an optional `/t` type suffix (`"page/d"`)
//! and an optional default. Values are looked up in a parameter source and
//! loosely coerced, following the same rules as PHP scalar casts.

use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::{Map, Number, Value};

use crate::error::{Result, WebmanError};

/// A coercion requested by a parameter spec suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCast {
    /// `a`
    Array,
    /// `d`
    Int,
    /// `f`
    Float,
    /// `b`
    Bool,
    /// `s`
    String,
}

impl TypeCast {
    /// Parse a suffix case-insensitively. Unknown suffixes request no cast.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "a" => Some(Self::Array),
            "d" => Some(Self::Int),
            "f" => Some(Self::Float),
            "b" => Some(Self::Bool),
            "s" => Some(Self::String),
            _ => None,
        }
    }

    pub fn apply(self, value: Value) -> Result<Value> {
        Ok(match self {
            Self::Array => to_array(value),
            Self::Int => Value::from(to_int(&value)),
            Self::Float => float_value(to_float(&value)),
            Self::Bool => Value::Bool(truthy(&value)),
            Self::String => Value::String(to_string(value)?),
        })
    }
}

/// One parameter to extract.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub cast: Option<TypeCast>,
    pub default: Value,
}

impl ParamSpec {
    /// Parse `"name"` or `"name/t"` with a `null` default.
    ///
    /// The suffix is only recognised when `/` is not the first character, and
    /// anything after a second `/` is ignored.
    pub fn new(spec: &str) -> Self {
        Self::with_default(spec, Value::Null)
    }

    pub fn with_default(spec: &str, default: Value) -> Self {
        let (name, cast) = match spec.find('/') {
            Some(pos) if pos > 0 => {
                let mut parts = spec.split('/');
                let name = parts.next().unwrap_or_default();
                let cast = parts.next().and_then(TypeCast::from_suffix);
                (name, cast)
            }
            _ => (spec, None),
        };
        Self {
            name: name.to_string(),
            cast,
            default,
        }
    }
}

impl From<&str> for ParamSpec {
    fn from(spec: &str) -> Self {
        Self::new(spec)
    }
}

impl From<(&str, Value)> for ParamSpec {
    fn from((spec, default): (&str, Value)) -> Self {
        Self::with_default(spec, default)
    }
}

/// Pull every spec out of `source`.
///
/// Missing or `null` values take the spec default. The cast only runs when
/// the value differs from the default. The result is keyed by name, or by
/// position when `index_array` is set.
pub fn extract(
    source: &Map<String, Value>,
    specs: &[ParamSpec],
    index_array: bool,
) -> Result<Map<String, Value>> {
    let mut result = Map::new();
    for (i, spec) in specs.iter().enumerate() {
        let mut data = match source.get(&spec.name) {
            Some(Value::Null) | None => spec.default.clone(),
            Some(value) => value.clone(),
        };
        if let Some(cast) = spec.cast
            && data != spec.default
        {
            data = cast.apply(data)?;
        }
        let key = if index_array {
            i.to_string()
        } else {
            spec.name.clone()
        };
        result.insert(key, data);
    }
    Ok(result)
}

/// The parts of an HTTP request parameter extraction needs.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    query: Map<String, Value>,
    body: Map<String, Value>,
    user_agent: Option<String>,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Body and query merged; body values win on conflicts.
    pub fn all(&self) -> Map<String, Value> {
        let mut merged = self.body.clone();
        for (key, value) in &self.query {
            if !merged.contains_key(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    pub fn input_more(&self, specs: &[ParamSpec], index_array: bool) -> Result<Map<String, Value>> {
        extract(&self.all(), specs, index_array)
    }

    pub fn get_more(&self, specs: &[ParamSpec], index_array: bool) -> Result<Map<String, Value>> {
        extract(&self.query, specs, index_array)
    }

    pub fn post_more(&self, specs: &[ParamSpec], index_array: bool) -> Result<Map<String, Value>> {
        extract(&self.body, specs, index_array)
    }

    pub fn require_get(&self) -> Result<&Self> {
        if self.method != "GET" {
            return Err(WebmanError::business("仅允许GET请求", 0));
        }
        Ok(self)
    }

    pub fn require_post(&self) -> Result<&Self> {
        if self.method != "POST" {
            return Err(WebmanError::business("仅允许POST请求", 0));
        }
        Ok(self)
    }

    pub fn is_wechat(&self) -> bool {
        self.user_agent.as_deref().is_some_and(is_wechat)
    }

    pub fn is_mobile(&self) -> bool {
        self.user_agent.as_deref().is_some_and(is_mobile)
    }
}

/// Whether the user agent is the WeChat in-app browser.
pub fn is_wechat(user_agent: &str) -> bool {
    user_agent.contains("MicroMessenger")
}

/// Whether the user agent belongs to a mobile device.
pub fn is_mobile(user_agent: &str) -> bool {
    static MOBILE: OnceLock<Option<Regex>> = OnceLock::new();
    MOBILE
        .get_or_init(|| {
            Regex::new(
                r"(?i)(android|iphone|ipod|ipad|mobile|mobi|blackberry|iemobile|windows ce|windows phone|opera mini|symbian|nokia|sonyericsson|samsung|htc[ _-]|kindle|midp|palm|pocket|smartphone|ucweb|micromessenger)",
            )
            .ok()
        })
        .as_ref()
        .is_some_and(|re| re.is_match(user_agent))
}

fn to_array(value: Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) => value,
        Value::Null => Value::Array(Vec::new()),
        scalar => Value::Array(vec![scalar]),
    }
}

fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => number_to_int(n),
        Value::String(s) => string_to_int(s),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(map) => i64::from(!map.is_empty()),
    }
}

fn to_float(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => numeric_prefix(s).map_or(0.0, |(prefix, _)| {
            prefix.parse::<f64>().unwrap_or_default()
        }),
        Value::Array(items) => f64::from(u8::from(!items.is_empty())),
        Value::Object(map) => f64::from(u8::from(!map.is_empty())),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => match n.as_i64() {
            Some(i) => i != 0,
            None => n.as_f64().is_some_and(|f| f != 0.0),
        },
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn to_string(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Bool(false) => Ok(String::new()),
        Value::Number(n) => Ok(number_to_string(&n)),
        Value::Null => Err(WebmanError::Type {
            type_name: "NULL".to_string(),
        }),
        Value::Array(_) | Value::Object(_) => Err(WebmanError::Type {
            type_name: "array".to_string(),
        }),
    }
}

fn number_to_int(n: &Number) -> i64 {
    if let Some(i) = n.as_i64() {
        return i;
    }
    if let Some(u) = n.as_u64() {
        return i64::try_from(u).unwrap_or(i64::MAX);
    }
    float_to_int(n.as_f64().unwrap_or_default())
}

fn float_to_int(f: f64) -> i64 {
    if f.is_finite() { f.trunc() as i64 } else { 0 }
}

fn number_to_string(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => float_to_string(f),
        _ => n.to_string(),
    }
}

/// Render a float with 14 significant digits, switching to `1.0E+20` style
/// when the decimal exponent is below -4 or at least 14.
fn float_to_string(f: f64) -> String {
    let formatted = format!("{:.13e}", f.abs());
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return formatted;
    };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = match digits.trim_end_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };

    let mut out = String::new();
    if f.is_sign_negative() {
        out.push('-');
    }
    if digits == "0" {
        out.push('0');
        return out;
    }

    if !(-4..14).contains(&exponent) {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        out.push('.');
        out.push_str(if rest.is_empty() { "0" } else { rest });
        out.push('E');
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(&exponent.unsigned_abs().to_string());
    } else if exponent < 0 {
        out.push_str("0.");
        out.push_str(&"0".repeat(exponent.unsigned_abs() as usize - 1));
        out.push_str(digits);
    } else {
        let int_len = exponent as usize + 1;
        if digits.len() <= int_len {
            out.push_str(digits);
            out.push_str(&"0".repeat(int_len - digits.len()));
        } else {
            let (int_part, frac_part) = digits.split_at(int_len);
            out.push_str(int_part);
            out.push('.');
            out.push_str(frac_part);
        }
    }
    out
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

/// Leading numeric text of `s`, and whether it is written as an integer.
fn numeric_prefix(s: &str) -> Option<(&str, bool)> {
    static NUMERIC: OnceLock<Option<Regex>> = OnceLock::new();
    let re = NUMERIC
        .get_or_init(|| Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)").ok())
        .as_ref()?;
    let prefix = re.captures(s)?.get(1)?.as_str();
    let integral = !prefix.contains(['.', 'e', 'E']);
    Some((prefix, integral))
}

fn string_to_int(s: &str) -> i64 {
    match numeric_prefix(s) {
        Some((prefix, true)) => prefix
            .parse::<i64>()
            .unwrap_or_else(|_| float_to_int(prefix.parse::<f64>().unwrap_or_default())),
        Some((prefix, false)) => float_to_int(prefix.parse::<f64>().unwrap_or_default()),
        None => 0,
    }
}

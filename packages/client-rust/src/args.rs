//! Call arguments: positional values, keyword values, and control keys.
//!
//! Two keyword names are reserved and never reach overload matching or
//! binding: [`INJECT_KEY`] supplies a synthetic reply and
//! [`SOAP_HEADERS_KEY`] supplies SOAP header content.

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use soapline_core::Value;

/// Reserved keyword carrying an injected reply.
pub const INJECT_KEY: &str = "__inject";
/// Reserved keyword carrying SOAP header values.
pub const SOAP_HEADERS_KEY: &str = "soapheaders";

/// Synthetic reply that replaces network transport for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedReply {
    pub body: Bytes,
    /// HTTP status reported for the reply; 200 unless overridden.
    pub status: u16,
}

impl InjectedReply {
    #[must_use]
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            status: 200,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Accepts a string body or a `{reply, status?}` map.
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(body) => Some(Self::new(body)),
            Value::Bytes(body) => Some(Self::new(body)),
            Value::Map(mut map) => {
                let reply = match map.remove("reply")? {
                    Value::String(body) => Self::new(body),
                    Value::Bytes(body) => Self::new(body),
                    _ => return None,
                };
                match map.get("status") {
                    Some(Value::Int(status)) => {
                        u16::try_from(*status).ok().map(|s| reply.with_status(s))
                    }
                    _ => Some(reply),
                }
            }
            _ => None,
        }
    }
}

/// Arguments for one invocation.
///
/// Keyword names are unique; supplying a name twice keeps the last value.
#[derive(Debug, Clone, Default)]
pub struct CallArguments {
    positional: Vec<Value>,
    keywords: BTreeMap<String, Value>,
    headers: Vec<Value>,
    inject: Option<InjectedReply>,
}

impl CallArguments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional value.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword value. Reserved control keys are routed to their
    /// dedicated slots instead of becoming parameters.
    #[must_use]
    pub fn kw(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match name.as_str() {
            INJECT_KEY => match InjectedReply::from_value(value) {
                Some(reply) => self.inject = Some(reply),
                None => tracing::warn!(key = INJECT_KEY, "ignoring unusable injected reply"),
            },
            SOAP_HEADERS_KEY => match value {
                Value::Array(items) => self.headers.extend(items),
                Value::Null => {}
                other => self.headers.push(other),
            },
            _ => {
                self.keywords.insert(name, value);
            }
        }
        self
    }

    /// Appends a SOAP header value.
    #[must_use]
    pub fn header(mut self, value: impl Into<Value>) -> Self {
        self.headers.push(value.into());
        self
    }

    /// Replaces transport with a synthetic reply for this call.
    #[must_use]
    pub fn inject(mut self, reply: InjectedReply) -> Self {
        self.inject = Some(reply);
        self
    }

    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    #[must_use]
    pub fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }

    /// Names of all keyword arguments, including ones supplied as null.
    #[must_use]
    pub fn keyword_names(&self) -> BTreeSet<&str> {
        self.keywords.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn headers(&self) -> &[Value] {
        &self.headers
    }

    #[must_use]
    pub fn injected(&self) -> Option<&InjectedReply> {
        self.inject.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_keys_are_stripped_from_keywords() {
        let args = CallArguments::new()
            .kw("sessionID", 1)
            .kw(INJECT_KEY, "<reply/>")
            .kw(SOAP_HEADERS_KEY, vec![Value::from("h1"), Value::from("h2")]);

        assert_eq!(args.keyword_names().into_iter().collect::<Vec<_>>(), vec!["sessionID"]);
        assert_eq!(args.injected(), Some(&InjectedReply::new("<reply/>")));
        assert_eq!(args.headers().len(), 2);
    }

    #[test]
    fn inject_map_form_carries_status() {
        let mut map = BTreeMap::new();
        map.insert("reply".to_string(), Value::from("<x/>"));
        map.insert("status".to_string(), Value::Int(500));
        let args = CallArguments::new().kw(INJECT_KEY, Value::Map(map));
        let reply = args.injected().unwrap();
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body, Bytes::from("<x/>"));
    }

    #[test]
    fn null_keywords_still_count_as_supplied() {
        let args = CallArguments::new().kw("sessionID", Value::Null);
        assert!(args.keyword_names().contains("sessionID"));
    }

    #[test]
    fn duplicate_keyword_keeps_last_value() {
        let args = CallArguments::new().kw("a", 1).kw("a", 2);
        assert_eq!(args.keyword("a"), Some(&Value::Int(2)));
        assert_eq!(args.keywords().len(), 1);
    }
}

//! Document/literal SOAP 1.1 binding.
//!
//! Requests wrap the present parameters in a namespace-qualified element
//! named after the operation; parameter elements are unqualified. Replies are
//! read with `quick-xml` into a small element tree and converted to
//! [`Value`]s, typed by the signature's output declarations where possible.

use std::collections::BTreeMap;
use std::fmt::Write;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use soapline_core::{Binding, BindingError, Fault, OperationSignature, ReplyBody, Value};

const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP binding for document/literal services.
#[derive(Debug, Clone)]
pub struct LiteralBinding {
    namespace: String,
}

impl LiteralBinding {
    /// `namespace` is the target namespace of the operation wrappers.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl Binding for LiteralBinding {
    fn serialize(
        &self,
        signature: &OperationSignature,
        values: &[Option<Value>],
        headers: &[Value],
    ) -> Result<Vec<u8>, BindingError> {
        let mut xml = String::new();
        writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        write!(
            xml,
            r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="{ENVELOPE_NS}" xmlns:ns0="{}">"#,
            xml_escape(&self.namespace)
        )?;

        if headers.is_empty() {
            xml.push_str("<SOAP-ENV:Header/>");
        } else {
            xml.push_str("<SOAP-ENV:Header>");
            for header in headers {
                write_header(&mut xml, header)?;
            }
            xml.push_str("</SOAP-ENV:Header>");
        }

        xml.push_str("<SOAP-ENV:Body>");
        let operation = signature.name();
        let present: Vec<_> = signature
            .inputs()
            .iter()
            .zip(values)
            .filter_map(|(param, value)| value.as_ref().map(|v| (param.name.as_str(), v)))
            .filter(|(_, v)| !v.is_null())
            .collect();
        if present.is_empty() {
            write!(xml, "<ns0:{operation}/>")?;
        } else {
            write!(xml, "<ns0:{operation}>")?;
            for (name, value) in present {
                write_element(&mut xml, name, value)?;
            }
            write!(xml, "</ns0:{operation}>")?;
        }
        xml.push_str("</SOAP-ENV:Body></SOAP-ENV:Envelope>");
        Ok(xml.into_bytes())
    }

    fn decode_reply(
        &self,
        signature: &OperationSignature,
        body: &[u8],
    ) -> Result<ReplyBody, BindingError> {
        let envelope = parse_document(body)?;
        let soap_body = envelope.into_child("Body").ok_or(BindingError::MissingElement("Body"))?;
        let Some(wrapper) = soap_body.children.into_iter().next() else {
            return Ok(ReplyBody::Payload(None));
        };
        if wrapper.name == "Fault" {
            return Ok(ReplyBody::Fault(fault_from(wrapper)));
        }

        let outputs = signature.outputs();
        if wrapper.children.is_empty() {
            if wrapper.text.is_empty() || wrapper.nil {
                return Ok(ReplyBody::Payload(None));
            }
            let type_ref = (outputs.len() == 1).then(|| outputs[0].type_ref.as_str());
            return Ok(ReplyBody::Payload(Some(coerce(wrapper.text, type_ref))));
        }

        let mut parts = children_to_map(wrapper.children, |name| {
            outputs
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.type_ref.as_str())
        });
        // A single declared return part is unwrapped.
        if outputs.len() == 1 && parts.len() == 1 {
            if let Some(value) = parts.remove(&outputs[0].name) {
                return Ok(ReplyBody::Payload(Some(value)));
            }
        }
        Ok(ReplyBody::Payload(Some(Value::Map(parts))))
    }

    fn decode_fault(&self, body: &[u8]) -> Result<Fault, BindingError> {
        let envelope = parse_document(body)?;
        envelope
            .into_child("Body")
            .and_then(|b| b.into_child("Fault"))
            .map(fault_from)
            .ok_or(BindingError::MissingElement("Fault"))
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Bytes(b) => Some(STANDARD.encode(b)),
        _ => None,
    }
}

fn write_element(xml: &mut String, name: &str, value: &Value) -> std::fmt::Result {
    match value {
        Value::Null => Ok(()),
        Value::Array(items) => {
            for item in items {
                write_element(xml, name, item)?;
            }
            Ok(())
        }
        Value::Map(map) => {
            write!(xml, "<{name}>")?;
            for (key, item) in map {
                write_element(xml, key, item)?;
            }
            write!(xml, "</{name}>")
        }
        Value::Object(object) => {
            write!(xml, "<{name}>")?;
            for (key, item) in object.fields() {
                write_element(xml, key, item)?;
            }
            write!(xml, "</{name}>")
        }
        scalar => {
            let text = scalar_text(scalar).unwrap_or_default();
            write!(xml, "<{name}>{}</{name}>", xml_escape(&text))
        }
    }
}

fn write_header(xml: &mut String, header: &Value) -> std::fmt::Result {
    match header {
        Value::Object(object) => {
            let name = format!("ns0:{}", object.type_name());
            write_element(xml, &name, header)
        }
        Value::Map(map) => {
            for (key, item) in map {
                write_element(xml, key, item)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                write_header(xml, item)?;
            }
            Ok(())
        }
        Value::Null => Ok(()),
        _ => {
            tracing::warn!("ignoring SOAP header without an element name");
            Ok(())
        }
    }
}

/// Minimal element tree: local names, concatenated text, children.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    nil: bool,
    children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Self {
        let nil = start.attributes().flatten().any(|attr| {
            attr.key.local_name().as_ref() == b"nil" && attr.value.as_ref() == b"true"
        });
        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            nil,
            ..Self::default()
        }
    }

    fn into_child(self, name: &str) -> Option<Element> {
        self.children.into_iter().find(|c| c.name == name)
    }

    fn child_text(&self, name: &str) -> String {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.text.clone())
            .unwrap_or_default()
    }
}

fn malformed(err: impl std::fmt::Display) -> BindingError {
    BindingError::Malformed(err.to_string())
}

fn parse_document(body: &[u8]) -> Result<Element, BindingError> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let closed = match reader.read_event_into(&mut buf).map_err(malformed)? {
            Event::Start(start) => {
                stack.push(Element::open(&start));
                None
            }
            Event::Empty(start) => Some(Element::open(&start)),
            Event::End(_) => stack.pop(),
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape().map_err(malformed)?);
                }
                None
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data));
                }
                None
            }
            Event::Eof => return Err(malformed("unexpected end of document")),
            _ => None,
        };
        if let Some(element) = closed {
            match stack.last_mut() {
                Some(parent) => parent.children.push(element),
                None => return Ok(element),
            }
        }
        buf.clear();
    }
}

fn coerce(text: String, type_ref: Option<&str>) -> Value {
    let local = type_ref.map(|t| t.rsplit_once(':').map_or(t, |(_, l)| l));
    match local {
        Some(
            "int" | "integer" | "long" | "short" | "byte" | "unsignedInt" | "unsignedLong"
            | "unsignedShort" | "nonNegativeInteger" | "positiveInteger",
        ) => match text.trim().parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::String(text),
        },
        Some("double" | "float" | "decimal") => match text.trim().parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => Value::String(text),
        },
        Some("boolean") => match text.trim() {
            "true" | "1" => Value::Bool(true),
            "false" | "0" => Value::Bool(false),
            _ => Value::String(text),
        },
        Some("base64Binary") => match STANDARD.decode(text.trim()) {
            Ok(bytes) => Value::Bytes(bytes),
            Err(_) => Value::String(text),
        },
        _ => Value::String(text),
    }
}

fn element_value(element: Element, type_ref: Option<&str>) -> Value {
    if element.nil {
        Value::Null
    } else if element.children.is_empty() {
        if element.text.is_empty() {
            Value::Null
        } else {
            coerce(element.text, type_ref)
        }
    } else {
        Value::Map(children_to_map(element.children, |_| None))
    }
}

/// Repeated child names collapse into a list.
fn children_to_map<'t>(
    children: Vec<Element>,
    type_of: impl Fn(&str) -> Option<&'t str>,
) -> BTreeMap<String, Value> {
    let mut map: BTreeMap<String, Value> = BTreeMap::new();
    for child in children {
        let name = child.name.clone();
        let value = element_value(child, type_of(&name));
        match map.remove(&name) {
            None => {
                map.insert(name, value);
            }
            Some(Value::Array(mut items)) => {
                items.push(value);
                map.insert(name, Value::Array(items));
            }
            Some(previous) => {
                map.insert(name, Value::Array(vec![previous, value]));
            }
        }
    }
    map
}

fn fault_from(fault: Element) -> Fault {
    let code = fault.child_text("faultcode");
    let message = fault.child_text("faultstring");
    let detail = fault
        .into_child("detail")
        .map(|d| element_value(d, None))
        .filter(|v| !v.is_null());
    Fault {
        code,
        message,
        detail,
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};
use thiserror::Error;

/// Wire format the request data arrived in; replies use the same format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    Json,
    Xml,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("no data identified in request")]
    NoData,

    #[error("no possible to parse data either JSON or XML")]
    Unparseable,
}

/// Parsed `data` payload of a gateway request
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub data: Value,
    pub format: RequestFormat,
    /// JSONP callback from the query string
    pub callback: Option<String>,
}

impl GatewayRequest {
    /// Parse JSON first, falling back to an XML document such as
    /// `<data><event>get_core_by_branch</event><id>..</id></data>`
    pub fn parse(raw: &str, callback: Option<String>) -> Result<Self, RequestError> {
        if raw.trim().is_empty() {
            return Err(RequestError::NoData);
        }

        match serde_json::from_str::<Value>(raw) {
            Ok(data) => Ok(Self { data, format: RequestFormat::Json, callback }),
            Err(e) => {
                tracing::debug!("JSON cannot be parsed '{}' ({}). Proceeding to XML parsing ...", raw, e);
                let data = xml_to_value(raw).map_err(|e| {
                    tracing::error!("Problems parsing '{}': {}", raw, e);
                    RequestError::Unparseable
                })?;
                Ok(Self { data, format: RequestFormat::Xml, callback })
            }
        }
    }

    /// String field of the data object; non-string values count as absent
    pub fn field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// Event name; `{"event":"api","e":"<event>"}` is the API-style envelope
    pub fn event(&self) -> Option<&str> {
        match self.field("event") {
            Some("api") => self.field("e"),
            other => other,
        }
        .filter(|event| !event.is_empty())
    }

    pub fn guid(&self) -> Option<&str> {
        self.field("id").filter(|id| !id.is_empty())
    }

    /// Whether the reply should be JSON (or JSONP) rather than XML
    pub fn wants_json(&self) -> bool {
        self.format == RequestFormat::Json || self.callback.is_some()
    }
}

/// Element being assembled while reading an XML document
#[derive(Default)]
struct XmlNode {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl XmlNode {
    fn new(name: String) -> Self {
        Self { name, ..Self::default() }
    }

    /// Leaf elements become their text; elements with children become objects
    /// and their own text is dropped
    fn into_value(self) -> Value {
        if self.children.is_empty() {
            Value::String(self.text)
        } else {
            Value::Object(self.children)
        }
    }

    /// Repeated child names collect into an array
    fn push_child(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }
}

/// Read an XML document into the value of its root element. Attributes,
/// comments and processing instructions are ignored.
fn xml_to_value(raw: &str) -> Result<Value, String> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader.read_event().map_err(|e| e.to_string())?;
        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err("multiple root elements".to_string());
                }
                stack.push(XmlNode::new(element_name(start.name().as_ref())));
            }
            Event::Empty(start) => {
                let name = element_name(start.name().as_ref());
                match stack.last_mut() {
                    Some(parent) => parent.push_child(name, Value::String(String::new())),
                    None if root.is_none() => root = Some(Value::String(String::new())),
                    None => return Err("multiple root elements".to_string()),
                }
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| "unbalanced closing tag".to_string())?;
                let name = node.name.clone();
                let value = node.into_value();
                match stack.last_mut() {
                    Some(parent) => parent.push_child(name, value),
                    None => root = Some(value),
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                match stack.last_mut() {
                    Some(node) => node.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err("text outside of the root element".to_string()),
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                match stack.last_mut() {
                    Some(node) => node.text.push_str(&text),
                    None => return Err("CDATA outside of the root element".to_string()),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err("unexpected end of document".to_string());
    }
    root.ok_or_else(|| "no root element".to_string())
}

fn element_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

static GUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12,13}$")
        .expect("valid GUID pattern")
});

pub fn is_valid_guid(guid: &str) -> bool {
    GUID_PATTERN.is_match(guid)
}

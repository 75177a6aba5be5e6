use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::request::GatewayRequest;

const XML_ROOT: &str = "root";

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Failed to serialize response data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write XML response: {0}")]
    Xml(String),
}

/// Render `body` the way the request asked for: JSON, JSONP (`callback`) or XML
pub fn render<T: Serialize>(request: &GatewayRequest, status: StatusCode, body: &T) -> Response {
    match try_render(request, status, body) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("{}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "result": "ko", "message": "Failed to format response", "resultcode": 500 })),
            )
                .into_response()
        }
    }
}

fn try_render<T: Serialize>(request: &GatewayRequest, status: StatusCode, body: &T) -> Result<Response, FormatError> {
    let value = serde_json::to_value(body)?;

    if !request.wants_json() {
        let xml = to_xml(&value)?;
        return Ok((status, [(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml).into_response());
    }

    let json = serde_json::to_string(&value)?;
    match request.callback.as_deref().map(sanitize_callback) {
        Some(callback) if !callback.is_empty() => {
            let mut response = (
                status,
                [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
                jsonp_body(&callback, &json),
            )
                .into_response();
            response
                .headers_mut()
                .insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
            Ok(response)
        }
        _ => Ok((status, [(header::CONTENT_TYPE, "application/json")], json).into_response()),
    }
}

/// Keep only characters valid in a JavaScript member expression
pub fn sanitize_callback(callback: &str) -> String {
    callback
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '[' | ']'))
        .collect()
}

pub fn jsonp_body(callback: &str, json: &str) -> String {
    // U+2028/U+2029 are valid in JSON but terminate JavaScript string literals
    let json = json.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029");
    format!("/**/ typeof {cb} === 'function' && {cb}({json});", cb = callback, json = json)
}

/// Convert a JSON value to an XML document without declaration.
/// A single-key object names the root element, otherwise the root is `<root>`;
/// arrays become repeated elements named after their key.
pub fn to_xml(value: &Value) -> Result<String, FormatError> {
    let mut writer = Writer::new(Vec::new());

    match value {
        Value::Object(map) if map.len() == 1 => match map.iter().next() {
            Some((name, inner)) if !inner.is_array() => write_element(&mut writer, name, inner)?,
            _ => write_root(&mut writer, value)?,
        },
        _ => write_root(&mut writer, value)?,
    }

    String::from_utf8(writer.into_inner()).map_err(|e| FormatError::Xml(e.to_string()))
}

fn write_root(writer: &mut Writer<Vec<u8>>, value: &Value) -> Result<(), FormatError> {
    write_element(writer, XML_ROOT, value)
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), FormatError> {
    writer.write_event(event).map_err(|e| FormatError::Xml(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<(), FormatError> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
        }
        Value::Null => write_event(writer, Event::Empty(BytesStart::new(name)))?,
        Value::Object(map) => {
            write_event(writer, Event::Start(BytesStart::new(name)))?;
            for (key, child) in map {
                write_element(writer, key, child)?;
            }
            write_event(writer, Event::End(BytesEnd::new(name)))?;
        }
        Value::String(text) => write_text(writer, name, text)?,
        Value::Number(number) => write_text(writer, name, &number.to_string())?,
        Value::Bool(flag) => write_text(writer, name, &flag.to_string())?,
    }
    Ok(())
}

fn write_text(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), FormatError> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_event(writer, Event::Text(BytesText::new(text)))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

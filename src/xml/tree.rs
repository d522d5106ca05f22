use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::core::CfdiError;

/// Convert markup into a nested JSON structure keyed by local names.
///
/// The root element becomes the returned object. Attributes and child
/// elements are both keys of their element's object, without namespace
/// prefixes; namespace declarations are dropped. A child that occurs once
/// stays a bare object, repeated children become an array. Text content is
/// ignored: CFDI carries its data in attributes.
///
/// ```
/// let v = cfdi::xml::xml_to_value(
///     r#"<cfdi:Comprobante xmlns:cfdi="http://www.sat.gob.mx/cfd/4" Total="1.00">
///          <cfdi:Emisor Rfc="EKU9003173C9"/>
///        </cfdi:Comprobante>"#,
/// ).unwrap();
/// assert_eq!(v["Total"], "1.00");
/// assert_eq!(v["Emisor"]["Rfc"], "EKU9003173C9");
/// ```
pub fn xml_to_value(xml: &str) -> Result<Value, CfdiError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Open elements: local name and the object being filled
    let mut stack: Vec<(String, Map<String, Value>)> = Vec::new();
    let mut root: Option<Map<String, Value>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(open(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let (name, obj) = open(e)?;
                close(&mut stack, &mut root, name, obj);
            }
            Ok(Event::End(_)) => {
                if let Some((name, obj)) = stack.pop() {
                    close(&mut stack, &mut root, name, obj);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CfdiError::Parse(format!(
                    "XML parse error at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    if let Some((name, _)) = stack.last() {
        return Err(CfdiError::Parse(format!("unclosed element <{name}>")));
    }
    root.map(Value::Object)
        .ok_or_else(|| CfdiError::Parse("document has no root element".into()))
}

fn open(e: &BytesStart<'_>) -> Result<(String, Map<String, Value>), CfdiError> {
    let name = utf8(e.local_name().as_ref())?.to_string();
    let mut obj = Map::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| CfdiError::Parse(format!("bad attribute: {err}")))?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = utf8(attr.key.local_name().as_ref())?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| CfdiError::Parse(format!("bad value for {key}: {err}")))?;
        obj.insert(key, Value::String(value.into_owned()));
    }

    Ok((name, obj))
}

fn close(
    stack: &mut [(String, Map<String, Value>)],
    root: &mut Option<Map<String, Value>>,
    name: String,
    obj: Map<String, Value>,
) {
    let Some((_, parent)) = stack.last_mut() else {
        // Anything after the first root element is ignored
        if root.is_none() {
            *root = Some(obj);
        }
        return;
    };

    let value = Value::Object(obj);
    match parent.get_mut(&name) {
        None => {
            parent.insert(name, value);
        }
        Some(Value::Array(list)) => list.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, CfdiError> {
    std::str::from_utf8(bytes).map_err(|e| CfdiError::Parse(format!("invalid UTF-8 name: {e}")))
}

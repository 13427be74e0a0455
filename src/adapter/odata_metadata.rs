//! OData v2 `$metadata` (EDMX) parsing
//!
//! Matching is on local names, so `edm:`/`edmx:`/`sap:` prefixes are
//! irrelevant. Only `EntityType`, `Key/PropertyRef` and `Property` are read.

use crate::error::{Error, Result};
use crate::schema::{EntitySchema, FieldInfo, DEFAULT_KEY_FIELD};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Default)]
struct EntityType {
    name: String,
    keys: Vec<String>,
    fields: Vec<FieldInfo>,
}

/// Build the schema of `entity` from a `$metadata` document.
///
/// The entity type used is the one named like the last path segment of
/// `entity` (or that segment + `Type`); with no match, the properties of
/// every entity type are used.
pub(crate) fn parse_metadata(xml: &str, entity: &str) -> Result<EntitySchema> {
    let types = entity_types(xml)?;
    let segment = entity.rsplit('/').next().unwrap_or(entity);
    let with_suffix = format!("{segment}Type");

    let chosen: Vec<&EntityType> = match types
        .iter()
        .find(|t| t.name == segment || t.name == with_suffix)
    {
        Some(t) => vec![t],
        None => types.iter().collect(),
    };

    let fields: Vec<FieldInfo> = chosen.iter().flat_map(|t| t.fields.clone()).collect();
    let key_field = chosen
        .iter()
        .find_map(|t| t.keys.first().cloned())
        .or_else(|| fields.first().map(|f| f.name.clone()))
        .unwrap_or_else(|| DEFAULT_KEY_FIELD.to_string());

    let mut schema = EntitySchema::new(entity);
    if let [only] = chosen.as_slice() {
        schema.label.clone_from(&only.name);
    }
    schema.key_field = key_field;
    schema.fields = fields;
    Ok(schema)
}

fn entity_types(xml: &str) -> Result<Vec<EntityType>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut types = Vec::new();
    let mut current: Option<EntityType> = None;
    let mut in_key = false;
    let mut saw_element = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::xml(format!(
                "Invalid $metadata document at byte {}: {e}",
                reader.error_position()
            ))
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                saw_element = true;
                let self_closing = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"EntityType" => {
                        let entity_type = EntityType {
                            name: attr(e, b"Name")?.unwrap_or_default(),
                            ..EntityType::default()
                        };
                        if self_closing {
                            types.push(entity_type);
                        } else {
                            current = Some(entity_type);
                        }
                    }
                    b"Key" => in_key = !self_closing,
                    b"PropertyRef" if in_key => {
                        if let (Some(t), Some(name)) = (current.as_mut(), attr(e, b"Name")?) {
                            t.keys.push(name);
                        }
                    }
                    b"Property" => {
                        if let Some(t) = current.as_mut() {
                            t.fields.push(property(e)?);
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"EntityType" => types.extend(current.take()),
                b"Key" => in_key = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_element {
        return Err(Error::xml("$metadata document contains no elements"));
    }
    Ok(types)
}

fn property(e: &BytesStart<'_>) -> Result<FieldInfo> {
    let name = attr(e, b"Name")?.unwrap_or_default();
    let edm_type = attr(e, b"Type")?.unwrap_or_default();
    let data_type = edm_type.rsplit('.').next().unwrap_or_default().to_string();

    Ok(FieldInfo::new(name, data_type)
        .label(attr(e, b"label")?.unwrap_or_default())
        .required(attr(e, b"Nullable")?.as_deref() == Some("false"))
        .read_only(attr(e, b"updatable")?.as_deref() == Some("false")))
}

/// Attribute value by local name
fn attr(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attribute in e.attributes() {
        let attribute = attribute.map_err(|err| Error::xml(format!("Bad attribute: {err}")))?;
        if attribute.key.local_name().as_ref() == local {
            let value = attribute
                .unescape_value()
                .map_err(|err| Error::xml(format!("Bad attribute value: {err}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

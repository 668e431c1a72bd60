use crate::context::OutputDocument;
use crate::error::{AppError, Result};
use crate::gather::Record;
use log;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Display;

pub const SUPPORTED_FORMATS: [&str; 3] = ["xml", "json", "yaml"];

fn xml_err<E: Display>(err: E) -> AppError {
    AppError::XmlSerialize(err.to_string())
}

/// Characters XML 1.0 allows in text and attribute values.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}' | '\u{A}' | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Byte offset and value of the first character XML cannot carry.
pub fn find_illegal_xml_char(text: &str) -> Option<(usize, char)> {
    text.char_indices().find(|(_, c)| !is_xml_char(*c))
}

pub fn illegal_xml_char_message(offset: usize, c: char) -> String {
    format!(
        "File contains characters not allowed in XML (U+{:04X} at byte {})",
        c as u32, offset
    )
}

/// Paths, messages and tree lines are replaced character-wise rather than
/// rejected.
fn xml_safe(text: &str) -> Cow<'_, str> {
    if find_illegal_xml_char(text).is_none() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(
            text.chars()
                .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
                .collect(),
        )
    }
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    attribute: Option<(&str, &str)>,
    text: &str,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    if let Some((key, value)) = attribute {
        start.push_attribute((key, &*xml_safe(value)));
    }
    writer.write_event(Event::Start(start)).map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)?;
    Ok(())
}

/// Writes the `root` / `project_context` / `task` document. Indentation is
/// only added between elements; text bodies are written verbatim (escaped).
/// A file body XML cannot carry is written as an `error` element, and a task
/// containing such characters is rejected.
pub fn serialize_document_to_xml(document: &OutputDocument, pretty: bool) -> Result<String> {
    if let Some((offset, c)) = find_illegal_xml_char(&document.task) {
        return Err(AppError::InvalidArgument(format!(
            "Task contains characters not allowed in XML (U+{:04X} at byte {})",
            c as u32, offset
        )));
    }

    let mut writer = if pretty {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("root")))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("project_context")))
        .map_err(xml_err)?;

    for record in &document.project_context.files {
        match record {
            Record::File(file) => {
                if let Some((offset, c)) = find_illegal_xml_char(&file.content) {
                    log::warn!(
                        "Writing {} as an error element: illegal XML character",
                        file.path
                    );
                    write_text_element(
                        &mut writer,
                        "error",
                        Some(("path", file.path.as_str())),
                        &illegal_xml_char_message(offset, c),
                    )?;
                    continue;
                }
                let mut start = BytesStart::new("file");
                start.push_attribute(("path", &*xml_safe(&file.path)));
                writer.write_event(Event::Start(start)).map_err(xml_err)?;
                write_text_element(&mut writer, "content", None, &file.content)?;
                writer
                    .write_event(Event::End(BytesEnd::new("file")))
                    .map_err(xml_err)?;
            }
            Record::Error(error) => {
                write_text_element(
                    &mut writer,
                    "error",
                    Some(("path", error.path.as_str())),
                    &xml_safe(&error.message),
                )?;
            }
        }
    }

    write_text_element(
        &mut writer,
        "directory_structure",
        None,
        &xml_safe(&document.project_context.directory_structure),
    )?;
    writer
        .write_event(Event::End(BytesEnd::new("project_context")))
        .map_err(xml_err)?;
    write_text_element(&mut writer, "task", None, &document.task)?;
    writer
        .write_event(Event::End(BytesEnd::new("root")))
        .map_err(xml_err)?;

    let mut xml = String::from_utf8(writer.into_inner())?;
    if pretty {
        xml.push('\n');
    }
    Ok(xml)
}

pub fn serialize_context_to_json<T: Serialize>(context: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(context).map_err(AppError::JsonSerialize)
    } else {
        serde_json::to_string(context).map_err(AppError::JsonSerialize)
    }
}

pub fn serialize_context_to_yaml<T: Serialize>(context: &T) -> Result<String> {
    serde_yml::to_string(context).map_err(AppError::YamlError)
}

pub fn serialize_document(document: &OutputDocument, format: &str, pretty: bool) -> Result<String> {
    match format.to_lowercase().as_str() {
        "xml" => serialize_document_to_xml(document, pretty),
        "json" => serialize_context_to_json(document, pretty),
        "yaml" | "yml" => serialize_context_to_yaml(document),
        other => Err(AppError::InvalidArgument(format!(
            "Unsupported output format '{}'. Expected one of: {}",
            other,
            SUPPORTED_FORMATS.join(", ")
        ))),
    }
}

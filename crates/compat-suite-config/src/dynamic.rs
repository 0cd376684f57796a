// compat-suite-config/src/dynamic.rs
// ============================================================================
// Module: Dynamic Config
// Description: Per-module dynamic configuration documents.
// Purpose: Read, look up, and write `<module>.dynamic` XML files.
// Dependencies: quick-xml, serde, thiserror
// ============================================================================

//! ## Overview
//! A dynamic config document holds scalar entries and list entries:
//!
//! ```xml
//! <DynamicConfig>
//!   <Config key="timeout">30</Config>
//!   <ConfigList key="hosts">
//!     <Item>a</Item>
//!   </ConfigList>
//! </DynamicConfig>
//! ```
//!
//! A key may be a scalar or a list, never both. Within one kind a repeated key
//! keeps its last value. Entry text is kept exactly as written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File extension of dynamic config files.
pub const CONFIG_FILE_EXTENSION: &str = "dynamic";
/// Root element.
const TAG_DYNAMIC_CONFIG: &str = "DynamicConfig";
/// Scalar entry element.
const TAG_CONFIG: &str = "Config";
/// List entry element.
const TAG_CONFIG_LIST: &str = "ConfigList";
/// List item element.
const TAG_ITEM: &str = "Item";
/// Entry key attribute.
const ATTR_KEY: &str = "key";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Kind of value bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Single string value.
    Scalar,
    /// Ordered list of strings.
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("scalar"),
            Self::List => f.write_str("list"),
        }
    }
}

/// Scalar and list entries of a dynamic config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DynamicConfigParams {
    /// Scalar entries.
    pub config: BTreeMap<String, String>,
    /// List entries; item order is preserved.
    pub config_lists: BTreeMap<String, Vec<String>>,
}

impl DynamicConfigParams {
    /// Returns the scalar value for `key`.
    #[must_use]
    pub fn get_config(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Returns the list value for `key`.
    #[must_use]
    pub fn get_config_list(&self, key: &str) -> Option<&[String]> {
        self.config_lists.get(key).map(Vec::as_slice)
    }

    /// Returns the kind bound to `key`, if any.
    #[must_use]
    pub fn kind_of(&self, key: &str) -> Option<ValueKind> {
        if self.config.contains_key(key) {
            Some(ValueKind::Scalar)
        } else if self.config_lists.contains_key(key) {
            Some(ValueKind::List)
        } else {
            None
        }
    }

    /// Sets a scalar entry.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicConfigError::TypeMismatch`] when `key` holds a list.
    pub fn set_config(&mut self, key: &str, value: String) -> Result<(), DynamicConfigError> {
        check_kind(self, key, ValueKind::Scalar)?;
        self.config.insert(key.to_string(), value);
        Ok(())
    }

    /// Replaces a list entry.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicConfigError::TypeMismatch`] when `key` holds a scalar.
    pub fn set_config_list(
        &mut self,
        key: &str,
        values: Vec<String>,
    ) -> Result<(), DynamicConfigError> {
        check_kind(self, key, ValueKind::List)?;
        self.config_lists.insert(key.to_string(), values);
        Ok(())
    }
}

/// Dynamic config loaded for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicConfig {
    /// Source file.
    path: PathBuf,
    /// Parsed entries.
    params: DynamicConfigParams,
}

impl DynamicConfig {
    /// Loads `<folder>/<module>.dynamic`.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicConfigError`] when the file is missing or invalid.
    pub fn load(folder: &Path, module: &str) -> Result<Self, DynamicConfigError> {
        Self::from_file(&Self::config_file(folder, module)?)
    }

    /// Loads a dynamic config file.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicConfigError`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, DynamicConfigError> {
        Ok(Self {
            path: path.to_path_buf(),
            params: gen_params_from_file(path)?,
        })
    }

    /// Locates `<folder>/<module>.dynamic`.
    ///
    /// # Errors
    ///
    /// Returns [`DynamicConfigError::InvalidModule`] for unusable module names
    /// and [`DynamicConfigError::NotFound`] when the file does not exist.
    pub fn config_file(folder: &Path, module: &str) -> Result<PathBuf, DynamicConfigError> {
        let path = folder.join(module_file_name(module)?);
        if !path.is_file() {
            return Err(DynamicConfigError::NotFound(path.display().to_string()));
        }
        Ok(path)
    }

    /// Returns the source file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parsed entries.
    #[must_use]
    pub const fn params(&self) -> &DynamicConfigParams {
        &self.params
    }

    /// Returns the scalar value for `key`.
    #[must_use]
    pub fn get_config(&self, key: &str) -> Option<&str> {
        self.params.get_config(key)
    }

    /// Returns the list value for `key`.
    #[must_use]
    pub fn get_config_list(&self, key: &str) -> Option<&[String]> {
        self.params.get_config_list(key)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Dynamic config errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DynamicConfigError {
    /// Malformed XML or JSON input.
    #[error("dynamic config parse error: {0}")]
    Parse(String),
    /// A key is bound to different kinds.
    #[error("dynamic config key '{key}' is a {expected}, not a {found}")]
    TypeMismatch {
        /// Conflicting key.
        key: String,
        /// Kind already bound to the key.
        expected: ValueKind,
        /// Kind that was supplied.
        found: ValueKind,
    },
    /// No config file for the module.
    #[error("dynamic config file not found: {0}")]
    NotFound(String),
    /// Module name cannot form a file name.
    #[error("invalid module name '{0}'")]
    InvalidModule(String),
    /// Filesystem failure.
    #[error("dynamic config io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Reading
// ============================================================================

/// Reads the entries of a dynamic config file.
///
/// # Errors
///
/// Returns [`DynamicConfigError`] when the file cannot be read or parsed.
pub fn gen_params_from_file(path: &Path) -> Result<DynamicConfigParams, DynamicConfigError> {
    let content = fs::read_to_string(path).map_err(|err| {
        DynamicConfigError::Io(format!("{}: {err}", path.display()))
    })?;
    params_from_xml(&content)
}

/// Parses the entries of a dynamic config document.
///
/// # Errors
///
/// Returns [`DynamicConfigError::Parse`] for malformed documents, a wrong
/// root element, or entries without a key, and
/// [`DynamicConfigError::TypeMismatch`] when a key is both scalar and list.
pub fn params_from_xml(xml: &str) -> Result<DynamicConfigParams, DynamicConfigError> {
    let mut reader = Reader::from_str(xml);
    let mut state = ReadState::default();
    loop {
        let event = reader.read_event().map_err(|err| parse_error(err.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(start) => state.open(&start)?,
            Event::Empty(start) => {
                state.open(&start)?;
                state.close()?;
            }
            Event::End(_) => state.close()?,
            Event::Text(text) => {
                let value = text.unescape().map_err(|err| parse_error(err.to_string()))?;
                state.text(&value)?;
            }
            Event::CData(_) => return Err(parse_error("character data is not allowed")),
            _ => {}
        }
    }
    state.finish()
}

/// Element currently open.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Open {
    /// `Config` with its key and text so far.
    Config(String, String),
    /// `ConfigList` with its key and items so far.
    List(String, Vec<String>),
    /// `Item` inside a list, with its text so far.
    Item(String, Vec<String>, String),
}

/// Incremental reader state.
#[derive(Debug, Default)]
struct ReadState {
    /// Entries read so far.
    params: DynamicConfigParams,
    /// Whether the root element opened.
    root_open: bool,
    /// Whether the root element closed.
    root_closed: bool,
    /// Entry element currently open.
    open: Option<Open>,
}

impl ReadState {
    /// Handles an opening tag.
    fn open(&mut self, start: &BytesStart<'_>) -> Result<(), DynamicConfigError> {
        let name = decode_name(start.name().as_ref())?;
        if self.root_closed {
            return Err(parse_error(format!("element <{name}> after document root")));
        }
        if !self.root_open {
            if name != TAG_DYNAMIC_CONFIG {
                return Err(parse_error(format!("expected <{TAG_DYNAMIC_CONFIG}> root, found <{name}>")));
            }
            self.root_open = true;
            return Ok(());
        }
        self.open = Some(match (self.open.take(), name.as_str()) {
            (None, TAG_CONFIG) => Open::Config(read_key(start, &name)?, String::new()),
            (None, TAG_CONFIG_LIST) => Open::List(read_key(start, &name)?, Vec::new()),
            (Some(Open::List(key, items)), TAG_ITEM) => Open::Item(key, items, String::new()),
            _ => return Err(parse_error(format!("unexpected element <{name}>"))),
        });
        Ok(())
    }

    /// Handles a closing tag.
    fn close(&mut self) -> Result<(), DynamicConfigError> {
        match self.open.take() {
            Some(Open::Config(key, value)) => self.params.set_config(&key, value),
            Some(Open::List(key, items)) => self.params.set_config_list(&key, items),
            Some(Open::Item(key, mut items, value)) => {
                items.push(value);
                self.open = Some(Open::List(key, items));
                Ok(())
            }
            None => {
                self.root_closed = true;
                Ok(())
            }
        }
    }

    /// Handles character data.
    fn text(&mut self, text: &str) -> Result<(), DynamicConfigError> {
        match self.open.as_mut() {
            Some(Open::Config(_, value) | Open::Item(_, _, value)) => {
                value.push_str(text);
                Ok(())
            }
            _ if text.trim().is_empty() => Ok(()),
            _ => Err(parse_error(format!("unexpected text '{}'", text.trim()))),
        }
    }

    /// Returns the entries once the document is complete.
    fn finish(self) -> Result<DynamicConfigParams, DynamicConfigError> {
        if !self.root_open {
            return Err(parse_error(format!("missing <{TAG_DYNAMIC_CONFIG}> root")));
        }
        if !self.root_closed {
            return Err(parse_error("document ended before root closed"));
        }
        Ok(self.params)
    }
}

// ============================================================================
// SECTION: Writing
// ============================================================================

/// Renders entries as a dynamic config document.
///
/// # Errors
///
/// Returns [`DynamicConfigError::Io`] when the writer fails.
pub fn params_to_xml(params: &DynamicConfigParams) -> Result<String, DynamicConfigError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;
    emit(&mut writer, Event::Start(BytesStart::new(TAG_DYNAMIC_CONFIG)))?;
    for (key, value) in &params.config {
        let start = BytesStart::new(TAG_CONFIG).with_attributes([(ATTR_KEY, key.as_str())]);
        write_text_element(&mut writer, start, TAG_CONFIG, value)?;
    }
    for (key, items) in &params.config_lists {
        let start = BytesStart::new(TAG_CONFIG_LIST).with_attributes([(ATTR_KEY, key.as_str())]);
        if items.is_empty() {
            emit(&mut writer, Event::Empty(start))?;
            continue;
        }
        emit(&mut writer, Event::Start(start))?;
        for item in items {
            write_text_element(&mut writer, BytesStart::new(TAG_ITEM), TAG_ITEM, item)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new(TAG_CONFIG_LIST)))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new(TAG_DYNAMIC_CONFIG)))?;
    String::from_utf8(writer.into_inner()).map_err(|err| DynamicConfigError::Io(err.to_string()))
}

/// Writes an element holding only text; empty text becomes an empty element.
fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    tag: &str,
    text: &str,
) -> Result<(), DynamicConfigError> {
    if text.is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(tag)))
}

/// Writes one event, mapping writer failures.
fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), DynamicConfigError> {
    writer.write_event(event).map_err(|err| DynamicConfigError::Io(err.to_string()))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns `<module>.dynamic`, rejecting names that are not a single file name.
pub(crate) fn module_file_name(module: &str) -> Result<String, DynamicConfigError> {
    let invalid = module.is_empty()
        || module == "."
        || module == ".."
        || module.contains(['/', '\\'])
        || module.chars().any(char::is_control);
    if invalid {
        return Err(DynamicConfigError::InvalidModule(module.to_string()));
    }
    Ok(format!("{module}.{CONFIG_FILE_EXTENSION}"))
}

/// Rejects binding `key` to `kind` when it already holds the other kind.
fn check_kind(
    params: &DynamicConfigParams,
    key: &str,
    kind: ValueKind,
) -> Result<(), DynamicConfigError> {
    match params.kind_of(key) {
        Some(existing) if existing != kind => Err(DynamicConfigError::TypeMismatch {
            key: key.to_string(),
            expected: existing,
            found: kind,
        }),
        _ => Ok(()),
    }
}

/// Reads the required, non-empty `key` attribute.
fn read_key(start: &BytesStart<'_>, element: &str) -> Result<String, DynamicConfigError> {
    for attr in start.attributes() {
        let attr = attr.map_err(|err| parse_error(err.to_string()))?;
        if attr.key.as_ref() == ATTR_KEY.as_bytes() {
            let value = attr.unescape_value().map_err(|err| parse_error(err.to_string()))?;
            if value.is_empty() {
                break;
            }
            return Ok(value.into_owned());
        }
    }
    Err(parse_error(format!("<{element}> requires a non-empty '{ATTR_KEY}' attribute")))
}

/// Decodes an element name.
fn decode_name(raw: &[u8]) -> Result<String, DynamicConfigError> {
    std::str::from_utf8(raw).map(str::to_string).map_err(|err| parse_error(err.to_string()))
}

/// Builds a parse error.
fn parse_error(reason: impl Into<String>) -> DynamicConfigError {
    DynamicConfigError::Parse(reason.into())
}

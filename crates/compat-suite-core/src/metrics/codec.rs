// compat-suite-core/src/metrics/codec.rs
// ============================================================================
// Module: Report Log XML Codec
// Description: Deterministic XML encoding and strict decoding of report logs.
// Purpose: Carry report logs between device and host without loss.
// Dependencies: quick-xml
// ============================================================================

//! ## Overview
//! The encoding is a `ReportLog` root holding one `Summary` and one `Detail`
//! section of `Metric` elements, each with one `Value` child per sample.
//! Decoding is all-or-nothing: the first problem aborts with
//! [`ReportError::Parse`] naming the fragment involved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;

use crate::metrics::report_log::MetricEntry;
use crate::metrics::report_log::ReportError;
use crate::metrics::report_log::ReportLog;
use crate::metrics::taxonomy::ResultType;
use crate::metrics::taxonomy::ResultUnit;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Root element.
const TAG_REPORT_LOG: &str = "ReportLog";
/// Summary section element.
const TAG_SUMMARY: &str = "Summary";
/// Detail section element.
const TAG_DETAIL: &str = "Detail";
/// Metric element.
const TAG_METRIC: &str = "Metric";
/// Sample element.
const TAG_VALUE: &str = "Value";
/// Report name attribute on the root.
const ATTR_NAME: &str = "name";
/// Stream name attribute on the root.
const ATTR_STREAM: &str = "stream";
/// Test id attribute on a metric.
const ATTR_SOURCE: &str = "source";
/// Label attribute on a metric.
const ATTR_MESSAGE: &str = "message";
/// Result type attribute on a metric.
const ATTR_SCORE_TYPE: &str = "score_type";
/// Result unit attribute on a metric.
const ATTR_SCORE_UNIT: &str = "score_unit";

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Encodes a report log as an XML document.
///
/// # Errors
///
/// Returns [`ReportError::MissingSummary`] when the report has no summary and
/// [`ReportError::Encode`] when the writer fails.
pub fn serialize(report: &ReportLog) -> Result<String, ReportError> {
    let summary = report.summary().ok_or(ReportError::MissingSummary)?;
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    let root = BytesStart::new(TAG_REPORT_LOG)
        .with_attributes([(ATTR_NAME, report.name()), (ATTR_STREAM, report.stream_name())]);
    emit(&mut writer, Event::Start(root))?;

    emit(&mut writer, Event::Start(BytesStart::new(TAG_SUMMARY)))?;
    write_metric(&mut writer, summary)?;
    emit(&mut writer, Event::End(BytesEnd::new(TAG_SUMMARY)))?;

    if report.details().is_empty() {
        emit(&mut writer, Event::Empty(BytesStart::new(TAG_DETAIL)))?;
    } else {
        emit(&mut writer, Event::Start(BytesStart::new(TAG_DETAIL)))?;
        for entry in report.details() {
            write_metric(&mut writer, entry)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new(TAG_DETAIL)))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new(TAG_REPORT_LOG)))?;
    String::from_utf8(writer.into_inner()).map_err(|err| ReportError::Encode(err.to_string()))
}

/// Writes one metric element with its samples.
fn write_metric(writer: &mut Writer<Vec<u8>>, entry: &MetricEntry) -> Result<(), ReportError> {
    let metric = BytesStart::new(TAG_METRIC).with_attributes([
        (ATTR_SOURCE, entry.test_id()),
        (ATTR_MESSAGE, entry.message()),
        (ATTR_SCORE_TYPE, entry.result_type().as_report_str()),
        (ATTR_SCORE_UNIT, entry.unit().as_report_str()),
    ]);
    emit(writer, Event::Start(metric))?;
    for value in entry.values() {
        let text = format_value(*value);
        emit(writer, Event::Start(BytesStart::new(TAG_VALUE)))?;
        emit(writer, Event::Text(BytesText::new(&text)))?;
        emit(writer, Event::End(BytesEnd::new(TAG_VALUE)))?;
    }
    emit(writer, Event::End(BytesEnd::new(TAG_METRIC)))
}

/// Writes one event, mapping writer failures.
fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ReportError> {
    writer.write_event(event).map_err(|err| ReportError::Encode(err.to_string()))
}

/// Formats a sample in its shortest round-trip form, always with a fraction.
fn format_value(value: f64) -> String {
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) { text } else { format!("{text}.0") }
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes a report log from an XML document.
///
/// # Errors
///
/// Returns [`ReportError::Parse`] for malformed or incomplete documents and
/// [`ReportError::Format`] for unknown result type or unit tokens.
pub fn parse(xml: &str) -> Result<ReportLog, ReportError> {
    if xml.trim().is_empty() {
        return Err(parse_error("document", "content is empty"));
    }
    let mut reader = Reader::from_str(xml);
    let mut state = DecodeState::default();
    loop {
        let event = reader.read_event().map_err(|err| parse_error("xml", err.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(start) => {
                state.open(&start)?;
            }
            Event::Empty(start) => {
                let name = state.open(&start)?;
                state.close(&name)?;
            }
            Event::End(end) => state.close(&element_name(end.name().as_ref())?)?,
            Event::Text(text) => {
                let value = text.unescape().map_err(|err| parse_error("text", err.to_string()))?;
                state.text(&value)?;
            }
            Event::CData(_) => return Err(parse_error("CDATA", "character data is not allowed")),
            _ => {}
        }
    }
    state.finish()
}

/// Section of the document currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Section {
    /// Directly under the root.
    #[default]
    Root,
    /// Inside `Summary`.
    Summary,
    /// Inside `Detail`.
    Detail,
}

/// Metric being assembled from its element and value children.
#[derive(Debug)]
struct PendingMetric {
    /// `source` attribute.
    test_id: String,
    /// `message` attribute.
    message: String,
    /// Parsed `score_type` attribute.
    result_type: ResultType,
    /// Parsed `score_unit` attribute.
    unit: ResultUnit,
    /// Samples read so far.
    values: Vec<f64>,
}

/// Incremental decoder state.
#[derive(Debug, Default)]
struct DecodeState {
    /// Report created when the root element opens.
    report: Option<ReportLog>,
    /// Set once the root element has closed.
    root_closed: bool,
    /// Current section.
    section: Section,
    /// Whether a `Summary` section was read.
    summary_seen: bool,
    /// Whether a `Detail` section was read.
    detail_seen: bool,
    /// Metric currently open.
    metric: Option<PendingMetric>,
    /// Text of the `Value` element currently open.
    value: Option<String>,
}

impl DecodeState {
    /// Handles an opening tag and returns its name.
    fn open(&mut self, start: &BytesStart<'_>) -> Result<String, ReportError> {
        let name = element_name(start.name().as_ref())?;
        if self.root_closed {
            return Err(parse_error(&name, "element after document root"));
        }
        if self.value.is_some() {
            return Err(parse_error(&name, "element inside Value"));
        }
        if self.report.is_none() {
            if name != TAG_REPORT_LOG {
                return Err(parse_error(&name, "expected ReportLog root"));
            }
            let mut attrs = read_attributes(start)?;
            let report_name = take_attribute(&mut attrs, &name, ATTR_NAME)?;
            let stream = take_attribute(&mut attrs, &name, ATTR_STREAM)?;
            self.report = Some(ReportLog::new(report_name, stream));
            return Ok(name);
        }
        if self.metric.is_some() {
            if name != TAG_VALUE {
                return Err(parse_error(&name, "expected Value inside Metric"));
            }
            self.value = Some(String::new());
            return Ok(name);
        }
        match (self.section, name.as_str()) {
            (Section::Root, TAG_SUMMARY) => {
                if self.summary_seen {
                    return Err(parse_error(&name, "duplicate Summary section"));
                }
                self.summary_seen = true;
                self.section = Section::Summary;
            }
            (Section::Root, TAG_DETAIL) => {
                if self.detail_seen {
                    return Err(parse_error(&name, "duplicate Detail section"));
                }
                self.detail_seen = true;
                self.section = Section::Detail;
            }
            (Section::Summary | Section::Detail, TAG_METRIC) => {
                self.metric = Some(read_metric(start, &name)?);
            }
            _ => return Err(parse_error(&name, "unexpected element")),
        }
        Ok(name)
    }

    /// Handles a closing tag.
    fn close(&mut self, name: &str) -> Result<(), ReportError> {
        if let Some(text) = self.value.take() {
            let metric = self.metric.as_mut().ok_or_else(|| parse_error(name, "orphan Value"))?;
            let value = text
                .trim()
                .parse::<f64>()
                .map_err(|_| parse_error(TAG_VALUE, format!("invalid number '{text}'")))?;
            metric.values.push(value);
            return Ok(());
        }
        if let Some(pending) = self.metric.take() {
            return self.finish_metric(pending);
        }
        match self.section {
            Section::Summary => {
                let has_summary = self.report.as_ref().is_some_and(|report| report.summary().is_some());
                if !has_summary {
                    return Err(parse_error(TAG_SUMMARY, "summary holds no Metric"));
                }
                self.section = Section::Root;
            }
            Section::Detail => self.section = Section::Root,
            Section::Root => self.root_closed = true,
        }
        Ok(())
    }

    /// Moves a completed metric into the report.
    fn finish_metric(&mut self, pending: PendingMetric) -> Result<(), ReportError> {
        let report = self.report.as_mut().ok_or_else(|| parse_error(TAG_METRIC, "no root"))?;
        let fragment = format!("{TAG_METRIC} {}#{}", pending.test_id, pending.message);
        let entry = MetricEntry::new(
            pending.test_id,
            pending.message,
            pending.values,
            pending.result_type,
            pending.unit,
        )
        .map_err(|err| parse_error(&fragment, err.to_string()))?;
        match self.section {
            Section::Summary => {
                if report.summary().is_some() {
                    return Err(parse_error(&fragment, "summary holds more than one Metric"));
                }
                if entry.values().len() != 1 {
                    return Err(parse_error(&fragment, "summary metric must hold one Value"));
                }
                report.replace_summary(entry);
                Ok(())
            }
            Section::Detail | Section::Root => {
                report.add_entry(entry).map_err(|err| parse_error(&fragment, err.to_string()))
            }
        }
    }

    /// Handles character data.
    fn text(&mut self, text: &str) -> Result<(), ReportError> {
        if let Some(value) = self.value.as_mut() {
            value.push_str(text);
            return Ok(());
        }
        if text.trim().is_empty() {
            return Ok(());
        }
        Err(parse_error(text.trim(), "unexpected text"))
    }

    /// Returns the decoded report once the document is complete.
    fn finish(self) -> Result<ReportLog, ReportError> {
        let report = self.report.ok_or_else(|| parse_error("document", "no ReportLog root"))?;
        if !self.root_closed {
            return Err(parse_error(TAG_REPORT_LOG, "document ended before root closed"));
        }
        if report.summary().is_none() {
            return Err(parse_error(TAG_SUMMARY, "document has no Summary"));
        }
        Ok(report)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the attributes of a `Metric` element.
fn read_metric(start: &BytesStart<'_>, name: &str) -> Result<PendingMetric, ReportError> {
    let mut attrs = read_attributes(start)?;
    let test_id = take_attribute(&mut attrs, name, ATTR_SOURCE)?;
    let message = take_attribute(&mut attrs, name, ATTR_MESSAGE)?;
    let result_type =
        ResultType::parse_report_string(&take_attribute(&mut attrs, name, ATTR_SCORE_TYPE)?)?;
    let unit = ResultUnit::parse_report_string(&take_attribute(&mut attrs, name, ATTR_SCORE_UNIT)?)?;
    Ok(PendingMetric {
        test_id,
        message,
        result_type,
        unit,
        values: Vec::new(),
    })
}

/// Collects unescaped attributes of an element.
fn read_attributes(start: &BytesStart<'_>) -> Result<BTreeMap<String, String>, ReportError> {
    let mut attrs = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| parse_error("attribute", err.to_string()))?;
        let key = element_name(attr.key.as_ref())?;
        let value =
            attr.unescape_value().map_err(|err| parse_error(&key, err.to_string()))?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

/// Removes a required attribute.
fn take_attribute(
    attrs: &mut BTreeMap<String, String>,
    element: &str,
    key: &str,
) -> Result<String, ReportError> {
    attrs
        .remove(key)
        .ok_or_else(|| parse_error(element, format!("missing attribute '{key}'")))
}

/// Decodes an element or attribute name.
fn element_name(raw: &[u8]) -> Result<String, ReportError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|err| parse_error("name", err.to_string()))
}

/// Builds a parse error.
fn parse_error(fragment: &str, reason: impl Into<String>) -> ReportError {
    ReportError::Parse {
        fragment: fragment.to_string(),
        reason: reason.into(),
    }
}

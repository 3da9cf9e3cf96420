use std::collections::HashSet;

use log::debug;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::{request_tag, ErrorMode, XmlError, MESSAGE_LANGUAGE, MESSAGE_SET, QBXML_VERSION};
use crate::config::Query;

/// Lines prepended to every request document.
pub fn headers() -> String {
    format!("<?xml version=\"1.0\"?>\n<?qbxml version=\"{}\"?>\n", QBXML_VERSION)
}

/// Query objects to request, in first-occurrence order.
///
/// A query object is requested once even if several queries name it with
/// different attribute lists; every such query is served by the same response
/// section.
pub fn distinct_names<'a>(queries: &'a [Query], added: &mut HashSet<&'a str>) -> Vec<&'a str> {
    queries
        .iter()
        .map(|query| query.name().as_str())
        .filter(|name| added.insert(*name))
        .collect()
}

pub fn build_request(queries: &[Query], mode: ErrorMode) -> Result<String, XmlError> {
    let mut added = HashSet::new();
    let names = distinct_names(queries, &mut added);

    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Start(BytesStart::new(MESSAGE_LANGUAGE)))?;
    writer.write_event(Event::Start(
        BytesStart::new(MESSAGE_SET).with_attributes([("onError", mode.as_str())]),
    ))?;

    for (index, name) in names.iter().enumerate() {
        let tag = request_tag(name);
        let request_id = (index + 1).to_string();
        debug!("adding {} with requestID={}", tag, request_id);

        writer.write_event(Event::Empty(
            BytesStart::new(tag.as_str()).with_attributes([("requestID", request_id.as_str())]),
        ))?;
    }

    writer.write_event(Event::End(BytesEnd::new(MESSAGE_SET)))?;
    writer.write_event(Event::End(BytesEnd::new(MESSAGE_LANGUAGE)))?;

    let body = String::from_utf8_lossy(&writer.into_inner()).into_owned();

    Ok(headers() + &body)
}

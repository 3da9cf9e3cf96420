use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::Query;
use crate::qbxml::response::{Document, Element};
use crate::qbxml::response_tag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Results were written to this file name.
    Written(String),
    NoResults,
    /// More than one response section matched the query object.
    Repeated,
}

/// Returns `desired` if it is free, otherwise the first of `A1.csv`,
/// `A2.csv`, ... (for `A.csv`) that is not taken.
pub fn fresh_name(desired: &str, taken: &[String]) -> String {
    let is_taken = |name: &str| taken.iter().any(|t| t == name);
    if !is_taken(desired) {
        return desired.to_owned();
    }

    let (stem, extension) = match desired.rfind('.') {
        Some(dot) => desired.split_at(dot),
        None => (desired, ""),
    };

    let mut index = 1u32;
    loop {
        let name = format!("{}{}{}", stem, index, extension);
        if !is_taken(&name) {
            return name;
        }
        index += 1;
    }
}

/// Values of the requested fields in one record, in request order. A field
/// missing from the record yields an empty value. `None` if every value is
/// empty.
pub fn extract_record(record: &Element, attributes: &[String]) -> Option<Vec<String>> {
    debug!("{}", record.name);

    let fields: Vec<String> = attributes
        .iter()
        .map(|attribute| {
            let value = record.child(attribute).map(Element::inner_text).unwrap_or_default();
            debug!("{}: {}", attribute, value);
            value
        })
        .collect();

    if fields.iter().all(String::is_empty) {
        return None;
    }

    Some(fields)
}

fn log_status(query: &Query, section: &Element) {
    info!(
        "query: {}s, status code: {}, status severity: {}, status message: {}",
        query.name(),
        section.attribute("statusCode").unwrap_or_default(),
        section.attribute("statusSeverity").unwrap_or_default(),
        section.attribute("statusMessage").unwrap_or_default(),
    );
}

/// Writes the header and every non-empty record of `section` to `path`.
/// Rows go out as they are extracted.
pub fn write_csv(path: &Path, attributes: &[String], section: &Element) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    csv_writer.write_record(attributes)?;
    for record in section.elements() {
        if let Some(fields) = extract_record(record, attributes) {
            csv_writer.write_record(&fields)?;
        }
    }

    csv_writer.flush()?;

    Ok(())
}

/// Processes every query, including ones sharing a query object, against the
/// response and reports what happened to each.
pub fn export_results(queries: &[Query], response: &str, out_dir: &Path) -> Result<Vec<QueryOutcome>> {
    if response.is_empty() {
        info!("no results");
        return Ok(Vec::new());
    }

    let document = Document::parse(response).context("malformed response document")?;
    let mut written: Vec<String> = Vec::new();
    let mut outcomes = Vec::with_capacity(queries.len());

    for query in queries {
        let sections = document.elements_named(&response_tag(query.name()));

        let outcome = match sections.as_slice() {
            [section] => {
                log_status(query, section);

                let file_name = fresh_name(&query.file_name(), &written);
                write_csv(&out_dir.join(&file_name), query.attributes(), section)?;
                written.push(file_name.clone());

                QueryOutcome::Written(file_name)
            },
            [] => {
                info!("no results for {}", query.name());
                QueryOutcome::NoResults
            },
            _ => {
                info!("repeated query {}, stopping processing", query.name());
                QueryOutcome::Repeated
            },
        };

        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Names of the files written, in query order.
pub fn write_results(queries: &[Query], response: &str, out_dir: &Path) -> Result<Vec<String>> {
    let outcomes = export_results(queries, response, out_dir)?;

    Ok(outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            QueryOutcome::Written(file_name) => Some(file_name),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod export_tests;

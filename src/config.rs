use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use getset::Getters;
use log::debug;
use serde::Deserialize;

pub const DEFAULT_CONFIG: &str = "config.json";

const FILE_PREFIX: &str = "Quickbooks";
const FILE_SUFFIX: &str = "Results.csv";

/// A single query read from the config file: the query object to ask
/// QuickBooks for and the attributes to keep from every returned record.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct Query {
    #[serde(rename = "queryObject")]
    name: String,
    attributes: Vec<String>,
}

impl Query {
    pub fn new(name: impl Into<String>, attributes: Vec<String>) -> Query {
        Query {
            name: name.into(),
            attributes,
        }
    }

    /// Output file name, always derived from the query object.
    pub fn file_name(&self) -> String {
        format!("{}{}{}", FILE_PREFIX, self.name, FILE_SUFFIX)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigRoot {
    #[serde(rename = "listOfQueries")]
    queries: Vec<Query>,
}

pub fn parse_queries(json: &str) -> Result<Vec<Query>> {
    let root: ConfigRoot = serde_json::from_str(json)?;
    Ok(root.queries)
}

pub fn load_queries(path: &Path) -> Result<Vec<Query>> {
    let json = fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
    let queries = parse_queries(&json).with_context(|| format!("invalid config {}", path.display()))?;

    debug!("list of queries found:");
    for query in &queries {
        debug!("{}", query.name);
        for attribute in &query.attributes {
            debug!("\t{}", attribute);
        }
    }

    Ok(queries)
}

use thiserror::Error;

pub mod request;
pub mod response;

#[cfg(test)]
mod qbxml_tests;

pub const QBXML_VERSION: &str = "8.0";

const MESSAGE_LANGUAGE: &str = "QBXML";
const MESSAGE_SET: &str = "QBXMLMsgsRq";
const REQUEST_SUFFIX: &str = "QueryRq";
const RESPONSE_SUFFIX: &str = "QueryRs";

/// Tag of the sub-request element for a query object.
pub fn request_tag(name: &str) -> String {
    format!("{}{}", name, REQUEST_SUFFIX)
}

/// Tag of the response section for a query object.
pub fn response_tag(name: &str) -> String {
    format!("{}{}", name, RESPONSE_SUFFIX)
}

/// What QuickBooks does when one request in the message set fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    #[default]
    StopOnError,
    ContinueOnError,
}

impl ErrorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorMode::StopOnError => "stopOnError",
            ErrorMode::ContinueOnError => "continueOnError",
        }
    }
}

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("{0}")]
    Syntax(#[from] quick_xml::Error),
    #[error("{0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("failed to write xml: {0}")]
    Io(#[from] std::io::Error),
    #[error("element name is not valid utf-8")]
    InvalidName(#[from] std::str::Utf8Error),
    #[error("document ended inside <{0}>")]
    UnclosedElement(String),
    #[error("closing tag without matching opening tag")]
    UnexpectedEnd,
    #[error("expected one document element, found {0}")]
    NoRootElement(usize),
    #[error("text outside the document element")]
    TextOutsideRoot,
}

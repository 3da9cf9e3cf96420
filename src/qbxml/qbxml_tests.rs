use anyhow::{bail, Result};
use pretty_assertions::assert_eq;

use super::request::{build_request, headers};
use super::response::Document;
use super::*;
use crate::config::Query;

fn query(name: &str, attributes: &[&str]) -> Query {
    Query::new(name, attributes.iter().map(|a| a.to_string()).collect())
}

fn sub_requests(request: &str) -> Result<Vec<(String, String)>> {
    let document = Document::parse(request)?;
    let Some(set) = document.elements_named("QBXMLMsgsRq").into_iter().next() else {
        bail!("request has no message set");
    };

    Ok(set
        .elements()
        .map(|e| (e.name.clone(), e.attribute("requestID").unwrap_or_default().to_string()))
        .collect())
}

#[test]
fn test_request_dedups_names_in_first_occurrence_order() -> Result<()> {
    let queries = vec![
        query("Customer", &["Name"]),
        query("Vendor", &["Name"]),
        query("Customer", &["Phone"]),
        query("Invoice", &["RefNumber"]),
        query("Vendor", &[]),
    ];

    let request = build_request(&queries, ErrorMode::default())?;

    assert_eq!(
        sub_requests(&request)?,
        vec![
            ("CustomerQueryRq".to_string(), "1".to_string()),
            ("VendorQueryRq".to_string(), "2".to_string()),
            ("InvoiceQueryRq".to_string(), "3".to_string()),
        ]
    );

    Ok(())
}

#[test]
fn test_request_starts_with_headers() -> Result<()> {
    let request = build_request(&[query("Customer", &[])], ErrorMode::StopOnError)?;

    assert!(request.starts_with(&headers()));
    assert_eq!(headers().lines().count(), 2);
    assert!(headers().contains("<?qbxml version=\"8.0\"?>"));

    Ok(())
}

#[test]
fn test_request_error_mode() -> Result<()> {
    for (mode, expected) in [
        (ErrorMode::StopOnError, "stopOnError"),
        (ErrorMode::ContinueOnError, "continueOnError"),
    ] {
        let request = build_request(&[query("Account", &[])], mode)?;
        let document = Document::parse(&request)?;

        let Some(root) = document.root_element() else {
            bail!("request has no document element");
        };
        assert_eq!(root.name, "QBXML");

        let Some(set) = root.child("QBXMLMsgsRq") else {
            bail!("message set should be the only child of the language root");
        };
        assert_eq!(set.attribute("onError"), Some(expected));
    }

    Ok(())
}

#[test]
fn test_request_without_queries_has_empty_message_set() -> Result<()> {
    let request = build_request(&[], ErrorMode::default())?;

    assert!(sub_requests(&request)?.is_empty());

    Ok(())
}

#[test]
fn test_response_lookup_and_inner_text() -> Result<()> {
    let document = Document::parse(
        r#"<?xml version="1.0" ?>
        <QBXML>
          <QBXMLMsgsRs>
            <CustomerQueryRs requestID="1" statusCode="0" statusSeverity="Info" statusMessage="Status OK">
              <CustomerRet>
                <Name>Acme &amp; Sons</Name>
                <ParentRef><ListID>80000001</ListID><FullName>Acme</FullName></ParentRef>
                <Note><![CDATA[a < b]]></Note>
                <Name>second</Name>
              </CustomerRet>
            </CustomerQueryRs>
          </QBXMLMsgsRs>
        </QBXML>"#,
    )?;

    let sections = document.elements_named("CustomerQueryRs");
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].attribute("statusMessage"), Some("Status OK"));

    let Some(record) = sections[0].elements().next() else {
        bail!("section should contain a record");
    };
    assert_eq!(record.name, "CustomerRet");
    assert_eq!(record.child("Name").map(|e| e.inner_text()), Some("Acme & Sons".to_string()));
    assert_eq!(record.child("ParentRef").map(|e| e.inner_text()), Some("80000001Acme".to_string()));
    assert_eq!(record.child("Note").map(|e| e.inner_text()), Some("a < b".to_string()));
    assert_eq!(record.child("Phone"), None);

    Ok(())
}

#[test]
fn test_response_finds_nested_sections() -> Result<()> {
    let document = Document::parse("<a><FooQueryRs/><b><FooQueryRs/></b></a>")?;

    assert_eq!(document.elements_named("FooQueryRs").len(), 2);
    assert_eq!(document.elements_named("BarQueryRs").len(), 0);

    Ok(())
}

#[test]
fn test_response_malformed_is_error() -> Result<()> {
    for xml in [
        "<QBXML><QBXMLMsgsRs></QBXML>",
        "<QBXML><QBXMLMsgsRs>",
        "not xml </at> all",
        "garbage",
        "ERROR: QuickBooks not running",
        "   ",
        "<a/><b/>",
        "<a/><b/>trailing",
        "<QBXML/>trailing",
        "<![CDATA[x]]><QBXML/>",
    ] {
        if Document::parse(xml).is_ok() {
            bail!("{} should not parse", xml);
        }
    }

    Ok(())
}

#[test]
fn test_response_needs_one_document_element() -> Result<()> {
    match Document::parse("<a/><b/>") {
        Err(XmlError::NoRootElement(2)) => {},
        other => bail!("expected two document elements to be rejected, got {:?}", other),
    }
    match Document::parse("ERROR: QuickBooks not running") {
        Err(XmlError::TextOutsideRoot) => {},
        other => bail!("expected stray text to be rejected, got {:?}", other),
    }
    match Document::parse("  \n ") {
        Err(XmlError::NoRootElement(0)) => {},
        other => bail!("expected a blank document to be rejected, got {:?}", other),
    }

    Ok(())
}

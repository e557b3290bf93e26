// GMP report and result operations
//
// Report bodies for binary-ish formats arrive base64-encoded inside the
// `<report>` element. An XML report is returned as the serialized
// `<report>` element; other formats are returned as sent.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::client::GmpClient;
use crate::error::Error;
use crate::models::{Report, map_all};
use crate::transport::Socket;
use crate::xml::{Document, Node, Params, params};

/// Report formats whose content gvmd base64-encodes.
pub const BASE64_FORMATS: [&str; 3] = ["HTML", "NBE", "PDF"];

impl<S: Socket> GmpClient<S> {
    /// `<get_reports .../>` with `params` as attributes, unprocessed.
    pub fn report_get_raw(&mut self, params: &Params) -> Result<Document, Error> {
        self.command_with_attributes("get_reports", params)
    }

    /// Report `id` rendered in `format`, base64-decoded for the formats in
    /// [`BASE64_FORMATS`].
    pub fn report_get_byid(&mut self, id: &str, format: &str) -> Result<Vec<u8>, Error> {
        let doc = self.report_get_raw(&params([("report_id", id), ("format", format)]))?;
        let report = doc
            .find("get_reports_response/report")
            .ok_or_else(|| Error::NotFound {
                entity: "report",
                id: id.to_owned(),
            })?;

        if !BASE64_FORMATS.contains(&format) && has_structured_body(report) {
            let xml = report.to_xml();
            debug!(report_id = id, format, bytes = xml.len(), "fetched structured report");
            return Ok(xml.into_bytes());
        }

        let content = report.text().unwrap_or_default();
        debug!(report_id = id, format, bytes = content.len(), "fetched report");
        decode_report(content, format)
    }

    /// Summaries of all reports matching `params`.
    pub fn report_get_all(&mut self, params: &Params) -> Result<Vec<Report>, Error> {
        let doc = self.report_get_raw(params)?;
        map_all(&doc, "get_reports_response/report")
    }

    /// `<get_results .../>` with `params` as attributes, unprocessed.
    pub fn result_get_raw(&mut self, params: &Params) -> Result<Document, Error> {
        self.command_with_attributes("get_results", params)
    }
}

/// An XML report nests the report tree inside the outer `<report>`; the
/// `<report_format>` descriptor alone does not count.
fn has_structured_body(report: &Node) -> bool {
    report
        .children()
        .iter()
        .any(|child| child.name() != "report_format")
}

fn decode_report(content: &str, format: &str) -> Result<Vec<u8>, Error> {
    if !BASE64_FORMATS.contains(&format) {
        return Ok(content.as_bytes().to_vec());
    }
    let compact: String = content.split_ascii_whitespace().collect();
    STANDARD.decode(compact).map_err(|e| Error::Response {
        message: format!("{format} report is not valid base64"),
        request: None,
        status: None,
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn known_formats_are_decoded() {
        assert_eq!(decode_report("SGVsbG8=", "PDF").unwrap(), b"Hello");
        assert_eq!(decode_report("SGVs\nbG8=\n", "HTML").unwrap(), b"Hello");
    }

    #[test]
    fn other_formats_pass_through() {
        assert_eq!(decode_report("SGVsbG8=", "XML").unwrap(), b"SGVsbG8=");
    }

    #[test]
    fn report_format_descriptor_is_not_a_structured_body() {
        let doc = Document::parse(
            br#"<report id="r-1"><report_format id="f"><name>TXT</name></report_format>plain</report>"#,
        )
        .unwrap();
        assert!(!has_structured_body(doc.find("report").unwrap()));

        let doc = Document::parse(br#"<report id="r-1"><report id="r-1"><results/></report></report>"#)
            .unwrap();
        assert!(has_structured_body(doc.find("report").unwrap()));
    }

    #[test]
    fn invalid_base64_is_response_error() {
        let err = decode_report("not base64!", "NBE").unwrap_err();
        assert!(matches!(err, Error::Response { .. }), "got: {err:?}");
    }
}

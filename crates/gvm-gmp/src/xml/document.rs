// GMP response parser.
//
// gvmd does not always answer with a single well-formed document: an
// authenticated call yields `<authenticate_response/>` followed by the
// command response. Responses are therefore wrapped in a synthetic root
// before parsing and converted into an owned tree addressed by
// slash-separated paths.

use tracing::trace;

use crate::error::Error;

/// Name of the synthetic element every response is wrapped in.
const ENVELOPE: &str = "gmp_envelope";

/// An owned XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Node>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Text directly inside this element.
    ///
    /// The first non-blank text node wins, so content that follows a child
    /// element (a report body after its `<report_format>`) is still found.
    /// When every text node is blank, the first one is returned verbatim:
    /// `<comment>  </comment>` yields `"  "`, never `None`.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First element reached by following `path` (`a/b/c`) from here.
    pub fn find(&self, path: &str) -> Option<&Node> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |node, step| node.child(step))
    }

    /// All elements matching `path`, in document order.
    pub fn find_all(&self, path: &str) -> Vec<&Node> {
        let mut current = vec![self];
        for step in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|n| n.children.iter().filter(move |c| c.name == step))
                .collect();
        }
        current
    }

    /// Text of the element at `path`, if the element exists.
    ///
    /// A present element without text yields `Some("")`.
    pub fn child_text(&self, path: &str) -> Option<&str> {
        self.find(path).map(|n| n.text().unwrap_or_default())
    }

    /// Serialize this element back to XML.
    pub fn to_xml(&self) -> String {
        self.to_element().to_xml()
    }

    fn to_element(&self) -> crate::xml::Element {
        let mut el = crate::xml::Element::new(self.name.as_str());
        for (k, v) in &self.attributes {
            el = el.attr(k.as_str(), v.as_str());
        }
        if let Some(text) = &self.text {
            el = el.text(text.as_str());
        }
        self.children
            .iter()
            .fold(el, |el, child| el.child(child.to_element()))
    }

    fn from_roxml(node: roxmltree::Node<'_, '_>) -> Self {
        Self {
            name: node.tag_name().name().to_owned(),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_owned(), a.value().to_owned()))
                .collect(),
            text: node
                .children()
                .filter(roxmltree::Node::is_text)
                .filter_map(|t| t.text())
                .find(|t| !t.trim().is_empty())
                .or_else(|| node.text())
                .map(str::to_owned),
            children: node
                .children()
                .filter(roxmltree::Node::is_element)
                .map(Self::from_roxml)
                .collect(),
        }
    }
}

/// A parsed GMP response.
///
/// The root is the synthetic envelope; its children are the top-level
/// elements the daemon sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Parse a raw response buffer.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let body = std::str::from_utf8(bytes).map_err(|e| Error::XmlParsing {
            message: format!("response is not valid UTF-8: {e}"),
            body: String::from_utf8_lossy(bytes).into_owned(),
        })?;

        let wrapped = format!("<{ENVELOPE}>{}</{ENVELOPE}>", strip_declaration(body));
        let doc = roxmltree::Document::parse(&wrapped).map_err(|e| Error::XmlParsing {
            message: e.to_string(),
            body: body.to_owned(),
        })?;

        let root = Node::from_roxml(doc.root_element());
        trace!(elements = root.children.len(), "parsed response");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// See [`Node::find`], starting at the envelope.
    pub fn find(&self, path: &str) -> Option<&Node> {
        self.root.find(path)
    }

    /// See [`Node::find_all`], starting at the envelope.
    pub fn find_all(&self, path: &str) -> Vec<&Node> {
        self.root.find_all(path)
    }

    /// Numeric `status` attribute of the top-level `element`.
    ///
    /// A missing element or attribute, or a non-numeric status, is an
    /// [`Error::XmlParsing`].
    pub fn status_of(&self, element: &str) -> Result<u16, Error> {
        let node = self
            .find(element)
            .ok_or_else(|| self.parse_error(format!("missing <{element}> in response")))?;
        let raw = node.attribute("status").ok_or_else(|| {
            self.parse_error(format!("<{element}> has no status attribute"))
        })?;
        raw.trim()
            .parse()
            .map_err(|_| self.parse_error(format!("<{element}> has invalid status '{raw}'")))
    }

    /// Serialize the top-level elements back to XML, without the envelope.
    pub fn to_xml(&self) -> String {
        self.root.children.iter().map(Node::to_xml).collect()
    }

    fn parse_error(&self, message: String) -> Error {
        Error::XmlParsing {
            message,
            body: self.to_xml(),
        }
    }
}

/// Drop a leading `<?xml ...?>` declaration, which is only legal at the very
/// start of a document and would break the envelope.
fn strip_declaration(body: &str) -> &str {
    let trimmed = body.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    body
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::xml::{Element, Params, params};

    const TASKS: &str = r#"<authenticate_response status="200" status_text="OK"><role>Admin</role></authenticate_response><get_tasks_response status="200" status_text="OK"><task id="t-1"><name>first</name></task><task id="t-2"><name>second</name></task></get_tasks_response>"#;

    #[test]
    fn wraps_multiple_top_level_elements() {
        let doc = Document::parse(TASKS.as_bytes()).unwrap();
        let names: Vec<_> = doc.root().children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["authenticate_response", "get_tasks_response"]);
    }

    #[test]
    fn find_all_preserves_document_order() {
        let doc = Document::parse(TASKS.as_bytes()).unwrap();
        let ids: Vec<_> = doc
            .find_all("get_tasks_response/task")
            .into_iter()
            .filter_map(|n| n.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["t-1", "t-2"]);
    }

    #[test]
    fn find_follows_nested_paths() {
        let doc = Document::parse(TASKS.as_bytes()).unwrap();
        assert_eq!(
            doc.find("get_tasks_response/task/name").and_then(Node::text),
            Some("first")
        );
        assert!(doc.find("get_tasks_response/target").is_none());
    }

    #[test]
    fn status_of_reads_numeric_status() {
        let doc = Document::parse(TASKS.as_bytes()).unwrap();
        assert_eq!(doc.status_of("authenticate_response").unwrap(), 200);
    }

    #[test]
    fn status_of_missing_element_is_parse_error() {
        let doc = Document::parse(b"<get_version_response status=\"200\"/>").unwrap();
        let err = doc.status_of("authenticate_response").unwrap_err();
        assert!(matches!(err, Error::XmlParsing { .. }), "got: {err:?}");
    }

    #[test]
    fn malformed_input_is_parse_error() {
        let err = Document::parse(b"<get_tasks_response><task>").unwrap_err();
        match err {
            Error::XmlParsing { body, .. } => assert_eq!(body, "<get_tasks_response><task>"),
            other => panic!("expected XmlParsing, got: {other:?}"),
        }
    }

    #[test]
    fn empty_response_parses_to_empty_document() {
        let doc = Document::parse(b"").unwrap();
        assert!(doc.root().children().is_empty());
    }

    #[test]
    fn leading_declaration_is_stripped() {
        let doc =
            Document::parse(b"<?xml version=\"1.0\"?>\n<get_version_response status=\"200\"/>")
                .unwrap();
        assert!(doc.find("get_version_response").is_some());
    }

    #[test]
    fn child_text_distinguishes_empty_from_absent() {
        let doc = Document::parse(b"<target><comment/></target>").unwrap();
        let target = doc.find("target").unwrap();
        assert_eq!(target.child_text("comment"), Some(""));
        assert_eq!(target.child_text("hosts"), None);
    }

    #[test]
    fn attribute_builder_output_reparses_to_same_attributes() {
        let p = params([("task_id", "t-1"), ("details", "0"), ("filter", "a<b & \"c\"")]);
        let xml = Element::with_attributes("get_tasks", &p).to_xml();

        let doc = Document::parse(xml.as_bytes()).unwrap();
        let node = doc.find("get_tasks").unwrap();
        let parsed: Params = node
            .attributes()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        assert_eq!(parsed, p);
    }

    #[test]
    fn text_after_child_element_is_found() {
        let doc = Document::parse(
            b"<report id=\"r-1\"><report_format id=\"f\"><name>PDF</name></report_format>SGVsbG8=</report>",
        )
        .unwrap();
        assert_eq!(doc.find("report").and_then(Node::text), Some("SGVsbG8="));
    }

    #[test]
    fn blank_only_text_is_kept_verbatim() {
        let doc = Document::parse(b"<target><comment>  </comment><name/></target>").unwrap();
        assert_eq!(doc.find("target/comment").and_then(Node::text), Some("  "));
        assert_eq!(doc.root().child_text("target/name"), Some(""));
    }

    #[test]
    fn to_xml_round_trips_structure() {
        let doc = Document::parse(TASKS.as_bytes()).unwrap();
        let again = Document::parse(doc.to_xml().as_bytes()).unwrap();
        assert_eq!(doc, again);
    }
}

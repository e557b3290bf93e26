// GMP request element builder.
//
// Requests are small, flat trees: a command element carrying either
// attributes, text children, or a mix of text children and single-attribute
// reference children. Values are escaped on render.

use std::fmt;

use indexmap::IndexMap;
use quick_xml::escape::escape;

/// Insertion-ordered key/value parameters for a request.
///
/// Attribute and element order carries no meaning in GMP; the map only
/// keeps rendering deterministic.
pub type Params = IndexMap<String, String>;

/// Build [`Params`] from string pairs.
pub fn params<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

/// An XML element ready to be serialized into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// `<name k1="v1" k2="v2"/>`
    pub fn with_attributes(name: impl Into<String>, attrs: &Params) -> Self {
        attrs
            .iter()
            .fold(Self::new(name), |el, (k, v)| el.attr(k.as_str(), v.as_str()))
    }

    /// `<name><k1>v1</k1><k2>v2</k2></name>`
    pub fn with_children(name: impl Into<String>, children: &Params) -> Self {
        children.iter().fold(Self::new(name), |el, (k, v)| {
            el.child(Self::new(k.as_str()).text(v.as_str()))
        })
    }

    /// Text children from `children`, then one `<k attr="v"/>` child per
    /// entry of `elements`.
    pub fn mixed(name: impl Into<String>, children: &Params, attr: &str, elements: &Params) -> Self {
        elements
            .iter()
            .fold(Self::with_children(name, children), |el, (k, v)| {
                el.child(Self::new(k.as_str()).attr(attr, v.as_str()))
            })
    }

    /// Set an attribute, replacing an existing one of the same name.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Serialize to an XML string.
    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (k, v) in &self.attributes {
            write!(f, " {k}=\"{}\"", escape(v.as_str()))?;
        }

        let text = self.text.as_deref().unwrap_or_default();
        if text.is_empty() && self.children.is_empty() {
            return f.write_str("/>");
        }

        f.write_str(">")?;
        f.write_str(&escape(text))?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn attributes_only() {
        let el = Element::with_attributes("delete_task", &params([("task_id", "t-1")]));
        assert_eq!(el.to_xml(), r#"<delete_task task_id="t-1"/>"#);
    }

    #[test]
    fn children_only() {
        let el = Element::with_children(
            "credentials",
            &params([("username", "admin"), ("password", "secret")]),
        );
        assert_eq!(
            el.to_xml(),
            "<credentials><username>admin</username><password>secret</password></credentials>"
        );
    }

    #[test]
    fn mixed_places_references_as_attributed_children() {
        let el = Element::mixed(
            "create_task",
            &params([("name", "scan"), ("comment", "nightly")]),
            "id",
            &params([("config", "c-1"), ("target", "t-1")]),
        );
        assert_eq!(
            el.to_xml(),
            concat!(
                "<create_task><name>scan</name><comment>nightly</comment>",
                r#"<config id="c-1"/><target id="t-1"/></create_task>"#
            )
        );
    }

    #[test]
    fn values_are_escaped() {
        let el = Element::new("create_target")
            .attr("note", r#"a "quoted" <value>"#)
            .child(Element::new("name").text("R&D <lab>"));
        assert_eq!(
            el.to_xml(),
            concat!(
                r#"<create_target note="a &quot;quoted&quot; &lt;value&gt;">"#,
                "<name>R&amp;D &lt;lab&gt;</name></create_target>"
            )
        );
    }

    #[test]
    fn empty_elements_self_close() {
        assert_eq!(Element::new("get_version").to_xml(), "<get_version/>");
        assert_eq!(
            Element::with_children("create_target", &params([("comment", "")])).to_xml(),
            "<create_target><comment/></create_target>"
        );
    }

    #[test]
    fn attr_replaces_existing_key() {
        let el = Element::new("get_tasks").attr("details", "1").attr("details", "0");
        assert_eq!(el.attributes().collect::<Vec<_>>(), vec![("details", "0")]);
    }
}

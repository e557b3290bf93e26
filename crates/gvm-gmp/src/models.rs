// ── GMP entity records ──
//
// Typed projections of `<target>`, `<task>`, `<config>` and `<report>`
// nodes. Required parts (the `id` attribute and the listed child elements)
// must be present; optional references resolve to `None` when any link of
// the chain is missing.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::xml::{Document, Element, Node};

/// Task status string gvmd reports once a scan has completed.
pub const STATUS_DONE: &str = "Done";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub comment: String,
    /// Comma-separated host specification as entered.
    pub hosts: String,
    /// Number of hosts the specification expands to.
    pub max_hosts: u32,
    /// Whether a task references this target.
    pub in_use: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub comment: String,
    /// "New", "Requested", "Running", "Stopped", "Done", ...
    pub status: String,
    /// Percent complete; gvmd reports -1 when no scan is active.
    pub progress: i32,
    pub first_report_id: Option<String>,
    pub last_report_id: Option<String>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == STATUS_DONE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub id: String,
    pub name: String,
    pub comment: String,
}

/// Summary of a stored report, as listed by `get_reports`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub task_id: Option<String>,
    pub task_name: Option<String>,
    pub timestamp: Option<String>,
    pub scan_run_status: Option<String>,
}

// ── Node access helpers ─────────────────────────────────────────────

fn required_id(node: &Node) -> Result<String, Error> {
    node.attribute("id")
        .map(str::to_owned)
        .ok_or_else(|| Error::response(format!("<{}> has no id attribute", node.name())))
}

fn required_text(node: &Node, child: &str) -> Result<String, Error> {
    node.child_text(child)
        .map(str::to_owned)
        .ok_or_else(|| Error::response(format!("<{}> has no <{child}>", node.name())))
}

fn required_number<T: std::str::FromStr>(node: &Node, child: &str) -> Result<T, Error> {
    let raw = required_text(node, child)?;
    raw.trim().parse().map_err(|_| {
        Error::response(format!(
            "<{}>/<{child}> is not a number: '{}'",
            node.name(),
            raw.trim()
        ))
    })
}

fn optional_text(node: &Node, path: &str) -> Option<String> {
    node.find(path)
        .and_then(Node::text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn report_reference(task: &Node, which: &str) -> Option<String> {
    task.find(which)
        .and_then(|r| r.child("report"))
        .and_then(|r| r.attribute("id"))
        .map(str::to_owned)
}

// ── Mappers ─────────────────────────────────────────────────────────

impl TryFrom<&Node> for Target {
    type Error = Error;

    fn try_from(node: &Node) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required_id(node)?,
            name: required_text(node, "name")?,
            comment: required_text(node, "comment")?,
            hosts: required_text(node, "hosts")?,
            max_hosts: required_number(node, "max_hosts")?,
            in_use: required_text(node, "in_use")?.trim() == "1",
        })
    }
}

impl TryFrom<&Node> for Task {
    type Error = Error;

    fn try_from(node: &Node) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required_id(node)?,
            name: required_text(node, "name")?,
            comment: required_text(node, "comment")?,
            status: required_text(node, "status")?,
            progress: required_number(node, "progress")?,
            first_report_id: report_reference(node, "first_report"),
            last_report_id: report_reference(node, "last_report"),
        })
    }
}

impl TryFrom<&Node> for Config {
    type Error = Error;

    fn try_from(node: &Node) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required_id(node)?,
            name: required_text(node, "name")?,
            comment: required_text(node, "comment")?,
        })
    }
}

impl TryFrom<&Node> for Report {
    type Error = Error;

    fn try_from(node: &Node) -> Result<Self, Self::Error> {
        // Listings wrap the body in a nested <report> carrying the details.
        let inner = node.child("report").unwrap_or(node);
        Ok(Self {
            id: required_id(node)?,
            task_id: node
                .child("task")
                .or_else(|| inner.child("task"))
                .and_then(|t| t.attribute("id"))
                .map(str::to_owned),
            task_name: optional_text(node, "task/name")
                .or_else(|| optional_text(inner, "task/name")),
            timestamp: optional_text(inner, "timestamp")
                .or_else(|| optional_text(node, "creation_time")),
            scan_run_status: optional_text(inner, "scan_run_status"),
        })
    }
}

// ── Response projections ───────────────────────────────────────────

/// Read the `id` attribute of `<{command}_response>` after a create.
pub(crate) fn created_id(doc: &Document, element: &Element) -> Result<String, Error> {
    let response = format!("{}_response", element.name());
    doc.find(&response)
        .and_then(|n| n.attribute("id"))
        .map(str::to_owned)
        .ok_or_else(|| {
            Error::response(format!("<{response}> carries no id")).into_response(&element.to_xml())
        })
}

/// Map every node at `path` with `T`'s mapper.
pub(crate) fn map_all<T>(doc: &Document, path: &str) -> Result<Vec<T>, Error>
where
    T: for<'a> TryFrom<&'a Node, Error = Error>,
{
    doc.find_all(path).into_iter().map(T::try_from).collect()
}

/// Map the first node at `path`, or `None` when there is none.
pub(crate) fn map_first<T>(doc: &Document, path: &str) -> Result<Option<T>, Error>
where
    T: for<'a> TryFrom<&'a Node, Error = Error>,
{
    doc.find(path).map(T::try_from).transpose()
}

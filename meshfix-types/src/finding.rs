use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upper bound on `Finding::examples`.
pub const MAX_EXAMPLES: usize = 25;

/// Undirected edge as a canonical `(min, max)` node pair.
pub type Edge = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warn,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid severity '{0}': expected 'error' or 'warn'")]
pub struct InvalidSeverity(pub String);

impl FromStr for Severity {
    type Err = InvalidSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "warn" => Ok(Severity::Warn),
            other => Err(InvalidSeverity(other.to_string())),
        }
    }
}

/// Cell block a local index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CellKind {
    #[serde(rename = "tri")]
    Tri,
    #[serde(rename = "quad")]
    Quad,
}

impl CellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Tri => "tri",
            CellKind::Quad => "quad",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            CellKind::Tri => 3,
            CellKind::Quad => 4,
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cell kind '{0}': expected 'tri' or 'quad'")]
pub struct UnknownCellKind(pub String);

impl FromStr for CellKind {
    type Err = UnknownCellKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tri" | "triangle" => Ok(CellKind::Tri),
            "quad" => Ok(CellKind::Quad),
            other => Err(UnknownCellKind(other.to_string())),
        }
    }
}

/// Literal `"node"` marker in tagged examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTag {
    Node,
}

/// Literal `"edge"` marker in tagged examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeTag {
    Edge,
}

/// One sample offender attached to a finding.
///
/// Serialized as bare JSON scalars and arrays so downstream tools see the
/// same compact shapes regardless of the rule, e.g. `["tri", 5]`, `[3, 9]`,
/// `[[0, 1], 2.75]`. Variant order matters for deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Example {
    /// Unified cell id.
    Index(usize),
    /// Named entity such as a missing group.
    Name(String),
    /// Local index inside a cell block.
    Cell(CellKind, usize),
    Node(NodeTag, usize),
    TaggedEdge(EdgeTag, Edge),
    /// Canonical edge or a pair of unified cell ids.
    Pair(usize, usize),
    EdgeRatio(Edge, f64),
    EdgePair(Edge, Edge),
    EdgeCells(Edge, Vec<usize>),
}

impl Example {
    pub fn cell(kind: CellKind, index: usize) -> Self {
        Example::Cell(kind, index)
    }

    pub fn node(node: usize) -> Self {
        Example::Node(NodeTag::Node, node)
    }

    pub fn edge(edge: Edge) -> Self {
        Example::Pair(edge.0, edge.1)
    }

    pub fn tagged_edge(edge: Edge) -> Self {
        Example::TaggedEdge(EdgeTag::Edge, edge)
    }

    /// `(kind, index)` when this example names a local cell.
    pub fn as_cell(&self) -> Option<(CellKind, usize)> {
        match self {
            Example::Cell(kind, idx) => Some((*kind, *idx)),
            _ => None,
        }
    }
}

/// Normalized per-rule result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub id: String,
    pub severity: Severity,
    pub ok: bool,
    pub count: usize,

    #[serde(default)]
    pub examples: Vec<Example>,

    #[serde(default)]
    pub details: Map<String, Value>,

    pub fixable: bool,
}

impl Finding {
    /// A passing finding with no examples.
    pub fn new(id: impl Into<String>, severity: Severity, fixable: bool) -> Self {
        Self {
            id: id.into(),
            severity,
            ok: true,
            count: 0,
            examples: Vec::new(),
            details: Map::new(),
            fixable,
        }
    }

    /// Sets `count`, derives `ok = count == 0`, and keeps at most
    /// [`MAX_EXAMPLES`] examples.
    pub fn with_violations(mut self, count: usize, mut examples: Vec<Example>) -> Self {
        examples.truncate(MAX_EXAMPLES);
        self.ok = count == 0;
        self.count = count;
        self.examples = examples;
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn with_note(self, note: &str) -> Self {
        self.with_detail("note", note)
    }

    /// Passing result for a rule that could not run; the reason lands in
    /// `details.skipped`.
    pub fn skipped(mut self, reason: impl Into<String>) -> Self {
        self.ok = true;
        self.count = 0;
        self.examples.clear();
        self.details
            .insert("skipped".to_string(), Value::String(reason.into()));
        self
    }

    pub fn is_skipped(&self) -> bool {
        self.details.contains_key("skipped")
    }

    /// An error-tier rule reported a violation.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error && !self.ok
    }
}

/// Findings keyed by rule id, kept in execution order.
///
/// Serializes as a JSON object whose key order matches the order findings
/// were pushed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleFindings(Vec<Finding>);

impl RuleFindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a finding, replacing any earlier one with the same id in place.
    pub fn push(&mut self, finding: Finding) {
        match self.0.iter_mut().find(|f| f.id == finding.id) {
            Some(slot) => *slot = finding,
            None => self.0.push(finding),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Finding> {
        self.0.iter().find(|f| f.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.0.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|f| f.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Finding> for RuleFindings {
    fn from_iter<T: IntoIterator<Item = Finding>>(iter: T) -> Self {
        let mut out = RuleFindings::new();
        for f in iter {
            out.push(f);
        }
        out
    }
}

impl<'a> IntoIterator for &'a RuleFindings {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for RuleFindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|f| (f.id.as_str(), f)))
    }
}

impl<'de> Deserialize<'de> for RuleFindings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FindingsVisitor;

        impl<'de> Visitor<'de> for FindingsVisitor {
            type Value = RuleFindings;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of rule id to finding")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = RuleFindings::new();
                while let Some((id, mut finding)) = map.next_entry::<String, Finding>()? {
                    // The key is the registry id.
                    finding.id = id;
                    out.push(finding);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(FindingsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn severity_parses_only_known_values() {
        assert_eq!("error".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warn));
        let err = "info".parse::<Severity>().expect_err("info is not a severity");
        assert!(err.to_string().contains("info"));
    }

    #[test]
    fn examples_serialize_as_compact_arrays() {
        let examples = vec![
            Example::cell(CellKind::Tri, 5),
            Example::Index(7),
            Example::edge((1, 4)),
            Example::node(3),
            Example::tagged_edge((0, 2)),
            Example::EdgeRatio((2, 3), 4.5),
            Example::EdgeCells((8, 9), vec![1, 2, 3]),
            Example::Name("inlet".to_string()),
        ];
        let json = serde_json::to_string(&examples).expect("serialize");
        assert_eq!(
            json,
            r#"[["tri",5],7,[1,4],["node",3],["edge",[0,2]],[[2,3],4.5],[[8,9],[1,2,3]],"inlet"]"#
        );
    }

    #[test]
    fn cell_examples_deserialize_back_to_cells() {
        let parsed: Vec<Example> =
            serde_json::from_str(r#"[["quad",2],["tri",0],["node",4]]"#).expect("parse");
        assert_eq!(parsed[0].as_cell(), Some((CellKind::Quad, 2)));
        assert_eq!(parsed[1].as_cell(), Some((CellKind::Tri, 0)));
        assert_eq!(parsed[2], Example::node(4));
    }

    #[test]
    fn with_violations_caps_examples_and_sets_ok() {
        let examples = (0..40).map(Example::Index).collect();
        let f = Finding::new("tiny_elements", Severity::Warn, true).with_violations(40, examples);
        assert!(!f.ok);
        assert_eq!(f.count, 40);
        assert_eq!(f.examples.len(), MAX_EXAMPLES);
    }

    #[test]
    fn skipped_finding_passes_with_reason() {
        let f = Finding::new("uncovered_faces", Severity::Error, true)
            .with_violations(3, vec![Example::Index(1)])
            .skipped("boundary edges not provided");
        assert!(f.ok);
        assert_eq!(f.count, 0);
        assert!(f.examples.is_empty());
        assert!(f.is_skipped());
        assert!(!f.is_blocking());
    }

    #[test]
    fn rule_findings_keep_insertion_order_in_json() {
        let mut findings = RuleFindings::new();
        findings.push(Finding::new("surface_orientation", Severity::Error, true));
        findings.push(Finding::new("duplicate_elements", Severity::Error, true));
        findings.push(Finding::new("tiny_elements", Severity::Warn, true));

        let json = serde_json::to_string(&findings).expect("serialize");
        let so = json.find("surface_orientation").expect("so");
        let dup = json.find("duplicate_elements").expect("dup");
        let tiny = json.find("tiny_elements").expect("tiny");
        assert!(so < dup && dup < tiny);

        let back: RuleFindings = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, findings);
    }

    #[test]
    fn rule_findings_push_replaces_same_id() {
        let mut findings = RuleFindings::new();
        findings.push(Finding::new("nonmanifold", Severity::Error, true));
        findings.push(
            Finding::new("nonmanifold", Severity::Error, true)
                .with_violations(1, vec![Example::node(0)]),
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings.get("nonmanifold").map(|f| f.count), Some(1));
    }
}

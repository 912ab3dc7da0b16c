use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// Identity of an uploaded routine.
///
/// Ids are derived from the file name, so the same upload always maps to the
/// same id: `"f"` followed by the hex of a name-based (v5, DNS namespace) UUID.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutineId(String);

impl RoutineId {
    /// Wrap an id received from the server verbatim.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derive the id the server assigns to an uploaded file.
    pub fn from_filename(filename: &str) -> Self {
        let uuid = Uuid::new_v5(&Uuid::NAMESPACE_DNS, filename.as_bytes());
        Self(format!("f{}", uuid.simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RoutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoutineId({})", self.0)
    }
}

impl fmt::Display for RoutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a workspace panel (plot or table container).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

const TABLE_SUFFIX: &str = "-table";

impl PanelId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Container id of the `counter`-th plot called `name` emitted by `file`.
    ///
    /// Dots in the file name are replaced so the id stays a valid element id.
    pub fn for_plot(file: &str, name: &str, counter: u32) -> Self {
        Self(format!("{}-{}-{}", file.replace('.', "-"), name, counter))
    }

    /// Container id of the data table attached to this plot.
    pub fn table(&self) -> Self {
        Self(format!("{}{}", self.0, TABLE_SUFFIX))
    }

    pub fn is_table(&self) -> bool {
        self.0.ends_with(TABLE_SUFFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PanelId({})", self.0)
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path of a node in the routine file tree.
///
/// - ordered, non-empty segments without `/`
/// - the empty path is the tree root
/// - rendered and serialized `/`-joined
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a `/`-joined path. The empty string is the root.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let mut path = Self::root();
        if raw.is_empty() {
            return Ok(path);
        }
        for segment in raw.split('/') {
            path = path.join(segment)?;
        }
        Ok(path)
    }

    /// Child path with one more segment.
    pub fn join(&self, name: &str) -> CoreResult<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(CoreError::InvalidSegment {
                segment: name.to_string(),
            });
        }
        let mut segments = self.segments.clone();
        segments.push(trimmed.to_string());
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent path, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// True if `self` equals `ancestor` or lies below it.
    pub fn starts_with(&self, ancestor: &TreePath) -> bool {
        self.segments.starts_with(&ancestor.segments)
    }
}

impl fmt::Debug for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreePath({:?})", self.to_string())
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl From<TreePath> for String {
    fn from(path: TreePath) -> Self {
        path.to_string()
    }
}

impl TryFrom<String> for TreePath {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_id_is_stable_per_filename() {
        let a = RoutineId::from_filename("fit.py");
        let b = RoutineId::from_filename("fit.py");
        let c = RoutineId::from_filename("other.py");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().starts_with('f'));
        assert_eq!(a.as_str().len(), 33);
    }

    #[test]
    fn panel_ids_replace_dots_and_derive_tables() {
        let plot = PanelId::for_plot("fit.py", "spectrum", 0);
        assert_eq!(plot.as_str(), "fit-py-spectrum-0");
        assert!(!plot.is_table());

        let table = plot.table();
        assert_eq!(table.as_str(), "fit-py-spectrum-0-table");
        assert!(table.is_table());
    }

    #[test]
    fn tree_path_parse_and_display() {
        let path = TreePath::parse("lab/optics/fit.py").unwrap();
        assert_eq!(path.depth(), 3);
        assert_eq!(path.name(), Some("fit.py"));
        assert_eq!(path.to_string(), "lab/optics/fit.py");
        assert_eq!(path.parent().unwrap().to_string(), "lab/optics");

        let root = TreePath::parse("").unwrap();
        assert!(root.is_root());
        assert_eq!(root.parent(), None);
        assert_eq!(root.to_string(), "");
    }

    #[test]
    fn tree_path_rejects_empty_segments() {
        assert!(TreePath::root().join("   ").is_err());
        assert!(TreePath::root().join("a/b").is_err());
        assert!(TreePath::parse("a//b").is_err());
    }

    #[test]
    fn tree_path_prefix() {
        let parent = TreePath::parse("lab").unwrap();
        let child = TreePath::parse("lab/optics").unwrap();
        let sibling = TreePath::parse("labs").unwrap();
        assert!(child.starts_with(&parent));
        assert!(parent.starts_with(&parent));
        assert!(!sibling.starts_with(&parent));
        assert!(child.starts_with(&TreePath::root()));
    }
}

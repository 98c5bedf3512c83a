//! The [`Sid`] type and its per-basetype field schemas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, SidError};

const ASSET_FIELDS: &[&str] = &[
    "project", "type", "category", "entity", "task", "version", "state", "ext",
];
const SHOT_FIELDS: &[&str] = &[
    "project", "type", "sequence", "shot", "task", "version", "state", "ext",
];
const PROJECT_FIELDS: &[&str] = &["project"];
const OTHER_FIELDS: &[&str] = &[
    "project", "type", "key2", "key3", "key4", "key5", "key6", "key7",
];

/// Characters that turn a segment into a search token.
const SEARCH_CHARS: &[char] = &['*', ',', '>', '<'];

/// Root kind of a Sid, which selects its field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    /// Only the project field is set.
    Project,
    /// `type` is `A`.
    Asset,
    /// `type` is `S`.
    Shot,
    /// Any other root.
    Other,
}

impl BaseType {
    fn detect(segments: &[String]) -> Self {
        match segments.get(1).map(String::as_str) {
            None => BaseType::Project,
            Some("A") | Some("a") => BaseType::Asset,
            Some("S") | Some("s") => BaseType::Shot,
            Some(_) => BaseType::Other,
        }
    }

    /// Field names in schema order.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            BaseType::Project => PROJECT_FIELDS,
            BaseType::Asset => ASSET_FIELDS,
            BaseType::Shot => SHOT_FIELDS,
            BaseType::Other => OTHER_FIELDS,
        }
    }

    /// Lowercase name of the basetype.
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseType::Project => "project",
            BaseType::Asset => "asset",
            BaseType::Shot => "shot",
            BaseType::Other => "other",
        }
    }
}

/// A structured pipeline identifier.
///
/// The string form and the field list are built together and never
/// diverge: `sid.to_string().parse::<Sid>()` always yields an equal Sid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sid {
    repr: String,
    segments: Vec<String>,
    basetype: BaseType,
}

impl Sid {
    /// Parse a slash-delimited Sid string.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SidError::Empty);
        }
        let segments: Vec<String> = input.split('/').map(str::to_string).collect();
        Self::from_segments(segments)
    }

    /// Build a Sid from its ordered segment values.
    pub fn from_segments(segments: Vec<String>) -> Result<Self> {
        if segments.is_empty() {
            return Err(SidError::Empty);
        }
        let repr = segments.join("/");
        if segments.iter().any(|s| s.is_empty()) {
            return Err(SidError::EmptySegment { input: repr });
        }

        let basetype = BaseType::detect(&segments);
        let max = basetype.fields().len();
        if segments.len() > max {
            return Err(SidError::TooManyFields {
                sid: repr,
                basetype: basetype.as_str(),
                count: segments.len(),
                max,
            });
        }
        let state = basetype.fields().iter().position(|f| *f == "state");
        if state.and_then(|i| segments.get(i)).is_some_and(|s| s.contains('.')) {
            return Err(SidError::DottedState { sid: repr });
        }

        Ok(Self {
            repr,
            segments,
            basetype,
        })
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.repr
    }

    /// Segment values in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a Sid has at least one field.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The basetype selected by the `type` field.
    pub fn basetype(&self) -> BaseType {
        self.basetype
    }

    /// Iterate `(field name, value)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.basetype
            .fields()
            .iter()
            .copied()
            .zip(self.segments.iter().map(String::as_str))
    }

    /// Value of a named field, if populated.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields().find(|(key, _)| *key == name).map(|(_, v)| v)
    }

    /// Name of the last populated field.
    pub fn keytype(&self) -> &'static str {
        self.basetype.fields()[self.segments.len() - 1]
    }

    /// Whether every schema field is populated.
    pub fn is_leaf(&self) -> bool {
        self.segments.len() == self.basetype.fields().len()
    }

    /// Whether the last populated field is the file extension.
    pub fn has_ext(&self) -> bool {
        self.keytype() == "ext"
    }

    /// Whether any segment holds a search token (`*`, `**`, `,`, `>`, `<`).
    pub fn is_search(&self) -> bool {
        self.segments.iter().any(|s| s.contains(SEARCH_CHARS))
    }

    /// The Sid with its last field removed, or `None` for a project Sid.
    pub fn parent(&self) -> Option<Sid> {
        if self.segments.len() < 2 {
            return None;
        }
        Sid::from_segments(self.segments[..self.segments.len() - 1].to_vec()).ok()
    }

    /// Filesystem location of this Sid under `root`.
    ///
    /// Directories follow the segments; a Sid ending in `ext` becomes a file
    /// named `<state>.<ext>` in the directory of its remaining fields.
    pub fn to_path(&self, root: &Path) -> Result<PathBuf> {
        if self.is_search() {
            return Err(SidError::NoPath {
                sid: self.repr.clone(),
            });
        }

        let mut path = root.to_path_buf();
        if self.has_ext() && self.segments.len() >= 2 {
            let n = self.segments.len();
            for segment in &self.segments[..n - 2] {
                path.push(segment);
            }
            path.push(format!("{}.{}", self.segments[n - 2], self.segments[n - 1]));
        } else {
            for segment in &self.segments {
                path.push(segment);
            }
        }
        Ok(path)
    }

    /// Inverse of [`Sid::to_path`]. A file name splits at its first `.`,
    /// since the state field never contains one.
    pub fn from_path(root: &Path, path: &Path) -> Result<Self> {
        let relative = path
            .strip_prefix(root)
            .map_err(|_| SidError::NotUnderRoot {
                path: path.to_path_buf(),
                root: root.to_path_buf(),
            })?;

        let mut components: Vec<String> = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => components.push(part.to_string_lossy().into_owned()),
                _ => {
                    return Err(SidError::NotUnderRoot {
                        path: path.to_path_buf(),
                        root: root.to_path_buf(),
                    })
                }
            }
        }

        if let Some(last) = components.last() {
            if let Some((stem, ext)) = last.split_once('.') {
                if !stem.is_empty() && !ext.is_empty() {
                    let mut candidate = components[..components.len() - 1].to_vec();
                    candidate.push(stem.to_string());
                    candidate.push(ext.to_string());
                    if let Ok(sid) = Sid::from_segments(candidate) {
                        if sid.has_ext() {
                            return Ok(sid);
                        }
                    }
                }
            }
        }

        Sid::from_segments(components)
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

impl FromStr for Sid {
    type Err = SidError;

    fn from_str(s: &str) -> Result<Self> {
        Sid::parse(s)
    }
}

impl TryFrom<String> for Sid {
    type Error = SidError;

    fn try_from(value: String) -> Result<Self> {
        Sid::parse(&value)
    }
}

impl From<Sid> for String {
    fn from(sid: Sid) -> Self {
        sid.repr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_asset_fields() {
        let sid = Sid::parse("PROJ/A/CHAR/HERO/MOD/V001/W/maya").unwrap();
        assert_eq!(sid.basetype(), BaseType::Asset);
        assert_eq!(sid.field("project"), Some("PROJ"));
        assert_eq!(sid.field("category"), Some("CHAR"));
        assert_eq!(sid.field("entity"), Some("HERO"));
        assert_eq!(sid.field("version"), Some("V001"));
        assert_eq!(sid.field("ext"), Some("maya"));
        assert_eq!(sid.field("shot"), None);
        assert!(sid.is_leaf());
        assert!(sid.has_ext());
    }

    #[test]
    fn parses_shot_fields() {
        let sid = Sid::parse("CBM/S/SQ0001/SH0240/ANI/V050/WIP/mov").unwrap();
        assert_eq!(sid.basetype(), BaseType::Shot);
        assert_eq!(sid.field("sequence"), Some("SQ0001"));
        assert_eq!(sid.field("shot"), Some("SH0240"));
        assert_eq!(sid.keytype(), "ext");
    }

    #[test]
    fn partial_sid_is_not_leaf() {
        let sid = Sid::parse("PROJ/A/CHAR").unwrap();
        assert!(!sid.is_leaf());
        assert_eq!(sid.keytype(), "category");
        assert_eq!(sid.field("entity"), None);
        assert_eq!(Sid::parse("PROJ").unwrap().basetype(), BaseType::Project);
    }

    #[test]
    fn string_roundtrip() {
        let input = "PROJ/S/SQ010/SH0020/LAY";
        let sid: Sid = input.parse().unwrap();
        assert_eq!(sid.to_string(), input);
        assert_eq!(sid.to_string().parse::<Sid>().unwrap(), sid);
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(Sid::parse("  "), Err(SidError::Empty));
        assert!(matches!(Sid::parse("PROJ//CHAR"), Err(SidError::EmptySegment { .. })));
        assert!(matches!(Sid::parse("/PROJ"), Err(SidError::EmptySegment { .. })));
        assert!(matches!(
            Sid::parse("P/A/C/E/T/V/S/ext/extra"),
            Err(SidError::TooManyFields { max: 8, .. })
        ));
    }

    #[test]
    fn search_tokens_detected() {
        assert!(Sid::parse("PROJ/A/*").unwrap().is_search());
        assert!(Sid::parse("PROJ/A,S").unwrap().is_search());
        assert!(Sid::parse("PROJ/A/CHAR/HERO/MOD/>V002").unwrap().is_search());
        assert!(!Sid::parse("PROJ/A/CHAR").unwrap().is_search());
    }

    #[test]
    fn parent_drops_last_field() {
        let sid = Sid::parse("PROJ/A/CHAR/HERO").unwrap();
        assert_eq!(sid.parent().unwrap().as_str(), "PROJ/A/CHAR");
        assert!(Sid::parse("PROJ").unwrap().parent().is_none());
    }

    #[test]
    fn leaf_path_roundtrip() {
        let root = Path::new("/prod");
        let sid = Sid::parse("PROJ/A/CHAR/HERO/MOD/V001/W/maya").unwrap();
        let path = sid.to_path(root).unwrap();
        assert_eq!(path, PathBuf::from("/prod/PROJ/A/CHAR/HERO/MOD/V001/W.maya"));
        assert_eq!(Sid::from_path(root, &path).unwrap(), sid);
    }

    #[test]
    fn directory_path_roundtrip() {
        let root = Path::new("/prod");
        let sid = Sid::parse("PROJ/S/SQ010/SH0020").unwrap();
        let path = sid.to_path(root).unwrap();
        assert_eq!(path, PathBuf::from("/prod/PROJ/S/SQ010/SH0020"));
        assert_eq!(Sid::from_path(root, &path).unwrap(), sid);
    }

    #[test]
    fn dotted_directory_is_not_split() {
        let root = Path::new("/prod");
        let sid = Sid::from_path(root, Path::new("/prod/PROJ/A/CHAR/HERO.v2")).unwrap();
        assert_eq!(sid.as_str(), "PROJ/A/CHAR/HERO.v2");
    }

    #[test]
    fn dotted_state_is_rejected() {
        let err = Sid::parse("PROJ/A/CHAR/HERO/MOD/V001/W.ma").unwrap_err();
        assert!(matches!(err, SidError::DottedState { .. }));
        assert!(Sid::parse("PROJ/S/SQ010/SH0020/ANI/V003/W.x/movie").is_err());
        // Dots are fine outside the state field.
        assert!(Sid::parse("PROJ/A/CHAR/HERO.v2/MOD").is_ok());
    }

    #[test]
    fn dotted_file_name_roundtrip() {
        let root = Path::new("/prod");
        let path = Path::new("/prod/PROJ/A/CHAR/HERO/MOD/V001/W.ma");
        let sid = Sid::from_path(root, path).unwrap();
        assert_eq!(sid.as_str(), "PROJ/A/CHAR/HERO/MOD/V001/W/ma");
        assert_eq!(sid.to_path(root).unwrap(), path);

        let archive = Path::new("/prod/PROJ/S/SQ010/SH0020/ANI/V003/W.tar.gz");
        let sid = Sid::from_path(root, archive).unwrap();
        assert_eq!(sid.field("state"), Some("W"));
        assert_eq!(sid.field("ext"), Some("tar.gz"));
        assert_eq!(sid.to_path(root).unwrap(), archive);
    }

    #[test]
    fn path_outside_root_rejected() {
        let err = Sid::from_path(Path::new("/prod"), Path::new("/tmp/x")).unwrap_err();
        assert!(matches!(err, SidError::NotUnderRoot { .. }));
    }

    #[test]
    fn search_sid_has_no_path() {
        let sid = Sid::parse("PROJ/A/*").unwrap();
        assert!(matches!(sid.to_path(Path::new("/prod")), Err(SidError::NoPath { .. })));
    }

    #[test]
    fn serde_as_string() {
        let sid: Sid = serde_json::from_str("\"PROJ/A/CHAR\"").unwrap();
        assert_eq!(sid.field("category"), Some("CHAR"));
        assert_eq!(serde_json::to_string(&sid).unwrap(), "\"PROJ/A/CHAR\"");
    }
}

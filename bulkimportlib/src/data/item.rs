//! Import item descriptors.
//!
//! An [`ImportItem`] describes one discovered node of the source namespace:
//! a folder, or a file together with the number of historical versions the
//! importer should materialise for it. Items are immutable once built and
//! are handed to the consumer by value.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Serialize, Serializer};

use crate::error::BulkImportError;
use crate::Result;

/// Separator used when rendering or parsing an [`ItemPath`].
pub const PATH_SEPARATOR: char = '/';

/// Path of a node in the source namespace, as an ordered list of segments.
///
/// The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemPath {
    segments: Vec<String>,
}

impl ItemPath {
    /// The root of the namespace.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash separated path such as `folder1/folder1.1`.
    ///
    /// Empty input is the root. Empty segments (`a//b`, a leading or a
    /// trailing slash) are rejected.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for segment in path.split(PATH_SEPARATOR) {
            if segment.is_empty() {
                return Err(BulkImportError::invalid_item(path, "path has an empty segment"));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// Return a new path with `segment` appended.
    pub fn join(&self, segment: &str) -> Result<Self> {
        validate_name(segment)?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Path segments from the root down.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", PATH_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl Serialize for ItemPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Whether an item is a folder or a versioned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemKind {
    /// A folder; has no content and no versions
    Folder,
    /// A file with at least one version
    File { versions: NonZeroU32 },
}

/// One discovered folder or file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportItem {
    /// Parent folder, `None` for items directly under the root
    parent_path: Option<ItemPath>,
    name: String,
    #[serde(flatten)]
    kind: ItemKind,
}

impl ImportItem {
    /// Build a folder item.
    pub fn folder(parent_path: Option<ItemPath>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        Ok(Self {
            parent_path: normalize_parent(parent_path),
            name,
            kind: ItemKind::Folder,
        })
    }

    /// Build a file item with `versions` historical versions.
    ///
    /// Fails if `versions` is zero.
    pub fn file(
        parent_path: Option<ItemPath>,
        name: impl Into<String>,
        versions: u32,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        let versions = NonZeroU32::new(versions).ok_or_else(|| {
            BulkImportError::invalid_item(&name, "a file needs at least one version")
        })?;

        Ok(Self {
            parent_path: normalize_parent(parent_path),
            name,
            kind: ItemKind::File { versions },
        })
    }

    /// Parent folder path, `None` for root-level items.
    pub fn parent_path(&self) -> Option<&ItemPath> {
        self.parent_path.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ItemKind::Folder)
    }

    /// Number of versions to materialise; `None` for folders.
    pub fn version_count(&self) -> Option<NonZeroU32> {
        match self.kind {
            ItemKind::Folder => None,
            ItemKind::File { versions } => Some(versions),
        }
    }

    /// Version numbers of the item, oldest first. Empty for folders.
    pub fn versions(&self) -> impl Iterator<Item = u32> {
        let last = self.version_count().map_or(0, NonZeroU32::get);
        1..=last
    }

    /// Full path of the item (parent path plus its own name).
    pub fn path(&self) -> ItemPath {
        let mut segments = self
            .parent_path
            .as_ref()
            .map(|p| p.segments.clone())
            .unwrap_or_default();
        segments.push(self.name.clone());
        ItemPath { segments }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BulkImportError::invalid_item(name, "name must not be empty"));
    }
    if name.contains(PATH_SEPARATOR) {
        return Err(BulkImportError::invalid_item(
            name,
            format!("name must not contain '{}'", PATH_SEPARATOR),
        ));
    }
    Ok(())
}

/// An explicit root parent is the same as no parent.
fn normalize_parent(parent: Option<ItemPath>) -> Option<ItemPath> {
    parent.filter(|p| !p.is_root())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path() {
        let path = ItemPath::parse("folder1/folder1.1").unwrap();

        assert_eq!(path.segments(), &["folder1", "folder1.1"]);
        assert_eq!(path.depth(), 2);
        assert_eq!(path.to_string(), "folder1/folder1.1");
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert!(ItemPath::parse("").unwrap().is_root());
        assert_eq!(ItemPath::root().to_string(), "");
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(ItemPath::parse("a//b").is_err());
        assert!(ItemPath::parse("/a").is_err());
        assert!(ItemPath::parse("a/").is_err());
    }

    #[test]
    fn test_join() {
        let path = ItemPath::root().join("folder1").unwrap().join("folder1.1").unwrap();

        assert_eq!(path, ItemPath::parse("folder1/folder1.1").unwrap());
        assert!(ItemPath::root().join("a/b").is_err());
    }

    #[test]
    fn test_folder_has_no_versions() {
        let folder = ImportItem::folder(None, "folder1").unwrap();

        assert!(folder.is_folder());
        assert_eq!(folder.version_count(), None);
        assert_eq!(folder.versions().count(), 0);
        assert_eq!(folder.kind(), ItemKind::Folder);
    }

    #[test]
    fn test_file_versions() {
        let parent = ItemPath::parse("folder1").unwrap();
        let file = ImportItem::file(Some(parent.clone()), "file1.2.txt", 10).unwrap();

        assert!(!file.is_folder());
        assert_eq!(file.version_count().map(NonZeroU32::get), Some(10));
        assert_eq!(file.versions().collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
        assert_eq!(file.parent_path(), Some(&parent));
    }

    #[test]
    fn test_file_requires_a_version() {
        let result = ImportItem::file(None, "empty.txt", 0);

        match result {
            Err(BulkImportError::InvalidItem { name, .. }) => assert_eq!(name, "empty.txt"),
            other => panic!("Expected InvalidItem error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_names() {
        assert!(ImportItem::folder(None, "").is_err());
        assert!(ImportItem::folder(None, "a/b").is_err());
        assert!(ImportItem::file(None, "", 1).is_err());
    }

    #[test]
    fn test_root_parent_is_normalized() {
        let item = ImportItem::folder(Some(ItemPath::root()), "folder1").unwrap();

        assert_eq!(item.parent_path(), None);
        assert_eq!(item, ImportItem::folder(None, "folder1").unwrap());
    }

    #[test]
    fn test_item_path() {
        let parent = ItemPath::parse("folder1").unwrap();
        let item = ImportItem::folder(Some(parent), "folder1.1").unwrap();

        assert_eq!(item.path().to_string(), "folder1/folder1.1");
        let file = ImportItem::file(None, "file1.txt", 1).unwrap();
        assert_eq!(file.path().to_string(), "file1.txt");
    }

    #[test]
    fn test_serialize_items() {
        let folder = ImportItem::folder(None, "folder1").unwrap();
        let parent = ItemPath::parse("folder1").unwrap();
        let file = ImportItem::file(Some(parent), "file1.1.txt", 3).unwrap();

        let folder_json = serde_json::to_value(&folder).unwrap();
        assert_eq!(folder_json["kind"], "folder");
        assert_eq!(folder_json["name"], "folder1");
        assert!(folder_json["parent_path"].is_null());

        let file_json = serde_json::to_value(&file).unwrap();
        assert_eq!(file_json["kind"], "file");
        assert_eq!(file_json["versions"], 3);
        assert_eq!(file_json["parent_path"], "folder1");
    }
}

//! Core domain types for hcmdoc artifacts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// LinkRecord
// ---------------------------------------------------------------------------

/// One documentation page listed in the TOC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Page title as listed in the TOC.
    pub name: String,
    /// Absolute page URL (base URL + fragment-free href).
    pub url: String,
}

// ---------------------------------------------------------------------------
// ObjectType
// ---------------------------------------------------------------------------

/// Classification of a documentation page, read from its "Details" section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectType {
    Table,
    View,
    /// No `Object type:` token, or a token other than TABLE/VIEW.
    #[default]
    Unknown,
}

impl ObjectType {
    /// Map a raw `Object type:` token (any case) to a variant.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_uppercase().as_str() {
            "TABLE" => Self::Table,
            "VIEW" => Self::View,
            _ => Self::Unknown,
        }
    }

    /// Unknown pages are extracted with the table layout.
    pub fn is_view(self) -> bool {
        self == Self::View
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "TABLE"),
            Self::View => write!(f, "VIEW"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column / key / index records
// ---------------------------------------------------------------------------

/// A column row from a table page's "Columns" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub column_name: String,
    pub data_type: String,
    pub length: String,
    pub precision: String,
    pub not_null: bool,
    pub description: String,
}

/// A column name from a view page's "Columns" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewColumn {
    pub column_name: String,
}

/// Primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub name: String,
    pub columns: Vec<String>,
}

/// An index defined on a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub name: String,
    pub uniqueness: String,
    pub columns: Vec<String>,
}

// ---------------------------------------------------------------------------
// Object metadata
// ---------------------------------------------------------------------------

/// Metadata extracted from a TABLE page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub table_name: String,
    pub url: String,
    pub description: String,
    pub details: String,
    pub columns: Vec<TableColumn>,
    /// Written as `{}` when the page has no primary key section.
    #[serde(
        default,
        serialize_with = "serialize_primary_key",
        deserialize_with = "deserialize_primary_key"
    )]
    pub primary_key: Option<PrimaryKey>,
    pub indexes: Vec<IndexRecord>,
}

/// Metadata extracted from a VIEW page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewMetadata {
    pub view_name: String,
    pub url: String,
    pub description: String,
    pub details: String,
    pub columns: Vec<ViewColumn>,
    pub sql_query: String,
}

/// The record produced for one documentation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectMetadata {
    Table(TableMetadata),
    View(ViewMetadata),
}

impl ObjectMetadata {
    /// Table or view name.
    pub fn name(&self) -> &str {
        match self {
            Self::Table(t) => &t.table_name,
            Self::View(v) => &v.view_name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Table(t) => &t.url,
            Self::View(v) => &v.url,
        }
    }
}

fn serialize_primary_key<S>(
    key: &Option<PrimaryKey>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::SerializeMap;

    match key {
        Some(pk) => pk.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

fn deserialize_primary_key<'de, D>(deserializer: D) -> std::result::Result<Option<PrimaryKey>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Key(PrimaryKey),
        Empty {},
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::Key(pk)) => Some(pk),
        Some(Repr::Empty {}) | None => None,
    })
}

//! Field descriptors and the column type vocabulary.

use std::fmt;
use std::str::FromStr;

use convert_case::{Case, Casing};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{MigrateResult, MigrationError};

/// Options attached to a field declaration (`null`, `default`, `limit`, `index`, ...).
pub type FieldOptions = IndexMap<String, OptionValue>;

/// Column types understood by the comparator.
///
/// The first ten variants form the vocabulary shared by every store family;
/// the rest are extensions only valid for a specific family. `Other` carries
/// native type names that have no coarse equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    String,
    Text,
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    Time,
    DateTime,
    Binary,
    // Postgres
    Uuid,
    Json,
    Jsonb,
    Hstore,
    Inet,
    Cidr,
    Macaddr,
    Xml,
    Tsvector,
    Point,
    Line,
    Polygon,
    // MySQL
    Tinyint,
    Mediumint,
    Bigint,
    Tinytext,
    Mediumtext,
    Longtext,
    Enum,
    /// A type name outside the vocabulary.
    Other(String),
}

const COMMON_TYPES: &[ColumnType] = &[
    ColumnType::String,
    ColumnType::Text,
    ColumnType::Integer,
    ColumnType::Float,
    ColumnType::Decimal,
    ColumnType::Boolean,
    ColumnType::Date,
    ColumnType::Time,
    ColumnType::DateTime,
    ColumnType::Binary,
];

const POSTGRES_TYPES: &[ColumnType] = &[
    ColumnType::Uuid,
    ColumnType::Json,
    ColumnType::Jsonb,
    ColumnType::Hstore,
    ColumnType::Inet,
    ColumnType::Cidr,
    ColumnType::Macaddr,
    ColumnType::Xml,
    ColumnType::Tsvector,
    ColumnType::Point,
    ColumnType::Line,
    ColumnType::Polygon,
];

const MYSQL_TYPES: &[ColumnType] = &[
    ColumnType::Tinyint,
    ColumnType::Mediumint,
    ColumnType::Bigint,
    ColumnType::Tinytext,
    ColumnType::Mediumtext,
    ColumnType::Longtext,
    ColumnType::Enum,
];

impl ColumnType {
    /// The canonical lowercase name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Binary => "binary",
            Self::Uuid => "uuid",
            Self::Json => "json",
            Self::Jsonb => "jsonb",
            Self::Hstore => "hstore",
            Self::Inet => "inet",
            Self::Cidr => "cidr",
            Self::Macaddr => "macaddr",
            Self::Xml => "xml",
            Self::Tsvector => "tsvector",
            Self::Point => "point",
            Self::Line => "line",
            Self::Polygon => "polygon",
            Self::Tinyint => "tinyint",
            Self::Mediumint => "mediumint",
            Self::Bigint => "bigint",
            Self::Tinytext => "tinytext",
            Self::Mediumtext => "mediumtext",
            Self::Longtext => "longtext",
            Self::Enum => "enum",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for ColumnType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim().to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "text" => Self::Text,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "decimal" => Self::Decimal,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            "binary" => Self::Binary,
            "uuid" => Self::Uuid,
            "json" => Self::Json,
            "jsonb" => Self::Jsonb,
            "hstore" => Self::Hstore,
            "inet" => Self::Inet,
            "cidr" => Self::Cidr,
            "macaddr" => Self::Macaddr,
            "xml" => Self::Xml,
            "tsvector" => Self::Tsvector,
            "point" => Self::Point,
            "line" => Self::Line,
            "polygon" => Self::Polygon,
            "tinyint" => Self::Tinyint,
            "mediumint" => Self::Mediumint,
            "bigint" => Self::Bigint,
            "tinytext" => Self::Tinytext,
            "mediumtext" => Self::Mediumtext,
            "longtext" => Self::Longtext,
            "enum" => Self::Enum,
            _ => Self::Other(s.trim().to_string()),
        };
        Ok(ty)
    }
}

impl From<&str> for ColumnType {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ColumnType> for String {
    fn from(ty: ColumnType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The family of relational store a run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFamily {
    /// Only the common vocabulary.
    #[default]
    Common,
    /// PostgreSQL and compatible engines.
    Postgres,
    /// MySQL and MariaDB.
    Mysql,
    /// SQLite.
    Sqlite,
}

impl StoreFamily {
    /// Resolve a family from a provider or adapter name.
    pub fn from_provider(provider: &str) -> Self {
        let provider = provider.to_ascii_lowercase();
        if provider.contains("postgres") {
            Self::Postgres
        } else if provider.contains("mysql") || provider.contains("mariadb") {
            Self::Mysql
        } else if provider.contains("sqlite") {
            Self::Sqlite
        } else {
            Self::Common
        }
    }

    /// Name of the family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Postgres => "postgresql",
            Self::Mysql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for StoreFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Types that may be declared for the given store family.
pub fn valid_types(family: StoreFamily) -> IndexSet<ColumnType> {
    let extensions: &[ColumnType] = match family {
        StoreFamily::Postgres => POSTGRES_TYPES,
        StoreFamily::Mysql => MYSQL_TYPES,
        StoreFamily::Sqlite | StoreFamily::Common => &[],
    };

    COMMON_TYPES.iter().chain(extensions).cloned().collect()
}

/// A scalar option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl OptionValue {
    /// Get the value as a bool, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Kind of association between two models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany,
    HasAndBelongsToMany,
}

impl RelationKind {
    /// Name of the relation kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BelongsTo => "belongs_to",
            Self::HasOne => "has_one",
            Self::HasMany => "has_many",
            Self::HasAndBelongsToMany => "has_and_belongs_to_many",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference from one model to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRef {
    /// Association kind.
    pub kind: RelationKind,
    /// Name of the referenced model.
    pub target_model: String,
    /// Column holding the reference.
    pub foreign_key: String,
    /// Options given at declaration.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: FieldOptions,
}

impl RelationRef {
    /// Create a relation with no options.
    pub fn new(
        kind: RelationKind,
        target_model: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            target_model: target_model.into(),
            foreign_key: foreign_key.into(),
            options: FieldOptions::new(),
        }
    }

    /// Attach options to the relation.
    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    /// Table the reference points at (`author` -> `authors`).
    pub fn referenced_table(&self) -> String {
        table_name_for(&self.target_model)
    }
}

/// Infer a `belongs_to` relation from a field name.
///
/// `author_id` references model `author` through foreign key `author_id`.
/// There is no way to opt a scalar `_id` field out of this.
pub fn infer_relation(field_name: &str) -> Option<RelationRef> {
    let target = field_name.strip_suffix("_id")?;
    if target.is_empty() {
        return None;
    }
    Some(RelationRef::new(RelationKind::BelongsTo, target, field_name))
}

/// Conventional table name for a model name: last path segment, snake case, plural.
pub fn table_name_for(model_name: &str) -> String {
    let base = model_name
        .rsplit("::")
        .next()
        .unwrap_or(model_name)
        .to_case(Case::Snake);
    pluralizer::pluralize(&base, 2, false)
}

/// A declared (or synthesized) field of a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Field (column) name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: ColumnType,
    /// Declaration options.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: FieldOptions,
    /// Relation inferred from the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationRef>,
}

impl Field {
    /// Create a field without validating its type.
    pub fn new(name: impl Into<String>, ty: impl Into<ColumnType>, options: FieldOptions) -> Self {
        let name = name.into();
        let relation = infer_relation(&name);
        Self {
            name,
            ty: ty.into(),
            options,
            relation,
        }
    }

    /// Create a field, rejecting types the store family does not support.
    pub fn validated(
        name: impl Into<String>,
        ty: &str,
        options: FieldOptions,
        family: StoreFamily,
    ) -> MigrateResult<Self> {
        let name = name.into();
        let ty = ColumnType::from(ty);
        let valid = valid_types(family);

        if !valid.contains(&ty) {
            return Err(MigrationError::InvalidFieldType {
                field: name,
                ty: ty.to_string(),
                family: family.to_string(),
                valid: valid.iter().map(ToString::to_string).collect(),
            });
        }

        Ok(Self::new(name, ty, options))
    }

    /// Whether a relation was inferred for this field.
    pub fn has_relation(&self) -> bool {
        self.relation.is_some()
    }

    /// Whether the declaration asks for an index.
    pub fn is_indexed(&self) -> bool {
        self.options
            .get("index")
            .and_then(OptionValue::as_bool)
            .unwrap_or(false)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_round_trips_names() {
        assert_eq!(ColumnType::from("datetime"), ColumnType::DateTime);
        assert_eq!(ColumnType::from("JSONB"), ColumnType::Jsonb);
        assert_eq!(
            ColumnType::from("geometry"),
            ColumnType::Other("geometry".to_string())
        );
        assert_eq!(ColumnType::Other("geometry".into()).to_string(), "geometry");
    }

    #[test]
    fn test_valid_types_per_family() {
        let sqlite = valid_types(StoreFamily::Sqlite);
        assert_eq!(sqlite.len(), 10);
        assert!(!sqlite.contains(&ColumnType::Uuid));

        let postgres = valid_types(StoreFamily::Postgres);
        assert!(postgres.contains(&ColumnType::Uuid));
        assert!(postgres.contains(&ColumnType::Jsonb));
        assert!(!postgres.contains(&ColumnType::Tinyint));

        let mysql = valid_types(StoreFamily::Mysql);
        assert!(mysql.contains(&ColumnType::Enum));
        assert!(mysql.contains(&ColumnType::String));
    }

    #[test]
    fn test_store_family_from_provider() {
        assert_eq!(StoreFamily::from_provider("PostgreSQL"), StoreFamily::Postgres);
        assert_eq!(StoreFamily::from_provider("mysql2"), StoreFamily::Mysql);
        assert_eq!(StoreFamily::from_provider("sqlite3"), StoreFamily::Sqlite);
        assert_eq!(StoreFamily::from_provider("oracle"), StoreFamily::Common);
    }

    #[test]
    fn test_validated_rejects_family_extension() {
        let err = Field::validated("id_token", "uuid", FieldOptions::new(), StoreFamily::Mysql)
            .unwrap_err();
        assert!(matches!(err, MigrationError::InvalidFieldType { .. }));

        let field =
            Field::validated("token", "uuid", FieldOptions::new(), StoreFamily::Postgres).unwrap();
        assert_eq!(field.ty, ColumnType::Uuid);
    }

    #[test]
    fn test_infer_relation_for_reference_field() {
        let relation = infer_relation("author_id").unwrap();
        assert_eq!(relation.kind, RelationKind::BelongsTo);
        assert_eq!(relation.target_model, "author");
        assert_eq!(relation.foreign_key, "author_id");
        assert_eq!(relation.referenced_table(), "authors");
    }

    #[test]
    fn test_infer_relation_false_positive_is_kept() {
        // A scalar column that merely ends in `_id` is still treated as a reference.
        let field = Field::new("external_id", ColumnType::String, FieldOptions::new());
        assert!(field.has_relation());
        assert_eq!(field.relation.unwrap().target_model, "external");
    }

    #[test]
    fn test_infer_relation_needs_prefix() {
        assert!(infer_relation("title").is_none());
        assert!(infer_relation("_id").is_none());
        assert!(infer_relation("identity").is_none());
    }

    #[test]
    fn test_field_equality_ignores_options() {
        let a = Field::new("title", ColumnType::String, FieldOptions::new());
        let b = Field::new("title", ColumnType::Text, FieldOptions::new());
        let mut c = Field::new("title", ColumnType::String, FieldOptions::new());
        c.options.insert("null".into(), false.into());

        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_table_name_for() {
        assert_eq!(table_name_for("Product"), "products");
        assert_eq!(table_name_for("Admin::AuditLog"), "audit_logs");
        assert_eq!(table_name_for("category"), "categories");
    }

    #[test]
    fn test_option_value_deserializes_untagged() {
        let options: FieldOptions =
            serde_json::from_str(r#"{"null": false, "limit": 80, "default": "draft"}"#).unwrap();
        assert_eq!(options["null"], OptionValue::Bool(false));
        assert_eq!(options["limit"].as_i64(), Some(80));
        assert_eq!(options["default"].as_str(), Some("draft"));
    }
}

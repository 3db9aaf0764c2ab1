//! Mapping of live column types onto the coarse vocabulary.

use crate::field::ColumnType;

/// Normalize a native column type name for comparison with declared fields.
///
/// The mapping is lossy on purpose: `text` collapses into `string`, `decimal`
/// into `float`, and `date`/`time` into `datetime`. Unknown names pass through.
pub fn normalize(native_type: &str) -> ColumnType {
    normalize_type(ColumnType::from(native_type))
}

/// Normalize an already parsed type.
///
/// The comparator applies this to declared types too, so that a declared
/// `decimal` matches a live `float` and a declared `text` matches itself.
pub fn normalize_type(ty: ColumnType) -> ColumnType {
    match ty {
        ColumnType::String | ColumnType::Text => ColumnType::String,
        ColumnType::Integer => ColumnType::Integer,
        ColumnType::Float | ColumnType::Decimal => ColumnType::Float,
        ColumnType::Boolean => ColumnType::Boolean,
        ColumnType::Date | ColumnType::DateTime | ColumnType::Time => ColumnType::DateTime,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_family_collapses() {
        assert_eq!(normalize("string"), ColumnType::String);
        assert_eq!(normalize("text"), ColumnType::String);
    }

    #[test]
    fn test_numeric_family_collapses() {
        assert_eq!(normalize("integer"), ColumnType::Integer);
        assert_eq!(normalize("float"), ColumnType::Float);
        assert_eq!(normalize("decimal"), ColumnType::Float);
    }

    #[test]
    fn test_temporal_family_collapses() {
        assert_eq!(normalize("date"), ColumnType::DateTime);
        assert_eq!(normalize("time"), ColumnType::DateTime);
        assert_eq!(normalize("datetime"), ColumnType::DateTime);
    }

    #[test]
    fn test_declared_and_live_sides_meet() {
        assert_eq!(normalize_type(ColumnType::Decimal), normalize("float"));
        assert_eq!(normalize_type(ColumnType::Text), normalize("string"));
        assert_eq!(normalize_type(ColumnType::Text), normalize("text"));
    }

    #[test]
    fn test_unknown_types_pass_through() {
        assert_eq!(normalize("boolean"), ColumnType::Boolean);
        assert_eq!(normalize("binary"), ColumnType::Binary);
        assert_eq!(normalize("uuid"), ColumnType::Uuid);
        assert_eq!(normalize("citext"), ColumnType::Other("citext".to_string()));
    }
}

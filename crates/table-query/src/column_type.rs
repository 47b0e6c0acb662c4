//! Column types of a table, as accepted by `CAST(... AS <type>)`.

use std::fmt;

/// The fixed enumeration of table column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    String,
    Double,
    Integer,
    Boolean,
    Date,
    FileHandleId,
    EntityId,
    SubmissionId,
    EvaluationId,
    Link,
    MediumText,
    LargeText,
    UserId,
    StringList,
    IntegerList,
    BooleanList,
    DateList,
    EntityIdList,
    UserIdList,
    Json,
}

impl ColumnType {
    /// Every column type, in declaration order.
    pub const ALL: [Self; 20] = [
        Self::String,
        Self::Double,
        Self::Integer,
        Self::Boolean,
        Self::Date,
        Self::FileHandleId,
        Self::EntityId,
        Self::SubmissionId,
        Self::EvaluationId,
        Self::Link,
        Self::MediumText,
        Self::LargeText,
        Self::UserId,
        Self::StringList,
        Self::IntegerList,
        Self::BooleanList,
        Self::DateList,
        Self::EntityIdList,
        Self::UserIdList,
        Self::Json,
    ];

    /// Looks up a column type by name (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column_type| column_type.as_str().eq_ignore_ascii_case(s))
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Double => "DOUBLE",
            Self::Integer => "INTEGER",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::FileHandleId => "FILEHANDLEID",
            Self::EntityId => "ENTITYID",
            Self::SubmissionId => "SUBMISSIONID",
            Self::EvaluationId => "EVALUATIONID",
            Self::Link => "LINK",
            Self::MediumText => "MEDIUMTEXT",
            Self::LargeText => "LARGETEXT",
            Self::UserId => "USERID",
            Self::StringList => "STRING_LIST",
            Self::IntegerList => "INTEGER_LIST",
            Self::BooleanList => "BOOLEAN_LIST",
            Self::DateList => "DATE_LIST",
            Self::EntityIdList => "ENTITYID_LIST",
            Self::UserIdList => "USERID_LIST",
            Self::Json => "JSON",
        }
    }

    /// Returns true for the multi-value column types.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(
            self,
            Self::StringList
                | Self::IntegerList
                | Self::BooleanList
                | Self::DateList
                | Self::EntityIdList
                | Self::UserIdList
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(ColumnType::from_str("string"), Some(ColumnType::String));
        assert_eq!(
            ColumnType::from_str("EntityId_List"),
            Some(ColumnType::EntityIdList)
        );
        assert_eq!(ColumnType::from_str("VARCHAR"), None);
    }

    #[test]
    fn test_names_round_trip() {
        for column_type in ColumnType::ALL {
            assert_eq!(ColumnType::from_str(column_type.as_str()), Some(column_type));
        }
    }

    #[test]
    fn test_is_list() {
        assert!(ColumnType::UserIdList.is_list());
        assert!(!ColumnType::UserId.is_list());
    }
}

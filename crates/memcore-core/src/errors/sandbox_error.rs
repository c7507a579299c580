/// Reason tokens for SQL sandbox rejections (§4.2). Kept machine-readable
/// (not a free-text `String`) so callers can render a stable `reason` field
/// without parsing prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SandboxError {
    #[error("not a single SELECT statement")]
    NotSingleSelect,
    #[error("multiple statements in one query")]
    MultipleStatements,
    #[error("query references a system catalog")]
    SystemCatalogReference,
    #[error("query references information_schema")]
    InformationSchemaReference,
    #[error("query uses an explicit schema qualifier")]
    ExplicitSchemaQualifier,
    #[error("query calls a disallowed function")]
    DisallowedFunction,
    #[error("query exceeds the maximum length")]
    QueryTooLong,
    #[error("statement timeout out of the allowed range")]
    TimeoutOutOfRange,
    #[error("requested row limit out of the allowed range")]
    LimitOutOfRange,
    #[error("identifier fails validation")]
    InvalidIdentifier,
    #[error("identifier is a reserved keyword")]
    ReservedKeyword,
    #[error("query failed to parse")]
    ParseFailure,
}

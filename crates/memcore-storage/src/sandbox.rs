//! The read-only SQL sandbox (§4.2). An agent-supplied SQL string is
//! AST-parsed to confirm it is exactly one `SELECT`, then walked for
//! disallowed references (system catalogs, explicit schema qualifiers,
//! dangerous functions). The query is never executed directly — it is
//! wrapped in a `WITH … LIMIT N` CTE so the row-count clamp is enforced by
//! Postgres itself, not by truncating a client-side result set.

use memcore_core::config::SandboxConfig;
use memcore_core::errors::SandboxError;
use memcore_core::MemcoreResult;
use regex::Regex;
use sqlparser::ast::{Expr, Function, FunctionArguments, ObjectName, Query, SetExpr, Statement, TableFactor};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

const SYSTEM_CATALOG_PREFIXES: &[&str] = &["pg_", "pg_catalog"];
const INFORMATION_SCHEMA_PREFIX: &str = "information_schema";
const DANGEROUS_FUNCTIONS: &[&str] = &[
    "pg_read_file",
    "pg_read_binary_file",
    "pg_ls_dir",
    "pg_sleep",
    "set_config",
    "current_setting",
    "pg_terminate_backend",
    "pg_cancel_backend",
    "dblink",
    "lo_import",
    "lo_export",
];
const RESERVED_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "drop", "table", "from", "where", "user", "group",
    "order", "table_name", "column", "grant", "public",
];

/// Identifier grammar from §4.2.
pub fn identifier_regex() -> Regex {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,62}$").unwrap()
}

pub fn validate_identifier(ident: &str) -> Result<(), SandboxError> {
    if !identifier_regex().is_match(ident) {
        return Err(SandboxError::InvalidIdentifier);
    }
    if RESERVED_KEYWORDS.contains(&ident.to_lowercase().as_str()) {
        return Err(SandboxError::ReservedKeyword);
    }
    Ok(())
}

/// Raw inputs to a sandboxed query, before clamping.
#[derive(Debug, Clone)]
pub struct SandboxRequest {
    pub sql: String,
    pub timeout_secs: u32,
    pub row_limit: u32,
    pub exclude_soft_deleted: bool,
}

/// A request that has passed validation, with every bound clamped into its
/// allowed range and the executable SQL text already wrapped.
#[derive(Debug, Clone)]
pub struct ValidatedQuery {
    pub wrapped_sql: String,
    pub timeout_secs: u32,
}

pub fn validate_sandbox_query(
    req: &SandboxRequest,
    config: &SandboxConfig,
) -> MemcoreResult<ValidatedQuery> {
    if req.sql.len() > config.max_query_len {
        return Err(SandboxError::QueryTooLong.into());
    }

    let statements = Parser::parse_sql(&PostgreSqlDialect {}, &req.sql)
        .map_err(|_| SandboxError::ParseFailure)?;

    if statements.len() != 1 {
        return Err(SandboxError::MultipleStatements.into());
    }

    let query = match &statements[0] {
        Statement::Query(q) => q.as_ref(),
        _ => return Err(SandboxError::NotSingleSelect.into()),
    };

    check_query(query)?;

    let timeout_secs = req
        .timeout_secs
        .clamp(config.min_timeout_secs, config.max_timeout_secs);
    let row_limit = req.row_limit.clamp(config.min_row_limit, config.max_row_limit);

    // Re-serialize through the parsed AST so the wrapper always sees
    // canonical SQL rather than whatever whitespace the agent submitted.
    let inner_sql = query.to_string();
    let wrapped_sql = format!(
        "WITH _sandboxed AS ({inner_sql}) SELECT * FROM _sandboxed LIMIT {row_limit}"
    );

    Ok(ValidatedQuery {
        wrapped_sql,
        timeout_secs,
    })
}

fn check_query(query: &Query) -> Result<(), SandboxError> {
    check_set_expr(&query.body)?;
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            check_query(&cte.query)?;
        }
    }
    Ok(())
}

fn check_set_expr(body: &SetExpr) -> Result<(), SandboxError> {
    match body {
        SetExpr::Select(select) => {
            for item in &select.projection {
                check_select_item(item)?;
            }
            for twj in &select.from {
                check_table_factor(&twj.relation)?;
                for join in &twj.joins {
                    check_table_factor(&join.relation)?;
                }
            }
            if let Some(selection) = &select.selection {
                check_expr(selection)?;
            }
        }
        SetExpr::Query(q) => check_query(q)?,
        SetExpr::SetOperation { left, right, .. } => {
            check_set_expr(left)?;
            check_set_expr(right)?;
        }
        _ => {}
    }
    Ok(())
}

fn check_select_item(item: &sqlparser::ast::SelectItem) -> Result<(), SandboxError> {
    use sqlparser::ast::SelectItem;
    match item {
        SelectItem::UnnamedExpr(e) | SelectItem::ExprWithAlias { expr: e, .. } => check_expr(e),
        _ => Ok(()),
    }
}

fn check_table_factor(factor: &TableFactor) -> Result<(), SandboxError> {
    if let TableFactor::Table { name, .. } = factor {
        check_object_name(name)?;
    }
    Ok(())
}

fn check_object_name(name: &ObjectName) -> Result<(), SandboxError> {
    // §4.2: "no explicit schema qualifier" — a bare table name is the only
    // shape allowed; `schema.table` forces the attacker to name a schema
    // other than the one the tenant's search path already pins.
    if name.0.len() > 1 {
        return Err(SandboxError::ExplicitSchemaQualifier);
    }
    let ident = name.0[0].value.to_lowercase();
    if ident.starts_with(INFORMATION_SCHEMA_PREFIX) {
        return Err(SandboxError::InformationSchemaReference);
    }
    if SYSTEM_CATALOG_PREFIXES.iter().any(|p| ident.starts_with(p)) {
        return Err(SandboxError::SystemCatalogReference);
    }
    Ok(())
}

fn check_expr(expr: &Expr) -> Result<(), SandboxError> {
    match expr {
        Expr::Function(func) => check_function(func)?,
        Expr::BinaryOp { left, right, .. } => {
            check_expr(left)?;
            check_expr(right)?;
        }
        Expr::UnaryOp { expr, .. } | Expr::Nested(expr) | Expr::Cast { expr, .. } => {
            check_expr(expr)?;
        }
        Expr::Subquery(q) | Expr::Exists { subquery: q, .. } => check_query(q)?,
        Expr::CompoundIdentifier(parts) if parts.len() > 1 => {
            let head = parts[0].value.to_lowercase();
            if head.starts_with(INFORMATION_SCHEMA_PREFIX) {
                return Err(SandboxError::InformationSchemaReference);
            }
            if SYSTEM_CATALOG_PREFIXES.iter().any(|p| head.starts_with(p)) {
                return Err(SandboxError::SystemCatalogReference);
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_function(func: &Function) -> Result<(), SandboxError> {
    let fname = func
        .name
        .0
        .last()
        .map(|p| p.value.to_lowercase())
        .unwrap_or_default();
    if DANGEROUS_FUNCTIONS.contains(&fname.as_str()) {
        return Err(SandboxError::DisallowedFunction);
    }
    if let FunctionArguments::List(list) = &func.args {
        for arg in &list.args {
            if let sqlparser::ast::FunctionArg::Unnamed(sqlparser::ast::FunctionArgExpr::Expr(e))
            | sqlparser::ast::FunctionArg::Named {
                arg: sqlparser::ast::FunctionArgExpr::Expr(e),
                ..
            } = arg
            {
                check_expr(e)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use memcore_core::MemcoreError;

    fn config() -> SandboxConfig {
        SandboxConfig::default()
    }

    fn request(sql: &str) -> SandboxRequest {
        SandboxRequest {
            sql: sql.to_string(),
            timeout_secs: 5,
            row_limit: 50,
            exclude_soft_deleted: true,
        }
    }

    #[test]
    fn plain_select_is_wrapped_and_clamped() {
        let result = validate_sandbox_query(&request("SELECT * FROM meals WHERE calories > 100"), &config()).unwrap();
        assert!(result.wrapped_sql.starts_with("WITH _sandboxed AS ("));
        assert!(result.wrapped_sql.contains("LIMIT 50"));
    }

    #[test]
    fn multiple_statements_rejected() {
        let err = validate_sandbox_query(&request("SELECT 1; SELECT 2"), &config()).unwrap_err();
        assert!(matches!(err, MemcoreError::SqlSandbox(SandboxError::MultipleStatements)));
    }

    #[test]
    fn non_select_statement_rejected() {
        let err = validate_sandbox_query(&request("DELETE FROM meals"), &config()).unwrap_err();
        assert!(matches!(err, MemcoreError::SqlSandbox(SandboxError::NotSingleSelect)));
    }

    #[test]
    fn schema_qualified_table_rejected() {
        let err = validate_sandbox_query(&request("SELECT * FROM public.meals"), &config()).unwrap_err();
        assert!(matches!(err, MemcoreError::SqlSandbox(SandboxError::ExplicitSchemaQualifier)));
    }

    #[test]
    fn pg_catalog_reference_rejected() {
        let err = validate_sandbox_query(&request("SELECT * FROM pg_stat_activity"), &config()).unwrap_err();
        assert!(matches!(err, MemcoreError::SqlSandbox(SandboxError::SystemCatalogReference)));
    }

    #[test]
    fn information_schema_reference_rejected() {
        let err = validate_sandbox_query(&request("SELECT * FROM information_schema.tables"), &config()).unwrap_err();
        assert!(matches!(err, MemcoreError::SqlSandbox(SandboxError::InformationSchemaReference)));
    }

    #[test]
    fn dangerous_function_rejected() {
        let err = validate_sandbox_query(&request("SELECT pg_sleep(10)"), &config()).unwrap_err();
        assert!(matches!(err, MemcoreError::SqlSandbox(SandboxError::DisallowedFunction)));
    }

    #[test]
    fn dangerous_function_nested_in_expression_rejected() {
        let err = validate_sandbox_query(&request("SELECT 1 WHERE 1 = (SELECT pg_sleep(1))"), &config()).unwrap_err();
        assert!(matches!(err, MemcoreError::SqlSandbox(SandboxError::DisallowedFunction)));
    }

    #[test]
    fn valid_identifier_accepted() {
        assert!(validate_identifier("meals").is_ok());
        assert!(validate_identifier("workout_log_2024").is_ok());
    }

    #[test]
    fn reserved_keyword_identifier_rejected() {
        assert!(matches!(validate_identifier("select"), Err(SandboxError::ReservedKeyword)));
    }

    #[test]
    fn malformed_identifier_rejected() {
        assert!(matches!(validate_identifier("1meals"), Err(SandboxError::InvalidIdentifier)));
        assert!(matches!(validate_identifier("meals; drop table"), Err(SandboxError::InvalidIdentifier)));
    }
}

/// Build the fixed per-tenant schema template (§4.1, §3). `namespace` has
/// already been validated by `Tenant::namespace_for` (always `t_<hex>`) so
/// it's safe to interpolate directly into DDL — this is schema
/// provisioning, not a user-supplied query, and never goes near the SQL
/// sandbox (§4.2).
pub fn tenant_schema_sql(namespace: &str) -> String {
    format!(
        r#"
CREATE SCHEMA IF NOT EXISTS "{ns}";

CREATE TABLE IF NOT EXISTS "{ns}".profile_versions (
    version BIGINT PRIMARY KEY,
    document JSONB NOT NULL,
    changed_fields TEXT[] NOT NULL,
    changed_by TEXT NOT NULL,
    meta_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS "{ns}"._table_registry (
    table_name TEXT PRIMARY KEY,
    description TEXT,
    columns JSONB NOT NULL DEFAULT '{{}}'::jsonb,
    record_count BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS "{ns}"._vector_collections (
    name TEXT PRIMARY KEY,
    dimensions INT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS "{ns}".vectors (
    id UUID PRIMARY KEY,
    collection TEXT NOT NULL,
    text TEXT NOT NULL,
    embedding vector NOT NULL,
    metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb,
    meta_id UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
);
CREATE INDEX IF NOT EXISTS idx_vectors_collection ON "{ns}".vectors(collection) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS idx_vectors_embedding ON "{ns}".vectors USING hnsw (embedding vector_cosine_ops);

CREATE TABLE IF NOT EXISTS "{ns}".entities (
    id UUID PRIMARY KEY,
    entity_type TEXT NOT NULL,
    name TEXT NOT NULL,
    properties JSONB NOT NULL DEFAULT '{{}}'::jsonb,
    confidence DOUBLE PRECISION NOT NULL,
    mention_count BIGINT NOT NULL DEFAULT 1,
    first_seen TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_seen TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_entities_type_name_live
    ON "{ns}".entities (entity_type, lower(name)) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS idx_entities_name_trgm ON "{ns}".entities USING gin (name gin_trgm_ops);

CREATE TABLE IF NOT EXISTS "{ns}".edges (
    id UUID PRIMARY KEY,
    source_id UUID NOT NULL REFERENCES "{ns}".entities(id),
    target_id UUID NOT NULL REFERENCES "{ns}".entities(id),
    relation TEXT NOT NULL,
    weight DOUBLE PRECISION NOT NULL DEFAULT 1.0,
    confidence DOUBLE PRECISION NOT NULL,
    evidence JSONB NOT NULL DEFAULT '[]'::jsonb,
    properties JSONB NOT NULL DEFAULT '{{}}'::jsonb,
    is_current BOOLEAN NOT NULL DEFAULT true,
    meta_id UUID NOT NULL,
    first_seen TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_seen TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_edges_triple_live
    ON "{ns}".edges (source_id, target_id, relation) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS idx_edges_source ON "{ns}".edges(source_id) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS idx_edges_target ON "{ns}".edges(target_id) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS "{ns}".edge_quarantine (
    id UUID PRIMARY KEY,
    source_id UUID NOT NULL,
    target_id UUID NOT NULL,
    relation TEXT NOT NULL,
    reason TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    resolved_at TIMESTAMPTZ
);

CREATE TABLE IF NOT EXISTS "{ns}"._memory_meta (
    id UUID PRIMARY KEY,
    source_type TEXT NOT NULL,
    source_ref JSONB NOT NULL,
    origin TEXT NOT NULL,
    confidence DOUBLE PRECISION NOT NULL,
    status TEXT NOT NULL,
    access_count BIGINT NOT NULL DEFAULT 0,
    last_accessed TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_reinforced TIMESTAMPTZ NOT NULL DEFAULT now(),
    contradictions UUID[] NOT NULL DEFAULT '{{}}',
    promote_history JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS idx_memory_meta_status ON "{ns}"._memory_meta(status);
CREATE INDEX IF NOT EXISTS idx_memory_meta_last_reinforced ON "{ns}"._memory_meta(last_reinforced);

CREATE TABLE IF NOT EXISTS "{ns}".knowledge_claims (
    id UUID PRIMARY KEY,
    claim_type TEXT NOT NULL,
    subject JSONB NOT NULL,
    predicate TEXT NOT NULL,
    object JSONB NOT NULL,
    confidence DOUBLE PRECISION NOT NULL,
    status TEXT NOT NULL,
    method TEXT NOT NULL,
    origin TEXT NOT NULL,
    source_ref JSONB NOT NULL,
    write_id UUID NOT NULL,
    agent_id TEXT NOT NULL,
    evidence TEXT[] NOT NULL DEFAULT '{{}}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS idx_claims_write_id ON "{ns}".knowledge_claims(write_id);

CREATE TABLE IF NOT EXISTS "{ns}".claim_events (
    id UUID PRIMARY KEY,
    claim_id UUID NOT NULL REFERENCES "{ns}".knowledge_claims(id),
    event TEXT NOT NULL,
    at TIMESTAMPTZ NOT NULL DEFAULT now(),
    detail JSONB NOT NULL DEFAULT '{{}}'::jsonb
);

CREATE TABLE IF NOT EXISTS "{ns}".enrichment_jobs (
    id UUID PRIMARY KEY,
    write_id UUID NOT NULL,
    target JSONB NOT NULL,
    payload JSONB NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    attempt_count INT NOT NULL DEFAULT 0,
    next_run_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_error TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS idx_enrichment_jobs_claim
    ON "{ns}".enrichment_jobs(status, next_run_at);

CREATE TABLE IF NOT EXISTS "{ns}".pending_vectors (
    id UUID PRIMARY KEY,
    collection TEXT NOT NULL,
    text TEXT NOT NULL,
    metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb,
    meta_id UUID NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    attempt_count INT NOT NULL DEFAULT 0,
    next_run_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_error TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS idx_pending_vectors_claim
    ON "{ns}".pending_vectors(status, next_run_at);

CREATE TABLE IF NOT EXISTS "{ns}".memory_backlog (
    id UUID PRIMARY KEY,
    payload JSONB NOT NULL,
    reason TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS "{ns}".consent_rules (
    id UUID PRIMARY KEY,
    agent_id TEXT NOT NULL,
    resource_pattern TEXT NOT NULL,
    permission TEXT NOT NULL,
    granted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    revoked_at TIMESTAMPTZ
);
CREATE INDEX IF NOT EXISTS idx_consent_agent ON "{ns}".consent_rules(agent_id) WHERE revoked_at IS NULL;

CREATE TABLE IF NOT EXISTS "{ns}".audit_log (
    id UUID PRIMARY KEY,
    write_id UUID NOT NULL,
    stage TEXT NOT NULL,
    source_ref JSONB,
    latency_ms BIGINT,
    success BOOLEAN NOT NULL DEFAULT true,
    detail JSONB NOT NULL DEFAULT '{{}}'::jsonb,
    at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS idx_audit_write_id ON "{ns}".audit_log(write_id);
"#,
        ns = namespace,
    )
}

/// Global records that span tenants: users, api keys, OAuth clients,
/// queue bookkeeping that genuinely has no tenant (the OAuth issuance
/// surface itself is out of scope, §1, but the tables it writes through
/// live here since `memcore-consent` revokes api keys on agent revoke),
/// system-wide config, and the buffered usage-metering counters (§4.12).
pub const SHARED_SCHEMA_SQL: &str = r#"
CREATE SCHEMA IF NOT EXISTS shared;

CREATE EXTENSION IF NOT EXISTS pg_trgm;
CREATE EXTENSION IF NOT EXISTS vector;

CREATE TABLE IF NOT EXISTS shared.tenants (
    id UUID PRIMARY KEY,
    namespace TEXT NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS shared.api_keys (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL REFERENCES shared.tenants(id),
    agent_id TEXT NOT NULL,
    key_hash TEXT NOT NULL UNIQUE,
    tier TEXT NOT NULL DEFAULT 'free',
    scopes TEXT[] NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    revoked_at TIMESTAMPTZ
);
CREATE INDEX IF NOT EXISTS idx_api_keys_tenant_agent ON shared.api_keys(tenant_id, agent_id);

CREATE TABLE IF NOT EXISTS shared.system_config (
    key TEXT PRIMARY KEY,
    value JSONB NOT NULL
);

CREATE TABLE IF NOT EXISTS shared.usage_counters (
    tenant_id UUID NOT NULL,
    resource TEXT NOT NULL,
    agent_id TEXT NOT NULL,
    day DATE NOT NULL,
    count BIGINT NOT NULL DEFAULT 0,
    PRIMARY KEY (tenant_id, resource, agent_id, day)
);
"#;

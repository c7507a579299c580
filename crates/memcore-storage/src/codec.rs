//! Plain-string encodings for the model enums. Postgres stores them as
//! `TEXT`; sqlx has no `Type` impl for these without a derive we'd rather
//! not pull in, so encode/decode at the query boundary instead.

use memcore_core::models::{
    ClaimStatus, JobStatus, MemoryOrigin, MemoryStatus, Permission, SourceType,
};

pub fn source_type_str(v: SourceType) -> &'static str {
    match v {
        SourceType::Profile => "profile",
        SourceType::Table => "table",
        SourceType::Vector => "vector",
        SourceType::Entity => "entity",
        SourceType::Edge => "edge",
    }
}

pub fn source_type_parse(s: &str) -> SourceType {
    match s {
        "table" => SourceType::Table,
        "vector" => SourceType::Vector,
        "entity" => SourceType::Entity,
        "edge" => SourceType::Edge,
        _ => SourceType::Profile,
    }
}

pub fn origin_str(v: MemoryOrigin) -> &'static str {
    match v {
        MemoryOrigin::UserTyped => "user_typed",
        MemoryOrigin::UserStated => "user_stated",
        MemoryOrigin::Imported => "imported",
        MemoryOrigin::System => "system",
        MemoryOrigin::AiStated => "ai_stated",
        MemoryOrigin::AiInferred => "ai_inferred",
        MemoryOrigin::AiPattern => "ai_pattern",
        MemoryOrigin::Contradicted => "contradicted",
    }
}

pub fn origin_parse(s: &str) -> MemoryOrigin {
    match s {
        "user_stated" => MemoryOrigin::UserStated,
        "imported" => MemoryOrigin::Imported,
        "system" => MemoryOrigin::System,
        "ai_stated" => MemoryOrigin::AiStated,
        "ai_inferred" => MemoryOrigin::AiInferred,
        "ai_pattern" => MemoryOrigin::AiPattern,
        "contradicted" => MemoryOrigin::Contradicted,
        _ => MemoryOrigin::UserTyped,
    }
}

pub fn status_str(v: MemoryStatus) -> &'static str {
    match v {
        MemoryStatus::Unvetted => "unvetted",
        MemoryStatus::Active => "active",
        MemoryStatus::Trusted => "trusted",
        MemoryStatus::Decayed => "decayed",
        MemoryStatus::Review => "review",
        MemoryStatus::Rejected => "rejected",
    }
}

pub fn status_parse(s: &str) -> MemoryStatus {
    match s {
        "active" => MemoryStatus::Active,
        "trusted" => MemoryStatus::Trusted,
        "decayed" => MemoryStatus::Decayed,
        "review" => MemoryStatus::Review,
        "rejected" => MemoryStatus::Rejected,
        _ => MemoryStatus::Unvetted,
    }
}

pub fn job_status_str(v: JobStatus) -> &'static str {
    match v {
        JobStatus::Pending => "pending",
        JobStatus::Processing => "processing",
        JobStatus::Retry => "retry",
        JobStatus::Done => "done",
        JobStatus::Failed => "failed",
    }
}

pub fn job_status_parse(s: &str) -> JobStatus {
    match s {
        "processing" => JobStatus::Processing,
        "retry" => JobStatus::Retry,
        "done" => JobStatus::Done,
        "failed" => JobStatus::Failed,
        _ => JobStatus::Pending,
    }
}

pub fn claim_status_str(v: ClaimStatus) -> &'static str {
    match v {
        ClaimStatus::Created => "created",
        ClaimStatus::Contradicted => "contradicted",
        ClaimStatus::Superseded => "superseded",
        ClaimStatus::Reaffirmed => "reaffirmed",
    }
}

pub fn claim_status_parse(s: &str) -> ClaimStatus {
    match s {
        "contradicted" => ClaimStatus::Contradicted,
        "superseded" => ClaimStatus::Superseded,
        "reaffirmed" => ClaimStatus::Reaffirmed,
        _ => ClaimStatus::Created,
    }
}

pub fn permission_str(v: Permission) -> &'static str {
    match v {
        Permission::None => "none",
        Permission::Read => "read",
        Permission::Write => "write",
    }
}

pub fn permission_parse(s: &str) -> Permission {
    match s {
        "write" => Permission::Write,
        "read" => Permission::Read,
        _ => Permission::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_text_falls_back_to_the_least_privileged_variant() {
        assert_eq!(source_type_parse("garbage"), SourceType::Profile);
        assert_eq!(origin_parse("garbage"), MemoryOrigin::UserTyped);
        assert_eq!(status_parse("garbage"), MemoryStatus::Unvetted);
        assert_eq!(job_status_parse("garbage"), JobStatus::Pending);
        assert_eq!(claim_status_parse("garbage"), ClaimStatus::Created);
        assert_eq!(permission_parse("garbage"), Permission::None);
    }

    #[test]
    fn contradicted_origin_round_trips() {
        assert_eq!(origin_parse(origin_str(MemoryOrigin::Contradicted)), MemoryOrigin::Contradicted);
    }
}

mod memcore_error;
mod sandbox_error;
mod storage_error;

pub use memcore_error::{MemcoreError, MemcoreResult};
pub use sandbox_error::SandboxError;
pub use storage_error::StorageError;

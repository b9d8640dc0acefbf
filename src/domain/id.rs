//! Opaque identities issued by the cluster
//!
//! Actor, task and object identities are byte sequences whose layout is owned by
//! the cluster. The layer only compares, hashes and forwards them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for byte in bytes {
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}

/// Identity of a live remote actor
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(Vec<u8>);

impl ActorId {
    /// Generate a fresh random identity
    pub fn random() -> Self {
        Self(Uuid::new_v4().as_bytes().to_vec())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId(")?;
        write_hex(f, &self.0)?;
        write!(f, ")")
    }
}

/// Identity of a single submitted task
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Vec<u8>);

impl TaskId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId(")?;
        write_hex(f, &self.0)?;
        write!(f, ")")
    }
}

/// Identity of a value held by the object store
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Vec<u8>);

impl ObjectId {
    /// Id of the `index`-th return value of a task: task id followed by the
    /// little-endian return index
    pub fn for_task_return(task_id: &TaskId, index: u32) -> Self {
        let mut bytes = Vec::with_capacity(task_id.as_bytes().len() + 4);
        bytes.extend_from_slice(task_id.as_bytes());
        bytes.extend_from_slice(&index.to_le_bytes());
        Self(bytes)
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId(")?;
        write_hex(f, &self.0)?;
        write!(f, ")")
    }
}

/// Job identity handed out by the cluster directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub u32);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Language/runtime tag of a worker or actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Go,
    Java,
    Python,
    Cpp
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Java => "java",
            Language::Python => "python",
            Language::Cpp => "cpp"
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of this process in the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerType {
    Driver,
    Worker
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_ids_are_unique_and_hex_formatted() {
        let first = ActorId::random();
        let second = ActorId::random();

        assert_ne!(first, second);
        assert_eq!(first.as_bytes().len(), 16);

        let display = first.to_string();
        assert_eq!(display.len(), 32);
        assert!(display.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_return_object_ids_derive_from_task_id() {
        let task_id = TaskId::random();

        let first = ObjectId::for_task_return(&task_id, 0);
        let second = ObjectId::for_task_return(&task_id, 1);

        assert_ne!(first, second);
        assert!(first.as_bytes().starts_with(task_id.as_bytes()));
        assert_eq!(&first.as_bytes()[16..], &0u32.to_le_bytes());
        assert_eq!(&second.as_bytes()[16..], &1u32.to_le_bytes());
    }

    #[test]
    fn test_job_id_display() {
        assert_eq!(JobId(1).to_string(), "00000001");
        assert_eq!(Language::Rust.to_string(), "rust");
    }
}

//! Account directory that accepts every learner id.
//!
//! Used when account presence is verified upstream, e.g. by the gateway
//! that authenticates the request.

use async_trait::async_trait;

use crate::domain::foundation::LearnerId;
use crate::ports::{AccountDirectory, AccountError};

/// AccountDirectory that treats every learner as known.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccountDirectory;

impl OpenAccountDirectory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AccountDirectory for OpenAccountDirectory {
    async fn ensure_exists(&self, _learner_id: &LearnerId) -> Result<(), AccountError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_any_learner() {
        let directory = OpenAccountDirectory::new();
        let id = LearnerId::new("anyone").unwrap();
        assert!(directory.ensure_exists(&id).await.is_ok());
    }
}

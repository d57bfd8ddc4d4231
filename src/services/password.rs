use crate::errors::{AppError, AppResult};

/// bcrypt hashing, run on the blocking pool so request workers are not stalled.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::InternalError(format!("Hashing task failed: {}", e)))?
            .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))
    }

    /// A malformed stored hash counts as a mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::InternalError(format!("Hashing task failed: {}", e)))?;

        match matches {
            Ok(matches) => Ok(matches),
            Err(e) => {
                log::warn!("Stored password hash could not be verified: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = PasswordHasher::with_cost(4);
        let hash = hasher.hash("secreto").await.unwrap();

        assert_ne!(hash, "secreto");
        assert!(hasher.verify("secreto", &hash).await.unwrap());
        assert!(!hasher.verify("otro", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_against_garbage_hash() {
        let hasher = PasswordHasher::with_cost(4);
        assert!(!hasher.verify("secreto", "not-a-hash").await.unwrap());
    }
}

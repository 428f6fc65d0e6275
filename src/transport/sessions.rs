use crate::ID;
use crate::storage::User;
use sha2::Digest;
use sha2::Sha256;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Bearer tokens issued at login. Only a digest of each token is kept.
#[derive(Default)]
pub struct Sessions {
    tokens: RwLock<HashMap<String, ID<User>>>,
}

impl Sessions {
    pub async fn issue(&self, user: ID<User>) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.tokens.write().await.insert(Self::digest(&token), user);
        log::debug!("[sessions] issued token for {}", user);
        token
    }
    pub async fn resolve(&self, token: &str) -> Option<ID<User>> {
        self.tokens.read().await.get(&Self::digest(token)).copied()
    }
    /// True if the token was live.
    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens
            .write()
            .await
            .remove(&Self::digest(token))
            .inspect(|user| log::debug!("[sessions] revoked token for {}", user))
            .is_some()
    }
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
    fn digest(token: &str) -> String {
        Sha256::digest(token.as_bytes())
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[tokio::test]
    async fn issue_resolve_revoke() {
        let sessions = Sessions::default();
        let token = sessions.issue(ID::new(5)).await;
        assert_eq!(sessions.resolve(&token).await, Some(ID::new(5)));
        assert_eq!(sessions.resolve("forged").await, None);
        assert!(sessions.revoke(&token).await);
        assert!(!sessions.revoke(&token).await);
        assert!(sessions.is_empty().await);
    }
}

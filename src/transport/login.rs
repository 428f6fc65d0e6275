use super::*;
use crate::API_VERSION;
use crate::ID;
use crate::TransportError;
use crate::storage::Storage;
use crate::storage::User;
use serde::Deserialize;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// What the server hands back for valid credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    pub token: String,
    pub api_version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ID<User>,
    pub name: String,
}

/// A logged-in session as the client holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub token: String,
    pub profile: Profile,
}

/// Credential and profile endpoints of a server.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    async fn login(&self, name: &str, password: &str) -> Result<Grant, TransportError>;
    async fn profile(&self, token: &str) -> Result<Profile, TransportError>;
    async fn logout(&self, token: &str) -> Result<(), TransportError>;
}

/// Client-side login flow.
///
/// Credentials are exchanged for a token, the server's API version is
/// checked, then the profile fetch and socket connection must both
/// finish within one timeout. Any failure or abort after the token was
/// issued disables the socket and revokes the token.
pub struct Login {
    gateway: Arc<dyn Gateway>,
    socket: Arc<Socket>,
    timeout: Duration,
}

impl Login {
    pub fn new(gateway: Arc<dyn Gateway>, socket: Arc<Socket>, timeout: Duration) -> Self {
        Self {
            gateway,
            socket,
            timeout,
        }
    }

    pub async fn login<A>(&self, name: &str, password: &str, abort: A) -> Result<Authenticated, TransportError>
    where
        A: Future<Output = ()> + Send,
    {
        tokio::pin!(abort);
        let grant = tokio::select! {
            _ = &mut abort => return Err(TransportError::Aborted),
            grant = self.gateway.login(name, password) => grant?,
        };
        if grant.api_version != API_VERSION {
            log::warn!(
                "[login] server speaks api {}, we speak {}",
                grant.api_version,
                API_VERSION
            );
            self.rollback(&grant.token).await;
            return Err(TransportError::UnsupportedApiVersion {
                server: grant.api_version,
                client: API_VERSION,
            });
        }
        let handshake = async {
            let (profile, ()) = tokio::try_join!(
                self.gateway.profile(&grant.token),
                self.socket.enable(&grant.token)
            )?;
            self.socket
                .connection()
                .wait_for(|live| *live)
                .await
                .map_err(|_| TransportError::Disconnected)?;
            Ok::<_, TransportError>(profile)
        };
        let result = tokio::select! {
            _ = &mut abort => Err(TransportError::Aborted),
            done = tokio::time::timeout(self.timeout, handshake) => done.unwrap_or(Err(TransportError::Timeout)),
        };
        match result {
            Ok(profile) => {
                log::info!("[login] {} logged in", profile.name);
                Ok(Authenticated {
                    token: grant.token,
                    profile,
                })
            }
            Err(e) => {
                log::warn!("[login] {} failed: {}", name, e);
                self.rollback(&grant.token).await;
                Err(e)
            }
        }
    }

    /// Ends a session obtained from [`Login::login`].
    pub async fn logout(&self, session: &Authenticated) -> Result<(), TransportError> {
        self.socket.disable().await;
        self.gateway.logout(&session.token).await
    }

    async fn rollback(&self, token: &str) {
        self.socket.disable().await;
        if let Err(e) = self.gateway.logout(token).await {
            log::warn!("[login] could not revoke token: {}", e);
        }
    }
}

/// Gateway answered by in-process storage and session table.
pub struct LocalGateway {
    storage: Arc<dyn Storage>,
    sessions: Arc<Sessions>,
    version: u32,
}

impl LocalGateway {
    pub fn new(storage: Arc<dyn Storage>, sessions: Arc<Sessions>) -> Self {
        Self {
            storage,
            sessions,
            version: API_VERSION,
        }
    }
    /// Reports another API version in grants.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

#[async_trait::async_trait]
impl Gateway for LocalGateway {
    async fn login(&self, name: &str, password: &str) -> Result<Grant, TransportError> {
        let user = self
            .storage
            .verify_password(name, password)
            .await
            .map_err(|e| TransportError::Rejected(e.to_string()))?
            .ok_or(TransportError::Unauthorized)?;
        Ok(Grant {
            token: self.sessions.issue(user.id).await,
            api_version: self.version,
        })
    }
    async fn profile(&self, token: &str) -> Result<Profile, TransportError> {
        let id = self
            .sessions
            .resolve(token)
            .await
            .ok_or(TransportError::Unauthorized)?;
        self.storage
            .find_user(id)
            .await
            .map_err(|e| TransportError::Rejected(e.to_string()))?
            .map(|u| Profile {
                id: u.id,
                name: u.name,
            })
            .ok_or(TransportError::Unauthorized)
    }
    async fn logout(&self, token: &str) -> Result<(), TransportError> {
        match self.sessions.revoke(token).await {
            true => Ok(()),
            false => Err(TransportError::Unauthorized),
        }
    }
}

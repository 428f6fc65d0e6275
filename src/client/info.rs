use super::ClientId;
use serde::Deserialize;
use serde::Serialize;

/// Public identity of a connected client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientInfo {
    pub id: ClientId,
    pub name: String,
}

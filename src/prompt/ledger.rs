use super::*;
use crate::GameError;
use crate::ID;
use crate::client::ClientId;
use crate::state::Notice;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// An outstanding prompt with the request it answers and its timer.
#[derive(Debug)]
pub struct Entry {
    pub prompt: Prompt,
    pub request: Request,
    pub deadline: Option<Deadline>,
}

/// Per-game table of outstanding and resolved prompts.
///
/// Each prompt holds one resolution slot. Taking the slot removes the
/// entry and remembers its addressee, so a second resolution is told
/// apart from an unknown id and from someone else's prompt.
#[derive(Debug, Default)]
pub struct Ledger {
    sequence: u64,
    pending: BTreeMap<ID<Prompt>, Entry>,
    resolved: HashMap<ID<Prompt>, ClientId>,
}

impl Ledger {
    pub fn next_id(&mut self) -> ID<Prompt> {
        self.sequence += 1;
        ID::new(self.sequence)
    }
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
    pub fn pending_for(&self, client: ClientId) -> Option<&Prompt> {
        self.pending
            .values()
            .map(|e| &e.prompt)
            .find(|p| p.client == client)
    }
    pub fn notices(&self) -> Vec<Notice> {
        self.pending
            .values()
            .map(|e| Notice {
                id: e.prompt.id,
                seat: e.prompt.seat,
            })
            .collect()
    }
    pub fn insert(&mut self, entry: Entry) -> Result<(), GameError> {
        match self.pending_for(entry.prompt.client) {
            Some(_) => Err(GameError::PromptAlreadyPending),
            None => {
                self.pending.insert(entry.prompt.id, entry);
                Ok(())
            }
        }
    }
    /// Looks up the slot `client` wants to fill without consuming it.
    pub fn check(&self, client: ClientId, id: ID<Prompt>) -> Result<&Entry, GameError> {
        match (self.pending.get(&id), self.resolved.get(&id)) {
            (Some(entry), _) if entry.prompt.client == client => Ok(entry),
            (Some(_), _) => Err(GameError::ForeignPrompt),
            (None, Some(owner)) if *owner == client => Err(GameError::PromptAlreadyResolved),
            (None, Some(_)) => Err(GameError::ForeignPrompt),
            (None, None) => Err(GameError::PromptNotFound),
        }
    }
    /// Fills the slot. The returned entry's deadline is cancelled when dropped.
    pub fn take(&mut self, client: ClientId, id: ID<Prompt>) -> Result<Entry, GameError> {
        self.check(client, id)?;
        self.pending
            .remove(&id)
            .inspect(|e| {
                self.resolved.insert(id, e.prompt.client);
            })
            .ok_or(GameError::PromptNotFound)
    }
    /// Fills the slot on behalf of an expired deadline. None if it was already filled.
    pub fn expire(&mut self, client: ClientId, id: ID<Prompt>) -> Option<Entry> {
        self.take(client, id).ok()
    }
    /// Drops every outstanding prompt, cancelling their deadlines.
    pub fn clear(&mut self) -> Vec<Prompt> {
        let drained = std::mem::take(&mut self.pending);
        drained
            .into_values()
            .map(|e| {
                self.resolved.insert(e.prompt.id, e.prompt.client);
                e.prompt
            })
            .collect()
    }
    /// Drops the prompt outstanding for `client`, if any, cancelling its deadline.
    pub fn withdraw(&mut self, client: ClientId) -> Option<Prompt> {
        let id = self.pending_for(client)?.id;
        self.take(client, id).ok().map(|e| e.prompt)
    }
}

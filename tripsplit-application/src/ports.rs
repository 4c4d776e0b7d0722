use indexmap::IndexMap;
use std::collections::HashMap;
use tripsplit_domain::ParticipantId;

pub trait ParticipantDirectory: Send + Sync {
    fn display_name(&self, participant: &ParticipantId) -> Option<&str>;
}

impl ParticipantDirectory for HashMap<ParticipantId, String> {
    fn display_name(&self, participant: &ParticipantId) -> Option<&str> {
        self.get(participant).map(String::as_str)
    }
}

impl ParticipantDirectory for IndexMap<ParticipantId, String> {
    fn display_name(&self, participant: &ParticipantId) -> Option<&str> {
        self.get(participant).map(String::as_str)
    }
}

use serenity::all::MessageId;
use std::collections::HashSet;

/// State which is lost across sessions
pub struct VolatileState {
    pub ledger: DedupLedger,
    pub in_flight: InFlight,
}

impl VolatileState {
    pub fn new() -> Self {
        Self {
            ledger: DedupLedger::new(),
            in_flight: InFlight::new(),
        }
    }
}

/// Request ids that have already been turned into a notification.  Consulted
/// by the poll cycle so a request is announced at most once per process
/// lifetime.  Never evicted; a restart forgets everything, and re-announcing
/// after a restart is tolerated.
pub struct DedupLedger(HashSet<String>);

impl DedupLedger {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    pub fn has(&self, request_id: &str) -> bool {
        self.0.contains(request_id)
    }

    pub fn mark(&mut self, request_id: String) {
        self.0.insert(request_id);
    }
}

/// Messages currently being reconciled.  Two moderators reacting to the same
/// message before the first reconciliation clears its reactions would
/// otherwise race into two API calls.
pub struct InFlight(HashSet<MessageId>);

impl InFlight {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    /// Claim the message.  Returns false if someone else already holds it.
    pub fn begin(&mut self, message_id: MessageId) -> bool {
        self.0.insert(message_id)
    }

    pub fn finish(&mut self, message_id: MessageId) {
        self.0.remove(&message_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_marks_and_remembers() {
        let mut ledger = DedupLedger::new();
        assert!(!ledger.has("42"));

        ledger.mark("42".to_string());
        assert!(ledger.has("42"));
        assert!(!ledger.has("43"));

        // Marking twice is a no-op, not an error.
        ledger.mark("42".to_string());
        assert!(ledger.has("42"));
    }

    #[test]
    fn in_flight_is_exclusive_until_finished() {
        let mut in_flight = InFlight::new();
        let message = MessageId::new(7);

        assert!(in_flight.begin(message));
        assert!(!in_flight.begin(message));

        in_flight.finish(message);
        assert!(in_flight.begin(message));
    }
}

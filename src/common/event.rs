use chrono::{DateTime, Utc};

pub trait DomainEvent: Send + Sync + Clone {
    fn event_type(&self) -> &'static str;
    fn time_step(&self) -> u64;
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Append-only record of the events a mission produced, in emission order.
#[derive(Debug, Clone)]
pub struct EventLog<E: DomainEvent> {
    events: Vec<E>,
}

impl<E: DomainEvent> EventLog<E> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn record(&mut self, event: E) {
        tracing::debug!(
            event_type = event.event_type(),
            time_step = event.time_step(),
            "event recorded"
        );
        self.events.push(event);
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count_of(&self, event_type: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }
}

impl<E: DomainEvent> Default for EventLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

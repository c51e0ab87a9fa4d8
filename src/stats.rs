use crate::util::{mean, std_dev};

/// Placeholder shown for a statistic that has no value yet
pub const EMPTY_STAT: &str = "—";

/// Reaction times collected during the current session.
///
/// `best_ms` is kept equal to the minimum of `history`, and the history is
/// only ever appended to or cleared as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionStats {
    history: Vec<u64>,
    last_ms: Option<u64>,
    best_ms: Option<u64>,
}

impl ReactionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful round
    pub fn record(&mut self, reaction_ms: u64) {
        self.history.push(reaction_ms);
        self.last_ms = Some(reaction_ms);
        self.best_ms = Some(match self.best_ms {
            Some(best) if best <= reaction_ms => best,
            _ => reaction_ms,
        });
    }

    /// Forget the last time without touching the history (a new round started)
    pub fn clear_last(&mut self) {
        self.last_ms = None;
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.last_ms = None;
        self.best_ms = None;
    }

    pub fn history(&self) -> &[u64] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn last_ms(&self) -> Option<u64> {
        self.last_ms
    }

    pub fn best_ms(&self) -> Option<u64> {
        self.best_ms
    }

    /// Mean reaction time rounded to the nearest millisecond
    pub fn average_ms(&self) -> Option<u64> {
        mean(&self.history).map(|avg| avg.round() as u64)
    }

    pub fn std_dev_ms(&self) -> Option<f64> {
        std_dev(&self.history)
    }
}

pub fn format_ms(value: Option<u64>) -> String {
    match value {
        Some(ms) => format!("{ms} ms"),
        None => EMPTY_STAT.to_string(),
    }
}

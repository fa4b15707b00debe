//! Encounter outcomes fed back into the optimizer.
use std::collections::VecDeque;

use super::stats::Loadout;

/// How one encounter went for the monster.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutcomeRecord {
    pub loadout: Loadout,
    /// True when the monster defeated the player.
    pub won: bool,
    pub survival_ticks: u64,
    pub damage_dealt: u32,
    pub damage_taken: u32,
}

impl OutcomeRecord {
    /// Signed performance score; losses are negative.
    pub fn score(&self) -> f64 {
        let result = if self.won { 50.0 } else { -50.0 };
        let trade = (f64::from(self.damage_dealt) - f64::from(self.damage_taken)) * 0.5;
        let endurance = (self.survival_ticks.min(300) as f64) * 0.05;
        result + trade + endurance
    }
}

/// Bounded history of recent encounters, oldest evicted first.
#[derive(Clone, Debug, PartialEq)]
pub struct OutcomeHistory {
    capacity: usize,
    records: VecDeque<OutcomeRecord>,
    /// Records ever pushed, including evicted ones.
    recorded: u64,
}

impl OutcomeHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
            recorded: 0,
        }
    }

    pub fn push(&mut self, record: OutcomeRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
        self.recorded += 1;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.records.iter()
    }

    pub fn win_rate(&self) -> Option<f64> {
        (!self.records.is_empty()).then(|| {
            let wins = self.records.iter().filter(|r| r.won).count();
            wins as f64 / self.records.len() as f64
        })
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(won: bool) -> OutcomeRecord {
        OutcomeRecord {
            loadout: Loadout::default(),
            won,
            survival_ticks: 100,
            damage_dealt: 40,
            damage_taken: 20,
        }
    }

    #[test]
    fn wins_score_above_losses() {
        assert!(record(true).score() > 0.0);
        assert!(record(false).score() < 0.0);
        assert_eq!(record(true).score(), 50.0 + 10.0 + 5.0);
    }

    #[test]
    fn history_is_bounded() {
        let mut history = OutcomeHistory::new(2);
        history.push(record(false));
        history.push(record(true));
        history.push(record(true));
        assert_eq!(history.len(), 2);
        assert_eq!(history.recorded(), 3);
        assert_eq!(history.win_rate(), Some(1.0));
    }
}

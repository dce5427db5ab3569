//! Probabilistic action-type selection.

use rand::Rng;

use engagehub_core::config::scheduler::SelectionProbabilities;
use engagehub_core::types::action::ActionType;

/// Samples which action types to attempt for one candidate.
///
/// Each type is an independent Bernoulli draw against its configured
/// probability, evaluated in the scheduler's fixed order (reply, like,
/// retweet). Selection only shapes engagement diversity; every selected
/// type still passes through admission control individually.
#[derive(Debug, Clone, Copy)]
pub struct ActionSelector {
    probabilities: SelectionProbabilities,
}

impl ActionSelector {
    /// Create a selector with the given per-type probabilities.
    pub fn new(probabilities: SelectionProbabilities) -> Self {
        Self { probabilities }
    }

    fn probability(&self, action: ActionType) -> f64 {
        match action {
            ActionType::Reply => self.probabilities.reply,
            ActionType::Like => self.probabilities.like,
            ActionType::Retweet => self.probabilities.retweet,
        }
    }

    /// Sample the action types to attempt for one candidate.
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ActionType> {
        ActionType::ALL
            .into_iter()
            .filter(|action| {
                let p = self.probability(*action).clamp(0.0, 1.0);
                rng.random_bool(p)
            })
            .collect()
    }
}

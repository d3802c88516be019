//! Strategy roster for the CLI: names map to engine strategies.

use std::time::Duration;

use dodge_core::{DeadlineBackend, HeuristicStrategy, LinearBackend, ModelStrategy, VelocityStrategy};

pub fn strategy_ids() -> Vec<&'static str> {
    vec!["heuristic", "model", "model-deadline"]
}

pub fn describe_strategies() -> Vec<(&'static str, &'static str)> {
    vec![
        ("heuristic", "Closed-form escape vector away from the cursor."),
        ("model", "Built-in linear stand-in model over the observation window."),
        (
            "model-deadline",
            "Stand-in model behind a worker-thread deadline wrapper.",
        ),
    ]
}

/// `deadline_ms` only applies to the deadline-wrapped variant.
pub fn create_strategy(id: &str, deadline_ms: u64) -> Option<Box<dyn VelocityStrategy>> {
    match id {
        "heuristic" => Some(Box::new(HeuristicStrategy::new())),
        "model" => Some(Box::new(ModelStrategy::new(Box::new(LinearBackend::new())))),
        "model-deadline" => {
            let backend = DeadlineBackend::spawn(
                Box::new(LinearBackend::new()),
                Duration::from_millis(deadline_ms.max(1)),
            );
            Some(Box::new(ModelStrategy::new(Box::new(backend))))
        }
        _ => None,
    }
}

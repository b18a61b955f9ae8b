use crate::finance::domain::{FeeItem, FeeItemId, Payment};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Which fee item, if any, a payment is credited to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "feeItemId", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched(FeeItemId),
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MatchRule {
    Registration,
    Tranche(u32),
    Label(Vec<String>),
}

impl MatchRule {
    fn for_item(item: &FeeItem) -> Self {
        if item.is_registration() {
            return Self::Registration;
        }
        if let Some(number) = tranche_number(&item.name) {
            return Self::Tranche(number);
        }

        let labels = std::iter::once(item.name.as_str())
            .chain(item.original_name.as_deref())
            .map(normalize)
            .filter(|label| !label.is_empty())
            .collect();
        Self::Label(labels)
    }

    fn accepts(&self, reason: &str) -> bool {
        match self {
            Self::Registration => reason.contains("inscription"),
            Self::Tranche(number) => {
                mentions_tranche(reason, *number)
                    && (reason.contains("scolarité") || reason.contains("scolarite"))
            }
            Self::Label(labels) => {
                !reason.is_empty()
                    && labels
                        .iter()
                        .any(|label| reason == label || reason.contains(label.as_str()))
            }
        }
    }
}

/// Credits payments to the items of one fee schedule.
///
/// An explicit `fee_item_id` always wins. Legacy payments without a link fall back
/// to reason-text heuristics, and the first item in schedule order that accepts the
/// reason claims the payment.
#[derive(Debug, Clone)]
pub struct ReasonMatcher {
    rules: Vec<(FeeItemId, MatchRule)>,
}

impl ReasonMatcher {
    pub fn for_schedule(schedule: &[FeeItem]) -> Self {
        let rules = schedule
            .iter()
            .map(|item| (item.id.clone(), MatchRule::for_item(item)))
            .collect();
        Self { rules }
    }

    pub fn classify(&self, payment: &Payment) -> MatchOutcome {
        match self.claim(payment) {
            Some(position) => MatchOutcome::Matched(self.rules[position].0.clone()),
            None => MatchOutcome::Unmatched,
        }
    }

    /// Schedule position credited with the payment.
    pub(crate) fn claim(&self, payment: &Payment) -> Option<usize> {
        if let Some(linked) = &payment.fee_item_id {
            return self.rules.iter().position(|(id, _)| id == linked);
        }

        let reason = normalize(&payment.reason);
        self.rules.iter().position(|(_, rule)| rule.accepts(&reason))
    }
}

/// Leading installment number of a label such as "1ère tranche" or "Tranche 3".
pub fn tranche_number(label: &str) -> Option<u32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:tranche\s+)?(\d+)")
            .expect("tranche pattern compiles")
    });

    pattern
        .captures(label)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

fn mentions_tranche(reason: &str, number: u32) -> bool {
    let needle = format!("tranche {number}");
    reason.match_indices(&needle).any(|(start, _)| {
        !reason[start + needle.len()..]
            .chars()
            .next()
            .is_some_and(|next| next.is_ascii_digit())
    })
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

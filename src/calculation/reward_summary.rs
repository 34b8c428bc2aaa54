//! Reward aggregation for a month.

use std::collections::BTreeSet;

use crate::models::{PayPeriod, RewardRecord, RewardSummary};

/// Sums approved rewards dated inside the period.
///
/// `reward_days` counts distinct dates, so two rewards on the same day add
/// both bonuses but only one reward day.
pub fn calculate_reward_summary(rewards: &[RewardRecord], period: &PayPeriod) -> RewardSummary {
    let records: Vec<RewardRecord> = rewards
        .iter()
        .filter(|r| r.is_approved() && period.contains_date(r.date))
        .cloned()
        .collect();

    let days: BTreeSet<_> = records.iter().map(|r| r.date).collect();

    RewardSummary {
        total_bonus: records.iter().map(|r| r.bonus_amount).sum(),
        reward_days: days.len() as u32,
        records,
    }
}

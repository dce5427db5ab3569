//! Admission control: the read-only predicate deciding whether an action is
//! currently permitted for an account.

use std::fmt;

use serde::Serialize;

use engagehub_core::types::action::ActionType;
use engagehub_core::types::id::AccountId;
use engagehub_entity::state::QuotaState;

/// Why an action was not admitted.
///
/// Denials are normal control flow, not errors: the scheduler consumes the
/// reason to skip or defer, and operators see the `Display` text directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DenialReason {
    /// The account is unknown or soft-deactivated.
    NotConnected,
    /// The global pack has no remaining actions.
    PackExhausted,
    /// The account has used up its share of the global pack.
    IndividualQuotaExhausted,
    /// The shared daily ceiling is reached.
    GlobalDailyReached,
    /// The account's daily share is reached across all types.
    IndividualDailyReached,
    /// The account's daily sub-quota for this type is reached.
    TypeQuotaExhausted(ActionType),
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "account not connected or inactive"),
            Self::PackExhausted => write!(f, "global pack exhausted"),
            Self::IndividualQuotaExhausted => write!(f, "individual quota exhausted"),
            Self::GlobalDailyReached => write!(f, "global daily limit reached"),
            Self::IndividualDailyReached => write!(f, "individual daily limit reached"),
            Self::TypeQuotaExhausted(action) => {
                write!(f, "daily quota exhausted for {action}")
            }
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdmissionDecision {
    /// The action may be performed right now.
    Allowed,
    /// The action is not permitted, with the first failing check as reason.
    Denied(DenialReason),
}

impl AdmissionDecision {
    /// Whether the action is admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// The denial reason, if denied.
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(*reason),
        }
    }
}

/// Evaluate whether `account_id` may perform `action` right now.
///
/// Pure read-only predicate over a state snapshot — callers can probe
/// several action types before choosing one without side effects. Assumes
/// the daily counters have already been rolled over to the current day
/// (the engine runs the lazy reset before taking the snapshot).
///
/// Checks run in a fixed order and the first failure is the reported
/// reason:
///
/// 1. account exists and is active
/// 2. global pack has remaining actions
/// 3. account is below its share of the pack
/// 4. shared daily ceiling not reached
/// 5. account below its daily share across all types
/// 6. account below its per-type daily sub-quota
pub fn check(state: &QuotaState, account_id: &AccountId, action: ActionType) -> AdmissionDecision {
    let Some(account) = state.account(account_id).filter(|a| a.is_active) else {
        return AdmissionDecision::Denied(DenialReason::NotConnected);
    };

    if state.global_pack.remaining_actions == 0 {
        return AdmissionDecision::Denied(DenialReason::PackExhausted);
    }

    if account.actions_used >= state.allocation.per_account_quota {
        return AdmissionDecision::Denied(DenialReason::IndividualQuotaExhausted);
    }

    if state.daily_quota.used_today >= state.daily_quota.daily_limit {
        return AdmissionDecision::Denied(DenialReason::GlobalDailyReached);
    }

    if account.daily_used.total() >= state.allocation.per_account_daily {
        return AdmissionDecision::Denied(DenialReason::IndividualDailyReached);
    }

    let type_quota = state
        .allocation
        .per_type_daily_quota(&state.daily_quota.distribution, action);
    if account.daily_used.get(action) >= type_quota {
        return AdmissionDecision::Denied(DenialReason::TypeQuotaExhausted(action));
    }

    AdmissionDecision::Allowed
}

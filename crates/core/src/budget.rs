//! Campaign spend governance.
//!
//! One ledger per campaign, mutated only through [`BudgetGovernor::reserve`]
//! and [`BudgetGovernor::release`]. Reserve and release for the same campaign
//! serialize on that campaign's lock; different campaigns never contend. A
//! ledger can never go negative: a reservation larger than the remaining
//! balance is denied, it is not partially granted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;

/// Errors from ledger operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BudgetError {
    /// Requested spend exceeds the remaining campaign balance.
    #[error("budget exceeded: requested ${requested:.2} but only ${available:.2} available")]
    Exceeded { requested: f64, available: f64 },

    /// Amount failed validation before reaching the ledger.
    #[error("invalid spend amount: {0}")]
    InvalidAmount(String),

    /// No ledger has been opened for this campaign.
    #[error("unknown campaign: {0}")]
    UnknownCampaign(String),

    /// A ledger for this campaign is already open.
    #[error("campaign ledger already open: {0}")]
    AlreadyOpen(String),
}

/// Per-campaign spend ledgers with atomic reserve/release.
#[derive(Debug, Default)]
pub struct BudgetGovernor {
    ledgers: RwLock<HashMap<String, Arc<Mutex<f64>>>>,
}

impl BudgetGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a campaign ledger with its initial balance.
    pub fn open(&self, campaign_id: &str, initial: f64) -> Result<(), BudgetError> {
        validate_amount(initial)?;
        let mut ledgers = self.ledgers.write().expect("budget ledger lock poisoned");
        if ledgers.contains_key(campaign_id) {
            return Err(BudgetError::AlreadyOpen(campaign_id.to_string()));
        }
        ledgers.insert(campaign_id.to_string(), Arc::new(Mutex::new(initial)));
        Ok(())
    }

    /// Reserve `amount` from the campaign balance.
    ///
    /// Either the full amount is debited and the new balance is returned, or
    /// the call fails with [`BudgetError::Exceeded`] carrying what was asked
    /// and what is left.
    pub fn reserve(&self, campaign_id: &str, amount: f64) -> Result<f64, BudgetError> {
        validate_amount(amount)?;
        let ledger = self.ledger(campaign_id)?;
        let mut balance = ledger.lock().expect("campaign ledger poisoned");
        if *balance >= amount {
            *balance -= amount;
            Ok(*balance)
        } else {
            Err(BudgetError::Exceeded {
                requested: amount,
                available: *balance,
            })
        }
    }

    /// Return an unused reservation (or part of one) to the campaign balance.
    pub fn release(&self, campaign_id: &str, amount: f64) -> Result<(), BudgetError> {
        validate_amount(amount)?;
        let ledger = self.ledger(campaign_id)?;
        let mut balance = ledger.lock().expect("campaign ledger poisoned");
        *balance += amount;
        Ok(())
    }

    /// Remaining balance for a campaign, if its ledger is open.
    pub fn available(&self, campaign_id: &str) -> Option<f64> {
        let ledgers = self.ledgers.read().expect("budget ledger lock poisoned");
        ledgers
            .get(campaign_id)
            .map(|ledger| *ledger.lock().expect("campaign ledger poisoned"))
    }

    fn ledger(&self, campaign_id: &str) -> Result<Arc<Mutex<f64>>, BudgetError> {
        let ledgers = self.ledgers.read().expect("budget ledger lock poisoned");
        ledgers
            .get(campaign_id)
            .map(Arc::clone)
            .ok_or_else(|| BudgetError::UnknownCampaign(campaign_id.to_string()))
    }
}

fn validate_amount(amount: f64) -> Result<(), BudgetError> {
    if amount.is_nan() {
        return Err(BudgetError::InvalidAmount("NaN".to_string()));
    }
    if amount.is_infinite() {
        return Err(BudgetError::InvalidAmount("infinite".to_string()));
    }
    if amount < 0.0 {
        return Err(BudgetError::InvalidAmount(format!(
            "must be non-negative, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_available() {
        let governor = BudgetGovernor::new();
        governor.open("c-1", 10.0).unwrap();
        assert_eq!(governor.available("c-1"), Some(10.0));
        assert_eq!(governor.available("c-2"), None);
    }

    #[test]
    fn test_reopen_is_rejected() {
        let governor = BudgetGovernor::new();
        governor.open("c-1", 10.0).unwrap();
        let err = governor.open("c-1", 99.0).unwrap_err();
        assert_eq!(err, BudgetError::AlreadyOpen("c-1".to_string()));
        assert_eq!(governor.available("c-1"), Some(10.0));
    }

    #[test]
    fn test_reserve_debits_and_reports_the_balance() {
        let governor = BudgetGovernor::new();
        governor.open("c-1", 10.0).unwrap();
        let remaining = governor.reserve("c-1", 4.0).unwrap();
        assert_eq!(remaining, 6.0);
        assert_eq!(governor.available("c-1"), Some(6.0));
    }

    #[test]
    fn test_denial_reports_requested_and_available() {
        let governor = BudgetGovernor::new();
        governor.open("c-1", 10.0).unwrap();
        governor.reserve("c-1", 4.0).unwrap();
        governor.reserve("c-1", 4.0).unwrap();

        let err = governor.reserve("c-1", 4.0).unwrap_err();
        assert_eq!(
            err,
            BudgetError::Exceeded {
                requested: 4.0,
                available: 2.0,
            }
        );
        assert_eq!(
            err.to_string(),
            "budget exceeded: requested $4.00 but only $2.00 available"
        );
        // A denied reservation must not touch the balance.
        assert_eq!(governor.available("c-1"), Some(2.0));
    }

    #[test]
    fn test_reserve_exact_remaining_balance() {
        let governor = BudgetGovernor::new();
        governor.open("c-1", 4.0).unwrap();
        governor.reserve("c-1", 4.0).unwrap();
        assert_eq!(governor.available("c-1"), Some(0.0));

        let err = governor.reserve("c-1", 0.01).unwrap_err();
        assert_eq!(
            err,
            BudgetError::Exceeded {
                requested: 0.01,
                available: 0.0,
            }
        );
    }

    #[test]
    fn test_zero_amount_reservation_is_allowed() {
        let governor = BudgetGovernor::new();
        governor.open("c-1", 1.0).unwrap();
        governor.reserve("c-1", 0.0).unwrap();
        assert_eq!(governor.available("c-1"), Some(1.0));
    }

    #[test]
    fn test_invalid_amounts_never_reach_the_ledger() {
        let governor = BudgetGovernor::new();
        governor.open("c-1", 10.0).unwrap();

        assert!(matches!(
            governor.reserve("c-1", f64::NAN),
            Err(BudgetError::InvalidAmount(_))
        ));
        assert!(matches!(
            governor.reserve("c-1", f64::INFINITY),
            Err(BudgetError::InvalidAmount(_))
        ));
        assert!(matches!(
            governor.reserve("c-1", -1.0),
            Err(BudgetError::InvalidAmount(_))
        ));
        assert!(matches!(
            governor.release("c-1", -1.0),
            Err(BudgetError::InvalidAmount(_))
        ));
        assert!(matches!(
            governor.open("c-2", f64::NAN),
            Err(BudgetError::InvalidAmount(_))
        ));
        assert_eq!(governor.available("c-1"), Some(10.0));
    }

    #[test]
    fn test_release_returns_funds() {
        let governor = BudgetGovernor::new();
        governor.open("c-1", 10.0).unwrap();
        governor.reserve("c-1", 4.0).unwrap();
        governor.release("c-1", 1.5).unwrap();
        assert_eq!(governor.available("c-1"), Some(7.5));
    }

    #[test]
    fn test_balance_equals_initial_minus_net_reservations() {
        let governor = BudgetGovernor::new();
        governor.open("c-1", 100.0).unwrap();

        governor.reserve("c-1", 30.0).unwrap();
        governor.release("c-1", 10.0).unwrap();
        governor.reserve("c-1", 25.0).unwrap();
        governor.release("c-1", 5.0).unwrap();

        // 100 - (30 - 10 + 25 - 5)
        assert_eq!(governor.available("c-1"), Some(60.0));
    }

    #[test]
    fn test_unknown_campaign_is_not_a_zero_balance() {
        let governor = BudgetGovernor::new();
        assert_eq!(
            governor.reserve("ghost", 1.0).unwrap_err(),
            BudgetError::UnknownCampaign("ghost".to_string())
        );
        assert_eq!(
            governor.release("ghost", 1.0).unwrap_err(),
            BudgetError::UnknownCampaign("ghost".to_string())
        );
    }

    #[test]
    fn test_campaign_ledgers_are_independent() {
        let governor = BudgetGovernor::new();
        governor.open("c-1", 10.0).unwrap();
        governor.open("c-2", 20.0).unwrap();

        governor.reserve("c-1", 10.0).unwrap();
        assert_eq!(governor.available("c-1"), Some(0.0));
        assert_eq!(governor.available("c-2"), Some(20.0));
    }

    #[test]
    fn test_concurrent_reserves_never_overspend() {
        let governor = std::sync::Arc::new(BudgetGovernor::new());
        governor.open("c-1", 10.0).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let governor = std::sync::Arc::clone(&governor);
            handles.push(std::thread::spawn(move || {
                governor.reserve("c-1", 4.0).is_ok()
            }));
        }

        let granted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(granted, 2, "only two $4 reservations fit in $10");
        assert_eq!(governor.available("c-1"), Some(2.0));
    }
}

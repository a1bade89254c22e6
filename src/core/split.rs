//! Per-participant amounts for an itemised bill.
//!
//! Items are divided among their sharers in cents, tax and service charge are
//! spread in proportion to each participant's items subtotal, and the rounded
//! amounts are reconciled so they add up to the bill total exactly.

use crate::constants::MAX_SHARE_WEIGHT;
use crate::core::errors::BillSplitError;
use crate::core::models::{Assignment, Bill, ItemAllocation, ParticipantShare, SplitResult, round_cents};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};
use utoipa::ToSchema;

/// What to do when a bill's totals do not add up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InconsistencyPolicy {
    /// Log a warning and split anyway
    #[default]
    Warn,
    Reject,
}

impl FromStr for InconsistencyPolicy {
    type Err = BillSplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(InconsistencyPolicy::Warn),
            "reject" => Ok(InconsistencyPolicy::Reject),
            other => Err(BillSplitError::invalid_input(
                "policy",
                "Invalid Policy",
                format!("`{}` is not one of warn, reject", other),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitOptions {
    /// Largest difference between bill totals still treated as rounding
    pub tolerance: Decimal,
    pub policy: InconsistencyPolicy,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            tolerance: Decimal::new(5, 2),
            policy: InconsistencyPolicy::Warn,
        }
    }
}

/// Splits `bill` according to `assignment` with the default options.
pub fn compute_shares(bill: &Bill, assignment: &Assignment) -> Result<SplitResult, BillSplitError> {
    compute_shares_with(bill, assignment, &SplitOptions::default())
}

pub fn compute_shares_with(
    bill: &Bill,
    assignment: &Assignment,
    options: &SplitOptions,
) -> Result<SplitResult, BillSplitError> {
    bill.validate()?;
    validate_assignment(bill, assignment)?;
    let consistent = check_consistency(bill, options)?;

    let mut participants: Vec<String> = Vec::new();
    let mut subtotals: Vec<Decimal> = Vec::new();
    let mut allocations = Vec::new();

    for (index, shares) in assignment.iter() {
        let line_total = bill.items[index].line_total();
        let weight_sum: Decimal = shares.iter().map(|s| s.weight).sum();
        let ratios: Vec<Decimal> = shares.iter().map(|s| s.weight / weight_sum).collect();
        let exact = shares
            .iter()
            .map(|s| proportion(line_total, s.weight, weight_sum))
            .collect::<Result<Vec<_>, _>>()?;
        let amounts = apportion(&exact, line_total);

        for ((share, amount), ratio) in shares.iter().zip(amounts).zip(ratios) {
            let slot = participant_slot(&mut participants, &mut subtotals, &share.participant);
            subtotals[slot] += amount;
            allocations.push(ItemAllocation {
                item_index: index,
                participant: share.participant.clone(),
                amount,
                ratio,
            });
        }
    }

    // Proportional surcharges; a zero subtotal leaves nothing to be proportional to.
    let pool = if bill.subtotal.is_zero() {
        Decimal::ZERO
    } else {
        bill.surcharges()
    };
    let exact_amounts = subtotals
        .iter()
        .map(|subtotal| {
            if bill.subtotal.is_zero() {
                Ok(*subtotal)
            } else {
                Ok(*subtotal + proportion(pool, *subtotal, bill.subtotal)?)
            }
        })
        .collect::<Result<Vec<Decimal>, BillSplitError>>()?;

    let target = if consistent && !bill.subtotal.is_zero() {
        round_cents(bill.total)
    } else {
        round_cents(exact_amounts.iter().copied().sum())
    };
    let amounts = apportion(&exact_amounts, target);

    let shares: Vec<ParticipantShare> = participants
        .into_iter()
        .zip(subtotals)
        .zip(amounts)
        .map(|((participant, items_subtotal), amount)| ParticipantShare {
            participant,
            items_subtotal,
            surcharge: amount - items_subtotal,
            amount,
        })
        .collect();

    debug!(
        "Split {} items across {} participants, total {}",
        bill.items.len(),
        shares.len(),
        target
    );

    Ok(SplitResult {
        shares,
        allocations,
        total: target,
    })
}

/// `amount * part / whole`, or an error when the result leaves the decimal range.
fn proportion(amount: Decimal, part: Decimal, whole: Decimal) -> Result<Decimal, BillSplitError> {
    amount
        .checked_mul(part)
        .and_then(|scaled| scaled.checked_div(whole))
        .ok_or_else(|| {
            BillSplitError::invalid_input(
                "bill",
                "Amount Out Of Range",
                format!("{} x {} / {} is out of range", amount, part, whole),
            )
        })
}

fn participant_slot(participants: &mut Vec<String>, subtotals: &mut Vec<Decimal>, name: &str) -> usize {
    match participants.iter().position(|p| p == name) {
        Some(slot) => slot,
        None => {
            participants.push(name.to_string());
            subtotals.push(Decimal::ZERO);
            participants.len() - 1
        }
    }
}

fn validate_assignment(bill: &Bill, assignment: &Assignment) -> Result<(), BillSplitError> {
    for (index, shares) in assignment.iter() {
        let item = bill.items.get(index).ok_or_else(|| {
            BillSplitError::InvalidAssignment(format!(
                "item {} does not exist, the bill has {} items",
                index,
                bill.items.len()
            ))
        })?;
        if shares.is_empty() {
            return Err(BillSplitError::InvalidAssignment(format!(
                "item {} ({}) has no participants",
                index, item.name
            )));
        }
        if let Some(share) = shares.iter().find(|s| s.weight <= Decimal::ZERO) {
            return Err(BillSplitError::InvalidAssignment(format!(
                "{} has a non-positive weight {} on item {} ({})",
                share.participant, share.weight, index, item.name
            )));
        }
        if let Some(share) = shares.iter().find(|s| s.weight > Decimal::from(MAX_SHARE_WEIGHT)) {
            return Err(BillSplitError::InvalidAssignment(format!(
                "{} has weight {} on item {} ({}), above the limit of {}",
                share.participant, share.weight, index, item.name, MAX_SHARE_WEIGHT
            )));
        }
        if shares.iter().any(|s| s.participant.trim().is_empty()) {
            return Err(BillSplitError::InvalidAssignment(format!(
                "item {} ({}) has a blank participant",
                index, item.name
            )));
        }
    }

    for (index, item) in bill.items.iter().enumerate() {
        if assignment.shares_for(index).is_none() {
            return Err(BillSplitError::InvalidAssignment(format!(
                "item {} ({}) is not assigned to anyone",
                index, item.name
            )));
        }
    }
    Ok(())
}

/// Returns whether the bill is consistent; under `Reject` an inconsistency is an error.
fn check_consistency(bill: &Bill, options: &SplitOptions) -> Result<bool, BillSplitError> {
    let mut consistent = true;

    if !bill.items_reconcile(options.tolerance) {
        consistent = false;
        flag_discrepancy(options.policy, "item lines vs subtotal", bill.subtotal, bill.items_subtotal())?;
    }
    if !bill.total_reconciles(options.tolerance) {
        consistent = false;
        flag_discrepancy(options.policy, "total vs subtotal + charges", bill.expected_total(), bill.total)?;
    }
    Ok(consistent)
}

fn flag_discrepancy(
    policy: InconsistencyPolicy,
    what: &str,
    expected: Decimal,
    actual: Decimal,
) -> Result<(), BillSplitError> {
    match policy {
        InconsistencyPolicy::Reject => Err(BillSplitError::InconsistentBill { expected, actual }),
        InconsistencyPolicy::Warn => {
            warn!("Bill does not reconcile ({}): expected {}, got {}", what, expected, actual);
            Ok(())
        }
    }
}

/// Rounds each exact amount to cents, then moves single cents until the sum hits `target`.
///
/// Cents are handed out to the amounts that lost the most to rounding first (or taken
/// from those that gained the most); ties go to the earlier position.
pub fn apportion(exact: &[Decimal], target: Decimal) -> Vec<Decimal> {
    let mut rounded: Vec<Decimal> = exact.iter().map(|e| round_cents(*e)).collect();
    if rounded.is_empty() {
        return rounded;
    }

    let mut drift = round_cents(target - rounded.iter().copied().sum::<Decimal>());
    if drift.is_zero() {
        return rounded;
    }

    let residuals: Vec<Decimal> = exact.iter().zip(&rounded).map(|(e, r)| *e - *r).collect();
    let mut order: Vec<usize> = (0..rounded.len()).collect();
    let cent = Decimal::new(1, 2);
    let step = if drift > Decimal::ZERO {
        order.sort_by(|&a, &b| residuals[b].cmp(&residuals[a]));
        cent
    } else {
        order.sort_by(|&a, &b| residuals[a].cmp(&residuals[b]));
        -cent
    };

    let mut turn = 0;
    while !drift.is_zero() {
        rounded[order[turn % order.len()]] += step;
        drift -= step;
        turn += 1;
    }
    rounded
}

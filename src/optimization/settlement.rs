use crate::core::balance::Balances;
use crate::core::money::{round_money, TOLERANCE};
use crate::core::participant::{display_name, Participant, ParticipantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single recommended transfer that closes part of the group's imbalance.
///
/// `from` and `to` are display names (or the raw id when the participant
/// is unknown); `from_id` and `to_id` keep the identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: String,
    pub to: String,
    pub from_id: ParticipantId,
    pub to_id: ParticipantId,
    pub amount: Decimal,
}

/// A debtor or creditor with the amount still to be matched.
#[derive(Debug, Clone)]
struct OpenPosition {
    id: ParticipantId,
    remaining: Decimal,
}

/// Greedy debt-reduction: reduces net balances to a short list of transfers.
pub struct SettlementMinimizer;

impl SettlementMinimizer {
    /// Turn net balances into pairwise settlements.
    ///
    /// # Algorithm
    ///
    /// 1. Round every balance to cents and drop those within one cent of zero.
    /// 2. Split the rest into debtors (owed amount stored positive) and creditors.
    /// 3. Sort both descending by amount. The sort is stable, so equal
    ///    amounts keep balance order.
    /// 4. Walk both lists with one index each: settle
    ///    `min(debtor, creditor)`, then advance whichever side dropped below
    ///    one cent.
    ///
    /// Every step retires at least one party, so a group with `n` non-zero
    /// balances gets at most `n - 1` settlements. This is a heuristic; it
    /// does not always find the fewest possible transfers.
    pub fn minimize(balances: &Balances, participants: &[Participant]) -> Vec<Settlement> {
        let (debtors, creditors) = Self::open_positions(balances);
        Self::match_positions(debtors, creditors, participants)
    }

    /// Rounded debtors and creditors, in balance order.
    fn open_positions(balances: &Balances) -> (Vec<OpenPosition>, Vec<OpenPosition>) {
        let mut debtors: Vec<OpenPosition> = Vec::new();
        let mut creditors: Vec<OpenPosition> = Vec::new();

        for (id, amount) in balances.iter() {
            let rounded = round_money(amount);
            if rounded < -TOLERANCE {
                debtors.push(OpenPosition {
                    id: id.clone(),
                    remaining: -rounded,
                });
            } else if rounded > TOLERANCE {
                creditors.push(OpenPosition {
                    id: id.clone(),
                    remaining: rounded,
                });
            }
        }
        (debtors, creditors)
    }

    fn match_positions(
        mut debtors: Vec<OpenPosition>,
        mut creditors: Vec<OpenPosition>,
        participants: &[Participant],
    ) -> Vec<Settlement> {
        debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
        creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

        let mut settlements = Vec::with_capacity(debtors.len() + creditors.len());
        let (mut d, mut c) = (0, 0);
        while d < debtors.len() && c < creditors.len() {
            let amount = debtors[d].remaining.min(creditors[c].remaining);
            settlements.push(Settlement {
                from: display_name(&debtors[d].id, participants),
                to: display_name(&creditors[c].id, participants),
                from_id: debtors[d].id.clone(),
                to_id: creditors[c].id.clone(),
                amount,
            });

            debtors[d].remaining -= amount;
            creditors[c].remaining -= amount;

            if debtors[d].remaining < TOLERANCE {
                d += 1;
            }
            if creditors[c].remaining < TOLERANCE {
                c += 1;
            }
        }

        log::debug!(
            "{} debtors and {} creditors reduced to {} settlements",
            debtors.len(),
            creditors.len(),
            settlements.len()
        );
        settlements
    }
}

/// Free-function form of [`SettlementMinimizer::minimize`].
pub fn minimize_transactions(balances: &Balances, participants: &[Participant]) -> Vec<Settlement> {
    SettlementMinimizer::minimize(balances, participants)
}

/// Settlements together with summary figures for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPlan {
    settlements: Vec<Settlement>,
    total_transferred: Decimal,
    debtor_count: usize,
    creditor_count: usize,
}

impl SettlementPlan {
    pub fn from_balances(balances: &Balances, participants: &[Participant]) -> Self {
        let (debtors, creditors) = SettlementMinimizer::open_positions(balances);
        let (debtor_count, creditor_count) = (debtors.len(), creditors.len());
        let settlements = SettlementMinimizer::match_positions(debtors, creditors, participants);
        let total_transferred = settlements.iter().map(|s| s.amount).sum();
        Self {
            settlements,
            total_transferred,
            debtor_count,
            creditor_count,
        }
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    pub fn into_settlements(self) -> Vec<Settlement> {
        self.settlements
    }

    /// Total money changing hands.
    pub fn total_transferred(&self) -> Decimal {
        self.total_transferred
    }

    pub fn debtor_count(&self) -> usize {
        self.debtor_count
    }

    pub fn creditor_count(&self) -> usize {
        self.creditor_count
    }

    /// True when nobody owes anything.
    pub fn is_settled(&self) -> bool {
        self.settlements.is_empty()
    }
}

impl fmt::Display for SettlementPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Settlements ===")?;
        if self.is_settled() {
            return writeln!(f, "No settlements needed. Everyone is square!");
        }
        for s in &self.settlements {
            writeln!(f, "  {} → {}: {}", s.from, s.to, s.amount)?;
        }
        writeln!(f, "Transfers:      {}", self.settlements.len())?;
        writeln!(f, "Total moved:    {}", self.total_transferred)?;
        writeln!(f, "Debtors:        {}", self.debtor_count)?;
        writeln!(f, "Creditors:      {}", self.creditor_count)
    }
}

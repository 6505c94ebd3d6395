use crate::core::fixed::{MathError, Wad};
use log::debug;
use serde::{Deserialize, Serialize};

/// Append-only sequence of cumulative debt-pool scaling factors.
///
/// One entry is appended every time the total pool value changes (an issue,
/// a burn, or an external revaluation). Each entry is the previous entry
/// multiplied by `previous_total / new_total`, so the cumulative value
/// shrinks as the pool grows and grows as the pool shrinks. An account
/// whose ownership fraction was recorded at entry `i` rescales it to the
/// present by multiplying with `last_value / value_at(i)` — no per-account
/// write is ever needed for other accounts' events.
///
/// Entries are never mutated in place and the ledger never shrinks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtLedger {
    entries: Vec<Wad>,
}

impl DebtLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change of the total pool value from `previous_total` to
    /// `new_total`, appending one cumulative entry.
    ///
    /// An empty pool starting up (previous total zero) appends the
    /// multiplicative identity as a fresh anchor; a pool draining to zero
    /// appends zero. Compounding off a zero entry would wedge the ledger,
    /// which is why a restart re-anchors at one instead.
    pub fn append(&mut self, new_total: Wad, previous_total: Wad) -> Result<(), MathError> {
        let entry = if previous_total.is_zero() {
            Wad::ONE
        } else if new_total.is_zero() {
            Wad::ZERO
        } else {
            let delta = previous_total.divide_decimal(new_total)?;
            self.last_value().multiply_decimal(delta)?
        };
        debug!(
            "debt ledger entry {}: {} (pool {} -> {})",
            self.entries.len(),
            entry,
            previous_total,
            new_total
        );
        self.entries.push(entry);
        Ok(())
    }

    /// Cumulative value at a given entry index. O(1).
    pub fn cumulative_value_at(&self, index: usize) -> Option<Wad> {
        self.entries.get(index).copied()
    }

    /// The most recent cumulative value; the identity for an empty ledger.
    pub fn last_value(&self) -> Wad {
        self.entries.last().copied().unwrap_or(Wad::ONE)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_entry_is_identity() {
        let mut ledger = DebtLedger::new();
        ledger.append(Wad::from_int(2000), Wad::ZERO).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.cumulative_value_at(0), Some(Wad::ONE));
    }

    #[test]
    fn test_growth_shrinks_cumulative_value() {
        let mut ledger = DebtLedger::new();
        // Pool: 0 -> 10 -> 30.
        ledger.append(Wad::from_int(10), Wad::ZERO).unwrap();
        ledger.append(Wad::from_int(30), Wad::from_int(10)).unwrap();

        // 10/30 truncated.
        assert_eq!(
            ledger.last_value().raw(),
            333_333_333_333_333_333
        );
        // An account anchored at entry 0 with fraction 1 now owns 1/3.
        let rescaled = Wad::ONE
            .multiply_decimal(ledger.last_value())
            .unwrap()
            .divide_decimal(ledger.cumulative_value_at(0).unwrap())
            .unwrap();
        assert_eq!(rescaled.raw(), 333_333_333_333_333_333);
    }

    #[test]
    fn test_shrink_grows_cumulative_value() {
        let mut ledger = DebtLedger::new();
        // Pool: 0 -> 2000 -> 500.
        ledger.append(Wad::from_int(2000), Wad::ZERO).unwrap();
        ledger
            .append(Wad::from_int(500), Wad::from_int(2000))
            .unwrap();
        assert_eq!(ledger.last_value(), Wad::from_int(4));
    }

    #[test]
    fn test_drain_and_restart() {
        let mut ledger = DebtLedger::new();
        ledger.append(Wad::from_int(100), Wad::ZERO).unwrap();
        ledger.append(Wad::ZERO, Wad::from_int(100)).unwrap();
        assert_eq!(ledger.last_value(), Wad::ZERO);

        // A fresh pool re-anchors at the identity rather than compounding
        // off the zero entry.
        ledger.append(Wad::from_int(50), Wad::ZERO).unwrap();
        assert_eq!(ledger.last_value(), Wad::ONE);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_length_never_decreases() {
        let mut ledger = DebtLedger::new();
        let mut previous = Wad::ZERO;
        for total in [10u64, 30, 5, 5, 0, 7] {
            let total = Wad::from_int(total);
            let before = ledger.len();
            ledger.append(total, previous).unwrap();
            assert_eq!(ledger.len(), before + 1);
            previous = total;
        }
    }
}

use crate::policy::FieldPolicyTable;
use std::collections::BTreeMap;

/// Remaining uniqueness retries per generated field, for one save invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: BTreeMap<String, u32>,
}

impl RetryBudget {
    pub fn from_table(table: &FieldPolicyTable) -> Self {
        Self {
            remaining: table
                .fields()
                .iter()
                .map(|field| (field.name().to_string(), field.retries()))
                .collect(),
        }
    }

    /// Zero for fields the table does not declare.
    pub fn remaining(&self, field: &str) -> u32 {
        self.remaining.get(field).copied().unwrap_or(0)
    }

    /// Spends one retry for `field`. Returns `false` once the budget is spent.
    pub fn try_consume(&mut self, field: &str) -> bool {
        match self.remaining.get_mut(field) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ShortIdGenerator;
    use crate::policy::GeneratedField;
    use std::sync::Arc;

    #[test]
    fn test_budget_never_goes_negative() {
        let table = FieldPolicyTable::builder("doc")
            .generated(
                "_id",
                GeneratedField::new(Arc::new(ShortIdGenerator)).retries(2),
            )
            .build()
            .unwrap();
        let mut budget = RetryBudget::from_table(&table);

        assert!(budget.try_consume("_id"));
        assert!(budget.try_consume("_id"));
        assert!(!budget.try_consume("_id"));
        assert_eq!(budget.remaining("_id"), 0);
    }

    #[test]
    fn test_unknown_field_has_no_budget() {
        let table = FieldPolicyTable::builder("doc").build().unwrap();
        let mut budget = RetryBudget::from_table(&table);
        assert_eq!(budget.remaining("num"), 0);
        assert!(!budget.try_consume("num"));
    }
}

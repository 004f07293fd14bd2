use serde::Serialize;

use super::domain::Expense;

/// Running totals of the estate expenses logged against an application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ExpenseLedger {
    pub count: usize,
    pub total: f64,
}

impl ExpenseLedger {
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        Self {
            count: expenses.len(),
            total: expenses.iter().map(|expense| expense.value).sum(),
        }
    }
}

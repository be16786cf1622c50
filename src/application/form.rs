//! Validation of user-entered values before they are handed to the service.

use chrono::{NaiveDate, Utc};

use crate::domain::{Cents, NewDeposit, NewExpense, parse_cents};

use super::AppError;

pub const MISSING_DESCRIPTION: &str = "Please add a short description.";
pub const INVALID_AMOUNT: &str = "Enter a valid amount greater than zero.";
pub const MISSING_DATE: &str = "Please select a date.";
pub const INVALID_DATE: &str = "Enter the date as YYYY-MM-DD.";

/// Raw expense input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub description: String,
    pub amount: String,
    /// ISO date. `None` means the field was left at its default (today).
    pub date: Option<String>,
}

/// Raw deposit input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct DepositForm {
    pub amount: String,
    pub date: Option<String>,
    pub description: Option<String>,
}

impl ExpenseForm {
    pub fn validate(&self) -> Result<NewExpense, AppError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(AppError::InvalidInput(MISSING_DESCRIPTION.into()));
        }
        let amount = parse_amount(&self.amount)?;
        let date = parse_date(self.date.as_deref())?;

        Ok(NewExpense {
            description: description.to_string(),
            amount,
            date,
        })
    }
}

impl DepositForm {
    pub fn validate(&self) -> Result<NewDeposit, AppError> {
        let amount = parse_amount(&self.amount)?;
        let date = parse_date(self.date.as_deref())?;

        let mut deposit = NewDeposit::new(amount, date);
        if let Some(desc) = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            deposit = deposit.with_description(desc);
        }
        Ok(deposit)
    }
}

/// Parse a strictly positive amount.
pub fn parse_amount(input: &str) -> Result<Cents, AppError> {
    match parse_cents(input) {
        Ok(cents) if cents > 0 => Ok(cents),
        _ => Err(AppError::InvalidInput(INVALID_AMOUNT.into())),
    }
}

/// Parse an ISO calendar date, defaulting to today when no value was given.
pub fn parse_date(input: Option<&str>) -> Result<NaiveDate, AppError> {
    match input.map(str::trim) {
        None => Ok(Utc::now().date_naive()),
        Some("") => Err(AppError::InvalidInput(MISSING_DATE.into())),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidInput(INVALID_DATE.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: AppError) -> String {
        err.to_string()
    }

    #[test]
    fn test_valid_expense_is_trimmed() {
        let form = ExpenseForm {
            description: "  Groceries ".into(),
            amount: "500".into(),
            date: Some("2026-01-12".into()),
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.description, "Groceries");
        assert_eq!(draft.amount, 50000);
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
    }

    #[test]
    fn test_expense_requires_description() {
        let form = ExpenseForm {
            description: "   ".into(),
            amount: "10".into(),
            date: Some("2026-01-12".into()),
        };
        assert_eq!(message(form.validate().unwrap_err()), MISSING_DESCRIPTION);
    }

    #[test]
    fn test_amount_must_be_positive_number() {
        for bad in ["", "0", "-5", "abc", "NaN", "Infinity", "1e3", "+5", "0x10"] {
            let form = DepositForm {
                amount: bad.into(),
                date: Some("2026-01-04".into()),
                description: None,
            };
            assert_eq!(message(form.validate().unwrap_err()), INVALID_AMOUNT, "{bad}");
        }
    }

    #[test]
    fn test_empty_date_is_rejected_and_missing_date_defaults_to_today() {
        let form = DepositForm {
            amount: "100".into(),
            date: Some("".into()),
            description: None,
        };
        assert_eq!(message(form.validate().unwrap_err()), MISSING_DATE);

        let form = DepositForm {
            amount: "100".into(),
            date: None,
            description: None,
        };
        assert_eq!(form.validate().unwrap().date, Utc::now().date_naive());
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let form = ExpenseForm {
            description: "Taxi".into(),
            amount: "10".into(),
            date: Some("12/01/2026".into()),
        };
        assert_eq!(message(form.validate().unwrap_err()), INVALID_DATE);
    }

    #[test]
    fn test_deposit_description_is_optional() {
        let form = DepositForm {
            amount: "50000".into(),
            date: Some("2026-01-04".into()),
            description: Some("  ".into()),
        };
        assert_eq!(form.validate().unwrap().description, None);

        let form = DepositForm {
            description: Some("Salary".into()),
            ..form
        };
        assert_eq!(form.validate().unwrap().description.as_deref(), Some("Salary"));
    }
}

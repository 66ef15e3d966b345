use std::collections::BTreeMap;

use crate::loan::{LoanDraft, LoanPurpose, PaymentEstimate};

pub const MIN_AMOUNT: u64 = 1_000;
pub const MAX_AMOUNT: u64 = 5_000_000;
pub const MIN_TERM: u64 = 1;
pub const MAX_TERM: u64 = 60;
pub const MIN_MONTHLY_INCOME: u64 = 1_000;

/// A field of the loan application form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoanField {
    Amount,
    Term,
    Purpose,
    MonthlyIncome,
}

impl LoanField {
    /// Wire name of the field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amount => "loan_amount",
            Self::Term => "loan_term",
            Self::Purpose => "loan_purpose",
            Self::MonthlyIncome => "monthly_income",
        }
    }
}

impl std::fmt::Display for LoanField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-level violations. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<LoanField, &'static str>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Violation message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: LoanField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LoanField, &'static str)> + '_ {
        self.0.iter().map(|(f, m)| (*f, *m))
    }

    fn insert(&mut self, field: LoanField, message: &'static str) {
        self.0.insert(field, message);
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Loan application form values exactly as typed.
///
/// Numeric fields accept grouped input such as `"100 000"`; everything but
/// digits is dropped before bounds are checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanApplicationForm {
    pub amount: String,
    pub term: String,
    pub purpose: String,
    pub monthly_income: String,
}

impl LoanApplicationForm {
    #[must_use]
    pub fn new(
        amount: impl Into<String>,
        term: impl Into<String>,
        purpose: impl Into<String>,
        monthly_income: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            term: term.into(),
            purpose: purpose.into(),
            monthly_income: monthly_income.into(),
        }
    }

    /// Check every field; see [`validate`].
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        validate(self)
    }

    /// Convert into a [`LoanDraft`] if and only if every field is valid.
    ///
    /// # Errors
    ///
    /// Returns the full set of violations otherwise.
    pub fn into_draft(self) -> Result<LoanDraft, ValidationErrors> {
        let errors = validate(&self);
        if !errors.is_empty() {
            return Err(errors);
        }
        let (Ok(loan_term), Ok(loan_purpose)) = (
            u32::try_from(normalize(&self.term)),
            self.purpose.parse::<LoanPurpose>(),
        ) else {
            // Validation already checked both conversions.
            return Err(errors);
        };
        Ok(LoanDraft {
            loan_amount: normalize(&self.amount),
            loan_term,
            loan_purpose,
            monthly_income: normalize(&self.monthly_income),
        })
    }

    /// Live repayment preview shown while the form is being filled in.
    ///
    /// `None` until both amount and term hold a positive number.
    #[must_use]
    pub fn estimate(&self) -> Option<PaymentEstimate> {
        let amount = normalize(&self.amount);
        let term = u32::try_from(normalize(&self.term)).ok()?;
        if amount == 0 {
            return None;
        }
        PaymentEstimate::new(amount, term)
    }
}

/// Validate a loan application form.
///
/// - amount: `[1 000, 5 000 000]`
/// - term: `[1, 60]` months
/// - purpose: one of [`LoanPurpose::ALL`]
/// - monthly income: at least `1 000`
#[must_use]
pub fn validate(form: &LoanApplicationForm) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    let amount = normalize(&form.amount);
    if amount < MIN_AMOUNT {
        errors.insert(LoanField::Amount, "Minimum loan amount: 1 000 ₽");
    } else if amount > MAX_AMOUNT {
        errors.insert(LoanField::Amount, "Maximum loan amount: 5 000 000 ₽");
    }

    let term = normalize(&form.term);
    if term < MIN_TERM {
        errors.insert(LoanField::Term, "Minimum term: 1 month");
    } else if term > MAX_TERM {
        errors.insert(LoanField::Term, "Maximum term: 60 months");
    }

    if form.purpose.parse::<LoanPurpose>().is_err() {
        errors.insert(LoanField::Purpose, "Select a loan purpose");
    }

    if normalize(&form.monthly_income) < MIN_MONTHLY_INCOME {
        errors.insert(LoanField::MonthlyIncome, "Minimum monthly income: 1 000 ₽");
    }

    errors
}

/// Digits only, parsed; empty is zero and overlong input saturates.
fn normalize(input: &str) -> u64 {
    input
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d)))
}

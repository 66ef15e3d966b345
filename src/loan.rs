use serde::{Deserialize, Serialize};

/// Markup applied by the indicative payment estimate.
const MARKUP_PERCENT: u64 = 15;

/// Fixed set of loan purposes offered by the application form.
///
/// Shown to the user as an English label; serialized as the value the backend
/// stores (see [`LoanPurpose::wire_value`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanPurpose {
    #[serde(rename = "На личные нужды")]
    PersonalNeeds,
    #[serde(rename = "Покупка техники")]
    Electronics,
    #[serde(rename = "Ремонт дома")]
    HomeRenovation,
    #[serde(rename = "Медицинские расходы")]
    Medical,
    #[serde(rename = "Образование")]
    Education,
    #[serde(rename = "Путешествие")]
    Travel,
    #[serde(rename = "Погашение других долгов")]
    DebtRefinancing,
    #[serde(rename = "Другое")]
    Other,
}

impl LoanPurpose {
    /// All purposes in form display order.
    pub const ALL: [Self; 8] = [
        Self::PersonalNeeds,
        Self::Electronics,
        Self::HomeRenovation,
        Self::Medical,
        Self::Education,
        Self::Travel,
        Self::DebtRefinancing,
        Self::Other,
    ];

    /// Display label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PersonalNeeds => "Personal needs",
            Self::Electronics => "Electronics purchase",
            Self::HomeRenovation => "Home renovation",
            Self::Medical => "Medical expenses",
            Self::Education => "Education",
            Self::Travel => "Travel",
            Self::DebtRefinancing => "Debt refinancing",
            Self::Other => "Other",
        }
    }

    /// Value sent to and stored by the backend. Must match the serde renames.
    #[must_use]
    pub fn wire_value(self) -> &'static str {
        match self {
            Self::PersonalNeeds => "На личные нужды",
            Self::Electronics => "Покупка техники",
            Self::HomeRenovation => "Ремонт дома",
            Self::Medical => "Медицинские расходы",
            Self::Education => "Образование",
            Self::Travel => "Путешествие",
            Self::DebtRefinancing => "Погашение других долгов",
            Self::Other => "Другое",
        }
    }

    /// Label for a value stored by the backend, or the raw value if unknown.
    #[must_use]
    pub fn label_for(stored: &str) -> &str {
        stored.parse::<Self>().map_or(stored, |p| p.as_str())
    }
}

impl std::fmt::Display for LoanPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown loan purpose: {0:?}")]
pub struct UnknownPurpose(pub String);

impl std::str::FromStr for LoanPurpose {
    type Err = UnknownPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s || p.wire_value() == s)
            .ok_or_else(|| UnknownPurpose(s.to_owned()))
    }
}

/// Validated loan parameters, forwarded verbatim to `POST /api/auth/telegram`.
///
/// Only obtainable through
/// [`LoanApplicationForm::into_draft`](crate::validation::LoanApplicationForm::into_draft),
/// so holding one proves every bound was checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanDraft {
    pub(crate) loan_amount: u64,
    pub(crate) loan_term: u32,
    pub(crate) loan_purpose: LoanPurpose,
    pub(crate) monthly_income: u64,
}

impl LoanDraft {
    #[must_use]
    pub fn amount(&self) -> u64 {
        self.loan_amount
    }

    /// Term in months.
    #[must_use]
    pub fn term(&self) -> u32 {
        self.loan_term
    }

    #[must_use]
    pub fn purpose(&self) -> LoanPurpose {
        self.loan_purpose
    }

    #[must_use]
    pub fn monthly_income(&self) -> u64 {
        self.monthly_income
    }

    #[must_use]
    pub fn estimate(&self) -> Option<PaymentEstimate> {
        PaymentEstimate::new(self.loan_amount, self.loan_term)
    }
}

/// Indicative repayment figures (flat 15% markup), rounded to whole rubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentEstimate {
    pub monthly_payment: u64,
    pub total: u64,
    pub overpayment: u64,
}

impl PaymentEstimate {
    /// `None` when `term` is zero.
    #[must_use]
    pub fn new(amount: u64, term: u32) -> Option<Self> {
        if term == 0 {
            return None;
        }
        let scaled = u128::from(amount) * u128::from(100 + MARKUP_PERCENT);
        Some(Self {
            monthly_payment: div_round(scaled, 100 * u128::from(term)),
            total: div_round(scaled, 100),
            overpayment: div_round(u128::from(amount) * u128::from(MARKUP_PERCENT), 100),
        })
    }
}

// Half-up rounding division, saturating at u64::MAX.
fn div_round(numerator: u128, denominator: u128) -> u64 {
    let q = (numerator + denominator / 2) / denominator;
    u64::try_from(q).unwrap_or(u64::MAX)
}

/// Group digits by thousands with spaces, dropping everything that is not a digit.
///
/// `"1000000"` and `"1,000,000"` both become `"1 000 000"`.
#[must_use]
pub fn group_digits(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(*d);
    }
    out
}

/// Whole-ruble amount, e.g. `150 000 ₽`.
#[must_use]
pub fn format_rubles(amount: u64) -> String {
    format!("{} ₽", group_digits(&amount.to_string()))
}

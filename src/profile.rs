//! Profile view model: what the dashboard shows once signed in.

use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::loan::{LoanPurpose, PaymentEstimate, format_rubles};
use crate::types::{AuthSession, DeviceInfo, User};

/// Everything loaded for the profile view.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Profile {
    pub user: User,
    pub sessions: Vec<AuthSession>,
    pub device: DeviceInfo,
}

impl Profile {
    #[must_use]
    pub fn new(user: User, sessions: Vec<AuthSession>, device: DeviceInfo) -> Self {
        Self {
            user,
            sessions,
            device,
        }
    }

    /// Sessions still marked active, in server order.
    pub fn active_sessions(&self) -> impl Iterator<Item = &AuthSession> {
        self.sessions.iter().filter(|s| s.is_active)
    }

    #[must_use]
    pub fn active_session_count(&self) -> usize {
        self.active_sessions().count()
    }
}

impl User {
    /// `@username`, if the user has one.
    #[must_use]
    pub fn handle(&self) -> Option<String> {
        self.username.as_deref().map(|u| format!("@{u}"))
    }

    /// First and last name joined, or `None` when neither is set.
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// Whether the loan section is shown at all.
    #[must_use]
    pub fn has_loan_details(&self) -> bool {
        self.loan_amount.is_some()
            || self.loan_term.is_some()
            || self.loan_purpose.is_some()
            || self.monthly_income.is_some()
    }

    /// Repayment figures, when both amount and term are known.
    #[must_use]
    pub fn payment_estimate(&self) -> Option<PaymentEstimate> {
        PaymentEstimate::new(self.loan_amount?, self.loan_term?)
    }

    #[must_use]
    pub fn loan_amount_display(&self) -> Option<String> {
        self.loan_amount.map(format_rubles)
    }

    #[must_use]
    pub fn monthly_income_display(&self) -> Option<String> {
        self.monthly_income.map(format_rubles)
    }

    /// Purpose as a display label; unknown stored values are shown as-is.
    #[must_use]
    pub fn loan_purpose_display(&self) -> Option<&str> {
        self.loan_purpose.as_deref().map(LoanPurpose::label_for)
    }

    #[must_use]
    pub fn loan_term_display(&self) -> Option<String> {
        self.loan_term.map(term_label)
    }

    #[must_use]
    pub fn registered_at(&self) -> Option<OffsetDateTime> {
        parse_timestamp(&self.created_at)
    }

    #[must_use]
    pub fn registered_at_display(&self) -> String {
        display_timestamp(&self.created_at)
    }
}

impl AuthSession {
    #[must_use]
    pub fn logged_in_at_display(&self) -> String {
        display_timestamp(&self.created_at)
    }
}

/// `1 month`, `12 months`.
#[must_use]
pub fn term_label(months: u32) -> String {
    if months == 1 {
        "1 month".to_string()
    } else {
        format!("{months} months")
    }
}

/// Parse a backend timestamp. Offset-less values are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(raw, &Iso8601::DEFAULT))
        .or_else(|_| PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT).map(|dt| dt.assume_utc()))
        .ok()
}

/// `15 January 2024, 10:30`, or the raw text when it does not parse.
#[must_use]
pub fn display_timestamp(raw: &str) -> String {
    let format = format_description!("[day padding:none] [month repr:long] [year], [hour]:[minute]");
    parse_timestamp(raw)
        .and_then(|dt| dt.format(&format).ok())
        .unwrap_or_else(|| raw.to_string())
}

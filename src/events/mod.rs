mod dates;
mod derive;
mod index;
pub(crate) use self::dates::normalize_date;
pub(crate) use self::derive::{Dataset, Record};
pub(crate) use self::index::{cycle_choice, CalendarIndex, SymbolFilter};
use rust_decimal::Decimal;
use std::fmt;
use time::Date;

/// Column names as they appear in the header row of the source sheet
pub(crate) mod column {
    pub(crate) const SYMBOL: &str = "Symbol";
    pub(crate) const COMPANY: &str = "Company";
    pub(crate) const EVENT_TYPE: &str = "Event Type";
    pub(crate) const ANNOUNCEMENT_DATE: &str = "Announcement Date";
    pub(crate) const XD_DATE: &str = "XD Date";
    pub(crate) const RECORD_DATE: &str = "Record Date";
    pub(crate) const PAYMENT_DATE: &str = "Payment Date";
    pub(crate) const DIVIDEND_PER_SHARE: &str = "Dividend Per Share";
    pub(crate) const AMOUNT: &str = "Amount";

    /// Columns without which a fetched table is rejected
    pub(crate) const REQUIRED: [&str; 3] = [SYMBOL, COMPANY, EVENT_TYPE];
}

/// The corporate action a record announces
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) enum EventType {
    Dividend,
    RightsIssue,
    BonusIssue,
    Other(String),
}

impl EventType {
    pub(crate) fn parse(s: &str) -> EventType {
        match s.trim() {
            "Dividend" => EventType::Dividend,
            "Rights Issue" => EventType::RightsIssue,
            "Bonus Issue" => EventType::BonusIssue,
            other => EventType::Other(other.to_owned()),
        }
    }

    /// The milestones a record of this type can produce, each paired with
    /// the date column it is dated by, in emission order
    pub(crate) fn milestones(&self) -> &'static [(Milestone, DateField)] {
        match self {
            EventType::Dividend => &[
                (Milestone::Announcement, DateField::Announcement),
                (Milestone::ExDividend, DateField::Xd),
                (Milestone::RecordDate, DateField::Record),
                (Milestone::PaymentDate, DateField::Payment),
            ],
            EventType::RightsIssue => &[
                (Milestone::Announcement, DateField::Announcement),
                (Milestone::ExRights, DateField::Xd),
                (Milestone::RecordDate, DateField::Record),
            ],
            EventType::BonusIssue => &[
                (Milestone::Announcement, DateField::Announcement),
                (Milestone::ExBonus, DateField::Xd),
                (Milestone::RecordDate, DateField::Record),
            ],
            EventType::Other(_) => &[(Milestone::Announcement, DateField::Announcement)],
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            EventType::Dividend => "Dividend",
            EventType::RightsIssue => "Rights Issue",
            EventType::BonusIssue => "Bonus Issue",
            EventType::Other(s) => s,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) enum Milestone {
    Announcement,
    ExDividend,
    ExRights,
    ExBonus,
    RecordDate,
    PaymentDate,
}

impl Milestone {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Milestone::Announcement => "Announcement",
            Milestone::ExDividend => "Ex-Dividend",
            Milestone::ExRights => "Ex-Rights Date",
            Milestone::ExBonus => "Ex-Bonus Date",
            Milestone::RecordDate => "Record Date",
            Milestone::PaymentDate => "Payment Date",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the four date columns of a record
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum DateField {
    Announcement,
    Xd,
    Record,
    Payment,
}

impl DateField {
    pub(crate) fn column(self) -> &'static str {
        match self {
            DateField::Announcement => column::ANNOUNCEMENT_DATE,
            DateField::Xd => column::XD_DATE,
            DateField::Record => column::RECORD_DATE,
            DateField::Payment => column::PAYMENT_DATE,
        }
    }
}

/// A single dated milestone derived from a record
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalendarEvent {
    pub(crate) symbol: String,
    pub(crate) company: String,
    pub(crate) event_type: EventType,
    pub(crate) milestone: Milestone,
    pub(crate) amount: Option<Decimal>,
    pub(crate) date: Date,
}

//! Budget domain records, persistence-friendly types, and the pure
//! date/recurrence arithmetic the scheduling engine is built on.

pub mod account;
pub mod budget;
pub mod category;
pub mod income_source;
pub mod member;
pub mod period;
pub mod recurring_bill;
pub mod schedule;
pub mod transaction;

pub use account::{Account, AccountKind};
pub use budget::Budget;
pub use category::{Category, CategoryKind};
pub use income_source::{IncomeKind, IncomeSource};
pub use member::Member;
pub use period::{DateRange, Period, PeriodError};
pub use recurring_bill::RecurringBill;
pub use schedule::{Schedule, ScheduleError};
pub use transaction::{TemplateRef, Transaction, TransactionKind, TransactionStatus};

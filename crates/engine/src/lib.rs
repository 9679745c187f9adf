//! Expense-splitting engine.
//!
//! Users form groups, record expenses with per-member splits and read back
//! what each expense means for them. The engine owns the consistency rules:
//! split participants must be group members, paid and owed totals must
//! reconcile with the expense amount, and every write is atomic.

pub use error::{EngineError, ErrorKind};
pub use expense_splits::ExpenseSplit;
pub use expenses::{Expense, ExpenseDraft, GeoPoint};
pub use groups::{Group, GroupMember};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, ExpenseNetSpending};
pub use reconcile::{SplitTolerance, SplitTotals, reconcile_splits};
pub use users::User;

mod error;
mod expense_splits;
mod expenses;
mod group_members;
mod groups;
mod money;
mod ops;
mod password;
mod reconcile;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

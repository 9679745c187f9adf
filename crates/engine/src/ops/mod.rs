use sea_orm::DatabaseConnection;

use crate::{ResultEngine, SplitTolerance};

mod balances;
mod expenses;
mod groups;
mod membership;
mod splits;
mod users;

pub use balances::ExpenseNetSpending;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    split_tolerance: SplitTolerance,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn split_tolerance(&self) -> SplitTolerance {
        self.split_tolerance
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    split_tolerance: SplitTolerance,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the split reconciliation tolerance (one cent by default).
    pub fn split_tolerance(mut self, tolerance: SplitTolerance) -> EngineBuilder {
        self.split_tolerance = tolerance;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            split_tolerance: self.split_tolerance,
        })
    }
}

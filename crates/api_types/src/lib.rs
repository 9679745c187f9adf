use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    /// Bearer token for the `Authorization` header of later requests.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Session {
        pub token: String,
        pub user: user::UserView,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: Option<String>,
        pub guest: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupMemberView {
        pub user_id: Uuid,
        pub name: String,
        pub email: Option<String>,
        pub guest: bool,
        pub joined_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        /// The group admin.
        pub created_by: Uuid,
        pub created_at: DateTime<Utc>,
        /// Empty in listings; filled when a single group is fetched.
        #[serde(default)]
        pub members: Vec<GroupMemberView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupList {
        pub groups: Vec<GroupView>,
    }

    /// Request body for adding or removing members.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersChange {
        pub user_ids: Vec<Uuid>,
    }

    /// Ids that are members after an add request.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersAdded {
        pub user_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GuestNew {
        pub name: String,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Split {
        pub user_id: Uuid,
        /// Non-negative amount in minor units.
        pub amount_minor: i64,
        /// `true` when the user paid this amount, `false` when they owe it.
        pub is_paid: bool,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Location {
        pub latitude: f64,
        pub longitude: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub group_id: Uuid,
        pub title: String,
        pub description: Option<String>,
        pub amount_minor: i64,
        #[serde(default)]
        pub incomplete_amount: bool,
        #[serde(default)]
        pub incomplete_split: bool,
        pub location: Option<Location>,
        pub splits: Vec<Split>,
    }

    /// Full replacement of an expense. The group cannot change.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub title: String,
        pub description: Option<String>,
        pub amount_minor: i64,
        #[serde(default)]
        pub incomplete_amount: bool,
        #[serde(default)]
        pub incomplete_split: bool,
        pub location: Option<Location>,
        pub splits: Vec<Split>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub created_by: Uuid,
        pub title: String,
        pub description: Option<String>,
        pub amount_minor: i64,
        pub incomplete_amount: bool,
        pub incomplete_split: bool,
        pub location: Option<Location>,
        pub created_at: DateTime<Utc>,
        pub splits: Vec<Split>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetSpendingView {
        pub expense_id: Uuid,
        pub title: String,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
        pub total_minor: i64,
        pub paid_minor: i64,
        pub owed_minor: i64,
        /// `paid_minor - owed_minor`.
        pub net_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NetSpendingList {
        pub expenses: Vec<NetSpendingView>,
    }
}

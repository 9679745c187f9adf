//! Expense API endpoints

use api_types::expense::{
    ExpenseNew, ExpenseUpdate, ExpenseView, Location, NetSpendingList, NetSpendingView, Split,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Expense, ExpenseDraft, ExpenseNetSpending, ExpenseSplit, GeoPoint, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn to_splits(splits: Vec<Split>) -> Vec<ExpenseSplit> {
    splits
        .into_iter()
        .map(|split| ExpenseSplit {
            user_id: split.user_id,
            amount_minor: split.amount_minor,
            is_paid: split.is_paid,
        })
        .collect()
}

fn to_point(location: Location) -> GeoPoint {
    GeoPoint {
        latitude: location.latitude,
        longitude: location.longitude,
    }
}

fn new_draft(value: ExpenseNew) -> ExpenseDraft {
    ExpenseDraft {
        group_id: value.group_id,
        title: value.title,
        description: value.description,
        amount_minor: value.amount_minor,
        incomplete_amount: value.incomplete_amount,
        incomplete_split: value.incomplete_split,
        location: value.location.map(to_point),
        splits: to_splits(value.splits),
    }
}

/// Updates cannot move an expense; the engine keeps the stored group.
fn update_draft(value: ExpenseUpdate) -> ExpenseDraft {
    ExpenseDraft {
        group_id: Uuid::nil(),
        title: value.title,
        description: value.description,
        amount_minor: value.amount_minor,
        incomplete_amount: value.incomplete_amount,
        incomplete_split: value.incomplete_split,
        location: value.location.map(to_point),
        splits: to_splits(value.splits),
    }
}

fn expense_view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        group_id: expense.group_id,
        created_by: expense.created_by,
        title: expense.title,
        description: expense.description,
        amount_minor: expense.amount_minor,
        incomplete_amount: expense.incomplete_amount,
        incomplete_split: expense.incomplete_split,
        location: expense.location.map(|point| Location {
            latitude: point.latitude,
            longitude: point.longitude,
        }),
        created_at: expense.created_at,
        splits: expense
            .splits
            .into_iter()
            .map(|split| Split {
                user_id: split.user_id,
                amount_minor: split.amount_minor,
                is_paid: split.is_paid,
            })
            .collect(),
    }
}

fn net_spending_view(row: ExpenseNetSpending) -> NetSpendingView {
    NetSpendingView {
        expense_id: row.expense_id,
        title: row.title,
        description: row.description,
        created_at: row.created_at,
        total_minor: row.total_minor,
        paid_minor: row.paid_minor,
        owed_minor: row.owed_minor,
        net_minor: row.net_minor,
    }
}

/// Handle requests for recording a new expense
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state
        .engine
        .create_expense(new_draft(payload), user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense_for(expense_id, user.id).await?;
    Ok(Json(expense_view(expense)))
}

/// Handle requests for replacing an expense and its splits
pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .update_expense(expense_id, update_draft(payload), user.id)
        .await?;
    Ok(Json(expense_view(expense)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(expense_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle requests for the user's net spending in a group
pub async fn net_spending(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<NetSpendingList>, ServerError> {
    let rows = state.engine.group_net_spending(group_id, user.id).await?;
    Ok(Json(NetSpendingList {
        expenses: rows.into_iter().map(net_spending_view).collect(),
    }))
}

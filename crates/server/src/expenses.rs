//! Expenses API endpoints

use std::collections::HashMap;

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Amount, Expense, Fields, RecordId, Store, UserClock};
use sea_orm::TransactionTrait;
use serde::Serialize;
use serde_json::Value;

use crate::{ServerError, lookups::LookupView, server::ServerState};

#[derive(Debug, Serialize)]
pub struct ExpenseView {
    pub id: i64,
    /// Raw stored date (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub date: String,
    /// Date as shown to the user ("3 days ago", ...).
    pub date_display: String,
    #[serde(rename = "type")]
    pub kind: LookupView,
    pub location: LookupView,
    pub amount: String,
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<ExpenseView>,
    pub total: String,
}

async fn view<S>(
    store: &S,
    clock: &UserClock,
    expense: &Expense,
) -> Result<ExpenseView, ServerError>
where
    S: Store + ?Sized,
{
    let kind = expense.expense_type(store).await?;
    let location = expense.location(store).await?;

    Ok(ExpenseView {
        id: expense.id().get(),
        date: expense.raw_date()?.to_string(),
        date_display: expense.date(clock, true)?,
        kind: LookupView::from_type(&kind)?,
        location: LookupView::from_location(&location)?,
        amount: expense.amount()?.to_string(),
        comment: expense.comment()?.to_string(),
    })
}

/// Form fields arrive as strings; the engine validates and converts them.
fn form_fields(form: HashMap<String, String>) -> Fields {
    form.into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect()
}

pub async fn create(
    State(state): State<ServerState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let fields = form_fields(form);

    let tx = state.db.begin().await?;
    let expense = Expense::create_resolved(&tx, &fields).await?;
    let created = view(&tx, state.clock.as_ref(), &expense).await?;
    tx.commit().await?;

    tracing::info!(expense = %expense.id(), amount = %created.amount, "expense created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = Expense::find(&state.db, RecordId::new(id)?).await?;
    Ok(Json(view(&state.db, state.clock.as_ref(), &expense).await?))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = Expense::all(&state.db).await?;

    let amounts = expenses
        .iter()
        .map(Expense::amount)
        .collect::<Result<Vec<_>, _>>()?;
    let total = Amount::checked_sum(amounts)
        .ok_or_else(|| ServerError::Internal("expense total overflows".to_string()))?;

    let mut views = Vec::with_capacity(expenses.len());
    for expense in &expenses {
        views.push(view(&state.db, state.clock.as_ref(), expense).await?);
    }

    Ok(Json(ExpenseListResponse {
        expenses: views,
        total: total.to_string(),
    }))
}

//! Types and locations API endpoints.
//!
//! The lists feed the select inputs of the expense form.

use std::collections::HashMap;

use axum::{Form, Json, extract::State, http::StatusCode};
use engine::{ExpenseType, Fields, Location};
use serde::Serialize;
use serde_json::Value;

use crate::{ServerError, server::ServerState};

#[derive(Debug, Serialize)]
pub struct LookupView {
    pub id: i64,
    pub description: String,
}

impl LookupView {
    pub(crate) fn from_type(kind: &ExpenseType) -> Result<Self, ServerError> {
        Ok(Self {
            id: kind.id().get(),
            description: kind.description()?.to_string(),
        })
    }

    pub(crate) fn from_location(location: &Location) -> Result<Self, ServerError> {
        Ok(Self {
            id: location.id().get(),
            description: location.description()?.to_string(),
        })
    }
}

fn description_fields(mut form: HashMap<String, String>) -> Fields {
    let mut fields = Fields::new();
    if let Some(description) = form.remove("description") {
        fields.insert("description".to_string(), Value::String(description));
    }
    fields
}

pub async fn list_types(
    State(state): State<ServerState>,
) -> Result<Json<Vec<LookupView>>, ServerError> {
    let views = ExpenseType::all(&state.db)
        .await?
        .iter()
        .map(LookupView::from_type)
        .collect::<Result<_, _>>()?;
    Ok(Json(views))
}

pub async fn create_type(
    State(state): State<ServerState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<(StatusCode, Json<LookupView>), ServerError> {
    let kind = ExpenseType::create(&state.db, &description_fields(form)).await?;
    tracing::info!(typeid = %kind.id(), "type created");
    Ok((StatusCode::CREATED, Json(LookupView::from_type(&kind)?)))
}

pub async fn list_locations(
    State(state): State<ServerState>,
) -> Result<Json<Vec<LookupView>>, ServerError> {
    let views = Location::all(&state.db)
        .await?
        .iter()
        .map(LookupView::from_location)
        .collect::<Result<_, _>>()?;
    Ok(Json(views))
}

pub async fn create_location(
    State(state): State<ServerState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<(StatusCode, Json<LookupView>), ServerError> {
    let location = Location::create(&state.db, &description_fields(form)).await?;
    tracing::info!(locationid = %location.id(), "location created");
    Ok((StatusCode::CREATED, Json(LookupView::from_location(&location)?)))
}

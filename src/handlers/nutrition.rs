use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::Result,
    handlers::{JsonBody, acquire_db_connection, log_handler_error},
    middleware::auth::AuthenticatedUser,
    models::nutrition::{CreatePlanRequest, NutritionFact, NutritionFactQuery, NutritionPlan},
    services::nutrition,
    state::AppState,
};

/// GET /api/search-plans/?<field>=<value>...
///
/// Returns every plan matching all recognised fields. Numeric fields match
/// exact values, ranges like `18-25` and the wildcard `A`; text fields match
/// case-insensitively or the wildcard. Unknown keys and non-numeric values for
/// numeric fields are ignored.
pub async fn search_plans(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<NutritionPlan>>> {
    let mut conn = acquire_db_connection(&state, "search_plans").await?;
    let plans = nutrition::search_plans(&mut conn, &params)
        .await
        .inspect_err(|e| log_handler_error("search_plans", e))?;

    tracing::debug!(
        operation = "search_plans",
        params = params.len(),
        matches = plans.len(),
        "Plan search completed",
    );

    Ok(Json(plans))
}

/// POST /api/plans/
///
/// # HTTP Status Codes
/// - `201 CREATED`: Plan stored
/// - `400 BAD_REQUEST`: Unknown field or a target that is not a number, range or `A`
pub async fn create_plan(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    JsonBody(request): JsonBody<CreatePlanRequest>,
) -> Result<(StatusCode, Json<NutritionPlan>)> {
    tracing::info!(
        operation = "create_plan",
        requester_id = %auth_user.id,
        name = %request.name,
        "Creating nutrition plan",
    );

    // Targets are decoded before a connection is taken
    let plan = nutrition::build_plan(request).inspect_err(|e| log_handler_error("create_plan", e))?;

    let mut conn = acquire_db_connection(&state, "create_plan").await?;
    let plan = nutrition::create_plan(&mut conn, plan)
        .await
        .inspect_err(|e| log_handler_error("create_plan", e))?;

    Ok((StatusCode::CREATED, Json(plan)))
}

/// GET /api/plans/
pub async fn list_plans(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<NutritionPlan>>> {
    let mut conn = acquire_db_connection(&state, "list_plans").await?;
    let plans = nutrition::list_plans(&mut conn)
        .await
        .inspect_err(|e| log_handler_error("list_plans", e))?;

    Ok(Json(plans))
}

/// GET /api/plans/{id}
pub async fn get_plan(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<NutritionPlan>> {
    let mut conn = acquire_db_connection(&state, "get_plan").await?;
    let plan = nutrition::get_plan(&mut conn, plan_id)
        .await
        .inspect_err(|e| log_handler_error("get_plan", e))?;

    Ok(Json(plan))
}

/// GET /api/nutrition/?food=
///
/// Nutrition facts, optionally filtered by a case-insensitive food name substring.
pub async fn list_nutrition_facts(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<NutritionFactQuery>,
) -> Result<Json<Vec<NutritionFact>>> {
    let mut conn = acquire_db_connection(&state, "list_nutrition_facts").await?;
    let facts = nutrition::list_facts(&mut conn, query.food.as_deref())
        .await
        .inspect_err(|e| log_handler_error("list_nutrition_facts", e))?;

    Ok(Json(facts))
}

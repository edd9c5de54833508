use crate::{
    error::{Error, Result},
    models::nutrition::{
        NewNutritionPlan, NutritionFact, NutritionPlan, NutritionPlanRow, PlanField,
    },
    queries::users::escape_like,
};
use uuid::Uuid;

use crate::DbConn;

const PLAN_COLUMNS: &str = r#"
    id, name, description, age, sex, height, weight, formula_written, factor_name,
    factor_value, daily_calories, carbohydrates_g, proteins_g, fats_g, hydration,
    boron_mg, calcium_mg, iron_mg, selenium_ug, zinc_mg, sodium_mg, created_at
"#;

/// Target columns in insert order.
const TARGET_FIELDS: [PlanField; 18] = [
    PlanField::Age,
    PlanField::Sex,
    PlanField::Height,
    PlanField::Weight,
    PlanField::FormulaWritten,
    PlanField::FactorName,
    PlanField::FactorValue,
    PlanField::DailyCalories,
    PlanField::CarbohydratesG,
    PlanField::ProteinsG,
    PlanField::FatsG,
    PlanField::Hydration,
    PlanField::BoronMg,
    PlanField::CalciumMg,
    PlanField::IronMg,
    PlanField::SeleniumUg,
    PlanField::ZincMg,
    PlanField::SodiumMg,
];

/// Loads every plan, decoding stored targets once.
pub async fn list_plans(conn: &mut DbConn) -> Result<Vec<NutritionPlan>> {
    let sql = format!("SELECT {PLAN_COLUMNS} FROM nutrition_plans ORDER BY name ASC, id ASC");

    let rows = sqlx::query_as::<_, NutritionPlanRow>(&sql)
        .fetch_all(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(rows.into_iter().map(NutritionPlan::from).collect())
}

/// Gets a plan by ID. The plan may not exist.
pub async fn get_plan(conn: &mut DbConn, id: Uuid) -> Result<Option<NutritionPlan>> {
    let sql = format!("SELECT {PLAN_COLUMNS} FROM nutrition_plans WHERE id = $1");

    let row = sqlx::query_as::<_, NutritionPlanRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(Error::Sqlx)?;

    Ok(row.map(NutritionPlan::from))
}

pub async fn create_plan(conn: &mut DbConn, plan: NewNutritionPlan) -> Result<NutritionPlan> {
    let columns = TARGET_FIELDS
        .iter()
        .map(|field| field.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (4..4 + TARGET_FIELDS.len())
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        r#"
        INSERT INTO nutrition_plans (id, name, description, {columns})
        VALUES ($1, $2, $3, {placeholders})
        RETURNING {PLAN_COLUMNS}
        "#
    );

    let mut query = sqlx::query_as::<_, NutritionPlanRow>(&sql)
        .bind(Uuid::now_v7())
        .bind(&plan.name)
        .bind(&plan.description);
    for field in TARGET_FIELDS {
        query = query.bind(plan.targets.encode(field).unwrap_or_default());
    }

    let row = query.fetch_one(conn).await.map_err(Error::Sqlx)?;

    Ok(NutritionPlan::from(row))
}

/// Lists nutrition facts, optionally filtered by a case-insensitive food name substring.
pub async fn list_facts(conn: &mut DbConn, food: Option<&str>) -> Result<Vec<NutritionFact>> {
    let facts = sqlx::query_as::<_, NutritionFact>(
        r#"
        SELECT id, food_name, calories, fat, protein, carbohydrates, sodium, sugar,
               fiber, iron, calcium, vitamin_a, vitamin_c
        FROM nutrition_facts
        WHERE ($1::text IS NULL OR food_name ILIKE $1)
        ORDER BY food_name ASC
        "#,
    )
    .bind(food.map(|f| format!("%{}%", escape_like(f))))
    .fetch_all(conn)
    .await
    .map_err(Error::Sqlx)?;

    Ok(facts)
}

use crate::DbConn;
use crate::{
    error::{Error, Result, ValidationErrors},
    models::nutrition::{
        CreatePlanRequest, NewNutritionPlan, NutritionFact, NutritionPlan, PlanField, PlanTargets,
    },
    queries::nutrition,
    services::plan_filter::PlanFilter,
    validation::{MAX_FIELD_CHARS, sanitize_string, validate_max_chars, validate_required_string},
};
use std::collections::HashMap;
use uuid::Uuid;

/// Plans satisfying every recognised field in `params`.
pub async fn search_plans(
    conn: &mut DbConn,
    params: &HashMap<String, String>,
) -> Result<Vec<NutritionPlan>> {
    let filter = PlanFilter::from_params(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    tracing::debug!(conditions = filter.conditions().len(), "Searching nutrition plans");

    let plans = nutrition::list_plans(conn).await?;
    Ok(filter.apply(plans))
}

pub async fn list_plans(conn: &mut DbConn) -> Result<Vec<NutritionPlan>> {
    nutrition::list_plans(conn).await
}

/// Gets a plan by ID, failing with NotFound if absent.
pub async fn get_plan(conn: &mut DbConn, id: Uuid) -> Result<NutritionPlan> {
    nutrition::get_plan(conn, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Nutrition plan with ID {} not found", id)))
}

/// Stores a plan produced by [`build_plan`].
pub async fn create_plan(conn: &mut DbConn, plan: NewNutritionPlan) -> Result<NutritionPlan> {
    nutrition::create_plan(conn, plan).await
}

/// Validates a create request into a plan ready for storage.
///
/// Every bad field is reported at once. Keys that are not plan fields are rejected.
pub fn build_plan(request: CreatePlanRequest) -> Result<NewNutritionPlan> {
    let name = validate_required_string(&request.name, "name")?;
    validate_max_chars(&name, "name", MAX_FIELD_CHARS)?;
    let mut targets = PlanTargets::default();
    let mut errors = HashMap::new();

    for (key, value) in &request.targets {
        let field = match key.parse::<PlanField>() {
            Ok(PlanField::Name | PlanField::Description) | Err(_) => {
                errors.insert(key.clone(), format!("Unknown plan field '{}'", key));
                continue;
            }
            Ok(field) => field,
        };
        let raw = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => {
                errors.insert(key.clone(), "Expected a string or a number".to_string());
                continue;
            }
        };
        if let Err(e) = targets.set(field, &raw) {
            errors.insert(key.clone(), e.to_string());
            continue;
        }
        // Stored text is the canonical encoding, which can outgrow the input
        let stored = targets.encode(field).unwrap_or_default();
        if stored.chars().count() > MAX_FIELD_CHARS {
            errors.insert(
                key.clone(),
                format!("{} must be at most {} characters when stored", key, MAX_FIELD_CHARS),
            );
        }
    }

    if !errors.is_empty() {
        return Err(Error::Validation(ValidationErrors::Multiple { fields: errors }));
    }

    Ok(NewNutritionPlan {
        name,
        description: request
            .description
            .as_deref()
            .map(sanitize_string)
            .unwrap_or_default(),
        targets,
    })
}

/// Nutrition facts, optionally filtered by food name.
pub async fn list_facts(conn: &mut DbConn, food: Option<&str>) -> Result<Vec<NutritionFact>> {
    let food = food.map(str::trim).filter(|f| !f.is_empty());
    nutrition::list_facts(conn, food).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::nutrition::{NumericTarget, TextTarget};
    use serde_json::json;

    fn request(body: serde_json::Value) -> CreatePlanRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_build_plan_decodes_targets() {
        let plan = build_plan(request(json!({
            "name": "Endurance",
            "age": "18-25",
            "daily_calories": 2800,
            "sex": "Female"
        })))
        .unwrap();

        assert_eq!(plan.name, "Endurance");
        assert_eq!(plan.targets.age, Some(NumericTarget::range(18.0, 25.0)));
        assert_eq!(plan.targets.daily_calories, Some(NumericTarget::Exact(2800.0)));
        assert_eq!(plan.targets.sex, TextTarget::Value("Female".to_string()));
        assert_eq!(plan.targets.weight, Some(NumericTarget::Any));
    }

    #[test]
    fn test_build_plan_collects_all_errors() {
        let err = build_plan(request(json!({
            "name": "Broken",
            "age": "young",
            "colour": "blue"
        })))
        .unwrap_err();

        match err {
            Error::Validation(ValidationErrors::Multiple { fields }) => {
                assert!(fields.contains_key("age"));
                assert!(fields.contains_key("colour"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_build_plan_rejects_long_name() {
        let err = build_plan(request(json!({ "name": "n".repeat(300) }))).unwrap_err();
        assert!(format!("{:?}", err).contains("name"));
    }

    #[test]
    fn test_build_plan_rejects_targets_too_long_to_store() {
        let err = build_plan(request(json!({
            "name": "Oversized",
            "sex": "x".repeat(300),
            "daily_calories": "1e300",
            "iron_mg": 18
        })))
        .unwrap_err();

        match err {
            Error::Validation(ValidationErrors::Multiple { fields }) => {
                assert_eq!(fields.len(), 2);
                assert!(fields.contains_key("sex"));
                assert!(fields.contains_key("daily_calories"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_build_plan_requires_name() {
        assert!(build_plan(request(json!({ "name": "  " }))).is_err());
    }
}

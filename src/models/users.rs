use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::models::nutrition::NutritionPlan;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
)]
#[sqlx(type_name = "text")]
pub enum ActivityLevel {
    #[sqlx(rename = "Sedentary")]
    #[serde(rename = "Sedentary")]
    #[strum(serialize = "Sedentary")]
    Sedentary,
    #[sqlx(rename = "Lightly Active")]
    #[serde(rename = "Lightly Active")]
    #[strum(serialize = "Lightly Active")]
    LightlyActive,
    #[sqlx(rename = "Moderately Active")]
    #[serde(rename = "Moderately Active")]
    #[strum(serialize = "Moderately Active")]
    ModeratelyActive,
    #[sqlx(rename = "Very Active")]
    #[serde(rename = "Very Active")]
    #[strum(serialize = "Very Active")]
    VeryActive,
    #[sqlx(rename = "Super Active")]
    #[serde(rename = "Super Active")]
    #[strum(serialize = "Super Active")]
    SuperActive,
}

/// Personal nutrient targets kept on the user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NutrientTargets {
    pub daily_calories: Option<String>,
    pub carbohydrates_g: Option<String>,
    pub proteins_g: Option<String>,
    pub fats_g: Option<String>,
    pub boron_mg: Option<String>,
    pub calcium_mg: Option<String>,
    pub iron_mg: Option<String>,
    pub selenium_ug: Option<String>,
    pub zinc_mg: Option<String>,
    pub sodium_mg: Option<String>,
}

impl NutrientTargets {
    /// Overwrites every field that is set in `update`.
    pub fn merge(&mut self, update: NutrientTargets) {
        let pairs = [
            (&mut self.daily_calories, update.daily_calories),
            (&mut self.carbohydrates_g, update.carbohydrates_g),
            (&mut self.proteins_g, update.proteins_g),
            (&mut self.fats_g, update.fats_g),
            (&mut self.boron_mg, update.boron_mg),
            (&mut self.calcium_mg, update.calcium_mg),
            (&mut self.iron_mg, update.iron_mg),
            (&mut self.selenium_ug, update.selenium_ug),
            (&mut self.zinc_mg, update.zinc_mg),
            (&mut self.sodium_mg, update.sodium_mg),
        ];
        for (slot, value) in pairs {
            if value.is_some() {
                *slot = value;
            }
        }
    }

    /// The fields that are set, by JSON name.
    pub fn set_fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("daily_calories", &self.daily_calories),
            ("carbohydrates_g", &self.carbohydrates_g),
            ("proteins_g", &self.proteins_g),
            ("fats_g", &self.fats_g),
            ("boron_mg", &self.boron_mg),
            ("calcium_mg", &self.calcium_mg),
            ("iron_mg", &self.iron_mg),
            ("selenium_ug", &self.selenium_ug),
            ("zinc_mg", &self.zinc_mg),
            ("sodium_mg", &self.sodium_mg),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub age: Option<i32>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub activity_level: Option<ActivityLevel>,
    pub vegan: bool,
    pub vegetarian: bool,
    pub nutrition_plan_id: Option<Uuid>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub targets: NutrientTargets,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub age: Option<i32>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub activity_level: Option<ActivityLevel>,
    pub vegan: Option<bool>,
    pub vegetarian: Option<bool>,
    pub nutrition_plan_id: Option<Uuid>,
    #[serde(flatten)]
    pub targets: NutrientTargets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    #[serde(default, alias = "clubName")]
    pub club_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    pub user: User,
    pub token: TokenPair,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Nutrient targets of a user together with their assigned plan.
#[derive(Debug, Clone, Serialize)]
pub struct UserNutrition {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub targets: NutrientTargets,
    pub nutrition_plan: Option<NutritionPlan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_level_round_trips_labels() {
        assert_eq!(ActivityLevel::LightlyActive.to_string(), "Lightly Active");
        assert_eq!(
            "Very Active".parse::<ActivityLevel>().unwrap(),
            ActivityLevel::VeryActive
        );
        let json = serde_json::to_string(&ActivityLevel::SuperActive).unwrap();
        assert_eq!(json, "\"Super Active\"");
    }

    #[test]
    fn test_targets_merge_keeps_unset_fields() {
        let mut targets = NutrientTargets {
            daily_calories: Some("2000".into()),
            iron_mg: Some("8".into()),
            ..Default::default()
        };
        targets.merge(NutrientTargets {
            iron_mg: Some("18".into()),
            ..Default::default()
        });
        assert_eq!(targets.daily_calories.as_deref(), Some("2000"));
        assert_eq!(targets.iron_mg.as_deref(), Some("18"));
    }

    #[test]
    fn test_register_accepts_club_name_alias() {
        let request: RegisterUser = serde_json::from_value(serde_json::json!({
            "username": "jane",
            "email": "jane@example.com",
            "password": "correct-horse",
            "password2": "correct-horse",
            "clubName": "Chess Club"
        }))
        .unwrap();
        assert_eq!(request.club_name.as_deref(), Some("Chess Club"));
    }
}

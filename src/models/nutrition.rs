use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;
use uuid::Uuid;

/// Stored text that opts a field out of filtering.
pub const ANY_SENTINEL: &str = "A";

/// `<number> - <number>` anywhere in the text.
static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)").expect("range pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a number, a range like 18-25, or the wildcard A")]
pub struct TargetParseError(pub String);

/// Target for a numeric-capable plan field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NumericTarget {
    Exact(f64),
    /// Inclusive on both ends, `min <= max`.
    Range { min: f64, max: f64 },
    Any,
}

impl NumericTarget {
    pub fn range(a: f64, b: f64) -> Self {
        NumericTarget::Range {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn matches(&self, requested: f64) -> bool {
        match *self {
            NumericTarget::Exact(value) => value == requested,
            NumericTarget::Range { min, max } => min <= requested && requested <= max,
            NumericTarget::Any => true,
        }
    }
}

impl FromStr for NumericTarget {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == ANY_SENTINEL {
            return Ok(NumericTarget::Any);
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() {
                return Ok(NumericTarget::Exact(value));
            }
        }
        if let Some(caps) = RANGE_PATTERN.captures(trimmed) {
            let bounds = (caps[1].parse::<f64>(), caps[2].parse::<f64>());
            if let (Ok(a), Ok(b)) = bounds {
                return Ok(NumericTarget::range(a, b));
            }
        }
        Err(TargetParseError(s.to_string()))
    }
}

impl fmt::Display for NumericTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericTarget::Exact(value) => write!(f, "{}", value),
            NumericTarget::Range { min, max } => write!(f, "{}-{}", min, max),
            NumericTarget::Any => f.write_str(ANY_SENTINEL),
        }
    }
}

impl From<NumericTarget> for String {
    fn from(target: NumericTarget) -> Self {
        target.to_string()
    }
}

impl TryFrom<String> for NumericTarget {
    type Error = TargetParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Target for a free-text plan field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TextTarget {
    Value(String),
    Any,
}

impl TextTarget {
    pub fn matches(&self, requested: &str) -> bool {
        match self {
            TextTarget::Any => true,
            TextTarget::Value(value) => text_matches(value, requested),
        }
    }
}

/// Case-insensitive equality, with the sentinel matching everything.
pub fn text_matches(stored: &str, requested: &str) -> bool {
    stored.trim() == ANY_SENTINEL || label_matches(stored, requested)
}

/// Case-insensitive equality of trimmed text. Plain labels such as plan names
/// have no sentinel.
pub fn label_matches(stored: &str, requested: &str) -> bool {
    stored.trim().to_lowercase() == requested.trim().to_lowercase()
}

impl From<&str> for TextTarget {
    fn from(value: &str) -> Self {
        if value.trim() == ANY_SENTINEL {
            TextTarget::Any
        } else {
            TextTarget::Value(value.trim().to_string())
        }
    }
}

impl From<String> for TextTarget {
    fn from(value: String) -> Self {
        TextTarget::from(value.as_str())
    }
}

impl From<TextTarget> for String {
    fn from(target: TextTarget) -> Self {
        match target {
            TextTarget::Value(value) => value,
            TextTarget::Any => ANY_SENTINEL.to_string(),
        }
    }
}

impl fmt::Display for TextTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextTarget::Value(value) => f.write_str(value),
            TextTarget::Any => f.write_str(ANY_SENTINEL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Text,
}

/// Every searchable plan field, named as in query strings and JSON bodies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum PlanField {
    Name,
    Description,
    Age,
    Sex,
    Height,
    Weight,
    FormulaWritten,
    FactorName,
    FactorValue,
    DailyCalories,
    CarbohydratesG,
    ProteinsG,
    FatsG,
    Hydration,
    BoronMg,
    CalciumMg,
    IronMg,
    SeleniumUg,
    ZincMg,
    SodiumMg,
}

impl PlanField {
    pub fn kind(&self) -> FieldKind {
        match self {
            PlanField::Name
            | PlanField::Description
            | PlanField::Sex
            | PlanField::FormulaWritten
            | PlanField::FactorName => FieldKind::Text,
            _ => FieldKind::Numeric,
        }
    }
}

/// Borrowed view of one field of a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldTarget<'a> {
    /// `None` when the stored text was not a valid numeric target.
    Numeric(Option<NumericTarget>),
    Text(&'a TextTarget),
    Label(&'a str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTargets {
    pub age: Option<NumericTarget>,
    pub sex: TextTarget,
    pub height: Option<NumericTarget>,
    pub weight: Option<NumericTarget>,
    pub formula_written: TextTarget,
    pub factor_name: TextTarget,
    pub factor_value: Option<NumericTarget>,

    pub daily_calories: Option<NumericTarget>,
    pub carbohydrates_g: Option<NumericTarget>,
    pub proteins_g: Option<NumericTarget>,
    pub fats_g: Option<NumericTarget>,
    pub hydration: Option<NumericTarget>,

    pub boron_mg: Option<NumericTarget>,
    pub calcium_mg: Option<NumericTarget>,
    pub iron_mg: Option<NumericTarget>,
    pub selenium_ug: Option<NumericTarget>,
    pub zinc_mg: Option<NumericTarget>,
    pub sodium_mg: Option<NumericTarget>,
}

impl Default for PlanTargets {
    fn default() -> Self {
        let any = Some(NumericTarget::Any);
        Self {
            age: any,
            sex: TextTarget::Any,
            height: any,
            weight: any,
            formula_written: TextTarget::Any,
            factor_name: TextTarget::Any,
            factor_value: any,
            daily_calories: any,
            carbohydrates_g: any,
            proteins_g: any,
            fats_g: any,
            hydration: any,
            boron_mg: any,
            calcium_mg: any,
            iron_mg: any,
            selenium_ug: any,
            zinc_mg: any,
            sodium_mg: any,
        }
    }
}

impl PlanTargets {
    fn numeric_slot(&mut self, field: PlanField) -> Option<&mut Option<NumericTarget>> {
        let slot = match field {
            PlanField::Age => &mut self.age,
            PlanField::Height => &mut self.height,
            PlanField::Weight => &mut self.weight,
            PlanField::FactorValue => &mut self.factor_value,
            PlanField::DailyCalories => &mut self.daily_calories,
            PlanField::CarbohydratesG => &mut self.carbohydrates_g,
            PlanField::ProteinsG => &mut self.proteins_g,
            PlanField::FatsG => &mut self.fats_g,
            PlanField::Hydration => &mut self.hydration,
            PlanField::BoronMg => &mut self.boron_mg,
            PlanField::CalciumMg => &mut self.calcium_mg,
            PlanField::IronMg => &mut self.iron_mg,
            PlanField::SeleniumUg => &mut self.selenium_ug,
            PlanField::ZincMg => &mut self.zinc_mg,
            PlanField::SodiumMg => &mut self.sodium_mg,
            _ => return None,
        };
        Some(slot)
    }

    fn text_slot(&mut self, field: PlanField) -> Option<&mut TextTarget> {
        match field {
            PlanField::Sex => Some(&mut self.sex),
            PlanField::FormulaWritten => Some(&mut self.formula_written),
            PlanField::FactorName => Some(&mut self.factor_name),
            _ => None,
        }
    }

    /// Parses `raw` strictly into the slot for `field`.
    ///
    /// Name and description are not targets and are ignored here.
    pub fn set(&mut self, field: PlanField, raw: &str) -> Result<(), TargetParseError> {
        if let Some(slot) = self.numeric_slot(field) {
            *slot = Some(raw.parse()?);
        } else if let Some(slot) = self.text_slot(field) {
            *slot = TextTarget::from(raw);
        }
        Ok(())
    }

    /// Like `set`, but stored text that does not decode leaves the field unset.
    pub fn set_lenient(&mut self, field: PlanField, raw: &str) {
        if let Some(slot) = self.numeric_slot(field) {
            *slot = raw.parse().ok();
        } else if let Some(slot) = self.text_slot(field) {
            *slot = TextTarget::from(raw);
        }
    }

    /// Canonical text for storage. Unset numeric fields encode as an empty string.
    pub fn encode(&self, field: PlanField) -> Option<String> {
        match self.get(field)? {
            FieldTarget::Numeric(target) => Some(target.map(|t| t.to_string()).unwrap_or_default()),
            FieldTarget::Text(target) => Some(target.to_string()),
            FieldTarget::Label(label) => Some(label.to_string()),
        }
    }

    pub fn get(&self, field: PlanField) -> Option<FieldTarget<'_>> {
        let target = match field {
            PlanField::Age => FieldTarget::Numeric(self.age),
            PlanField::Height => FieldTarget::Numeric(self.height),
            PlanField::Weight => FieldTarget::Numeric(self.weight),
            PlanField::FactorValue => FieldTarget::Numeric(self.factor_value),
            PlanField::DailyCalories => FieldTarget::Numeric(self.daily_calories),
            PlanField::CarbohydratesG => FieldTarget::Numeric(self.carbohydrates_g),
            PlanField::ProteinsG => FieldTarget::Numeric(self.proteins_g),
            PlanField::FatsG => FieldTarget::Numeric(self.fats_g),
            PlanField::Hydration => FieldTarget::Numeric(self.hydration),
            PlanField::BoronMg => FieldTarget::Numeric(self.boron_mg),
            PlanField::CalciumMg => FieldTarget::Numeric(self.calcium_mg),
            PlanField::IronMg => FieldTarget::Numeric(self.iron_mg),
            PlanField::SeleniumUg => FieldTarget::Numeric(self.selenium_ug),
            PlanField::ZincMg => FieldTarget::Numeric(self.zinc_mg),
            PlanField::SodiumMg => FieldTarget::Numeric(self.sodium_mg),
            PlanField::Sex => FieldTarget::Text(&self.sex),
            PlanField::FormulaWritten => FieldTarget::Text(&self.formula_written),
            PlanField::FactorName => FieldTarget::Text(&self.factor_name),
            PlanField::Name | PlanField::Description => return None,
        };
        Some(target)
    }
}

/// A named bundle of nutrient targets, serialized as a flat field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPlan {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub targets: PlanTargets,
    pub created_at: DateTime<Utc>,
}

impl NutritionPlan {
    pub fn field(&self, field: PlanField) -> FieldTarget<'_> {
        match field {
            PlanField::Name => FieldTarget::Label(&self.name),
            PlanField::Description => FieldTarget::Label(&self.description),
            // Every other field is a target
            other => self
                .targets
                .get(other)
                .unwrap_or(FieldTarget::Numeric(None)),
        }
    }
}

/// Raw `nutrition_plans` row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NutritionPlanRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub age: String,
    pub sex: String,
    pub height: String,
    pub weight: String,
    pub formula_written: String,
    pub factor_name: String,
    pub factor_value: String,
    pub daily_calories: String,
    pub carbohydrates_g: String,
    pub proteins_g: String,
    pub fats_g: String,
    pub hydration: String,
    pub boron_mg: String,
    pub calcium_mg: String,
    pub iron_mg: String,
    pub selenium_ug: String,
    pub zinc_mg: String,
    pub sodium_mg: String,
    pub created_at: DateTime<Utc>,
}

impl From<NutritionPlanRow> for NutritionPlan {
    fn from(row: NutritionPlanRow) -> Self {
        let mut targets = PlanTargets::default();
        let columns = [
            (PlanField::Age, &row.age),
            (PlanField::Sex, &row.sex),
            (PlanField::Height, &row.height),
            (PlanField::Weight, &row.weight),
            (PlanField::FormulaWritten, &row.formula_written),
            (PlanField::FactorName, &row.factor_name),
            (PlanField::FactorValue, &row.factor_value),
            (PlanField::DailyCalories, &row.daily_calories),
            (PlanField::CarbohydratesG, &row.carbohydrates_g),
            (PlanField::ProteinsG, &row.proteins_g),
            (PlanField::FatsG, &row.fats_g),
            (PlanField::Hydration, &row.hydration),
            (PlanField::BoronMg, &row.boron_mg),
            (PlanField::CalciumMg, &row.calcium_mg),
            (PlanField::IronMg, &row.iron_mg),
            (PlanField::SeleniumUg, &row.selenium_ug),
            (PlanField::ZincMg, &row.zinc_mg),
            (PlanField::SodiumMg, &row.sodium_mg),
        ];
        for (field, raw) in columns {
            targets.set_lenient(field, raw);
        }

        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            targets,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewNutritionPlan {
    pub name: String,
    pub description: String,
    pub targets: PlanTargets,
}

/// Body of `POST /plans/`. Target fields may be given as strings or numbers;
/// fields left out default to the wildcard.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub targets: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NutritionFact {
    pub id: Uuid,
    pub food_name: String,
    pub calories: Option<f64>,
    pub fat: Option<f64>,
    pub protein: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub sodium: Option<f64>,
    pub sugar: Option<f64>,
    pub fiber: Option<f64>,
    pub iron: Option<f64>,
    pub calcium: Option<f64>,
    pub vitamin_a: Option<f64>,
    pub vitamin_c: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NutritionFactQuery {
    pub food: Option<String>,
}

//! Range-aware search over nutrition plans.
//!
//! Query parameters are turned into per-field conditions once; each stored
//! plan then satisfies the filter when it satisfies every condition. Stored
//! targets are already decoded, so matching never re-parses text.

use crate::models::nutrition::{FieldKind, FieldTarget, NutritionPlan, PlanField, label_matches};

/// A single per-field constraint built from one query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Numeric { field: PlanField, value: f64 },
    Text { field: PlanField, value: String },
}

impl Condition {
    pub fn field(&self) -> PlanField {
        match self {
            Condition::Numeric { field, .. } | Condition::Text { field, .. } => *field,
        }
    }

    pub fn matches(&self, plan: &NutritionPlan) -> bool {
        match (self, plan.field(self.field())) {
            (Condition::Numeric { value, .. }, FieldTarget::Numeric(target)) => {
                // Stored text that never decoded cannot satisfy a constraint
                target.is_some_and(|t| t.matches(*value))
            }
            (Condition::Text { value, .. }, FieldTarget::Text(target)) => target.matches(value),
            (Condition::Text { value, .. }, FieldTarget::Label(label)) => label_matches(label, value),
            _ => false,
        }
    }
}

/// Conjunction of conditions. An empty filter matches every plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanFilter {
    conditions: Vec<Condition>,
}

impl PlanFilter {
    /// Builds a filter from raw query parameters.
    ///
    /// Unknown keys are ignored. A numeric field whose value does not parse as
    /// a finite number contributes no condition.
    pub fn from_params<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut conditions: Vec<Condition> = params
            .into_iter()
            .filter_map(|(key, raw)| {
                let field = key.parse::<PlanField>().ok()?;
                match field.kind() {
                    FieldKind::Numeric => {
                        let value = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
                        Some(Condition::Numeric { field, value })
                    }
                    FieldKind::Text => Some(Condition::Text {
                        field,
                        value: raw.trim().to_string(),
                    }),
                }
            })
            .collect();
        conditions.sort_by_key(Condition::field);

        Self { conditions }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, plan: &NutritionPlan) -> bool {
        self.conditions.iter().all(|condition| condition.matches(plan))
    }

    /// Keeps the plans that satisfy every condition, preserving order.
    pub fn apply(&self, plans: Vec<NutritionPlan>) -> Vec<NutritionPlan> {
        plans.into_iter().filter(|plan| self.matches(plan)).collect()
    }
}

// goal.rs — ForecastGoal and GoalSelection: the selection data model.
//
// A GoalSelection is an ordered list of forecast goals. The first entry is
// the "primary" goal that downstream flows (the upload tag) consume.
//
// The persisted form is a JSON array of the goal display names, e.g.
//   ["Promotions","Replenishment"]
// Anything that does not parse into exactly that shape is treated as absent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownGoal;

/// Label sent to the upload boundary when no goal has been chosen.
pub const DEFAULT_FORECAST_TYPE: &str = "Default";

/// A forecasting objective the user can pick during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastGoal {
    #[serde(rename = "Replenishment")]
    Replenishment,
    #[serde(rename = "New Product Launch")]
    NewProductLaunch,
    #[serde(rename = "Promotions")]
    Promotions,
    #[serde(rename = "Inventory Optimization")]
    InventoryOptimization,
}

impl ForecastGoal {
    /// Every goal, in the order the selection screen presents them.
    pub const ALL: [ForecastGoal; 4] = [
        ForecastGoal::Replenishment,
        ForecastGoal::NewProductLaunch,
        ForecastGoal::Promotions,
        ForecastGoal::InventoryOptimization,
    ];

    /// The display (and wire) name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastGoal::Replenishment => "Replenishment",
            ForecastGoal::NewProductLaunch => "New Product Launch",
            ForecastGoal::Promotions => "Promotions",
            ForecastGoal::InventoryOptimization => "Inventory Optimization",
        }
    }
}

impl fmt::Display for ForecastGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastGoal {
    type Err = UnknownGoal;

    /// Accepts the display name exactly, or a case-insensitive kebab/snake
    /// spelling (`new-product-launch`, `inventory_optimization`) for CLI use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(goal) = Self::ALL.iter().find(|g| g.as_str() == trimmed) {
            return Ok(*goal);
        }
        let normalized: String = trimmed
            .chars()
            .map(|c| match c {
                '-' | '_' => ' ',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL
            .iter()
            .find(|g| g.as_str().to_ascii_lowercase() == normalized)
            .copied()
            .ok_or_else(|| UnknownGoal(s.to_string()))
    }
}

/// The ordered set of goals a user has selected.
///
/// Serializes as a bare JSON array so the persisted form stays
/// `["Replenishment", ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalSelection(Vec<ForecastGoal>);

impl GoalSelection {
    /// The "no goal chosen yet" sentinel.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a selection, dropping repeated goals but keeping first-seen order.
    pub fn new(goals: impl IntoIterator<Item = ForecastGoal>) -> Self {
        let mut deduped = Vec::new();
        for goal in goals {
            if !deduped.contains(&goal) {
                deduped.push(goal);
            }
        }
        Self(deduped)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn goals(&self) -> &[ForecastGoal] {
        &self.0
    }

    pub fn contains(&self, goal: ForecastGoal) -> bool {
        self.0.contains(&goal)
    }

    /// The goal downstream flows act on, if any.
    pub fn primary(&self) -> Option<ForecastGoal> {
        self.0.first().copied()
    }

    /// The primary goal's name, or [`DEFAULT_FORECAST_TYPE`] when empty.
    pub fn primary_label(&self) -> &'static str {
        self.primary()
            .map(|g| g.as_str())
            .unwrap_or(DEFAULT_FORECAST_TYPE)
    }

    /// A copy with `goal` appended (no-op if already selected).
    pub fn with_appended(&self, goal: ForecastGoal) -> Self {
        let mut next = self.clone();
        if !next.contains(goal) {
            next.0.push(goal);
        }
        next
    }

    /// A copy with `goal` removed if selected, appended otherwise.
    pub fn toggled(&self, goal: ForecastGoal) -> Self {
        if self.contains(goal) {
            Self(self.0.iter().copied().filter(|g| *g != goal).collect())
        } else {
            self.with_appended(goal)
        }
    }

    /// Encode to the persisted JSON array form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode the persisted JSON array form.
    ///
    /// Returns `None` for anything that is not an array made entirely of
    /// known goal names. A single bad element rejects the whole value.
    pub fn from_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Vec<ForecastGoal>>(raw) {
            Ok(goals) => Some(Self::new(goals)),
            Err(e) => {
                tracing::debug!("discarding malformed goal selection: {}", e);
                None
            }
        }
    }
}

impl From<Vec<ForecastGoal>> for GoalSelection {
    fn from(goals: Vec<ForecastGoal>) -> Self {
        Self::new(goals)
    }
}

impl From<ForecastGoal> for GoalSelection {
    fn from(goal: ForecastGoal) -> Self {
        Self(vec![goal])
    }
}

impl fmt::Display for GoalSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(none)");
        }
        let names: Vec<&str> = self.0.iter().map(|g| g.as_str()).collect();
        write!(f, "{}", names.join(", "))
    }
}

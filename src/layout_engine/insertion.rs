use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::LayoutError;

/// Where a newly opened window is attached to the existing tree.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case", try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum InsertionMode {
    /// Wrap the whole tree in a new row split.
    Row,
    /// Wrap the whole tree in a new column split.
    Column,
    /// Split the shallowest leaf, alternating against its parent's direction.
    #[default]
    Smart,
}

impl InsertionMode {
    pub fn from_name(name: &str) -> Result<Self, LayoutError> {
        name.parse().map_err(|_| {
            LayoutError::InvalidLayoutConfig(format!(
                "unknown insertion mode '{name}' (expected row, column or smart)"
            ))
        })
    }
}

impl TryFrom<String> for InsertionMode {
    type Error = LayoutError;

    fn try_from(name: String) -> Result<Self, Self::Error> { Self::from_name(&name) }
}

/// Which side of the new split receives the new window.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case", try_from = "String")]
#[strum(serialize_all = "snake_case")]
pub enum InsertionPosition {
    First,
    #[default]
    Second,
}

impl InsertionPosition {
    pub fn from_name(name: &str) -> Result<Self, LayoutError> {
        name.parse().map_err(|_| {
            LayoutError::InvalidLayoutConfig(format!(
                "unknown insertion position '{name}' (expected first or second)"
            ))
        })
    }

    /// Orders `(existing, new)` into `(first, second)`.
    pub fn arrange<T>(self, existing: T, new: T) -> (T, T) {
        match self {
            InsertionPosition::First => (new, existing),
            InsertionPosition::Second => (existing, new),
        }
    }
}

impl TryFrom<String> for InsertionPosition {
    type Error = LayoutError;

    fn try_from(name: String) -> Result<Self, Self::Error> { Self::from_name(&name) }
}

/// Global insertion policy applied to every window opened until it changes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub insertion_mode: InsertionMode,
    pub split_percentage: f64,
    pub insertion_position: InsertionPosition,
}

pub const DEFAULT_SPLIT_PERCENTAGE: f64 = 50.0;

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            insertion_mode: InsertionMode::default(),
            split_percentage: DEFAULT_SPLIT_PERCENTAGE,
            insertion_position: InsertionPosition::default(),
        }
    }
}

impl LayoutConfig {
    pub fn new(
        insertion_mode: InsertionMode,
        split_percentage: f64,
        insertion_position: InsertionPosition,
    ) -> Self {
        Self {
            insertion_mode,
            split_percentage,
            insertion_position,
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if !is_valid_split_percentage(self.split_percentage) {
            return Err(LayoutError::InvalidLayoutConfig(format!(
                "split_percentage must be strictly between 0 and 100, got {}",
                self.split_percentage
            )));
        }
        Ok(())
    }
}

pub(crate) fn is_valid_split_percentage(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value < 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mode_is_rejected() {
        assert_eq!(InsertionMode::from_name("smart").unwrap(), InsertionMode::Smart);
        assert_eq!(InsertionMode::from_name("row").unwrap(), InsertionMode::Row);
        let err = InsertionMode::from_name("spiral").unwrap_err();
        assert!(matches!(err, LayoutError::InvalidLayoutConfig(ref msg) if msg.contains("spiral")));
    }

    #[test]
    fn unknown_mode_fails_deserialization() {
        let json = r#"{"insertionMode":"grid","splitPercentage":50,"insertionPosition":"first"}"#;
        let err = serde_json::from_str::<LayoutConfig>(json).unwrap_err();
        assert!(
            err.to_string().starts_with("invalid layout config: unknown insertion mode 'grid'"),
            "{err}"
        );

        let json = r#"{"insertionMode":"row","splitPercentage":50,"insertionPosition":"middle"}"#;
        let err = serde_json::from_str::<LayoutConfig>(json).unwrap_err();
        assert!(err.to_string().contains("unknown insertion position 'middle'"), "{err}");
    }

    #[test]
    fn names_deserialize_through_from_name() {
        let config: LayoutConfig = serde_json::from_str(
            r#"{"insertionMode":"column","splitPercentage":40,"insertionPosition":"first"}"#,
        )
        .unwrap();
        assert_eq!(config, LayoutConfig::new(InsertionMode::Column, 40.0, InsertionPosition::First));
        assert_eq!(InsertionMode::try_from("smart".to_string()).unwrap(), InsertionMode::Smart);
        assert!(matches!(
            InsertionPosition::try_from("left".to_string()),
            Err(LayoutError::InvalidLayoutConfig(_))
        ));
    }

    #[test]
    fn config_uses_camel_case_fields() {
        let config = LayoutConfig::new(InsertionMode::Column, 30.0, InsertionPosition::First);
        let json = serde_json::to_value(config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "insertionMode": "column",
                "splitPercentage": 30.0,
                "insertionPosition": "first",
            })
        );
    }

    #[test]
    fn split_percentage_bounds_are_exclusive() {
        for bad in [0.0, 100.0, -5.0, 150.0, f64::NAN, f64::INFINITY] {
            let config = LayoutConfig {
                split_percentage: bad,
                ..LayoutConfig::default()
            };
            assert!(config.validate().is_err(), "{bad} should be rejected");
        }
        for good in [0.5, 50.0, 99.9] {
            let config = LayoutConfig {
                split_percentage: good,
                ..LayoutConfig::default()
            };
            assert!(config.validate().is_ok(), "{good} should be accepted");
        }
    }

    #[test]
    fn arrange_orders_new_window() {
        assert_eq!(InsertionPosition::First.arrange("old", "new"), ("new", "old"));
        assert_eq!(InsertionPosition::Second.arrange("old", "new"), ("old", "new"));
    }
}

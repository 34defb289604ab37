use super::RoadmapError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::OnceLock};

pub const GRID_COLUMNS: i32 = 6;
pub const MAX_LABEL_CHARS: usize = 100;
pub const DEFAULT_BG_COLOR: &str = "#F8F8FC";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Half {
    Top,
    Bottom,
}

impl fmt::Display for Half {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => formatter.write_str("TOP"),
            Self::Bottom => formatter.write_str("BOTTOM"),
        }
    }
}

impl std::str::FromStr for Half {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "TOP" => Ok(Self::Top),
            "BOTTOM" => Ok(Self::Bottom),
            other => Err(format!("invalid half: {other} (expected TOP or BOTTOM)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapItem {
    pub id: i64,
    pub half: Half,
    pub row: i32,
    pub col_start: i32,
    pub col_span: i32,
    pub label: String,
    pub bg_color: String,
    pub text_color: String,
    pub order: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoadmapItem {
    pub half: Half,
    pub row: i32,
    pub col_start: i32,
    pub col_span: i32,
    pub label: String,
    pub bg_color: String,
    pub text_color: String,
    pub order: i32,
}

impl NewRoadmapItem {
    #[must_use]
    pub fn new(half: Half, label: &str) -> Self {
        Self {
            half,
            label: label.to_string(),
            ..Self::default()
        }
    }

    /// # Errors
    /// Returns the first field that violates the grid constraints.
    pub fn validate(&self) -> Result<(), RoadmapError> {
        validate_label(&self.label)?;
        validate_row(self.row)?;
        validate_columns(self.col_start, self.col_span)?;
        validate_color("bg_color", &self.bg_color)?;
        validate_color("text_color", &self.text_color)
    }
}

impl Default for NewRoadmapItem {
    fn default() -> Self {
        Self {
            half: Half::Top,
            row: 0,
            col_start: 1,
            col_span: 1,
            label: String::new(),
            bg_color: DEFAULT_BG_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            order: 0,
        }
    }
}

impl From<RoadmapItem> for NewRoadmapItem {
    fn from(item: RoadmapItem) -> Self {
        Self {
            half: item.half,
            row: item.row,
            col_start: item.col_start,
            col_span: item.col_span,
            label: item.label,
            bg_color: item.bg_color,
            text_color: item.text_color,
            order: item.order,
        }
    }
}

/// Partial update; unset fields are left out of the request body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoadmapPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half: Option<Half>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_start: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_span: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl RoadmapPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks the fields that are set. Column bounds are checked per field when
    /// only one of start and span is present.
    ///
    /// # Errors
    /// Returns the first field that violates the grid constraints.
    pub fn validate(&self) -> Result<(), RoadmapError> {
        if let Some(label) = &self.label {
            validate_label(label)?;
        }
        if let Some(row) = self.row {
            validate_row(row)?;
        }
        match (self.col_start, self.col_span) {
            (Some(start), Some(span)) => validate_columns(start, span)?,
            (Some(start), None) => validate_columns(start, 1)?,
            (None, Some(span)) => validate_columns(1, span)?,
            (None, None) => {}
        }
        if let Some(color) = &self.bg_color {
            validate_color("bg_color", color)?;
        }
        if let Some(color) = &self.text_color {
            validate_color("text_color", color)?;
        }
        Ok(())
    }
}

fn validate_label(label: &str) -> Result<(), RoadmapError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(RoadmapError::LabelRequired);
    }
    if label.chars().count() > MAX_LABEL_CHARS {
        return Err(RoadmapError::LabelTooLong {
            max: MAX_LABEL_CHARS,
        });
    }
    Ok(())
}

const fn validate_row(row: i32) -> Result<(), RoadmapError> {
    if row < 0 {
        Err(RoadmapError::NegativeRow)
    } else {
        Ok(())
    }
}

fn validate_columns(col_start: i32, col_span: i32) -> Result<(), RoadmapError> {
    let start_ok = (1..=GRID_COLUMNS).contains(&col_start);
    let span_ok = (1..=GRID_COLUMNS).contains(&col_span);

    if start_ok && span_ok && col_start + col_span - 1 <= GRID_COLUMNS {
        Ok(())
    } else {
        Err(RoadmapError::ColumnsOutOfRange {
            col_start,
            col_span,
        })
    }
}

fn validate_color(field: &'static str, value: &str) -> Result<(), RoadmapError> {
    static HEX_COLOR: OnceLock<Option<Regex>> = OnceLock::new();

    let valid = HEX_COLOR
        .get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value));

    if valid {
        Ok(())
    } else {
        Err(RoadmapError::InvalidColor {
            field,
            value: value.to_string(),
        })
    }
}

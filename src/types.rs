use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tabled::Tabled;

use crate::error::UnknownColumn;

/// Column holding the collision date in the fact table.
pub const DATE_COLUMN: &str = "accident_date";
/// Column holding the weekday name in the fact table.
pub const WEEKDAY_COLUMN: &str = "weekday";
/// Latitude column in the fact table.
pub const LAT_COLUMN: &str = "lat";
/// Longitude column in the fact table.
pub const LONG_COLUMN: &str = "long";

/// Canonical weekday ordering used for grouped counts.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// One fact table row exactly as it appears in the CSV file.
#[derive(Debug, Deserialize)]
pub struct RawFactRow {
    #[serde(rename = "accident_date")]
    pub accident_date: Option<String>,
    #[serde(rename = "weekday")]
    pub weekday: Option<String>,
    #[serde(rename = "num_of_injuries")]
    pub num_of_injuries: Option<String>,
    #[serde(rename = "num_of_pedestrians")]
    pub num_of_pedestrians: Option<String>,
    #[serde(rename = "num_of_vehicle")]
    pub num_of_vehicle: Option<String>,
    #[serde(rename = "lat")]
    pub lat: Option<String>,
    #[serde(rename = "long")]
    pub long: Option<String>,
    #[serde(rename = "location_type_id")]
    pub location_type_id: Option<String>,
    #[serde(rename = "Classificationid")]
    pub classification_id: Option<String>,
    #[serde(rename = "impactid")]
    pub impact_id: Option<String>,
    #[serde(rename = "road_conditionid")]
    pub road_condition_id: Option<String>,
    #[serde(rename = "environmentid")]
    pub environment_id: Option<String>,
    #[serde(rename = "lightid")]
    pub light_id: Option<String>,
    #[serde(rename = "trafficid")]
    pub traffic_id: Option<String>,
    #[serde(rename = "injuryid")]
    pub injury_id: Option<String>,
}

impl RawFactRow {
    /// Raw foreign key text for the given dimension.
    pub fn foreign_key(&self, dim: Dimension) -> Option<&str> {
        match dim {
            Dimension::LocationType => self.location_type_id.as_deref(),
            Dimension::ClassificationOfAccident => self.classification_id.as_deref(),
            Dimension::InitialImpactType => self.impact_id.as_deref(),
            Dimension::RoadSurfaceCondition => self.road_condition_id.as_deref(),
            Dimension::EnvironmentCondition => self.environment_id.as_deref(),
            Dimension::Light => self.light_id.as_deref(),
            Dimension::TrafficControl => self.traffic_id.as_deref(),
            Dimension::MaxInjury => self.injury_id.as_deref(),
        }
    }
}

/// A lookup dimension: one workbook sheet mapping an id to a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    LocationType,
    ClassificationOfAccident,
    InitialImpactType,
    RoadSurfaceCondition,
    EnvironmentCondition,
    Light,
    TrafficControl,
    MaxInjury,
}

impl Dimension {
    pub const ALL: [Self; 8] = [
        Self::LocationType,
        Self::ClassificationOfAccident,
        Self::InitialImpactType,
        Self::RoadSurfaceCondition,
        Self::EnvironmentCondition,
        Self::Light,
        Self::TrafficControl,
        Self::MaxInjury,
    ];

    /// Name of the workbook sheet holding this lookup table.
    #[must_use]
    pub const fn sheet_name(self) -> &'static str {
        match self {
            Self::LocationType => "Dimlocation_type",
            Self::ClassificationOfAccident => "Dimclassification_of_accident",
            Self::InitialImpactType => "Diminitial_impact_type",
            Self::RoadSurfaceCondition => "Dimroad_surface_condition",
            Self::EnvironmentCondition => "Dimenvironment_condition",
            Self::Light => "Dimlight",
            Self::TrafficControl => "Dimtraffic_control",
            Self::MaxInjury => "Dimmax_injury",
        }
    }

    /// Foreign key column, shared by the fact table and the lookup sheet.
    #[must_use]
    pub const fn key_column(self) -> &'static str {
        match self {
            Self::LocationType => "location_type_id",
            Self::ClassificationOfAccident => "Classificationid",
            Self::InitialImpactType => "impactid",
            Self::RoadSurfaceCondition => "road_conditionid",
            Self::EnvironmentCondition => "environmentid",
            Self::Light => "lightid",
            Self::TrafficControl => "trafficid",
            Self::MaxInjury => "injuryid",
        }
    }

    /// Label column the join adds to the denormalized table.
    #[must_use]
    pub const fn label_column(self) -> &'static str {
        match self {
            Self::LocationType => "location_type",
            Self::ClassificationOfAccident => "classification_of_accident",
            Self::InitialImpactType => "initial_impact_type",
            Self::RoadSurfaceCondition => "road_surface_condition",
            Self::EnvironmentCondition => "environment_condition",
            Self::Light => "light",
            Self::TrafficControl => "traffic_control",
            Self::MaxInjury => "max_injury",
        }
    }
}

/// A categorical column of the denormalized table.
///
/// The string form is the column name (`year` is derived from
/// `accident_date`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum Attribute {
    Year,
    Weekday,
    LocationType,
    ClassificationOfAccident,
    InitialImpactType,
    RoadSurfaceCondition,
    EnvironmentCondition,
    Light,
    TrafficControl,
    MaxInjury,
}

impl Attribute {
    /// Parses a column name such as `location_type`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownColumn`] when no categorical column has that name.
    pub fn from_column(name: &str) -> Result<Self, UnknownColumn> {
        name.trim()
            .parse()
            .map_err(|_| UnknownColumn(name.to_string()))
    }

    /// Human readable caption for filter controls.
    #[must_use]
    pub const fn caption(self) -> &'static str {
        match self {
            Self::Year => "Year",
            Self::Weekday => "Day of Week",
            Self::LocationType => "Location Type",
            Self::ClassificationOfAccident => "Classification",
            Self::InitialImpactType => "Impact Type",
            Self::RoadSurfaceCondition => "Road Surface Condition",
            Self::EnvironmentCondition => "Environment Condition",
            Self::Light => "Light Condition",
            Self::TrafficControl => "Traffic Control",
            Self::MaxInjury => "Max Injury",
        }
    }

    /// The lookup dimension behind this attribute, if any.
    #[must_use]
    pub const fn dimension(self) -> Option<Dimension> {
        match self {
            Self::Year | Self::Weekday => None,
            Self::LocationType => Some(Dimension::LocationType),
            Self::ClassificationOfAccident => Some(Dimension::ClassificationOfAccident),
            Self::InitialImpactType => Some(Dimension::InitialImpactType),
            Self::RoadSurfaceCondition => Some(Dimension::RoadSurfaceCondition),
            Self::EnvironmentCondition => Some(Dimension::EnvironmentCondition),
            Self::Light => Some(Dimension::Light),
            Self::TrafficControl => Some(Dimension::TrafficControl),
            Self::MaxInjury => Some(Dimension::MaxInjury),
        }
    }
}

/// A numeric column of the fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Measure {
    NumOfInjuries,
    NumOfPedestrians,
    NumOfVehicle,
}

impl Measure {
    pub const ALL: [Self; 3] = [Self::NumOfInjuries, Self::NumOfPedestrians, Self::NumOfVehicle];

    /// Column name in the fact table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::NumOfInjuries => "num_of_injuries",
            Self::NumOfPedestrians => "num_of_pedestrians",
            Self::NumOfVehicle => "num_of_vehicle",
        }
    }

    /// Parses a column name such as `num_of_injuries`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownColumn`] when no numeric column has that name.
    pub fn from_column(name: &str) -> Result<Self, UnknownColumn> {
        name.trim()
            .parse()
            .map_err(|_| UnknownColumn(name.to_string()))
    }
}

impl Serialize for Measure {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.column())
    }
}

/// One collision with every lookup label resolved.
///
/// Built once by the loader; the pipeline only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollisionRecord {
    pub accident_date: Option<NaiveDate>,
    pub weekday: Option<String>,
    pub num_of_injuries: Option<f64>,
    pub num_of_pedestrians: Option<f64>,
    pub num_of_vehicle: Option<f64>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub location_type_id: Option<i64>,
    #[serde(rename = "Classificationid")]
    pub classification_id: Option<i64>,
    #[serde(rename = "impactid")]
    pub impact_id: Option<i64>,
    #[serde(rename = "road_conditionid")]
    pub road_condition_id: Option<i64>,
    #[serde(rename = "environmentid")]
    pub environment_id: Option<i64>,
    #[serde(rename = "lightid")]
    pub light_id: Option<i64>,
    #[serde(rename = "trafficid")]
    pub traffic_id: Option<i64>,
    #[serde(rename = "injuryid")]
    pub injury_id: Option<i64>,
    pub location_type: Option<String>,
    pub classification_of_accident: Option<String>,
    pub initial_impact_type: Option<String>,
    pub road_surface_condition: Option<String>,
    pub environment_condition: Option<String>,
    pub light: Option<String>,
    pub traffic_control: Option<String>,
    pub max_injury: Option<String>,
}

impl CollisionRecord {
    /// Exported column names, in field order.
    pub const HEADERS: [&'static str; 23] = [
        "accident_date",
        "weekday",
        "num_of_injuries",
        "num_of_pedestrians",
        "num_of_vehicle",
        "lat",
        "long",
        "location_type_id",
        "Classificationid",
        "impactid",
        "road_conditionid",
        "environmentid",
        "lightid",
        "trafficid",
        "injuryid",
        "location_type",
        "classification_of_accident",
        "initial_impact_type",
        "road_surface_condition",
        "environment_condition",
        "light",
        "traffic_control",
        "max_injury",
    ];

    /// Year component of the accident date.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.accident_date.map(|d| d.year())
    }

    #[must_use]
    pub fn foreign_key(&self, dim: Dimension) -> Option<i64> {
        match dim {
            Dimension::LocationType => self.location_type_id,
            Dimension::ClassificationOfAccident => self.classification_id,
            Dimension::InitialImpactType => self.impact_id,
            Dimension::RoadSurfaceCondition => self.road_condition_id,
            Dimension::EnvironmentCondition => self.environment_id,
            Dimension::Light => self.light_id,
            Dimension::TrafficControl => self.traffic_id,
            Dimension::MaxInjury => self.injury_id,
        }
    }

    /// Resolved lookup label for the given dimension.
    #[must_use]
    pub fn label(&self, dim: Dimension) -> Option<&str> {
        match dim {
            Dimension::LocationType => self.location_type.as_deref(),
            Dimension::ClassificationOfAccident => self.classification_of_accident.as_deref(),
            Dimension::InitialImpactType => self.initial_impact_type.as_deref(),
            Dimension::RoadSurfaceCondition => self.road_surface_condition.as_deref(),
            Dimension::EnvironmentCondition => self.environment_condition.as_deref(),
            Dimension::Light => self.light.as_deref(),
            Dimension::TrafficControl => self.traffic_control.as_deref(),
            Dimension::MaxInjury => self.max_injury.as_deref(),
        }
    }

    pub(crate) fn label_slot(&mut self, dim: Dimension) -> &mut Option<String> {
        match dim {
            Dimension::LocationType => &mut self.location_type,
            Dimension::ClassificationOfAccident => &mut self.classification_of_accident,
            Dimension::InitialImpactType => &mut self.initial_impact_type,
            Dimension::RoadSurfaceCondition => &mut self.road_surface_condition,
            Dimension::EnvironmentCondition => &mut self.environment_condition,
            Dimension::Light => &mut self.light,
            Dimension::TrafficControl => &mut self.traffic_control,
            Dimension::MaxInjury => &mut self.max_injury,
        }
    }

    /// Text value of a label-valued attribute. `Year` is numeric and goes
    /// through [`CollisionRecord::year`] instead.
    #[must_use]
    pub fn text(&self, attr: Attribute) -> Option<&str> {
        match attr {
            Attribute::Year => None,
            Attribute::Weekday => self.weekday.as_deref(),
            other => other.dimension().and_then(|dim| self.label(dim)),
        }
    }

    #[must_use]
    pub const fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::NumOfInjuries => self.num_of_injuries,
            Measure::NumOfPedestrians => self.num_of_pedestrians,
            Measure::NumOfVehicle => self.num_of_vehicle,
        }
    }
}

/// Label and row count, as shown in bar and pie charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct CountRow {
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

impl CountRow {
    pub const HEADERS: [&'static str; 2] = ["Label", "Count"];
}

/// A collision location for the map view.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct MapPoint {
    #[serde(rename = "lat")]
    #[tabled(rename = "lat")]
    pub lat: f64,
    #[serde(rename = "longitude")]
    #[tabled(rename = "longitude")]
    pub longitude: f64,
}

/// Compact rendering of a collision for console previews.
#[derive(Debug, Clone, Tabled)]
pub struct RecordPreviewRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Weekday")]
    pub weekday: String,
    #[tabled(rename = "Location")]
    pub location_type: String,
    #[tabled(rename = "Light")]
    pub light: String,
    #[tabled(rename = "Surface")]
    pub road_surface_condition: String,
    #[tabled(rename = "Injuries")]
    pub injuries: String,
    #[tabled(rename = "Vehicles")]
    pub vehicles: String,
}

/// Headline figures for the KPI block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_collisions: usize,
    pub total_injuries: f64,
    pub pedestrian_involved: usize,
    pub vehicles_involved: f64,
}

/// Alert shown under the KPI block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertLevel {
    None,
    HighVolume,
    HighInjury,
}

/// Most frequent conditions in a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyConditions {
    pub most_frequent_day: String,
    pub most_common_light: String,
    pub top_road_surface: String,
}

/// Direction of a filtered rate relative to the overall rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RateTrend {
    Above,
    Below,
    Equal,
}

/// Filtered versus overall per-collision rate of one measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateComparison {
    pub measure: Measure,
    pub filtered: f64,
    pub overall: f64,
    pub difference: f64,
    pub trend: RateTrend,
}

/// Everything written to `summary.json` by the export command.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub kpis: Kpis,
    pub alert: AlertLevel,
    pub key_conditions: KeyConditions,
    pub rate_comparison: RateComparison,
}

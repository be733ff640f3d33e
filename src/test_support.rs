use crate::types::CollisionRecord;
use crate::util::parse_date;

/// A collision with the handful of fields the unit tests look at.
pub fn record(
    date: &str,
    weekday: &str,
    location_type: &str,
    light: &str,
    injuries: f64,
) -> CollisionRecord {
    CollisionRecord {
        accident_date: parse_date(date),
        weekday: Some(weekday.to_string()),
        num_of_injuries: Some(injuries),
        num_of_pedestrians: Some(0.0),
        num_of_vehicle: Some(1.0),
        lat: None,
        long: None,
        location_type_id: None,
        classification_id: None,
        impact_id: None,
        road_condition_id: None,
        environment_id: None,
        light_id: None,
        traffic_id: None,
        injury_id: None,
        location_type: Some(location_type.to_string()),
        classification_of_accident: None,
        initial_impact_type: None,
        road_surface_condition: None,
        environment_condition: None,
        light: Some(light.to_string()),
        traffic_control: None,
        max_injury: None,
    }
}

use crate::aggregate::{
    compare_rate, count, count_positive, group_count, mode, rate, sum_numeric,
};
use crate::config::AlertConfig;
use crate::types::{
    AlertLevel, Attribute, CollisionRecord, CountRow, DashboardSummary, KeyConditions, Kpis,
    Measure, RateComparison, RateTrend, RecordPreviewRow,
};
use crate::util::format_number;

pub fn kpis(table: &[CollisionRecord]) -> Kpis {
    Kpis {
        total_collisions: count(table),
        total_injuries: sum_numeric(table, Measure::NumOfInjuries),
        pedestrian_involved: count_positive(table, Measure::NumOfPedestrians),
        vehicles_involved: sum_numeric(table, Measure::NumOfVehicle),
    }
}

/// Injury volume takes precedence over collision volume.
pub fn alert_level(kpis: &Kpis, alerts: &AlertConfig) -> AlertLevel {
    if kpis.total_injuries > alerts.injury_threshold {
        AlertLevel::HighInjury
    } else if kpis.total_collisions > alerts.volume_threshold {
        AlertLevel::HighVolume
    } else {
        AlertLevel::None
    }
}

pub fn key_conditions(table: &[CollisionRecord]) -> KeyConditions {
    KeyConditions {
        most_frequent_day: mode(table, Attribute::Weekday),
        most_common_light: mode(table, Attribute::Light),
        top_road_surface: mode(table, Attribute::RoadSurfaceCondition),
    }
}

pub fn rate_comparison(
    filtered: &[CollisionRecord],
    overall: &[CollisionRecord],
    measure: Measure,
) -> RateComparison {
    let difference = compare_rate(filtered, overall, measure);
    let trend = if difference > 0.0 {
        RateTrend::Above
    } else if difference < 0.0 {
        RateTrend::Below
    } else {
        RateTrend::Equal
    };
    RateComparison {
        measure,
        filtered: rate(filtered, measure),
        overall: rate(overall, measure),
        difference,
        trend,
    }
}

pub fn classification_breakdown(table: &[CollisionRecord]) -> Vec<CountRow> {
    group_count(table, Attribute::ClassificationOfAccident)
}

pub fn generate_summary(
    overall: &[CollisionRecord],
    filtered: &[CollisionRecord],
    alerts: &AlertConfig,
    measure: Measure,
) -> DashboardSummary {
    let kpis = kpis(filtered);
    let alert = alert_level(&kpis, alerts);
    DashboardSummary {
        total_rows: overall.len(),
        filtered_rows: filtered.len(),
        alert,
        kpis,
        key_conditions: key_conditions(filtered),
        rate_comparison: rate_comparison(filtered, overall, measure),
    }
}

pub fn preview_rows(table: &[CollisionRecord], max_rows: usize) -> Vec<RecordPreviewRow> {
    let text = |v: Option<&str>| v.unwrap_or_default().to_string();
    let number = |v: Option<f64>| v.map(|n| format_number(n, 0)).unwrap_or_default();
    table
        .iter()
        .take(max_rows)
        .map(|r| RecordPreviewRow {
            date: r.accident_date.map(|d| d.to_string()).unwrap_or_default(),
            weekday: text(r.weekday.as_deref()),
            location_type: text(r.location_type.as_deref()),
            light: text(r.light.as_deref()),
            road_surface_condition: text(r.road_surface_condition.as_deref()),
            injuries: number(r.num_of_injuries),
            vehicles: number(r.num_of_vehicle),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    fn alerts() -> AlertConfig {
        AlertConfig {
            injury_threshold: 3.0,
            volume_threshold: 2,
        }
    }

    #[test]
    fn kpis_count_pedestrian_rows_not_pedestrians() {
        let mut t = vec![
            record("2019-01-01", "Tuesday", "A", "Dark", 1.0),
            record("2019-01-02", "Wednesday", "A", "Dark", 0.0),
        ];
        t[0].num_of_pedestrians = Some(3.0);
        let k = kpis(&t);
        assert_eq!(k.total_collisions, 2);
        assert_eq!(k.pedestrian_involved, 1);
        assert!((k.vehicles_involved - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn injury_alert_wins_over_volume_alert() {
        let t: Vec<_> = (0..3)
            .map(|_| record("2019-01-01", "Tuesday", "A", "Dark", 2.0))
            .collect();
        assert_eq!(alert_level(&kpis(&t), &alerts()), AlertLevel::HighInjury);
        let t: Vec<_> = (0..3)
            .map(|_| record("2019-01-01", "Tuesday", "A", "Dark", 0.0))
            .collect();
        assert_eq!(alert_level(&kpis(&t), &alerts()), AlertLevel::HighVolume);
        assert_eq!(alert_level(&kpis(&t[..1]), &alerts()), AlertLevel::None);
    }

    #[test]
    fn key_conditions_of_empty_table_are_not_available() {
        let k = key_conditions(&[]);
        assert_eq!(k.most_frequent_day, "N/A");
        assert_eq!(k.most_common_light, "N/A");
        assert_eq!(k.top_road_surface, "N/A");
    }

    #[test]
    fn rate_comparison_reports_direction() {
        let overall = vec![
            record("2019-01-01", "Tuesday", "A", "Dark", 1.0),
            record("2019-01-01", "Tuesday", "A", "Dark", 3.0),
        ];
        let c = rate_comparison(&overall[1..], &overall, Measure::NumOfInjuries);
        assert_eq!(c.trend, RateTrend::Above);
        assert!((c.difference - 1.0).abs() < 1e-9);
        let c = rate_comparison(&[], &overall, Measure::NumOfInjuries);
        assert_eq!(c.trend, RateTrend::Below);
        assert!(c.filtered.abs() < f64::EPSILON);
    }

    #[test]
    fn preview_is_truncated() {
        let t = vec![
            record("2019-01-01", "Tuesday", "A", "Dark", 1.0),
            record("2019-01-02", "Wednesday", "B", "Dusk", 0.0),
        ];
        let rows = preview_rows(&t, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2019-01-01");
        assert_eq!(rows[0].injuries, "1");
    }
}

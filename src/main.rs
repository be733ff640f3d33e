// Entry point and terminal presentation of the collision dashboard.
//
// The binary plays the role of the dashboard page:
// - `dashboard` prints KPIs, charts as tables, the map view and the key
//   condition summaries for the global filter,
// - `domains` lists the values each filter accepts,
// - `export` writes the filtered rows, the lookup tables and a JSON summary.
// Each panel is computed independently so one failing panel does not hide
// the others.
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use traffic_report::aggregate::{group_count, map_points, monthly_counts};
use traffic_report::config::Config;
use traffic_report::filter::{apply, domains, GLOBAL_FILTERS, MAP_FILTERS};
use traffic_report::output;
use traffic_report::reports;
use traffic_report::types::{AlertLevel, RateTrend};
use traffic_report::util::{format_int, format_number};
use traffic_report::{
    Attribute, CollisionRecord, Dataset, FilterError, Measure, Selection, Session,
};

/// Explore the traffic collision dataset from the terminal.
#[derive(Parser)]
#[command(name = "traffic_report")]
#[command(about = "Traffic collision dashboard")]
struct Cli {
    /// Path to a TOML config file (defaults to `traffic_report.toml` if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fact table CSV, overriding the config.
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Lookup workbook (spreadsheet or directory of CSV sheets), overriding the config.
    #[arg(long)]
    lookups: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the dashboard for the selected filters.
    Dashboard {
        #[command(flatten)]
        filters: GlobalFilterArgs,

        #[command(flatten)]
        map: MapFilterArgs,

        /// Numeric column compared between filtered and overall data.
        #[arg(long, default_value = "num_of_injuries")]
        rate_column: String,
    },

    /// List the selectable values of every filter.
    Domains,

    /// Write filtered rows, lookup tables and a summary to a directory.
    Export {
        #[command(flatten)]
        filters: GlobalFilterArgs,

        /// Numeric column compared between filtered and overall data.
        #[arg(long, default_value = "num_of_injuries")]
        rate_column: String,

        /// Output directory.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

/// Global (sidebar) filter. Every flag may be repeated.
#[derive(Args, Default)]
struct GlobalFilterArgs {
    #[arg(long = "year")]
    years: Vec<String>,
    #[arg(long = "weekday")]
    weekdays: Vec<String>,
    #[arg(long = "location")]
    locations: Vec<String>,
    #[arg(long = "light")]
    lights: Vec<String>,
    #[arg(long = "impact")]
    impacts: Vec<String>,
    #[arg(long = "environment")]
    environments: Vec<String>,
    #[arg(long = "surface")]
    surfaces: Vec<String>,
}

impl GlobalFilterArgs {
    fn selection(&self) -> Result<Selection, FilterError> {
        Selection::new()
            .with(Attribute::Year, &self.years)?
            .with(Attribute::Weekday, &self.weekdays)?
            .with(Attribute::LocationType, &self.locations)?
            .with(Attribute::Light, &self.lights)?
            .with(Attribute::InitialImpactType, &self.impacts)?
            .with(Attribute::EnvironmentCondition, &self.environments)?
            .with(Attribute::RoadSurfaceCondition, &self.surfaces)
    }
}

/// Map filter, independent of the global filter.
#[derive(Args, Default)]
struct MapFilterArgs {
    #[arg(long = "map-year", id = "map_years")]
    years: Vec<String>,
    #[arg(long = "map-location", id = "map_locations")]
    locations: Vec<String>,
    #[arg(long = "map-light", id = "map_lights")]
    lights: Vec<String>,
    #[arg(long = "map-environment", id = "map_environments")]
    environments: Vec<String>,
    #[arg(long = "map-surface", id = "map_surfaces")]
    surfaces: Vec<String>,
}

impl MapFilterArgs {
    fn selection(&self) -> Result<Selection, FilterError> {
        Selection::new()
            .with(Attribute::Year, &self.years)?
            .with(Attribute::LocationType, &self.locations)?
            .with(Attribute::Light, &self.lights)?
            .with(Attribute::EnvironmentCondition, &self.environments)?
            .with(Attribute::RoadSurfaceCondition, &self.surfaces)
    }
}

fn init_logger() {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .try_init()
        .ok();
}

/// Run one dashboard panel; failures are logged and reported generically.
fn panel<F>(name: &str, render: F)
where
    F: FnOnce() -> Result<(), Box<dyn Error>>,
{
    if let Err(e) = render() {
        log::error!("Visualization error in {}: {}", name, e);
        println!("Failed to render {}.\n", name);
    }
}

/// Apply the global filter, falling back to the full table if the filter
/// itself is invalid.
fn filtered_rows(
    records: &[CollisionRecord],
    filters: &GlobalFilterArgs,
) -> Vec<CollisionRecord> {
    match filters.selection() {
        Ok(selection) => apply(records, &selection),
        Err(e) => {
            log::error!("Error in filter processing: {}", e);
            println!("An error occurred while filtering data.\n");
            records.to_vec()
        }
    }
}

fn run_dashboard(
    config: &Config,
    data: &Dataset,
    filters: &GlobalFilterArgs,
    map: &MapFilterArgs,
    rate_column: &str,
) {
    let all = &data.records;
    let filtered = filtered_rows(all, filters);

    println!("Traffic Collision Report");
    println!(
        "({} of {} collisions match the global filter)\n",
        format_int(filtered.len()),
        format_int(all.len())
    );

    panel("KPIs", || {
        let kpis = reports::kpis(&filtered);
        println!("Total Collisions: {}", format_int(kpis.total_collisions));
        println!("Total Injuries: {}", format_number(kpis.total_injuries, 0));
        println!("Pedestrian Involved: {}", format_int(kpis.pedestrian_involved));
        println!("Vehicles Involved: {}\n", format_number(kpis.vehicles_involved, 0));
        match reports::alert_level(&kpis, &config.alerts) {
            AlertLevel::HighInjury => println!(
                "High Injury Alert: More than {} injuries in filtered data!\n",
                format_number(config.alerts.injury_threshold, 0)
            ),
            AlertLevel::HighVolume => println!(
                "High Volume: More than {} collisions!\n",
                format_int(config.alerts.volume_threshold)
            ),
            AlertLevel::None => {}
        }
        Ok(())
    });

    panel("monthly collision trend", || {
        println!("Monthly Collision Trend\n");
        let months = monthly_counts(&filtered);
        output::preview_table_rows(&months, months.len());
        Ok(())
    });

    panel("collisions by day of week", || {
        println!("Collisions by Day of Week\n");
        output::preview_table_rows(&group_count(&filtered, Attribute::Weekday), 7);
        Ok(())
    });

    panel("collision map", || {
        println!("Collision Map\n");
        let map_rows = apply(all, &map.selection()?);
        let points = map_points(&map_rows);
        if points.is_empty() {
            println!("No location data available after filtering.\n");
        } else {
            println!("{} located collisions", format_int(points.len()));
            output::preview_table_rows(&points, config.display.preview_rows);
        }
        Ok(())
    });

    panel("accident classification", || {
        println!("Accident Classification (P.D. only means \"Property Damage only\")\n");
        let rows = reports::classification_breakdown(&filtered);
        output::preview_table_rows(&rows, rows.len());
        Ok(())
    });

    panel("key conditions summary", || {
        let key = reports::key_conditions(&filtered);
        println!("Key Conditions Summary\n");
        println!("Most Frequent Day: {}", key.most_frequent_day);
        println!("Most Common Light Condition: {}", key.most_common_light);
        println!("Top Road Surface: {}\n", key.top_road_surface);
        Ok(())
    });

    panel("comparative metrics", || {
        let measure = Measure::from_column(rate_column)?;
        let cmp = reports::rate_comparison(&filtered, all, measure);
        println!("Comparative Metrics ({})\n", measure);
        println!("Rate (Filtered): {}", format_number(cmp.filtered, 2));
        println!("Rate (Overall): {}", format_number(cmp.overall, 2));
        match cmp.trend {
            RateTrend::Above => println!(
                "Rate is {} higher than average.\n",
                format_number(cmp.difference, 2)
            ),
            RateTrend::Below => println!(
                "Rate is {} lower than average.\n",
                format_number(-cmp.difference, 2)
            ),
            RateTrend::Equal => println!("Rate matches the overall average.\n"),
        }
        Ok(())
    });

    panel("filtered collision data", || {
        println!("Filtered Collision Data\n");
        output::preview_table_rows(
            &reports::preview_rows(&filtered, config.display.preview_rows),
            config.display.preview_rows,
        );
        Ok(())
    });
}

fn run_domains(data: &Dataset) {
    let options = domains(&data.records, &GLOBAL_FILTERS);
    for attr in GLOBAL_FILTERS {
        let values = options.get(&attr).map(Vec::as_slice).unwrap_or_default();
        println!("{} ({}):", attr.caption(), attr);
        println!("  {}\n", values.join(", "));
    }
    let map_captions: Vec<&str> = MAP_FILTERS.iter().map(|a| a.caption()).collect();
    println!("Map filters use the same values for: {}", map_captions.join(", "));
}

fn run_export(
    config: &Config,
    data: &Dataset,
    filters: &GlobalFilterArgs,
    rate_column: &str,
    out_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(out_dir)?;
    let filtered = apply(&data.records, &filters.selection()?);

    let rows_path = out_dir.join("filtered_collisions.csv");
    output::write_csv(&rows_path, &filtered)?;
    println!("Filtered data exported to {}", rows_path.display());

    for table in data.lookups.iter() {
        let path = out_dir.join(format!("{}.csv", table.name()));
        output::write_lookup_csv(&path, table)?;
        println!("{} exported to {}", table.name(), path.display());
    }

    let measure = Measure::from_column(rate_column)?;
    let summary = reports::generate_summary(&data.records, &filtered, &config.alerts, measure);
    let summary_path = out_dir.join("summary.json");
    output::write_json(&summary_path, &summary)?;
    println!("Summary exported to {}", summary_path.display());
    Ok(())
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Error reading config: {}", e);
            eprintln!("Failed to read configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = cli.data_file {
        config.data.fact_table = path;
    }
    if let Some(path) = cli.lookups {
        config.data.lookup_workbook = path;
    }

    let session = Session::new(&config.data);
    let Ok(data) = session.dataset() else {
        eprintln!("Failed to load data. Please check the log for details.");
        return ExitCode::FAILURE;
    };

    match cli.command.unwrap_or(Command::Dashboard {
        filters: GlobalFilterArgs::default(),
        map: MapFilterArgs::default(),
        rate_column: Measure::NumOfInjuries.column().to_string(),
    }) {
        Command::Dashboard {
            filters,
            map,
            rate_column,
        } => run_dashboard(&config, data, &filters, &map, &rate_column),
        Command::Domains => run_domains(data),
        Command::Export {
            filters,
            rate_column,
            out_dir,
        } => {
            if let Err(e) = run_export(&config, data, &filters, &rate_column, &out_dir) {
                log::error!("Error rendering final tables: {}", e);
                eprintln!("Unable to export tables.");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

use log::{debug, info, warn};

use crisis_flows::boxplot::*;
use crisis_flows::layout::{ColumnLayout, FlowLayout, LaidOutGraph};
use crisis_flows::present::*;
use crisis_flows::session::FlowSession;
use crisis_flows::*;
use snafu::{prelude::*, ErrorCompat, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dash::config_reader::*;
use crate::dash::io_common::{simplify_file_name, to_disaster_records, to_price_observations};

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet or the worksheet is empty"))]
    EmptyExcel { path: String },
    #[snafu(display("The workbook {path} has no worksheet named {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a number or a string containing a number"))]
    ParsingJsonNumber {},
    #[snafu(display("Column {column} not found in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Could not find the directory of the configuration file"))]
    MissingParentDir {},
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid rules: {source}"))]
    InvalidRules { source: FlowErrors },
    #[snafu(display("Error rendering the chart: {source}"))]
    Rendering { source: FlowErrors },
    #[snafu(display("No data source in the configuration"))]
    NoDataSource {},
    #[snafu(display("Either --config or --input must be provided"))]
    MissingInput {},
    #[snafu(display("Unknown provider {provider:?}: expected csv or xlsx"))]
    UnknownProvider { provider: String },
    #[snafu(display("Unknown chart {chart:?}: expected alluvial or boxplot"))]
    UnknownChart { chart: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;
pub type BDashResult<T> = Result<T, Box<DashError>>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartKind {
    Alluvial,
    BoxPlot,
}

impl ChartKind {
    fn key(&self) -> &'static str {
        match self {
            ChartKind::Alluvial => "alluvial",
            ChartKind::BoxPlot => "boxplot",
        }
    }
}

fn category_key(c: CommodityCategory) -> &'static str {
    CategoryFilter::Only(c).key()
}

// Rounded to the hundredth of a pixel.
fn px(x: f64) -> JSValue {
    json!((x * 100.0).round() / 100.0)
}

fn graph_to_json(graph: &FlowGraph, layout: Option<&LaidOutGraph>) -> FlowResult<JSValue> {
    let mut nodes: Vec<JSValue> = Vec::new();
    for n in graph.nodes.iter() {
        let mut obj: JSMap<String, JSValue> = JSMap::new();
        obj.insert("id".to_string(), json!(n.id.0));
        obj.insert("level".to_string(), json!(n.level.key()));
        obj.insert("name".to_string(), json!(n.name));
        obj.insert("label".to_string(), json!(node_label(n)));
        if let Some(v) = n.value {
            obj.insert("value".to_string(), json!(v));
        }
        obj.insert("throughput".to_string(), json!(n.throughput));
        obj.insert("tooltip".to_string(), json!(node_tooltip(graph, n.id)?));
        if let Some(ln) = layout.and_then(|l| l.node(n.id)) {
            obj.insert(
                "position".to_string(),
                json!({"x0": px(ln.x0), "x1": px(ln.x1), "y0": px(ln.y0), "y1": px(ln.y1)}),
            );
        }
        nodes.push(JSValue::Object(obj));
    }

    let mut edges: Vec<JSValue> = Vec::new();
    for (idx, e) in graph.edges.iter().enumerate() {
        let mut obj: JSMap<String, JSValue> = JSMap::new();
        obj.insert("source".to_string(), json!(e.source.0));
        obj.insert("target".to_string(), json!(e.target.0));
        obj.insert("value".to_string(), json!(e.value));
        obj.insert("tooltip".to_string(), json!(edge_tooltip(graph, idx)?));
        if let Some(link) = layout.and_then(|l| l.links.get(idx)) {
            obj.insert(
                "band".to_string(),
                json!({"width": px(link.width), "y0": px(link.y0), "y1": px(link.y1)}),
            );
        }
        edges.push(JSValue::Object(obj));
    }

    Ok(json!({
        "status": "ok",
        "recordCount": graph.record_count,
        "excludedCount": graph.excluded_count,
        "nodes": nodes,
        "edges": edges,
    }))
}

type FlowResult<T> = Result<T, FlowErrors>;

fn flow_outcome_to_json(outcome: &RenderOutcome, with_layout: bool) -> FlowResult<JSValue> {
    match outcome {
        RenderOutcome::Graph(g) => {
            let layout = if with_layout {
                Some(ColumnLayout::default().layout(g))
            } else {
                None
            };
            graph_to_json(g, layout.as_ref())
        }
        RenderOutcome::NoDataInRange(range) => Ok(json!({
            "status": "noData",
            "message": no_data_message(*range),
        })),
        RenderOutcome::MissingDataset => Ok(json!({
            "status": "missingDataset",
            "message": "The dataset is empty",
        })),
    }
}

fn box_plot_to_json(outcome: &BoxPlotOutcome, filter: CategoryFilter) -> JSValue {
    match outcome {
        BoxPlotOutcome::Boxes(boxes) => {
            let l: Vec<JSValue> = boxes
                .iter()
                .map(|b| {
                    let outlier_tooltips: Vec<String> = b
                        .outliers
                        .iter()
                        .map(|p| outlier_tooltip(&b.commodity, *p))
                        .collect();
                    json!({
                        "commodity": b.commodity,
                        "category": category_key(b.category),
                        "q1": b.q1,
                        "median": b.median,
                        "q3": b.q3,
                        "iqr": b.iqr,
                        "whiskerLow": b.whisker_low,
                        "whiskerHigh": b.whisker_high,
                        "outliers": b.outliers,
                        "min": b.min,
                        "max": b.max,
                        "count": b.count,
                        "tooltip": box_tooltip(b),
                        "outlierTooltips": outlier_tooltips,
                    })
                })
                .collect();
            json!({"status": "ok", "filter": filter.key(), "boxes": l})
        }
        BoxPlotOutcome::NoData => json!({
            "status": "noData",
            "filter": filter.key(),
            "message": "No data available for this category",
        }),
    }
}

fn read_table(root_path: &Path, cfs: &FileSource) -> BDashResult<(String, io_common::ParsedTable)> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read data file {:?}", p2);
    let table = match cfs.provider.trim().to_lowercase().as_str() {
        "csv" => io_csv::read_csv_table(&p2)?,
        "xlsx" | "excel" => io_xlsx::read_xlsx_table(&p2, cfs)?,
        x => UnknownProviderSnafu { provider: x }.fail()?,
    };
    Ok((p2, table))
}

/// Optional settings from the command line that take precedence over the
/// configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Overrides {
    pub reference: Option<String>,
    pub out: Option<String>,
}

fn render_summary(config: &DashConfig, root_path: &Path) -> BDashResult<JSValue> {
    let chart = config.output_settings.chart_kind()?;
    ensure!(!config.data_sources.is_empty(), NoDataSourceSnafu {});
    let mut config_js: JSMap<String, JSValue> = JSMap::new();
    config_js.insert(
        "chartName".to_string(),
        json!(config.output_settings.chart_name),
    );
    config_js.insert("chart".to_string(), json!(chart.key()));

    let results = match chart {
        ChartKind::Alluvial => {
            let rules = config.rules.flow_rules()?;
            let mut records: Vec<DisasterRecord> = Vec::new();
            for cfs in config.data_sources.iter() {
                let (path, table) = read_table(root_path, cfs)?;
                records.append(&mut to_disaster_records(&table, cfs, &path)?);
            }
            info!("render_summary: {:?} records read", records.len());

            // Unless requested otherwise, the chart covers all the years of the dataset.
            let mut session =
                FlowSession::new(records, rules.clone()).context(InvalidRulesSnafu {})?;
            if let Some(start) = config.rules.year_start()? {
                session.select_start_year(start).context(InvalidRulesSnafu {})?;
            }
            if let Some(end) = config.rules.year_end()? {
                session.select_end_year(end).context(InvalidRulesSnafu {})?;
            }
            let range = session.years().range();
            config_js.insert("yearStart".to_string(), json!(range.start));
            config_js.insert("yearEnd".to_string(), json!(range.end));
            let levels: Vec<&str> = rules.levels.iter().map(|l| l.key()).collect();
            config_js.insert("levels".to_string(), json!(levels));

            let with_layout = config.output_settings.include_layout.unwrap_or(false);
            flow_outcome_to_json(session.current(), with_layout).context(RenderingSnafu {})?
        }
        ChartKind::BoxPlot => {
            let filter = config.rules.category_filter()?;
            let mut observations: Vec<PriceObservation> = Vec::new();
            for cfs in config.data_sources.iter() {
                let (path, table) = read_table(root_path, cfs)?;
                observations.append(&mut to_price_observations(&table, cfs, &path)?);
            }
            info!("render_summary: {:?} price observations read", observations.len());
            config_js.insert("commodityFilter".to_string(), json!(filter.key()));
            box_plot_to_json(&compute_box_stats(&observations, filter), filter)
        }
    };
    Ok(json!({"config": config_js, "results": results}))
}

fn write_summary(pretty_js: &str, out: &Option<String>, root_path: &Path) -> BDashResult<()> {
    match out.as_deref() {
        None | Some("") => {
            debug!("write_summary: no output requested");
        }
        Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(p) => {
            let full_p = root_path.join(p).display().to_string();
            info!("Writing summary to {:?}", full_p);
            fs::write(&full_p, pretty_js).context(WritingOutputSnafu { path: full_p.clone() })?;
        }
    }
    Ok(())
}

fn check_reference(pretty_js_stats: &str, summary_p: String) -> BDashResult<()> {
    let summary_ref = read_summary(summary_p)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    compare_summaries(&pretty_js_summary_ref, pretty_js_stats)?;
    Ok(())
}

fn compare_summaries(reference: &str, computed: &str) -> DashResult<()> {
    if reference != computed {
        warn!("Found differences with the reference string");
        print_diff(reference, computed, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

fn run_config(config: &DashConfig, root_path: &Path, overrides: &Overrides) -> BDashResult<()> {
    info!("config: {:?}", config);
    let result_js = render_summary(config, root_path)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    // The command line output path is relative to the working directory.
    match &overrides.out {
        Some(_) => write_summary(&pretty_js_stats, &overrides.out, Path::new("."))?,
        None => write_summary(
            &pretty_js_stats,
            &config.output_settings.output_path,
            root_path,
        )?,
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = overrides.reference.clone() {
        check_reference(&pretty_js_stats, summary_p)?;
    }
    Ok(())
}

/// Renders the chart described by a configuration file.
///
/// The data files and the output path of the configuration are relative to
/// the directory of the configuration file.
pub fn run_dashboard(config_path: String, overrides: &Overrides) -> BDashResult<()> {
    let config = read_config(&config_path)?;
    let config_p = Path::new(config_path.as_str());
    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    run_config(&config, root_p, overrides)
}

/// Renders a chart described only with command line arguments.
pub fn run_dashboard_arguments(args: &Args) -> BDashResult<()> {
    let input = args.input.clone().context(MissingInputSnafu {})?;
    let provider = match &args.input_type {
        Some(t) => t.clone(),
        None if input.to_lowercase().ends_with(".xlsx") => "xlsx".to_string(),
        None => "csv".to_string(),
    };
    let mut source = FileSource::new(&provider, &input);
    source.excel_worksheet_name = args.excel_worksheet_name.clone();

    let config = DashConfig {
        output_settings: OutputSettings {
            chart_name: simplify_file_name(&input),
            chart: args.chart.clone(),
            output_path: None,
            include_layout: None,
        },
        data_sources: vec![source],
        rules: DashRules {
            levels: args.levels.clone(),
            _year_start: args.year_start.map(|y| json!(y)),
            _year_end: args.year_end.map(|y| json!(y)),
            commodity_filter: args.commodity_filter.clone(),
        },
    };
    let overrides = Overrides {
        reference: args.reference.clone(),
        out: Some(args.out.clone().unwrap_or_else(|| "stdout".to_string())),
    };
    run_config(&config, Path::new("."), &overrides)
}

pub fn report_error(e: &DashError) {
    eprintln!("An error occured: {}", e);
    if let Some(bt) = ErrorCompat::backtrace(e) {
        eprintln!("trace: {}", bt);
    }
}

#[cfg(test)]
fn run_dashboard_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> BDashResult<()> {
    let test_dir = format!("{}/tests/data", env!("CARGO_MANIFEST_DIR"));
    info!("Running test {}", test_name);
    run_dashboard(
        format!("{}/{}/{}", test_dir, test_name, config_lpath),
        &Overrides {
            reference: Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
            out: None,
        },
    )
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    let res = run_dashboard_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    );
    if let Err(e) = &res {
        warn!("Error occured {:?}", e);
        report_error(e);
    }
    assert!(res.is_ok(), "test {} failed", test_name);
}

#[cfg(test)]
mod tests {
    use super::test_wrapper;

    #[test]
    fn floods_2010() {
        test_wrapper("floods_2010");
    }

    #[test]
    fn full_range() {
        test_wrapper("full_range");
    }

    #[test]
    fn reduced_levels() {
        test_wrapper("reduced_levels");
    }

    #[test]
    fn no_data_in_range() {
        test_wrapper("no_data_in_range");
    }

    #[test]
    fn xlsx_worksheet() {
        test_wrapper("xlsx_worksheet");
    }

    #[test]
    fn prices_all() {
        test_wrapper("prices_all");
    }

    #[test]
    fn prices_fuel() {
        test_wrapper("prices_fuel");
    }
}

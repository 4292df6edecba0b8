use crate::dash::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "chartName")]
    pub chart_name: String,
    /// "alluvial" (default) or "boxplot"
    #[serde(rename = "chart")]
    pub chart: Option<String>,
    /// A file path relative to the configuration file, or "stdout".
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    /// Adds the node and link positions of the default layout to the summary.
    #[serde(rename = "includeLayout")]
    pub include_layout: Option<bool>,
}

impl OutputSettings {
    pub fn chart_kind(&self) -> DashResult<ChartKind> {
        match self.chart.as_deref().map(|s| s.trim().to_lowercase()) {
            None => Ok(ChartKind::Alluvial),
            Some(s) if s == "alluvial" || s == "sankey" => Ok(ChartKind::Alluvial),
            Some(s) if s == "boxplot" => Ok(ChartKind::BoxPlot),
            Some(s) => UnknownChartSnafu { chart: s }.fail(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// "csv" or "xlsx"
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    // Column overrides for the natural disasters dataset
    #[serde(rename = "yearColumn")]
    pub year_column: Option<String>,
    #[serde(rename = "groupColumn")]
    pub group_column: Option<String>,
    #[serde(rename = "subgroupColumn")]
    pub subgroup_column: Option<String>,
    #[serde(rename = "typeColumn")]
    pub type_column: Option<String>,
    #[serde(rename = "subtypeColumn")]
    pub subtype_column: Option<String>,
    #[serde(rename = "eventColumn")]
    pub event_column: Option<String>,
    // Column overrides for the market prices dataset
    #[serde(rename = "commodityColumn")]
    pub commodity_column: Option<String>,
    #[serde(rename = "regionColumn")]
    pub region_column: Option<String>,
    #[serde(rename = "priceColumn")]
    pub price_column: Option<String>,
    #[serde(rename = "dateColumn")]
    pub date_column: Option<String>,
}

fn column_or(o: &Option<String>, default: &str) -> String {
    o.clone().unwrap_or_else(|| default.to_string())
}

impl FileSource {
    pub fn new(provider: &str, file_path: &str) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            excel_worksheet_name: None,
            year_column: None,
            group_column: None,
            subgroup_column: None,
            type_column: None,
            subtype_column: None,
            event_column: None,
            commodity_column: None,
            region_column: None,
            price_column: None,
            date_column: None,
        }
    }

    /// In the order year, group, subgroup, type, subtype, event name.
    pub fn disaster_columns(&self) -> [String; 6] {
        [
            column_or(&self.year_column, "Start Year"),
            column_or(&self.group_column, "Disaster Group"),
            column_or(&self.subgroup_column, "Disaster Subgroup"),
            column_or(&self.type_column, "Disaster Type"),
            column_or(&self.subtype_column, "Disaster Subtype"),
            column_or(&self.event_column, "Event Name"),
        ]
    }

    /// In the order commodity, region, price, date.
    pub fn price_columns(&self) -> [String; 4] {
        [
            column_or(&self.commodity_column, "Commodity"),
            column_or(&self.region_column, "Admin 1"),
            column_or(&self.price_column, "Price"),
            column_or(&self.date_column, "Price Date"),
        ]
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashRules {
    #[serde(rename = "levels")]
    pub levels: Option<Vec<String>>,
    #[serde(rename = "yearStart")]
    pub _year_start: Option<JSValue>,
    #[serde(rename = "yearEnd")]
    pub _year_end: Option<JSValue>,
    #[serde(rename = "commodityFilter")]
    pub commodity_filter: Option<String>,
}

impl DashRules {
    pub fn year_start(&self) -> DashResult<Option<i32>> {
        read_js_year(&self._year_start)
    }

    pub fn year_end(&self) -> DashResult<Option<i32>> {
        read_js_year(&self._year_end)
    }

    pub fn flow_rules(&self) -> DashResult<FlowRules> {
        match &self.levels {
            None => Ok(FlowRules::default()),
            Some(keys) => FlowRules::from_keys(keys).context(InvalidRulesSnafu {}),
        }
    }

    pub fn category_filter(&self) -> DashResult<CategoryFilter> {
        match &self.commodity_filter {
            None => Ok(CategoryFilter::All),
            Some(s) => CategoryFilter::from_key(s).context(InvalidRulesSnafu {}),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "dataSources")]
    pub data_sources: Vec<FileSource>,
    #[serde(default)]
    pub rules: DashRules,
}

pub fn read_config(path: &str) -> BDashResult<DashConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: String) -> BDashResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Years may be written as numbers or as strings.
fn read_js_year(x: &Option<JSValue>) -> DashResult<Option<i32>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_i64()
            .and_then(|x| i32::try_from(x).ok())
            .map(Some)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<i32>()
            .ok()
            .map(Some)
            .context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

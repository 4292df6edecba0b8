use clap::Parser;

/// Renders the charts of the Yemen crisis dashboard: the flow of natural
/// disasters through their classification, and the distribution of market prices.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the description of the chart, in JSON format.
    /// For more information about the file format, read the documentation of the crisis_flows crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the expected summary in JSON format. If provided, yemenviz will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the chart will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The dataset to read, when no configuration file is given.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. By default it is guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default alluvial) The chart to render: alluvial or boxplot.
    #[clap(long, value_parser)]
    pub chart: Option<String>,

    /// (year) The first year to include. Defaults to the first year of the dataset.
    #[clap(long, value_parser)]
    pub year_start: Option<i32>,

    /// (year) The last year to include. Defaults to the last year of the dataset.
    #[clap(long, value_parser)]
    pub year_end: Option<i32>,

    /// (list of comma-separated values) The levels of the alluvial chart, among
    /// group, subgroup, type, subtype and event. Defaults to all of them.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub levels: Option<Vec<String>>,

    /// (default all) For the box plot: all, fuel, essential or other.
    #[clap(long, value_parser)]
    pub commodity_filter: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on debug logging. Logs are written to the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

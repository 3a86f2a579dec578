//! peakviz: overlap diagrams for ChIP-Seq peak sets
//!
//! Usage: peakviz <COMMAND> [OPTIONS]

use clap::{ArgAction, Parser, Subcommand};
use log::info;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use peakviz::bed::{read_records, ColumnScheme};
use peakviz::commands::{plot_overlaps, plot_pie, Collections, PieConfig, PieWeight, ReduceCommand};
use peakviz::config::{OutputFormat, OverlapConfig, PlotType, SortPolicy};
use peakviz::error::{OverlapError, Result};
use peakviz::reducer::Reducer;
use peakviz::{svg, Diagram};

#[derive(Parser)]
#[command(name = "peakviz")]
#[command(version)]
#[command(about = "Overlap, Venn, UpSet and pie-chart diagrams for ChIP-Seq peak sets", long_about = None)]
struct Cli {
    /// Number of threads to use (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a Venn diagram or UpSet plot of set overlaps
    Overlaps {
        /// Input files, one set each (BED, or token lists with --tokens)
        #[arg(short = 'i', long = "input", num_args = 1.., required = true)]
        inputs: Vec<PathBuf>,

        /// Set names, comma-separated (default: file stems)
        #[arg(short, long, value_delimiter = ',')]
        names: Vec<String>,

        /// Treat inputs as token lists, one token per line
        #[arg(long)]
        tokens: bool,

        /// Read columns 7-10 as narrowPeak fields
        #[arg(long)]
        narrowpeak: bool,

        /// Diagram type: auto|venn|upset
        #[arg(long = "type", default_value = "auto")]
        plot_type: String,

        /// Numeric attribute to summarise per intersection (UpSet only)
        #[arg(long)]
        var: Option<String>,

        /// Reducer for the summary attribute: mean|median|max|min|sd
        #[arg(long, default_value = "mean")]
        reducer: String,

        /// Merge intervals separated by fewer than this many bases
        #[arg(long, default_value = "1")]
        gap_width: u64,

        /// Keep strands apart when reducing and overlapping
        #[arg(long)]
        stranded: bool,

        /// Palette, one colour per set, comma-separated
        #[arg(long, value_delimiter = ',')]
        colors: Vec<String>,

        /// Explicit colour for one set (NAME=COLOUR); repeatable
        #[arg(long = "color")]
        color_overrides: Vec<String>,

        /// Intersection order: ascending|descending|degree|input
        #[arg(long, default_value = "ascending")]
        sort: String,

        /// Set row order: ascending|descending|input
        #[arg(long, default_value = "ascending")]
        sort_sets: String,

        /// Hide intersections smaller than this
        #[arg(long, default_value = "0")]
        min_size: usize,

        /// Show membership combinations with no elements
        #[arg(long)]
        keep_empty: bool,

        /// Draw two-set Venn circles at equal size
        #[arg(long)]
        unscaled: bool,

        /// Append percentages of the union to Venn labels
        #[arg(long)]
        percent: bool,

        /// Output format: json|svg
        #[arg(long, default_value = "json")]
        format: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reduce intervals to a minimal non-overlapping set
    Reduce {
        /// Input BED files
        #[arg(short = 'i', long = "input", num_args = 1.., required = true)]
        inputs: Vec<PathBuf>,

        /// Merge intervals separated by fewer than this many bases
        #[arg(long, default_value = "1")]
        gap_width: u64,

        /// Keep strands apart
        #[arg(long)]
        stranded: bool,
    },

    /// Draw a pie chart of a categorical column
    Pie {
        /// Input BED file
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        /// Attribute to split slices by
        #[arg(long)]
        fill: String,

        /// Attribute to split separate pies by
        #[arg(long)]
        facet: Option<String>,

        /// Slice weight: count|width
        #[arg(long, default_value = "count")]
        weight: String,

        /// Names for columns 7 onwards, comma-separated
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Output format: json|svg
        #[arg(long, default_value = "json")]
        format: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool if --threads specified
    if let Some(n) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
            eprintln!("Error: failed to initialize thread pool: {}", e);
            process::exit(1);
        }
    }

    let result = match cli.command {
        Commands::Overlaps {
            inputs,
            names,
            tokens,
            narrowpeak,
            plot_type,
            var,
            reducer,
            gap_width,
            stranded,
            colors,
            color_overrides,
            sort,
            sort_sets,
            min_size,
            keep_empty,
            unscaled,
            percent,
            format,
            output,
        } => build_overlap_config(
            plot_type,
            var,
            reducer,
            gap_width,
            stranded,
            colors,
            color_overrides,
            sort,
            sort_sets,
            min_size,
            keep_empty,
            unscaled,
            percent,
        )
        .and_then(|config| {
            run_overlaps(inputs, names, tokens, narrowpeak, config, format, output)
        }),

        Commands::Reduce {
            inputs,
            gap_width,
            stranded,
        } => run_reduce(inputs, gap_width, stranded),

        Commands::Pie {
            input,
            fill,
            facet,
            weight,
            columns,
            format,
            output,
        } => run_pie(input, fill, facet, weight, columns, format, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn build_overlap_config(
    plot_type: String,
    var: Option<String>,
    reducer: String,
    gap_width: u64,
    stranded: bool,
    colors: Vec<String>,
    color_overrides: Vec<String>,
    sort: String,
    sort_sets: String,
    min_size: usize,
    keep_empty: bool,
    unscaled: bool,
    percent: bool,
) -> Result<OverlapConfig> {
    let mut config = OverlapConfig::new()
        .with_type(plot_type.parse::<PlotType>()?)
        .with_reducer(reducer.parse::<Reducer>()?)
        .with_gap_width(gap_width)
        .with_ignore_strand(!stranded);

    if let Some(var) = var {
        config = config.with_var(var);
    }
    if !colors.is_empty() {
        config = config.with_set_colors(colors);
    }
    for arg in color_overrides {
        let (set, color) = arg.split_once('=').ok_or_else(|| {
            OverlapError::config(format!("Invalid --color '{}'. Use NAME=COLOUR", arg))
        })?;
        config = config.with_color_override(set, color);
    }

    config.upset.sort_intersections = sort.parse::<SortPolicy>()?;
    config.upset.sort_sets = sort_sets.parse::<SortPolicy>()?;
    config.upset.min_size = min_size;
    config.upset.keep_empty_groups = keep_empty;
    config.venn.scaled = !unscaled;
    config.venn.show_percent = percent;

    Ok(config)
}

fn run_overlaps(
    inputs: Vec<PathBuf>,
    names: Vec<String>,
    tokens: bool,
    narrowpeak: bool,
    config: OverlapConfig,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = format.parse::<OutputFormat>()?;
    let collections = if tokens {
        Collections::from_token_files(&inputs, &names)?
    } else {
        let scheme = if narrowpeak {
            ColumnScheme::NarrowPeak
        } else {
            ColumnScheme::Bed
        };
        Collections::from_bed_files(&inputs, &names, &scheme)?
    };
    info!("loaded {} sets", collections.len());

    let diagram = plot_overlaps(&collections, &config)?;
    write_diagram(&diagram, format, output)
}

fn run_reduce(inputs: Vec<PathBuf>, gap_width: u64, stranded: bool) -> Result<()> {
    let cmd = ReduceCommand::new()
        .with_gap_width(gap_width)
        .with_ignore_strand(!stranded);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    cmd.run(&inputs, &mut handle)?;
    Ok(())
}

fn run_pie(
    input: PathBuf,
    fill: String,
    facet: Option<String>,
    weight: String,
    columns: Vec<String>,
    format: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = format.parse::<OutputFormat>()?;
    let scheme = if columns.is_empty() {
        ColumnScheme::Bed
    } else {
        ColumnScheme::Named(columns)
    };
    let records = read_records(&input, scheme)?;

    let mut config = PieConfig::new(fill).with_weight(weight.parse::<PieWeight>()?);
    if let Some(facet) = facet {
        config = config.with_facet(facet);
    }

    let diagram = plot_pie(&records, &config)?;
    write_diagram(&diagram, format, output)
}

fn write_diagram(diagram: &Diagram, format: OutputFormat, output: Option<PathBuf>) -> Result<()> {
    let body = match format {
        OutputFormat::Json => diagram.to_json()?,
        OutputFormat::Svg => svg::render(diagram),
    };

    match output {
        Some(path) => {
            let mut file = File::create(&path)?;
            writeln!(file, "{}", body.trim_end())?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", body.trim_end())?;
        }
    }
    Ok(())
}

use clap::Parser;
use luminaire_lca::output::FileOutput;
use luminaire_lca::presets::{EquipmentPreset, RegionalPreset};
use luminaire_lca::{run_project, ProjectFlags, RunOptions};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct LcaArgs {
    input_file: String,
    #[arg(
        long,
        short,
        value_parser = RegionalPreset::from_str,
        help = "Override grid factor, electricity rate and decarbonization rate with a regional preset"
    )]
    region: Option<RegionalPreset>,
    #[arg(
        long,
        value_parser = EquipmentPreset::from_str,
        help = "Override the baseline luminaire with an equipment preset"
    )]
    baseline_preset: Option<EquipmentPreset>,
    #[arg(
        long,
        value_parser = EquipmentPreset::from_str,
        help = "Override the proposed luminaire with an equipment preset"
    )]
    proposed_preset: Option<EquipmentPreset>,
    #[arg(
        long,
        short,
        default_value_t = false,
        help = "Run a sensitivity analysis over the project inputs"
    )]
    sensitivity: bool,
    #[arg(
        long,
        default_value_t = false,
        help = "Skip the yearly emissions timeline"
    )]
    no_timeline: bool,
    #[arg(
        long,
        short,
        help = "Directory to write results into (defaults to <input>__results)"
    )]
    output_dir: Option<String>,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

fn main() -> anyhow::Result<()> {
    let args = LcaArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(tracing::Level::DEBUG);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_file = args.input_file.as_str();
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };
    let input_file_stem = PathBuf::from(input_file_stem);

    let output_path = match args.output_dir {
        Some(ref dir) => PathBuf::from(dir),
        None => PathBuf::from(format!("{}__results", input_file_stem.display())),
    };
    fs::create_dir_all(&output_path)?;
    let input_file_name = input_file_stem
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("project");
    let file_output = FileOutput::new(
        output_path,
        format!("{input_file_name}__results__{{}}.{{}}"),
    );

    let options = (&args).into();

    let results = run_project(
        BufReader::new(File::open(Path::new(input_file))?),
        &file_output,
        &options,
    )?;

    debug!(
        "JSON response: {}",
        serde_json::to_string_pretty(&results.summary)?
    );

    let summary = results.summary;
    println!(
        "{}/{}: proposed {:.0} kgCO2e ({:+.1}% vs baseline), total cost {:.0} ({:+.1}%), payback {:.1} years",
        summary.lifetime_definition,
        summary.scenario,
        summary.total_emissions,
        -summary.gwp_reduction,
        summary.total_cost,
        summary.cost_change,
        summary.payback_period,
    );
    if !results.degraded_cells.is_empty() {
        println!(
            "{} calculations could not be completed and are reported as zero",
            results.degraded_cells.len()
        );
    }

    Ok(())
}

impl From<&LcaArgs> for RunOptions {
    fn from(args: &LcaArgs) -> Self {
        let mut flags = ProjectFlags::empty();
        if args.sensitivity {
            flags.insert(ProjectFlags::SENSITIVITY);
        }
        if args.no_timeline {
            flags.insert(ProjectFlags::SKIP_TIMELINE);
        }

        RunOptions {
            flags,
            region: args.region,
            baseline_preset: args.baseline_preset,
            proposed_preset: args.proposed_preset,
        }
    }
}

use clap::{Parser, Subcommand};
use fb_builtin::CatalogLoader;
use fb_component::{AdapterError, ComponentAdapter, PlanError, load_plan_yaml};
use fb_core::{Tolerances, nearly_equal};
use fb_description::ReferenceSubset;
use fb_values::{Boolean, Integer, Real, ScalarKind, Text, ValueError};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "fb-cli")]
#[command(about = "fmibridge CLI - drive simulation components from a plan", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a component and print its reference subsets and start values
    Inspect {
        /// Path to the component plan YAML file
        plan_path: PathBuf,
    },
    /// Run a fixed-step explicit Euler simulation and print outputs as CSV
    Simulate {
        /// Path to the component plan YAML file
        plan_path: PathBuf,
        /// Time step in seconds
        #[arg(long, default_value_t = 1e-3)]
        dt: f64,
        /// End time in seconds (defaults to the model's default experiment)
        #[arg(long)]
        t_end: Option<f64>,
        /// Write a row every N steps
        #[arg(long, default_value_t = 1)]
        record_every: usize,
        /// Override a start value before initialization, e.g. `--set e=0.5`
        #[arg(long = "set", value_name = "NAME=VALUE")]
        overrides: Vec<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { plan_path } => cmd_inspect(&plan_path),
        Commands::Simulate {
            plan_path,
            dt,
            t_end,
            record_every,
            overrides,
            output,
        } => cmd_simulate(
            &plan_path,
            dt,
            t_end,
            record_every.max(1),
            &overrides,
            output.as_deref(),
        ),
    }
}

fn open_adapter(plan_path: &Path) -> CliResult<ComponentAdapter> {
    let plan = load_plan_yaml(plan_path)?;
    Ok(ComponentAdapter::new(plan, Arc::new(CatalogLoader::new()))?)
}

fn cmd_inspect(plan_path: &Path) -> CliResult<()> {
    let mut adapter = open_adapter(plan_path)?;
    adapter.load(false)?;

    if let Some(md) = adapter.model_description() {
        println!("Model: {} ({})", md.model_name, md.model_identifier);
        println!("  GUID: {}", md.guid);
    }
    println!("  Continuous states: {}", adapter.num_states());
    println!("  Event indicators:  {}", adapter.num_event_indicators());
    println!(
        "  Default experiment: {:.3} - {:.3} s",
        adapter.default_start()?,
        adapter.default_stop()?
    );

    let classification = adapter.classification();
    for subset in ReferenceSubset::ALL {
        let names = classification.names_of(subset);
        println!("\n{} ({}):", subset.name(), names.len());
        for (kind, name) in names {
            println!("  {:<7} {}", kind.label(), name);
        }
    }

    println!("\nStart values:");
    let start_refs = adapter.reference_subset(ReferenceSubset::Start);
    let start_values = adapter.start_values();
    for (kind, index, reference) in start_refs.iter() {
        let name = classification.name_of(kind, reference).unwrap_or("?");
        let value = start_values.value_at(kind, index)?;
        println!("  {name} = {value}");
    }

    adapter.unload();
    Ok(())
}

fn apply_override(adapter: &mut ComponentAdapter, assignment: &str) -> CliResult<()> {
    let (name, text) = assignment
        .split_once('=')
        .ok_or_else(|| CliError::Argument(format!("expected NAME=VALUE, got '{assignment}'")))?;
    let (kind, reference) = adapter
        .classification()
        .find(name.trim())
        .ok_or_else(|| CliError::Argument(format!("unknown variable '{name}'")))?;
    let text = text.trim();
    let bad = || CliError::Argument(format!("'{text}' is not a valid {} value", kind.label()));

    match kind {
        ScalarKind::Real => {
            let value: f64 = text.parse().map_err(|_| bad())?;
            adapter.set_values::<Real>(&[reference], &[value])?;
        }
        ScalarKind::Integer => {
            let value: i32 = text.parse().map_err(|_| bad())?;
            adapter.set_values::<Integer>(&[reference], &[value])?;
        }
        ScalarKind::Boolean => {
            let value: bool = text.parse().map_err(|_| bad())?;
            adapter.set_values::<Boolean>(&[reference], &[value])?;
        }
        ScalarKind::Text => {
            adapter.set_values::<Text>(&[reference], &[text.to_string()])?;
        }
    }
    info!(variable = name, value = text, "start value overridden");
    Ok(())
}

fn write_row(out: &mut dyn Write, adapter: &ComponentAdapter, time: f64) -> CliResult<()> {
    let outputs = adapter.values(ReferenceSubset::Output)?;
    let refs = adapter.reference_subset(ReferenceSubset::Output);
    write!(out, "{time:.6}")?;
    for (kind, index, _) in refs.iter() {
        write!(out, ",{}", outputs.value_at(kind, index)?)?;
    }
    writeln!(out)?;
    Ok(())
}

fn indicators_crossed(before: &[f64], after: &[f64]) -> bool {
    before
        .iter()
        .zip(after)
        .any(|(b, a)| (*b > 0.0) != (*a > 0.0))
}

fn cmd_simulate(
    plan_path: &Path,
    dt: f64,
    t_end: Option<f64>,
    record_every: usize,
    overrides: &[String],
    output: Option<&Path>,
) -> CliResult<()> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(CliError::Argument(format!("dt must be positive, got {dt}")));
    }

    let mut adapter = open_adapter(plan_path)?;
    adapter.load(false)?;
    for assignment in overrides {
        apply_override(&mut adapter, assignment)?;
    }
    adapter.initialize()?;

    let t_start = adapter.default_start()?;
    let t_end = t_end.unwrap_or(adapter.default_stop()?);
    let tol = Tolerances::default();

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let header: Vec<&str> = adapter
        .classification()
        .names_of(ReferenceSubset::Output)
        .into_iter()
        .map(|(_, name)| name)
        .collect();
    writeln!(out, "time,{}", header.join(","))?;

    let mut t = t_start;
    adapter.set_time(t)?;
    write_row(&mut *out, &adapter, t)?;

    let mut indicators = adapter.get_event_indicators()?;
    let mut steps = 0usize;
    let mut events = 0usize;
    while t < t_end && !nearly_equal(t, t_end, tol) {
        // Land exactly on the next time event or the end time.
        let mut h = dt.min(t_end - t);
        let next_time_event = adapter.event_info().next_time_event();
        if let Some(te) = next_time_event {
            if te > t && te < t + h {
                h = te - t;
            }
        }

        let x = adapter.get_states()?;
        let dx = adapter.get_state_derivatives()?;
        t += h;
        adapter.set_time(t)?;
        let x_next: Vec<f64> = x.iter().zip(&dx).map(|(xi, dxi)| xi + h * dxi).collect();
        adapter.set_states(&x_next)?;
        let step_event = adapter.step_completed()?;

        let next_indicators = adapter.get_event_indicators()?;
        let time_event = next_time_event.is_some_and(|te| nearly_equal(t, te, tol) || t > te);
        if step_event || time_event || indicators_crossed(&indicators, &next_indicators) {
            let info = adapter.event_update()?;
            events += 1;
            if info.terminate_simulation {
                info!(time = t, "component requested termination");
                write_row(&mut *out, &adapter, t)?;
                break;
            }
            indicators = adapter.get_event_indicators()?;
        } else {
            indicators = next_indicators;
        }

        steps += 1;
        if steps % record_every == 0 {
            write_row(&mut *out, &adapter, t)?;
        }
    }
    out.flush()?;

    adapter.terminate()?;
    adapter.unload();
    info!(steps, events, t_end = t, "simulation finished");
    Ok(())
}

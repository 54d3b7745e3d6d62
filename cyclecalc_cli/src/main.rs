use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use cyclecalc_core::history::{self, recent_records};
use cyclecalc_core::validation::{self, parse_date};
use cyclecalc_core::*;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

/// Number of logged cycles fed to the estimator with `--use-log`
const LOG_HISTORY_WINDOW: usize = 12;

#[derive(Parser)]
#[command(name = "cyclecalc")]
#[command(about = "Fertility window and gestational age calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Do not record the calculation in history
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the fertile window for the next cycle
    Fertile {
        /// First day of the last period (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day of the last period (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Cycle length in days (21-45)
        #[arg(long)]
        cycle_length: Option<u32>,

        /// Feed the recorded cycle log in as history
        #[arg(long)]
        use_log: bool,

        /// Also report luteal phase and next-cycle predictions
        #[arg(long)]
        insights: bool,
    },

    /// Estimate gestational age
    Gestation {
        #[command(subcommand)]
        method: GestationMethod,
    },

    /// Fetal development for a gestational week
    Week {
        /// Gestational week
        week: u32,
    },

    /// Prenatal care guidance for a trimester
    Care {
        /// Trimester (1, 2 or 3)
        trimester: u8,
    },

    /// Describe a cycle phase by name, or work out the phase on a date
    Phase {
        /// Phase name (menstrual, follicular, fertile, luteal)
        name: Option<String>,

        /// First day of a known cycle (defaults to the latest logged cycle)
        #[arg(long, conflicts_with = "name")]
        start: Option<String>,

        /// Period length in days
        #[arg(long, conflicts_with = "name")]
        period_length: Option<u32>,

        /// Cycle length in days
        #[arg(long, conflicts_with = "name")]
        cycle_length: Option<u32>,

        /// Date to classify (defaults to today)
        #[arg(long, conflicts_with = "name")]
        on: Option<String>,
    },

    /// Manage the cycle log
    Cycles {
        #[command(subcommand)]
        action: CyclesAction,
    },

    /// View or export calculation history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum GestationMethod {
    /// Date from the last menstrual period
    Lmp {
        #[arg(long)]
        date: String,

        /// Compute as of this date instead of today
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Date from an ultrasound scan
    Ultrasound {
        #[arg(long)]
        date: String,

        /// Gestational weeks measured at the scan
        #[arg(long)]
        weeks: u32,

        /// Additional days measured at the scan
        #[arg(long)]
        days: u32,

        #[arg(long)]
        as_of: Option<String>,
    },

    /// Date from an IVF embryo transfer
    Transfer {
        #[arg(long)]
        date: String,

        /// Embryo age at transfer (3 or 5)
        #[arg(long)]
        embryo_days: u32,

        #[arg(long)]
        as_of: Option<String>,
    },
}

#[derive(Subcommand)]
enum CyclesAction {
    /// Record a cycle
    Add {
        #[arg(long)]
        start: String,

        #[arg(long)]
        period_length: u32,

        #[arg(long)]
        cycle_length: u32,
    },

    /// List recorded cycles
    List,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Show the most recent calculations
    List {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Write the history to a CSV file, replacing it if present
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

/// Resolved paths and settings shared by every command
struct Context {
    config: Config,
    history_path: PathBuf,
    cycle_log_path: PathBuf,
    today: NaiveDate,
    json: bool,
    record: bool,
}

#[derive(Serialize)]
struct FertileReport<'a> {
    window: &'a FertileWindowResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    insights: Option<&'a CycleInsights>,
}

#[derive(Serialize)]
struct GestationReport<'a> {
    estimate: &'a GestationalEstimate,
    development: &'a FetalDevelopmentInfo,
}

#[derive(Serialize)]
struct PhaseReport<'a> {
    date: NaiveDate,
    phase: CyclePhase,
    descriptor: &'a PhaseDescriptor,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        cyclecalc_core::logging::init_with_level("debug");
    } else {
        cyclecalc_core::logging::init();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_validation() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let errors = cyclecalc_core::reference::tables().validate();
    if !errors.is_empty() {
        eprintln!("Reference data validation errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::ReferenceData("Invalid reference tables".into()));
    }

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let ctx = Context {
        history_path: data_dir.join("history.jsonl"),
        cycle_log_path: data_dir.join("cycles.json"),
        today: Local::now().date_naive(),
        json: cli.json,
        record: config.history.record && !cli.dry_run,
        config,
    };

    match cli.command {
        Commands::Fertile {
            start,
            end,
            cycle_length,
            use_log,
            insights,
        } => cmd_fertile(&ctx, &start, &end, cycle_length, use_log, insights),
        Commands::Gestation { method } => cmd_gestation(&ctx, method),
        Commands::Week { week } => cmd_week(&ctx, week),
        Commands::Care { trimester } => cmd_care(&ctx, trimester),
        Commands::Phase {
            name: Some(name), ..
        } => cmd_phase_name(&ctx, &name),
        Commands::Phase {
            name: None,
            start,
            period_length,
            cycle_length,
            on,
        } => cmd_phase_on(&ctx, start, period_length, cycle_length, on),
        Commands::Cycles { action } => cmd_cycles(&ctx, action),
        Commands::History { action } => cmd_history(&ctx, action),
    }
}

fn cmd_fertile(
    ctx: &Context,
    start: &str,
    end: &str,
    cycle_length: Option<u32>,
    use_log: bool,
    insights: bool,
) -> Result<()> {
    let previous_cycles = if use_log || insights {
        let log = CycleLog::load(&ctx.cycle_log_path)?;
        log.recent(LOG_HISTORY_WINDOW).to_vec()
    } else {
        Vec::new()
    };

    let input = FertileWindowInput::new(
        parse_date("last_period_start", start)?,
        parse_date("last_period_end", end)?,
    )
    .with_cycle_length(cycle_length.unwrap_or(ctx.config.cycle.default_cycle_length))
    .with_history(if use_log { previous_cycles.clone() } else { Vec::new() });

    validation::validate_fertile_input(&input, ctx.today)?;

    let window = estimate_fertile_window(&input, &ctx.config.fertility_options());
    let insights = insights.then(|| cycle_insights(&previous_cycles));

    record(ctx, CalculationKind::FertileWindow, &input, &window)?;

    if ctx.json {
        return print_json(&FertileReport {
            window: &window,
            insights: insights.as_ref(),
        });
    }

    println!("\nFertile window");
    println!("  Ovulation:    {}", window.ovulation_day);
    println!("  Fertile:      {} to {}", window.fertile_start, window.fertile_end);
    println!(
        "  Next period:  {} to {}",
        window.next_period_start, window.next_period_end
    );
    if let Some(v) = window.cycle_variability {
        println!("  Variability:  ±{:.1} days", v);
    }

    if let Some(insights) = insights {
        println!("\nCycle insights");
        match insights.average_luteal_phase {
            Some(l) => println!("  Average luteal phase:   {:.1} days", l),
            None => println!("  Average luteal phase:   needs 3 logged cycles"),
        }
        match insights.predicted_next_cycle_length {
            Some(p) => println!("  Predicted next cycle:   {:.1} days", p),
            None => println!("  Predicted next cycle:   needs 3 logged cycles"),
        }
    }
    println!();

    Ok(())
}

fn cmd_gestation(ctx: &Context, method: GestationMethod) -> Result<()> {
    let (kind, input, estimate) = match method {
        GestationMethod::Lmp { date, as_of } => {
            let lmp = parse_date("lmp_date", &date)?;
            validation::validate_not_future("lmp_date", lmp, ctx.today)?;
            let as_of = resolve_as_of(ctx, as_of)?;
            (
                CalculationKind::GestationLmp,
                json!({ "lmp_date": lmp, "as_of": as_of }),
                gestation::from_lmp(lmp, as_of),
            )
        }
        GestationMethod::Ultrasound {
            date,
            weeks,
            days,
            as_of,
        } => {
            let usg_date = parse_date("ultrasound_date", &date)?;
            validation::validate_ultrasound(usg_date, weeks, days, ctx.today)?;
            let as_of = resolve_as_of(ctx, as_of)?;
            (
                CalculationKind::GestationUltrasound,
                json!({ "usg_date": usg_date, "usg_weeks": weeks, "usg_days": days, "as_of": as_of }),
                gestation::from_ultrasound(usg_date, weeks, days, as_of),
            )
        }
        GestationMethod::Transfer {
            date,
            embryo_days,
            as_of,
        } => {
            let transfer_date = parse_date("transfer_date", &date)?;
            validation::validate_transfer(transfer_date, embryo_days, ctx.today)?;
            let as_of = resolve_as_of(ctx, as_of)?;
            (
                CalculationKind::GestationEmbryoTransfer,
                json!({ "transfer_date": transfer_date, "embryo_days": embryo_days, "as_of": as_of }),
                gestation::from_embryo_transfer(transfer_date, embryo_days, as_of),
            )
        }
    };

    record(ctx, kind, &input, &estimate)?;

    let development = fetal_development(estimate.weeks);

    if ctx.json {
        return print_json(&GestationReport {
            estimate: &estimate,
            development,
        });
    }

    println!("\nGestational age: {} weeks {} days", estimate.weeks, estimate.days);
    println!("  Dated by:            {:?}", estimate.method);
    println!("  LMP-equivalent:      {}", estimate.lmp_equivalent);
    println!(
        "  Due date:            {} ({} days to go)",
        estimate.due_date, estimate.days_until_due
    );
    println!("  Trimester:           {}", estimate.current_trimester);
    println!("  1st trimester ends:  {}", estimate.first_trimester_end);
    println!("  2nd trimester ends:  {}", estimate.second_trimester_end);
    println!();
    print_development(development);

    Ok(())
}

fn cmd_week(ctx: &Context, week: u32) -> Result<()> {
    let info = fetal_development(week);
    if ctx.json {
        return print_json(info);
    }
    if info.week != week {
        println!("\n(no entry for week {}, showing nearest)", week);
    }
    println!();
    print_development(info);
    Ok(())
}

fn cmd_care(ctx: &Context, trimester: u8) -> Result<()> {
    let trimester = Trimester::from_number(trimester)
        .ok_or_else(|| Error::validation("trimester", trimester, "must be 1, 2 or 3"))?;
    let care = prenatal_care(trimester);

    if ctx.json {
        return print_json(care);
    }

    println!("\nPrenatal care: trimester {}", trimester);
    for (heading, items) in [
        ("Nutrition", &care.nutrition),
        ("Lifestyle", &care.lifestyle),
        ("Warning signs", &care.warning_signs),
        ("Examinations", &care.examinations),
        ("Vaccines", &care.vaccines),
        ("Special care", &care.special_care),
    ] {
        println!("\n  {}", heading);
        for item in items {
            println!("    - {}", item);
        }
    }
    println!();
    Ok(())
}

fn cmd_phase_name(ctx: &Context, name: &str) -> Result<()> {
    let descriptor = describe_phase(name);
    if ctx.json {
        return print_json(descriptor);
    }
    print_phase(descriptor);
    Ok(())
}

fn cmd_phase_on(
    ctx: &Context,
    start: Option<String>,
    period_length: Option<u32>,
    cycle_length: Option<u32>,
    on: Option<String>,
) -> Result<()> {
    let (cycle_start, logged_period, logged_cycle) = match start {
        Some(s) => (parse_date("start", &s)?, None, None),
        None => {
            let log = CycleLog::load(&ctx.cycle_log_path)?;
            let latest = log.latest().ok_or_else(|| {
                Error::validation(
                    "start",
                    "",
                    "give a phase name, --start, or record a cycle first",
                )
            })?;
            (
                latest.period_start,
                Some(latest.period_length),
                Some(latest.cycle_length),
            )
        }
    };

    let period_length = period_length.or(logged_period).ok_or_else(|| {
        Error::validation("period_length", "", "required together with --start")
    })?;
    let cycle_length = cycle_length
        .or(logged_cycle)
        .unwrap_or(ctx.config.cycle.default_cycle_length);

    validation::validate_history_entry(&CycleHistoryEntry {
        period_start: cycle_start,
        period_length,
        cycle_length,
    })?;

    let date = match on {
        Some(s) => parse_date("on", &s)?,
        None => ctx.today,
    };

    let phase = phase_on(cycle_start, period_length, cycle_length, date);
    let descriptor = cyclecalc_core::reference::tables().phase(phase);

    if ctx.json {
        return print_json(&PhaseReport {
            date,
            phase,
            descriptor,
        });
    }

    println!("\n{}: {} phase", date, phase);
    print_phase(descriptor);
    Ok(())
}

fn cmd_cycles(ctx: &Context, action: CyclesAction) -> Result<()> {
    match action {
        CyclesAction::Add {
            start,
            period_length,
            cycle_length,
        } => {
            let entry = CycleHistoryEntry {
                period_start: parse_date("start", &start)?,
                period_length,
                cycle_length,
            };
            validation::validate_not_future("start", entry.period_start, ctx.today)?;
            validation::validate_history_entry(&entry)?;

            let log = CycleLog::update(&ctx.cycle_log_path, |log| {
                log.record(entry);
                Ok(())
            })?;

            if ctx.json {
                return print_json(&log);
            }
            println!("✓ Cycle recorded ({} in log)", log.len());
            Ok(())
        }

        CyclesAction::List => {
            let log = CycleLog::load(&ctx.cycle_log_path)?;
            if ctx.json {
                return print_json(&log);
            }
            if log.is_empty() {
                println!("No cycles recorded.");
                return Ok(());
            }
            println!("{:<12} {:>8} {:>8}", "start", "period", "cycle");
            for c in &log.cycles {
                println!(
                    "{:<12} {:>8} {:>8}",
                    c.period_start.to_string(),
                    c.period_length,
                    c.cycle_length
                );
            }
            Ok(())
        }
    }
}

fn cmd_history(ctx: &Context, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List { limit } => {
            let records = recent_records(&ctx.history_path, limit)?;
            if ctx.json {
                return print_json(&records);
            }
            if records.is_empty() {
                println!("No calculations recorded.");
                return Ok(());
            }
            for r in &records {
                println!(
                    "{}  {:<26} {}",
                    r.created_at.format("%Y-%m-%d %H:%M"),
                    r.kind,
                    r.input_data
                );
            }
            Ok(())
        }

        HistoryAction::Export { out } => {
            let records = history::read_records(&ctx.history_path)?;
            let count = cyclecalc_core::export::export_csv(&records, &out)?;
            println!("✓ Exported {} calculations", count);
            if count > 0 {
                println!("  CSV: {}", out.display());
            }
            Ok(())
        }
    }
}

fn resolve_as_of(ctx: &Context, as_of: Option<String>) -> Result<NaiveDate> {
    match as_of {
        Some(s) => parse_date("as_of", &s),
        None => Ok(ctx.today),
    }
}

fn record<I, R>(ctx: &Context, kind: CalculationKind, input: &I, result: &R) -> Result<()>
where
    I: Serialize + ?Sized,
    R: Serialize + ?Sized,
{
    if !ctx.record {
        tracing::debug!("History recording disabled, skipping {}", kind);
        return Ok(());
    }
    let entry = CalculationRecord::new(kind, input, result)?;
    JsonlHistory::new(&ctx.history_path).append(&entry)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_development(info: &FetalDevelopmentInfo) {
    println!("  Week {}: {}", info.week, info.title);
    println!("  {}", info.development);
    println!("  Size: {}   Weight: {}", info.size, info.weight);
    println!("  Milestone: {}", info.milestone);
    println!();
}

fn print_phase(descriptor: &PhaseDescriptor) {
    match descriptor.phase {
        Some(phase) => println!("\n{} phase", phase),
        None => println!("\nUnknown phase"),
    }
    println!("  {}", descriptor.summary);
    println!("  Cervical mucus:     {}", descriptor.cervical_mucus);
    println!("  Basal temperature:  {}", descriptor.basal_temperature);
    println!("  Hormones:           {}", descriptor.dominant_hormones);
    println!();
}

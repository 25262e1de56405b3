use clap::{Parser, Subcommand};
use cp_app::{
    AppError, AppResult, GainReport, PipelineProgressEvent, PipelineRequest, PipelineStage,
    TrajectorySummary, project_service, query,
};
use cp_controls::LqrConfig;
use cp_core::timing::PhaseTimings;
use cp_project::Scenario;
use cp_sim::RunStatus;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uom::si::angle::radian;

#[derive(Parser)]
#[command(name = "cp-cli")]
#[command(about = "Cartpole CLI - LQR stabilization of an inverted pendulum on a cart", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario file
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Linearize and synthesize the LQR gain without simulating
    Gain {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Print the gain report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the full pipeline and simulate the closed loop
    Run {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Output CSV file path for the trajectory (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Simulate the scenario's sweep of initial tilts in parallel
    Sweep {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Write the benchmark scenario to a new file
    Init {
        /// Destination path (.yaml, .yml or .json)
        scenario_path: PathBuf,
        /// Initial tilt in degrees
        #[arg(long)]
        tilt_deg: Option<f64>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Gain {
            scenario_path,
            json,
        } => cmd_gain(&scenario_path, json),
        Commands::Run {
            scenario_path,
            output,
        } => cmd_run(&scenario_path, output.as_deref()),
        Commands::Sweep { scenario_path } => cmd_sweep(&scenario_path),
        Commands::Init {
            scenario_path,
            tilt_deg,
            force,
        } => cmd_init(&scenario_path, tilt_deg, force),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = project_service::load_scenario(scenario_path)?;
    project_service::validate_scenario(&scenario)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    Ok(())
}

fn cmd_gain(scenario_path: &Path, json: bool) -> AppResult<()> {
    let scenario = project_service::load_scenario(scenario_path)?;
    let report = cp_app::gain_for_scenario(&scenario, &LqrConfig::default())?;

    if json {
        let text = serde_json::to_string_pretty(&report.summary())
            .map_err(|e| AppError::InvalidInput(format!("Failed to serialize gain: {}", e)))?;
        println!("{}", text);
    } else {
        print_gain_report(&report);
    }
    Ok(())
}

fn cmd_run(scenario_path: &Path, output: Option<&Path>) -> AppResult<()> {
    let scenario = project_service::load_scenario(scenario_path)?;
    println!("Running scenario: {}", scenario.name);
    println!(
        "  t = {:.3} - {:.3} s, {} steps, {:?}",
        scenario.horizon.start_s, scenario.horizon.end_s, scenario.horizon.steps, scenario.integrator
    );

    let request = PipelineRequest::new(&scenario);
    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let response = cp_app::run_pipeline_with_progress(
        &request,
        Some(&mut |event| {
            let fraction = event
                .simulation
                .as_ref()
                .map(|s| s.fraction_complete)
                .unwrap_or(-1.0);
            let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    match response.status {
        RunStatus::Completed => println!("✓ Simulation completed"),
        RunStatus::Cancelled => println!("Simulation cancelled"),
    }

    print_gain_report(&response.gain);
    if let Some(summary) = &response.summary {
        print_trajectory_summary(summary);
    }
    print_timing_summary(&response.timing);

    if let Some(path) = output {
        std::fs::write(path, query::trajectory_to_csv(&response.trajectory))?;
        println!(
            "✓ Exported {} points to {}",
            response.trajectory.len(),
            path.display()
        );
    }

    Ok(())
}

fn cmd_sweep(scenario_path: &Path) -> AppResult<()> {
    let scenario = project_service::load_scenario(scenario_path)?;
    let response = cp_app::run_sweep(&scenario, &LqrConfig::default(), None)?;

    println!("Sweep of {} initial tilts:", response.outcomes.len());
    println!(
        "  {:>10}  {:>10}  {:>12}  {:>12}  {:>10}",
        "theta0_rad", "status", "final_theta", "final_x_m", "settle_s"
    );
    let mut failed = 0;
    for outcome in &response.outcomes {
        match &outcome.result {
            Ok(summary) => {
                let status = match outcome.status {
                    Some(RunStatus::Completed) => "ok",
                    Some(RunStatus::Cancelled) => "cancelled",
                    None => "-",
                };
                let settle = summary
                    .settling_time_s
                    .map(|t| format!("{:.3}", t))
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "  {:>10.4}  {:>10}  {:>12.3e}  {:>12.3e}  {:>10}",
                    outcome.initial_theta_rad,
                    status,
                    summary.final_theta_rad,
                    summary.final_x_m,
                    settle
                );
            }
            Err(e) => {
                failed += 1;
                println!(
                    "  {:>10.4}  {:>10}  {}",
                    outcome.initial_theta_rad,
                    e.kind().to_string(),
                    e
                );
            }
        }
    }
    if failed > 0 {
        println!("{} of {} runs failed", failed, response.outcomes.len());
    } else {
        println!("✓ All runs completed");
    }
    print_timing_summary(&response.timing);
    Ok(())
}

fn cmd_init(scenario_path: &Path, tilt_deg: Option<f64>, force: bool) -> AppResult<()> {
    if scenario_path.exists() && !force {
        return Err(AppError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            scenario_path.display()
        )));
    }

    let mut scenario = Scenario::benchmark();
    if let Some(deg) = tilt_deg {
        scenario.initial.theta_rad = cp_core::units::deg(deg).get::<radian>();
    }
    project_service::save_scenario(scenario_path, &scenario)?;
    println!("✓ Wrote scenario to {}", scenario_path.display());
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &PipelineProgressEvent) {
    match (&event.stage, &event.simulation) {
        (PipelineStage::Simulating, Some(s)) => {
            let width = 28usize;
            let filled = ((s.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.3}/{:.3}s  step={}  elapsed={:.1}s",
                bar,
                s.fraction_complete * 100.0,
                s.sim_time_s,
                s.t_end_s,
                s.step,
                event.elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn print_gain_report(report: &GainReport) {
    let summary = report.summary();
    println!("\nLQR gain:");
    println!(
        "  K = [{:.6}, {:.6}, {:.6}, {:.6}]",
        summary.k[0], summary.k[1], summary.k[2], summary.k[3]
    );
    println!("  Open-loop poles:");
    for [re, im] in &summary.open_loop_poles {
        println!("    {:>10.4} {:+.4}i", re, im);
    }
    println!("  Closed-loop poles:");
    for [re, im] in &summary.closed_loop_poles {
        println!("    {:>10.4} {:+.4}i", re, im);
    }
    println!(
        "  Riccati: {} sign iterations, residual {:.3e}",
        summary.iterations, summary.residual_norm
    );
}

fn print_trajectory_summary(summary: &TrajectorySummary) {
    println!("\nTrajectory:");
    println!("  Time points: {}", summary.record_count);
    println!(
        "  Time range: {:.3} - {:.3} s",
        summary.time_range.0, summary.time_range.1
    );
    println!("  Peak |theta|: {:.4} rad", summary.peak_abs_theta_rad);
    println!("  Peak |x|:     {:.4} m", summary.peak_abs_x_m);
    println!(
        "  Final: x = {:.3e} m, theta = {:.3e} rad",
        summary.final_x_m, summary.final_theta_rad
    );
    match summary.settling_time_s {
        Some(t) => println!(
            "  Settled within {} rad at {:.3} s",
            query::SETTLING_BAND_RAD,
            t
        ),
        None => println!(
            "  Did not settle within {} rad",
            query::SETTLING_BAND_RAD
        ),
    }
}

fn print_timing_summary(timing: &PhaseTimings) {
    let total = timing.total_s().max(1.0e-12);
    println!("\nTiming summary:");
    println!(
        "  Linearize:  {:.4}s ({:.1}%)",
        timing.linearize_s,
        100.0 * timing.linearize_s / total
    );
    println!(
        "  Synthesize: {:.4}s ({:.1}%)",
        timing.synthesize_s,
        100.0 * timing.synthesize_s / total
    );
    println!(
        "  Simulate:   {:.4}s ({:.1}%)",
        timing.simulate_s,
        100.0 * timing.simulate_s / total
    );
    println!("  Total:      {:.4}s", timing.total_s());
}

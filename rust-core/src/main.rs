use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, info};
use nalgebra::{Matrix3, Vector3};
use std::path::{Path, PathBuf};

use diffcalc_core::geometry::geometry_from_config;
use diffcalc_core::modes::{list_modes, required_parameters};
use diffcalc_core::{CalculationSession, OrientationState, SessionConfig};

#[derive(Parser)]
#[command(name = "diffcalc")]
#[command(about = "Crystal orientation and hkl <-> diffractometer angle calculations")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session configuration (JSON); defaults to a six-circle
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Beam energy in keV; defaults to the energy of the first reflection
    #[arg(short, long, global = true)]
    energy: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the modes available on a geometry
    Modes {
        /// Geometry name, overrides the configuration
        #[arg(short, long)]
        geometry: Option<String>,
    },
    /// Recompute U and UB from the reflections of an orientation state
    Ub {
        /// Orientation state file (JSON)
        #[arg(short, long)]
        state: PathBuf,

        /// Write the updated state here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Miller indices at physical motor angles
    Hkl {
        #[arg(short, long)]
        state: PathBuf,

        /// Physical angles in degrees, comma separated
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        angles: Vec<f64>,
    },
    /// Physical motor angles for a reflection
    Angles {
        #[arg(short, long)]
        state: PathBuf,

        /// Mode name or id
        #[arg(short, long)]
        mode: String,

        /// h,k,l
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        hkl: Vec<f64>,

        /// Mode parameter as name=degrees, repeatable
        #[arg(short, long = "param")]
        params: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    debug!("diffcalc v{}", diffcalc_core::VERSION);

    let config = match &cli.config {
        Some(path) => SessionConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Commands::Modes { geometry } => show_modes(config, geometry),
        Commands::Ub { state, output } => calculate_ub(config, &state, output.as_deref()),
        Commands::Hkl { state, angles } => {
            let session = open_session(config, &state, cli.energy)?;
            let hkl = session
                .angles_to_hkl(&angles)
                .context("calculating hkl")?;
            println!("h = {:.6}  k = {:.6}  l = {:.6}", hkl.x, hkl.y, hkl.z);
            for (name, value) in session.virtual_angles(&angles)?.to_degrees_map() {
                println!("{name:>10} = {value:.4}");
            }
            Ok(())
        }
        Commands::Angles {
            state,
            mode,
            hkl,
            params,
        } => {
            let mut session = open_session(config, &state, cli.energy)?;
            let hkl = match hkl.as_slice() {
                [h, k, l] => Vector3::new(*h, *k, *l),
                _ => bail!("--hkl takes three comma-separated values, got {}", hkl.len()),
            };
            session.select_mode(&mode)?;
            for param in &params {
                let (name, value) = parse_param(param)?;
                session.set_parameter(name, value)?;
            }
            let solution = session
                .hkl_to_angles(&hkl)
                .with_context(|| format!("solving {:?} in mode {mode}", hkl.as_slice()))?;
            let names = session.geometry().physical_axis_names();
            let angles = session.physical_angles(&solution.position);
            for (name, value) in names.iter().zip(&angles) {
                println!("{name:>10} = {value:.4}");
            }
            for (name, value) in solution.virtual_angles.to_degrees_map() {
                println!("{name:>10} = {value:.4}");
            }
            info!("{} valid branch(es)", solution.branch_count);
            Ok(())
        }
    }
}

fn show_modes(config: SessionConfig, geometry: Option<String>) -> Result<()> {
    let config = match geometry {
        Some(name) => config.with_geometry(name),
        None => config,
    };
    let geometry = geometry_from_config(&config)?;
    println!(
        "{}: {} ({} constraints)",
        geometry.name(),
        geometry.physical_axis_names().join(", "),
        geometry.required_constraint_count()
    );
    for mode in list_modes(geometry.as_ref()) {
        let parameters = required_parameters(mode, geometry.as_ref());
        let marker = if mode.implemented { "" } else { " (not implemented)" };
        println!("{:>3}  {:<10} [{}]{marker}", mode.id, mode.name, parameters.join(", "));
    }
    Ok(())
}

fn calculate_ub(config: SessionConfig, state: &Path, output: Option<&Path>) -> Result<()> {
    let state = load_state(state)?;
    let mut session = CalculationSession::new(config)?.with_state(state)?;
    let fit = session.calculate_ub().context("fitting the orientation")?;
    print_matrix("U", &fit.orientation.u);
    print_matrix("UB", &fit.orientation.ub);
    for (reflection, residual) in session.state().reflections().iter().zip(&fit.residuals) {
        println!("{:?}  residual {residual:.4}°", reflection.hkl);
    }
    if let Some(path) = output {
        std::fs::write(path, session.state().to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("state written to {}", path.display());
    }
    Ok(())
}

fn open_session(
    config: SessionConfig,
    state: &Path,
    energy: Option<f64>,
) -> Result<CalculationSession> {
    let state = load_state(state)?;
    let energy = energy
        .or_else(|| state.reflections().first().map(|r| r.energy))
        .ok_or_else(|| anyhow!("no --energy given and the state has no reflections"))?;
    let mut session = CalculationSession::new(config)?.with_state(state)?;
    session.set_energy(energy)?;
    Ok(session)
}

fn load_state(path: &Path) -> Result<OrientationState> {
    OrientationState::from_json_file(path)
        .with_context(|| format!("loading orientation state {}", path.display()))
}

fn parse_param(text: &str) -> Result<(&str, f64)> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("parameter '{text}' is not name=value"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .with_context(|| format!("parameter '{name}' has a non-numeric value"))?;
    Ok((name.trim(), value))
}

fn print_matrix(label: &str, m: &Matrix3<f64>) {
    println!("{label}:");
    for row in m.row_iter() {
        println!("  [{:>12.6} {:>12.6} {:>12.6}]", row[0], row[1], row[2]);
    }
}

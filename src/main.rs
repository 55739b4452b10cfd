use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use electron_cloud::orbitals::orbitals_in_shell;
use electron_cloud::physics::{radial_form, RadialForm};
use electron_cloud::sampling::{generate_clouds_parallel, sampling_radius};
use electron_cloud::{find_orbital, OrbitalInfo, PointCloud, Shell, SimulationConfig};

/// Sample electron clouds for iron orbitals
#[derive(Parser, Debug)]
#[command(name = "electron-cloud", version, about)]
struct Args {
    /// Orbital ids, e.g. 1s, 2pz, 3dxy. Repeatable.
    #[arg(short, long = "orbital")]
    orbitals: Vec<String>,

    /// Add every orbital of a shell (K, L, M or N)
    #[arg(long)]
    shell: Option<String>,

    /// Points requested per orbital
    #[arg(short, long, default_value_t = SimulationConfig::default().point_count)]
    count: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Print the point clouds as JSON instead of a summary
    #[arg(long)]
    json: bool,

    #[arg(long, env = "ELECTRON_CLOUD_LOG", default_value = "warn")]
    log_level: String,
}

#[derive(Serialize)]
struct CloudOutput<'a> {
    id: &'static str,
    #[serde(flatten)]
    cloud: &'a PointCloud,
}

fn parse_shell(value: &str) -> Option<Shell> {
    match value.to_ascii_uppercase().as_str() {
        "K" => Some(Shell::K),
        "L" => Some(Shell::L),
        "M" => Some(Shell::M),
        "N" => Some(Shell::N),
        _ => None,
    }
}

fn mean_radius(cloud: &PointCloud) -> f32 {
    if cloud.is_empty() {
        return 0.0;
    }
    let total: f32 = cloud
        .positions
        .iter()
        .map(|[x, y, z]| (x * x + y * y + z * z).sqrt())
        .sum();
    total / cloud.len() as f32
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut selected: Vec<&'static OrbitalInfo> = Vec::new();
    if let Some(shell) = &args.shell {
        let shell = parse_shell(shell).ok_or_else(|| format!("unknown shell: {shell}"))?;
        selected.extend(orbitals_in_shell(shell));
    }
    for id in &args.orbitals {
        let orbital = find_orbital(id)?;
        if !selected.iter().any(|o| o.id == orbital.id) {
            selected.push(orbital);
        }
    }
    if selected.is_empty() {
        selected.push(find_orbital("1s")?);
    }

    let clouds = generate_clouds_parallel(&selected, args.count, args.seed);

    if args.json {
        let out: Vec<CloudOutput> = selected
            .iter()
            .zip(&clouds)
            .map(|(orbital, cloud)| CloudOutput { id: orbital.id, cloud })
            .collect();
        println!("{}", serde_json::to_string(&out)?);
        return Ok(());
    }

    println!("Electron cloud sampler - Fe (Z=26)");
    println!("==================================");
    for (orbital, cloud) in selected.iter().zip(&clouds) {
        let qn = orbital.qn;
        let note = match radial_form(qn.n, qn.l) {
            RadialForm::Tabulated => "",
            RadialForm::Fallback => " (approx. radial)",
        };
        println!(
            "{:<8} shell {} (n={}, l={}, m={:>2})  {:>6}/{:<6} points  {:>8} candidates  {:>5.1}% accepted  <r>={:.2} of {:.0}{}",
            orbital.label,
            orbital.shell.as_str(),
            qn.n,
            qn.l,
            qn.m_l,
            cloud.len(),
            cloud.target,
            cloud.iterations,
            cloud.acceptance_rate() * 100.0,
            mean_radius(cloud),
            sampling_radius(qn.n),
            note,
        );
    }

    Ok(())
}

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use electron_cloud::config::CliOverrides;
use electron_cloud::sampling::{sampling_radius, stream_seed};
use electron_cloud::{
    catalog, find_orbital, generate_orbital_cloud, OrbitalScene, Rgb, SceneUpdate, ServerConfig,
    SimulationConfig,
};

/// Serves orbital point clouds as JSON
#[derive(Parser, Debug)]
#[command(name = "electron-cloud-web", version, about)]
struct Args {
    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,

    /// trace, debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,

    /// Fixed sampling seed for reproducible clouds
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone)]
struct AppState {
    scene: Arc<Mutex<OrbitalScene>>,
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct SampleQuery {
    id: Option<String>,
    count: Option<usize>,
    seed: Option<u64>,
}

#[derive(Serialize)]
struct SampleResponse {
    id: &'static str,
    n: u32,
    l: u32,
    m: i32,
    count: usize,
    accepted: usize,
    iterations: usize,
    sampling_radius: f64,
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
}

#[derive(Deserialize)]
struct SceneQuery {
    /// Comma separated orbital ids
    ids: Option<String>,
    count: Option<usize>,
    opacity: Option<f32>,
}

#[derive(Serialize)]
struct SceneCloud {
    id: &'static str,
    color: Rgb,
    accepted: usize,
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
}

#[derive(Serialize)]
struct SceneResponse {
    update: SceneUpdate,
    config: SimulationConfig,
    /// Only the clouds sampled by this request; retained ones are unchanged.
    clouds: Vec<SceneCloud>,
}

fn bad_request(message: impl ToString) -> Response {
    (StatusCode::BAD_REQUEST, message.to_string()).into_response()
}

fn internal_error(message: impl ToString) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()).into_response()
}

/// Requested point count snapped into the viewer's range.
fn sample_count(requested: Option<usize>) -> usize {
    let mut config = SimulationConfig::default();
    if let Some(count) = requested {
        config.point_count = count;
    }
    config.clamped().point_count
}

async fn orbitals() -> impl IntoResponse {
    Json(catalog())
}

async fn samples(State(state): State<AppState>, Query(q): Query<SampleQuery>) -> Response {
    let id = q.id.as_deref().unwrap_or("1s");
    let orbital = match find_orbital(id) {
        Ok(orbital) => orbital,
        Err(e) => return bad_request(e),
    };
    let count = sample_count(q.count);
    let seed = q.seed.or(state.seed);

    let cloud = tokio::task::spawn_blocking(move || {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(stream_seed(seed, orbital.id)),
            None => StdRng::from_entropy(),
        };
        generate_orbital_cloud(orbital.qn, orbital.color, count, &mut rng)
    })
    .await;
    let cloud = match cloud {
        Ok(cloud) => cloud,
        Err(e) => return internal_error(format!("sampling task failed: {e}")),
    };

    Json(SampleResponse {
        id: orbital.id,
        n: orbital.qn.n,
        l: orbital.qn.l,
        m: orbital.qn.m_l,
        count,
        accepted: cloud.len(),
        iterations: cloud.iterations,
        sampling_radius: sampling_radius(orbital.qn.n),
        positions: cloud.positions,
        colors: cloud.colors,
    })
    .into_response()
}

async fn scene(State(state): State<AppState>, Query(q): Query<SceneQuery>) -> Response {
    // No ids means keep the current selection
    let ids: Option<Vec<String>> = q.ids.as_deref().map(|ids| {
        ids.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    });

    let scene = state.scene.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut scene = scene.lock().map_err(|_| internal_error("scene lock poisoned"))?;
        let mut config = scene.config().clone();
        if let Some(count) = q.count {
            config.point_count = count;
        }
        if let Some(opacity) = q.opacity {
            config.opacity = opacity;
        }

        let update = match &ids {
            Some(ids) => scene.apply(ids.as_slice(), config),
            None => scene.set_config(config),
        }
        .map_err(bad_request)?;
        let clouds = scene
            .clouds()
            .filter(|(orbital, _)| update.generated.contains(&orbital.id))
            .map(|(orbital, cloud)| SceneCloud {
                id: orbital.id,
                color: orbital.color,
                accepted: cloud.len(),
                positions: cloud.positions.clone(),
                colors: cloud.colors.clone(),
            })
            .collect();

        Ok::<_, Response>(SceneResponse {
            update,
            config: scene.config().clone(),
            clouds,
        })
    })
    .await;

    match result {
        Ok(Ok(body)) => Json(body).into_response(),
        Ok(Err(response)) => response,
        Err(e) => internal_error(format!("scene task failed: {e}")),
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = ServerConfig::from_env()?;
    config.merge_with_cli(&CliOverrides {
        host: args.host,
        port: args.port,
        log_level: args.log_level,
        seed: args.seed,
    });

    init_tracing(&config.log_level);

    let state = AppState {
        scene: Arc::new(Mutex::new(OrbitalScene::new(SimulationConfig::default(), config.seed))),
        seed: config.seed,
    };

    let app = Router::new()
        .route("/orbitals", get(orbitals))
        .route("/samples", get(samples))
        .route("/scene", get(scene))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
    tracing::info!(address = %config.socket_addr(), seed = ?config.seed, "serving orbital clouds");
    axum::serve(listener, app).await?;
    Ok(())
}

//! Headless driver for the orrery placement engine.
//!
//! Loads a selection from the catalog, places it in a simulated AR scene and
//! runs the frame loop: model loads complete in the background, the layout is
//! reapplied as they land, and once everything is placed the viewer walks into
//! the first body to exercise the inside warning.

mod async_runtime;
mod launch_params;
mod loader;
mod scene;

use std::sync::Arc;

use glam::Vec2;
use orrery_catalog::{AssetStore, FavoritesStore};
use orrery_place::{
    ArRuntime, NodeHandle, PlacementEvent, PlacementSession, PlacementState,
    multiplier_from_slider,
};
use web_time::{Duration, Instant};

use async_runtime::TokioSpawner;
use launch_params::{CatalogSource, LaunchParams, PlacementMode};
use scene::{SimulatedScene, VIEWPORT};

/// Frame time at 60 fps.
const FRAME: Duration = Duration::from_micros(16_667);
/// Where the simulated user taps.
const TAP: Vec2 = Vec2::new(VIEWPORT.x / 2.0, VIEWPORT.y * 0.6);
/// Frames between placement attempts while no surface is found.
const PLACE_RETRY_FRAMES: u32 = 30;
/// Walking speed of the simulated viewer, per frame.
const WALK_STEP: f32 = 0.02;

#[tokio::main]
async fn main() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let params = launch_params::parse();
    if let Err(e) = run(params).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(params: LaunchParams) -> orrery_catalog::Result<()> {
    let catalog = loader::open_catalog(&params.catalog, params.cache_dir.as_deref()).await?;
    let mut favorites = match &params.favorites {
        Some(path) => Some(FavoritesStore::open(path).await?),
        None => None,
    };
    let bodies = loader::load_selection(catalog.as_ref(), &params, favorites.as_ref()).await?;
    if bodies.is_empty() {
        tracing::warn!("none of the requested bodies were found");
        return Ok(());
    }

    let assets = params.cache_dir.as_ref().map(|dir| {
        let base_url = match &params.catalog {
            CatalogSource::Http(url) => Some(url.as_str()),
            CatalogSource::File(_) => None,
        };
        Arc::new(AssetStore::new(dir.join("models"), base_url))
    });
    let mut scene = SimulatedScene::new(params.model_extent, assets);
    scene.set_tracking(params.tracking_delay == 0);
    let mut session = PlacementSession::new(
        scene,
        TokioSpawner::current(),
        params.preset.parameters(),
        params.screen_dp,
    );
    session.set_scale_multiplier(multiplier_from_slider(params.slider));
    session.set_selection(bodies.clone());

    let mut placed = false;
    let mut inspected = false;
    for frame in 0..params.frames {
        if frame == params.tracking_delay {
            tracing::info!(frame, "tracking started");
            session.runtime_mut().set_tracking(true);
        }
        if !placed && frame % PLACE_RETRY_FRAMES == 0 {
            placed = match params.mode {
                PlacementMode::Surface => session.handle_tap(TAP, None),
                PlacementMode::Air => session.place_in_air(),
            };
        }

        session.on_frame(Instant::now());
        report(&mut session);

        if session.state() == PlacementState::Placed {
            let first = session.placed_nodes().values().next().copied();
            if let (false, Some(node)) = (inspected, first) {
                inspected = true;
                inspect(&mut session, node);
            }
            let target = first.and_then(|node| session.runtime().world_position(node));
            if let Some(target) = target {
                session.runtime_mut().walk_towards(target, WALK_STEP);
            }
        }
        tokio::time::sleep(FRAME).await;
    }

    for slot in &session.layout().slots {
        let name = bodies.get(slot.index).map_or("?", |body| body.name.as_str());
        tracing::info!(
            name,
            x = slot.x,
            scale = slot.scale,
            radius = slot.rendered_radius,
            "final layout"
        );
    }

    if let (true, Some(store)) = (params.remember, favorites.as_mut()) {
        let placed: Vec<_> = session
            .placed_nodes()
            .keys()
            .filter_map(|&index| bodies.get(index).cloned())
            .collect();
        loader::remember(store, &placed).await?;
    }

    let scene = session.teardown();
    tracing::info!(
        attached = scene.attached_count(),
        camera = ?scene.camera_position(),
        "simulation finished"
    );
    Ok(())
}

/// Tap a placed body the way a user would before pinching it.
fn inspect(session: &mut PlacementSession<SimulatedScene, TokioSpawner>, node: NodeHandle) {
    session.handle_tap(TAP, Some(node));
    let Some(index) = session.selected() else {
        return;
    };
    if let Some((min, max)) = session.manual_scale_bounds(index) {
        tracing::info!(index, min, max, "selected body, pinch range");
    }
}

/// Log the session's pending notifications the way a UI would toast them.
fn report(session: &mut PlacementSession<SimulatedScene, TokioSpawner>) {
    for event in session.drain_events() {
        match event {
            PlacementEvent::AssetFailed { .. }
            | PlacementEvent::NoSurface
            | PlacementEvent::NoSelection => tracing::warn!("{event}"),
            _ => tracing::info!("{event}"),
        }
    }
}

use cl_draw::args;
use cl_draw::controller::assets::HttpAssetLoader;
use cl_draw::controller::draw::HttpDrawSource;
use cl_draw::controller::router::ChannelRouter;
use cl_draw::model::{FlagUrls, RouteParams};
use cl_draw::mvu::season::{Deps, Snapshot, Status};
use cl_draw::view::status::{Presentation, render_presentation};
use cl_draw::SeasonDataController;

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = args::args_checks();
    let config = args.controller_config();
    let default_season = config.default_season;

    let (router, mut route_changes) = ChannelRouter::new();
    let deps = Deps::new(
        Arc::new(HttpDrawSource::new(args.base_url.clone())),
        Arc::new(HttpAssetLoader::new()),
        FlagUrls::new(args.base_url.clone()),
        Arc::new(router),
    );

    let mut reset_tokens = 0_u64..;
    let mut next_token = move || reset_tokens.next().unwrap_or_default().to_string();

    let controller = SeasonDataController::new(config, deps);
    let mut snapshots = controller.subscribe();
    controller.set_online(!args.offline);
    controller.navigate(args.path.clone(), next_token());

    let mut last = controller.snapshot();
    loop {
        tokio::select! {
            Some(change) = route_changes.recv() => {
                let route = RouteParams::with_change(&change);
                if Some(route.season_or(default_season)) == last.requested_season {
                    return Err(format!(
                        "no draw available for {}",
                        route.to_path()
                    ).into());
                }
                info!(path = %route.to_path(), "rolling back route");
                controller.navigate(route, next_token());
            }
            changed = snapshots.changed() => {
                changed?;
                last = snapshots.borrow_and_update().clone();
                match &last.status {
                    Status::Ready => {
                        print_snapshot(&last, args.json)?;
                        return Ok(());
                    }
                    Status::Failed(_) => print_snapshot(&last, args.json)?,
                    Status::Idle | Status::Waiting => {}
                }
            }
        }
    }
}

fn print_snapshot(snapshot: &Snapshot, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        let presentation = Presentation::from_snapshot(snapshot);
        println!("{}", render_presentation(&presentation).into_string());
    }
    Ok(())
}

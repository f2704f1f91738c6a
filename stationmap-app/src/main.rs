use clap::Parser;
use stationmap::{
    core::{geo::Point, session::PanOutcome},
    InputEvent, MapSession, SessionConfig,
};
use std::{path::PathBuf, time::Duration};

/// Drives one station map session from the command line.
#[derive(Debug, Parser)]
#[command(name = "stationmap-app", version, about)]
struct Options {
    /// Session configuration as JSON.
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
    /// Read overlay rows from a local CSV export instead of the table service.
    #[arg(long = "table", value_name = "CSV")]
    table: Option<PathBuf>,
    /// Address to geocode and pan to.
    #[arg(long = "pan", value_name = "ADDRESS")]
    pan: Option<String>,
    /// Canvas size to resize to, e.g. `1024x768`.
    #[arg(long = "size", value_name = "WxH", value_parser = parse_size)]
    size: Option<Point>,
    /// Container pixel to click; may be repeated.
    #[arg(long = "click", value_name = "X,Y", value_parser = parse_click)]
    clicks: Vec<Point>,
}

fn parse_pair(value: &str, separator: char) -> Result<Point, String> {
    let (x, y) = value.split_once(separator).ok_or_else(|| {
        format!("expected two numbers separated by `{}`, got `{}`", separator, value)
    })?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("`{}`: {}", x, e))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("`{}`: {}", y, e))?;
    Ok(Point::new(x, y))
}

fn parse_size(value: &str) -> Result<Point, String> {
    let size = parse_pair(value, 'x')?;
    if size.x <= 0.0 || size.y <= 0.0 {
        return Err(format!("size `{}` must be positive", value));
    }
    Ok(size)
}

fn parse_click(value: &str) -> Result<Point, String> {
    parse_pair(value, ',')
}

/// Give detached work a moment to report back
async fn settle(session: &mut MapSession) {
    for _ in 0..50 {
        if session.process_pending() > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    log::warn!("Overlay did not report back in time");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    let options = Options::parse();

    let config = match &options.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };

    let mut builder = MapSession::builder().config(config);
    if let Some(table) = &options.table {
        builder = builder.table_file(table);
    }
    let mut session = builder.build()?;

    session.initialize()?;
    session.on("*", |event| log::debug!("map event: {:?}", event))?;
    settle(&mut session).await;

    if let Some(size) = options.size {
        session.handle_input(InputEvent::Resize { size })?;
    }

    if let Some(address) = &options.pan {
        match session.pan_to_now(address).await {
            Ok(PanOutcome::Moved { center, .. }) => {
                println!("panned to {}, {}", center.lat, center.lng)
            }
            Ok(PanOutcome::Ignored(status)) => println!("no match for `{}` ({})", address, status),
            Err(e) => eprintln!("geocoding failed: {}", e),
        }
    }

    for pixel in options.clicks {
        if let Err(e) = session.handle_click(pixel) {
            eprintln!("click at {},{} ignored: {}", pixel.x, pixel.y, e);
        }
    }

    if let Some(map) = session.map() {
        let center = map.center();
        println!("center {}, {} zoom {}", center.lat, center.lng, map.zoom());
    }
    println!("{}", session.station_id());

    Ok(())
}

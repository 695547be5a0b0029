#![deny(warnings)]

mod archive;
mod camera;
mod config;
mod errors;
mod logging;
mod recorder;
mod session;
mod vision;

type Result<T> = anyhow::Result<T>;

use session::Session;
use std::time::Duration;
use tokio::sync::watch;

const DEFAULT_INSTRUCTION: &str = "What do you see?";
const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() {
    use logging::*;

    let log = DEFAULT.new(o!("function" => "main"));
    info!(log, "Starting up");

    if let Some(port) = recorder::get_port() {
        tokio::spawn(recorder::run(port));
    }

    let instruction = config::get_or("VLM_INSTRUCTION", DEFAULT_INSTRUCTION);
    let interval = config::get_duration("CAPTURE_INTERVAL", DEFAULT_INTERVAL);
    let camera_index = config::get_number("CAMERA_DEVICE", 0);

    let source = match camera::Webcam::open(camera_index) {
        Ok(source) => source,
        Err(err) => {
            crit!(log, "camera unavailable"; "index" => camera_index, "error" => %err);
            std::process::exit(1);
        }
    };

    let session = Session::new(
        source,
        vision::VisionClient::new_default(),
        session::ConsolePublisher,
        instruction,
        interval,
        archive::Archiver::from_env(),
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    session.run(stop_rx).await;
    info!(log, "Shut down");
}

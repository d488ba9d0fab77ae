use std::{error::Error, fmt::Display, path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use photo_strip::{
    backend::{
        cameras::{still::StillCamera, CameraBackendCamera},
        capture::CaptureOutcome,
        compositor::DeviceClass,
        filters::Filter,
        pattern::PatternKind,
        session::BoothSession,
        slots::Template,
    },
    config::BoothConfig,
};

#[derive(Parser)]
#[command(name = "photo-strip")]
#[command(about = "Capture photos and compose them into a photo booth strip")]
#[command(version)]
struct Cli {
    /// JSON file with booth defaults
    #[arg(short = 'C', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Shoot a strip with a live camera
    Shoot {
        /// Camera index to use (from 'photo-strip list')
        #[arg(short, long, default_value = "0")]
        camera: usize,

        /// Seconds to count down before each shot
        #[arg(long)]
        countdown: Option<u64>,

        #[command(flatten)]
        strip: StripArgs,
    },

    /// Compose a strip from image files instead of a camera
    Compose {
        /// Images used as frames, in order, repeating if there are fewer than slots
        #[arg(required = true)]
        images: Vec<PathBuf>,

        #[command(flatten)]
        strip: StripArgs,
    },
}

#[derive(Args)]
struct StripArgs {
    /// Layout: classic (3 photos), quad (4) or duo (2)
    #[arg(short, long)]
    template: Option<Template>,

    /// none, grayscale, sepia, invert, warm or cool
    #[arg(short, long)]
    filter: Option<Filter>,

    /// Mirror photos horizontally
    #[arg(long)]
    flip: bool,

    /// Background: dots, stars, hearts or solid
    #[arg(short, long)]
    pattern: Option<PatternKind>,

    /// Frame border color, e.g. "#D4AF37"
    #[arg(short, long)]
    border: Option<String>,

    /// portrait or landscape frames
    #[arg(long)]
    device_class: Option<DeviceClass>,

    /// Header text
    #[arg(long)]
    caption: Option<String>,

    /// Directory the strip is saved into
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl StripArgs {
    fn apply(self, config: &mut BoothConfig) {
        if let Some(template) = self.template {
            config.template = template;
        }
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        config.flipped |= self.flip;
        if let Some(pattern) = self.pattern {
            config.pattern = pattern;
        }
        if let Some(border) = self.border {
            config.border_color = border;
        }
        if let Some(device_class) = self.device_class {
            config.device_class = device_class;
        }
        if let Some(caption) = self.caption {
            config.caption = caption;
        }
        if let Some(output) = self.output {
            config.output_dir = Some(output);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = BoothConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::List => list_cameras(),
        Commands::Shoot {
            camera,
            countdown,
            strip,
        } => {
            strip.apply(&mut config);
            if let Some(countdown) = countdown {
                config.countdown_secs = countdown;
            }
            shoot(camera, &config).await
        }
        Commands::Compose { images, strip } => {
            strip.apply(&mut config);
            config.countdown_secs = 0;
            run_booth(StillCamera::open(&images), &config).await
        }
    }
}

/// Fill every slot from `camera`, export the strip, and print its path.
async fn run_booth<C: CameraBackendCamera, E: Display>(
    camera: Result<C, E>,
    config: &BoothConfig,
) -> Result<(), Box<dyn Error>> {
    let mut session = BoothSession::new(config.strip_settings());
    session.enter(camera)?;

    while session.remaining() > 0 {
        for remaining in (1..=config.countdown_secs).rev() {
            log::info!("{}...", remaining);
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        match tokio::task::block_in_place(|| session.capture())? {
            CaptureOutcome::Captured { index } => {
                log::info!("Photo {} of {}", index + 1, session.slots().len())
            }
            CaptureOutcome::NoCapacity => break,
        }
    }

    let path = session.export(config.output_dir()).await?;
    session.leave();
    println!("{}", path.display());
    Ok(())
}

#[cfg(any(feature = "camera_nokhwa", feature = "camera_gphoto2"))]
fn list_cameras() -> Result<(), Box<dyn Error>> {
    use photo_strip::backend::cameras::{CameraBackend, DefaultCameraBackend};

    DefaultCameraBackend::initialize()
        .map_err(|err| format!("failed to initialize camera backend: {}", err))?;
    let cameras = DefaultCameraBackend::enumerate_cameras()
        .map_err(|err| format!("failed to enumerate cameras: {}", err))?;

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }
    println!("Available cameras:");
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera);
    }
    Ok(())
}

#[cfg(any(feature = "camera_nokhwa", feature = "camera_gphoto2"))]
async fn shoot(camera_index: usize, config: &BoothConfig) -> Result<(), Box<dyn Error>> {
    use photo_strip::backend::cameras::{CameraBackend, DefaultCameraBackend};

    DefaultCameraBackend::initialize()
        .map_err(|err| format!("failed to initialize camera backend: {}", err))?;
    let camera = DefaultCameraBackend::enumerate_cameras()
        .map_err(|err| format!("failed to enumerate cameras: {}", err))?
        .get(camera_index)
        .cloned()
        .ok_or_else(|| format!("no camera at index {}", camera_index))?;
    run_booth(DefaultCameraBackend::open_camera(camera), config).await
}

#[cfg(not(any(feature = "camera_nokhwa", feature = "camera_gphoto2")))]
fn list_cameras() -> Result<(), Box<dyn Error>> {
    Err("built without a camera backend; enable camera_nokhwa or camera_gphoto2".into())
}

#[cfg(not(any(feature = "camera_nokhwa", feature = "camera_gphoto2")))]
async fn shoot(_camera_index: usize, _config: &BoothConfig) -> Result<(), Box<dyn Error>> {
    Err("built without a camera backend; enable camera_nokhwa or camera_gphoto2".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn shoot_accepts_camera_and_config_flags() {
        let cli = Cli::try_parse_from([
            "photo-strip",
            "shoot",
            "-c",
            "2",
            "-C",
            "booth.json",
            "--template",
            "duo",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("booth.json")));
        match cli.command {
            Commands::Shoot { camera, strip, .. } => {
                assert_eq!(camera, 2);
                assert_eq!(strip.template, Some(Template::Duo));
            }
            _ => panic!("expected the shoot subcommand"),
        }
    }
}

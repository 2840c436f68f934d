use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

use smileguard_core::camera::frame_source::FrameSource;
use smileguard_core::detection::domain::smile_detector::{SmileDetection, SmileDetector};
use smileguard_core::detection::infrastructure::detector_factory::create_smile_detector;
use smileguard_core::events::infrastructure::file_event_sink::FileEventSink;
use smileguard_core::pipeline::batch_use_case::BatchSmileUseCase;
use smileguard_core::pipeline::single_shot::capture_and_detect;
use smileguard_core::pipeline::smile_service::{ServiceError, SmileService};
use smileguard_core::shared::config::{SmileGuardConfig, Strategy};
use smileguard_core::video::domain::image_reader::ImageReader;
use smileguard_core::video::domain::image_writer::ImageWriter;
use smileguard_core::video::infrastructure::default_camera_opener;
use smileguard_core::video::infrastructure::image_file_reader::ImageFileReader;
use smileguard_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Smile detection on webcam frames and image files.
#[derive(Parser)]
#[command(name = "smileguard")]
struct Cli {
    /// JSON configuration file. Missing keys take their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Detection strategy: region or landmark (overrides the config file).
    #[arg(long, global = true)]
    strategy: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect smiles in one image file.
    Image {
        input: PathBuf,

        /// Where to write the annotated JPEG when a smile is found.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Sort a directory of images into smile/ and no_smile/.
    Batch { input_dir: PathBuf, output_dir: PathBuf },
    /// Capture one webcam frame and detect on it.
    Snapshot,
    /// Run the camera and poll for smiles, persisting each detection.
    Live {
        /// Delay between detection polls.
        #[arg(long, default_value = "500")]
        interval_ms: u64,

        /// Stop after this many polls (runs until interrupted when absent).
        #[arg(long)]
        count: Option<u64>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = SmileGuardConfig::load(cli.config.as_deref())?;
    if let Some(ref s) = cli.strategy {
        config.strategy = s.parse::<Strategy>()?;
    }
    validate(&cli.command)?;

    let detector = create_smile_detector(&config, config.strategy, Some(download_progress))?;

    match cli.command {
        Command::Image { input, output } => run_image(&input, output.as_deref(), detector.as_ref()),
        Command::Batch {
            input_dir,
            output_dir,
        } => run_batch(&input_dir, &output_dir, detector),
        Command::Snapshot => run_snapshot(&config, detector.as_ref()),
        Command::Live { interval_ms, count } => {
            run_live(&config, detector, Duration::from_millis(interval_ms), count)
        }
    }
}

fn run_image(
    input: &Path,
    output: Option<&Path>,
    detector: &dyn SmileDetector,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = ImageFileReader::new().read(input)?;
    let Some(detection) = detector.detect(&frame)? else {
        println!("[]");
        log::info!("No smile detected in {}", input.display());
        return Ok(());
    };

    print_boxes(&detection)?;
    if let Some(output) = output {
        ImageFileWriter::new().write(output, &detection.image)?;
        log::info!("Output written to {}", output.display());
    }
    Ok(())
}

fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    detector: Arc<dyn SmileDetector>,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress: Box<dyn Fn(usize, usize) + Send> = Box::new(|current, total| {
        eprint!("\rProcessing image {current}/{total}");
    });

    let use_case = BatchSmileUseCase::new(
        Arc::new(ImageFileReader::new()),
        detector,
        Arc::new(ImageFileWriter::new()),
        Some(progress),
    );
    let summary = use_case.execute(input_dir, output_dir)?;
    eprintln!();
    println!("{summary}");
    Ok(())
}

fn run_snapshot(
    config: &SmileGuardConfig,
    detector: &dyn SmileDetector,
) -> Result<(), Box<dyn std::error::Error>> {
    let opener = default_camera_opener();
    match capture_and_detect(opener.as_ref(), config.capture.device_index, detector)? {
        Some(detection) => print_boxes(&detection),
        None => {
            println!("[]");
            Ok(())
        }
    }
}

fn run_live(
    config: &SmileGuardConfig,
    detector: Arc<dyn SmileDetector>,
    interval: Duration,
    count: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let frames = Arc::new(FrameSource::new(
        default_camera_opener(),
        config.capture.device_index,
        config.capture.frame_interval(),
    ));
    let sink = Arc::new(FileEventSink::from_config(&config.events));
    log::info!(
        "Logging detections to {} and {}",
        sink.log_path().display(),
        sink.image_dir().display()
    );
    let service = SmileService::new(frames, detector, sink);

    service.start_camera()?;
    let result = poll_detections(&service, interval, count);
    service.shutdown();
    result
}

fn poll_detections(
    service: &SmileService,
    interval: Duration,
    count: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut polls = 0u64;
    while count.map_or(true, |n| polls < n) {
        thread::sleep(interval);
        polls += 1;
        match service.detect_smile() {
            Ok(Some(detection)) => print_boxes(&detection)?,
            Ok(None) => {}
            Err(ServiceError::Conflict(msg)) => return Err(msg.into()),
            Err(e) => log::error!("{e}"),
        }
    }
    Ok(())
}

fn print_boxes(detection: &SmileDetection) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(&detection.boxes)?);
    Ok(())
}

fn validate(command: &Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Image { input, .. } if !input.is_file() => {
            Err(format!("Input file not found: {}", input.display()).into())
        }
        Command::Batch { input_dir, .. } if !input_dir.is_dir() => {
            Err(format!("Input directory not found: {}", input_dir.display()).into())
        }
        Command::Live { interval_ms: 0, .. } => Err("Interval must be at least 1 ms".into()),
        _ => Ok(()),
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model... {pct}%");
    } else {
        eprint!("\rDownloading model... {downloaded} bytes");
    }
}

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use aqmaq_core::detection::infrastructure::face_crop_capture::FaceCropCapture;
use aqmaq_core::detection::infrastructure::model_resolver;
use aqmaq_core::detection::infrastructure::onnx_blazeface_detector::{
    OnnxBlazefaceDetector, DEFAULT_CONFIDENCE,
};
use aqmaq_core::events::domain::incident_publisher::IncidentPublisher;
use aqmaq_core::events::infrastructure::http_incident_publisher::HttpIncidentPublisher;
use aqmaq_core::events::infrastructure::jsonl_incident_sink::JsonlIncidentSink;
use aqmaq_core::events::infrastructure::queued_incident_publisher::QueuedIncidentPublisher;
use aqmaq_core::events::infrastructure::thumbnail_writer::ThumbnailWriter;
use aqmaq_core::motion::domain::line_crossing::LineCrossingDetector;
use aqmaq_core::motion::infrastructure::background_subtractor::BackgroundSubtractionDetector;
use aqmaq_core::pipeline::line_runner::LineRunner;
use aqmaq_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use aqmaq_core::pipeline::run_summary::RunSummary;
use aqmaq_core::pipeline::zone_runner::ZoneRunner;
use aqmaq_core::scoring::infrastructure::scorer_factory::create_scorer;
use aqmaq_core::shared::clock::SystemClock;
use aqmaq_core::shared::constants::{
    DEFAULT_ACTIVATION_THRESHOLD, DEFAULT_API_URL, DEFAULT_AREA_THRESHOLD,
    DEFAULT_CAPTURE_OPTIONS, DEFAULT_COOLDOWN_SECONDS, DEFAULT_DATA_DIR, DEFAULT_LINE_TOLERANCE,
    DEFAULT_LINE_Y, DEFAULT_MIN_FACE_SIZE, DEFAULT_NO_MOTION_SECONDS,
    DEFAULT_PUBLISH_TIMEOUT_SECS, DEFAULT_SOURCE, FACE_MODEL_NAME,
};
use aqmaq_core::shared::settings::Settings;
use aqmaq_core::video::domain::capture_source::{CaptureSource, RetryPolicy};
use aqmaq_core::video::domain::source_spec::SourceSpec;
use aqmaq_core::video::infrastructure::capture_options::CaptureOptions;
use aqmaq_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use aqmaq_core::video::infrastructure::image_file_writer::ImageFileWriter;
use aqmaq_core::zones::domain::zone_activation::ZoneActivationTracker;
use aqmaq_core::zones::infrastructure::zone_file_loader::load_zones;

/// Incident detection on camera streams and video files.
#[derive(Parser)]
#[command(name = "aqmaq", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count objects crossing a horizontal line and track motion presence.
    Line(LineArgs),
    /// Score interaction inside configured zones and capture faces.
    Zone(ZoneArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// "0" for the default camera, an rtsp:// URL, or a video file.
    #[arg(long, env = "SOURCE", default_value = DEFAULT_SOURCE)]
    source: String,

    /// Incident ingestion endpoint.
    #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Write incidents to the local JSONL log instead of posting them.
    #[arg(long)]
    offline: bool,

    /// Root directory for thumbnails, face crops and the incident log.
    #[arg(long, env = "AQMAQ_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Demuxer options for stream sources ("key;value|key;value").
    #[arg(long, env = "CAPTURE_OPTIONS", default_value = DEFAULT_CAPTURE_OPTIONS)]
    capture_options: String,

    /// Seconds before an incident POST is abandoned.
    #[arg(long, default_value_t = DEFAULT_PUBLISH_TIMEOUT_SECS)]
    publish_timeout: f64,

    /// Queue incidents for a background publisher (0 = publish inline).
    #[arg(long, default_value_t = 0)]
    publish_queue: usize,
}

#[derive(Args)]
struct LineArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Vertical pixel position of the counting line.
    #[arg(long, env = "LINE_Y", default_value_t = DEFAULT_LINE_Y)]
    line_y: i32,

    /// Seconds without motion before presence ends.
    #[arg(long, env = "NO_MOTION_SECONDS", default_value_t = DEFAULT_NO_MOTION_SECONDS)]
    no_motion_seconds: f64,

    /// Minimum blob bounding-box area (pixels) that counts as motion.
    #[arg(long, default_value_t = DEFAULT_AREA_THRESHOLD)]
    area_threshold: i64,

    /// Maximum distance (pixels) between a blob center and the line.
    #[arg(long, default_value_t = DEFAULT_LINE_TOLERANCE)]
    line_tolerance: i32,

    /// Suppress further crossings for this many seconds after one is reported.
    #[arg(long)]
    crossing_debounce: Option<f64>,
}

#[derive(Args)]
struct ZoneArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Zone definition JSON file.
    #[arg(long, env = "ZONE_CONFIG_PATH")]
    zones: Option<PathBuf>,

    /// ONNX interaction model (edge-density heuristic when absent).
    #[arg(long, env = "ZONE_MODEL_PATH")]
    model: Option<PathBuf>,

    /// Score at which a zone becomes active (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_ACTIVATION_THRESHOLD)]
    threshold: f64,

    /// Seconds below threshold before a zone becomes inactive.
    #[arg(long, default_value_t = DEFAULT_COOLDOWN_SECONDS)]
    cooldown: f64,

    /// BlazeFace ONNX model (resolved from the model cache when absent).
    #[arg(long, env = "FACE_MODEL_PATH")]
    face_model: Option<PathBuf>,

    /// Download location used when the face model is not cached.
    #[arg(long, env = "FACE_MODEL_URL")]
    face_model_url: Option<String>,

    /// Faces smaller than this many pixels on either side are ignored.
    #[arg(long, default_value_t = DEFAULT_MIN_FACE_SIZE)]
    min_face_size: u32,
}

impl CommonArgs {
    fn apply(&self, settings: Settings) -> Result<Settings, Box<dyn std::error::Error>> {
        if !self.publish_timeout.is_finite() || self.publish_timeout <= 0.0 {
            return Err(format!(
                "Publish timeout must be a positive number of seconds, got {}",
                self.publish_timeout
            )
            .into());
        }
        let api_url = Some(self.api_url.trim())
            .filter(|url| !self.offline && !url.is_empty())
            .map(str::to_string);
        let capture_options = Some(self.capture_options.trim())
            .filter(|opts| !opts.is_empty())
            .map(str::to_string);
        Ok(Settings {
            source: self.source.clone(),
            api_url,
            data_dir: self.data_dir.clone(),
            capture_options,
            publish_timeout: Duration::from_secs_f64(self.publish_timeout),
            publish_queue_capacity: self.publish_queue,
            ..settings
        })
    }
}

impl LineArgs {
    fn settings(&self) -> Result<Settings, Box<dyn std::error::Error>> {
        let settings = self.common.apply(Settings {
            line_y: self.line_y,
            no_motion_seconds: self.no_motion_seconds,
            area_threshold: self.area_threshold,
            line_tolerance: self.line_tolerance,
            crossing_debounce_seconds: self.crossing_debounce,
            ..Settings::default()
        })?;
        Ok(settings.validate()?)
    }
}

impl ZoneArgs {
    fn settings(&self) -> Result<Settings, Box<dyn std::error::Error>> {
        let settings = self.common.apply(Settings {
            zone_config_path: self.zones.clone(),
            zone_model_path: self.model.clone(),
            activation_threshold: self.threshold,
            cooldown_seconds: self.cooldown,
            face_model_path: self.face_model.clone(),
            face_model_url: self.face_model_url.clone(),
            min_face_size: self.min_face_size,
            ..Settings::default()
        })?;
        Ok(settings.validate()?)
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let summary = match cli.command {
        Command::Line(args) => run_line(&args.settings()?)?,
        Command::Zone(args) => run_zone(&args.settings()?)?,
    };

    log::info!(
        "Done: {} frames, {} incidents",
        summary.frames,
        summary.incidents
    );
    Ok(())
}

fn run_line(settings: &Settings) -> Result<RunSummary, Box<dyn std::error::Error>> {
    log::info!("DATA_DIR={}", settings.data_dir.display());
    std::fs::create_dir_all(&settings.data_dir)?;

    let publisher = build_publisher(settings)?;
    let thumbnails = ThumbnailWriter::new(Box::new(ImageFileWriter::new()), &settings.thumbs_dir())?;
    let crossing = LineCrossingDetector::new(
        settings.line_y,
        settings.line_tolerance,
        settings.area_threshold,
    )
    .with_debounce(settings.crossing_debounce_seconds);
    let cancelled = install_stop_handler()?;

    let mut runner = LineRunner::new(
        open_capture(settings),
        Box::new(BackgroundSubtractionDetector::default()),
        crossing,
        settings.no_motion_seconds,
        publisher,
        Box::new(thumbnails),
        Box::new(SystemClock),
        Box::new(StdoutPipelineLogger::default()),
    );
    Ok(runner.run(&cancelled))
}

fn run_zone(settings: &Settings) -> Result<RunSummary, Box<dyn std::error::Error>> {
    log::info!("DATA_DIR={}", settings.data_dir.display());
    std::fs::create_dir_all(&settings.data_dir)?;

    let zones = load_zones(settings.zone_config_path.as_deref())?;
    let scorer = create_scorer(settings.zone_model_path.as_deref());

    if settings.face_model_path.is_none() {
        log::info!("Resolving model: {FACE_MODEL_NAME}");
    }
    let model_path = model_resolver::resolve_face_model(
        settings.face_model_path.as_deref(),
        settings.face_model_url.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    let detector =
        OnnxBlazefaceDetector::new(&model_path, DEFAULT_CONFIDENCE, settings.min_face_size)?;
    let face_capture = FaceCropCapture::new(
        Box::new(detector),
        Box::new(ImageFileWriter::new()),
        Box::new(SystemClock),
        &settings.faces_dir(),
    )?;

    let publisher = build_publisher(settings)?;
    let cancelled = install_stop_handler()?;

    let mut runner = ZoneRunner::new(
        open_capture(settings),
        zones,
        scorer,
        ZoneActivationTracker::new(settings.activation_threshold, settings.cooldown_seconds),
        Box::new(face_capture),
        publisher,
        Box::new(SystemClock),
        Box::new(StdoutPipelineLogger::default()),
    );
    Ok(runner.run(&cancelled))
}

fn open_capture(settings: &Settings) -> CaptureSource {
    let options = settings
        .capture_options
        .as_deref()
        .map(CaptureOptions::parse)
        .unwrap_or_default();
    let spec = SourceSpec::parse(&settings.source);
    if spec.is_stream() {
        log::info!("Capture options: {:?}", options.stream_options());
    }
    CaptureSource::open(
        Box::new(FfmpegReader::new(options)),
        spec,
        RetryPolicy::default(),
    )
}

fn build_publisher(
    settings: &Settings,
) -> Result<Box<dyn IncidentPublisher>, Box<dyn std::error::Error>> {
    let base: Box<dyn IncidentPublisher> = match &settings.api_url {
        Some(url) => {
            log::info!("Publishing incidents to {url}");
            Box::new(HttpIncidentPublisher::new(url.as_str(), settings.publish_timeout)?)
        }
        None => {
            let path = settings.incidents_path();
            log::info!("Writing incidents to {}", path.display());
            Box::new(JsonlIncidentSink::new(&path)?)
        }
    };

    if settings.publish_queue_capacity > 0 {
        Ok(Box::new(QueuedIncidentPublisher::new(
            base,
            settings.publish_queue_capacity,
        )?))
    } else {
        Ok(base)
    }
}

/// Sets the returned flag on Ctrl-C so the runner stops between frames.
fn install_stop_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || {
        log::info!("Stop signal received.");
        flag.store(true, Ordering::Relaxed);
    })?;
    Ok(cancelled)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}

mod chart;
mod style;

use chart::SpeedTrace;
use data::annotate::{self, CornerMarker};
use data::config::Config;
use data::resample::ResampledPair;
use data::series::SeriesStore;
use data::theme;
use telemetry::Session;

use iced::widget::{center, container, text};
use iced::{Element, Task, Theme};

fn main() -> iced::Result {
    setup_logger();

    iced::application(SpeedTraceApp::boot, SpeedTraceApp::update, SpeedTraceApp::view)
        .title("Speed Trace")
        .theme(SpeedTraceApp::theme)
        .antialiasing(true)
        .run()
}

fn setup_logger() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(log::LevelFilter::Info);

    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply();

    if let Err(err) = result {
        eprintln!("failed to initialize logging: {err}");
    }
}

#[derive(Debug, Clone)]
enum Message {
    Loaded(Box<Result<Trace, LoadError>>),
}

#[derive(thiserror::Error, Debug, Clone)]
enum LoadError {
    #[error("Failed to load session telemetry: {0}")]
    Session(String),
    #[error("Failed to prepare the chart: {0}")]
    Setup(String),
}

/// Everything the chart needs, computed once at startup.
#[derive(Debug, Clone)]
struct Trace {
    store: SeriesStore,
    markers: Vec<CornerMarker>,
    track_length: f32,
}

enum SpeedTraceApp {
    Loading,
    Ready(Trace),
    Failed(LoadError),
}

impl SpeedTraceApp {
    fn boot() -> (Self, Task<Message>) {
        let task = Task::perform(async { load_trace() }, |result| {
            Message::Loaded(Box::new(result))
        });
        (Self::Loading, task)
    }

    fn update(&mut self, message: Message) {
        match message {
            Message::Loaded(result) => match *result {
                Ok(trace) => {
                    *self = Self::Ready(trace);
                }
                Err(err) => {
                    log::error!("{err}");
                    *self = Self::Failed(err);
                }
            },
        }
    }

    fn view(&self) -> Element<'_, Message> {
        match self {
            Self::Loading => center(text("Loading session telemetry...").size(16)).into(),
            Self::Failed(err) => center(text(err.to_string()).size(16)).into(),
            Self::Ready(trace) => container(SpeedTrace::new(
                trace.store.all(),
                &trace.markers,
                trace.track_length,
            ))
            .padding(8)
            .into(),
        }
    }

    fn theme(&self) -> Theme {
        theme::app_theme()
    }
}

fn load_trace() -> Result<Trace, LoadError> {
    let config = Config::load_or_default();

    let path = config.telemetry_path();
    let session = Session::from_path(&path).map_err(|err| LoadError::Session(err.to_string()))?;
    if session.year != config.year
        || session.grand_prix != config.grand_prix
        || session.session != config.session
    {
        log::warn!(
            "session file is {} {} {}, config asked for {}",
            session.year,
            session.grand_prix,
            session.session,
            config.session_label(),
        );
    }

    let store = SeriesStore::load(&session, &config.drivers, &config.colors)
        .map_err(|err| LoadError::Session(err.to_string()))?;

    // The pointwise diff is only defined for a compared pair; with more
    // drivers the chart falls back to a static overlay.
    if let Some((a, b)) = store.pair() {
        let pair = ResampledPair::build(a, b, config.grid_size)
            .map_err(|err| LoadError::Setup(err.to_string()))?;
        if let Some((distance, delta)) = pair.max_delta() {
            log::info!(
                "largest speed difference {} vs {}: {:.1} km/h at {:.0} m",
                a.driver(),
                b.driver(),
                delta,
                distance,
            );
        }
    } else {
        log::info!(
            "{} drivers selected, rendering static overlay without diff readout",
            config.drivers.len(),
        );
    }

    let range = store
        .speed_range()
        .ok_or_else(|| LoadError::Setup("no telemetry samples in the selected laps".to_string()))?;
    let markers = annotate::compute_markers(&session.circuit.corners, range, config.marker_pad);

    Ok(Trace {
        track_length: store.track_length(),
        markers,
        store,
    })
}

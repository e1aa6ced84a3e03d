use eframe::egui::{self, RichText};
use egui::{CornerRadius, Frame};
use log::warn;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::ViewerConfig;
use crate::error::IngestError;
use crate::ingest::ChunkedIngest;
use crate::model::ResultDocument;
use crate::session::{Session, Status};
use crate::source::{self, ACCEPTED_EXTENSION, DataSource};
use crate::table::DataTable;

/// Bytes are read and decoded off the UI thread; the result arrives here.
struct PendingLoad {
    generation: u64,
    receiver: mpsc::Receiver<Result<ResultDocument, IngestError>>,
}

/// Rows are materialized on the UI thread, one chunk per frame.
struct ChunkJob {
    generation: u64,
    ingest: ChunkedIngest,
}

pub struct SparqlViewer {
    config: ViewerConfig,
    session: Session,
    table: DataTable,

    loader: Option<PendingLoad>,
    chunks: Option<ChunkJob>,
    last_source: Option<DataSource>,
    loaded_name: Option<String>,
    pending_name: Option<String>,

    dark_mode: bool,
    show_message: Option<(String, f32)>,
    message_timer: Option<f64>,
    render_duration: Duration,
}

impl SparqlViewer {
    pub fn new(config: ViewerConfig) -> Self {
        let table = DataTable::new(config.table_height, config.overscan);
        let mut viewer = Self {
            config,
            session: Session::new(),
            table,
            loader: None,
            chunks: None,
            last_source: None,
            loaded_name: None,
            pending_name: None,
            dark_mode: true,
            show_message: None,
            message_timer: None,
            render_duration: Duration::ZERO,
        };

        match viewer.config.startup_file.clone() {
            Some(path) => viewer.open_file(path),
            None => viewer.load_default(),
        }
        viewer
    }

    pub fn open_file(&mut self, path: PathBuf) {
        self.start_ingestion(DataSource::File(path));
    }

    /// Fetches the default dataset unless data from a custom file is shown.
    pub fn load_default(&mut self) {
        if !self.session.should_load_default() {
            return;
        }
        self.start_ingestion(self.config.default_source());
    }

    fn start_ingestion(&mut self, source: DataSource) {
        let generation = self.session.begin(source.origin());
        self.pending_name = Some(source.display_name());
        self.last_source = Some(source.clone());
        // Anything still in flight belongs to an older generation.
        self.chunks = None;

        let (sender, receiver) = mpsc::channel();
        self.loader = Some(PendingLoad {
            generation,
            receiver,
        });

        thread::spawn(move || {
            let _ = sender.send(source.load());
        });
    }

    fn poll_loader(&mut self) {
        let Some(pending) = &self.loader else {
            return;
        };
        let generation = pending.generation;
        let result = match pending.receiver.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => Err(IngestError::Read(
                "loader stopped before delivering data".to_string(),
            )),
        };
        self.loader = None;

        match result {
            Ok(document) => {
                if self.session.decoded(generation) {
                    self.chunks = Some(ChunkJob {
                        generation,
                        ingest: ChunkedIngest::new(document, self.config.chunk_size),
                    });
                }
            }
            Err(e) => {
                self.session.fail(generation, &e);
            }
        }
    }

    /// Runs one chunk, then hands the frame back to egui.
    fn step_chunks(&mut self) {
        let Some(job) = &mut self.chunks else {
            return;
        };
        if let Some(progress) = job.ingest.step() {
            self.session.progress(job.generation, progress);
        }
        if !job.ingest.is_finished() {
            return;
        }

        let Some(job) = self.chunks.take() else {
            return;
        };
        match job.ingest.into_document() {
            Some(document) => {
                if self.session.complete(job.generation, document) {
                    self.loaded_name = self.pending_name.take();
                }
            }
            None => {
                self.session.fail(
                    job.generation,
                    &IngestError::Parse("chunk processing stopped early".to_string()),
                );
            }
        }
    }

    fn flash(&mut self, message: impl Into<String>, seconds: f32) {
        self.show_message = Some((message.into(), seconds));
        self.message_timer = None;
    }

    fn accept_file(&mut self, path: PathBuf) {
        if self.session.is_busy() {
            self.flash("Still processing the previous file.", 3.0);
            return;
        }
        if !source::has_accepted_extension(&path) {
            warn!("Rejected {}: not a .{} file", path.display(), ACCEPTED_EXTENSION);
            self.flash("Please upload a .gz file", 3.0);
            return;
        }
        self.open_file(path);
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.len() > 1 {
            warn!("{} files dropped, only the first is opened", dropped.len());
        }
        if let Some(path) = dropped.into_iter().next().and_then(|f| f.path) {
            self.accept_file(path);
        }
    }

    fn render_toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            let open = ui
                .add_enabled(!self.session.is_busy(), egui::Button::new("📂 Open"))
                .on_hover_text("Open a .gz file containing SPARQL JSON results");
            if open.clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Gzipped SPARQL JSON", &[ACCEPTED_EXTENSION])
                    .pick_file()
                {
                    self.accept_file(path);
                }
            }

            match (&self.loaded_name, self.session.origin()) {
                (Some(name), Some(origin)) => {
                    ui.label(format!("{} ({})", name, origin.describe()));
                }
                _ => {
                    ui.label("No data loaded.");
                }
            }

            ui.separator();

            if ui
                .button(if self.dark_mode { "☀️" } else { "🌙" })
                .on_hover_text("Toggle light/dark mode")
                .clicked()
            {
                self.dark_mode = !self.dark_mode;
                ctx.set_visuals(if self.dark_mode {
                    egui::Visuals::dark()
                } else {
                    egui::Visuals::light()
                });
            }
        });

        let status = self.session.status();
        if matches!(status.status, Status::Uploading | Status::Processing | Status::Success) {
            ui.add(
                egui::ProgressBar::new(status.progress as f32 / 100.0).desired_height(8.0),
            );
            ui.label(RichText::new(&status.message).small());
        }
    }

    fn render_error_banner(&mut self, ui: &mut egui::Ui) {
        if self.session.status().status != Status::Error {
            return;
        }

        let (fill, text) = if self.dark_mode {
            (egui::Color32::from_rgb(70, 24, 24), egui::Color32::from_rgb(255, 170, 170))
        } else {
            (egui::Color32::from_rgb(254, 242, 242), egui::Color32::from_rgb(185, 28, 28))
        };
        let retry_custom = matches!(self.last_source, Some(DataSource::File(_)));

        let mut retry = false;
        Frame::NONE
            .fill(fill)
            .inner_margin(egui::Margin::same(12))
            .corner_radius(CornerRadius::same(6))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(format!("⚠ {}", self.session.status().message)).color(text));
                ui.add_space(4.0);
                let label = if retry_custom {
                    "Retry"
                } else {
                    "Retry Loading Default Data"
                };
                retry = ui.button(label).clicked();
            });
        ui.add_space(8.0);

        if retry {
            match self.last_source.clone() {
                Some(source @ DataSource::File(_)) => self.start_ingestion(source),
                _ => self.load_default(),
            }
        }
    }

    fn render_status_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let total = self.session.view.total_rows();
            if self.session.document().is_some() {
                ui.label(format!("Rows: {}", total));
                ui.separator();
                ui.label(format!("Matches: {}", self.session.view.visible_rows().len()));
                let window = self.table.visible_window();
                if !window.is_empty() {
                    ui.separator();
                    ui.label(format!("Visible: {} - {}", window.start + 1, window.end));
                }
            } else {
                ui.label("No data loaded");
            }

            ui.separator();
            ui.label(format!(
                "Render: {:.1} ms",
                self.render_duration.as_secs_f32() * 1000.0
            ));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some((message, duration)) = &self.show_message {
                    let now = ctx.input(|i| i.time);
                    let start_time = self.message_timer.get_or_insert(now);

                    if now - *start_time < *duration as f64 {
                        ui.label(message);
                    } else {
                        self.show_message = None;
                        self.message_timer = None;
                    }
                }
            });
        });
    }
}

impl eframe::App for SparqlViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let render_start = Instant::now();

        self.handle_dropped_files(ctx);
        self.poll_loader();
        self.step_chunks();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ctx, ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ctx, ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_error_banner(ui);

            let processing = self.session.status().status == Status::Processing;
            if self.session.document().is_some() || processing {
                self.table.show(ui, &mut self.session.view);
            } else if self.loader.is_some() {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.spinner();
                        ui.heading("Loading...");
                    });
                });
            } else {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("SPARQL Viewer");
                        ui.label("Searchable, sortable SPARQL JSON results");
                        ui.add_space(20.0);
                        ui.label("Click 'Open' or drag & drop a .gz file.");
                    });
                });
            }
        });

        self.render_duration = render_start.elapsed();

        if self.loader.is_some() || self.chunks.is_some() || self.show_message.is_some() {
            ctx.request_repaint();
        }
    }
}

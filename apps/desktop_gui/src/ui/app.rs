//! Application shell for the steganography upload UI.
//!
//! One window, two panels: encode (stage a cover file, type a message, get
//! the encoded artifact back) and decode (stage a stego file, read the
//! extracted message). All network work happens on the backend worker
//! thread; the UI only stages input and reflects `UiEvent`s.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use eframe::egui;
use serde::{Deserialize, Serialize};

use client_core::{EncodedArtifact, StegoApi, StegoClient};
use shared::domain::StagedFile;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

pub const SETTINGS_STORAGE_KEY: &str = "stegodrop.settings";

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
const DROP_ZONE_HEIGHT: f32 = 96.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    fn toggle_label(self) -> &'static str {
        match self {
            ThemeMode::Dark => "Switch to light mode",
            ThemeMode::Light => "Switch to dark mode",
        }
    }
}

fn visuals_for_theme(theme: ThemeMode) -> egui::Visuals {
    match theme {
        ThemeMode::Dark => egui::Visuals::dark(),
        ThemeMode::Light => egui::Visuals::light(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    pub theme: ThemeMode,
    pub server_url: String,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Dark,
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

pub struct StegoDropApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    theme: ThemeMode,
    applied_theme: Option<ThemeMode>,
    server_url: String,

    encode_file: Option<StagedFile>,
    encode_message: String,
    encode_password: String,
    encode_in_flight: bool,
    encoded_artifact: Option<EncodedArtifact>,

    decode_file: Option<StagedFile>,
    decode_password: String,
    decode_in_flight: bool,
    decoded_message: Option<String>,

    drop_hover: bool,
    alert: Option<String>,
    status: String,
}

impl StegoDropApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted: Option<PersistedSettings>,
    ) -> Self {
        let settings = persisted.unwrap_or_default();
        Self {
            cmd_tx,
            ui_rx,
            theme: settings.theme,
            applied_theme: None,
            server_url: settings.server_url,
            encode_file: None,
            encode_message: String::new(),
            encode_password: String::new(),
            encode_in_flight: false,
            encoded_artifact: None,
            decode_file: None,
            decode_password: String::new(),
            decode_in_flight: false,
            decoded_message: None,
            drop_hover: false,
            alert: None,
            status: String::new(),
        }
    }

    fn persisted_settings(&self) -> PersistedSettings {
        PersistedSettings {
            theme: self.theme,
            server_url: self.server_url.clone(),
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        if self.applied_theme == Some(self.theme) {
            return;
        }
        ctx.set_visuals(visuals_for_theme(self.theme));
        self.applied_theme = Some(self.theme);
    }

    fn drain_ui_events(&mut self) {
        loop {
            match self.ui_rx.try_recv() {
                Ok(UiEvent::Info(text)) => self.status = text,
                Ok(UiEvent::EncodeFinished(artifact)) => {
                    self.encode_in_flight = false;
                    self.status = format!(
                        "Encoded {} ({})",
                        artifact.filename,
                        human_readable_bytes(artifact.bytes.len() as u64)
                    );
                    self.encoded_artifact = Some(artifact);
                }
                Ok(UiEvent::DecodeFinished { message }) => {
                    self.decode_in_flight = false;
                    self.status = "Decoded hidden message".to_string();
                    self.decoded_message = Some(message);
                }
                Ok(UiEvent::Error(error)) => {
                    match error.context() {
                        UiErrorContext::Encode => self.encode_in_flight = false,
                        UiErrorContext::Decode => self.decode_in_flight = false,
                        UiErrorContext::BackendStartup => {}
                    }
                    self.raise_alert(error);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn raise_alert(&mut self, error: UiError) {
        tracing::warn!(detail = error.detail(), "operation failed");
        self.alert = Some(error.alert_text().to_string());
    }

    /// Routes window-level file drops into the encode staging slot, mirroring
    /// the drop zone's pairing with the encode input. First dropped file wins.
    fn handle_file_drops(&mut self, ctx: &egui::Context) {
        self.drop_hover = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(file) = dropped.into_iter().next() {
            match staged_file_from_drop(file) {
                Ok(staged) => self.stage_encode_file(staged),
                Err(reason) => {
                    tracing::warn!(reason = %reason, "ignoring dropped file");
                    self.status = reason;
                }
            }
        }
    }

    fn stage_encode_file(&mut self, staged: StagedFile) {
        self.status = format!("Staged {}", staged_summary(&staged));
        self.encoded_artifact = None;
        self.encode_file = Some(staged);
    }

    fn stage_decode_file(&mut self, staged: StagedFile) {
        self.status = format!("Staged {}", staged_summary(&staged));
        self.decoded_message = None;
        self.decode_file = Some(staged);
    }

    fn submit_encode(&mut self) {
        let Some(file) = self.encode_file.clone() else {
            self.raise_alert(UiError::from_detail(
                UiErrorContext::Encode,
                "no file is staged for upload",
            ));
            return;
        };
        if self.encode_message.trim().is_empty() {
            self.raise_alert(UiError::from_detail(
                UiErrorContext::Encode,
                "message to hide must not be empty",
            ));
            return;
        }
        self.encoded_artifact = None;
        self.encode_in_flight = true;
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Encode {
                server_url: self.server_url.clone(),
                file,
                message: self.encode_message.clone(),
                password: non_empty(&self.encode_password),
            },
            &mut self.status,
        );
    }

    fn submit_decode(&mut self) {
        let Some(file) = self.decode_file.clone() else {
            self.raise_alert(UiError::from_detail(
                UiErrorContext::Decode,
                "no file is staged for upload",
            ));
            return;
        };
        self.decoded_message = None;
        self.decode_in_flight = true;
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Decode {
                server_url: self.server_url.clone(),
                file,
                password: non_empty(&self.decode_password),
            },
            &mut self.status,
        );
    }

    fn save_encoded_artifact(&mut self) {
        let Some(artifact) = self.encoded_artifact.clone() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&artifact.filename)
            .save_file()
        else {
            return;
        };
        match std::fs::write(&path, &artifact.bytes) {
            Ok(()) => self.status = format!("Saved {}", path.display()),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to save artifact");
                self.status = format!("Could not save {}: {err}", path.display());
            }
        }
    }

    fn show_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("StegoDrop");
            ui.separator();
            ui.label("Server:");
            ui.add(
                egui::TextEdit::singleline(&mut self.server_url)
                    .desired_width(220.0)
                    .hint_text(DEFAULT_SERVER_URL),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(self.theme.toggle_label()).clicked() {
                    self.theme = self.theme.toggled();
                }
            });
        });
    }

    fn show_drop_zone(&mut self, ui: &mut egui::Ui) {
        let desired = egui::vec2(ui.available_width(), DROP_ZONE_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(desired, egui::Sense::click());
        let stroke = if self.drop_hover {
            egui::Stroke::new(2.0, ui.visuals().selection.bg_fill)
        } else {
            egui::Stroke::new(1.0, ui.visuals().widgets.inactive.bg_stroke.color)
        };
        ui.painter().rect(
            rect,
            egui::CornerRadius::same(8),
            ui.visuals().extreme_bg_color,
            stroke,
            egui::StrokeKind::Inside,
        );
        let hint = if self.drop_hover {
            "Release to stage the file".to_string()
        } else {
            match &self.encode_file {
                Some(file) => staged_summary(file),
                None => "Drop a cover file here, or click to browse".to_string(),
            }
        };
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            hint,
            egui::TextStyle::Body.resolve(ui.style()),
            ui.visuals().text_color(),
        );

        if response.clicked() {
            if let Some(path) = rfd::FileDialog::new().pick_file() {
                match StagedFile::from_path(&path) {
                    Ok(staged) => self.stage_encode_file(staged),
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "failed to read file");
                        self.status = format!("Could not read {}: {err}", path.display());
                    }
                }
            }
        }
    }

    fn show_encode_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Hide a message");
        ui.add_space(6.0);
        self.show_drop_zone(ui);
        ui.add_space(6.0);

        ui.label("Message:");
        ui.add(
            egui::TextEdit::multiline(&mut self.encode_message)
                .desired_rows(3)
                .desired_width(f32::INFINITY)
                .hint_text("Text to hide inside the cover file"),
        );
        ui.horizontal(|ui| {
            ui.label("Password (optional):");
            ui.add(egui::TextEdit::singleline(&mut self.encode_password).password(true));
        });
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            let ready = self.encode_file.is_some() && !self.encode_in_flight;
            if ui.add_enabled(ready, egui::Button::new("Encode")).clicked() {
                self.submit_encode();
            }
            if self.encode_in_flight {
                ui.add(egui::Spinner::new());
                ui.label("Encoding…");
            }
        });

        if self.encoded_artifact.is_some() {
            ui.add_space(6.0);
            let label = self
                .encoded_artifact
                .as_ref()
                .map(|artifact| {
                    format!(
                        "{} ({})",
                        artifact.filename,
                        human_readable_bytes(artifact.bytes.len() as u64)
                    )
                })
                .unwrap_or_default();
            ui.label(format!("Encoded file ready: {label}"));
            if ui.button("Save encoded file…").clicked() {
                self.save_encoded_artifact();
            }
        }
    }

    fn show_decode_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Reveal a message");
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            if ui.button("Choose stego file…").clicked() {
                if let Some(path) = rfd::FileDialog::new().pick_file() {
                    match StagedFile::from_path(&path) {
                        Ok(staged) => self.stage_decode_file(staged),
                        Err(err) => {
                            tracing::warn!(path = %path.display(), error = %err, "failed to read file");
                            self.status = format!("Could not read {}: {err}", path.display());
                        }
                    }
                }
            }
            if let Some(file) = &self.decode_file {
                ui.label(staged_summary(file));
            }
        });
        ui.horizontal(|ui| {
            ui.label("Password (optional):");
            ui.add(egui::TextEdit::singleline(&mut self.decode_password).password(true));
        });
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            let ready = self.decode_file.is_some() && !self.decode_in_flight;
            if ui.add_enabled(ready, egui::Button::new("Decode")).clicked() {
                self.submit_decode();
            }
            if self.decode_in_flight {
                ui.add(egui::Spinner::new());
                ui.label("Decoding…");
            }
        });

        if let Some(message) = &self.decoded_message {
            ui.add_space(6.0);
            ui.label("Hidden message:");
            ui.add(egui::Label::new(message.clone()).selectable(true));
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(text) = self.alert.clone() else {
            return;
        };
        egui::Window::new("Alert")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(text);
                ui.add_space(4.0);
                if ui.button("OK").clicked() {
                    self.alert = None;
                }
            });
    }
}

impl eframe::App for StegoDropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme(ctx);
        self.drain_ui_events();
        self.handle_file_drops(ctx);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| self.show_top_bar(ui));
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(&self.status);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                self.show_encode_panel(&mut columns[0]);
                self.show_decode_panel(&mut columns[1]);
            });
        });
        self.show_alert(ctx);

        if self.encode_in_flight || self.decode_in_flight {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(text) = serde_json::to_string(&self.persisted_settings()) {
            storage.set_string(SETTINGS_STORAGE_KEY, text);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn staged_file_from_drop(file: egui::DroppedFile) -> Result<StagedFile, String> {
    if let Some(path) = file.path.as_ref() {
        return StagedFile::from_path(path)
            .map_err(|err| format!("Could not read {}: {err}", path.display()));
    }
    if let Some(bytes) = file.bytes.as_ref() {
        let mime = if file.mime.is_empty() {
            None
        } else {
            Some(file.mime.clone())
        };
        return Ok(StagedFile::new(file.name.clone(), mime, bytes.to_vec()));
    }
    Err(format!("Dropped file {} carried no data", file.name))
}

fn staged_summary(file: &StagedFile) -> String {
    let kind = file
        .format()
        .map(|format| format.label())
        .unwrap_or("unknown format");
    format!(
        "{} — {kind}, {}",
        file.filename,
        human_readable_bytes(file.size_bytes())
    )
}

fn human_readable_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else if (value - value.trunc()).abs() < f64::EPSILON {
        format!("{} {}", value as u64, UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

pub fn start_backend_bridge(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_detail(
                    UiErrorContext::BackendStartup,
                    format!("failed to build upload runtime: {err}"),
                )));
                tracing::error!("failed to build upload runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Upload worker ready".to_string()));
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Encode {
                        server_url,
                        file,
                        message,
                        password,
                    } => {
                        let event = match StegoClient::new(&server_url) {
                            Ok(client) => {
                                run_encode(&client, &file, &message, password.as_deref()).await
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "encode request failed");
                                UiEvent::Error(UiError::from_detail(
                                    UiErrorContext::Encode,
                                    err.to_string(),
                                ))
                            }
                        };
                        // Exactly one result event exists per in-flight
                        // operation; block rather than drop it.
                        let _ = ui_tx.send(event);
                    }
                    BackendCommand::Decode {
                        server_url,
                        file,
                        password,
                    } => {
                        let event = match StegoClient::new(&server_url) {
                            Ok(client) => run_decode(&client, &file, password.as_deref()).await,
                            Err(err) => {
                                tracing::warn!(error = %err, "decode request failed");
                                UiEvent::Error(UiError::from_detail(
                                    UiErrorContext::Decode,
                                    err.to_string(),
                                ))
                            }
                        };
                        let _ = ui_tx.send(event);
                    }
                }
            }
        });
    });
}

async fn run_encode(
    api: &dyn StegoApi,
    file: &StagedFile,
    message: &str,
    password: Option<&str>,
) -> UiEvent {
    match api.encode_message(file, message, password).await {
        Ok(artifact) => UiEvent::EncodeFinished(artifact),
        Err(err) => {
            tracing::warn!(error = %err, "encode request failed");
            UiEvent::Error(UiError::from_detail(UiErrorContext::Encode, err.to_string()))
        }
    }
}

async fn run_decode(api: &dyn StegoApi, file: &StagedFile, password: Option<&str>) -> UiEvent {
    match api.decode_message(file, password).await {
        Ok(message) => UiEvent::DecodeFinished { message },
        Err(err) => {
            tracing::warn!(error = %err, "decode request failed");
            UiEvent::Error(UiError::from_detail(UiErrorContext::Decode, err.to_string()))
        }
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Top-level egui application shell for the stamp collection.
//! Handles layout, input collection, and wiring to background workers.

pub mod components;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;
use tracing::{debug, error};

use crate::logic::clipboard::ClipboardBackend;
use crate::logic::ingest::IncomingFile;
use crate::mvu::{self, AppModel, Command, Msg};
use crate::ui::components::grid::GridMsg;
use crate::ui::components::{confirm_modal, grid, toast, upload_area};
use crate::utils::stamp_count;

/// Repaint cadence while timed feedback is visible.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Stateful egui application for collecting and copying stamps.
pub struct ClipStampApp {
    model: AppModel,
    inbox: VecDeque<Msg>,
    cmd_tx: crossbeam_channel::Sender<Command>,
    msg_rx: crossbeam_channel::Receiver<Msg>,
    /// Store revision last seen by the view.
    seen_revision: u64,
}

impl ClipStampApp {
    /// Start `workers` command threads sharing `clipboard`, and wrap `model`.
    pub fn new(
        ctx: &egui::Context,
        model: AppModel,
        workers: usize,
        clipboard: Arc<dyn ClipboardBackend>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Msg>();

        for index in 0..workers.max(1) {
            let cmd_rx = cmd_rx.clone();
            let msg_tx = msg_tx.clone();
            let clipboard = Arc::clone(&clipboard);
            let ctx = ctx.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("worker-{index}"))
                .spawn(move || {
                    for cmd in cmd_rx.iter() {
                        let msg = mvu::run_command(cmd, clipboard.as_ref());
                        if msg_tx.send(msg).is_err() {
                            break;
                        }
                        ctx.request_repaint();
                    }
                });
            if let Err(err) = spawned {
                error!(error = %err, "Failed to start worker thread");
            }
        }
        debug!(workers, "Worker pool started");

        Self {
            seen_revision: model.store.revision(),
            model,
            inbox: VecDeque::new(),
            cmd_tx,
            msg_rx,
        }
    }
}

impl eframe::App for ClipStampApp {
    /// Drives a single frame: collect input, drain worker results, apply
    /// messages in arrival order, then render panels and overlays.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_spacing(ctx);
        self.collect_input(ctx);

        // Pull messages produced by the command workers.
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.model.pending_commands = self.model.pending_commands.saturating_sub(1);
            self.inbox.push_back(msg);
        }
        if self.model.needs_tick() {
            self.inbox.push_back(Msg::Tick(Instant::now()));
        }

        self.process_inbox(ctx);
        self.observe_revision();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading(format!("{} ClipStamp", egui_phosphor::regular::STAMP));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(2.0);
                    egui::widgets::global_theme_preference_switch(ui);
                    if self.model.pending_commands > 0 {
                        ui.separator();
                        ui.add(egui::Spinner::new().size(14.0)).on_hover_text(format!(
                            "{} task(s) running in background",
                            self.model.pending_commands
                        ));
                    }
                });
            });
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            egui::ScrollArea::vertical().show(ui, |ui| {
                let upload_msgs = upload_area::view(ui, self.model.files_hovering);
                self.inbox
                    .extend(upload_msgs.into_iter().map(Msg::Upload));
                ui.add_space(16.0);

                self.render_collection(ui);
                ui.add_space(8.0);
            });
        });

        self.render_drop_overlay(ctx);

        let confirm_msgs = confirm_modal::view(ctx, &self.model.confirm);
        self.inbox
            .extend(confirm_msgs.into_iter().map(Msg::Confirm));

        let toast_msgs = toast::view(ctx, &self.model.toast);
        self.inbox.extend(toast_msgs.into_iter().map(Msg::Toast));

        if !self.inbox.is_empty() {
            ctx.request_repaint();
        } else if self.model.needs_tick() {
            ctx.request_repaint_after(TICK_INTERVAL);
        }
    }
}

impl ClipStampApp {
    fn ensure_spacing(&self, ctx: &egui::Context) {
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        });
    }

    /// Translate raw window input (file drops, hover, paste shortcut) into messages.
    fn collect_input(&mut self, ctx: &egui::Context) {
        let (dropped, hovering, paste) = ctx.input(|i| {
            (
                i.raw.dropped_files.clone(),
                !i.raw.hovered_files.is_empty(),
                paste_shortcut_released(&i.events),
            )
        });

        if !dropped.is_empty() {
            let files = dropped.iter().filter_map(IncomingFile::from_dropped).collect();
            self.inbox.push_back(Msg::FilesDropped(files));
        } else if hovering != self.model.files_hovering {
            self.inbox.push_back(Msg::FilesHovering(hovering));
        }

        // The modal owns the keyboard while open.
        if paste && !self.model.confirm.is_open() {
            self.inbox.push_back(Msg::PasteRequested);
        }
    }

    /// Apply queued messages in arrival order, dispatching resulting commands.
    fn process_inbox(&mut self, ctx: &egui::Context) {
        while let Some(msg) = self.inbox.pop_front() {
            let msg = match msg {
                Msg::ThumbnailDecoded { id, image } => {
                    if self.model.store.get(&id).is_none() {
                        continue;
                    }
                    let texture = ctx.load_texture(
                        format!("stamp-{id}"),
                        image,
                        egui::TextureOptions::LINEAR,
                    );
                    Msg::Grid(GridMsg::ThumbnailReady { id, texture })
                }
                other => other,
            };

            let mut commands = Vec::new();
            mvu::update(&mut self.model, msg, &mut commands);
            for cmd in commands {
                if self.cmd_tx.send(cmd).is_ok() {
                    self.model.pending_commands += 1;
                }
            }
        }
    }

    fn observe_revision(&mut self) {
        let revision = self.model.store.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            debug!(revision, count = self.model.store.len(), "Collection changed");
        }
    }

    /// Header with the saved-stamp count followed by the grid, or a loading state.
    fn render_collection(&mut self, ui: &mut egui::Ui) {
        if !self.model.store.is_loaded() {
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Loading…");
            });
            return;
        }

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Saved stamps").strong().size(16.0));
            ui.label(
                egui::RichText::new(format!("({})", self.model.store.len()))
                    .color(egui::Color32::from_gray(130)),
            );
        });
        ui.label(
            egui::RichText::new("Click a stamp to copy it. Drag to reorder.")
                .small()
                .color(egui::Color32::from_gray(110)),
        );
        ui.add_space(6.0);

        let grid_msgs = grid::view(ui, &self.model.grid, self.model.store.images());
        self.inbox.extend(grid_msgs.into_iter().map(Msg::Grid));
    }

    /// Dim the window while files are dragged over it.
    fn render_drop_overlay(&self, ctx: &egui::Context) {
        if !self.model.files_hovering {
            return;
        }
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("drop_overlay"),
        ));
        let screen = ctx.content_rect();
        painter.rect_filled(screen, 0.0, egui::Color32::from_black_alpha(160));
        painter.text(
            screen.center(),
            egui::Align2::CENTER_CENTER,
            format!("{} Drop images to add them", egui_phosphor::regular::DOWNLOAD_SIMPLE),
            egui::FontId::proportional(22.0),
            egui::Color32::WHITE,
        );
    }

    /// Stamp count and storage location.
    fn render_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let count = if self.model.store.is_loaded() {
                stamp_count(self.model.store.len())
            } else {
                "Loading…".to_string()
            };
            ui.label(egui::RichText::new(count).color(egui::Color32::from_gray(110)));
            ui.separator();
            ui.label(
                egui::RichText::new(self.model.store.location())
                    .small()
                    .color(egui::Color32::from_gray(110)),
            )
            .on_hover_text("Where your stamps are saved");
        });
    }
}

/// Whether Ctrl/Cmd+V was released this frame.
///
/// egui-winit swallows the press (and only reports `Event::Paste` for text
/// content), so the release is the one event that arrives for image-only
/// clipboards too.
fn paste_shortcut_released(events: &[egui::Event]) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            egui::Event::Key {
                key: egui::Key::V,
                pressed: false,
                modifiers,
                ..
            } if modifiers.command
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::clipboard::tests::RecordingClipboard;
    use crate::ui::components::confirm_modal::ConfirmMsg;

    fn key_v(pressed: bool, modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key: egui::Key::V,
            physical_key: None,
            pressed,
            repeat: false,
            modifiers,
        }
    }

    fn app(ctx: &egui::Context) -> ClipStampApp {
        ClipStampApp::new(
            ctx,
            AppModel::default(),
            1,
            Arc::new(RecordingClipboard::default()),
        )
    }

    fn collect(app: &mut ClipStampApp, ctx: &egui::Context, events: Vec<egui::Event>) {
        let input = egui::RawInput {
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| app.collect_input(ctx));
    }

    fn paste_requests(app: &ClipStampApp) -> usize {
        app.inbox
            .iter()
            .filter(|msg| matches!(msg, Msg::PasteRequested))
            .count()
    }

    #[test]
    fn shortcut_release_requests_paste_for_image_only_clipboard() {
        let ctx = egui::Context::default();
        let mut app = app(&ctx);

        collect(
            &mut app,
            &ctx,
            vec![key_v(false, egui::Modifiers::COMMAND)],
        );

        assert_eq!(paste_requests(&app), 1);
    }

    #[test]
    fn text_paste_event_does_not_paste_twice() {
        let ctx = egui::Context::default();
        let mut app = app(&ctx);

        collect(
            &mut app,
            &ctx,
            vec![
                egui::Event::Paste("some text".into()),
                key_v(false, egui::Modifiers::COMMAND),
            ],
        );

        assert_eq!(paste_requests(&app), 1);
    }

    #[test]
    fn plain_v_and_open_modal_do_not_paste() {
        let ctx = egui::Context::default();
        let mut app = app(&ctx);

        collect(&mut app, &ctx, vec![key_v(false, egui::Modifiers::NONE)]);
        assert_eq!(paste_requests(&app), 0);

        let mut cmds = Vec::new();
        mvu::update(
            &mut app.model,
            Msg::Confirm(ConfirmMsg::Request("stamp".into())),
            &mut cmds,
        );
        collect(
            &mut app,
            &ctx,
            vec![key_v(false, egui::Modifiers::COMMAND)],
        );
        assert_eq!(paste_requests(&app), 0);
    }

    #[test]
    fn shortcut_detection_ignores_press() {
        assert!(!paste_shortcut_released(&[key_v(
            true,
            egui::Modifiers::COMMAND
        )]));
        assert!(paste_shortcut_released(&[key_v(
            false,
            egui::Modifiers::COMMAND
        )]));
    }
}

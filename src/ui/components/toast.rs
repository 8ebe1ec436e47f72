// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Transient toast notification pinned to the bottom of the window.

use std::time::{Duration, Instant};

/// Current toast message and when it was shown.
#[derive(Clone, Debug)]
pub struct ToastModel {
    message: Option<String>,
    shown_at: Option<Instant>,
    lifetime: Duration,
}

impl Default for ToastModel {
    fn default() -> Self {
        Self::with_lifetime(Duration::from_millis(2000))
    }
}

/// Messages accepted by the toast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToastMsg {
    /// Replace any visible toast and restart the timer.
    Show(String),
    /// Hide the toast once its lifetime has elapsed at `now`.
    Tick(Instant),
    Dismiss,
}

impl ToastModel {
    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            message: None,
            shown_at: None,
            lifetime,
        }
    }

    /// Visible message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }
}

/// Apply a message to the toast.
pub fn update(model: &mut ToastModel, msg: ToastMsg) {
    match msg {
        ToastMsg::Show(text) => {
            model.message = Some(text);
            model.shown_at = Some(Instant::now());
        }
        ToastMsg::Tick(now) => {
            let expired = model
                .shown_at
                .is_some_and(|at| now.saturating_duration_since(at) >= model.lifetime);
            if expired {
                model.message = None;
                model.shown_at = None;
            }
        }
        ToastMsg::Dismiss => {
            model.message = None;
            model.shown_at = None;
        }
    }
}

/// Render the toast (when visible); clicking it dismisses it early.
pub fn view(ctx: &egui::Context, model: &ToastModel) -> Vec<ToastMsg> {
    let mut msgs = Vec::new();
    let Some(text) = model.message() else {
        return msgs;
    };

    egui::Area::new(egui::Id::new("toast"))
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -40.0))
        .order(egui::Order::Tooltip)
        .interactable(true)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style())
                .corner_radius(16.0)
                .inner_margin(egui::vec2(18.0, 10.0))
                .show(ui, |ui| {
                    let response = ui
                        .add(egui::Label::new(text).sense(egui::Sense::click()))
                        .on_hover_cursor(egui::CursorIcon::PointingHand);
                    if response.clicked() {
                        msgs.push(ToastMsg::Dismiss);
                    }
                });
        });

    msgs
}

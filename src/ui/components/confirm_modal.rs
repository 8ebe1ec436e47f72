// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Confirmation dialog gating stamp deletion.

/// Pending deletion awaiting the user's answer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfirmModel {
    pending: Option<String>,
}

/// Messages emitted by the confirmation dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmMsg {
    /// Ask before deleting the stamp with this id.
    Request(String),
    Confirm,
    Cancel,
}

impl ConfirmModel {
    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Stamp id waiting for confirmation.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }
}

/// Apply a message. Returns the stamp id once the user confirms.
pub fn update(model: &mut ConfirmModel, msg: ConfirmMsg) -> Option<String> {
    match msg {
        ConfirmMsg::Request(id) => {
            model.pending = Some(id);
            None
        }
        ConfirmMsg::Confirm => model.pending.take(),
        ConfirmMsg::Cancel => {
            model.pending = None;
            None
        }
    }
}

/// Render the modal while a deletion is pending.
pub fn view(ctx: &egui::Context, model: &ConfirmModel) -> Vec<ConfirmMsg> {
    let mut msgs = Vec::new();
    let Some(id) = model.pending() else {
        return msgs;
    };

    let modal = egui::Modal::new(egui::Id::new(("confirm_delete", id))).show(ctx, |ui| {
        ui.set_width(280.0);
        ui.heading("Delete this stamp?");
        ui.add_space(4.0);
        ui.label("The image will be removed from your collection.");
        ui.add_space(12.0);

        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                msgs.push(ConfirmMsg::Cancel);
            }
            let delete = egui::Button::new(
                egui::RichText::new(format!("{} Delete", egui_phosphor::regular::TRASH))
                    .color(egui::Color32::WHITE),
            )
            .fill(egui::Color32::from_rgb(220, 38, 38));
            if ui.add(delete).clicked() {
                msgs.push(ConfirmMsg::Confirm);
            }
        });
    });

    if modal.should_close() && msgs.is_empty() {
        msgs.push(ConfirmMsg::Cancel);
    }

    msgs
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Upload drop zone with file-picker and paste entry points.

/// Messages emitted by the upload area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadMsg {
    RequestPickFiles,
    RequestPaste,
}

/// Render the drop zone. `files_hovering` highlights it while files are dragged over the window.
pub fn view(ui: &mut egui::Ui, files_hovering: bool) -> Vec<UploadMsg> {
    let mut msgs = Vec::new();

    let visuals = ui.visuals().clone();
    let stroke = if files_hovering {
        egui::Stroke::new(2.0, visuals.selection.stroke.color)
    } else {
        egui::Stroke::new(1.5, visuals.widgets.noninteractive.bg_stroke.color)
    };
    let fill = if files_hovering {
        visuals.selection.bg_fill.gamma_multiply(0.25)
    } else {
        visuals.faint_bg_color
    };

    egui::Frame::new()
        .fill(fill)
        .stroke(stroke)
        .corner_radius(16.0)
        .inner_margin(24.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(egui_phosphor::regular::IMAGE_SQUARE)
                        .size(40.0)
                        .color(visuals.selection.stroke.color),
                );
                ui.add_space(4.0);
                let headline = if files_hovering {
                    "Drop to add stamps"
                } else {
                    "Drag & drop images here"
                };
                ui.label(egui::RichText::new(headline).strong().size(18.0));
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    // Center the two buttons inside the full-width frame.
                    let buttons_width = 280.0;
                    ui.add_space(((ui.available_width() - buttons_width) / 2.0).max(0.0));
                    if ui
                        .button(format!(
                            "{} Choose files",
                            egui_phosphor::regular::FOLDER_OPEN
                        ))
                        .on_hover_text("Select one or more images")
                        .clicked()
                    {
                        msgs.push(UploadMsg::RequestPickFiles);
                    }
                    if ui
                        .button(format!(
                            "{} Paste from clipboard",
                            egui_phosphor::regular::CLIPBOARD_TEXT
                        ))
                        .on_hover_text("Add the image currently on the clipboard")
                        .clicked()
                    {
                        msgs.push(UploadMsg::RequestPaste);
                    }
                });

                ui.add_space(6.0);
                ui.label(
                    egui::RichText::new(format!(
                        "Tip: press {} to paste an image from the clipboard.",
                        paste_shortcut_label(ui.ctx())
                    ))
                    .small()
                    .color(egui::Color32::from_gray(110)),
                );
            });
        });

    msgs
}

fn paste_shortcut_label(ctx: &egui::Context) -> String {
    ctx.format_shortcut(&egui::KeyboardShortcut::new(
        egui::Modifiers::COMMAND,
        egui::Key::V,
    ))
}

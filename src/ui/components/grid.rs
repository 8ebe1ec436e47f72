// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Stamp grid: responsive tiles with click-to-copy, delete, and drag-to-reorder.
//!
//! Per-tile visual state is transient and never persisted:
//! `idle → hovered → idle`, `idle → copying → copied → idle` (auto-reverts),
//! and `idle → dragging → idle`.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::models::payload;
use crate::models::stamp::StampImage;
use crate::utils::format_bytes;

const CORNER_RADIUS: f32 = 10.0;
const THUMBNAIL_MAX: u32 = 256;

/// Presentational state of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileState {
    Idle,
    Hovered,
    Copying,
    Copied,
    Dragging,
}

#[derive(Clone, Copy, Debug)]
enum CopyState {
    Copying,
    Copied(Instant),
}

/// MVU state for the grid and its thumbnail cache.
pub struct GridModel {
    thumbnails: HashMap<String, egui::TextureHandle>,
    thumbnail_pending: HashSet<String>,
    thumbnail_failures: HashSet<String>,
    copy_states: HashMap<String, CopyState>,
    hovered: Option<String>,
    dragging: Option<String>,
    copied_feedback: Duration,
    tile_size: f32,
}

impl Default for GridModel {
    fn default() -> Self {
        Self::with_settings(120.0, Duration::from_millis(1000))
    }
}

/// Messages emitted by the grid view or routed to it.
// Debug omitted because TextureHandle is not Debug.
pub enum GridMsg {
    Hovered(Option<String>),
    Copy(String),
    RequestDelete(String),
    DragStarted(String),
    DragReleased { over: Option<String> },
    LoadThumbnail(String),
    ThumbnailReady {
        id: String,
        texture: egui::TextureHandle,
    },
    ThumbnailFailed {
        id: String,
    },
    CopyFinished {
        id: String,
        ok: bool,
    },
    Tick(Instant),
    /// Drop all cached state for a removed stamp.
    Forget(String),
}

/// Side effects requested by the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridCommand {
    Copy { id: String },
    Delete { id: String },
    Reorder { from: String, to: String },
    LoadThumbnail { id: String },
}

impl GridModel {
    pub fn with_settings(tile_size: f32, copied_feedback: Duration) -> Self {
        Self {
            thumbnails: HashMap::new(),
            thumbnail_pending: HashSet::new(),
            thumbnail_failures: HashSet::new(),
            copy_states: HashMap::new(),
            hovered: None,
            dragging: None,
            copied_feedback,
            tile_size,
        }
    }

    /// Current visual state for the tile with `id`.
    pub fn tile_state(&self, id: &str) -> TileState {
        if self.dragging.as_deref() == Some(id) {
            return TileState::Dragging;
        }
        match self.copy_states.get(id) {
            Some(CopyState::Copying) => TileState::Copying,
            Some(CopyState::Copied(_)) => TileState::Copied,
            None if self.hovered.as_deref() == Some(id) => TileState::Hovered,
            None => TileState::Idle,
        }
    }

    /// Whether time-based state is waiting to revert.
    pub fn needs_tick(&self) -> bool {
        self.copy_states
            .values()
            .any(|state| matches!(state, CopyState::Copied(_)))
    }

    pub fn is_thumbnail_failed(&self, id: &str) -> bool {
        self.thumbnail_failures.contains(id)
    }

    fn wants_thumbnail(&self, id: &str) -> bool {
        !self.thumbnails.contains_key(id)
            && !self.thumbnail_pending.contains(id)
            && !self.thumbnail_failures.contains(id)
    }
}

/// Apply a message to the grid model, enqueuing side effects.
pub fn update(model: &mut GridModel, msg: GridMsg, cmds: &mut Vec<GridCommand>) {
    match msg {
        GridMsg::Hovered(id) => model.hovered = id,
        GridMsg::Copy(id) => {
            let busy = matches!(model.copy_states.get(&id), Some(CopyState::Copying));
            if model.dragging.is_none() && !busy {
                model.copy_states.insert(id.clone(), CopyState::Copying);
                cmds.push(GridCommand::Copy { id });
            }
        }
        GridMsg::RequestDelete(id) => cmds.push(GridCommand::Delete { id }),
        GridMsg::DragStarted(id) => model.dragging = Some(id),
        GridMsg::DragReleased { over } => {
            if let (Some(from), Some(to)) = (model.dragging.take(), over)
                && from != to
            {
                cmds.push(GridCommand::Reorder { from, to });
            }
        }
        GridMsg::LoadThumbnail(id) => {
            if model.wants_thumbnail(&id) {
                model.thumbnail_pending.insert(id.clone());
                cmds.push(GridCommand::LoadThumbnail { id });
            }
        }
        GridMsg::ThumbnailReady { id, texture } => {
            model.thumbnail_pending.remove(&id);
            model.thumbnails.insert(id, texture);
        }
        GridMsg::ThumbnailFailed { id } => {
            model.thumbnail_pending.remove(&id);
            model.thumbnail_failures.insert(id);
        }
        GridMsg::CopyFinished { id, ok } => {
            if ok {
                model
                    .copy_states
                    .insert(id, CopyState::Copied(Instant::now()));
            } else {
                model.copy_states.remove(&id);
            }
        }
        GridMsg::Tick(now) => {
            let feedback = model.copied_feedback;
            model.copy_states.retain(|_, state| match state {
                CopyState::Copying => true,
                CopyState::Copied(at) => now.saturating_duration_since(*at) < feedback,
            });
        }
        GridMsg::Forget(id) => {
            model.thumbnails.remove(&id);
            model.thumbnail_pending.remove(&id);
            model.thumbnail_failures.remove(&id);
            model.copy_states.remove(&id);
            if model.hovered.as_deref() == Some(id.as_str()) {
                model.hovered = None;
            }
            if model.dragging.as_deref() == Some(id.as_str()) {
                model.dragging = None;
            }
        }
    }
}

/// Per-tile interaction results gathered while rendering.
struct TileOutcome {
    hovered: bool,
    pointer_inside: bool,
    drag_stopped: bool,
}

/// Render the grid (or an empty placeholder) and return triggered messages.
pub fn view(ui: &mut egui::Ui, model: &GridModel, images: &[StampImage]) -> Vec<GridMsg> {
    let mut msgs = Vec::new();

    if images.is_empty() {
        render_placeholder(ui);
        if model.hovered.is_some() {
            msgs.push(GridMsg::Hovered(None));
        }
        return msgs;
    }

    let spacing = ui.spacing().item_spacing.x;
    let tile = model.tile_size;
    let cols = (((ui.available_width() + spacing) / (tile + spacing)).floor() as usize).max(1);

    let mut hovered = None;
    let mut drop_target = None;
    let mut drag_stopped = false;

    for row in images.chunks(cols) {
        ui.horizontal(|ui| {
            for stamp in row {
                let outcome = render_tile(ui, model, stamp, &mut msgs);
                if outcome.hovered {
                    hovered = Some(stamp.id.clone());
                }
                if outcome.pointer_inside {
                    drop_target = Some(stamp.id.clone());
                }
                drag_stopped |= outcome.drag_stopped;
            }
        });
    }

    if hovered != model.hovered {
        msgs.push(GridMsg::Hovered(hovered));
    }
    if drag_stopped {
        msgs.push(GridMsg::DragReleased { over: drop_target });
    }

    msgs
}

fn render_tile(
    ui: &mut egui::Ui,
    model: &GridModel,
    stamp: &StampImage,
    msgs: &mut Vec<GridMsg>,
) -> TileOutcome {
    let size = egui::vec2(model.tile_size, model.tile_size);
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
    let state = model.tile_state(&stamp.id);
    let pointer_inside = ui.rect_contains_pointer(rect);
    let is_drop_target =
        pointer_inside && model.dragging.is_some() && state != TileState::Dragging;

    if ui.is_rect_visible(rect) {
        let visuals = ui.visuals().clone();
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, CORNER_RADIUS, visuals.extreme_bg_color);

        match model.thumbnails.get(&stamp.id) {
            Some(texture) => {
                let inner = rect.shrink(8.0);
                let tex_size = texture.size_vec2();
                let scale = (inner.width() / tex_size.x).min(inner.height() / tex_size.y);
                let fitted = egui::Rect::from_center_size(inner.center(), tex_size * scale);
                let tint = if state == TileState::Dragging {
                    egui::Color32::from_white_alpha(128)
                } else {
                    egui::Color32::WHITE
                };
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(texture.id(), fitted, uv, tint);
            }
            None => {
                if model.wants_thumbnail(&stamp.id) {
                    msgs.push(GridMsg::LoadThumbnail(stamp.id.clone()));
                }
                let icon = if model.is_thumbnail_failed(&stamp.id) {
                    egui_phosphor::regular::IMAGE_BROKEN
                } else {
                    egui_phosphor::regular::IMAGE
                };
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    icon,
                    egui::FontId::proportional(28.0),
                    visuals.weak_text_color(),
                );
            }
        }

        paint_state_overlay(&painter, rect, state);

        let stroke = if is_drop_target || state == TileState::Dragging {
            egui::Stroke::new(2.0, visuals.selection.stroke.color)
        } else {
            visuals.widgets.noninteractive.bg_stroke
        };
        painter.rect_stroke(rect, CORNER_RADIUS, stroke, egui::StrokeKind::Inside);
    }

    if pointer_inside && model.dragging.is_none() {
        render_delete_button(ui, rect, &response, stamp, msgs);
    }

    if response.clicked() {
        msgs.push(GridMsg::Copy(stamp.id.clone()));
    }
    if response.drag_started() {
        msgs.push(GridMsg::DragStarted(stamp.id.clone()));
    }
    if response.dragged() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
    } else if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    let outcome = TileOutcome {
        hovered: response.hovered(),
        pointer_inside,
        drag_stopped: response.drag_stopped(),
    };
    response.on_hover_text(tile_details(stamp));
    outcome
}

fn render_delete_button(
    ui: &mut egui::Ui,
    tile: egui::Rect,
    tile_response: &egui::Response,
    stamp: &StampImage,
    msgs: &mut Vec<GridMsg>,
) {
    let rect = egui::Rect::from_min_size(
        egui::pos2(tile.right() - 28.0, tile.top() + 6.0),
        egui::vec2(22.0, 22.0),
    );
    let response = ui
        .interact(rect, tile_response.id.with("delete"), egui::Sense::click())
        .on_hover_text("Delete stamp");

    let fill = if response.hovered() {
        egui::Color32::from_rgb(220, 38, 38)
    } else {
        egui::Color32::from_rgb(239, 68, 68)
    };
    let painter = ui.painter();
    painter.circle_filled(rect.center(), rect.width() / 2.0, fill);
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        egui_phosphor::regular::X,
        egui::FontId::proportional(13.0),
        egui::Color32::WHITE,
    );

    if response.clicked() {
        msgs.push(GridMsg::RequestDelete(stamp.id.clone()));
    }
}

fn paint_state_overlay(painter: &egui::Painter, rect: egui::Rect, state: TileState) {
    match state {
        TileState::Copied => {
            painter.rect_filled(
                rect,
                CORNER_RADIUS,
                egui::Color32::from_rgba_unmultiplied(34, 197, 94, 205),
            );
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                egui_phosphor::regular::CHECK,
                egui::FontId::proportional(40.0),
                egui::Color32::WHITE,
            );
        }
        TileState::Copying => {
            painter.rect_filled(rect, CORNER_RADIUS, egui::Color32::from_black_alpha(60));
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                egui_phosphor::regular::HOURGLASS,
                egui::FontId::proportional(28.0),
                egui::Color32::WHITE,
            );
        }
        TileState::Hovered => {
            painter.rect_filled(rect, CORNER_RADIUS, egui::Color32::from_black_alpha(50));
            let galley = painter.layout_no_wrap(
                "Click to copy".to_string(),
                egui::FontId::proportional(12.0),
                egui::Color32::WHITE,
            );
            let pill = egui::Rect::from_center_size(rect.center(), galley.size())
                .expand2(egui::vec2(10.0, 4.0));
            painter.rect_filled(pill, pill.height() / 2.0, egui::Color32::from_black_alpha(140));
            painter.galley(
                pill.center() - galley.size() / 2.0,
                galley,
                egui::Color32::WHITE,
            );
        }
        TileState::Idle | TileState::Dragging => {}
    }
}

fn render_placeholder(ui: &mut egui::Ui) {
    ui.add_space(48.0);
    ui.vertical_centered(|ui| {
        ui.label(
            egui::RichText::new("No stamps yet")
                .size(20.0)
                .color(egui::Color32::from_gray(150)),
        );
        ui.add_space(4.0);
        ui.label(
            egui::RichText::new("Add images using the area above")
                .color(egui::Color32::from_gray(150)),
        );
    });
    ui.add_space(48.0);
}

/// Tooltip text: type, size, and creation time.
fn tile_details(stamp: &StampImage) -> String {
    let mime = payload::peek_mime(&stamp.data).unwrap_or_else(|| "unknown".into());
    let size = format_bytes(payload::approx_decoded_len(&stamp.data) as u64);
    match stamp.created_label() {
        Some(created) => format!("{mime} | {size}\nAdded {created}"),
        None => format!("{mime} | {size}"),
    }
}

/// Decode a stamp payload into a thumbnail-sized `ColorImage`.
pub(crate) fn load_stamp_thumbnail(data: &str) -> Result<egui::ColorImage, String> {
    let decoded = payload::decode(data).map_err(|e| e.to_string())?;

    if decoded.mime == "image/svg+xml" {
        let hint = egui::SizeHint::Size {
            width: THUMBNAIL_MAX,
            height: THUMBNAIL_MAX,
            maintain_aspect_ratio: true,
        };
        let options = resvg::usvg::Options::default();
        return egui_extras::image::load_svg_bytes_with_size(&decoded.bytes, hint, &options);
    }

    let dyn_img = image::load_from_memory(&decoded.bytes).map_err(|e| e.to_string())?;
    // Small stamps keep their native size; only larger ones are scaled down.
    let resized = if dyn_img.width() > THUMBNAIL_MAX || dyn_img.height() > THUMBNAIL_MAX {
        dyn_img.thumbnail(THUMBNAIL_MAX, THUMBNAIL_MAX).to_rgba8()
    } else {
        dyn_img.to_rgba8()
    };
    let size = [resized.width() as usize, resized.height() as usize];
    let pixels = resized.into_raw();
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, &pixels))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use egui::Color32;
    use image::{ImageBuffer, Rgba};

    use super::*;

    fn png_payload(width: u32, height: u32) -> String {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgba([0, 255, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("png encoded");
        payload::encode("image/png", &bytes)
    }

    #[test]
    fn copy_goes_through_copying_then_copied_then_idle() {
        let mut model = GridModel::with_settings(100.0, Duration::from_millis(50));
        let mut cmds = Vec::new();

        update(&mut model, GridMsg::Copy("a".into()), &mut cmds);
        assert_eq!(cmds, vec![GridCommand::Copy { id: "a".into() }]);
        assert_eq!(model.tile_state("a"), TileState::Copying);

        update(&mut model, GridMsg::Copy("a".into()), &mut cmds);
        assert_eq!(cmds.len(), 1, "a copy already in flight is not repeated");

        update(
            &mut model,
            GridMsg::CopyFinished {
                id: "a".into(),
                ok: true,
            },
            &mut cmds,
        );
        assert_eq!(model.tile_state("a"), TileState::Copied);
        assert!(model.needs_tick());

        update(&mut model, GridMsg::Tick(Instant::now()), &mut cmds);
        assert_eq!(model.tile_state("a"), TileState::Copied);

        update(
            &mut model,
            GridMsg::Tick(Instant::now() + Duration::from_secs(1)),
            &mut cmds,
        );
        assert_eq!(model.tile_state("a"), TileState::Idle);
        assert!(!model.needs_tick());
    }

    #[test]
    fn failed_copy_reverts_to_idle() {
        let mut model = GridModel::default();
        let mut cmds = Vec::new();

        update(&mut model, GridMsg::Copy("a".into()), &mut cmds);
        update(
            &mut model,
            GridMsg::CopyFinished {
                id: "a".into(),
                ok: false,
            },
            &mut cmds,
        );

        assert_eq!(model.tile_state("a"), TileState::Idle);
    }

    #[test]
    fn hover_and_drag_states() {
        let mut model = GridModel::default();
        let mut cmds = Vec::new();

        update(&mut model, GridMsg::Hovered(Some("a".into())), &mut cmds);
        assert_eq!(model.tile_state("a"), TileState::Hovered);
        assert_eq!(model.tile_state("b"), TileState::Idle);

        update(&mut model, GridMsg::DragStarted("a".into()), &mut cmds);
        assert_eq!(model.tile_state("a"), TileState::Dragging);

        update(&mut model, GridMsg::Copy("a".into()), &mut cmds);
        assert!(cmds.is_empty(), "clicks during a drag do not copy");

        update(
            &mut model,
            GridMsg::DragReleased {
                over: Some("c".into()),
            },
            &mut cmds,
        );
        assert_eq!(
            cmds,
            vec![GridCommand::Reorder {
                from: "a".into(),
                to: "c".into()
            }]
        );
        update(&mut model, GridMsg::Hovered(None), &mut cmds);
        assert_eq!(model.tile_state("a"), TileState::Idle);
    }

    #[test]
    fn drag_released_on_itself_or_outside_is_a_no_op() {
        let mut model = GridModel::default();
        let mut cmds = Vec::new();

        update(&mut model, GridMsg::DragStarted("a".into()), &mut cmds);
        update(
            &mut model,
            GridMsg::DragReleased {
                over: Some("a".into()),
            },
            &mut cmds,
        );
        update(&mut model, GridMsg::DragStarted("a".into()), &mut cmds);
        update(&mut model, GridMsg::DragReleased { over: None }, &mut cmds);

        assert!(cmds.is_empty());
        assert_eq!(model.tile_state("a"), TileState::Idle);
    }

    #[test]
    fn thumbnails_are_requested_once() {
        let mut model = GridModel::default();
        let mut cmds = Vec::new();

        update(&mut model, GridMsg::LoadThumbnail("a".into()), &mut cmds);
        update(&mut model, GridMsg::LoadThumbnail("a".into()), &mut cmds);
        assert_eq!(cmds, vec![GridCommand::LoadThumbnail { id: "a".into() }]);

        update(&mut model, GridMsg::ThumbnailFailed { id: "a".into() }, &mut cmds);
        assert!(model.is_thumbnail_failed("a"));
        update(&mut model, GridMsg::LoadThumbnail("a".into()), &mut cmds);
        assert_eq!(cmds.len(), 1, "failed thumbnails are not retried");

        update(&mut model, GridMsg::Forget("a".into()), &mut cmds);
        assert!(!model.is_thumbnail_failed("a"));
    }

    #[test]
    fn delete_request_becomes_command() {
        let mut model = GridModel::default();
        let mut cmds = Vec::new();

        update(&mut model, GridMsg::RequestDelete("a".into()), &mut cmds);

        assert_eq!(cmds, vec![GridCommand::Delete { id: "a".into() }]);
    }

    #[test]
    fn load_stamp_thumbnail_keeps_aspect_ratio() {
        let thumb = load_stamp_thumbnail(&png_payload(10, 12)).expect("thumbnail created");

        assert!(thumb.size[0] <= 256 && thumb.size[1] <= 256);
        let aspect = thumb.size[0] as f32 / thumb.size[1] as f32;
        assert!((aspect - 10.0 / 12.0).abs() < 0.05);
    }

    #[test]
    fn load_stamp_thumbnail_scales_down_large_images() {
        let thumb = load_stamp_thumbnail(&png_payload(512, 256)).expect("thumbnail created");

        assert_eq!(thumb.size, [256, 128]);
    }

    #[test]
    fn load_stamp_thumbnail_renders_svg() {
        let svg = r"<svg xmlns='http://www.w3.org/2000/svg' width='16' height='16'><rect width='16' height='16' fill='red'/></svg>";
        let thumb =
            load_stamp_thumbnail(&payload::encode("image/svg+xml", svg.as_bytes())).unwrap();

        assert!(thumb.size[0] <= 256 && thumb.size[1] <= 256);
        assert!(thumb.pixels.iter().any(|p| *p != Color32::TRANSPARENT));
    }

    #[test]
    fn load_stamp_thumbnail_errors_on_invalid_data() {
        assert!(load_stamp_thumbnail("data:image/png;base64,AAAA").is_err());
        assert!(load_stamp_thumbnail("garbage").is_err());
    }

    #[test]
    fn tile_details_describe_payload() {
        let stamp = StampImage {
            id: "a".into(),
            data: payload::encode("image/png", &[0u8; 2048]),
            created_at: 1_700_000_000_000,
        };

        assert_eq!(
            tile_details(&stamp),
            "image/png | 2.0 KB\nAdded 2023-11-14 22:13 UTC"
        );
    }
}

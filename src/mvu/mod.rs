// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel wiring component state, messages, and commands.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::logic::clipboard::{self, ClipboardBackend, ClipboardItem};
use crate::logic::ingest::{self, IncomingFile, IngestSource, PICKER_EXTENSIONS};
use crate::logic::store::StampStore;
use crate::ui::components::confirm_modal::{self, ConfirmModel, ConfirmMsg};
use crate::ui::components::grid::{self, GridCommand, GridModel, GridMsg};
use crate::ui::components::toast::{self, ToastModel, ToastMsg};
use crate::ui::components::upload_area::UploadMsg;

/// Top-level application state.
pub struct AppModel {
    /// Persistent stamp collection.
    pub store: StampStore,
    /// Grid presentation state and thumbnail cache.
    pub grid: GridModel,
    pub toast: ToastModel,
    /// Delete confirmation dialog.
    pub confirm: ConfirmModel,
    /// Ask before deleting a stamp.
    pub confirm_delete: bool,
    /// Files are currently dragged over the window.
    pub files_hovering: bool,
    /// Count of queued background commands.
    pub pending_commands: usize,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new(StampStore::default(), &Config::default())
    }
}

impl AppModel {
    pub fn new(store: StampStore, config: &Config) -> Self {
        Self {
            store,
            grid: GridModel::with_settings(config.tile_size, config.copied_feedback()),
            toast: ToastModel::with_lifetime(config.toast_lifetime()),
            confirm: ConfirmModel::default(),
            confirm_delete: config.confirm_delete,
            files_hovering: false,
            pending_commands: 0,
        }
    }

    /// Whether timed state (toast, copied tiles) needs `Msg::Tick` to expire.
    pub fn needs_tick(&self) -> bool {
        self.toast.is_visible() || self.grid.needs_tick()
    }
}

/// Application messages routed through the update function.
pub enum Msg {
    Upload(UploadMsg),
    FilesPicked(Vec<PathBuf>),
    FilesDropped(Vec<IncomingFile>),
    FilesHovering(bool),
    PasteRequested,
    ClipboardRead(Result<Vec<ClipboardItem>, String>),
    FileEncoded {
        name: String,
        source: IngestSource,
        result: Result<String, String>,
    },
    CopyCompleted {
        id: String,
        result: Result<(), String>,
    },
    /// Decoded pixels; the UI turns these into a texture before `update` sees them.
    ThumbnailDecoded {
        id: String,
        image: egui::ColorImage,
    },
    Grid(GridMsg),
    Confirm(ConfirmMsg),
    Toast(ToastMsg),
    Tick(Instant),
}

/// Commands represent side-effects executed between frames.
pub enum Command {
    PickFiles,
    ReadClipboard,
    EncodeFile {
        file: IncomingFile,
        source: IngestSource,
    },
    CopyStamp {
        id: String,
        data: String,
    },
    DecodeThumbnail {
        id: String,
        data: String,
    },
}

/// Update the application model and enqueue commands.
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::Upload(UploadMsg::RequestPickFiles) => cmds.push(Command::PickFiles),
        Msg::Upload(UploadMsg::RequestPaste) | Msg::PasteRequested => {
            cmds.push(Command::ReadClipboard)
        }
        Msg::FilesPicked(paths) => {
            let files = paths.into_iter().map(IncomingFile::from_path).collect();
            enqueue_encodes(IngestSource::Picker, files, cmds);
        }
        Msg::FilesDropped(files) => {
            model.files_hovering = false;
            enqueue_encodes(IngestSource::Drop, files, cmds);
        }
        Msg::FilesHovering(hovering) => model.files_hovering = hovering,
        Msg::ClipboardRead(result) => match result {
            Ok(items) if items.is_empty() => debug!("Clipboard holds no image"),
            Ok(items) => {
                let files = items
                    .into_iter()
                    .map(|item| IncomingFile::from_bytes("clipboard", item.mime, item.bytes))
                    .collect();
                enqueue_encodes(IngestSource::Paste, files, cmds);
            }
            Err(err) => warn!(error = %err, "Failed to read clipboard"),
        },
        Msg::FileEncoded {
            name,
            source,
            result,
        } => match result {
            Ok(payload) => {
                let id = model.store.add(payload);
                info!(%source, name = %name, id = %id, "Added stamp");
                toast::update(&mut model.toast, ToastMsg::Show("Image added!".into()));
            }
            Err(err) => warn!(%source, name = %name, error = %err, "Skipping unreadable file"),
        },
        Msg::CopyCompleted { id, result } => {
            let ok = result.is_ok();
            let text = match result {
                Ok(()) => "Copied to clipboard!".to_string(),
                Err(err) => {
                    warn!(id = %id, error = %err, "Copy failed");
                    format!("Copy failed: {err}")
                }
            };
            dispatch_grid(model, GridMsg::CopyFinished { id, ok }, cmds);
            toast::update(&mut model.toast, ToastMsg::Show(text));
        }
        Msg::ThumbnailDecoded { id, .. } => {
            debug!(id = %id, "Decoded thumbnail reached update without a texture");
        }
        Msg::Grid(
            GridMsg::ThumbnailReady { ref id, .. } | GridMsg::ThumbnailFailed { ref id },
        ) if model.store.get(id).is_none() => {
            debug!(id = %id, "Dropping thumbnail result for removed stamp");
        }
        Msg::Grid(m) => dispatch_grid(model, m, cmds),
        Msg::Confirm(m) => {
            if let Some(id) = confirm_modal::update(&mut model.confirm, m) {
                remove_stamp(model, &id, cmds);
            }
        }
        Msg::Toast(m) => toast::update(&mut model.toast, m),
        Msg::Tick(now) => {
            toast::update(&mut model.toast, ToastMsg::Tick(now));
            dispatch_grid(model, GridMsg::Tick(now), cmds);
        }
    }
}

/// Execute a command (on a worker thread) and return a resulting message.
pub fn run_command(cmd: Command, clipboard: &dyn ClipboardBackend) -> Msg {
    match cmd {
        Command::PickFiles => {
            let files = rfd::FileDialog::new()
                .set_title("Select images")
                .add_filter("Images", PICKER_EXTENSIONS)
                .pick_files()
                .unwrap_or_default();
            Msg::FilesPicked(files)
        }
        Command::ReadClipboard => {
            Msg::ClipboardRead(clipboard.read_images().map_err(|e| e.to_string()))
        }
        Command::EncodeFile { file, source } => Msg::FileEncoded {
            result: ingest::encode_file(&file).map_err(|e| format!("{e:#}")),
            name: file.name,
            source,
        },
        Command::CopyStamp { id, data } => Msg::CopyCompleted {
            result: clipboard::copy_payload(clipboard, &data).map_err(|e| e.to_string()),
            id,
        },
        Command::DecodeThumbnail { id, data } => match grid::load_stamp_thumbnail(&data) {
            Ok(image) => Msg::ThumbnailDecoded { id, image },
            Err(err) => {
                debug!(id = %id, error = %err, "Thumbnail decode failed");
                Msg::Grid(GridMsg::ThumbnailFailed { id })
            }
        },
    }
}

/// Filter to images and queue one encode command per file.
fn enqueue_encodes(source: IngestSource, files: Vec<IncomingFile>, cmds: &mut Vec<Command>) {
    for file in ingest::select_images(source, files) {
        cmds.push(Command::EncodeFile { file, source });
    }
}

/// Route a grid message and translate its commands into app commands or store mutations.
fn dispatch_grid(model: &mut AppModel, msg: GridMsg, cmds: &mut Vec<Command>) {
    let mut grid_cmds = Vec::new();
    grid::update(&mut model.grid, msg, &mut grid_cmds);
    for c in grid_cmds {
        match c {
            GridCommand::Copy { id } => match model.store.get(&id) {
                Some(stamp) => cmds.push(Command::CopyStamp {
                    data: stamp.data.clone(),
                    id,
                }),
                None => grid::update(
                    &mut model.grid,
                    GridMsg::CopyFinished { id, ok: false },
                    &mut Vec::new(),
                ),
            },
            GridCommand::Delete { id } => {
                if model.confirm_delete {
                    confirm_modal::update(&mut model.confirm, ConfirmMsg::Request(id));
                } else {
                    remove_stamp(model, &id, cmds);
                }
            }
            GridCommand::Reorder { from, to } => {
                if !model.store.move_item(&from, &to) {
                    debug!(from = %from, to = %to, "Ignoring reorder onto unknown stamp");
                }
            }
            GridCommand::LoadThumbnail { id } => {
                if let Some(stamp) = model.store.get(&id) {
                    cmds.push(Command::DecodeThumbnail {
                        data: stamp.data.clone(),
                        id,
                    });
                }
            }
        }
    }
}

fn remove_stamp(model: &mut AppModel, id: &str, cmds: &mut Vec<Command>) {
    if model.store.remove(id) {
        info!(id = %id, "Removed stamp");
        toast::update(&mut model.toast, ToastMsg::Show("Stamp deleted".into()));
    }
    dispatch_grid(model, GridMsg::Forget(id.to_string()), cmds);
}

//! Application shell: opens the platform table and loads the board from it.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use weave_core::storage::{PersistenceAdapter, StorageError};
use weave_core::{Board, ConfigError, WeaveConfig};

#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};
#[cfg(not(target_arch = "wasm32"))]
use weave_core::storage::{BlockingSpawner, FileTable};

#[cfg(target_arch = "wasm32")]
use weave_core::storage::{IndexedDbTable, LocalSpawner};

/// Name of the optional config file in the data directory.
#[cfg(not(target_arch = "wasm32"))]
pub const CONFIG_FILE: &str = "weave.json";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub board: WeaveConfig,
    /// Data directory; `None` uses the platform default.
    #[cfg(not(target_arch = "wasm32"))]
    pub data_dir: Option<PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
impl AppConfig {
    /// Read `weave.json` from `dir`. A missing or invalid file leaves the defaults.
    pub fn load_from(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        let board = match std::fs::read_to_string(&path) {
            Ok(json) => WeaveConfig::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring {}: {}", path.display(), e);
                WeaveConfig::default()
            }),
            Err(_) => WeaveConfig::default(),
        };
        Self {
            board,
            data_dir: Some(dir.to_path_buf()),
        }
    }
}

/// Object counts for a loaded board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_layer: BTreeMap<u8, usize>,
    pub locked: usize,
}

impl fmt::Display for BoardSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} object(s)", self.total)?;
        for (kind, count) in &self.by_type {
            write!(f, ", {} {}", count, kind)?;
        }
        if self.locked > 0 {
            write!(f, " ({} locked)", self.locked)?;
        }
        Ok(())
    }
}

pub struct App {
    board: Board,
}

impl App {
    /// Open the platform table and load the board. A failed load leaves an empty board.
    pub async fn open(config: AppConfig) -> Result<Self, AppError> {
        config.board.validate()?;
        let persistence = Self::persistence(&config)?;
        let mut board = Board::new(config.board, persistence);
        if let Err(e) = board.load().await {
            log::warn!("Starting with an empty board: {}", e);
        }
        Ok(Self { board })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn persistence(config: &AppConfig) -> Result<PersistenceAdapter, AppError> {
        let table = match &config.data_dir {
            Some(dir) => FileTable::new(dir.join("objects"))?,
            None => FileTable::default_location()?,
        };
        log::info!("Object table at {}", table.base_path().display());
        Ok(PersistenceAdapter::new(
            std::sync::Arc::new(table),
            Box::new(BlockingSpawner),
        ))
    }

    #[cfg(target_arch = "wasm32")]
    fn persistence(_config: &AppConfig) -> Result<PersistenceAdapter, AppError> {
        Ok(PersistenceAdapter::new(
            std::sync::Arc::new(IndexedDbTable::new()),
            Box::new(LocalSpawner),
        ))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn summary(&self) -> BoardSummary {
        let mut summary = BoardSummary::default();
        for object in self.board.store().objects() {
            summary.total += 1;
            let kind = format!("{:?}", object.object_type).to_lowercase();
            *summary.by_type.entry(kind).or_default() += 1;
            *summary.by_layer.entry(object.layer()).or_default() += 1;
            if object.is_locked {
                summary.locked += 1;
            }
        }
        summary
    }

    /// Native entry point: load the board from the data directory and report on it.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn run() -> Result<(), AppError> {
        let data_dir = FileTable::data_dir()?;
        let app = Self::open(AppConfig::load_from(&data_dir)).await?;
        log::info!("Board: {}", app.summary());
        println!("{}", app.summary());
        crate::ShortcutRegistry::print_all();
        Ok(())
    }
}

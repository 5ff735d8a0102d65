use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// File-backed favorites list
///
/// Every call performs a full load-modify-save against the file, so the list
/// survives restarts and nothing is cached between calls. Cycles are
/// serialized within one store instance; separate processes sharing the file
/// are not coordinated and the last writer wins.
///
/// Format: UTF-8, one title per line, each line terminated by `\n`.
#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    cycle: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cycle: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current favorites in insertion order
    pub fn list(&self) -> AppResult<Vec<String>> {
        let _guard = self.lock()?;
        self.load()
    }

    /// Appends `title` unless already present; returns whether it was added
    pub fn add(&self, title: &str) -> AppResult<bool> {
        validate_title(title)?;
        let _guard = self.lock()?;

        let mut favorites = self.load()?;
        if favorites.iter().any(|f| f == title) {
            tracing::debug!(title = %title, "Favorite already present");
            return Ok(false);
        }

        favorites.push(title.to_string());
        self.save(&favorites)?;

        tracing::info!(title = %title, count = favorites.len(), "Favorite added");
        Ok(true)
    }

    /// Removes `title` if present; returns whether it was removed
    pub fn remove(&self, title: &str) -> AppResult<bool> {
        // Such a title can never have been stored
        if validate_title(title).is_err() {
            return Ok(false);
        }
        let _guard = self.lock()?;

        let mut favorites = self.load()?;
        let Some(position) = favorites.iter().position(|f| f == title) else {
            tracing::debug!(title = %title, "Favorite not present");
            return Ok(false);
        };

        favorites.remove(position);
        self.save(&favorites)?;

        tracing::info!(title = %title, count = favorites.len(), "Favorite removed");
        Ok(true)
    }

    /// Reads the favorites file; a missing file is an empty list
    ///
    /// Blank lines are skipped and repeated titles keep their first position.
    pub fn load(&self) -> AppResult<Vec<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to read favorites");
                return Err(AppError::Persistence(e));
            }
        };

        let mut favorites: Vec<String> = Vec::new();
        for line in contents.lines() {
            if line.trim().is_empty() || favorites.iter().any(|f| f == line) {
                continue;
            }
            favorites.push(line.to_string());
        }

        Ok(favorites)
    }

    /// Replaces the favorites file with `favorites`
    ///
    /// Every entry must be a distinct title that `load` reads back unchanged;
    /// otherwise nothing is written and `InvalidInput` is returned. Writes a
    /// sibling temporary file, syncs it, then renames it over the target so a
    /// crash never leaves a half-written list behind.
    pub fn save(&self, favorites: &[String]) -> AppResult<()> {
        for (position, title) in favorites.iter().enumerate() {
            validate_title(title)?;
            if favorites[..position].contains(title) {
                return Err(AppError::InvalidInput(format!(
                    "Duplicate favorite '{}'",
                    title
                )));
            }
        }

        let temp_path = self.temp_path();

        let result =
            write_lines(&temp_path, favorites).and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            tracing::error!(path = %self.path.display(), error = %e, "Failed to save favorites");
            return Err(AppError::Persistence(e));
        }

        tracing::debug!(path = %self.path.display(), count = favorites.len(), "Favorites saved");
        Ok(())
    }

    /// Unique per save, so concurrent writers never share a temporary file
    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "favorites".to_string());
        self.path
            .with_file_name(format!(".tmp_{}.{}", file_name, Uuid::new_v4().simple()))
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, ()>> {
        self.cycle
            .lock()
            .map_err(|_| AppError::Internal("Favorites lock poisoned".to_string()))
    }
}

fn write_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut file = File::create(path)?;
    for line in lines {
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
    }
    file.sync_all()
}

/// Titles must be representable in the line-based format
fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }
    if title.contains(['\n', '\r']) {
        return Err(AppError::InvalidInput(
            "Title cannot contain line breaks".to_string(),
        ));
    }
    Ok(())
}

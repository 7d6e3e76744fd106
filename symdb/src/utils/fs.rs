// FICHIER : symdb/src/utils/fs.rs

//! Primitives disque bloquantes, sans politique de tolérance.
//! Chaque erreur est classée (`NotFound`, `AlreadyExists`, `Io`) avec son chemin ;
//! c'est l'appelant qui décide de ce qu'il tolère.

use crate::utils::error::{AppError, Result};
use crate::utils::json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use tracing::instrument;
use uuid::Uuid;

pub use std::path::{Path, PathBuf};

/// Suffixe des fichiers temporaires d'écriture atomique.
pub const TMP_SUFFIX: &str = ".tmp";

/// Crée récursivement un répertoire (idempotent).
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| AppError::io(path, e))
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

// --- ÉCRITURE ATOMIQUE ---

/// Écriture atomique (write -> sync -> rename), dossiers parents créés au besoin.
#[instrument(level = "trace", skip(content), fields(path = ?path))]
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent(path)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.{}{}", file_name, Uuid::new_v4(), TMP_SUFFIX));

    let written = fs::File::create(&tmp_path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(AppError::io(&tmp_path, e));
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AppError::io(path, e));
    }
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let content = json::stringify(data)?;
    write_atomic(path, content.as_bytes())
}

// --- LECTURE ---

pub fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| AppError::io(path, e))
}

/// Lit et désérialise un fichier JSON.
/// Un contenu invalide donne `MalformedDocument`, distinct de l'absence.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::malformed(path, e))
}

/// Noms des entrées d'un dossier, triés, fichiers temporaires exclus.
pub fn list_dir(path: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(path).map_err(|e| AppError::io(path, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::io(path, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(TMP_SUFFIX) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

// --- SUPPRESSION ---

pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| AppError::io(path, e))
}

/// Supprime un dossier vide.
pub fn remove_dir(path: &Path) -> Result<()> {
    fs::remove_dir(path).map_err(|e| AppError::io(path, e))
}

// --- LIENS ---

/// Lien symbolique `link -> target` (cible relative conservée telle quelle).
pub fn symlink(target: &Path, link: &Path) -> Result<()> {
    ensure_parent(link)?;
    #[cfg(unix)]
    let res = std::os::unix::fs::symlink(target, link);
    #[cfg(windows)]
    let res = std::os::windows::fs::symlink_file(target, link);
    res.map_err(|e| AppError::io(link, e))
}

/// Lien physique vers un fichier existant.
pub fn hard_link(original: &Path, link: &Path) -> Result<()> {
    ensure_parent(link)?;
    fs::hard_link(original, link).map_err(|e| AppError::io(link, e))
}

/// Fichier marqueur vide ; échoue avec `AlreadyExists` s'il est déjà là.
pub fn touch_new(path: &Path) -> Result<()> {
    ensure_parent(path)?;
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| AppError::io(path, e))
}

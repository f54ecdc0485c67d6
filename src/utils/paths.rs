use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".tradebook";
const HOME_ENV: &str = "TRADEBOOK_HOME";
const BOOKS_DIR: &str = "books";
const CONFIG_FILE: &str = "config.json";

/// Resolves where configuration and books live on disk.
pub struct PathResolver;

impl PathResolver {
    /// `$TRADEBOOK_HOME`, or `~/.tradebook`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }

    /// Directory holding the tables of one book.
    pub fn book_dir_in(base: &Path, book: &str) -> PathBuf {
        base.join(BOOKS_DIR).join(canonical_name(book))
    }
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Lowercase file-system safe form of a book or table name.
pub fn canonical_name(name: &str) -> String {
    let mut slug = String::new();
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if matches!(ch, '-' | '_' | ' ') && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

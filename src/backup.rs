use crate::auth::sha256_hex;
use crate::error::{AppError, AppResult};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DB_ENTRY: &str = "db/gradebook.sqlite3";
pub const BUNDLE_FORMAT: &str = "gradebook-backup-v1";
const BUNDLE_VERSION: u32 = 1;
const RAW_SQLITE_FORMAT: &str = "raw-sqlite3";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub format: String,
    pub version: u32,
    pub app_version: String,
    pub exported_at: String,
    pub bundle_id: String,
    #[serde(default)]
    pub db_sha256: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub path: PathBuf,
    pub bundle_id: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub format_detected: String,
    pub bundle_id: Option<String>,
}

/// Zip the database file at `db_path` with a manifest into `out`.
pub fn export_database_bundle(db_path: &Path, out: &Path) -> AppResult<ExportSummary> {
    write_bundle(db_path, out).map_err(AppError::Backup)
}

/// Replace the database at `db_path` with the one inside `bundle`. The
/// caller must not hold a connection to `db_path` while this runs.
pub fn import_database_bundle(bundle: &Path, db_path: &Path) -> AppResult<ImportSummary> {
    read_bundle(bundle, db_path).map_err(AppError::Backup)
}

fn write_bundle(db_path: &Path, out: &Path) -> anyhow::Result<ExportSummary> {
    if !db_path.is_file() {
        return Err(anyhow!("database not found: {}", db_path.display()));
    }
    let bytes = std::fs::read(db_path)
        .with_context(|| format!("failed to read database {}", db_path.display()))?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let out_file = File::create(out)
        .with_context(|| format!("failed to create output file {}", out.display()))?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = Manifest {
        format: BUNDLE_FORMAT.to_string(),
        version: BUNDLE_VERSION,
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        bundle_id: uuid::Uuid::new_v4().to_string(),
        db_sha256: Some(sha256_hex(&bytes)),
    };
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(DB_ENTRY, opts)
        .context("failed to start database entry")?;
    zip.write_all(&bytes)
        .context("failed to write database entry")?;
    zip.finish().context("failed to finalize zip bundle")?;

    log::info!(
        "exported bundle {} to {}",
        manifest.bundle_id,
        out.display()
    );
    Ok(ExportSummary {
        path: out.to_path_buf(),
        bundle_id: manifest.bundle_id,
        bytes: bytes.len() as u64,
    })
}

fn read_bundle(bundle: &Path, db_path: &Path) -> anyhow::Result<ImportSummary> {
    let importing = staging_path(db_path);
    if importing.exists() {
        let _ = std::fs::remove_file(&importing);
    }

    // A bare database file is accepted as-is.
    if !is_zip_file(bundle)? {
        if !is_sqlite_file(bundle)? {
            return Err(anyhow!(
                "{} is neither a backup bundle nor a database file",
                bundle.display()
            ));
        }
        std::fs::copy(bundle, &importing).with_context(|| {
            format!(
                "failed to copy database from {} to {}",
                bundle.display(),
                importing.display()
            )
        })?;
        replace(&importing, db_path)?;
        return Ok(ImportSummary {
            format_detected: RAW_SQLITE_FORMAT.to_string(),
            bundle_id: None,
        });
    }

    let in_file = File::open(bundle)
        .with_context(|| format!("failed to open bundle {}", bundle.display()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: Manifest =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid")?;
    if manifest.format != BUNDLE_FORMAT {
        return Err(anyhow!("unsupported bundle format: {}", manifest.format));
    }

    let mut bytes = Vec::new();
    archive
        .by_name(DB_ENTRY)
        .with_context(|| format!("bundle missing {DB_ENTRY}"))?
        .read_to_end(&mut bytes)
        .context("failed to extract database entry")?;
    if let Some(expected) = &manifest.db_sha256 {
        let actual = sha256_hex(&bytes);
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(anyhow!("database checksum mismatch in bundle"));
        }
    }

    let mut db_out = File::create(&importing)
        .with_context(|| format!("failed to create temp database {}", importing.display()))?;
    db_out
        .write_all(&bytes)
        .context("failed to write extracted database")?;
    db_out
        .flush()
        .context("failed to flush extracted database")?;
    drop(db_out);
    replace(&importing, db_path)?;

    log::info!(
        "imported bundle {} into {}",
        manifest.bundle_id,
        db_path.display()
    );
    Ok(ImportSummary {
        format_detected: manifest.format,
        bundle_id: Some(manifest.bundle_id),
    })
}

fn staging_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_owned();
    name.push(".importing");
    PathBuf::from(name)
}

fn replace(staged: &Path, dst: &Path) -> anyhow::Result<()> {
    if dst.exists() {
        std::fs::remove_file(dst)
            .with_context(|| format!("failed to remove existing database {}", dst.display()))?;
    }
    std::fs::rename(staged, dst)
        .with_context(|| format!("failed to move extracted database to {}", dst.display()))
}

fn read_signature(path: &Path, buf: &mut [u8]) -> anyhow::Result<usize> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.display()))?;
    f.read(buf).context("failed to read file signature")
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut sig = [0u8; 4];
    let read = read_signature(path, &mut sig)?;
    Ok(read == 4 && sig == [0x50, 0x4B, 0x03, 0x04])
}

fn is_sqlite_file(path: &Path) -> anyhow::Result<bool> {
    const MAGIC: &[u8; 16] = b"SQLite format 3\0";
    let mut sig = [0u8; 16];
    let read = read_signature(path, &mut sig)?;
    Ok(read == 16 && &sig == MAGIC)
}

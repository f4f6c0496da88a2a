use crate::document::Document;
use crate::error::{ConvertError, Result};
use crate::folders::{FolderTree, kml_with_folders};
use crate::kml::{ConvertOptions, kml};
use geojson::FeatureCollection;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn convert_str(content: &str, options: &ConvertOptions) -> Result<FeatureCollection> {
    let document = Document::parse(content)?;
    Ok(kml(document.root(), options))
}

pub fn convert_str_with_folders(content: &str, options: &ConvertOptions) -> Result<FolderTree> {
    let document = Document::parse(content)?;
    Ok(kml_with_folders(document.root(), options))
}

/// KML text of a `.kml` file, or of the main document inside a `.kmz`.
pub fn read_kml_text(path: &Path) -> Result<String> {
    if is_kmz(path) {
        read_kmz(path)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

/// The KMZ main document is `doc.kml` when present, otherwise the first
/// `.kml` entry.
fn read_kmz(path: &Path) -> Result<String> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;

    let mut first_kml = None;
    let mut doc_kml = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let name = entry.name();
        if !is_kml(Path::new(name)) {
            continue;
        }
        if name.eq_ignore_ascii_case("doc.kml") {
            doc_kml = Some(i);
            break;
        }
        first_kml.get_or_insert(i);
    }

    let index = doc_kml
        .or(first_kml)
        .ok_or_else(|| ConvertError::NoKmlInArchive(path.display().to_string()))?;
    let mut entry = archive.by_index(index)?;
    log::debug!("{}: reading {}", path.display(), entry.name());
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}

pub fn convert_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<FeatureCollection> {
    let path = path.as_ref();
    let collection = convert_str(&read_kml_text(path)?, options)?;
    log::debug!(
        "{}: {} feature(s)",
        path.display(),
        collection.features.len()
    );
    Ok(collection)
}

pub fn convert_file_with_folders<P: AsRef<Path>>(
    path: P,
    options: &ConvertOptions,
) -> Result<FolderTree> {
    convert_str_with_folders(&read_kml_text(path.as_ref())?, options)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

pub fn is_kml(path: &Path) -> bool {
    has_extension(path, "kml")
}

pub fn is_kmz(path: &Path) -> bool {
    has_extension(path, "kmz")
}

/// Run `convert` on every `.kml`/`.kmz` file below `dir`, in path order.
/// Files that fail are skipped with a warning.
fn walk<T>(dir: &Path, convert: impl Fn(&Path) -> Result<T>) -> Result<Vec<(PathBuf, T)>> {
    let mut converted = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() || !(is_kml(path) || is_kmz(path)) {
            continue;
        }
        match convert(path) {
            Ok(output) => converted.push((path.to_path_buf(), output)),
            Err(e) => log::warn!("skipping {}: {e}", path.display()),
        }
    }
    Ok(converted)
}

/// A file converts on its own, a directory converts all KML files in it.
fn for_path<T>(path: &Path, convert: impl Fn(&Path) -> Result<T>) -> Result<Vec<(PathBuf, T)>> {
    let metadata = fs::metadata(path)?;
    if metadata.is_dir() {
        walk(path, convert)
    } else if metadata.is_file() {
        Ok(vec![(path.to_path_buf(), convert(path)?)])
    } else {
        Err(ConvertError::UnsupportedInput(path.display().to_string()))
    }
}

pub fn convert_dir<P: AsRef<Path>>(
    dir: P,
    options: &ConvertOptions,
) -> Result<Vec<(PathBuf, FeatureCollection)>> {
    walk(dir.as_ref(), |path| convert_file(path, options))
}

pub fn convert_dir_with_folders<P: AsRef<Path>>(
    dir: P,
    options: &ConvertOptions,
) -> Result<Vec<(PathBuf, FolderTree)>> {
    walk(dir.as_ref(), |path| convert_file_with_folders(path, options))
}

pub fn convert_path<P: AsRef<Path>>(
    path: P,
    options: &ConvertOptions,
) -> Result<Vec<(PathBuf, FeatureCollection)>> {
    for_path(path.as_ref(), |path| convert_file(path, options))
}

pub fn convert_path_with_folders<P: AsRef<Path>>(
    path: P,
    options: &ConvertOptions,
) -> Result<Vec<(PathBuf, FolderTree)>> {
    for_path(path.as_ref(), |path| convert_file_with_folders(path, options))
}

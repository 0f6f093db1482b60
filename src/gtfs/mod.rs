mod files;
pub mod models;

pub use files::*;
pub use models::*;

use serde::de::DeserializeOwned;
use std::{
    fs::{self, File},
    io::{self},
    path::{Path, PathBuf},
};
use thiserror::Error;
use zip::{ZipArchive, read::ZipFile};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Could not find file with name: {0}")]
    FileNotFound(String),
    #[error("Missing any source to pull data from")]
    MissingSource,
}

#[derive(Default)]
pub enum Source {
    #[default]
    None,
    Zip(ZipArchive<File>),
    Directory(PathBuf),
}

/// Streaming access to the tables of a GTFS bundle, either a `.zip` archive
/// or an extracted directory.
#[derive(Default)]
pub struct Gtfs {
    files: Files,
    storage: Source,
}

impl Gtfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files(mut self, files: Files) -> Self {
        self.files = files;
        self
    }

    pub fn from_zip<P: AsRef<Path>>(mut self, path: P) -> Result<Self, self::Error> {
        let zip_file = File::open(path)?;
        let archive = ZipArchive::new(zip_file)?;
        self.storage = Source::Zip(archive);
        Ok(self)
    }

    pub fn from_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.storage = Source::Directory(path.as_ref().to_path_buf());
        self
    }

    pub fn stream_stops<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsStop),
    {
        let name = self.files.stops.clone();
        self.stream(&name, f)
    }

    pub fn stream_routes<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsRoute),
    {
        let name = self.files.routes.clone();
        self.stream(&name, f)
    }

    pub fn stream_trips<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsTrip),
    {
        let name = self.files.trips.clone();
        self.stream(&name, f)
    }

    pub fn stream_stop_times<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsStopTime),
    {
        let name = self.files.stop_times.clone();
        self.stream(&name, f)
    }

    /// Returns `false` when the bundle carries no calendar.txt.
    pub fn stream_calendar<F>(&mut self, f: F) -> Result<bool, self::Error>
    where
        F: FnMut(GtfsCalendar),
    {
        let name = self.files.calendar.clone();
        self.stream_optional(&name, f)
    }

    /// Returns `false` when the bundle carries no calendar_dates.txt.
    pub fn stream_calendar_dates<F>(&mut self, f: F) -> Result<bool, self::Error>
    where
        F: FnMut(GtfsCalendarDate),
    {
        let name = self.files.calendar_dates.clone();
        self.stream_optional(&name, f)
    }

    pub fn stream_transfers<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsTransfer),
    {
        let name = self.files.transfers.clone();
        self.stream(&name, f)
    }

    fn stream<T, F>(&mut self, file_name: &str, f: F) -> Result<(), self::Error>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        match &mut self.storage {
            Source::None => Err(self::Error::MissingSource),
            Source::Zip(archive) => stream_from_zip(archive, file_name, f),
            Source::Directory(path) => stream_from_dir(path, file_name, f),
        }
    }

    fn stream_optional<T, F>(&mut self, file_name: &str, f: F) -> Result<bool, self::Error>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        match &mut self.storage {
            Source::None => Err(self::Error::MissingSource),
            Source::Zip(archive) => {
                if archive.index_for_name(file_name).is_none() {
                    return Ok(false);
                }
                stream_from_zip(archive, file_name, f)?;
                Ok(true)
            }
            Source::Directory(path) => {
                if !path.join(file_name).exists() {
                    return Ok(false);
                }
                stream_from_dir(path, file_name, f)?;
                Ok(true)
            }
        }
    }
}

fn stream_from_zip<T, F>(
    archive: &mut ZipArchive<File>,
    file_name: &str,
    mut f: F,
) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    F: FnMut(T),
{
    let file = get_file_from_zip(archive, file_name)?;
    let mut reader = csv::Reader::from_reader(file);
    for result in reader.deserialize() {
        f(result?);
    }
    Ok(())
}

fn stream_from_dir<T, F>(dir_path: &Path, file_name: &str, mut f: F) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    F: FnMut(T),
{
    let file_path = dir_path.join(file_name);
    let file = match fs::File::open(&file_path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(self::Error::FileNotFound(file_name.to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    let reader = io::BufReader::with_capacity(128 * 1024, file);
    let mut csv_reader = csv::Reader::from_reader(reader);
    for result in csv_reader.deserialize() {
        f(result?);
    }
    Ok(())
}

fn get_file_from_zip<'a>(
    archive: &'a mut ZipArchive<File>,
    name: &'a str,
) -> Result<ZipFile<'a, File>, self::Error> {
    let index = archive
        .index_for_name(name)
        .ok_or(self::Error::FileNotFound(name.to_string()))?;
    let file = archive.by_index(index)?;
    Ok(file)
}

use crate::error::Error;

pub const BLOCK_SIZE: usize = 512;

// A single fixed-size unit of the storage medium.
pub type Block = [u8; BLOCK_SIZE];

pub const MAX_DIRS: usize = 8;
pub const MAX_FILES: usize = 16;

// Name and path strings live in 32-byte zero-terminated slots, file
// content in a 128-byte slot.
pub const MAX_NAME: usize = 31;
pub const MAX_CONTENT: usize = 127;

pub const ROOT_DIR: &str = "/";

// Content given to freshly created files.
pub const DEFAULT_CONTENT: &str = "Empty taco.";

// Directories present on a freshly formatted medium.
pub const DEFAULT_DIRS: [&str; 5] = ["/", "/home", "/system", "/tacos", "/dev"];

// A single catalog entry describing one file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    // Absolute path of the containing directory. Not validated against
    // the directory list, so records can outlive their directory.
    pub parent_dir: String,
    pub content: String,
}

impl FileRecord {
    pub fn new(name: &str, parent_dir: &str, content: &str) -> Result<Self, Error> {
        check_name(name)?;
        check_name(parent_dir)?;
        check_content(content)?;
        Ok(Self {
            name: name.to_string(),
            parent_dir: parent_dir.to_string(),
            content: content.to_string(),
        })
    }
}

// The complete in-memory namespace, mirrored to the device after every
// successful mutation. Directory hierarchy is inferred from the path
// strings; there are no parent/child links.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    // Absolute paths in creation order. Entry 0 is "/" once bootstrapped.
    pub directories: Vec<String>,
    pub files: Vec<FileRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    // The catalog written to an unformatted medium on first boot.
    pub fn bootstrap() -> Self {
        Self {
            directories: DEFAULT_DIRS.iter().map(|d| d.to_string()).collect(),
            files: Vec::new(),
        }
    }

    pub fn dir_count(&self) -> usize {
        self.directories.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

// Validate that a name or path string fits its 32-byte slot.
pub fn check_name(name: &str) -> Result<(), Error> {
    if name.len() > MAX_NAME {
        return Err(Error::NameTooLong);
    }
    Ok(())
}

// Validate that file content fits its 128-byte slot.
pub fn check_content(content: &str) -> Result<(), Error> {
    if content.len() > MAX_CONTENT {
        return Err(Error::ContentTooLong);
    }
    Ok(())
}

use log::debug;

use crate::{
    catalog::{
        check_content, check_name, Catalog, FileRecord, DEFAULT_CONTENT, MAX_DIRS, MAX_FILES,
        ROOT_DIR,
    },
    device::BlockDevice,
    error::Error,
    layout, path,
};

// The direct contents of a directory as shown by a listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Listing {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }
}

// Editing is a two-step interaction: entering edit mode records the
// target, the new content arrives in a separate call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EditState {
    Idle,
    Editing(usize),
}

// The main class implementing the namespace API.
//
// Owns the in-memory catalog, the block device it is mirrored to, and the
// current-directory cursor. Single owner, single thread; every mutating
// operation validates first, updates the catalog, then saves the whole
// image. A rejected operation leaves the catalog untouched. A save that
// fails on the device is reported but the in-memory mutation stands.
pub struct CatalogFs {
    device: Box<dyn BlockDevice>,
    catalog: Catalog,
    current_dir: String,
    edit: EditState,
    base: u32,
}

impl CatalogFs {
    // Open the catalog stored on `device` at block 0. An unformatted
    // medium is bootstrapped with the default directories.
    pub fn new(device: Box<dyn BlockDevice>) -> Result<Self, Error> {
        Self::with_base(device, 0)
    }

    // Open a catalog whose image starts at the given base block.
    pub fn with_base(mut device: Box<dyn BlockDevice>, base: u32) -> Result<Self, Error> {
        let catalog = layout::load(device.as_mut(), base)?;
        Ok(Self {
            device,
            catalog,
            current_dir: ROOT_DIR.to_string(),
            edit: EditState::Idle,
            base,
        })
    }

    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // Resolve a path against the current directory.
    pub fn resolve(&self, path: &str) -> String {
        path::canonicalize(path, &self.current_dir)
    }

    fn persist(&mut self) -> Result<(), Error> {
        layout::save(&self.catalog, self.device.as_mut(), self.base)
    }

    // Index of the file named `name` in the current directory.
    fn find_file(&self, name: &str) -> Result<usize, Error> {
        self.catalog
            .files
            .iter()
            .position(|f| f.name == name && f.parent_dir == self.current_dir)
            .ok_or(Error::NotFound)
    }

    // Create a file in the current directory with the default content.
    // The parent is not checked against the directory list; a file keeps
    // whatever parent path it was created under.
    pub fn create_file(&mut self, name: &str) -> Result<(), Error> {
        if self.catalog.file_count() == MAX_FILES {
            return Err(Error::CapacityExceeded);
        }
        let record = FileRecord::new(name, &self.current_dir, DEFAULT_CONTENT)?;
        self.catalog.files.push(record);
        self.persist()
    }

    // Remove the file named `name` from the current directory, keeping
    // the relative order of the remaining records.
    pub fn remove_file(&mut self, name: &str) -> Result<(), Error> {
        let index = self.find_file(name)?;
        self.catalog.files.remove(index);
        self.persist()
    }

    // Rename a file in place; content and parent stay as they are.
    pub fn rename_file(&mut self, src: &str, dest: &str) -> Result<(), Error> {
        let index = self.find_file(src)?;
        check_name(dest)?;
        self.catalog.files[index].name = dest.to_string();
        self.persist()
    }

    // Duplicate a file under a new name in the same directory.
    pub fn copy_file(&mut self, src: &str, dest: &str) -> Result<(), Error> {
        let index = self.find_file(src)?;
        check_name(dest)?;
        if self.catalog.file_count() == MAX_FILES {
            return Err(Error::CapacityExceeded);
        }
        let mut record = self.catalog.files[index].clone();
        record.name = dest.to_string();
        self.catalog.files.push(record);
        self.persist()
    }

    // Read-only content access.
    pub fn open_file(&self, name: &str) -> Result<&str, Error> {
        let index = self.find_file(name)?;
        Ok(&self.catalog.files[index].content)
    }

    // Enter edit mode on a file. Nothing is written until the content
    // arrives through `commit_edit`.
    pub fn begin_edit(&mut self, name: &str) -> Result<(), Error> {
        let index = self.find_file(name)?;
        self.edit = EditState::Editing(index);
        Ok(())
    }

    // The name of the file currently being edited, if any.
    pub fn edit_target(&self) -> Option<&str> {
        match self.edit {
            EditState::Editing(index) => self.catalog.files.get(index).map(|f| f.name.as_str()),
            EditState::Idle => None,
        }
    }

    // Commit the pending edit: overwrite the target's content and leave
    // edit mode. Fails when no edit is pending or the content overflows
    // its slot; a rejected commit keeps the edit pending.
    pub fn commit_edit(&mut self, content: &str) -> Result<(), Error> {
        let EditState::Editing(index) = self.edit else {
            return Err(Error::NotFound);
        };
        check_content(content)?;
        let Some(record) = self.catalog.files.get_mut(index) else {
            // The target was removed while the edit was pending.
            self.edit = EditState::Idle;
            return Err(Error::NotFound);
        };
        record.content = content.to_string();
        self.edit = EditState::Idle;
        self.persist()
    }

    // Create a directory, absolute or relative to the current one.
    // Duplicate paths are rejected; entry order is creation order.
    pub fn create_dir(&mut self, dir_path: &str) -> Result<(), Error> {
        if self.catalog.dir_count() == MAX_DIRS {
            return Err(Error::CapacityExceeded);
        }
        let canonical = self.resolve(dir_path);
        check_name(&canonical)?;
        if self.catalog.directories.contains(&canonical) {
            return Err(Error::AlreadyExists);
        }
        self.catalog.directories.push(canonical);
        self.persist()
    }

    // Remove a directory and everything below it: descendant files,
    // descendant directories, then the directory itself. Standing inside
    // the removed subtree moves the cursor back to root.
    pub fn remove_dir(&mut self, dir_path: &str) -> Result<(), Error> {
        let canonical = self.resolve(dir_path);
        if canonical == ROOT_DIR {
            return Err(Error::ForbiddenRoot);
        }
        if !self.catalog.directories.contains(&canonical) {
            return Err(Error::NotFound);
        }

        self.catalog
            .files
            .retain(|f| !path::is_descendant(&f.parent_dir, &canonical));
        self.catalog
            .directories
            .retain(|d| !path::is_descendant(d, &canonical));

        if path::is_descendant(&self.current_dir, &canonical) {
            debug!("current directory removed, jumping to {ROOT_DIR}");
            self.current_dir = ROOT_DIR.to_string();
        }
        self.persist()
    }

    // The original shell's `rm`: try a file in the current directory
    // first, then fall back to directory removal.
    pub fn remove_path(&mut self, target: &str) -> Result<(), Error> {
        match self.remove_file(target) {
            Err(Error::NotFound) => self.remove_dir(target),
            result => result,
        }
    }

    // Direct children of the current directory. An empty listing is a
    // valid result, not an error.
    pub fn list(&self) -> Listing {
        let dirs = self
            .catalog
            .directories
            .iter()
            .filter(|d| path::is_child(d, &self.current_dir))
            .map(|d| path::child_name(d, &self.current_dir).to_string())
            .collect();
        let files = self
            .catalog
            .files
            .iter()
            .filter(|f| f.parent_dir == self.current_dir)
            .map(|f| f.name.clone())
            .collect();
        Listing { dirs, files }
    }

    // Move the cursor. Root and ".." always resolve; anything else must
    // match a directory entry exactly. Moving the cursor does not touch
    // the device.
    pub fn change_dir(&mut self, dir_path: &str) -> Result<(), Error> {
        let canonical = self.resolve(dir_path);
        let via_dotdot = dir_path == ".." || dir_path == "/..";
        if via_dotdot || canonical == ROOT_DIR || self.catalog.directories.contains(&canonical) {
            self.current_dir = canonical;
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }
}

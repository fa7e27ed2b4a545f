//! The interactive menu loop.
//!
//! [`Controller`] turns menu choices into [`Directory`] and [`TxtStorage`]
//! calls and reports every outcome through a [`View`]. No action error ends
//! the session; it is reported and the menu is shown again. Ctrl-C cancels
//! the action in progress, or just redraws the menu; only the end of input
//! or option 8 ends the session.

use std::env;
use std::path::{Path, PathBuf};

use phonebook_store::{ContactStorage, Directory, StorageError, StoreError, TxtStorage};
use phonebook_types::ContactId;
use thiserror::Error;
use tracing::{debug, warn};

use crate::view::{View, ViewError};

const MENU: &[&str] = &[
    "Phonebook",
    "1. Open file",
    "2. Save file",
    "3. List all contacts",
    "4. Create contact",
    "5. Find contact",
    "6. Edit contact",
    "7. Delete contact",
    "8. Exit",
];

const YES: &[&str] = &["y", "yes", "д", "да"];
const NO: &[&str] = &["n", "no", "н", "нет"];

/// Why a single menu action stopped early.
#[derive(Debug, Error)]
enum ActionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("only .txt files are supported")]
    UnsupportedExtension,

    #[error("invalid ID")]
    InvalidId,

    #[error("operation cancelled")]
    Interrupted,

    #[error("input closed")]
    Closed,

    #[error("unexpected console error: {0}")]
    Console(std::io::Error),
}

impl From<StorageError> for ActionError {
    fn from(e: StorageError) -> Self {
        Self::Store(e.into())
    }
}

impl From<ViewError> for ActionError {
    fn from(e: ViewError) -> Self {
        match e {
            ViewError::Interrupted => Self::Interrupted,
            ViewError::Closed => Self::Closed,
            ViewError::Io(io) => Self::Console(io),
        }
    }
}

type ActionResult<T = ()> = Result<T, ActionError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuChoice {
    Open,
    Save,
    List,
    Create,
    Find,
    Edit,
    Delete,
    Exit,
}

impl MenuChoice {
    fn parse(raw: &str) -> Option<Self> {
        Some(match raw.trim() {
            "1" => Self::Open,
            "2" => Self::Save,
            "3" => Self::List,
            "4" => Self::Create,
            "5" => Self::Find,
            "6" => Self::Edit,
            "7" => Self::Delete,
            "8" => Self::Exit,
            _ => return None,
        })
    }
}

/// Drives one interactive session over a directory.
pub struct Controller<V> {
    view: V,
    directory: Directory,
    storage: Option<TxtStorage>,
}

impl<V: View> Controller<V> {
    pub fn new(view: V, directory: Directory) -> Self {
        Self {
            view,
            directory,
            storage: None,
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// The file that the next save writes to, if one has been chosen.
    pub fn opened_path(&self) -> Option<&Path> {
        self.storage.as_ref().map(|storage| storage.path())
    }

    #[cfg(test)]
    pub fn into_view(self) -> V {
        self.view
    }

    /// Open `path` as menu option 1 does, reporting the result.
    pub fn open_path(&mut self, path: &Path) {
        if let Err(e) = self.load_from(path) {
            self.report(e);
        }
    }

    /// Show the menu until the user exits or input is closed.
    pub fn run(&mut self) {
        loop {
            self.view.print_line("");
            for line in MENU {
                self.view.print_line(line);
            }
            let raw = match self.view.input_text("Choose a menu item: ") {
                Ok(raw) => raw,
                Err(ViewError::Interrupted) => {
                    self.view.notify("Choose 8 to exit.");
                    continue;
                }
                Err(ViewError::Closed) => {
                    if self.directory.is_dirty() {
                        warn!("input closed with unsaved changes");
                    }
                    break;
                }
                Err(ViewError::Io(e)) => {
                    warn!(error = %e, "console read failed; ending session");
                    break;
                }
            };

            let Some(choice) = MenuChoice::parse(&raw) else {
                self.view.error("Unknown menu option. Try again.");
                continue;
            };
            debug!(?choice, "menu action");

            if choice == MenuChoice::Exit {
                match self.confirm_exit() {
                    Ok(true) => {
                        self.view.notify("Goodbye!");
                        break;
                    }
                    Ok(false) => continue,
                    Err(e) => {
                        self.report(e);
                        continue;
                    }
                }
            }

            let outcome = match choice {
                MenuChoice::Open => self.open(),
                MenuChoice::Save => self.save(),
                MenuChoice::List => self.list(),
                MenuChoice::Create => self.create(),
                MenuChoice::Find => self.find(),
                MenuChoice::Edit => self.edit(),
                MenuChoice::Delete => self.delete(),
                MenuChoice::Exit => Ok(()),
            };
            if let Err(e) = outcome {
                self.report(e);
            }
        }
    }

    fn report(&mut self, err: ActionError) {
        match err {
            ActionError::Interrupted | ActionError::Closed => {
                self.view.print_line("Operation cancelled.")
            }
            ActionError::Console(e) => {
                warn!(error = %e, "console error during action");
                self.view.error("Unexpected error; the action was aborted.");
            }
            other => self.view.error(&other.to_string()),
        }
    }

    fn prompt(&mut self, prompt: &str) -> ActionResult<String> {
        Ok(self.view.input_text(prompt)?.trim().to_string())
    }

    /// Prompt for a field where empty input means "keep the current value".
    fn prompt_optional(&mut self, prompt: &str) -> ActionResult<Option<String>> {
        let value = self.prompt(prompt)?;
        Ok((!value.is_empty()).then_some(value))
    }

    fn ask_id(&mut self) -> ActionResult<ContactId> {
        let raw = self.prompt("Contact ID: ")?;
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ActionError::InvalidId);
        }
        raw.parse().map_err(|_| ActionError::InvalidId)
    }

    fn load_from(&mut self, path: &Path) -> ActionResult {
        let storage = TxtStorage::new(txt_path(path)?);
        let contacts = storage.load()?;
        let count = contacts.len();
        self.directory.replace_all(contacts);
        self.view.notify(&format!(
            "Loaded {count} contact(s) from '{}'.",
            storage.path().display()
        ));
        self.storage = Some(storage);
        Ok(())
    }

    fn open(&mut self) -> ActionResult {
        let raw = self.prompt("Path to file (.txt): ")?;
        self.load_from(Path::new(&raw))
    }

    fn save(&mut self) -> ActionResult {
        let storage = match self.storage.take() {
            Some(storage) => storage,
            None => {
                let raw = self.prompt("Path to save to (.txt): ")?;
                TxtStorage::new(txt_path(Path::new(&raw))?)
            }
        };
        let saved = storage.save(&self.directory.list());
        let path = storage.path().display().to_string();
        self.storage = Some(storage);
        saved?;
        self.directory.mark_clean();
        self.view.notify(&format!("Saved to '{path}'."));
        Ok(())
    }

    fn list(&mut self) -> ActionResult {
        let contacts = self.directory.list();
        self.view.show_contacts(&contacts);
        Ok(())
    }

    fn create(&mut self) -> ActionResult {
        let name = self.prompt("Name: ")?;
        let phone = self.prompt("Phone: ")?;
        let comment = self.prompt("Comment: ")?;
        let contact = self.directory.add(&name, &phone, &comment)?;
        self.view.notify(&format!("Added contact [{}].", contact.id));
        Ok(())
    }

    fn find(&mut self) -> ActionResult {
        self.view
            .notify("Search: enter a free-text query, or leave it empty to filter by field.");
        let query = self.prompt("Query (Enter to skip): ")?;
        let results = if query.is_empty() {
            let name = self.prompt("Name contains (Enter to skip): ")?;
            let phone = self.prompt("Phone contains (Enter to skip): ")?;
            let comment = self.prompt("Comment contains (Enter to skip): ")?;
            self.directory
                .search_by_fields(Some(&name), Some(&phone), Some(&comment))
        } else {
            self.directory.search(&query)
        };

        if results.is_empty() {
            self.view.notify("Nothing found.");
        } else {
            self.view.show_contacts(&results);
        }
        Ok(())
    }

    fn edit(&mut self) -> ActionResult {
        let id = self.ask_id()?;
        let existing = self.directory.get(id)?;
        self.view.notify(&format!(
            "Leave a field empty to keep it: {} | {} | {}",
            existing.name, existing.phone, existing.comment
        ));
        let name = self.prompt_optional("Name: ")?;
        let phone = self.prompt_optional("Phone: ")?;
        let comment = self.prompt_optional("Comment: ")?;
        self.directory
            .update(id, name.as_deref(), phone.as_deref(), comment.as_deref())?;
        self.view.notify("Contact updated.");
        Ok(())
    }

    fn delete(&mut self) -> ActionResult {
        let id = self.ask_id()?;
        self.directory.delete(id)?;
        self.view.notify("Contact deleted.");
        Ok(())
    }

    /// Returns `true` when the session may end.
    ///
    /// With unsaved changes the user must answer yes or no; a failed save
    /// keeps the session open.
    fn confirm_exit(&mut self) -> ActionResult<bool> {
        if !self.directory.is_dirty() {
            return Ok(true);
        }
        let answer = self
            .prompt("There are unsaved changes. Save them? (y/n): ")?
            .to_lowercase();
        if YES.contains(&answer.as_str()) {
            self.save()?;
            return Ok(true);
        }
        Ok(NO.contains(&answer.as_str()))
    }
}

/// Expand a leading `~`, make the path absolute, and require `.txt`.
fn txt_path(raw: &Path) -> ActionResult<PathBuf> {
    let expanded = expand_home(raw);
    let is_txt = expanded
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    if !is_txt {
        return Err(ActionError::UnsupportedExtension);
    }
    Ok(std::path::absolute(&expanded).unwrap_or(expanded))
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

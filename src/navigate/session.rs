//! Navigation session
//!
//! Tracks what the client is looking at and how it got there. Forward
//! transitions (entering the library, opening a folder or file) push the
//! previous state onto the history stack; back transitions restore a
//! frame verbatim and never push. Deleting the open file clears the whole
//! stack and lands on the deleted file's parent directory.

use crate::navigate::history::{EntryKind, HistoryStack, NavigationEntry};

/// The views the client can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Library,
    Upload,
    File,
}

/// State of one browsing session.
///
/// Lives for the page's lifetime only; nothing here is persisted.
#[derive(Debug)]
pub struct NavigationSession {
    virtual_root: String,
    current_path: String,
    current_file: Option<String>,
    view: View,
    auth_token: Option<String>,
    history: HistoryStack,
    current_entry: Option<NavigationEntry>,
    edit_draft: Option<String>,
}

impl NavigationSession {
    pub fn new(virtual_root: &str) -> Self {
        Self {
            virtual_root: virtual_root.to_string(),
            current_path: virtual_root.to_string(),
            current_file: None,
            view: View::Home,
            auth_token: None,
            history: HistoryStack::default(),
            current_entry: None,
            edit_draft: None,
        }
    }

    // --------------------
    // Getters
    // --------------------

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_admin(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn is_editing(&self) -> bool {
        self.edit_draft.is_some()
    }

    // --------------------
    // View transitions
    // --------------------

    /// Return to the landing view. Does not touch history.
    pub fn enter_home(&mut self) {
        self.view = View::Home;
    }

    /// Enter the library at its root without recording a frame
    pub fn enter_library(&mut self) {
        self.navigate_to_folder(&self.virtual_root.clone(), false);
    }

    /// Open the upload view. Gated on a successful login.
    pub fn enter_upload(&mut self) -> bool {
        if !self.is_admin() {
            return false;
        }
        self.view = View::Upload;
        true
    }

    /// Show a folder listing. `push` records the previous state for back
    /// navigation; back transitions themselves pass `false`.
    pub fn navigate_to_folder(&mut self, path: &str, push: bool) {
        if push {
            if let Some(previous) = self.current_entry.clone() {
                self.history.push(previous);
            }
        }

        self.current_path = path.to_string();
        self.current_file = None;
        self.view = View::Library;
        self.edit_draft = None;
        self.current_entry = Some(NavigationEntry {
            kind: EntryKind::Folder,
            path: self.current_path.clone(),
            view: View::Library,
        });
    }

    /// Show a file. The caller fetches content separately.
    pub fn open_file(&mut self, path: &str, push: bool) {
        if push {
            if let Some(previous) = self.current_entry.clone() {
                self.history.push(previous);
            }
        }

        self.current_file = Some(path.to_string());
        self.view = View::File;
        self.edit_draft = None;
        self.current_entry = Some(NavigationEntry {
            kind: EntryKind::File,
            path: path.to_string(),
            view: View::File,
        });
    }

    /// Pop the most recent frame and restore it verbatim.
    ///
    /// Returns the restored frame so the caller can re-fetch its listing
    /// or content. An empty stack falls back to the library root and
    /// returns None.
    pub fn go_back(&mut self) -> Option<NavigationEntry> {
        match self.history.pop() {
            Some(previous) => {
                match previous.kind {
                    EntryKind::Folder => self.navigate_to_folder(&previous.path, false),
                    EntryKind::File => self.open_file(&previous.path, false),
                }
                Some(previous)
            }
            None => {
                self.enter_library();
                None
            }
        }
    }

    /// Record that the open file was deleted: the whole history is
    /// dropped and the session lands on the file's parent directory.
    /// Returns the parent path the caller should list.
    pub fn file_deleted(&mut self) -> String {
        let parent = self
            .current_file
            .as_deref()
            .map(|file| parent_path(file, &self.virtual_root))
            .unwrap_or_else(|| self.virtual_root.clone());

        self.history.clear();
        self.current_entry = None;
        self.navigate_to_folder(&parent, false);
        parent
    }

    // --------------------
    // Admin and edit flow
    // --------------------

    /// Store the token a successful server login returned
    pub fn grant_admin(&mut self, token: String) {
        self.auth_token = Some(token);
    }

    /// Snapshot the displayed text before editing begins
    pub fn begin_edit(&mut self, displayed: &str) {
        self.edit_draft = Some(displayed.to_string());
    }

    /// Drop the draft after a successful save; the saved content is
    /// already on screen, no re-fetch needed
    pub fn commit_edit(&mut self) {
        self.edit_draft = None;
    }

    /// Abandon the draft, returning the snapshot to display again
    pub fn cancel_edit(&mut self) -> Option<String> {
        self.edit_draft.take()
    }
}

/// Parent directory of a virtual path, never above the root
pub fn parent_path(path: &str, virtual_root: &str) -> String {
    match path.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => parent.to_string(),
        _ => virtual_root.to_string(),
    }
}

/// Breadcrumb model: one (name, cumulative path) pair per segment
pub fn breadcrumb_segments(path: &str) -> Vec<(String, String)> {
    let mut segments = Vec::new();
    let mut cumulative = String::new();

    for part in path.split('/').filter(|p| !p.is_empty()) {
        if !cumulative.is_empty() {
            cumulative.push('/');
        }
        cumulative.push_str(part);
        segments.push((part.to_string(), cumulative.clone()));
    }

    segments
}

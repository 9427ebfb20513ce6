//! View/edit state for a single contact.

use crate::contact::Contact;

/// Editing state for one contact: the committed value plus a draft.
///
/// The session never touches a store. Committing returns the updated
/// contact and the caller applies it, e.g. with
/// [`ContactStore::update`](crate::core::store::ContactStore::update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    contact: Contact,
    draft: Contact,
    editing: bool,
}

impl EditSession {
    /// Starts a session on `contact`, optionally already in editing mode.
    pub fn new(contact: Contact, editing: bool) -> Self {
        Self {
            draft: contact.clone(),
            contact,
            editing,
        }
    }

    /// Last committed value.
    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    /// Value being edited.
    pub fn draft(&self) -> &Contact {
        &self.draft
    }

    /// Mutable access to the draft. Field setters still trim.
    pub fn draft_mut(&mut self) -> &mut Contact {
        &mut self.draft
    }

    /// Whether the session is in editing mode.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// True when the draft differs from the committed value.
    pub fn has_changes(&self) -> bool {
        self.contact != self.draft
    }

    /// Enters editing mode with the draft reset to the committed value.
    pub fn start_editing(&mut self) {
        self.draft = self.contact.clone();
        self.editing = true;
    }

    /// Leaves editing mode. The draft is reset on the next
    /// [`start_editing`](Self::start_editing).
    pub fn cancel_editing(&mut self) {
        self.editing = false;
    }

    /// Commits the draft and leaves editing mode.
    ///
    /// Returns the committed contact when it changed, which is what the
    /// caller should write back to its store.
    pub fn save_changes(&mut self) -> Option<Contact> {
        self.editing = false;
        if !self.has_changes() {
            return None;
        }
        self.contact = self.draft.clone();
        Some(self.contact.clone())
    }

    /// Edit/Done toggle: saves when editing, otherwise starts editing.
    pub fn edit_button_pressed(&mut self) -> Option<Contact> {
        if self.editing {
            self.save_changes()
        } else {
            self.start_editing();
            None
        }
    }
}

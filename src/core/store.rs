use std::collections::BTreeSet;

use hashbrown::HashMap;
use log::{debug, error, warn};

use crate::{
    contact::{Contact, ContactPatch},
    persist::{self, ContactSink, PersistResult},
    types::ContactId,
};

use super::sorted::insertion_index_by;

/// Errors returned by [`ContactStore`] mutations. A failed mutation leaves
/// the store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No contact has this id.
    #[error("no contact with id {0}")]
    MissingContact(ContactId),
    /// A contact with this id is already stored.
    #[error("contact {0} already exists")]
    AlreadyExists(ContactId),
    /// A removal position is past the end of the sequence.
    #[error("position {index} out of range for {len} contacts")]
    IndexOutOfRange {
        /// Offending position.
        index: usize,
        /// Sequence length at the time of the call.
        len: usize,
    },
    /// A bulk load contained the same id twice.
    #[error("duplicate contact id {0}")]
    DuplicateIds(ContactId),
}

/// Contacts kept in (last name, first name) order with O(1) lookup by id.
#[derive(Debug, Default)]
pub struct ContactStore {
    contacts: Vec<Contact>,
    pos: HashMap<ContactId, usize>,
    dirty: bool,
}

impl ContactStore {
    /// Creates an empty, clean store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `contacts` in any order.
    ///
    /// The result is sorted and marked dirty, since nothing says these
    /// contacts have been persisted.
    pub fn from_contacts(contacts: Vec<Contact>) -> Result<Self, StoreError> {
        let mut store = Self {
            contacts,
            ..Self::default()
        };
        store.sort();
        if let Some(dup) = store.first_duplicate() {
            return Err(StoreError::DuplicateIds(dup));
        }
        store.dirty = !store.contacts.is_empty();
        Ok(store)
    }

    /// Loads the store from `sink`, falling back to an empty store.
    ///
    /// A missing, unreadable, or malformed source is logged and yields an
    /// empty store.
    pub fn load(sink: &dyn ContactSink) -> Self {
        match Self::try_load(sink) {
            Ok(store) => store,
            Err(err) => {
                warn!("starting with no contacts, load failed: {err}");
                Self::new()
            }
        }
    }

    /// Loads the store from `sink`, reporting why a load failed.
    ///
    /// A sink with nothing saved yet is not an error and yields an empty
    /// store.
    pub fn try_load(sink: &dyn ContactSink) -> PersistResult<Self> {
        match sink.read_bytes()? {
            Some(bytes) => Self::from_json(&bytes),
            None => {
                debug!("no persisted contacts found");
                Ok(Self::new())
            }
        }
    }

    /// Decodes a JSON contact array into a clean, sorted store.
    pub fn from_json(bytes: &[u8]) -> PersistResult<Self> {
        let contacts = persist::decode_contacts(bytes)?;
        let mut store = Self::from_contacts(contacts)?;
        store.dirty = false;
        debug!("loaded {} contacts ({} bytes)", store.len(), bytes.len());
        Ok(store)
    }

    /// Encodes the full sequence as a JSON array, in sorted order.
    pub fn to_json(&self) -> PersistResult<Vec<u8>> {
        persist::encode_contacts(&self.contacts)
    }

    /// Writes every contact to `sink`.
    ///
    /// Failures are logged and returned. The contacts are untouched either
    /// way; the store is only marked clean on success.
    pub fn save(&mut self, sink: &mut dyn ContactSink) -> PersistResult<()> {
        let res = self.to_json().and_then(|bytes| {
            sink.write_bytes(&bytes)?;
            Ok(bytes.len())
        });
        self.finish_save(res)
    }

    /// Records the outcome of writing [`ContactStore::to_json`] output.
    ///
    /// `written` is the byte count on success. Success marks the store
    /// clean; failure is logged and handed back with the store untouched.
    pub fn finish_save(&mut self, written: PersistResult<usize>) -> PersistResult<()> {
        match written {
            Ok(written) => {
                debug!("saved {} contacts ({written} bytes)", self.len());
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                error!("saving contacts failed: {err}");
                Err(err)
            }
        }
    }

    /// Inserts `contact` at its sorted position and returns that position.
    pub fn insert(&mut self, contact: Contact) -> Result<usize, StoreError> {
        let id = contact.id();
        if self.pos.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }

        let index = insertion_index_by(&self.contacts, &contact, Contact::compare);
        self.contacts.insert(index, contact);
        self.reindex_from(index);
        self.dirty = true;
        Ok(index)
    }

    /// Replaces the stored contact with the same id, re-sorts, and returns
    /// its new position.
    pub fn update(&mut self, contact: Contact) -> Result<usize, StoreError> {
        let id = contact.id();
        let index = self.position(id).ok_or(StoreError::MissingContact(id))?;
        self.contacts[index] = contact;
        self.resort_after_change(id)
    }

    /// Applies `patch` to the contact with `id`, re-sorts, and returns its
    /// new position.
    pub fn patch(&mut self, id: ContactId, patch: &ContactPatch) -> Result<usize, StoreError> {
        let index = self.position(id).ok_or(StoreError::MissingContact(id))?;
        patch.apply_to(&mut self.contacts[index]);
        self.resort_after_change(id)
    }

    /// Removes the contacts at `positions` of the current sequence in one
    /// step and returns them in their former order.
    pub fn remove_at(&mut self, positions: &BTreeSet<usize>) -> Result<Vec<Contact>, StoreError> {
        let len = self.contacts.len();
        if let Some(&index) = positions.last().filter(|&&i| i >= len) {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        if positions.is_empty() {
            return Ok(Vec::new());
        }

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.contacts)
            .into_iter()
            .enumerate()
            .partition(|(i, _)| positions.contains(i));
        self.contacts = kept.into_iter().map(|(_, c)| c).collect();

        let removed: Vec<Contact> = removed.into_iter().map(|(_, c)| c).collect();
        for contact in &removed {
            self.pos.remove(&contact.id());
        }
        self.reindex_from(0);
        self.dirty = true;
        Ok(removed)
    }

    /// Removes the contact with `id`.
    pub fn remove(&mut self, id: ContactId) -> Result<Contact, StoreError> {
        let index = self.pos.remove(&id).ok_or(StoreError::MissingContact(id))?;
        let contact = self.contacts.remove(index);
        self.reindex_from(index);
        self.dirty = true;
        Ok(contact)
    }

    /// Stable re-sort of the whole sequence. Idempotent.
    pub fn sort(&mut self) {
        self.contacts.sort_by(Contact::compare);
        self.reindex_from(0);
    }

    /// Looks up a contact by id.
    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.position(id).map(|i| &self.contacts[i])
    }

    /// Current position of `id` in sorted order.
    pub fn position(&self, id: ContactId) -> Option<usize> {
        self.pos.get(&id).copied()
    }

    /// All contacts in sorted order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Iterates contacts in sorted order.
    pub fn iter(&self) -> std::slice::Iter<'_, Contact> {
        self.contacts.iter()
    }

    /// Clones all contacts in sorted order.
    pub fn export(&self) -> Vec<Contact> {
        self.contacts.clone()
    }

    /// Number of stored contacts.
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// True when no contacts are stored.
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// True when the store changed since it was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn resort_after_change(&mut self, id: ContactId) -> Result<usize, StoreError> {
        self.sort();
        self.dirty = true;
        self.position(id).ok_or(StoreError::MissingContact(id))
    }

    fn reindex_from(&mut self, start: usize) {
        for (idx, contact) in self.contacts.iter().enumerate().skip(start) {
            self.pos.insert(contact.id(), idx);
        }
    }

    fn first_duplicate(&self) -> Option<ContactId> {
        if self.pos.len() == self.contacts.len() {
            return None;
        }
        let mut seen = hashbrown::HashSet::with_capacity(self.contacts.len());
        self.contacts
            .iter()
            .map(Contact::id)
            .find(|id| !seen.insert(*id))
    }
}

impl<'a> IntoIterator for &'a ContactStore {
    type Item = &'a Contact;
    type IntoIter = std::slice::Iter<'a, Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

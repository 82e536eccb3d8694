//! Local study notes, persisted in the same store as the session.

use crate::error::{AppError, Result};
use crate::models::Note;
use crate::store::{keys, KeyValueStore, StoreError};
use chrono::Utc;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct NoteBook {
    store: Arc<dyn KeyValueStore>,
    /// Serializes load-modify-save cycles
    write_lock: Arc<Mutex<()>>,
}

impl NoteBook {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn list(&self) -> Result<Vec<Note>> {
        match self.store.get(keys::NOTES)? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
                .map_err(|e| AppError::Store(StoreError::Corrupt(format!("notes: {}", e)))),
            _ => Ok(Vec::new()),
        }
    }

    pub fn add(&self, title: &str, content: &str) -> Result<Note> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Note title is required".to_string()));
        }

        self.modify(|notes| {
            let next_id = notes
                .iter()
                .filter_map(|n| n.id.parse::<u64>().ok())
                .max()
                .unwrap_or(0)
                + 1;
            let now = Utc::now();
            let note = Note {
                id: next_id.to_string(),
                title: title.to_string(),
                content: content.to_string(),
                completed: false,
                created_at: now,
                updated_at: now,
            };
            notes.push(note.clone());
            Ok(note)
        })
    }

    pub fn edit(&self, id: &str, title: Option<&str>, content: Option<&str>) -> Result<Note> {
        if let Some(t) = title {
            if t.trim().is_empty() {
                return Err(AppError::Validation("Note title is required".to_string()));
            }
        }
        self.update(id, |note| {
            if let Some(t) = title {
                note.title = t.trim().to_string();
            }
            if let Some(c) = content {
                note.content = c.to_string();
            }
        })
    }

    pub fn set_completed(&self, id: &str, completed: bool) -> Result<Note> {
        self.update(id, |note| note.completed = completed)
    }

    pub fn toggle(&self, id: &str) -> Result<Note> {
        self.update(id, |note| note.completed = !note.completed)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.modify(|notes| {
            let before = notes.len();
            notes.retain(|n| n.id != id);
            if notes.len() == before {
                return Err(AppError::NotFound(format!("Note {}", id)));
            }
            Ok(())
        })
    }

    fn update(&self, id: &str, change: impl FnOnce(&mut Note)) -> Result<Note> {
        self.modify(|notes| {
            let note = notes
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Note {}", id)))?;
            change(note);
            note.updated_at = Utc::now();
            Ok(note.clone())
        })
    }

    fn modify<T>(&self, change: impl FnOnce(&mut Vec<Note>) -> Result<T>) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Store(StoreError::Poisoned))?;
        let mut notes = self.list()?;
        let out = change(&mut notes)?;
        let json = serde_json::to_string(&notes)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode notes: {}", e)))?;
        self.store.set(keys::NOTES, &json)?;
        Ok(out)
    }
}

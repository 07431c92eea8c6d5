//! Bible reading progress

use crate::store::{PersistedSlice, PersistedStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Where the reader left off and which chapters have been read,
/// persisted under `bible-storage`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingProgress {
    /// Book of the last opened chapter
    pub last_read_book: Option<String>,
    /// Last opened chapter
    pub last_read_chapter: Option<u32>,
    /// Read chapters per book, ascending and unique
    pub reading_progress: BTreeMap<String, BTreeSet<u32>>,
}

impl ReadingProgress {
    /// Record the chapter being read; it also counts as read
    pub fn set_last_read(&mut self, book: &str, chapter: u32) {
        self.last_read_book = Some(book.to_string());
        self.last_read_chapter = Some(chapter);
        self.mark_chapter_as_read(book, chapter);
    }

    /// Mark a chapter as read. Returns `false` if it already was.
    pub fn mark_chapter_as_read(&mut self, book: &str, chapter: u32) -> bool {
        self.reading_progress.entry(book.to_string()).or_default().insert(chapter)
    }

    /// Remove a chapter from the read set. Returns `false` if it was not read.
    pub fn unmark_chapter(&mut self, book: &str, chapter: u32) -> bool {
        let Some(chapters) = self.reading_progress.get_mut(book) else {
            return false;
        };
        let removed = chapters.remove(&chapter);
        if chapters.is_empty() {
            self.reading_progress.remove(book);
        }
        removed
    }

    /// Whether `chapter` of `book` has been read
    pub fn is_chapter_read(&self, book: &str, chapter: u32) -> bool {
        self.reading_progress
            .get(book)
            .is_some_and(|chapters| chapters.contains(&chapter))
    }

    /// Read chapters of `book`, ascending
    pub fn read_chapters(&self, book: &str) -> Vec<u32> {
        self.reading_progress
            .get(book)
            .map(|chapters| chapters.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Fraction of `book` read, given its chapter count.
    ///
    /// Chapters outside `1..=total_chapters` are not counted.
    pub fn book_completion(&self, book: &str, total_chapters: u32) -> f32 {
        if total_chapters == 0 {
            return 0.0;
        }

        let read = self
            .reading_progress
            .get(book)
            .map(|chapters| chapters.range(1..=total_chapters).count())
            .unwrap_or(0);

        read as f32 / total_chapters as f32
    }

    /// Forget everything
    pub fn clear_progress(&mut self) {
        *self = Self::default();
    }
}

impl PersistedSlice for ReadingProgress {
    type Snapshot = ReadingProgress;
    const STORAGE_KEY: &'static str = "bible-storage";

    fn partialize(&self) -> ReadingProgress {
        self.clone()
    }

    fn merge(&mut self, snapshot: ReadingProgress) {
        *self = snapshot;
    }
}

/// Reading progress store
pub type ReadingStore = PersistedStore<ReadingProgress>;

impl PersistedStore<ReadingProgress> {
    /// Record the chapter being read; it also counts as read
    pub fn set_last_read(&self, book: &str, chapter: u32) {
        self.update(|s| s.set_last_read(book, chapter));
    }

    /// Mark a chapter as read. Returns `false` if it already was.
    pub fn mark_chapter_as_read(&self, book: &str, chapter: u32) -> bool {
        self.update_if(|s| s.mark_chapter_as_read(book, chapter))
    }

    /// Remove a chapter from the read set
    pub fn unmark_chapter(&self, book: &str, chapter: u32) -> bool {
        self.update_if(|s| s.unmark_chapter(book, chapter))
    }

    /// Whether `chapter` of `book` has been read
    pub fn is_chapter_read(&self, book: &str, chapter: u32) -> bool {
        self.with(|s| s.is_chapter_read(book, chapter))
    }

    /// Read chapters of `book`, ascending
    pub fn read_chapters(&self, book: &str) -> Vec<u32> {
        self.with(|s| s.read_chapters(book))
    }

    /// Fraction of `book` read
    pub fn book_completion(&self, book: &str, total_chapters: u32) -> f32 {
        self.with(|s| s.book_completion(book, total_chapters))
    }

    /// Forget everything, keeping the key
    pub fn clear_progress(&self) {
        self.update(ReadingProgress::clear_progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::open_hydrated;
    use storage::{KeyValueStore, MemoryKvStore};

    #[test]
    fn test_mark_sorted_and_deduplicated() {
        let mut progress = ReadingProgress::default();
        assert!(progress.mark_chapter_as_read("genesis", 3));
        assert!(progress.mark_chapter_as_read("genesis", 1));
        assert!(!progress.mark_chapter_as_read("genesis", 3));

        assert_eq!(progress.read_chapters("genesis"), vec![1, 3]);
    }

    #[test]
    fn test_set_last_read_marks_chapter() {
        let mut progress = ReadingProgress::default();
        progress.set_last_read("genesis", 5);

        assert!(progress.is_chapter_read("genesis", 5));
        assert_eq!(progress.last_read_book.as_deref(), Some("genesis"));
        assert_eq!(progress.last_read_chapter, Some(5));
    }

    #[test]
    fn test_unmark() {
        let mut progress = ReadingProgress::default();
        progress.mark_chapter_as_read("ruth", 2);
        assert!(progress.unmark_chapter("ruth", 2));
        assert!(!progress.unmark_chapter("ruth", 2));
        assert!(!progress.reading_progress.contains_key("ruth"));
    }

    #[test]
    fn test_book_completion() {
        let mut progress = ReadingProgress::default();
        for chapter in [1, 2, 3, 99] {
            progress.mark_chapter_as_read("ruth", chapter);
        }
        assert_eq!(progress.book_completion("ruth", 4), 0.75);
        assert_eq!(progress.book_completion("ruth", 0), 0.0);
        assert_eq!(progress.book_completion("jude", 1), 0.0);
    }

    #[test]
    fn test_serialized_shape() {
        let mut progress = ReadingProgress::default();
        progress.mark_chapter_as_read("genesis", 3);
        progress.mark_chapter_as_read("genesis", 1);

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["readingProgress"]["genesis"], serde_json::json!([1, 3]));
        assert!(json["lastReadBook"].is_null());
    }

    #[test]
    fn test_unsorted_duplicate_input_is_normalized() {
        let progress: ReadingProgress =
            serde_json::from_str(r#"{"readingProgress":{"john":[4,2,4,1]}}"#).unwrap();
        assert_eq!(progress.read_chapters("john"), vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn test_progress_survives_reload() {
        let kv = MemoryKvStore::new();

        let store = open_hydrated::<ReadingProgress>(&kv).await;
        store.set_last_read("psalms", 23);
        store.mark_chapter_as_read("psalms", 1);
        store.flush().await;

        let reloaded = open_hydrated::<ReadingProgress>(&kv).await;
        assert_eq!(reloaded.read_chapters("psalms"), vec![1, 23]);
        assert_eq!(reloaded.get().last_read_chapter, Some(23));
    }

    #[tokio::test]
    async fn test_marking_read_chapter_writes_nothing() {
        let kv = MemoryKvStore::new();
        let store = open_hydrated::<ReadingProgress>(&kv).await;

        assert!(store.mark_chapter_as_read("ruth", 1));
        store.flush().await;
        assert!(kv.raw("bible-storage").is_some());

        kv.remove_item("bible-storage").await.unwrap();
        assert!(!store.mark_chapter_as_read("ruth", 1));
        assert!(!store.unmark_chapter("ruth", 2));
        store.flush().await;

        assert!(kv.raw("bible-storage").is_none());
        assert!(store.is_chapter_read("ruth", 1));
    }

    #[tokio::test]
    async fn test_clear_progress() {
        let store = ReadingStore::detached();
        store.set_last_read("mark", 1);
        store.clear_progress();
        assert_eq!(store.get(), ReadingProgress::default());
    }
}

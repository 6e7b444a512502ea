//! # Todo Store
//!
//! Single source of truth for the task list. Mutations update the
//! in-memory list and persist it before returning; reminder work is queued
//! to a background worker that talks to the [`ReminderScheduler`] and
//! writes the resulting notification id back into the list.
//!
//! The list mutex is the store's one coordination context: every
//! read-modify-write and the persist that follows happen while holding it,
//! so the file on disk always reflects the latest in-memory mutation.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::{ValidationError, DEFAULT_EMOJI};
use crate::features::reminders::ReminderScheduler;
use crate::features::todos::item::{normalize_emoji, normalize_title, TodoItem};
use crate::features::todos::persistence::{MemoryRepository, TodoRepository};
use crate::features::todos::reconcile::ReminderAction;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use uuid::Uuid;

/// Work handed to the reminder worker
#[derive(Debug)]
enum ReminderJob {
    /// Align the item's reminder with its current due date
    Reconcile(Uuid),
    /// Fire-and-forget cancellation of a reminder the list no longer references
    Cancel(String),
    /// Answered once every earlier job is done
    Flush(oneshot::Sender<()>),
}

struct Shared {
    items: Mutex<Vec<TodoItem>>,
    repository: Arc<dyn TodoRepository>,
    snapshot: watch::Sender<Vec<TodoItem>>,
}

impl Shared {
    /// Persist and publish the list. Write failures are logged and swallowed.
    async fn commit(&self, items: &[TodoItem]) {
        if let Err(e) = self.repository.save(items).await {
            warn!("💾 Failed to persist todo list: {}", e);
        }
        self.snapshot.send_replace(items.to_vec());
    }

    async fn find(&self, id: Uuid) -> Option<TodoItem> {
        self.items.lock().await.iter().find(|i| i.id == id).cloned()
    }

    /// Run the reconciliation for one item until its reminder matches the
    /// due date and completion state it had when the scheduler was asked.
    async fn reconcile(&self, scheduler: &dyn ReminderScheduler, id: Uuid) {
        loop {
            let Some(item) = self.find(id).await else {
                debug!("Item {} is gone; nothing to reconcile", id);
                return;
            };

            let notification_id = match ReminderAction::plan(&item, Utc::now()) {
                ReminderAction::Schedule {
                    existing_id,
                    title,
                    fire_at,
                } => match scheduler.schedule(existing_id.as_deref(), &title, fire_at).await {
                    Ok(nid) => {
                        debug!("⏰ Reminder {} armed for '{}'", nid, item.title);
                        Some(nid)
                    }
                    Err(e) => {
                        warn!("Could not schedule reminder for '{}': {}", item.title, e);
                        existing_id
                    }
                },
                ReminderAction::Cancel { notification_id } => {
                    scheduler.cancel(&notification_id).await;
                    debug!("🔕 Reminder {} cancelled for '{}'", notification_id, item.title);
                    None
                }
                ReminderAction::NoOp => None,
            };

            let mut items = self.items.lock().await;
            let position = items.iter().position(|i| i.id == id);
            let Some(idx) = position else {
                // Deleted while the scheduler was busy: drop the alarm, keep it deleted
                drop(items);
                if let Some(nid) = notification_id {
                    scheduler.cancel(&nid).await;
                }
                return;
            };

            let current = &mut items[idx];
            current.notification_id = notification_id;
            let settled =
                current.due_date == item.due_date && current.is_completed == item.is_completed;
            self.commit(&items).await;
            if settled {
                return;
            }
        }
    }
}

async fn run_reminder_worker(
    shared: Arc<Shared>,
    scheduler: Arc<dyn ReminderScheduler>,
    mut jobs: mpsc::UnboundedReceiver<ReminderJob>,
) {
    while let Some(job) = jobs.recv().await {
        match job {
            ReminderJob::Reconcile(id) => shared.reconcile(scheduler.as_ref(), id).await,
            ReminderJob::Cancel(notification_id) => {
                scheduler.cancel(&notification_id).await;
                debug!("🔕 Reminder {} cancelled", notification_id);
            }
            ReminderJob::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Reminder worker stopped");
}

/// Handle to the task list. Clones share the same list and worker.
#[derive(Clone)]
pub struct TodoStore {
    shared: Arc<Shared>,
    jobs: mpsc::UnboundedSender<ReminderJob>,
    placeholder_emoji: String,
}

impl TodoStore {
    /// Load the persisted list and start the reminder worker.
    ///
    /// A missing or unreadable snapshot yields an empty list.
    pub async fn open(
        repository: Arc<dyn TodoRepository>,
        scheduler: Arc<dyn ReminderScheduler>,
    ) -> Self {
        let items = match repository.load().await {
            Ok(items) => {
                info!("📂 Loaded {} todo items", items.len());
                items
            }
            Err(e) if e.is_not_found() => {
                debug!("No saved todo list yet, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!("Could not load todo list, starting empty: {}", e);
                Vec::new()
            }
        };
        Self::with_items(items, repository, scheduler)
    }

    /// Start from an explicit list and queue a reconciliation for every item
    /// that has a due date or a saved reminder id. Must be called inside a
    /// tokio runtime.
    pub fn with_items(
        items: Vec<TodoItem>,
        repository: Arc<dyn TodoRepository>,
        scheduler: Arc<dyn ReminderScheduler>,
    ) -> Self {
        let items = dedupe(items);
        let (snapshot, _) = watch::channel(items.clone());
        let shared = Arc::new(Shared {
            items: Mutex::new(items),
            repository,
            snapshot,
        });

        let (jobs, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_reminder_worker(shared.clone(), scheduler, rx));

        let store = Self {
            shared,
            jobs,
            placeholder_emoji: DEFAULT_EMOJI.to_string(),
        };

        // Saved reminder ids only mean something to the scheduler that issued
        // them, so every item with reminder state is re-armed or cleared.
        let stale: Vec<Uuid> = store
            .items()
            .iter()
            .filter(|i| i.due_date.is_some() || i.notification_id.is_some())
            .map(|i| i.id)
            .collect();
        if !stale.is_empty() {
            debug!("Re-arming reminders for {} loaded items", stale.len());
        }
        for id in stale {
            store.enqueue(ReminderJob::Reconcile(id));
        }
        store
    }

    /// In-memory store with a few sample items
    pub fn preview(scheduler: Arc<dyn ReminderScheduler>) -> Self {
        let now = Utc::now();
        let items = vec![
            TodoItem::new("Try out the todo list", "✅", Some(now + Duration::hours(1))),
            TodoItem::new("Buy groceries", "🛒", None),
            TodoItem::new("Read for 30 minutes", "📚", Some(now + Duration::hours(2))),
        ];
        Self::with_items(items, Arc::new(MemoryRepository::new()), scheduler)
    }

    /// Emoji used when an item is added or edited without one
    pub fn with_placeholder_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.placeholder_emoji = emoji.into();
        self
    }

    // ========================================================================
    // Read side
    // ========================================================================

    /// Current list in insertion order
    pub fn items(&self) -> Vec<TodoItem> {
        self.shared.snapshot.borrow().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<TodoItem> {
        self.shared
            .snapshot
            .borrow()
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    /// Receiver that is notified after every mutation, including
    /// reconciliations finishing in the background
    pub fn subscribe(&self) -> watch::Receiver<Vec<TodoItem>> {
        self.shared.snapshot.subscribe()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new item. Its reminder is armed in the background.
    pub async fn add(
        &self,
        title: &str,
        emoji: Option<&str>,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<TodoItem, ValidationError> {
        let title = normalize_title(title)?;
        let item = TodoItem::new(title, normalize_emoji(emoji, &self.placeholder_emoji), due_date);

        {
            let mut items = self.shared.items.lock().await;
            items.push(item.clone());
            self.shared.commit(&items).await;
        }
        debug!("➕ Added '{}' ({})", item.title, item.id);

        self.enqueue(ReminderJob::Reconcile(item.id));
        Ok(item)
    }

    /// Replace the item with the same id, or append it when the id is
    /// unknown. The reminder handle already held by the store is kept so
    /// the scheduler can replace the old alarm.
    pub async fn update(&self, item: TodoItem) -> Result<TodoItem, ValidationError> {
        let title = normalize_title(&item.title)?;
        let emoji = normalize_emoji(Some(&item.emoji), &self.placeholder_emoji);
        let mut updated = TodoItem {
            title,
            emoji,
            ..item
        };

        {
            let mut items = self.shared.items.lock().await;
            match items.iter().position(|i| i.id == updated.id) {
                Some(idx) => {
                    updated.notification_id = items[idx].notification_id.clone();
                    items[idx] = updated.clone();
                }
                None => {
                    debug!("Update for unknown item {}, inserting it", updated.id);
                    items.push(updated.clone());
                }
            }
            self.shared.commit(&items).await;
        }
        debug!("✏️ Updated '{}' ({})", updated.title, updated.id);

        self.enqueue(ReminderJob::Reconcile(updated.id));
        Ok(updated)
    }

    /// Flip completion. Completing drops the reminder right away; reopening
    /// an item that is still due in the future re-arms it.
    pub async fn toggle_complete(&self, id: Uuid) -> Option<TodoItem> {
        let (toggled, job) = {
            let mut items = self.shared.items.lock().await;
            let item = items.iter_mut().find(|i| i.id == id)?;
            item.is_completed = !item.is_completed;

            let job = if item.is_completed {
                item.notification_id.take().map(ReminderJob::Cancel)
            } else if item.is_due_after(Utc::now()) {
                Some(ReminderJob::Reconcile(id))
            } else {
                None
            };

            let toggled = item.clone();
            self.shared.commit(&items).await;
            (toggled, job)
        };

        if let Some(job) = job {
            self.enqueue(job);
        }
        Some(toggled)
    }

    /// Remove one item by id
    pub async fn delete(&self, id: Uuid) -> Option<TodoItem> {
        self.delete_where(|item| item.id == id).await.into_iter().next()
    }

    /// Remove every item matching `predicate` and cancel their reminders
    pub async fn delete_where<F>(&self, predicate: F) -> Vec<TodoItem>
    where
        F: Fn(&TodoItem) -> bool,
    {
        let removed = {
            let mut items = self.shared.items.lock().await;
            let (removed, kept): (Vec<TodoItem>, Vec<TodoItem>) =
                items.drain(..).partition(|item| predicate(item));
            *items = kept;
            if !removed.is_empty() {
                self.shared.commit(&items).await;
            }
            removed
        };

        for item in &removed {
            debug!("🗑️ Deleted '{}' ({})", item.title, item.id);
            if let Some(nid) = &item.notification_id {
                self.enqueue(ReminderJob::Cancel(nid.clone()));
            }
        }
        removed
    }

    /// Resolves once every reminder job queued before this call is done
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.jobs.send(ReminderJob::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    fn enqueue(&self, job: ReminderJob) {
        if let Err(e) = self.jobs.send(job) {
            warn!("Reminder worker is not running, dropping {:?}", e.0);
        }
    }
}

/// Keep the first record for every id
fn dedupe(items: Vec<TodoItem>) -> Vec<TodoItem> {
    let mut seen = HashSet::new();
    let total = items.len();
    let unique: Vec<TodoItem> = items.into_iter().filter(|i| seen.insert(i.id)).collect();
    if unique.len() != total {
        warn!("Dropped {} duplicate todo records", total - unique.len());
    }
    unique
}

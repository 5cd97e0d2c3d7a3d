use std::sync::{Mutex, MutexGuard};
use shared::models::*;
use shared::validation::{ItemDraft, PollDraft};
use shared::{compute_results, next_option_id, next_poll_id, PollError, PollResults};
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};

use crate::queries::Queries;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Poll(#[from] PollError),
    #[error("Failed to lock {0} store")]
    LockFailed(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn lock<'a, T>(records: &'a Mutex<Vec<T>>, what: &'static str) -> StoreResult<MutexGuard<'a, Vec<T>>> {
    records.lock().map_err(|e| {
        error!("Failed to acquire {} lock: {}", what, e);
        StoreError::LockFailed(what)
    })
}

fn demo_poll(id: u64, question: &str, description: &str, options: &[(u64, &str, u64)], age: Duration) -> Poll {
    let created = OffsetDateTime::now_utc() - age;
    Poll {
        id,
        question: question.to_string(),
        description: description.to_string(),
        options: options
            .iter()
            .map(|&(id, text, votes)| PollOption { id, text: text.to_string(), votes })
            .collect(),
        total_votes: options.iter().map(|o| o.2).sum(),
        status: PollStatus::Active,
        created_at: created,
        updated_at: created,
    }
}

/// In-memory poll collection. Every operation runs under one lock, so vote
/// increments never interleave.
#[derive(Debug, Default)]
pub struct PollStore {
    polls: Mutex<Vec<Poll>>,
}

impl PollStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_polls(polls: Vec<Poll>) -> Self {
        Self { polls: Mutex::new(polls) }
    }

    /// Store holding the two demo polls the service ships with.
    pub fn seeded() -> Self {
        Self::with_polls(vec![
            demo_poll(
                1,
                "What is your favorite programming language?",
                "Help us understand the community preferences",
                &[(1, "JavaScript", 15), (2, "Python", 12), (3, "TypeScript", 8), (4, "Go", 5)],
                Duration::days(1),
            ),
            demo_poll(
                2,
                "Which framework do you prefer for frontend development?",
                "Share your experience with different frameworks",
                &[(5, "React", 20), (6, "Vue", 10), (7, "Angular", 8), (8, "Svelte", 3)],
                Duration::hours(1),
            ),
        ])
    }

    pub fn create(&self, draft: PollDraft) -> StoreResult<Poll> {
        let mut polls = lock(&self.polls, "poll")?;
        let poll = Poll::from_draft(next_poll_id(&polls), next_option_id(&polls), draft);
        debug!(poll_id = poll.id, options = poll.options.len(), "Created poll");
        polls.push(poll.clone());
        Ok(poll)
    }

    pub fn get(&self, id: u64) -> StoreResult<Poll> {
        let polls = lock(&self.polls, "poll")?;
        polls
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::Poll(PollError::PollNotFound(id)))
    }

    pub fn list(&self, params: &PollListParams) -> StoreResult<PollPage> {
        let polls = lock(&self.polls, "poll")?;
        Ok(Queries::select_polls(&polls, params))
    }

    pub fn apply_vote(&self, poll_id: u64, option_id: u64) -> StoreResult<VoteReceipt> {
        let mut polls = lock(&self.polls, "poll")?;
        let poll = polls
            .iter_mut()
            .find(|p| p.id == poll_id)
            .ok_or(PollError::PollNotFound(poll_id))?;
        Ok(poll.apply_vote(option_id)?)
    }

    pub fn results(&self, id: u64) -> StoreResult<PollResults> {
        self.get(id).map(|poll| compute_results(&poll))
    }
}

#[derive(Debug, Default)]
pub struct ItemStore {
    items: Mutex<Vec<Item>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self { items: Mutex::new(items) }
    }

    pub fn seeded() -> Self {
        let now = OffsetDateTime::now_utc();
        let item = |id: u64, name: &str, description: &str| Item {
            id,
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        };

        Self::with_items(vec![
            item(1, "Sample Item 1", "This is a sample item"),
            item(2, "Sample Item 2", "Another sample item"),
        ])
    }

    pub fn create(&self, draft: ItemDraft) -> StoreResult<Item> {
        let mut items = lock(&self.items, "item")?;
        let now = OffsetDateTime::now_utc();
        let item = Item {
            id: items.iter().map(|i| i.id).max().map_or(1, |max| max + 1),
            name: draft.name,
            description: draft.description,
            created_at: now,
            updated_at: now,
        };
        items.push(item.clone());
        Ok(item)
    }

    pub fn list(&self, page: PageRequest, search: Option<&str>) -> StoreResult<ItemPage> {
        let items = lock(&self.items, "item")?;
        Ok(Queries::select_items(&items, page, search))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::validation::validate_poll_request;
    use std::sync::Arc;
    use std::thread;

    fn draft(options: &[&str]) -> PollDraft {
        validate_poll_request(&CreatePollRequest::new("Question?", options)).unwrap()
    }

    #[test]
    fn test_create_continues_ids() {
        let store = PollStore::seeded();
        let poll = store.create(draft(&["A", "B"])).unwrap();
        assert_eq!(poll.id, 3);
        assert_eq!(poll.options.iter().map(|o| o.id).collect::<Vec<_>>(), vec![9, 10]);

        let empty = PollStore::new();
        let first = empty.create(draft(&["A", "B", "C"])).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.options.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_get_and_vote_errors() {
        let store = PollStore::seeded();
        assert!(matches!(store.get(42), Err(StoreError::Poll(PollError::PollNotFound(42)))));
        assert!(matches!(store.apply_vote(42, 1), Err(StoreError::Poll(PollError::PollNotFound(42)))));
        assert!(matches!(store.apply_vote(1, 5), Err(StoreError::Poll(PollError::OptionNotFound(5)))));
    }

    #[test]
    fn test_vote_visible_to_next_read() {
        let store = PollStore::seeded();
        let receipt = store.apply_vote(1, 2).unwrap();
        assert_eq!(receipt, VoteReceipt { poll_id: 1, option_id: 2, total_votes: 41 });

        let poll = store.get(1).unwrap();
        assert_eq!(poll.options[1].votes, 13);
        assert!(poll.is_consistent());
    }

    #[test]
    fn test_inactive_poll_rejects_votes() {
        let mut poll = Poll::from_draft(1, 1, draft(&["A", "B"]));
        poll.status = PollStatus::Inactive;
        let store = PollStore::with_polls(vec![poll]);

        assert!(matches!(store.apply_vote(1, 1), Err(StoreError::Poll(PollError::Inactive))));
        assert_eq!(store.get(1).unwrap().total_votes, 0);
    }

    #[test]
    fn test_concurrent_votes_keep_totals() {
        let store = Arc::new(PollStore::new());
        let poll = store.create(draft(&["A", "B", "C"])).unwrap();
        let poll_id = poll.id;
        let option_ids: Vec<u64> = poll.options.iter().map(|o| o.id).collect();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                let option_id = option_ids[t % option_ids.len()];
                thread::spawn(move || {
                    for _ in 0..250 {
                        store.apply_vote(poll_id, option_id).unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let poll = store.get(poll_id).unwrap();
        assert_eq!(poll.total_votes, 2000);
        assert!(poll.is_consistent());
    }

    #[test]
    fn test_results_for_stored_poll() {
        let store = PollStore::seeded();
        let results = store.results(1).unwrap();
        assert_eq!(results.percentage_of("JavaScript"), Some(37.5));
        assert_eq!(results.leader.unwrap().text, "JavaScript");
    }

    #[test]
    fn test_item_ids_follow_max() {
        let store = ItemStore::seeded();
        let item = store
            .create(ItemDraft { name: "Third".into(), description: String::new() })
            .unwrap();
        assert_eq!(item.id, 3);

        let page = store.list(PageRequest::default(), None).unwrap();
        assert_eq!(page.pagination.total_items, 3);
    }
}

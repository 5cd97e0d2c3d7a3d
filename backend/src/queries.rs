use std::cmp::Ordering;
use shared::models::*;

pub struct Queries;

impl Queries {
    /// Filters, sorts and pages a snapshot of the poll list.
    pub fn select_polls(polls: &[Poll], params: &PollListParams) -> PollPage {
        let needle = params.search.as_deref().map(str::to_lowercase);

        let mut matching: Vec<&Poll> = polls
            .iter()
            .filter(|p| match params.status {
                StatusFilter::All => true,
                StatusFilter::Only(status) => p.status == status,
            })
            .filter(|p| {
                needle.as_deref().map_or(true, |n| {
                    p.question.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
                })
            })
            .collect();

        matching.sort_by(|a, b| {
            let ord = Self::compare_polls(a, b, params.sort_by);
            match params.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        PollPage {
            polls: params.page.slice(&matching).iter().map(|p| (*p).clone()).collect(),
            pagination: Pagination::new(params.page, matching.len()),
        }
    }

    fn compare_polls(a: &Poll, b: &Poll, field: SortField) -> Ordering {
        match field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::TotalVotes => a.total_votes.cmp(&b.total_votes),
            SortField::Question => a.question.cmp(&b.question),
            SortField::Id => a.id.cmp(&b.id),
        }
    }

    pub fn select_items(items: &[Item], page: PageRequest, search: Option<&str>) -> ItemPage {
        let needle = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);

        let matching: Vec<&Item> = items
            .iter()
            .filter(|i| {
                needle.as_deref().map_or(true, |n| {
                    i.name.to_lowercase().contains(n) || i.description.to_lowercase().contains(n)
                })
            })
            .collect();

        ItemPage {
            items: page.slice(&matching).iter().map(|i| (*i).clone()).collect(),
            pagination: ItemPagination::new(page, matching.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};

    fn poll(id: u64, question: &str, description: &str, votes: u64, status: PollStatus, age_hours: i64) -> Poll {
        let created = OffsetDateTime::now_utc() - Duration::hours(age_hours);
        Poll {
            id,
            question: question.into(),
            description: description.into(),
            options: vec![
                PollOption { id: id * 10, text: "yes".into(), votes },
                PollOption { id: id * 10 + 1, text: "no".into(), votes: 0 },
            ],
            total_votes: votes,
            status,
            created_at: created,
            updated_at: created,
        }
    }

    fn fixtures() -> Vec<Poll> {
        vec![
            poll(1, "Tabs or spaces?", "The eternal debate", 10, PollStatus::Active, 5),
            poll(2, "Best Rust web framework", "rocket, axum, actix", 3, PollStatus::Active, 1),
            poll(3, "Dark mode?", "", 7, PollStatus::Inactive, 3),
            poll(4, "Favourite database", "Pick RUST-friendly ones", 7, PollStatus::Active, 2),
        ]
    }

    fn ids(page: &PollPage) -> Vec<u64> {
        page.polls.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_default_lists_active_newest_first() {
        let page = Queries::select_polls(&fixtures(), &PollListParams::default());
        assert_eq!(ids(&page), vec![2, 4, 1]);
        assert_eq!(page.pagination.total_items, 3);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[test]
    fn test_status_filter() {
        let params = PollListParams { status: StatusFilter::Only(PollStatus::Inactive), ..Default::default() };
        assert_eq!(ids(&Queries::select_polls(&fixtures(), &params)), vec![3]);

        let params = PollListParams { status: StatusFilter::All, ..Default::default() };
        assert_eq!(Queries::select_polls(&fixtures(), &params).pagination.total_items, 4);
    }

    #[test]
    fn test_search_matches_question_and_description() {
        let params = PollListParams { search: Some("rust".into()), ..Default::default() };
        assert_eq!(ids(&Queries::select_polls(&fixtures(), &params)), vec![2, 4]);

        let params = PollListParams { search: Some("nothing like this".into()), ..Default::default() };
        let page = Queries::select_polls(&fixtures(), &params);
        assert!(page.polls.is_empty());
        assert_eq!(page.pagination.total_pages, 0);
    }

    #[test]
    fn test_sort_by_votes_keeps_ties_stable() {
        let params = PollListParams {
            status: StatusFilter::All,
            sort_by: SortField::TotalVotes,
            order: SortOrder::Asc,
            ..Default::default()
        };
        assert_eq!(ids(&Queries::select_polls(&fixtures(), &params)), vec![2, 3, 4, 1]);

        let params = PollListParams { order: SortOrder::Desc, ..params };
        assert_eq!(ids(&Queries::select_polls(&fixtures(), &params)), vec![1, 3, 4, 2]);
    }

    #[test]
    fn test_pagination_window() {
        let params = PollListParams {
            status: StatusFilter::All,
            sort_by: SortField::Id,
            order: SortOrder::Asc,
            page: PageRequest { page: 2, limit: 3 },
            ..Default::default()
        };
        let page = Queries::select_polls(&fixtures(), &params);
        assert_eq!(ids(&page), vec![4]);
        assert_eq!(
            page.pagination,
            Pagination {
                current_page: 2,
                total_pages: 2,
                total_items: 4,
                items_per_page: 3,
                has_next_page: false,
                has_prev_page: true,
            }
        );
    }

    #[test]
    fn test_item_search_and_paging() {
        let now = OffsetDateTime::now_utc();
        let items: Vec<Item> = ["Apple", "Banana", "Apricot"]
            .iter()
            .zip(1..)
            .map(|(name, id)| Item {
                id,
                name: name.to_string(),
                description: String::new(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        let page = Queries::select_items(&items, PageRequest { page: 1, limit: 1 }, Some("ap"));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Apple");
        assert_eq!(page.pagination.total_items, 2);
        assert_eq!(page.pagination.total_pages, 2);

        let all = Queries::select_items(&items, PageRequest::default(), Some("  "));
        assert_eq!(all.items.len(), 3);
    }
}

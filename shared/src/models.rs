use serde::{Serialize, Deserialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub id: u64,
    pub text: String,
    pub votes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: u64,
    pub question: String,
    pub description: String,
    pub options: Vec<PollOption>,
    pub total_votes: u64,
    pub status: PollStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Poll {
    pub fn is_active(&self) -> bool {
        self.status == PollStatus::Active
    }

    pub fn max_option_id(&self) -> Option<u64> {
        self.options.iter().map(|o| o.id).max()
    }
}

/// Incoming option text. Every field is optional so that validation can
/// report missing values itself instead of failing at deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PollOptionInput {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub question: Option<String>,
    pub description: Option<String>,
    pub options: Option<Vec<PollOptionInput>>,
}

impl CreatePollRequest {
    pub fn new(question: &str, options: &[&str]) -> Self {
        Self {
            question: Some(question.to_string()),
            description: None,
            options: Some(
                options
                    .iter()
                    .map(|text| PollOptionInput { text: Some(text.to_string()) })
                    .collect(),
            ),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub option_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub poll_id: u64,
    pub option_id: u64,
    pub total_votes: u64,
}

/// Raw list parameters as they arrive in the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(rocket::FromForm))]
pub struct PollQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "sortBy")]
    #[cfg_attr(feature = "backend", field(name = "sortBy"))]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Only(PollStatus),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    TotalVotes,
    Question,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageRequest {
    pub fn start(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn end(&self) -> usize {
        self.page.saturating_mul(self.limit)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.start().min(items.len());
        let end = self.end().min(items.len());
        &items[start..end]
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.limit)
    }
}

/// Validated list parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollListParams {
    pub page: PageRequest,
    pub search: Option<String>,
    pub status: StatusFilter,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl Default for PollListParams {
    fn default() -> Self {
        Self {
            page: PageRequest::default(),
            search: None,
            status: StatusFilter::Only(PollStatus::Active),
            sort_by: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: PageRequest, total_items: usize) -> Self {
        Self {
            current_page: page.page,
            total_pages: page.total_pages(total_items),
            total_items,
            items_per_page: page.limit,
            has_next_page: page.end() < total_items,
            has_prev_page: page.page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollPage {
    pub polls: Vec<Poll>,
    pub pagination: Pagination,
}

/// Body of every successful poll API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, message: None, data }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: Some(message.into()), data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(rocket::FromForm))]
pub struct ItemQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemPagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

impl ItemPagination {
    pub fn new(page: PageRequest, total_items: usize) -> Self {
        Self {
            current_page: page.page,
            total_pages: page.total_pages(total_items),
            total_items,
            items_per_page: page.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub pagination: ItemPagination,
}

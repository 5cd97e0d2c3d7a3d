use crate::error::PollError;
use crate::models::*;

pub const MAX_QUESTION_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_OPTION_LENGTH: usize = 100;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;
pub const MAX_ITEM_NAME_LENGTH: usize = 100;
pub const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Page must be a positive integer")]
    InvalidPage,
    #[error("Limit must be between 1 and {MAX_PAGE_LIMIT}")]
    InvalidLimit,
    #[error("Status must be one of: active, inactive, all")]
    InvalidStatus,
    #[error("Cannot sort by '{0}'")]
    InvalidSortField(String),
    #[error("Order must be 'asc' or 'desc'")]
    InvalidOrder,
    #[error("Option ID is required")]
    MissingOptionId,
    #[error("Name is required and must be a non-empty string")]
    MissingName,
    #[error("Name must be less than {MAX_ITEM_NAME_LENGTH} characters")]
    NameTooLong,
}

impl From<ValidationError> for PollError {
    fn from(err: ValidationError) -> Self {
        PollError::Validation(vec![err.to_string()])
    }
}

/// A poll request that passed validation, with every text trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    pub question: String,
    pub description: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Checks a poll creation request and reports every problem found, not only
/// the first one.
pub fn validate_poll_request(request: &CreatePollRequest) -> Result<PollDraft, PollError> {
    let mut errors = Vec::new();

    match request.question.as_deref() {
        None | Some("") => errors.push("Question is required".to_string()),
        Some(q) if q.trim().is_empty() => errors.push("Question cannot be empty".to_string()),
        Some(q) if char_len(q) > MAX_QUESTION_LENGTH => {
            errors.push(format!("Question must be less than {MAX_QUESTION_LENGTH} characters"))
        }
        Some(_) => {}
    }

    if let Some(d) = request.description.as_deref() {
        if char_len(d) > MAX_DESCRIPTION_LENGTH {
            errors.push(format!("Description must be less than {MAX_DESCRIPTION_LENGTH} characters"));
        }
    }

    match request.options.as_deref() {
        None => errors.push("Options must be an array".to_string()),
        Some(opts) if opts.len() < MIN_OPTIONS => {
            errors.push(format!("At least {MIN_OPTIONS} options are required"))
        }
        Some(opts) if opts.len() > MAX_OPTIONS => {
            errors.push(format!("Maximum {MAX_OPTIONS} options allowed"))
        }
        Some(opts) => {
            for (i, opt) in opts.iter().enumerate() {
                let n = i + 1;
                match opt.text.as_deref() {
                    None | Some("") => errors.push(format!("Option {n} text is required")),
                    Some(t) if t.trim().is_empty() => {
                        errors.push(format!("Option {n} text cannot be empty"))
                    }
                    Some(t) if char_len(t) > MAX_OPTION_LENGTH => errors.push(format!(
                        "Option {n} text must be less than {MAX_OPTION_LENGTH} characters"
                    )),
                    Some(_) => {}
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(PollError::Validation(errors));
    }

    Ok(PollDraft {
        question: request.question.as_deref().unwrap_or_default().trim().to_string(),
        description: request.description.as_deref().unwrap_or_default().trim().to_string(),
        options: request
            .options
            .iter()
            .flatten()
            .map(|o| o.text.as_deref().unwrap_or_default().trim().to_string())
            .collect(),
    })
}

pub fn validate_vote_request(request: &VoteRequest) -> Result<u64, ValidationError> {
    request.option_id.ok_or(ValidationError::MissingOptionId)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn parse_page_request(page: &Option<String>, limit: &Option<String>) -> Result<PageRequest, ValidationError> {
    let defaults = PageRequest::default();

    let page = match non_empty(page) {
        None => defaults.page,
        Some(p) => p.parse::<usize>().ok().filter(|&p| p >= 1).ok_or(ValidationError::InvalidPage)?,
    };

    let limit = match non_empty(limit) {
        None => defaults.limit,
        Some(l) => l
            .parse::<usize>()
            .ok()
            .filter(|l| (1..=MAX_PAGE_LIMIT).contains(l))
            .ok_or(ValidationError::InvalidLimit)?,
    };

    Ok(PageRequest { page, limit })
}

pub fn parse_poll_query(query: &PollQuery) -> Result<PollListParams, ValidationError> {
    let defaults = PollListParams::default();

    let status = match non_empty(&query.status) {
        None => defaults.status,
        Some("active") => StatusFilter::Only(PollStatus::Active),
        Some("inactive") => StatusFilter::Only(PollStatus::Inactive),
        Some("all") => StatusFilter::All,
        Some(_) => return Err(ValidationError::InvalidStatus),
    };

    let sort_by = match non_empty(&query.sort_by) {
        None => defaults.sort_by,
        Some("createdAt") => SortField::CreatedAt,
        Some("updatedAt") => SortField::UpdatedAt,
        Some("totalVotes") => SortField::TotalVotes,
        Some("question") => SortField::Question,
        Some("id") => SortField::Id,
        Some(other) => return Err(ValidationError::InvalidSortField(other.to_string())),
    };

    let order = match non_empty(&query.order) {
        None => defaults.order,
        Some(o) if o.eq_ignore_ascii_case("asc") => SortOrder::Asc,
        Some(o) if o.eq_ignore_ascii_case("desc") => SortOrder::Desc,
        Some(_) => return Err(ValidationError::InvalidOrder),
    };

    Ok(PollListParams {
        page: parse_page_request(&query.page, &query.limit)?,
        search: non_empty(&query.search).map(str::to_string),
        status,
        sort_by,
        order,
    })
}

pub fn validate_item_request(request: &CreateItemRequest) -> Result<ItemDraft, ValidationError> {
    let name = non_empty(&request.name).ok_or(ValidationError::MissingName)?;
    if char_len(request.name.as_deref().unwrap_or_default()) > MAX_ITEM_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }

    Ok(ItemDraft {
        name: name.to_string(),
        description: request.description.as_deref().unwrap_or_default().trim().to_string(),
    })
}

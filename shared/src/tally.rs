use serde::{Serialize, Deserialize};
use time::OffsetDateTime;

use crate::error::{PollError, Result};
use crate::models::*;
use crate::validation::PollDraft;

impl Poll {
    /// Builds a fresh active poll. Option ids are handed out consecutively
    /// starting at `first_option_id`.
    pub fn from_draft(id: u64, first_option_id: u64, draft: PollDraft) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id,
            question: draft.question,
            description: draft.description,
            options: draft
                .options
                .into_iter()
                .zip(first_option_id..)
                .map(|(text, id)| PollOption { id, text, votes: 0 })
                .collect(),
            total_votes: 0,
            status: PollStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Counts one vote for `option_id`. Repeated calls count repeatedly.
    pub fn apply_vote(&mut self, option_id: u64) -> Result<VoteReceipt> {
        if !self.is_active() {
            return Err(PollError::Inactive);
        }

        let option = self
            .options
            .iter_mut()
            .find(|o| o.id == option_id)
            .ok_or(PollError::OptionNotFound(option_id))?;

        option.votes += 1;
        self.total_votes += 1;
        self.updated_at = OffsetDateTime::now_utc();

        Ok(VoteReceipt {
            poll_id: self.id,
            option_id,
            total_votes: self.total_votes,
        })
    }

    /// True when `total_votes` equals the sum of the option counts.
    pub fn is_consistent(&self) -> bool {
        self.options.iter().map(|o| o.votes).sum::<u64>() == self.total_votes
    }

    pub fn leader(&self) -> Option<&PollOption> {
        leader(&self.options)
    }
}

/// Next poll id: one past the largest id in use, or 1 for an empty list.
pub fn next_poll_id(polls: &[Poll]) -> u64 {
    polls.iter().map(|p| p.id).max().map_or(1, |max| max + 1)
}

/// First option id for a new poll. Option ids are unique across every poll.
pub fn next_option_id(polls: &[Poll]) -> u64 {
    polls
        .iter()
        .filter_map(Poll::max_option_id)
        .max()
        .map_or(1, |max| max + 1)
}

/// Share of `votes` in `total` as a percentage rounded to one decimal place.
pub fn percentage(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = votes as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// First option holding the maximum vote count.
pub fn leader(options: &[PollOption]) -> Option<&PollOption> {
    options
        .iter()
        .fold(None, |best: Option<&PollOption>, o| match best {
            Some(b) if b.votes >= o.votes => Some(b),
            _ => Some(o),
        })
}

/// Options ordered by votes, most first. Ties keep their stored order.
pub fn ranking(options: &[PollOption]) -> Vec<&PollOption> {
    let mut ranked: Vec<_> = options.iter().collect();
    ranked.sort_by(|a, b| b.votes.cmp(&a.votes));
    ranked
}

pub fn format_vote_count(count: u64) -> String {
    match count {
        0 => "No votes".to_string(),
        1 => "1 vote".to_string(),
        n => format!("{} votes", group_thousands(n)),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub option_id: u64,
    pub text: String,
    pub votes: u64,
    pub percentage: f64,
    pub label: String,
}

impl OptionResult {
    fn new(option: &PollOption, total: u64) -> Self {
        Self {
            option_id: option.id,
            text: option.text.clone(),
            votes: option.votes,
            percentage: percentage(option.votes, total),
            label: format_vote_count(option.votes),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    pub option_id: u64,
    pub text: String,
    pub votes: u64,
    /// Only a leader with at least one vote counts as winning.
    pub is_winner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll_id: u64,
    pub total_votes: u64,
    pub total_label: String,
    /// Per-option results in stored order.
    pub percentages: Vec<OptionResult>,
    /// The same results ordered by votes, most first.
    pub ranking: Vec<OptionResult>,
    pub leader: Option<Leader>,
}

impl PollResults {
    pub fn percentage_of(&self, text: &str) -> Option<f64> {
        self.percentages.iter().find(|r| r.text == text).map(|r| r.percentage)
    }
}

pub fn compute_results(poll: &Poll) -> PollResults {
    let total = poll.total_votes;

    PollResults {
        poll_id: poll.id,
        total_votes: total,
        total_label: format_vote_count(total),
        percentages: poll.options.iter().map(|o| OptionResult::new(o, total)).collect(),
        ranking: ranking(&poll.options)
            .into_iter()
            .map(|o| OptionResult::new(o, total))
            .collect(),
        leader: poll.leader().map(|o| Leader {
            option_id: o.id,
            text: o.text.clone(),
            votes: o.votes,
            is_winner: o.votes > 0,
        }),
    }
}

//! Poll creation input.
//!
//! The "new poll" form posts a `title` field plus numbered `titleN` / `imgN`
//! pairs, one per option. These are pure conversions from the raw pairs into a
//! validated [`NewPoll`]; nothing here touches storage.

use std::collections::BTreeMap;

use super::error::PollError;
use super::types::{OptionId, PollId, PollOption, UserId};

/// Minimum number of options a poll must offer.
pub const MIN_OPTIONS: usize = 2;
/// Maximum number of options a poll may offer.
pub const MAX_OPTIONS: usize = 10;
/// Maximum length of a poll title or option text.
pub const MAX_TEXT_LEN: usize = 200;

/// An option as submitted, before the poll has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOption {
    pub text: String,
    pub image: Option<String>,
}

/// A validated poll ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoll {
    pub name: String,
    pub owner: UserId,
    pub options: Vec<NewOption>,
}

impl NewPoll {
    /// Builds and validates a poll from explicit parts.
    pub fn new(
        name: impl Into<String>,
        owner: UserId,
        options: Vec<NewOption>,
    ) -> Result<Self, PollError> {
        let poll = Self {
            name: name.into().trim().to_string(),
            owner,
            options,
        };
        validate_new_poll(&poll)?;
        Ok(poll)
    }

    /// Builds a poll from the urlencoded pairs of the "new poll" form.
    ///
    /// Options are ordered by their field number. Blank option texts are
    /// skipped, so `title1=A&title2=&title3=B` yields two options.
    pub fn from_form(owner: UserId, fields: &[(String, String)]) -> Result<Self, PollError> {
        let mut name = String::new();
        let mut texts: BTreeMap<u32, String> = BTreeMap::new();
        let mut images: BTreeMap<u32, String> = BTreeMap::new();

        for (key, value) in fields {
            if key == "title" {
                name = value.clone();
            } else if let Some(n) = numbered_field(key, "title") {
                texts.insert(n, value.trim().to_string());
            } else if let Some(n) = numbered_field(key, "img") {
                images.insert(n, value.trim().to_string());
            }
        }

        let options = texts
            .into_iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(n, text)| NewOption {
                text,
                image: images.remove(&n).filter(|image| !image.is_empty()),
            })
            .collect();

        Self::new(name, owner, options)
    }

    /// Materializes the options under an assigned poll id, numbered 1..N.
    pub fn options_for(&self, poll_id: PollId) -> Vec<PollOption> {
        self.options
            .iter()
            .zip(1..)
            .map(|(option, n)| PollOption {
                poll_id,
                id: OptionId(n),
                text: option.text.clone(),
                image: option.image.clone(),
                votes: 0,
            })
            .collect()
    }
}

/// Returns N for keys shaped like `{prefix}N` with N >= 1.
fn numbered_field(key: &str, prefix: &str) -> Option<u32> {
    let digits = key.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|n| *n > 0)
}

/// Validates a poll before creation.
pub fn validate_new_poll(poll: &NewPoll) -> Result<(), PollError> {
    if poll.name.trim().is_empty() {
        return Err(PollError::EmptyTitle);
    }
    if poll.name.chars().count() > MAX_TEXT_LEN {
        return Err(PollError::TextTooLong {
            field: "Poll title",
            max: MAX_TEXT_LEN,
        });
    }

    let given = poll.options.len();
    if given < MIN_OPTIONS {
        return Err(PollError::TooFewOptions {
            min: MIN_OPTIONS,
            given,
        });
    }
    if given > MAX_OPTIONS {
        return Err(PollError::TooManyOptions {
            max: MAX_OPTIONS,
            given,
        });
    }

    if poll
        .options
        .iter()
        .any(|option| option.text.chars().count() > MAX_TEXT_LEN)
    {
        return Err(PollError::TextTooLong {
            field: "Option text",
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

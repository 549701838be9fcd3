//! The atomic data model: [`Reel`] rows, ephemeral [`Profile`] briefs, and
//! the enums that drive post-processing decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix every normalized reel URL carries.
pub const REEL_URL_PREFIX: &str = "https://www.instagram.com/reel/";

/// US classification verdict for a reel's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UsDecision {
    /// Not yet evaluated.
    #[default]
    Unknown,
    /// At least one positive US signal was captured.
    Us,
    /// Evidence points away from the US.
    NonUs,
}

impl fmt::Display for UsDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Us => "US",
            Self::NonUs => "non-US",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for UsDecision {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "US" => Ok(Self::Us),
            "non-US" => Ok(Self::NonUs),
            "" | "unknown" => Ok(Self::Unknown),
            _ => Err(()),
        }
    }
}

/// Relevance verdict for a reel against the search keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceDecision {
    /// Not yet evaluated.
    #[default]
    Unknown,
    /// Judged relevant to the keyword.
    Relevant,
    /// Judged irrelevant.
    Irrelevant,
}

impl fmt::Display for RelevanceDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Relevant => "relevant",
            Self::Irrelevant => "irrelevant",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for RelevanceDecision {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevant" => Ok(Self::Relevant),
            "irrelevant" => Ok(Self::Irrelevant),
            "" | "unknown" => Ok(Self::Unknown),
            _ => Err(()),
        }
    }
}

/// Row lifecycle. Transitions are monotone: discovered -> hydrated ->
/// analyzed -> (accepted | rejected). `Accepted` never regresses within a
/// session (see [`Status::can_transition_to`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// URL has been discovered but not hydrated.
    #[default]
    Discovered,
    /// Post metadata has been fetched.
    Hydrated,
    /// Profile/transcript signals have been folded in and finalize() has run.
    Analyzed,
    /// Selected by post-processing.
    Accepted,
    /// Dropped by post-processing or US filtering.
    Rejected,
}

impl Status {
    fn rank(self) -> u8 {
        match self {
            Self::Discovered => 0,
            Self::Hydrated => 1,
            Self::Analyzed => 2,
            Self::Accepted => 3,
            Self::Rejected => 3,
        }
    }

    /// Whether moving from `self` to `next` respects the monotone lifecycle.
    /// `Accepted` is a terminal state within a session: nothing may follow it.
    #[must_use]
    pub fn can_transition_to(self, next: Status) -> bool {
        if self == Self::Accepted {
            return next == Self::Accepted;
        }
        next.rank() >= self.rank()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Discovered => "discovered",
            Self::Hydrated => "hydrated",
            Self::Analyzed => "analyzed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discovered" => Ok(Self::Discovered),
            "hydrated" => Ok(Self::Hydrated),
            "analyzed" => Ok(Self::Analyzed),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(()),
        }
    }
}

/// One discovered-or-hydrated Instagram reel, keyed by [`Reel::url`].
///
/// Schema is append-/widen-only: readers must treat absent fields as `None`
/// rather than erroring (see [`crate::model::Reel::merge_from`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reel {
    /// Canonical `https://www.instagram.com/reel/{shortcode}` URL. Primary key.
    pub url: String,
    /// Shortcode portion of `url`.
    pub shortcode: String,
    /// The search keyword that discovered this row.
    pub keyword: String,
    /// Caption text, possibly empty.
    pub caption: String,
    /// Owner handle, no leading `@`. `None` until hydrated.
    pub owner_handle: Option<String>,
    /// Owner display name.
    pub owner_name: Option<String>,
    /// Whether the owner account is verified.
    pub is_verified: Option<bool>,
    /// Whether the post is a video (reels always are, but hydration may fail).
    pub is_video: Option<bool>,
    /// Provider-reported product type (e.g. "clips").
    pub product_type: Option<String>,
    /// View or play count.
    pub views: Option<u64>,
    /// ISO-8601 UTC timestamp the post was taken.
    pub taken_at_iso: Option<String>,
    /// Thumbnail image URL.
    pub thumbnail: Option<String>,
    /// Tagged location name.
    pub location_name: Option<String>,
    /// Transcript text, if fetched and non-empty.
    pub transcript: Option<String>,
    /// US classification verdict.
    pub us_decision: UsDecision,
    /// Free-text justification for `us_decision`.
    pub us_reason: String,
    /// Relevance verdict against `keyword`.
    pub relevance_decision: RelevanceDecision,
    /// Lifecycle status.
    pub status: Status,
    /// Row creation timestamp.
    pub row_created_at: DateTime<Utc>,
    /// Last row update timestamp.
    pub row_updated_at: DateTime<Utc>,
}

impl Reel {
    /// Construct a freshly discovered row. `us_decision`/`relevance_decision`
    /// start `Unknown`, `status` starts `Discovered`.
    pub fn discovered(url: impl Into<String>, keyword: impl Into<String>, now: DateTime<Utc>) -> Self {
        let url = url.into();
        let shortcode = shortcode_of(&url).unwrap_or_default();
        Self {
            url,
            shortcode,
            keyword: keyword.into(),
            caption: String::new(),
            owner_handle: None,
            owner_name: None,
            is_verified: None,
            is_video: None,
            product_type: None,
            views: None,
            taken_at_iso: None,
            thumbnail: None,
            location_name: None,
            transcript: None,
            us_decision: UsDecision::Unknown,
            us_reason: String::new(),
            relevance_decision: RelevanceDecision::Unknown,
            status: Status::Discovered,
            row_created_at: now,
            row_updated_at: now,
        }
    }

    /// Append-or-patch merge: non-null fields from `other` overwrite this
    /// row's fields (last write wins), null fields in `other` never erase an
    /// existing value, and `status` only advances per
    /// [`Status::can_transition_to`]. `row_updated_at` is bumped to `now`.
    pub fn merge_from(&mut self, other: &Reel, now: DateTime<Utc>) {
        macro_rules! patch {
            ($field:ident) => {
                if other.$field.is_some() {
                    self.$field = other.$field.clone();
                }
            };
        }
        if !other.caption.is_empty() {
            self.caption = other.caption.clone();
        }
        patch!(owner_handle);
        patch!(owner_name);
        patch!(is_verified);
        patch!(is_video);
        patch!(product_type);
        patch!(views);
        patch!(taken_at_iso);
        patch!(thumbnail);
        patch!(location_name);
        patch!(transcript);
        if other.us_decision != UsDecision::Unknown {
            self.us_decision = other.us_decision;
            self.us_reason = other.us_reason.clone();
        }
        if other.relevance_decision != RelevanceDecision::Unknown {
            self.relevance_decision = other.relevance_decision;
        }
        if self.status.can_transition_to(other.status) {
            self.status = other.status;
        }
        self.row_updated_at = now;
    }
}

/// Derive the shortcode from a normalized reel URL.
#[must_use]
pub fn shortcode_of(url: &str) -> Option<String> {
    url.strip_prefix(REEL_URL_PREFIX)
        .map(|rest| rest.trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
}

/// Ephemeral profile brief returned by the profile provider. Not persisted
/// to the reel log except as a condensed `us_decision`/`us_reason`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Handle with no leading `@`.
    pub handle: String,
    /// Display name.
    pub full_name: Option<String>,
    /// Bio text.
    pub biography: Option<String>,
    /// Raw business-address JSON blob from the provider, if present.
    pub business_address_json: Option<String>,
    /// External URL linked from the profile.
    pub external_url: Option<String>,
    /// Verification status.
    pub is_verified: Option<bool>,
    /// Follower count.
    pub followers: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcode_extraction() {
        assert_eq!(
            shortcode_of("https://www.instagram.com/reel/Cabc123/"),
            Some("Cabc123".to_string())
        );
        assert_eq!(
            shortcode_of("https://www.instagram.com/reel/Cabc123"),
            Some("Cabc123".to_string())
        );
        assert_eq!(shortcode_of("https://example.com/reel/x"), None);
    }

    #[test]
    fn status_monotone_transitions() {
        assert!(Status::Discovered.can_transition_to(Status::Hydrated));
        assert!(Status::Hydrated.can_transition_to(Status::Analyzed));
        assert!(Status::Analyzed.can_transition_to(Status::Accepted));
        assert!(Status::Analyzed.can_transition_to(Status::Rejected));
        assert!(!Status::Hydrated.can_transition_to(Status::Discovered));
        assert!(Status::Accepted.can_transition_to(Status::Accepted));
        assert!(!Status::Accepted.can_transition_to(Status::Rejected));
    }

    #[test]
    fn merge_last_write_wins_without_erasing() {
        let now = Utc::now();
        let mut row = Reel::discovered("https://www.instagram.com/reel/Cabc123/", "kw", now);
        row.views = Some(100);

        let mut patch = Reel::discovered("https://www.instagram.com/reel/Cabc123/", "kw", now);
        patch.views = None;
        patch.owner_handle = Some("creator".to_string());

        row.merge_from(&patch, now);
        assert_eq!(row.views, Some(100));
        assert_eq!(row.owner_handle.as_deref(), Some("creator"));
    }
}

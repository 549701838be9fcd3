//! `build_profile_context` (spec §4.5.3).

use reelscout_core::model::Profile;
use serde::Serialize;

const SAMPLE_MAX: usize = 5;

/// US-indicator tallies across a profile batch.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct UsIndicators {
    /// Profiles carrying a parsable US business address.
    pub with_business_address: usize,
    /// Profiles whose bio text mentions a US state or major city.
    pub likely_us_from_bio: usize,
    /// Profiles whose external URL is a `.com` domain.
    pub com_domains: usize,
    /// Verified accounts.
    pub verified_accounts: usize,
}

/// Confidence tier tallies across a profile batch.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ConfidenceCounts {
    /// Has a parsable US business address.
    pub high: usize,
    /// `.com` external URL, or a US state/city token in the bio.
    pub medium: usize,
    /// Neither of the above.
    pub low: usize,
}

/// Per-profile confidence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Has a parsable US business address.
    High,
    /// `.com` external URL, or a US state/city token in the bio.
    Medium,
    /// Neither of the above.
    Low,
}

/// One representative profile sample.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSample {
    /// Profile handle.
    pub handle: String,
    /// Short human-readable summary of whatever US signal drove the tier.
    pub us_signal_summary: String,
    /// This profile's confidence tier.
    pub confidence_tier: ConfidenceTier,
}

/// Compact summary of a profile-hydration batch.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileContext {
    /// Number of profiles in the batch.
    pub total: usize,
    /// US-indicator tallies.
    pub us_indicators: UsIndicators,
    /// Confidence tier tallies.
    pub confidence: ConfidenceCounts,
    /// 3-5 representative samples.
    pub samples: Vec<ProfileSample>,
    /// Short imperative recommendation.
    pub recommendation: String,
}

/// Common US state abbreviations and major city names used as a weak bio
/// signal. Not exhaustive; this is a ranking heuristic, not a legal
/// determination.
const US_LOCATION_TOKENS: &[&str] = &[
    "usa", "united states", "america",
    "new york", "nyc", "los angeles", "l.a.", "chicago", "austin", "houston",
    "miami", "atlanta", "seattle", "boston", "san francisco", "san diego",
    "dallas", "denver", "nashville", "portland", "phoenix", "philadelphia",
    "california", "texas", "florida", "georgia", "illinois", "colorado",
    "washington", "oregon", "arizona", "nevada", "ohio", "michigan",
    " ca,", " tx,", " fl,", " ny,", " ga,", " il,", " wa,", " nv,", " az,",
];

fn has_us_location_token(bio: &str) -> bool {
    let lower = format!(" {} ", bio.to_lowercase());
    US_LOCATION_TOKENS.iter().any(|token| lower.contains(token))
}

/// Best-effort check for a "parsable US business address": looks for an
/// explicit US country marker or a 5-digit ZIP code in the raw JSON blob.
fn has_parsable_us_address(business_address_json: &str) -> bool {
    let lower = business_address_json.to_lowercase();
    if lower.contains("\"country_code\":\"us\"") || lower.contains("\"country\":\"united states\"") {
        return true;
    }
    let digits_only: Vec<char> = business_address_json.chars().filter(|c| c.is_ascii_digit()).collect();
    business_address_json
        .split(|c: char| !c.is_ascii_digit())
        .any(|token| token.len() == 5)
        && !digits_only.is_empty()
}

fn is_com_domain(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains(".com")
}

/// Classify one profile's US confidence tier and a short human-readable
/// justification, using the same heuristic tallied into [`ProfileContext`].
#[must_use]
pub fn classify(profile: &Profile) -> (ConfidenceTier, String) {
    let has_address = profile
        .business_address_json
        .as_deref()
        .is_some_and(has_parsable_us_address);
    if has_address {
        return (ConfidenceTier::High, "parsable US business address on file".to_string());
    }
    let com = profile.external_url.as_deref().is_some_and(is_com_domain);
    let bio_signal = profile.biography.as_deref().is_some_and(has_us_location_token);
    if com || bio_signal {
        let summary = match (com, bio_signal) {
            (true, true) => "`.com` external link and a US location token in the bio",
            (true, false) => "`.com` external link",
            (false, true) => "US location token in the bio",
            (false, false) => unreachable!(),
        };
        return (ConfidenceTier::Medium, summary.to_string());
    }
    (ConfidenceTier::Low, "no US signal found".to_string())
}

fn recommendation_for(confidence: &ConfidenceCounts, total: usize) -> String {
    if total == 0 {
        return "No profiles to classify yet.".to_string();
    }
    if confidence.high * 2 >= total {
        "Strong US signal across owners; proceed with US filtering as-is.".to_string()
    } else if (confidence.high + confidence.medium) * 2 >= total {
        "Mixed US signal; cross-check the low-confidence owners before filtering.".to_string()
    } else {
        "Weak US signal overall; consider treating unknowns as provisionally included.".to_string()
    }
}

/// Build a [`ProfileContext`] from a batch of profile briefs (spec §4.5.3).
#[must_use]
pub fn build_profile_context(profiles: &[Profile]) -> ProfileContext {
    let mut indicators = UsIndicators::default();
    let mut confidence = ConfidenceCounts::default();
    let mut classified: Vec<(&Profile, ConfidenceTier, String)> = Vec::with_capacity(profiles.len());

    for profile in profiles {
        if profile.business_address_json.as_deref().is_some_and(has_parsable_us_address) {
            indicators.with_business_address += 1;
        }
        if profile.biography.as_deref().is_some_and(has_us_location_token) {
            indicators.likely_us_from_bio += 1;
        }
        if profile.external_url.as_deref().is_some_and(is_com_domain) {
            indicators.com_domains += 1;
        }
        if profile.is_verified == Some(true) {
            indicators.verified_accounts += 1;
        }

        let (tier, summary) = classify(profile);
        match tier {
            ConfidenceTier::High => confidence.high += 1,
            ConfidenceTier::Medium => confidence.medium += 1,
            ConfidenceTier::Low => confidence.low += 1,
        }
        classified.push((profile, tier, summary));
    }

    let samples = classified
        .into_iter()
        .take(SAMPLE_MAX)
        .map(|(profile, tier, summary)| ProfileSample {
            handle: profile.handle.clone(),
            us_signal_summary: summary,
            confidence_tier: tier,
        })
        .collect();

    ProfileContext {
        total: profiles.len(),
        recommendation: recommendation_for(&confidence, profiles.len()),
        us_indicators: indicators,
        confidence,
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(handle: &str, biz: Option<&str>, bio: Option<&str>, url: Option<&str>) -> Profile {
        Profile {
            handle: handle.to_string(),
            full_name: None,
            biography: bio.map(str::to_string),
            business_address_json: biz.map(str::to_string),
            external_url: url.map(str::to_string),
            is_verified: Some(false),
            followers: None,
        }
    }

    #[test]
    fn business_address_yields_high_confidence() {
        let p = profile("a", Some(r#"{"country_code":"US","zip":"73301"}"#), None, None);
        let ctx = build_profile_context(&[p]);
        assert_eq!(ctx.confidence.high, 1);
        assert_eq!(ctx.us_indicators.with_business_address, 1);
    }

    #[test]
    fn com_domain_or_bio_token_yields_medium_confidence() {
        let p1 = profile("a", None, None, Some("https://creator.com"));
        let p2 = profile("b", None, Some("Austin, Texas based"), None);
        let ctx = build_profile_context(&[p1, p2]);
        assert_eq!(ctx.confidence.medium, 2);
    }

    #[test]
    fn no_signal_yields_low_confidence() {
        let p = profile("a", None, Some("just vibes"), None);
        let ctx = build_profile_context(&[p]);
        assert_eq!(ctx.confidence.low, 1);
    }
}

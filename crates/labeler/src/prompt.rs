//! Classification request builder — the versioned prompt template.
//!
//! A pure transform from a profile snapshot to the request sent to the
//! classifier. Deterministic: the same snapshot always yields the same
//! request. The template always tells the classifier to disregard the 1×1
//! placeholder, so avatar-less profiles can never have the fallback image
//! read as signal.

use sortinghat_core::classify::ClassificationRequest;
use sortinghat_core::profile::ProfileSnapshot;
use sortinghat_profile::avatar::placeholder_png;

/// Bump when the template wording changes in a way that could shift results.
pub const TEMPLATE_VERSION: &str = "v2";

const TEMPLATE_PREAMBLE: &str = "\
You're the Sorting Hat from Harry Potter. Which house does the user with the profile data at the end of this message belong to?

Focus on the available information. If the avatar is not available, a 1x1 pixel white image is provided instead as a placeholder. Disregard the placeholder and focus on the user's data.
Always return an answer — house name only, all lowercase.
The user's data may be in any language. Focus on the meaning, not just the surface content.
Consider traits for all houses, not just intellect.
You're mischievous and enjoy sorting based on whims, not always strictly following the user's traits; imagine as if you're a person who likes to play tricks on people.

The user's data is as follows:";

const NO_BIO: &str = "User has no bio.";

/// Assemble the classification request for one profile snapshot.
pub fn build_request(snapshot: &ProfileSnapshot) -> ClassificationRequest {
    let name = snapshot
        .display_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(&snapshot.handle);
    let bio = snapshot.bio.as_deref().unwrap_or(NO_BIO);

    let prompt = format!(
        "{TEMPLATE_PREAMBLE}\n\nName: {name} (@{handle})\nBio: {bio}\n",
        handle = snapshot.handle,
    );

    let image_png = snapshot
        .avatar
        .clone()
        .unwrap_or_else(placeholder_png);

    ClassificationRequest { prompt, image_png }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortinghat_core::subject::Did;

    fn snapshot() -> ProfileSnapshot {
        ProfileSnapshot {
            subject: Did::new("did:plc:abc"),
            handle: "alice.bsky.social".into(),
            display_name: Some("Alice".into()),
            bio: Some("loves chess and rules".into()),
            avatar: Some(vec![1, 2, 3]),
        }
    }

    #[test]
    fn prompt_embeds_name_handle_and_bio() {
        let request = build_request(&snapshot());
        assert!(request.prompt.contains("Name: Alice (@alice.bsky.social)"));
        assert!(request.prompt.contains("Bio: loves chess and rules"));
    }

    #[test]
    fn handle_substitutes_for_missing_display_name() {
        let mut snap = snapshot();
        snap.display_name = None;
        let request = build_request(&snap);
        assert!(
            request
                .prompt
                .contains("Name: alice.bsky.social (@alice.bsky.social)")
        );
    }

    #[test]
    fn blank_display_name_is_treated_as_missing() {
        let mut snap = snapshot();
        snap.display_name = Some("   ".into());
        let request = build_request(&snap);
        assert!(
            request
                .prompt
                .contains("Name: alice.bsky.social (@alice.bsky.social)")
        );
    }

    #[test]
    fn missing_bio_gets_explicit_fallback() {
        let mut snap = snapshot();
        snap.bio = None;
        let request = build_request(&snap);
        assert!(request.prompt.contains("Bio: User has no bio."));
    }

    #[test]
    fn missing_avatar_uses_placeholder_and_prompt_says_so() {
        let mut snap = snapshot();
        snap.avatar = None;
        let request = build_request(&snap);
        assert_eq!(request.image_png, placeholder_png());
        // The placeholder must never be mistaken for signal.
        assert!(request.prompt.contains("1x1 pixel white image"));
        assert!(request.prompt.contains("Disregard the placeholder"));
    }

    #[test]
    fn present_avatar_is_passed_through() {
        let request = build_request(&snapshot());
        assert_eq!(request.image_png, vec![1, 2, 3]);
    }

    #[test]
    fn builder_is_deterministic() {
        let a = build_request(&snapshot());
        let b = build_request(&snapshot());
        assert_eq!(a.prompt, b.prompt);
        assert_eq!(a.image_png, b.image_png);
    }
}

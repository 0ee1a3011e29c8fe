//! Mock channel feedback seeding
//!
//! Generates demo feedback items for a channel so the board has something to
//! triage without a live ingest path. Content comes from fixed per-channel
//! templates; ids are unique per load so a channel can be unloaded and
//! reloaded cleanly.

use chrono::{Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::models::{
    AuthorMeta, Channel, ChannelPayload, Company, FeedbackItem, FeedbackStatus, Priority,
    feedback::{FeedbackContent, TranscriptMessage},
};

struct Template {
    author: &'static str,
    handle: Option<&'static str>,
    subject: Option<&'static str>,
    body: &'static str,
    priority: Priority,
    tags: &'static [&'static str],
}

fn templates(channel: Channel) -> &'static [Template] {
    match channel {
        Channel::Email => &[
            Template {
                author: "Priya Nair",
                handle: None,
                subject: Some("Double charged for my booking"),
                body: "I was charged twice for the same flight booking and the confirmation \
                       page showed an error the first time. Please refund the duplicate charge.",
                priority: Priority::High,
                tags: &["billing", "checkout"],
            },
            Template {
                author: "Tom Aldridge",
                handle: None,
                subject: Some("Feature request: price alerts"),
                body: "It would be great to get an email when prices drop for a saved route. \
                       Other sites have this and it is the main reason I still use them.",
                priority: Priority::Low,
                tags: &["feature-request", "pricing"],
            },
            Template {
                author: "Lena Fischer",
                handle: None,
                subject: Some("Cannot reset my password"),
                body: "The password reset link in the email leads to a page that just spins \
                       forever. Tried three browsers.",
                priority: Priority::Medium,
                tags: &["auth"],
            },
        ],
        Channel::Twitter => &[
            Template {
                author: "Marcus Webb",
                handle: Some("@mwebb_dev"),
                subject: None,
                body: "The date filter on the search page resets itself every time you change \
                       the destination. Infuriating.",
                priority: Priority::Medium,
                tags: &["search", "filters"],
            },
            Template {
                author: "Aisha Khan",
                handle: Some("@aisha_flies"),
                subject: None,
                body: "Checkout button literally does nothing on mobile Safari. Took my money \
                       elsewhere.",
                priority: Priority::Critical,
                tags: &["checkout", "mobile"],
            },
        ],
        Channel::Facebook => &[Template {
            author: "Dana Morales",
            handle: None,
            subject: None,
            body: "Why does the deals page show expired offers at the top? Scrolled past \
                   twelve dead deals before finding a live one.",
            priority: Priority::Medium,
            tags: &["deals", "sorting"],
        }],
        Channel::LiveChat => &[Template {
            author: "Victor Osei",
            handle: None,
            subject: None,
            body: "Agent transcript attached: customer could not apply a promo code at \
                   checkout; code reported invalid although it was within its validity window.",
            priority: Priority::High,
            tags: &["promo", "checkout"],
        }],
        Channel::Trustpilot => &[Template {
            author: "Ingrid Holm",
            handle: None,
            subject: Some("Misleading total price"),
            body: "The total at checkout was 40 euro higher than the price shown in search. \
                   Felt like a bait and switch. One star until this is fixed.",
            priority: Priority::High,
            tags: &["pricing", "trust"],
        }],
        Channel::AppStore => &[
            Template {
                author: "jdoe_2041",
                handle: None,
                subject: Some("Crashes on launch"),
                body: "App crashes immediately after the splash screen since the last update. \
                       Pixel 8, Android 15.",
                priority: Priority::Critical,
                tags: &["crash", "android"],
            },
            Template {
                author: "flywithme",
                handle: None,
                subject: Some("Love it, one nitpick"),
                body: "Great app overall but dark mode makes the seat map unreadable.",
                priority: Priority::Low,
                tags: &["dark-mode", "seat-map"],
            },
        ],
        Channel::Instagram => &[Template {
            author: "Sofia Ricci",
            handle: Some("@sofia.travels"),
            subject: None,
            body: "Tagged you in a story: the deal countdown timer shows negative numbers. \
                   Screenshot attached.",
            priority: Priority::Medium,
            tags: &["deals", "timer"],
        }],
    }
}

fn payload_for(channel: Channel, template: &Template) -> Option<ChannelPayload> {
    let mut rng = rand::thread_rng();
    match channel {
        Channel::Trustpilot | Channel::AppStore => Some(ChannelPayload::Rating {
            stars: if template.priority >= Priority::High {
                rng.gen_range(1..=2)
            } else {
                rng.gen_range(3..=5)
            },
        }),
        Channel::Twitter | Channel::Facebook | Channel::Instagram => {
            Some(ChannelPayload::Engagement {
                likes: rng.gen_range(0..500),
                shares: rng.gen_range(0..80),
                replies: rng.gen_range(0..120),
            })
        }
        Channel::LiveChat => Some(ChannelPayload::Transcript {
            messages: vec![
                TranscriptMessage {
                    speaker: "customer".to_string(),
                    text: "My promo code SAVE20 says invalid at checkout.".to_string(),
                    at: Utc::now() - Duration::minutes(12),
                },
                TranscriptMessage {
                    speaker: "agent".to_string(),
                    text: "I can reproduce that on my end, escalating to the product team."
                        .to_string(),
                    at: Utc::now() - Duration::minutes(9),
                },
            ],
        }),
        Channel::Email => None,
    }
}

/// Builds fresh mock items for one channel and company. Items always start
/// in `new` with no analysis attached.
pub fn mock_channel_items(channel: Channel, company: Company) -> Vec<FeedbackItem> {
    let mut rng = rand::thread_rng();
    templates(channel)
        .iter()
        .map(|template| {
            let suffix = Uuid::new_v4().simple().to_string();
            FeedbackItem {
                id: format!("{}-{}", channel.as_str(), &suffix[..8]),
                company,
                channel,
                created_at: Utc::now() - Duration::minutes(rng.gen_range(5..720)),
                status: FeedbackStatus::New,
                priority: template.priority,
                author: AuthorMeta {
                    name: template.author.to_string(),
                    handle: template.handle.map(str::to_string),
                    email: None,
                    followers: template
                        .handle
                        .map(|_| rng.gen_range(50..50_000)),
                    device: None,
                    verified: template.handle.map(|_| rng.gen_bool(0.2)),
                },
                content: FeedbackContent {
                    body: template.body.to_string(),
                    subject: template.subject.map(str::to_string),
                    excerpt: None,
                    translation: None,
                },
                payload: payload_for(channel, template),
                tags: template.tags.iter().map(|t| t.to_string()).collect(),
                analysis: None,
                linked: Default::default(),
                resolved_at: None,
                resolved_by: None,
                source: None,
            }
        })
        .collect()
}

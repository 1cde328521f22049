//! Demo content for local development.
//!
//! Seeding goes through the domain services, so every record passes the same
//! validation and slug rules as API traffic. The demo author's account doubles
//! as the marker: when its email is already registered the run is skipped.

use tracing::info;

use crate::domain::category::CategoryInput;
use crate::domain::newsletter::Subscription;
use crate::domain::post::PostInput;
use crate::domain::{Error, ErrorCode, Registration, User};
use crate::inbound::http::state::HttpState;

/// Email of the seeded author account.
pub const DEMO_AUTHOR_EMAIL: &str = "demo@example.com";
/// Email of the seeded reader account.
pub const DEMO_READER_EMAIL: &str = "reader@example.com";
/// Password shared by both demo accounts.
pub const DEMO_PASSWORD: &str = "demo-password";

struct DemoCategory {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    icon: &'static str,
}

const CATEGORIES: [DemoCategory; 3] = [
    DemoCategory {
        name: "Cloud & Infrastructure",
        slug: "cloud",
        description: "Cloud architecture, certifications and managed services",
        icon: "cloud",
    },
    DemoCategory {
        name: "DevOps & CI/CD",
        slug: "devops",
        description: "Pipelines, containers and infrastructure as code",
        icon: "server",
    },
    DemoCategory {
        name: "Homelab & Self-Hosting",
        slug: "homelab",
        description: "NAS builds, self-hosted services and home networking",
        icon: "home",
    },
];

struct DemoPost {
    title: &'static str,
    excerpt: &'static str,
    paragraph: &'static str,
    category: &'static str,
    tags: [&'static str; 2],
    featured: bool,
}

const POSTS: [DemoPost; 3] = [
    DemoPost {
        title: "Designing a Multi-Account Cloud Landing Zone",
        excerpt: "How to split workloads across accounts without losing oversight",
        paragraph: "Separate accounts give each workload its own blast radius and billing line. ",
        category: "cloud",
        tags: ["cloud", "architecture"],
        featured: true,
    },
    DemoPost {
        title: "Shipping Containers with a Minimal CI Pipeline",
        excerpt: "Build, scan and publish images with three pipeline stages",
        paragraph: "A short pipeline that builds, scans and pushes is easier to trust than a long one. ",
        category: "devops",
        tags: ["docker", "ci"],
        featured: false,
    },
    DemoPost {
        title: "A Quiet Homelab on Low-Power Hardware",
        excerpt: "Self-hosting the essentials on a small fanless box",
        paragraph: "Low-power hardware keeps the electricity bill and the noise floor down. ",
        category: "homelab",
        tags: ["homelab", "self-hosting"],
        featured: false,
    },
];

/// Result of a demo seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoSeedOutcome {
    /// Demo records were written.
    Applied {
        /// Categories created.
        categories: usize,
        /// Posts created.
        posts: usize,
    },
    /// The demo author already exists; nothing was written.
    AlreadySeeded,
}

/// Seed demo content when `enabled`.
///
/// # Errors
/// Propagates the first domain error other than the duplicate-account
/// conflict that marks a previous run.
pub async fn seed_demo_on_startup(
    enabled: bool,
    state: &HttpState,
) -> Result<Option<DemoSeedOutcome>, Error> {
    if !enabled {
        info!(reason = "disabled", "demo seeding skipped");
        return Ok(None);
    }
    let outcome = seed_demo_content(state).await?;
    match outcome {
        DemoSeedOutcome::Applied { categories, posts } => {
            info!(categories, posts, author = DEMO_AUTHOR_EMAIL, "demo content seeded");
        }
        DemoSeedOutcome::AlreadySeeded => {
            info!(author = DEMO_AUTHOR_EMAIL, "demo content already present; skipping");
        }
    }
    Ok(Some(outcome))
}

/// Write the demo accounts, categories, posts, a comment and a newsletter
/// subscriber.
///
/// # Errors
/// Propagates domain errors from the services.
pub async fn seed_demo_content(state: &HttpState) -> Result<DemoSeedOutcome, Error> {
    let Some(author) = register(state, "Demo Author", DEMO_AUTHOR_EMAIL).await? else {
        return Ok(DemoSeedOutcome::AlreadySeeded);
    };

    for category in &CATEGORIES {
        state
            .categories
            .create(CategoryInput {
                name: category.name.to_owned(),
                slug: Some(category.slug.to_owned()),
                description: Some(category.description.to_owned()),
                icon: Some(category.icon.to_owned()),
                ..CategoryInput::default()
            })
            .await?;
    }

    let mut slugs = Vec::with_capacity(POSTS.len());
    for post in &POSTS {
        let created = state
            .posts
            .create(
                PostInput {
                    title: post.title.to_owned(),
                    excerpt: post.excerpt.to_owned(),
                    content: post.paragraph.repeat(4),
                    category: post.category.to_owned(),
                    tags: post.tags.iter().map(|tag| (*tag).to_owned()).collect(),
                    status: Some("published".to_owned()),
                    featured: Some(post.featured),
                    ..PostInput::default()
                },
                &author,
            )
            .await?;
        slugs.push(created.post.slug);
    }

    if let (Some(reader), Some(first)) = (
        register(state, "Demo Reader", DEMO_READER_EMAIL).await?,
        slugs.first(),
    ) {
        state
            .comments
            .create(first, "Thanks, this cleared up a lot for me.", None, &reader)
            .await?;
        state.posts.toggle_like(first, &reader).await?;
    }

    let subscription =
        Subscription::try_from_parts(DEMO_READER_EMAIL, Some("Demo Reader"), &[], true)?;
    match state.newsletter.subscribe(subscription).await {
        Ok(_) => {}
        Err(err) if err.code() == ErrorCode::Conflict => {}
        Err(err) => return Err(err),
    }

    Ok(DemoSeedOutcome::Applied {
        categories: CATEGORIES.len(),
        posts: slugs.len(),
    })
}

/// Register a demo account, returning `None` when the email is taken.
async fn register(state: &HttpState, name: &str, email: &str) -> Result<Option<User>, Error> {
    let registration = Registration::try_from_parts(name, email, DEMO_PASSWORD, DEMO_PASSWORD)?;
    match state.auth.register(registration).await {
        Ok((user, _session)) => Ok(Some(user)),
        Err(err) if err.code() == ErrorCode::Conflict => Ok(None),
        Err(err) => Err(err),
    }
}

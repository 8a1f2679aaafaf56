use crate::models::all_models::{FeedPage, Post};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;

const SAMPLE_TITLES: [&str; 10] = [
    "The Future of Web Development",
    "Building Scalable React Applications",
    "Understanding Modern JavaScript",
    "CSS Grid vs Flexbox: When to Use What",
    "State Management in React",
    "TypeScript Best Practices",
    "Performance Optimization Tips",
    "Accessibility in Web Development",
    "Modern DevOps Practices",
    "API Design Principles",
];

const SAMPLE_CONTENT: [&str; 10] = [
    "Exploring the latest trends and technologies that are shaping the future of web development. From AI integration to progressive web apps, the landscape is evolving rapidly.",
    "Learn how to structure your React applications for maximum scalability and maintainability. We'll cover component architecture, state management, and testing strategies.",
    "Dive deep into modern JavaScript features including async/await, destructuring, modules, and more. Understanding these concepts is crucial for any web developer.",
    "A comprehensive comparison of CSS Grid and Flexbox, helping you understand when to use each layout method for optimal results in your web projects.",
    "Comparing different state management solutions for React applications, from Context API to Redux and Zustand. Find the right tool for your project.",
    "Essential TypeScript patterns and practices that will make your code more robust, maintainable, and developer-friendly.",
    "Practical tips for optimizing web application performance, including code splitting, lazy loading, and bundle optimization techniques.",
    "Making your web applications accessible to all users. Learn about ARIA, semantic HTML, and testing for accessibility compliance.",
    "Modern approaches to DevOps including containerization, CI/CD pipelines, and infrastructure as code for efficient development workflows.",
    "Best practices for designing RESTful APIs that are intuitive, scalable, and maintainable. Learn about versioning, documentation, and error handling.",
];

const AUTHORS: [&str; 5] = [
    "Alice Johnson",
    "Bob Smith",
    "Carol Davis",
    "David Wilson",
    "Eva Brown",
];

// Posts are backdated by up to a week
const MAX_AGE_MS: i64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy)]
pub struct FeedSettings {
    pub total_pages: u32,
    pub max_limit: u32,
}

impl Default for FeedSettings {
    fn default() -> Self {
        FeedSettings {
            total_pages: 15,
            max_limit: 50,
        }
    }
}

pub fn generate_posts<R: Rng>(page: u32, limit: u32, now: DateTime<Utc>, rng: &mut R) -> Vec<Post> {
    let start_id = u64::from(page.saturating_sub(1)) * u64::from(limit) + 1;

    (0..u64::from(limit))
        .map(|offset| {
            let id = start_id + offset;
            let slot = (id - 1) as usize;
            let age = Duration::milliseconds(rng.random_range(0..MAX_AGE_MS));
            Post {
                id: id.to_string(),
                title: SAMPLE_TITLES[slot % SAMPLE_TITLES.len()].to_string(),
                content: SAMPLE_CONTENT[slot % SAMPLE_CONTENT.len()].to_string(),
                author: AUTHORS[slot % AUTHORS.len()].to_string(),
                created_at: (now - age).to_rfc3339_opts(SecondsFormat::Millis, true),
                likes: rng.random_range(1..=100),
            }
        })
        .collect()
}

/// Builds one page of fabricated posts. `page` is at least 1 and `limit` is
/// capped at `max_limit`; a zero limit yields an empty page.
pub fn build_page<R: Rng>(
    settings: &FeedSettings,
    page: Option<u32>,
    limit: Option<u32>,
    rng: &mut R,
) -> FeedPage {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(10).min(settings.max_limit);

    FeedPage {
        posts: generate_posts(page, limit, Utc::now(), rng),
        has_more: page < settings.total_pages,
        page,
        total_pages: settings.total_pages,
    }
}

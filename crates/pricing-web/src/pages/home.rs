//! Home Page

use leptos::prelude::*;

use super::PricingSection;

const FEATURES: [(&str, &str); 7] = [
    ("Blog to Social Media", "Turn long-form posts into threads, carousels and captions."),
    ("Video to Blog & Email", "Transcribe videos into articles and newsletters."),
    ("Email to Social & Video", "Reshape campaigns into posts and short video scripts."),
    ("Any to All Formats", "One source, every channel your audience uses."),
    ("Save Time", "Hours of rewriting done in minutes."),
    ("Increase Reach", "Publish consistently on every platform."),
    ("Maintain Brand Voice", "Output that sounds like you, not a template."),
];

const TESTIMONIALS: [(&str, &str, &str); 3] = [
    (
        "Sarah Johnson",
        "Content Marketing Director",
        "We publish three times as much without growing the team.",
    ),
    (
        "Michael Chen",
        "Digital Marketing Lead",
        "Our webinars now become a week of social content automatically.",
    ),
    (
        "Aisha Patel",
        "CMO",
        "The brand voice stays consistent across every channel.",
    ),
];

const METRICS: [(&str, &str); 3] = [
    ("75%", "Time Saved"),
    ("60%", "Cost Reduction"),
    ("3x", "Reach Increase"),
];

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <header class="hero">
                <h1>"Tempo AI"</h1>
                <p class="tagline">"Repurpose every piece of content into every format"</p>
                <div class="cta">
                    <a href="#pricing" class="btn btn-primary">"Get Started"</a>
                    <a href="/pricing" class="btn">"View Plans"</a>
                </div>
            </header>

            <section class="workflow">
                <h2>"How it works"</h2>
                <ol>
                    <li>"Upload a blog post, video or email"</li>
                    <li>"Pick the formats you need"</li>
                    <li>"Review and publish"</li>
                </ol>
            </section>

            <section class="features">
                {FEATURES
                    .into_iter()
                    .map(|(title, body)| view! {
                        <div class="feature">
                            <h3>{title}</h3>
                            <p>{body}</p>
                        </div>
                    })
                    .collect_view()}
            </section>

            <section class="metrics">
                {METRICS
                    .into_iter()
                    .map(|(value, label)| view! {
                        <div class="metric">
                            <strong>{value}</strong>
                            <span>{label}</span>
                        </div>
                    })
                    .collect_view()}
            </section>

            <section class="testimonials">
                {TESTIMONIALS
                    .into_iter()
                    .map(|(name, role, quote)| view! {
                        <blockquote class="testimonial">
                            <p>{quote}</p>
                            <footer>{name}", "{role}</footer>
                        </blockquote>
                    })
                    .collect_view()}
            </section>

            <PricingSection />
        </div>
    }
}

//! UI Components

use leptos::prelude::*;
use pricing_core::{NoticeKind, Plan, PurchaseControl};

use crate::adapters::Toasts;

/// One plan tile with its subscribe button
#[component]
pub fn PlanCard(
    plan: Plan,
    #[prop(into)] control: Signal<PurchaseControl>,
    on_checkout: Callback<Plan>,
) -> impl IntoView {
    let class = if plan.highlighted { "plan featured" } else { "plan" };
    let button_class = if plan.highlighted { "btn btn-primary" } else { "btn" };
    let name = plan.display_name().to_string();
    let cadence = plan.cadence_label();
    let price = plan.price_label();
    let features: Vec<String> = plan.feature_lines().map(str::to_string).collect();
    let highlighted = plan.highlighted;

    view! {
        <div class=class>
            {highlighted.then(|| view! { <span class="badge">"Recommended"</span> })}
            <h2>{name}</h2>
            <p class="cadence">{cadence}</p>
            {price.map(|(amount, suffix)| view! {
                <div class="price">{amount}<span>{suffix}</span></div>
            })}
            <ul>
                {features.into_iter().map(|line| view! { <li>{line}</li> }).collect_view()}
            </ul>
            <button
                class=button_class
                disabled=move || control.get() != PurchaseControl::Ready
                on:click=move |_| on_checkout.run(plan.clone())
            >
                {move || match control.get() {
                    PurchaseControl::Processing => "Processing...",
                    PurchaseControl::Ready | PurchaseControl::Disabled => "Subscribe Now",
                }}
            </button>
        </div>
    }
}

/// Dismissible error alert, hidden while `message` is `None`
#[component]
pub fn ErrorBanner(
    #[prop(into)] message: Signal<Option<String>>,
    on_dismiss: Callback<()>,
) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div class="alert alert-error" role="alert">
                <p>{move || message.get().unwrap_or_default()}</p>
                <button class="btn" on:click=move |_| on_dismiss.run(())>"Dismiss"</button>
            </div>
        </Show>
    }
}

/// Renders the toast queue from context
#[component]
pub fn Toaster() -> impl IntoView {
    let toasts = expect_context::<Toasts>();

    view! {
        <div class="toasts">
            <For
                each=move || toasts.items()
                key=|toast| toast.id
                children=move |toast| {
                    let class = match toast.notice.kind {
                        NoticeKind::Info => "toast",
                        NoticeKind::Destructive => "toast toast-destructive",
                    };
                    let id = toast.id;
                    view! {
                        <div class=class role="status" on:click=move |_| toasts.dismiss(id)>
                            <strong>{toast.notice.title}</strong>
                            <p>{toast.notice.description}</p>
                        </div>
                    }
                }
            />
        </div>
    }
}

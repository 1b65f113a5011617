//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::adapters::Toasts;
use crate::components::Toaster;
use crate::pages::{HomePage, PricingPage};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_context(Toasts::new());

    view! {
        <Router>
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/pricing") view=PricingPage />
                </Routes>
            </main>
            <Toaster />
        </Router>
    }
}

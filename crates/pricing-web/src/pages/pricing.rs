//! Pricing Section
//!
//! Loads the plan catalog once per mount and starts checkout from the
//! plan cards. Loader and initiator state reach the view through signals.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use pricing_core::checkout::purchase_control;
use pricing_core::{CatalogState, CheckoutInitiator, CheckoutState, Plan, PlanCatalogLoader, PlanSource};
use pricing_runtime::{FunctionsClient, FunctionsConfig};
use tokio::sync::watch;

use crate::adapters::{BrowserNavigator, SessionAuth, Toasts};
use crate::components::{ErrorBanner, PlanCard};

#[component]
pub fn PricingPage() -> impl IntoView {
    view! {
        <div class="pricing-page">
            <PricingSection />
        </div>
    }
}

#[component]
pub fn PricingSection() -> impl IntoView {
    let toasts = expect_context::<Toasts>();
    let catalog = RwSignal::new(CatalogState::NotStarted);
    let checkout = RwSignal::new(CheckoutState::Idle);
    let checkout_error = RwSignal::new(None::<String>);
    let load_error_dismissed = RwSignal::new(false);

    let initiator = match FunctionsConfig::from_build_env() {
        Ok(config) => {
            let client = Rc::new(FunctionsClient::new(config));
            load_catalog(client.clone(), catalog);

            let initiator = Rc::new(CheckoutInitiator::new(
                client.clone(),
                Rc::new(SessionAuth::for_project(client.config())),
                Rc::new(toasts),
                Rc::new(BrowserNavigator),
            ));
            mirror(initiator.subscribe(), checkout);
            mirror(initiator.subscribe_errors(), checkout_error);
            Some(initiator)
        }
        Err(e) => {
            leptos::logging::error!("Pricing unavailable: {e}");
            catalog.set(CatalogState::Failed(e.user_message()));
            None
        }
    };
    let initiator = StoredValue::new_local(initiator);

    let on_checkout = Callback::new(move |plan: Plan| {
        let Some(initiator) = initiator.get_value() else {
            return;
        };
        spawn_local(async move {
            let outcome = initiator.initiate_plan(&plan).await;
            leptos::logging::log!("Checkout for {}: {outcome:?}", plan.id);
        });
    });

    let dismiss_checkout_error = Callback::new(move |()| {
        initiator.with_value(|initiator| {
            if let Some(initiator) = initiator {
                initiator.dismiss_error();
            }
        });
    });

    let load_error = Signal::derive(move || {
        if load_error_dismissed.get() {
            None
        } else {
            catalog.with(|c| c.error().map(str::to_string))
        }
    });

    view! {
        <section class="pricing" id="pricing">
            <h1>"Pricing"</h1>
            <p class="subtitle">"Choose the plan that fits your content workflow"</p>

            <ErrorBanner
                message=load_error
                on_dismiss=Callback::new(move |()| load_error_dismissed.set(true))
            />
            <ErrorBanner message=checkout_error on_dismiss=dismiss_checkout_error />

            <Show when=move || catalog.with(CatalogState::is_loading)>
                <p class="loading">"Loading plans..."</p>
            </Show>
            <Show when=move || catalog.with(|c| matches!(c, CatalogState::Loaded(plans) if plans.is_empty()))>
                <p class="empty">"No plans are available right now."</p>
            </Show>

            <div class="plans">
                <For
                    each=move || catalog.with(|c| c.plans().to_vec())
                    key=|plan| plan.id.clone()
                    children=move |plan| {
                        let tile = plan.clone();
                        let control = Signal::derive(move || {
                            checkout.with(|state| purchase_control(&tile, state))
                        });
                        view! { <PlanCard plan=plan control=control on_checkout=on_checkout /> }
                    }
                />
            </div>
        </section>
    }
}

/// Run one catalog load and publish the result
fn load_catalog(source: Rc<dyn PlanSource>, catalog: RwSignal<CatalogState>) {
    let loader = PlanCatalogLoader::new(source);
    catalog.set(CatalogState::Loading);

    spawn_local(async move {
        if let Err(e) = loader.load().await {
            leptos::logging::warn!("Plan catalog failed to load: {e}");
        }
        catalog.try_set(loader.state());
    });
}

/// Forward watch updates into a signal until either side goes away
fn mirror<T>(mut rx: watch::Receiver<T>, signal: RwSignal<T>)
where
    T: Clone + Send + Sync + 'static,
{
    spawn_local(async move {
        while rx.changed().await.is_ok() {
            let value = rx.borrow_and_update().clone();
            if signal.try_set(value).is_some() {
                break;
            }
        }
    });
}

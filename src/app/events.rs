//! Background request plumbing
//!
//! Requests run on the app's tokio runtime. Each finished request pushes one
//! event into the inbox and wakes the UI; the next frame drains the inbox and
//! applies the result. The frame loop itself never waits on the network.

use super::App;
use crate::api::{ApiClient, ApiError};
use crate::types::{CreatedOrder, Order, RestaurantPage, User};
use std::future::Future;
use std::sync::PoisonError;
use tracing::debug;

pub(crate) enum ApiEvent {
    LoggedIn(Result<Option<String>, ApiError>),
    LoggedOut(Result<(), ApiError>),
    Profile(Result<User, ApiError>),
    RestaurantsLoaded { page: u32, result: Result<RestaurantPage, ApiError> },
    RestaurantCreated(Result<(), ApiError>),
    MenuItemCreated(Result<(), ApiError>),
    OrderPlaced(Result<CreatedOrder, ApiError>),
    OrdersLoaded(Result<(User, Vec<Order>), OrdersLoadError>),
    OrderCancelled { id: String, result: Result<(), ApiError> },
    PayPageLoaded { id: String, result: PayPageLoad },
    OrderPaid(Result<Order, ApiError>),
}

/// Which of the two orders-page requests failed
pub(crate) enum OrdersLoadError {
    Profile(ApiError),
    Orders(ApiError),
}

/// Outcome of opening the pay page
pub(crate) enum PayPageLoad {
    Loaded(User, Order),
    /// The server rejected the session cookie
    NoSession,
    /// `/auth/me` answered with some other error status
    ProfileRejected,
    Forbidden(User),
    OrderMissing(User),
    Failed(ApiError),
}

impl App {
    /// Run `job` against the API client in the background
    pub(crate) fn spawn_request<F, Fut>(&self, job: F)
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: Future<Output = ApiEvent> + Send + 'static,
    {
        let future = job(self.api.clone());
        let inbox = self.inbox.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let event = future.await;
            inbox.lock().unwrap_or_else(PoisonError::into_inner).push(event);
            ctx.request_repaint();
        });
    }

    /// Apply every finished request
    pub(crate) fn poll_events(&mut self) {
        let events: Vec<ApiEvent> = {
            let mut inbox = self.inbox.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *inbox)
        };

        for event in events {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::LoggedIn(result) => self.on_logged_in(result),
            ApiEvent::LoggedOut(result) => self.on_logged_out(result),
            ApiEvent::Profile(result) => self.on_profile(result),
            ApiEvent::RestaurantsLoaded { page, result } => self.on_restaurants_loaded(page, result),
            ApiEvent::RestaurantCreated(result) => self.on_restaurant_created(result),
            ApiEvent::MenuItemCreated(result) => self.on_menu_item_created(result),
            ApiEvent::OrderPlaced(result) => self.on_order_placed(result),
            ApiEvent::OrdersLoaded(result) => self.on_orders_loaded(result),
            ApiEvent::OrderCancelled { id, result } => self.on_order_cancelled(id, result),
            ApiEvent::PayPageLoaded { id, result } => self.on_pay_page_loaded(id, result),
            ApiEvent::OrderPaid(result) => self.on_order_paid(result),
        }
        debug!(route = %self.route.path(), "Event applied");
    }
}

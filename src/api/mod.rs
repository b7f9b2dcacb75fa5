//! HTTP client for the Slooze ordering API
//!
//! Every call is cookie-authenticated: the `access_token` cookie set by
//! `POST /auth/login` lives in the client's cookie jar and is sent back on
//! each request. A token restored from disk is seeded into the jar.

mod error;

pub use error::ApiError;

use crate::constants::{REQUEST_TIMEOUT_SECS, SESSION_COOKIE};
use crate::types::*;
use error::map_status_error;
use reqwest::cookie::Jar;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    jar: Arc<Jar>,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, session_token: Option<&str>) -> Result<Self, ApiError> {
        let base = normalize_base(base_url)?;
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let client = Self { http, jar, base };
        if let Some(token) = session_token {
            client.seed_session(token);
        }
        debug!(base = %client.base, "API client ready");
        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn seed_session(&self, token: &str) {
        self.jar
            .add_cookie_str(&format!("{SESSION_COOKIE}={token}; Path=/"), &self.base);
    }

    /// Forget the session cookie without asking the server
    pub fn drop_session(&self) {
        self.jar
            .add_cookie_str(&format!("{SESSION_COOKIE}=; Path=/; Max-Age=0"), &self.base);
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    // ========================================================================
    // AUTH
    // ========================================================================

    /// `POST /auth/login`; returns the session token the server set, if visible
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<String>, ApiError> {
        let request = self
            .http
            .post(self.endpoint("auth/login")?)
            .json(&LoginRequest { email, password });
        let response = request.send().await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(ApiError::InvalidCredentials);
        }
        let response = check_status(response).await?;
        let token = response
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.value().to_string());
        info!(has_token = token.is_some(), "Logged in");
        Ok(token)
    }

    /// `GET /auth/me`
    pub async fn me(&self) -> Result<User, ApiError> {
        let response = self.send(self.http.get(self.endpoint("auth/me")?)).await?;
        decode(response).await
    }

    /// `GET /auth/logout`
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send(self.http.get(self.endpoint("auth/logout")?)).await?;
        self.drop_session();
        info!("Logged out");
        Ok(())
    }

    // ========================================================================
    // RESTAURANTS
    // ========================================================================

    /// `GET /restaurants?page&limit`
    pub async fn restaurants(&self, page: u32, limit: u32) -> Result<RestaurantPage, ApiError> {
        let request = self
            .http
            .get(self.endpoint("restaurants")?)
            .query(&[("page", page), ("limit", limit)]);
        let page: RestaurantPage = decode(self.send(request).await?).await?;
        debug!(count = page.data.len(), page = page.meta.page, "Restaurants fetched");
        Ok(page)
    }

    /// `POST /restaurants`
    pub async fn create_restaurant(&self, restaurant: &NewRestaurant) -> Result<(), ApiError> {
        let request = self.http.post(self.endpoint("restaurants")?).json(restaurant);
        self.send(request).await?;
        info!(name = %restaurant.name, country = %restaurant.country, "Restaurant created");
        Ok(())
    }

    /// `POST /items`
    pub async fn create_item(&self, item: &NewMenuItem) -> Result<(), ApiError> {
        let request = self.http.post(self.endpoint("items")?).json(item);
        self.send(request).await?;
        info!(name = %item.name, restaurant = %item.restaurant_id, "Menu item created");
        Ok(())
    }

    // ========================================================================
    // ORDERS
    // ========================================================================

    /// `POST /orders`
    pub async fn create_order(&self, order: &CreateOrder) -> Result<CreatedOrder, ApiError> {
        let request = self.http.post(self.endpoint("orders")?).json(order);
        let created: CreatedOrder = decode(self.send(request).await?).await?;
        info!(id = ?created.id, lines = order.items.len(), "Order placed");
        Ok(created)
    }

    /// `GET /orders`
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        decode(self.send(self.http.get(self.endpoint("orders")?)).await?).await
    }

    /// `GET /orders/:id`
    pub async fn order(&self, id: &str) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("orders/{id}"))?;
        decode(self.send(self.http.get(url)).await?).await
    }

    /// `PATCH /orders/:id/pay`
    pub async fn pay_order(&self, id: &str, payment: &Payment) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("orders/{id}/pay"))?;
        let order: Order = decode(self.send(self.http.patch(url).json(payment)).await?).await?;
        info!(id = %id, status = %order.status, "Order paid");
        Ok(order)
    }

    /// `PATCH /orders/:id/cancel`
    pub async fn cancel_order(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("orders/{id}/cancel"))?;
        self.send(self.http.patch(url)).await?;
        info!(id = %id, "Order cancelled");
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        check_status(request.send().await?).await
    }
}

fn normalize_base(base_url: &str) -> Result<Url, ApiError> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|e| ApiError::InvalidUrl(format!("{trimmed}: {e}")))
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.bytes().await.unwrap_or_default();
    debug!(status = status.as_u16(), path = %url, "Request rejected");
    Err(map_status_error(status, &body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{block_on, response, serve, user_json};
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:8080", "auth/login", "http://localhost:8080/auth/login")]
    #[case("http://localhost:8080/", "/orders/abc/pay", "http://localhost:8080/orders/abc/pay")]
    #[case("https://api.slooze.test/v1", "restaurants", "https://api.slooze.test/v1/restaurants")]
    fn endpoints_are_joined_under_the_base(
        #[case] base: &str,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        let client = ApiClient::new(base, None).expect("client builds");
        assert_eq!(client.endpoint(path).expect("joins").as_str(), expected);
    }

    #[test]
    fn rejects_unparseable_base() {
        let error = ApiClient::new("not a url", None).err().expect("must fail");
        assert!(matches!(error, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn restored_token_is_sent_as_cookie() {
        use reqwest::cookie::CookieStore;

        let client = ApiClient::new("http://localhost:8080", Some("tok123")).expect("client");
        let url = client.endpoint("orders").expect("url");
        let header = client.jar.cookies(&url).expect("cookie header");
        assert_eq!(header.to_str().expect("ascii"), "access_token=tok123");
    }

    #[test]
    fn login_conflict_means_invalid_credentials() {
        let base = serve(vec![response("409 Conflict", &[], r#"{"message":"Invalid credentials"}"#)]);
        let client = ApiClient::new(&base, None).expect("client");
        let result = block_on(client.login("mia@slooze.xyz", "wrong"));
        assert!(matches!(result, Err(ApiError::InvalidCredentials)));
    }

    #[test]
    fn login_captures_session_cookie_and_reuses_it() {
        use reqwest::cookie::CookieStore;

        let base = serve(vec![
            response("200 OK", &["Set-Cookie: access_token=tok-42; Path=/; HttpOnly"], "{}"),
            response("200 OK", &[], &user_json("MEMBER")),
        ]);
        let client = ApiClient::new(&base, None).expect("client");

        let token = block_on(client.login("mia@slooze.xyz", "secret")).expect("login");
        assert_eq!(token.as_deref(), Some("tok-42"));

        let url = client.endpoint("auth/me").expect("url");
        let header = client.jar.cookies(&url).expect("cookie header");
        assert_eq!(header.to_str().expect("ascii"), "access_token=tok-42");

        let user = block_on(client.me()).expect("profile");
        assert_eq!(user.role, Role::Member);
    }

    #[test]
    fn error_status_keeps_server_message() {
        let base = serve(vec![response("500 Internal Server Error", &[], r#"{"message":"boom"}"#)]);
        let client = ApiClient::new(&base, None).expect("client");
        let error = block_on(client.me()).expect_err("server error");
        assert_eq!(error.status(), Some(500));
        assert_eq!(error.message_or("fallback"), "boom");
    }
}

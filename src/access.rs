//! Route protection and role-based visibility
//!
//! The backend enforces authorization; these rules only decide what the
//! client shows and where it navigates.

use crate::types::Role;

/// Pages of the client, addressed by the same paths the web client used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Restaurants,
    Cart,
    Orders,
    Pay(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Restaurants => "/restaurants".to_string(),
            Route::Cart => "/cart".to_string(),
            Route::Orders => "/orders".to_string(),
            Route::Pay(id) => format!("/orders/{id}/pay"),
        }
    }
}

const PROTECTED_PREFIXES: [&str; 2] = ["/restaurants", "/cart"];

/// Where to go instead of `path`, if anywhere
pub fn redirect(path: &str, has_token: bool) -> Option<Route> {
    if path == "/" {
        return Some(if has_token { Route::Restaurants } else { Route::Login });
    }
    if path.starts_with("/login") && has_token {
        return Some(Route::Restaurants);
    }
    if !has_token && PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return Some(Route::Login);
    }
    None
}

/// What the current user may see and do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub use_cart: bool,
    pub manage_restaurants: bool,
    pub choose_country: bool,
    pub cancel_orders: bool,
    pub pay_orders: bool,
}

impl Capabilities {
    /// `None` means the profile has not been loaded
    pub fn for_role(role: Option<Role>) -> Self {
        let staff = role.is_some_and(Role::is_staff);
        Self {
            use_cart: !staff,
            manage_restaurants: staff,
            choose_country: role == Some(Role::Admin),
            cancel_orders: staff,
            pay_orders: role == Some(Role::Member),
        }
    }
}

/// Country sent when creating a restaurant; managers are pinned to their own
pub fn restaurant_country(role: Option<Role>, user_country: Option<&str>, chosen: &str) -> String {
    match (role, user_country) {
        (Some(Role::Manager), Some(country)) => country.to_string(),
        _ => chosen.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::root_with_token("/", true, Some(Route::Restaurants))]
    #[case::root_without_token("/", false, Some(Route::Login))]
    #[case::login_with_token("/login", true, Some(Route::Restaurants))]
    #[case::login_without_token("/login", false, None)]
    #[case::restaurants_without_token("/restaurants", false, Some(Route::Login))]
    #[case::cart_without_token("/cart", false, Some(Route::Login))]
    #[case::cart_with_token("/cart", true, None)]
    #[case::orders_unguarded("/orders", false, None)]
    #[case::pay_unguarded("/orders/o1/pay", false, None)]
    fn redirect_rules(#[case] path: &str, #[case] token: bool, #[case] expected: Option<Route>) {
        assert_eq!(redirect(path, token), expected);
    }

    #[rstest]
    #[case(Route::Root, "/")]
    #[case(Route::Cart, "/cart")]
    #[case(Route::Pay("8a1f".into()), "/orders/8a1f/pay")]
    fn routes_have_web_paths(#[case] route: Route, #[case] path: &str) {
        assert_eq!(route.path(), path);
    }

    #[test]
    fn pay_path_is_not_guarded_even_without_token() {
        assert_eq!(redirect(&Route::Pay("x".into()).path(), false), None);
    }

    #[rstest]
    #[case::admin(Some(Role::Admin), false, true, true, true, false)]
    #[case::manager(Some(Role::Manager), false, true, false, true, false)]
    #[case::member(Some(Role::Member), true, false, false, false, true)]
    #[case::unknown_role(Some(Role::Other), true, false, false, false, false)]
    #[case::not_loaded(None, true, false, false, false, false)]
    fn capabilities_by_role(
        #[case] role: Option<Role>,
        #[case] use_cart: bool,
        #[case] manage: bool,
        #[case] country: bool,
        #[case] cancel: bool,
        #[case] pay: bool,
    ) {
        let caps = Capabilities::for_role(role);
        assert_eq!(caps.use_cart, use_cart, "cart");
        assert_eq!(caps.manage_restaurants, manage, "manage");
        assert_eq!(caps.choose_country, country, "country");
        assert_eq!(caps.cancel_orders, cancel, "cancel");
        assert_eq!(caps.pay_orders, pay, "pay");
    }

    #[test]
    fn manager_restaurants_use_manager_country() {
        assert_eq!(restaurant_country(Some(Role::Manager), Some("AMERICA"), "INDIA"), "AMERICA");
        assert_eq!(restaurant_country(Some(Role::Admin), Some("AMERICA"), "INDIA"), "INDIA");
        assert_eq!(restaurant_country(None, None, "INDIA"), "INDIA");
    }
}

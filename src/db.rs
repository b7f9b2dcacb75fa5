//! Local storage for the Slooze client
//! Key/value SQLite store holding the cart and the session token

use crate::cart::{Cart, CartItem};
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::Path;
use tracing::{debug, warn};

const CART_KEY: &str = "cart";
const SESSION_KEY: &str = "access_token";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        debug!(path = %path.display(), "Database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Self { conn: Connection::open_in_memory()? };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM storage WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM storage WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Load the stored cart; unreadable contents yield an empty cart
    pub fn load_cart(&self) -> Result<Cart> {
        let Some(raw) = self.get(CART_KEY)? else {
            return Ok(Cart::default());
        };
        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => {
                let cart = Cart::from_items(items);
                debug!(lines = cart.len(), "Cart loaded");
                Ok(cart)
            }
            Err(e) => {
                warn!(error = %e, "Stored cart is unreadable, starting empty");
                Ok(Cart::default())
            }
        }
    }

    /// Overwrite the stored cart
    pub fn save_cart(&self, cart: &Cart) -> Result<()> {
        let json = serde_json::to_string(cart.items())
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        self.set(CART_KEY, &json)
    }

    pub fn clear_cart(&self) -> Result<()> {
        self.remove(CART_KEY)
    }

    pub fn session_token(&self) -> Result<Option<String>> {
        self.get(SESSION_KEY)
    }

    pub fn set_session_token(&self, token: &str) -> Result<()> {
        self.set(SESSION_KEY, token)
    }

    pub fn clear_session_token(&self) -> Result<()> {
        self.remove(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MenuItem, Restaurant};
    use tempfile::TempDir;

    fn sample_cart() -> Cart {
        let restaurant = Restaurant {
            id: "r1".into(),
            name: "Spice Hub".into(),
            country: "INDIA".into(),
            created_at: String::new(),
            menu_items: Vec::new(),
        };
        let mut cart = Cart::default();
        cart.add(&MenuItem { id: "m1".into(), name: "Dal".into(), price: 120.0 }, &restaurant, 2);
        cart.add(&MenuItem { id: "m2".into(), name: "Naan".into(), price: 30.0 }, &restaurant, 4);
        cart
    }

    #[test]
    fn empty_store_has_empty_cart_and_no_session() {
        let db = Database::open_in_memory().expect("db");
        assert!(db.load_cart().expect("load").is_empty());
        assert_eq!(db.session_token().expect("token"), None);
    }

    #[test]
    fn cart_survives_reopen() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("slooze.db");
        {
            let db = Database::open(&path).expect("db");
            db.save_cart(&sample_cart()).expect("save");
        }
        let db = Database::open(&path).expect("reopen");
        let cart = db.load_cart().expect("load");
        assert_eq!(cart, sample_cart());
        assert_eq!(cart.total(), 360.0);
    }

    #[test]
    fn save_replaces_previous_cart() {
        let db = Database::open_in_memory().expect("db");
        db.save_cart(&sample_cart()).expect("save");
        let mut smaller = sample_cart();
        smaller.clear();
        db.save_cart(&smaller).expect("save");
        assert!(db.load_cart().expect("load").is_empty());

        db.save_cart(&sample_cart()).expect("save");
        db.clear_cart().expect("clear");
        assert!(db.load_cart().expect("load").is_empty());
    }

    #[test]
    fn corrupt_cart_is_treated_as_empty() {
        let db = Database::open_in_memory().expect("db");
        db.set(CART_KEY, "[{\"id\":").expect("set");
        assert!(db.load_cart().expect("load").is_empty());
    }

    #[test]
    fn session_token_set_and_clear() {
        let db = Database::open_in_memory().expect("db");
        db.set_session_token("abc").expect("set");
        db.set_session_token("def").expect("overwrite");
        assert_eq!(db.session_token().expect("get").as_deref(), Some("def"));
        db.clear_session_token().expect("clear");
        assert_eq!(db.session_token().expect("get"), None);
    }
}

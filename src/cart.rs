//! Shopping cart kept on the local machine
//!
//! Entries are keyed by menu item id plus restaurant id, so the same item id
//! offered by two restaurants stays two separate lines. Quantities never drop
//! below one; removing a line is an explicit action.

use crate::types::{MenuItem, OrderLine, Restaurant};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifies one cart line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey {
    pub item_id: String,
    pub restaurant_id: String,
}

impl CartKey {
    pub fn new(restaurant_id: &str, item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            restaurant_id: restaurant_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Older records spelled this `quantity`
    #[serde(alias = "quantity", default = "one", deserialize_with = "at_least_one")]
    pub qty: u32,
    #[serde(default)]
    pub restaurant_id: String,
    #[serde(default)]
    pub restaurant_name: String,
}

impl CartItem {
    pub fn key(&self) -> CartKey {
        CartKey::new(&self.restaurant_id, &self.id)
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.qty)
    }
}

fn one() -> u32 {
    1
}

fn at_least_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let qty = Option::<u32>::deserialize(deserializer)?;
    Ok(qty.unwrap_or(1).max(1))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Build a cart from stored lines, folding duplicates together
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::default();
        for mut item in items {
            item.qty = item.qty.max(1);
            match cart.position(&item.key()) {
                Some(idx) => cart.items[idx].qty += item.qty,
                None => cart.items.push(item),
            }
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `qty` of a menu item; merges into an existing line for the same
    /// item and restaurant. Returns the quantity actually added.
    pub fn add(&mut self, item: &MenuItem, restaurant: &Restaurant, qty: u32) -> u32 {
        let qty = qty.max(1);
        let key = CartKey::new(&restaurant.id, &item.id);
        match self.position(&key) {
            Some(idx) => self.items[idx].qty += qty,
            None => self.items.push(CartItem {
                id: item.id.clone(),
                name: item.name.clone(),
                price: item.price,
                qty,
                restaurant_id: restaurant.id.clone(),
                restaurant_name: restaurant.name.clone(),
            }),
        }
        qty
    }

    pub fn increase(&mut self, key: &CartKey) {
        if let Some(idx) = self.position(key) {
            self.items[idx].qty += 1;
        }
    }

    pub fn decrease(&mut self, key: &CartKey) {
        if let Some(idx) = self.position(key) {
            let item = &mut self.items[idx];
            if item.qty > 1 {
                item.qty -= 1;
            }
        }
    }

    pub fn remove(&mut self, key: &CartKey) {
        self.items.retain(|item| &item.key() != key);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Line items for `POST /orders`
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                menu_item_id: item.id.clone(),
                quantity: item.qty,
                restaurant_id: item.restaurant_id.clone(),
            })
            .collect()
    }

    fn position(&self, key: &CartKey) -> Option<usize> {
        self.items
            .iter()
            .position(|c| c.id == key.item_id && c.restaurant_id == key.restaurant_id)
    }
}

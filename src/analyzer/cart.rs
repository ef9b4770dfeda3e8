use crate::model::{Product, Store};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Session cart: product name -> quantity, in the order items were added.
///
/// Serialized as a plain JSON object, `{"Omo 1kg": 2, "Fresh Milk 500ml": 1}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product: String,
    pub quantity: u32,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn quantity_of(&self, product: &str) -> u32 {
        self.items
            .iter()
            .find(|i| i.product == product)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    pub fn add(&mut self, product: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.items.iter_mut().find(|i| i.product == product) {
            Some(item) => item.quantity += quantity,
            None => self.items.push(CartItem {
                product: product.to_string(),
                quantity,
            }),
        }
    }

    pub fn remove(&mut self, product: &str) {
        self.items.retain(|i| i.product != product);
    }

    /// Sets the quantity outright; zero drops the item.
    pub fn update(&mut self, product: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(product);
            return;
        }
        match self.items.iter_mut().find(|i| i.product == product) {
            Some(item) => item.quantity = quantity,
            None => self.items.push(CartItem {
                product: product.to_string(),
                quantity,
            }),
        }
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for item in &self.items {
            map.serialize_entry(&item.product, &item.quantity)?;
        }
        map.end()
    }
}

struct CartVisitor;

impl<'de> Visitor<'de> for CartVisitor {
    type Value = Cart;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of product name to quantity")
    }

    // Entries go through `add`, so zero quantities are dropped and repeats accumulate
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Cart, A::Error> {
        let mut cart = Cart::new();
        while let Some((product, quantity)) = access.next_entry::<String, u32>()? {
            cart.add(&product, quantity);
        }
        Ok(cart)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CartVisitor)
    }
}

impl FromIterator<(String, u32)> for Cart {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        let mut cart = Cart::new();
        for (product, quantity) in iter {
            cart.add(&product, quantity);
        }
        cart
    }
}

/// What the whole cart costs at each store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartComparison {
    pub by_store: BTreeMap<Store, f64>,
    pub best_store: Option<Store>,
    pub best_price: f64,
    pub max_savings: f64,
    /// Every store stocks at least part of the cart.
    pub has_all_stores: bool,
}

/// Totals `(product, quantity)` pairs per store. Stores with a zero total are
/// left out of the best-store and savings figures.
pub fn compare_cart(items: &[(Product, u32)]) -> CartComparison {
    let mut by_store: BTreeMap<Store, f64> = Store::ALL.iter().map(|s| (*s, 0.0)).collect();

    for (product, quantity) in items {
        for store in Store::ALL {
            if let Some(price) = product.price_at(store).current.filter(|p| *p != 0.0) {
                *by_store.entry(store).or_insert(0.0) += price * f64::from(*quantity);
            }
        }
    }

    let valid: Vec<(Store, f64)> = by_store
        .iter()
        .filter(|(_, total)| **total > 0.0)
        .map(|(s, t)| (*s, *t))
        .collect();

    let (best_store, best_price, max_savings) = match valid.first() {
        Some(&first) => {
            let (store, low) = valid
                .iter()
                .skip(1)
                .fold(first, |best, &(s, t)| if t < best.1 { (s, t) } else { best });
            let high = valid.iter().map(|(_, t)| *t).fold(f64::MIN, f64::max);
            (Some(store), low, high - low)
        }
        None => (None, 0.0, 0.0),
    };

    CartComparison {
        has_all_stores: !items.is_empty() && by_store.values().all(|t| *t > 0.0),
        by_store,
        best_store,
        best_price,
        max_savings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StorePrice;

    fn product(name: &str, current: [Option<f64>; 3]) -> Product {
        Product {
            name: name.to_string(),
            prices: Store::ALL
                .iter()
                .zip(current)
                .map(|(s, c)| (*s, StorePrice { current: c, original: None }))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_accumulates_and_keeps_order() {
        let mut cart = Cart::new();
        cart.add("Omo 1kg", 1);
        cart.add("Brookside Milk", 2);
        cart.add("Omo 1kg", 3);

        assert_eq!(cart.quantity_of("Omo 1kg"), 4);
        assert_eq!(cart.items()[0].product, "Omo 1kg");
        assert_eq!(cart.items()[1].product, "Brookside Milk");
    }

    #[test]
    fn test_update_and_remove() {
        let mut cart: Cart = vec![("Omo 1kg".to_string(), 2), ("Sugar".to_string(), 1)]
            .into_iter()
            .collect();
        cart.update("Omo 1kg", 5);
        assert_eq!(cart.quantity_of("Omo 1kg"), 5);

        cart.update("Omo 1kg", 0);
        assert_eq!(cart.quantity_of("Omo 1kg"), 0);

        cart.remove("Sugar");
        cart.remove("Not there");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_file_is_a_name_to_quantity_map() {
        let cart: Cart =
            serde_json::from_str(r#"{"Omo 1kg": 2, "Fresh Milk 500ml": 1, "Sugar": 0}"#).unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].product, "Omo 1kg");
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[1].product, "Fresh Milk 500ml");
        assert_eq!(cart.quantity_of("Fresh Milk 500ml"), 1);
        assert_eq!(cart.quantity_of("Sugar"), 0);

        assert_eq!(
            serde_json::to_string(&cart).unwrap(),
            r#"{"Omo 1kg":2,"Fresh Milk 500ml":1}"#
        );
    }

    #[test]
    fn test_cart_file_rejects_item_list() {
        let result: Result<Cart, _> =
            serde_json::from_str(r#"{"items": [{"product": "Omo 1kg", "quantity": 2}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_compare_cart_picks_cheapest_store() {
        let items = vec![
            (product("Milk", [Some(60.0), Some(55.0), Some(58.0)]), 2),
            (product("Rice", [Some(300.0), Some(320.0), None]), 1),
        ];
        let cmp = compare_cart(&items);

        assert_eq!(cmp.by_store[&Store::Carrefour], 420.0);
        assert_eq!(cmp.by_store[&Store::Naivas], 430.0);
        assert_eq!(cmp.by_store[&Store::Quickmart], 116.0);
        assert_eq!(cmp.best_store, Some(Store::Quickmart));
        assert_eq!(cmp.best_price, 116.0);
        assert_eq!(cmp.max_savings, 314.0);
        assert!(cmp.has_all_stores);
    }

    #[test]
    fn test_compare_cart_missing_store() {
        let items = vec![(product("Cheese", [Some(500.0), None, None]), 1)];
        let cmp = compare_cart(&items);
        assert_eq!(cmp.best_store, Some(Store::Carrefour));
        assert_eq!(cmp.max_savings, 0.0);
        assert!(!cmp.has_all_stores);
    }

    #[test]
    fn test_compare_empty_cart() {
        let cmp = compare_cart(&[]);
        assert_eq!(cmp.best_store, None);
        assert_eq!(cmp.best_price, 0.0);
        assert!(!cmp.has_all_stores);
        assert_eq!(cmp.by_store.len(), 3);
    }
}

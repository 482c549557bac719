//! Player state: the character and their inventory.
//!
//! Pure data with clamping mutation helpers. The narrator's tools are the
//! only code that mutates a [`Character`] during play; loading a save
//! replaces it wholesale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stamina a fresh character starts with.
pub const DEFAULT_STAMINA: i64 = 100;

/// An item carried by the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identity of the item within an inventory (matched case-insensitively).
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub value: i64,
    /// Free-form scalar properties.
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Item {
    pub fn new(name: impl Into<String>, description: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value,
            properties: BTreeMap::new(),
        }
    }

    /// Case-insensitive name comparison used by every inventory lookup.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    /// Never negative; no upper bound.
    pub hp: i64,
    #[serde(default = "default_stamina")]
    pub stamina: i64,
    /// Money in ounces. Never negative.
    #[serde(rename = "money_oz", alias = "money", default)]
    pub money: f64,
    #[serde(default)]
    pub inventory: Vec<Item>,
    #[serde(default)]
    pub location: String,
}

fn default_stamina() -> i64 {
    DEFAULT_STAMINA
}

impl Character {
    /// Create a character with full stamina, no money and an empty inventory.
    pub fn new(name: impl Into<String>, hp: i64) -> Self {
        Self {
            name: name.into(),
            hp,
            stamina: DEFAULT_STAMINA,
            money: 0.0,
            inventory: Vec::new(),
            location: String::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.inventory.push(item);
        self
    }

    /// Add `amount` to HP, flooring at zero. Returns the new HP.
    pub fn adjust_hp(&mut self, amount: i64) -> i64 {
        self.hp = self.hp.saturating_add(amount).max(0);
        self.hp
    }

    /// Add `amount` to stamina, flooring at zero. Returns the new stamina.
    pub fn adjust_stamina(&mut self, amount: i64) -> i64 {
        self.stamina = self.stamina.saturating_add(amount).max(0);
        self.stamina
    }

    /// Add `amount` to money, flooring at zero. Returns the new balance.
    pub fn adjust_money(&mut self, amount: f64) -> f64 {
        self.money = (self.money + amount).max(0.0);
        self.money
    }

    /// First item whose name matches case-insensitively.
    pub fn find_item(&self, name: &str) -> Option<&Item> {
        self.inventory.iter().find(|item| item.is_named(name))
    }

    pub fn find_item_mut(&mut self, name: &str) -> Option<&mut Item> {
        self.inventory.iter_mut().find(|item| item.is_named(name))
    }

    /// Remove every item matching `name`. Returns how many were removed.
    pub fn remove_items_named(&mut self, name: &str) -> usize {
        let before = self.inventory.len();
        self.inventory.retain(|item| !item.is_named(name));
        before - self.inventory.len()
    }

    pub fn item_names(&self) -> Vec<&str> {
        self.inventory.iter().map(|item| item.name.as_str()).collect()
    }

    /// Compact one-line summary injected into the conversation each turn.
    pub fn state_summary(&self) -> String {
        let inventory = if self.inventory.is_empty() {
            "Empty".to_string()
        } else {
            self.item_names().join(", ")
        };
        format!(
            "Player: HP={}, Stamina={}, Money={:.2}, Location='{}', Inventory=[{}]",
            self.hp, self.stamina, self.money, self.location, inventory
        )
    }

    /// Read-only projection for display.
    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            name: self.name.clone(),
            health: self.hp,
            stamina: self.stamina,
            money: format!("{:.2} oz", self.money),
            inventory: self.inventory.iter().map(|item| item.name.clone()).collect(),
        }
    }
}

/// What the status panel shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub name: String,
    pub health: i64,
    pub stamina: i64,
    /// Pre-formatted, e.g. `"12.50 oz"`.
    pub money: String,
    pub inventory: Vec<String>,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name:      {}", self.name)?;
        writeln!(f, "Health:    {}", self.health)?;
        writeln!(f, "Stamina:   {}", self.stamina)?;
        writeln!(f, "Money:     {}", self.money)?;
        if self.inventory.is_empty() {
            write!(f, "Inventory: (empty)")
        } else {
            write!(f, "Inventory: {}", self.inventory.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_character_defaults() {
        let hero = Character::new("Hero", 100);
        assert_eq!(hero.stamina, DEFAULT_STAMINA);
        assert_eq!(hero.money, 0.0);
        assert!(hero.inventory.is_empty());
        assert!(hero.location.is_empty());
    }

    #[test]
    fn test_adjustments_floor_at_zero() {
        let mut hero = Character::new("Hero", 10);
        assert_eq!(hero.adjust_hp(-25), 0);
        assert_eq!(hero.adjust_hp(7), 7);
        assert_eq!(hero.adjust_stamina(-500), 0);
        assert_eq!(hero.adjust_money(-3.5), 0.0);
        assert_eq!(hero.adjust_money(2.25), 2.25);
    }

    #[test]
    fn test_hp_adjust_saturates() {
        let mut hero = Character::new("Hero", i64::MAX - 1);
        assert_eq!(hero.adjust_hp(10), i64::MAX);
        assert_eq!(hero.adjust_hp(i64::MIN), 0);
    }

    #[test]
    fn test_item_lookup_is_case_insensitive() {
        let hero = Character::new("Kael", 100).with_item(Item::new("Rusty Key", "Old", 0));
        assert!(hero.find_item("rusty key").is_some());
        assert!(hero.find_item("RUSTY KEY").is_some());
        assert!(hero.find_item("Key").is_none());
    }

    #[test]
    fn test_remove_items_named_removes_all_matches() {
        let mut hero = Character::new("Kael", 100)
            .with_item(Item::new("Wrench", "A", 1))
            .with_item(Item::new("Cable", "B", 2))
            .with_item(Item::new("wrench", "C", 3));

        assert_eq!(hero.remove_items_named("WRENCH"), 2);
        assert_eq!(hero.item_names(), vec!["Cable"]);
        assert_eq!(hero.remove_items_named("wrench"), 0);
    }

    #[test]
    fn test_state_summary() {
        let mut hero = Character::new("Kael", 80).with_location("Mid-deck");
        hero.money = 3.456;
        assert_eq!(
            hero.state_summary(),
            "Player: HP=80, Stamina=100, Money=3.46, Location='Mid-deck', Inventory=[Empty]"
        );

        let hero = hero
            .with_item(Item::new("Wrench", "", 0))
            .with_item(Item::new("Badge", "", 0));
        assert!(hero.state_summary().ends_with("Inventory=[Wrench, Badge]"));
    }

    #[test]
    fn test_character_serde_uses_money_oz() {
        let hero = Character::new("Kael", 90);
        let value = serde_json::to_value(&hero).unwrap();
        assert_eq!(value["money_oz"], 0.0);
        assert!(value.get("money").is_none());
    }

    #[test]
    fn test_character_deserialize_fills_defaults() {
        let hero: Character = serde_json::from_str(r#"{"name": "Kael", "hp": 42}"#).unwrap();
        assert_eq!(hero.hp, 42);
        assert_eq!(hero.stamina, DEFAULT_STAMINA);
        assert_eq!(hero.money, 0.0);
        assert!(hero.inventory.is_empty());
    }

    #[test]
    fn test_status_projection() {
        let mut hero = Character::new("Kael", 55).with_item(Item::new("Wrench", "", 0));
        hero.money = 12.5;
        let status = hero.status();
        assert_eq!(status.money, "12.50 oz");
        assert_eq!(status.inventory, vec!["Wrench".to_string()]);
        assert!(status.to_string().contains("Health:    55"));
    }
}

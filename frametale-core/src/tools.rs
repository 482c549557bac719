//! Narrator tools.
//!
//! Each tool is a small state mutation over the player [`Character`]. The
//! operations can be called directly, or by name through a
//! [`ToolRegistry`] with the JSON argument string a model produced. The
//! registry decodes the arguments into the tool's typed argument struct
//! before the operation runs, so handlers never see malformed input.

use crate::model::{Character, Item};
use frametale_macros::Tool;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

// ============================================================================
// Argument types
// ============================================================================

/// Modify the player character's health points (HP). Use negative values to decrease HP (damage) and positive values to increase HP (healing).
#[derive(Debug, Clone, Deserialize, Tool)]
#[tool(name = "change_player_hp")]
pub struct ChangeHpArgs {
    /// The amount to change the player's HP by (positive for healing, negative for damage).
    #[serde(deserialize_with = "integer")]
    pub amount: i64,
}

/// Modify the player character's stamina. Use negative values to decrease stamina and positive values to increase stamina.
#[derive(Debug, Clone, Deserialize, Tool)]
#[tool(name = "change_player_stamina")]
pub struct ChangeStaminaArgs {
    /// The amount to change the player's stamina by (positive for gain, negative for loss).
    #[serde(deserialize_with = "integer")]
    pub amount: i64,
}

/// Modify the player character's money in ounces (oz). Use negative values to decrease money and positive values to increase money.
#[derive(Debug, Clone, Deserialize, Tool)]
#[tool(name = "change_player_money")]
pub struct ChangeMoneyArgs {
    /// The amount to change the player's money by in ounces (positive for gain, negative for loss).
    pub amount: f64,
}

/// Add an item to the player character's inventory.
#[derive(Debug, Clone, Deserialize, Tool)]
#[tool(name = "add_item_to_inventory")]
pub struct AddItemArgs {
    /// The name of the item to add.
    #[serde(alias = "name")]
    pub item_name: String,

    /// A brief description of the item.
    #[serde(alias = "description")]
    pub item_description: String,

    /// The value of the item (optional, defaults to 0).
    #[serde(alias = "value", default, deserialize_with = "integer")]
    #[tool(optional)]
    pub item_value: i64,
}

/// Remove an item from the player character's inventory by name.
#[derive(Debug, Clone, Deserialize, Tool)]
#[tool(name = "remove_item_from_inventory")]
pub struct RemoveItemArgs {
    /// The name of the item to remove.
    #[serde(alias = "name")]
    pub item_name: String,
}

/// Modify an existing item in the player character's inventory by name. You can update its description and/or value.
#[derive(Debug, Clone, Deserialize, Tool)]
#[tool(name = "modify_item_in_inventory")]
pub struct ModifyItemArgs {
    /// The name of the item to modify.
    #[serde(alias = "name")]
    pub item_name: String,

    /// The new description for the item (optional).
    #[serde(alias = "description", default)]
    pub new_description: Option<String>,

    /// The new value for the item (optional).
    #[serde(alias = "value", default, deserialize_with = "optional_integer")]
    pub new_value: Option<i64>,
}

/// Whole numbers arrive as `-10` or `-10.0` depending on the model.
fn integer_from(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    integer_from(&value)
        .ok_or_else(|| de::Error::custom(format!("expected an integer, found {value}")))
}

fn optional_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => integer_from(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected an integer, found {value}"))),
    }
}

// ============================================================================
// Results
// ============================================================================

/// Operation-specific part of a tool result.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    NewHp(i64),
    NewStamina(i64),
    NewMoney(f64),
    ItemAdded(String),
    /// `None` when nothing matched.
    ItemRemoved(Option<String>),
    /// `None` when nothing matched.
    ItemModified(Option<String>),
}

impl Payload {
    fn key(&self) -> &'static str {
        match self {
            Payload::NewHp(_) => "new_hp",
            Payload::NewStamina(_) => "new_stamina",
            Payload::NewMoney(_) => "new_money_oz",
            Payload::ItemAdded(_) => "item_added",
            Payload::ItemRemoved(_) => "item_removed",
            Payload::ItemModified(_) => "item_modified",
        }
    }

    fn value(&self) -> Value {
        match self {
            Payload::NewHp(n) | Payload::NewStamina(n) => json!(n),
            Payload::NewMoney(oz) => json!(oz),
            Payload::ItemAdded(name) => json!(name),
            Payload::ItemRemoved(name) | Payload::ItemModified(name) => json!(name),
        }
    }
}

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    /// The mutation was applied.
    Applied { message: String, payload: Payload },

    /// The tool ran but refused, e.g. the named item does not exist.
    Rejected { message: String, payload: Payload },

    /// The call never reached a handler.
    Invalid { error: String },
}

impl ToolResult {
    fn applied(message: impl Into<String>, payload: Payload) -> Self {
        ToolResult::Applied {
            message: message.into(),
            payload,
        }
    }

    fn rejected(message: impl Into<String>, payload: Payload) -> Self {
        ToolResult::Rejected {
            message: message.into(),
            payload,
        }
    }

    fn invalid(error: impl Into<String>) -> Self {
        ToolResult::Invalid {
            error: error.into(),
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, ToolResult::Applied { .. })
    }

    /// Player-facing message, if the tool produced one.
    pub fn message(&self) -> Option<&str> {
        match self {
            ToolResult::Applied { message, .. } | ToolResult::Rejected { message, .. } => {
                Some(message)
            }
            ToolResult::Invalid { .. } => None,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            ToolResult::Applied { payload, .. } | ToolResult::Rejected { payload, .. } => {
                Some(payload)
            }
            ToolResult::Invalid { .. } => None,
        }
    }

    /// Wire form sent back to the model as the tool message content.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("success".to_string(), json!(self.success()));
        match self {
            ToolResult::Applied { message, payload } | ToolResult::Rejected { message, payload } => {
                object.insert(payload.key().to_string(), payload.value());
                object.insert("message".to_string(), json!(message));
            }
            ToolResult::Invalid { error } => {
                object.insert("error".to_string(), json!(error));
            }
        }
        Value::Object(object)
    }
}

impl fmt::Display for ToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Add `amount` to HP. Negative amounts are damage.
pub fn change_hp(player: &mut Character, amount: i64) -> ToolResult {
    let new_hp = player.adjust_hp(amount);
    info!(amount, new_hp, "Changed player HP");
    let message = if amount < 0 {
        format!("You took {} damage!", amount.unsigned_abs())
    } else {
        format!("You healed {amount} HP.")
    };
    ToolResult::applied(message, Payload::NewHp(new_hp))
}

/// Add `amount` to stamina.
pub fn change_stamina(player: &mut Character, amount: i64) -> ToolResult {
    let new_stamina = player.adjust_stamina(amount);
    info!(amount, new_stamina, "Changed player stamina");
    let message = if amount < 0 {
        format!("You lost {} stamina.", amount.unsigned_abs())
    } else {
        format!("You gained {amount} stamina.")
    };
    ToolResult::applied(message, Payload::NewStamina(new_stamina))
}

/// Add `amount` ounces to the player's money.
pub fn change_money(player: &mut Character, amount: f64) -> ToolResult {
    let new_money = player.adjust_money(amount);
    info!(amount, new_money, "Changed player money");
    let message = if amount < 0.0 {
        format!("You lost {:.2} oz of money.", amount.abs())
    } else {
        format!("You gained {amount:.2} oz of money.")
    };
    ToolResult::applied(message, Payload::NewMoney(new_money))
}

/// Append a new item to the inventory. Always succeeds.
pub fn add_item(player: &mut Character, name: &str, description: &str, value: i64) -> ToolResult {
    player.inventory.push(Item::new(name, description, value));
    info!(item = name, inventory = ?player.item_names(), "Added item");
    ToolResult::applied(
        format!("You received: {name}."),
        Payload::ItemAdded(name.to_string()),
    )
}

/// Remove every item matching `name` case-insensitively.
pub fn remove_item(player: &mut Character, name: &str) -> ToolResult {
    if player.remove_items_named(name) > 0 {
        info!(item = name, "Removed item");
        ToolResult::applied(
            format!("'{name}' has been removed from your inventory."),
            Payload::ItemRemoved(Some(name.to_string())),
        )
    } else {
        warn!(item = name, "Item to remove not found");
        ToolResult::rejected(not_found(name), Payload::ItemRemoved(None))
    }
}

/// Update the description and/or value of the first item matching `name`.
pub fn modify_item(
    player: &mut Character,
    name: &str,
    description: Option<&str>,
    value: Option<i64>,
) -> ToolResult {
    let Some(item) = player.find_item_mut(name) else {
        warn!(item = name, "Item to modify not found");
        return ToolResult::rejected(not_found(name), Payload::ItemModified(None));
    };

    if let Some(description) = description {
        item.description = description.to_string();
    }
    if let Some(value) = value {
        item.value = value;
    }
    info!(item = name, "Modified item");
    ToolResult::applied(
        format!("'{name}' has been updated."),
        Payload::ItemModified(Some(name.to_string())),
    )
}

fn not_found(name: &str) -> String {
    format!("'{name}' was not found in your inventory.")
}

// ============================================================================
// Registry
// ============================================================================

type Handler =
    Box<dyn Fn(&mut Character, Value) -> Result<ToolResult, serde_json::Error> + Send + Sync>;

/// A registered tool: the schema the model sees plus its typed handler.
pub struct ToolDescriptor {
    pub tool: openrouter::Tool,
    handler: Handler,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

/// Name-indexed collection of tools.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDescriptor>,
    order: Vec<String>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ToolRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The six player-state tools.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(ChangeHpArgs::as_tool(), |player, args: ChangeHpArgs| {
            change_hp(player, args.amount)
        });
        registry.register(AddItemArgs::as_tool(), |player, args: AddItemArgs| {
            add_item(player, &args.item_name, &args.item_description, args.item_value)
        });
        registry.register(RemoveItemArgs::as_tool(), |player, args: RemoveItemArgs| {
            remove_item(player, &args.item_name)
        });
        registry.register(ModifyItemArgs::as_tool(), |player, args: ModifyItemArgs| {
            modify_item(
                player,
                &args.item_name,
                args.new_description.as_deref(),
                args.new_value,
            )
        });
        registry.register(ChangeStaminaArgs::as_tool(), |player, args: ChangeStaminaArgs| {
            change_stamina(player, args.amount)
        });
        registry.register(ChangeMoneyArgs::as_tool(), |player, args: ChangeMoneyArgs| {
            change_money(player, args.amount)
        });
        registry
    }

    /// Register a tool whose arguments decode into `A`.
    ///
    /// Registering an existing name replaces the earlier tool.
    pub fn register<A>(&mut self, tool: openrouter::Tool, op: fn(&mut Character, A) -> ToolResult)
    where
        A: DeserializeOwned + 'static,
    {
        let name = tool.name.clone();
        let handler: Handler = Box::new(move |player: &mut Character, args: Value| {
            serde_json::from_value::<A>(args).map(|a| op(player, a))
        });
        if self
            .tools
            .insert(name.clone(), ToolDescriptor { tool, handler })
            .is_none()
        {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Tool names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Schemas for a completion request, in registration order.
    pub fn schemas(&self) -> Vec<openrouter::Tool> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|descriptor| descriptor.tool.clone())
            .collect()
    }

    /// Run the tool `name` with a JSON-encoded argument object.
    pub fn dispatch(&self, player: &mut Character, name: &str, arguments: &str) -> ToolResult {
        let Some(descriptor) = self.tools.get(name) else {
            warn!(tool = name, "Model called an unknown tool");
            return ToolResult::invalid(format!("Tool '{name}' not found."));
        };

        let arguments = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };
        let args = match serde_json::from_str::<Value>(arguments) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                warn!(tool = name, arguments, "Tool arguments are not a JSON object");
                return ToolResult::invalid("Invalid arguments format.");
            }
        };

        match (descriptor.handler)(player, args) {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = name, error = %e, "Tool arguments do not match the schema");
                ToolResult::invalid(format!("Invalid arguments for '{name}': {e}"))
            }
        }
    }
}

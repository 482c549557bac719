//! Property tests for the tool operations and history retention.

use frametale_core::narrator::history::retain_system_messages;
use frametale_core::tools::{add_item, change_hp, change_money, change_stamina, modify_item, remove_item};
use frametale_core::{Character, Item, Message};
use proptest::prelude::*;

fn player_with(items: &[(String, i64)]) -> Character {
    items
        .iter()
        .fold(Character::new("Hero", 100), |player, (name, value)| {
            player.with_item(Item::new(name.clone(), "", *value))
        })
}

fn sorted_names(player: &Character) -> Vec<String> {
    let mut names: Vec<String> = player.inventory.iter().map(|i| i.name.clone()).collect();
    names.sort();
    names
}

/// Messages tagged with a sequence number so their order can be checked.
fn arb_history() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(0u8..4, 0..40).prop_map(|roles| {
        roles
            .into_iter()
            .enumerate()
            .map(|(i, role)| match role {
                0 => Message::system(format!("s{i}")),
                1 => Message::user(format!("u{i}")),
                2 => Message::assistant(format!("a{i}")),
                _ => Message::tool(format!("call_{i}"), "change_player_hp", format!("t{i}")),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_change_hp_clamps(hp in 0i64..1_000_000, amount in -2_000_000i64..2_000_000) {
        let mut player = Character::new("Hero", hp);
        let result = change_hp(&mut player, amount);
        prop_assert!(result.success());
        prop_assert_eq!(player.hp, (hp + amount).max(0));
    }

    #[test]
    fn prop_change_hp_never_overflows(hp in 0i64..=i64::MAX, amount in any::<i64>()) {
        let mut player = Character::new("Hero", hp);
        change_hp(&mut player, amount);
        prop_assert!(player.hp >= 0);
    }

    #[test]
    fn prop_change_stamina_clamps(stamina in 0i64..1_000_000, amount in -2_000_000i64..2_000_000) {
        let mut player = Character::new("Hero", 100);
        player.stamina = stamina;
        change_stamina(&mut player, amount);
        prop_assert_eq!(player.stamina, (stamina + amount).max(0));
    }

    #[test]
    fn prop_change_money_clamps_and_formats(money in 0.0f64..10_000.0, amount in -20_000.0f64..20_000.0) {
        let mut player = Character::new("Hero", 100);
        player.money = money;
        let result = change_money(&mut player, amount);
        prop_assert_eq!(player.money, (money + amount).max(0.0));

        let message = result.message().unwrap().to_string();
        let shown = format!("{:.2}", amount.abs());
        prop_assert!(message.contains(&format!(" {shown} oz of money.")), "{}", message);
    }

    #[test]
    fn prop_add_then_remove_restores_inventory(
        existing in prop::collection::vec(("[a-z]{1,8}", 0i64..100), 0..6),
        word in "[a-z]{1,8}",
        upper in any::<bool>(),
    ) {
        let mut player = player_with(&existing);
        // The space keeps the new name distinct from every existing one
        let name = format!("Found {word}");
        let before = sorted_names(&player);

        add_item(&mut player, &name, "found", 1);
        let lookup = if upper { name.to_uppercase() } else { name.to_lowercase() };
        let result = remove_item(&mut player, &lookup);

        prop_assert!(result.success());
        prop_assert_eq!(sorted_names(&player), before);
    }

    #[test]
    fn prop_missing_item_is_rejected(
        existing in prop::collection::vec(("[a-z]{1,8}", 0i64..100), 0..6),
        missing in "[0-9]{1,4}",
    ) {
        let mut player = player_with(&existing);
        let before = player.inventory.clone();

        let removed = remove_item(&mut player, &missing);
        let modified = modify_item(&mut player, &missing, Some("new"), Some(5));

        prop_assert!(!removed.success());
        prop_assert!(!modified.success());
        prop_assert_eq!(player.inventory, before);
    }

    #[test]
    fn prop_retention_keeps_two_latest_system_messages(history in arb_history()) {
        let systems: Vec<Message> = history.iter().filter(|m| m.is_system()).cloned().collect();
        let others: Vec<Message> = history.iter().filter(|m| !m.is_system()).cloned().collect();

        let retained = retain_system_messages(history.clone(), 2);

        let kept_systems: Vec<Message> = retained.iter().filter(|m| m.is_system()).cloned().collect();
        let kept_others: Vec<Message> = retained.iter().filter(|m| !m.is_system()).cloned().collect();

        let expected = systems[systems.len().saturating_sub(2)..].to_vec();
        prop_assert_eq!(kept_systems, expected);
        prop_assert_eq!(kept_others, others);

        // Survivors keep their original relative order
        let positions: Vec<usize> = retained
            .iter()
            .map(|m| history.iter().position(|h| h == m).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}

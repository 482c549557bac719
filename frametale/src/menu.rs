//! Main menu.

use crate::console::{Console, Input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    NewGame,
    Continue,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::NewGame),
            "2" => Some(Self::Continue),
            "3" => Some(Self::Exit),
            _ => None,
        }
    }
}

fn print_menu() {
    println!("╔══════════════════════════════╗");
    println!("║          FrameTale           ║");
    println!("╠══════════════════════════════╣");
    println!("║  1. New Game                 ║");
    println!("║  2. Continue Game            ║");
    println!("║  3. Exit                     ║");
    println!("╚══════════════════════════════╝");
}

/// Show the menu until a valid choice is entered.
///
/// Returns `None` on Ctrl+C or end of input.
pub async fn choose(console: &mut Console) -> Option<MenuChoice> {
    print_menu();
    loop {
        match console.prompt("Enter your choice (1-3): ").await {
            Input::Line(line) => match MenuChoice::parse(&line) {
                Some(choice) => return Some(choice),
                None => println!("Invalid choice. Please enter 1, 2, or 3."),
            },
            Input::Interrupted => {
                tracing::info!("Game interrupted by user (Ctrl+C) at the menu.");
                return None;
            }
            Input::Closed => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choices() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::NewGame));
        assert_eq!(MenuChoice::parse(" 2 "), Some(MenuChoice::Continue));
        assert_eq!(MenuChoice::parse("3"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("4"), None);
        assert_eq!(MenuChoice::parse("new"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }
}

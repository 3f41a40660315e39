//! Numbered menu actions offered each round.

/// One menu entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Answer,
    Minigame,
    Status,
    Join,
    Goodbye,
}

impl MenuAction {
    pub const ALL: [MenuAction; 5] = [
        MenuAction::Answer,
        MenuAction::Minigame,
        MenuAction::Status,
        MenuAction::Join,
        MenuAction::Goodbye,
    ];

    pub fn number(&self) -> u8 {
        match self {
            MenuAction::Answer => 1,
            MenuAction::Minigame => 2,
            MenuAction::Status => 3,
            MenuAction::Join => 4,
            MenuAction::Goodbye => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Answer => "Answer a question",
            MenuAction::Minigame => "Play a guessing game",
            MenuAction::Status => "Check status",
            MenuAction::Join => "Ask it to join you",
            MenuAction::Goodbye => "Say goodbye",
        }
    }

    /// Parse a typed menu number. Anything else is `None`.
    pub fn parse(input: &str) -> Option<Self> {
        let number: u8 = input.trim().parse().ok()?;
        Self::ALL.into_iter().find(|a| a.number() == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_menu_numbers() {
        assert_eq!(MenuAction::parse("1"), Some(MenuAction::Answer));
        assert_eq!(MenuAction::parse(" 5\n"), Some(MenuAction::Goodbye));
        assert_eq!(MenuAction::parse("0"), None);
        assert_eq!(MenuAction::parse("6"), None);
        assert_eq!(MenuAction::parse("talk"), None);
        assert_eq!(MenuAction::parse(""), None);
    }

    #[test]
    fn test_numbers_are_sequential() {
        for (i, action) in MenuAction::ALL.iter().enumerate() {
            assert_eq!(usize::from(action.number()), i + 1);
        }
    }
}

//! The animal heroes a learner can write about.

use std::fmt;
use std::str::FromStr;

/// A selectable story hero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Animal {
    Dolphin,
    Elephant,
    Lion,
    Giraffe,
    Tiger,
    Shark,
}

impl Animal {
    /// All heroes, in picker order.
    pub const ALL: [Animal; 6] = [
        Animal::Dolphin,
        Animal::Elephant,
        Animal::Lion,
        Animal::Giraffe,
        Animal::Tiger,
        Animal::Shark,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Animal::Dolphin => "dolphin",
            Animal::Elephant => "elephant",
            Animal::Lion => "lion",
            Animal::Giraffe => "giraffe",
            Animal::Tiger => "tiger",
            Animal::Shark => "shark",
        }
    }

    /// Display name, also used as the hero in prompts.
    pub fn name(&self) -> &'static str {
        match self {
            Animal::Dolphin => "Dolphin",
            Animal::Elephant => "Elephant",
            Animal::Lion => "Lion",
            Animal::Giraffe => "Giraffe",
            Animal::Tiger => "Tiger",
            Animal::Shark => "Shark",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Animal::Dolphin => "🐬",
            Animal::Elephant => "🐘",
            Animal::Lion => "🦁",
            Animal::Giraffe => "🦒",
            Animal::Tiger => "🐯",
            Animal::Shark => "🦈",
        }
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Animal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Animal::ALL
            .into_iter()
            .find(|a| a.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown animal: {wanted}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_animal() {
        assert_eq!("lion".parse::<Animal>().unwrap(), Animal::Lion);
        assert_eq!(" Shark ".parse::<Animal>().unwrap(), Animal::Shark);
        assert!("unicorn".parse::<Animal>().is_err());
    }

    #[test]
    fn test_animal_names() {
        assert_eq!(Animal::Giraffe.to_string(), "Giraffe");
        assert_eq!(Animal::ALL.len(), 6);
        assert!(Animal::ALL.iter().all(|a| !a.icon().is_empty()));
    }
}

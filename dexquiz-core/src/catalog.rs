//! Ordered list of names a quiz session asks players to identify.

use std::collections::HashSet;

use crate::error::{QuizError, Result};

/// 1-based stable index of a catalog entry.
pub type Position = u32;

/// Generation 1 Pokédex in national order.
pub const GENERATION_1: [&str; 151] = [
    "Bulbasaur", "Ivysaur", "Venusaur", "Charmander", "Charmeleon", "Charizard",
    "Squirtle", "Wartortle", "Blastoise", "Caterpie", "Metapod", "Butterfree",
    "Weedle", "Kakuna", "Beedrill", "Pidgey", "Pidgeotto", "Pidgeot",
    "Rattata", "Raticate", "Spearow", "Fearow", "Ekans", "Arbok",
    "Pikachu", "Raichu", "Sandshrew", "Sandslash", "Nidoran♀", "Nidorina",
    "Nidoqueen", "Nidoran♂", "Nidorino", "Nidoking", "Clefairy", "Clefable",
    "Vulpix", "Ninetales", "Jigglypuff", "Wigglytuff", "Zubat", "Golbat",
    "Oddish", "Gloom", "Vileplume", "Paras", "Parasect", "Venonat",
    "Venomoth", "Diglett", "Dugtrio", "Meowth", "Persian", "Psyduck",
    "Golduck", "Mankey", "Primeape", "Growlithe", "Arcanine", "Poliwag",
    "Poliwhirl", "Poliwrath", "Abra", "Kadabra", "Alakazam", "Machop",
    "Machoke", "Machamp", "Bellsprout", "Weepinbell", "Victreebel", "Tentacool",
    "Tentacruel", "Geodude", "Graveler", "Golem", "Ponyta", "Rapidash",
    "Slowpoke", "Slowbro", "Magnemite", "Magneton", "Farfetch'd", "Doduo",
    "Dodrio", "Seel", "Dewgong", "Grimer", "Muk", "Shellder",
    "Cloyster", "Gastly", "Haunter", "Gengar", "Onix", "Drowzee",
    "Hypno", "Krabby", "Kingler", "Voltorb", "Electrode", "Exeggcute",
    "Exeggutor", "Cubone", "Marowak", "Hitmonlee", "Hitmonchan", "Lickitung",
    "Koffing", "Weezing", "Rhyhorn", "Rhydon", "Chansey", "Tangela",
    "Kangaskhan", "Horsea", "Seadra", "Goldeen", "Seaking", "Staryu",
    "Starmie", "Mr. Mime", "Scyther", "Jynx", "Electabuzz", "Magmar",
    "Pinsir", "Tauros", "Magikarp", "Gyarados", "Lapras", "Ditto",
    "Eevee", "Vaporeon", "Jolteon", "Flareon", "Porygon", "Omanyte",
    "Omastar", "Kabuto", "Kabutops", "Aerodactyl", "Snorlax", "Articuno",
    "Zapdos", "Moltres", "Dratini", "Dragonair", "Dragonite", "Mewtwo",
    "Mew",
];

/// A validated, non-empty sequence of unique display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    names: Vec<String>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists and repeated display names.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(QuizError::EmptyCatalog);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(QuizError::DuplicateCatalogEntry(name.clone()));
            }
        }

        Ok(Self { names })
    }

    /// Parse one name per line; blank lines and surrounding whitespace are ignored.
    pub fn from_lines(text: &str) -> Result<Self> {
        Self::new(text.lines().map(str::trim).filter(|line| !line.is_empty()))
    }

    /// The built-in 151 entry list.
    pub fn generation_one() -> Self {
        Self {
            names: GENERATION_1.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Display name at a 1-based position.
    pub fn name(&self, position: Position) -> Option<&str> {
        let index = usize::try_from(position).ok()?.checked_sub(1)?;
        self.names.get(index).map(String::as_str)
    }

    /// Entries in order as `(position, name)`.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &str)> {
        (1..).zip(self.names.iter().map(String::as_str))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::generation_one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_one_is_valid() {
        let catalog = Catalog::generation_one();
        assert_eq!(catalog.len(), 151);
        assert_eq!(catalog.name(1), Some("Bulbasaur"));
        assert_eq!(catalog.name(151), Some("Mew"));
        assert_eq!(catalog.name(0), None);
        assert_eq!(catalog.name(152), None);

        // Same invariants as a caller-supplied list
        assert!(Catalog::new(GENERATION_1).is_ok());
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert_eq!(
            Catalog::new(Vec::<String>::new()),
            Err(QuizError::EmptyCatalog)
        );
        assert_eq!(Catalog::from_lines("\n  \n"), Err(QuizError::EmptyCatalog));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        assert_eq!(
            Catalog::new(["Pikachu", "Raichu", "Pikachu"]),
            Err(QuizError::DuplicateCatalogEntry("Pikachu".to_string()))
        );
    }

    #[test]
    fn test_from_lines_assigns_positions_in_order() {
        let catalog = Catalog::from_lines("Bulbasaur\n\n  Ivysaur  \nVenusaur\n").unwrap();
        let entries: Vec<(Position, &str)> = catalog.iter().collect();
        assert_eq!(
            entries,
            vec![(1, "Bulbasaur"), (2, "Ivysaur"), (3, "Venusaur")]
        );
    }
}

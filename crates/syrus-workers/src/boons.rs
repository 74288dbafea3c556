//! The static boon catalog (glossary: "a player-reward unit referenced by
//! name from a static catalog"). Embedded the same way `syrus_seeds::corpus`
//! embeds its narrative vocabulary: a `pub const` slice of literal structs,
//! not loaded from disk.

#[derive(Debug, Clone, Copy)]
pub struct Boon {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const BOONS: &[Boon] = &[
    Boon { id: "keen-edge", name: "Keen Edge", description: "Your next strike cannot be parried." },
    Boon { id: "second-wind", name: "Second Wind", description: "Recover from a failed roll once per act." },
    Boon { id: "silver-tongue", name: "Silver Tongue", description: "Reroll a failed social check." },
    Boon { id: "steady-hand", name: "Steady Hand", description: "Advantage on the next skill check requiring precision." },
    Boon { id: "borrowed-luck", name: "Borrowed Luck", description: "Turn a near-miss into a success, once." },
    Boon { id: "unseen-ally", name: "Unseen Ally", description: "A minor NPC intervenes on your behalf once." },
    Boon { id: "iron-resolve", name: "Iron Resolve", description: "Immune to the next fear or despair effect." },
    Boon { id: "scavengers-eye", name: "Scavenger's Eye", description: "Find one extra useful item during the next scene." },
    Boon { id: "quick-study", name: "Quick Study", description: "Learn a relevant fact automatically at the next beat." },
    Boon { id: "last-stand", name: "Last Stand", description: "Act even after being reduced to zero resolve, once." },
];

pub fn find(id: &str) -> Option<&'static Boon> {
    BOONS.iter().find(|b| b.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<&str> = BOONS.iter().map(|b| b.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), BOONS.len());
    }

    #[test]
    fn find_returns_known_boon() {
        assert!(find("keen-edge").is_some());
        assert!(find("nonexistent").is_none());
    }
}

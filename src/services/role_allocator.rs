use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{player::PlayerId, role::Role};

/// How many of each role a table of a given size gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    pub mafia: usize,
    pub medic: usize,
    pub detective: usize,
    pub villager: usize,
}

impl RoleCounts {
    pub fn for_players(n: usize) -> Self {
        let mafia = (n / 4).max(1);
        let medic = usize::from(n >= 5);
        let detective = usize::from(n >= 6);
        let villager = n.saturating_sub(mafia + medic + detective);
        RoleCounts {
            mafia,
            medic,
            detective,
            villager,
        }
    }

    pub fn total(&self) -> usize {
        self.mafia + self.medic + self.detective + self.villager
    }

    /// The role pool, each role repeated per its count.
    pub fn pool(&self) -> Vec<Role> {
        let mut pool = Vec::with_capacity(self.total());
        pool.extend(std::iter::repeat(Role::Mafia).take(self.mafia));
        pool.extend(std::iter::repeat(Role::Medic).take(self.medic));
        pool.extend(std::iter::repeat(Role::Detective).take(self.detective));
        pool.extend(std::iter::repeat(Role::Villager).take(self.villager));
        pool
    }

    /// Public summary, e.g. "1 Mafia, 1 Medic, 3 Villagers".
    pub fn describe(&self) -> String {
        let parts = [
            (self.mafia, "Mafia", "Mafia"),
            (self.medic, "Medic", "Medics"),
            (self.detective, "Detective", "Detectives"),
            (self.villager, "Villager", "Villagers"),
        ];
        parts
            .iter()
            .filter(|(count, _, _)| *count > 0)
            .map(|(count, one, many)| {
                format!("{} {}", count, if *count == 1 { one } else { many })
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Deals roles to `players` uniformly at random under the fixed counts.
pub fn allocate<R: Rng + ?Sized>(players: &[PlayerId], rng: &mut R) -> HashMap<PlayerId, Role> {
    let mut pool = RoleCounts::for_players(players.len()).pool();
    let mut seats: Vec<&PlayerId> = players.iter().collect();
    pool.shuffle(rng);
    seats.shuffle(rng);

    let mut roles = HashMap::with_capacity(seats.len());
    let mut pool = pool.into_iter();
    for player in seats {
        roles.insert(player.clone(), pool.next().unwrap_or(Role::Villager));
    }
    roles
}

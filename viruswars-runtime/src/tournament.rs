//! Round-robin tournament over k-subsets of a virus pool
//!
//! Every k-subset of the pool (in lexicographic order of program ids)
//! plays `rounds_per_setup` matches with freshly reset state. Wins score
//! 2 points, ties 1, losses 0; a drawn round is a tie for the surviving
//! participants and a loss for the stopped ones, and a round nobody
//! survives ties everyone.

use std::fmt;

use prettytable::{format, row, Table};

use viruswars_spec::{CompiledProgram, VmConfig};

use crate::error::{Result, RuntimeError};
use crate::vm::{MatchOutcome, Vm};

/// Outcome of one round of one subset, in pool ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    pub subset: Vec<usize>,
    /// Round index within the subset, starting at 1
    pub round: usize,
    pub winner: Option<usize>,
    pub survivors: Vec<usize>,
}

impl fmt::Display for RoundRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subset: Vec<String> = self.subset.iter().map(|id| id.to_string()).collect();
        write!(f, "[{}] round {}: ", subset.join(" vs "), self.round)?;
        match self.winner {
            Some(id) => write!(f, "virus {} wins", id),
            None => write!(f, "tie"),
        }
    }
}

/// One pool entry's accumulated score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsEntry {
    pub id: usize,
    pub name: String,
    pub wins: u32,
    pub ties: u32,
    pub losses: u32,
    pub points: u32,
}

/// Final table, sorted by points, then wins, then id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standings {
    pub entries: Vec<StandingsEntry>,
}

impl fmt::Display for Standings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.set_titles(row!["#", "Virus", "Wins", "Ties", "Losses", "Points"]);
        for (rank, entry) in self.entries.iter().enumerate() {
            table.add_row(row![
                rank + 1,
                entry.name,
                entry.wins,
                entry.ties,
                entry.losses,
                entry.points
            ]);
        }
        write!(f, "{}", table)
    }
}

#[derive(Debug, Clone)]
pub struct TournamentResult {
    pub rounds: Vec<RoundRecord>,
    pub standings: Standings,
}

#[derive(Debug)]
pub struct Tournament {
    config: VmConfig,
    programs: Vec<CompiledProgram>,
}

impl Tournament {
    /// Requires at least `viruses_per_match` programs in the pool
    pub fn new(config: VmConfig, programs: Vec<CompiledProgram>) -> Result<Self> {
        config.validate()?;
        if programs.len() < config.viruses_per_match {
            return Err(RuntimeError::NotEnoughViruses {
                have: programs.len(),
                need: config.viruses_per_match,
            });
        }
        Ok(Self { config, programs })
    }

    pub fn run(&self) -> Result<TournamentResult> {
        let k = self.config.viruses_per_match;
        let mut rounds = Vec::new();
        let mut entries: Vec<StandingsEntry> = self
            .programs
            .iter()
            .enumerate()
            .map(|(id, p)| StandingsEntry {
                id,
                name: p.name.clone(),
                wins: 0,
                ties: 0,
                losses: 0,
                points: 0,
            })
            .collect();

        let mut round_counter = 0u64;
        for subset in KSubsets::new(self.programs.len(), k) {
            for round in 1..=self.config.rounds_per_setup {
                let record = self.play_round(&subset, round, round_counter)?;
                self.score(&record, &mut entries);
                log::info!("{}", record);
                rounds.push(record);
                round_counter += 1;
            }
        }

        entries.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(b.wins.cmp(&a.wins))
                .then(a.id.cmp(&b.id))
        });

        Ok(TournamentResult {
            rounds,
            standings: Standings { entries },
        })
    }

    /// Fresh VM, fresh placement, one match
    fn play_round(&self, subset: &[usize], round: usize, round_counter: u64) -> Result<RoundRecord> {
        let mut config = self.config.clone();
        // A fixed seed would replay the identical match every round
        config.seed = self.config.seed.map(|seed| seed.wrapping_add(round_counter));

        let mut vm = Vm::new(config);
        for &id in subset {
            vm.add_program(self.programs[id].clone());
        }
        let result = vm.run()?;

        // Map match-local ids (registration order) back to pool ids
        let survivors: Vec<usize> = result.survivors().iter().map(|&pid| subset[pid]).collect();
        let winner = match result.outcome {
            MatchOutcome::Victory { winner } => Some(subset[winner]),
            MatchOutcome::Draw { .. } => None,
        };

        Ok(RoundRecord {
            subset: subset.to_vec(),
            round,
            winner,
            survivors,
        })
    }

    fn score(&self, record: &RoundRecord, entries: &mut [StandingsEntry]) {
        for &id in &record.subset {
            let entry = &mut entries[id];
            if record.winner == Some(id) {
                entry.wins += 1;
                entry.points += 2;
            } else if record.winner.is_none()
                && (record.survivors.is_empty() || record.survivors.contains(&id))
            {
                entry.ties += 1;
                entry.points += 1;
            } else {
                entry.losses += 1;
            }
        }
    }
}

/// Lexicographic k-subset enumeration over `0..n`
struct KSubsets {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl KSubsets {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for KSubsets {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();
        let k = self.indices.len();

        // Odometer advance: bump the rightmost index that still has room
        let mut pos = k;
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            if self.indices[pos] < self.n - (k - pos) {
                self.indices[pos] += 1;
                for i in pos + 1..k {
                    self.indices[i] = self.indices[i - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }
}

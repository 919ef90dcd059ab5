//! Tournament runs over assembled viruses

use viruswars_assembler::compile;
use viruswars_runtime::Tournament;
use viruswars_spec::{CompiledProgram, VmConfig};

fn virus(name: &str, source: &str, config: &VmConfig) -> CompiledProgram {
    let report = compile(name, source, config);
    assert!(report.is_ok(), "{name}: {:?}", report.errors);
    report.program
}

fn config() -> VmConfig {
    VmConfig {
        memory_size: 512,
        max_threads: 16,
        cycles_to_completion: 200,
        min_program_distance: 50,
        viruses_per_match: 2,
        rounds_per_setup: 3,
        seed: Some(2024),
        ..VmConfig::default()
    }
}

#[test]
fn test_survivor_sweeps_a_self_destructing_opponent() {
    let cfg = config();
    let pool = vec![
        virus("imp", "start: @1 = @0\njump start", &cfg),
        virus("lemming", "start: jump x\nx: data 0", &cfg),
    ];

    let tournament = Tournament::new(cfg, pool).unwrap();
    let result = tournament.run().unwrap();

    assert_eq!(result.rounds.len(), 3);
    for record in &result.rounds {
        assert_eq!(record.winner, Some(0), "round {:?}", record);
        assert_eq!(record.survivors, vec![0]);
    }

    let standings = &result.standings;
    assert_eq!(standings.entries[0].name, "imp");
    assert_eq!(standings.entries[0].wins, 3);
    assert_eq!(standings.entries[0].points, 6);
    assert_eq!(standings.entries[1].name, "lemming");
    assert_eq!(standings.entries[1].losses, 3);
    assert_eq!(standings.entries[1].points, 0);
}

#[test]
fn test_three_virus_pool_plays_every_pairing() {
    let cfg = config();
    let loop_src = "start: nop\njump start";
    let pool = vec![
        virus("a", loop_src, &cfg),
        virus("b", loop_src, &cfg),
        virus("c", loop_src, &cfg),
    ];

    let tournament = Tournament::new(cfg, pool).unwrap();
    let result = tournament.run().unwrap();

    // C(3,2) subsets, three rounds each
    assert_eq!(result.rounds.len(), 9);

    // Loopers never touch memory, so every round ties and everyone ends
    // up with one tie per round played (2 pairings x 3 rounds each)
    for entry in &result.standings.entries {
        assert_eq!(entry.wins, 0);
        assert_eq!(entry.losses, 0);
        assert_eq!(entry.ties, 6);
        assert_eq!(entry.points, 6);
    }

    // The rendered table carries every virus name
    let table = result.standings.to_string();
    for name in ["a", "b", "c"] {
        assert!(table.contains(name));
    }
}

#[test]
fn test_seeded_tournament_is_reproducible() {
    let cfg = config();
    let pool = vec![
        virus("imp", "start: @1 = @0\njump start", &cfg),
        virus("stone", "start: nop\njump start", &cfg),
    ];

    let first = Tournament::new(cfg.clone(), pool.clone()).unwrap().run().unwrap();
    let second = Tournament::new(cfg, pool).unwrap().run().unwrap();

    assert_eq!(first.rounds, second.rounds);
    assert_eq!(first.standings.entries, second.standings.entries);
}

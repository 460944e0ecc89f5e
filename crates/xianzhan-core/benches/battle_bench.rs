use criterion::{black_box, criterion_group, criterion_main, Criterion};
use xianzhan_content::{ContentCatalog, EncounterDef, RosterEntry};
use xianzhan_core::{hash_battle, setup_encounter, AiPolicy, BattleConfig, BattleId, ControlMode};

fn skirmish() -> EncounterDef {
    EncounterDef::new(
        vec![
            RosterEntry::new("sword_disciple", 0),
            RosterEntry::new("herb_maiden", 0),
            RosterEntry::new("tide_monk", 0),
        ],
        vec![
            RosterEntry::new("flame_cultist", 0),
            RosterEntry::new("stone_golem", 1),
            RosterEntry::new("venom_serpent", 1),
        ],
    )
}

fn bench_full_battle(c: &mut Criterion) {
    let catalog = ContentCatalog::builtin();
    let encounter = skirmish();

    c.bench_function("full_battle_3v3", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            let mut battle = setup_encounter(
                BattleId::new(seed),
                &catalog,
                &encounter,
                BattleConfig::default(),
                seed,
                ControlMode::Auto,
            )
            .unwrap();
            black_box(battle.run(&mut AiPolicy::standard()).unwrap())
        });
    });
}

fn bench_setup(c: &mut Criterion) {
    let catalog = ContentCatalog::builtin();
    let encounter = skirmish();

    c.bench_function("setup_encounter", |b| {
        b.iter(|| {
            setup_encounter(
                BattleId::new(1),
                &catalog,
                black_box(&encounter),
                BattleConfig::default(),
                7,
                ControlMode::Auto,
            )
            .unwrap()
        });
    });
}

fn bench_hash(c: &mut Criterion) {
    let catalog = ContentCatalog::builtin();
    let mut battle = setup_encounter(
        BattleId::new(1),
        &catalog,
        &skirmish(),
        BattleConfig::default(),
        7,
        ControlMode::Auto,
    )
    .unwrap();
    // Hash a mid-fight state with statuses and cooldowns in play
    let mut ai = AiPolicy::standard();
    for _ in 0..10 {
        battle.step_all(&mut ai).unwrap();
    }

    c.bench_function("hash_battle", |b| b.iter(|| black_box(hash_battle(&battle))));
}

criterion_group!(benches, bench_full_battle, bench_setup, bench_hash);
criterion_main!(benches);

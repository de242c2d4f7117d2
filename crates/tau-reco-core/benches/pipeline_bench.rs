// Pipeline benchmark - full event through the built-in combinatoric producer
//
// Run with: cargo bench --bench pipeline_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tau_reco_core::{
    unique_regional_extras, Association, ChargedHadron, ChargedHadronAlgo, EventContext,
    EventInputs, P4, PiZero, PiZeroAlgo, ProducerConfig, RefKey, Registry, Seed, TauPipeline,
};

struct SyntheticEvent {
    seeds: Vec<Seed>,
    regions: Association<Seed>,
    charged: Association<Vec<ChargedHadron>>,
    pi_zeros: Association<Vec<PiZero>>,
}

/// Deterministic event with `n_seeds` jets, each with a handful of hadrons
fn synthetic_event(n_seeds: u32) -> SyntheticEvent {
    let mut seeds = Vec::with_capacity(n_seeds as usize);
    let mut regions = Association::new();
    let mut charged = Association::new();
    let mut pi_zeros = Association::new();

    for j in 0..n_seeds {
        let phi = f64::from(j) * 0.7 - 3.0;
        let key = RefKey::new(1, j);
        let daughters: Vec<RefKey> = (0..20).map(|d| RefKey::new(10, j * 40 + d)).collect();
        let mut region_daughters: Vec<RefKey> =
            (0..40).rev().map(|d| RefKey::new(10, j * 40 + d)).collect();
        region_daughters.push(RefKey::new(11, j));

        let seed = Seed::new(
            key,
            P4::from_pt_eta_phi_m(20.0 + f64::from(j), 0.1 * f64::from(j % 20), phi, 5.0),
            daughters,
        );
        regions.insert(key, Seed::new(RefKey::new(2, j), seed.p4, region_daughters));

        let hadrons = (0..5)
            .map(|h| ChargedHadron {
                p4: P4::from_pt_eta_phi_m(8.0 - f64::from(h), 0.0, phi + 0.02 * f64::from(h), 0.14),
                charge: if h % 2 == 0 { 1 } else { -1 },
                algo: ChargedHadronAlgo::ChargedPfCandidate,
                lead: Some(RefKey::new(10, j * 40 + h)),
            })
            .collect();
        charged.insert(key, hadrons);

        let strips = (0..3)
            .map(|p| PiZero {
                p4: P4::from_pt_eta_phi_m(4.0 - f64::from(p), 0.0, phi - 0.03 * f64::from(p), 0.135),
                algo: PiZeroAlgo::Strips,
                constituents: Vec::new(),
            })
            .collect();
        pi_zeros.insert(key, strips);

        seeds.push(seed);
    }

    SyntheticEvent {
        seeds,
        regions,
        charged,
        pi_zeros,
    }
}

fn bench_region_difference(c: &mut Criterion) {
    let event = synthetic_event(1);
    let seed = &event.seeds[0];
    let region = event.regions.get(&seed.key).unwrap();

    c.bench_function("unique_regional_extras_40", |b| {
        b.iter(|| unique_regional_extras(black_box(&seed.daughters), black_box(&region.daughters)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let registry = Registry::with_builtin_plugins().unwrap();
    let config = ProducerConfig::combinatoric_reco_taus();

    for n_seeds in [4u32, 16, 64] {
        let event = synthetic_event(n_seeds);
        let inputs = EventInputs {
            seeds: &event.seeds,
            regions: &event.regions,
            charged_hadrons: &event.charged,
            pi_zeros: &event.pi_zeros,
        };
        let ctx = EventContext::default().with_value("rho", 8.0);
        let mut pipeline = TauPipeline::from_config(&config, &registry).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n_seeds), &inputs, |b, inputs| {
            b.iter(|| pipeline.run(black_box(inputs), &ctx).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_region_difference, bench_pipeline);
criterion_main!(benches);

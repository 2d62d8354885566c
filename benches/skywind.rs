use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skywind::scoring::potential::potential_breakdown;
use skywind::scoring::zone_metrics::{aggregate_zone_metrics, ZoneRawStats};
use skywind::{
    generate_grid, ApproximationLimits, LatLon, ScoringConfig, Skywind, TerrainStats,
    WindSample, ZoneMetrics,
};
use tokio::runtime::Runtime;

fn bench_grid(c: &mut Criterion) {
    let limits = ApproximationLimits::default();
    c.bench_function("generate_grid_10", |b| {
        b.iter(|| generate_grid(black_box(LatLon(46.7712, 23.6236)), 20.0, 10, &limits))
    });
    c.bench_function("generate_grid_100", |b| {
        b.iter(|| generate_grid(black_box(LatLon(46.7712, 23.6236)), 20.0, 100, &limits))
    });

    let rt = Runtime::new().unwrap();
    c.bench_function("compute_region_cached", |b| {
        let client = Skywind::new();
        b.to_async(&rt).iter(|| async {
            client
                .compute_region()
                .center(black_box(LatLon(46.7712, 23.6236)))
                .side_km(20.0)
                .zones_per_edge(10)
                .call()
                .await
        })
    });
}

fn bench_scoring(c: &mut Criterion) {
    let config = ScoringConfig::default();
    let raw = ZoneRawStats {
        wind: Some(WindSample {
            speed: 7.2,
            direction: 250.0,
        }),
        terrain: Some(TerrainStats {
            elevation_min: Some(320.0),
            elevation_max: Some(510.0),
            elevation_stddev: Some(18.5),
        }),
        air_density: Some(1.18),
        power_density: Some(420.0),
        land_cover: Some(vec![
            ("30".to_string(), 1200.0),
            ("40".to_string(), 800.0),
            ("50".to_string(), 40.0),
        ]),
    };
    c.bench_function("score_zone", |b| {
        b.iter(|| {
            let mut metrics = ZoneMetrics::default();
            aggregate_zone_metrics(&mut metrics, black_box(&raw));
            potential_breakdown(&metrics, &config)
        })
    });
}

criterion_group!(benches, bench_grid, bench_scoring);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polars::prelude::{DataFrame, NamedFrom, Series};
use wellwater::{PivotNaming, WellFrame, COL_STATION, COL_WATER_DEPTH, COL_YEAR};

const WELLS: usize = 500;
const YEARS: usize = 25;
const READINGS_PER_YEAR: usize = 12;

fn synthetic_readings() -> WellFrame {
    let rows = WELLS * YEARS * READINGS_PER_YEAR;
    let mut stations = Vec::with_capacity(rows);
    let mut years = Vec::with_capacity(rows);
    let mut depths = Vec::with_capacity(rows);
    for well in 0..WELLS {
        for year in 0..YEARS {
            for reading in 0..READINGS_PER_YEAR {
                stations.push(format!("WELL {well:04}"));
                years.push(2000 + year as i32);
                depths.push((well % 37) as f64 + reading as f64 * 0.25);
            }
        }
    }
    let frame = DataFrame::new(vec![
        Series::new(COL_STATION.into(), stations).into(),
        Series::new(COL_YEAR.into(), years).into(),
        Series::new(COL_WATER_DEPTH.into(), depths).into(),
    ])
    .expect("synthetic frame");
    WellFrame::new(frame)
}

fn bench_aggregation(c: &mut Criterion) {
    let readings = synthetic_readings();
    let yearly = readings
        .group_mean(&[COL_STATION, COL_YEAR], COL_WATER_DEPTH)
        .expect("yearly means");

    c.bench_function("group_mean_station_year", |b| {
        b.iter(|| readings.group_mean(black_box(&[COL_STATION, COL_YEAR]), COL_WATER_DEPTH))
    });
    c.bench_function("pivot_years", |b| {
        b.iter(|| {
            yearly.pivot(
                black_box(&[COL_STATION]),
                COL_YEAR,
                COL_WATER_DEPTH,
                &PivotNaming::prefixed("depth_"),
            )
        })
    });
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);

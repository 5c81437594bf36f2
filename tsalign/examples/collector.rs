use std::time::Duration;

use tokio::sync::mpsc;
use tsalign::{
    CollectorHandle, InterpOrder, Snapshot, TimeInterval, TimeRecord, TimeSeriesCollector, average,
    merge,
};
use tracing_subscriber::EnvFilter;

// Mean of every channel over the emitted window, aligned on a shared timeline.
fn report(snapshot: Snapshot<f64>, window: TimeInterval) {
    let edges = [window.lo(), window.hi()];
    for (label, series) in &snapshot {
        match average(series, &edges, InterpOrder::Linear) {
            Ok(mean) => println!("{window} {label}: mean {:.3} over {} samples", mean[0], series.len()),
            Err(e) => eprintln!("{window} {label}: {e}"),
        }
    }
    let channels: Vec<_> = snapshot.values().collect();
    if let Ok(rows) = merge(None, &channels, InterpOrder::Hold) {
        println!("{window} aligned rows: {}", rows.len());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Library logs show up when built with `--features tracing`; set RUST_LOG=debug to see flushes.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let collector = TimeSeriesCollector::builder()
        .interval(Duration::from_millis(500))
        .delay(Duration::from_millis(100))
        .idle_timeout(Duration::from_millis(300))
        .start_at(0.0)
        .build()?;

    let (tx, rx) = mpsc::channel(64);
    let handle = CollectorHandle::spawn(collector, rx, report)?;

    // two sensors sampled at different, irregular rates
    for k in 0..40u32 {
        let t = f64::from(k) * 0.07;
        tx.send(("temp".to_string(), TimeRecord::new(t, 20.0 + (t * 1.3).sin()))).await?;
        if k % 3 == 0 {
            tx.send(("pressure".to_string(), TimeRecord::new(t + 0.01, 101.3 - 0.2 * t))).await?;
        }
    }
    drop(tx);

    let collector = handle.join().await?;
    println!("done; timer at {:.2}s, {} anchor records kept", collector.timer(), collector.len());
    Ok(())
}

use std::{error::Error, fs, path::Path};

use hopper::{
    algo::tabular::QTableAgentConfig,
    decay,
    driver::{Driver, FixedClock, FrameClock, LogMetrics, MetricsDisplay, SessionConfig},
    exploration::EpsilonGreedy,
    gym::hop::{GapConfig, HopAction, HopConfig},
};
use log::LevelFilter;

const NUM_EPISODES: u32 = 2000;
const MAX_FRAMES: u64 = 5_000_000;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder()
        .format_target(false)
        .format_timestamp_secs()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let path = Path::new("demos/out");
    fs::create_dir_all(path)?;

    let config = SessionConfig {
        hop: HopConfig {
            gaps: Some(GapConfig::default()),
            seed: Some(42),
            ..Default::default()
        },
        encoder: Default::default(),
        agent: QTableAgentConfig::<_, decay::Constant> {
            unseen_values: vec![(HopAction::Jump, f32::NEG_INFINITY)],
            ..Default::default()
        }
        .with_exploration(EpsilonGreedy::new(decay::Multiplicative::new(0.9999, 0.2, 0.01)?)),
        skip_idle_updates: true,
        max_frame_delta: 0.1,
        recent_window: 100,
    };
    let mut driver = Driver::new(config)?;
    let mut clock = FixedClock::new(60.0);
    let mut metrics = LogMetrics::new(100);

    let mut wtr = csv::Writer::from_path(path.join("hop_headless.csv"))?;
    let mut header = vec!["episode"];
    header.extend_from_slice(driver.report_keys());
    wtr.write_record(&header)?;

    for _ in 0..MAX_FRAMES {
        let summary = driver.tick(clock.next_frame());
        metrics.display(&driver.metrics())?;

        if let Some(episode) = summary.episode {
            let mut record = vec![episode.episode.to_string()];
            record.extend(episode.values.iter().map(f64::to_string));
            wtr.write_record(&record)?;

            if episode.episode >= NUM_EPISODES {
                break;
            }
        }
    }

    wtr.flush()?;

    let session = driver.session();
    log::info!(
        "finished after {} ticks: high score {}, average {:.2}, {} states learned",
        session.ticks(),
        session.high_score(),
        session.average_score(),
        driver.agent().q_table().states()
    );

    Ok(())
}

use std::error::Error;

use hopper::{
    decay::Decay,
    driver::{Driver, FrameClock, MetricsDisplay, RealtimeClock, Renderer, SessionConfig},
    gym::hop::{GapConfig, HopConfig},
    viz::{self, App, Flow},
};

fn main() -> Result<(), Box<dyn Error>> {
    viz::init_logging()?;

    let gaps = std::env::args().any(|arg| arg == "--gaps");
    let config = SessionConfig {
        hop: HopConfig {
            gaps: gaps.then(GapConfig::default),
            ..Default::default()
        },
        ..Default::default()
    };

    let mut driver = Driver::new(config)?;
    let mut clock = RealtimeClock::new(driver.env().config().reference_fps.into());
    let mut app = App::new(driver.report_keys(), driver.pending_jump())?;
    log::info!("press h for help");

    // The terminal is restored before any error from the loop is reported
    let result = run(&mut driver, &mut clock, &mut app);
    app.close()?;
    result
}

fn run<D: Decay>(
    driver: &mut Driver<D>,
    clock: &mut RealtimeClock,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    loop {
        match app.handle_events()? {
            Flow::Quit => break,
            Flow::ResetEpisode => {
                let episode = driver.reset_episode();
                app.record_episode(&episode);
            }
            Flow::Continue => {}
        }

        let summary = driver.tick(clock.next_frame());
        if let Some(episode) = &summary.episode {
            app.record_episode(episode);
        }

        app.render(&driver.scene())?;
        app.display(&driver.metrics())?;
    }
    Ok(())
}

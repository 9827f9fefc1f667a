use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use toynn::classifier::{Classifier, StopHandle};
use toynn::error::Result;
use toynn::net::{NetBuilder, NeuralNetwork};
use toynn::net::initializer::RandomNetInitializer;
use toynn_examples::doodles::{DoodleCategory, DoodleData, IMAGE_PIXELS, load_doodles};

const HIDDEN_SIZE: usize = 64;
const MAX_EPOCHS: usize = 5;
const TIME_BUDGET: Duration = Duration::from_secs(120);
const MODEL_FILE: &str = "nn.json";

pub fn main() -> Result<()> {
    env_logger::init();

    let data_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data"));
    let DoodleData { train, test } = load_doodles::<f32>(&data_dir)?;

    let net: NeuralNetwork<f32> = NetBuilder::new(IMAGE_PIXELS, HIDDEN_SIZE, DoodleCategory::ALL.len())
        .with_initializer(RandomNetInitializer::seed_from_u64(0xf1234567))
        .build();
    let classifier = Arc::new(Classifier::new(net).with_seed(0xf666));
    let stop = StopHandle::new();

    let start = Instant::now();
    let worker = {
        let (classifier, stop) = (Arc::clone(&classifier), stop.clone());
        thread::spawn(move || -> Result<usize> {
            for epoch in 1..=MAX_EPOCHS {
                let summary = classifier.train_epoch(&train, &stop)?;
                log::info!("epoch {epoch}: mean loss {:.5}", summary.mean_loss);
                if summary.stopped {
                    return Ok(epoch - 1);
                }
            }
            Ok(MAX_EPOCHS)
        })
    };
    while !worker.is_finished() {
        if start.elapsed() > TIME_BUDGET {
            log::warn!("time budget exhausted, stopping training");
            stop.stop();
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }
    let epochs = match worker.join() {
        Ok(result) => result?,
        Err(panic) => std::panic::resume_unwind(panic),
    };
    log::info!(
        "trained {epochs} full epochs in {:.1} sec",
        start.elapsed().as_secs_f32()
    );

    let scorer = classifier.evaluate(&test)?;
    scorer.log_report();

    classifier.save(MODEL_FILE)?;
    classifier.load(MODEL_FILE)?;
    let sample = &test[0];
    let guess = classifier.classify(&sample.input)?;
    log::info!(
        "reloaded model classifies a {:?} as {:?}",
        DoodleCategory::from_label(sample.label),
        DoodleCategory::from_label(guess)
    );
    Ok(())
}

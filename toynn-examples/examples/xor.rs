use rand::Rng;
use toynn::net::{NetBuilder, NeuralNetwork};

const TRAINING_STEPS: usize = 50_000;

fn main() -> toynn::error::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cases: [([f32; 2], [f32; 1]); 4] = [
        ([0.0, 0.0], [0.0]),
        ([0.0, 1.0], [1.0]),
        ([1.0, 0.0], [1.0]),
        ([1.0, 1.0], [0.0]),
    ];
    let mut net: NeuralNetwork = NetBuilder::new(2, 4, 1).with_learning_rate(0.5).build();
    let mut rng = rand::thread_rng();
    for _ in 0..TRAINING_STEPS {
        let (input, target) = &cases[rng.gen_range(0..cases.len())];
        net.train(input, target)?;
    }
    for (input, target) in &cases {
        log::info!("{input:?} -> {:.3} (expected {})", net.predict(input)?[0], target[0]);
    }
    Ok(())
}

//! Quick, Draw! doodle bitmaps packed as raw bytes: 1000 images per file, one
//! byte per pixel, 28x28 pixels per image.

use std::io;
use std::path::Path;
use toynn::classifier::Sample;
use toynn::dtype::DType;
use toynn::error::Result;

pub const IMAGE_PIXELS: usize = 28 * 28;
pub const SAMPLES_PER_CATEGORY: usize = 1000;
pub const TRAIN_FRACTION: f64 = 0.8;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DoodleCategory {
    Cat,
    Rainbow,
    Train,
}

impl DoodleCategory {
    pub const ALL: [DoodleCategory; 3] = [DoodleCategory::Cat, DoodleCategory::Rainbow, DoodleCategory::Train];

    pub fn label(self) -> usize {
        self as usize
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DoodleCategory::Cat => "cat1000.bin",
            DoodleCategory::Rainbow => "rainbows1000.bin",
            DoodleCategory::Train => "train1000.bin",
        }
    }

    pub fn from_label(label: usize) -> Option<Self> {
        Self::ALL.get(label).copied()
    }
}

pub struct DoodleData<F: DType> {
    pub train: Vec<Sample<F>>,
    pub test: Vec<Sample<F>>,
}

/// Scales raw pixel bytes into `[0, 1]`.
pub fn to_input<F: DType>(pixels: &[u8]) -> Vec<F> {
    pixels.iter().map(|&p| F::from_f64(p as f64 / 255.0)).collect()
}

/// Slices one category blob into its training and test samples, in file order.
pub fn split_category<F: DType>(bytes: &[u8], label: usize) -> Result<(Vec<Sample<F>>, Vec<Sample<F>>)> {
    let expected = SAMPLES_PER_CATEGORY * IMAGE_PIXELS;
    if bytes.len() < expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("doodle blob has {} bytes, expected at least {expected}", bytes.len()),
        )
        .into());
    }
    let num_train = (TRAIN_FRACTION * SAMPLES_PER_CATEGORY as f64) as usize;
    let mut samples = bytes[..expected]
        .chunks_exact(IMAGE_PIXELS)
        .map(|pixels| Sample::new(to_input(pixels), label));
    let train = samples.by_ref().take(num_train).collect();
    let test = samples.collect();
    Ok((train, test))
}

pub fn load_doodles<F: DType>(dir: &Path) -> Result<DoodleData<F>> {
    let mut data = DoodleData {
        train: Vec::new(),
        test: Vec::new(),
    };
    for category in DoodleCategory::ALL {
        let path = dir.join(category.file_name());
        log::debug!("reading {}", path.display());
        let (train, test) = split_category(&std::fs::read(&path)?, category.label())?;
        data.train.extend(train);
        data.test.extend(test);
    }
    log::info!("loaded {} training and {} test doodles", data.train.len(), data.test.len());
    Ok(data)
}

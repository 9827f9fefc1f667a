//! Versioned JSON representation of a trained [`NeuralNetwork`].
//!
//! Floats are widened to `f64`, written with the shortest decimal that parses
//! back to the same binary value and read with serde_json's `float_roundtrip`
//! parser, so a save/load cycle is exact for both `f32` and `f64` networks.
//! The activation function is not stored; loaded networks use
//! [`ActivationFn::Sigmoid`].

use crate::activation::ActivationFn;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::matrix::{Dim2, Matrix};
use crate::net::NeuralNetwork;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub const FORMAT: &str = "toynn-network";
pub const VERSION: u32 = 1;

#[derive(Deserialize)]
struct Header {
    format: String,
    version: u32,
}

#[derive(Serialize)]
#[serde(bound = "F: DType")]
struct SavedNetworkRef<'a, F: DType> {
    format: &'static str,
    version: u32,
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    learning_rate: f64,
    weights_ih: &'a Matrix<F>,
    weights_ho: &'a Matrix<F>,
    bias_h: &'a Matrix<F>,
    bias_o: &'a Matrix<F>,
}

#[derive(Deserialize)]
#[serde(bound = "F: DType")]
struct SavedNetwork<F: DType> {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    learning_rate: f64,
    weights_ih: Matrix<F>,
    weights_ho: Matrix<F>,
    bias_h: Matrix<F>,
    bias_o: Matrix<F>,
}

impl<'a, F: DType> TryFrom<&'a NeuralNetwork<F>> for SavedNetworkRef<'a, F> {
    type Error = Error;

    /// JSON has no encoding for NaN or infinity, so such networks are refused
    /// before anything is written.
    fn try_from(net: &'a NeuralNetwork<F>) -> Result<Self> {
        check_finite(net)?;
        Ok(SavedNetworkRef {
            format: FORMAT,
            version: VERSION,
            input_size: net.input_size(),
            hidden_size: net.hidden_size(),
            output_size: net.output_size(),
            learning_rate: net.learning_rate().as_f64(),
            weights_ih: net.weights_ih(),
            weights_ho: net.weights_ho(),
            bias_h: net.bias_h(),
            bias_o: net.bias_o(),
        })
    }
}

impl<F: DType> SavedNetwork<F> {
    fn into_network(self) -> Result<NeuralNetwork<F>> {
        let SavedNetwork {
            input_size,
            hidden_size,
            output_size,
            learning_rate,
            weights_ih,
            weights_ho,
            bias_h,
            bias_o,
        } = self;
        for (name, actual, expected) in [
            ("weights_ih", weights_ih.dims(), Dim2(hidden_size, input_size)),
            ("weights_ho", weights_ho.dims(), Dim2(output_size, hidden_size)),
            ("bias_h", bias_h.dims(), Dim2(hidden_size, 1)),
            ("bias_o", bias_o.dims(), Dim2(output_size, 1)),
        ] {
            if actual != expected {
                return Err(Error::InvalidModel(format!(
                    "{name} has dims {actual}, expected {expected}"
                )));
            }
        }
        let net = NeuralNetwork::from_parts(
            weights_ih,
            weights_ho,
            bias_h,
            bias_o,
            F::from_f64(learning_rate),
            ActivationFn::default(),
        )?;
        // values beyond the range of `F` narrow to infinity
        check_finite(&net)?;
        Ok(net)
    }
}

fn check_finite<F: DType>(net: &NeuralNetwork<F>) -> Result<()> {
    let learning_rate = net.learning_rate();
    if !learning_rate.is_finite() {
        return Err(Error::InvalidModel(format!("learning_rate {learning_rate} is not finite")));
    }
    for (name, m) in [
        ("weights_ih", net.weights_ih()),
        ("weights_ho", net.weights_ho()),
        ("bias_h", net.bias_h()),
        ("bias_o", net.bias_o()),
    ] {
        if let Some(i) = m.iter().position(|x| !x.is_finite()) {
            let (row, col) = (i / m.cols(), i % m.cols());
            return Err(Error::InvalidModel(format!(
                "{name} entry ({row}, {col}) is {}, not a finite value",
                m.as_slice()[i]
            )));
        }
    }
    Ok(())
}

fn check_header(header: &Header) -> Result<()> {
    if header.format == FORMAT && header.version == VERSION {
        Ok(())
    } else {
        Err(Error::UnsupportedFormat {
            format: header.format.clone(),
            version: header.version,
        })
    }
}

pub fn to_json<F: DType>(net: &NeuralNetwork<F>) -> Result<String> {
    Ok(serde_json::to_string(&SavedNetworkRef::try_from(net)?)?)
}

pub fn to_json_pretty<F: DType>(net: &NeuralNetwork<F>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&SavedNetworkRef::try_from(net)?)?)
}

pub fn from_json<F: DType>(json: &str) -> Result<NeuralNetwork<F>> {
    let header: Header = serde_json::from_str(json)?;
    check_header(&header)?;
    serde_json::from_str::<SavedNetwork<F>>(json)?.into_network()
}

pub fn write_to<F: DType, W: Write>(net: &NeuralNetwork<F>, writer: W) -> Result<()> {
    write_saved(&SavedNetworkRef::try_from(net)?, writer)
}

fn write_saved<F: DType, W: Write>(saved: &SavedNetworkRef<'_, F>, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, saved)?;
    writer.flush()?;
    Ok(())
}

pub fn read_from<F: DType, R: Read>(reader: R) -> Result<NeuralNetwork<F>> {
    let mut json = String::new();
    BufReader::new(reader).read_to_string(&mut json)?;
    from_json(&json)
}

pub fn save<F: DType, P: AsRef<Path>>(net: &NeuralNetwork<F>, path: P) -> Result<()> {
    let path = path.as_ref();
    log::debug!("saving network to {}", path.display());
    // validate before creating, so an existing file is not truncated
    let saved = SavedNetworkRef::try_from(net)?;
    write_saved(&saved, File::create(path)?)
}

pub fn load<F: DType, P: AsRef<Path>>(path: P) -> Result<NeuralNetwork<F>> {
    let path = path.as_ref();
    log::debug!("loading network from {}", path.display());
    read_from(File::open(path)?)
}

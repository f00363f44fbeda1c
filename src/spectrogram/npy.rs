//! Spectrogram arrays stored as NumPy `.npy` files

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;
use ndarray::{Array3, Array4, ArrayD, Axis, IxDyn};
use ndarray_npy::{ReadNpyError, ReadNpyExt, WriteNpyExt};
use crate::error::{SpecCleanError, Result};

/// Element type the array was stored with on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Float32,
    Float64,
}

impl Precision {
    pub fn name(&self) -> &'static str {
        match self {
            Precision::Float32 => "float32",
            Precision::Float64 => "float64",
        }
    }
}

/// A single spectrogram held as `[channels, height, width]`.
///
/// Values are held in f64 whatever the stored precision; the network
/// input is converted to f32.
/// The on-disk shape and precision are remembered so that derived arrays
/// are written back in the same layout they were read in.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    data: Array3<f64>,
    original_shape: Vec<usize>,
    precision: Precision,
}

impl Spectrogram {
    /// Accepts `[H, W]`, `[C, H, W]` or `[1, C, H, W]` arrays.
    pub fn from_array(array: ArrayD<f64>, channels: usize, precision: Precision) -> Result<Self> {
        let original_shape = array.shape().to_vec();
        let (c, h, w) = match *original_shape.as_slice() {
            [h, w] => (1, h, w),
            [c, h, w] => (c, h, w),
            [1, c, h, w] => (c, h, w),
            _ => {
                return Err(SpecCleanError::decode(format!(
                    "Unsupported spectrogram shape {:?}, expected [H, W], [C, H, W] or [1, C, H, W]",
                    original_shape
                )));
            }
        };

        if c != channels {
            return Err(SpecCleanError::decode(format!(
                "Spectrogram has {} channel(s), network expects {}", c, channels
            )));
        }

        // Logical iteration order is independent of C/Fortran memory layout
        let data = Array3::from_shape_vec((c, h, w), array.iter().copied().collect())
            .map_err(|e| SpecCleanError::decode(format!("Spectrogram shape conversion failed: {}", e)))?;

        Ok(Self { data, original_shape, precision })
    }

    /// Read a `.npy` file holding f32 or f64 elements
    pub fn load<P: AsRef<Path>>(path: P, channels: usize) -> Result<Self> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        File::open(path)
            .and_then(|mut file| file.read_to_end(&mut bytes))
            .map_err(|e| SpecCleanError::decode(format!("Cannot read {}: {}", path.display(), e)))?;

        let (array, precision) = match ArrayD::<f32>::read_npy(bytes.as_slice()) {
            Ok(array) => (array.mapv(f64::from), Precision::Float32),
            Err(ReadNpyError::WrongDescriptor(_)) => {
                let array = ArrayD::<f64>::read_npy(bytes.as_slice())
                    .map_err(|e| decode_error(path, e))?;
                (array, Precision::Float64)
            }
            Err(e) => return Err(decode_error(path, e)),
        };

        Self::from_array(array, channels, precision)
            .map_err(|e| SpecCleanError::decode(format!("{}: {}", path.display(), e)))
    }

    /// Network input: `[1, C, H, W]` in f32
    pub fn network_input(&self) -> Array4<f32> {
        self.data.mapv(|x| x as f32).insert_axis(Axis(0))
    }

    /// `self - noise` for a `[1, C, H, W]` noise estimate, computed at the
    /// stored precision and keeping the on-disk shape and precision
    pub fn denoised(&self, noise: &Array4<f32>) -> Result<Self> {
        let (c, h, w) = self.data.dim();
        if noise.dim() != (1, c, h, w) {
            return Err(SpecCleanError::inference(format!(
                "Shape mismatch: expected {:?}, got {:?}", [1, c, h, w], noise.shape()
            )));
        }

        let noise = noise.index_axis(Axis(0), 0).mapv(f64::from);
        Ok(Self {
            data: &self.data - &noise,
            original_shape: self.original_shape.clone(),
            precision: self.precision,
        })
    }

    /// Write in the original shape and precision, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let values: Vec<f64> = self.data.iter().copied().collect();
        let array = ArrayD::from_shape_vec(IxDyn(&self.original_shape), values)
            .map_err(|e| SpecCleanError::io(format!("Output shape conversion failed: {}", e)))?;

        let writer = BufWriter::new(File::create(path).map_err(|e| {
            SpecCleanError::io(format!("Cannot create {}: {}", path.display(), e))
        })?);

        match self.precision {
            Precision::Float32 => array.mapv(|x| x as f32).write_npy(writer)?,
            Precision::Float64 => array.write_npy(writer)?,
        }
        Ok(())
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn original_shape(&self) -> &[usize] {
        &self.original_shape
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn channels(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn height(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn width(&self) -> usize {
        self.data.len_of(Axis(2))
    }
}

fn decode_error(path: &Path, err: ReadNpyError) -> SpecCleanError {
    SpecCleanError::decode(format!("Cannot parse {} as npy: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};
    use tempfile::TempDir;

    fn write_npy<A: WriteNpyExt>(path: &Path, array: &A) {
        array.write_npy(File::create(path).unwrap()).unwrap();
    }

    #[test]
    fn test_from_2d_inserts_channel() {
        let array = arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn();
        let spec = Spectrogram::from_array(array, 1, Precision::Float32).unwrap();
        assert_eq!(spec.channels(), 1);
        assert_eq!(spec.height(), 2);
        assert_eq!(spec.width(), 3);
        assert_eq!(spec.network_input().shape(), &[1, 1, 2, 3]);
        assert_eq!(spec.original_shape(), &[2, 3]);
    }

    #[test]
    fn test_channel_mismatch() {
        let array = ArrayD::<f64>::zeros(IxDyn(&[2, 4, 4]));
        let err = Spectrogram::from_array(array, 1, Precision::Float32).unwrap_err();
        assert!(matches!(err, SpecCleanError::Decode { .. }));
    }

    #[test]
    fn test_unsupported_rank() {
        let array = ArrayD::<f64>::zeros(IxDyn(&[8]));
        assert!(Spectrogram::from_array(array, 1, Precision::Float32).is_err());

        let array = ArrayD::<f64>::zeros(IxDyn(&[2, 1, 4, 4]));
        assert!(Spectrogram::from_array(array, 1, Precision::Float32).is_err());
    }

    #[test]
    fn test_fortran_order_values_preserved() {
        let c_order = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let f_order = c_order.t().as_standard_layout().to_owned().reversed_axes();
        assert_eq!(f_order, c_order);

        let spec = Spectrogram::from_array(f_order.into_dyn(), 1, Precision::Float32).unwrap();
        assert_eq!(spec.data()[[0, 0, 1]], 2.0);
        assert_eq!(spec.data()[[0, 1, 0]], 3.0);
    }

    #[test]
    fn test_load_and_save_f32() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.npy");
        let output = dir.path().join("out.npy");
        let array: Array2<f32> = Array2::from_shape_fn((3, 5), |(i, j)| (i * 5 + j) as f32 * 0.5);
        write_npy(&input, &array);

        let spec = Spectrogram::load(&input, 1).unwrap();
        assert_eq!(spec.precision(), Precision::Float32);
        spec.save(&output).unwrap();

        let restored = Array2::<f32>::read_npy(File::open(&output).unwrap()).unwrap();
        assert_eq!(restored, array);
    }

    #[test]
    fn test_f64_written_back_as_f64() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.npy");
        let output = dir.path().join("out.npy");
        let array = ndarray::Array3::<f64>::from_elem((1, 2, 2), 0.25);
        write_npy(&input, &array);

        let spec = Spectrogram::load(&input, 1).unwrap();
        assert_eq!(spec.precision(), Precision::Float64);
        spec.save(&output).unwrap();

        let restored = ndarray::Array3::<f64>::read_npy(File::open(&output).unwrap()).unwrap();
        assert_eq!(restored, array);
        assert!(ndarray::Array3::<f32>::read_npy(File::open(&output).unwrap()).is_err());
    }

    #[test]
    fn test_f64_denoised_keeps_full_precision() {
        let value = 1.0 + 1e-12;
        assert_ne!(value as f32 as f64, value);

        let spec = Spectrogram::from_array(ArrayD::from_elem(IxDyn(&[2, 2]), value), 1, Precision::Float64)
            .unwrap();
        let noise = Array4::from_elem((1, 1, 2, 2), 0.5f32);
        let denoised = spec.denoised(&noise).unwrap();

        assert!(denoised.data().iter().all(|&x| x == value - 0.5));
        assert_eq!(denoised.precision(), Precision::Float64);
        assert_eq!(denoised.original_shape(), &[2, 2]);
    }

    #[test]
    fn test_f32_denoised_matches_f32_arithmetic() {
        let values = [0.1f32, -3.7, 1e-6, 12345.678];
        let noise_values = [0.3f32, 0.01, -2e-7, 0.005];
        let array = Array2::from_shape_vec((2, 2), values.to_vec()).unwrap();
        let spec = Spectrogram::from_array(array.mapv(f64::from).into_dyn(), 1, Precision::Float32)
            .unwrap();
        let noise = Array4::from_shape_vec((1, 1, 2, 2), noise_values.to_vec()).unwrap();

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.npy");
        spec.denoised(&noise).unwrap().save(&output).unwrap();

        let restored = Array2::<f32>::read_npy(File::open(&output).unwrap()).unwrap();
        let expected: Vec<f32> = values.iter().zip(&noise_values).map(|(x, n)| x - n).collect();
        assert_eq!(restored.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_load_garbage_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.npy");
        std::fs::write(&input, b"definitely not numpy").unwrap();
        assert!(matches!(Spectrogram::load(&input, 1), Err(SpecCleanError::Decode { .. })));
    }

    #[test]
    fn test_load_integer_array_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("ints.npy");
        write_npy(&input, &Array2::<i32>::zeros((2, 2)));
        assert!(matches!(Spectrogram::load(&input, 1), Err(SpecCleanError::Decode { .. })));
    }

    #[test]
    fn test_denoised_shape_check() {
        let spec = Spectrogram::from_array(ArrayD::zeros(IxDyn(&[2, 2])), 1, Precision::Float32).unwrap();
        assert!(spec.denoised(&Array4::zeros((1, 1, 2, 2))).is_ok());
        assert!(spec.denoised(&Array4::zeros((1, 1, 2, 3))).is_err());
        assert!(spec.denoised(&Array4::zeros((2, 1, 2, 2))).is_err());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.npy");
        let ones = Spectrogram::from_array(ArrayD::from_elem(IxDyn(&[4, 4]), 1.0), 1, Precision::Float32).unwrap();
        let small = Spectrogram::from_array(ArrayD::from_elem(IxDyn(&[1, 1]), 2.0), 1, Precision::Float32).unwrap();
        ones.save(&output).unwrap();
        small.save(&output).unwrap();

        let restored = Array2::<f32>::read_npy(File::open(&output).unwrap()).unwrap();
        assert_eq!(restored, arr2(&[[2.0f32]]));
    }
}

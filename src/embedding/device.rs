use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Picks the first usable accelerator compiled in, falling back to CPU.
///
/// Metal is tried before CUDA. Without either feature this always yields
/// [`Device::Cpu`].
pub fn select_device() -> Result<Device, EmbeddingError> {
    let mut failures: Vec<String> = Vec::new();

    for (name, candidate) in accelerator_candidates() {
        match candidate {
            Ok(device) => {
                info!(backend = name, "Using GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                warn!(backend = name, error = %e, "GPU device unavailable");
                failures.push(format!("{name} failed: {e}"));
            }
        }
    }

    if failures.is_empty() {
        debug!("No GPU backend compiled, using CPU");
    } else {
        warn!(reason = %failures.join("; "), "Falling back to CPU device");
    }

    Ok(Device::Cpu)
}

#[allow(clippy::vec_init_then_push, unused_mut)]
fn accelerator_candidates() -> Vec<(&'static str, candle_core::Result<Device>)> {
    let mut candidates = Vec::new();

    #[cfg(feature = "metal")]
    candidates.push(("metal", Device::new_metal(0)));

    #[cfg(feature = "cuda")]
    candidates.push(("cuda", Device::new_cuda(0)));

    candidates
}

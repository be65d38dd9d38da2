//! Compute backend trait and device abstraction.
//!
//! A backend only decides how the indices of a batch are scheduled. What
//! each index computes is a closure supplied by the caller, so the
//! materials themselves stay backend-agnostic.

use momoto_core::bsdf::Bsdf;
use momoto_core::error::OpticsError;
use momoto_core::types::{BsdfContext, MaterialResponse};
use thiserror::Error;

/// Errors originating from compute backends.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Evaluation {index} failed: {source}")]
    Evaluation {
        index: usize,
        #[source]
        source: OpticsError,
    },
}

/// Describes a compute backend.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub compute_units: Option<usize>,
}

/// The type of compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Serial,
    Cpu,
}

/// Per-index evaluation closure.
pub type FillFn<'a> = dyn Fn(usize) -> Result<MaterialResponse, OpticsError> + Send + Sync + 'a;

/// Abstraction over batch schedulers.
pub trait ComputeBackend: Send + Sync {
    fn device_info(&self) -> DeviceInfo;

    /// Evaluate `fill_fn(i)` for every `i < len` and return the results in
    /// index order.
    ///
    /// # Errors
    /// If any index fails, the error of the lowest failing index is
    /// returned, independent of scheduling.
    fn parallel_fill(&self, len: usize, fill_fn: &FillFn<'_>) -> Result<Vec<MaterialResponse>, ComputeError>;

    /// Evaluate `bsdf` once per context.
    fn evaluate_batch(
        &self,
        bsdf: &dyn Bsdf,
        contexts: &[BsdfContext],
    ) -> Result<Vec<MaterialResponse>, ComputeError> {
        log::debug!(
            "{}: evaluating {} contexts for {}",
            self.device_info().name,
            contexts.len(),
            bsdf.name()
        );
        self.parallel_fill(contexts.len(), &|i| bsdf.evaluate(&contexts[i]))
    }

    /// Evaluate `bsdf` at each wavelength with the geometry of `ctx`.
    fn evaluate_wavelengths(
        &self,
        bsdf: &dyn Bsdf,
        ctx: &BsdfContext,
        wavelengths_nm: &[f64],
    ) -> Result<Vec<MaterialResponse>, ComputeError> {
        self.parallel_fill(wavelengths_nm.len(), &|i| bsdf.evaluate_at(ctx, wavelengths_nm[i]))
    }
}

/// Turn per-index results into the first error by index, or the values.
pub(crate) fn first_error(
    results: Vec<Result<MaterialResponse, OpticsError>>,
) -> Result<Vec<MaterialResponse>, ComputeError> {
    results
        .into_iter()
        .enumerate()
        .map(|(index, r)| r.map_err(|source| ComputeError::Evaluation { index, source }))
        .collect()
}

/// Single-threaded backend; the ordering reference for the others.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "serial".into(),
            backend_type: BackendType::Serial,
            compute_units: Some(1),
        }
    }

    fn parallel_fill(&self, len: usize, fill_fn: &FillFn<'_>) -> Result<Vec<MaterialResponse>, ComputeError> {
        first_error((0..len).map(fill_fn).collect())
    }
}

/// Construct a backend of the requested type.
///
/// # Errors
/// [`ComputeError::Unavailable`] when the type was compiled out.
pub fn select_backend(backend_type: BackendType) -> Result<Box<dyn ComputeBackend>, ComputeError> {
    let backend: Box<dyn ComputeBackend> = match backend_type {
        BackendType::Serial => Box::new(SerialBackend),
        #[cfg(feature = "cpu")]
        BackendType::Cpu => Box::new(crate::cpu::CpuBackend::new()),
        #[cfg(not(feature = "cpu"))]
        BackendType::Cpu => {
            return Err(ComputeError::Unavailable("built without the `cpu` feature".into()))
        }
    };
    log::info!("selected compute backend: {}", backend.device_info().name);
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use momoto_core::bsdf::Dielectric;

    #[test]
    fn test_serial_preserves_order() {
        let glass = Dielectric::clear();
        let contexts: Vec<_> = (0..9)
            .map(|i| BsdfContext::at_incidence(i as f64 * 10.0, 550.0).unwrap())
            .collect();
        let out = SerialBackend.evaluate_batch(&glass, &contexts).unwrap();
        assert_eq!(out.len(), 9);
        for (ctx, r) in contexts.iter().zip(&out) {
            assert_eq!(*r, glass.evaluate(ctx).unwrap());
        }
        assert!(out[8].reflectance > out[0].reflectance);
    }

    #[test]
    fn test_lowest_failing_index_is_reported() {
        let err = SerialBackend
            .parallel_fill(6, &|i| {
                if i >= 3 {
                    Err(OpticsError::Domain {
                        parameter: "index",
                        value: i as f64,
                        domain: "< 3",
                    })
                } else {
                    Ok(MaterialResponse::opaque(0.5))
                }
            })
            .unwrap_err();
        assert!(matches!(err, ComputeError::Evaluation { index: 3, .. }));
        assert!(err.to_string().contains("Evaluation 3 failed"));
    }

    #[test]
    fn test_empty_batch() {
        assert!(SerialBackend.evaluate_batch(&Dielectric::clear(), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_select_backend() {
        let serial = select_backend(BackendType::Serial).unwrap();
        assert_eq!(serial.device_info().backend_type, BackendType::Serial);
        #[cfg(feature = "cpu")]
        assert_eq!(
            select_backend(BackendType::Cpu).unwrap().device_info().backend_type,
            BackendType::Cpu
        );
    }
}

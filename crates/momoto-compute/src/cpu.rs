//! CPU compute backend using Rayon for shared-memory parallelism.

use momoto_core::types::MaterialResponse;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::backend::{first_error, BackendType, ComputeBackend, ComputeError, DeviceInfo, FillFn};

/// CPU backend that spreads a batch across Rayon workers.
///
/// [`CpuBackend::new`] uses the global pool; [`CpuBackend::with_threads`]
/// owns a dedicated one.
pub struct CpuBackend {
    pool: Option<ThreadPool>,
}

impl CpuBackend {
    /// Create a new CPU backend on the global Rayon pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Create a CPU backend with its own pool of `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> Result<Self, ComputeError> {
        if num_threads == 0 {
            return Err(ComputeError::ThreadPool("thread count must be positive".into()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| ComputeError::ThreadPool(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }

    pub fn num_threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, ThreadPool::current_num_threads)
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.num_threads()),
            backend_type: BackendType::Cpu,
            compute_units: Some(self.num_threads()),
        }
    }

    fn parallel_fill(&self, len: usize, fill_fn: &FillFn<'_>) -> Result<Vec<MaterialResponse>, ComputeError> {
        // Indexed collect keeps input order.
        let run = || (0..len).into_par_iter().map(fill_fn).collect::<Vec<_>>();
        let results = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        first_error(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SerialBackend;
    use momoto_core::bsdf::{Bsdf, Conductor, Subsurface, ThinFilm};
    use momoto_core::error::OpticsError;
    use momoto_core::spectrum::canonical_wavelengths;
    use momoto_core::types::BsdfContext;

    #[test]
    fn test_matches_serial_order() {
        let film = ThinFilm::soap_bubble();
        let contexts: Vec<_> = (0..200)
            .map(|i| BsdfContext::at_incidence((i % 80) as f64, 400.0 + i as f64 * 1.5).unwrap())
            .collect();
        let parallel = CpuBackend::new().evaluate_batch(&film, &contexts).unwrap();
        let serial = SerialBackend.evaluate_batch(&film, &contexts).unwrap();
        assert_eq!(parallel, serial);
    }

    #[test]
    fn test_dedicated_pool() {
        let backend = CpuBackend::with_threads(2).unwrap();
        assert_eq!(backend.num_threads(), 2);
        assert_eq!(backend.device_info().compute_units, Some(2));

        let ctx = BsdfContext::at_incidence(0.0, 550.0).unwrap();
        let wavelengths = canonical_wavelengths();
        let out = backend
            .evaluate_wavelengths(&Conductor::copper(), &ctx, &wavelengths)
            .unwrap();
        assert_eq!(out.len(), 31);
        // Copper reflects red far better than blue.
        assert!(out[30].reflectance > out[0].reflectance + 0.3);
        assert!(matches!(CpuBackend::with_threads(0), Err(ComputeError::ThreadPool(_))));
    }

    #[test]
    fn test_first_error_is_deterministic() {
        let skin = Subsurface::skin();
        let ctx = BsdfContext::at_incidence(0.0, 550.0).unwrap();
        for _ in 0..5 {
            let err = CpuBackend::new()
                .parallel_fill(64, &|i| {
                    if i % 10 == 7 {
                        Err(OpticsError::Domain {
                            parameter: "index",
                            value: i as f64,
                            domain: "not 7 mod 10",
                        })
                    } else {
                        skin.evaluate(&ctx)
                    }
                })
                .unwrap_err();
            assert!(matches!(err, ComputeError::Evaluation { index: 7, .. }));
        }
    }
}
